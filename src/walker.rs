//! Boundary iterator over a finished curve collection.
//!
//! The sweep stores only the non-horizontal monotone pieces of each
//! subpath; the walker re-synthesizes the horizontal connectors as
//! `LineTo` commands and terminates each subpath with `Close`. An
//! optional affine transform is applied to every emitted point.

use crate::curve::Curve;
use crate::path::PathCommand;
use glam::DAffine2;
use std::sync::Arc;

/// Iterator over the boundary of an area, yielding path commands.
///
/// Holds its own snapshot of the curve collection, so it stays valid even
/// if the source area is mutated while iterating.
#[derive(Debug, Clone)]
pub struct Boundary {
    curves: Arc<Vec<Curve>>,
    transform: Option<DAffine2>,
    index: usize,
    /// Set when the previous curve's endpoint needs a connector to the
    /// next curve's start.
    pending: Option<Curve>,
}

impl Boundary {
    pub(crate) fn new(curves: Arc<Vec<Curve>>, transform: Option<DAffine2>) -> Boundary {
        Boundary {
            curves,
            transform,
            index: 0,
            pending: None,
        }
    }

    fn apply(&self, cmd: PathCommand) -> PathCommand {
        match self.transform {
            None => cmd,
            Some(t) => match cmd {
                PathCommand::MoveTo(p) => PathCommand::MoveTo(t.transform_point2(p)),
                PathCommand::LineTo(p) => PathCommand::LineTo(t.transform_point2(p)),
                PathCommand::QuadTo { control, to } => PathCommand::QuadTo {
                    control: t.transform_point2(control),
                    to: t.transform_point2(to),
                },
                PathCommand::CubicTo {
                    control1,
                    control2,
                    to,
                } => PathCommand::CubicTo {
                    control1: t.transform_point2(control1),
                    control2: t.transform_point2(control2),
                    to: t.transform_point2(to),
                },
                PathCommand::Close => PathCommand::Close,
            },
        }
    }
}

impl Iterator for Boundary {
    type Item = PathCommand;

    fn next(&mut self) -> Option<PathCommand> {
        let cur = self.curves.get(self.index).copied();
        let cmd = match (self.pending, cur) {
            // Junction between curves: a gap becomes a connector line,
            // a subpath boundary or the end of the list becomes Close.
            (Some(_), Some(c)) if c.order() != 0 => PathCommand::LineTo(c.start_point()),
            (Some(_), _) => PathCommand::Close,
            (None, Some(c)) => c.segment(),
            (None, None) => return None,
        };
        if self.pending.is_some() {
            self.pending = None;
        } else if let Some(c) = cur {
            self.index += 1;
            self.pending = Some(c);
            if let Some(n) = self.curves.get(self.index) {
                // No junction needed when the next curve starts exactly
                // where this one ended.
                if n.order() != 0 && c.end_point() == n.start_point() {
                    self.pending = None;
                }
            }
        }
        Some(self.apply(cmd))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decompose::decompose;
    use crate::path::{rect, FillRule};
    use glam::DVec2;

    fn v(x: f64, y: f64) -> DVec2 {
        DVec2::new(x, y)
    }

    fn walk(curves: Vec<Curve>) -> Vec<PathCommand> {
        Boundary::new(Arc::new(curves), None).collect()
    }

    #[test]
    fn test_empty_collection() {
        assert!(walk(Vec::new()).is_empty());
    }

    #[test]
    fn test_square_round_trip() {
        let curves = decompose(&rect(v(0.0, 0.0), v(2.0, 1.0)), FillRule::NonZero);
        let cmds = walk(curves);
        // MoveTo, the two verticals, the two synthesized horizontals
        // (one as LineTo, one folded into Close).
        assert!(matches!(cmds[0], PathCommand::MoveTo(_)));
        assert!(matches!(cmds.last(), Some(PathCommand::Close)));
        let lines = cmds
            .iter()
            .filter(|c| matches!(c, PathCommand::LineTo(_)))
            .count();
        assert_eq!(lines, 3);
        // Closed loop: commands trace a zero-gap cycle through the four
        // corners.
        let pts: Vec<DVec2> = cmds
            .iter()
            .filter_map(|c| match c {
                PathCommand::MoveTo(p) | PathCommand::LineTo(p) => Some(*p),
                _ => None,
            })
            .collect();
        assert_eq!(pts.len(), 4);
        for p in &pts {
            assert!(p.x == 0.0 || p.x == 2.0);
            assert!(p.y == 0.0 || p.y == 1.0);
        }
    }

    #[test]
    fn test_two_subpaths_each_closed() {
        let mut curves = decompose(&rect(v(0.0, 0.0), v(1.0, 1.0)), FillRule::NonZero);
        curves.extend(decompose(&rect(v(3.0, 0.0), v(4.0, 1.0)), FillRule::NonZero));
        let cmds = walk(curves);
        let closes = cmds
            .iter()
            .filter(|c| matches!(c, PathCommand::Close))
            .count();
        let moves = cmds
            .iter()
            .filter(|c| matches!(c, PathCommand::MoveTo(_)))
            .count();
        assert_eq!(closes, 2);
        assert_eq!(moves, 2);
    }

    #[test]
    fn test_transform_applied() {
        let curves = decompose(&rect(v(0.0, 0.0), v(1.0, 1.0)), FillRule::NonZero);
        let t = DAffine2::from_translation(v(10.0, 20.0));
        let cmds: Vec<_> = Boundary::new(Arc::new(curves), Some(t)).collect();
        match cmds[0] {
            PathCommand::MoveTo(p) => {
                assert!(p.x >= 10.0 && p.y >= 20.0);
            }
            ref other => panic!("expected MoveTo, got {other:?}"),
        }
    }
}
