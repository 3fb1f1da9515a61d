//! Adaptive flattening of curved path commands.
//!
//! [`Flattened`] wraps any `PathCommand` iterator and replaces quadratic
//! and cubic segments with polylines that stay within a given flatness
//! tolerance. Curves are halved with de Casteljau until either the
//! squared control-to-chord distance drops below the squared tolerance or
//! a recursion depth cap is reached. Pending right halves queue in a hold
//! buffer that grows at the front, so subdivision never recurses.

use crate::bezier::{cubic_flatness_sq, cubic_split, quadratic_flatness_sq, quadratic_split};
use crate::error::Error;
use crate::path::PathCommand;
use glam::DVec2;

/// Default recursion depth cap.
const DEFAULT_LIMIT: usize = 10;

/// Largest accepted recursion depth cap.
const MAX_LIMIT: usize = 64;

/// Initial hold buffer size, in points.
const HOLD_SIZE: usize = 7;

/// Front-growth increment, in points.
const GROW_SIZE: usize = 12;

/// Which curve type the hold buffer currently contains.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HoldKind {
    Quad,
    Cubic,
}

/// Iterator adapter that flattens curves to line segments.
///
/// Emits only `MoveTo`, `LineTo`, and `Close`. The depth cap is an escape
/// valve: once it is hit the current piece is emitted as a chord even if
/// it exceeds the tolerance, which also bounds the work done on
/// degenerate or non-finite control points.
#[derive(Debug, Clone)]
pub struct Flattened<I> {
    src: I,
    square_flat: f64,
    limit: usize,
    hold: Vec<DVec2>,
    hold_kind: HoldKind,
    hold_index: usize,
    hold_end: usize,
    levels: Vec<usize>,
    level_index: usize,
    cur: DVec2,
    mov: DVec2,
}

impl<I> Flattened<I>
where
    I: Iterator<Item = PathCommand>,
{
    /// Flattens `src` to the given tolerance with the default depth cap.
    pub fn new(src: I, flatness: f64) -> Result<Flattened<I>, Error> {
        Self::with_limit(src, flatness, DEFAULT_LIMIT)
    }

    /// Flattens `src` with an explicit recursion depth cap.
    pub fn with_limit(src: I, flatness: f64, limit: usize) -> Result<Flattened<I>, Error> {
        if !(flatness >= 0.0) {
            return Err(Error::InvalidFlatness(flatness));
        }
        if limit > MAX_LIMIT {
            return Err(Error::InvalidLimit {
                got: limit,
                max: MAX_LIMIT,
            });
        }
        Ok(Flattened {
            src,
            square_flat: flatness * flatness,
            limit,
            hold: vec![DVec2::ZERO; HOLD_SIZE],
            hold_kind: HoldKind::Quad,
            hold_index: 0,
            hold_end: 0,
            levels: vec![0; limit + 1],
            level_index: 0,
            cur: DVec2::ZERO,
            mov: DVec2::ZERO,
        })
    }

    /// Makes room for `want` points in front of `hold_index`, preserving
    /// the queued pieces.
    fn ensure_capacity(&mut self, want: usize) {
        if self.hold_index >= want {
            return;
        }
        let mut grown = vec![DVec2::ZERO; self.hold.len() + GROW_SIZE];
        grown[self.hold_index + GROW_SIZE..].copy_from_slice(&self.hold[self.hold_index..]);
        self.hold = grown;
        self.hold_index += GROW_SIZE;
        self.hold_end += GROW_SIZE;
    }

    /// Loads a fresh curve at the end of the hold buffer.
    fn load(&mut self, points: &[DVec2], kind: HoldKind) {
        let n = points.len();
        self.hold_index = self.hold.len() - n;
        self.hold_end = self.hold.len() - 1;
        self.hold[self.hold_index..].copy_from_slice(points);
        self.hold_kind = kind;
        self.level_index = 0;
        self.levels[0] = 0;
    }

    /// Subdivides the frontmost held piece until flat, emitting its chord.
    fn next_piece(&mut self) -> DVec2 {
        let mut i = self.hold_index;
        let mut level = self.levels[self.level_index];
        match self.hold_kind {
            HoldKind::Quad => {
                while level < self.limit
                    && quadratic_flatness_sq(self.hold[i], self.hold[i + 1], self.hold[i + 2])
                        >= self.square_flat
                {
                    self.ensure_capacity(2);
                    i = self.hold_index;
                    let (l, r) = quadratic_split(self.hold[i], self.hold[i + 1], self.hold[i + 2], 0.5);
                    self.hold[i - 2] = l[0];
                    self.hold[i - 1] = l[1];
                    self.hold[i] = l[2];
                    self.hold[i + 1] = r[1];
                    self.hold[i + 2] = r[2];
                    i -= 2;
                    self.hold_index = i;
                    level += 1;
                    self.levels[self.level_index] = level;
                    self.level_index += 1;
                    self.levels[self.level_index] = level;
                }
                self.hold_index = i + 2;
            }
            HoldKind::Cubic => {
                while level < self.limit
                    && cubic_flatness_sq(
                        self.hold[i],
                        self.hold[i + 1],
                        self.hold[i + 2],
                        self.hold[i + 3],
                    ) >= self.square_flat
                {
                    self.ensure_capacity(3);
                    i = self.hold_index;
                    let (l, r) = cubic_split(
                        self.hold[i],
                        self.hold[i + 1],
                        self.hold[i + 2],
                        self.hold[i + 3],
                        0.5,
                    );
                    self.hold[i - 3] = l[0];
                    self.hold[i - 2] = l[1];
                    self.hold[i - 1] = l[2];
                    self.hold[i] = l[3];
                    self.hold[i + 1] = r[1];
                    self.hold[i + 2] = r[2];
                    self.hold[i + 3] = r[3];
                    i -= 3;
                    self.hold_index = i;
                    level += 1;
                    self.levels[self.level_index] = level;
                    self.level_index += 1;
                    self.levels[self.level_index] = level;
                }
                self.hold_index = i + 3;
            }
        }
        self.level_index = self.level_index.saturating_sub(1);
        self.hold[self.hold_index]
    }
}

impl<I> Iterator for Flattened<I>
where
    I: Iterator<Item = PathCommand>,
{
    type Item = PathCommand;

    fn next(&mut self) -> Option<PathCommand> {
        if self.hold_index >= self.hold_end {
            match self.src.next()? {
                PathCommand::MoveTo(p) => {
                    self.cur = p;
                    self.mov = p;
                    return Some(PathCommand::MoveTo(p));
                }
                PathCommand::LineTo(p) => {
                    self.cur = p;
                    return Some(PathCommand::LineTo(p));
                }
                PathCommand::Close => {
                    self.cur = self.mov;
                    return Some(PathCommand::Close);
                }
                PathCommand::QuadTo { control, to } => {
                    let start = self.cur;
                    self.cur = to;
                    self.load(&[start, control, to], HoldKind::Quad);
                }
                PathCommand::CubicTo {
                    control1,
                    control2,
                    to,
                } => {
                    let start = self.cur;
                    self.cur = to;
                    self.load(&[start, control1, control2, to], HoldKind::Cubic);
                }
            }
        }
        Some(PathCommand::LineTo(self.next_piece()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bezier::{cubic_point, point_segment_dist_sq, quadratic_point};
    use crate::path::{Path, PathBuilder};

    fn v(x: f64, y: f64) -> DVec2 {
        DVec2::new(x, y)
    }

    fn flatten(path: &Path, flatness: f64) -> Vec<PathCommand> {
        Flattened::new(path.commands().iter().copied(), flatness)
            .unwrap()
            .collect()
    }

    #[test]
    fn test_negative_flatness_rejected() {
        let path = Path::new();
        let err = Flattened::new(path.commands().iter().copied(), -1.0).err();
        assert_eq!(err, Some(Error::InvalidFlatness(-1.0)));
        let err = Flattened::new(path.commands().iter().copied(), f64::NAN).err();
        assert!(matches!(err, Some(Error::InvalidFlatness(_))));
    }

    #[test]
    fn test_excessive_limit_rejected() {
        let path = Path::new();
        let err = Flattened::with_limit(path.commands().iter().copied(), 0.1, 65).err();
        assert!(matches!(err, Some(Error::InvalidLimit { got: 65, .. })));
    }

    #[test]
    fn test_lines_pass_through() {
        let path = PathBuilder::new()
            .move_to(v(0.0, 0.0))
            .line_to(v(3.0, 4.0))
            .close()
            .build();
        let cmds = flatten(&path, 0.25);
        assert_eq!(
            cmds,
            vec![
                PathCommand::MoveTo(v(0.0, 0.0)),
                PathCommand::LineTo(v(3.0, 4.0)),
                PathCommand::Close,
            ]
        );
    }

    #[test]
    fn test_quad_within_tolerance() {
        let p0 = v(0.0, 0.0);
        let c = v(5.0, 10.0);
        let p1 = v(10.0, 0.0);
        let path = PathBuilder::new().move_to(p0).quad_to(c, p1).build();
        let flatness = 0.25;
        let cmds = flatten(&path, flatness);
        // Every curve point must lie within the tolerance of the polyline.
        let mut pts = vec![p0];
        for cmd in &cmds[1..] {
            match cmd {
                PathCommand::LineTo(p) => pts.push(*p),
                other => panic!("unexpected command {other:?}"),
            }
        }
        assert_eq!(*pts.last().unwrap(), p1);
        for i in 0..=100 {
            let t = i as f64 / 100.0;
            let q = quadratic_point(p0, c, p1, t);
            let d = pts
                .windows(2)
                .map(|w| point_segment_dist_sq(q, w[0], w[1]))
                .fold(f64::MAX, f64::min);
            assert!(d <= flatness * flatness + 1e-9, "t={t} d={d}");
        }
    }

    #[test]
    fn test_cubic_within_tolerance() {
        let p0 = v(0.0, 0.0);
        let c0 = v(0.0, 10.0);
        let c1 = v(10.0, 10.0);
        let p1 = v(10.0, 0.0);
        let path = PathBuilder::new().move_to(p0).cubic_to(c0, c1, p1).build();
        let flatness = 0.1;
        let cmds = flatten(&path, flatness);
        let mut pts = vec![p0];
        for cmd in &cmds[1..] {
            match cmd {
                PathCommand::LineTo(p) => pts.push(*p),
                other => panic!("unexpected command {other:?}"),
            }
        }
        assert_eq!(*pts.last().unwrap(), p1);
        for i in 0..=100 {
            let t = i as f64 / 100.0;
            let q = cubic_point(p0, c0, c1, p1, t);
            let d = pts
                .windows(2)
                .map(|w| point_segment_dist_sq(q, w[0], w[1]))
                .fold(f64::MAX, f64::min);
            assert!(d <= flatness * flatness + 1e-9, "t={t} d={d}");
        }
    }

    #[test]
    fn test_depth_cap_bounds_output() {
        let path = PathBuilder::new()
            .move_to(v(0.0, 0.0))
            .cubic_to(v(0.0, 1000.0), v(1000.0, 1000.0), v(1000.0, 0.0))
            .build();
        // Limit 2 allows at most 4 pieces per curve.
        let cmds: Vec<_> = Flattened::with_limit(path.commands().iter().copied(), 1e-9, 2)
            .unwrap()
            .collect();
        let lines = cmds
            .iter()
            .filter(|c| matches!(c, PathCommand::LineTo(_)))
            .count();
        assert_eq!(lines, 4);
    }

    #[test]
    fn test_limit_zero_emits_chords() {
        let path = PathBuilder::new()
            .move_to(v(0.0, 0.0))
            .quad_to(v(50.0, 100.0), v(100.0, 0.0))
            .build();
        let cmds: Vec<_> = Flattened::with_limit(path.commands().iter().copied(), 0.01, 0)
            .unwrap()
            .collect();
        assert_eq!(
            cmds,
            vec![
                PathCommand::MoveTo(v(0.0, 0.0)),
                PathCommand::LineTo(v(100.0, 0.0)),
            ]
        );
    }

    #[test]
    fn test_non_finite_controls_terminate() {
        let path = PathBuilder::new()
            .move_to(v(0.0, 0.0))
            .quad_to(v(f64::NAN, f64::NAN), v(1.0, 0.0))
            .build();
        // The depth cap guarantees termination; output length is bounded
        // by 2^limit pieces.
        let cmds = flatten(&path, 0.1);
        assert!(cmds.len() <= 1 + (1 << DEFAULT_LIMIT));
    }
}
