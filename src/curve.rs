//! Monotone curve primitive for the boolean sweep.
//!
//! A [`Curve`] is one y-monotone piece of a line, quadratic, or cubic
//! Bezier segment, stored top-first (smallest y at `p0`) with a [`Dir`]
//! flag recording the original traversal direction. Order-0 curves mark
//! subpath starts. The sweep relies on monotonicity: `x_for_y` is
//! single-valued, and two curves can be ordered horizontally over any
//! y-range that contains none of their crossings.

use crate::bezier::{
    cubic_point, cubic_split, cubic_tangent, quadratic_point, quadratic_split, quadratic_tangent,
};
use crate::path::PathCommand;
use glam::DVec2;
use std::cmp::Ordering;

/// Traversal direction of a curve with respect to increasing y.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Dir {
    /// Traversed with increasing y.
    Up,
    /// Traversed with decreasing y.
    Down,
}

impl Dir {
    /// Winding contribution: +1 for increasing y, -1 for decreasing.
    pub fn sign(self) -> i32 {
        match self {
            Dir::Up => 1,
            Dir::Down => -1,
        }
    }

}

/// One y-monotone curve piece, stored top-first.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Curve {
    /// Subpath start marker (order 0).
    Move(DVec2),
    /// Line segment (order 1).
    Line { p0: DVec2, p1: DVec2, dir: Dir },
    /// Quadratic piece (order 2), no interior horizontal tangent.
    Quad {
        p0: DVec2,
        c: DVec2,
        p1: DVec2,
        dir: Dir,
    },
    /// Cubic piece (order 3), no interior horizontal tangent.
    Cubic {
        p0: DVec2,
        c0: DVec2,
        c1: DVec2,
        p1: DVec2,
        dir: Dir,
    },
}

impl Curve {
    /// Builds a line curve, normalizing to top-first storage.
    ///
    /// Returns `None` for horizontal or zero-length segments: they do not
    /// contribute crossings and the boundary walker re-synthesizes them.
    pub fn line(a: DVec2, b: DVec2) -> Option<Curve> {
        if a.y < b.y {
            Some(Curve::Line {
                p0: a,
                p1: b,
                dir: Dir::Up,
            })
        } else if a.y > b.y {
            Some(Curve::Line {
                p0: b,
                p1: a,
                dir: Dir::Down,
            })
        } else {
            None
        }
    }

    /// Builds a quadratic curve piece, normalizing to top-first storage.
    ///
    /// The piece must already be y-monotone. Returns `None` when the
    /// endpoints share a y (a horizontal monotone piece is degenerate).
    pub fn quad(p0: DVec2, c: DVec2, p1: DVec2) -> Option<Curve> {
        if p0.y < p1.y {
            Some(Curve::Quad {
                p0,
                c,
                p1,
                dir: Dir::Up,
            })
        } else if p0.y > p1.y {
            Some(Curve::Quad {
                p0: p1,
                c,
                p1: p0,
                dir: Dir::Down,
            })
        } else {
            None
        }
    }

    /// Builds a cubic curve piece, normalizing to top-first storage.
    ///
    /// The piece must already be y-monotone. Returns `None` when the
    /// endpoints share a y.
    pub fn cubic(p0: DVec2, c0: DVec2, c1: DVec2, p1: DVec2) -> Option<Curve> {
        if p0.y < p1.y {
            Some(Curve::Cubic {
                p0,
                c0,
                c1,
                p1,
                dir: Dir::Up,
            })
        } else if p0.y > p1.y {
            Some(Curve::Cubic {
                p0: p1,
                c0: c1,
                c1: c0,
                p1: p0,
                dir: Dir::Down,
            })
        } else {
            None
        }
    }

    pub fn order(&self) -> u8 {
        match self {
            Curve::Move(_) => 0,
            Curve::Line { .. } => 1,
            Curve::Quad { .. } => 2,
            Curve::Cubic { .. } => 3,
        }
    }

    pub fn dir(&self) -> Dir {
        match self {
            Curve::Move(_) => Dir::Up,
            Curve::Line { dir, .. } | Curve::Quad { dir, .. } | Curve::Cubic { dir, .. } => *dir,
        }
    }

    /// Top (smallest) y of the stored piece.
    pub fn y_top(&self) -> f64 {
        match self {
            Curve::Move(p) => p.y,
            Curve::Line { p0, .. } | Curve::Quad { p0, .. } | Curve::Cubic { p0, .. } => p0.y,
        }
    }

    /// Bottom (largest) y of the stored piece.
    pub fn y_bot(&self) -> f64 {
        match self {
            Curve::Move(p) => p.y,
            Curve::Line { p1, .. } | Curve::Quad { p1, .. } | Curve::Cubic { p1, .. } => p1.y,
        }
    }

    /// X at the top of the stored piece.
    pub fn x_top(&self) -> f64 {
        match self {
            Curve::Move(p) => p.x,
            Curve::Line { p0, .. } | Curve::Quad { p0, .. } | Curve::Cubic { p0, .. } => p0.x,
        }
    }

    /// X at the bottom of the stored piece.
    pub fn x_bot(&self) -> f64 {
        match self {
            Curve::Move(p) => p.x,
            Curve::Line { p1, .. } | Curve::Quad { p1, .. } | Curve::Cubic { p1, .. } => p1.x,
        }
    }

    /// Conservative minimum x over the piece (control hull).
    pub fn x_min(&self) -> f64 {
        match self {
            Curve::Move(p) => p.x,
            Curve::Line { p0, p1, .. } => p0.x.min(p1.x),
            Curve::Quad { p0, c, p1, .. } => p0.x.min(c.x).min(p1.x),
            Curve::Cubic { p0, c0, c1, p1, .. } => p0.x.min(c0.x).min(c1.x).min(p1.x),
        }
    }

    /// Conservative maximum x over the piece (control hull).
    pub fn x_max(&self) -> f64 {
        match self {
            Curve::Move(p) => p.x,
            Curve::Line { p0, p1, .. } => p0.x.max(p1.x),
            Curve::Quad { p0, c, p1, .. } => p0.x.max(c.x).max(p1.x),
            Curve::Cubic { p0, c0, c1, p1, .. } => p0.x.max(c0.x).max(c1.x).max(p1.x),
        }
    }

    /// Start point in traversal order.
    pub fn start_point(&self) -> DVec2 {
        match self.dir() {
            Dir::Up => self.top_point(),
            Dir::Down => self.bot_point(),
        }
    }

    /// End point in traversal order.
    pub fn end_point(&self) -> DVec2 {
        match self.dir() {
            Dir::Up => self.bot_point(),
            Dir::Down => self.top_point(),
        }
    }

    fn top_point(&self) -> DVec2 {
        match self {
            Curve::Move(p) => *p,
            Curve::Line { p0, .. } | Curve::Quad { p0, .. } | Curve::Cubic { p0, .. } => *p0,
        }
    }

    fn bot_point(&self) -> DVec2 {
        match self {
            Curve::Move(p) => *p,
            Curve::Line { p1, .. } | Curve::Quad { p1, .. } | Curve::Cubic { p1, .. } => *p1,
        }
    }

    /// Point at parameter `t` of the stored (top-first) piece.
    pub fn point_at(&self, t: f64) -> DVec2 {
        match self {
            Curve::Move(p) => *p,
            Curve::Line { p0, p1, .. } => p0.lerp(*p1, t),
            Curve::Quad { p0, c, p1, .. } => quadratic_point(*p0, *c, *p1, t),
            Curve::Cubic { p0, c0, c1, p1, .. } => cubic_point(*p0, *c0, *c1, *p1, t),
        }
    }

    fn dy_at(&self, t: f64) -> f64 {
        match self {
            Curve::Move(_) => 0.0,
            Curve::Line { p0, p1, .. } => p1.y - p0.y,
            Curve::Quad { p0, c, p1, .. } => quadratic_tangent(*p0, *c, *p1, t).y,
            Curve::Cubic { p0, c0, c1, p1, .. } => cubic_tangent(*p0, *c0, *c1, *p1, t).y,
        }
    }

    /// Parameter of the stored piece at height `y`, clamped to [0, 1].
    ///
    /// The piece is y-monotone, so a bisection bracket with Newton steps
    /// inside it converges unconditionally; this sidesteps the root
    /// classification of the closed cubic form.
    pub fn t_for_y(&self, y: f64) -> f64 {
        let y0 = self.y_top();
        let y1 = self.y_bot();
        if y <= y0 {
            return 0.0;
        }
        if y >= y1 {
            return 1.0;
        }
        if matches!(self, Curve::Move(_) | Curve::Line { .. }) {
            return (y - y0) / (y1 - y0);
        }
        let mut lo = 0.0f64;
        let mut hi = 1.0f64;
        let mut t = (y - y0) / (y1 - y0);
        for _ in 0..64 {
            let yt = self.point_at(t).y;
            if yt < y {
                lo = t;
            } else if yt > y {
                hi = t;
            } else {
                return t;
            }
            let dy = self.dy_at(t);
            let next = if dy != 0.0 { t - (yt - y) / dy } else { f64::NAN };
            t = if next > lo && next < hi {
                next
            } else {
                0.5 * (lo + hi)
            };
            if hi - lo <= f64::EPSILON * t.abs().max(1.0) {
                break;
            }
        }
        t
    }

    /// X at height `y`, clamping to the endpoints outside the y-span.
    pub fn x_for_y(&self, y: f64) -> f64 {
        match self {
            Curve::Move(p) => p.x,
            Curve::Line { p0, p1, .. } => {
                if p0.x == p1.x || y <= p0.y {
                    p0.x
                } else if y >= p1.y {
                    p1.x
                } else {
                    p0.x + (y - p0.y) * (p1.x - p0.x) / (p1.y - p0.y)
                }
            }
            _ => self.point_at(self.t_for_y(y)).x,
        }
    }

    /// Same geometry with the given traversal direction.
    pub fn with_direction(&self, dir: Dir) -> Curve {
        let mut c = *self;
        match &mut c {
            Curve::Move(_) => {}
            Curve::Line { dir: d, .. } | Curve::Quad { dir: d, .. } | Curve::Cubic { dir: d, .. } => {
                *d = dir
            }
        }
        c
    }

    /// The piece clipped to `[ystart, yend]`, traversed in `dir`.
    pub fn sub_curve(&self, ystart: f64, yend: f64, dir: Dir) -> Curve {
        match self {
            Curve::Move(p) => Curve::Move(*p),
            Curve::Line { .. } => {
                let a = DVec2::new(self.x_for_y(ystart), ystart);
                let b = DVec2::new(self.x_for_y(yend), yend);
                Curve::Line { p0: a, p1: b, dir }
            }
            Curve::Quad { p0, c, p1, .. } => {
                let t0 = self.t_for_y(ystart);
                let t1 = self.t_for_y(yend);
                let (_, rest) = quadratic_split(*p0, *c, *p1, t0);
                let tm = if t0 < 1.0 { (t1 - t0) / (1.0 - t0) } else { 0.0 };
                let (piece, _) = quadratic_split(rest[0], rest[1], rest[2], tm);
                Curve::Quad {
                    p0: piece[0],
                    c: piece[1],
                    p1: piece[2],
                    dir,
                }
            }
            Curve::Cubic { p0, c0, c1, p1, .. } => {
                let t0 = self.t_for_y(ystart);
                let t1 = self.t_for_y(yend);
                let (_, rest) = cubic_split(*p0, *c0, *c1, *p1, t0);
                let tm = if t0 < 1.0 { (t1 - t0) / (1.0 - t0) } else { 0.0 };
                let (piece, _) = cubic_split(rest[0], rest[1], rest[2], rest[3], tm);
                Curve::Cubic {
                    p0: piece[0],
                    c0: piece[1],
                    c1: piece[2],
                    p1: piece[3],
                    dir,
                }
            }
        }
    }

    /// The path command that draws this piece in traversal order.
    ///
    /// Order-0 markers become `MoveTo`; down-traversed curves reverse
    /// their control points.
    pub fn segment(&self) -> PathCommand {
        match *self {
            Curve::Move(p) => PathCommand::MoveTo(p),
            Curve::Line { p0, p1, dir } => PathCommand::LineTo(match dir {
                Dir::Up => p1,
                Dir::Down => p0,
            }),
            Curve::Quad { p0, c, p1, dir } => match dir {
                Dir::Up => PathCommand::QuadTo { control: c, to: p1 },
                Dir::Down => PathCommand::QuadTo { control: c, to: p0 },
            },
            Curve::Cubic { p0, c0, c1, p1, dir } => match dir {
                Dir::Up => PathCommand::CubicTo {
                    control1: c0,
                    control2: c1,
                    to: p1,
                },
                Dir::Down => PathCommand::CubicTo {
                    control1: c1,
                    control2: c0,
                    to: p0,
                },
            },
        }
    }

    /// Grows a min/max accumulator to cover the piece's control hull.
    pub fn enlarge(&self, min: &mut DVec2, max: &mut DVec2) {
        let mut add = |p: DVec2| {
            *min = min.min(p);
            *max = max.max(p);
        };
        match self {
            Curve::Move(p) => add(*p),
            Curve::Line { p0, p1, .. } => {
                add(*p0);
                add(*p1);
            }
            Curve::Quad { p0, c, p1, .. } => {
                add(*p0);
                add(*c);
                add(*p1);
            }
            Curve::Cubic { p0, c0, c1, p1, .. } => {
                add(*p0);
                add(*c0);
                add(*c1);
                add(*p1);
            }
        }
    }

    /// Orders this curve against `other` over `yrange`, shrinking
    /// `yrange[1]` so the returned order holds throughout the range.
    ///
    /// `Equal` means the curves coincide over the (possibly shrunk) range;
    /// the sweep feeds such pairs to its equivalence machinery so shared
    /// edges cancel instead of producing slivers.
    pub fn order_over(&self, other: &Curve, yrange: &mut [f64; 2]) -> Ordering {
        let y0 = yrange[0];
        let y1 = yrange[1].min(self.y_bot()).min(other.y_bot());
        debug_assert!(y1 > y0, "row ordering would backstep: {y0} -> {y1}");
        yrange[1] = y1;

        // Disjoint x hulls settle it without any evaluation. Touching
        // hulls that collapse to the same vertical line are coincident.
        if self.x_max() <= other.x_min() {
            if self.x_min() == other.x_max() {
                return Ordering::Equal;
            }
            return Ordering::Less;
        }
        if self.x_min() >= other.x_max() {
            return Ordering::Greater;
        }

        if fairly_close(self.x_for_y(y0), other.x_for_y(y0)) {
            if let Some(y) = self.coincident_prefix(other, y0, y1) {
                if y < y1 {
                    yrange[1] = y;
                }
                return Ordering::Equal;
            }
        }

        // Strict order just below the top of the range; clamp the range
        // above the first detected crossing so the order holds throughout.
        self.resolve_order(other, yrange)
    }

    /// Walks downward from `y0` while the two curves stay fairly close,
    /// returning the end of the coincident prefix, or `None` if the curves
    /// separate immediately.
    fn coincident_prefix(&self, other: &Curve, y0: f64, y1: f64) -> Option<f64> {
        let scale = y0.abs().max(y1.abs());
        let ymin = (scale * 1e-14).max(1e-300);
        let mut bump = ymin;
        let maxbump = (ymin * 1e13).min((y1 - y0) * 0.1);
        let mut y = y0 + bump;
        while y <= y1 {
            if fairly_close(self.x_for_y(y), other.x_for_y(y)) {
                bump *= 2.0;
                if bump > maxbump {
                    bump = maxbump;
                }
            } else {
                // Separated: back off and binary search the boundary of
                // the coincident prefix.
                y -= bump;
                loop {
                    bump /= 2.0;
                    let newy = y + bump;
                    if newy <= y {
                        break;
                    }
                    if fairly_close(self.x_for_y(newy), other.x_for_y(newy)) {
                        y = newy;
                    }
                }
                break;
            }
            y += bump;
        }
        if y > y0 {
            Some(y.min(y1))
        } else {
            None
        }
    }

    /// Probes the x order below `yrange[0]`, clamping `yrange[1]` above
    /// the first sign flip found.
    fn resolve_order(&self, other: &Curve, yrange: &mut [f64; 2]) -> Ordering {
        // Geometric probe spacing resolves crossings near the row top,
        // where shared endpoints make the order change quickly.
        const FRACTIONS: [f64; 7] = [
            1.0 / 256.0,
            1.0 / 64.0,
            1.0 / 16.0,
            1.0 / 4.0,
            1.0 / 2.0,
            3.0 / 4.0,
            1.0,
        ];
        let y0 = yrange[0];
        let h = yrange[1] - y0;
        let sign_at = |y: f64| -> i32 {
            let d = self.x_for_y(y) - other.x_for_y(y);
            if d < 0.0 {
                -1
            } else if d > 0.0 {
                1
            } else {
                0
            }
        };

        let mut s_ref = 0;
        let mut last_y = y0;
        for &f in &FRACTIONS {
            let y = y0 + h * f;
            let s = sign_at(y);
            if s != 0 {
                if s_ref == 0 {
                    s_ref = s;
                } else if s != s_ref {
                    // Crossing between last_y and y; bisect for the end of
                    // the consistently-ordered top portion.
                    let mut lo = last_y;
                    let mut hi = y;
                    for _ in 0..48 {
                        let mid = 0.5 * (lo + hi);
                        if mid <= lo || mid >= hi {
                            break;
                        }
                        if sign_at(mid) == s_ref {
                            lo = mid;
                        } else {
                            hi = mid;
                        }
                    }
                    if lo > y0 {
                        yrange[1] = lo;
                    }
                    break;
                }
            }
            last_y = y;
        }
        match s_ref {
            -1 => Ordering::Less,
            1 => Ordering::Greater,
            // Indistinguishable over the whole range.
            _ => Ordering::Equal,
        }
    }
}

/// Relative closeness used by the coincidence probe.
fn fairly_close(v1: f64, v2: f64) -> bool {
    v1 == v2 || (v1 - v2).abs() < v1.abs().max(v2.abs()) * 1e-10
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(x: f64, y: f64) -> DVec2 {
        DVec2::new(x, y)
    }

    #[test]
    fn test_line_normalization() {
        let up = Curve::line(v(0.0, 0.0), v(1.0, 2.0)).unwrap();
        assert_eq!(up.dir(), Dir::Up);
        assert_eq!(up.y_top(), 0.0);
        assert_eq!(up.y_bot(), 2.0);

        let down = Curve::line(v(1.0, 2.0), v(0.0, 0.0)).unwrap();
        assert_eq!(down.dir(), Dir::Down);
        assert_eq!(down.y_top(), 0.0);
        assert_eq!(down.start_point(), v(1.0, 2.0));
        assert_eq!(down.end_point(), v(0.0, 0.0));

        assert!(Curve::line(v(0.0, 1.0), v(5.0, 1.0)).is_none());
    }

    #[test]
    fn test_line_x_for_y() {
        let c = Curve::line(v(0.0, 0.0), v(4.0, 2.0)).unwrap();
        assert_eq!(c.x_for_y(0.0), 0.0);
        assert_eq!(c.x_for_y(1.0), 2.0);
        assert_eq!(c.x_for_y(2.0), 4.0);
        // Clamped outside the span
        assert_eq!(c.x_for_y(-1.0), 0.0);
        assert_eq!(c.x_for_y(3.0), 4.0);
    }

    #[test]
    fn test_quad_t_for_y_roundtrip() {
        // Monotone quad from (0,0) to (2,4)
        let c = Curve::quad(v(0.0, 0.0), v(2.0, 1.0), v(2.0, 4.0)).unwrap();
        for i in 0..=8 {
            let y = 4.0 * (i as f64) / 8.0;
            let t = c.t_for_y(y);
            assert!((c.point_at(t).y - y).abs() < 1e-9, "y={y} t={t}");
        }
    }

    #[test]
    fn test_cubic_t_for_y_roundtrip() {
        let c = Curve::cubic(v(0.0, 0.0), v(3.0, 1.0), v(-1.0, 3.0), v(1.0, 4.0)).unwrap();
        for i in 1..8 {
            let y = 4.0 * (i as f64) / 8.0;
            let t = c.t_for_y(y);
            assert!((c.point_at(t).y - y).abs() < 1e-9, "y={y} t={t}");
        }
    }

    #[test]
    fn test_sub_curve_endpoints() {
        let c = Curve::quad(v(0.0, 0.0), v(2.0, 2.0), v(0.0, 4.0)).unwrap();
        let s = c.sub_curve(1.0, 3.0, Dir::Up);
        assert!((s.y_top() - 1.0).abs() < 1e-9);
        assert!((s.y_bot() - 3.0).abs() < 1e-9);
        assert!((s.x_for_y(2.0) - c.x_for_y(2.0)).abs() < 1e-9);
    }

    #[test]
    fn test_order_over_disjoint() {
        let a = Curve::line(v(0.0, 0.0), v(0.0, 2.0)).unwrap();
        let b = Curve::line(v(5.0, 0.0), v(5.0, 2.0)).unwrap();
        let mut range = [0.0, 2.0];
        assert_eq!(a.order_over(&b, &mut range), Ordering::Less);
        assert_eq!(b.order_over(&a, &mut range), Ordering::Greater);
        assert_eq!(range, [0.0, 2.0]);
    }

    #[test]
    fn test_order_over_coincident_verticals() {
        let a = Curve::line(v(1.0, 0.0), v(1.0, 2.0)).unwrap();
        let b = Curve::line(v(1.0, 2.0), v(1.0, 0.0)).unwrap();
        let mut range = [0.0, 2.0];
        assert_eq!(a.order_over(&b, &mut range), Ordering::Equal);
    }

    #[test]
    fn test_order_over_crossing_shrinks_range() {
        // Two lines crossing at (1, 1)
        let a = Curve::line(v(0.0, 0.0), v(2.0, 2.0)).unwrap();
        let b = Curve::line(v(2.0, 0.0), v(0.0, 2.0)).unwrap();
        let mut range = [0.0, 2.0];
        let ord = a.order_over(&b, &mut range);
        assert_eq!(ord, Ordering::Less);
        assert!(range[1] <= 1.0 + 1e-6, "range not clamped: {:?}", range);
        assert!(range[1] > 0.0);
    }

    #[test]
    fn test_order_over_shared_top() {
        // Shared top vertex, diverging below
        let a = Curve::line(v(1.0, 0.0), v(0.0, 2.0)).unwrap();
        let b = Curve::line(v(1.0, 0.0), v(2.0, 2.0)).unwrap();
        let mut range = [0.0, 2.0];
        assert_eq!(a.order_over(&b, &mut range), Ordering::Less);
    }

    #[test]
    fn test_with_direction_and_segment_points() {
        let c = Curve::cubic(v(0.0, 0.0), v(1.0, 1.0), v(2.0, 3.0), v(3.0, 4.0)).unwrap();
        let r = c.with_direction(Dir::Down);
        assert_eq!(r.start_point(), v(3.0, 4.0));
        assert_eq!(r.end_point(), v(0.0, 0.0));
        // Geometry is unchanged
        assert_eq!(r.y_top(), c.y_top());
        assert_eq!(r.x_for_y(2.0), c.x_for_y(2.0));
    }

    #[test]
    fn test_enlarge_includes_controls() {
        let c = Curve::quad(v(0.0, 0.0), v(5.0, 1.0), v(1.0, 2.0)).unwrap();
        let mut min = v(f64::MAX, f64::MAX);
        let mut max = v(f64::MIN, f64::MIN);
        c.enlarge(&mut min, &mut max);
        assert_eq!(min, v(0.0, 0.0));
        assert_eq!(max, v(5.0, 2.0));
    }
}
