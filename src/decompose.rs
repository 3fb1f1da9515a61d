//! Path decomposition into y-monotone curves.
//!
//! Each path command is split at its interior horizontal tangents so the
//! resulting pieces are y-monotone, then normalized to top-first storage.
//! Horizontal lines and degenerate pieces are dropped; unclosed subpaths
//! receive a synthetic closing line. The decomposed list is then swept
//! once under the path's fill rule to produce a canonical boundary.

use crate::bezier::{cubic_split, quadratic_split, solve_quadratic};
use crate::curve::Curve;
use crate::path::{FillRule, Path, PathCommand};
use crate::sweep::{self, Classifier};
use glam::DVec2;

/// Converts a path into the canonical curve list used by the sweep.
///
/// The output is wind-normalized: every resulting curve direction follows
/// the non-zero convention regardless of the input fill rule or subpath
/// orientations.
pub(crate) fn decompose(path: &Path, rule: FillRule) -> Vec<Curve> {
    let mut curves = Vec::new();
    let mut start = DVec2::ZERO;
    let mut cur = DVec2::ZERO;
    let mut open = false;
    for cmd in path.commands() {
        match *cmd {
            PathCommand::MoveTo(p) => {
                if open && cur != start {
                    insert_line(&mut curves, cur, start);
                }
                curves.push(Curve::Move(p));
                start = p;
                cur = p;
                open = true;
            }
            PathCommand::LineTo(p) => {
                open_at(&mut curves, &mut start, cur, &mut open);
                insert_line(&mut curves, cur, p);
                cur = p;
            }
            PathCommand::QuadTo { control, to } => {
                open_at(&mut curves, &mut start, cur, &mut open);
                insert_quad(&mut curves, cur, control, to);
                cur = to;
            }
            PathCommand::CubicTo {
                control1,
                control2,
                to,
            } => {
                open_at(&mut curves, &mut start, cur, &mut open);
                insert_cubic(&mut curves, cur, control1, control2, to);
                cur = to;
            }
            PathCommand::Close => {
                if open && cur != start {
                    insert_line(&mut curves, cur, start);
                }
                cur = start;
            }
        }
    }
    if open && cur != start {
        insert_line(&mut curves, cur, start);
    }
    sweep::calculate(Classifier::for_fill(rule), &curves, &[])
}

/// Starts an implicit subpath when a drawing command arrives before any
/// `MoveTo`.
fn open_at(curves: &mut Vec<Curve>, start: &mut DVec2, cur: DVec2, open: &mut bool) {
    if !*open {
        curves.push(Curve::Move(cur));
        *start = cur;
        *open = true;
    }
}

fn insert_line(curves: &mut Vec<Curve>, a: DVec2, b: DVec2) {
    if let Some(c) = Curve::line(a, b) {
        curves.push(c);
    }
}

fn insert_quad(curves: &mut Vec<Curve>, p0: DVec2, c: DVec2, p1: DVec2) {
    if p0.y == c.y && c.y == p1.y {
        return;
    }
    if let Some(t) = quad_horizontal_param(p0.y, c.y, p1.y) {
        let (left, right) = quadratic_split(p0, c, p1, t);
        push_quad(curves, left);
        push_quad(curves, right);
    } else {
        push_quad(curves, [p0, c, p1]);
    }
}

fn push_quad(curves: &mut Vec<Curve>, q: [DVec2; 3]) {
    if let Some(c) = Curve::quad(q[0], q[1], q[2]) {
        curves.push(c);
    }
}

fn insert_cubic(curves: &mut Vec<Curve>, p0: DVec2, c0: DVec2, c1: DVec2, p1: DVec2) {
    if p0.y == c0.y && c0.y == c1.y && c1.y == p1.y {
        return;
    }
    let mut params = [0.0f64; 2];
    let n = cubic_horizontal_params(p0.y, c0.y, c1.y, p1.y, &mut params);
    let mut rest = [p0, c0, c1, p1];
    let mut prev = 0.0;
    for &t in &params[..n] {
        // Remap into the remaining tail after earlier splits
        let local = (t - prev) / (1.0 - prev);
        let (head, tail) = cubic_split(rest[0], rest[1], rest[2], rest[3], local);
        push_cubic(curves, head);
        rest = tail;
        prev = t;
    }
    push_cubic(curves, rest);
}

fn push_cubic(curves: &mut Vec<Curve>, q: [DVec2; 4]) {
    if let Some(c) = Curve::cubic(q[0], q[1], q[2], q[3]) {
        curves.push(c);
    }
}

/// Interior parameter where a quadratic's y derivative vanishes, if any.
fn quad_horizontal_param(y0: f64, cy: f64, y1: f64) -> Option<f64> {
    if y0 <= cy && cy <= y1 {
        return None;
    }
    let c0 = y0 - cy;
    let c1 = y1 - cy;
    let denom = c0 + c1;
    if denom == 0.0 {
        return None;
    }
    let t = c0 / denom;
    if t > 0.0 && t < 1.0 {
        Some(t)
    } else {
        None
    }
}

/// Interior parameters where a cubic's y derivative vanishes, sorted.
fn cubic_horizontal_params(y0: f64, cy0: f64, cy1: f64, y1: f64, out: &mut [f64; 2]) -> usize {
    // Derivative control values
    let d0 = cy0 - y0;
    let d1 = cy1 - cy0;
    let d2 = y1 - cy1;
    if d0 >= 0.0 && d1 >= 0.0 && d2 >= 0.0 {
        return 0;
    }
    if d0 <= 0.0 && d1 <= 0.0 && d2 <= 0.0 {
        return 0;
    }
    let a = d0 - 2.0 * d1 + d2;
    let b = 2.0 * (d1 - d0);
    let (roots, n) = solve_quadratic(a, b, d0);
    let mut m = 0;
    for &t in &roots[..n] {
        if t > 0.0 && t < 1.0 {
            out[m] = t;
            m += 1;
        }
    }
    if m == 2 && out[0] > out[1] {
        out.swap(0, 1);
    }
    m
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::Dir;
    use crate::path::{rect, PathBuilder};

    fn v(x: f64, y: f64) -> DVec2 {
        DVec2::new(x, y)
    }

    #[test]
    fn test_quad_horizontal_param() {
        // Monotone: control y between endpoints
        assert!(quad_horizontal_param(0.0, 1.0, 2.0).is_none());
        // Bulge above: y goes 0 -> -? -> 2 with control at -2
        let t = quad_horizontal_param(0.0, -2.0, 2.0).unwrap();
        assert!(t > 0.0 && t < 1.0);
        // Tangent vanishes there: y'(t) = 2((1-t)(cy-y0) + t(y1-cy))
        let dy = 2.0 * ((1.0 - t) * -2.0 + t * 4.0);
        assert!(dy.abs() < 1e-12);
    }

    #[test]
    fn test_cubic_horizontal_params_s_curve() {
        // Rises, dips, rises again: two interior tangents
        let mut out = [0.0; 2];
        let n = cubic_horizontal_params(0.0, 3.0, -2.0, 1.0, &mut out);
        assert_eq!(n, 2);
        assert!(out[0] < out[1]);
        for &t in &out {
            let d0 = 3.0;
            let d1 = -5.0;
            let d2 = 3.0;
            let dy = (1.0 - t) * (1.0 - t) * d0 + 2.0 * t * (1.0 - t) * d1 + t * t * d2;
            assert!(dy.abs() < 1e-9, "t={t} dy={dy}");
        }
    }

    #[test]
    fn test_rect_decomposes_to_verticals() {
        let path = rect(v(0.0, 0.0), v(2.0, 1.0));
        let curves = decompose(&path, FillRule::NonZero);
        // One subpath marker plus the two vertical edges; horizontals drop.
        assert_eq!(curves.len(), 3);
        assert_eq!(curves[0].order(), 0);
        let lines: Vec<_> = curves[1..].iter().collect();
        assert!(lines.iter().all(|c| c.order() == 1));
        assert!(lines.iter().all(|c| c.x_top() == c.x_bot()));
        let mut xs: Vec<f64> = lines.iter().map(|c| c.x_top()).collect();
        xs.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_eq!(xs, vec![0.0, 2.0]);
    }

    #[test]
    fn test_normalized_directions() {
        let path = rect(v(0.0, 0.0), v(1.0, 1.0));
        let curves = decompose(&path, FillRule::NonZero);
        // Left edge traverses down-to-up, right edge up-to-down, so the
        // interior winds +1 under the non-zero rule.
        let mut up_x = None;
        let mut down_x = None;
        for c in curves.iter().filter(|c| c.order() == 1) {
            match c.dir() {
                Dir::Up => up_x = Some(c.x_top()),
                Dir::Down => down_x = Some(c.x_top()),
            }
        }
        let (up_x, down_x) = (up_x.unwrap(), down_x.unwrap());
        assert!(up_x < down_x, "winding normalization flipped: {up_x} {down_x}");
    }

    #[test]
    fn test_unclosed_subpath_gets_closing_line() {
        let path = PathBuilder::new()
            .move_to(v(0.0, 0.0))
            .line_to(v(1.0, 0.0))
            .line_to(v(1.0, 1.0))
            .build();
        let curves = decompose(&path, FillRule::NonZero);
        // Triangle: marker plus the two non-horizontal edges (the implied
        // closing line is the diagonal back to the start).
        assert_eq!(
            curves.iter().filter(|c| c.order() == 1).count(),
            2,
            "{curves:?}"
        );
    }

    #[test]
    fn test_even_odd_hole() {
        // Two concentric same-direction squares; even-odd leaves a hole.
        let mut path = rect(v(0.0, 0.0), v(4.0, 4.0));
        path.extend(&rect(v(1.0, 1.0), v(3.0, 3.0)));
        let curves = decompose(&path, FillRule::EvenOdd);
        // Two subpaths survive: outer ring and inner hole.
        assert_eq!(curves.iter().filter(|c| c.order() == 0).count(), 2);
    }

    #[test]
    fn test_nonzero_same_direction_merges() {
        // Same shape under non-zero fills solid: inner square vanishes.
        let mut path = rect(v(0.0, 0.0), v(4.0, 4.0));
        path.extend(&rect(v(1.0, 1.0), v(3.0, 3.0)));
        let curves = decompose(&path, FillRule::NonZero);
        assert_eq!(curves.iter().filter(|c| c.order() == 0).count(), 1);
    }

    #[test]
    fn test_horizontal_only_path_is_empty() {
        let path = PathBuilder::new()
            .move_to(v(0.0, 0.0))
            .line_to(v(5.0, 0.0))
            .close()
            .build();
        assert!(decompose(&path, FillRule::NonZero).is_empty());
    }
}
