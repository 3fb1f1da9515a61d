//! Bezier curve utilities.
//!
//! Provides evaluation, subdivision, and root-finding helpers for quadratic
//! and cubic Bezier curves. These are the numeric building blocks shared by
//! the monotone decomposer, the boolean sweep, and the adaptive flattener.

use glam::DVec2;

/// Evaluates a quadratic Bezier curve at parameter `t`.
///
/// # Arguments
///
/// * `p0` - Start point
/// * `p1` - Control point
/// * `p2` - End point
/// * `t` - Parameter in [0, 1]
#[inline]
pub fn quadratic_point(p0: DVec2, p1: DVec2, p2: DVec2, t: f64) -> DVec2 {
    let mt = 1.0 - t;
    let mt2 = mt * mt;
    let t2 = t * t;
    p0 * mt2 + p1 * (2.0 * mt * t) + p2 * t2
}

/// Evaluates the tangent (derivative) of a quadratic Bezier curve at parameter `t`.
///
/// Returns the unnormalized tangent vector.
#[inline]
pub fn quadratic_tangent(p0: DVec2, p1: DVec2, p2: DVec2, t: f64) -> DVec2 {
    let mt = 1.0 - t;
    2.0 * mt * (p1 - p0) + 2.0 * t * (p2 - p1)
}

/// Evaluates a cubic Bezier curve at parameter `t`.
///
/// # Arguments
///
/// * `p0` - Start point
/// * `p1` - First control point
/// * `p2` - Second control point
/// * `p3` - End point
/// * `t` - Parameter in [0, 1]
#[inline]
pub fn cubic_point(p0: DVec2, p1: DVec2, p2: DVec2, p3: DVec2, t: f64) -> DVec2 {
    let mt = 1.0 - t;
    let mt2 = mt * mt;
    let mt3 = mt2 * mt;
    let t2 = t * t;
    let t3 = t2 * t;
    p0 * mt3 + p1 * (3.0 * mt2 * t) + p2 * (3.0 * mt * t2) + p3 * t3
}

/// Evaluates the tangent (derivative) of a cubic Bezier curve at parameter `t`.
///
/// Returns the unnormalized tangent vector.
#[inline]
pub fn cubic_tangent(p0: DVec2, p1: DVec2, p2: DVec2, p3: DVec2, t: f64) -> DVec2 {
    let mt = 1.0 - t;
    let mt2 = mt * mt;
    let t2 = t * t;
    3.0 * mt2 * (p1 - p0) + 6.0 * mt * t * (p2 - p1) + 3.0 * t2 * (p3 - p2)
}

/// Splits a quadratic Bezier curve at parameter `t` using de Casteljau's algorithm.
///
/// Returns two sets of control points: (left curve, right curve).
#[inline]
pub fn quadratic_split(p0: DVec2, p1: DVec2, p2: DVec2, t: f64) -> ([DVec2; 3], [DVec2; 3]) {
    let p01 = p0.lerp(p1, t);
    let p12 = p1.lerp(p2, t);
    let p012 = p01.lerp(p12, t);

    ([p0, p01, p012], [p012, p12, p2])
}

/// Splits a cubic Bezier curve at parameter `t` using de Casteljau's algorithm.
///
/// Returns two sets of control points: (left curve, right curve).
#[inline]
pub fn cubic_split(p0: DVec2, p1: DVec2, p2: DVec2, p3: DVec2, t: f64) -> ([DVec2; 4], [DVec2; 4]) {
    let p01 = p0.lerp(p1, t);
    let p12 = p1.lerp(p2, t);
    let p23 = p2.lerp(p3, t);
    let p012 = p01.lerp(p12, t);
    let p123 = p12.lerp(p23, t);
    let p0123 = p012.lerp(p123, t);

    ([p0, p01, p012, p0123], [p0123, p123, p23, p3])
}

/// Solves `a*t^2 + b*t + c = 0`, returning the real roots.
///
/// Degrades gracefully to the linear solution when `a` vanishes. The roots
/// are computed with the sign-aware quotient form to avoid cancellation when
/// `b*b >> a*c`.
pub fn solve_quadratic(a: f64, b: f64, c: f64) -> ([f64; 2], usize) {
    let mut roots = [0.0; 2];
    if a == 0.0 {
        if b == 0.0 {
            return (roots, 0);
        }
        roots[0] = -c / b;
        return (roots, 1);
    }
    let disc = b * b - 4.0 * a * c;
    if disc < 0.0 {
        return (roots, 0);
    }
    let mut d = disc.sqrt();
    if b < 0.0 {
        d = -d;
    }
    let q = -0.5 * (b + d);
    let mut n = 0;
    roots[n] = q / a;
    n += 1;
    if q != 0.0 {
        roots[n] = c / q;
        n += 1;
    }
    (roots, n)
}

/// Squared distance from `point` to the segment `a`-`b`.
///
/// Used as the flatness metric: the flattener compares this against the
/// squared tolerance to avoid taking square roots.
pub fn point_segment_dist_sq(point: DVec2, a: DVec2, b: DVec2) -> f64 {
    let ab = b - a;
    let len_sq = ab.length_squared();

    if len_sq == 0.0 {
        return (point - a).length_squared();
    }

    let t = ((point - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    let projection = a + ab * t;

    (point - projection).length_squared()
}

/// Squared flatness of a quadratic curve: deviation of the control point
/// from the chord.
#[inline]
pub fn quadratic_flatness_sq(p0: DVec2, p1: DVec2, p2: DVec2) -> f64 {
    point_segment_dist_sq(p1, p0, p2)
}

/// Squared flatness of a cubic curve: the larger control-point deviation
/// from the chord.
#[inline]
pub fn cubic_flatness_sq(p0: DVec2, p1: DVec2, p2: DVec2, p3: DVec2) -> f64 {
    point_segment_dist_sq(p1, p0, p3).max(point_segment_dist_sq(p2, p0, p3))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quadratic_endpoints() {
        let p0 = DVec2::ZERO;
        let p1 = DVec2::new(0.5, 1.0);
        let p2 = DVec2::X;

        let start = quadratic_point(p0, p1, p2, 0.0);
        let end = quadratic_point(p0, p1, p2, 1.0);

        assert!((start - p0).length() < 1e-12);
        assert!((end - p2).length() < 1e-12);
    }

    #[test]
    fn test_cubic_endpoints() {
        let p0 = DVec2::ZERO;
        let p1 = DVec2::new(0.25, 1.0);
        let p2 = DVec2::new(0.75, 1.0);
        let p3 = DVec2::X;

        let start = cubic_point(p0, p1, p2, p3, 0.0);
        let end = cubic_point(p0, p1, p2, p3, 1.0);

        assert!((start - p0).length() < 1e-12);
        assert!((end - p3).length() < 1e-12);
    }

    #[test]
    fn test_cubic_split_continuity() {
        let p0 = DVec2::ZERO;
        let p1 = DVec2::new(0.25, 1.0);
        let p2 = DVec2::new(0.75, 1.0);
        let p3 = DVec2::X;

        let (left, right) = cubic_split(p0, p1, p2, p3, 0.5);

        // Left curve should end where right curve starts
        assert!((left[3] - right[0]).length() < 1e-12);

        // Point at split should match original curve
        let original_mid = cubic_point(p0, p1, p2, p3, 0.5);
        assert!((left[3] - original_mid).length() < 1e-12);
    }

    #[test]
    fn test_quadratic_split_on_curve() {
        let p0 = DVec2::ZERO;
        let p1 = DVec2::new(1.0, 2.0);
        let p2 = DVec2::new(2.0, 0.0);

        let (left, right) = quadratic_split(p0, p1, p2, 0.25);
        let expected = quadratic_point(p0, p1, p2, 0.25);

        assert!((left[2] - expected).length() < 1e-12);
        assert!((right[0] - expected).length() < 1e-12);
    }

    #[test]
    fn test_solve_quadratic_two_roots() {
        // (t - 1)(t - 3) = t^2 - 4t + 3
        let (roots, n) = solve_quadratic(1.0, -4.0, 3.0);
        assert_eq!(n, 2);
        let mut r = [roots[0], roots[1]];
        r.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert!((r[0] - 1.0).abs() < 1e-12);
        assert!((r[1] - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_solve_quadratic_linear() {
        let (roots, n) = solve_quadratic(0.0, 2.0, -1.0);
        assert_eq!(n, 1);
        assert!((roots[0] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_solve_quadratic_no_roots() {
        let (_, n) = solve_quadratic(1.0, 0.0, 1.0);
        assert_eq!(n, 0);
    }

    #[test]
    fn test_point_segment_dist_sq() {
        let a = DVec2::ZERO;
        let b = DVec2::new(10.0, 0.0);

        // Above the middle
        assert!((point_segment_dist_sq(DVec2::new(5.0, 3.0), a, b) - 9.0).abs() < 1e-12);
        // Past the end, distance is to the endpoint
        assert!((point_segment_dist_sq(DVec2::new(13.0, 4.0), a, b) - 25.0).abs() < 1e-12);
        // Degenerate segment
        assert!((point_segment_dist_sq(DVec2::new(3.0, 4.0), a, a) - 25.0).abs() < 1e-12);
    }

    #[test]
    fn test_flatness_of_straight_controls() {
        let p0 = DVec2::ZERO;
        let p3 = DVec2::new(3.0, 0.0);
        // Control points on the chord: perfectly flat
        assert!(cubic_flatness_sq(p0, DVec2::new(1.0, 0.0), DVec2::new(2.0, 0.0), p3) < 1e-15);
        assert!(quadratic_flatness_sq(p0, DVec2::new(1.5, 0.0), p3) < 1e-15);
    }
}
