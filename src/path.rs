//! 2D path representation and building.

use glam::DVec2;
use std::f64::consts::TAU;

/// Winding rule used to decide which points a path encloses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FillRule {
    /// Inside iff the signed crossing count is nonzero.
    #[default]
    NonZero,
    /// Inside iff the crossing count is odd.
    EvenOdd,
}

/// A path command in an SVG-like path.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PathCommand {
    /// Move to a point without drawing.
    MoveTo(DVec2),
    /// Draw a line to a point.
    LineTo(DVec2),
    /// Quadratic bezier curve to a point with one control point.
    QuadTo { control: DVec2, to: DVec2 },
    /// Cubic bezier curve to a point with two control points.
    CubicTo {
        control1: DVec2,
        control2: DVec2,
        to: DVec2,
    },
    /// Close the current subpath by drawing a line to the start.
    Close,
}

/// A 2D path consisting of path commands.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Path {
    commands: Vec<PathCommand>,
}

impl Path {
    /// Creates an empty path.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the path commands.
    pub fn commands(&self) -> &[PathCommand] {
        &self.commands
    }

    /// Returns true if the path is empty.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Returns the number of commands.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Appends commands from another path.
    pub fn extend(&mut self, other: &Path) {
        self.commands.extend_from_slice(&other.commands);
    }

    /// Appends a single command.
    pub fn push(&mut self, cmd: PathCommand) {
        self.commands.push(cmd);
    }

    /// Transforms all points in the path.
    pub fn transform(&mut self, f: impl Fn(DVec2) -> DVec2) {
        for cmd in &mut self.commands {
            match cmd {
                PathCommand::MoveTo(p) => *p = f(*p),
                PathCommand::LineTo(p) => *p = f(*p),
                PathCommand::QuadTo { control, to } => {
                    *control = f(*control);
                    *to = f(*to);
                }
                PathCommand::CubicTo {
                    control1,
                    control2,
                    to,
                } => {
                    *control1 = f(*control1);
                    *control2 = f(*control2);
                    *to = f(*to);
                }
                PathCommand::Close => {}
            }
        }
    }

    /// Translates the path by an offset.
    pub fn translate(&mut self, offset: DVec2) {
        self.transform(|p| p + offset);
    }

    /// Scales the path by a factor.
    pub fn scale(&mut self, factor: f64) {
        self.transform(|p| p * factor);
    }

    /// Scales the path non-uniformly.
    pub fn scale_xy(&mut self, sx: f64, sy: f64) {
        self.transform(|p| DVec2::new(p.x * sx, p.y * sy));
    }

    /// Rotates the path around the origin.
    pub fn rotate(&mut self, angle: f64) {
        let cos = angle.cos();
        let sin = angle.sin();
        self.transform(|p| DVec2::new(p.x * cos - p.y * sin, p.x * sin + p.y * cos));
    }
}

impl FromIterator<PathCommand> for Path {
    fn from_iter<T: IntoIterator<Item = PathCommand>>(iter: T) -> Self {
        Path {
            commands: iter.into_iter().collect(),
        }
    }
}

/// Builder for constructing paths.
#[derive(Debug, Clone, Default)]
pub struct PathBuilder {
    path: Path,
    current: DVec2,
    start: DVec2,
}

impl PathBuilder {
    /// Creates a new path builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves to a point without drawing.
    pub fn move_to(mut self, to: DVec2) -> Self {
        self.path.commands.push(PathCommand::MoveTo(to));
        self.current = to;
        self.start = to;
        self
    }

    /// Draws a line to a point.
    pub fn line_to(mut self, to: DVec2) -> Self {
        self.path.commands.push(PathCommand::LineTo(to));
        self.current = to;
        self
    }

    /// Draws a quadratic bezier curve.
    pub fn quad_to(mut self, control: DVec2, to: DVec2) -> Self {
        self.path.commands.push(PathCommand::QuadTo { control, to });
        self.current = to;
        self
    }

    /// Draws a cubic bezier curve.
    pub fn cubic_to(mut self, control1: DVec2, control2: DVec2, to: DVec2) -> Self {
        self.path.commands.push(PathCommand::CubicTo {
            control1,
            control2,
            to,
        });
        self.current = to;
        self
    }

    /// Closes the current subpath.
    pub fn close(mut self) -> Self {
        self.path.commands.push(PathCommand::Close);
        self.current = self.start;
        self
    }

    /// Draws a horizontal line.
    pub fn h_line_to(self, x: f64) -> Self {
        let y = self.current.y;
        self.line_to(DVec2::new(x, y))
    }

    /// Draws a vertical line.
    pub fn v_line_to(self, y: f64) -> Self {
        let x = self.current.x;
        self.line_to(DVec2::new(x, y))
    }

    /// Draws a line relative to current position.
    pub fn line_by(self, delta: DVec2) -> Self {
        let to = self.current + delta;
        self.line_to(to)
    }

    /// Builds the final path.
    pub fn build(self) -> Path {
        self.path
    }
}

// Path primitives

/// Creates a line segment.
pub fn line(from: DVec2, to: DVec2) -> Path {
    PathBuilder::new().move_to(from).line_to(to).build()
}

/// Creates a polyline (connected line segments).
pub fn polyline(points: &[DVec2]) -> Path {
    if points.is_empty() {
        return Path::new();
    }

    let mut builder = PathBuilder::new().move_to(points[0]);
    for &p in &points[1..] {
        builder = builder.line_to(p);
    }
    builder.build()
}

/// Creates a closed polygon.
pub fn polygon(points: &[DVec2]) -> Path {
    if points.is_empty() {
        return Path::new();
    }

    let mut builder = PathBuilder::new().move_to(points[0]);
    for &p in &points[1..] {
        builder = builder.line_to(p);
    }
    builder.close().build()
}

/// Creates a rectangle.
pub fn rect(min: DVec2, max: DVec2) -> Path {
    PathBuilder::new()
        .move_to(min)
        .line_to(DVec2::new(max.x, min.y))
        .line_to(max)
        .line_to(DVec2::new(min.x, max.y))
        .close()
        .build()
}

/// Creates a rectangle centered at a point.
pub fn rect_centered(center: DVec2, size: DVec2) -> Path {
    let half = size * 0.5;
    rect(center - half, center + half)
}

// Magic number for circular arc approximation with cubics
// k = 4/3 * tan(π/8) ≈ 0.5522847498
const K: f64 = 0.552_284_749_830_793_4;

/// Creates a circle approximated with cubic beziers.
///
/// Uses 4 cubic bezier curves for a good approximation.
pub fn circle(center: DVec2, radius: f64) -> Path {
    let r = radius;
    let c = center;
    let k = K * r;

    PathBuilder::new()
        .move_to(DVec2::new(c.x + r, c.y))
        .cubic_to(
            DVec2::new(c.x + r, c.y + k),
            DVec2::new(c.x + k, c.y + r),
            DVec2::new(c.x, c.y + r),
        )
        .cubic_to(
            DVec2::new(c.x - k, c.y + r),
            DVec2::new(c.x - r, c.y + k),
            DVec2::new(c.x - r, c.y),
        )
        .cubic_to(
            DVec2::new(c.x - r, c.y - k),
            DVec2::new(c.x - k, c.y - r),
            DVec2::new(c.x, c.y - r),
        )
        .cubic_to(
            DVec2::new(c.x + k, c.y - r),
            DVec2::new(c.x + r, c.y - k),
            DVec2::new(c.x + r, c.y),
        )
        .close()
        .build()
}

/// Creates an ellipse.
pub fn ellipse(center: DVec2, radii: DVec2) -> Path {
    let mut path = circle(DVec2::ZERO, 1.0);
    path.scale_xy(radii.x, radii.y);
    path.translate(center);
    path
}

/// Creates a regular polygon with n sides.
pub fn regular_polygon(center: DVec2, radius: f64, sides: u32) -> Path {
    if sides < 3 {
        return Path::new();
    }

    let mut points = Vec::with_capacity(sides as usize);
    for i in 0..sides {
        let angle = TAU * (i as f64) / (sides as f64) - TAU / 4.0; // Start at top
        points.push(center + DVec2::new(angle.cos(), angle.sin()) * radius);
    }
    polygon(&points)
}

/// Creates a rounded rectangle.
pub fn rounded_rect(min: DVec2, max: DVec2, radius: f64) -> Path {
    let r = radius.min((max.x - min.x) / 2.0).min((max.y - min.y) / 2.0);

    if r <= 0.0 {
        return rect(min, max);
    }

    let k = K * r;

    PathBuilder::new()
        // Start at top-left, after corner
        .move_to(DVec2::new(min.x + r, min.y))
        // Top edge
        .line_to(DVec2::new(max.x - r, min.y))
        // Top-right corner
        .cubic_to(
            DVec2::new(max.x - r + k, min.y),
            DVec2::new(max.x, min.y + r - k),
            DVec2::new(max.x, min.y + r),
        )
        // Right edge
        .line_to(DVec2::new(max.x, max.y - r))
        // Bottom-right corner
        .cubic_to(
            DVec2::new(max.x, max.y - r + k),
            DVec2::new(max.x - r + k, max.y),
            DVec2::new(max.x - r, max.y),
        )
        // Bottom edge
        .line_to(DVec2::new(min.x + r, max.y))
        // Bottom-left corner
        .cubic_to(
            DVec2::new(min.x + r - k, max.y),
            DVec2::new(min.x, max.y - r + k),
            DVec2::new(min.x, max.y - r),
        )
        // Left edge
        .line_to(DVec2::new(min.x, min.y + r))
        // Top-left corner
        .cubic_to(
            DVec2::new(min.x, min.y + r - k),
            DVec2::new(min.x + r - k, min.y),
            DVec2::new(min.x + r, min.y),
        )
        .close()
        .build()
}

/// Creates a star shape.
pub fn star(center: DVec2, outer_radius: f64, inner_radius: f64, points: u32) -> Path {
    if points < 2 {
        return Path::new();
    }

    let mut vertices = Vec::with_capacity((points * 2) as usize);
    for i in 0..(points * 2) {
        let angle = TAU * (i as f64) / (points as f64 * 2.0) - TAU / 4.0;
        let r = if i % 2 == 0 {
            outer_radius
        } else {
            inner_radius
        };
        vertices.push(center + DVec2::new(angle.cos(), angle.sin()) * r);
    }
    polygon(&vertices)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_builder() {
        let path = PathBuilder::new()
            .move_to(DVec2::ZERO)
            .line_to(DVec2::new(1.0, 0.0))
            .line_to(DVec2::new(1.0, 1.0))
            .close()
            .build();

        assert_eq!(path.len(), 4);
    }

    #[test]
    fn test_rect() {
        let path = rect(DVec2::ZERO, DVec2::new(2.0, 1.0));
        assert_eq!(path.len(), 5); // move, 3 lines, close
    }

    #[test]
    fn test_circle() {
        let path = circle(DVec2::ZERO, 1.0);
        assert_eq!(path.len(), 6); // move, 4 cubics, close
    }

    #[test]
    fn test_polygon() {
        let triangle = polygon(&[
            DVec2::new(0.0, 1.0),
            DVec2::new(-1.0, -1.0),
            DVec2::new(1.0, -1.0),
        ]);
        assert_eq!(triangle.len(), 4); // move, 2 lines, close
    }

    #[test]
    fn test_regular_polygon() {
        let hex = regular_polygon(DVec2::ZERO, 1.0, 6);
        assert_eq!(hex.len(), 7); // move, 5 lines, close
    }

    #[test]
    fn test_star() {
        let s = star(DVec2::ZERO, 1.0, 0.5, 5);
        assert_eq!(s.len(), 11); // move, 9 lines, close
    }

    #[test]
    fn test_transform() {
        let mut path = line(DVec2::ZERO, DVec2::new(1.0, 0.0));
        path.translate(DVec2::new(10.0, 0.0));

        if let PathCommand::LineTo(p) = path.commands()[1] {
            assert!((p.x - 11.0).abs() < 1e-12);
        } else {
            panic!("expected LineTo");
        }
    }

    #[test]
    fn test_fill_rule_default() {
        assert_eq!(FillRule::default(), FillRule::NonZero);
    }
}
