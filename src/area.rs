//! Resolution-independent planar regions with boolean combination.
//!
//! An [`Area`] owns one immutable, canonical collection of monotone
//! curves behind an `Arc`. Every mutation replaces the collection
//! wholesale, so boundary iterators snapshot the `Arc` and stay valid
//! across later mutation. Two areas enclosing the same set of points
//! compare equal regardless of how they were constructed.

use crate::curve::Curve;
use crate::decompose::decompose;
use crate::error::Error;
use crate::flatten::Flattened;
use crate::path::{FillRule, Path};
use crate::sweep::{calculate, Classifier};
use crate::walker::Boundary;
use glam::{DAffine2, DVec2};
use std::cell::Cell;
use std::sync::Arc;

/// Axis-aligned bounding rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rect {
    pub min: DVec2,
    pub max: DVec2,
}

impl Rect {
    pub fn new(min: DVec2, max: DVec2) -> Self {
        Self { min, max }
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    pub fn center(&self) -> DVec2 {
        (self.min + self.max) * 0.5
    }

    /// Returns true if the point lies inside or on the boundary.
    pub fn contains(&self, p: DVec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }
}

/// Boolean combination operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AreaOp {
    /// Union of both regions.
    Add,
    /// Points of the left region not in the right.
    Subtract,
    /// Points common to both regions.
    Intersect,
    /// Points in exactly one region.
    Xor,
}

impl AreaOp {
    fn classifier(self) -> Classifier {
        match self {
            AreaOp::Add => Classifier::add(),
            AreaOp::Subtract => Classifier::subtract(),
            AreaOp::Intersect => Classifier::intersect(),
            AreaOp::Xor => Classifier::xor(),
        }
    }
}

/// A planar region closed under boolean combination.
///
/// Geometry enters through [`Area::from_path`], which resolves the given
/// fill rule and any self-intersections into a canonical boundary. From
/// then on the region is purely set-theoretic: combining, transforming,
/// and querying it never re-introduces winding ambiguity.
#[derive(Debug, Clone)]
pub struct Area {
    curves: Arc<Vec<Curve>>,
    bounds: Cell<Option<Rect>>,
}

impl Default for Area {
    fn default() -> Self {
        Self::new()
    }
}

impl Area {
    /// The empty region.
    pub fn new() -> Area {
        Area {
            curves: Arc::new(Vec::new()),
            bounds: Cell::new(None),
        }
    }

    /// Builds the region enclosed by `path` under `rule`.
    ///
    /// Self-intersections and subpath orientations are resolved here;
    /// the result is canonical and rule-independent.
    pub fn from_path(path: &Path, rule: FillRule) -> Area {
        Area {
            curves: Arc::new(decompose(path, rule)),
            bounds: Cell::new(None),
        }
    }

    pub(crate) fn from_curves(curves: Vec<Curve>) -> Area {
        Area {
            curves: Arc::new(curves),
            bounds: Cell::new(None),
        }
    }

    fn set(&mut self, curves: Vec<Curve>) {
        self.curves = Arc::new(curves);
        self.bounds.set(None);
    }

    /// Combines `other` into this region under `op`.
    pub fn apply(&mut self, op: AreaOp, other: &Area) {
        let out = calculate(op.classifier(), &self.curves, &other.curves);
        self.set(out);
    }

    /// Adds the shape of `other` to this region (union).
    pub fn add(&mut self, other: &Area) {
        self.apply(AreaOp::Add, other);
    }

    /// Removes the shape of `other` from this region.
    pub fn subtract(&mut self, other: &Area) {
        self.apply(AreaOp::Subtract, other);
    }

    /// Keeps only the points shared with `other`.
    pub fn intersect(&mut self, other: &Area) {
        self.apply(AreaOp::Intersect, other);
    }

    /// Keeps only the points in exactly one of the two regions.
    pub fn exclusive_or(&mut self, other: &Area) {
        self.apply(AreaOp::Xor, other);
    }

    /// Empties the region.
    pub fn reset(&mut self) {
        self.set(Vec::new());
    }

    pub fn is_empty(&self) -> bool {
        self.curves.is_empty()
    }

    /// True when the boundary contains no curved segments.
    pub fn is_polygonal(&self) -> bool {
        self.curves.iter().all(|c| c.order() <= 1)
    }

    /// True when the region is exactly one axis-aligned rectangle.
    ///
    /// The canonical form of a rectangle is a subpath marker plus two
    /// vertical lines spanning the same y-range; anything else fails.
    pub fn is_rectangular(&self) -> bool {
        if self.curves.is_empty() {
            return true;
        }
        if self.curves.len() != 3 {
            return false;
        }
        let c1 = &self.curves[1];
        let c2 = &self.curves[2];
        c1.order() == 1
            && c2.order() == 1
            && c1.x_top() == c1.x_bot()
            && c2.x_top() == c2.x_bot()
            && c1.y_top() == c2.y_top()
            && c1.y_bot() == c2.y_bot()
    }

    /// True when the region consists of at most one connected subpath.
    pub fn is_singular(&self) -> bool {
        if self.curves.len() < 3 {
            return true;
        }
        self.curves[1..].iter().all(|c| c.order() != 0)
    }

    /// Bounding rectangle of the boundary, cached until the next mutation.
    ///
    /// Conservative for curved boundaries: control points are included,
    /// so the box may exceed the curve itself. Empty regions return the
    /// zero rectangle.
    pub fn bounds(&self) -> Rect {
        if let Some(r) = self.bounds.get() {
            return r;
        }
        let r = if self.curves.is_empty() {
            Rect::default()
        } else {
            let mut min = DVec2::splat(f64::MAX);
            let mut max = DVec2::splat(f64::MIN);
            for c in self.curves.iter() {
                c.enlarge(&mut min, &mut max);
            }
            Rect::new(min, max)
        };
        self.bounds.set(Some(r));
        r
    }

    /// Point containment by winding count over the monotone curves.
    ///
    /// Points on the boundary follow the half-open row convention: a
    /// curve covers `y_top <= y < y_bot`.
    pub fn contains(&self, p: DVec2) -> bool {
        let mut wind = 0;
        for c in self.curves.iter() {
            if c.order() == 0 {
                continue;
            }
            if c.y_top() <= p.y && p.y < c.y_bot() && p.x > c.x_for_y(p.y) {
                wind += c.dir().sign();
            }
        }
        wind != 0
    }

    /// Applies an affine transform to the region.
    ///
    /// The transformed boundary is re-decomposed, so the result is again
    /// canonical (reflections and flips included).
    pub fn transform(&mut self, transform: DAffine2) {
        let path: Path = self.boundary_with(transform).collect();
        self.set(decompose(&path, FillRule::NonZero));
    }

    /// Returns a transformed copy, leaving this region untouched.
    pub fn transformed(&self, transform: DAffine2) -> Area {
        let path: Path = self.boundary_with(transform).collect();
        Area::from_curves(decompose(&path, FillRule::NonZero))
    }

    /// Iterates the boundary as path commands.
    ///
    /// The iterator holds its own snapshot; mutating the area afterwards
    /// does not affect it.
    pub fn boundary(&self) -> Boundary {
        Boundary::new(Arc::clone(&self.curves), None)
    }

    /// Iterates the boundary with a transform applied to every point.
    pub fn boundary_with(&self, transform: DAffine2) -> Boundary {
        Boundary::new(Arc::clone(&self.curves), Some(transform))
    }

    /// Iterates the boundary flattened to line segments.
    pub fn flattened_boundary(&self, flatness: f64) -> Result<Flattened<Boundary>, Error> {
        Flattened::new(self.boundary(), flatness)
    }

    /// Collects the boundary into a path.
    pub fn to_path(&self) -> Path {
        self.boundary().collect()
    }
}

impl PartialEq for Area {
    /// Set equality: true when the two regions enclose exactly the same
    /// points, whatever their construction history.
    fn eq(&self, other: &Area) -> bool {
        calculate(Classifier::xor(), &self.curves, &other.curves).is_empty()
    }
}
