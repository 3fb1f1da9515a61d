//! Constructive area geometry in two dimensions.
//!
//! Provides resolution-independent planar regions ([`Area`]) that can be
//! combined with boolean set operations (union, subtraction,
//! intersection, symmetric difference) over outlines built from lines
//! and quadratic/cubic Bezier curves, plus adaptive flattening of curved
//! boundaries into polylines within an error tolerance.

mod area;
mod bezier;
mod curve;
mod decompose;
mod error;
mod flatten;
mod path;
mod sweep;
mod walker;

pub use area::{Area, AreaOp, Rect};
pub use error::Error;
pub use flatten::Flattened;
pub use path::{
    FillRule,
    Path,
    PathBuilder,
    PathCommand,
    // Primitives
    circle,
    ellipse,
    line,
    polygon,
    polyline,
    rect,
    rect_centered,
    regular_polygon,
    rounded_rect,
    star,
};
pub use walker::Boundary;
