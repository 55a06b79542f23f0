//! The shared data model for sliced output: segments, stitched paths, and
//! the per-height layers they are collected into.

use nalgebra::Vector2;

pub type Point2 = Vector2<f32>;

/// Squared distance below which two points are treated as the same point
/// when chaining segments into paths.
pub const COINCIDENT_DIST_SQ: f32 = 1e-5;

/// An unordered pair of endpoints produced by cutting one triangle with one
/// horizontal plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub a: Point2,
    pub b: Point2,
}

impl Segment {
    pub fn new(a: Point2, b: Point2) -> Self {
        Self { a, b }
    }
}

/// An ordered run of points. Closed paths wrap around from the last point
/// back to the first; the duplicate terminal point is not stored.
#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    pub points: Vec<Point2>,
    pub closed: bool,
}

/// All paths cut at one height. Layers are independent of each other.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Layer {
    pub z: f32,
    pub paths: Vec<Path>,
}

/// An ordered stack of layers, index 0 at the bottom. Replaced wholesale by
/// every slicing run.
#[derive(Debug, Clone, PartialEq)]
pub struct SliceResult {
    pub layers: Vec<Layer>,
    /// Count of triangle intersections dropped as degenerate (in-plane or
    /// grazing contact). Informational; the drops never abort a run.
    pub degenerate_drops: u64,
}
