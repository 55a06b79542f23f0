use common::slice::{Point2, Segment};
use mesh_format::{Point3, Triangle};

/// Componentwise tolerance below which the two computed intersection points
/// collapse into one grazing contact instead of a real cut.
const GRAZE_EPS: f32 = 1e-5;

/// Outcome of cutting a single triangle with a horizontal plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlaneHit {
    /// The plane crosses the triangle, leaving a segment with two distinct
    /// endpoints.
    Cut(Segment),
    /// The plane passes entirely above or below the triangle.
    Miss,
    /// The triangle lies in the plane, or the plane only grazes a vertex or
    /// edge. Dropped from the layer; callers count these for diagnostics.
    Degenerate,
}

impl PlaneHit {
    pub fn segment(self) -> Option<Segment> {
        match self {
            PlaneHit::Cut(segment) => Some(segment),
            _ => None,
        }
    }
}

/// Cuts one triangle with the horizontal plane at `z`.
///
/// Stateless; safe to call concurrently for any number of (triangle, plane)
/// pairs.
pub fn intersect_triangle(triangle: &Triangle, z: f32) -> PlaneHit {
    let mut sorted = *triangle;
    sorted.sort_by(|a, b| a.z.total_cmp(&b.z));
    let [p0, p1, p2] = sorted;

    if z < p0.z || z > p2.z {
        return PlaneHit::Miss;
    }
    if p0.z == z && p2.z == z {
        return PlaneHit::Degenerate;
    }

    // The p0..p2 edge spans every cutting height inside the triangle; the
    // other endpoint sits on whichever remaining edge crosses the plane.
    let a = interpolate(p0, p2, z);
    let b = if z <= p1.z {
        interpolate(p0, p1, z)
    } else {
        interpolate(p1, p2, z)
    };

    if (a.x - b.x).abs() < GRAZE_EPS && (a.y - b.y).abs() < GRAZE_EPS {
        return PlaneHit::Degenerate;
    }

    PlaneHit::Cut(Segment::new(a, b))
}

fn interpolate(low: Point3, high: Point3, z: f32) -> Point2 {
    let dz = high.z - low.z;
    if dz == 0.0 {
        // The edge lies in the plane; either endpoint works and the grazing
        // check above decides whether anything survives.
        return high.xy();
    }

    let t = (z - low.z) / dz;
    Point2::new(low.x + t * (high.x - low.x), low.y + t * (high.y - low.y))
}
