use std::sync::Arc;

use mesh_format::{Mesh, Point3, Triangle};
use tracing::debug;

use crate::SliceError;

/// A mesh rescaled so its Z extent equals the requested height, recentred on
/// the XY origin, with its base resting on the Z=0 plane. The scale is
/// uniform across all three axes, so the model keeps its proportions.
#[derive(Debug, Clone)]
pub struct NormalizedMesh {
    triangles: Arc<[Triangle]>,

    width: f32,
    length: f32,
    height: f32,

    scale: f32,
    offset: Point3,
}

impl NormalizedMesh {
    /// A pure function of the input mesh and target height. Call it again
    /// whenever the target height changes; any slice result computed from
    /// the previous value is stale and must be discarded by the caller.
    pub fn new(mesh: &Mesh, target_height: f32) -> Result<Self, SliceError> {
        if !(target_height > 0.0) {
            return Err(SliceError::InvalidSettings(format!(
                "target height must be positive, got {target_height}"
            )));
        }

        let (min, max) = vertex_bounds(mesh.triangles.iter().flatten());
        let extent = max - min;
        if !(extent.z > 0.0) {
            return Err(SliceError::DegenerateMesh(format!(
                "no height to slice, z extent is {}",
                extent.z.max(0.0)
            )));
        }
        if !(extent.x > 0.0) || !(extent.y > 0.0) {
            return Err(SliceError::DegenerateMesh(format!(
                "flat footprint, {} x {}",
                extent.x.max(0.0),
                extent.y.max(0.0)
            )));
        }

        let center = (min + max) / 2.0;
        let offset = Point3::new(center.x, center.y, min.z);
        let scale = target_height / extent.z;

        let triangles = mesh
            .triangles
            .iter()
            .map(|triangle| triangle.map(|vertex| (vertex - offset) * scale))
            .collect::<Arc<[Triangle]>>();

        debug!(
            "normalized {} triangles to {:.2} x {:.2} x {:.2} mm, scale {:.4}",
            triangles.len(),
            extent.x * scale,
            extent.y * scale,
            target_height,
            scale
        );

        Ok(Self {
            triangles,
            width: extent.x * scale,
            length: extent.y * scale,
            height: target_height,
            scale,
            offset,
        })
    }

    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    /// Scaled X extent in mm.
    pub fn width(&self) -> f32 {
        self.width
    }

    /// Scaled Y extent in mm.
    pub fn length(&self) -> f32 {
        self.length
    }

    /// Equal to the target height it was normalized to.
    pub fn height(&self) -> f32 {
        self.height
    }

    /// The uniform factor the raw mesh was scaled by.
    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// The raw-coordinate point that maps to the origin.
    pub fn offset(&self) -> Point3 {
        self.offset
    }
}

/// Minimum and maximum of each component over every vertex, the axis
/// aligned bounding box of the mesh.
fn vertex_bounds<'a>(vertices: impl Iterator<Item = &'a Point3>) -> (Point3, Point3) {
    vertices.fold(
        (
            Point3::new(f32::MAX, f32::MAX, f32::MAX),
            Point3::new(f32::MIN, f32::MIN, f32::MIN),
        ),
        |(min, max), v| {
            (
                Point3::new(min.x.min(v.x), min.y.min(v.y), min.z.min(v.z)),
                Point3::new(max.x.max(v.x), max.y.max(v.y), max.z.max(v.z)),
            )
        },
    )
}
