use std::sync::atomic::{AtomicU64, Ordering};

use rayon::iter::{IntoParallelIterator, ParallelIterator};
use tracing::debug;

use common::{
    progress::Progress,
    slice::{Layer, SliceResult},
};

use crate::{
    intersection::{intersect_triangle, PlaneHit},
    mesh::NormalizedMesh,
    stitch::stitch_segments,
    SliceError,
};

/// How layer spacing is chosen; the other quantity is derived from the
/// target height.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LayerMode {
    /// Fixed layer thickness in mm, usually the sheet material thickness.
    Thickness(f32),
    /// Fixed number of layers.
    Count(u32),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SliceSettings {
    /// Height the model is scaled to, in mm.
    pub target_height: f32,
    pub mode: LayerMode,
}

/// Count and thickness derived from [`SliceSettings`]; the two always agree
/// no matter which one the caller fixed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayerPlan {
    pub count: u32,
    pub thickness: f32,
}

impl SliceSettings {
    pub fn layer_plan(&self) -> Result<LayerPlan, SliceError> {
        if !(self.target_height > 0.0) {
            return Err(SliceError::InvalidSettings(format!(
                "target height must be positive, got {}",
                self.target_height
            )));
        }

        match self.mode {
            LayerMode::Thickness(thickness) => {
                if !(thickness > 0.0) {
                    return Err(SliceError::InvalidSettings(format!(
                        "layer thickness must be positive, got {thickness}"
                    )));
                }

                Ok(LayerPlan {
                    count: (self.target_height / thickness).floor() as u32,
                    thickness,
                })
            }
            LayerMode::Count(count) => {
                if count == 0 {
                    return Err(SliceError::InvalidSettings(
                        "layer count must be at least one".into(),
                    ));
                }

                Ok(LayerPlan {
                    count,
                    thickness: self.target_height / count as f32,
                })
            }
        }
    }
}

impl LayerPlan {
    /// Cutting height of layer `k`. The first and last layers sit half a
    /// thickness in from the model's bottom and top, never flush with them.
    pub fn z(&self, layer: u32) -> f32 {
        self.thickness / 2.0 + layer as f32 * self.thickness
    }
}

/// Drives per-layer slicing of a normalized mesh across a worker pool.
pub struct Slicer {
    mesh: NormalizedMesh,
    plan: LayerPlan,
    progress: Progress,
}

impl Slicer {
    pub fn new(settings: SliceSettings, mesh: NormalizedMesh) -> Result<Self, SliceError> {
        let plan = settings.layer_plan()?;
        Ok(Self {
            progress: Progress::new(plan.count),
            mesh,
            plan,
        })
    }

    /// Hands out a monitor for this run; clone it freely across threads.
    pub fn progress(&self) -> Progress {
        self.progress.clone()
    }

    pub fn layer_plan(&self) -> LayerPlan {
        self.plan
    }

    /// Slices every layer, bottom to top. Layers fan out over the worker
    /// pool and are reassembled in ascending order, so the output never
    /// depends on scheduling. Cancellation is honored between layers; a
    /// cancelled run discards everything and reports no result.
    pub fn slice(&self) -> Result<SliceResult, SliceError> {
        let degenerate_drops = AtomicU64::new(0);

        let layers = (0..self.plan.count)
            .into_par_iter()
            .map(|layer| {
                if self.progress.is_cancelled() {
                    return Layer::default();
                }

                let layer = self.slice_layer(self.plan.z(layer), &degenerate_drops);
                self.progress.add_complete(1);
                layer
            })
            .collect::<Vec<_>>();

        if self.progress.is_cancelled() {
            return Err(SliceError::Cancelled);
        }

        let degenerate_drops = degenerate_drops.load(Ordering::Relaxed);
        if degenerate_drops > 0 {
            debug!("dropped {degenerate_drops} degenerate triangle intersections");
        }

        Ok(SliceResult {
            layers,
            degenerate_drops,
        })
    }

    fn slice_layer(&self, z: f32, degenerate_drops: &AtomicU64) -> Layer {
        let mut segments = Vec::new();
        for triangle in self.mesh.triangles() {
            match intersect_triangle(triangle, z) {
                PlaneHit::Cut(segment) => segments.push(segment),
                PlaneHit::Degenerate => {
                    degenerate_drops.fetch_add(1, Ordering::Relaxed);
                }
                PlaneHit::Miss => {}
            }
        }

        Layer {
            z,
            paths: stitch_segments(segments),
        }
    }
}
