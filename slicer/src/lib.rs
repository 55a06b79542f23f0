//! Planar slicing core: turns a triangle soup into an ordered stack of 2D
//! contour layers, ready for sheet layout and export.

use thiserror::Error;

pub mod format;
pub mod intersection;
pub mod mesh;
pub mod session;
pub mod slicer;
pub mod stitch;

#[derive(Debug, Error)]
pub enum SliceError {
    #[error(transparent)]
    Load(#[from] mesh_format::MeshLoadError),

    /// The mesh bounding box has no extent to slice along. Raised at
    /// normalization time, before any layer work starts.
    #[error("degenerate mesh: {0}")]
    DegenerateMesh(String),

    /// Rejected before any geometry runs.
    #[error("invalid slice settings: {0}")]
    InvalidSettings(String),

    /// The run was stopped by a caller signal; all partial work was
    /// discarded.
    #[error("slicing was cancelled")]
    Cancelled,

    #[error("no slicing run is active")]
    NoActiveRun,

    /// Exporting refuses to produce output for an empty layer stack.
    #[error("refusing to export an empty layer stack")]
    EmptyResult,
}
