use nalgebra::Vector3;
use thiserror::Error;

mod stl;

pub type Point3 = Vector3<f32>;

/// Three vertices in file order. The winding read from the file is carried
/// along but never interpreted.
pub type Triangle = [Point3; 3];

/// An unindexed triangle soup, in file order, with no vertex sharing and no
/// deduplication. Immutable once parsed.
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    pub triangles: Vec<Triangle>,
}

#[derive(Debug, Error)]
pub enum MeshLoadError {
    /// The buffer is truncated or not a recognizable mesh file. Nothing is
    /// salvaged from a malformed buffer; no partial triangle list escapes.
    #[error("malformed input: {0}")]
    MalformedInput(String),
}

/// Parses a raw mesh file buffer into a triangle soup. The encoding (binary
/// or ascii stl) is detected from the buffer itself, never declared by the
/// caller.
pub fn load_mesh(buffer: &[u8]) -> Result<Mesh, MeshLoadError> {
    stl::parse(buffer)
}
