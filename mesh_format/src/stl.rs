use common::serde::{Deserializer, SliceDeserializer};

use crate::{Mesh, MeshLoadError, Point3};

/// How many leading bytes are inspected to tell the two encodings apart.
const PROBE_LEN: usize = 200;

const HEADER_LEN: usize = 80;
const COUNT_LEN: usize = 4;
const RECORD_LEN: usize = 50;

/// Both markers must appear in the probe window to count as ascii. Checking
/// `solid` alone is not enough since some exporters start their binary
/// headers with it.
pub fn parse(buffer: &[u8]) -> Result<Mesh, MeshLoadError> {
    let probe = String::from_utf8_lossy(&buffer[..buffer.len().min(PROBE_LEN)]);

    if probe.contains("solid") && probe.contains("facet normal") {
        ascii::parse(buffer)
    } else {
        binary::parse(&mut SliceDeserializer::new(buffer))
    }
}

/// The fixed binary layout:
/// ```text
/// UINT8[80]    – Header                 - 80 bytes
/// UINT32       – Number of triangles    - 04 bytes
/// foreach triangle                      - 50 bytes
///     REAL32[3] – Normal vector         - 12 bytes
///     REAL32[3] – Vertex 1              - 12 bytes
///     REAL32[3] – Vertex 2              - 12 bytes
///     REAL32[3] – Vertex 3              - 12 bytes
///     UINT16    – Attribute byte count  - 02 bytes
/// end
/// ```
mod binary {
    use super::*;

    pub fn parse<T: Deserializer>(des: &mut T) -> Result<Mesh, MeshLoadError> {
        if des.size() < HEADER_LEN + COUNT_LEN {
            return Err(MeshLoadError::MalformedInput(format!(
                "binary stl header needs {} bytes, buffer has {}",
                HEADER_LEN + COUNT_LEN,
                des.size()
            )));
        }

        des.advance_by(HEADER_LEN);
        let tri_count = des.read_u32_le();

        let expected = (HEADER_LEN + COUNT_LEN) as u64 + tri_count as u64 * RECORD_LEN as u64;
        if (des.size() as u64) < expected {
            return Err(MeshLoadError::MalformedInput(format!(
                "binary stl declares {tri_count} triangles ({expected} bytes), buffer has {}",
                des.size()
            )));
        }

        let mut triangles = Vec::with_capacity(tri_count as usize);
        for _ in 0..tri_count {
            des.advance_by(4 * 3); // skip normal
            triangles.push([read_vertex(des), read_vertex(des), read_vertex(des)]);
            des.advance_by(2); // skip attribute byte count
        }

        Ok(Mesh { triangles })
    }

    fn read_vertex<T: Deserializer>(des: &mut T) -> Point3 {
        Point3::new(des.read_f32_le(), des.read_f32_le(), des.read_f32_le())
    }
}

/// ```text
/// solid name
/// facet normal ni nj nk
///     outer loop
///         vertex v1x v1y v1z
///         vertex v2x v2y v2z
///         vertex v3x v3y v3z
///     endloop
/// endfacet
/// endsolid name
/// ```
mod ascii {
    use tracing::warn;

    use super::*;

    /// Facet and loop keywords are not validated; every `vertex` line with
    /// three float tokens counts, and each run of three vertices becomes one
    /// triangle. Files with stray vertex lines get the wrong grouping.
    pub fn parse(buffer: &[u8]) -> Result<Mesh, MeshLoadError> {
        let text = String::from_utf8_lossy(buffer);

        let mut triangles = Vec::new();
        let mut pending = Vec::with_capacity(3);

        for line in text.lines() {
            let mut tokens = line.split_whitespace();
            if tokens.next() != Some("vertex") {
                continue;
            }

            let mut floats = tokens.map_while(|token| token.parse::<f32>().ok());
            let (Some(x), Some(y), Some(z)) = (floats.next(), floats.next(), floats.next())
            else {
                continue;
            };

            pending.push(Point3::new(x, y, z));
            if pending.len() == 3 {
                triangles.push([pending[0], pending[1], pending[2]]);
                pending.clear();
            }
        }

        if !pending.is_empty() {
            warn!(
                "ascii stl ended mid facet, ignoring {} stray vertex line(s)",
                pending.len()
            );
        }

        Ok(Mesh { triangles })
    }
}

#[cfg(test)]
mod tests {
    use crate::Triangle;

    use super::*;

    const ASCII_TETRA: &str = "\
solid tetra
facet normal 0 0 -1
    outer loop
        vertex 0 0 0
        vertex 1 0 0
        vertex 0 1 0
    endloop
endfacet
facet normal 0 -1 0
    outer loop
        vertex 0 0 0
        vertex 0 0 1
        vertex 1 0 0
    endloop
endfacet
endsolid tetra
";

    fn binary_stl(triangles: &[Triangle]) -> Vec<u8> {
        let mut out = vec![0; HEADER_LEN];
        out.extend((triangles.len() as u32).to_le_bytes());
        for triangle in triangles {
            out.extend([0; 4 * 3]);
            for vertex in triangle {
                for component in [vertex.x, vertex.y, vertex.z] {
                    out.extend(component.to_le_bytes());
                }
            }
            out.extend([0; 2]);
        }
        out
    }

    fn triangle() -> Triangle {
        [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.5),
        ]
    }

    #[test]
    fn parses_ascii() {
        let mesh = parse(ASCII_TETRA.as_bytes()).unwrap();
        assert_eq!(mesh.triangles.len(), 2);
        assert_eq!(mesh.triangles[0][1], Point3::new(1.0, 0.0, 0.0));
        assert_eq!(mesh.triangles[1][1], Point3::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn ascii_ignores_incomplete_trailing_facet() {
        let input = format!("{ASCII_TETRA}vertex 9 9 9\n");
        let mesh = parse(input.as_bytes()).unwrap();
        assert_eq!(mesh.triangles.len(), 2);
    }

    #[test]
    fn parses_binary() {
        let buffer = binary_stl(&[triangle(), triangle()]);
        let mesh = parse(&buffer).unwrap();
        assert_eq!(mesh.triangles.len(), 2);
        assert_eq!(mesh.triangles[1][2], Point3::new(0.0, 1.0, 0.5));
    }

    #[test]
    fn binary_header_starting_with_solid_is_still_binary() {
        let mut buffer = binary_stl(&[triangle()]);
        buffer[..5].copy_from_slice(b"solid");
        let mesh = parse(&buffer).unwrap();
        assert_eq!(mesh.triangles.len(), 1);
    }

    #[test]
    fn truncated_binary_is_rejected() {
        let mut buffer = binary_stl(&[triangle(), triangle()]);
        buffer.truncate(buffer.len() - 10);

        let err = parse(&buffer).unwrap_err();
        assert!(matches!(err, MeshLoadError::MalformedInput(_)));
    }

    #[test]
    fn overdeclared_triangle_count_is_rejected() {
        let mut buffer = binary_stl(&[triangle()]);
        buffer[HEADER_LEN..HEADER_LEN + COUNT_LEN].copy_from_slice(&u32::MAX.to_le_bytes());

        let err = parse(&buffer).unwrap_err();
        assert!(matches!(err, MeshLoadError::MalformedInput(_)));
    }

    #[test]
    fn undersized_buffer_is_rejected() {
        let err = parse(&[0; 40]).unwrap_err();
        assert!(matches!(err, MeshLoadError::MalformedInput(_)));
    }
}
