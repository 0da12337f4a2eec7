/// PLY reader for ASCII and binary (both byte orders) triangle meshes
use std::io::BufRead;

use nalgebra::Point3;
use ply_rs::parser::Parser;
use ply_rs::ply::{DefaultElement, Property};

use crate::error::LoadError;
use crate::geometry::{Mesh, Triangle};

fn coordinate(element: &DefaultElement, key: &str, vertex: usize) -> Result<f64, LoadError> {
    match element.get(key) {
        Some(Property::Float(v)) => Ok(f64::from(*v)),
        Some(Property::Double(v)) => Ok(*v),
        _ => Err(LoadError::parse(
            "PLY",
            format!("vertex {vertex} has no float property {key:?}"),
        )),
    }
}

/// Face index list under either of the usual property names.
fn face_indices(element: &DefaultElement) -> Option<Vec<i64>> {
    ["vertex_indices", "vertex_index"]
        .iter()
        .find_map(|key| match element.get(*key)? {
            Property::ListChar(v) => Some(v.iter().map(|&i| i64::from(i)).collect()),
            Property::ListUChar(v) => Some(v.iter().map(|&i| i64::from(i)).collect()),
            Property::ListShort(v) => Some(v.iter().map(|&i| i64::from(i)).collect()),
            Property::ListUShort(v) => Some(v.iter().map(|&i| i64::from(i)).collect()),
            Property::ListInt(v) => Some(v.iter().map(|&i| i64::from(i)).collect()),
            Property::ListUInt(v) => Some(v.iter().map(|&i| i64::from(i)).collect()),
            _ => None,
        })
}

/// Read a PLY file from a buffered reader. Only `vertex` positions and
/// `face` index lists are used; faces must be triangles.
pub fn read_ply<R: BufRead>(reader: &mut R) -> Result<Mesh, LoadError> {
    let parser = Parser::<DefaultElement>::new();
    let header = parser
        .read_header(reader)
        .map_err(|e| LoadError::parse("PLY", format!("bad header: {e}")))?;
    let payload = parser
        .read_payload(reader, &header)
        .map_err(|e| LoadError::parse("PLY", format!("bad payload: {e}")))?;

    let vertices = payload
        .get("vertex")
        .map(|elements| {
            elements
                .iter()
                .enumerate()
                .map(|(i, element)| {
                    Ok(Point3::new(
                        coordinate(element, "x", i)?,
                        coordinate(element, "y", i)?,
                        coordinate(element, "z", i)?,
                    ))
                })
                .collect::<Result<Vec<_>, LoadError>>()
        })
        .transpose()?
        .unwrap_or_default();

    let faces = payload.get("face").map(Vec::as_slice).unwrap_or_default();
    let mut mesh = Mesh::with_capacity(faces.len());
    for (face, element) in faces.iter().enumerate() {
        let indices = face_indices(element)
            .ok_or_else(|| LoadError::parse("PLY", format!("face {face} has no vertex index list")))?;
        if indices.len() != 3 {
            return Err(LoadError::NonTriangularFace {
                face,
                vertices: indices.len(),
            });
        }
        let corner = |index: i64| {
            usize::try_from(index)
                .ok()
                .and_then(|i| vertices.get(i))
                .copied()
                .ok_or_else(|| {
                    LoadError::parse("PLY", format!("face {face}: vertex index {index} out of range"))
                })
        };
        mesh.add_triangle(Triangle::new(corner(indices[0])?, corner(indices[1])?, corner(indices[2])?));
    }

    Ok(mesh)
}

/// Parse in-memory PLY content.
pub fn parse_ply(data: &[u8]) -> Result<Mesh, LoadError> {
    let mut reader = data;
    read_ply(&mut reader)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::TriangulatedSurface;
    use nalgebra::Vector3;

    const ASCII_WEDGE: &str = "ply
format ascii 1.0
comment two faces of a corner
element vertex 4
property float x
property float y
property float z
element face 2
property list uchar int vertex_indices
end_header
0 0 0
10 0 0
0 10 0
0 0 10
3 0 2 1
3 0 1 3
";

    fn binary_triangle() -> Vec<u8> {
        let mut data = b"ply
format binary_little_endian 1.0
element vertex 3
property double x
property double y
property double z
element face 1
property list uchar uint vertex_indices
end_header
"
        .to_vec();
        for value in [0.0f64, 0.0, 0.0, 4.0, 0.0, 0.0, 0.0, 4.0, 0.0] {
            data.extend_from_slice(&value.to_le_bytes());
        }
        data.push(3);
        for index in [0u32, 1, 2] {
            data.extend_from_slice(&index.to_le_bytes());
        }
        data
    }

    #[test]
    fn test_parse_ascii() {
        let mesh = parse_ply(ASCII_WEDGE.as_bytes()).unwrap();
        assert_eq!(mesh.face_count(), 2);
        assert_eq!(mesh.extents().z, 10.0);
        assert_eq!(mesh.face_normal(0), Some(Vector3::new(0.0, 0.0, -1.0)));
        assert_eq!(mesh.surface_area(), 100.0);
    }

    #[test]
    fn test_parse_binary_little_endian() {
        let mesh = parse_ply(&binary_triangle()).unwrap();
        assert_eq!(mesh.face_count(), 1);
        assert_eq!(mesh.triangles[0].vertices[1], Point3::new(4.0, 0.0, 0.0));
        assert_eq!(mesh.surface_area(), 8.0);
    }

    #[test]
    fn test_quad_is_rejected() {
        let text = ASCII_WEDGE.replace("3 0 1 3", "4 0 1 3 2");
        assert!(matches!(
            parse_ply(text.as_bytes()),
            Err(LoadError::NonTriangularFace { face: 1, vertices: 4 })
        ));
    }

    #[test]
    fn test_out_of_range_index() {
        let text = ASCII_WEDGE.replace("3 0 1 3", "3 0 1 9");
        let err = parse_ply(text.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("vertex index 9"), "{err}");
    }

    #[test]
    fn test_missing_coordinate() {
        let text = "ply
format ascii 1.0
element vertex 3
property float x
property float y
element face 1
property list uchar int vertex_indices
end_header
0 0
1 0
0 1
3 0 1 2
";
        let err = parse_ply(text.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("\"z\""), "{err}");
    }

    #[test]
    fn test_not_a_ply_file() {
        assert!(matches!(
            parse_ply(b"solid cube\nendsolid\n"),
            Err(LoadError::Parse { format: "PLY", .. })
        ));
    }
}
