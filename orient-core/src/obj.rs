/// Wavefront OBJ reader: vertex positions and triangular faces only.
use std::io::BufRead;

use nalgebra::Point3;

use crate::error::LoadError;
use crate::geometry::{Mesh, Triangle};

fn load_options() -> tobj::LoadOptions {
    tobj::LoadOptions {
        // Polygons are rejected below, not split
        triangulate: false,
        single_index: false,
        ignore_points: true,
        ignore_lines: true,
        ..Default::default()
    }
}

fn corner(positions: &[f32], index: u32) -> Result<Point3<f64>, LoadError> {
    let at = index as usize * 3;
    positions
        .get(at..at + 3)
        .map(|p| Point3::new(p[0] as f64, p[1] as f64, p[2] as f64))
        .ok_or_else(|| LoadError::parse("OBJ", format!("vertex index {} out of range", index + 1)))
}

/// Read OBJ records from a buffered reader into a triangle mesh.
///
/// Every object and group in the file goes into the same mesh. Materials
/// are not loaded. Faces must be triangles.
pub fn read_obj<R: BufRead>(reader: &mut R) -> Result<Mesh, LoadError> {
    let (models, _materials) =
        tobj::load_obj_buf(reader, &load_options(), |_| Err(tobj::LoadError::OpenFileFailed))
            .map_err(|e| LoadError::parse("OBJ", e.to_string()))?;

    let mut mesh = Mesh::new();
    let mut face = 0;
    for model in &models {
        let obj = &model.mesh;
        if let Some((offset, &arity)) = obj.face_arities.iter().enumerate().find(|(_, &n)| n != 3) {
            return Err(LoadError::NonTriangularFace {
                face: face + offset,
                vertices: arity as usize,
            });
        }
        for indices in obj.indices.chunks_exact(3) {
            mesh.add_triangle(Triangle::new(
                corner(&obj.positions, indices[0])?,
                corner(&obj.positions, indices[1])?,
                corner(&obj.positions, indices[2])?,
            ));
            face += 1;
        }
    }

    Ok(mesh)
}

/// Parse OBJ text into a triangle mesh.
pub fn parse_obj(input: &str) -> Result<Mesh, LoadError> {
    read_obj(&mut input.as_bytes())
}
