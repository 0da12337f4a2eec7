/// STL file parser for binary and ASCII formats
use nalgebra::{Point3, Vector3};
use nom::{
    bytes::complete::tag,
    character::complete::{multispace0, multispace1, not_line_ending},
    combinator::opt,
    multi::many0,
    number::complete::double,
    sequence::{preceded, tuple},
    IResult,
};

use crate::error::LoadError;
use crate::geometry::{Mesh, Triangle};

const HEADER_LEN: usize = 80;
const FACET_LEN: usize = 50;

fn read_vector(bytes: &[u8]) -> [f64; 3] {
    let mut out = [0.0; 3];
    for (value, chunk) in out.iter_mut().zip(bytes.chunks_exact(4)) {
        *value = f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]) as f64;
    }
    out
}

/// Parse a binary STL file
pub fn parse_binary_stl(data: &[u8]) -> Result<Mesh, LoadError> {
    if data.len() < HEADER_LEN + 4 {
        return Err(LoadError::parse("STL", "file too small to be a valid STL"));
    }

    // Skip 80-byte header, then the little-endian triangle count
    let count_bytes = &data[HEADER_LEN..HEADER_LEN + 4];
    let triangle_count =
        u32::from_le_bytes([count_bytes[0], count_bytes[1], count_bytes[2], count_bytes[3]]) as usize;

    let body = &data[HEADER_LEN + 4..];
    let expected = triangle_count.saturating_mul(FACET_LEN);
    if body.len() < expected {
        return Err(LoadError::parse(
            "STL",
            format!(
                "unexpected end of file: {triangle_count} triangles need {expected} bytes, found {}",
                body.len()
            ),
        ));
    }

    let mut mesh = Mesh::with_capacity(triangle_count);
    for facet in body.chunks_exact(FACET_LEN).take(triangle_count) {
        // normal, three vertices, then a 2-byte attribute count we ignore
        let normal = read_vector(&facet[0..12]);
        let v0 = read_vector(&facet[12..24]);
        let v1 = read_vector(&facet[24..36]);
        let v2 = read_vector(&facet[36..48]);

        mesh.add_triangle(
            Triangle::new(Point3::from(v0), Point3::from(v1), Point3::from(v2))
                .with_normal(Vector3::from(normal)),
        );
    }

    Ok(mesh)
}

/// Parse an ASCII STL file
pub fn parse_ascii_stl(input: &str) -> Result<Mesh, LoadError> {
    match parse_ascii_stl_impl(input) {
        Ok((_, mesh)) => Ok(mesh),
        Err(nom::Err::Error(e) | nom::Err::Failure(e)) => {
            let consumed = input.len() - e.input.len();
            let line = input[..consumed].matches('\n').count() + 1;
            Err(LoadError::parse(
                "ASCII STL",
                format!("unexpected content at line {line} ({:?})", e.code),
            ))
        }
        Err(nom::Err::Incomplete(_)) => Err(LoadError::parse("ASCII STL", "unexpected end of input")),
    }
}

fn parse_ascii_stl_impl(input: &str) -> IResult<&str, Mesh> {
    let (input, _) = preceded(multispace0, tag("solid"))(input)?;
    let (input, _) = not_line_ending(input)?; // Optional name
    let (input, triangles) = many0(parse_facet)(input)?;
    let (input, _) = preceded(multispace0, tag("endsolid"))(input)?;
    let (input, _) = opt(not_line_ending)(input)?;

    let mut mesh = Mesh::with_capacity(triangles.len());
    for triangle in triangles {
        mesh.add_triangle(triangle);
    }

    Ok((input, mesh))
}

fn parse_facet(input: &str) -> IResult<&str, Triangle> {
    let (input, _) = preceded(multispace0, tag("facet"))(input)?;
    let (input, _) = preceded(multispace1, tag("normal"))(input)?;
    let (input, normal) = parse_vector3(input)?;
    let (input, _) = preceded(multispace0, tag("outer"))(input)?;
    let (input, _) = preceded(multispace1, tag("loop"))(input)?;
    let (input, v1) = parse_vertex(input)?;
    let (input, v2) = parse_vertex(input)?;
    let (input, v3) = parse_vertex(input)?;
    let (input, _) = preceded(multispace0, tag("endloop"))(input)?;
    let (input, _) = preceded(multispace0, tag("endfacet"))(input)?;

    let triangle = Triangle::new(v1, v2, v3).with_normal(Vector3::from(normal));
    Ok((input, triangle))
}

fn parse_vertex(input: &str) -> IResult<&str, Point3<f64>> {
    let (input, _) = preceded(multispace0, tag("vertex"))(input)?;
    let (input, position) = parse_vector3(input)?;
    Ok((input, Point3::from(position)))
}

fn parse_vector3(input: &str) -> IResult<&str, [f64; 3]> {
    let (input, (_, x, _, y, _, z)) =
        tuple((multispace0, double, multispace1, double, multispace1, double))(input)?;
    Ok((input, [x, y, z]))
}

/// Detect and parse STL file (binary or ASCII)
pub fn parse_stl(data: &[u8]) -> Result<Mesh, LoadError> {
    // Binary files may also start with "solid", so ASCII is only a first guess
    let start = data
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(data.len());
    let mut ascii_error = None;
    if data[start..].starts_with(b"solid") {
        if let Ok(text) = std::str::from_utf8(data) {
            match parse_ascii_stl(text) {
                Ok(mesh) => return Ok(mesh),
                Err(err) => ascii_error = Some(err),
            }
        }
    }

    // A text file that is not binary either is reported by its ASCII error
    parse_binary_stl(data).map_err(|binary_error| ascii_error.unwrap_or(binary_error))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::TriangulatedSurface;

    const ASCII_TRIANGLE: &str = "solid plate
  facet normal 0 0 -1
    outer loop
      vertex 0 0 0
      vertex 0 10 0
      vertex 10 0 0
    endloop
  endfacet
endsolid plate
";

    fn binary_stl(triangles: &[[[f32; 3]; 4]]) -> Vec<u8> {
        let mut data = vec![0u8; HEADER_LEN];
        data.extend_from_slice(&(triangles.len() as u32).to_le_bytes());
        for facet in triangles {
            for vector in facet {
                for value in vector {
                    data.extend_from_slice(&value.to_le_bytes());
                }
            }
            data.extend_from_slice(&[0, 0]);
        }
        data
    }

    #[test]
    fn test_parse_binary_header() {
        let mut data = vec![0u8; 84];
        // Set triangle count to 0
        data[80..84].copy_from_slice(&0u32.to_le_bytes());

        let result = parse_binary_stl(&data);
        assert!(result.is_ok());
        let mesh = result.unwrap();
        assert_eq!(mesh.triangles.len(), 0);
    }

    #[test]
    fn test_parse_binary_triangle() {
        let data = binary_stl(&[[
            [0.0, 0.0, 1.0],
            [0.0, 0.0, 0.0],
            [4.0, 0.0, 0.0],
            [0.0, 4.0, 0.0],
        ]]);
        let mesh = parse_stl(&data).unwrap();
        assert_eq!(mesh.face_count(), 1);
        assert_eq!(mesh.triangles[0].normal, Vector3::new(0.0, 0.0, 1.0));
        assert_eq!(mesh.triangles[0].vertices[1], Point3::new(4.0, 0.0, 0.0));
        assert_eq!(mesh.surface_area(), 8.0);
    }

    #[test]
    fn test_truncated_binary_is_rejected() {
        let mut data = binary_stl(&[[[0.0; 3]; 4]]);
        data.truncate(data.len() - 10);
        assert!(matches!(parse_binary_stl(&data), Err(LoadError::Parse { .. })));
    }

    #[test]
    fn test_too_small_is_rejected() {
        assert!(parse_stl(b"solid").is_err());
    }

    #[test]
    fn test_parse_ascii() {
        let mesh = parse_stl(ASCII_TRIANGLE.as_bytes()).unwrap();
        assert_eq!(mesh.face_count(), 1);
        assert_eq!(mesh.triangles[0].vertices[2], Point3::new(10.0, 0.0, 0.0));
        assert_eq!(mesh.face_normal(0), Some(Vector3::new(0.0, 0.0, -1.0)));
    }

    #[test]
    fn test_parse_ascii_scientific_notation() {
        let text = ASCII_TRIANGLE.replace("vertex 0 10 0", "vertex 0.0e0 1.0E+1 -0.0");
        let mesh = parse_ascii_stl(&text).unwrap();
        assert_eq!(mesh.triangles[0].vertices[1], Point3::new(0.0, 10.0, 0.0));
    }

    #[test]
    fn test_ascii_error_reports_line() {
        let text = ASCII_TRIANGLE.replace("endloop", "endlop");
        match parse_ascii_stl(&text) {
            Err(LoadError::Parse { message, .. }) => assert!(message.contains("line 2"), "{message}"),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_broken_ascii_keeps_its_error() {
        let text = ASCII_TRIANGLE.replace("endloop", "endlop");
        match parse_stl(text.as_bytes()) {
            Err(LoadError::Parse { format, message }) => {
                assert_eq!(format, "ASCII STL");
                assert!(message.contains("line 2"), "{message}");
            }
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_binary_with_solid_header_falls_back() {
        let mut data = binary_stl(&[[
            [0.0, 0.0, 1.0],
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
        ]]);
        data[..5].copy_from_slice(b"solid");
        let mesh = parse_stl(&data).unwrap();
        assert_eq!(mesh.face_count(), 1);
    }
}
