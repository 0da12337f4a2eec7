/// Triangle mesh model and the derived quantities the analysis needs.
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

/// A triangle face with its three corner positions and the normal stored by
/// the source file (zero when the file does not carry one).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    pub vertices: [Point3<f64>; 3],
    pub normal: Vector3<f64>,
}

impl Triangle {
    pub fn new(v0: Point3<f64>, v1: Point3<f64>, v2: Point3<f64>) -> Self {
        Self {
            vertices: [v0, v1, v2],
            normal: Vector3::zeros(),
        }
    }

    pub fn with_normal(mut self, normal: Vector3<f64>) -> Self {
        self.normal = normal;
        self
    }

    fn cross(&self) -> Vector3<f64> {
        let [v0, v1, v2] = self.vertices;
        (v1 - v0).cross(&(v2 - v0))
    }

    /// Unit normal from the counter-clockwise winding, `None` if degenerate.
    pub fn calculate_normal(&self) -> Option<Vector3<f64>> {
        self.cross().try_normalize(f64::EPSILON)
    }

    pub fn area(&self) -> f64 {
        self.cross().norm() * 0.5
    }

    /// Signed volume of the tetrahedron spanned by the triangle and the origin.
    pub fn signed_volume(&self) -> f64 {
        let [v0, v1, v2] = self.vertices;
        v0.coords.dot(&v1.coords.cross(&v2.coords)) / 6.0
    }
}

/// Span of a part along each principal axis.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Extents {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Extents {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn as_array(&self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }

    /// All six orderings of the three spans, duplicates included when two
    /// spans are equal.
    pub fn permutations(&self) -> [Extents; 6] {
        const ORDERS: [[usize; 3]; 6] = [
            [0, 1, 2],
            [0, 2, 1],
            [1, 0, 2],
            [1, 2, 0],
            [2, 0, 1],
            [2, 1, 0],
        ];
        let spans = self.as_array();
        ORDERS.map(|[a, b, c]| Extents::new(spans[a], spans[b], spans[c]))
    }
}

impl From<[f64; 3]> for Extents {
    fn from([x, y, z]: [f64; 3]) -> Self {
        Self::new(x, y, z)
    }
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: Point3<f64>,
    pub max: Point3<f64>,
}

impl BoundingBox {
    pub fn extents(&self) -> Extents {
        let span = self.max - self.min;
        Extents::new(span.x, span.y, span.z)
    }
}

/// What the analysis needs to know about a triangulated surface.
///
/// Any loader can feed the analysis by implementing this; [`Mesh`] is the
/// implementation produced by the bundled STL and OBJ readers.
pub trait TriangulatedSurface {
    fn face_count(&self) -> usize;

    /// Unit outward normal of a face, `None` when the surface has no normal
    /// for it.
    fn face_normal(&self, face: usize) -> Option<Vector3<f64>>;

    fn face_area(&self, face: usize) -> f64;

    fn extents(&self) -> Extents;

    fn volume(&self) -> f64;

    fn surface_area(&self) -> f64 {
        (0..self.face_count()).map(|face| self.face_area(face)).sum()
    }
}

/// A 3D mesh composed of triangles
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub triangles: Vec<Triangle>,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            triangles: Vec::with_capacity(capacity),
        }
    }

    pub fn add_triangle(&mut self, triangle: Triangle) {
        self.triangles.push(triangle);
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    pub fn bounding_box(&self) -> Option<BoundingBox> {
        let mut corners = self.triangles.iter().flat_map(|t| t.vertices.iter());
        let first = *corners.next()?;
        let (min, max) = corners.fold((first, first), |(min, max), p| {
            (min.inf(p), max.sup(p))
        });
        Some(BoundingBox { min, max })
    }

    /// Closed cube of the given edge length centred on the origin, wound so
    /// every normal points outward.
    pub fn cube(size: f64) -> Self {
        let h = size / 2.0;
        let p = |x: f64, y: f64, z: f64| Point3::new(x * h, y * h, z * h);
        let mut mesh = Self::with_capacity(12);
        let mut quad = |a: Point3<f64>, b: Point3<f64>, c: Point3<f64>, d: Point3<f64>| {
            mesh.add_triangle(Triangle::new(a, b, c));
            mesh.add_triangle(Triangle::new(a, c, d));
        };

        // Top (+z) and bottom (-z)
        quad(p(-1., -1., 1.), p(1., -1., 1.), p(1., 1., 1.), p(-1., 1., 1.));
        quad(p(-1., -1., -1.), p(-1., 1., -1.), p(1., 1., -1.), p(1., -1., -1.));
        // +y and -y
        quad(p(-1., 1., -1.), p(-1., 1., 1.), p(1., 1., 1.), p(1., 1., -1.));
        quad(p(-1., -1., -1.), p(1., -1., -1.), p(1., -1., 1.), p(-1., -1., 1.));
        // +x and -x
        quad(p(1., -1., -1.), p(1., 1., -1.), p(1., 1., 1.), p(1., -1., 1.));
        quad(p(-1., -1., -1.), p(-1., -1., 1.), p(-1., 1., 1.), p(-1., 1., -1.));

        mesh
    }
}

impl TriangulatedSurface for Mesh {
    fn face_count(&self) -> usize {
        self.triangles.len()
    }

    // Degenerate faces keep the file normal if it has one. Their area is zero
    // so the choice never changes a sum.
    fn face_normal(&self, face: usize) -> Option<Vector3<f64>> {
        let triangle = self.triangles.get(face)?;
        let normal = triangle
            .calculate_normal()
            .or_else(|| triangle.normal.try_normalize(f64::EPSILON))
            .unwrap_or_else(Vector3::zeros);
        Some(normal)
    }

    fn face_area(&self, face: usize) -> f64 {
        self.triangles.get(face).map_or(0.0, Triangle::area)
    }

    fn extents(&self) -> Extents {
        self.bounding_box()
            .map(|bbox| bbox.extents())
            .unwrap_or_default()
    }

    fn volume(&self) -> f64 {
        self.triangles
            .iter()
            .map(Triangle::signed_volume)
            .sum::<f64>()
            .abs()
    }
}
