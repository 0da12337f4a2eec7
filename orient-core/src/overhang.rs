/// Overhang area: how much of a part's surface faces the build plate.
///
/// A face counts as overhang when the angle between its outward normal and
/// the build direction is strictly below the threshold. With the default
/// direction (0, 0, -1) that is every face looking down steeper than the
/// threshold allows, i.e. material that would have nothing underneath it.
use nalgebra::{Unit, Vector3};
use tracing::debug;

use crate::error::AnalysisError;
use crate::geometry::TriangulatedSurface;
use crate::report::round2;

/// Overhang classification boundary in degrees.
pub const DEFAULT_ANGLE_THRESHOLD: f64 = 45.0;

/// A validated, unit-length build direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BuildDirection(Unit<Vector3<f64>>);

impl BuildDirection {
    /// Normalize `direction`, rejecting the zero vector and non-finite input.
    pub fn new(direction: Vector3<f64>) -> Result<Self, AnalysisError> {
        let invalid = || AnalysisError::InvalidDirection([direction.x, direction.y, direction.z]);
        if !direction.iter().all(|c| c.is_finite()) {
            return Err(invalid());
        }
        Unit::try_new(direction, 0.0).map(Self).ok_or_else(invalid)
    }

    pub fn from_array(direction: [f64; 3]) -> Result<Self, AnalysisError> {
        Self::new(Vector3::from(direction))
    }

    pub fn as_vector(&self) -> &Vector3<f64> {
        self.0.as_ref()
    }
}

impl Default for BuildDirection {
    fn default() -> Self {
        Self(-Vector3::z_axis())
    }
}

/// Angle in degrees between a face normal and the build direction.
fn angle_to_direction(normal: &Vector3<f64>, direction: &BuildDirection) -> f64 {
    // Clamp before acos; unit vectors can dot to 1.0000000000000002.
    normal
        .dot(direction.as_vector())
        .clamp(-1.0, 1.0)
        .acos()
        .to_degrees()
}

/// Indices of the faces classified as overhang.
pub fn overhang_faces<S>(
    surface: &S,
    direction: &BuildDirection,
    angle_threshold: f64,
) -> Result<Vec<usize>, AnalysisError>
where
    S: TriangulatedSurface + ?Sized,
{
    let mut faces = Vec::new();
    for face in 0..surface.face_count() {
        let normal = surface
            .face_normal(face)
            .ok_or(AnalysisError::MissingFaceNormal { face })?;
        if !normal.iter().all(|c| c.is_finite()) {
            return Err(AnalysisError::NonFiniteGeometry { face });
        }
        if angle_to_direction(&normal, direction) < angle_threshold {
            faces.push(face);
        }
    }
    Ok(faces)
}

/// Overhang area with an already validated direction, rounded to 2 decimals.
pub fn overhang_area_with<S>(
    surface: &S,
    direction: &BuildDirection,
    angle_threshold: f64,
) -> Result<f64, AnalysisError>
where
    S: TriangulatedSurface + ?Sized,
{
    let faces = overhang_faces(surface, direction, angle_threshold)?;
    let mut area = 0.0;
    for &face in &faces {
        let face_area = surface.face_area(face);
        if !face_area.is_finite() {
            return Err(AnalysisError::NonFiniteGeometry { face });
        }
        area += face_area;
    }
    debug!(
        faces = faces.len(),
        total = surface.face_count(),
        area,
        "classified overhang faces"
    );
    Ok(round2(area))
}

/// Total area of faces whose normal lies within `angle_threshold` degrees of
/// `direction`, rounded to 2 decimals.
///
/// `direction` need not be normalized, but must be finite and non-zero.
/// A surface without faces has an overhang area of `0.0`.
pub fn overhang_area<S>(
    surface: &S,
    direction: Vector3<f64>,
    angle_threshold: f64,
) -> Result<f64, AnalysisError>
where
    S: TriangulatedSurface + ?Sized,
{
    let direction = BuildDirection::new(direction)?;
    overhang_area_with(surface, &direction, angle_threshold)
}
