/// Orientation Assist core library - build-feasibility analysis for 3D parts
///
/// Given a triangulated part, this library measures its bounding box, volume
/// and surface area, computes how much of the surface overhangs in the
/// default build orientation, and lists which printers in a catalog can hold
/// the part when it is turned about its principal axes.
///
/// Analysis is read-only and stateless: every call returns its result by
/// value and meshes are never modified.
pub mod analysis;
pub mod config;
pub mod error;
pub mod fit;
pub mod geometry;
pub mod load;
pub mod obj;
pub mod overhang;
pub mod ply;
pub mod report;
pub mod stl;

// Re-export commonly used types
pub use analysis::{AnalysisResult, Analyzer, BatchReport};
pub use config::AnalysisConfig;
pub use error::{AnalysisError, ConfigError, FileError, FileErrorKind, LoadError};
pub use fit::{fitting_machines, fitting_orientations, BuildVolume, MachineCatalog};
pub use geometry::{BoundingBox, Extents, Mesh, Triangle, TriangulatedSurface};
pub use load::{load_mesh, MeshFormat};
pub use overhang::{overhang_area, overhang_area_with, overhang_faces, BuildDirection, DEFAULT_ANGLE_THRESHOLD};
pub use report::{round2, write_csv, write_json, ReportRow, REPORT_HEADERS};
