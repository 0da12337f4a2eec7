/// Per-file analysis: load, measure, classify overhangs and match machines.
///
/// Every call returns its [`AnalysisResult`] by value. Accumulating results
/// across a batch is the caller's business; [`BatchReport`] is the plain
/// container the batch helpers hand back.
use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::config::AnalysisConfig;
use crate::error::{AnalysisError, FileError};
use crate::fit::{fitting_machines, MachineCatalog};
use crate::geometry::{Extents, TriangulatedSurface};
use crate::load::load_mesh;
use crate::overhang::{overhang_area_with, BuildDirection};
use crate::report::{round2, ReportRow, NO_MACHINE};

/// Measurements for one part. Values are unrounded except `overhang_area`,
/// which the calculator already reports to 2 decimals.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisResult {
    pub file_name: String,
    /// Bounding-box spans in file axis order.
    pub extents: Extents,
    pub volume: f64,
    pub surface_area: f64,
    pub overhang_area: f64,
    /// Threshold the overhang area was computed with, in degrees.
    pub angle_threshold: f64,
    pub fitting_machines: BTreeSet<String>,
}

impl AnalysisResult {
    /// Machine names joined with ", ", or "None" when nothing fits.
    pub fn machine_list(&self) -> String {
        if self.fitting_machines.is_empty() {
            NO_MACHINE.to_string()
        } else {
            self.fitting_machines
                .iter()
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join(", ")
        }
    }

    pub fn to_row(&self) -> ReportRow {
        ReportRow::from(self)
    }
}

impl fmt::Display for AnalysisResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "File: {}", self.file_name)?;
        writeln!(f, "Volume: {} mm³", round2(self.volume))?;
        writeln!(f, "Surface Area: {} mm²", round2(self.surface_area))?;
        writeln!(
            f,
            "Overhang Area (<{}°): {} mm²",
            self.angle_threshold, self.overhang_area
        )?;
        writeln!(
            f,
            "Dimensions: {} × {} × {} mm",
            round2(self.extents.x),
            round2(self.extents.y),
            round2(self.extents.z)
        )?;
        write!(f, "Best Fit Machine: {}", self.machine_list())
    }
}

/// Outcome of a batch: successes and failures, each in input order.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub results: Vec<AnalysisResult>,
    pub failures: Vec<FileError>,
}

impl BatchReport {
    pub fn push(&mut self, outcome: Result<AnalysisResult, FileError>) {
        match outcome {
            Ok(result) => self.results.push(result),
            Err(failure) => self.failures.push(failure),
        }
    }

    pub fn len(&self) -> usize {
        self.results.len() + self.failures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn rows(&self) -> Vec<ReportRow> {
        self.results.iter().map(ReportRow::from).collect()
    }
}

/// Name used to label a file in results and errors.
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Runs the analysis with one configuration. Holds no per-file state, so a
/// shared reference can be used from several threads.
#[derive(Debug, Clone)]
pub struct Analyzer {
    direction: BuildDirection,
    angle_threshold: f64,
    machines: MachineCatalog,
}

impl Analyzer {
    pub fn new(config: &AnalysisConfig) -> Result<Self, AnalysisError> {
        Ok(Self {
            direction: BuildDirection::from_array(config.build_direction)?,
            angle_threshold: config.angle_threshold,
            machines: config.machines.clone(),
        })
    }

    pub fn direction(&self) -> &BuildDirection {
        &self.direction
    }

    pub fn machines(&self) -> &MachineCatalog {
        &self.machines
    }

    /// Analyse a mesh that is already in memory. A mesh without faces is
    /// rejected rather than reported as fitting everywhere.
    pub fn analyze_mesh<S>(&self, file_name: &str, surface: &S) -> Result<AnalysisResult, AnalysisError>
    where
        S: TriangulatedSurface + ?Sized,
    {
        if surface.face_count() == 0 {
            return Err(AnalysisError::GeometryUnavailable);
        }
        let extents = surface.extents();
        let volume = surface.volume();
        let surface_area = surface.surface_area();
        debug!(file = file_name, faces = surface.face_count(), ?extents, "measured mesh");

        let overhang_area = overhang_area_with(surface, &self.direction, self.angle_threshold)?;
        let fitting_machines = fitting_machines(&extents, &self.machines);

        Ok(AnalysisResult {
            file_name: file_name.to_string(),
            extents,
            volume,
            surface_area,
            overhang_area,
            angle_threshold: self.angle_threshold,
            fitting_machines,
        })
    }

    /// Load a mesh file and analyse it. Failures carry the file name.
    pub fn analyze_file(&self, path: impl AsRef<Path>) -> Result<AnalysisResult, FileError> {
        let path = path.as_ref();
        let name = display_name(path);

        let outcome = load_mesh(path)
            .map_err(|e| FileError::new(&name, e))
            .and_then(|mesh| {
                self.analyze_mesh(&name, &mesh)
                    .map_err(|e| FileError::new(&name, e))
            });

        match &outcome {
            Ok(result) => info!(
                file = %name,
                overhang_area = result.overhang_area,
                machines = %result.machine_list(),
                "analysed file"
            ),
            Err(err) => warn!(file = %name, error = %err.kind, "failed to analyse file"),
        }
        outcome
    }

    /// Analyse files one after another; a failing file does not stop the rest.
    pub fn analyze_batch<I, P>(&self, paths: I) -> BatchReport
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut report = BatchReport::default();
        for path in paths {
            report.push(self.analyze_file(path));
        }
        report
    }

    /// Analyse files on the rayon pool. Each worker returns its own outcome;
    /// the outcomes come back in input order.
    pub fn analyze_files_parallel(&self, paths: &[PathBuf]) -> Vec<Result<AnalysisResult, FileError>> {
        paths.par_iter().map(|path| self.analyze_file(path)).collect()
    }

    /// Parallel counterpart of [`Analyzer::analyze_batch`].
    pub fn analyze_batch_parallel(&self, paths: &[PathBuf]) -> BatchReport {
        let mut report = BatchReport::default();
        for outcome in self.analyze_files_parallel(paths) {
            report.push(outcome);
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FileErrorKind;
    use crate::fit::BuildVolume;
    use crate::geometry::Mesh;

    fn two_machine_config() -> AnalysisConfig {
        AnalysisConfig::default().with_machines(
            MachineCatalog::empty()
                .with_machine("EOS M280/290", BuildVolume::new(250.0, 250.0, 315.0).unwrap())
                .with_machine("SLM 500", BuildVolume::new(500.0, 250.0, 315.0).unwrap()),
        )
    }

    #[test]
    fn test_cube_scenario() {
        let analyzer = Analyzer::new(&two_machine_config()).unwrap();
        let result = analyzer.analyze_mesh("cube.stl", &Mesh::cube(200.0)).unwrap();

        assert_eq!(result.extents, Extents::new(200.0, 200.0, 200.0));
        assert_eq!(result.overhang_area, 40_000.0);
        assert_eq!(round2(result.surface_area), 240_000.0);
        assert_eq!(round2(result.volume), 8_000_000.0);
        assert_eq!(result.machine_list(), "EOS M280/290, SLM 500");
    }

    #[test]
    fn test_summary_block() {
        let analyzer = Analyzer::new(&AnalysisConfig::default()).unwrap();
        let result = analyzer.analyze_mesh("cube.stl", &Mesh::cube(10.0)).unwrap();
        let text = result.to_string();

        assert_eq!(
            text,
            "File: cube.stl\n\
             Volume: 1000 mm³\n\
             Surface Area: 600 mm²\n\
             Overhang Area (<45°): 100 mm²\n\
             Dimensions: 10 × 10 × 10 mm\n\
             Best Fit Machine: EOS M280/290, EOS M400, SLM 500"
        );
    }

    #[test]
    fn test_nothing_fits() {
        let analyzer = Analyzer::new(&AnalysisConfig::default()).unwrap();
        let result = analyzer.analyze_mesh("huge.stl", &Mesh::cube(1000.0)).unwrap();
        assert!(result.fitting_machines.is_empty());
        assert_eq!(result.machine_list(), "None");
        assert_eq!(result.to_row().machines, "None");
    }

    #[test]
    fn test_invalid_direction_fails_up_front() {
        let config = AnalysisConfig::default().with_build_direction([0.0, 0.0, 0.0]);
        assert!(matches!(
            Analyzer::new(&config),
            Err(AnalysisError::InvalidDirection(_))
        ));
    }

    #[test]
    fn test_batch_continues_after_failure() {
        let analyzer = Analyzer::new(&AnalysisConfig::default()).unwrap();
        let report = analyzer.analyze_batch(["missing.stl", "part.step", "other.obj"]);

        assert_eq!(report.len(), 3);
        assert!(report.results.is_empty());
        let names: Vec<_> = report.failures.iter().map(|f| f.file_name.as_str()).collect();
        assert_eq!(names, vec!["missing.stl", "part.step", "other.obj"]);
    }

    #[test]
    fn test_mesh_without_faces_is_rejected() {
        let analyzer = Analyzer::new(&AnalysisConfig::default()).unwrap();
        assert_eq!(
            analyzer.analyze_mesh("empty.stl", &Mesh::new()),
            Err(AnalysisError::GeometryUnavailable)
        );

        // Header plus a triangle count of zero
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.stl");
        std::fs::write(&path, [0u8; 84]).unwrap();

        let report = analyzer.analyze_batch([&path]);
        assert!(report.results.is_empty());
        assert_eq!(report.failures[0].file_name, "empty.stl");
        assert!(matches!(
            report.failures[0].kind,
            FileErrorKind::Analysis(AnalysisError::GeometryUnavailable)
        ));
    }

    #[test]
    fn test_parallel_outcomes_keep_input_order() {
        let dir = tempfile::tempdir().unwrap();
        let cube = dir.path().join("cube.obj");
        std::fs::write(&cube, "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n").unwrap();
        let paths = vec![dir.path().join("missing.stl"), cube, dir.path().join("part.step")];

        let analyzer = Analyzer::new(&AnalysisConfig::default()).unwrap();
        let outcomes = analyzer.analyze_files_parallel(&paths);
        assert!(outcomes[0].is_err());
        assert_eq!(outcomes[1].as_ref().unwrap().file_name, "cube.obj");
        assert!(outcomes[2].is_err());
    }

    #[test]
    fn test_display_name_uses_file_name() {
        assert_eq!(display_name(Path::new("/parts/bracket.stl")), "bracket.stl");
    }
}
