/// Terminal front end for batch part analysis
use orient_core::{
    analysis::display_name, write_csv, write_json, AnalysisConfig, AnalysisError, AnalysisResult,
    Analyzer, BatchReport, FileError,
};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

pub mod cli;
pub mod printer;

pub use cli::Cli;
pub use printer::ReportPrinter;

/// Where to write the accumulated records once the batch is done.
#[derive(Debug, Clone, Default)]
pub struct ExportTargets {
    pub csv: Option<PathBuf>,
    pub json: Option<PathBuf>,
}

impl ExportTargets {
    pub fn is_empty(&self) -> bool {
        self.csv.is_none() && self.json.is_none()
    }
}

/// Runs a batch of files through the analyzer and reports on the console.
pub struct TerminalApp {
    analyzer: Analyzer,
    printer: ReportPrinter,
    parallel: bool,
}

impl TerminalApp {
    pub fn new(config: &AnalysisConfig, printer: ReportPrinter) -> Result<Self, AnalysisError> {
        Ok(Self {
            analyzer: Analyzer::new(config)?,
            printer,
            parallel: false,
        })
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Analyse every file, printing as it goes. A file that fails is
    /// reported and the batch moves on.
    pub fn run<W: Write>(&self, paths: &[PathBuf], out: &mut W) -> io::Result<BatchReport> {
        let report = if self.parallel {
            self.run_parallel(paths, out)?
        } else {
            self.run_sequential(paths, out)?
        };
        self.printer.finished(out, &report)?;
        Ok(report)
    }

    fn run_sequential<W: Write>(&self, paths: &[PathBuf], out: &mut W) -> io::Result<BatchReport> {
        let total = paths.len();
        let mut report = BatchReport::default();
        for (index, path) in paths.iter().enumerate() {
            self.printer.progress(out, index + 1, total, &display_name(path))?;
            let outcome = self.analyzer.analyze_file(path);
            self.print_outcome(out, &outcome)?;
            report.push(outcome);
        }
        Ok(report)
    }

    /// Analysis runs on the rayon pool; printing waits for all of it and
    /// then follows input order.
    fn run_parallel<W: Write>(&self, paths: &[PathBuf], out: &mut W) -> io::Result<BatchReport> {
        let total = paths.len();
        self.printer
            .note(out, &format!("Analysing {total} files in parallel"))?;
        let outcomes = self.analyzer.analyze_files_parallel(paths);

        let mut report = BatchReport::default();
        for (index, (path, outcome)) in paths.iter().zip(outcomes).enumerate() {
            self.printer.progress(out, index + 1, total, &display_name(path))?;
            self.print_outcome(out, &outcome)?;
            report.push(outcome);
        }
        Ok(report)
    }

    fn print_outcome<W: Write>(&self, out: &mut W, outcome: &Result<AnalysisResult, FileError>) -> io::Result<()> {
        match outcome {
            Ok(result) => self.printer.result(out, result),
            Err(failure) => self.printer.failure(out, failure),
        }
    }

    /// Write the successful records to each requested target.
    pub fn export<W: Write>(&self, report: &BatchReport, targets: &ExportTargets, out: &mut W) -> io::Result<()> {
        if targets.is_empty() {
            return Ok(());
        }
        if report.results.is_empty() {
            return self
                .printer
                .warning(out, "No Data: analyse files successfully before exporting.");
        }

        let rows = report.rows();
        if let Some(path) = &targets.csv {
            write_csv(&rows, BufWriter::new(File::create(path)?))?;
            self.exported(out, path)?;
        }
        if let Some(path) = &targets.json {
            write_json(&rows, BufWriter::new(File::create(path)?))?;
            self.exported(out, path)?;
        }
        Ok(())
    }

    fn exported<W: Write>(&self, out: &mut W, path: &Path) -> io::Result<()> {
        tracing::info!(path = %path.display(), "exported results");
        writeln!(out, "Data exported to {}", path.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Minimal binary STL of one downward-facing triangle.
    fn triangle_stl() -> Vec<u8> {
        let mut data = vec![0u8; 80];
        data.extend_from_slice(&1u32.to_le_bytes());
        let floats: [f32; 12] = [
            0.0, 0.0, -1.0, // normal
            0.0, 0.0, 0.0, //
            0.0, 20.0, 0.0, //
            20.0, 0.0, 0.0,
        ];
        for value in floats {
            data.extend_from_slice(&value.to_le_bytes());
        }
        data.extend_from_slice(&[0, 0]);
        data
    }

    fn app() -> TerminalApp {
        TerminalApp::new(&AnalysisConfig::default(), ReportPrinter::plain()).unwrap()
    }

    #[test]
    fn test_run_reports_each_file() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("plate.stl");
        std::fs::write(&good, triangle_stl()).unwrap();
        let paths = vec![dir.path().join("missing.stl"), good];

        let mut out = Vec::new();
        let report = app().run(&paths, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert_eq!(report.results.len(), 1);
        assert_eq!(report.results[0].overhang_area, 200.0);
        assert!(text.starts_with("[1/2] missing.stl\nmissing.stl - ERROR: Failed to read file"));
        assert!(text.contains("[2/2] plate.stl\nFile: plate.stl\n"));
        assert!(text.ends_with("All files processed.\n1 of 2 files could not be analysed.\n"));
    }

    #[test]
    fn test_parallel_run_matches_sequential() {
        let dir = tempfile::tempdir().unwrap();
        let paths: Vec<_> = (0..4)
            .map(|i| {
                let path = dir.path().join(format!("plate_{i}.stl"));
                std::fs::write(&path, triangle_stl()).unwrap();
                path
            })
            .collect();

        let sequential = app().run(&paths, &mut io::sink()).unwrap();
        let parallel = app().with_parallel(true).run(&paths, &mut io::sink()).unwrap();
        assert_eq!(sequential.results, parallel.results);
    }

    #[test]
    fn test_parallel_output_follows_input_order() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("first.stl");
        let last = dir.path().join("last.stl");
        std::fs::write(&first, triangle_stl()).unwrap();
        std::fs::write(&last, triangle_stl()).unwrap();
        let paths = vec![first, dir.path().join("part.step"), last];

        let mut sequential = Vec::new();
        app().run(&paths, &mut sequential).unwrap();
        let mut parallel = Vec::new();
        app().with_parallel(true).run(&paths, &mut parallel).unwrap();

        let sequential = String::from_utf8(sequential).unwrap();
        let parallel = String::from_utf8(parallel).unwrap();
        assert_eq!(parallel, format!("Analysing 3 files in parallel\n{sequential}"));
        assert!(parallel.contains("[2/3] part.step\npart.step - ERROR: Unsupported file format: step\n"));
    }

    #[test]
    fn test_export_writes_csv_and_json() {
        let dir = tempfile::tempdir().unwrap();
        let mesh_path = dir.path().join("plate.stl");
        std::fs::write(&mesh_path, triangle_stl()).unwrap();

        let app = app();
        let report = app.run(&[mesh_path], &mut io::sink()).unwrap();
        let targets = ExportTargets {
            csv: Some(dir.path().join("out.csv")),
            json: Some(dir.path().join("out.json")),
        };
        let mut out = Vec::new();
        app.export(&report, &targets, &mut out).unwrap();

        let csv = std::fs::read_to_string(dir.path().join("out.csv")).unwrap();
        assert!(csv.contains("plate.stl,20,20,0,0,200,200,\"EOS M280/290, EOS M400, SLM 500\""));
        let json = std::fs::read_to_string(dir.path().join("out.json")).unwrap();
        assert!(json.contains("\"file\": \"plate.stl\""));
        assert_eq!(String::from_utf8(out).unwrap().lines().count(), 2);
    }

    #[test]
    fn test_export_without_results_warns() {
        let dir = tempfile::tempdir().unwrap();
        let targets = ExportTargets {
            csv: Some(dir.path().join("out.csv")),
            json: None,
        };
        let mut out = Vec::new();
        app().export(&BatchReport::default(), &targets, &mut out).unwrap();

        assert!(String::from_utf8(out).unwrap().starts_with("No Data"));
        assert!(!dir.path().join("out.csv").exists());
    }
}
