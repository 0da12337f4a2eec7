/// Command line options
use clap::Parser;
use orient_core::{AnalysisConfig, ConfigError};
use std::path::PathBuf;

/// Check 3D parts against printer build volumes and report overhang area.
#[derive(Debug, Parser)]
#[command(name = "orient-assist")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Mesh files to analyse (STL or OBJ)
    #[arg(required = true, value_name = "FILES")]
    pub files: Vec<PathBuf>,

    /// JSON file with build direction, threshold and machine catalog
    #[arg(long, value_name = "JSON")]
    pub config: Option<PathBuf>,

    /// Build direction, overrides the config file
    #[arg(long, value_name = "X,Y,Z", value_parser = parse_direction, allow_hyphen_values = true)]
    pub direction: Option<[f64; 3]>,

    /// Overhang angle threshold in degrees, overrides the config file
    #[arg(long, value_name = "DEGREES", allow_hyphen_values = true)]
    pub threshold: Option<f64>,

    /// Export results as CSV
    #[arg(long, value_name = "PATH")]
    pub csv: Option<PathBuf>,

    /// Export results as JSON
    #[arg(long, value_name = "PATH")]
    pub json: Option<PathBuf>,

    /// Analyse files in parallel
    #[arg(long)]
    pub parallel: bool,

    /// Disable coloured output
    #[arg(long)]
    pub no_color: bool,
}

fn parse_direction(value: &str) -> Result<[f64; 3], String> {
    let parts = value
        .split(',')
        .map(|part| part.trim().parse::<f64>().map_err(|e| format!("{part:?}: {e}")))
        .collect::<Result<Vec<_>, _>>()?;
    <[f64; 3]>::try_from(parts)
        .map_err(|parts| format!("expected 3 components, got {}", parts.len()))
}

impl Cli {
    /// Configuration from `--config` (or defaults) with command line
    /// overrides applied and validated.
    pub fn analysis_config(&self) -> Result<AnalysisConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => AnalysisConfig::from_path(path)?,
            None => AnalysisConfig::default(),
        };
        if let Some(direction) = self.direction {
            config = config.with_build_direction(direction);
        }
        if let Some(threshold) = self.threshold {
            config = config.with_angle_threshold(threshold);
        }
        config.validate()?;
        Ok(config)
    }
}
