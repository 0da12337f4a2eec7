/// Tunable analysis parameters: build direction, overhang threshold and the
/// machine catalog.
///
/// Loaded from JSON so new printers can be added without a rebuild:
///
/// ```json
/// {
///   "build_direction": [0.0, 0.0, -1.0],
///   "angle_threshold": 45.0,
///   "machines": {
///     "EOS M400": [400.0, 400.0, 400.0]
///   }
/// }
/// ```
///
/// Missing fields take their defaults.
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::fit::{BuildVolume, MachineCatalog};
use crate::overhang::{BuildDirection, DEFAULT_ANGLE_THRESHOLD};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalysisConfig {
    /// Direction material is deposited in; need not be normalized.
    pub build_direction: [f64; 3],

    /// Faces whose normal is closer than this many degrees to the build
    /// direction count as overhang.
    pub angle_threshold: f64,

    pub machines: MachineCatalog,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            build_direction: [0.0, 0.0, -1.0],
            angle_threshold: DEFAULT_ANGLE_THRESHOLD,
            machines: MachineCatalog::default(),
        }
    }
}

impl AnalysisConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Build volumes are checked as they are deserialized; this covers the
    /// direction.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.direction().map(|_| ())
    }

    pub fn direction(&self) -> Result<BuildDirection, ConfigError> {
        Ok(BuildDirection::from_array(self.build_direction)?)
    }

    pub fn with_build_direction(mut self, direction: [f64; 3]) -> Self {
        self.build_direction = direction;
        self
    }

    pub fn with_angle_threshold(mut self, degrees: f64) -> Self {
        self.angle_threshold = degrees;
        self
    }

    pub fn with_machine(mut self, name: impl Into<String>, volume: BuildVolume) -> Self {
        self.machines.insert(name, volume);
        self
    }

    pub fn with_machines(mut self, machines: MachineCatalog) -> Self {
        self.machines = machines;
        self
    }
}
