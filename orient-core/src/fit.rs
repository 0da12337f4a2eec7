/// Build-volume fit check by axis permutation.
///
/// The part may be turned 90° about its principal axes before it is placed
/// on the plate, so each of the six orderings of its extents is tried against
/// a machine's (x, y, z) limits. Arbitrary-angle placement is not considered.
use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;
use crate::geometry::Extents;

/// Usable build envelope of a printer in mm.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "[f64; 3]", into = "[f64; 3]")]
pub struct BuildVolume {
    x: f64,
    y: f64,
    z: f64,
}

impl BuildVolume {
    pub fn new(x: f64, y: f64, z: f64) -> Result<Self, AnalysisError> {
        if [x, y, z].iter().all(|l| l.is_finite() && *l > 0.0) {
            Ok(Self { x, y, z })
        } else {
            Err(AnalysisError::InvalidBuildVolume { limits: [x, y, z] })
        }
    }

    pub fn limits(&self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }

    fn admits(&self, placed: &Extents) -> bool {
        placed.x <= self.x && placed.y <= self.y && placed.z <= self.z
    }

    /// First ordering of `extents` that fits inside this volume.
    pub fn fits(&self, extents: &Extents) -> Option<Extents> {
        extents
            .permutations()
            .into_iter()
            .find(|placed| self.admits(placed))
    }
}

impl TryFrom<[f64; 3]> for BuildVolume {
    type Error = AnalysisError;

    fn try_from([x, y, z]: [f64; 3]) -> Result<Self, Self::Error> {
        Self::new(x, y, z)
    }
}

impl From<BuildVolume> for [f64; 3] {
    fn from(volume: BuildVolume) -> Self {
        volume.limits()
    }
}

/// Named build volumes to compare parts against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MachineCatalog {
    machines: BTreeMap<String, BuildVolume>,
}

impl MachineCatalog {
    pub fn empty() -> Self {
        Self {
            machines: BTreeMap::new(),
        }
    }

    /// Add or replace a machine.
    pub fn insert(&mut self, name: impl Into<String>, volume: BuildVolume) -> Option<BuildVolume> {
        self.machines.insert(name.into(), volume)
    }

    pub fn with_machine(mut self, name: impl Into<String>, volume: BuildVolume) -> Self {
        self.insert(name, volume);
        self
    }

    pub fn get(&self, name: &str) -> Option<&BuildVolume> {
        self.machines.get(name)
    }

    pub fn len(&self) -> usize {
        self.machines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.machines.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &BuildVolume)> {
        self.machines.iter().map(|(name, volume)| (name.as_str(), volume))
    }
}

impl Default for MachineCatalog {
    fn default() -> Self {
        let machine = |name: &str, x, y, z| (name.to_string(), BuildVolume { x, y, z });
        Self {
            machines: BTreeMap::from([
                machine("EOS M280/290", 250.0, 250.0, 315.0),
                machine("EOS M400", 400.0, 400.0, 400.0),
                machine("SLM 500", 500.0, 250.0, 315.0),
            ]),
        }
    }
}

/// Each fitting machine with the first extent ordering that fits it.
pub fn fitting_orientations(extents: &Extents, catalog: &MachineCatalog) -> BTreeMap<String, Extents> {
    catalog
        .iter()
        .filter_map(|(name, volume)| Some((name.to_string(), volume.fits(extents)?)))
        .collect()
}

/// Names of the machines that can hold the part in some axis ordering.
pub fn fitting_machines(extents: &Extents, catalog: &MachineCatalog) -> BTreeSet<String> {
    fitting_orientations(extents, catalog).into_keys().collect()
}
