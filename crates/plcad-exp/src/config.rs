use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use plcad_core::errors::{ErrorInfo, PlcadError};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::params::{CommonParams, RESERVED_MANIFEST_KEYS};
use crate::serde::from_json_slice;
use crate::{make_parameterised_lantern, ArchetypeRegistry, LanternArtifacts};

/// One generation job: the archetype, its common parameters and any
/// archetype-specific options, all at the top level of the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobConfig {
    /// Registered archetype name.
    pub lantern_type: String,
    /// Shared parameters; absent keys take their defaults.
    #[serde(flatten)]
    pub common: CommonParams,
    /// Every other top-level key, passed to the archetype verbatim.
    #[serde(flatten)]
    pub options: BTreeMap<String, Value>,
}

impl JobConfig {
    /// Job for `lantern_type` with default common parameters and no options.
    pub fn new(lantern_type: impl Into<String>) -> Self {
        Self {
            lantern_type: lantern_type.into(),
            common: CommonParams::default(),
            options: BTreeMap::new(),
        }
    }

    /// Adds or replaces an archetype option.
    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    /// Runs the job against `registry`.
    pub fn run(&self, registry: &ArchetypeRegistry) -> Result<LanternArtifacts, PlcadError> {
        make_parameterised_lantern(registry, &self.lantern_type, &self.common, &self.options)
    }
}

/// Parses a job from YAML (a superset of JSON).
pub fn parse_job(text: &str) -> Result<JobConfig, PlcadError> {
    serde_yaml::from_str(text).map_err(|err| {
        let mut info = ErrorInfo::new("config.parse", err.to_string());
        if let Some(location) = err.location() {
            info = info
                .with_context("line", location.line().to_string())
                .with_context("column", location.column().to_string());
        }
        PlcadError::Serde(info)
    })
}

/// Reads and parses a job file.
pub fn load_job(path: &Path) -> Result<JobConfig, PlcadError> {
    let text = fs::read_to_string(path).map_err(|err| PlcadError::io("config.read", path, err))?;
    parse_job(&text).map_err(|err| match err {
        PlcadError::Serde(info) => {
            PlcadError::Serde(info.with_context("path", path.display().to_string()))
        }
        other => other,
    })
}

/// Rebuilds the job that produced a manifest; derived domain keys and the
/// engine record are dropped.
pub fn job_from_manifest(bytes: &[u8]) -> Result<JobConfig, PlcadError> {
    let mut manifest: serde_json::Map<String, Value> = from_json_slice(bytes)?;
    for key in RESERVED_MANIFEST_KEYS {
        if key != "lantern_type" {
            manifest.remove(key);
        }
    }
    serde_json::from_value(Value::Object(manifest)).map_err(|err| {
        PlcadError::Serde(
            ErrorInfo::new("config.manifest", err.to_string())
                .with_hint("the manifest must come from a plcad run"),
        )
    })
}

/// Reads a manifest file and rebuilds its job.
pub fn load_manifest(path: &Path) -> Result<JobConfig, PlcadError> {
    let bytes = fs::read(path).map_err(|err| PlcadError::io("config.read", path, err))?;
    job_from_manifest(&bytes)
}
