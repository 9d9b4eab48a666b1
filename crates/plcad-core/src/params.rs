//! Parameter types handed from the resolver to lantern builders.

use std::collections::BTreeMap;
use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::{ErrorInfo, PlcadError};

/// Mode or modes a simulation launches its field from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LaunchMode {
    /// Launch from a single core.
    Single(String),
    /// Launch simultaneously from several cores.
    Multiple(Vec<String>),
}

impl LaunchMode {
    /// Returns the launched core identifiers in order.
    pub fn modes(&self) -> Vec<&str> {
        match self {
            LaunchMode::Single(mode) => vec![mode.as_str()],
            LaunchMode::Multiple(modes) => modes.iter().map(String::as_str).collect(),
        }
    }
}

impl From<&str> for LaunchMode {
    fn from(mode: &str) -> Self {
        LaunchMode::Single(mode.to_string())
    }
}

impl fmt::Display for LaunchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.modes().join(","))
    }
}

/// Monitor attached to each fiber pathway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MonitorType {
    /// Power carried by the fiber mode.
    #[default]
    FiberPower,
    /// Partial power captured within the pathway.
    PartialPower,
    /// Total waveguide power.
    WgPower,
    /// Effective index of the local field.
    FieldNeff,
}

impl MonitorType {
    /// Engine tag written into design files.
    pub fn tag(&self) -> &'static str {
        match self {
            MonitorType::FiberPower => "MONITOR_FIBER_POWER",
            MonitorType::PartialPower => "MONITOR_PARTIAL_POWER",
            MonitorType::WgPower => "MONITOR_WG_POWER",
            MonitorType::FieldNeff => "MONITOR_FIELD_NEFF",
        }
    }
}

/// Spatial profile of the launched field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LaunchType {
    /// Gaussian beam matched to the core.
    #[default]
    Gaussian,
    /// Rectangular top-hat field.
    Rectangle,
    /// Waveguide eigenmode.
    WgMode,
}

impl LaunchType {
    /// Engine tag written into design files.
    pub fn tag(&self) -> &'static str {
        match self {
            LaunchType::Gaussian => "LAUNCH_GAUSSIAN",
            LaunchType::Rectangle => "LAUNCH_RECTANGLE",
            LaunchType::WgMode => "LAUNCH_WGMODE",
        }
    }
}

/// Longitudinal profile applied to tapered segments.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaperType {
    /// Linear narrowing.
    #[default]
    Linear,
    /// Exponential narrowing.
    Exponential,
    /// Profile read by the engine from a user taper file.
    User {
        /// Path of the taper definition file.
        file: String,
    },
}

impl TaperType {
    /// Engine tag written into design files.
    pub fn tag(&self) -> &'static str {
        match self {
            TaperType::Linear => "TAPER_LINEAR",
            TaperType::Exponential => "TAPER_EXPONENTIAL",
            TaperType::User { .. } => "TAPER_USER_1",
        }
    }
}

/// Taper profile for the whole lantern or per segment (`core`, `cladding`, `cap`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TaperConfig {
    /// The same profile for every segment.
    Uniform(TaperType),
    /// Profiles keyed by segment name; missing segments taper linearly.
    PerSegment(BTreeMap<String, TaperType>),
}

impl Default for TaperConfig {
    fn default() -> Self {
        TaperConfig::Uniform(TaperType::Linear)
    }
}

impl TaperConfig {
    /// Profile applied to the named segment.
    pub fn for_segment(&self, segment: &str) -> TaperType {
        match self {
            TaperConfig::Uniform(taper) => taper.clone(),
            TaperConfig::PerSegment(map) => map.get(segment).cloned().unwrap_or_default(),
        }
    }

    /// User taper files referenced anywhere in the configuration.
    pub fn user_files(&self) -> Vec<&str> {
        let tapers: Vec<&TaperType> = match self {
            TaperConfig::Uniform(taper) => vec![taper],
            TaperConfig::PerSegment(map) => map.values().collect(),
        };
        let mut files = Vec::new();
        for taper in tapers {
            if let TaperType::User { file } = taper {
                if !files.contains(&file.as_str()) {
                    files.push(file.as_str());
                }
            }
        }
        files
    }
}

/// Merged parameter set passed to [`crate::LanternBuilder::create_lantern`].
///
/// The typed fields are shared by every archetype; `options` carries the
/// archetype's primary parameter followed by any other archetype-specific
/// option, verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LanternParams {
    /// Core or cores the field is launched from.
    pub launch_mode: LaunchMode,
    /// Run identifier.
    pub opt_name: String,
    /// Ratio of input to output diameter.
    pub taper_factor: f64,
    /// Taper length in microns.
    pub taper_length: f64,
    /// Per-core core diameter overrides.
    pub core_dia_dict: Option<BTreeMap<String, f64>>,
    /// Per-core cladding diameter overrides.
    pub cladding_dia_dict: Option<BTreeMap<String, f64>>,
    /// Per-core background index overrides.
    pub bg_index_dict: Option<BTreeMap<String, f64>>,
    /// Per-core cladding index overrides.
    pub cladding_index_dict: Option<BTreeMap<String, f64>>,
    /// Per-core core index overrides.
    pub core_index_dict: Option<BTreeMap<String, f64>>,
    /// Monitor attached to each fiber pathway.
    pub monitor_type: MonitorType,
    /// Launch field profile.
    pub launch_type: LaunchType,
    /// Taper profile selection.
    pub taper_config: TaperConfig,
    /// Capillary outer diameter in microns.
    pub capillary_od: f64,
    /// Capillary inner diameter at the end of the taper, in microns.
    pub final_capillary_id: f64,
    /// Number of longitudinal samples in the taper model.
    pub num_points: usize,
    /// Archetype-specific options keyed by name.
    pub options: BTreeMap<String, Value>,
}

impl LanternParams {
    /// Raw value of an archetype-specific option.
    pub fn option(&self, key: &str) -> Option<&Value> {
        self.options.get(key)
    }

    /// Decodes a required archetype-specific option into `T`.
    pub fn require<T: DeserializeOwned>(&self, key: &str) -> Result<T, PlcadError> {
        let value = self.options.get(key).ok_or_else(|| {
            PlcadError::Construction(
                ErrorInfo::new("params.option_missing", "builder option not supplied")
                    .with_context("option", key),
            )
        })?;
        serde_json::from_value(value.clone()).map_err(|err| {
            PlcadError::Construction(
                ErrorInfo::new("params.option_malformed", "builder option has the wrong shape")
                    .with_context("option", key)
                    .with_context("value", value.to_string())
                    .with_hint(err.to_string()),
            )
        })
    }
}
