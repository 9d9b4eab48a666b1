use std::collections::BTreeMap;
use std::fmt;

use plcad_core::errors::{ErrorInfo, PlcadError};
use plcad_core::{LanternParams, LaunchMode, LaunchType, MonitorType, TaperConfig};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::domain::DomainInputs;
use crate::registry::ArchetypeDescriptor;

/// Parameters shared by every lantern archetype. Every field has a default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommonParams {
    /// Launch core(s); the archetype default applies when absent.
    pub launch_mode: Option<LaunchMode>,
    /// Run identifier used in file names.
    pub opt_name: String,
    /// Input-to-output diameter ratio.
    pub taper_factor: f64,
    /// Taper length in microns.
    pub taper_length: f64,
    /// `beamprop` or `femsim`.
    pub sim_type: String,
    /// Number of FEM eigenmodes.
    pub femnev: u32,
    /// Seed the FEM solver with effective indices.
    pub save_neff: bool,
    /// Explicit X grid step in microns.
    pub step_x: Option<f64>,
    /// Explicit Y grid step in microns.
    pub step_y: Option<f64>,
    /// Axial position the simulation window is sized at.
    pub domain_min: f64,
    /// Root output directory.
    pub data_dir: String,
    /// Experiment directory under `data_dir`.
    pub expt_dir: String,
    /// Mode output format tag.
    pub mode_output: String,
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
    /// Capillary inner diameter at the taper exit, in microns.
    pub final_capillary_id: f64,
    /// Longitudinal samples in the taper model.
    pub num_points: usize,
    /// Grid points across the unpadded window.
    pub num_grid: u32,
    /// Padding cells around the window.
    pub num_pads: u32,
    /// Eigenmode ordering: 0 none, 1 highest first, 2 lowest first.
    pub sort_neff: i64,
}

impl Default for CommonParams {
    fn default() -> Self {
        Self {
            launch_mode: None,
            opt_name: "run_000".to_string(),
            taper_factor: 21.0,
            taper_length: 80_000.0,
            sim_type: "beamprop".to_string(),
            femnev: 1,
            save_neff: true,
            step_x: None,
            step_y: None,
            domain_min: 0.0,
            data_dir: "output".to_string(),
            expt_dir: "pl_property_scan".to_string(),
            mode_output: "OUTPUT_REAL_IMAG".to_string(),
            core_dia_dict: None,
            cladding_dia_dict: None,
            bg_index_dict: None,
            cladding_index_dict: None,
            core_index_dict: None,
            monitor_type: MonitorType::default(),
            launch_type: LaunchType::default(),
            taper_config: TaperConfig::default(),
            capillary_od: 900.0,
            final_capillary_id: 40.0,
            num_points: 100,
            num_grid: 200,
            num_pads: 50,
            sort_neff: 1,
        }
    }
}

/// Field names of [`CommonParams`]; archetype options may not reuse them.
pub const COMMON_PARAM_NAMES: [&str; 27] = [
    "launch_mode",
    "opt_name",
    "taper_factor",
    "taper_length",
    "sim_type",
    "femnev",
    "save_neff",
    "step_x",
    "step_y",
    "domain_min",
    "data_dir",
    "expt_dir",
    "mode_output",
    "core_dia_dict",
    "cladding_dia_dict",
    "bg_index_dict",
    "cladding_index_dict",
    "core_index_dict",
    "monitor_type",
    "launch_type",
    "taper_config",
    "capillary_od",
    "final_capillary_id",
    "num_points",
    "num_grid",
    "num_pads",
    "sort_neff",
];

/// Manifest keys written alongside the parameters; archetype options may not reuse them.
pub const RESERVED_MANIFEST_KEYS: [&str; 9] = [
    "lantern_type",
    "boundary_max",
    "boundary_min",
    "boundary_max_y",
    "boundary_min_y",
    "grid_size",
    "grid_size_x",
    "grid_size_y",
    "engine",
];

/// Simulation engine selected for the design.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SimType {
    /// Beam propagation.
    Beamprop,
    /// Finite-element mode solver.
    Femsim,
}

impl SimType {
    /// Parses `beamprop` or `femsim`.
    pub fn parse(raw: &str) -> Result<Self, PlcadError> {
        match raw {
            "beamprop" => Ok(SimType::Beamprop),
            "femsim" => Ok(SimType::Femsim),
            other => Err(PlcadError::InvalidSimulationType(
                ErrorInfo::new("params.sim_type", "unsupported simulation type")
                    .with_context("sim_type", other)
                    .with_hint("expected 'beamprop' or 'femsim'"),
            )),
        }
    }

    /// Engine tool tag.
    pub fn tool(&self) -> &'static str {
        match self {
            SimType::Beamprop => "ST_BEAMPROP",
            SimType::Femsim => "ST_FEMSIM",
        }
    }

    /// Name used in file names and manifests.
    pub fn as_str(&self) -> &'static str {
        match self {
            SimType::Beamprop => "beamprop",
            SimType::Femsim => "femsim",
        }
    }
}

impl fmt::Display for SimType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Eigenmode ordering requested from the FEM solver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortNeff {
    /// Solver order.
    Unsorted,
    /// Highest effective index first.
    HighestFirst,
    /// Lowest effective index first.
    LowestFirst,
}

impl SortNeff {
    /// Validates a `sort_neff` code.
    pub fn from_code(code: i64) -> Result<Self, PlcadError> {
        match code {
            0 => Ok(SortNeff::Unsorted),
            1 => Ok(SortNeff::HighestFirst),
            2 => Ok(SortNeff::LowestFirst),
            other => Err(PlcadError::InvalidParameter(
                ErrorInfo::new("params.sort_neff", "sort_neff must be 0, 1 or 2")
                    .with_context("sort_neff", other.to_string()),
            )),
        }
    }

    /// Engine code.
    pub fn code(&self) -> i64 {
        match self {
            SortNeff::Unsorted => 0,
            SortNeff::HighestFirst => 1,
            SortNeff::LowestFirst => 2,
        }
    }
}

/// Validated inputs for one builder invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedInvocation {
    /// Validated simulation type.
    pub sim_type: SimType,
    /// Validated eigenmode ordering.
    pub sort_neff: SortNeff,
    /// Pre-validated domain inputs.
    pub domain: DomainInputs,
    /// Parameters handed to the builder.
    pub lantern_params: LanternParams,
}

/// Validates `common` and `options` against `descriptor` and merges them.
///
/// Nothing is constructed here: every check runs before a builder exists.
/// Only the descriptor's required names are checked for presence; a primary
/// parameter outside that list is left for the builder to demand.
pub fn resolve(
    descriptor: &ArchetypeDescriptor,
    common: &CommonParams,
    options: &BTreeMap<String, Value>,
) -> Result<ResolvedInvocation, PlcadError> {
    let mut missing: Vec<&str> = Vec::new();
    for name in &descriptor.required_params {
        if !options.contains_key(name) && !missing.contains(&name.as_str()) {
            missing.push(name);
        }
    }
    if !missing.is_empty() {
        return Err(PlcadError::MissingRequiredParameters(
            ErrorInfo::new(
                "params.missing_required",
                "lantern type requires parameters that were not supplied",
            )
            .with_context("file_prefix", descriptor.file_prefix.as_str())
            .with_list("missing", &missing),
        ));
    }

    let shadowing: Vec<&str> = options
        .keys()
        .map(String::as_str)
        .filter(|key| COMMON_PARAM_NAMES.contains(key) || RESERVED_MANIFEST_KEYS.contains(key))
        .collect();
    if !shadowing.is_empty() {
        return Err(PlcadError::InvalidParameter(
            ErrorInfo::new(
                "params.shadowed_option",
                "lantern options reuse reserved parameter names",
            )
            .with_list("options", &shadowing)
            .with_hint("pass shared parameters through the common parameter set"),
        ));
    }

    let sim_type = SimType::parse(&common.sim_type)?;
    let sort_neff = SortNeff::from_code(common.sort_neff)?;
    let domain = DomainInputs::from_common(common);
    domain.validate()?;

    let launch_mode = match &common.launch_mode {
        Some(mode) => mode.clone(),
        None => {
            debug!(launch_mode = %descriptor.default_launch_mode, "using default launch mode");
            descriptor.default_launch_mode.clone()
        }
    };

    let lantern_params = LanternParams {
        launch_mode,
        opt_name: common.opt_name.clone(),
        taper_factor: common.taper_factor,
        taper_length: common.taper_length,
        core_dia_dict: common.core_dia_dict.clone(),
        cladding_dia_dict: common.cladding_dia_dict.clone(),
        bg_index_dict: common.bg_index_dict.clone(),
        cladding_index_dict: common.cladding_index_dict.clone(),
        core_index_dict: common.core_index_dict.clone(),
        monitor_type: common.monitor_type,
        launch_type: common.launch_type,
        taper_config: common.taper_config.clone(),
        capillary_od: common.capillary_od,
        final_capillary_id: common.final_capillary_id,
        num_points: common.num_points,
        options: options.clone(),
    };

    Ok(ResolvedInvocation {
        sim_type,
        sort_neff,
        domain,
        lantern_params,
    })
}
