#![deny(missing_docs)]

//! Parameterised photonic-lantern generation.
//!
//! An [`ArchetypeRegistry`] maps lantern type names to builders. For one
//! invocation, [`make_parameterised_lantern`] validates the parameters against
//! the archetype, builds the lantern, derives the simulation domain from its
//! taper, and writes the design file together with a JSON manifest of every
//! input used.

mod config;
mod domain;
mod emit;
mod params;
mod registry;
mod serde;

use std::collections::BTreeMap;
use std::path::PathBuf;

use plcad_core::errors::PlcadError;
use plcad_core::CoreMap;
use serde_json::Value;
use tracing::{debug, info};

pub use config::{job_from_manifest, load_job, load_manifest, parse_job, JobConfig};
pub use domain::{
    derive_domain, diameter_at, simulation_domain, DomainGeometry, DomainInputs, EngineConfig,
    SimulationDomain, TaperStrategy, DOMAIN_PROPERTY, MIN_Y_PADDING_RATIO,
};
pub use emit::{
    build_manifest, design_file_name, emit, manifest_file_name, output_dir, EmittedPaths,
    Manifest,
};
pub use params::{
    resolve, CommonParams, ResolvedInvocation, SimType, SortNeff, COMMON_PARAM_NAMES,
    RESERVED_MANIFEST_KEYS,
};
pub use registry::{ArchetypeDescriptor, ArchetypeRegistry, BuilderFactory};

pub use crate::serde::{from_json_slice, to_pretty_json_bytes};

/// Everything one invocation produced.
#[derive(Debug, Clone, PartialEq)]
pub struct LanternArtifacts {
    /// `<data_dir>/<expt_dir>`.
    pub output_dir: PathBuf,
    /// Design file name inside `output_dir`.
    pub file_name: String,
    /// Core labels and positions returned by the builder.
    pub core_map: CoreMap,
    /// Derived simulation domain.
    pub domain: SimulationDomain,
    /// Path of the JSON manifest.
    pub manifest_path: PathBuf,
}

impl LanternArtifacts {
    /// Full path of the design file.
    pub fn design_path(&self) -> PathBuf {
        self.output_dir.join(&self.file_name)
    }
}

/// Builds the lantern named `lantern_type` and writes its design file and manifest.
///
/// Validation runs before the builder is created, so a rejected invocation
/// leaves the filesystem untouched.
pub fn make_parameterised_lantern(
    registry: &ArchetypeRegistry,
    lantern_type: &str,
    common: &CommonParams,
    options: &BTreeMap<String, Value>,
) -> Result<LanternArtifacts, PlcadError> {
    let descriptor = registry.resolve(lantern_type)?;
    let resolved = resolve(descriptor, common, options)?;
    info!(
        lantern = %descriptor.file_prefix,
        opt_name = %common.opt_name,
        "creating parameterised lantern"
    );

    let mut lantern = descriptor.build();
    let core_map = lantern.create_lantern(&resolved.lantern_params)?;
    debug!(cores = core_map.len(), "lantern created");

    let engine = EngineConfig::new(resolved.sim_type, resolved.sort_neff, common);
    let domain = simulation_domain(&*lantern, &resolved.domain, engine)?;
    lantern.update_global_params(&domain.design_params());

    let file_name = design_file_name(
        resolved.sim_type,
        &descriptor.file_prefix,
        core_map.len(),
        &common.opt_name,
    );
    let output_dir = output_dir(common);
    let manifest = build_manifest(
        lantern_type,
        &domain,
        common,
        &resolved.lantern_params.launch_mode,
        options,
    )?;
    let paths = emit(&*lantern, &output_dir, &file_name, &common.opt_name, &manifest)?;
    info!(file = %file_name, "lantern creation complete");

    Ok(LanternArtifacts {
        output_dir,
        file_name,
        core_map,
        domain,
        manifest_path: paths.manifest,
    })
}

/// Mode selective lantern supporting every LP mode up to `highest_mode`.
pub fn make_mode_selective_lantern(
    registry: &ArchetypeRegistry,
    highest_mode: &str,
    common: &CommonParams,
) -> Result<LanternArtifacts, PlcadError> {
    let options = BTreeMap::from([("highest_mode".to_string(), Value::from(highest_mode))]);
    make_parameterised_lantern(registry, "mode_selective", common, &options)
}

/// Photonic lantern with fibers in the given `(count, scale)` ring layers.
pub fn make_photonic_lantern(
    registry: &ArchetypeRegistry,
    layer_config: &[(usize, f64)],
    common: &CommonParams,
) -> Result<LanternArtifacts, PlcadError> {
    let layers = layer_config
        .iter()
        .map(|(count, scale)| Value::from(vec![Value::from(*count), Value::from(*scale)]))
        .collect::<Vec<_>>();
    let options = BTreeMap::from([("layer_config".to_string(), Value::from(layers))]);
    make_parameterised_lantern(registry, "photonic", common, &options)
}
