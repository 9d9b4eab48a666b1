use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use plcad_core::errors::{ErrorInfo, PlcadError};
use plcad_core::{LanternBuilder, LaunchMode};
use serde_json::{Map, Value};
use tracing::info;

use crate::domain::SimulationDomain;
use crate::params::{CommonParams, SimType};
use crate::serde::to_pretty_json_bytes;

/// Flat, key-sorted record of everything an invocation used.
pub type Manifest = Map<String, Value>;

/// `{sim_type}_{file_prefix}_{core_count}_cores_{opt_name}.ind`
pub fn design_file_name(
    sim_type: SimType,
    file_prefix: &str,
    core_count: usize,
    opt_name: &str,
) -> String {
    format!("{sim_type}_{file_prefix}_{core_count}_cores_{opt_name}.ind")
}

/// `params_{opt_name}.json`
pub fn manifest_file_name(opt_name: &str) -> String {
    format!("params_{opt_name}.json")
}

/// `<data_dir>/<expt_dir>`
pub fn output_dir(common: &CommonParams) -> PathBuf {
    Path::new(&common.data_dir).join(&common.expt_dir)
}

/// Collects the common parameters (with the effective launch mode), the
/// derived domain, the engine record and every archetype option.
///
/// The X grid spacing is written twice, as `grid_size` and `grid_size_x`.
pub fn build_manifest(
    lantern_type: &str,
    domain: &SimulationDomain,
    common: &CommonParams,
    launch_mode: &LaunchMode,
    options: &BTreeMap<String, Value>,
) -> Result<Manifest, PlcadError> {
    let mut manifest = to_object(common, "common")?;
    manifest.insert("launch_mode".into(), to_value(launch_mode, "launch_mode")?);
    manifest.extend(to_object(&domain.geometry, "domain")?);
    // `grid_size` is the design-file name for the X spacing.
    manifest.insert("grid_size_x".into(), domain.geometry.grid_size_x.into());
    manifest.insert("engine".into(), to_value(&domain.engine, "engine")?);
    manifest.insert("lantern_type".into(), Value::String(lantern_type.to_string()));
    for (key, value) in options {
        manifest.insert(key.clone(), value.clone());
    }
    Ok(manifest)
}

/// Where an invocation's artifacts were written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmittedPaths {
    /// Design file path.
    pub design: PathBuf,
    /// Manifest path.
    pub manifest: PathBuf,
}

/// Writes the design file, then the manifest, under `output_dir`.
///
/// A failure writing the manifest leaves the design file in place.
pub fn emit(
    lantern: &dyn LanternBuilder,
    output_dir: &Path,
    file_name: &str,
    opt_name: &str,
    manifest: &Manifest,
) -> Result<EmittedPaths, PlcadError> {
    fs::create_dir_all(output_dir)
        .map_err(|err| PlcadError::io("emit.create_dir", output_dir, err))?;

    let design = output_dir.join(file_name);
    info!(path = %design.display(), "writing design file");
    lantern.write(&design)?;

    let manifest_path = output_dir.join(manifest_file_name(opt_name));
    info!(path = %manifest_path.display(), "saving parameters");
    let bytes = to_pretty_json_bytes(manifest)?;
    fs::write(&manifest_path, bytes)
        .map_err(|err| PlcadError::io("emit.manifest_write", &manifest_path, err))?;

    Ok(EmittedPaths {
        design,
        manifest: manifest_path,
    })
}

fn to_value<T: serde::Serialize>(value: &T, section: &str) -> Result<Value, PlcadError> {
    serde_json::to_value(value).map_err(|err| {
        PlcadError::Serde(
            ErrorInfo::new("manifest.encode", err.to_string()).with_context("section", section),
        )
    })
}

fn to_object<T: serde::Serialize>(value: &T, section: &str) -> Result<Manifest, PlcadError> {
    match to_value(value, section)? {
        Value::Object(map) => Ok(map),
        other => Err(PlcadError::Serde(
            ErrorInfo::new("manifest.shape", "expected a JSON object")
                .with_context("section", section)
                .with_context("value", other.to_string()),
        )),
    }
}
