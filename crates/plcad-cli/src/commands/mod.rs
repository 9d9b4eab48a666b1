pub mod archetypes;
pub mod generate;
pub mod replay;

use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use plcad_exp::{to_pretty_json_bytes, LanternArtifacts, TaperStrategy};
use serde::Serialize;
use sha2::{Digest, Sha256};

/// Printed on stdout after every run.
#[derive(Debug, Serialize)]
pub struct RunSummary {
    pub lantern_type: String,
    pub design: PathBuf,
    pub manifest: PathBuf,
    pub cores: usize,
    pub strategy: TaperStrategy,
    pub boundary_max: f64,
    pub grid_size: f64,
    pub manifest_sha256: String,
}

impl RunSummary {
    pub fn from_artifacts(
        lantern_type: &str,
        artifacts: &LanternArtifacts,
    ) -> Result<Self, Box<dyn Error>> {
        Ok(Self {
            lantern_type: lantern_type.to_string(),
            design: artifacts.design_path(),
            manifest: artifacts.manifest_path.clone(),
            cores: artifacts.core_map.len(),
            strategy: artifacts.domain.strategy,
            boundary_max: artifacts.domain.geometry.boundary_max,
            grid_size: artifacts.domain.geometry.grid_size_x,
            manifest_sha256: file_digest(&artifacts.manifest_path)?,
        })
    }
}

/// Hex SHA-256 of a file's bytes.
pub fn file_digest(path: &Path) -> Result<String, Box<dyn Error>> {
    let bytes = fs::read(path)?;
    Ok(hex::encode(Sha256::digest(&bytes)))
}

pub fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn Error>> {
    let bytes = to_pretty_json_bytes(value)?;
    print!("{}", String::from_utf8(bytes)?);
    Ok(())
}
