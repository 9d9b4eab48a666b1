use std::error::Error;
use std::path::PathBuf;

use clap::Args;
use plcad_exp::{load_manifest, ArchetypeRegistry};
use tracing::{info, warn};

use super::{file_digest, print_json, RunSummary};

#[derive(Args, Debug)]
pub struct ReplayArgs {
    /// Parameter manifest written by an earlier run.
    #[arg(long)]
    pub manifest: PathBuf,
    /// Writes the replayed artifacts under this directory instead of the recorded one.
    #[arg(long)]
    pub data_dir: Option<PathBuf>,
    /// Fail unless the replayed manifest is byte-identical to the input.
    #[arg(long)]
    pub check: bool,
}

pub fn run(args: &ReplayArgs) -> Result<(), Box<dyn Error>> {
    let expected = file_digest(&args.manifest)?;
    let mut job = load_manifest(&args.manifest)?;
    if let Some(dir) = &args.data_dir {
        job.common.data_dir = dir.display().to_string();
    }
    info!(manifest = %args.manifest.display(), lantern_type = %job.lantern_type, "replaying manifest");

    let registry = ArchetypeRegistry::with_builtins();
    let artifacts = job.run(&registry)?;
    let summary = RunSummary::from_artifacts(&job.lantern_type, &artifacts)?;
    let identical = summary.manifest_sha256 == expected;
    if !identical {
        warn!(
            expected = %expected,
            actual = %summary.manifest_sha256,
            "replayed manifest differs from the input"
        );
    }
    print_json(&summary)?;
    if args.check && !identical {
        return Err("replayed manifest differs from the input".into());
    }
    Ok(())
}
