use std::error::Error;
use std::path::PathBuf;

use clap::Args;
use plcad_exp::{load_job, ArchetypeRegistry};
use tracing::info;

use super::{print_json, RunSummary};

#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Job file naming the lantern type, common parameters and archetype options.
    #[arg(long)]
    pub config: PathBuf,
    /// Overrides the job's `data_dir`.
    #[arg(long)]
    pub data_dir: Option<PathBuf>,
    /// Overrides the job's `opt_name`.
    #[arg(long)]
    pub opt_name: Option<String>,
}

pub fn run(args: &GenerateArgs) -> Result<(), Box<dyn Error>> {
    let mut job = load_job(&args.config)?;
    if let Some(dir) = &args.data_dir {
        job.common.data_dir = dir.display().to_string();
    }
    if let Some(name) = &args.opt_name {
        job.common.opt_name = name.clone();
    }
    info!(config = %args.config.display(), lantern_type = %job.lantern_type, "loaded job");

    let registry = ArchetypeRegistry::with_builtins();
    let artifacts = job.run(&registry)?;
    print_json(&RunSummary::from_artifacts(&job.lantern_type, &artifacts)?)
}
