use std::error::Error;

use clap::{Parser, Subcommand};
use commands::{
    archetypes::{self, ArchetypesArgs},
    generate::{self, GenerateArgs},
    replay::{self, ReplayArgs},
};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser, Debug)]
#[command(name = "plcad", about = "Photonic lantern design generator")]
struct Cli {
    /// Enable debug logging on stderr.
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build a lantern from a YAML or JSON job file and write its artifacts.
    Generate(GenerateArgs),
    /// Re-run the job recorded in a parameter manifest.
    Replay(ReplayArgs),
    /// List the registered lantern archetypes.
    Archetypes(ArchetypesArgs),
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    match cli.command {
        Command::Generate(args) => generate::run(&args),
        Command::Replay(args) => replay::run(&args),
        Command::Archetypes(args) => archetypes::run(&args),
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with(
            tracing_subscriber::fmt::layer()
                .without_time()
                .with_writer(std::io::stderr),
        )
        .init();
}
