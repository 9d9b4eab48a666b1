use std::collections::BTreeMap;
use std::error::Error;

use clap::Args;
use plcad_exp::{ArchetypeDescriptor, ArchetypeRegistry};

use super::print_json;

#[derive(Args, Debug)]
pub struct ArchetypesArgs {
    /// Print only the archetype names, one per line.
    #[arg(long)]
    pub names: bool,
}

pub fn run(args: &ArchetypesArgs) -> Result<(), Box<dyn Error>> {
    let registry = ArchetypeRegistry::with_builtins();
    if args.names {
        for name in registry.names() {
            println!("{name}");
        }
        return Ok(());
    }
    let listing: BTreeMap<&str, &ArchetypeDescriptor> = registry.iter().collect();
    print_json(&listing)
}
