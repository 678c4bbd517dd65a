//! List-envs command - Show the registered environment settings

use anyhow::Result;
use clap::Parser;

use crate::{cli::output::print_section, enumeration::num_actions, mouselab::Registry};

#[derive(Parser, Debug)]
#[command(about = "List registered environment settings")]
pub struct ListEnvsArgs {
    /// Print reward distributions for every setting
    #[arg(long, short = 'd')]
    pub detailed: bool,
}

pub fn execute(args: ListEnvsArgs) -> Result<()> {
    let registry = Registry::standard()?;
    print_section("Registered environments");
    for name in registry.names() {
        let setting = registry.get(name)?;
        if args.detailed {
            println!("{setting}");
        } else {
            let branching: Vec<String> = setting.branching.iter().map(|b| b.to_string()).collect();
            println!(
                "  {:20} branching {:8} {} actions",
                name,
                branching.join("-"),
                num_actions(&setting.branching)
            );
        }
    }
    Ok(())
}
