mod cli;
mod commands;
mod logging;

use cli::{Cli, Commands};
use commands::generate;

pub fn run() -> anyhow::Result<()> {
    use clap::Parser;

    let cli = Cli::parse();
    logging::init_logging(cli.verbose);
    match &cli.command {
        Commands::Generate(args) => generate::run(&cli, args),
    }
}

fn main() -> anyhow::Result<()> { run() }
