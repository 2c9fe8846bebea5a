//! Infranav CLI Binary
//!
//! Command-line interface for the hierarchical navigation engine.

use clap::Parser;
use infranav::logging::init_logging;
use infranav::tooling::cli::{load_config, Cli, CliContext};
use std::process;

fn main() {
    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading configuration: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = init_logging(Some(&config.logging)) {
        eprintln!("Warning: logging disabled: {}", e);
    }

    if let Err(e) = run(&cli, config) {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn run(cli: &Cli, config: infranav::config::NavConfig) -> anyhow::Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let context = CliContext::new(cli, config)?;
    let output = runtime.block_on(context.execute(&cli.command))?;
    println!("{}", output);
    Ok(())
}
