//! pagedit CLI - Edit knowledge-base pages from the command line
//!
//! Each invocation opens one edit session on a page snapshot, applies the
//! requested changes, and writes the snapshot back.

mod cli;
mod commands;
mod error;


use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands};
use crate::commands::common::load_config;
use crate::commands::discard::run_discard;
use crate::commands::edit::run_edit;
use crate::commands::show::run_show;
use crate::error::CliError;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let directive = format!("pagedit={default_level}")
        .parse()
        .map_err(|error| CliError::Config(format!("invalid log directive: {error}")))?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(directive))
        .with_writer(std::io::stderr)
        .init();

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Show { json } => run_show(&cli.page, json)?,
        Commands::Edit(args) => run_edit(&args, &cli.page, config).await?,
        Commands::Discard => run_discard(&cli.page, config)?,
    }

    Ok(())
}
