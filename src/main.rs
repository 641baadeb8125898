mod catalog;
mod cli;
mod commands;
mod config;
mod error;
mod ingest;
mod logging;
mod manifest;
mod prompt;
mod scaffold;
mod scan;
mod toolchain;

use anyhow::Context;
use clap::Parser;
use colored::Colorize;
use tracing::{error, info};

use crate::cli::{Cli, Command};

fn main() {
    if let Err(err) = run() {
        error!(error = %err, "command failed");
        eprintln!("{} {err}", "error:".red());
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose)?;

    let cwd = std::env::current_dir().context("failed to get current working directory")?;
    let config = config::load(&cwd).context("failed to load configuration")?;

    info!(
        command = command_name(&cli.command),
        cwd = %cwd.display(),
        catalog_url = %config.catalog_url,
        "starting command"
    );

    commands::execute(&cwd, &config, cli.command)
}

fn command_name(command: &Command) -> &'static str {
    match command {
        Command::New => "new",
        Command::Convert => "convert",
        Command::Add { .. } => "add",
        Command::Remove { .. } => "remove",
    }
}
