use std::process::ExitCode;

use clap::Parser;
use tracing::Level;

mod cli;
mod commands;
mod render;
mod session;

fn main() -> anyhow::Result<ExitCode> {
    let cli = cli::Cli::parse();
    let level = if cli.verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
    commands::run_command(cli)
}
