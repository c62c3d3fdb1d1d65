// Application entry point for the local disk inventory tool

// The operations behind each flag
mod app;
// Flag definitions
mod cli;
// Environment driven settings
mod config;
// Shared error type
mod error;
// Disk records and code tables
mod models;
// Table and detail output
mod render;
// Record builder
mod scanner;
// Native layer and sysfs adapters
mod sources;

use clap::Parser;
use std::io::{self, Write};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Parses the flags, wires the Linux collaborators and runs the selected operation.
/// Logs go to stderr so stdout only ever carries the report.
fn main() -> anyhow::Result<ExitCode> {
    let args = cli::Args::parse_from(cli::normalize_args(std::env::args()));

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let config = config::Config::from_env();
    tracing::debug!(?config, "starting");

    let native = sources::LocalDisk::new(&config.sysfs_root, config.smartctl.clone());
    let attrs = sources::SysfsAttributes::new(&config.sysfs_root);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let code = app::run(&args.action(), &native, &attrs, &mut out)?;
    out.flush()?;
    Ok(ExitCode::from(code))
}
