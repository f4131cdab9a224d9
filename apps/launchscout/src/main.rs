//! launchscout entry point.

mod app;
mod args;
mod config;

use clap::Parser;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    // Logs go to stderr; stdout carries the JSON report.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = args::Cli::parse();
    let config = config::Config::load(cli.config.as_deref())?;
    let settings = app::Settings::merge(cli, config)?;
    tracing::debug!(?settings, "settings resolved");

    let report = app::run(&settings)?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    report.check()
}
