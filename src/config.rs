//! # Command line configuration and logging setup.

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::error::Result;

/// Settings for the interactive membership shell.
#[derive(Debug, Clone, Parser)]
#[command(name = "gymtree")]
#[command(bin_name = "gymtree")]
#[command(about = "Gym membership database", long_about = None)]
pub struct Config {
    /// File the members are loaded from at startup and saved to on exit.
    #[arg(short, long, env = "GYMTREE_DATA", default_value = "data.csv")]
    pub data: PathBuf,

    /// Log filter directives, e.g. `debug` or `gymtree=trace`.
    #[arg(long, env = "GYMTREE_LOG", default_value = "warn")]
    pub log: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data: PathBuf::from("data.csv"),
            log: "warn".to_owned(),
        }
    }
}

/// Install a global `tracing` subscriber writing to stderr, filtered by [`Config::log`].
///
/// Installing a second subscriber is silently ignored.
///
/// # Errors
///
/// Returns [`crate::Error::LogFilter`] if the filter directives can not be parsed.
pub fn init_logging(config: &Config) -> Result<()> {
    let filter = EnvFilter::try_new(&config.log)?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init()
        .ok();
    Ok(())
}
