//! CLI argument definitions for the agent binary.

use std::path::PathBuf;

use clap::Parser;

/// Strava agent: polls activities and keeps the OAuth token fresh.
#[derive(Parser, Debug)]
#[command(name = "strava-agent", version, about = "Strava polling agent")]
pub struct Cli {
    /// Path to a TOML options file; falls back to STRAVA_* env vars.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Run a single cycle and exit instead of looping.
    #[arg(long)]
    pub once: bool,

    /// Seconds between cycles when looping.
    #[arg(long, default_value_t = 3600)]
    pub interval: u64,

    /// Use volatile memory and print would-be events to stdout.
    #[arg(long)]
    pub dry_run: bool,

    /// Directory for the persisted memory files.
    #[arg(long)]
    pub memory_dir: Option<PathBuf>,
}
