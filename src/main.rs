//! Agent binary: loads options, then runs cycles on a fixed interval.

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use strava_agent::agent::StravaAgent;
use strava_agent::cli::Cli;
use strava_agent::config::AgentOptions;
use strava_agent::events::{EventEmitter, LogEmitter, VecEmitter};
use strava_agent::memory::{FileMemoryStore, InMemoryStore, MemoryStore};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let options = match load_options(&cli) {
        Ok(options) => options,
        Err(err) => {
            eprintln!("Error: {err}");
            std::process::exit(1);
        }
    };

    let memory: Arc<dyn MemoryStore> = if cli.dry_run {
        Arc::new(InMemoryStore::new())
    } else {
        match &cli.memory_dir {
            Some(dir) => Arc::new(FileMemoryStore::new(dir.clone())),
            None => Arc::new(FileMemoryStore::new_default()),
        }
    };

    let dry_run_emitter = cli.dry_run.then(|| Arc::new(VecEmitter::new()));
    let emitter: Arc<dyn EventEmitter> = match &dry_run_emitter {
        Some(collector) => collector.clone(),
        None => Arc::new(LogEmitter),
    };

    let agent = match StravaAgent::new(options, memory, emitter) {
        Ok(agent) => agent,
        Err(err) => {
            eprintln!("Error: {err}");
            std::process::exit(1);
        }
    };

    if cli.once || cli.dry_run {
        run_cycle(&agent).await;
        if let Some(collector) = &dry_run_emitter {
            for event in collector.emitted() {
                println!("{event}");
            }
        }
        return;
    }

    let mut ticker = tokio::time::interval(std::time::Duration::from_secs(cli.interval));
    loop {
        ticker.tick().await;
        run_cycle(&agent).await;
    }
}

fn load_options(cli: &Cli) -> strava_agent::error::Result<AgentOptions> {
    match &cli.config {
        Some(path) => AgentOptions::from_toml_file(path),
        None => AgentOptions::from_env(),
    }
}

// Cycle errors are logged inside the agent; the loop just keeps going.
async fn run_cycle(agent: &StravaAgent) {
    let _ = agent.check().await;
}
