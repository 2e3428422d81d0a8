mod cli;
mod config;
mod domain;
mod infra;
mod media;
mod workflows;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use cli::Cli;
use infra::arr::ArrClient;
use infra::ledger::ProgressLedger;
use infra::subdl::SubdlClient;
use workflows::pipeline::Pipeline;
use workflows::prompt::ConsoleGate;

fn main() {
    // Use RUST_LOG if set, otherwise info level
    let log_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(log_filter)
        .with_target(false)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let settings = config::load(&cli)?;

    let mut ledger = ProgressLedger::load(&settings.ledger_path);
    info!(
        "Loaded {} previously processed items from {}",
        ledger.len(),
        ledger.path().display()
    );

    let radarr = ArrClient::new("Radarr", &settings.radarr.url, settings.radarr.api_key.clone());
    let sonarr = ArrClient::new("Sonarr", &settings.sonarr.url, settings.sonarr.api_key.clone());
    let subdl = SubdlClient::new(
        settings.subdl_search_key.clone(),
        settings.subdl_upload_token.clone(),
        settings.delay,
    );
    let mut gate = ConsoleGate;

    let mut pipeline = Pipeline::new(
        &subdl,
        &subdl,
        &mut gate,
        &mut ledger,
        &settings.language,
        settings.auto_upload,
    );

    info!("--- Processing Radarr Movies ---");
    let movies = pipeline.run(radarr.movies(&settings.radarr.base_paths));
    info!("Movies: {movies}");
    if movies.aborted {
        return Ok(());
    }

    info!("--- Processing Sonarr TV Shows ---");
    let episodes = pipeline.run(sonarr.episodes(&settings.sonarr.base_paths));
    info!("Episodes: {episodes}");

    Ok(())
}
