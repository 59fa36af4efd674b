// Entrypoint for the CarbonLens client.
// - Parses flags, sets up logging, builds the API client.
// - With `--image` analyzes one photo and exits; otherwise runs the menu.

use std::fs::OpenOptions;
use std::path::PathBuf;

use anyhow::Context;
use carbonlens_cli::{
    api::ApiClient,
    config::{AppConfig, Cli},
    ui::{analyze_once, main_menu},
};
use clap::Parser;

fn main() -> anyhow::Result<()> {
    let config = AppConfig::from(Cli::parse());
    init_logging(&config)?;

    let api = ApiClient::new(config.server_url.clone())?;
    log::info!("using analysis service at {}", api.base_url());

    match &config.image {
        Some(path) => analyze_once(&api, &config, path),
        // Blocks until the user exits.
        None => main_menu(api, &config),
    }
}

/// The menu redraws the whole terminal, so interactive runs log to
/// `~/.carbonlens.log`; one-shot runs log to stderr.
fn init_logging(config: &AppConfig) -> anyhow::Result<()> {
    let mut builder = env_logger::Builder::new();
    builder.filter_level(config.log_level);

    if config.is_interactive() {
        let dir = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        let path = dir.join(".carbonlens.log");
        let log_file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("Failed to open log file {}", path.display()))?;
        builder.target(env_logger::Target::Pipe(Box::new(log_file)));
    }

    builder.init();
    Ok(())
}
