// Command-line configuration. Every flag has a default so a bare
// `carbonlens` starts the interactive client against the local service.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use log::LevelFilter;

use crate::api::{API_URL_ENV, DEFAULT_API_URL};

#[derive(Parser, Debug, Clone)]
#[clap(
    name = "carbonlens",
    version,
    about = "Scan a receipt and see the carbon footprint of your shopping"
)]
pub struct Cli {
    #[clap(long, env = API_URL_ENV, default_value = DEFAULT_API_URL, help = "Base URL of the receipt analysis service")]
    pub server_url: String,

    #[clap(long, short, help = "Analyze this receipt photo and exit instead of starting the menu")]
    pub image: Option<PathBuf>,

    #[clap(long, help = "Print the comparison text at once instead of typing it out")]
    pub no_animation: bool,

    #[clap(long, default_value_t = 10, help = "Delay between revealed characters, in milliseconds")]
    pub reveal_interval_ms: u64,

    #[clap(long, short, default_value = "warn")]
    pub log_level: String,
}

/// Settings the rest of the client reads.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server_url: String,
    pub image: Option<PathBuf>,
    pub animate: bool,
    pub reveal_interval: Duration,
    pub log_level: LevelFilter,
}

impl From<Cli> for AppConfig {
    fn from(cli: Cli) -> Self {
        let log_level = cli.log_level.parse().unwrap_or(LevelFilter::Warn);
        Self {
            server_url: cli.server_url,
            image: cli.image,
            animate: !cli.no_animation,
            reveal_interval: Duration::from_millis(cli.reveal_interval_ms),
            log_level,
        }
    }
}

impl AppConfig {
    /// Interactive sessions redraw the whole terminal, so logs go to a file.
    pub fn is_interactive(&self) -> bool {
        self.image.is_none()
    }
}
