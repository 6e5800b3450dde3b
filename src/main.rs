mod config;
mod fetcher;
mod model;
mod normalizer;
mod parser;
mod prices;
mod render;
mod server;
mod utils;

use config::{load_config, AppConfig};
use fetcher::ApiClient;
use server::AppState;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const CONFIG_PATH_ENV: &str = "PORTAL_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "config.json";

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    // Set panic hook to log details about any panic
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("😱 Panic occurred: {:?}", panic_info);
    }));

    let config_path =
        std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let config: Arc<AppConfig> = match load_config(&config_path) {
        Ok(cfg) => Arc::new(cfg),
        Err(e) => {
            error!("Config load error: {}", e);
            return;
        }
    };
    info!(
        "Config loaded from {} (fusion {}, secular charts {})",
        config_path,
        config.fusion_version.as_str(),
        config.enable_secular_charts
    );

    // One HTTP client serves both upstreams
    let client = match ApiClient::new(&config) {
        Ok(client) => Arc::new(client),
        Err(e) => {
            error!("Failed to build HTTP client: {}", e);
            return;
        }
    };

    let state = AppState {
        config,
        analysis: client.clone(),
        pulse: client,
    };

    if let Err(e) = server::serve(state).await {
        error!("Server error: {}", e);
    }
    info!("👋 CycleScope portal stopped");
}
