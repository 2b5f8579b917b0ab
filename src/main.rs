//! slack-dm-export server binary
//!
//! Reads configuration from the environment (and `.env`), then serves the
//! REST API until SIGTERM/SIGINT.

use slack_dm_export::{Config, ExportService, SlackMessageSource, api};
use std::sync::Arc;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

fn init_tracing() {
    // RUST_LOG wins; LOG_LEVEL is the older, coarser knob
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        EnvFilter::try_new(level.to_lowercase()).unwrap_or_else(|_| EnvFilter::new("info"))
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(true))
        .init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A missing .env file is fine; real environment variables still apply
    let dotenv = dotenvy::dotenv();

    init_tracing();

    match dotenv {
        Ok(path) => tracing::debug!(path = %path.display(), "loaded .env file"),
        Err(e) if !e.not_found() => tracing::warn!(error = %e, "failed to load .env file"),
        Err(_) => {}
    }

    let config = Config::from_env()?;
    let source = Arc::new(SlackMessageSource::new(config.slack.clone())?);
    let service = Arc::new(ExportService::new(config.clone(), source));

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        bind_address = %config.server.api.bind_address,
        "slack-dm-export starting"
    );

    api::start_api_server(service, Arc::new(config)).await?;
    Ok(())
}
