use anyhow::Result;
use tracing::info;

use multilingual_site::config::Config;
use multilingual_site::server::{self, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored in production)
    let _ = dotenvy::dotenv();

    let config = Config::from_env()?;

    // Initialize logging
    let level = if config.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(format!("multilingual_site={}", level).parse()?),
        )
        .init();

    info!("Starting multilingual site ({})", config.app_env);

    let state = AppState::from_config(config)?;
    server::serve(state).await
}
