use std::sync::Arc;

use anyhow::Result;
use tracing_subscriber::EnvFilter;
use trade_opportunities::{config::Config, http};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_new(&config.log_level)
                .unwrap_or_else(|_| EnvFilter::new("trade_opportunities=info")),
        )
        .init();

    tracing::info!("Starting {} v{}", config.project_name, config.version);

    http::start_http_server(Arc::new(config)).await?;

    Ok(())
}
