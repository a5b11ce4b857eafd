//! PDF shade - Entry point
//!
//! MCP server for the PDF readability overlay.

use anyhow::Context;
use pdf_shade::{run_server_with_config, ServerConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pdf_shade=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::info!("Starting PDF shade server");

    let config = ServerConfig::from_env().context("failed to load configuration")?;
    tracing::info!(
        max_tabs = config.max_tabs,
        boundary_policy = ?config.boundary_policy,
        "configuration loaded"
    );

    run_server_with_config(config).await
}
