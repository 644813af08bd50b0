//! Bearing Diagnostics Service - Main Entry Point

use api::{init_logging, run_server, AppConfig};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load()?;
    init_logging(&config.logging)?;

    info!("=== Bearing Diagnostics Service v{} ===", env!("CARGO_PKG_VERSION"));
    info!("Model manifest: {}", config.model.manifest.display());

    run_server(config).await
}
