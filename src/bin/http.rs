use std::net::SocketAddr;

use bonus_pool::{BonusLedger, PoolSettings, http_api, load_settings_from_json};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let addr: SocketAddr = std::env::var("BONUS_POOL_HTTP_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:3000".to_string())
        .parse()?;

    let settings = match std::env::var("BONUS_POOL_SETTINGS") {
        Ok(path) => load_settings_from_json(path)?,
        Err(_) => PoolSettings::default(),
    };
    let ledger = BonusLedger::with_settings(settings)?;

    tracing::info!(%addr, "bonus-pool HTTP API listening");
    http_api::serve(addr, ledger).await?;
    Ok(())
}
