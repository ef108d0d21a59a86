//! Monitor binary that polls the LCD endpoint and alerts on balance changes.

use std::io;

use alertbot_domain::config::MonitorConfig;
use alertbot_domain::services::telemetry::{init_telemetry, TelemetryConfig};
use alertbot_monitor::{build_dispatcher, build_ledger_client, run_monitor, MonitorError};
use alertbot_storage::SeaOrmStorage;

#[tokio::main]
async fn main() -> io::Result<()> {
    if let Err(err) = bootstrap().await {
        eprintln!("[monitor] bootstrap failed: {err}");
        return Err(io::Error::other(err.to_string()));
    }

    Ok(())
}

async fn bootstrap() -> Result<(), MonitorError> {
    let config = MonitorConfig::load_from_env()?;
    let telemetry_config = TelemetryConfig::from_env("MONITOR");
    init_telemetry(&telemetry_config)?;
    let storage = SeaOrmStorage::connect(config.database_url()).await?;
    let ledger = build_ledger_client(&config)?;
    let dispatcher = build_dispatcher(&config)?;
    run_monitor(config, ledger, storage, dispatcher).await
}
