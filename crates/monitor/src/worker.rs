use tokio::time::sleep;
use tracing::{info, warn};

use thiserror::Error;

use alertbot_domain::{
    config::{ConfigError, MonitorConfig},
    detector::ChangeDetector,
    services::telemetry::TelemetryError,
    storage::{SeriesStore, StorageError},
};

use crate::{
    baseline::BaselineStore,
    ledger::{LcdLedgerClient, LedgerError, LedgerSource},
    notify::AlertDispatcher,
    pipeline::{check_balance, report_self_delegation, report_unbonding, BalanceOutcome, Targets},
};

#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("http client error: {0}")]
    Http(String),
    #[error("telemetry error: {0}")]
    Telemetry(#[from] TelemetryError),
}

impl From<reqwest::Error> for MonitorError {
    fn from(value: reqwest::Error) -> Self {
        Self::Http(value.to_string())
    }
}

/// What one polling cycle observed, per fact.
#[derive(Debug)]
pub struct CycleReport {
    pub balance: Result<BalanceOutcome, LedgerError>,
    pub self_delegation: Result<Option<String>, LedgerError>,
    pub unbonding: Result<Option<String>, LedgerError>,
}

/// Wires the ledger, baseline and dispatcher together for one account.
pub struct Monitor<L, S> {
    ledger: L,
    baseline: BaselineStore<S>,
    dispatcher: AlertDispatcher,
    detector: Option<ChangeDetector>,
    targets: Targets,
}

impl<L, S> Monitor<L, S>
where
    L: LedgerSource,
    S: SeriesStore,
{
    pub fn new(config: &MonitorConfig, ledger: L, store: S, dispatcher: AlertDispatcher) -> Self {
        let detector = config
            .balance_change_alerts()
            .then(|| ChangeDetector::new(config.balance_change_threshold()));
        Self {
            ledger,
            baseline: BaselineStore::new(store),
            dispatcher,
            detector,
            targets: Targets::from_config(config),
        }
    }

    /// Runs every fact once, in order. A failing fact is logged and leaves
    /// the others untouched.
    pub async fn run_cycle(&self) -> CycleReport {
        let balance = check_balance(
            &self.ledger,
            &self.baseline,
            &self.dispatcher,
            self.detector.as_ref(),
            &self.targets,
        )
        .await;
        if let Err(err) = &balance {
            warn!(?err, "balance check skipped");
        }

        let self_delegation = report_self_delegation(&self.ledger, &self.targets).await;
        if let Err(err) = &self_delegation {
            warn!(?err, "self delegation report skipped");
        }

        let unbonding = report_unbonding(&self.ledger, &self.targets).await;
        if let Err(err) = &unbonding {
            warn!(?err, "unbonding report skipped");
        }

        CycleReport {
            balance,
            self_delegation,
            unbonding,
        }
    }
}

pub fn build_ledger_client(config: &MonitorConfig) -> Result<LcdLedgerClient, MonitorError> {
    Ok(LcdLedgerClient::with_timeout(
        config.lcd_endpoint(),
        config.balance_denom(),
        config.http_timeout(),
    )?)
}

pub fn build_dispatcher(config: &MonitorConfig) -> Result<AlertDispatcher, MonitorError> {
    let http = reqwest::Client::builder()
        .timeout(config.http_timeout())
        .build()?;
    Ok(AlertDispatcher::from_config(config, http))
}

/// Polls forever at the configured interval.
pub async fn run_monitor<L, S>(
    config: MonitorConfig,
    ledger: L,
    store: S,
    dispatcher: AlertDispatcher,
) -> Result<(), MonitorError>
where
    L: LedgerSource,
    S: SeriesStore,
{
    info!(
        account = config.account_address(),
        validator = config.validator_address(),
        channels = ?dispatcher.channel_names(),
        alerts = config.balance_change_alerts(),
        "monitor started"
    );
    let interval = config.poll_interval();
    let monitor = Monitor::new(&config, ledger, store, dispatcher);

    loop {
        monitor.run_cycle().await;
        sleep(interval).await;
    }
}
