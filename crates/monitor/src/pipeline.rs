//! Per-fact steps of a polling cycle: the balance check with change
//! detection, and the self-delegation / unbonding reports.

use alertbot_domain::config::MonitorConfig;
use alertbot_domain::detector::{AlertDecision, ChangeDetector};
use alertbot_domain::model::{find_balance, find_delegation, AlertEvent, BalanceObservation};
use alertbot_domain::services::telemetry::{ACCOUNT_BALANCE, BALANCE_CHECKS_TOTAL};
use alertbot_domain::storage::SeriesStore;
use alertbot_domain::units::to_decimal;
use metrics::{counter, gauge};
use rust_decimal::prelude::ToPrimitive;
use tracing::info;

use crate::baseline::BaselineStore;
use crate::ledger::{LedgerError, LedgerSource};
use crate::notify::AlertDispatcher;

/// Addresses and denominations a cycle looks at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Targets {
    pub account_address: String,
    pub validator_address: String,
    /// Denomination of interest in the balances response.
    pub balance_denom: String,
    /// Suffix for human-readable amounts.
    pub display_denom: String,
}

impl Targets {
    pub fn from_config(config: &MonitorConfig) -> Self {
        Self {
            account_address: config.account_address().to_string(),
            validator_address: config.validator_address().to_string(),
            balance_denom: config.balance_denom().to_string(),
            display_denom: config.display_denom().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BalanceOutcome {
    /// The response held no entry with the tracked denomination; nothing was
    /// compared, written or logged.
    DenomMissing,
    Checked(BalanceCheck),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalanceCheck {
    pub amount: String,
    pub denom: String,
    pub previous: Option<String>,
    /// `None` when balance change alerts are switched off.
    pub decision: Option<AlertDecision>,
    pub alert: Option<AlertEvent>,
}

/// Fetches the balance, compares it with the baseline, alerts when the
/// detector says so and always records the new baseline.
///
/// `detector` is `None` when balance change alerts are disabled.
pub async fn check_balance<L, S>(
    ledger: &L,
    baseline: &BaselineStore<S>,
    dispatcher: &AlertDispatcher,
    detector: Option<&ChangeDetector>,
    targets: &Targets,
) -> Result<BalanceOutcome, LedgerError>
where
    L: LedgerSource,
    S: SeriesStore,
{
    let balances = ledger
        .fetch_account_balances(&targets.account_address)
        .await?;

    let Some(entry) = find_balance(&balances, &targets.balance_denom) else {
        counter!(BALANCE_CHECKS_TOTAL, "result" => "denom_missing").increment(1);
        return Ok(BalanceOutcome::DenomMissing);
    };

    let previous = baseline.read_last_balance().await;

    let mut decision = None;
    let mut alert = None;
    if let Some(detector) = detector {
        let outcome = detector.evaluate(previous.as_deref().unwrap_or_default(), &entry.amount);
        if outcome.alert {
            let event = AlertEvent::balance_change(
                outcome.previous,
                outcome.current,
                outcome.magnitude,
                &targets.display_denom,
            );
            dispatcher.dispatch(&event.message).await;
            alert = Some(event);
        }
        decision = Some(outcome);
    }

    baseline
        .write_balance(&BalanceObservation::new(&entry.amount, &entry.denom))
        .await;

    let result = if alert.is_some() { "alerted" } else { "checked" };
    counter!(BALANCE_CHECKS_TOTAL, "result" => result).increment(1);
    if let Some(value) = to_decimal(&entry.amount).to_f64() {
        gauge!(ACCOUNT_BALANCE).set(value);
    }
    info!(amount = %entry.amount, denom = %entry.denom, "address balance");

    Ok(BalanceOutcome::Checked(BalanceCheck {
        amount: entry.amount.clone(),
        denom: entry.denom.clone(),
        previous,
        decision,
        alert,
    }))
}

/// Human-readable self-delegation towards the target validator, or `None`
/// when the account has no delegation to it.
pub async fn report_self_delegation<L>(
    ledger: &L,
    targets: &Targets,
) -> Result<Option<String>, LedgerError>
where
    L: LedgerSource,
{
    let records = ledger
        .fetch_self_delegation(&targets.account_address)
        .await?;
    let amount = find_delegation(&records, &targets.validator_address)
        .map(|record| record.amount.with_denom(&targets.display_denom).to_string());
    info!(
        amount = amount.as_deref().unwrap_or_default(),
        "self delegated amount"
    );
    Ok(amount)
}

/// Human-readable unbonding amount from the target validator, or `None`.
pub async fn report_unbonding<L>(
    ledger: &L,
    targets: &Targets,
) -> Result<Option<String>, LedgerError>
where
    L: LedgerSource,
{
    let records = ledger
        .fetch_unbonding_delegation(&targets.account_address)
        .await?;
    let amount = find_delegation(&records, &targets.validator_address)
        .map(|record| record.amount.with_denom(&targets.display_denom).to_string());
    info!(
        amount = amount.as_deref().unwrap_or_default(),
        "unbonding delegations"
    );
    Ok(amount)
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use alertbot_domain::model::{BalanceEntry, DelegationRecord};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Canned ledger; `None` for a resource makes that fetch fail.
    #[derive(Clone, Default)]
    pub struct StaticLedger {
        pub balances: Option<Vec<BalanceEntry>>,
        pub delegations: Option<Vec<DelegationRecord>>,
        pub unbonding: Option<Vec<DelegationRecord>>,
        pub calls: Arc<AtomicUsize>,
    }

    impl StaticLedger {
        pub fn with_balance(denom: &str, amount: &str) -> Self {
            Self {
                balances: Some(vec![BalanceEntry {
                    denom: denom.to_string(),
                    amount: amount.to_string(),
                }]),
                delegations: Some(Vec::new()),
                unbonding: Some(Vec::new()),
                calls: Arc::default(),
            }
        }

        fn unavailable(resource: &'static str) -> LedgerError {
            LedgerError::Status {
                resource,
                status: 500,
            }
        }
    }

    #[async_trait]
    impl LedgerSource for StaticLedger {
        async fn fetch_account_balances(
            &self,
            _address: &str,
        ) -> Result<Vec<BalanceEntry>, LedgerError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.balances
                .clone()
                .ok_or_else(|| Self::unavailable("balances"))
        }

        async fn fetch_self_delegation(
            &self,
            _address: &str,
        ) -> Result<Vec<DelegationRecord>, LedgerError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.delegations
                .clone()
                .ok_or_else(|| Self::unavailable("delegations"))
        }

        async fn fetch_unbonding_delegation(
            &self,
            _address: &str,
        ) -> Result<Vec<DelegationRecord>, LedgerError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.unbonding
                .clone()
                .ok_or_else(|| Self::unavailable("unbonding_delegations"))
        }
    }

    pub fn targets() -> Targets {
        Targets {
            account_address: "akash1account".into(),
            validator_address: "akashvaloper1val".into(),
            balance_denom: "uakt".into(),
            display_denom: "uakt".into(),
        }
    }
}
