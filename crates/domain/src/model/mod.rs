//! Data structures shared across the storage and monitor crates.

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::units::{format_decimal, to_decimal};

/// Measurement name of the persisted balance series.
pub const BALANCE_MEASUREMENT: &str = "vab_account_balance";
/// Field holding the raw micro-amount of a balance observation.
pub const BALANCE_FIELD: &str = "balance";
/// Field holding the denomination of a balance observation.
pub const DENOM_FIELD: &str = "denom";

/// Human-scale amount tagged with its denomination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonetaryAmount {
    pub value: Decimal,
    pub denom: String,
}

impl MonetaryAmount {
    pub fn new(value: Decimal, denom: impl Into<String>) -> Self {
        Self {
            value,
            denom: denom.into(),
        }
    }

    /// Converts a ledger micro-amount string into a human-scale amount.
    pub fn from_micro(raw: &str, denom: impl Into<String>) -> Self {
        Self::new(to_decimal(raw), denom)
    }

    /// Same value rendered under another denomination label.
    pub fn with_denom(&self, denom: impl Into<String>) -> Self {
        Self::new(self.value, denom)
    }
}

impl fmt::Display for MonetaryAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", format_decimal(self.value), self.denom)
    }
}

/// One `(denom, amount)` pair of a bank balances response, amount still in
/// micro-denomination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalanceEntry {
    pub denom: String,
    pub amount: String,
}

/// Returns the entry whose denomination exactly equals `denom`.
pub fn find_balance<'a>(entries: &'a [BalanceEntry], denom: &str) -> Option<&'a BalanceEntry> {
    entries.iter().find(|entry| entry.denom == denom)
}

/// Delegated or unbonding stake towards a single validator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DelegationRecord {
    pub validator_address: String,
    /// Raw micro-amount as reported by the ledger.
    pub raw_amount: String,
    pub amount: MonetaryAmount,
}

impl DelegationRecord {
    pub fn new(
        validator_address: impl Into<String>,
        raw_amount: impl Into<String>,
        denom: impl Into<String>,
    ) -> Self {
        let raw_amount = raw_amount.into();
        let amount = MonetaryAmount::from_micro(&raw_amount, denom);
        Self {
            validator_address: validator_address.into(),
            raw_amount,
            amount,
        }
    }
}

/// Picks the record for `validator`. When the ledger reports several, the
/// last one wins.
pub fn find_delegation<'a>(
    records: &'a [DelegationRecord],
    validator: &str,
) -> Option<&'a DelegationRecord> {
    records
        .iter()
        .rev()
        .find(|record| record.validator_address == validator)
}

/// A persisted balance observation. The amount stays in raw
/// micro-denomination so the next cycle can compare raw strings first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalanceObservation {
    pub amount: String,
    pub denom: String,
    pub observed_at: DateTime<Utc>,
}

impl BalanceObservation {
    pub fn new(amount: impl Into<String>, denom: impl Into<String>) -> Self {
        Self {
            amount: amount.into(),
            denom: denom.into(),
            observed_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertTrigger {
    BalanceChange,
}

/// A message ready to be fanned out to notification channels. Never
/// persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertEvent {
    pub message: String,
    pub trigger: AlertTrigger,
    pub magnitude: Decimal,
}

impl AlertEvent {
    /// Builds the balance change alert, amounts rendered with `display_denom`.
    pub fn balance_change(
        previous: Decimal,
        current: Decimal,
        magnitude: Decimal,
        display_denom: &str,
    ) -> Self {
        let from = MonetaryAmount::new(previous, display_denom);
        let to = MonetaryAmount::new(current, display_denom);
        Self {
            message: format!("Your account balance has changed from {from} to {to}"),
            trigger: AlertTrigger::BalanceChange,
            magnitude,
        }
    }
}
