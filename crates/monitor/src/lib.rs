//! Balance, self-delegation and unbonding monitor for a single validator
//! account. The binary in `main.rs` polls forever; embedders can drive
//! [`Monitor::run_cycle`] on their own schedule instead.

pub mod baseline;
pub mod ledger;
pub mod notify;
pub mod pipeline;
pub mod worker;

pub use baseline::BaselineStore;
pub use ledger::{LcdLedgerClient, LedgerError, LedgerSource};
pub use notify::{AlertDispatcher, ChannelOutcome, NotificationChannel, NotifyError};
pub use pipeline::{BalanceCheck, BalanceOutcome, Targets};
pub use worker::{
    build_dispatcher, build_ledger_client, run_monitor, CycleReport, Monitor, MonitorError,
};
