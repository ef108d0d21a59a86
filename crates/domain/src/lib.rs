//! Domain-level building blocks shared by the storage and monitor crates:
//! ledger amount types, unit conversion, the balance change detector,
//! environment configuration, telemetry wiring and storage contracts.

pub mod config;
pub mod detector;
pub mod model;
pub mod services;
pub mod storage;
pub mod units;

pub use detector::{AlertDecision, ChangeDetector};
pub use model::*;
pub use storage::{SeriesPoint, SeriesStore, StorageError, StorageResult};
pub use units::{format_grouped, parse_amount, to_decimal, to_display_amount, ParseOutcome};
