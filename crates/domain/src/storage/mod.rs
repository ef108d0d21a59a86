//! Contracts for the time-series store holding balance observations.

mod traits;

pub use traits::*;
