//! Last observed balance, read before each comparison and overwritten after.
//! Storage failures degrade to "no baseline" or "write dropped" and never
//! abort the cycle.

use alertbot_domain::model::{BalanceObservation, BALANCE_FIELD, BALANCE_MEASUREMENT, DENOM_FIELD};
use alertbot_domain::services::telemetry::BASELINE_WRITES_TOTAL;
use alertbot_domain::storage::{SeriesPoint, SeriesStore};
use metrics::counter;
use tracing::warn;

pub struct BaselineStore<S> {
    store: S,
}

impl<S> BaselineStore<S>
where
    S: SeriesStore,
{
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Raw micro-amount of the latest persisted balance, if any.
    pub async fn read_last_balance(&self) -> Option<String> {
        match self
            .store
            .last_value(BALANCE_MEASUREMENT, BALANCE_FIELD)
            .await
        {
            Ok(value) => value,
            Err(err) => {
                warn!(?err, "failed to read balance baseline");
                None
            }
        }
    }

    /// Appends `observation` to the balance series. Failures are logged only.
    pub async fn write_balance(&self, observation: &BalanceObservation) {
        let point = SeriesPoint::new(BALANCE_MEASUREMENT)
            .field(BALANCE_FIELD, observation.amount.as_str())
            .field(DENOM_FIELD, observation.denom.as_str())
            .at(observation.observed_at);

        match self.store.write_point(point).await {
            Ok(()) => {
                counter!(BASELINE_WRITES_TOTAL, "result" => "ok").increment(1);
            }
            Err(err) => {
                counter!(BASELINE_WRITES_TOTAL, "result" => "error").increment(1);
                warn!(?err, amount = %observation.amount, "dropping balance observation");
            }
        }
    }
}
