use alertbot_domain::storage::{SeriesPoint, SeriesStore, StorageError, StorageResult};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};

use crate::entity::series_points;
use crate::SeaOrmStorage;

#[async_trait::async_trait]
impl SeriesStore for SeaOrmStorage {
    async fn last_value(&self, measurement: &str, field: &str) -> StorageResult<Option<String>> {
        let maybe = series_points::Entity::find()
            .filter(series_points::Column::Measurement.eq(measurement))
            .filter(series_points::Column::Field.eq(field))
            .order_by_desc(series_points::Column::RecordedAt)
            .order_by_desc(series_points::Column::Id)
            .one(self.connection())
            .await
            .map_err(StorageError::from_source)?;
        Ok(maybe.map(|model| model.value))
    }

    async fn write_point(&self, point: SeriesPoint) -> StorageResult<()> {
        if point.fields.is_empty() {
            return Ok(());
        }

        let tags = serde_json::to_string(&point.tags).map_err(StorageError::from_source)?;
        let rows = point
            .fields
            .into_iter()
            .map(|(field, value)| series_points::ActiveModel {
                measurement: Set(point.measurement.clone()),
                field: Set(field),
                value: Set(value),
                tags: Set(tags.clone()),
                recorded_at: Set(point.recorded_at),
                ..Default::default()
            });

        series_points::Entity::insert_many(rows)
            .exec_without_returning(self.connection())
            .await
            .map_err(StorageError::from_source)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    async fn storage() -> SeaOrmStorage {
        SeaOrmStorage::connect("sqlite::memory:")
            .await
            .expect("storage inits")
    }

    #[tokio::test]
    async fn empty_series_has_no_last_value() {
        let storage = storage().await;
        let value = storage
            .last_value("vab_account_balance", "balance")
            .await
            .expect("query succeeds");
        assert_eq!(value, None);
    }

    #[tokio::test]
    async fn returns_most_recent_value_per_field() {
        let storage = storage().await;
        let now = Utc::now();

        storage
            .write_point(
                SeriesPoint::new("vab_account_balance")
                    .field("balance", "1000000")
                    .field("denom", "uakt")
                    .at(now - Duration::seconds(30)),
            )
            .await
            .expect("first write");
        storage
            .write_point(
                SeriesPoint::new("vab_account_balance")
                    .field("balance", "2000000")
                    .field("denom", "uakt")
                    .at(now),
            )
            .await
            .expect("second write");

        let balance = storage
            .last_value("vab_account_balance", "balance")
            .await
            .expect("query succeeds");
        assert_eq!(balance.as_deref(), Some("2000000"));

        let denom = storage
            .last_value("vab_account_balance", "denom")
            .await
            .expect("query succeeds");
        assert_eq!(denom.as_deref(), Some("uakt"));
    }

    #[tokio::test]
    async fn later_write_wins_on_equal_timestamps() {
        let storage = storage().await;
        let now = Utc::now();

        for amount in ["5", "6"] {
            storage
                .write_point(SeriesPoint::new("m").field("balance", amount).at(now))
                .await
                .expect("write");
        }

        let value = storage.last_value("m", "balance").await.expect("query");
        assert_eq!(value.as_deref(), Some("6"));
    }

    #[tokio::test]
    async fn measurements_are_isolated() {
        let storage = storage().await;
        storage
            .write_point(
                SeriesPoint::new("other")
                    .tag("account", "akash1xyz")
                    .field("balance", "9"),
            )
            .await
            .expect("write");

        let value = storage
            .last_value("vab_account_balance", "balance")
            .await
            .expect("query");
        assert_eq!(value, None);
    }

    #[tokio::test]
    async fn point_without_fields_is_ignored() {
        let storage = storage().await;
        storage
            .write_point(SeriesPoint::new("vab_account_balance"))
            .await
            .expect("noop write");
        let value = storage
            .last_value("vab_account_balance", "balance")
            .await
            .expect("query");
        assert_eq!(value, None);
    }
}
