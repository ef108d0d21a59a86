use sea_orm::sea_query::{ColumnDef, Index, IndexCreateStatement, Table, TableCreateStatement};
use sea_orm::{ConnectionTrait, DatabaseBackend, DatabaseConnection};

use crate::entity::series_points;
use alertbot_domain::storage::{StorageError, StorageResult};

pub async fn run_migrations(db: &DatabaseConnection) -> StorageResult<()> {
    let backend = db.get_database_backend();

    let points_table = Table::create()
        .if_not_exists()
        .table(series_points::Entity)
        .col(
            ColumnDef::new(series_points::Column::Id)
                .integer()
                .not_null()
                .auto_increment()
                .primary_key(),
        )
        .col(
            ColumnDef::new(series_points::Column::Measurement)
                .string_len(128)
                .not_null(),
        )
        .col(
            ColumnDef::new(series_points::Column::Field)
                .string_len(128)
                .not_null(),
        )
        .col(ColumnDef::new(series_points::Column::Value).text().not_null())
        .col(ColumnDef::new(series_points::Column::Tags).text().not_null())
        .col(
            ColumnDef::new(series_points::Column::RecordedAt)
                .timestamp_with_time_zone()
                .not_null(),
        )
        .to_owned();
    create_table(db, backend, points_table).await?;

    let series_index = Index::create()
        .if_not_exists()
        .name("idx_series_points_series")
        .table(series_points::Entity)
        .col(series_points::Column::Measurement)
        .col(series_points::Column::Field)
        .col(series_points::Column::RecordedAt)
        .to_owned();
    create_index(db, backend, series_index).await?;

    Ok(())
}

async fn create_table(
    db: &DatabaseConnection,
    backend: DatabaseBackend,
    mut statement: TableCreateStatement,
) -> StorageResult<()> {
    statement.if_not_exists();
    db.execute(backend.build(&statement))
        .await
        .map_err(StorageError::from_source)?;
    Ok(())
}

async fn create_index(
    db: &DatabaseConnection,
    backend: DatabaseBackend,
    statement: IndexCreateStatement,
) -> StorageResult<()> {
    db.execute(backend.build(&statement))
        .await
        .map_err(StorageError::from_source)?;
    Ok(())
}
