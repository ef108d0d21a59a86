pub mod series_points {
    use sea_orm::entity::prelude::*;

    /// One field of one data point; a point with several fields spans
    /// several rows sharing `measurement`, `tags` and `recorded_at`.
    #[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
    #[sea_orm(table_name = "series_points")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i32,
        pub measurement: String,
        pub field: String,
        pub value: String,
        /// JSON object of the point's tag set.
        pub tags: String,
        pub recorded_at: DateTimeUtc,
    }

    #[derive(Debug, Clone, Copy, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}
