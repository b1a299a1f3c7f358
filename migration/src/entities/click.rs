//! Click entity: one row per tracked outbound interaction

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "clicks")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub product_id: String,
    pub platform: String,
    pub user_id: Option<String>,
    pub client_ip: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub user_agent: Option<String>,
    /// Free-form JSON blob supplied by the tracking caller
    #[sea_orm(column_type = "Text", nullable)]
    pub metadata: Option<String>,
    /// "pending" or "converted"; only ever moves forward
    pub status: String,
    pub order_id: Option<String>,
    pub created_at: DateTimeUtc,
    pub converted_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
