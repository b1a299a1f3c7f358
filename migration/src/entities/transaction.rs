//! Commission transaction entity
//!
//! (platform, order_id) carries a unique index; it is the idempotency key
//! for at-least-once webhook delivery.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Null until (unless) attribution resolves a click to a user
    pub user_id: Option<String>,
    pub platform: String,
    pub product_id: Option<String>,
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub amount: Decimal,
    pub order_id: String,
    pub click_id: Option<String>,
    /// "confirmed", "pending", or "reversed"
    pub status: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
