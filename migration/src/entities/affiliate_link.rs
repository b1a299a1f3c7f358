//! Affiliate link entity: a minted outbound URL, weakly tied to a click

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "affiliate_links")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub product_id: String,
    pub platform: String,
    pub user_id: Option<String>,
    /// Weak reference: the link does not own the click's lifecycle
    pub click_id: Option<String>,
    #[sea_orm(column_type = "Text")]
    pub destination_url: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
