//! Affiliate link persistence

use sea_orm::EntityTrait;
use tracing::debug;

use super::converters::{link_to_active_model, model_to_link};
use super::models::AffiliateLink;
use super::retry::with_retry;
use super::SeaOrmStorage;
use crate::errors::{AfftrackError, Result};
use migration::entities::affiliate_link;

impl SeaOrmStorage {
    /// Persist the link and its (weak) click association. Does not touch
    /// click state.
    pub async fn insert_link(&self, link: &AffiliateLink) -> Result<()> {
        let db = self.db();

        with_retry(
            &format!("insert_link({})", link.id),
            self.retry_config(),
            || async {
                affiliate_link::Entity::insert(link_to_active_model(link))
                    .exec(db)
                    .await
            },
        )
        .await
        .map_err(|e| {
            AfftrackError::database_operation(format!(
                "Failed to insert affiliate link '{}': {}",
                link.id, e
            ))
        })?;

        debug!(
            "Affiliate link issued: {} -> {} (click: {:?})",
            link.id, link.destination_url, link.click_id
        );
        Ok(())
    }

    pub async fn get_link(&self, link_id: &str) -> Result<Option<AffiliateLink>> {
        let model = affiliate_link::Entity::find_by_id(link_id)
            .one(self.db())
            .await
            .map_err(|e| {
                AfftrackError::database_operation(format!(
                    "Failed to look up affiliate link '{}': {}",
                    link_id, e
                ))
            })?;

        Ok(model.map(model_to_link))
    }
}
