//! Click ledger operations

use chrono::{DateTime, Utc};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use sea_orm::ActiveValue::Set;
use tracing::{debug, info, warn};

use super::converters::{click_to_active_model, model_to_click};
use super::models::{Click, ClickStatus};
use super::retry::with_retry;
use super::SeaOrmStorage;
use crate::errors::{AfftrackError, Result};
use migration::entities::click;

/// Result of a conversion attempt on a click
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversionOutcome {
    /// The click moved pending -> converted
    Converted,
    /// Already converted with the same order id (webhook replay)
    AlreadyConverted,
    /// Already converted with a different order id; state untouched
    OrderConflict { existing_order_id: String },
    /// No click with that id
    NotFound,
}

impl SeaOrmStorage {
    /// Persist a new click. Never blocks on anything downstream; the row is
    /// written with status=pending immediately.
    pub async fn insert_click(&self, new_click: &Click) -> Result<()> {
        let db = self.db();

        with_retry(
            &format!("insert_click({})", new_click.id),
            self.retry_config(),
            || async {
                click::Entity::insert(click_to_active_model(new_click))
                    .exec(db)
                    .await
            },
        )
        .await
        .map_err(|e| {
            AfftrackError::database_operation(format!(
                "Failed to insert click '{}': {}",
                new_click.id, e
            ))
        })?;

        debug!(
            "Click recorded: {} (platform: {}, product: {})",
            new_click.id, new_click.platform, new_click.product_id
        );
        Ok(())
    }

    pub async fn get_click(&self, click_id: &str) -> Result<Option<Click>> {
        let model = click::Entity::find_by_id(click_id)
            .one(self.db())
            .await
            .map_err(|e| {
                AfftrackError::database_operation(format!(
                    "Failed to look up click '{}': {}",
                    click_id, e
                ))
            })?;

        Ok(model.map(model_to_click))
    }

    /// Mark a click converted for the given order.
    ///
    /// Idempotent: a replay with the same order id is a no-op. A differing
    /// order id is a conflict that is logged, never overwritten. The update
    /// is filtered on status=pending so two concurrent conversions cannot
    /// both win.
    pub async fn mark_click_converted(
        &self,
        click_id: &str,
        order_id: &str,
        converted_at: DateTime<Utc>,
    ) -> Result<ConversionOutcome> {
        let Some(existing) = self.get_click(click_id).await? else {
            return Ok(ConversionOutcome::NotFound);
        };

        if existing.status == ClickStatus::Converted {
            return match existing.order_id {
                Some(ref existing_order) if existing_order == order_id => {
                    Ok(ConversionOutcome::AlreadyConverted)
                }
                Some(existing_order) => {
                    warn!(
                        "Click {} already converted for order {}; refusing to overwrite with order {}",
                        click_id, existing_order, order_id
                    );
                    Ok(ConversionOutcome::OrderConflict {
                        existing_order_id: existing_order,
                    })
                }
                None => {
                    // Converted without an order id should not happen; keep it visible.
                    warn!(
                        "Click {} converted without an order id; refusing to overwrite",
                        click_id
                    );
                    Ok(ConversionOutcome::OrderConflict {
                        existing_order_id: String::new(),
                    })
                }
            };
        }

        let result = click::Entity::update_many()
            .set(click::ActiveModel {
                status: Set(ClickStatus::Converted.as_str().to_string()),
                order_id: Set(Some(order_id.to_string())),
                converted_at: Set(Some(converted_at)),
                ..Default::default()
            })
            .filter(click::Column::Id.eq(click_id))
            .filter(click::Column::Status.eq(ClickStatus::Pending.as_str()))
            .exec(self.db())
            .await
            .map_err(|e| {
                AfftrackError::database_operation(format!(
                    "Failed to convert click '{}': {}",
                    click_id, e
                ))
            })?;

        if result.rows_affected == 0 {
            // Lost the race to another conversion; re-read to classify it.
            debug!("Click {} was converted concurrently", click_id);
            return match self.get_click(click_id).await?.and_then(|c| c.order_id) {
                Some(ref existing_order) if existing_order == order_id => {
                    Ok(ConversionOutcome::AlreadyConverted)
                }
                Some(existing_order) => Ok(ConversionOutcome::OrderConflict {
                    existing_order_id: existing_order,
                }),
                None => Ok(ConversionOutcome::NotFound),
            };
        }

        info!("Click {} converted (order: {})", click_id, order_id);
        Ok(ConversionOutcome::Converted)
    }
}
