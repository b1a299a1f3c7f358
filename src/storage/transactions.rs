//! Commission transaction operations
//!
//! The (platform, order_id) unique index is the idempotency key for
//! webhook delivery: a duplicate insert is "already handled", never an
//! error and never a second credit.

use rust_decimal::Decimal;
use sea_orm::sea_query::OnConflict;
use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QuerySelect};
use tracing::{debug, info};

use super::converters::{model_to_transaction, transaction_to_active_model};
use super::models::{Transaction, TransactionStatus};
use super::SeaOrmStorage;
use crate::errors::{AfftrackError, Result};
use migration::entities::transaction;

/// Result of an idempotent transaction insert
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    /// The dedup key already exists; the storage layer rejected the insert
    AlreadyRecorded,
}

/// Whether an error is a unique-constraint violation on the dedup key
fn is_unique_violation(err: &DbErr) -> bool {
    if matches!(err, DbErr::RecordNotInserted) {
        return true;
    }
    let msg = err.to_string().to_lowercase();
    msg.contains("unique constraint") || msg.contains("duplicate entry") || msg.contains("1062")
}

impl SeaOrmStorage {
    pub async fn find_transaction_by_order(
        &self,
        platform: &str,
        order_id: &str,
    ) -> Result<Option<Transaction>> {
        let model = transaction::Entity::find()
            .filter(transaction::Column::Platform.eq(platform))
            .filter(transaction::Column::OrderId.eq(order_id))
            .one(self.db())
            .await
            .map_err(|e| {
                AfftrackError::database_operation(format!(
                    "Failed to look up transaction for ({}, {}): {}",
                    platform, order_id, e
                ))
            })?;

        Ok(model.map(model_to_transaction))
    }

    /// Insert a transaction, enforcing the (platform, order_id) dedup key
    /// atomically via ON CONFLICT DO NOTHING. Two concurrent inserts for
    /// the same order cannot both succeed; the loser sees
    /// `AlreadyRecorded`.
    pub async fn insert_transaction(&self, txn: &Transaction) -> Result<InsertOutcome> {
        let result = transaction::Entity::insert(transaction_to_active_model(txn))
            .on_conflict(
                OnConflict::columns([
                    transaction::Column::Platform,
                    transaction::Column::OrderId,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec(self.db())
            .await;

        match result {
            Ok(_) => {
                info!(
                    "Transaction recorded: {} (platform: {}, order: {}, amount: {})",
                    txn.id, txn.platform, txn.order_id, txn.amount
                );
                Ok(InsertOutcome::Inserted)
            }
            Err(e) if is_unique_violation(&e) => {
                debug!(
                    "Transaction for ({}, {}) already recorded; duplicate delivery",
                    txn.platform, txn.order_id
                );
                Ok(InsertOutcome::AlreadyRecorded)
            }
            Err(e) => Err(AfftrackError::database_operation(format!(
                "Failed to insert transaction '{}': {}",
                txn.id, e
            ))),
        }
    }

    pub async fn get_transaction(&self, id: &str) -> Result<Option<Transaction>> {
        let model = transaction::Entity::find_by_id(id)
            .one(self.db())
            .await
            .map_err(|e| {
                AfftrackError::database_operation(format!(
                    "Failed to look up transaction '{}': {}",
                    id, e
                ))
            })?;

        Ok(model.map(model_to_transaction))
    }
}

/// Sum of confirmed transaction amounts for a user, usable inside an open
/// database transaction.
pub(crate) async fn sum_confirmed_for_user<C: ConnectionTrait>(
    conn: &C,
    user_id: &str,
) -> Result<Decimal> {
    let total: Option<Option<Decimal>> = transaction::Entity::find()
        .select_only()
        .column_as(transaction::Column::Amount.sum(), "total")
        .filter(transaction::Column::UserId.eq(user_id))
        .filter(transaction::Column::Status.eq(TransactionStatus::Confirmed.as_str()))
        .into_tuple()
        .one(conn)
        .await
        .map_err(|e| {
            AfftrackError::database_operation(format!(
                "Failed to sum transactions for user '{}': {}",
                user_id, e
            ))
        })?;

    Ok(total.flatten().unwrap_or_default())
}
