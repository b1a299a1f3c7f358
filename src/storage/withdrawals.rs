//! Withdrawal operations and balance aggregation
//!
//! Balance is always derived from the store: confirmed transactions minus
//! withdrawals that reserve funds (pending, approved, completed). The
//! check-then-insert pair for a new withdrawal runs inside one database
//! transaction; callers additionally serialize requests per process (see
//! `services::balance`).

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QuerySelect, TransactionTrait,
};
use sea_orm::ActiveValue::Set;
use tracing::info;

use super::converters::{model_to_withdrawal, withdrawal_to_active_model};
use super::models::{Withdrawal, WithdrawalStatus};
use super::transactions::sum_confirmed_for_user;
use super::SeaOrmStorage;
use crate::errors::{AfftrackError, Result};
use migration::entities::withdrawal;

/// Sum of withdrawal amounts that reserve balance (everything but rejected)
async fn sum_reserved_for_user<C: ConnectionTrait>(conn: &C, user_id: &str) -> Result<Decimal> {
    let reserving = [
        WithdrawalStatus::Pending.as_str(),
        WithdrawalStatus::Approved.as_str(),
        WithdrawalStatus::Completed.as_str(),
    ];

    let total: Option<Option<Decimal>> = withdrawal::Entity::find()
        .select_only()
        .column_as(withdrawal::Column::Amount.sum(), "total")
        .filter(withdrawal::Column::UserId.eq(user_id))
        .filter(withdrawal::Column::Status.is_in(reserving))
        .into_tuple()
        .one(conn)
        .await
        .map_err(|e| {
            AfftrackError::database_operation(format!(
                "Failed to sum withdrawals for user '{}': {}",
                user_id, e
            ))
        })?;

    Ok(total.flatten().unwrap_or_default())
}

async fn balance_for_user<C: ConnectionTrait>(conn: &C, user_id: &str) -> Result<Decimal> {
    let earned = sum_confirmed_for_user(conn, user_id).await?;
    let reserved = sum_reserved_for_user(conn, user_id).await?;
    Ok(earned - reserved)
}

impl SeaOrmStorage {
    /// Withdrawable balance for a user
    pub async fn get_balance(&self, user_id: &str) -> Result<Decimal> {
        balance_for_user(self.db(), user_id).await
    }

    /// Validate against the current balance and insert a pending
    /// withdrawal, all inside one database transaction.
    ///
    /// Rejects with `InsufficientFunds` when the amount exceeds the balance
    /// computed at this moment. Amount sign/zero validation is the caller's
    /// job; this layer only guards the ledger invariant.
    pub async fn create_withdrawal(&self, request: &Withdrawal) -> Result<Withdrawal> {
        let txn = self.db().begin().await.map_err(|e| {
            AfftrackError::database_operation(format!("Failed to begin transaction: {}", e))
        })?;

        let balance = balance_for_user(&txn, &request.user_id).await?;
        if request.amount > balance {
            // Rolls back on drop
            return Err(AfftrackError::insufficient_funds(format!(
                "Requested {} exceeds balance {}",
                request.amount, balance
            )));
        }

        withdrawal::Entity::insert(withdrawal_to_active_model(request))
            .exec(&txn)
            .await
            .map_err(|e| {
                AfftrackError::database_operation(format!(
                    "Failed to insert withdrawal '{}': {}",
                    request.id, e
                ))
            })?;

        txn.commit().await.map_err(|e| {
            AfftrackError::database_operation(format!("Failed to commit withdrawal: {}", e))
        })?;

        info!(
            "Withdrawal requested: {} (user: {}, amount: {})",
            request.id, request.user_id, request.amount
        );
        Ok(request.clone())
    }

    pub async fn get_withdrawal(&self, id: &str) -> Result<Option<Withdrawal>> {
        let model = withdrawal::Entity::find_by_id(id)
            .one(self.db())
            .await
            .map_err(|e| {
                AfftrackError::database_operation(format!(
                    "Failed to look up withdrawal '{}': {}",
                    id, e
                ))
            })?;

        Ok(model.map(model_to_withdrawal))
    }

    /// Move a withdrawal through its lifecycle. Only legal transitions are
    /// accepted; anything else is a conflict.
    pub async fn update_withdrawal_status(
        &self,
        id: &str,
        next: WithdrawalStatus,
    ) -> Result<Withdrawal> {
        let current = self
            .get_withdrawal(id)
            .await?
            .ok_or_else(|| AfftrackError::not_found(format!("Withdrawal not found: {}", id)))?;

        if !current.status.can_transition_to(next) {
            return Err(AfftrackError::conflict(format!(
                "Withdrawal {} cannot move from {} to {}",
                id,
                current.status.as_str(),
                next.as_str()
            )));
        }

        let now = Utc::now();
        let mut update = withdrawal::ActiveModel {
            status: Set(next.as_str().to_string()),
            ..Default::default()
        };
        match next {
            WithdrawalStatus::Approved => update.approved_at = Set(Some(now)),
            WithdrawalStatus::Completed => update.completed_at = Set(Some(now)),
            _ => {}
        }

        // Guard on the current status so a concurrent transition loses cleanly
        let result = withdrawal::Entity::update_many()
            .set(update)
            .filter(withdrawal::Column::Id.eq(id))
            .filter(withdrawal::Column::Status.eq(current.status.as_str()))
            .exec(self.db())
            .await
            .map_err(|e| {
                AfftrackError::database_operation(format!(
                    "Failed to update withdrawal '{}': {}",
                    id, e
                ))
            })?;

        if result.rows_affected == 0 {
            return Err(AfftrackError::conflict(format!(
                "Withdrawal {} changed concurrently; transition to {} not applied",
                id,
                next.as_str()
            )));
        }

        info!("Withdrawal {} moved to {}", id, next.as_str());
        self.get_withdrawal(id).await?.ok_or_else(|| {
            AfftrackError::database_operation(format!("Withdrawal {} vanished after update", id))
        })
    }
}
