//! Balance queries and withdrawal requests
//!
//! Withdrawal requests are serialized through a process-wide lock so two
//! concurrent requests cannot both pass the balance check. The storage
//! layer repeats the check inside a database transaction; the lock keeps
//! the common single-process case strictly ordered.

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use tokio::sync::Mutex;

use crate::errors::{AfftrackError, Result};
use crate::storage::{SeaOrmStorage, Withdrawal, WithdrawalStatus};
use crate::utils::{generate_prefixed_id, id_prefix};

pub struct BalanceService {
    storage: Arc<SeaOrmStorage>,
    withdraw_lock: Mutex<()>,
}

impl BalanceService {
    pub fn new(storage: Arc<SeaOrmStorage>) -> Self {
        Self {
            storage,
            withdraw_lock: Mutex::new(()),
        }
    }

    /// Withdrawable balance: confirmed earnings minus reserved withdrawals
    pub async fn get_balance(&self, user_id: &str) -> Result<Decimal> {
        self.storage.get_balance(user_id).await
    }

    /// Request a withdrawal. Amounts must be strictly positive; amounts
    /// above the current balance are rejected, never partially filled.
    pub async fn request_withdrawal(
        &self,
        user_id: &str,
        amount: Decimal,
        method: &str,
        details: &str,
    ) -> Result<Withdrawal> {
        if amount <= Decimal::ZERO {
            return Err(AfftrackError::invalid_amount(format!(
                "Withdrawal amount must be positive, got {}",
                amount
            )));
        }
        if method.is_empty() {
            return Err(AfftrackError::validation("method must not be empty"));
        }

        let request = Withdrawal {
            id: generate_prefixed_id(id_prefix::WITHDRAWAL),
            user_id: user_id.to_string(),
            amount,
            method: method.to_string(),
            details: details.to_string(),
            status: WithdrawalStatus::Pending,
            created_at: Utc::now(),
            approved_at: None,
            completed_at: None,
        };

        let _guard = self.withdraw_lock.lock().await;
        self.storage.create_withdrawal(&request).await
    }

    /// Owner action: move a withdrawal through its lifecycle
    pub async fn update_withdrawal_status(
        &self,
        id: &str,
        next: WithdrawalStatus,
    ) -> Result<Withdrawal> {
        self.storage.update_withdrawal_status(id, next).await
    }

    pub async fn get_withdrawal(&self, id: &str) -> Result<Option<Withdrawal>> {
        self.storage.get_withdrawal(id).await
    }
}
