//! SeaORM storage backend
//!
//! The persistent store is the single source of truth: no in-memory ledger
//! state is authoritative. Supports SQLite, MySQL/MariaDB, and PostgreSQL.

mod clicks;
mod connection;
mod converters;
mod links;
pub mod models;
pub mod retry;
mod transactions;
mod withdrawals;

use sea_orm::DatabaseConnection;
use tracing::info;

use crate::errors::{AfftrackError, Result};

pub use clicks::ConversionOutcome;
pub use connection::infer_backend_from_url;
pub use models::{
    AffiliateLink, Click, ClickStatus, Transaction, TransactionStatus, Withdrawal,
    WithdrawalStatus,
};
pub use transactions::InsertOutcome;

/// SeaORM-based storage backend
#[derive(Clone)]
pub struct SeaOrmStorage {
    db: DatabaseConnection,
    backend_name: String,
    retry_config: retry::RetryConfig,
}

impl SeaOrmStorage {
    pub async fn new(
        database_url: &str,
        backend_name: &str,
        pool_size: u32,
        retry_config: retry::RetryConfig,
    ) -> Result<Self> {
        if database_url.is_empty() {
            return Err(AfftrackError::database_config("DATABASE_URL is not set"));
        }

        let db = if backend_name == "sqlite" {
            connection::connect_sqlite(database_url).await?
        } else {
            connection::connect_generic(database_url, backend_name, pool_size).await?
        };

        let storage = SeaOrmStorage {
            db,
            backend_name: backend_name.to_string(),
            retry_config,
        };

        connection::run_migrations(&storage.db).await?;

        info!(
            "{} storage initialized",
            storage.backend_name.to_uppercase()
        );
        Ok(storage)
    }

    /// Convenience constructor for tests and simple deployments
    pub async fn connect(database_url: &str) -> Result<Self> {
        let backend = infer_backend_from_url(database_url)?;
        Self::new(database_url, &backend, 10, retry::RetryConfig::default()).await
    }

    pub fn backend_name(&self) -> &str {
        &self.backend_name
    }

    pub(crate) fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    pub(crate) fn retry_config(&self) -> retry::RetryConfig {
        self.retry_config
    }
}
