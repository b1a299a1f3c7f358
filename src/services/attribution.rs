//! Commission attribution
//!
//! Consumes verified conversion webhooks and reconciles them back to the
//! originating click and user, crediting commission exactly once per
//! (platform, order id). Webhook delivery is at-least-once, so duplicate
//! payloads are the expected case, not an error.

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use serde_json::Value;
use tracing::{debug, info, warn};

use super::{commission, signature};
use crate::config::WebhookConfig;
use crate::errors::{AfftrackError, Result};
use crate::storage::{
    ConversionOutcome, InsertOutcome, SeaOrmStorage, Transaction, TransactionStatus,
};
use crate::utils::{generate_prefixed_id, id_prefix};

/// Field names tried, in order, when hunting for a correlation token.
/// Platforms are inconsistent about what they call it.
const CORRELATION_FIELDS: &[&str] = &[
    "tracking_id",
    "trackingId",
    "click_id",
    "clickId",
    "sub_id",
    "aff_sub",
];

const ORDER_ID_FIELDS: &[&str] = &["order_id", "orderId", "order", "transaction_id"];

const COMMISSION_FIELDS: &[&str] = &["commission", "commission_amount", "amount", "payout"];

const ORDER_VALUE_FIELDS: &[&str] = &["order_value", "order_total", "price", "total"];

fn string_field(payload: &Value, fields: &[&str]) -> Option<String> {
    for field in fields {
        if let Some(value) = payload.get(field) {
            match value {
                Value::String(s) if !s.is_empty() => return Some(s.clone()),
                Value::Number(n) => return Some(n.to_string()),
                _ => {}
            }
        }
    }
    None
}

fn decimal_field(payload: &Value, fields: &[&str]) -> Option<Decimal> {
    for field in fields {
        match payload.get(field) {
            Some(Value::Number(n)) => {
                if let Ok(d) = Decimal::from_str(&n.to_string()) {
                    return Some(d);
                }
            }
            Some(Value::String(s)) => {
                if let Ok(d) = Decimal::from_str(s) {
                    return Some(d);
                }
            }
            _ => {}
        }
    }
    None
}

/// Extract the correlation token from a webhook payload.
///
/// Ordered rules, first match wins:
/// 1. an explicit tracking-id field
/// 2. a click-id field
/// 3. sub-id style fields
/// 4. a `clk_`/`lnk_` token embedded inside the order id
///
/// Pure function; returns None when nothing resolves.
pub fn extract_correlation_token(payload: &Value) -> Option<String> {
    if let Some(token) = string_field(payload, CORRELATION_FIELDS) {
        return Some(token);
    }

    // Some platforms only echo the tracking token back inside their own
    // order identifier, e.g. "AMZ-991:clk_a1b2c3d4e5f60718".
    let order_id = string_field(payload, ORDER_ID_FIELDS)?;
    order_id
        .split(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .find(|segment| segment.starts_with(id_prefix::CLICK) || segment.starts_with(id_prefix::LINK))
        .map(str::to_string)
}

/// Extract the external order identifier
pub fn extract_order_id(payload: &Value) -> Option<String> {
    string_field(payload, ORDER_ID_FIELDS)
}

/// Extract the commission amount: an explicit commission/amount field wins;
/// otherwise derive it from the order value and the platform's rate.
pub fn extract_amount(payload: &Value, platform: &str) -> Option<Decimal> {
    if let Some(amount) = decimal_field(payload, COMMISSION_FIELDS) {
        return Some(amount);
    }
    decimal_field(payload, ORDER_VALUE_FIELDS).map(|value| commission::calculate(value, platform))
}

/// Per-platform webhook secrets with a shared fallback
#[derive(Debug, Clone, Default)]
pub struct WebhookSecrets {
    shared: Option<String>,
    per_platform: HashMap<String, String>,
}

impl WebhookSecrets {
    pub fn new(shared: Option<String>, per_platform: HashMap<String, String>) -> Self {
        Self {
            shared: shared.filter(|s| !s.is_empty()),
            per_platform,
        }
    }

    pub fn from_config(config: &WebhookConfig) -> Self {
        Self::new(
            Some(config.shared_secret.clone()),
            config.platform_secrets.clone(),
        )
    }

    pub fn secret_for(&self, platform: &str) -> Option<&str> {
        self.per_platform
            .get(&platform.to_lowercase())
            .map(String::as_str)
            .or(self.shared.as_deref())
    }
}

/// Outcome of processing a webhook
#[derive(Debug, Clone, PartialEq)]
pub enum WebhookOutcome {
    /// A new confirmed transaction was written
    Recorded(Transaction),
    /// This order was already credited; replay acknowledged, nothing written
    Duplicate { order_id: String },
}

/// The attribution pipeline: verify -> extract -> dedup -> record -> convert
pub struct AttributionService {
    storage: Arc<SeaOrmStorage>,
    secrets: WebhookSecrets,
}

impl AttributionService {
    pub fn new(storage: Arc<SeaOrmStorage>, secrets: WebhookSecrets) -> Self {
        Self { storage, secrets }
    }

    /// Process one webhook delivery.
    ///
    /// Signature failures reject the payload before it is parsed. Duplicate
    /// orders return `Duplicate` so the sender gets an acknowledgment and
    /// stops retrying. Storage failures bubble up as retryable.
    pub async fn handle_webhook(
        &self,
        platform: &str,
        raw_body: &[u8],
        signature_header: Option<&str>,
    ) -> Result<WebhookOutcome> {
        let secret = self.secrets.secret_for(platform).unwrap_or("");
        if !signature::verify(signature_header.unwrap_or(""), raw_body, secret) {
            return Err(AfftrackError::invalid_signature(format!(
                "Webhook signature verification failed for platform '{}'",
                platform
            )));
        }

        let payload: Value = serde_json::from_slice(raw_body).map_err(|e| {
            AfftrackError::validation(format!("Webhook payload is not valid JSON: {}", e))
        })?;

        let order_id = extract_order_id(&payload).ok_or_else(|| {
            AfftrackError::validation("Webhook payload carries no order identifier")
        })?;

        // At-least-once delivery: a replay of an already-credited order is
        // acknowledged without touching the ledger.
        if let Some(existing) = self
            .storage
            .find_transaction_by_order(platform, &order_id)
            .await?
        {
            debug!(
                "Webhook replay for ({}, {}); transaction {} already recorded",
                platform, order_id, existing.id
            );
            return Ok(WebhookOutcome::Duplicate { order_id });
        }

        let amount = extract_amount(&payload, platform).ok_or_else(|| {
            AfftrackError::validation("Webhook payload carries no commission or order value")
        })?;

        // Resolve the correlation token to a click, possibly via the link join
        let token = extract_correlation_token(&payload);
        let click = match token.as_deref() {
            Some(token) => self.resolve_click(token).await?,
            None => None,
        };

        let txn = Transaction {
            id: generate_prefixed_id(id_prefix::TRANSACTION),
            user_id: click.as_ref().and_then(|c| c.user_id.clone()),
            platform: platform.to_string(),
            product_id: click.as_ref().map(|c| c.product_id.clone()),
            amount,
            order_id: order_id.clone(),
            click_id: click.as_ref().map(|c| c.id.clone()),
            status: TransactionStatus::Confirmed,
            created_at: Utc::now(),
        };

        match self.storage.insert_transaction(&txn).await? {
            InsertOutcome::AlreadyRecorded => {
                // Lost a race with a concurrent delivery of the same order
                return Ok(WebhookOutcome::Duplicate { order_id });
            }
            InsertOutcome::Inserted => {}
        }

        if let Some(ref click) = click {
            match self
                .storage
                .mark_click_converted(&click.id, &order_id, Utc::now())
                .await?
            {
                ConversionOutcome::Converted => {
                    info!(
                        "Attributed order {} on {} to click {} (user: {:?})",
                        order_id, platform, click.id, click.user_id
                    );
                }
                ConversionOutcome::AlreadyConverted => {
                    debug!("Click {} already converted for order {}", click.id, order_id);
                }
                ConversionOutcome::OrderConflict { existing_order_id } => {
                    warn!(
                        "Click {} already belongs to order {}; order {} recorded without conversion",
                        click.id, existing_order_id, order_id
                    );
                }
                ConversionOutcome::NotFound => {
                    warn!("Click {} vanished during attribution", click.id);
                }
            }
        } else {
            // Bookkeeping still happens; nobody gets credited.
            warn!(
                "Unattributed webhook for ({}, {}): no resolvable tracking token (token: {:?})",
                platform, order_id, token
            );
        }

        Ok(WebhookOutcome::Recorded(txn))
    }

    /// Resolve a correlation token to a click. `lnk_` tokens go through the
    /// affiliate-link join; anything else is treated as a click id.
    async fn resolve_click(&self, token: &str) -> Result<Option<crate::storage::Click>> {
        if token.starts_with(id_prefix::LINK) {
            let Some(link) = self.storage.get_link(token).await? else {
                return Ok(None);
            };
            let Some(click_id) = link.click_id else {
                return Ok(None);
            };
            return self.storage.get_click(&click_id).await;
        }

        self.storage.get_click(token).await
    }
}
