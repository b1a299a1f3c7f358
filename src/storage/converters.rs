//! Conversions between Sea-ORM entity models and domain types
//!
//! Status columns are plain strings in the database; rows written by other
//! tooling with an unknown status fall back to the entry state rather than
//! failing the whole query.

use sea_orm::ActiveValue::Set;
use tracing::warn;

use crate::storage::models::{
    AffiliateLink, Click, ClickStatus, Transaction, TransactionStatus, Withdrawal,
    WithdrawalStatus,
};
use migration::entities::{affiliate_link, click, transaction, withdrawal};

pub fn model_to_click(model: click::Model) -> Click {
    let status = model.status.parse().unwrap_or_else(|e: String| {
        warn!("Click {}: {}; treating as pending", model.id, e);
        ClickStatus::Pending
    });
    Click {
        id: model.id,
        product_id: model.product_id,
        platform: model.platform,
        user_id: model.user_id,
        client_ip: model.client_ip,
        user_agent: model.user_agent,
        metadata: model
            .metadata
            .as_deref()
            .and_then(|raw| serde_json::from_str(raw).ok()),
        status,
        order_id: model.order_id,
        created_at: model.created_at,
        converted_at: model.converted_at,
    }
}

pub fn click_to_active_model(click: &Click) -> click::ActiveModel {
    click::ActiveModel {
        id: Set(click.id.clone()),
        product_id: Set(click.product_id.clone()),
        platform: Set(click.platform.clone()),
        user_id: Set(click.user_id.clone()),
        client_ip: Set(click.client_ip.clone()),
        user_agent: Set(click.user_agent.clone()),
        metadata: Set(click.metadata.as_ref().map(|m| m.to_string())),
        status: Set(click.status.as_str().to_string()),
        order_id: Set(click.order_id.clone()),
        created_at: Set(click.created_at),
        converted_at: Set(click.converted_at),
    }
}

pub fn model_to_link(model: affiliate_link::Model) -> AffiliateLink {
    AffiliateLink {
        id: model.id,
        product_id: model.product_id,
        platform: model.platform,
        user_id: model.user_id,
        click_id: model.click_id,
        destination_url: model.destination_url,
        created_at: model.created_at,
    }
}

pub fn link_to_active_model(link: &AffiliateLink) -> affiliate_link::ActiveModel {
    affiliate_link::ActiveModel {
        id: Set(link.id.clone()),
        product_id: Set(link.product_id.clone()),
        platform: Set(link.platform.clone()),
        user_id: Set(link.user_id.clone()),
        click_id: Set(link.click_id.clone()),
        destination_url: Set(link.destination_url.clone()),
        created_at: Set(link.created_at),
    }
}

pub fn model_to_transaction(model: transaction::Model) -> Transaction {
    let status = model.status.parse().unwrap_or_else(|e: String| {
        warn!("Transaction {}: {}; treating as pending", model.id, e);
        TransactionStatus::Pending
    });
    Transaction {
        id: model.id,
        user_id: model.user_id,
        platform: model.platform,
        product_id: model.product_id,
        amount: model.amount,
        order_id: model.order_id,
        click_id: model.click_id,
        status,
        created_at: model.created_at,
    }
}

pub fn transaction_to_active_model(txn: &Transaction) -> transaction::ActiveModel {
    transaction::ActiveModel {
        id: Set(txn.id.clone()),
        user_id: Set(txn.user_id.clone()),
        platform: Set(txn.platform.clone()),
        product_id: Set(txn.product_id.clone()),
        amount: Set(txn.amount),
        order_id: Set(txn.order_id.clone()),
        click_id: Set(txn.click_id.clone()),
        status: Set(txn.status.as_str().to_string()),
        created_at: Set(txn.created_at),
    }
}

pub fn model_to_withdrawal(model: withdrawal::Model) -> Withdrawal {
    let status = model.status.parse().unwrap_or_else(|e: String| {
        warn!("Withdrawal {}: {}; treating as pending", model.id, e);
        WithdrawalStatus::Pending
    });
    Withdrawal {
        id: model.id,
        user_id: model.user_id,
        amount: model.amount,
        method: model.method,
        details: model.details,
        status,
        created_at: model.created_at,
        approved_at: model.approved_at,
        completed_at: model.completed_at,
    }
}

pub fn withdrawal_to_active_model(withdrawal: &Withdrawal) -> withdrawal::ActiveModel {
    withdrawal::ActiveModel {
        id: Set(withdrawal.id.clone()),
        user_id: Set(withdrawal.user_id.clone()),
        amount: Set(withdrawal.amount),
        method: Set(withdrawal.method.clone()),
        details: Set(withdrawal.details.clone()),
        status: Set(withdrawal.status.as_str().to_string()),
        created_at: Set(withdrawal.created_at),
        approved_at: Set(withdrawal.approved_at),
        completed_at: Set(withdrawal.completed_at),
    }
}
