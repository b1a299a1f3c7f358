//! Request/response DTOs for the HTTP API

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error_code::ErrorCode;

/// Standard response envelope: `{ code, message, data }`
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub code: i32,
    pub message: String,
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            code: ErrorCode::Success as i32,
            message: "ok".to_string(),
            data: Some(data),
        }
    }

    pub fn error(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code: code as i32,
            message: message.into(),
            data: None,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackClickRequest {
    pub product_id: String,
    pub platform: String,
    #[serde(default)]
    pub meta: Option<serde_json::Value>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackClickResponse {
    pub click_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateLinkRequest {
    pub product_id: String,
    pub platform: String,
    #[serde(default)]
    pub click_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateLinkResponse {
    pub link_id: String,
    pub affiliate_url: String,
}

#[derive(Debug, Deserialize)]
pub struct WithdrawRequest {
    pub amount: Decimal,
    pub method: String,
    pub details: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct WithdrawResponse {
    pub id: String,
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BalanceResponse {
    pub balance: Decimal,
}

#[derive(Debug, Deserialize)]
pub struct UpdateWithdrawalRequest {
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct WithdrawalView {
    pub id: String,
    pub user_id: String,
    pub amount: Decimal,
    pub method: String,
    pub status: String,
}

impl From<&crate::storage::Withdrawal> for WithdrawalView {
    fn from(w: &crate::storage::Withdrawal) -> Self {
        Self {
            id: w.id.clone(),
            user_id: w.user_id.clone(),
            amount: w.amount,
            method: w.method.clone(),
            status: w.status.as_str().to_string(),
        }
    }
}
