use serde_repr::{Deserialize_repr, Serialize_repr};

/// API business codes carried in the response envelope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize_repr, Deserialize_repr)]
#[repr(i32)]
pub enum ErrorCode {
    Success = 0,

    // Generic
    BadRequest = 1000,
    Unauthorized = 1001,
    Forbidden = 1003,
    NotFound = 1004,
    InternalServerError = 1005,

    // Webhooks
    InvalidSignature = 2000,
    WebhookUnprocessable = 2001,

    // Balance ledger
    InvalidAmount = 3000,
    InsufficientFunds = 3001,
    InvalidTransition = 3002,
}
