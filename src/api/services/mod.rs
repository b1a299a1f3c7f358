//! HTTP handlers, grouped per concern the way the routes are scoped

pub mod links;
pub mod track;
pub mod webhooks;
pub mod withdrawals;

use actix_web::HttpResponse;

use crate::api::error_code::ErrorCode;
use crate::api::types::ApiResponse;
use crate::errors::AfftrackError;

/// Map a domain error onto the response envelope
pub(crate) fn error_response(err: &AfftrackError) -> HttpResponse {
    let (status, code) = match err {
        AfftrackError::Validation(_) => (HttpResponse::BadRequest(), ErrorCode::BadRequest),
        AfftrackError::InvalidSignature(_) => {
            (HttpResponse::Unauthorized(), ErrorCode::InvalidSignature)
        }
        AfftrackError::InvalidAmount(_) => (HttpResponse::BadRequest(), ErrorCode::InvalidAmount),
        AfftrackError::InsufficientFunds(_) => {
            (HttpResponse::BadRequest(), ErrorCode::InsufficientFunds)
        }
        AfftrackError::NotFound(_) => (HttpResponse::NotFound(), ErrorCode::NotFound),
        AfftrackError::Conflict(_) => (HttpResponse::Conflict(), ErrorCode::InvalidTransition),
        _ => (
            HttpResponse::InternalServerError(),
            ErrorCode::InternalServerError,
        ),
    };

    let mut builder = status;
    builder.json(ApiResponse::<()>::error(code, err.message()))
}
