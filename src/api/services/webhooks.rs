//! Conversion webhook endpoint
//!
//! Senders deliver at-least-once and retry on 5xx, so the status code is
//! the contract: 200 acknowledges (including duplicates), 401 means the
//! signature failed, 4xx means the payload can never be processed, and 500
//! is reserved for transient storage failures worth retrying.

use std::sync::Arc;

use actix_web::{HttpRequest, HttpResponse, Responder, web};
use tracing::{error, info, warn};

use crate::errors::AfftrackError;
use crate::services::{AttributionService, WebhookOutcome};

pub struct WebhookService;

impl WebhookService {
    /// `POST /webhooks/affiliate/{platform}`
    ///
    /// The body stays raw bytes; signature verification must see exactly
    /// what the sender signed.
    pub async fn receive(
        req: HttpRequest,
        path: web::Path<String>,
        body: web::Bytes,
        attribution: web::Data<Arc<AttributionService>>,
    ) -> impl Responder {
        let platform = path.into_inner();
        let signature = req
            .headers()
            .get("x-signature")
            .and_then(|h| h.to_str().ok());

        match attribution
            .handle_webhook(&platform, &body, signature)
            .await
        {
            Ok(WebhookOutcome::Recorded(txn)) => {
                info!(
                    "Webhook processed: order {} on {} credited {}",
                    txn.order_id, platform, txn.amount
                );
                HttpResponse::Ok().body("ok")
            }
            Ok(WebhookOutcome::Duplicate { order_id }) => {
                info!("Webhook duplicate acknowledged: ({}, {})", platform, order_id);
                HttpResponse::Ok().body("ok")
            }
            Err(e @ AfftrackError::InvalidSignature(_)) => {
                warn!("Webhook rejected for {}: {}", platform, e.message());
                super::error_response(&e)
            }
            Err(e) if e.is_retryable() => {
                error!("Webhook storage failure for {}: {}", platform, e);
                super::error_response(&e)
            }
            Err(e) => {
                warn!("Webhook unprocessable for {}: {}", platform, e.message());
                super::error_response(&e)
            }
        }
    }
}
