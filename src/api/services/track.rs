//! Click tracking endpoint

use std::sync::Arc;

use actix_web::{HttpRequest, HttpResponse, Responder, web};
use chrono::Utc;
use tracing::{debug, error};

use crate::api::jwt::JwtService;
use crate::api::types::{ApiResponse, TrackClickRequest, TrackClickResponse};
use crate::errors::AfftrackError;
use crate::storage::{Click, ClickStatus, SeaOrmStorage};
use crate::utils::{extract_client_ip, generate_prefixed_id, id_prefix};

pub struct TrackService;

impl TrackService {
    /// `POST /api/track-click`
    ///
    /// Public endpoint: clicks arrive before anyone logs in. A valid Bearer
    /// token, when present, attaches the user so later conversions credit
    /// them; an invalid one is ignored rather than rejected.
    pub async fn track_click(
        req: HttpRequest,
        body: web::Json<TrackClickRequest>,
        storage: web::Data<Arc<SeaOrmStorage>>,
        jwt: web::Data<JwtService>,
    ) -> impl Responder {
        let body = body.into_inner();
        if body.product_id.is_empty() || body.platform.is_empty() {
            return super::error_response(&AfftrackError::validation(
                "productId and platform are required",
            ));
        }

        let user_id = req
            .headers()
            .get("Authorization")
            .and_then(|h| h.to_str().ok())
            .and_then(|s| s.strip_prefix("Bearer "))
            .and_then(|token| jwt.validate_access_token(token).ok())
            .map(|claims| claims.sub);

        let user_agent = req
            .headers()
            .get("User-Agent")
            .and_then(|h| h.to_str().ok())
            .map(str::to_string);

        let click = Click {
            id: generate_prefixed_id(id_prefix::CLICK),
            product_id: body.product_id,
            platform: body.platform,
            user_id,
            client_ip: extract_client_ip(&req),
            user_agent,
            metadata: body.meta,
            status: ClickStatus::Pending,
            order_id: None,
            created_at: Utc::now(),
            converted_at: None,
        };

        match storage.insert_click(&click).await {
            Ok(_) => {
                debug!("Click tracked: {} ({})", click.id, click.platform);
                HttpResponse::Ok().json(ApiResponse::ok(TrackClickResponse { click_id: click.id }))
            }
            Err(e) => {
                error!("Failed to record click: {}", e);
                super::error_response(&e)
            }
        }
    }
}
