//! Affiliate link endpoint

use std::sync::Arc;

use actix_web::{HttpMessage, HttpRequest, HttpResponse, Responder, web};
use tracing::error;

use crate::api::error_code::ErrorCode;
use crate::api::middleware::Session;
use crate::api::types::{ApiResponse, GenerateLinkRequest, GenerateLinkResponse};
use crate::services::LinkIssuer;

pub struct LinkApiService;

impl LinkApiService {
    /// `POST /api/generate-affiliate-link` (bearer auth)
    pub async fn generate_link(
        req: HttpRequest,
        body: web::Json<GenerateLinkRequest>,
        issuer: web::Data<Arc<LinkIssuer>>,
    ) -> impl Responder {
        let Some(session) = req.extensions().get::<Session>().cloned() else {
            return HttpResponse::Unauthorized().json(ApiResponse::<()>::error(
                ErrorCode::Unauthorized,
                "Unauthorized",
            ));
        };

        let body = body.into_inner();
        match issuer
            .issue_link(
                &body.product_id,
                &body.platform,
                body.click_id.as_deref(),
                Some(&session.user_id),
            )
            .await
        {
            Ok(link) => HttpResponse::Ok().json(ApiResponse::ok(GenerateLinkResponse {
                link_id: link.link_id,
                affiliate_url: link.affiliate_url,
            })),
            Err(e) => {
                error!("Failed to issue affiliate link: {}", e);
                super::error_response(&e)
            }
        }
    }
}
