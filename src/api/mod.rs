//! HTTP API: routes, auth middleware, JWT, and response envelope

pub mod error_code;
pub mod jwt;
pub mod middleware;
pub mod services;
pub mod types;

pub use error_code::ErrorCode;
pub use jwt::{JwtService, Role};
pub use middleware::{Session, SessionAuth};
pub use types::ApiResponse;

use actix_web::web;

use services::links::LinkApiService;
use services::track::TrackService;
use services::webhooks::WebhookService;
use services::withdrawals::WithdrawService;

/// Route table, shared between the binary and the integration tests.
///
/// `/api/track-click` is public (clicks arrive pre-login), the webhook
/// endpoint authenticates via signature instead of a session, and
/// everything else under `/api` requires a Bearer token.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/track-click", web::post().to(TrackService::track_click))
            .service(
                web::scope("/owner")
                    .wrap(SessionAuth::owner())
                    .route(
                        "/withdrawals/{id}",
                        web::put().to(WithdrawService::update_status),
                    ),
            )
            .service(
                web::scope("")
                    .wrap(SessionAuth::required())
                    .route(
                        "/generate-affiliate-link",
                        web::post().to(LinkApiService::generate_link),
                    )
                    .route("/withdraw", web::post().to(WithdrawService::withdraw))
                    .route("/balance", web::get().to(WithdrawService::balance)),
            ),
    )
    .service(
        web::scope("/webhooks/affiliate")
            .route("/{platform}", web::post().to(WebhookService::receive)),
    );
}
