use actix_service::{Service, Transform};
use actix_web::{
    Error, HttpMessage, HttpResponse,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    http::{Method, header::CONTENT_TYPE},
    web,
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use std::rc::Rc;
use tracing::{info, trace};

use crate::api::error_code::ErrorCode;
use crate::api::jwt::{JwtService, Role};
use crate::api::types::ApiResponse;

/// Authenticated session, inserted into request extensions for handlers
#[derive(Debug, Clone)]
pub struct Session {
    pub user_id: String,
    pub role: Role,
}

/// Bearer-token authentication middleware.
///
/// `required()` admits any valid token; `owner()` additionally requires the
/// owner role. The validated session lands in request extensions.
#[derive(Clone, Copy)]
pub struct SessionAuth {
    require_owner: bool,
}

impl SessionAuth {
    pub fn required() -> Self {
        Self {
            require_owner: false,
        }
    }

    pub fn owner() -> Self {
        Self {
            require_owner: true,
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for SessionAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = SessionAuthMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(SessionAuthMiddleware {
            service: Rc::new(service),
            require_owner: self.require_owner,
        }))
    }
}

pub struct SessionAuthMiddleware<S> {
    service: Rc<S>,
    require_owner: bool,
}

impl<S, B> SessionAuthMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    fn handle_options_request(req: ServiceRequest) -> ServiceResponse<EitherBody<B>> {
        req.into_response(
            HttpResponse::NoContent()
                .insert_header((CONTENT_TYPE, "text/plain; charset=utf-8"))
                .finish()
                .map_into_right_body(),
        )
    }

    fn handle_unauthorized(req: ServiceRequest) -> ServiceResponse<EitherBody<B>> {
        info!("Authentication failed - invalid or missing token");
        req.into_response(
            HttpResponse::Unauthorized()
                .insert_header((CONTENT_TYPE, "application/json; charset=utf-8"))
                .json(ApiResponse::<()>::error(
                    ErrorCode::Unauthorized,
                    "Unauthorized: Invalid or missing token",
                ))
                .map_into_right_body(),
        )
    }

    fn handle_forbidden(req: ServiceRequest) -> ServiceResponse<EitherBody<B>> {
        info!("Authorization failed - owner role required");
        req.into_response(
            HttpResponse::Forbidden()
                .insert_header((CONTENT_TYPE, "application/json; charset=utf-8"))
                .json(ApiResponse::<()>::error(
                    ErrorCode::Forbidden,
                    "Forbidden: Owner role required",
                ))
                .map_into_right_body(),
        )
    }
}

/// Pull the Bearer token from the Authorization header
pub fn extract_bearer_token(req: &ServiceRequest) -> Option<String> {
    req.headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(|s| s.to_string())
}

impl<S, B> Service<ServiceRequest> for SessionAuthMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &self,
        ctx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = self.service.clone();
        let require_owner = self.require_owner;

        Box::pin(async move {
            if req.method() == Method::OPTIONS {
                return Ok(Self::handle_options_request(req));
            }

            let Some(jwt) = req.app_data::<web::Data<JwtService>>().cloned() else {
                return Ok(Self::handle_unauthorized(req));
            };

            let claims = match extract_bearer_token(&req)
                .and_then(|token| jwt.validate_access_token(&token).ok())
            {
                Some(claims) => claims,
                None => return Ok(Self::handle_unauthorized(req)),
            };

            if require_owner && claims.role != Role::Owner {
                return Ok(Self::handle_forbidden(req));
            }

            trace!("Authenticated {} ({:?})", claims.sub, claims.role);
            req.extensions_mut().insert(Session {
                user_id: claims.sub,
                role: claims.role,
            });

            let response = srv.call(req).await?.map_into_left_body();
            Ok(response)
        })
    }
}
