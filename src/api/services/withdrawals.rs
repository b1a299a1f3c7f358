//! Balance and withdrawal endpoints

use std::str::FromStr;
use std::sync::Arc;

use actix_web::{HttpMessage, HttpRequest, HttpResponse, Responder, web};
use tracing::error;

use crate::api::error_code::ErrorCode;
use crate::api::middleware::Session;
use crate::api::types::{
    ApiResponse, BalanceResponse, UpdateWithdrawalRequest, WithdrawRequest, WithdrawResponse,
    WithdrawalView,
};
use crate::errors::AfftrackError;
use crate::services::BalanceService;
use crate::storage::WithdrawalStatus;

fn session_of(req: &HttpRequest) -> Option<Session> {
    req.extensions().get::<Session>().cloned()
}

pub struct WithdrawService;

impl WithdrawService {
    /// `POST /api/withdraw` (bearer auth)
    pub async fn withdraw(
        req: HttpRequest,
        body: web::Json<WithdrawRequest>,
        balance: web::Data<Arc<BalanceService>>,
    ) -> impl Responder {
        let Some(session) = session_of(&req) else {
            return HttpResponse::Unauthorized()
                .json(ApiResponse::<()>::error(ErrorCode::Unauthorized, "Unauthorized"));
        };

        let body = body.into_inner();
        match balance
            .request_withdrawal(&session.user_id, body.amount, &body.method, &body.details)
            .await
        {
            Ok(withdrawal) => HttpResponse::Ok().json(ApiResponse::ok(WithdrawResponse {
                id: withdrawal.id,
                status: withdrawal.status.as_str().to_string(),
            })),
            Err(e) => {
                error!("Withdrawal request failed for {}: {}", session.user_id, e);
                super::error_response(&e)
            }
        }
    }

    /// `GET /api/balance` (bearer auth)
    pub async fn balance(
        req: HttpRequest,
        balance: web::Data<Arc<BalanceService>>,
    ) -> impl Responder {
        let Some(session) = session_of(&req) else {
            return HttpResponse::Unauthorized()
                .json(ApiResponse::<()>::error(ErrorCode::Unauthorized, "Unauthorized"));
        };

        match balance.get_balance(&session.user_id).await {
            Ok(amount) => {
                HttpResponse::Ok().json(ApiResponse::ok(BalanceResponse { balance: amount }))
            }
            Err(e) => {
                error!("Balance query failed for {}: {}", session.user_id, e);
                super::error_response(&e)
            }
        }
    }

    /// `PUT /api/owner/withdrawals/{id}` (owner role)
    pub async fn update_status(
        path: web::Path<String>,
        body: web::Json<UpdateWithdrawalRequest>,
        balance: web::Data<Arc<BalanceService>>,
    ) -> impl Responder {
        let id = path.into_inner();
        let next = match WithdrawalStatus::from_str(&body.status) {
            Ok(status) => status,
            Err(e) => {
                return super::error_response(&AfftrackError::validation(e));
            }
        };

        match balance.update_withdrawal_status(&id, next).await {
            Ok(withdrawal) => {
                HttpResponse::Ok().json(ApiResponse::ok(WithdrawalView::from(&withdrawal)))
            }
            Err(e) => {
                error!("Withdrawal transition failed for {}: {}", id, e);
                super::error_response(&e)
            }
        }
    }
}
