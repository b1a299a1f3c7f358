//! HTTP API integration tests
//!
//! Full-stack tests through the actix service: routing, auth middleware,
//! the response envelope, and the click -> link -> webhook -> withdrawal
//! flow end to end.

use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::test::{self, TestRequest};
use actix_web::{App, web};
use serde_json::{Value, json};
use tempfile::TempDir;

use afftrack::api::{JwtService, Role, configure_routes};
use afftrack::config::LinksConfig;
use afftrack::services::{
    AttributionService, BalanceService, LinkIssuer, UrlTemplateClient, WebhookSecrets,
    signature,
};
use afftrack::storage::SeaOrmStorage;

const WEBHOOK_SECRET: &str = "api-test-secret";

struct TestCtx {
    storage: Arc<SeaOrmStorage>,
    jwt: web::Data<JwtService>,
    attribution: Arc<AttributionService>,
    issuer: Arc<LinkIssuer>,
    balance: Arc<BalanceService>,
    _dir: TempDir,
}

impl TestCtx {
    async fn new() -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");
        let db_path = dir.path().join("api_test.db");
        let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
        let storage = Arc::new(
            SeaOrmStorage::connect(&db_url)
                .await
                .expect("failed to open test database"),
        );

        Self {
            jwt: web::Data::new(JwtService::new("api-test-jwt-secret", 60)),
            attribution: Arc::new(AttributionService::new(
                storage.clone(),
                WebhookSecrets::new(Some(WEBHOOK_SECRET.to_string()), Default::default()),
            )),
            issuer: Arc::new(LinkIssuer::new(
                storage.clone(),
                Arc::new(UrlTemplateClient::from_config(&LinksConfig::default())),
            )),
            balance: Arc::new(BalanceService::new(storage.clone())),
            storage,
            _dir: dir,
        }
    }

    fn user_token(&self, user_id: &str) -> String {
        self.jwt.generate_access_token(user_id, Role::User).unwrap()
    }

    fn owner_token(&self) -> String {
        self.jwt.generate_access_token("owner", Role::Owner).unwrap()
    }
}

macro_rules! init_app {
    ($ctx:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($ctx.storage.clone()))
                .app_data($ctx.jwt.clone())
                .app_data(web::Data::new($ctx.attribution.clone()))
                .app_data(web::Data::new($ctx.issuer.clone()))
                .app_data(web::Data::new($ctx.balance.clone()))
                .configure(configure_routes),
        )
        .await
    };
}

fn signed_webhook(platform: &str, body: &Value) -> TestRequest {
    let bytes = serde_json::to_vec(body).unwrap();
    let sig = signature::sign(&bytes, WEBHOOK_SECRET);
    TestRequest::post()
        .uri(&format!("/webhooks/affiliate/{}", platform))
        .insert_header(("x-signature", sig))
        .insert_header(("content-type", "application/json"))
        .set_payload(bytes)
}

#[actix_web::test]
async fn click_to_withdrawal_end_to_end() {
    let ctx = TestCtx::new().await;
    let app = init_app!(ctx);
    let token = ctx.user_token("u_e2e");

    // 1. Track a click (authenticated, so the user is attached)
    let resp = test::call_service(
        &app,
        TestRequest::post()
            .uri("/api/track-click")
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .set_json(json!({"productId": "B0E2E", "platform": "amazon"}))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], 0);
    let click_id = body["data"]["clickId"].as_str().unwrap().to_string();
    assert!(click_id.starts_with("clk_"));

    // 2. Generate an affiliate link carrying the click token
    let resp = test::call_service(
        &app,
        TestRequest::post()
            .uri("/api/generate-affiliate-link")
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .set_json(json!({
                "productId": "B0E2E",
                "platform": "amazon",
                "clickId": click_id
            }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    let affiliate_url = body["data"]["affiliateUrl"].as_str().unwrap();
    assert!(affiliate_url.contains(&format!("clk={}", click_id)));

    // 3. The platform reports a conversion
    let resp = test::call_service(
        &app,
        signed_webhook(
            "amazon",
            &json!({"order_id": "ORD1", "click_id": click_id, "commission": 7.5}),
        )
        .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(test::read_body(resp).await, "ok");

    // 4. Balance reflects the credit
    let resp = test::call_service(
        &app,
        TestRequest::get()
            .uri("/api/balance")
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .to_request(),
    )
    .await;
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["balance"].as_f64(), Some(7.5));

    // 5. Withdraw part of it
    let resp = test::call_service(
        &app,
        TestRequest::post()
            .uri("/api/withdraw")
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .set_json(json!({"amount": 5, "method": "paypal", "details": "e2e@example.com"}))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    let withdrawal_id = body["data"]["id"].as_str().unwrap().to_string();
    assert_eq!(body["data"]["status"], "pending");

    let resp = test::call_service(
        &app,
        TestRequest::get()
            .uri("/api/balance")
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .to_request(),
    )
    .await;
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["balance"].as_f64(), Some(2.5));

    // 6. Owner approves the withdrawal
    let resp = test::call_service(
        &app,
        TestRequest::put()
            .uri(&format!("/api/owner/withdrawals/{}", withdrawal_id))
            .insert_header(("Authorization", format!("Bearer {}", ctx.owner_token())))
            .set_json(json!({"status": "approved"}))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["status"], "approved");
}

#[actix_web::test]
async fn anonymous_click_is_accepted() {
    let ctx = TestCtx::new().await;
    let app = init_app!(ctx);

    let resp = test::call_service(
        &app,
        TestRequest::post()
            .uri("/api/track-click")
            .set_json(json!({"productId": "B0ANON", "platform": "ebay"}))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    let click_id = body["data"]["clickId"].as_str().unwrap();
    let click = ctx.storage.get_click(click_id).await.unwrap().unwrap();
    assert_eq!(click.user_id, None);
}

#[actix_web::test]
async fn track_click_requires_product_and_platform() {
    let ctx = TestCtx::new().await;
    let app = init_app!(ctx);

    let resp = test::call_service(
        &app,
        TestRequest::post()
            .uri("/api/track-click")
            .set_json(json!({"productId": "", "platform": "amazon"}))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], 1000);
}

#[actix_web::test]
async fn protected_routes_require_a_token() {
    let ctx = TestCtx::new().await;
    let app = init_app!(ctx);

    for req in [
        TestRequest::get().uri("/api/balance"),
        TestRequest::post()
            .uri("/api/generate-affiliate-link")
            .set_json(json!({"productId": "X", "platform": "amazon"})),
    ] {
        let resp = test::call_service(&app, req.to_request()).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    let resp = test::call_service(
        &app,
        TestRequest::get()
            .uri("/api/balance")
            .insert_header(("Authorization", "Bearer not-a-jwt"))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn owner_routes_reject_plain_users() {
    let ctx = TestCtx::new().await;
    let app = init_app!(ctx);

    let resp = test::call_service(
        &app,
        TestRequest::put()
            .uri("/api/owner/withdrawals/wd_x")
            .insert_header(("Authorization", format!("Bearer {}", ctx.user_token("u_1"))))
            .set_json(json!({"status": "approved"}))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn webhook_with_bad_signature_is_unauthorized() {
    let ctx = TestCtx::new().await;
    let app = init_app!(ctx);

    let resp = test::call_service(
        &app,
        TestRequest::post()
            .uri("/webhooks/affiliate/amazon")
            .insert_header(("x-signature", "deadbeef"))
            .insert_header(("content-type", "application/json"))
            .set_payload(r#"{"order_id":"ORD-bad","commission":1}"#)
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    assert!(ctx
        .storage
        .find_transaction_by_order("amazon", "ORD-bad")
        .await
        .unwrap()
        .is_none());
}

#[actix_web::test]
async fn duplicate_webhook_is_acknowledged() {
    let ctx = TestCtx::new().await;
    let app = init_app!(ctx);

    let body = json!({"order_id": "ORD-dup", "commission": 3});
    for _ in 0..2 {
        let resp = test::call_service(&app, signed_webhook("ebay", &body).to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(test::read_body(resp).await, "ok");
    }

    let txn = ctx
        .storage
        .find_transaction_by_order("ebay", "ORD-dup")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(txn.amount, rust_decimal::Decimal::from(3));
}

#[actix_web::test]
async fn overdraw_returns_insufficient_funds() {
    let ctx = TestCtx::new().await;
    let app = init_app!(ctx);
    let token = ctx.user_token("u_poor");

    let resp = test::call_service(
        &app,
        TestRequest::post()
            .uri("/api/withdraw")
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .set_json(json!({"amount": 10, "method": "paypal", "details": "x"}))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], 3001);
}
