//! Attribution pipeline integration tests
//!
//! Exercise the webhook flow against a real SQLite database: signature
//! rejection, duplicate delivery, click conversion, and the unattributed
//! fallback.

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use serde_json::json;
use tempfile::TempDir;

use afftrack::services::attribution::{AttributionService, WebhookOutcome, WebhookSecrets};
use afftrack::services::signature;
use afftrack::storage::{Click, ClickStatus, SeaOrmStorage};

const SECRET: &str = "test-webhook-secret";

async fn test_storage() -> (Arc<SeaOrmStorage>, TempDir) {
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let db_path = temp_dir.path().join("attribution_test.db");
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let storage = SeaOrmStorage::connect(&db_url)
        .await
        .expect("failed to open test database");
    (Arc::new(storage), temp_dir)
}

fn service(storage: Arc<SeaOrmStorage>) -> AttributionService {
    AttributionService::new(
        storage,
        WebhookSecrets::new(Some(SECRET.to_string()), Default::default()),
    )
}

fn pending_click(id: &str, user_id: Option<&str>) -> Click {
    Click {
        id: id.to_string(),
        product_id: "B0TEST".to_string(),
        platform: "amazon".to_string(),
        user_id: user_id.map(str::to_string),
        client_ip: Some("203.0.113.7".to_string()),
        user_agent: None,
        metadata: None,
        status: ClickStatus::Pending,
        order_id: None,
        created_at: Utc::now(),
        converted_at: None,
    }
}

fn signed(body: &serde_json::Value) -> (Vec<u8>, String) {
    let bytes = serde_json::to_vec(body).unwrap();
    let sig = signature::sign(&bytes, SECRET);
    (bytes, sig)
}

#[tokio::test]
async fn invalid_signature_writes_nothing() {
    let (storage, _dir) = test_storage().await;
    let attribution = service(storage.clone());

    let body = json!({"order_id": "ORD-sig", "commission": 5});
    let bytes = serde_json::to_vec(&body).unwrap();

    let err = attribution
        .handle_webhook("amazon", &bytes, Some("deadbeef"))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "E007");

    let missing = attribution
        .handle_webhook("amazon", &bytes, None)
        .await
        .unwrap_err();
    assert_eq!(missing.code(), "E007");

    assert!(storage
        .find_transaction_by_order("amazon", "ORD-sig")
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn duplicate_delivery_credits_once() {
    let (storage, _dir) = test_storage().await;
    let attribution = service(storage.clone());

    storage
        .insert_click(&pending_click("clk_dup0000000000aa", Some("u_1")))
        .await
        .unwrap();

    let body = json!({
        "order_id": "ORD-dup",
        "click_id": "clk_dup0000000000aa",
        "commission": 7.5
    });
    let (bytes, sig) = signed(&body);

    let first = attribution
        .handle_webhook("amazon", &bytes, Some(&sig))
        .await
        .unwrap();
    assert!(matches!(first, WebhookOutcome::Recorded(_)));

    let second = attribution
        .handle_webhook("amazon", &bytes, Some(&sig))
        .await
        .unwrap();
    assert!(matches!(second, WebhookOutcome::Duplicate { .. }));

    // Exactly one credit despite two deliveries
    let balance = storage.get_balance("u_1").await.unwrap();
    assert_eq!(balance, Decimal::new(75, 1));
}

#[tokio::test]
async fn webhook_attributes_to_click_and_user() {
    let (storage, _dir) = test_storage().await;
    let attribution = service(storage.clone());

    storage
        .insert_click(&pending_click("clk_abc0000000000001", Some("u_alice")))
        .await
        .unwrap();

    let body = json!({
        "order_id": "ORD-42",
        "tracking_id": "clk_abc0000000000001",
        "commission": "3.20"
    });
    let (bytes, sig) = signed(&body);

    let outcome = attribution
        .handle_webhook("ebay", &bytes, Some(&sig))
        .await
        .unwrap();

    let WebhookOutcome::Recorded(txn) = outcome else {
        panic!("expected a recorded transaction");
    };
    assert_eq!(txn.user_id.as_deref(), Some("u_alice"));
    assert_eq!(txn.click_id.as_deref(), Some("clk_abc0000000000001"));
    assert_eq!(txn.amount, Decimal::new(32, 1));

    let click = storage
        .get_click("clk_abc0000000000001")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(click.status, ClickStatus::Converted);
    assert_eq!(click.order_id.as_deref(), Some("ORD-42"));
    assert!(click.converted_at.is_some());
}

#[tokio::test]
async fn link_token_resolves_through_the_join() {
    let (storage, _dir) = test_storage().await;
    let attribution = service(storage.clone());

    storage
        .insert_click(&pending_click("clk_viaLink000000001", Some("u_bob")))
        .await
        .unwrap();
    storage
        .insert_link(&afftrack::storage::AffiliateLink {
            id: "lnk_feed000000000001".to_string(),
            product_id: "B0TEST".to_string(),
            platform: "amazon".to_string(),
            user_id: Some("u_bob".to_string()),
            click_id: Some("clk_viaLink000000001".to_string()),
            destination_url: "https://www.amazon.com/dp/B0TEST".to_string(),
            created_at: Utc::now(),
        })
        .await
        .unwrap();

    let body = json!({
        "order_id": "AMZ-77:lnk_feed000000000001",
        "commission": 2
    });
    let (bytes, sig) = signed(&body);

    let WebhookOutcome::Recorded(txn) = attribution
        .handle_webhook("amazon", &bytes, Some(&sig))
        .await
        .unwrap()
    else {
        panic!("expected a recorded transaction");
    };

    assert_eq!(txn.user_id.as_deref(), Some("u_bob"));
    assert_eq!(txn.click_id.as_deref(), Some("clk_viaLink000000001"));
}

#[tokio::test]
async fn unresolvable_token_records_unattributed() {
    let (storage, _dir) = test_storage().await;
    let attribution = service(storage.clone());

    let body = json!({
        "order_id": "ORD-ghost",
        "click_id": "clk_doesnotexist0000",
        "commission": 4
    });
    let (bytes, sig) = signed(&body);

    let WebhookOutcome::Recorded(txn) = attribution
        .handle_webhook("temu", &bytes, Some(&sig))
        .await
        .unwrap()
    else {
        panic!("expected a recorded transaction");
    };

    assert_eq!(txn.user_id, None);
    assert_eq!(txn.click_id, None);
    assert_eq!(txn.amount, Decimal::from(4));
}

#[tokio::test]
async fn amount_falls_back_to_rate_table() {
    let (storage, _dir) = test_storage().await;
    let attribution = service(storage.clone());

    let body = json!({"order_id": "ORD-rate", "order_value": 100});
    let (bytes, sig) = signed(&body);

    let WebhookOutcome::Recorded(txn) = attribution
        .handle_webhook("temu", &bytes, Some(&sig))
        .await
        .unwrap()
    else {
        panic!("expected a recorded transaction");
    };
    // temu pays 8%
    assert_eq!(txn.amount, Decimal::new(800, 2));
}

#[tokio::test]
async fn payload_without_order_id_is_rejected() {
    let (storage, _dir) = test_storage().await;
    let attribution = service(storage);

    let body = json!({"commission": 4});
    let (bytes, sig) = signed(&body);

    let err = attribution
        .handle_webhook("amazon", &bytes, Some(&sig))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "E004");
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn click_keeps_its_first_order() {
    let (storage, _dir) = test_storage().await;
    let attribution = service(storage.clone());

    storage
        .insert_click(&pending_click("clk_firstwins0000001", Some("u_carol")))
        .await
        .unwrap();

    for order in ["ORD-first", "ORD-second"] {
        let body = json!({
            "order_id": order,
            "click_id": "clk_firstwins0000001",
            "commission": 1
        });
        let (bytes, sig) = signed(&body);
        attribution
            .handle_webhook("amazon", &bytes, Some(&sig))
            .await
            .unwrap();
    }

    // Both orders recorded, but the click stays bound to the first
    let click = storage
        .get_click("clk_firstwins0000001")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(click.order_id.as_deref(), Some("ORD-first"));

    assert!(storage
        .find_transaction_by_order("amazon", "ORD-second")
        .await
        .unwrap()
        .is_some());
}
