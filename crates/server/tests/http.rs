//! Request/response round trips through the router, one per route family.

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use migration::{Migrator, MigratorTrait};
use sea_orm::Database;
use serde_json::{Value, json};
use tower::ServiceExt;

use ledger::{DEFAULT_SWEEP_INTERVAL, Engine, Reconciler};
use server::{ServerState, router};

async fn test_router() -> Router {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    Migrator::up(&db, None).await.unwrap();
    let engine = Arc::new(Engine::builder().database(db).build().await.unwrap());
    let reconciler = Arc::new(Reconciler::new(Arc::clone(&engine), DEFAULT_SWEEP_INTERVAL));
    router(ServerState { engine, reconciler })
}

fn get(uri: &str, user: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("x-kolo-user", user)
        .body(Body::empty())
        .unwrap()
}

fn post(uri: &str, user: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("x-kolo-user", user)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn post_empty(uri: &str, user: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("x-kolo-user", user)
        .body(Body::empty())
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn missing_identity_header_is_unauthorized() {
    let app = test_router().await;

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/wallet").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // A blank id is as good as no id.
    let response = app.oneshot(get("/wallet", "   ")).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn wallet_bootstraps_on_first_read() {
    let app = test_router().await;

    let response = app.oneshot(get("/wallet", "alice")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["user_id"], "alice");
    assert_eq!(body["balance_minor"], 0);
    assert_eq!(body["currency"], "NGN");
    assert_eq!(body["active"], true);
}

#[tokio::test]
async fn deposit_round_trip() {
    let app = test_router().await;

    let response = app
        .clone()
        .oneshot(post(
            "/wallet/deposits",
            "alice",
            json!({ "amount_minor": 1_000, "reference": "psp-41" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = json_body(response).await;
    assert!(body["id"].as_str().is_some());

    let response = app.clone().oneshot(get("/wallet", "alice")).await.unwrap();
    assert_eq!(json_body(response).await["balance_minor"], 1_000);

    let response = app
        .oneshot(get("/wallet/transactions", "alice"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["transactions"].as_array().unwrap().len(), 1);
    assert_eq!(body["transactions"][0]["kind"], "deposit");
    assert_eq!(body["transactions"][0]["amount_minor"], 1_000);
    assert_eq!(body["transactions"][0]["reference"], "psp-41");
    assert_eq!(body["next_cursor"], Value::Null);
}

#[tokio::test]
async fn zero_deposit_is_unprocessable() {
    let app = test_router().await;

    let response = app
        .oneshot(post("/wallet/deposits", "alice", json!({ "amount_minor": 0 })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body = json_body(response).await;
    assert!(body["error"].as_str().is_some());
}

#[tokio::test]
async fn transaction_listing_filters_by_kind() {
    let app = test_router().await;

    let response = app
        .clone()
        .oneshot(post(
            "/wallet/deposits",
            "alice",
            json!({ "amount_minor": 1_000 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let response = app
        .clone()
        .oneshot(post(
            "/wallet/withdrawals",
            "alice",
            json!({ "amount_minor": 200, "destination": "GTBank ****1234" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .clone()
        .oneshot(get("/wallet/transactions?kinds=deposit", "alice"))
        .await
        .unwrap();
    let body = json_body(response).await;
    let entries = body["transactions"].as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["kind"], "deposit");

    let response = app
        .clone()
        .oneshot(get("/wallet/transactions?status=pending", "alice"))
        .await
        .unwrap();
    let body = json_body(response).await;
    let entries = body["transactions"].as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["kind"], "withdrawal");

    let response = app
        .oneshot(get("/wallet/transactions?kinds=takeout", "alice"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn withdrawal_round_trip() {
    let app = test_router().await;

    let response = app
        .clone()
        .oneshot(post(
            "/wallet/deposits",
            "alice",
            json!({ "amount_minor": 1_000 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .clone()
        .oneshot(post(
            "/wallet/withdrawals",
            "alice",
            json!({ "amount_minor": 400, "destination": "GTBank ****1234" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let tx_id = json_body(response).await["id"].as_str().unwrap().to_string();

    // Reservation already reduced the spendable balance.
    let response = app.clone().oneshot(get("/wallet", "alice")).await.unwrap();
    assert_eq!(json_body(response).await["balance_minor"], 600);

    let response = app
        .clone()
        .oneshot(post_empty(
            &format!("/wallet/withdrawals/{tx_id}/approve"),
            "alice",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["status"], "completed");

    let response = app
        .clone()
        .oneshot(post_empty(
            &format!("/wallet/withdrawals/{tx_id}/approve"),
            "alice",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = app
        .oneshot(post_empty(
            &format!("/wallet/withdrawals/{}/reject", uuid::Uuid::new_v4()),
            "alice",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn goal_round_trip() {
    let app = test_router().await;

    let response = app
        .clone()
        .oneshot(post(
            "/wallet/deposits",
            "alice",
            json!({ "amount_minor": 1_000 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .clone()
        .oneshot(post(
            "/goals",
            "alice",
            json!({ "name": "Rent", "target_minor": 600 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let goal = json_body(response).await;
    let goal_id = goal["id"].as_str().unwrap().to_string();
    assert_eq!(goal["status"], "active");
    assert_eq!(goal["schedule"], Value::Null);

    let response = app.clone().oneshot(get("/goals", "alice")).await.unwrap();
    assert_eq!(json_body(response).await["goals"].as_array().unwrap().len(), 1);

    let response = app
        .clone()
        .oneshot(post(
            &format!("/goals/{goal_id}/contributions"),
            "alice",
            json!({ "amount_minor": 600 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let receipt = json_body(response).await;
    assert_eq!(receipt["completed"], true);
    assert_eq!(receipt["release"]["outcome"], "released");
    assert_eq!(receipt["release"]["amount_minor"], 600);
    // Own-goal release: the 600 debit came straight back.
    assert_eq!(receipt["wallet"]["balance_minor"], 1_000);

    let response = app
        .clone()
        .oneshot(get(&format!("/goals/{goal_id}"), "alice"))
        .await
        .unwrap();
    let body = json_body(response).await;
    assert_eq!(body["status"], "completed");
    assert_eq!(body["funds_released"], true);

    let response = app
        .oneshot(post_empty(&format!("/goals/{goal_id}/release"), "alice"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["outcome"], "already_released");
}

#[tokio::test]
async fn goal_schedule_survives_the_wire() {
    let app = test_router().await;

    let response = app
        .clone()
        .oneshot(post(
            "/goals",
            "alice",
            json!({
                "name": "School fees",
                "target_minor": 90_000,
                "schedule": { "frequency": "weekly", "amount_minor": 5_000 }
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = json_body(response).await;
    assert_eq!(body["schedule"]["frequency"], "weekly");
    assert_eq!(body["schedule"]["amount_minor"], 5_000);

    // A custom schedule without dates never gets created.
    let response = app
        .oneshot(post(
            "/goals",
            "alice",
            json!({
                "name": "Dues",
                "target_minor": 1_000,
                "schedule": { "frequency": "custom" }
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn unknown_goal_is_not_found() {
    let app = test_router().await;

    let response = app
        .oneshot(get(&format!("/goals/{}", uuid::Uuid::new_v4()), "alice"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = json_body(response).await;
    assert!(body["error"].as_str().unwrap().contains("not found"));
}

#[tokio::test]
async fn group_round_trip() {
    let app = test_router().await;

    let response = app
        .clone()
        .oneshot(post(
            "/groups",
            "carol",
            json!({ "name": "Holiday pot", "target_minor": 5_000, "member_ids": ["dana"] }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let group = json_body(response).await;
    let group_id = group["id"].as_str().unwrap().to_string();
    assert_eq!(group["created_by"], "carol");

    // Erin self-joins; the response is the roster after the join.
    let response = app
        .clone()
        .oneshot(post_empty(&format!("/groups/{group_id}/members"), "erin"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    let members = body["members"].as_array().unwrap();
    assert_eq!(members.len(), 3);
    let owner = members.iter().find(|m| m["role"] == "owner").unwrap();
    assert_eq!(owner["user_id"], "carol");
    assert!(members.iter().any(|m| m["user_id"] == "erin" && m["role"] == "member"));

    // Contributions require a funded wallet and a membership.
    let response = app
        .clone()
        .oneshot(post(
            "/wallet/deposits",
            "dana",
            json!({ "amount_minor": 1_000 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .clone()
        .oneshot(post(
            &format!("/groups/{group_id}/contributions"),
            "dana",
            json!({ "amount_minor": 250 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let receipt = json_body(response).await;
    assert_eq!(receipt["completed"], false);
    assert_eq!(receipt["release"], Value::Null);
    assert_eq!(receipt["target"]["current_minor"], 250);

    let response = app
        .clone()
        .oneshot(post(
            &format!("/groups/{group_id}/contributions"),
            "frank",
            json!({ "amount_minor": 100 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .clone()
        .oneshot(get(&format!("/groups/{group_id}"), "carol"))
        .await
        .unwrap();
    assert_eq!(json_body(response).await["current_minor"], 250);

    let response = app
        .oneshot(post_empty(&format!("/groups/{group_id}/release"), "carol"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["outcome"], "not_ready");
}

#[tokio::test]
async fn reconciliation_round_trip() {
    let app = test_router().await;

    let response = app
        .clone()
        .oneshot(post_empty("/reconciliation/run", "ops"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let report = json_body(response).await;
    assert_eq!(report["goals"]["examined"], 0);
    assert_eq!(report["groups"]["examined"], 0);
    assert_eq!(report["released_total_minor"], 0);

    let response = app
        .oneshot(get("/reconciliation/status", "ops"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let status = json_body(response).await;
    assert_eq!(status["running"], false);
    assert_eq!(status["runs"], 1);
    assert!(status["last_report"].is_object());
}
