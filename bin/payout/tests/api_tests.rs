mod common;

use common::fixtures::{admin_user, test_beneficiary, test_user};
use common::{build_state, create_test_server, pending, success, token_for, ScriptedGateway};
use http::StatusCode;
use payout_primitives::models::entities::{PayoutRail, VerificationStatus};
use serde_json::{json, Value};

fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}

#[tokio::test]
async fn health_and_openapi_are_public() {
    let ctx = build_state(
        ScriptedGateway::new(PayoutRail::Imps),
        ScriptedGateway::new(PayoutRail::Upi),
    )
    .await;
    let server = create_test_server(ctx.state.clone());

    let health = server.get("/api/health").await;
    health.assert_status(StatusCode::OK);
    let body: Value = health.json();
    assert_eq!(body["database"], "up");

    let doc = server.get("/api-docs/openapi.json").await;
    doc.assert_status(StatusCode::OK);
    let doc: Value = doc.json();
    assert!(doc["paths"]["/api/payouts"].is_object());
    assert!(doc["components"]["securitySchemes"]["bearerAuth"].is_object());
}

#[tokio::test]
async fn payout_requires_a_valid_token() {
    let ctx = build_state(
        ScriptedGateway::new(PayoutRail::Imps),
        ScriptedGateway::new(PayoutRail::Upi),
    )
    .await;
    let server = create_test_server(ctx.state.clone());

    let missing = server.post("/api/payouts").json(&json!({})).await;
    missing.assert_status(StatusCode::UNAUTHORIZED);

    let garbage = server
        .post("/api/payouts")
        .add_header("Authorization", "Bearer not-a-jwt")
        .json(&json!({}))
        .await;
    garbage.assert_status(StatusCode::UNAUTHORIZED);
    let body: Value = garbage.json();
    assert_eq!(body["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn payout_round_trip_over_http() {
    let ctx = build_state(
        ScriptedGateway::new(PayoutRail::Imps).submitting(success("GW123")),
        ScriptedGateway::new(PayoutRail::Upi),
    )
    .await;
    let user = test_user(1_500_000);
    let beneficiary = test_beneficiary(user.id, true);
    ctx.store.insert_user(user.clone()).await;
    ctx.store.insert_beneficiary(beneficiary.clone()).await;

    let server = create_test_server(ctx.state.clone());
    let token = token_for(&ctx.state, user.id, VerificationStatus::Verified);

    let payload = json!({
        "beneficiary_id": beneficiary.id,
        "amount": "10000.00",
        "rail": "IMPS",
        "transaction_id": "HTTP-PAYOUT-01"
    });

    let first = server
        .post("/api/payouts")
        .add_header("Authorization", bearer(&token))
        .json(&payload)
        .await;
    first.assert_status(StatusCode::OK);
    let first: Value = first.json();
    assert_eq!(first["status"], "COMPLETED");
    assert_eq!(first["reference_no"], "GW123");
    assert_eq!(first["charge_amount"], "23.60");
    assert_eq!(first["duplicate"], false);

    let replay = server
        .post("/api/payouts")
        .add_header("Authorization", bearer(&token))
        .json(&payload)
        .await;
    replay.assert_status(StatusCode::OK);
    let replay: Value = replay.json();
    assert_eq!(replay["duplicate"], true);
    assert_eq!(ctx.imps.submit_count(), 1);

    let status = server
        .get("/api/payouts/HTTP-PAYOUT-01")
        .add_header("Authorization", bearer(&token))
        .await;
    status.assert_status(StatusCode::OK);
    let status: Value = status.json();
    assert_eq!(status["status"], "COMPLETED");

    let list = server
        .get("/api/transactions?limit=5")
        .add_header("Authorization", bearer(&token))
        .await;
    list.assert_status(StatusCode::OK);
    let list: Value = list.json();
    assert_eq!(list["transactions"].as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn error_codes_map_to_statuses() {
    let ctx = build_state(
        ScriptedGateway::new(PayoutRail::Imps),
        ScriptedGateway::new(PayoutRail::Upi),
    )
    .await;
    let user = test_user(100);
    let beneficiary = test_beneficiary(user.id, true);
    ctx.store.insert_user(user.clone()).await;
    ctx.store.insert_beneficiary(beneficiary.clone()).await;

    let server = create_test_server(ctx.state.clone());
    let token = token_for(&ctx.state, user.id, VerificationStatus::Verified);

    let short = server
        .post("/api/payouts")
        .add_header("Authorization", bearer(&token))
        .json(&json!({
            "beneficiary_id": beneficiary.id,
            "amount": "100.00",
            "rail": "IMPS",
            "transaction_id": "HTTP-SHORT-001"
        }))
        .await;
    short.assert_status(StatusCode::PAYMENT_REQUIRED);
    let body: Value = short.json();
    assert_eq!(body["code"], "INSUFFICIENT_BALANCE");

    let out_of_range = server
        .post("/api/payouts")
        .add_header("Authorization", bearer(&token))
        .json(&json!({
            "beneficiary_id": beneficiary.id,
            "amount": "20000.00",
            "rail": "IMPS",
            "transaction_id": "HTTP-RANGE-001"
        }))
        .await;
    out_of_range.assert_status(StatusCode::UNPROCESSABLE_ENTITY);

    let missing = server
        .get("/api/payouts/NO-SUCH-KEY-1")
        .add_header("Authorization", bearer(&token))
        .await;
    missing.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn payout_status_is_scoped_to_the_owner() {
    let ctx = build_state(
        ScriptedGateway::new(PayoutRail::Imps).submitting(pending("GW-PEND")),
        ScriptedGateway::new(PayoutRail::Upi),
    )
    .await;
    let owner = test_user(1_500_000);
    let stranger = test_user(0);
    let admin = admin_user();
    let beneficiary = test_beneficiary(owner.id, true);
    for u in [owner.clone(), stranger.clone(), admin.clone()] {
        ctx.store.insert_user(u).await;
    }
    ctx.store.insert_beneficiary(beneficiary.clone()).await;

    let server = create_test_server(ctx.state.clone());
    let owner_token = token_for(&ctx.state, owner.id, VerificationStatus::Verified);

    server
        .post("/api/payouts")
        .add_header("Authorization", bearer(&owner_token))
        .json(&json!({
            "beneficiary_id": beneficiary.id,
            "amount": "10.00",
            "rail": "IMPS",
            "transaction_id": "HTTP-SCOPED-01"
        }))
        .await
        .assert_status(StatusCode::OK);

    let stranger_token = token_for(&ctx.state, stranger.id, VerificationStatus::Verified);
    server
        .get("/api/payouts/HTTP-SCOPED-01")
        .add_header("Authorization", bearer(&stranger_token))
        .await
        .assert_status(StatusCode::NOT_FOUND);

    let admin_token = token_for(&ctx.state, admin.id, VerificationStatus::Admin);
    server
        .get("/api/payouts/HTTP-SCOPED-01")
        .add_header("Authorization", bearer(&admin_token))
        .await
        .assert_status(StatusCode::OK);
}

#[tokio::test]
async fn admin_routes_reject_regular_users() {
    let ctx = build_state(
        ScriptedGateway::new(PayoutRail::Imps),
        ScriptedGateway::new(PayoutRail::Upi),
    )
    .await;
    let user = test_user(10_000);
    let admin = admin_user();
    ctx.store.insert_user(user.clone()).await;
    ctx.store.insert_user(admin.clone()).await;

    let server = create_test_server(ctx.state.clone());
    let user_token = token_for(&ctx.state, user.id, VerificationStatus::Verified);
    let admin_token = token_for(&ctx.state, admin.id, VerificationStatus::Admin);

    let adjustment = json!({
        "kind": "ADDITION",
        "amount": "100.00",
        "reason": "Manual credit"
    });
    let path = format!("/api/admin/users/{}/adjustments", user.id);

    let denied = server
        .post(&path)
        .add_header("Authorization", bearer(&user_token))
        .json(&adjustment)
        .await;
    denied.assert_status(StatusCode::FORBIDDEN);

    let allowed = server
        .post(&path)
        .add_header("Authorization", bearer(&admin_token))
        .json(&adjustment)
        .await;
    allowed.assert_status(StatusCode::OK);
    let body: Value = allowed.json();
    assert_eq!(body["balance_after"], "200.00");

    let run = server
        .post("/api/admin/reconciliation/run")
        .add_header("Authorization", bearer(&admin_token))
        .await;
    run.assert_status(StatusCode::OK);
    let summary: Value = run.json();
    assert_eq!(summary["processed"], 0);
    assert_eq!(summary["skipped"], false);
}

#[tokio::test]
async fn balance_request_flow_over_http() {
    let ctx = build_state(
        ScriptedGateway::new(PayoutRail::Imps),
        ScriptedGateway::new(PayoutRail::Upi),
    )
    .await;
    let user = test_user(0);
    let admin = admin_user();
    ctx.store.insert_user(user.clone()).await;
    ctx.store.insert_user(admin.clone()).await;

    let server = create_test_server(ctx.state.clone());
    let user_token = token_for(&ctx.state, user.id, VerificationStatus::Verified);
    let admin_token = token_for(&ctx.state, admin.id, VerificationStatus::Admin);

    let created = server
        .post("/api/balance_requests")
        .add_header("Authorization", bearer(&user_token))
        .json(&json!({ "amount": "750.00", "utr": "UTR1234567890" }))
        .await;
    created.assert_status(StatusCode::CREATED);
    let created: Value = created.json();
    let request_id = created["id"].as_str().unwrap().to_string();

    let confirmed = server
        .post(&format!("/api/admin/balance_requests/{}/confirm", request_id))
        .add_header("Authorization", bearer(&admin_token))
        .json(&json!({ "remarks": "statement matched" }))
        .await;
    confirmed.assert_status(StatusCode::OK);
    let confirmed: Value = confirmed.json();
    assert_eq!(confirmed["status"], "CONFIRMED");

    assert_eq!(ctx.store.user(user.id).await.unwrap().balance, 75_000);
}
