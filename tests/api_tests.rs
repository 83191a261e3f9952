// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Health, help, parser descriptors and lookup endpoints.

mod common;

use axum::http::StatusCode;
use common::{
    bank_entry, body_json, create_test_app, date, get, post_form, tally_entry, ACCOUNT, BANK,
};
use tower::ServiceExt;

#[tokio::test]
async fn test_health_check() {
    let (app, _) = create_test_app().await;

    let response = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("X-Content-Type-Options").unwrap(),
        "nosniff"
    );

    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn test_help_known_and_unknown_keys() {
    let (app, _) = create_test_app().await;

    let response = app.clone().oneshot(get("/help/tally")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert!(!json["help_text"].as_str().unwrap().is_empty());
    assert_ne!(
        json["help_text"],
        "No help text available for this parser."
    );

    let response = app.oneshot(get("/help/nosuchparser")).await.unwrap();
    let json = body_json(response).await;
    assert_eq!(json["help_text"], "No help text available for this parser.");
}

#[tokio::test]
async fn test_parsers_are_listed() {
    let (app, _) = create_test_app().await;

    let response = app.oneshot(get("/parsers")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    let ids: Vec<&str> = json["parsers"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, ["finance", "bank", "tally"]);
    assert_eq!(json["parsers"][1]["file_field"], "bank_file");
}

#[tokio::test]
async fn test_lookups_on_empty_database() {
    let (app, _) = create_test_app().await;

    let response = app.oneshot(get("/get_bank_codes")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["bank_codes"], serde_json::json!([]));
}

#[tokio::test]
async fn test_lookups_return_distinct_sorted_values() {
    let (app, state) = create_test_app().await;

    let mut other = bank_entry("B2", "BETA", 20.0, date(2025, 3, 1));
    other.statement_month = Some("March".to_string());
    state
        .db
        .insert_bank_entries(&[
            bank_entry("B1", "ACME", 10.0, date(2025, 2, 1)),
            other,
            bank_entry("B3", "GAMMA", 30.0, date(2025, 2, 3)),
        ])
        .await
        .unwrap();
    state
        .db
        .insert_tally_entries(&[tally_entry("T1", "cq-123456", "1", 0.0, 10.0)])
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(get("/get_statement_months"))
        .await
        .unwrap();
    let json = body_json(response).await;
    assert_eq!(json["months"], serde_json::json!(["February", "March"]));

    let response = app
        .clone()
        .oneshot(get(&format!("/get_acct_nos?bank_code={BANK}")))
        .await
        .unwrap();
    let json = body_json(response).await;
    assert_eq!(json["acct_nos"], serde_json::json!([ACCOUNT]));

    let response = app
        .clone()
        .oneshot(get("/get_tally_bank_codes"))
        .await
        .unwrap();
    let json = body_json(response).await;
    assert_eq!(json["bank_codes"], serde_json::json!([BANK]));

    let response = app
        .oneshot(post_form("/get_accounts", "bank_code=PBL"))
        .await
        .unwrap();
    let json = body_json(response).await;
    assert_eq!(json["accounts"], serde_json::json!([]));
}

#[tokio::test]
async fn test_lookup_requiring_bank_code() {
    let (app, _) = create_test_app().await;

    let response = app.clone().oneshot(get("/get_acct_nos")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["msg"], "Missing bank_code");

    let response = app
        .oneshot(post_form("/get_bft_accounts", ""))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["msg"], "bank_code is required.");
}
