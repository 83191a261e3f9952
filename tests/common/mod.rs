// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::body::Body;
use axum::http::{header, Request, Response};
use bank_recon::config::Config;
use bank_recon::db::Db;
use bank_recon::models::{BankEntry, FinanceEntry, TallyEntry};
use bank_recon::routes::create_router;
use bank_recon::services::ReconcileLocks;
use bank_recon::AppState;
use chrono::NaiveDate;
use http_body_util::BodyExt;
use std::sync::Arc;

#[allow(dead_code)]
pub const BANK: &str = "MDB";
#[allow(dead_code)]
pub const ACCOUNT: &str = "00111050011026";
#[allow(dead_code)]
pub const MONTH: &str = "February";
#[allow(dead_code)]
pub const YEAR: &str = "2025";

/// Create a test app over a fresh in-memory database.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub async fn create_test_app() -> (axum::Router, Arc<AppState>) {
    let config = Config::test_default();
    let db = Db::in_memory()
        .await
        .expect("Failed to open in-memory database");

    let state = Arc::new(AppState {
        config,
        db,
        reconcile_locks: ReconcileLocks::default(),
    });

    (create_router(state.clone()), state)
}

#[allow(dead_code)]
pub fn date(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(y, m, d)
}

/// A February 2025 MDB withdrawal.
#[allow(dead_code)]
pub fn bank_entry(uid: &str, vendor: &str, amount: f64, on: Option<NaiveDate>) -> BankEntry {
    BankEntry {
        bank_uid: uid.to_string(),
        bank_code: BANK.to_string(),
        acct_no: ACCOUNT.to_string(),
        statement_month: Some(MONTH.to_string()),
        statement_year: Some(YEAR.to_string()),
        date: on,
        particulars: Some(format!("BEFTN Outward/{vendor}")),
        withdrawal: Some(amount),
        bank_ven: Some(vendor.to_string()),
        ..Default::default()
    }
}

/// A finance payment sent from the MDB account.
#[allow(dead_code)]
pub fn finance_entry(
    uid: &str,
    vendor: &str,
    voucher: &str,
    amount: f64,
    on: Option<NaiveDate>,
) -> FinanceEntry {
    FinanceEntry {
        fin_uid: uid.to_string(),
        credit_amount: Some(amount),
        receiver_name: Some(vendor.to_string()),
        sender_account: Some("0011-1050011026".to_string()),
        sender_bank: Some(BANK.to_string()),
        voucher_no: Some(voucher.to_string()),
        payment_date: on,
        fin_ven: Some(vendor.to_string()),
        bank_code: Some(BANK.to_string()),
        acct_no: Some(ACCOUNT.to_string()),
        statement_month: Some(MONTH.to_string()),
        statement_year: Some(YEAR.to_string()),
        ..Default::default()
    }
}

/// A Tally voucher line on the MDB ledger.
#[allow(dead_code)]
pub fn tally_entry(uid: &str, particulars: &str, vch_no: &str, debit: f64, credit: f64) -> TallyEntry {
    TallyEntry {
        tally_uid: uid.to_string(),
        bank_code: BANK.to_string(),
        acct_no: ACCOUNT.to_string(),
        statement_month: Some(MONTH.to_string()),
        statement_year: Some(YEAR.to_string()),
        date: date(2025, 2, 2),
        dr_cr: Some("By".to_string()),
        particulars: Some(particulars.to_string()),
        vch_type: Some("Payment".to_string()),
        vch_no: Some(vch_no.to_string()),
        debit: (debit != 0.0).then_some(debit),
        credit: (credit != 0.0).then_some(credit),
        ..Default::default()
    }
}

#[allow(dead_code)]
pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

#[allow(dead_code)]
pub fn post_form(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[allow(dead_code)]
pub fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// A POST with an arbitrary body, for requests a browser form would not send.
#[allow(dead_code)]
pub fn post_raw(uri: &str, content_type: Option<&str>, body: &str) -> Request<Body> {
    let mut builder = Request::builder().method("POST").uri(uri);
    if let Some(content_type) = content_type {
        builder = builder.header(header::CONTENT_TYPE, content_type);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

/// The report filter for the seeded account and period.
#[allow(dead_code)]
pub fn report_filter() -> serde_json::Value {
    serde_json::json!({
        "bank_code": BANK,
        "acct_no": ACCOUNT,
        "statement_month": MONTH,
        "statement_year": YEAR,
    })
}

#[allow(dead_code)]
pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

#[allow(dead_code)]
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}
