// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Multipart upload endpoints.

mod common;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use common::{body_json, create_test_app};
use rust_xlsxwriter::Workbook;
use serde_json::json;
use tower::ServiceExt;

const BOUNDARY: &str = "----bankrecontestboundary";

enum Part<'a> {
    Text(&'a str, &'a str),
    File(&'a str, &'a str, &'a [u8]),
}

fn multipart(uri: &str, parts: &[Part<'_>]) -> Request<Body> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n")
                        .as_bytes(),
                );
            }
            Part::File(name, file_name, bytes) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\n\
                         Content-Type: application/octet-stream\r\n\r\n"
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(bytes);
                body.extend_from_slice(b"\r\n");
            }
        }
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

const FINANCE_HEADERS: [&str; 23] = [
    "Routing No",
    "Receiving A/C No",
    "Credit Amount",
    "Receiver Name",
    "Bank Name",
    "Branch Name",
    "Sender Name",
    "Sender Account",
    "Sender Bank",
    "Unit Name",
    "Team Name",
    "New Project",
    "Project",
    "Sub Project",
    "PO",
    "Status",
    "Voucher Date",
    "Voucher No",
    "Payment Date",
    "Payment Month",
    "Remarks",
    "Mark",
    "Concern",
];

/// A two-payment paid list on sheet `Paid`, one payment per month.
fn paid_list_workbook() -> Vec<u8> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name("Paid").unwrap();
    sheet.write_string(0, 0, "Finance paid list").unwrap();
    for (col, h) in FINANCE_HEADERS.iter().enumerate() {
        sheet.write_string(1, col as u16, *h).unwrap();
    }

    let payments = [
        (1500.0, "M/S. Acme Trading", "PV-0012", "2025-02-02", "Feb-25"),
        (320.5, "Beta Supplies", "PV-0013", "2025-03-04", "Mar-25"),
    ];
    for (i, (amount, receiver, voucher, paid_on, month)) in payments.iter().enumerate() {
        let row = 2 + i as u32;
        sheet.write_number(row, 2, *amount).unwrap();
        sheet.write_string(row, 3, *receiver).unwrap();
        sheet.write_string(row, 7, "0011-1050011026").unwrap();
        sheet.write_string(row, 8, "MDB").unwrap();
        sheet.write_string(row, 17, *voucher).unwrap();
        sheet.write_string(row, 18, *paid_on).unwrap();
        sheet.write_string(row, 19, *month).unwrap();
    }

    workbook.save_to_buffer().unwrap()
}

#[tokio::test]
async fn test_bank_upload_validation() {
    let (app, _) = create_test_app().await;

    let response = app
        .clone()
        .oneshot(multipart("/parse_bank", &[Part::Text("bank_name", "MDB")]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["msg"], "File not provided.");

    let response = app
        .clone()
        .oneshot(multipart(
            "/parse_bank",
            &[Part::File("bank_file", "stmt.xlsx", b"not really a workbook")],
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["msg"], "Bank name not selected.");

    let response = app
        .clone()
        .oneshot(multipart(
            "/parse_bank",
            &[
                Part::Text("bank_name", "EBL"),
                Part::File("bank_file", "stmt.xlsx", b"PK"),
            ],
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert!(json["msg"].as_str().unwrap().contains("not implemented yet"));

    let response = app
        .clone()
        .oneshot(multipart(
            "/parse_bank",
            &[
                Part::Text("bank_name", "MTB"),
                Part::File("bank_file", "stmt.xlsx", b"PK"),
            ],
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(
        json["msg"],
        "Unsupported file type for MTB. Allowed types: .xls"
    );

    // Right extension, unreadable content.
    let response = app
        .oneshot(multipart(
            "/parse_bank",
            &[
                Part::Text("bank_name", "MDB"),
                Part::File("bank_file", "stmt.xlsx", b"not really a workbook"),
            ],
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let json = body_json(response).await;
    assert!(json["msg"]
        .as_str()
        .unwrap()
        .starts_with("❌ Error during parsing"));
}

#[tokio::test]
async fn test_finance_upload_requires_sheet() {
    let (app, _) = create_test_app().await;

    let response = app
        .oneshot(multipart(
            "/parse_finance",
            &[Part::File("finance_file", "paid.xlsx", &paid_list_workbook())],
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["msg"], "File or sheet not provided.");
}

#[tokio::test]
async fn test_finance_upload_stores_rows() {
    let (app, _) = create_test_app().await;
    let workbook = paid_list_workbook();

    let response = app
        .clone()
        .oneshot(multipart(
            "/parse_finance",
            &[
                Part::Text("sheet_name", "Paid"),
                Part::Text("payment_month", "Feb-25"),
                Part::File("finance_file", "Paid List Feb.xlsx", &workbook),
            ],
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["uploaded_filename"], "Paid_List_Feb.xlsx");
    assert_eq!(
        json["msg"],
        "✅ Successfully uploaded and parsed data from sheet: Paid"
    );

    let response = app
        .clone()
        .oneshot(common::post_json("/data_table/finance_data", json!({})))
        .await
        .unwrap();
    let json = body_json(response).await;
    let rows = json["data"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["F_Voucher_No"], "PV-0012");
    assert_eq!(rows[0]["acct_no"], "00111050011026");
    assert_eq!(rows[0]["fin_ven"], "ACMETRADING");
    assert_eq!(rows[0]["statement_month"], "February");
    assert_eq!(rows[0]["statement_year"], "2025");

    let response = app
        .oneshot(multipart(
            "/parse_finance",
            &[
                Part::Text("sheet_name", "Missing"),
                Part::File("finance_file", "paid.xlsx", &workbook),
            ],
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}
