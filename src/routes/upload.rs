// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Statement and ledger upload routes.
//!
//! Uploads are parsed in memory and stored in one transaction per file.

use crate::error::{AppError, Result};
use crate::parsers::{self, finance, tally, StatementBank};
use crate::AppState;
use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

pub fn routes(max_upload_bytes: usize) -> Router<Arc<AppState>> {
    Router::new()
        .route("/parse_bank", post(parse_bank))
        .route("/parse_finance", post(parse_finance))
        .route("/parse_tally", post(parse_tally))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .route("/parsers", get(list_parsers))
}

// ─── Parser descriptors ──────────────────────────────────────

/// One upload form offered by the client.
#[derive(Debug, Serialize, PartialEq, Eq)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ParserDescriptor {
    pub id: &'static str,
    pub title: &'static str,
    pub file_field: &'static str,
    pub route: &'static str,
}

pub static PARSERS: [ParserDescriptor; 3] = [
    ParserDescriptor {
        id: "finance",
        title: "Finance Paid List Parser",
        file_field: "finance_file",
        route: "/parse_finance",
    },
    ParserDescriptor {
        id: "bank",
        title: "Bank Statement Parser",
        file_field: "bank_file",
        route: "/parse_bank",
    },
    ParserDescriptor {
        id: "tally",
        title: "Tally Parser",
        file_field: "tally_file",
        route: "/parse_tally",
    },
];

#[derive(Serialize)]
struct ParsersResponse {
    success: bool,
    parsers: &'static [ParserDescriptor],
}

async fn list_parsers() -> Json<ParsersResponse> {
    Json(ParsersResponse {
        success: true,
        parsers: &PARSERS,
    })
}

// ─── Upload handling ─────────────────────────────────────────

/// Upload result.
#[derive(Debug, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct UploadResponse {
    pub success: bool,
    pub msg: String,
    pub uploaded_filename: String,
}

/// The multipart fields of an upload form.
#[derive(Default)]
struct UploadForm {
    file: Option<(String, Vec<u8>)>,
    bank_name: Option<String>,
    sheet_name: Option<String>,
    payment_month: Option<String>,
}

impl UploadForm {
    async fn read(mut multipart: Multipart, file_field: &str) -> Result<Self> {
        let mut form = UploadForm::default();
        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();
            if name == file_field {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await?;
                if !bytes.is_empty() {
                    form.file = Some((file_name, bytes.to_vec()));
                }
                continue;
            }
            let value = field.text().await?;
            let value = Some(value.trim().to_string()).filter(|v| !v.is_empty());
            match name.as_str() {
                "bank_name" => form.bank_name = value,
                "sheet_name" => form.sheet_name = value,
                "payment_month" => form.payment_month = value,
                _ => {}
            }
        }
        Ok(form)
    }
}

/// Reduce an uploaded file name to a safe ASCII base name.
pub fn sanitize_filename(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = base
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect();
    cleaned.trim_start_matches(['.', '_']).to_string()
}

/// Lowercased extension including the dot, e.g. `.xlsx`.
fn extension(file_name: &str) -> String {
    std::path::Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e.to_lowercase()))
        .unwrap_or_default()
}

/// Parse the uploaded bytes off the async runtime.
async fn parse_blocking<T, F>(bytes: Vec<u8>, sheet: Option<String>, parse: F) -> Result<Vec<T>>
where
    T: Send + 'static,
    F: FnOnce(&parsers::Grid) -> std::result::Result<Vec<T>, parsers::ParseError> + Send + 'static,
{
    let records = tokio::task::spawn_blocking(move || {
        let grid = parsers::read_sheet(bytes, sheet.as_deref())?;
        parse(&grid)
    })
    .await
    .map_err(|e| AppError::Internal(e.into()))??;
    Ok(records)
}

/// Upload a bank statement (`bank_file`, `bank_name`, optional `sheet_name`).
async fn parse_bank(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<UploadResponse>> {
    let form = UploadForm::read(multipart, "bank_file").await?;
    let (file_name, bytes) = form
        .file
        .ok_or_else(|| AppError::BadRequest("File not provided.".to_string()))?;
    let bank_name = form
        .bank_name
        .ok_or_else(|| AppError::BadRequest("Bank name not selected.".to_string()))?;

    let bank = StatementBank::from_code(&bank_name).map_err(AppError::BadRequest)?;
    let file_name = sanitize_filename(&file_name);
    if extension(&file_name) != bank.extension() {
        return Err(AppError::BadRequest(format!(
            "Unsupported file type for {bank_name}. Allowed types: {}",
            bank.extension()
        )));
    }

    let sheet = form
        .sheet_name
        .or_else(|| bank.default_sheet().map(str::to_string));
    let entries = parse_blocking(bytes, sheet, move |grid| bank.parse(grid)).await?;
    let inserted = state.db.insert_bank_entries(&entries).await?;

    tracing::info!(
        bank_code = bank.code(),
        file = %file_name,
        inserted,
        "Bank statement uploaded"
    );

    Ok(Json(UploadResponse {
        success: true,
        msg: format!("✅ Successfully uploaded and parsed data for {bank_name}"),
        uploaded_filename: file_name,
    }))
}

/// Upload a finance paid list (`finance_file`, `sheet_name`, optional `payment_month`).
async fn parse_finance(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<UploadResponse>> {
    let form = UploadForm::read(multipart, "finance_file").await?;
    let ((file_name, bytes), sheet) = form
        .file
        .zip(form.sheet_name)
        .ok_or_else(|| AppError::BadRequest("File or sheet not provided.".to_string()))?;
    let file_name = sanitize_filename(&file_name);

    let payment_month = form.payment_month;
    let entries = parse_blocking(bytes, Some(sheet.clone()), move |grid| {
        finance::parse(grid, payment_month.as_deref())
    })
    .await?;
    let inserted = state.db.insert_finance_entries(&entries).await?;

    tracing::info!(file = %file_name, sheet = %sheet, inserted, "Finance paid list uploaded");

    Ok(Json(UploadResponse {
        success: true,
        msg: format!("✅ Successfully uploaded and parsed data from sheet: {sheet}"),
        uploaded_filename: file_name,
    }))
}

/// Upload a Tally ledger export (`tally_file`, `sheet_name`).
async fn parse_tally(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<UploadResponse>> {
    let form = UploadForm::read(multipart, "tally_file").await?;
    let ((file_name, bytes), sheet) = form
        .file
        .zip(form.sheet_name)
        .ok_or_else(|| AppError::BadRequest("File or sheet not provided.".to_string()))?;
    let file_name = sanitize_filename(&file_name);

    let entries = parse_blocking(bytes, Some(sheet.clone()), tally::parse).await?;
    let inserted = state.db.insert_tally_entries(&entries).await?;

    tracing::info!(file = %file_name, sheet = %sheet, inserted, "Tally ledger uploaded");

    Ok(Json(UploadResponse {
        success: true,
        msg: format!("✅ Successfully uploaded and parsed data from sheet: {sheet}"),
        uploaded_filename: file_name,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("MDB Feb 2025.xlsx"), "MDB_Feb_2025.xlsx");
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename(r"C:\Users\me\stmt (1).xls"), "stmt_1.xls");
        assert_eq!(sanitize_filename(".hidden.xlsx"), "hidden.xlsx");
    }

    #[test]
    fn test_extension() {
        assert_eq!(extension("a.XLSX"), ".xlsx");
        assert_eq!(extension("a.xls"), ".xls");
        assert_eq!(extension("noext"), "");
    }
}
