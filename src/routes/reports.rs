// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Report and data-table routes.

use crate::db::DataTable;
use crate::error::{AppError, Result};
use super::extract::JsonBody;
use crate::models::{DataTableFilter, ReportFilter};
use crate::services::export::{rows_to_xlsx, XLSX_CONTENT_TYPE};
use crate::services::ReportKind;
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::Arc;

const EXCEL_SUFFIX: &str = "_excel";

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/reports/{report}", post(report))
        .route("/data_table/{table}", post(data_table))
}

/// Tabular reply shared by reports and data tables.
#[derive(Serialize)]
struct TableResponse<R> {
    success: bool,
    columns: &'static [&'static str],
    data: Vec<R>,
}

/// `POST /reports/{kind}` returns JSON rows; `POST /reports/{kind}_excel`
/// returns the same rows as an XLSX attachment.
async fn report(
    State(state): State<Arc<AppState>>,
    Path(report): Path<String>,
    JsonBody(filter): JsonBody<ReportFilter>,
) -> Result<Response> {
    let (name, excel) = match report.strip_suffix(EXCEL_SUFFIX) {
        Some(name) => (name, true),
        None => (report.as_str(), false),
    };
    let kind = ReportKind::from_route(name)
        .ok_or_else(|| AppError::NotFound(format!("Unknown report: {report}")))?;
    let scope = filter.into_scope().ok_or_else(|| {
        AppError::BadRequest("Missing one or more required filters".to_string())
    })?;

    let rows = kind.load(&state.db, &scope).await?;
    tracing::debug!(report = kind.route(), rows = rows.len(), excel, "Report loaded");

    if excel {
        return excel_attachment(kind, &rows);
    }
    Ok(Json(TableResponse {
        success: true,
        columns: kind.columns(),
        data: rows,
    })
    .into_response())
}

fn excel_attachment(kind: ReportKind, rows: &[Map<String, Value>]) -> Result<Response> {
    if rows.is_empty() {
        return Err(AppError::NotFound("No data to export".to_string()));
    }
    let bytes =
        rows_to_xlsx(kind.columns(), rows).map_err(|e| AppError::Internal(e.into()))?;
    let disposition = format!("attachment; filename=\"{}\"", kind.file_name());

    Ok((
        [
            (header::CONTENT_TYPE, XLSX_CONTENT_TYPE.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}

/// `POST /data_table/{table}`: full ledger rows, narrowed by the optional
/// filters. No body means no filters.
async fn data_table(
    State(state): State<Arc<AppState>>,
    Path(table): Path<String>,
    JsonBody(filter): JsonBody<DataTableFilter>,
) -> Result<Json<TableResponse<Value>>> {
    let table = DataTable::from_route(&table)
        .ok_or_else(|| AppError::NotFound(format!("Unknown table: {table}")))?;
    let rows = state.db.data_table(table, &filter).await?;

    Ok(Json(TableResponse {
        success: true,
        columns: table.columns(),
        data: rows,
    }))
}
