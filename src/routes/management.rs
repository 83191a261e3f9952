// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data management routes: truncating ledgers and clearing match state.
//!
//! These reply with `{success, message}` rather than the usual `msg` key.

use super::extract::JsonBody;
use crate::db::{MatchReset, TableSelection};
use crate::error::AppError;
use crate::AppState;
use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/truncate_data", post(truncate_data))
        .route("/reset_matches", post(reset_matches))
}

#[derive(Debug, Serialize)]
pub struct ManagementResponse {
    pub success: bool,
    pub message: String,
}

type Reply = (StatusCode, Json<ManagementResponse>);

/// Request bodies that fail to parse get the `message` reply too.
type RequestBody<T> = Result<JsonBody<T>, AppError>;

fn ok(message: impl Into<String>) -> Reply {
    (
        StatusCode::OK,
        Json(ManagementResponse {
            success: true,
            message: message.into(),
        }),
    )
}

fn fail(status: StatusCode, message: impl Into<String>) -> Reply {
    (
        status,
        Json(ManagementResponse {
            success: false,
            message: message.into(),
        }),
    )
}

#[derive(Debug, Default, Deserialize)]
pub struct TruncateRequest {
    pub table_type: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ResetRequest {
    pub match_type: Option<String>,
}

async fn truncate_data(
    State(state): State<Arc<AppState>>,
    body: RequestBody<TruncateRequest>,
) -> Reply {
    let req = match body {
        Ok(JsonBody(req)) => req,
        Err(e) => return fail(StatusCode::BAD_REQUEST, e.to_string()),
    };
    let Some(table_type) = req.table_type.filter(|t| !t.is_empty()) else {
        return fail(StatusCode::BAD_REQUEST, "Table type is required");
    };
    let Some(selection) = TableSelection::parse(&table_type) else {
        return fail(StatusCode::BAD_REQUEST, "Invalid table type");
    };

    match state.db.truncate(selection).await {
        Ok(()) => {
            tracing::info!(table_type = %table_type, "Tables truncated");
            match selection {
                TableSelection::All => ok("All data tables have been truncated successfully"),
                other => ok(format!(
                    "{} table has been truncated successfully",
                    other.label()
                )),
            }
        }
        Err(e) => {
            tracing::error!(table_type = %table_type, error = %e, "Truncate failed");
            fail(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Error truncating data: {e}"),
            )
        }
    }
}

async fn reset_matches(
    State(state): State<Arc<AppState>>,
    body: RequestBody<ResetRequest>,
) -> Reply {
    let req = match body {
        Ok(JsonBody(req)) => req,
        Err(e) => return fail(StatusCode::BAD_REQUEST, e.to_string()),
    };
    let Some(match_type) = req.match_type.filter(|t| !t.is_empty()) else {
        return fail(StatusCode::BAD_REQUEST, "Match type is required");
    };
    let Some(reset) = MatchReset::parse(&match_type) else {
        return fail(StatusCode::BAD_REQUEST, "Invalid match type");
    };

    match state.db.reset_matches(reset).await {
        Ok(()) => {
            tracing::info!(match_type = %match_type, "Match state reset");
            ok(reset.message())
        }
        Err(e) => {
            tracing::error!(match_type = %match_type, error = %e, "Reset failed");
            fail(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Error resetting matches: {e}"),
            )
        }
    }
}
