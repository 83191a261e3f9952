// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Parser help route.

use crate::services::help::help_text;
use crate::AppState;
use axum::{extract::Path, routing::get, Json, Router};
use serde::Serialize;
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/help/{key}", get(get_help))
}

#[derive(Serialize)]
pub struct HelpResponse {
    pub help_text: &'static str,
}

async fn get_help(Path(key): Path<String>) -> Json<HelpResponse> {
    Json(HelpResponse {
        help_text: help_text(&key),
    })
}
