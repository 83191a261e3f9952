// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Bank-Recon: reconcile bank statements against finance and Tally ledgers
//!
//! This crate provides the backend API that ingests bank statements,
//! finance paid lists and Tally ledger exports, matches them against each
//! other, and serves the resulting reports.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod money;
pub mod parsers;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::Db;
use services::ReconcileLocks;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: Db,
    pub reconcile_locks: ReconcileLocks,
}
