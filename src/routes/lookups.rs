// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Dropdown sources for the filter and reconcile forms.

use super::extract::FormBody;
use crate::db::{LookupColumn, LookupTable};
use crate::error::{AppError, Result};
use crate::AppState;
use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

/// Whether a lookup takes `bank_code`.
#[derive(Clone, Copy)]
enum BankFilter {
    Ignored,
    Optional,
    Required,
}

/// One `GET` lookup: path, source, column, reply key, bank filter.
struct Lookup {
    path: &'static str,
    table: LookupTable,
    column: LookupColumn,
    key: &'static str,
    bank: BankFilter,
}

const fn lookup(
    path: &'static str,
    table: LookupTable,
    column: LookupColumn,
    key: &'static str,
    bank: BankFilter,
) -> Lookup {
    Lookup {
        path,
        table,
        column,
        key,
        bank,
    }
}

use BankFilter as B;
use LookupColumn as C;
use LookupTable as T;

static LOOKUPS: &[Lookup] = &[
    lookup("/get_bank_codes", T::Bank, C::BankCode, "bank_codes", B::Ignored),
    lookup("/get_acct_nos", T::Bank, C::AcctNo, "acct_nos", B::Required),
    lookup("/get_statement_months", T::Bank, C::StatementMonth, "months", B::Ignored),
    lookup("/get_statement_years", T::Bank, C::StatementYear, "years", B::Ignored),
    lookup("/get_tally_bank_codes", T::Tally, C::BankCode, "bank_codes", B::Ignored),
    lookup("/get_tally_acct_nos", T::Tally, C::AcctNo, "acct_nos", B::Required),
    lookup("/get_tally_statement_months", T::Tally, C::StatementMonth, "months", B::Ignored),
    lookup("/get_tally_statement_years", T::Tally, C::StatementYear, "years", B::Ignored),
    lookup("/get_fin_bank_codes", T::Finance, C::BankCode, "bank_codes", B::Ignored),
    lookup("/get_fin_data_acct_nos", T::Finance, C::AcctNo, "acct_nos", B::Optional),
    lookup("/get_fin_data_statement_months", T::Finance, C::StatementMonth, "months", B::Ignored),
    lookup("/get_fin_data_statement_years", T::Finance, C::StatementYear, "years", B::Ignored),
    lookup("/get_bank_data_acct_nos", T::Bank, C::AcctNo, "acct_nos", B::Ignored),
    lookup("/get_bank_data_statement_months", T::Bank, C::StatementMonth, "months", B::Ignored),
    lookup("/get_bank_data_statement_years", T::Bank, C::StatementYear, "years", B::Ignored),
    lookup("/get_tally_data_acct_nos", T::Tally, C::AcctNo, "acct_nos", B::Ignored),
    lookup("/get_tally_data_statement_months", T::Tally, C::StatementMonth, "months", B::Ignored),
    lookup("/get_tally_data_statement_years", T::Tally, C::StatementYear, "years", B::Ignored),
];

pub fn routes() -> Router<Arc<AppState>> {
    let router = LOOKUPS.iter().fold(Router::new(), |router, lookup| {
        router.route(
            lookup.path,
            get(move |state: State<Arc<AppState>>, query: Query<BankQuery>| {
                run_lookup(state, query, lookup)
            }),
        )
    });

    router
        .route("/get_banks", post(get_banks))
        .route("/get_accounts", post(get_accounts))
        .route("/get_bft_accounts", post(get_bft_accounts))
}

/// `bank_code` from a query string or form body.
#[derive(Debug, Default, Deserialize)]
pub struct BankQuery {
    pub bank_code: Option<String>,
}

impl BankQuery {
    fn bank_code(&self) -> Option<&str> {
        self.bank_code
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }
}

/// `{success: true, <key>: values}`
fn values_reply(key: &str, values: Vec<String>) -> Response {
    Json(json!({ "success": true, key: values })).into_response()
}

async fn run_lookup(
    State(state): State<Arc<AppState>>,
    Query(query): Query<BankQuery>,
    lookup: &'static Lookup,
) -> Result<Response> {
    let bank_code = match lookup.bank {
        BankFilter::Ignored => None,
        BankFilter::Optional => query.bank_code(),
        BankFilter::Required => Some(
            query
                .bank_code()
                .ok_or_else(|| AppError::BadRequest("Missing bank_code".to_string()))?,
        ),
    };
    let values = state
        .db
        .distinct_values(lookup.table, lookup.column, bank_code)
        .await?;
    Ok(values_reply(lookup.key, values))
}

/// Banks with statement rows, for the reconcile forms.
async fn get_banks(State(state): State<Arc<AppState>>) -> Result<Response> {
    let banks = state
        .db
        .distinct_values(LookupTable::Bank, LookupColumn::BankCode, None)
        .await?;
    Ok(values_reply("banks", banks))
}

/// Statement accounts, optionally of one bank.
async fn get_accounts(
    State(state): State<Arc<AppState>>,
    FormBody(form): FormBody<BankQuery>,
) -> Result<Response> {
    let accounts = state
        .db
        .distinct_values(LookupTable::Bank, LookupColumn::AcctNo, form.bank_code())
        .await?;
    Ok(values_reply("accounts", accounts))
}

/// Accounts with bank-finance groups not yet confirmed against Tally.
async fn get_bft_accounts(
    State(state): State<Arc<AppState>>,
    FormBody(form): FormBody<BankQuery>,
) -> Result<Response> {
    let bank_code = form
        .bank_code()
        .ok_or_else(|| AppError::BadRequest("bank_code is required.".to_string()))?;
    let accounts = state.db.bft_accounts(bank_code).await?;
    Ok(values_reply("accounts", accounts))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_lookup_paths_are_unique() {
        let paths: HashSet<&str> = LOOKUPS.iter().map(|l| l.path).collect();
        assert_eq!(paths.len(), LOOKUPS.len());
    }
}
