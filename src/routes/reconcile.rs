// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Reconciliation routes.

use super::extract::FormBody;
use crate::error::{AppError, Result};
use crate::services::{
    BankFinanceOutcome, BankFinanceReconciler, BankFinanceTallyOutcome,
    BankFinanceTallyReconciler, BankTallyOutcome, BankTallyReconciler,
};
use crate::AppState;
use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/reconcile", post(reconcile_bank_finance))
        .route("/bank_tally/reconcile", post(reconcile_bank_tally))
        .route("/reconcile_bft", post(reconcile_bank_finance_tally))
}

/// Reconcile form: `bank_code`, `account_number`.
#[derive(Debug, Default, Deserialize)]
pub struct ReconcileForm {
    pub bank_code: Option<String>,
    pub account_number: Option<String>,
}

impl ReconcileForm {
    fn bank_code(&self) -> Option<&str> {
        non_blank(&self.bank_code)
    }

    fn account_number(&self) -> Option<&str> {
        non_blank(&self.account_number)
    }

    /// Both fields, or the standard "both required" error.
    fn bank_and_account(&self) -> Result<(&str, &str)> {
        self.bank_code()
            .zip(self.account_number())
            .ok_or_else(|| {
                AppError::BadRequest("bank_code and account_number are required.".to_string())
            })
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// A successful reply: the outcome fields plus `success: true`.
#[derive(Serialize)]
struct Success<T> {
    success: bool,
    #[serde(flatten)]
    outcome: T,
}

impl<T> Success<T> {
    fn new(outcome: T) -> Json<Self> {
        Json(Self {
            success: true,
            outcome,
        })
    }
}

async fn reconcile_bank_finance(
    State(state): State<Arc<AppState>>,
    FormBody(form): FormBody<ReconcileForm>,
) -> Result<Json<Success<BankFinanceOutcome>>> {
    let bank_code = form
        .bank_code()
        .ok_or_else(|| AppError::BadRequest("bank_code is required.".to_string()))?;

    let reconciler = BankFinanceReconciler::new(
        state.db.clone(),
        state.reconcile_locks.clone(),
        state.config.max_finance_combo,
    );
    let outcome = reconciler.run(bank_code, form.account_number()).await?;
    Ok(Success::new(outcome))
}

async fn reconcile_bank_tally(
    State(state): State<Arc<AppState>>,
    FormBody(form): FormBody<ReconcileForm>,
) -> Result<Json<Success<BankTallyOutcome>>> {
    let (bank_code, account) = form.bank_and_account()?;

    let reconciler = BankTallyReconciler::new(state.db.clone(), state.reconcile_locks.clone());
    let outcome = reconciler.run(bank_code, account).await?;
    Ok(Success::new(outcome))
}

/// An empty candidate set is reported with the counts, as a 404.
async fn reconcile_bank_finance_tally(
    State(state): State<Arc<AppState>>,
    FormBody(form): FormBody<ReconcileForm>,
) -> Result<(StatusCode, Json<BankFinanceTallyOutcome>)> {
    let (bank_code, account) = form.bank_and_account()?;

    let reconciler =
        BankFinanceTallyReconciler::new(state.db.clone(), state.reconcile_locks.clone());
    let outcome = reconciler.run(bank_code, account).await?;
    let status = if outcome.success {
        StatusCode::OK
    } else {
        StatusCode::NOT_FOUND
    };
    Ok((status, Json(outcome)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reconcile_form_requires_both_fields() {
        let form = ReconcileForm {
            bank_code: Some("MDB".into()),
            account_number: Some("  ".into()),
        };
        assert_eq!(form.bank_code(), Some("MDB"));
        assert!(form.bank_and_account().is_err());

        let form = ReconcileForm {
            bank_code: Some("MDB".into()),
            account_number: Some("00111050011026".into()),
        };
        assert_eq!(form.bank_and_account().unwrap(), ("MDB", "00111050011026"));
    }
}
