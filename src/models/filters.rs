// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Request filters shared by reports and data tables.

use serde::Deserialize;
use serde_json::Value;
use validator::Validate;

/// Report filter: every field is required and non-empty.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct ReportFilter {
    #[validate(required, length(min = 1))]
    pub bank_code: Option<String>,
    #[validate(required, length(min = 1))]
    pub acct_no: Option<String>,
    #[validate(required, length(min = 1))]
    pub statement_month: Option<String>,
    #[validate(required, length(min = 1))]
    pub statement_year: Option<String>,
}

/// Validated report scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportScope {
    pub bank_code: String,
    pub acct_no: String,
    pub statement_month: String,
    pub statement_year: String,
}

impl ReportFilter {
    /// Validate and unwrap into a [`ReportScope`]; `None` when any filter is missing.
    pub fn into_scope(self) -> Option<ReportScope> {
        self.validate().ok()?;
        Some(ReportScope {
            bank_code: self.bank_code?,
            acct_no: self.acct_no?,
            statement_month: self.statement_month?,
            statement_year: self.statement_year?,
        })
    }
}

/// Optional data-table filter. Empty strings mean "no filter".
#[derive(Debug, Default, Deserialize)]
pub struct DataTableFilter {
    pub bank_code: Option<String>,
    pub acct_no: Option<String>,
    pub statement_month: Option<String>,
    pub statement_year: Option<String>,
    pub bf_is_matched: Option<Value>,
    pub bft_is_matched: Option<Value>,
    pub bt_is_matched: Option<Value>,
}

impl DataTableFilter {
    /// Non-empty text filters as `(column, value)` pairs.
    pub fn text_filters(&self) -> Vec<(&'static str, &str)> {
        [
            ("bank_code", &self.bank_code),
            ("acct_no", &self.acct_no),
            ("statement_month", &self.statement_month),
            ("statement_year", &self.statement_year),
        ]
        .into_iter()
        .filter_map(|(col, v)| {
            v.as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|s| (col, s))
        })
        .collect()
    }

    /// Match-flag filters as `(column, 0|1)` pairs, restricted to `available` columns.
    pub fn flag_filters(&self, available: &[&str]) -> Vec<(&'static str, i64)> {
        [
            ("bf_is_matched", &self.bf_is_matched),
            ("bft_is_matched", &self.bft_is_matched),
            ("bt_is_matched", &self.bt_is_matched),
        ]
        .into_iter()
        .filter(|(col, _)| available.contains(col))
        .filter_map(|(col, v)| v.as_ref().and_then(parse_flag).map(|f| (col, f)))
        .collect()
    }
}

/// Accept `0`/`1` as numbers or strings; anything else is ignored.
fn parse_flag(value: &Value) -> Option<i64> {
    let flag = match value {
        Value::Number(n) => n.as_i64()?,
        Value::String(s) => s.trim().parse().ok()?,
        Value::Bool(b) => i64::from(*b),
        _ => return None,
    };
    matches!(flag, 0 | 1).then_some(flag)
}
