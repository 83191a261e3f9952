//! Distinct-value queries feeding the filter dropdowns.

use super::{tables, Db};
use crate::error::AppError;

/// Ledger a lookup reads from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupTable {
    Bank,
    Finance,
    Tally,
}

impl LookupTable {
    fn table(self) -> &'static str {
        match self {
            Self::Bank => tables::BANK_DATA,
            Self::Finance => tables::FIN_DATA,
            Self::Tally => tables::TALLY_DATA,
        }
    }
}

/// Column a lookup lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupColumn {
    BankCode,
    AcctNo,
    StatementMonth,
    StatementYear,
}

impl LookupColumn {
    fn column(self) -> &'static str {
        match self {
            Self::BankCode => "bank_code",
            Self::AcctNo => "acct_no",
            Self::StatementMonth => "statement_month",
            Self::StatementYear => "statement_year",
        }
    }
}

impl Db {
    /// Distinct non-empty values of `column`, optionally limited to one bank.
    pub async fn distinct_values(
        &self,
        table: LookupTable,
        column: LookupColumn,
        bank_code: Option<&str>,
    ) -> Result<Vec<String>, AppError> {
        let col = column.column();
        let mut qb = sqlx::QueryBuilder::new(format!(
            "SELECT DISTINCT {col} FROM {} WHERE {col} IS NOT NULL AND {col} != ''",
            table.table()
        ));
        if let Some(bank_code) = bank_code {
            qb.push(" AND bank_code = ").push_bind(bank_code);
        }
        qb.push(format!(" ORDER BY {col}"));

        let values = qb
            .build_query_scalar::<String>()
            .fetch_all(&self.pool)
            .await?;
        Ok(values)
    }

    /// Accounts with bank-finance groups still waiting for a BFT run.
    pub async fn bft_accounts(&self, bank_code: &str) -> Result<Vec<String>, AppError> {
        let accounts = sqlx::query_scalar::<_, String>(
            "SELECT DISTINCT acct_no FROM bf_matched \
             WHERE bft_is_matched = 0 AND bank_code = ? AND LOWER(bf_source) = 'bank' \
             AND acct_no IS NOT NULL AND acct_no != '' \
             ORDER BY acct_no",
        )
        .bind(bank_code)
        .fetch_all(&self.pool)
        .await?;
        Ok(accounts)
    }
}
