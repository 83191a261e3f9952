//! Bulk maintenance: emptying tables and clearing match state.

use super::{tables, Db};
use crate::error::AppError;

/// Which source tables `/truncate_data` empties.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableSelection {
    All,
    Bank,
    Finance,
    Tally,
}

impl TableSelection {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "all" => Some(Self::All),
            "bank_data" => Some(Self::Bank),
            "fin_data" => Some(Self::Finance),
            "tally_data" => Some(Self::Tally),
            _ => None,
        }
    }

    /// Tables to empty, match tables before the ledgers they point at.
    fn tables(self) -> &'static [&'static str] {
        match self {
            Self::All => &[
                tables::BFT_MATCHED,
                tables::BT_MATCHED,
                tables::BF_MATCHED,
                tables::TALLY_DATA,
                tables::FIN_DATA,
                tables::BANK_DATA,
            ],
            Self::Bank => &[tables::BANK_DATA],
            Self::Finance => &[tables::FIN_DATA],
            Self::Tally => &[tables::TALLY_DATA],
        }
    }

    /// Human-readable label used in responses.
    pub fn label(self) -> &'static str {
        match self {
            Self::All => "All data",
            Self::Bank => "Bank Data",
            Self::Finance => "Finance Data",
            Self::Tally => "Tally Data",
        }
    }
}

/// Which reconciliation results `/reset_matches` clears.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchReset {
    All,
    BankFinance,
    BankFinanceTally,
    BankTally,
}

impl MatchReset {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "all" => Some(Self::All),
            "bank_fin" => Some(Self::BankFinance),
            "bank_fin_tally" => Some(Self::BankFinanceTally),
            "bank_tally" => Some(Self::BankTally),
            _ => None,
        }
    }

    fn statements(self) -> &'static [&'static str] {
        const BF: &[&str] = &[
            "UPDATE bank_data SET bf_is_matched = 0, bf_date_matched = NULL",
            "UPDATE fin_data SET bf_is_matched = 0, bf_date_matched = NULL",
            "DELETE FROM bf_matched",
        ];
        // A cleared BFT run must also release its bf_matched groups.
        const BFT: &[&str] = &[
            "UPDATE bank_data SET bft_is_matched = 0, bft_date_matched = NULL",
            "UPDATE fin_data SET bft_is_matched = 0, bft_date_matched = NULL",
            "UPDATE tally_data SET bft_is_matched = 0, bft_date_matched = NULL",
            "UPDATE bf_matched SET bft_is_matched = 0, bft_date_matched = NULL",
            "DELETE FROM bft_matched",
        ];
        const BT: &[&str] = &[
            "UPDATE bank_data SET bt_is_matched = 0, bt_date_matched = NULL",
            "UPDATE tally_data SET bt_is_matched = 0, bt_date_matched = NULL",
            "DELETE FROM bt_matched",
        ];
        const ALL: &[&str] = &[
            "UPDATE bank_data SET bf_is_matched = 0, bf_date_matched = NULL, \
             bft_is_matched = 0, bft_date_matched = NULL, \
             bt_is_matched = 0, bt_date_matched = NULL",
            "UPDATE fin_data SET bf_is_matched = 0, bf_date_matched = NULL, \
             bft_is_matched = 0, bft_date_matched = NULL",
            "UPDATE tally_data SET bft_is_matched = 0, bft_date_matched = NULL, \
             bt_is_matched = 0, bt_date_matched = NULL",
            "DELETE FROM bft_matched",
            "DELETE FROM bt_matched",
            "DELETE FROM bf_matched",
        ];

        match self {
            Self::All => ALL,
            Self::BankFinance => BF,
            Self::BankFinanceTally => BFT,
            Self::BankTally => BT,
        }
    }

    /// Confirmation shown to the user.
    pub fn message(self) -> &'static str {
        match self {
            Self::All => "All match flags have been reset and match result tables cleared",
            Self::BankFinance => "Bank-Fin match flags have been reset",
            Self::BankFinanceTally => "Bank-Fin-Tally match flags have been reset",
            Self::BankTally => "Bank-Tally match flags have been reset",
        }
    }
}

impl Db {
    /// Delete every row of the selected tables in one transaction.
    pub async fn truncate(&self, selection: TableSelection) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;
        for table in selection.tables() {
            sqlx::query(&format!("DELETE FROM {table}"))
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;

        tracing::info!(tables = ?selection.tables(), "Tables truncated");
        Ok(())
    }

    /// Clear match flags and results in one transaction.
    pub async fn reset_matches(&self, reset: MatchReset) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;
        for statement in reset.statements() {
            sqlx::query(statement).execute(&mut *tx).await?;
        }
        tx.commit().await?;

        tracing::info!(?reset, "Match state reset");
        Ok(())
    }
}
