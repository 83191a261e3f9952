//! Report and data-table queries.

use super::{tables, Db};
use crate::error::AppError;
use crate::models::{
    BankRecord, BfMatchedRow, BftMatchedRow, BtMatchedRow, DataTableFilter, FinanceRecord,
    ReportScope, TallyRecord,
};
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Sqlite};

/// Ledger browsable through `/data_table/{table}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataTable {
    Bank,
    Tally,
    Finance,
}

impl DataTable {
    /// Parse the route segment (`bank_data`, `tally_data`, `finance_data`).
    pub fn from_route(segment: &str) -> Option<Self> {
        match segment {
            "bank_data" => Some(Self::Bank),
            "tally_data" => Some(Self::Tally),
            "finance_data" => Some(Self::Finance),
            _ => None,
        }
    }

    pub fn table(self) -> &'static str {
        match self {
            Self::Bank => tables::BANK_DATA,
            Self::Tally => tables::TALLY_DATA,
            Self::Finance => tables::FIN_DATA,
        }
    }

    pub fn columns(self) -> &'static [&'static str] {
        match self {
            Self::Bank => BankRecord::COLUMNS,
            Self::Tally => TallyRecord::COLUMNS,
            Self::Finance => FinanceRecord::COLUMNS,
        }
    }

    fn id_column(self) -> &'static str {
        match self {
            Self::Bank => "bank_id",
            Self::Tally => "tally_id",
            Self::Finance => "fin_id",
        }
    }
}

/// Start a `SELECT *` restricted to one bank account and statement period.
fn scoped<'a>(from: &str, scope: &'a ReportScope) -> QueryBuilder<'a, Sqlite> {
    let mut qb = QueryBuilder::new(format!("SELECT * FROM {from} WHERE bank_code = "));
    qb.push_bind(scope.bank_code.as_str())
        .push(" AND acct_no = ")
        .push_bind(scope.acct_no.as_str())
        .push(" AND statement_month = ")
        .push_bind(scope.statement_month.as_str())
        .push(" AND statement_year = ")
        .push_bind(scope.statement_year.as_str());
    qb
}

async fn fetch<'a, T>(db: &Db, mut qb: QueryBuilder<'a, Sqlite>) -> Result<Vec<T>, AppError>
where
    T: for<'r> sqlx::FromRow<'r, SqliteRow> + Send + Unpin,
{
    Ok(qb.build_query_as::<T>().fetch_all(&db.pool).await?)
}

impl Db {
    /// Bank rows matched neither to Tally nor through a BFT group.
    pub async fn unmatched_bank_report(&self, scope: &ReportScope) -> Result<Vec<BankRecord>, AppError> {
        let mut qb = scoped(tables::BANK_DATA, scope);
        qb.push(" AND bt_is_matched = 0 AND bft_is_matched = 0 ORDER BY bank_id");
        fetch(self, qb).await
    }

    /// Tally rows matched neither to the bank nor through a BFT group.
    pub async fn unmatched_tally_report(&self, scope: &ReportScope) -> Result<Vec<TallyRecord>, AppError> {
        let mut qb = scoped(tables::TALLY_DATA, scope);
        qb.push(" AND bt_is_matched = 0 AND bft_is_matched = 0 ORDER BY tally_id");
        fetch(self, qb).await
    }

    pub async fn bf_matched_report(&self, scope: &ReportScope) -> Result<Vec<BfMatchedRow>, AppError> {
        let mut qb = scoped(tables::BF_MATCHED, scope);
        qb.push(" ORDER BY bf_match_id, bf_id");
        fetch(self, qb).await
    }

    pub async fn bft_matched_report(&self, scope: &ReportScope) -> Result<Vec<BftMatchedRow>, AppError> {
        let mut qb = scoped(tables::BFT_MATCHED, scope);
        qb.push(" ORDER BY bft_match_id, bft_id");
        fetch(self, qb).await
    }

    pub async fn bt_matched_report(&self, scope: &ReportScope) -> Result<Vec<BtMatchedRow>, AppError> {
        let mut qb = scoped(tables::BT_MATCHED, scope);
        qb.push(" ORDER BY bt_match_id, bt_id");
        fetch(self, qb).await
    }

    /// Full rows of one ledger, narrowed by whichever filters are set.
    /// Rows come back as JSON objects keyed by column name.
    pub async fn data_table(
        &self,
        table: DataTable,
        filter: &DataTableFilter,
    ) -> Result<Vec<serde_json::Value>, AppError> {
        let mut qb = QueryBuilder::new(format!("SELECT * FROM {} WHERE 1 = 1", table.table()));
        for (column, value) in filter.text_filters() {
            qb.push(format!(" AND {column} = ")).push_bind(value);
        }
        for (column, flag) in filter.flag_filters(table.columns()) {
            qb.push(format!(" AND {column} = ")).push_bind(flag);
        }
        qb.push(format!(" ORDER BY {}", table.id_column()));

        let rows = match table {
            DataTable::Bank => to_values(fetch::<BankRecord>(self, qb).await?),
            DataTable::Tally => to_values(fetch::<TallyRecord>(self, qb).await?),
            DataTable::Finance => to_values(fetch::<FinanceRecord>(self, qb).await?),
        };
        rows.map_err(|e| AppError::Internal(e.into()))
    }
}

fn to_values<T: serde::Serialize>(rows: Vec<T>) -> Result<Vec<serde_json::Value>, serde_json::Error> {
    rows.iter().map(serde_json::to_value).collect()
}
