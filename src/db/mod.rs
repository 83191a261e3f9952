//! Database layer (SQLite via sqlx).
//!
//! [`Db`] owns the connection pool. Queries are grouped by concern in the
//! submodules, each adding methods to `Db`.

mod ledgers;
mod lookups;
mod maintenance;
mod matches;
mod reports;

pub use lookups::{LookupColumn, LookupTable};
pub use maintenance::{MatchReset, TableSelection};
pub use matches::{BfGroupRows, BftGroupRows, BtPairRows};
pub use reports::DataTable;

use crate::error::AppError;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::str::FromStr;

/// Table names as constants.
pub mod tables {
    pub const BANK_DATA: &str = "bank_data";
    pub const FIN_DATA: &str = "fin_data";
    pub const TALLY_DATA: &str = "tally_data";
    pub const BF_MATCHED: &str = "bf_matched";
    pub const BFT_MATCHED: &str = "bft_matched";
    pub const BT_MATCHED: &str = "bt_matched";
}

/// Database handle, cheap to clone.
#[derive(Clone)]
pub struct Db {
    pool: SqlitePool,
}

impl Db {
    /// Open (creating if missing) the database at `url` and apply migrations.
    pub async fn connect(url: &str) -> Result<Self, AppError> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(|e| AppError::Database(format!("Invalid database URL: {e}")))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .map_err(|e| AppError::Database(format!("Failed to open database: {e}")))?;

        sqlx::query("PRAGMA busy_timeout = 5000;")
            .execute(&pool)
            .await
            .map_err(|e| AppError::Database(format!("Failed to set busy_timeout: {e}")))?;

        tracing::info!(url, "Database connection established (SQLite WAL)");
        Self::migrate(pool).await
    }

    /// Private in-memory database for tests.
    ///
    /// Every pooled connection to `sqlite::memory:` would see its own empty
    /// database, so the pool is capped at one connection that is never
    /// recycled.
    pub async fn in_memory() -> Result<Self, AppError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| AppError::Database(format!("Invalid database URL: {e}")))?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(|e| AppError::Database(format!("Failed to open database: {e}")))?;
        Self::migrate(pool).await
    }

    async fn migrate(pool: SqlitePool) -> Result<Self, AppError> {
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| AppError::Database(format!("Failed to apply migrations: {e}")))?;
        tracing::debug!("Database migrations applied");
        Ok(Self { pool })
    }
}
