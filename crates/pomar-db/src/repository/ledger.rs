//! # Ledger Repository
//!
//! Database operations for the financial ledger.
//!
//! ## Aggregation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                   Financial Summary                                     │
//! │                                                                         │
//! │  The summary is never stored. It is recomputed from the rows on         │
//! │  every read with one SUM(CASE ...) query:                               │
//! │                                                                         │
//! │    cash_in          = Σ sale.amount                                     │
//! │    cash_out         = Σ stock_entry.amount                              │
//! │    gross_revenue    = cash_in (every cash-in is a sale)                 │
//! │    stock_investment = Σ stock_entry.amount + Σ trade_in_entry.amount    │
//! │    realized_profit  = Σ (sale.amount − sale.cost)                       │
//! │                                                                         │
//! │  Consequence: deleting a ledger row immediately moves every             │
//! │  aggregate. That is the intended behavior - the ledger is the           │
//! │  single source of financial truth.                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::SqlitePool;
use tracing::debug;

use pomar_core::types::{FinancialSummary, LedgerEntry};

use crate::batch::{self, WriteBatch, WriteOp};
use crate::error::StoreResult;
use crate::watch::Feeds;

const ENTRY_COLUMNS: &str = r#"
    id, kind, description, amount_cents, cost_cents,
    date, related_id, trade_in_value_cents
"#;

/// Lists every ledger entry, newest first. Shared by the repository and
/// the ledger feed.
pub(crate) async fn fetch_all(pool: &SqlitePool) -> StoreResult<Vec<LedgerEntry>> {
    let entries = sqlx::query_as::<_, LedgerEntry>(&format!(
        "SELECT {ENTRY_COLUMNS} FROM ledger_entries ORDER BY date DESC, id DESC"
    ))
    .fetch_all(pool)
    .await?;

    Ok(entries)
}

/// Repository for ledger database operations.
///
/// Rows are append-and-delete only; there is no update. Checkout and the
/// product repository append their entries inside larger batches; the
/// methods here are the direct manual operations.
#[derive(Debug, Clone)]
pub struct LedgerRepository {
    pool: SqlitePool,
    feeds: Feeds,
}

impl LedgerRepository {
    pub(crate) fn new(pool: SqlitePool, feeds: Feeds) -> Self {
        LedgerRepository { pool, feeds }
    }

    /// Lists all entries, newest first.
    pub async fn list(&self) -> StoreResult<Vec<LedgerEntry>> {
        fetch_all(&self.pool).await
    }

    /// Gets an entry by id.
    pub async fn get(&self, id: &str) -> StoreResult<Option<LedgerEntry>> {
        let entry = sqlx::query_as::<_, LedgerEntry>(&format!(
            "SELECT {ENTRY_COLUMNS} FROM ledger_entries WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(entry)
    }

    /// Appends a manual entry.
    pub async fn append(&self, entry: LedgerEntry) -> StoreResult<LedgerEntry> {
        debug!(id = %entry.id, kind = ?entry.kind, amount = entry.amount_cents, "appending ledger entry");

        let batch = WriteBatch::single(WriteOp::InsertEntry(entry.clone()));
        batch::apply_and_publish(&self.pool, &self.feeds, &batch).await?;

        Ok(entry)
    }

    /// Removes one entry. Aggregates shift immediately; nothing else is
    /// reversed (the row is gone, the inventory/proposal it referenced is
    /// not touched).
    pub async fn delete(&self, id: &str) -> StoreResult<()> {
        debug!(id = %id, "deleting ledger entry");

        let batch = WriteBatch::single(WriteOp::DeleteEntry { id: id.to_string() });
        batch::apply_and_publish(&self.pool, &self.feeds, &batch).await
    }

    /// Wipes the whole ledger. Used for the explicit "start a new period"
    /// action; inventory and proposals survive.
    pub async fn clear_all(&self) -> StoreResult<()> {
        debug!("clearing ledger");

        let batch = WriteBatch::single(WriteOp::ClearLedger);
        batch::apply_and_publish(&self.pool, &self.feeds, &batch).await
    }

    /// Computes the financial summary from the current rows.
    pub async fn summary(&self) -> StoreResult<FinancialSummary> {
        let summary = sqlx::query_as::<_, FinancialSummary>(
            r#"
            SELECT
                COALESCE(SUM(CASE WHEN kind = 'sale' THEN amount_cents END), 0)
                    AS cash_in_cents,
                COALESCE(SUM(CASE WHEN kind = 'stock_entry' THEN amount_cents END), 0)
                    AS cash_out_cents,
                COALESCE(SUM(CASE WHEN kind = 'sale' THEN amount_cents END), 0)
                    AS gross_revenue_cents,
                COALESCE(SUM(CASE WHEN kind IN ('stock_entry', 'trade_in_entry')
                    THEN amount_cents END), 0)
                    AS stock_investment_cents,
                COALESCE(SUM(CASE WHEN kind = 'sale'
                    THEN amount_cents - COALESCE(cost_cents, 0) END), 0)
                    AS realized_profit_cents
            FROM ledger_entries
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(summary)
    }

    /// Counts ledger entries (for diagnostics and seeding).
    pub async fn count(&self) -> StoreResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM ledger_entries")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
