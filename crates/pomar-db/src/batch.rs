//! # Write Batches
//!
//! Every mutation in pomar goes through a [`WriteBatch`]: a list of write
//! operations executed inside a single SQLite transaction.
//!
//! ## Why Batches
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    All-or-Nothing Writes                                │
//! │                                                                         │
//! │  Completing a sale touches up to three collections:                     │
//! │                                                                         │
//! │    1. UPDATE proposals   → status = sold, sold_at stamped               │
//! │    2. DELETE products    → consumed unit leaves inventory               │
//! │    3. INSERT ledger      → the sale entry                               │
//! │    4. INSERT products    → trade-in device absorbed as used stock       │
//! │    5. INSERT ledger      → the trade-in entry                           │
//! │                                                                         │
//! │  If step 4 fails, steps 1-3 MUST NOT survive: a sold proposal with      │
//! │  no sale entry (or a sale entry with the unit still on the shelf)       │
//! │  is corrupted books. One transaction per batch guarantees that the      │
//! │  database either moves to the complete new state or stays put.          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Strict Operations
//! UPDATEs and DELETEs check `rows_affected`: matching zero rows fails the
//! whole batch. That turns a stale id anywhere in the batch into a clean
//! rollback instead of silently half-applied books.

use chrono::{DateTime, Utc};
use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::debug;

use pomar_core::{LedgerEntry, ProductItem, Proposal, ShopSettings};

use crate::error::{StoreError, StoreResult};
use crate::watch::{Feeds, Touched};

// =============================================================================
// Write Operations
// =============================================================================

/// A single write inside a batch.
///
/// Ops carry full rows (not closures) so a batch can be built, inspected
/// and logged before anything touches the database.
#[derive(Debug, Clone)]
pub enum WriteOp {
    /// Insert a new inventory item. Fails the batch on a duplicate id.
    InsertProduct(ProductItem),
    /// Rewrite an existing item (everything but `created_at`). Strict.
    UpdateProduct(ProductItem),
    /// Remove an item. Strict: the id must exist.
    DeleteProduct { id: String },
    /// Flip an ordered item to in-stock. Strict: it must currently be
    /// ordered.
    ReceiveProduct { id: String },
    /// Insert or fully replace a proposal row.
    PutProposal(Proposal),
    /// Remove a proposal. Strict.
    DeleteProposal { id: String },
    /// Stamp a proposal sold. Strict: the row must exist and not be sold
    /// already (sold is terminal).
    MarkProposalSold { id: String, sold_at: DateTime<Utc> },
    /// Promote a draft to ordered, linking the ordered inventory unit.
    /// Strict: the row must exist and still be a draft.
    MarkProposalOrdered { id: String, product_id: String },
    /// Append a ledger entry. Fails the batch on a duplicate id.
    InsertEntry(LedgerEntry),
    /// Remove a ledger entry. Strict.
    DeleteEntry { id: String },
    /// Wipe the whole ledger. Never strict (an empty ledger is fine).
    ClearLedger,
    /// Insert or replace the global settings document.
    PutSettings {
        settings: ShopSettings,
        updated_at: DateTime<Utc>,
    },
}

impl WriteOp {
    fn touched(&self) -> Touched {
        match self {
            WriteOp::InsertProduct(_)
            | WriteOp::UpdateProduct(_)
            | WriteOp::DeleteProduct { .. }
            | WriteOp::ReceiveProduct { .. } => Touched {
                products: true,
                ..Default::default()
            },
            WriteOp::PutProposal(_)
            | WriteOp::DeleteProposal { .. }
            | WriteOp::MarkProposalSold { .. }
            | WriteOp::MarkProposalOrdered { .. } => Touched {
                proposals: true,
                ..Default::default()
            },
            WriteOp::InsertEntry(_) | WriteOp::DeleteEntry { .. } | WriteOp::ClearLedger => {
                Touched {
                    ledger: true,
                    ..Default::default()
                }
            }
            WriteOp::PutSettings { .. } => Touched {
                settings: true,
                ..Default::default()
            },
        }
    }
}

// =============================================================================
// Write Batch
// =============================================================================

/// An ordered list of write operations applied atomically.
///
/// ## Usage
/// ```rust,ignore
/// let batch = WriteBatch::new()
///     .op(WriteOp::InsertProduct(item.clone()))
///     .op(WriteOp::InsertEntry(entry));
/// store.apply(&batch).await?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct WriteBatch {
    ops: Vec<WriteOp>,
}

impl WriteBatch {
    /// Creates an empty batch.
    pub fn new() -> Self {
        WriteBatch::default()
    }

    /// Creates a batch with a single operation.
    pub fn single(op: WriteOp) -> Self {
        WriteBatch { ops: vec![op] }
    }

    /// Appends an operation (builder style).
    pub fn op(mut self, op: WriteOp) -> Self {
        self.ops.push(op);
        self
    }

    /// Appends an operation in place.
    pub fn push(&mut self, op: WriteOp) {
        self.ops.push(op);
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn ops(&self) -> &[WriteOp] {
        &self.ops
    }

    /// Which feeds need refreshing after this batch commits.
    pub(crate) fn touched(&self) -> Touched {
        let mut touched = Touched::default();
        for op in &self.ops {
            touched.merge(op.touched());
        }
        touched
    }
}

// =============================================================================
// Execution
// =============================================================================

/// Applies the batch inside one transaction.
///
/// On any error the transaction is dropped, which rolls it back: the
/// database keeps the exact state it had before the batch started.
pub(crate) async fn apply(pool: &SqlitePool, batch: &WriteBatch) -> StoreResult<()> {
    if batch.is_empty() {
        return Ok(());
    }

    debug!(ops = batch.len(), "applying write batch");

    let mut tx = pool.begin().await?;
    for op in batch.ops() {
        exec_op(&mut tx, op).await?;
    }
    tx.commit().await?;

    Ok(())
}

/// Applies the batch, then refreshes the feeds it touched.
pub(crate) async fn apply_and_publish(
    pool: &SqlitePool,
    feeds: &Feeds,
    batch: &WriteBatch,
) -> StoreResult<()> {
    apply(pool, batch).await?;
    feeds.refresh(pool, batch.touched()).await;
    Ok(())
}

async fn exec_op(tx: &mut Transaction<'_, Sqlite>, op: &WriteOp) -> StoreResult<()> {
    match op {
        WriteOp::InsertProduct(item) => {
            sqlx::query(
                r#"
                INSERT INTO products (
                    id, name, memory, color,
                    cost_usd_cents, fee_usd_cents, exchange_rate_milli, spread_milli,
                    import_tax_cents, total_cost_cents, created_at, is_used,
                    battery_health, observation, status
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(item.id.as_str())
            .bind(item.name.as_str())
            .bind(item.memory.as_str())
            .bind(item.color.as_str())
            .bind(item.cost_usd_cents)
            .bind(item.fee_usd_cents)
            .bind(item.exchange_rate_milli)
            .bind(item.spread_milli)
            .bind(item.import_tax_cents)
            .bind(item.total_cost_cents)
            .bind(item.created_at)
            .bind(item.is_used)
            .bind(item.battery_health)
            .bind(item.observation.as_deref())
            .bind(item.status)
            .execute(&mut **tx)
            .await?;
        }

        WriteOp::UpdateProduct(item) => {
            let result = sqlx::query(
                r#"
                UPDATE products SET
                    name = ?, memory = ?, color = ?,
                    cost_usd_cents = ?, fee_usd_cents = ?, exchange_rate_milli = ?,
                    spread_milli = ?, import_tax_cents = ?, total_cost_cents = ?,
                    is_used = ?, battery_health = ?, observation = ?, status = ?
                WHERE id = ?
                "#,
            )
            .bind(item.name.as_str())
            .bind(item.memory.as_str())
            .bind(item.color.as_str())
            .bind(item.cost_usd_cents)
            .bind(item.fee_usd_cents)
            .bind(item.exchange_rate_milli)
            .bind(item.spread_milli)
            .bind(item.import_tax_cents)
            .bind(item.total_cost_cents)
            .bind(item.is_used)
            .bind(item.battery_health)
            .bind(item.observation.as_deref())
            .bind(item.status)
            .bind(item.id.as_str())
            .execute(&mut **tx)
            .await?;

            if result.rows_affected() == 0 {
                return Err(StoreError::not_found("Product", &item.id));
            }
        }

        WriteOp::DeleteProduct { id } => {
            let result = sqlx::query("DELETE FROM products WHERE id = ?")
                .bind(id.as_str())
                .execute(&mut **tx)
                .await?;

            if result.rows_affected() == 0 {
                return Err(StoreError::not_found("Product", id));
            }
        }

        WriteOp::ReceiveProduct { id } => {
            let result =
                sqlx::query("UPDATE products SET status = 'in_stock' WHERE id = ? AND status = 'ordered'")
                    .bind(id.as_str())
                    .execute(&mut **tx)
                    .await?;

            if result.rows_affected() == 0 {
                return Err(StoreError::not_found("Ordered product", id));
            }
        }

        WriteOp::PutProposal(proposal) => {
            sqlx::query(
                r#"
                INSERT OR REPLACE INTO proposals (
                    id, customer_name, customer_surname, customer_phone,
                    product_name, product_name_only, product_memory, product_color,
                    cost_usd_cents, fee_usd_cents, exchange_rate_milli, spread_milli,
                    import_tax_cents, total_cost_cents, selling_price_cents,
                    created_at, origin, product_id, status, sold_at,
                    trade_in_name, trade_in_value_cents, trade_in_memory,
                    trade_in_color, trade_in_battery
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(proposal.id.as_str())
            .bind(proposal.customer_name.as_str())
            .bind(proposal.customer_surname.as_str())
            .bind(proposal.customer_phone.as_str())
            .bind(proposal.product_name.as_str())
            .bind(proposal.product_name_only.as_deref())
            .bind(proposal.product_memory.as_deref())
            .bind(proposal.product_color.as_deref())
            .bind(proposal.cost_usd_cents)
            .bind(proposal.fee_usd_cents)
            .bind(proposal.exchange_rate_milli)
            .bind(proposal.spread_milli)
            .bind(proposal.import_tax_cents)
            .bind(proposal.total_cost_cents)
            .bind(proposal.selling_price_cents)
            .bind(proposal.created_at)
            .bind(proposal.origin)
            .bind(proposal.product_id.as_deref())
            .bind(proposal.status)
            .bind(proposal.sold_at)
            .bind(proposal.trade_in_name.as_deref())
            .bind(proposal.trade_in_value_cents)
            .bind(proposal.trade_in_memory.as_deref())
            .bind(proposal.trade_in_color.as_deref())
            .bind(proposal.trade_in_battery)
            .execute(&mut **tx)
            .await?;
        }

        WriteOp::DeleteProposal { id } => {
            let result = sqlx::query("DELETE FROM proposals WHERE id = ?")
                .bind(id.as_str())
                .execute(&mut **tx)
                .await?;

            if result.rows_affected() == 0 {
                return Err(StoreError::not_found("Proposal", id));
            }
        }

        WriteOp::MarkProposalSold { id, sold_at } => {
            let result = sqlx::query(
                "UPDATE proposals SET status = 'sold', sold_at = ? WHERE id = ? AND status != 'sold'",
            )
            .bind(*sold_at)
            .bind(id.as_str())
            .execute(&mut **tx)
            .await?;

            if result.rows_affected() == 0 {
                return Err(StoreError::not_found("Sellable proposal", id));
            }
        }

        WriteOp::MarkProposalOrdered { id, product_id } => {
            let result = sqlx::query(
                "UPDATE proposals SET status = 'ordered', product_id = ? WHERE id = ? AND status = 'draft'",
            )
            .bind(product_id.as_str())
            .bind(id.as_str())
            .execute(&mut **tx)
            .await?;

            if result.rows_affected() == 0 {
                return Err(StoreError::not_found("Draft proposal", id));
            }
        }

        WriteOp::InsertEntry(entry) => {
            sqlx::query(
                r#"
                INSERT INTO ledger_entries (
                    id, kind, description, amount_cents, cost_cents,
                    date, related_id, trade_in_value_cents
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(entry.id.as_str())
            .bind(entry.kind)
            .bind(entry.description.as_str())
            .bind(entry.amount_cents)
            .bind(entry.cost_cents)
            .bind(entry.date)
            .bind(entry.related_id.as_deref())
            .bind(entry.trade_in_value_cents)
            .execute(&mut **tx)
            .await?;
        }

        WriteOp::DeleteEntry { id } => {
            let result = sqlx::query("DELETE FROM ledger_entries WHERE id = ?")
                .bind(id.as_str())
                .execute(&mut **tx)
                .await?;

            if result.rows_affected() == 0 {
                return Err(StoreError::not_found("Ledger entry", id));
            }
        }

        WriteOp::ClearLedger => {
            sqlx::query("DELETE FROM ledger_entries")
                .execute(&mut **tx)
                .await?;
        }

        WriteOp::PutSettings {
            settings,
            updated_at,
        } => {
            let payload = serde_json::to_string(settings)
                .map_err(|e| StoreError::Internal(e.to_string()))?;

            sqlx::query(
                r#"
                INSERT INTO settings (id, payload, updated_at)
                VALUES ('global', ?, ?)
                ON CONFLICT(id) DO UPDATE SET
                    payload = excluded.payload,
                    updated_at = excluded.updated_at
                "#,
            )
            .bind(payload)
            .bind(*updated_at)
            .execute(&mut **tx)
            .await?;
        }
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
