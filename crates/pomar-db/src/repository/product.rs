//! # Product Repository
//!
//! Database operations for inventory items.
//!
//! ## Inventory Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Inventory Lifecycle                                 │
//! │                                                                         │
//! │  1. CREATE                                                              │
//! │     └── create() → item row + stock ledger entry (one transaction)      │
//! │                                                                         │
//! │  2. (ORDERED ITEMS) RECEIVE                                             │
//! │     └── receive() → status: ordered → in_stock (no financial effect)    │
//! │                                                                         │
//! │  3. EDIT                                                                │
//! │     └── update() → rewrites the row, NEVER touches the ledger           │
//! │         (the stock entry recorded what was actually paid at purchase    │
//! │         time; fixing a typo in the color must not rewrite history)      │
//! │                                                                         │
//! │  4. SELL or DELETE                                                      │
//! │     └── checkout consumes the row / delete() removes it                 │
//! │         (the stock entry stays: money already left the till)            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::SqlitePool;
use tracing::debug;

use pomar_core::error::StateError;
use pomar_core::types::{LedgerEntry, ProductItem, StockStatus};
use pomar_core::validation::validate_product;

use crate::batch::{self, WriteBatch, WriteOp};
use crate::error::{StoreError, StoreResult};
use crate::watch::Feeds;

const PRODUCT_COLUMNS: &str = r#"
    id, name, memory, color,
    cost_usd_cents, fee_usd_cents, exchange_rate_milli, spread_milli,
    import_tax_cents, total_cost_cents, created_at, is_used,
    battery_health, observation, status
"#;

/// Lists every inventory item, newest first. Shared by the repository and
/// the product feed.
pub(crate) async fn fetch_all(pool: &SqlitePool) -> StoreResult<Vec<ProductItem>> {
    let items = sqlx::query_as::<_, ProductItem>(&format!(
        "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY created_at DESC"
    ))
    .fetch_all(pool)
    .await?;

    Ok(items)
}

/// Repository for inventory database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = store.products();
///
/// // Create an item; the stock ledger entry is written in the same
/// // transaction
/// let item = repo.create(item).await?;
///
/// // Receive an ordered unit into stock
/// repo.receive(&item.id).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
    feeds: Feeds,
}

impl ProductRepository {
    pub(crate) fn new(pool: SqlitePool, feeds: Feeds) -> Self {
        ProductRepository { pool, feeds }
    }

    /// Lists all inventory items, newest first.
    pub async fn list(&self) -> StoreResult<Vec<ProductItem>> {
        fetch_all(&self.pool).await
    }

    /// Gets an item by id.
    pub async fn get(&self, id: &str) -> StoreResult<Option<ProductItem>> {
        let item = sqlx::query_as::<_, ProductItem>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(item)
    }

    /// Gets an item by id, failing with NotFound when it does not exist.
    pub async fn require(&self, id: &str) -> StoreResult<ProductItem> {
        self.get(id)
            .await?
            .ok_or_else(|| StoreError::not_found("Product", id))
    }

    /// Creates an inventory item with the default stock ledger description
    /// ("Compra estoque: {descriptor}").
    pub async fn create(&self, item: ProductItem) -> StoreResult<ProductItem> {
        self.create_with_description(item, None).await
    }

    /// Creates an inventory item plus its stock ledger entry in one
    /// transaction.
    ///
    /// ## Arguments
    /// * `item` - the item to insert (id and `created_at` already set)
    /// * `description` - optional custom ledger description; falls back to
    ///   the default when empty
    ///
    /// ## Errors
    /// * `StoreError::Validation` - name/memory/color missing, or a
    ///   new-stock item without a positive exchange rate. Nothing written.
    pub async fn create_with_description(
        &self,
        item: ProductItem,
        description: Option<String>,
    ) -> StoreResult<ProductItem> {
        validate_product(&item)?;

        debug!(id = %item.id, descriptor = %item.descriptor(), "creating inventory item");

        let description = description
            .filter(|d| !d.trim().is_empty())
            .unwrap_or_else(|| item.stock_entry_description());
        let entry = LedgerEntry::stock_entry(
            description,
            item.total_cost(),
            Some(item.id.clone()),
            item.created_at,
        );

        let batch = WriteBatch::new()
            .op(WriteOp::InsertProduct(item.clone()))
            .op(WriteOp::InsertEntry(entry));
        batch::apply_and_publish(&self.pool, &self.feeds, &batch).await?;

        Ok(item)
    }

    /// Rewrites an item. The ledger is untouched: corrections to what was
    /// actually paid go through the ledger explicitly.
    pub async fn update(&self, item: ProductItem) -> StoreResult<ProductItem> {
        validate_product(&item)?;

        debug!(id = %item.id, "updating inventory item");

        let batch = WriteBatch::single(WriteOp::UpdateProduct(item.clone()));
        batch::apply_and_publish(&self.pool, &self.feeds, &batch).await?;

        Ok(item)
    }

    /// Removes an item. The acquisition ledger entry stays: the money left
    /// the till when the device was bought, whatever happens to the row.
    pub async fn delete(&self, id: &str) -> StoreResult<()> {
        debug!(id = %id, "deleting inventory item");

        let batch = WriteBatch::single(WriteOp::DeleteProduct { id: id.to_string() });
        batch::apply_and_publish(&self.pool, &self.feeds, &batch).await
    }

    /// Receives an ordered item into stock. No financial effect: the cost
    /// was recorded when the order was placed.
    ///
    /// ## Errors
    /// * `StateError::AlreadyInStock` - the item is not waiting on an order
    /// * `StoreError::NotFound` - no such item
    pub async fn receive(&self, id: &str) -> StoreResult<ProductItem> {
        let item = self.require(id).await?;
        if item.status == StockStatus::InStock {
            return Err(StateError::AlreadyInStock { id: id.to_string() }.into());
        }

        debug!(id = %id, "receiving ordered item into stock");

        let batch = WriteBatch::single(WriteOp::ReceiveProduct { id: id.to_string() });
        batch::apply_and_publish(&self.pool, &self.feeds, &batch).await?;

        self.require(id).await
    }

    /// Finds in-stock items matching a split descriptor, oldest first.
    ///
    /// Matching is case-insensitive on all three parts. Used by checkout to
    /// reconcile manual proposals against inventory; ordered units never
    /// match (they cannot be handed over).
    pub async fn find_matching(
        &self,
        name: &str,
        memory: &str,
        color: &str,
    ) -> StoreResult<Vec<ProductItem>> {
        let items = sqlx::query_as::<_, ProductItem>(&format!(
            r#"
            SELECT {PRODUCT_COLUMNS} FROM products
            WHERE name = ? COLLATE NOCASE
              AND memory = ? COLLATE NOCASE
              AND color = ? COLLATE NOCASE
              AND status = 'in_stock'
            ORDER BY created_at ASC
            "#
        ))
        .bind(name.trim())
        .bind(memory.trim())
        .bind(color.trim())
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Counts inventory items (for diagnostics and seeding).
    pub async fn count(&self) -> StoreResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
