//! # pomar-db: Persistence Layer for the Pomar Shop Engine
//!
//! This crate provides database access for pomar. It uses SQLite for
//! local storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Pomar Data Flow                                  │
//! │                                                                         │
//! │  App layer (create item / save proposal / sell)                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     pomar-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐   ┌───────────────┐   ┌──────────────┐     │   │
//! │  │   │     Store     │   │  Repositories │   │   Checkout   │     │   │
//! │  │   │   (pool.rs)   │   │ product.rs .. │   │ (sales/      │     │   │
//! │  │   │               │   │               │   │  orders)     │     │   │
//! │  │   │ SqlitePool    │◄──│ reads + write │◄──│ multi-store  │     │   │
//! │  │   │ watch feeds   │   │ batches       │   │ batches      │     │   │
//! │  │   └───────────────┘   └───────────────┘   └──────────────┘     │   │
//! │  │           │                                                     │   │
//! │  │           ▼                                                     │   │
//! │  │   WriteBatch (batch.rs): one transaction per mutation,          │   │
//! │  │   feeds refreshed after commit                                  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite database (WAL) + embedded migrations                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Store handle, connection pool, subscriptions
//! - [`batch`] - Write operations and atomic batches
//! - [`checkout`] - Sale completion and order placement
//! - [`repository`] - Per-collection repositories
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Store error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use pomar_db::{Store, StoreConfig};
//!
//! let store = Store::open(StoreConfig::new("path/to/pomar.db")).await?;
//!
//! // Repositories
//! let items = store.products().list().await?;
//!
//! // Live feeds
//! let mut inventory = store.subscribe_products();
//!
//! // Atomic sale
//! let outcome = store.checkout().sell(&proposal_id, Utc::now()).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod batch;
pub mod checkout;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

mod watch;

// =============================================================================
// Re-exports
// =============================================================================

pub use batch::{WriteBatch, WriteOp};
pub use checkout::{Checkout, OrderOutcome, SaleOutcome};
pub use error::{StoreError, StoreResult};
pub use pool::{Store, StoreConfig};

// Repository re-exports for convenience
pub use repository::ledger::LedgerRepository;
pub use repository::product::ProductRepository;
pub use repository::proposal::ProposalRepository;
pub use repository::settings::SettingsRepository;
