//! # Store and Connection Pool
//!
//! Connection pool creation, configuration and the [`Store`] handle.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Store Startup                                      │
//! │                                                                         │
//! │  App startup                                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  StoreConfig::new(path) ← Configure pool settings                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Store::open(config).await                                              │
//! │       ├── create SqlitePool (WAL, foreign keys on)                      │
//! │       ├── run embedded migrations                                       │
//! │       └── prime the watch feeds with current snapshots                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  store.products() / store.proposals() / store.ledger() / ...            │
//! │  store.subscribe_products() → watch::Receiver<Vec<ProductItem>>         │
//! │  store.checkout().sell(...) → atomic sale                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## WAL Mode
//! SQLite WAL (Write-Ahead Logging) mode is enabled for:
//! - Better concurrent read performance
//! - Readers don't block writers
//! - Better crash recovery

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

use pomar_core::{LedgerEntry, ProductItem, Proposal, ShopSettings};
use tokio::sync::watch;

use crate::batch::{self, WriteBatch};
use crate::checkout::Checkout;
use crate::error::{StoreError, StoreResult};
use crate::migrations;
use crate::repository::ledger::LedgerRepository;
use crate::repository::product::ProductRepository;
use crate::repository::proposal::ProposalRepository;
use crate::repository::settings::SettingsRepository;
use crate::watch::Feeds;

// =============================================================================
// Configuration
// =============================================================================

/// Store configuration.
///
/// ## Example
/// ```rust,ignore
/// let config = StoreConfig::new("/path/to/pomar.db")
///     .max_connections(5)
///     .min_connections(1);
/// ```
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Path to the SQLite database file.
    pub database_path: PathBuf,

    /// Maximum number of connections in the pool.
    /// Default: 5 (plenty for a single-shop desktop app)
    pub max_connections: u32,

    /// Minimum number of connections to keep alive.
    /// Default: 1
    pub min_connections: u32,

    /// Connection acquire timeout.
    /// Default: 30 seconds
    pub connect_timeout: Duration,

    /// Idle timeout before closing a connection. `None` keeps connections
    /// forever - required for in-memory databases, where the data lives
    /// inside the connection.
    pub idle_timeout: Option<Duration>,

    /// Whether to run migrations on open.
    /// Default: true
    pub run_migrations: bool,
}

impl StoreConfig {
    /// Creates a configuration for a file-backed database at `path`.
    /// The file is created if it doesn't exist.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        StoreConfig {
            database_path: path.into(),
            max_connections: 5,
            min_connections: 1,
            connect_timeout: Duration::from_secs(30),
            idle_timeout: Some(Duration::from_secs(600)),
            run_migrations: true,
        }
    }

    /// Sets the maximum number of connections.
    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// Sets the minimum number of connections.
    pub fn min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }

    /// Sets the connection acquire timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets whether to run migrations on open.
    pub fn run_migrations(mut self, run: bool) -> Self {
        self.run_migrations = run;
        self
    }

    /// Creates an in-memory database configuration (for testing).
    ///
    /// The pool is pinned to exactly one connection with no idle timeout:
    /// an in-memory SQLite database exists only as long as its connection,
    /// so recycling would silently wipe it.
    pub fn in_memory() -> Self {
        StoreConfig {
            database_path: PathBuf::from(":memory:"),
            max_connections: 1,
            min_connections: 1,
            connect_timeout: Duration::from_secs(5),
            idle_timeout: None,
            run_migrations: true,
        }
    }
}

// =============================================================================
// Store
// =============================================================================

/// Main store handle: repositories, watch feeds, write batches.
///
/// Cloning is cheap (pool and feed handles are Arc-backed) and every clone
/// shares the same database and the same feeds.
///
/// ## Usage
/// ```rust,ignore
/// let store = Store::open(StoreConfig::new("./pomar.db")).await?;
///
/// let items = store.products().list().await?;
/// let mut feed = store.subscribe_products();
///
/// let outcome = store.checkout().sell(&proposal_id, Utc::now()).await?;
/// ```
#[derive(Debug, Clone)]
pub struct Store {
    pool: SqlitePool,
    feeds: Feeds,
}

impl Store {
    /// Opens the store.
    ///
    /// ## What This Does
    /// 1. Creates the database file if it doesn't exist
    /// 2. Configures SQLite (WAL mode, NORMAL synchronous, foreign keys)
    /// 3. Creates the connection pool
    /// 4. Runs migrations (if enabled)
    /// 5. Primes the watch feeds with current snapshots
    pub async fn open(config: StoreConfig) -> StoreResult<Self> {
        info!(
            path = %config.database_path.display(),
            "opening store"
        );

        // sqlite://path creates the file when mode=rwc
        let connect_url = format!("sqlite://{}?mode=rwc", config.database_path.display());

        let connect_options = SqliteConnectOptions::from_str(&connect_url)
            .map_err(|e| StoreError::ConnectionFailed(e.to_string()))?
            // WAL mode: readers don't block the writer (a no-op for the
            // in-memory test database)
            .journal_mode(SqliteJournalMode::Wal)
            // NORMAL synchronous: safe from corruption, may lose the very
            // last transaction on a power cut
            .synchronous(SqliteSynchronous::Normal)
            // SQLite ships with foreign keys off for backwards compatibility
            .foreign_keys(true)
            .create_if_missing(true);

        debug!("connection options configured");

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.connect_timeout)
            .idle_timeout(config.idle_timeout)
            // Desktop app: connections are cheap to keep for the whole run
            .max_lifetime(None)
            .connect_with(connect_options)
            .await
            .map_err(|e| StoreError::ConnectionFailed(e.to_string()))?;

        info!(
            max_connections = config.max_connections,
            "connection pool created"
        );

        let store = Store {
            pool,
            feeds: Feeds::new(),
        };

        if config.run_migrations {
            store.run_migrations().await?;
        }

        // Late subscribers always see current data, not empty snapshots.
        store.refresh_feeds().await;

        Ok(store)
    }

    /// Runs pending database migrations. Idempotent; automatically called
    /// by `open()` unless disabled in the config.
    pub async fn run_migrations(&self) -> StoreResult<()> {
        info!("running database migrations");
        migrations::run_migrations(&self.pool).await?;
        info!("migrations complete");
        Ok(())
    }

    // ======================================================================
    // Repositories
    // ======================================================================

    /// Returns the inventory repository.
    pub fn products(&self) -> ProductRepository {
        ProductRepository::new(self.pool.clone(), self.feeds.clone())
    }

    /// Returns the proposal repository.
    pub fn proposals(&self) -> ProposalRepository {
        ProposalRepository::new(self.pool.clone(), self.feeds.clone())
    }

    /// Returns the ledger repository.
    pub fn ledger(&self) -> LedgerRepository {
        LedgerRepository::new(self.pool.clone(), self.feeds.clone())
    }

    /// Returns the settings repository.
    pub fn settings(&self) -> SettingsRepository {
        SettingsRepository::new(self.pool.clone(), self.feeds.clone())
    }

    /// Returns the checkout orchestrator (sales and order placement).
    pub fn checkout(&self) -> Checkout {
        Checkout::new(self.clone())
    }

    // ======================================================================
    // Subscriptions
    // ======================================================================

    /// Subscribes to the inventory feed. The receiver holds the current
    /// snapshot immediately; `.changed().await` wakes on every committed
    /// write that touches products.
    pub fn subscribe_products(&self) -> watch::Receiver<Vec<ProductItem>> {
        self.feeds.subscribe_products()
    }

    /// Subscribes to the proposal feed.
    pub fn subscribe_proposals(&self) -> watch::Receiver<Vec<Proposal>> {
        self.feeds.subscribe_proposals()
    }

    /// Subscribes to the ledger feed.
    pub fn subscribe_ledger(&self) -> watch::Receiver<Vec<LedgerEntry>> {
        self.feeds.subscribe_ledger()
    }

    /// Subscribes to the settings feed.
    pub fn subscribe_settings(&self) -> watch::Receiver<ShopSettings> {
        self.feeds.subscribe_settings()
    }

    // ======================================================================
    // Write batches
    // ======================================================================

    /// Applies a write batch: one transaction, all or nothing, then
    /// refreshes the touched feeds.
    ///
    /// The repositories build their own batches; this is the public door
    /// for composite writes that cross repositories (and for tests that
    /// need to stage failures at a precise point in a batch).
    pub async fn apply(&self, batch: &WriteBatch) -> StoreResult<()> {
        batch::apply_and_publish(&self.pool, &self.feeds, batch).await
    }

    /// Re-queries every collection and publishes fresh snapshots.
    pub async fn refresh_feeds(&self) {
        self.feeds
            .refresh(
                &self.pool,
                crate::watch::Touched {
                    products: true,
                    proposals: true,
                    ledger: true,
                    settings: true,
                },
            )
            .await;
    }

    // ======================================================================
    // Lifecycle
    // ======================================================================

    /// Returns a reference to the connection pool, for queries the
    /// repositories don't cover.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Closes the connection pool. All operations fail afterwards.
    pub async fn close(&self) {
        info!("closing store");
        self.pool.close().await;
    }

    /// Checks if the database is responsive.
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
