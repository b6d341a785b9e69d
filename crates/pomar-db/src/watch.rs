//! # Collection Feeds
//!
//! Live full-collection snapshots over tokio watch channels.
//!
//! ## How Feeds Work
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Feed Lifecycle                                     │
//! │                                                                         │
//! │  Store::open()                                                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Feeds created with empty snapshots, then primed from the database      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  UI subscribes: store.subscribe_products() → watch::Receiver<Vec<..>>   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Any committed write batch ──► refresh touched collections              │
//! │       │                         (re-query, send_replace full snapshot)  │
//! │       ▼                                                                 │
//! │  Receivers see .changed() and render the new snapshot                   │
//! │                                                                         │
//! │  A refresh failure after a successful commit only logs a warning:       │
//! │  the data is safely on disk and the next refresh will catch up.         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Snapshots are whole collections, not deltas. The shop's working set is
//! a few hundred rows, so re-sending everything is simpler and cheaper
//! than diffing.

use std::sync::Arc;

use sqlx::SqlitePool;
use tokio::sync::watch;
use tracing::warn;

use pomar_core::{LedgerEntry, ProductItem, Proposal, ShopSettings};

use crate::repository;

/// Which collections a committed batch touched, so only those feeds get
/// re-queried.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Touched {
    pub products: bool,
    pub proposals: bool,
    pub ledger: bool,
    pub settings: bool,
}

impl Touched {
    pub(crate) fn merge(&mut self, other: Touched) {
        self.products |= other.products;
        self.proposals |= other.proposals;
        self.ledger |= other.ledger;
        self.settings |= other.settings;
    }
}

/// Watch senders for every collection. Cloning is cheap (Arc handles);
/// all clones publish into the same channels.
#[derive(Debug, Clone)]
pub(crate) struct Feeds {
    products: Arc<watch::Sender<Vec<ProductItem>>>,
    proposals: Arc<watch::Sender<Vec<Proposal>>>,
    ledger: Arc<watch::Sender<Vec<LedgerEntry>>>,
    settings: Arc<watch::Sender<ShopSettings>>,
}

impl Feeds {
    pub(crate) fn new() -> Self {
        let (products, _) = watch::channel(Vec::new());
        let (proposals, _) = watch::channel(Vec::new());
        let (ledger, _) = watch::channel(Vec::new());
        let (settings, _) = watch::channel(ShopSettings::default());

        Feeds {
            products: Arc::new(products),
            proposals: Arc::new(proposals),
            ledger: Arc::new(ledger),
            settings: Arc::new(settings),
        }
    }

    // ======================================================================
    // Subscriptions
    // ======================================================================

    pub(crate) fn subscribe_products(&self) -> watch::Receiver<Vec<ProductItem>> {
        self.products.subscribe()
    }

    pub(crate) fn subscribe_proposals(&self) -> watch::Receiver<Vec<Proposal>> {
        self.proposals.subscribe()
    }

    pub(crate) fn subscribe_ledger(&self) -> watch::Receiver<Vec<LedgerEntry>> {
        self.ledger.subscribe()
    }

    pub(crate) fn subscribe_settings(&self) -> watch::Receiver<ShopSettings> {
        self.settings.subscribe()
    }

    // ======================================================================
    // Refresh
    // ======================================================================

    /// Re-queries every collection a batch touched and publishes fresh
    /// snapshots. Called after commit; failures are logged, never raised.
    pub(crate) async fn refresh(&self, pool: &SqlitePool, touched: Touched) {
        if touched.products {
            self.refresh_products(pool).await;
        }
        if touched.proposals {
            self.refresh_proposals(pool).await;
        }
        if touched.ledger {
            self.refresh_ledger(pool).await;
        }
        if touched.settings {
            self.refresh_settings(pool).await;
        }
    }

    pub(crate) async fn refresh_products(&self, pool: &SqlitePool) {
        match repository::product::fetch_all(pool).await {
            Ok(items) => {
                self.products.send_replace(items);
            }
            Err(err) => warn!(error = %err, "product feed refresh failed; keeping last snapshot"),
        }
    }

    pub(crate) async fn refresh_proposals(&self, pool: &SqlitePool) {
        match repository::proposal::fetch_all(pool).await {
            Ok(items) => {
                self.proposals.send_replace(items);
            }
            Err(err) => warn!(error = %err, "proposal feed refresh failed; keeping last snapshot"),
        }
    }

    pub(crate) async fn refresh_ledger(&self, pool: &SqlitePool) {
        match repository::ledger::fetch_all(pool).await {
            Ok(entries) => {
                self.ledger.send_replace(entries);
            }
            Err(err) => warn!(error = %err, "ledger feed refresh failed; keeping last snapshot"),
        }
    }

    pub(crate) async fn refresh_settings(&self, pool: &SqlitePool) {
        match repository::settings::fetch(pool).await {
            Ok(settings) => {
                self.settings.send_replace(settings);
            }
            Err(err) => warn!(error = %err, "settings feed refresh failed; keeping last snapshot"),
        }
    }
}
