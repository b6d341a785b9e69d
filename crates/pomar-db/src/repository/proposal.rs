//! # Proposal Repository
//!
//! Database operations for customer proposals.
//!
//! ## Proposal Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Proposal Lifecycle                                 │
//! │                                                                         │
//! │  1. SAVE DRAFT                                                          │
//! │     └── save() → Proposal { status: Draft }                             │
//! │         (upsert; saving again overwrites the draft in place)            │
//! │                                                                         │
//! │  2. (OPTIONAL) PLACE ORDER                                              │
//! │     └── Checkout::place_order() → status: Ordered + inventory unit      │
//! │                                                                         │
//! │  3. SELL                                                                │
//! │     └── Checkout::sell() → status: Sold + sold_at (terminal)            │
//! │                                                                         │
//! │  EXPIRY is derived, never stored: a draft older than the configured     │
//! │  window is expired on read. Editing an expired proposal goes through    │
//! │  reopen(), which clones it into a brand-new draft and leaves the        │
//! │  original untouched as history.                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use pomar_core::error::StateError;
use pomar_core::types::{Proposal, ProposalStatus};
use pomar_core::validation::validate_proposal;

use crate::batch::{self, WriteBatch, WriteOp};
use crate::error::{StoreError, StoreResult};
use crate::watch::Feeds;

const PROPOSAL_COLUMNS: &str = r#"
    id, customer_name, customer_surname, customer_phone,
    product_name, product_name_only, product_memory, product_color,
    cost_usd_cents, fee_usd_cents, exchange_rate_milli, spread_milli,
    import_tax_cents, total_cost_cents, selling_price_cents,
    created_at, origin, product_id, status, sold_at,
    trade_in_name, trade_in_value_cents, trade_in_memory,
    trade_in_color, trade_in_battery
"#;

/// Lists every proposal, newest first. Shared by the repository and the
/// proposal feed.
pub(crate) async fn fetch_all(pool: &SqlitePool) -> StoreResult<Vec<Proposal>> {
    let proposals = sqlx::query_as::<_, Proposal>(&format!(
        "SELECT {PROPOSAL_COLUMNS} FROM proposals ORDER BY created_at DESC"
    ))
    .fetch_all(pool)
    .await?;

    Ok(proposals)
}

/// Repository for proposal database operations.
#[derive(Debug, Clone)]
pub struct ProposalRepository {
    pool: SqlitePool,
    feeds: Feeds,
}

impl ProposalRepository {
    pub(crate) fn new(pool: SqlitePool, feeds: Feeds) -> Self {
        ProposalRepository { pool, feeds }
    }

    /// Lists all proposals, newest first. Expiry is derived by the caller
    /// (see [`Proposal::is_expired`]); sold and expired rows are part of
    /// the history and stay in the list.
    pub async fn list(&self) -> StoreResult<Vec<Proposal>> {
        fetch_all(&self.pool).await
    }

    /// Gets a proposal by id.
    pub async fn get(&self, id: &str) -> StoreResult<Option<Proposal>> {
        let proposal = sqlx::query_as::<_, Proposal>(&format!(
            "SELECT {PROPOSAL_COLUMNS} FROM proposals WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(proposal)
    }

    /// Gets a proposal by id, failing with NotFound when it does not exist.
    pub async fn require(&self, id: &str) -> StoreResult<Proposal> {
        self.get(id)
            .await?
            .ok_or_else(|| StoreError::not_found("Proposal", id))
    }

    /// Saves a proposal (insert or in-place overwrite).
    ///
    /// ## Preconditions
    /// * Sold proposals are financially frozen: `StateError::AlreadySold`.
    /// * Expired proposals cannot be edited in place; `reopen()` is the
    ///   path for those: `StateError::Expired`.
    ///
    /// `now` and `expiration_days` drive the expiry check; callers load
    /// `expiration_days` from settings.
    pub async fn save(
        &self,
        proposal: Proposal,
        now: DateTime<Utc>,
        expiration_days: i64,
    ) -> StoreResult<Proposal> {
        validate_proposal(&proposal)?;

        if let Some(current) = self.get(&proposal.id).await? {
            if current.status == ProposalStatus::Sold {
                return Err(StateError::AlreadySold {
                    id: proposal.id.clone(),
                }
                .into());
            }
            if current.is_expired(now, expiration_days) {
                return Err(StateError::Expired {
                    id: proposal.id.clone(),
                }
                .into());
            }
        }

        debug!(id = %proposal.id, customer = %proposal.customer_full_name(), "saving proposal");

        let batch = WriteBatch::single(WriteOp::PutProposal(proposal.clone()));
        batch::apply_and_publish(&self.pool, &self.feeds, &batch).await?;

        Ok(proposal)
    }

    /// Clones a proposal into a brand-new draft (fresh id, fresh
    /// `created_at`, lifecycle cleared) and inserts it. The original row is
    /// left exactly as it was.
    ///
    /// This is how an expired proposal gets edited; it also works on live
    /// ones ("duplicate quote"). Only sold proposals refuse.
    pub async fn reopen(&self, id: &str, now: DateTime<Utc>) -> StoreResult<Proposal> {
        let original = self.require(id).await?;
        if original.status == ProposalStatus::Sold {
            return Err(StateError::AlreadySold { id: id.to_string() }.into());
        }

        let draft = original.fresh_draft(now);

        debug!(from = %id, to = %draft.id, "reopening proposal as fresh draft");

        let batch = WriteBatch::single(WriteOp::PutProposal(draft.clone()));
        batch::apply_and_publish(&self.pool, &self.feeds, &batch).await?;

        Ok(draft)
    }

    /// Removes a proposal. Works on any status: deleting history is an
    /// explicit user action, and the ledger keeps its own records.
    pub async fn delete(&self, id: &str) -> StoreResult<()> {
        debug!(id = %id, "deleting proposal");

        let batch = WriteBatch::single(WriteOp::DeleteProposal { id: id.to_string() });
        batch::apply_and_publish(&self.pool, &self.feeds, &batch).await
    }

    /// Counts proposals (for diagnostics and seeding).
    pub async fn count(&self) -> StoreResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM proposals")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
