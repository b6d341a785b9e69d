//! # Checkout
//!
//! The sale and order orchestrator: the only place where proposals,
//! inventory and the ledger move together.
//!
//! ## Completing a Sale
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Checkout::sell()                                   │
//! │                                                                         │
//! │  PRECONDITIONS (checked first, nothing written on failure)              │
//! │  ├── proposal exists                  → NotFound                        │
//! │  ├── proposal not already sold        → StateError::AlreadySold         │
//! │  ├── proposal not expired             → StateError::Expired             │
//! │  └── linked unit not still on order   → StateError::AwaitingReceipt     │
//! │                                                                         │
//! │  ONE WRITE BATCH (one transaction, all or nothing)                      │
//! │  ├── 1. proposal → sold, sold_at stamped                                │
//! │  ├── 2. consumed unit leaves inventory (when one resolves)              │
//! │  ├── 3. sale ledger entry (amount = price − trade-in, cost snapshot)    │
//! │  ├── 4. trade-in device absorbed as used stock (when part of the deal)  │
//! │  └── 5. trade-in ledger entry                                           │
//! │                                                                         │
//! │  Any failure inside the batch rolls everything back: the proposal is    │
//! │  still sellable, the unit is still on the shelf, the books are clean.   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Resolving the Consumed Unit
//! ```text
//! proposal.product_id set?  ──► that unit, exactly
//! │    (deleted since the quote? the sale still stands, nothing consumed)
//! │
//! └─ manual proposal ──► match in-stock units on name/memory/color,
//!    then prefer: reserved for THIS customer > unreserved > none.
//!    A unit held for someone else is never consumed silently.
//! ```

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use pomar_core::error::{StateError, ValidationError};
use pomar_core::types::{
    reservation_note, LedgerEntry, ProductItem, Proposal, ProposalStatus, StockStatus,
};
use pomar_core::validation::{validate_product, validate_selling_price};
use pomar_core::Money;

use crate::batch::{WriteBatch, WriteOp};
use crate::error::StoreResult;
use crate::pool::Store;

// =============================================================================
// Outcomes
// =============================================================================

/// Everything a completed sale produced, for receipts and UI feedback.
#[derive(Debug, Clone)]
pub struct SaleOutcome {
    /// The proposal as persisted: status Sold, `sold_at` stamped.
    pub proposal: Proposal,
    /// The inventory unit the sale consumed, if one resolved.
    pub consumed_product: Option<ProductItem>,
    /// The trade-in device absorbed into stock, if the deal carried one.
    pub trade_in_product: Option<ProductItem>,
    /// The sale ledger entry as written.
    pub sale_entry: LedgerEntry,
}

impl SaleOutcome {
    /// Net amount received: selling price minus trade-in allowance.
    pub fn net_amount(&self) -> Money {
        self.sale_entry.amount()
    }

    /// Realized profit on this sale (can be negative on generous
    /// trade-ins).
    pub fn profit(&self) -> Money {
        self.sale_entry.amount() - self.sale_entry.cost().unwrap_or_default()
    }
}

/// A draft promoted to an order: the proposal plus the ordered unit.
#[derive(Debug, Clone)]
pub struct OrderOutcome {
    /// The proposal as persisted: status Ordered, linked to the unit.
    pub proposal: Proposal,
    /// The ordered inventory unit, reserved for the customer.
    pub product: ProductItem,
}

// =============================================================================
// Checkout
// =============================================================================

/// Orchestrates the writes that cross repositories. Obtained via
/// [`Store::checkout`].
#[derive(Debug, Clone)]
pub struct Checkout {
    store: Store,
}

impl Checkout {
    pub(crate) fn new(store: Store) -> Self {
        Checkout { store }
    }

    /// Completes a sale.
    ///
    /// `now` stamps `sold_at`, dates the ledger entries and drives the
    /// expiry check (against the configured expiration window).
    ///
    /// ## Errors
    /// Precondition errors (`NotFound`, `AlreadySold`, `Expired`,
    /// `AwaitingReceipt`, `Validation`) happen before the batch starts.
    /// Any other error means the batch rolled back and every store is
    /// exactly as it was.
    pub async fn sell(&self, proposal_id: &str, now: DateTime<Utc>) -> StoreResult<SaleOutcome> {
        let proposal = self.store.proposals().require(proposal_id).await?;

        if proposal.status == ProposalStatus::Sold {
            return Err(StateError::AlreadySold {
                id: proposal.id.clone(),
            }
            .into());
        }

        let settings = self.store.settings().load().await?;
        if proposal.is_expired(now, settings.expiration_days) {
            return Err(StateError::Expired {
                id: proposal.id.clone(),
            }
            .into());
        }

        validate_selling_price(proposal.selling_price())?;

        let consumed = self.resolve_consumed(&proposal).await?;

        let mut batch = WriteBatch::new();
        batch.push(WriteOp::MarkProposalSold {
            id: proposal.id.clone(),
            sold_at: now,
        });

        if let Some(item) = &consumed {
            batch.push(WriteOp::DeleteProduct {
                id: item.id.clone(),
            });
        }

        // Ledger amount is the raw difference, not the zero-floored final
        // price: a trade-in worth more than the device shows up as the
        // negative movement it really is.
        let net_amount = proposal.selling_price() - proposal.trade_in_value();
        let sale_entry = LedgerEntry::sale(
            format!(
                "Venda: {} ({})",
                proposal.product_name,
                proposal.customer_full_name()
            ),
            net_amount,
            proposal.total_cost(),
            proposal.id.clone(),
            proposal.trade_in_value(),
            now,
        );
        batch.push(WriteOp::InsertEntry(sale_entry.clone()));

        let trade_in = proposal.trade_in_item(now);
        if let Some(item) = &trade_in {
            batch.push(WriteOp::InsertProduct(item.clone()));
            batch.push(WriteOp::InsertEntry(LedgerEntry::trade_in(
                format!("Entrada de troca: {}", item.descriptor()),
                item.total_cost(),
                Some(item.id.clone()),
                now,
            )));
        }

        self.store.apply(&batch).await?;

        info!(
            proposal = %proposal.id,
            amount = net_amount.cents(),
            consumed = consumed.as_ref().map(|i| i.id.as_str()).unwrap_or("-"),
            trade_in = trade_in.is_some(),
            "sale completed"
        );

        let mut sold = proposal;
        sold.status = ProposalStatus::Sold;
        sold.sold_at = Some(now);

        Ok(SaleOutcome {
            proposal: sold,
            consumed_product: consumed,
            trade_in_product: trade_in,
            sale_entry,
        })
    }

    /// Promotes a draft proposal into an order: creates the ordered
    /// inventory unit (reserved for the customer), records the stock
    /// entry, links the proposal - one batch.
    ///
    /// The unit enters inventory as `ordered`; [`sell`](Checkout::sell)
    /// refuses it until it is received into stock.
    pub async fn place_order(
        &self,
        proposal_id: &str,
        now: DateTime<Utc>,
    ) -> StoreResult<OrderOutcome> {
        let proposal = self.store.proposals().require(proposal_id).await?;

        match proposal.status {
            ProposalStatus::Sold => {
                return Err(StateError::AlreadySold {
                    id: proposal.id.clone(),
                }
                .into())
            }
            ProposalStatus::Ordered => {
                return Err(StateError::AlreadyOrdered {
                    id: proposal.id.clone(),
                }
                .into())
            }
            ProposalStatus::Draft => {}
        }

        let settings = self.store.settings().load().await?;
        if proposal.is_expired(now, settings.expiration_days) {
            return Err(StateError::Expired {
                id: proposal.id.clone(),
            }
            .into());
        }

        let Some((name, memory, color)) = proposal.split_descriptor() else {
            return Err(ValidationError::InvalidFormat {
                field: "product_name".to_string(),
                reason: "ordering needs name, memory and color captured separately".to_string(),
            }
            .into());
        };

        let mut item = ProductItem::new_stock(name, memory, color, &proposal.cost_inputs(), now);
        item.status = StockStatus::Ordered;
        item.observation = Some(reservation_note(&proposal.customer_full_name()));
        validate_product(&item)?;

        let entry = LedgerEntry::stock_entry(
            item.stock_entry_description(),
            item.total_cost(),
            Some(item.id.clone()),
            now,
        );

        let batch = WriteBatch::new()
            .op(WriteOp::InsertProduct(item.clone()))
            .op(WriteOp::InsertEntry(entry))
            .op(WriteOp::MarkProposalOrdered {
                id: proposal.id.clone(),
                product_id: item.id.clone(),
            });

        self.store.apply(&batch).await?;

        info!(
            proposal = %proposal.id,
            product = %item.id,
            cost = item.total_cost_cents,
            "order placed"
        );

        let mut ordered = proposal;
        ordered.status = ProposalStatus::Ordered;
        ordered.product_id = Some(item.id.clone());

        Ok(OrderOutcome {
            proposal: ordered,
            product: item,
        })
    }

    /// Resolves which inventory unit a sale consumes.
    async fn resolve_consumed(&self, proposal: &Proposal) -> StoreResult<Option<ProductItem>> {
        let products = self.store.products();

        // Stock-origin proposals carry the exact unit.
        if let Some(product_id) = proposal.product_id.as_deref() {
            return match products.get(product_id).await? {
                Some(item) if item.status == StockStatus::Ordered => {
                    Err(StateError::AwaitingReceipt {
                        product_id: item.id.clone(),
                    }
                    .into())
                }
                Some(item) => Ok(Some(item)),
                // The unit was deleted since the quote; the sale still
                // stands, there is just nothing left to consume.
                None => Ok(None),
            };
        }

        // Manual proposals reconcile by descriptor.
        let Some((name, memory, color)) = proposal.split_descriptor() else {
            return Ok(None);
        };

        let candidates = products.find_matching(name, memory, color).await?;
        let customer = proposal.customer_full_name();

        let chosen = candidates
            .iter()
            .find(|item| item.is_reserved_for(&customer))
            .or_else(|| candidates.iter().find(|item| !item.is_reserved()))
            .cloned();

        debug!(
            proposal = %proposal.id,
            candidates = candidates.len(),
            chosen = chosen.as_ref().map(|i| i.id.as_str()).unwrap_or("-"),
            "resolved consumed unit"
        );

        Ok(chosen)
    }
}
