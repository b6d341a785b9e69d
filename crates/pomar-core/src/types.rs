//! # Domain Types
//!
//! Core domain types used throughout the pomar engine.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                │
//! │                                                                     │
//! │  ┌────────────────┐   ┌────────────────┐   ┌────────────────┐      │
//! │  │  ProductItem   │   │    Proposal    │   │  LedgerEntry   │      │
//! │  │  ────────────  │   │  ────────────  │   │  ────────────  │      │
//! │  │  id (UUID)     │   │  id (UUID)     │   │  id (UUID)     │      │
//! │  │  name/mem/col  │   │  customer      │   │  kind          │      │
//! │  │  cost fields   │   │  cost snapshot │   │  amount_cents  │      │
//! │  │  status        │   │  status        │   │  cost_cents    │      │
//! │  └────────────────┘   └────────────────┘   └────────────────┘      │
//! │                                                                     │
//! │  ┌────────────────┐   ┌────────────────┐   ┌────────────────┐      │
//! │  │  StockStatus   │   │ ProposalStatus │   │ LedgerEntryKind│      │
//! │  │  ────────────  │   │  ────────────  │   │  ────────────  │      │
//! │  │  InStock       │   │  Draft         │   │  StockEntry    │      │
//! │  │  Ordered       │   │  Ordered       │   │  Sale          │      │
//! │  └────────────────┘   │  Sold          │   │  TradeInEntry  │      │
//! │                       └────────────────┘   └────────────────┘      │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Expiration is deliberately NOT a status: it is derived from
//! `created_at` on every read (see [`crate::expiry`]), so a proposal can
//! drift in and out of view without a write.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::expiry;
use crate::money::{Money, Percent, Rate};
use crate::pricing::{self, CostInputs};

// =============================================================================
// Reservation Marker
// =============================================================================

/// Marker prefix written into a product's observation when a unit is held
/// for a customer, e.g. `"Reservado para João Silva"`.
///
/// Sale reconciliation for manual-mode proposals substring-matches on this.
/// It is a soft link by design (the shop writes these notes by hand); the
/// helpers below keep the policy in one place.
pub const RESERVATION_MARKER: &str = "Reservado para";

/// Builds the observation note that reserves a unit for a customer.
pub fn reservation_note(customer: &str) -> String {
    format!("{} {}", RESERVATION_MARKER, customer.trim())
}

// =============================================================================
// Stock Status
// =============================================================================

/// Where a product item stands between purchase and shelf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum StockStatus {
    /// Physically in the shop, sellable.
    InStock,
    /// Paid for and on its way; cannot be handed to a customer yet.
    Ordered,
}

impl Default for StockStatus {
    fn default() -> Self {
        StockStatus::InStock
    }
}

// =============================================================================
// Product Item
// =============================================================================

/// A single device in inventory.
///
/// Each unit is its own row (phones are not fungible: IMEI, battery wear,
/// scratches). Money fields are raw i64 minor units; the typed accessors
/// below wrap them.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct ProductItem {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Model name, e.g. "iPhone 15".
    pub name: String,

    /// Storage size, e.g. "128GB".
    pub memory: String,

    /// Color, e.g. "Azul".
    pub color: String,

    /// Purchase cost in USD cents (zero for used/trade-in units).
    pub cost_usd_cents: i64,

    /// Import courier fee in USD cents.
    pub fee_usd_cents: i64,

    /// Exchange rate at purchase time, thousandths (5.20 → 5200).
    pub exchange_rate_milli: i64,

    /// Spread added over the commercial rate, thousandths.
    pub spread_milli: i64,

    /// Import tax in BRL centavos.
    pub import_tax_cents: i64,

    /// Landed cost in BRL centavos. For new items this is the computed
    /// conversion; for used items it is the acquisition value entered
    /// directly (or the trade-in allowance).
    pub total_cost_cents: i64,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    /// Used/seminovo unit (cost fields are zero, total entered directly).
    pub is_used: bool,

    /// Battery health percentage for used units.
    pub battery_health: Option<i64>,

    /// Free-form notes; reservation markers live here.
    pub observation: Option<String>,

    pub status: StockStatus,
}

impl ProductItem {
    /// Creates a new-stock item, computing the landed cost from the inputs.
    pub fn new_stock(
        name: impl Into<String>,
        memory: impl Into<String>,
        color: impl Into<String>,
        costs: &CostInputs,
        now: DateTime<Utc>,
    ) -> Self {
        ProductItem {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            memory: memory.into(),
            color: color.into(),
            cost_usd_cents: costs.cost_usd.cents(),
            fee_usd_cents: costs.fee_usd.cents(),
            exchange_rate_milli: costs.exchange_rate.milli(),
            spread_milli: costs.spread.milli(),
            import_tax_cents: costs.import_tax.cents(),
            total_cost_cents: pricing::total_cost(costs).cents(),
            created_at: now,
            is_used: false,
            battery_health: None,
            observation: None,
            status: StockStatus::InStock,
        }
    }

    /// Creates a used item whose acquisition value is entered directly;
    /// the USD cost fields stay zero.
    pub fn used(
        name: impl Into<String>,
        memory: impl Into<String>,
        color: impl Into<String>,
        entry_value: Money,
        battery_health: Option<i64>,
        now: DateTime<Utc>,
    ) -> Self {
        ProductItem {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            memory: memory.into(),
            color: color.into(),
            cost_usd_cents: 0,
            fee_usd_cents: 0,
            exchange_rate_milli: 0,
            spread_milli: 0,
            import_tax_cents: 0,
            total_cost_cents: entry_value.cents(),
            created_at: now,
            is_used: true,
            battery_health,
            observation: None,
            status: StockStatus::InStock,
        }
    }

    /// Returns the landed cost as Money (BRL).
    #[inline]
    pub fn total_cost(&self) -> Money {
        Money::from_cents(self.total_cost_cents)
    }

    /// Returns the exchange rate used at purchase.
    #[inline]
    pub fn exchange_rate(&self) -> Rate {
        Rate::from_milli(self.exchange_rate_milli)
    }

    /// Returns the spread over the commercial rate.
    #[inline]
    pub fn spread(&self) -> Rate {
        Rate::from_milli(self.spread_milli)
    }

    /// "iPhone 15 128GB Azul" — the display descriptor, also used to
    /// compose ledger descriptions. Empty parts are skipped (trade-in
    /// devices often arrive with just a name).
    pub fn descriptor(&self) -> String {
        [self.name.as_str(), self.memory.as_str(), self.color.as_str()]
            .iter()
            .map(|part| part.trim())
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Default ledger description for the stock entry written on creation.
    pub fn stock_entry_description(&self) -> String {
        format!("Compra estoque: {}", self.descriptor())
    }

    /// Whether the observation carries any reservation marker.
    /// Listing "available" units is caller-side policy built on this.
    pub fn is_reserved(&self) -> bool {
        self.observation
            .as_deref()
            .is_some_and(|obs| obs.contains(RESERVATION_MARKER))
    }

    /// Whether the observation reserves this unit for the named customer.
    /// Plain substring containment, matching how the notes are written.
    pub fn is_reserved_for(&self, customer: &str) -> bool {
        let customer = customer.trim();
        if customer.is_empty() {
            return false;
        }
        self.observation
            .as_deref()
            .is_some_and(|obs| obs.contains(&reservation_note(customer)))
    }
}

// =============================================================================
// Proposal Status / Origin
// =============================================================================

/// Lifecycle of a proposal. `Sold` is terminal; expiration is derived,
/// never stored here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ProposalStatus {
    /// Open quote, editable.
    Draft,
    /// Used to order a device; carries the product back-reference.
    Ordered,
    /// Sale completed, `sold_at` stamped. Financially immutable.
    Sold,
}

impl Default for ProposalStatus {
    fn default() -> Self {
        ProposalStatus::Draft
    }
}

/// Where the quoted device comes from. Drives how a sale resolves the
/// consumed inventory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ProposalOrigin {
    /// Quoted from a new-stock unit; `product_id` points at it.
    NewStock,
    /// Quoted from a used unit in stock; `product_id` points at it.
    UsedStock,
    /// Free-form quote; reconciliation falls back to the reservation
    /// marker search.
    Manual,
}

impl Default for ProposalOrigin {
    fn default() -> Self {
        ProposalOrigin::Manual
    }
}

// =============================================================================
// Proposal
// =============================================================================

/// A customer quote, from draft through order to sale.
///
/// Carries a full cost snapshot frozen at quote time, so later rate or fee
/// changes never move an agreed price. Trade-in data is an optional flat
/// snapshot (the traded device only becomes a real `ProductItem` when the
/// sale completes).
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Proposal {
    /// Unique identifier (UUID v4).
    pub id: String,

    pub customer_name: String,
    pub customer_surname: String,
    pub customer_phone: String,

    /// Combined display descriptor, e.g. "iPhone 15 128GB Azul".
    pub product_name: String,

    /// Split descriptor for manual-mode reconciliation. Stock-origin
    /// proposals may leave these empty and rely on `product_id`.
    pub product_name_only: Option<String>,
    pub product_memory: Option<String>,
    pub product_color: Option<String>,

    /// Cost snapshot (same units as `ProductItem`).
    pub cost_usd_cents: i64,
    pub fee_usd_cents: i64,
    pub exchange_rate_milli: i64,
    pub spread_milli: i64,
    pub import_tax_cents: i64,

    /// Landed cost snapshot in BRL centavos.
    pub total_cost_cents: i64,

    /// Agreed price in BRL centavos, before any trade-in deduction.
    pub selling_price_cents: i64,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    pub origin: ProposalOrigin,

    /// Back-reference to the quoted or ordered unit.
    pub product_id: Option<String>,

    pub status: ProposalStatus,

    #[ts(as = "Option<String>")]
    pub sold_at: Option<DateTime<Utc>>,

    /// Trade-in snapshot: device taken as part of the payment.
    pub trade_in_name: Option<String>,
    pub trade_in_value_cents: Option<i64>,
    pub trade_in_memory: Option<String>,
    pub trade_in_color: Option<String>,
    pub trade_in_battery: Option<i64>,
}

impl Proposal {
    /// Returns the agreed selling price as Money.
    #[inline]
    pub fn selling_price(&self) -> Money {
        Money::from_cents(self.selling_price_cents)
    }

    /// Returns the landed-cost snapshot as Money.
    #[inline]
    pub fn total_cost(&self) -> Money {
        Money::from_cents(self.total_cost_cents)
    }

    /// Returns the trade-in allowance, zero when there is none.
    #[inline]
    pub fn trade_in_value(&self) -> Money {
        Money::from_cents(self.trade_in_value_cents.unwrap_or(0))
    }

    /// Whether a trade-in device is part of the deal.
    #[inline]
    pub fn has_trade_in(&self) -> bool {
        self.trade_in_value().is_positive()
    }

    /// What the customer actually pays: price minus trade-in, floored at 0.
    pub fn final_price(&self) -> Money {
        pricing::final_price(self.selling_price(), self.trade_in_value())
    }

    /// Profit on this deal after the trade-in deduction; can be negative.
    pub fn profit(&self) -> Money {
        pricing::profit(self.final_price(), self.total_cost())
    }

    /// The cost snapshot as calculator inputs (for re-quoting flows).
    pub fn cost_inputs(&self) -> CostInputs {
        CostInputs {
            cost_usd: Money::from_cents(self.cost_usd_cents),
            fee_usd: Money::from_cents(self.fee_usd_cents),
            exchange_rate: Rate::from_milli(self.exchange_rate_milli),
            spread: Rate::from_milli(self.spread_milli),
            import_tax: Money::from_cents(self.import_tax_cents),
        }
    }

    /// The reverse margin implied by the agreed price, if the cost
    /// snapshot is non-zero.
    pub fn margin(&self) -> Option<Percent> {
        pricing::margin_for_price(self.selling_price(), self.total_cost())
    }

    /// "João Silva" — used for reservation matching and sale descriptions.
    pub fn customer_full_name(&self) -> String {
        format!("{} {}", self.customer_name, self.customer_surname)
            .trim()
            .to_string()
    }

    /// Split descriptor for manual-mode inventory reconciliation, when all
    /// three parts were captured.
    pub fn split_descriptor(&self) -> Option<(&str, &str, &str)> {
        match (
            self.product_name_only.as_deref(),
            self.product_memory.as_deref(),
            self.product_color.as_deref(),
        ) {
            (Some(n), Some(m), Some(c)) if !n.is_empty() => Some((n, m, c)),
            _ => None,
        }
    }

    /// Whether the proposal has expired at `now` (derived, never stored).
    pub fn is_expired(&self, now: DateTime<Utc>, expiration_days: i64) -> bool {
        expiry::is_expired(self.created_at, now, expiration_days)
    }

    /// Clones an expired proposal into a brand-new draft: fresh id, fresh
    /// `created_at`, status and back-references cleared. The original row
    /// is left untouched as history.
    pub fn fresh_draft(&self, now: DateTime<Utc>) -> Proposal {
        Proposal {
            id: Uuid::new_v4().to_string(),
            created_at: now,
            status: ProposalStatus::Draft,
            product_id: None,
            sold_at: None,
            ..self.clone()
        }
    }

    /// Materializes the trade-in snapshot as a used inventory item, if the
    /// deal carries one with a positive value.
    pub fn trade_in_item(&self, now: DateTime<Utc>) -> Option<ProductItem> {
        let value = self.trade_in_value();
        if !value.is_positive() {
            return None;
        }
        let name = self
            .trade_in_name
            .clone()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| "Aparelho de troca".to_string());
        Some(ProductItem {
            id: Uuid::new_v4().to_string(),
            name,
            memory: self.trade_in_memory.clone().unwrap_or_default(),
            color: self.trade_in_color.clone().unwrap_or_default(),
            cost_usd_cents: 0,
            fee_usd_cents: 0,
            exchange_rate_milli: 0,
            spread_milli: 0,
            import_tax_cents: 0,
            total_cost_cents: value.cents(),
            created_at: now,
            is_used: true,
            battery_health: self.trade_in_battery,
            observation: None,
            status: StockStatus::InStock,
        })
    }
}

// =============================================================================
// Ledger Entry
// =============================================================================

/// The three financial movements the shop records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum LedgerEntryKind {
    /// Money out: stock acquired (new purchase or used entry).
    StockEntry,
    /// Money in: a completed sale. Carries the cost snapshot for profit.
    Sale,
    /// A trade-in device absorbed as stock investment.
    TradeInEntry,
}

/// One row in the financial ledger. Append-only in spirit: rows are
/// deleted or cleared explicitly, never mutated.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct LedgerEntry {
    pub id: String,
    pub kind: LedgerEntryKind,
    pub description: String,

    /// Movement value in BRL centavos. For sales this is the net amount
    /// the customer pays (price minus trade-in).
    pub amount_cents: i64,

    /// Cost snapshot, `Sale` rows only; drives realized profit.
    pub cost_cents: Option<i64>,

    #[ts(as = "String")]
    pub date: DateTime<Utc>,

    /// Linked product or proposal id.
    pub related_id: Option<String>,

    /// Trade-in allowance recorded with a sale.
    pub trade_in_value_cents: Option<i64>,
}

impl LedgerEntry {
    /// Stock acquisition: money out, amount = landed cost.
    pub fn stock_entry(
        description: impl Into<String>,
        amount: Money,
        related_id: Option<String>,
        date: DateTime<Utc>,
    ) -> Self {
        LedgerEntry {
            id: Uuid::new_v4().to_string(),
            kind: LedgerEntryKind::StockEntry,
            description: description.into(),
            amount_cents: amount.cents(),
            cost_cents: None,
            date,
            related_id,
            trade_in_value_cents: None,
        }
    }

    /// Completed sale: `amount` is the net received, `cost` the landed-cost
    /// snapshot, `trade_in_value` whatever allowance was part of the deal.
    pub fn sale(
        description: impl Into<String>,
        amount: Money,
        cost: Money,
        related_id: String,
        trade_in_value: Money,
        date: DateTime<Utc>,
    ) -> Self {
        LedgerEntry {
            id: Uuid::new_v4().to_string(),
            kind: LedgerEntryKind::Sale,
            description: description.into(),
            amount_cents: amount.cents(),
            cost_cents: Some(cost.cents()),
            date,
            related_id: Some(related_id),
            trade_in_value_cents: if trade_in_value.is_positive() {
                Some(trade_in_value.cents())
            } else {
                None
            },
        }
    }

    /// Trade-in absorbed: stock investment at the allowed value.
    pub fn trade_in(
        description: impl Into<String>,
        value: Money,
        related_id: Option<String>,
        date: DateTime<Utc>,
    ) -> Self {
        LedgerEntry {
            id: Uuid::new_v4().to_string(),
            kind: LedgerEntryKind::TradeInEntry,
            description: description.into(),
            amount_cents: value.cents(),
            cost_cents: None,
            date,
            related_id,
            trade_in_value_cents: None,
        }
    }

    /// Returns the movement value as Money.
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }

    /// Returns the cost snapshot as Money (Sale rows).
    #[inline]
    pub fn cost(&self) -> Option<Money> {
        self.cost_cents.map(Money::from_cents)
    }
}

// =============================================================================
// Financial Summary
// =============================================================================

/// Ledger aggregates, recomputed from the rows on every read.
///
/// `gross_revenue` equals `cash_in` by definition in this model (every
/// cash-in is a sale); both are kept because they answer different
/// questions on the reports screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, Default)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct FinancialSummary {
    /// Σ Sale.amount
    pub cash_in_cents: i64,
    /// Σ StockEntry.amount
    pub cash_out_cents: i64,
    /// = cash_in
    pub gross_revenue_cents: i64,
    /// Σ StockEntry.amount + Σ TradeInEntry.amount
    pub stock_investment_cents: i64,
    /// Σ (Sale.amount − Sale.cost)
    pub realized_profit_cents: i64,
}

impl FinancialSummary {
    #[inline]
    pub fn cash_in(&self) -> Money {
        Money::from_cents(self.cash_in_cents)
    }

    #[inline]
    pub fn cash_out(&self) -> Money {
        Money::from_cents(self.cash_out_cents)
    }

    #[inline]
    pub fn realized_profit(&self) -> Money {
        Money::from_cents(self.realized_profit_cents)
    }
}

// =============================================================================
// Configuration Types
// =============================================================================

/// One row of the installment table: pay in `installments` parts at
/// `rate_bps` total interest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct InstallmentRule {
    pub installments: i64,
    /// Total interest in basis points (150 = 1.5%).
    pub rate_bps: i64,
}

impl InstallmentRule {
    #[inline]
    pub fn rate(&self) -> Percent {
        Percent::from_bps(self.rate_bps)
    }

    /// The shop's standard card table: 1× at 0%, then 1.5% per extra
    /// installment up to 12×.
    pub fn default_rules() -> Vec<InstallmentRule> {
        (1..=12)
            .map(|n| InstallmentRule {
                installments: n,
                rate_bps: (n - 1) * 150,
            })
            .collect()
    }
}

/// Persisted shop configuration. The engine never reads this implicitly;
/// callers load it and pass the values into the pure functions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(default)]
pub struct ShopSettings {
    /// Calculator prefill: courier fee in USD cents.
    pub default_fee_usd_cents: i64,
    /// Calculator prefill: spread over the commercial rate, thousandths.
    pub default_spread_milli: i64,
    /// Calculator prefill: import tax in BRL centavos.
    pub default_import_tax_cents: i64,
    /// Calculator prefill: margin in basis points.
    pub default_margin_bps: i64,
    /// Days until a proposal expires.
    pub expiration_days: i64,
    pub installment_rules: Vec<InstallmentRule>,
    /// Quote message template; `{produto}`, `{preco}` and `{parcelas}`
    /// are substituted (see [`crate::message`]).
    pub whatsapp_template: String,
}

impl Default for ShopSettings {
    fn default() -> Self {
        ShopSettings {
            default_fee_usd_cents: 0,
            default_spread_milli: 100,
            default_import_tax_cents: 0,
            default_margin_bps: 2_000,
            expiration_days: expiry::DEFAULT_EXPIRATION_DAYS,
            installment_rules: InstallmentRule::default_rules(),
            whatsapp_template: crate::message::DEFAULT_WHATSAPP_TEMPLATE.to_string(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_costs() -> CostInputs {
        CostInputs {
            cost_usd: Money::from_cents(90_000),
            fee_usd: Money::from_cents(2_000),
            exchange_rate: Rate::from_milli(5_200),
            spread: Rate::from_milli(100),
            import_tax: Money::from_cents(5_000),
        }
    }

    #[test]
    fn test_new_stock_computes_total() {
        let now = Utc::now();
        let item = ProductItem::new_stock("iPhone 15", "128GB", "Azul", &sample_costs(), now);
        assert_eq!(item.total_cost_cents, 492_600);
        assert!(!item.is_used);
        assert_eq!(item.status, StockStatus::InStock);
        assert_eq!(item.descriptor(), "iPhone 15 128GB Azul");
        assert_eq!(
            item.stock_entry_description(),
            "Compra estoque: iPhone 15 128GB Azul"
        );
    }

    #[test]
    fn test_used_item_keeps_cost_fields_zero() {
        let now = Utc::now();
        let item = ProductItem::used(
            "iPhone 12",
            "64GB",
            "Preto",
            Money::from_cents(150_000),
            Some(87),
            now,
        );
        assert!(item.is_used);
        assert_eq!(item.cost_usd_cents, 0);
        assert_eq!(item.exchange_rate_milli, 0);
        assert_eq!(item.total_cost_cents, 150_000);
        assert_eq!(item.battery_health, Some(87));
    }

    #[test]
    fn test_reservation_marker() {
        let now = Utc::now();
        let mut item = ProductItem::used(
            "iPhone 13",
            "128GB",
            "Branco",
            Money::from_cents(200_000),
            None,
            now,
        );
        assert!(!item.is_reserved());

        item.observation = Some(reservation_note("Maria Souza"));
        assert!(item.is_reserved());
        assert!(item.is_reserved_for("Maria Souza"));
        assert!(!item.is_reserved_for("João Silva"));
        assert!(!item.is_reserved_for(""));

        item.observation = Some("tela trocada em 2024".to_string());
        assert!(!item.is_reserved());
    }

    fn sample_proposal(now: DateTime<Utc>) -> Proposal {
        Proposal {
            id: "prop-1".to_string(),
            customer_name: "João".to_string(),
            customer_surname: "Silva".to_string(),
            customer_phone: "+55 11 99999-0000".to_string(),
            product_name: "iPhone 15 128GB Azul".to_string(),
            product_name_only: Some("iPhone 15".to_string()),
            product_memory: Some("128GB".to_string()),
            product_color: Some("Azul".to_string()),
            cost_usd_cents: 90_000,
            fee_usd_cents: 2_000,
            exchange_rate_milli: 5_200,
            spread_milli: 100,
            import_tax_cents: 5_000,
            total_cost_cents: 492_600,
            selling_price_cents: 591_120,
            created_at: now,
            origin: ProposalOrigin::Manual,
            product_id: None,
            status: ProposalStatus::Draft,
            sold_at: None,
            trade_in_name: None,
            trade_in_value_cents: None,
            trade_in_memory: None,
            trade_in_color: None,
            trade_in_battery: None,
        }
    }

    #[test]
    fn test_proposal_money_accessors() {
        let p = sample_proposal(Utc::now());
        assert_eq!(p.final_price().cents(), 591_120);
        assert_eq!(p.profit().cents(), 98_520);
        assert_eq!(p.margin(), Some(Percent::from_bps(2_000)));
        assert_eq!(p.customer_full_name(), "João Silva");
        assert_eq!(
            p.split_descriptor(),
            Some(("iPhone 15", "128GB", "Azul"))
        );
        assert!(!p.has_trade_in());
        assert!(p.trade_in_item(Utc::now()).is_none());
    }

    #[test]
    fn test_proposal_trade_in_changes_final_and_profit() {
        let mut p = sample_proposal(Utc::now());
        p.trade_in_name = Some("iPhone 11".to_string());
        p.trade_in_value_cents = Some(100_000);
        p.trade_in_battery = Some(81);

        assert_eq!(p.final_price().cents(), 491_120);
        assert_eq!(p.profit().cents(), -1_480);

        let item = p.trade_in_item(Utc::now()).unwrap();
        assert!(item.is_used);
        assert_eq!(item.name, "iPhone 11");
        assert_eq!(item.total_cost_cents, 100_000);
        assert_eq!(item.battery_health, Some(81));
        assert_eq!(item.status, StockStatus::InStock);
    }

    #[test]
    fn test_fresh_draft_resets_lifecycle() {
        let created = Utc::now();
        let mut p = sample_proposal(created);
        p.status = ProposalStatus::Ordered;
        p.product_id = Some("prod-9".to_string());

        let later = created + chrono::Duration::days(30);
        let draft = p.fresh_draft(later);

        assert_ne!(draft.id, p.id);
        assert_eq!(draft.created_at, later);
        assert_eq!(draft.status, ProposalStatus::Draft);
        assert_eq!(draft.product_id, None);
        assert_eq!(draft.sold_at, None);
        // the quote content survives
        assert_eq!(draft.selling_price_cents, p.selling_price_cents);
        assert_eq!(draft.customer_name, p.customer_name);
    }

    #[test]
    fn test_ledger_constructors() {
        let now = Utc::now();
        let entry = LedgerEntry::sale(
            "Venda: iPhone 15",
            Money::from_cents(491_120),
            Money::from_cents(492_600),
            "prop-1".to_string(),
            Money::from_cents(100_000),
            now,
        );
        assert_eq!(entry.kind, LedgerEntryKind::Sale);
        assert_eq!(entry.amount_cents, 491_120);
        assert_eq!(entry.cost_cents, Some(492_600));
        assert_eq!(entry.trade_in_value_cents, Some(100_000));
        assert_eq!(entry.related_id.as_deref(), Some("prop-1"));

        let no_trade = LedgerEntry::sale(
            "Venda",
            Money::from_cents(100),
            Money::from_cents(50),
            "p".to_string(),
            Money::zero(),
            now,
        );
        assert_eq!(no_trade.trade_in_value_cents, None);

        let stock = LedgerEntry::stock_entry("Compra estoque", Money::from_cents(10), None, now);
        assert_eq!(stock.kind, LedgerEntryKind::StockEntry);
        assert_eq!(stock.cost_cents, None);
    }

    #[test]
    fn test_default_installment_rules() {
        let rules = InstallmentRule::default_rules();
        assert_eq!(rules.len(), 12);
        assert_eq!(rules[0].installments, 1);
        assert_eq!(rules[0].rate_bps, 0);
        assert_eq!(rules[11].installments, 12);
        assert_eq!(rules[11].rate_bps, 1_650); // 16.5%
    }

    #[test]
    fn test_settings_defaults_and_partial_payload() {
        let settings = ShopSettings::default();
        assert_eq!(settings.expiration_days, 7);
        assert_eq!(settings.default_spread_milli, 100);
        assert_eq!(settings.default_margin_bps, 2_000);
        assert_eq!(settings.installment_rules.len(), 12);

        // Old payloads missing fields fall back to defaults field-by-field.
        let partial: ShopSettings =
            serde_json::from_str(r#"{"expiration_days": 10}"#).unwrap();
        assert_eq!(partial.expiration_days, 10);
        assert_eq!(partial.default_margin_bps, 2_000);
        assert!(!partial.whatsapp_template.is_empty());
    }
}
