//! # Pricing Calculator
//!
//! The pure formulas behind every quote the shop gives.
//!
//! ## The cost walk
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  cost_usd  900.00                                                   │
//! │  fee_usd  +  20.00 ─────────► base_usd            920.00            │
//! │                                                                     │
//! │  rate 5.20 + spread 0.10 ───► effective_rate       5.300            │
//! │                                                                     │
//! │  base × rate + import_tax ──► total_cost      R$ 4.926,00           │
//! │  total × (1 + 20%) ─────────► selling_price   R$ 5.911,20           │
//! │  selling − trade_in ────────► final_price     (floored at 0)        │
//! │  final − total_cost ────────► profit          (signed)              │
//! │  final × (1 + i%) / n ──────► installment value per parcel          │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Everything here is a total function over integers: no I/O, no clocks,
//! no floats. Used items skip the walk's first half — their landed cost is
//! entered directly (see [`quote_for_cost`]).
//!
//! Profit is measured after the trade-in deduction on purpose: the traded
//! device enters stock at its allowance value and only pays back when it
//! resells, so the cash profit of the original deal can go negative.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::{div_round, Money, Percent, Rate};
use crate::types::InstallmentRule;

// =============================================================================
// Calculator Inputs
// =============================================================================

/// The cost side of a quote for a new (imported) device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CostInputs {
    /// Device cost in USD.
    pub cost_usd: Money,
    /// Courier/import fee in USD.
    pub fee_usd: Money,
    /// Commercial exchange rate.
    pub exchange_rate: Rate,
    /// Spread charged over the commercial rate.
    pub spread: Rate,
    /// Import tax, already in BRL.
    pub import_tax: Money,
}

// =============================================================================
// Formulas
// =============================================================================

/// The rate a purchase actually converts at: commercial rate plus spread.
#[inline]
pub fn effective_rate(rate: Rate, spread: Rate) -> Rate {
    rate + spread
}

/// USD subtotal before conversion: device cost plus fee.
#[inline]
pub fn base_usd(cost_usd: Money, fee_usd: Money) -> Money {
    cost_usd + fee_usd
}

/// Landed cost in BRL: `base_usd × effective_rate + import_tax`.
pub fn total_cost(inputs: &CostInputs) -> Money {
    let rate = effective_rate(inputs.exchange_rate, inputs.spread);
    base_usd(inputs.cost_usd, inputs.fee_usd).mul_rate(rate) + inputs.import_tax
}

/// Price asked of the customer: `total_cost × (1 + margin)`.
#[inline]
pub fn selling_price(total_cost: Money, margin: Percent) -> Money {
    total_cost.with_markup(margin)
}

/// What the customer pays after a trade-in, floored at zero.
#[inline]
pub fn final_price(selling_price: Money, trade_in_value: Money) -> Money {
    (selling_price - trade_in_value).max(Money::zero())
}

/// Deal profit after the trade-in deduction. Signed: a generous trade-in
/// allowance can push it below zero.
#[inline]
pub fn profit(final_price: Money, total_cost: Money) -> Money {
    final_price - total_cost
}

/// The margin implied by an agreed price: `(selling/total − 1) × 100`.
///
/// Returns `None` when the cost snapshot is not positive — for used items
/// entered without a cost there is no meaningful margin to report.
pub fn margin_for_price(selling_price: Money, total_cost: Money) -> Option<Percent> {
    if !total_cost.is_positive() {
        return None;
    }
    let diff = (selling_price - total_cost).cents() as i128;
    Some(Percent::from_bps(div_round(
        diff * 10_000,
        total_cost.cents() as i128,
    )))
}

/// Total card price for a rule: `base × (1 + rate)`.
#[inline]
pub fn installment_total(base: Money, rule: &InstallmentRule) -> Money {
    base.with_markup(rule.rate())
}

/// Per-parcel value: `base × (1 + rate) / n`.
///
/// `base` is the post-trade-in final price — parcels are computed on what
/// the customer actually owes, not on the sticker price.
pub fn installment_value(base: Money, rule: &InstallmentRule) -> Money {
    installment_total(base, rule).split(rule.installments)
}

// =============================================================================
// Composite Quote
// =============================================================================

/// One rendered row of the installment table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct InstallmentQuote {
    pub installments: i64,
    pub rate_bps: i64,
    pub value_cents: i64,
    pub total_cents: i64,
}

impl InstallmentQuote {
    #[inline]
    pub fn value(&self) -> Money {
        Money::from_cents(self.value_cents)
    }
}

/// Everything a consumer needs to present or message a quote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Quote {
    pub total_cost_cents: i64,
    pub selling_price_cents: i64,
    pub trade_in_value_cents: i64,
    pub final_price_cents: i64,
    pub profit_cents: i64,
    pub installments: Vec<InstallmentQuote>,
}

impl Quote {
    #[inline]
    pub fn selling_price(&self) -> Money {
        Money::from_cents(self.selling_price_cents)
    }

    #[inline]
    pub fn final_price(&self) -> Money {
        Money::from_cents(self.final_price_cents)
    }

    #[inline]
    pub fn profit(&self) -> Money {
        Money::from_cents(self.profit_cents)
    }
}

/// Assembles a full quote from cost inputs (new devices).
pub fn quote(
    inputs: &CostInputs,
    margin: Percent,
    trade_in_value: Money,
    rules: &[InstallmentRule],
) -> Quote {
    quote_for_cost(total_cost(inputs), margin, trade_in_value, rules)
}

/// Assembles a full quote from a directly-entered landed cost (used
/// devices, or re-quotes from a stored snapshot).
pub fn quote_for_cost(
    total_cost: Money,
    margin: Percent,
    trade_in_value: Money,
    rules: &[InstallmentRule],
) -> Quote {
    let selling = selling_price(total_cost, margin);
    let final_p = final_price(selling, trade_in_value);
    let installments = rules
        .iter()
        .map(|rule| InstallmentQuote {
            installments: rule.installments,
            rate_bps: rule.rate_bps,
            value_cents: installment_value(final_p, rule).cents(),
            total_cents: installment_total(final_p, rule).cents(),
        })
        .collect();
    Quote {
        total_cost_cents: total_cost.cents(),
        selling_price_cents: selling.cents(),
        trade_in_value_cents: trade_in_value.cents(),
        final_price_cents: final_p.cents(),
        profit_cents: profit(final_p, total_cost).cents(),
        installments,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
