//! # pomar-core: Pure Business Logic for the Pomar Shop Engine
//!
//! This crate is the **heart** of pomar. It contains the pricing and
//! transaction rules of an imported-phone resale shop as pure functions
//! with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Pomar Architecture                               │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    App / UI layer                               │   │
//! │  │    Calculator ──► Inventory ──► Proposals ──► Reports          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 pomar-db (Store + Checkout)                     │   │
//! │  │      SQLite repositories, write batches, watch feeds            │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ pomar-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   money   │  │  pricing  │  │   types   │  │ validation│  │   │
//! │  │   │   Money   │  │ cost walk │  │  Product  │  │   rules   │  │   │
//! │  │   │ Rate/Pct  │  │  quotes   │  │ Proposal  │  │  checks   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO CLOCK READS • PURE FUNCTIONS       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - Money / Rate / Percent with integer arithmetic (no floats!)
//! - [`pricing`] - The cost walk: USD cost → landed cost → price → installments
//! - [`types`] - Domain types (ProductItem, Proposal, LedgerEntry, settings)
//! - [`expiry`] - Derived proposal expiration
//! - [`message`] - WhatsApp quote message rendering
//! - [`validation`] - Business rule validation
//! - [`error`] - Domain error types
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network and file system access is FORBIDDEN here; even
//!    `Utc::now()` is forbidden - callers pass `now` in
//! 3. **Integer Money**: BRL centavos / USD cents as i64, rates in thousandths,
//!    margins in basis points
//! 4. **Explicit Errors**: All errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use pomar_core::money::{Money, Rate};
//! use pomar_core::pricing::{self, CostInputs};
//!
//! // A US$ 900.00 phone with US$ 20.00 courier fee, bought at 5.20 + 0.10
//! // spread, plus R$ 50.00 import tax:
//! let costs = CostInputs {
//!     cost_usd: Money::from_cents(90_000),
//!     fee_usd: Money::from_cents(2_000),
//!     exchange_rate: Rate::from_milli(5_200),
//!     spread: Rate::from_milli(100),
//!     import_tax: Money::from_cents(5_000),
//! };
//!
//! // Landed cost: (900 + 20) × 5.30 + 50 = R$ 4.926,00
//! let total = pricing::total_cost(&costs);
//! assert_eq!(total.cents(), 492_600);
//! assert_eq!(total.to_string(), "R$ 4.926,00");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod expiry;
pub mod message;
pub mod money;
pub mod pricing;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use pomar_core::Money` instead of
// `use pomar_core::money::Money`

pub use error::{CoreError, CoreResult, StateError, ValidationError};
pub use money::{Money, Percent, Rate};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum length (bytes) for names: product models, customers.
///
/// ## Business Reason
/// The longest real descriptor on record is under 60 bytes; 120 leaves
/// headroom while still catching a paste of the wrong clipboard.
pub const MAX_NAME_LEN: usize = 120;

/// Maximum length (bytes) for free-form observations.
///
/// ## Business Reason
/// Observations hold short condition notes and reservation markers, not
/// essays. Bounding them keeps list payloads small.
pub const MAX_OBSERVATION_LEN: usize = 500;
