//! # pomar-rates: USD→BRL Quote Source for the Pomar Shop Engine
//!
//! Every price in the engine starts from the commercial dollar. This crate
//! fetches that quote; it does nothing else.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   AwesomeAPI (economia.awesomeapi.com.br)                               │
//! │       │  GET /last/USD-BRL                                              │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    pomar-rates (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   RateSource (trait) ──► AwesomeApiSource   retry + backoff     │   │
//! │  │                     └──► FixedRateSource    tests / offline     │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  RateQuote { rate: Rate, source } ──► app layer ──► CostInputs          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The engine never blocks on this crate. A fetch that fails (or returns
//! `Ok(None)`) means the operator types the rate in by hand, exactly as the
//! shop worked before the integration existed.

use async_trait::async_trait;
use pomar_core::money::Rate;
use std::fmt;
use thiserror::Error;

pub mod awesome;
pub mod fixed;

pub use awesome::AwesomeApiSource;
pub use fixed::FixedRateSource;

// =============================================================================
// Quote Type
// =============================================================================

/// A fetched USD→BRL quote.
///
/// `source` names where the number came from (for display next to the rate
/// field); `None` means the origin is unknown or irrelevant, as with a
/// manually keyed rate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateQuote {
    /// The commercial rate, in thousandths (`5.204 → 5204`).
    pub rate: Rate,
    /// Human-readable origin, e.g. `"AwesomeAPI"`.
    pub source: Option<String>,
}

// =============================================================================
// Source Trait
// =============================================================================

/// A provider of USD→BRL quotes.
///
/// Implementations own their retry policy; by the time `fetch_usd_brl`
/// returns an error, the failure is final for this attempt.
///
/// `Ok(None)` means the source is healthy but has no quote to offer —
/// callers fall back to manual rate entry, they do not retry.
#[async_trait]
pub trait RateSource: Send + Sync + fmt::Debug {
    /// Fetch the current commercial USD→BRL rate.
    async fn fetch_usd_brl(&self) -> Result<Option<RateQuote>, RateError>;
}

// =============================================================================
// Errors
// =============================================================================

/// Quote-fetch errors.
///
/// The distinction matters for the operator-facing message: `Http` means the
/// network is unhappy, `Status` means the service answered and refused,
/// `Malformed` means the service answered nonsense.
#[derive(Debug, Clone, Error)]
pub enum RateError {
    /// The request never completed (DNS, connect, timeout).
    #[error("Rate request failed: {0}")]
    Http(String),

    /// The service responded with a non-success status.
    #[error("Rate service returned HTTP {status}")]
    Status { status: u16 },

    /// The response body was not the expected payload.
    #[error("Malformed rate payload: {0}")]
    Malformed(String),
}

/// Result type for quote fetches.
pub type RateResult<T> = Result<T, RateError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_error_display() {
        let err = RateError::Http("connection timed out".to_string());
        assert_eq!(err.to_string(), "Rate request failed: connection timed out");

        let err = RateError::Status { status: 503 };
        assert_eq!(err.to_string(), "Rate service returned HTTP 503");

        let err = RateError::Malformed("bid is not a string".to_string());
        assert_eq!(
            err.to_string(),
            "Malformed rate payload: bid is not a string"
        );
    }

    #[test]
    fn test_rate_quote_eq() {
        let quote = RateQuote {
            rate: Rate::from_milli(5_204),
            source: Some("AwesomeAPI".to_string()),
        };
        assert_eq!(quote.clone(), quote);
    }
}
