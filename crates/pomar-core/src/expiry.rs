//! # Proposal Expiration
//!
//! Expiration is a pure predicate over `(created_at, expiration_days, now)`.
//! It is never stored, never cached: a proposal's row does not change when
//! it expires, readers just start seeing it differently. That keeps the
//! state machine honest — there is no background job to miss and no stale
//! flag to reconcile.

use chrono::{DateTime, Utc};

/// Milliseconds in a day, the unit the age comparison runs in.
pub const MS_PER_DAY: i64 = 86_400_000;

/// How long a quote stays valid unless configured otherwise.
pub const DEFAULT_EXPIRATION_DAYS: i64 = 7;

/// Whether a proposal created at `created_at` is expired at `now`.
///
/// Strictly greater-than: at exactly `expiration_days` of age the proposal
/// is still alive; one millisecond later it is not. `expiration_days = 0`
/// therefore expires anything older than the same instant.
pub fn is_expired(created_at: DateTime<Utc>, now: DateTime<Utc>, expiration_days: i64) -> bool {
    let age_ms = now.timestamp_millis() - created_at.timestamp_millis();
    age_ms > expiration_days * MS_PER_DAY
}
