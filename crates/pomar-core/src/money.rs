//! # Money Module
//!
//! Provides the `Money`, `Rate` and `Percent` types used by every pricing
//! formula in the engine.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                         │
//! │                                                                     │
//! │  In JavaScript/floating point:                                      │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                       │
//! │                                                                     │
//! │  A phone quote walks through four multiplications before it         │
//! │  reaches the customer. Binary floats drift a centavo at a time.     │
//! │                                                                     │
//! │  OUR SOLUTION: Integer minor units                                  │
//! │    Money   = i64 cents/centavos                                     │
//! │    Rate    = i64 thousandths   (5.20  → 5200)                       │
//! │    Percent = i64 basis points  (20%   → 2000)                       │
//! │    Intermediates in i128, division rounds half away from zero       │
//! │                                                                     │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use pomar_core::money::{Money, Rate};
//!
//! // USD 920.00 converted at an effective rate of 5.300
//! let base = Money::from_cents(92_000);
//! let brl = base.mul_rate(Rate::from_milli(5_300));
//! assert_eq!(brl.cents(), 487_600); // R$ 4.876,00
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

/// Integer division rounding half away from zero. `denom` must be positive.
pub(crate) fn div_round(numer: i128, denom: i128) -> i64 {
    let half = denom / 2;
    let q = if numer >= 0 {
        (numer + half) / denom
    } else {
        (numer - half) / denom
    };
    q as i64
}

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit.
///
/// The same type carries both currencies in play: device costs quoted in USD
/// cents and everything else in BRL centavos. Struct fields say which one
/// they hold (`cost_usd_cents`, `total_cost_cents`); the arithmetic is
/// identical.
///
/// ## Design Decisions
/// - **i64 (signed)**: profit can go negative when a trade-in eats the margin
/// - **Single field tuple struct**: zero-cost abstraction over i64
/// - **Serializes as a bare integer**: what the database and frontend see
///
/// ## Where Money flows
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────┐
/// │  cost_usd + fee_usd ──► base_usd ──► × effective rate ──► + tax     │
/// │                                                            │        │
/// │        total_cost ◄────────────────────────────────────────┘        │
/// │             │                                                       │
/// │             ▼                                                       │
/// │        × (1 + margin) ──► selling_price ──► − trade_in ──► final    │
/// │                                                            │        │
/// │        ledger amounts, installments, profit ◄──────────────┘        │
/// └─────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from minor units (cents / centavos).
    ///
    /// ## Example
    /// ```rust
    /// use pomar_core::money::Money;
    ///
    /// let price = Money::from_cents(492_600); // R$ 4.926,00
    /// assert_eq!(price.cents(), 492_600);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from major and minor units.
    ///
    /// For negative amounts only the major unit carries the sign:
    /// `from_major_minor(-14, 80)` is −14,80.
    ///
    /// ## Example
    /// ```rust
    /// use pomar_core::money::Money;
    ///
    /// let tax = Money::from_major_minor(50, 0);
    /// assert_eq!(tax.cents(), 5_000);
    ///
    /// let loss = Money::from_major_minor(-14, 80);
    /// assert_eq!(loss.cents(), -1_480);
    /// ```
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        if major < 0 {
            Money(major * 100 - minor)
        } else {
            Money(major * 100 + minor)
        }
    }

    /// Returns the value in minor units.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit portion (reais or dollars).
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns the absolute value.
    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Converts a USD amount to BRL at the given rate.
    ///
    /// Integer math throughout: `cents × milli / 1000`, i128 intermediate,
    /// rounded half away from zero. The quoted rates carry three decimal
    /// places, so real-world conversions land exactly.
    ///
    /// ## Example
    /// ```rust
    /// use pomar_core::money::{Money, Rate};
    ///
    /// let base = Money::from_cents(92_000);       // USD 920.00
    /// let rate = Rate::from_milli(5_300);         // 5.300 BRL/USD
    /// assert_eq!(base.mul_rate(rate).cents(), 487_600);
    /// ```
    pub fn mul_rate(&self, rate: Rate) -> Money {
        Money(div_round(self.0 as i128 * rate.milli() as i128, 1_000))
    }

    /// Applies a percentage markup: `amount × (1 + percent)`.
    ///
    /// A negative `Percent` prices below the base, which is legal — the
    /// reverse-margin computation can produce it when an item sells under
    /// cost.
    ///
    /// ## Example
    /// ```rust
    /// use pomar_core::money::{Money, Percent};
    ///
    /// let cost = Money::from_cents(492_600);      // R$ 4.926,00
    /// let price = cost.with_markup(Percent::from_bps(2_000)); // +20%
    /// assert_eq!(price.cents(), 591_120);         // R$ 5.911,20
    /// ```
    pub fn with_markup(&self, percent: Percent) -> Money {
        Money(div_round(
            self.0 as i128 * (10_000 + percent.bps()) as i128,
            10_000,
        ))
    }

    /// Splits an amount into `parts` equal installments, rounded.
    ///
    /// The remainder cent is not redistributed; the loss is documented in
    /// the tests the same way the division below documents it:
    /// R$ 10,00 / 3 = R$ 3,33 and one centavo is gone.
    pub fn split(&self, parts: i64) -> Money {
        debug_assert!(parts > 0);
        Money(div_round(self.0 as i128, parts as i128))
    }
}

// =============================================================================
// Rate Type (exchange rates, thousandths)
// =============================================================================

/// An exchange rate with three decimal places: `5.20 → Rate(5200)`.
///
/// Three decimals match the quote precision the shop actually works with —
/// the commercial dollar plus the street spread — and keep every conversion
/// in integer math.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS, Default,
)]
#[ts(export)]
pub struct Rate(i64);

impl Rate {
    #[inline]
    pub const fn from_milli(milli: i64) -> Self {
        Rate(milli)
    }

    #[inline]
    pub const fn milli(&self) -> i64 {
        self.0
    }

    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Parses a decimal string (`"5.20"`, `"5.4321"`, `".5"`) into a rate.
    ///
    /// Keeps four fractional digits so the fourth can round the third;
    /// returns `None` for anything that is not an unsigned decimal number.
    ///
    /// ## Example
    /// ```rust
    /// use pomar_core::money::Rate;
    ///
    /// assert_eq!(Rate::from_str_decimal("5.20"), Some(Rate::from_milli(5_200)));
    /// assert_eq!(Rate::from_str_decimal("5.4326"), Some(Rate::from_milli(5_433)));
    /// assert_eq!(Rate::from_str_decimal("abc"), None);
    /// ```
    pub fn from_str_decimal(s: &str) -> Option<Rate> {
        let s = s.trim();
        if s.is_empty() {
            return None;
        }
        let (int_part, frac_part) = match s.split_once('.') {
            Some((i, f)) => (i, f),
            None => (s, ""),
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return None;
        }
        if !int_part.chars().all(|c| c.is_ascii_digit())
            || !frac_part.chars().all(|c| c.is_ascii_digit())
        {
            return None;
        }
        let whole: i64 = if int_part.is_empty() {
            0
        } else {
            int_part.parse().ok()?
        };
        let mut frac4: i64 = 0;
        for (i, c) in frac_part.chars().take(4).enumerate() {
            frac4 += (c as i64 - '0' as i64) * 10i64.pow(3 - i as u32);
        }
        let milli = whole.checked_mul(1_000)?.checked_add((frac4 + 5) / 10)?;
        Some(Rate(milli))
    }
}

/// Rates render with their full three decimals: `5.300`.
impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:03}", self.0 / 1_000, (self.0 % 1_000).abs())
    }
}

/// Adding a spread to a base rate yields the effective rate.
impl Add for Rate {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Rate(self.0 + other.0)
    }
}

// =============================================================================
// Percent Type (margins and installment interest, basis points)
// =============================================================================

/// A percentage in basis points: `20% → Percent(2000)`, `1.5% → Percent(150)`.
///
/// Signed, because the reverse-margin computation reports negative margins
/// for items sold under cost.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS, Default,
)]
#[ts(export)]
pub struct Percent(i64);

impl Percent {
    #[inline]
    pub const fn from_bps(bps: i64) -> Self {
        Percent(bps)
    }

    #[inline]
    pub const fn bps(&self) -> i64 {
        self.0
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Display-layer convenience: builds a percent from a float, rounding to
    /// the nearest basis point. The engine itself never goes through floats.
    pub fn from_percent_f64(percent: f64) -> Self {
        Percent((percent * 100.0).round() as i64)
    }

    /// The percentage as a float, for display only.
    pub fn percent_f64(&self) -> f64 {
        self.0 as f64 / 100.0
    }
}

impl fmt::Display for Percent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 % 100 == 0 {
            write!(f, "{}%", self.0 / 100)
        } else {
            write!(f, "{}%", self.percent_f64())
        }
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Renders the Brazilian presentation format: `R$ 4.926,00`, `-R$ 14,80`.
///
/// The WhatsApp quote messages are assembled engine-side, so unlike a
/// debug-only formatter this one is load-bearing and locale-correct.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let digits = self.major().abs().to_string();
        let len = digits.len();
        let mut grouped = String::with_capacity(len + len / 3);
        for (i, c) in digits.chars().enumerate() {
            if i > 0 && (len - i) % 3 == 0 {
                grouped.push('.');
            }
            grouped.push(c);
        }
        write!(f, "{}R$ {},{:02}", sign, grouped, self.cents_part())
    }
}

/// Default money is zero.
impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

/// Addition of two Money values.
impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

/// Addition assignment (+=).
impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

/// Subtraction of two Money values.
impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

/// Subtraction assignment (-=).
impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

/// Multiplication by an integer count (installment totals in tests).
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, count: i64) -> Self {
        Money(self.0 * count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
