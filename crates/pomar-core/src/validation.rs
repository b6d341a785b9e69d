//! # Validation Module
//!
//! Business rule validation for pomar.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: UI forms                                                      │
//! │  ├── Basic format checks (empty, length)                                │
//! │  └── Immediate user feedback                                            │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Store call (Rust)                                             │
//! │  ├── Type validation (deserialization)                                  │
//! │  └── THIS MODULE: Business rule validation                              │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                             │
//! │  ├── NOT NULL constraints                                               │
//! │  └── Foreign key / unique constraints                                   │
//! │                                                                         │
//! │  Validation always runs BEFORE the first write of an operation, so a   │
//! │  rejected input leaves every store untouched.                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust,no_run
//! use pomar_core::validation::{validate_product_name, validate_battery_health};
//!
//! // Validate the model name before an inventory insert
//! validate_product_name("iPhone 15").unwrap();
//!
//! // Validate battery health for a used unit
//! validate_battery_health(Some(87)).unwrap();
//! ```

use crate::error::ValidationError;
use crate::money::{Money, Rate};
use crate::types::{InstallmentRule, ProductItem, Proposal, ShopSettings};
use crate::{MAX_NAME_LEN, MAX_OBSERVATION_LEN};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a product model name.
///
/// ## Rules
/// - Must not be empty (after trimming)
/// - Must be at most [`MAX_NAME_LEN`] bytes
///
/// ## Example
/// ```rust
/// use pomar_core::validation::validate_product_name;
///
/// assert!(validate_product_name("iPhone 15 Pro").is_ok());
/// assert!(validate_product_name("   ").is_err());
/// ```
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.len() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: MAX_NAME_LEN,
        });
    }

    Ok(())
}

/// Validates a storage size label ("128GB", "1TB").
///
/// ## Rules
/// - Must not be empty (after trimming)
/// - Must be at most 40 bytes
pub fn validate_memory(memory: &str) -> ValidationResult<()> {
    let memory = memory.trim();

    if memory.is_empty() {
        return Err(ValidationError::Required {
            field: "memory".to_string(),
        });
    }

    if memory.len() > 40 {
        return Err(ValidationError::TooLong {
            field: "memory".to_string(),
            max: 40,
        });
    }

    Ok(())
}

/// Validates a color label.
///
/// ## Rules
/// - Must not be empty (after trimming)
/// - Must be at most 60 bytes
pub fn validate_color(color: &str) -> ValidationResult<()> {
    let color = color.trim();

    if color.is_empty() {
        return Err(ValidationError::Required {
            field: "color".to_string(),
        });
    }

    if color.len() > 60 {
        return Err(ValidationError::TooLong {
            field: "color".to_string(),
            max: 60,
        });
    }

    Ok(())
}

/// Validates a customer first name on a proposal.
///
/// Surname and phone are optional (walk-in quotes often start with just
/// a first name), so only the first name is required.
pub fn validate_customer_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "customer_name".to_string(),
        });
    }

    if name.len() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: "customer_name".to_string(),
            max: MAX_NAME_LEN,
        });
    }

    Ok(())
}

/// Validates a free-form observation (may be absent or empty).
///
/// ## Rules
/// - `None` and empty strings are fine
/// - Maximum [`MAX_OBSERVATION_LEN`] bytes
pub fn validate_observation(observation: Option<&str>) -> ValidationResult<()> {
    if let Some(obs) = observation {
        if obs.len() > MAX_OBSERVATION_LEN {
            return Err(ValidationError::TooLong {
                field: "observation".to_string(),
                max: MAX_OBSERVATION_LEN,
            });
        }
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates the exchange rate for a new-stock item.
///
/// ## Rules
/// - Must be positive (> 0)
///
/// Used items are bought in BRL directly and never pass through here.
pub fn validate_exchange_rate(rate: Rate) -> ValidationResult<()> {
    if !rate.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: "exchange_rate".to_string(),
        });
    }

    Ok(())
}

/// Validates a battery health percentage for a used unit.
///
/// ## Rules
/// - `None` is fine (battery not measured)
/// - Must be between 0 and 100 when present
///
/// ## Example
/// ```rust
/// use pomar_core::validation::validate_battery_health;
///
/// assert!(validate_battery_health(None).is_ok());
/// assert!(validate_battery_health(Some(87)).is_ok());
/// assert!(validate_battery_health(Some(101)).is_err());
/// ```
pub fn validate_battery_health(health: Option<i64>) -> ValidationResult<()> {
    if let Some(pct) = health {
        if !(0..=100).contains(&pct) {
            return Err(ValidationError::OutOfRange {
                field: "battery_health".to_string(),
                min: 0,
                max: 100,
            });
        }
    }

    Ok(())
}

/// Validates an agreed selling price.
///
/// ## Rules
/// - Must be positive (> 0); a quote for zero is always a data-entry error
pub fn validate_selling_price(price: Money) -> ValidationResult<()> {
    if !price.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: "selling_price".to_string(),
        });
    }

    Ok(())
}

/// Validates a trade-in allowance in cents.
///
/// ## Rules
/// - `None` is fine (no trade-in)
/// - Must be non-negative; zero is treated as "no trade-in" downstream
pub fn validate_trade_in_value(cents: Option<i64>) -> ValidationResult<()> {
    if let Some(v) = cents {
        if v < 0 {
            return Err(ValidationError::OutOfRange {
                field: "trade_in_value".to_string(),
                min: 0,
                max: i64::MAX,
            });
        }
    }

    Ok(())
}

/// Validates the proposal expiration window in days.
///
/// ## Rules
/// - Must be non-negative; zero means "expires the instant it ages at all"
pub fn validate_expiration_days(days: i64) -> ValidationResult<()> {
    if days < 0 {
        return Err(ValidationError::OutOfRange {
            field: "expiration_days".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates an installment rule table.
///
/// ## Rules
/// - Every row needs a positive installment count
/// - Interest cannot be negative
pub fn validate_installment_rules(rules: &[InstallmentRule]) -> ValidationResult<()> {
    for rule in rules {
        if rule.installments <= 0 {
            return Err(ValidationError::MustBePositive {
                field: "installments".to_string(),
            });
        }
        if rule.rate_bps < 0 {
            return Err(ValidationError::OutOfRange {
                field: "installment_rate".to_string(),
                min: 0,
                max: i64::MAX,
            });
        }
    }

    Ok(())
}

// =============================================================================
// Composite Validators
// =============================================================================

/// Validates a product item before it is inserted into inventory.
///
/// ## User Workflow
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Inventory: New Item                                                    │
/// │                                                                         │
/// │  User fills name / memory / color / costs                               │
/// │       │                                                                 │
/// │       ▼                                                                 │
/// │  validate_product(&item) ← THIS FUNCTION                                │
/// │       │                                                                 │
/// │       ├── name empty?          → Error: "name is required"              │
/// │       ├── memory empty?        → Error: "memory is required"            │
/// │       ├── color empty?         → Error: "color is required"             │
/// │       ├── new + rate <= 0?     → Error: "exchange_rate must be          │
/// │       │                                  positive"                      │
/// │       ├── battery out of 0-100 → Error                                  │
/// │       │                                                                 │
/// │       └── OK → insert item + stock ledger entry (one transaction)       │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub fn validate_product(item: &ProductItem) -> ValidationResult<()> {
    validate_product_name(&item.name)?;
    validate_memory(&item.memory)?;
    validate_color(&item.color)?;
    validate_observation(item.observation.as_deref())?;

    if !item.is_used {
        validate_exchange_rate(item.exchange_rate())?;
    }
    validate_battery_health(item.battery_health)?;

    Ok(())
}

/// Validates a proposal before it is saved.
pub fn validate_proposal(proposal: &Proposal) -> ValidationResult<()> {
    validate_customer_name(&proposal.customer_name)?;
    validate_product_name(&proposal.product_name)?;
    validate_selling_price(proposal.selling_price())?;
    validate_trade_in_value(proposal.trade_in_value_cents)?;
    validate_battery_health(proposal.trade_in_battery)?;

    Ok(())
}

/// Validates shop settings before they are persisted.
pub fn validate_settings(settings: &ShopSettings) -> ValidationResult<()> {
    validate_expiration_days(settings.expiration_days)?;
    validate_installment_rules(&settings.installment_rules)?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
