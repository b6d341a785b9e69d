//! # Settings Repository
//!
//! The global settings document: one row, JSON payload.
//!
//! ## Storage Model
//! A single `settings` row with id `'global'` holds the whole
//! [`ShopSettings`] struct as JSON. Fields added in later versions
//! deserialize with their defaults (`#[serde(default)]` on the struct),
//! so old payloads keep working without a migration.
//!
//! A payload that fails to parse is logged and replaced by defaults at
//! read time: settings must never keep the shop from opening. The broken
//! payload stays on disk until the next save overwrites it.

use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};
use tracing::{debug, warn};

use pomar_core::types::ShopSettings;
use pomar_core::validation::validate_settings;

use crate::batch::{self, WriteBatch, WriteOp};
use crate::error::StoreResult;
use crate::watch::Feeds;

const GLOBAL_ID: &str = "global";

/// Loads the settings document, falling back to defaults when the row is
/// missing or unreadable. Shared by the repository and the settings feed.
pub(crate) async fn fetch(pool: &SqlitePool) -> StoreResult<ShopSettings> {
    let row = sqlx::query("SELECT payload FROM settings WHERE id = ?")
        .bind(GLOBAL_ID)
        .fetch_optional(pool)
        .await?;

    let Some(row) = row else {
        return Ok(ShopSettings::default());
    };

    let payload: String = row.get("payload");
    match serde_json::from_str(&payload) {
        Ok(settings) => Ok(settings),
        Err(err) => {
            warn!(error = %err, "settings payload unreadable; using defaults");
            Ok(ShopSettings::default())
        }
    }
}

/// Repository for the settings document.
#[derive(Debug, Clone)]
pub struct SettingsRepository {
    pool: SqlitePool,
    feeds: Feeds,
}

impl SettingsRepository {
    pub(crate) fn new(pool: SqlitePool, feeds: Feeds) -> Self {
        SettingsRepository { pool, feeds }
    }

    /// Loads the current settings (defaults when never saved).
    pub async fn load(&self) -> StoreResult<ShopSettings> {
        fetch(&self.pool).await
    }

    /// Persists the settings document.
    pub async fn save(
        &self,
        settings: ShopSettings,
        now: DateTime<Utc>,
    ) -> StoreResult<ShopSettings> {
        validate_settings(&settings)?;

        debug!(
            expiration_days = settings.expiration_days,
            rules = settings.installment_rules.len(),
            "saving settings"
        );

        let batch = WriteBatch::single(WriteOp::PutSettings {
            settings: settings.clone(),
            updated_at: now,
        });
        batch::apply_and_publish(&self.pool, &self.feeds, &batch).await?;

        Ok(settings)
    }
}
