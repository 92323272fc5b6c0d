//! Fare ledger: the single persisted fare-state row.
//!
//! One logical record per monitored itinerary, mutated in place — the
//! "history" is the last observed state, not an append-only log. The
//! `search_config` row lives in the same database and is written by the
//! configuration dashboard; the monitor only reads it.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};
use tracing::info;

use crate::config::SearchConfig;
use crate::error::LedgerError;

/// Last known fare and when it was written. `fare` is null until the
/// first successful observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FareRecord {
    pub fare: Option<f64>,
    pub updated_at: Option<DateTime<Utc>>,
}

pub struct FareLedger {
    pool: PgPool,
}

impl FareLedger {
    /// Connects the pool. A failure here is fatal to the run.
    pub async fn connect(database_url: &str) -> Result<Self, LedgerError> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(database_url)
            .await?;

        Ok(Self { pool })
    }

    /// Applies the embedded schema migrations. Idempotent against a
    /// database the dashboard already seeded.
    pub async fn migrate(&self) -> Result<(), LedgerError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    /// Reads and validates the dashboard-managed search configuration
    /// (row id=1). A missing or invalid row aborts the run.
    pub async fn load_search_config(&self) -> Result<SearchConfig, LedgerError> {
        let row = sqlx::query(
            "SELECT travel_date, origin_id, destiny_id, adults, children, teens, \
                    target_hours, active \
             FROM search_config WHERE id = 1",
        )
        .fetch_optional(&self.pool)
        .await?
        .ok_or(LedgerError::MissingConfig)?;

        let config = SearchConfig::from_stored(
            &row.try_get::<String, _>("travel_date")?,
            row.try_get("origin_id")?,
            row.try_get("destiny_id")?,
            row.try_get("adults")?,
            row.try_get("children")?,
            row.try_get("teens")?,
            &row.try_get::<String, _>("target_hours")?,
            row.try_get("active")?,
        )?;

        Ok(config)
    }

    /// Last known fare, or `None` before the first run ever completed.
    pub async fn last_fare(&self) -> Result<Option<FareRecord>, LedgerError> {
        let row = sqlx::query("SELECT price, register_date FROM price_history WHERE id = 1")
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        Ok(Some(FareRecord {
            fare: row.try_get("price")?,
            updated_at: row.try_get("register_date")?,
        }))
    }

    /// Writes the fare and stamps the row with the current instant.
    /// Upserts so a fresh database works without a seeded row.
    pub async fn save_fare(&self, fare: f64) -> Result<(), LedgerError> {
        sqlx::query(
            "INSERT INTO price_history (id, price, register_date) \
             VALUES (1, $1, NOW()) \
             ON CONFLICT (id) DO UPDATE \
             SET price = EXCLUDED.price, register_date = EXCLUDED.register_date",
        )
        .bind(fare)
        .execute(&self.pool)
        .await?;

        info!(fare, "fare ledger updated");
        Ok(())
    }
}
