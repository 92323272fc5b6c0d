use std::time::Duration;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Date format used by the vendor and by the stored configuration row.
pub const TRAVEL_DATE_FORMAT: &str = "%d%m%Y";

/// Runtime settings for one monitor invocation, supplied by the
/// environment (the scheduler passes no arguments).
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    pub database_url: String,
    pub telegram_token: String,
    pub telegram_chat_id: String,
    pub headless: bool,
    pub navigation_timeout: Duration,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            database_url: String::new(),
            telegram_token: String::new(),
            telegram_chat_id: String::new(),
            headless: true,
            navigation_timeout: Duration::from_secs(90),
        }
    }
}

impl MonitorConfig {
    pub fn new(
        database_url: impl Into<String>,
        telegram_token: impl Into<String>,
        telegram_chat_id: impl Into<String>,
    ) -> Self {
        Self {
            database_url: database_url.into(),
            telegram_token: telegram_token.into(),
            telegram_chat_id: telegram_chat_id.into(),
            ..Default::default()
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url =
            std::env::var("DATABASE_URL").map_err(|_| ConfigError::MissingVar("DATABASE_URL"))?;
        let telegram_token = std::env::var("TELEGRAM_TOKEN")
            .map_err(|_| ConfigError::MissingVar("TELEGRAM_TOKEN"))?;
        let telegram_chat_id = std::env::var("TELEGRAM_CHAT_ID")
            .map_err(|_| ConfigError::MissingVar("TELEGRAM_CHAT_ID"))?;

        Ok(Self::new(database_url, telegram_token, telegram_chat_id))
    }

    pub fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    pub fn with_navigation_timeout(mut self, timeout: Duration) -> Self {
        self.navigation_timeout = timeout;
        self
    }
}

/// One monitored itinerary, loaded from the dashboard-managed
/// `search_config` row. Read-only to the monitor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    pub travel_date: NaiveDate,
    pub origin_id: String,
    pub destination_id: String,
    pub adults: u32,
    pub children: u32,
    pub teens: u32,
    /// Departure hours worth watching (0-23). May wrap past midnight,
    /// e.g. `[22, 23, 0]`.
    pub target_hours: Vec<u32>,
    pub active: bool,
}

impl SearchConfig {
    /// Validates a raw `search_config` row. The stored travel date is
    /// `DDMMYYYY` text and the target hours a comma-separated list.
    #[allow(clippy::too_many_arguments)]
    pub fn from_stored(
        travel_date: &str,
        origin_id: String,
        destination_id: String,
        adults: i32,
        children: i32,
        teens: i32,
        target_hours: &str,
        active: bool,
    ) -> Result<Self, ConfigError> {
        let travel_date = NaiveDate::parse_from_str(travel_date, TRAVEL_DATE_FORMAT)
            .map_err(|e| ConfigError::Invalid(format!("travel_date {travel_date:?}: {e}")))?;

        let count = |name: &str, value: i32| -> Result<u32, ConfigError> {
            u32::try_from(value)
                .map_err(|_| ConfigError::Invalid(format!("{name} must be non-negative: {value}")))
        };

        Ok(Self {
            travel_date,
            origin_id,
            destination_id,
            adults: count("adults", adults)?,
            children: count("children", children)?,
            teens: count("teens", teens)?,
            target_hours: parse_target_hours(target_hours),
            active,
        })
    }
}

/// Parses the stored `"23,0,1"` hour list. Entries that are not integers
/// in 0-23 are skipped rather than failing the whole row.
pub fn parse_target_hours(raw: &str) -> Vec<u32> {
    raw.split(',')
        .filter_map(|part| part.trim().parse::<u32>().ok())
        .filter(|hour| *hour < 24)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_monitor_config_builder() {
        let config = MonitorConfig::new("postgres://db", "token", "chat")
            .with_headless(false)
            .with_navigation_timeout(Duration::from_secs(30));

        assert_eq!(config.database_url, "postgres://db");
        assert_eq!(config.telegram_token, "token");
        assert_eq!(config.telegram_chat_id, "chat");
        assert!(!config.headless);
        assert_eq!(config.navigation_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_monitor_config_defaults() {
        let config = MonitorConfig::new("db", "t", "c");
        assert!(config.headless);
        assert_eq!(config.navigation_timeout, Duration::from_secs(90));
    }

    #[test]
    fn test_parse_target_hours() {
        assert_eq!(parse_target_hours("23,0,1"), vec![23, 0, 1]);
        assert_eq!(parse_target_hours("8, 12 ,22"), vec![8, 12, 22]);
    }

    #[test]
    fn test_parse_target_hours_skips_junk() {
        assert_eq!(parse_target_hours("8, x, 23,"), vec![8, 23]);
        assert_eq!(parse_target_hours("24,25,7"), vec![7]);
        assert_eq!(parse_target_hours(""), Vec::<u32>::new());
    }

    #[test]
    fn test_search_config_from_stored() {
        let config = SearchConfig::from_stored(
            "10022026",
            "14245".into(),
            "14199".into(),
            3,
            0,
            0,
            "22,23,0",
            true,
        )
        .unwrap();

        assert_eq!(
            config.travel_date,
            NaiveDate::from_ymd_opt(2026, 2, 10).unwrap()
        );
        assert_eq!(config.origin_id, "14245");
        assert_eq!(config.destination_id, "14199");
        assert_eq!(config.adults, 3);
        assert_eq!(config.target_hours, vec![22, 23, 0]);
        assert!(config.active);
    }

    #[test]
    fn test_search_config_rejects_bad_date() {
        let result = SearchConfig::from_stored(
            "2026-02-10",
            "14245".into(),
            "14199".into(),
            1,
            0,
            0,
            "22",
            true,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_search_config_rejects_negative_count() {
        let result = SearchConfig::from_stored(
            "10022026",
            "14245".into(),
            "14199".into(),
            -1,
            0,
            0,
            "22",
            true,
        );
        assert!(result.is_err());
    }
}
