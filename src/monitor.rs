//! Run orchestrator: fetch → extract → compare → (notify) → persist.
//!
//! One run per process invocation, no internal retry loop — the retry
//! cadence belongs to the external scheduler. Fetch and extraction
//! failures are expected, recurring outcomes; only ledger failures are
//! fatal.

use tracing::{error, info, warn};

use crate::config::MonitorConfig;
use crate::error::LedgerError;
use crate::extract::extract_min_fare;
use crate::fetch::PageFetcher;
use crate::ledger::FareLedger;
use crate::notify::{AlertEvent, TelegramNotifier};
use crate::query::build_search_url;
use crate::traits::Fetcher;

/// How one monitor run ended.
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// Fetch failed or no target-hour departure had an available fare.
    /// The ledger is untouched.
    NoData,
    /// The search configuration is switched off; nothing was fetched.
    Disabled,
    /// No prior fare existed; the quote was recorded without an alert.
    FirstObservation { fare: f64 },
    /// The fare dropped. `alerted` records whether the Telegram send
    /// actually went out — a failed send never blocks the ledger write.
    PriceDrop {
        old_fare: f64,
        new_fare: f64,
        alerted: bool,
    },
    /// The fare rose; the ledger is updated, no alert.
    PriceRose { old_fare: f64, new_fare: f64 },
    /// Same fare as last run; no write, so the timestamp keeps the moment
    /// of the last actual change.
    Unchanged { fare: f64 },
}

/// Ledger transition for a fresh quote against the previous fare.
#[derive(Debug, Clone, PartialEq)]
enum FareComparison {
    First,
    Drop { old_fare: f64, savings: f64 },
    Rose { old_fare: f64 },
    Unchanged { fare: f64 },
}

fn compare_fares(previous: Option<f64>, quote: f64) -> FareComparison {
    match previous {
        None => FareComparison::First,
        Some(old_fare) if quote < old_fare => FareComparison::Drop {
            old_fare,
            savings: old_fare - quote,
        },
        Some(old_fare) if quote > old_fare => FareComparison::Rose { old_fare },
        Some(fare) => FareComparison::Unchanged { fare },
    }
}

pub struct FareMonitor {
    config: MonitorConfig,
}

impl FareMonitor {
    pub fn new(config: MonitorConfig) -> Self {
        Self { config }
    }

    /// Runs the pipeline once. Only ledger errors propagate; fetch and
    /// extraction failures degrade to [`RunOutcome::NoData`].
    pub async fn run(&self) -> Result<RunOutcome, LedgerError> {
        info!("connecting to the fare ledger...");
        let ledger = FareLedger::connect(&self.config.database_url).await?;
        ledger.migrate().await?;

        let search = ledger.load_search_config().await?;
        if !search.active {
            info!("search configuration is inactive, skipping run");
            return Ok(RunOutcome::Disabled);
        }

        let url = build_search_url(&search);

        let mut fetcher = PageFetcher::new(self.config.headless, self.config.navigation_timeout);
        let markup = match fetcher.fetch(&url).await {
            Ok(markup) => markup,
            Err(e) => {
                warn!(error = %e, url, "page fetch failed, no data this run");
                return Ok(RunOutcome::NoData);
            }
        };

        let Some(quote) = extract_min_fare(&markup, &search.target_hours) else {
            info!(
                hours = ?search.target_hours,
                "no fare available for the target hours"
            );
            return Ok(RunOutcome::NoData);
        };
        info!(fare = quote, "best fare extracted");

        let previous = ledger.last_fare().await?.and_then(|record| record.fare);

        match compare_fares(previous, quote) {
            FareComparison::First => {
                info!(fare = quote, "first observation, recording initial fare");
                ledger.save_fare(quote).await?;
                Ok(RunOutcome::FirstObservation { fare: quote })
            }
            FareComparison::Drop { old_fare, savings } => {
                info!(old_fare, new_fare = quote, savings, "fare dropped, alerting");
                let notifier = TelegramNotifier::new(
                    &self.config.telegram_token,
                    &self.config.telegram_chat_id,
                );
                let event = AlertEvent {
                    old_fare: Some(old_fare),
                    new_fare: quote,
                    link: url,
                };
                let alerted = match notifier.send_alert(&event).await {
                    Ok(()) => true,
                    Err(e) => {
                        error!(error = %e, "alert delivery failed");
                        false
                    }
                };
                ledger.save_fare(quote).await?;
                Ok(RunOutcome::PriceDrop {
                    old_fare,
                    new_fare: quote,
                    alerted,
                })
            }
            FareComparison::Rose { old_fare } => {
                info!(old_fare, new_fare = quote, "fare rose, updating ledger");
                ledger.save_fare(quote).await?;
                Ok(RunOutcome::PriceRose {
                    old_fare,
                    new_fare: quote,
                })
            }
            FareComparison::Unchanged { fare } => {
                info!(fare, "fare unchanged, ledger left as is");
                Ok(RunOutcome::Unchanged { fare })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_observation() {
        assert_eq!(compare_fares(None, 150.00), FareComparison::First);
    }

    #[test]
    fn test_price_drop_with_savings() {
        assert_eq!(
            compare_fares(Some(200.00), 180.00),
            FareComparison::Drop {
                old_fare: 200.00,
                savings: 20.00,
            }
        );
    }

    #[test]
    fn test_price_rise() {
        assert_eq!(
            compare_fares(Some(180.00), 190.00),
            FareComparison::Rose { old_fare: 180.00 }
        );
    }

    #[test]
    fn test_unchanged() {
        assert_eq!(
            compare_fares(Some(190.00), 190.00),
            FareComparison::Unchanged { fare: 190.00 }
        );
    }
}
