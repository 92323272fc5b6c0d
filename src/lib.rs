//! Bus-ticket fare monitor.
//!
//! Checks the vendor's availability page for one fixed itinerary,
//! extracts the lowest fare among the configured departure hours,
//! compares it with the last known fare and sends a Telegram alert when
//! the price drops.
//!
//! # Direct usage
//!
//! ```rust,ignore
//! use fare_monitor::{FareMonitor, MonitorConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = MonitorConfig::new("postgres://...", "bot-token", "chat-id");
//!
//!     let monitor = FareMonitor::new(config);
//!     let outcome = monitor.run().await.unwrap();
//!     println!("outcome: {:?}", outcome);
//! }
//! ```
//!
//! # tower Service usage
//!
//! ```rust,ignore
//! use fare_monitor::{FareMonitorService, MonitorRequest};
//! use tower::Service;
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut service = FareMonitorService::new();
//!
//!     let request = MonitorRequest::new("postgres://...", "bot-token", "chat-id")
//!         .with_headless(true);
//!
//!     let outcome = service.call(request).await.unwrap();
//!     println!("outcome: {:?}", outcome);
//! }
//! ```

pub mod config;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod ledger;
pub mod monitor;
pub mod notify;
pub mod query;
pub mod service;
pub mod traits;

// Re-export the main types
pub use config::{MonitorConfig, SearchConfig};
pub use error::{ConfigError, FetchError, LedgerError, NotifyError};
pub use extract::{extract_min_fare, extract_observations, FareObservation};
pub use fetch::PageFetcher;
pub use ledger::{FareLedger, FareRecord};
pub use monitor::{FareMonitor, RunOutcome};
pub use notify::{AlertEvent, TelegramNotifier};
pub use query::build_search_url;
pub use service::{FareMonitorService, MonitorRequest};
pub use traits::Fetcher;
