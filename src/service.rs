use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use tower::Service;
use tracing::info;

use crate::config::MonitorConfig;
use crate::error::LedgerError;
use crate::monitor::{FareMonitor, RunOutcome};

/// One fare-check request.
#[derive(Debug, Clone)]
pub struct MonitorRequest {
    pub database_url: String,
    pub telegram_token: String,
    pub telegram_chat_id: String,
    pub headless: bool,
}

impl MonitorRequest {
    pub fn new(
        database_url: impl Into<String>,
        telegram_token: impl Into<String>,
        telegram_chat_id: impl Into<String>,
    ) -> Self {
        Self {
            database_url: database_url.into(),
            telegram_token: telegram_token.into(),
            telegram_chat_id: telegram_chat_id.into(),
            headless: true,
        }
    }

    pub fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }
}

impl From<MonitorRequest> for MonitorConfig {
    fn from(req: MonitorRequest) -> Self {
        MonitorConfig::new(req.database_url, req.telegram_token, req.telegram_chat_id)
            .with_headless(req.headless)
    }
}

/// Fare monitor behind a `tower::Service`: one pipeline run per call.
#[derive(Debug, Clone, Default)]
pub struct FareMonitorService {
    // Extension point (run locking, caching)
}

impl FareMonitorService {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Service<MonitorRequest> for FareMonitorService {
    type Response = RunOutcome;
    type Error = LedgerError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: MonitorRequest) -> Self::Future {
        info!("fare check requested");

        Box::pin(async move {
            let config: MonitorConfig = req.into();
            let monitor = FareMonitor::new(config);

            let outcome = monitor.run().await?;

            info!(?outcome, "fare check finished");
            Ok(outcome)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_monitor_request_builder() {
        let req = MonitorRequest::new("postgres://db", "token", "chat").with_headless(false);

        assert_eq!(req.database_url, "postgres://db");
        assert_eq!(req.telegram_token, "token");
        assert_eq!(req.telegram_chat_id, "chat");
        assert!(!req.headless);
    }

    #[test]
    fn test_monitor_request_to_config() {
        let req = MonitorRequest::new("postgres://db", "token", "chat");
        let config: MonitorConfig = req.into();

        assert_eq!(config.database_url, "postgres://db");
        assert_eq!(config.telegram_token, "token");
        assert!(config.headless);
    }
}
