use fare_monitor::{FareMonitor, MonitorConfig, RunOutcome};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let config = match MonitorConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("configuration error: {}", e);
            std::process::exit(1);
        }
    };

    let monitor = FareMonitor::new(config);

    match monitor.run().await {
        Ok(RunOutcome::NoData) => info!("run finished: no fare data this time"),
        Ok(RunOutcome::Disabled) => info!("run finished: monitoring is switched off"),
        Ok(outcome) => info!(?outcome, "run finished: ledger is current"),
        Err(e) => {
            error!("fatal: {}", e);
            std::process::exit(1);
        }
    }
}
