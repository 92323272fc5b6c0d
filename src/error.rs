use thiserror::Error;

/// Page-fetch failures. All of these end the run with "no data" — the
/// ledger is left untouched and the next scheduled run tries again.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("browser launch failed: {0}")]
    BrowserLaunch(String),

    #[error("navigation failed: {0}")]
    Navigation(String),

    #[error("navigation timed out after {0}s")]
    Timeout(u64),
}

/// Fare-ledger failures. These are fatal: the run aborts with no writes.
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("no search configuration found (search_config id=1)")]
    MissingConfig,

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Alert-delivery failures. Logged by the orchestrator, never block the
/// ledger write.
#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("telegram request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("telegram api error: {status}: {body}")]
    Api { status: u16, body: String },
}

/// Configuration errors, from the environment or the stored search row.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing environment variable: {0}")]
    MissingVar(&'static str),

    #[error("invalid search configuration: {0}")]
    Invalid(String),
}
