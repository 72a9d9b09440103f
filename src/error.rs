use std::time::Duration;

use thiserror::Error;

use crate::config::ConfigError;
use crate::portainer::ScaleReport;

/// Failure of a single HTTP call to the management API.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP {status} - {body}")]
    Status { status: u16, body: String },

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Everything a panel operation can fail with. Each variant ends up as a toast.
#[derive(Error, Debug)]
pub enum PanelError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Token validation failed: {0}")]
    Auth(#[source] ApiError),

    #[error("Failed to fetch {what}: {source}")]
    Fetch {
        what: &'static str,
        #[source]
        source: ApiError,
    },

    #[error("Stack '{0}' not found")]
    NotFound(String),

    #[error("Failed to {action}: {source}")]
    Action {
        action: String,
        #[source]
        source: ApiError,
    },

    #[error("Stack '{stack}' has unsupported type {value}")]
    UnknownOrchestration { stack: String, value: i64 },

    #[error(
        "Failed to {action} stack: {} of {} services failed ({})",
        .report.failed_count(),
        .report.outcomes.len(),
        .report.failed_names().join(", ")
    )]
    PartialScale { action: String, report: ScaleReport },

    #[error("Stack '{stack}' did not stop within {}s", .waited.as_secs())]
    Timeout { stack: String, waited: Duration },

    #[error("Another confirmation is already pending")]
    ConfirmationPending,
}
