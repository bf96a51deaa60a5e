//! Error types for octowatch.

use std::time::Duration;

/// Top-level error type for the sync engine.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Feed error: {0}")]
    Feed(#[from] FeedError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Schedule error: {0}")]
    Schedule(#[from] ScheduleError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Errors from the remote notification feed.
///
/// Only a failure of the primary notification fetch affects a run's
/// outcome; per-comment failures are contained at the item level.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("Server returned {status} for {url}")]
    Status { status: u16, url: String },

    #[error("Failed to decode response from {url}: {reason}")]
    Decode { url: String, reason: String },

    #[error("Comment fetch timed out after {timeout:?}: {url}")]
    Timeout { url: String, timeout: Duration },
}

/// Persistence errors. Swallowed by the sync run — a failed save never
/// blocks alert presentation.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Failed to open database: {0}")]
    Open(String),

    #[error("Query failed: {0}")]
    Query(String),
}

/// Errors from the scheduling boundary.
#[derive(Debug, thiserror::Error)]
pub enum ScheduleError {
    #[error("Scheduler rejected the request: {0}")]
    Rejected(String),
}

/// Result type alias for the sync engine.
pub type Result<T> = std::result::Result<T, Error>;
