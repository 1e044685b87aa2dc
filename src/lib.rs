//! wrc-harvest: a monthly harvester for Workplace Relations Commission decisions
//!
//! This crate discovers the paginated search results for a date window, parses
//! each result page into structured case records, fetches every record's source
//! document and commits (record, document) pairs to a content store under
//! deterministic keys.

pub mod config;
pub mod crawler;
pub mod output;
pub mod query;
pub mod record;
pub mod storage;
pub mod window;

use thiserror::Error;

/// Main error type for run-level failures
///
/// Everything in here is fatal to a run. Failures scoped to a single page,
/// item or document are reported through [`crawler::StageOutcome`] instead.
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid window: {0}")]
    Window(#[from] WindowError),

    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),

    #[error("Content store error: {0}")]
    Store(#[from] storage::StoreError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Date window errors (the trigger's `InvalidWindow` kind)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WindowError {
    #[error("{field} '{value}' is not a DD-MM-YYYY date")]
    Malformed { field: &'static str, value: String },

    #[error("start date {start} is after end date {end}")]
    StartAfterEnd { start: String, end: String },
}

/// Result type alias for run-level operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::{Config, RunContext};
pub use crawler::{run_harvest, Coordinator, RunStats};
pub use query::{build_queries, BodyCategory, SearchQuery};
pub use record::{CaseRecord, DocumentLink, OutputRecord};
pub use storage::{ContentStore, MemoryContentStore, SqliteContentStore};
pub use window::{previous_month, DateWindow};
