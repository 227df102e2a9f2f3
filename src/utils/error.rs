use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Upstream authentication failed: {message}")]
    UpstreamAuth { message: String },

    #[error("Upstream request failed: {0}")]
    UpstreamFetch(#[from] reqwest::Error),

    #[error("Upstream paging exceeded {max_pages} pages without terminating")]
    PageLimitExceeded { max_pages: u32 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("No snapshot named '{name}' has been written yet")]
    SnapshotMissing { name: String },

    #[error("Credential error: {message}")]
    Credential { message: String },

    #[error("Conflict: {message}")]
    Conflict { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Missing required configuration field: {field}")]
    MissingConfig { field: String },

    #[error("Invalid value for {field} ('{value}'): {reason}")]
    InvalidConfigValue {
        field: String,
        value: String,
        reason: String,
    },
}

pub type Result<T> = std::result::Result<T, AppError>;
