use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("CRM request failed: {0}")]
    CrmError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for {field}: {value} ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Platform store error: {message}")]
    PlatformError { message: String },
}

pub type Result<T> = std::result::Result<T, SyncError>;
