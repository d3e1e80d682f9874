use thiserror::Error;

/// Errors raised while reading or shaping block editor data
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Invalid UDI: {0}")]
    InvalidUdi(String),

    #[error("Invalid key: {0}")]
    InvalidKey(#[from] uuid::Error),

    #[error("Malformed property value: {0}")]
    MalformedValue(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
