use crate::error::ModelError;

/// Result type alias for model operations
pub type ModelResult<T> = Result<T, ModelError>;
