//! Error types for vaultloop
//!
//! Centralized error handling using thiserror.

use thiserror::Error;

use crate::llm::LlmError;
use crate::vault::StoreError;

/// All error types that can escape the library.
///
/// Tool and parse failures are not represented here: they are folded into
/// `ToolResult`/`ParseError` values and fed back to the model.
#[derive(Debug, Error)]
pub enum VaultError {
    /// Invalid state or configuration for an operation
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Document store error
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Model service failure (network, auth, rate limit)
    #[error("Model error: {0}")]
    Model(#[from] LlmError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for vaultloop operations
pub type Result<T> = std::result::Result<T, VaultError>;
