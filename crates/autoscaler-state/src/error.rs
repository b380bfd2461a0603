//! Error types for the policy store.

use thiserror::Error;

/// Result type alias for policy store operations.
pub type StateResult<T> = Result<T, StateError>;

/// Errors raised by the policy store.
///
/// The upsert route does not distinguish between these; any of them on
/// the create or update path becomes a 500.
#[derive(Debug, Error)]
pub enum StateError {
    #[error("failed to open policy database: {0}")]
    Open(String),

    #[error("transaction error: {0}")]
    Transaction(String),

    #[error("policy table error: {0}")]
    Table(String),

    #[error("read error: {0}")]
    Read(String),

    #[error("write error: {0}")]
    Write(String),

    #[error("failed to encode policy record: {0}")]
    Serialize(String),

    #[error("failed to decode policy record: {0}")]
    Deserialize(String),

    #[error("no policy stored for app {0}")]
    NotFound(String),

    #[error("policy for app {record} cannot be stored under key {key}")]
    KeyMismatch { key: String, record: String },
}
