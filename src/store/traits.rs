/*!
 * Backing Store Traits
 * Asynchronous key-value abstraction the namespace persists into
 */

use async_trait::async_trait;
use miette::Diagnostic;
use serde_json::Value;
use thiserror::Error;

use crate::vfs::FsError;

/// Backing store operation result
///
/// Store operations can fail and must be handled; `Result` is `#[must_use]`.
pub type StoreResult<T> = Result<T, StoreError>;

/// Backing store errors
#[derive(Error, Debug, Diagnostic)]
pub enum StoreError {
    #[error("Store unavailable: {0}")]
    #[diagnostic(code(store::unavailable))]
    Unavailable(String),

    #[error("I/O error on '{key}': {source}")]
    #[diagnostic(code(store::io))]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Corrupt record '{key}': {reason}")]
    #[diagnostic(code(store::corrupt))]
    Corrupt { key: String, reason: String },

    #[error("Serialization failed: {0}")]
    #[diagnostic(code(store::serialization))]
    Serialization(#[from] serde_json::Error),
}

impl From<StoreError> for FsError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Corrupt { .. } => FsError::CorruptSnapshot(err.to_string()),
            other => FsError::StoreUnavailable(other.to_string()),
        }
    }
}

/// Asynchronous key-value backing store
///
/// Each `put` replaces one whole record atomically. Implementations must be
/// shareable across tasks so persistence and session state can use the same
/// store.
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Read the record under `key`
    async fn get(&self, key: &str) -> StoreResult<Option<Value>>;

    /// Replace the record under `key`
    async fn put(&self, key: &str, value: Value) -> StoreResult<()>;

    /// Remove the record under `key`, if any
    async fn delete(&self, key: &str) -> StoreResult<()>;

    /// Remove every record
    async fn clear(&self) -> StoreResult<()>;

    /// Store name for logging
    fn name(&self) -> &str;
}
