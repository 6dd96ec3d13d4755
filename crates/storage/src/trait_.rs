//! Storage trait abstraction.

use async_trait::async_trait;
use malla_core::CourseId;

/// Error type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

/// Persistence collaborator for the completion set.
///
/// Records are an order-insensitive collection of course keys. Backends may
/// return them in any order; duplicates are collapsed by the caller.
#[async_trait]
pub trait ProgressStore: Send + Sync {
    /// Load the persisted completion set. `None` when nothing was saved yet.
    async fn load_completed(&self) -> Result<Option<Vec<CourseId>>>;

    /// Replace the persisted completion set.
    async fn save_completed(&mut self, completed: &[CourseId]) -> Result<()>;
}
