//! In-memory storage backend.

use malla_core::CourseId;
use super::{ProgressStore, Result, StorageError};

/// Keeps the completion set in process memory.
#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    completed: Option<Vec<CourseId>>,
    saves: usize,
    fail_reads: bool,
}

impl MemoryStorage {
    /// Empty storage (nothing persisted yet).
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage that already holds a completion set.
    pub fn with_completed(completed: Vec<CourseId>) -> Self {
        Self {
            completed: Some(completed),
            ..Self::default()
        }
    }

    /// Storage whose reads always fail.
    pub fn unreadable() -> Self {
        Self {
            fail_reads: true,
            ..Self::default()
        }
    }

    /// Number of successful saves.
    pub fn saves(&self) -> usize {
        self.saves
    }

    /// Last saved completion set.
    pub fn completed(&self) -> Option<&[CourseId]> {
        self.completed.as_deref()
    }
}

#[async_trait::async_trait]
impl ProgressStore for MemoryStorage {
    async fn load_completed(&self) -> Result<Option<Vec<CourseId>>> {
        if self.fail_reads {
            return Err(StorageError::Other("storage unreadable".to_string()));
        }
        Ok(self.completed.clone())
    }

    async fn save_completed(&mut self, completed: &[CourseId]) -> Result<()> {
        self.completed = Some(completed.to_vec());
        self.saves += 1;
        Ok(())
    }
}
