//! Progress tracking service - the engine coupled with its persistence.

use malla_core::{CourseId, Curriculum, CurriculumError};
use malla_storage::{ProgressStore, StorageError};
use tracing::{debug, info, warn};
use crate::engine::{ProgressEngine, ProgressSnapshot, Status, ToggleOutcome};

/// Errors surfaced by [`ProgressTracker`].
#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    /// Graph lookup failed
    #[error(transparent)]
    Curriculum(#[from] CurriculumError),

    /// Persisting the completion set failed
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Seeds an engine from a store and writes back after every change.
pub struct ProgressTracker<S: ProgressStore> {
    engine: ProgressEngine,
    store: S,
}

impl<S: ProgressStore> ProgressTracker<S> {
    /// Open a tracker, restoring the completion set from `store`.
    ///
    /// Nothing persisted yet, or a store that cannot be read, both start
    /// from an empty completion set.
    pub async fn open(curriculum: Curriculum, store: S) -> Self {
        for gap in curriculum.milestone_gaps() {
            warn!("Milestone course {} is not part of the curriculum", gap);
        }

        let restored = match store.load_completed().await {
            Ok(Some(ids)) => ids,
            Ok(None) => {
                debug!("No saved progress, starting empty");
                Vec::new()
            }
            Err(e) => {
                warn!("Could not read saved progress, starting empty: {}", e);
                Vec::new()
            }
        };

        let engine = ProgressEngine::with_completed(curriculum, restored);
        info!(
            "Loaded {} completed of {} courses",
            engine.completed().len(),
            engine.curriculum().len()
        );

        Self { engine, store }
    }

    /// Toggle a course and persist the result when the set changed.
    pub async fn toggle(&mut self, id: &CourseId) -> Result<ToggleOutcome, TrackerError> {
        let outcome = self.engine.toggle(id)?;
        if outcome.changed() {
            self.store.save_completed(&self.engine.completed().to_vec()).await?;
            info!("Toggled {}: {:?}", id, outcome);
        }
        Ok(outcome)
    }

    /// Derived status of a course.
    pub fn status_of(&self, id: &CourseId) -> Result<Status, TrackerError> {
        Ok(self.engine.status_of(id)?)
    }

    /// Requirements of a course not yet completed.
    pub fn missing_prerequisites_of(&self, id: &CourseId) -> Result<Vec<CourseId>, TrackerError> {
        Ok(self.engine.missing_prerequisites_of(id)?)
    }

    /// Status of every course.
    pub fn snapshot(&self) -> ProgressSnapshot {
        self.engine.snapshot()
    }

    /// The underlying engine.
    pub fn engine(&self) -> &ProgressEngine {
        &self.engine
    }

    /// The underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use malla_core::{Course, PrereqSpec};
    use malla_storage::{JsonStorage, MemoryStorage};

    fn id(s: &str) -> CourseId {
        CourseId::from(s)
    }

    fn curriculum() -> Curriculum {
        Curriculum::new(
            "chain",
            vec![
                Course {
                    id: id("a"),
                    name: "A".to_string(),
                    semester: None,
                    prerequisites: PrereqSpec::none(),
                },
                Course {
                    id: id("b"),
                    name: "B".to_string(),
                    semester: None,
                    prerequisites: PrereqSpec::Explicit(vec![id("a")]),
                },
            ],
            vec![],
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_open_empty_store() {
        let tracker = ProgressTracker::open(curriculum(), MemoryStorage::new()).await;
        assert!(tracker.engine().completed().is_empty());
        assert_eq!(tracker.status_of(&id("a")).unwrap(), Status::Available);
    }

    #[tokio::test]
    async fn test_open_unreadable_store_starts_empty() {
        let tracker = ProgressTracker::open(curriculum(), MemoryStorage::unreadable()).await;
        assert!(tracker.engine().completed().is_empty());
    }

    #[tokio::test]
    async fn test_open_restores_saved_set() {
        let store = MemoryStorage::with_completed(vec![id("a")]);
        let tracker = ProgressTracker::open(curriculum(), store).await;
        assert_eq!(tracker.status_of(&id("a")).unwrap(), Status::Completed);
        assert_eq!(tracker.status_of(&id("b")).unwrap(), Status::Available);
    }

    #[tokio::test]
    async fn test_toggle_persists_changes_only() {
        let mut tracker = ProgressTracker::open(curriculum(), MemoryStorage::new()).await;

        // Locked: nothing saved
        let outcome = tracker.toggle(&id("b")).await.unwrap();
        assert!(matches!(outcome, ToggleOutcome::Rejected { .. }));
        assert_eq!(tracker.store().saves(), 0);

        tracker.toggle(&id("a")).await.unwrap();
        assert_eq!(tracker.store().saves(), 1);
        assert_eq!(tracker.store().completed().unwrap(), &[id("a")]);

        tracker.toggle(&id("a")).await.unwrap();
        assert_eq!(tracker.store().saves(), 2);
        assert!(tracker.store().completed().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_course_is_error() {
        let mut tracker = ProgressTracker::open(curriculum(), MemoryStorage::new()).await;
        let err = tracker.toggle(&id("ghost")).await.unwrap_err();
        assert!(matches!(err, TrackerError::Curriculum(CurriculumError::UnknownCourse(_))));
        assert!(tracker.missing_prerequisites_of(&id("ghost")).is_err());
    }

    #[tokio::test]
    async fn test_progress_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();

        {
            let store = JsonStorage::new(dir.path()).await.unwrap();
            let mut tracker = ProgressTracker::open(curriculum(), store).await;
            tracker.toggle(&id("a")).await.unwrap();
            tracker.toggle(&id("b")).await.unwrap();
        }

        let store = JsonStorage::new(dir.path()).await.unwrap();
        let tracker = ProgressTracker::open(curriculum(), store).await;
        let snapshot = tracker.snapshot();
        assert_eq!(snapshot.completed, 2);
        assert_eq!(snapshot.locked, 0);
    }
}
