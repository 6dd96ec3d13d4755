//! Progress engine - derives course status from the completion set.
//!
//! Status is never stored. Every query re-evaluates the curriculum against
//! the current [`CompletionSet`], so the two cannot drift apart.

use std::collections::BTreeSet;
use chrono::{DateTime, Utc};
use malla_core::{Course, CourseId, Curriculum, CurriculumError, PrereqSpec};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Derived status of a course.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// In the completion set
    Completed,
    /// Not completed, all requirements met
    Available,
    /// Not completed, at least one requirement missing
    Locked,
}

impl Status {
    /// Get string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Completed => "completed",
            Status::Available => "available",
            Status::Locked => "locked",
        }
    }

    /// Whether toggling is blocked.
    pub fn is_locked(&self) -> bool {
        matches!(self, Status::Locked)
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Status {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "completed" => Ok(Status::Completed),
            "available" => Ok(Status::Available),
            "locked" => Ok(Status::Locked),
            other => Err(format!("unknown status: {}", other)),
        }
    }
}

/// Set of completed course keys. No duplicates, no meaningful order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompletionSet(BTreeSet<CourseId>);

impl CompletionSet {
    /// Empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Membership test.
    pub fn contains(&self, id: &CourseId) -> bool {
        self.0.contains(id)
    }

    /// Number of completed courses.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether nothing is completed.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate keys in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &CourseId> {
        self.0.iter()
    }

    /// Snapshot as a vector, for persistence.
    pub fn to_vec(&self) -> Vec<CourseId> {
        self.0.iter().cloned().collect()
    }

    fn insert(&mut self, id: CourseId) -> bool {
        self.0.insert(id)
    }

    fn remove(&mut self, id: &CourseId) -> bool {
        self.0.remove(id)
    }
}

impl FromIterator<CourseId> for CompletionSet {
    fn from_iter<I: IntoIterator<Item = CourseId>>(iter: I) -> Self {
        Self(iter.into_iter().filter(|id| !id.is_empty()).collect())
    }
}

/// Result of a toggle request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// Course was available and is now completed
    Completed,
    /// Course was completed and is now un-completed
    Uncompleted,
    /// Course is locked, completion set unchanged
    Rejected {
        /// Requirements still missing
        missing: Vec<CourseId>,
    },
}

impl ToggleOutcome {
    /// Whether the completion set changed.
    pub fn changed(&self) -> bool {
        !matches!(self, ToggleOutcome::Rejected { .. })
    }
}

/// Status of a single course inside a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseStatus {
    /// Course key
    pub id: CourseId,
    /// Display name
    pub name: String,
    /// Semester grouping
    pub semester: Option<u32>,
    /// Derived status
    pub status: Status,
}

/// Status of every course at a point in time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    /// When snapshot was taken
    pub timestamp: DateTime<Utc>,

    /// Per-course status, in curriculum order
    pub courses: Vec<CourseStatus>,

    /// Completed courses
    pub completed: usize,

    /// Available courses
    pub available: usize,

    /// Locked courses
    pub locked: usize,
}

impl ProgressSnapshot {
    /// Percentage of curriculum courses completed (0-100).
    pub fn percentage(&self) -> f32 {
        if self.courses.is_empty() {
            0.0
        } else {
            (self.completed as f32 / self.courses.len() as f32) * 100.0
        }
    }

    /// Courses with the given status.
    pub fn with_status(&self, status: Status) -> impl Iterator<Item = &CourseStatus> {
        self.courses.iter().filter(move |c| c.status == status)
    }
}

/// Owns the completion set and evaluates it against a curriculum.
#[derive(Debug, Clone)]
pub struct ProgressEngine {
    curriculum: Curriculum,
    completed: CompletionSet,
}

impl ProgressEngine {
    /// Engine with nothing completed.
    pub fn new(curriculum: Curriculum) -> Self {
        Self {
            curriculum,
            completed: CompletionSet::new(),
        }
    }

    /// Engine seeded with a restored completion set.
    ///
    /// Keys the curriculum does not know are kept as-is; they never affect
    /// the status of a known course unless it names them.
    pub fn with_completed(
        curriculum: Curriculum,
        completed: impl IntoIterator<Item = CourseId>,
    ) -> Self {
        let completed: CompletionSet = completed.into_iter().collect();
        for stale in completed.iter().filter(|id| !curriculum.contains(id)) {
            debug!("Restored completion for unknown course: {}", stale);
        }
        Self { curriculum, completed }
    }

    /// The curriculum this engine evaluates.
    pub fn curriculum(&self) -> &Curriculum {
        &self.curriculum
    }

    /// The current completion set.
    pub fn completed(&self) -> &CompletionSet {
        &self.completed
    }

    /// Derived status of a course.
    pub fn status_of(&self, id: &CourseId) -> Result<Status, CurriculumError> {
        let course = self.course(id)?;
        Ok(self.evaluate(course))
    }

    /// Requirements of a course not yet completed, in requirement order.
    ///
    /// Empty iff [`status_of`](Self::status_of) is not `Locked`.
    pub fn missing_prerequisites_of(&self, id: &CourseId) -> Result<Vec<CourseId>, CurriculumError> {
        let course = self.course(id)?;
        if self.completed.contains(&course.id) {
            return Ok(Vec::new());
        }
        Ok(self.missing_for(course))
    }

    /// Flip completion of a course. Locked courses are left untouched.
    ///
    /// Un-completing a course never cascades to courses that depend on it.
    pub fn toggle(&mut self, id: &CourseId) -> Result<ToggleOutcome, CurriculumError> {
        let course = self.course(id)?;

        let outcome = match self.evaluate(course) {
            Status::Locked => ToggleOutcome::Rejected {
                missing: self.missing_for(course),
            },
            Status::Completed => ToggleOutcome::Uncompleted,
            Status::Available => ToggleOutcome::Completed,
        };

        match &outcome {
            ToggleOutcome::Completed => {
                self.completed.insert(id.clone());
            }
            ToggleOutcome::Uncompleted => {
                self.completed.remove(id);
            }
            ToggleOutcome::Rejected { missing } => {
                debug!("Rejected toggle of locked course {} (missing {})", id, missing.len());
            }
        }

        Ok(outcome)
    }

    /// Status of every course.
    pub fn snapshot(&self) -> ProgressSnapshot {
        let courses: Vec<CourseStatus> = self
            .curriculum
            .courses()
            .map(|course| CourseStatus {
                id: course.id.clone(),
                name: course.name.clone(),
                semester: course.semester,
                status: self.evaluate(course),
            })
            .collect();

        let count = |status: Status| courses.iter().filter(|c| c.status == status).count();

        ProgressSnapshot {
            timestamp: Utc::now(),
            completed: count(Status::Completed),
            available: count(Status::Available),
            locked: count(Status::Locked),
            courses,
        }
    }

    fn course(&self, id: &CourseId) -> Result<&Course, CurriculumError> {
        self.curriculum
            .get(id)
            .ok_or_else(|| CurriculumError::UnknownCourse(id.clone()))
    }

    fn evaluate(&self, course: &Course) -> Status {
        // Completion wins over lock evaluation
        if self.completed.contains(&course.id) {
            return Status::Completed;
        }

        let locked = self
            .requirements_of(course)
            .iter()
            .any(|id| self.is_missing(id));

        if locked {
            Status::Locked
        } else {
            Status::Available
        }
    }

    fn missing_for(&self, course: &Course) -> Vec<CourseId> {
        self.requirements_of(course)
            .iter()
            .filter(|id| self.is_missing(id))
            .cloned()
            .collect()
    }

    fn requirements_of<'a>(&'a self, course: &'a Course) -> &'a [CourseId] {
        match &course.prerequisites {
            PrereqSpec::Milestone => self.curriculum.milestone_set(),
            PrereqSpec::Explicit(reqs) => reqs,
        }
    }

    /// Blank entries never count as missing.
    fn is_missing(&self, id: &CourseId) -> bool {
        !id.is_empty() && !self.completed.contains(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> CourseId {
        CourseId::from(s)
    }

    fn ids(v: &[&str]) -> Vec<CourseId> {
        v.iter().map(|s| id(s)).collect()
    }

    fn course(key: &str, prerequisites: PrereqSpec) -> Course {
        Course {
            id: id(key),
            name: format!("Course {}", key.to_uppercase()),
            semester: None,
            prerequisites,
        }
    }

    /// A (none), B (requires A).
    fn chain() -> Curriculum {
        Curriculum::new(
            "chain",
            vec![
                course("a", PrereqSpec::none()),
                course("b", PrereqSpec::Explicit(ids(&["a"]))),
            ],
            vec![],
        )
        .unwrap()
    }

    /// Milestone [A, B, C]; D gated by the milestone.
    fn milestone() -> Curriculum {
        Curriculum::new(
            "milestone",
            vec![
                course("a", PrereqSpec::none()),
                course("b", PrereqSpec::none()),
                course("c", PrereqSpec::none()),
                course("d", PrereqSpec::Milestone),
            ],
            ids(&["a", "b", "c"]),
        )
        .unwrap()
    }

    #[test]
    fn test_chain_scenario() {
        let mut engine = ProgressEngine::new(chain());
        let (a, b) = (id("a"), id("b"));

        assert_eq!(engine.status_of(&a).unwrap(), Status::Available);
        assert_eq!(engine.status_of(&b).unwrap(), Status::Locked);
        assert_eq!(engine.missing_prerequisites_of(&b).unwrap(), ids(&["a"]));

        assert_eq!(engine.toggle(&a).unwrap(), ToggleOutcome::Completed);
        assert_eq!(engine.status_of(&a).unwrap(), Status::Completed);
        assert_eq!(engine.status_of(&b).unwrap(), Status::Available);

        assert_eq!(engine.toggle(&b).unwrap(), ToggleOutcome::Completed);
        assert_eq!(engine.status_of(&b).unwrap(), Status::Completed);

        // Un-completing A does not revoke B
        assert_eq!(engine.toggle(&a).unwrap(), ToggleOutcome::Uncompleted);
        assert_eq!(engine.status_of(&a).unwrap(), Status::Available);
        assert_eq!(engine.status_of(&b).unwrap(), Status::Completed);
        assert!(engine.missing_prerequisites_of(&b).unwrap().is_empty());
    }

    #[test]
    fn test_milestone_scenario() {
        let mut engine = ProgressEngine::with_completed(milestone(), ids(&["a", "b"]));
        let d = id("d");

        assert_eq!(engine.status_of(&d).unwrap(), Status::Locked);
        assert_eq!(engine.missing_prerequisites_of(&d).unwrap(), ids(&["c"]));

        engine.toggle(&id("c")).unwrap();
        assert_eq!(engine.status_of(&d).unwrap(), Status::Available);
        assert!(engine.missing_prerequisites_of(&d).unwrap().is_empty());
    }

    #[test]
    fn test_milestone_missing_preserves_order() {
        let engine = ProgressEngine::with_completed(milestone(), ids(&["b"]));
        assert_eq!(engine.missing_prerequisites_of(&id("d")).unwrap(), ids(&["a", "c"]));
    }

    #[test]
    fn test_explicit_missing_preserves_order() {
        let curriculum = Curriculum::new(
            "order",
            vec![
                course("x", PrereqSpec::none()),
                course("y", PrereqSpec::none()),
                course("z", PrereqSpec::none()),
                course("w", PrereqSpec::Explicit(ids(&["z", "x", "y"]))),
            ],
            vec![],
        )
        .unwrap();
        let engine = ProgressEngine::with_completed(curriculum, ids(&["x"]));

        assert_eq!(engine.missing_prerequisites_of(&id("w")).unwrap(), ids(&["z", "y"]));
    }

    #[test]
    fn test_empty_entries_ignored() {
        let curriculum = Curriculum::new(
            "blank",
            vec![
                course("a", PrereqSpec::none()),
                course("b", PrereqSpec::Explicit(vec![id(""), id("a"), id("")])),
            ],
            vec![],
        )
        .unwrap();
        let mut engine = ProgressEngine::new(curriculum);

        assert_eq!(engine.missing_prerequisites_of(&id("b")).unwrap(), ids(&["a"]));
        engine.toggle(&id("a")).unwrap();
        assert_eq!(engine.status_of(&id("b")).unwrap(), Status::Available);
    }

    #[test]
    fn test_blank_milestone_entry_does_not_lock() {
        let json = r#"{
            "milestone": ["a", ""],
            "courses": [ { "id": "a" }, { "id": "d", "requires": "hasta-octavo" } ]
        }"#;
        let curriculum = Curriculum::from_json(json).unwrap();
        let mut engine = ProgressEngine::new(curriculum);
        let d = id("d");

        assert_eq!(engine.status_of(&d).unwrap(), Status::Locked);
        assert_eq!(engine.missing_prerequisites_of(&d).unwrap(), ids(&["a"]));

        engine.toggle(&id("a")).unwrap();
        assert_eq!(engine.status_of(&d).unwrap(), Status::Available);
        assert!(engine.missing_prerequisites_of(&d).unwrap().is_empty());
        assert!(engine.blocker_of(&d).unwrap().is_none());
    }

    #[test]
    fn test_padded_ids_can_be_unlocked() {
        let json = r#"{ "courses": [ { "id": "a " }, { "id": "b", "requires": "a " } ] }"#;
        let mut engine = ProgressEngine::new(Curriculum::from_json(json).unwrap());

        assert_eq!(engine.toggle(&CourseId::new("a ")).unwrap(), ToggleOutcome::Completed);
        assert_eq!(engine.status_of(&id("b")).unwrap(), Status::Available);
    }

    #[test]
    fn test_completed_wins_over_unmet_prerequisites() {
        // B restored as completed while A is not
        let engine = ProgressEngine::with_completed(chain(), ids(&["b"]));
        assert_eq!(engine.status_of(&id("b")).unwrap(), Status::Completed);
        assert!(engine.missing_prerequisites_of(&id("b")).unwrap().is_empty());
    }

    #[test]
    fn test_toggle_locked_is_noop() {
        let mut engine = ProgressEngine::new(chain());
        let before = engine.completed().clone();

        let outcome = engine.toggle(&id("b")).unwrap();
        assert_eq!(outcome, ToggleOutcome::Rejected { missing: ids(&["a"]) });
        assert!(!outcome.changed());
        assert_eq!(engine.completed(), &before);
    }

    #[test]
    fn test_toggle_round_trip() {
        let mut engine = ProgressEngine::with_completed(chain(), ids(&["a"]));
        let before = engine.completed().clone();

        for key in ["a", "b"] {
            engine.toggle(&id(key)).unwrap();
            engine.toggle(&id(key)).unwrap();
            assert_eq!(engine.completed(), &before, "round trip on {}", key);
        }
    }

    #[test]
    fn test_queries_are_idempotent() {
        let engine = ProgressEngine::with_completed(milestone(), ids(&["a"]));
        for course in engine.curriculum().courses() {
            assert_eq!(
                engine.status_of(&course.id).unwrap(),
                engine.status_of(&course.id).unwrap()
            );
            assert_eq!(
                engine.missing_prerequisites_of(&course.id).unwrap(),
                engine.missing_prerequisites_of(&course.id).unwrap()
            );
        }
    }

    #[test]
    fn test_missing_consistent_with_status() {
        let curriculum = Curriculum::bundled().unwrap();
        let keys: Vec<CourseId> = curriculum.courses().map(|c| c.id.clone()).collect();

        // Walk a few partial completion states over the bundled curriculum
        for take in [0, 5, 12, 30, keys.len()] {
            let engine = ProgressEngine::with_completed(
                curriculum.clone(),
                keys.iter().take(take).cloned(),
            );
            for key in &keys {
                let status = engine.status_of(key).unwrap();
                let missing = engine.missing_prerequisites_of(key).unwrap();
                assert_eq!(status.is_locked(), !missing.is_empty(), "{} at {}", key, take);
                if engine.completed().contains(key) {
                    assert_eq!(status, Status::Completed);
                }
            }
        }
    }

    #[test]
    fn test_no_prerequisites_always_available() {
        let engine = ProgressEngine::new(Curriculum::bundled().unwrap());
        for course in engine.curriculum().courses() {
            if course.prerequisites == PrereqSpec::none() {
                assert_eq!(engine.status_of(&course.id).unwrap(), Status::Available);
            }
        }
    }

    #[test]
    fn test_unknown_course() {
        let mut engine = ProgressEngine::new(chain());
        let ghost = id("ghost");

        assert!(matches!(engine.status_of(&ghost), Err(CurriculumError::UnknownCourse(_))));
        assert!(engine.missing_prerequisites_of(&ghost).is_err());
        assert!(engine.toggle(&ghost).is_err());
        assert!(engine.completed().is_empty());
    }

    #[test]
    fn test_restored_set_collapses_duplicates() {
        let engine = ProgressEngine::with_completed(chain(), ids(&["a", "a", "", "stale"]));
        assert_eq!(engine.completed().len(), 2);
        assert_eq!(engine.completed().to_vec(), ids(&["a", "stale"]));
        assert_eq!(engine.status_of(&id("b")).unwrap(), Status::Available);
    }

    #[test]
    fn test_snapshot_counts() {
        let engine = ProgressEngine::with_completed(milestone(), ids(&["a"]));
        let snapshot = engine.snapshot();

        let order: Vec<_> = snapshot.courses.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(order, vec!["a", "b", "c", "d"]);
        assert_eq!(snapshot.completed, 1);
        assert_eq!(snapshot.available, 2);
        assert_eq!(snapshot.locked, 1);
        assert_eq!(snapshot.percentage(), 25.0);
        assert_eq!(snapshot.with_status(Status::Locked).count(), 1);
    }

    #[test]
    fn test_status_parse() {
        assert_eq!("Locked".parse::<Status>().unwrap(), Status::Locked);
        assert_eq!(Status::Available.to_string(), "available");
        assert!("done".parse::<Status>().is_err());
    }
}
