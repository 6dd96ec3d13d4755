//! Blocker detection and the explanation shown for locked courses.

use malla_core::{CourseId, Curriculum};
use crate::engine::{ProgressEngine, Status};

/// Header line of a blocking message.
pub const BLOCKING_HEADER: &str = "To take this course you must first pass:";

/// A locked course and what keeps it locked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blocker {
    /// The locked course
    pub course: CourseId,
    /// Requirements not yet completed, in requirement order
    pub missing: Vec<CourseId>,
}

impl Blocker {
    /// Human-readable explanation for this blocker.
    pub fn message(&self, curriculum: &Curriculum) -> String {
        blocking_message(curriculum, &self.missing)
    }
}

/// Render the explanation for a set of missing requirements.
///
/// One `- <name>` line per requirement. A requirement without display
/// metadata is shown by its key.
pub fn blocking_message(curriculum: &Curriculum, missing: &[CourseId]) -> String {
    let mut message = String::from(BLOCKING_HEADER);
    for id in missing {
        let name = curriculum.display_name_of(id);
        message.push_str("\n- ");
        message.push_str(if name.is_empty() { id.as_str() } else { name });
    }
    message
}

impl ProgressEngine {
    /// Every locked course with its missing requirements, in curriculum order.
    pub fn blockers(&self) -> Vec<Blocker> {
        self.curriculum()
            .courses()
            .filter_map(|course| {
                let status = self.status_of(&course.id).ok()?;
                if status != Status::Locked {
                    return None;
                }
                let missing = self.missing_prerequisites_of(&course.id).ok()?;
                Some(Blocker {
                    course: course.id.clone(),
                    missing,
                })
            })
            .collect()
    }

    /// Blocker for one course, `None` unless it is locked.
    pub fn blocker_of(&self, id: &CourseId) -> Result<Option<Blocker>, malla_core::CurriculumError> {
        let missing = self.missing_prerequisites_of(id)?;
        if missing.is_empty() {
            return Ok(None);
        }
        Ok(Some(Blocker {
            course: id.clone(),
            missing,
        }))
    }
}
