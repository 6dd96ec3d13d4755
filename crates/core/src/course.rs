//! Course model - a curriculum unit and its prerequisite specification.

use serde::{Deserialize, Serialize};
use crate::id::CourseId;

/// Marker token authors use for "everything through the milestone set".
pub const DEFAULT_MILESTONE_MARKER: &str = "hasta-octavo";

/// A course ("ramo") in the curriculum graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    /// Unique identifier
    pub id: CourseId,

    /// Human-readable label
    pub name: String,

    /// Semester the course is taught in, used only for grouping
    pub semester: Option<u32>,

    /// What must be completed before this course becomes available
    pub prerequisites: PrereqSpec,
}

/// Prerequisite specification for a course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "courses", rename_all = "snake_case")]
pub enum PrereqSpec {
    /// Every listed course must be completed
    Explicit(Vec<CourseId>),
    /// Every course in the curriculum's milestone set must be completed
    Milestone,
}

impl PrereqSpec {
    /// No requirements.
    pub fn none() -> Self {
        PrereqSpec::Explicit(Vec::new())
    }

    /// Parse the markup attribute form: `"a,b,c"`, or the marker token.
    ///
    /// Empty entries are dropped, so `"a,,b,"` yields `[a, b]` and `""` yields
    /// an empty list. Only the first raw entry is compared against `marker`,
    /// so `",hasta-octavo"` is an explicit list.
    pub fn parse(raw: &str, marker: &str) -> Self {
        let first = raw.split(',').next().map(str::trim).unwrap_or("");
        if first == marker {
            return PrereqSpec::Milestone;
        }

        PrereqSpec::Explicit(
            raw.split(',')
                .map(CourseId::new)
                .filter(|id| !id.is_empty())
                .collect(),
        )
    }

    /// Whether this is the milestone marker.
    pub fn is_milestone(&self) -> bool {
        matches!(self, PrereqSpec::Milestone)
    }
}

impl Default for PrereqSpec {
    fn default() -> Self {
        Self::none()
    }
}
