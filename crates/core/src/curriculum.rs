//! Curriculum graph - the static course/prerequisite store.
//!
//! A [`Curriculum`] is built once from a [`CurriculumDefinition`] and never
//! mutated afterwards. It answers three questions:
//! - what a course requires ([`Curriculum::prerequisites_of`])
//! - which courses form the milestone set ([`Curriculum::milestone_set`])
//! - how a course is labelled ([`Curriculum::display_name_of`])

use std::collections::HashMap;
use serde::{Deserialize, Serialize};
use crate::course::{Course, PrereqSpec, DEFAULT_MILESTONE_MARKER};
use crate::id::CourseId;

/// The curriculum shipped with the crate.
pub const BUNDLED_CURRICULUM: &str = include_str!("../curricula/enfermeria.json");

/// Error type for curriculum operations.
pub type Result<T> = std::result::Result<T, CurriculumError>;

/// Errors raised by the graph store.
#[derive(Debug, thiserror::Error)]
pub enum CurriculumError {
    /// Identifier has no entry in the graph
    #[error("Unknown course: {0}")]
    UnknownCourse(CourseId),

    /// Identifier defined more than once
    #[error("Duplicate course: {0}")]
    DuplicateCourse(CourseId),

    /// Definition could not be parsed
    #[error("JSON error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Serialized form of a curriculum, as authored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurriculumDefinition {
    /// Programme name
    #[serde(default)]
    pub name: String,

    /// Token that stands for the milestone set in a `requires` attribute
    #[serde(default = "default_marker")]
    pub milestone_marker: String,

    /// Ordered milestone set
    #[serde(default)]
    pub milestone: Vec<CourseId>,

    /// Courses in render order
    pub courses: Vec<CourseDefinition>,
}

/// One course entry of a [`CurriculumDefinition`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseDefinition {
    /// Course key
    pub id: CourseId,

    /// Display name
    #[serde(default)]
    pub name: String,

    /// Semester grouping
    #[serde(default)]
    pub semester: Option<u32>,

    /// Requirement attribute: comma-separated keys or the milestone marker
    #[serde(default)]
    pub requires: String,
}

fn default_marker() -> String {
    DEFAULT_MILESTONE_MARKER.to_string()
}

impl CurriculumDefinition {
    /// Parse a definition from JSON text.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Immutable curriculum graph.
#[derive(Debug, Clone)]
pub struct Curriculum {
    name: String,
    courses: Vec<Course>,
    index: HashMap<CourseId, usize>,
    milestone: Vec<CourseId>,
}

impl Curriculum {
    /// Build from already-typed courses.
    pub fn new(
        name: impl Into<String>,
        courses: Vec<Course>,
        milestone: Vec<CourseId>,
    ) -> Result<Self> {
        let mut index = HashMap::with_capacity(courses.len());
        for (pos, course) in courses.iter().enumerate() {
            if index.insert(course.id.clone(), pos).is_some() {
                return Err(CurriculumError::DuplicateCourse(course.id.clone()));
            }
        }

        // Blank entries can never be completed
        let milestone = milestone.into_iter().filter(|id| !id.is_empty()).collect();

        Ok(Self {
            name: name.into(),
            courses,
            index,
            milestone,
        })
    }

    /// Build from an authored definition, parsing each `requires` attribute.
    pub fn from_definition(def: CurriculumDefinition) -> Result<Self> {
        let marker = def.milestone_marker;
        let courses = def
            .courses
            .into_iter()
            .map(|c| Course {
                prerequisites: PrereqSpec::parse(&c.requires, &marker),
                id: c.id,
                name: c.name,
                semester: c.semester,
            })
            .collect();

        Self::new(def.name, courses, def.milestone)
    }

    /// Parse and build from JSON text.
    pub fn from_json(json: &str) -> Result<Self> {
        Self::from_definition(CurriculumDefinition::from_json(json)?)
    }

    /// The curriculum embedded in the crate.
    pub fn bundled() -> Result<Self> {
        Self::from_json(BUNDLED_CURRICULUM)
    }

    /// Programme name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Prerequisite specification of a course.
    pub fn prerequisites_of(&self, id: &CourseId) -> Result<&PrereqSpec> {
        self.get(id)
            .map(|c| &c.prerequisites)
            .ok_or_else(|| CurriculumError::UnknownCourse(id.clone()))
    }

    /// The ordered milestone set.
    pub fn milestone_set(&self) -> &[CourseId] {
        &self.milestone
    }

    /// Display label, or an empty string when the course is unknown.
    pub fn display_name_of(&self, id: &CourseId) -> &str {
        self.get(id).map(|c| c.name.as_str()).unwrap_or("")
    }

    /// Semester of a course, if the definition gave one.
    pub fn semester_of(&self, id: &CourseId) -> Option<u32> {
        self.get(id).and_then(|c| c.semester)
    }

    /// Look up a course.
    pub fn get(&self, id: &CourseId) -> Option<&Course> {
        self.index.get(id).map(|&pos| &self.courses[pos])
    }

    /// Whether the graph has this course.
    pub fn contains(&self, id: &CourseId) -> bool {
        self.index.contains_key(id)
    }

    /// All courses in definition order.
    pub fn courses(&self) -> impl Iterator<Item = &Course> {
        self.courses.iter()
    }

    /// Number of courses.
    pub fn len(&self) -> usize {
        self.courses.len()
    }

    /// Whether the graph has no courses.
    pub fn is_empty(&self) -> bool {
        self.courses.is_empty()
    }

    /// Milestone entries that do not name a course in the graph.
    ///
    /// The milestone set is curated by hand alongside the graph. A gap here
    /// means the aggregate requirement can never be met through the engine.
    pub fn milestone_gaps(&self) -> Vec<&CourseId> {
        self.milestone
            .iter()
            .filter(|id| !self.contains(id))
            .collect()
    }
}
