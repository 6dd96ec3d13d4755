//! Malla core data models.
//!
//! This crate defines the curriculum graph: courses, their prerequisite
//! specifications, and the milestone set used by aggregate requirements.

#![warn(missing_docs)]

// Core identities
mod id;

// Curriculum graph
mod course;
mod curriculum;

// Re-exports
pub use id::CourseId;

pub use course::{Course, PrereqSpec, DEFAULT_MILESTONE_MARKER};
pub use curriculum::{
    Curriculum, CurriculumDefinition, CourseDefinition, CurriculumError, Result,
    BUNDLED_CURRICULUM,
};
