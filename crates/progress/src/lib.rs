//! Progress Tracking
//!
//! Course status derivation, completion toggles, and blocker explanations.

#![warn(missing_docs)]

pub mod engine;
pub mod blocker;
pub mod tracker;

pub use engine::{
    CompletionSet, CourseStatus, ProgressEngine, ProgressSnapshot, Status, ToggleOutcome,
};
pub use blocker::{blocking_message, Blocker, BLOCKING_HEADER};
pub use tracker::{ProgressTracker, TrackerError};
