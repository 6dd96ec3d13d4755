//! Storage abstraction and implementations for Malla.
//!
//! This crate provides a trait-based persistence interface for the
//! completion set, with a JSON file backend and an in-memory backend.

#![warn(missing_docs)]

pub mod trait_;
pub mod json_storage;
pub mod memory;

pub use trait_::{ProgressStore, StorageError, Result};
pub use json_storage::JsonStorage;
pub use memory::MemoryStorage;
