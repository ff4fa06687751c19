//! Storage abstraction and implementations for casegate.
//!
//! This crate provides the `CaseStore` trait consumed by the workflow
//! engine, a JSON-file backend and an in-memory backend.

#![warn(missing_docs)]

pub mod trait_;
pub mod json_storage;
pub mod memory;

pub use trait_::{CaseStore, StorageError, Result};
pub use json_storage::JsonStorage;
pub use memory::MemoryStorage;
