#![forbid(unsafe_code)]

//! Core domain model and business logic for the exercise tracker.
//!
//! This crate provides:
//! - Domain types (users, usernames, exercises)
//! - Log query normalization and filtering
//! - Response shapes for the HTTP API
//! - Persistence (in-memory and JSON file stores)
//! - Configuration and logging setup

pub mod types;
pub mod error;
pub mod config;
pub mod logging;
pub mod range;
pub mod filter;
pub mod format;
pub mod store;
mod file_store;
pub mod service;

// Re-export commonly used types
pub use error::{Error, Field, Result, ValidationError};
pub use types::*;
pub use config::Config;
pub use range::{normalize, LogQuery, NormalizedRange};
pub use filter::{filter_log, FilteredLog};
pub use format::{render_date, ExerciseCreated, LogEntry, LogResponse, UserSummary};
pub use store::{open_store, ExerciseStore, FileStore, MemoryStore, StoreUrl};
pub use service::NewExercise;
