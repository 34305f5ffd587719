//! Error types for the extrack_core library.

use std::fmt;
use std::io;

use crate::types::UserId;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for extrack_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Client input was rejected before touching the store
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// No user exists with the given id
    #[error("User not found: {0}")]
    NotFound(UserId),

    /// The store failed to read or persist a document
    #[error("Store error: {0}")]
    Store(String),

    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Input field a [`ValidationError`] refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Field {
    Username,
    Description,
    Duration,
    /// Date supplied when appending an exercise
    Date,
    From,
    To,
    Limit,
    /// The `from`/`to` pair taken together
    Range,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Username => "username",
            Field::Description => "description",
            Field::Duration => "duration",
            Field::Date => "date",
            Field::From => "from",
            Field::To => "to",
            Field::Limit => "limit",
            Field::Range => "range",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rejected client input, naming the offending field.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("Invalid {field}: {reason}")]
pub struct ValidationError {
    pub field: Field,
    pub reason: String,
}

impl ValidationError {
    pub fn new(field: Field, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}
