//! Core domain types for the exercise tracker.
//!
//! This module defines the fundamental types used throughout the system:
//! - User identifiers and validated usernames
//! - Users and their append-only exercise history
//! - Registration outcomes

use chrono::NaiveDate;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use uuid::Uuid;

use crate::error::{Field, ValidationError};

// ============================================================================
// Identity Types
// ============================================================================

/// Number of hex characters kept from a random UUID for a user id
const USER_ID_LEN: usize = 12;

/// Opaque short identifier assigned to a user at registration
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Generate a fresh random id
    pub fn generate() -> Self {
        let mut id = Uuid::new_v4().simple().to_string();
        id.truncate(USER_ID_LEN);
        Self(id)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for UserId {
    fn from(value: &str) -> Self {
        Self(value.trim().to_string())
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A username that passed validation
///
/// 3 to 40 ASCII characters. The first is alphanumeric; the rest are
/// alphanumeric, `_` or `-`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Username(String);

impl Username {
    pub const MIN_LEN: usize = 3;
    pub const MAX_LEN: usize = 40;

    /// Trim and validate a raw username
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let name = raw.trim();
        let len = name.chars().count();
        if !(Self::MIN_LEN..=Self::MAX_LEN).contains(&len) {
            return Err(ValidationError::new(
                Field::Username,
                format!(
                    "must be between {} and {} characters",
                    Self::MIN_LEN,
                    Self::MAX_LEN
                ),
            ));
        }

        let mut chars = name.chars();
        let starts_alphanumeric = chars.next().is_some_and(|c| c.is_ascii_alphanumeric());
        if !starts_alphanumeric {
            return Err(ValidationError::new(
                Field::Username,
                "must start with a letter or digit",
            ));
        }
        if !chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-') {
            return Err(ValidationError::new(
                Field::Username,
                "may only contain letters, digits, '_' and '-'",
            ));
        }

        Ok(Self(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Username {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Username> for String {
    fn from(value: Username) -> Self {
        value.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// User and Exercise Types
// ============================================================================

/// A single logged activity
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Exercise {
    pub description: String,
    /// Minutes, finite and positive once stored
    #[serde(serialize_with = "serialize_minutes")]
    pub duration: f64,
    pub date: NaiveDate,
}

/// Write whole minutes as integers and fractional ones as floats
pub(crate) fn serialize_minutes<S>(minutes: &f64, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    if minutes.fract() == 0.0 && minutes.abs() < MAX_EXACT_INTEGER {
        serializer.serialize_i64(*minutes as i64)
    } else {
        serializer.serialize_f64(*minutes)
    }
}

/// Largest magnitude below which every integer is exact in an f64
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

/// An account and its exercise history in append order
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: UserId,
    pub username: Username,
    #[serde(default)]
    pub exercises: Vec<Exercise>,
}

impl User {
    /// A new user with an empty history
    pub fn new(id: UserId, username: Username) -> Self {
        Self {
            id,
            username,
            exercises: Vec::new(),
        }
    }
}

/// Outcome of a find-or-create registration
#[derive(Clone, Debug)]
pub struct Registration {
    pub user: User,
    /// False when the username was already registered
    pub created: bool,
}
