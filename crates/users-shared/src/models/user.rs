use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::api::UserInput;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    MissingField(&'static str),
}

/// Stored form of a user: the document body, without its identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub name: String,
    pub email: String,
    pub created_at: String,
    pub updated_at: String,
}

impl UserRecord {
    /// Build the record written on create and update.
    ///
    /// `name` and `email` are copied verbatim. `createdAt` keeps whatever the
    /// caller sent (falling back to `now`), `updatedAt` is always `now`.
    pub fn from_input(input: UserInput, now: DateTime<Utc>) -> Result<Self, ValidationError> {
        let name = required(input.name, "name")?;
        let email = required(input.email, "email")?;
        let stamp = timestamp(now);

        let created_at = input
            .created_at
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| stamp.clone());

        Ok(Self {
            name,
            email,
            created_at,
            updated_at: stamp,
        })
    }

    /// Attach the database-assigned identifier.
    pub fn with_id(self, id: impl Into<String>) -> User {
        User {
            id: id.into(),
            record: self,
        }
    }
}

fn required(value: Option<String>, field: &'static str) -> Result<String, ValidationError> {
    match value {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ValidationError::MissingField(field)),
    }
}

/// API form of a user: `{id, name, email, createdAt, updatedAt}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(flatten)]
    pub record: UserRecord,
}

/// ISO-8601 UTC with millisecond precision, e.g. `2024-05-01T12:00:00.000Z`.
pub fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}
