//! User identity models

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier for an authenticated user.
///
/// Ids are minted by the server; the client only stores one and echoes it
/// back as the scope of todo queries, so it carries no local structure and
/// no parsing rules.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Get the string representation of this ID
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for UserId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for UserId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Account payload returned by the login and signup mutations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Server-assigned user id, the value the session slot persists
    pub id: UserId,
    /// Email the account was registered with
    pub email: String,
}
