use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ParseError;

/// Length of the ledger's object ids (hex-encoded 12-byte object ids).
pub const ACCOUNT_ID_LEN: usize = 24;

/// Opaque identifier for ledger objects (accounts, merchants, purchases, transfers).
///
/// Reads accept any id the ledger hands back; user-entered ids go through
/// [`AccountId::parse`], which enforces the 24 hex character shape.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(String);

impl AccountId {
    /// Wrap an id without checking its shape.
    pub fn from_string(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Parse user input, trimming surrounding whitespace.
    pub fn parse(value: &str) -> Result<Self, ParseError> {
        let trimmed = value.trim();
        if Self::is_well_formed(trimmed) {
            Ok(Self(trimmed.to_string()))
        } else {
            Err(ParseError::AccountId {
                raw: value.to_string(),
            })
        }
    }

    /// Returns true if the string has the ledger's id shape.
    pub fn is_well_formed(value: &str) -> bool {
        value.len() == ACCOUNT_ID_LEN && value.chars().all(|c| c.is_ascii_hexdigit())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for AccountId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for AccountId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl AsRef<str> for AccountId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
