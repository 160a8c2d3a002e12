//! Error taxonomy for ledger reads, feed shaping and submissions.

use serde::Deserialize;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, LedgerError>;

/// A value coming from the ledger or from a navigation payload could not be
/// interpreted. Never fatal: callers pick the fallback.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("invalid date {raw:?}")]
    Date { raw: String },

    #[error("invalid account id {raw:?}: expected 24 hexadecimal characters")]
    AccountId { raw: String },

    #[error("invalid transaction payload: {reason}")]
    Payload { reason: String },
}

#[derive(Debug, Error)]
pub enum LedgerError {
    /// Non-2xx response from a remote API.
    #[error("remote request failed ({status}): {body}")]
    RemoteRequest { status: u16, body: String },

    /// User input rejected before any network call.
    #[error("validation failed: {0}")]
    Validation(String),

    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Pre-flight lookup for an account returned 404.
    #[error("account not found: {0}")]
    AccountNotFound(String),

    #[error("missing configuration: {0}")]
    Config(String),

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Deserialize)]
struct ServerMessage {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl LedgerError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::RemoteRequest { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// The most specific message available for display.
    ///
    /// Remote failures prefer the server's own `message` (or `error`) field
    /// and fall back to `HTTP <status>` when the body carries neither.
    pub fn user_message(&self) -> String {
        match self {
            Self::RemoteRequest { status, body } => serde_json::from_str::<ServerMessage>(body)
                .ok()
                .and_then(|m| m.message.or(m.error))
                .map(|m| m.trim().to_string())
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| format!("HTTP {status}")),
            Self::Validation(message) => message.clone(),
            Self::AccountNotFound(id) => format!("Account {id} was not found"),
            other => other.to_string(),
        }
    }
}
