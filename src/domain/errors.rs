//! Domain errors. Used by ports and use cases.
//!
//! Adapters map infrastructure errors into these. Every variant renders a
//! message that can be shown to the user as-is.

use super::entities::DraftState;
use thiserror::Error;

/// Failure of a grammar correction provider.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CorrectionError {
    #[error("grammar service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("grammar service rate limited{}", retry_hint(.retry_after_secs))]
    RateLimited { retry_after_secs: Option<u64> },
}

fn retry_hint(secs: &Option<u64>) -> String {
    secs.map(|s| format!(" (retry after {}s)", s))
        .unwrap_or_default()
}

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Nothing to send: the message is empty")]
    EmptyInput,

    #[error("No recipient: pick a contact or enter a handle before sending")]
    UnresolvedRecipient,

    #[error("Correction unavailable: {0}")]
    CorrectionUnavailable(#[from] CorrectionError),

    #[error("Delivery failed: {0}")]
    DeliveryFailed(String),

    #[error("Contact directory unavailable: {0}")]
    DirectoryUnavailable(String),

    #[error("Contact not found: {0}")]
    ContactNotFound(String),

    #[error("Invalid contact: {0}")]
    InvalidContact(String),

    #[error("Cannot {operation} while the draft is {state}")]
    InvalidState {
        operation: &'static str,
        state: DraftState,
    },

    /// Telegram asked us to slow down. Surfaced to the user, never retried automatically.
    #[error("FloodWait: retry after {seconds} seconds")]
    FloodWait { seconds: u64 },

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Dictation error: {0}")]
    Dictation(String),

    #[error("UI error: {0}")]
    Ui(String),

    #[error("Configuration error: {0}")]
    Config(String),
}
