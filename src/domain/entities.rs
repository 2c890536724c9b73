//! Domain entities. Pure data structures for the core business.
//!
//! No Telegram/IO types here; adapters map into these.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A saved contact the user can message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub id: String,
    #[serde(rename = "name")]
    pub display_name: String,
    /// Delivery address: `@username`, bare username, or phone number.
    pub handle: String,
    #[serde(default)]
    pub role: ContactRole,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub notes: String,
}

impl Contact {
    /// Derive the stable id from a display name: lowercase, whitespace runs -> `_`.
    pub fn id_for_name(name: &str) -> String {
        name.split_whitespace()
            .map(str::to_lowercase)
            .collect::<Vec<_>>()
            .join("_")
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactRole {
    #[default]
    Colleague,
    Boss,
    Friend,
    #[serde(other)]
    Other,
}

impl ContactRole {
    pub const ALL: [ContactRole; 4] = [
        ContactRole::Colleague,
        ContactRole::Boss,
        ContactRole::Friend,
        ContactRole::Other,
    ];

    /// Map a spoken role word ("my boss", "my manager") to a role.
    pub fn from_spoken(word: &str) -> Option<Self> {
        match word.to_lowercase().as_str() {
            "boss" | "manager" | "lead" => Some(ContactRole::Boss),
            "colleague" | "coworker" | "co-worker" => Some(ContactRole::Colleague),
            "friend" | "buddy" => Some(ContactRole::Friend),
            _ => None,
        }
    }
}

impl fmt::Display for ContactRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContactRole::Colleague => write!(f, "colleague"),
            ContactRole::Boss => write!(f, "boss"),
            ContactRole::Friend => write!(f, "friend"),
            ContactRole::Other => write!(f, "other"),
        }
    }
}

impl FromStr for ContactRole {
    type Err = std::convert::Infallible;

    /// Unknown roles become `Other`, never an error.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_lowercase().as_str() {
            "colleague" => ContactRole::Colleague,
            "boss" => ContactRole::Boss,
            "friend" => ContactRole::Friend,
            _ => ContactRole::Other,
        })
    }
}

/// Fewest digits a handle needs to be treated as a phone number.
pub const MIN_PHONE_DIGITS: usize = 7;

/// Who a draft goes to: a saved contact, or a raw handle typed or dictated by the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum Recipient {
    Contact(Contact),
    /// Accepted verbatim; the delivery gateway validates the format.
    Handle(String),
}

impl Recipient {
    pub fn handle(&self) -> &str {
        match self {
            Recipient::Contact(c) => &c.handle,
            Recipient::Handle(h) => h,
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            Recipient::Contact(c) => &c.display_name,
            Recipient::Handle(h) => h,
        }
    }
}

impl fmt::Display for Recipient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Recipient::Contact(c) => write!(f, "{} ({})", c.display_name, c.handle),
            Recipient::Handle(h) => write!(f, "{}", h),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DraftOrigin {
    Voice,
    Typed,
}

/// An in-progress, editable message before delivery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageDraft {
    pub recipient: Option<Recipient>,
    pub corrected_text: String,
    pub source_text: String,
    pub origin: DraftOrigin,
    pub created_at: DateTime<Utc>,
}

/// Successful delivery. Failures travel as `DomainError::DeliveryFailed`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryReceipt {
    pub recipient_display_name: String,
    pub recipient_handle: String,
    pub message_id: Option<i32>,
    pub sent_at: DateTime<Utc>,
}

/// Lifecycle of the single draft owned by a message session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DraftState {
    Empty,
    Previewing,
    ReadyToSend,
    /// Delivery call in flight.
    Sending,
    Sent,
    Failed,
}

impl fmt::Display for DraftState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DraftState::Empty => write!(f, "Empty"),
            DraftState::Previewing => write!(f, "Previewing"),
            DraftState::ReadyToSend => write!(f, "ReadyToSend"),
            DraftState::Sending => write!(f, "Sending"),
            DraftState::Sent => write!(f, "Sent"),
            DraftState::Failed => write!(f, "Failed"),
        }
    }
}

impl DraftState {
    /// Returns whether a transition from `self` to `target` is valid.
    pub fn can_transition_to(&self, target: &DraftState) -> bool {
        use DraftState::*;
        matches!(
            (self, target),
            (Empty | ReadyToSend | Sent | Failed, Previewing)
                | (Previewing, ReadyToSend)
                | (ReadyToSend | Failed, Sending)
                | (Sending, Sent)
                | (Sending, Failed)
                | (Failed, ReadyToSend)
                // Discard
                | (Previewing | ReadyToSend | Sent | Failed, Empty)
        )
    }
}

/// Result of a successful sign-in step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignInResult {
    Success,
    /// 2FA enabled; call `check_password` next.
    PasswordRequired { hint: Option<String> },
}
