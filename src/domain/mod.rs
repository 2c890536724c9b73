//! Core domain layer. No external I/O dependencies.
//!
//! Entities and business rules live here. Dependencies flow inward.

pub mod entities;
pub mod errors;

pub use entities::{
    Contact, ContactRole, DeliveryReceipt, DraftOrigin, DraftState, MIN_PHONE_DIGITS, MessageDraft,
    Recipient, SignInResult,
};
pub use errors::{CorrectionError, DomainError};
