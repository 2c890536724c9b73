//! Application use cases. Orchestrate domain logic via ports.

pub mod addressing;
pub mod auth_service;
pub mod auto_preview;
pub mod contacts_service;
pub mod message_session;
pub mod recipient_resolver;
pub mod status;

pub use auth_service::AuthService;
pub use auto_preview::AutoPreview;
pub use contacts_service::ContactsService;
pub use message_session::{DraftEdit, MessageSession, PreviewOutcome, SendOutcome, SessionOptions};
pub use recipient_resolver::{RecipientResolver, Resolution};
