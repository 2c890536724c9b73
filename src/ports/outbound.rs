//! Outbound ports. Application calls into infrastructure.
//!
//! Implemented by adapters.

use crate::domain::{
    Contact, ContactRole, CorrectionError, DeliveryReceipt, DomainError, Recipient, SignInResult,
};

/// Saved contacts. Order is insertion order and is significant for recipient inference.
#[async_trait::async_trait]
pub trait ContactDirectory: Send + Sync {
    /// All contacts in stored order.
    async fn list(&self) -> Result<Vec<Contact>, DomainError>;

    /// Add a contact. A contact with the same derived id is replaced in place.
    async fn add(&self, contact: NewContact) -> Result<Contact, DomainError>;

    /// Remove a contact by id. `ContactNotFound` when absent.
    async fn remove(&self, id: &str) -> Result<(), DomainError>;
}

/// Input for `ContactDirectory::add`.
#[derive(Debug, Clone, Default)]
pub struct NewContact {
    pub name: String,
    pub handle: String,
    pub role: ContactRole,
    pub aliases: Vec<String>,
    pub notes: String,
}

/// Grammar correction of a whole utterance (AI service wrapper).
#[async_trait::async_trait]
pub trait GrammarCorrector: Send + Sync {
    async fn correct(&self, text: &str) -> Result<String, CorrectionError>;

    /// Provider name for status display (e.g. "groq", "gemini", "basic").
    fn provider(&self) -> &str;
}

/// Transmits a finalized message.
#[async_trait::async_trait]
pub trait DeliveryGateway: Send + Sync {
    /// Send `text` to the recipient. Errors carry a message shown verbatim to the user.
    async fn send(&self, recipient: &Recipient, text: &str)
        -> Result<DeliveryReceipt, DomainError>;
}

/// Telegram login / 2FA. Shares its session with the delivery gateway.
#[async_trait::async_trait]
pub trait AuthPort: Send + Sync {
    async fn is_authenticated(&self) -> Result<bool, DomainError>;

    /// Ask Telegram to send a login code to `phone`.
    async fn request_login_code(&self, phone: &str, api_hash: &str) -> Result<(), DomainError>;

    /// Sign in with the received code. Must follow `request_login_code`.
    async fn sign_in(&self, code: &str) -> Result<SignInResult, DomainError>;

    /// Complete 2FA. Must follow a `PasswordRequired` sign-in result.
    async fn check_password(&self, password: &[u8]) -> Result<(), DomainError>;
}
