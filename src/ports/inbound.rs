//! Inbound ports. UI (adapter) calls into the application.

use crate::domain::DomainError;

/// Input port: UI/CLI invokes application use cases.
#[async_trait::async_trait]
pub trait InputPort: Send + Sync {
    /// Run the interactive loop (compose, review, send, manage contacts) until the user quits.
    async fn run(&self) -> Result<(), DomainError>;
}

/// Prompts the auth flow needs from whoever is driving it.
#[async_trait::async_trait]
pub trait AuthPrompt: Send + Sync {
    async fn phone(&self) -> Result<String, DomainError>;

    async fn login_code(&self) -> Result<String, DomainError>;

    async fn password(&self, hint: Option<&str>) -> Result<String, DomainError>;
}
