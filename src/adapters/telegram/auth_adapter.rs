//! Implements AuthPort using grammers Client.
//!
//! Login is a two- or three-step exchange; the tokens returned by each step
//! are parked here until the next call consumes them.

use crate::adapters::telegram::client::map_invocation_error;
use crate::domain::{DomainError, SignInResult};
use crate::ports::AuthPort;
use async_trait::async_trait;
use grammers_client::client::{LoginToken, PasswordToken};
use grammers_client::{Client, SignInError};
use tokio::sync::Mutex;
use tracing::debug;

/// Auth adapter. Holds a Client clone sharing the session with GrammersDeliveryGateway.
pub struct GrammersAuthAdapter {
    client: Client,
    login_token: Mutex<Option<LoginToken>>,
    password_token: Mutex<Option<PasswordToken>>,
}

impl GrammersAuthAdapter {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            login_token: Mutex::new(None),
            password_token: Mutex::new(None),
        }
    }
}

/// FloodWait keeps its own variant so the user sees how long to wait; everything else is an auth failure.
fn auth_error(step: &str, e: grammers_client::InvocationError) -> DomainError {
    match map_invocation_error(e) {
        flood @ DomainError::FloodWait { .. } => flood,
        other => DomainError::Auth(format!("{}: {}", step, other)),
    }
}

#[async_trait]
impl AuthPort for GrammersAuthAdapter {
    async fn is_authenticated(&self) -> Result<bool, DomainError> {
        self.client
            .is_authorized()
            .await
            .map_err(|e| auth_error("check authorization", e))
    }

    async fn request_login_code(&self, phone: &str, api_hash: &str) -> Result<(), DomainError> {
        let token = self
            .client
            .request_login_code(phone, api_hash)
            .await
            .map_err(|e| auth_error("request login code", e))?;
        *self.login_token.lock().await = Some(token);
        *self.password_token.lock().await = None;
        debug!("login token stored");
        Ok(())
    }

    async fn sign_in(&self, code: &str) -> Result<SignInResult, DomainError> {
        let token = self.login_token.lock().await.take().ok_or_else(|| {
            DomainError::Auth("no login code was requested; start the login again".into())
        })?;
        match self.client.sign_in(&token, code).await {
            Ok(_user) => Ok(SignInResult::Success),
            Err(SignInError::PasswordRequired(pt)) => {
                let hint = pt.hint().map(String::from);
                *self.password_token.lock().await = Some(pt);
                Ok(SignInResult::PasswordRequired { hint })
            }
            Err(SignInError::InvalidCode) => Err(DomainError::Auth(
                "Invalid login code. Start the login again and enter the code Telegram sent.".into(),
            )),
            Err(SignInError::SignUpRequired) => Err(DomainError::Auth(
                "This phone number has no Telegram account. Sign up in the official app first."
                    .into(),
            )),
            Err(e) => Err(DomainError::Auth(format!("sign in: {}", e))),
        }
    }

    async fn check_password(&self, password: &[u8]) -> Result<(), DomainError> {
        let pt = self.password_token.lock().await.take().ok_or_else(|| {
            DomainError::Auth("no two-factor password was requested".into())
        })?;
        self.client
            .check_password(pt, password)
            .await
            .map_err(|e| DomainError::Auth(format!("two-factor password: {}", e)))?;
        Ok(())
    }
}
