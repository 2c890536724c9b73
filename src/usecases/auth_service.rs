//! Handle Login / 2FA flow. Delegates to AuthPort for Telegram and AuthPrompt for input.

use crate::domain::{DomainError, SignInResult};
use crate::ports::{AuthPort, AuthPrompt};
use std::sync::Arc;
use tracing::info;

pub struct AuthService {
    auth: Arc<dyn AuthPort>,
    api_hash: String,
    /// Phone from config; prompted for when unset.
    phone: Option<String>,
}

impl AuthService {
    pub fn new(auth: Arc<dyn AuthPort>, api_hash: String, phone: Option<String>) -> Self {
        Self {
            auth,
            api_hash,
            phone,
        }
    }

    pub async fn is_authenticated(&self) -> Result<bool, DomainError> {
        self.auth.is_authenticated().await
    }

    /// Run full auth flow (phone -> code -> 2FA if needed). No-op when already signed in.
    pub async fn run_auth_flow(&self, prompt: &dyn AuthPrompt) -> Result<(), DomainError> {
        if self.auth.is_authenticated().await? {
            info!("telegram session already authorized");
            return Ok(());
        }

        let phone = match self.phone.as_deref().map(str::trim) {
            Some(p) if !p.is_empty() => p.to_string(),
            _ => prompt.phone().await?.trim().to_string(),
        };
        if phone.is_empty() {
            return Err(DomainError::Auth("phone number is required".into()));
        }

        self.auth.request_login_code(&phone, &self.api_hash).await?;
        info!("login code requested; check your Telegram app");

        let code = prompt.login_code().await?;
        match self.auth.sign_in(code.trim()).await? {
            SignInResult::Success => {}
            SignInResult::PasswordRequired { hint } => {
                info!("two-factor authentication enabled; password required");
                let password = prompt.password(hint.as_deref()).await?;
                self.auth.check_password(password.as_bytes()).await?;
            }
        }

        info!("signed in to telegram");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::Mutex;

    #[derive(Default)]
    struct FakeAuth {
        authorized: bool,
        needs_password: bool,
        log: Mutex<Vec<String>>,
    }

    #[async_trait::async_trait]
    impl AuthPort for FakeAuth {
        async fn is_authenticated(&self) -> Result<bool, DomainError> {
            Ok(self.authorized)
        }

        async fn request_login_code(&self, phone: &str, api_hash: &str) -> Result<(), DomainError> {
            self.log.lock().await.push(format!("code:{}:{}", phone, api_hash));
            Ok(())
        }

        async fn sign_in(&self, code: &str) -> Result<SignInResult, DomainError> {
            self.log.lock().await.push(format!("sign_in:{}", code));
            if code != "12345" {
                return Err(DomainError::Auth("Invalid login code.".into()));
            }
            Ok(if self.needs_password {
                SignInResult::PasswordRequired {
                    hint: Some("pet".into()),
                }
            } else {
                SignInResult::Success
            })
        }

        async fn check_password(&self, password: &[u8]) -> Result<(), DomainError> {
            self.log
                .lock()
                .await
                .push(format!("password:{}", String::from_utf8_lossy(password)));
            Ok(())
        }
    }

    struct Answers {
        code: &'static str,
        hints: Mutex<Vec<Option<String>>>,
    }

    #[async_trait::async_trait]
    impl AuthPrompt for Answers {
        async fn phone(&self) -> Result<String, DomainError> {
            Ok(" +15550001111 ".into())
        }
        async fn login_code(&self) -> Result<String, DomainError> {
            Ok(self.code.into())
        }
        async fn password(&self, hint: Option<&str>) -> Result<String, DomainError> {
            self.hints.lock().await.push(hint.map(String::from));
            Ok("hunter2".into())
        }
    }

    fn answers(code: &'static str) -> Answers {
        Answers {
            code,
            hints: Mutex::new(vec![]),
        }
    }

    #[tokio::test]
    async fn test_already_authorized_skips_prompts() {
        let auth = Arc::new(FakeAuth {
            authorized: true,
            ..Default::default()
        });
        let service = AuthService::new(auth.clone(), "hash".into(), None);
        service.run_auth_flow(&answers("00000")).await.unwrap();
        assert!(auth.log.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_code_flow_with_prompted_phone() {
        let auth = Arc::new(FakeAuth::default());
        let service = AuthService::new(auth.clone(), "hash".into(), None);
        service.run_auth_flow(&answers(" 12345 ")).await.unwrap();
        assert_eq!(
            *auth.log.lock().await,
            vec!["code:+15550001111:hash", "sign_in:12345"]
        );
    }

    #[tokio::test]
    async fn test_password_flow_uses_configured_phone() {
        let auth = Arc::new(FakeAuth {
            needs_password: true,
            ..Default::default()
        });
        let service = AuthService::new(auth.clone(), "h".into(), Some("+441234".into()));
        let prompt = answers("12345");
        service.run_auth_flow(&prompt).await.unwrap();
        assert_eq!(
            *auth.log.lock().await,
            vec!["code:+441234:h", "sign_in:12345", "password:hunter2"]
        );
        assert_eq!(*prompt.hints.lock().await, vec![Some("pet".to_string())]);
    }

    #[tokio::test]
    async fn test_invalid_code_is_auth_error() {
        let service = AuthService::new(Arc::new(FakeAuth::default()), "h".into(), None);
        assert!(matches!(
            service.run_auth_flow(&answers("99999")).await,
            Err(DomainError::Auth(_))
        ));
    }
}
