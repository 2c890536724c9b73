//! Health summary: Telegram connection, grammar provider, contact count.

use crate::ports::{AuthPort, ContactDirectory, GrammarCorrector};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TelegramStatus {
    Connected,
    NotAuthorized,
    Error(String),
    /// Dry-run delivery; Telegram not used.
    Disabled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusReport {
    pub telegram: TelegramStatus,
    pub grammar_provider: String,
    pub contacts: Result<usize, String>,
}

impl fmt::Display for StatusReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let telegram = match &self.telegram {
            TelegramStatus::Connected => "connected".to_string(),
            TelegramStatus::NotAuthorized => "not authorized".to_string(),
            TelegramStatus::Error(e) => format!("error ({})", e),
            TelegramStatus::Disabled => "disabled (dry run)".to_string(),
        };
        writeln!(f, "Telegram: {}", telegram)?;
        writeln!(f, "Grammar:  {}", self.grammar_provider)?;
        match &self.contacts {
            Ok(n) => write!(f, "Contacts: {}", n),
            Err(e) => write!(f, "Contacts: unavailable ({})", e),
        }
    }
}

pub async fn collect_status(
    auth: Option<&dyn AuthPort>,
    corrector: &dyn GrammarCorrector,
    directory: &dyn ContactDirectory,
) -> StatusReport {
    let telegram = match auth {
        None => TelegramStatus::Disabled,
        Some(auth) => match auth.is_authenticated().await {
            Ok(true) => TelegramStatus::Connected,
            Ok(false) => TelegramStatus::NotAuthorized,
            Err(e) => TelegramStatus::Error(e.to_string()),
        },
    };
    StatusReport {
        telegram,
        grammar_provider: corrector.provider().to_string(),
        contacts: directory
            .list()
            .await
            .map(|c| c.len())
            .map_err(|e| e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::grammar::BasicCorrector;
    use crate::adapters::persistence::JsonContactDirectory;
    use crate::domain::{DomainError, SignInResult};

    struct Authorized;

    #[async_trait::async_trait]
    impl AuthPort for Authorized {
        async fn is_authenticated(&self) -> Result<bool, DomainError> {
            Ok(true)
        }
        async fn request_login_code(&self, _p: &str, _h: &str) -> Result<(), DomainError> {
            Ok(())
        }
        async fn sign_in(&self, _c: &str) -> Result<SignInResult, DomainError> {
            Ok(SignInResult::Success)
        }
        async fn check_password(&self, _p: &[u8]) -> Result<(), DomainError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_status_report() {
        let dir = tempfile::tempdir().unwrap();
        let contacts = JsonContactDirectory::new(dir.path().join("contacts.json"));
        let report = collect_status(Some(&Authorized), &BasicCorrector::new(), &contacts).await;
        assert_eq!(report.telegram, TelegramStatus::Connected);
        assert_eq!(report.grammar_provider, "basic");
        assert_eq!(report.contacts, Ok(0));
        assert_eq!(
            report.to_string(),
            "Telegram: connected\nGrammar:  basic\nContacts: 0"
        );

        let dry = collect_status(None, &BasicCorrector::new(), &contacts).await;
        assert_eq!(dry.telegram, TelegramStatus::Disabled);
    }
}
