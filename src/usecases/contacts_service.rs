//! Contact management for the UI. Wraps ContactDirectory.
//!
//! A failing directory shows as an empty list (with a warning) so the user can
//! still type a handle manually.

use crate::domain::{Contact, ContactRole, DomainError};
use crate::ports::{ContactDirectory, NewContact};
use std::sync::Arc;
use tracing::{info, warn};

pub struct ContactsService {
    directory: Arc<dyn ContactDirectory>,
}

impl ContactsService {
    pub fn new(directory: Arc<dyn ContactDirectory>) -> Self {
        Self { directory }
    }

    /// Contacts in stored order, plus the directory error if listing failed.
    pub async fn list(&self) -> (Vec<Contact>, Option<DomainError>) {
        match self.directory.list().await {
            Ok(contacts) => (contacts, None),
            Err(e) => {
                warn!(error = %e, "contact directory unavailable; showing empty list");
                (Vec::new(), Some(e))
            }
        }
    }

    pub async fn add(
        &self,
        name: &str,
        handle: &str,
        role: ContactRole,
        aliases: Vec<String>,
        notes: &str,
    ) -> Result<Contact, DomainError> {
        let contact = self
            .directory
            .add(NewContact {
                name: name.to_string(),
                handle: handle.to_string(),
                role,
                aliases,
                notes: notes.to_string(),
            })
            .await?;
        info!(id = %contact.id, "contact added");
        Ok(contact)
    }

    pub async fn remove(&self, id: &str) -> Result<(), DomainError> {
        self.directory.remove(id).await
    }
}

/// Split a comma-separated alias list typed by the user.
pub fn parse_aliases(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::persistence::JsonContactDirectory;

    struct Broken;

    #[async_trait::async_trait]
    impl ContactDirectory for Broken {
        async fn list(&self) -> Result<Vec<Contact>, DomainError> {
            Err(DomainError::DirectoryUnavailable("permission denied".into()))
        }
        async fn add(&self, _c: NewContact) -> Result<Contact, DomainError> {
            Err(DomainError::DirectoryUnavailable("permission denied".into()))
        }
        async fn remove(&self, _id: &str) -> Result<(), DomainError> {
            Err(DomainError::DirectoryUnavailable("permission denied".into()))
        }
    }

    #[tokio::test]
    async fn test_unavailable_directory_lists_empty() {
        let service = ContactsService::new(Arc::new(Broken));
        let (contacts, err) = service.list().await;
        assert!(contacts.is_empty());
        assert!(matches!(err, Some(DomainError::DirectoryUnavailable(_))));
    }

    #[tokio::test]
    async fn test_add_list_remove() {
        let dir = tempfile::tempdir().unwrap();
        let service = ContactsService::new(Arc::new(JsonContactDirectory::new(
            dir.path().join("contacts.json"),
        )));
        let c = service
            .add("Rahul", "@rahul", ContactRole::Friend, parse_aliases("rahu, r"), "")
            .await
            .unwrap();
        assert_eq!(c.aliases, vec!["rahu", "r"]);
        let (list, err) = service.list().await;
        assert!(err.is_none());
        assert_eq!(list, vec![c]);
        service.remove("rahul").await.unwrap();
        assert!(service.list().await.0.is_empty());
    }

    #[test]
    fn test_parse_aliases() {
        assert_eq!(parse_aliases(" a , ,b,"), vec!["a", "b"]);
        assert!(parse_aliases("").is_empty());
    }
}
