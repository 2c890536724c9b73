//! Implements ContactDirectory using a JSON file.
//!
//! The file is re-read on every call so edits from another process are picked
//! up; writes are serialized in-process and last-write-wins across processes.

use crate::domain::{Contact, DomainError};
use crate::ports::{ContactDirectory, NewContact};
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::info;

/// On-disk format: `{"contacts": [...]}` in insertion order.
#[derive(Debug, Default, Serialize, Deserialize)]
struct ContactsFile {
    #[serde(default)]
    contacts: Vec<Contact>,
}

/// JSON file-based contact directory.
pub struct JsonContactDirectory {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonContactDirectory {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Missing file means an empty directory; an unreadable or corrupt one is unavailable.
    async fn read(&self) -> Result<ContactsFile, DomainError> {
        match fs::read_to_string(&self.path).await {
            Ok(s) if s.trim().is_empty() => Ok(ContactsFile::default()),
            Ok(s) => serde_json::from_str(&s).map_err(|e| {
                DomainError::DirectoryUnavailable(format!(
                    "{} is not valid contacts JSON: {}",
                    self.path.display(),
                    e
                ))
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(ContactsFile::default()),
            Err(e) => Err(DomainError::DirectoryUnavailable(format!(
                "read {}: {}",
                self.path.display(),
                e
            ))),
        }
    }

    /// Atomic save: write temp file, fsync, rename over the target.
    async fn write(&self, data: &ContactsFile) -> Result<(), DomainError> {
        let unavailable = |what: &str, e: std::io::Error| {
            DomainError::DirectoryUnavailable(format!("{}: {}", what, e))
        };
        let json = serde_json::to_string_pretty(data)
            .map_err(|e| DomainError::DirectoryUnavailable(e.to_string()))?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .await
                    .map_err(|e| unavailable("create contacts directory", e))?;
            }
        }

        let temp_path = self.path.with_extension("json.tmp");
        let mut f = fs::File::create(&temp_path)
            .await
            .map_err(|e| unavailable("create temp file", e))?;
        f.write_all(json.as_bytes())
            .await
            .map_err(|e| unavailable("write temp file", e))?;
        f.sync_all()
            .await
            .map_err(|e| unavailable("sync temp file", e))?;
        drop(f);

        fs::rename(&temp_path, &self.path)
            .await
            .map_err(|e| unavailable("atomic rename failed", e))?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl ContactDirectory for JsonContactDirectory {
    async fn list(&self) -> Result<Vec<Contact>, DomainError> {
        Ok(self.read().await?.contacts)
    }

    async fn add(&self, new: NewContact) -> Result<Contact, DomainError> {
        let name = new.name.trim().to_string();
        let handle = new.handle.trim().to_string();
        if name.is_empty() {
            return Err(DomainError::InvalidContact("name must not be empty".into()));
        }
        if handle.is_empty() {
            return Err(DomainError::InvalidContact("handle must not be empty".into()));
        }

        let contact = Contact {
            id: Contact::id_for_name(&name),
            display_name: name,
            handle,
            role: new.role,
            aliases: new
                .aliases
                .iter()
                .map(|a| a.trim().to_string())
                .filter(|a| !a.is_empty())
                .collect(),
            notes: new.notes.trim().to_string(),
        };

        let _guard = self.write_lock.lock().await;
        let mut data = self.read().await?;
        match data.contacts.iter_mut().find(|c| c.id == contact.id) {
            Some(existing) => *existing = contact.clone(),
            None => data.contacts.push(contact.clone()),
        }
        self.write(&data).await?;

        info!(id = %contact.id, handle = %contact.handle, "contact saved");
        Ok(contact)
    }

    async fn remove(&self, id: &str) -> Result<(), DomainError> {
        let _guard = self.write_lock.lock().await;
        let mut data = self.read().await?;
        let before = data.contacts.len();
        data.contacts.retain(|c| c.id != id);
        if data.contacts.len() == before {
            return Err(DomainError::ContactNotFound(id.to_string()));
        }
        self.write(&data).await?;

        info!(id, "contact removed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ContactRole;

    fn new_contact(name: &str, handle: &str) -> NewContact {
        NewContact {
            name: name.into(),
            handle: handle.into(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let contacts = JsonContactDirectory::new(dir.path().join("contacts.json"));
        assert!(contacts.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_add_preserves_insertion_order() {
        let dir = tempfile::tempdir().unwrap();
        let contacts = JsonContactDirectory::new(dir.path().join("nested/contacts.json"));
        contacts.add(new_contact("Zoe", "@zoe")).await.unwrap();
        contacts.add(new_contact("Adam", "@adam")).await.unwrap();
        contacts.add(new_contact("Mia", "+15550001111")).await.unwrap();
        assert!(contacts.path().is_file());

        let ids: Vec<String> = contacts.list().await.unwrap().into_iter().map(|c| c.id).collect();
        assert_eq!(ids, vec!["zoe", "adam", "mia"]);
    }

    #[tokio::test]
    async fn test_same_id_replaces_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let contacts = JsonContactDirectory::new(dir.path().join("contacts.json"));
        contacts.add(new_contact("Imran Khan", "@imran")).await.unwrap();
        contacts.add(new_contact("Sara", "@sara")).await.unwrap();
        let updated = contacts
            .add(NewContact {
                name: "imran  khan".into(),
                handle: "@imran_k".into(),
                role: ContactRole::Boss,
                aliases: vec![" IK ".into(), "".into()],
                notes: String::new(),
            })
            .await
            .unwrap();
        assert_eq!(updated.id, "imran_khan");
        assert_eq!(updated.aliases, vec!["IK"]);

        let list = contacts.list().await.unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].handle, "@imran_k");
        assert_eq!(list[0].role, ContactRole::Boss);
        assert_eq!(list[1].id, "sara");
    }

    #[tokio::test]
    async fn test_add_validates() {
        let dir = tempfile::tempdir().unwrap();
        let contacts = JsonContactDirectory::new(dir.path().join("contacts.json"));
        assert!(matches!(
            contacts.add(new_contact("Bob", "  ")).await,
            Err(DomainError::InvalidContact(_))
        ));
        assert!(matches!(
            contacts.add(new_contact("", "@bob")).await,
            Err(DomainError::InvalidContact(_))
        ));
    }

    #[tokio::test]
    async fn test_remove() {
        let dir = tempfile::tempdir().unwrap();
        let contacts = JsonContactDirectory::new(dir.path().join("contacts.json"));
        contacts.add(new_contact("Bob", "@bob")).await.unwrap();
        contacts.remove("bob").await.unwrap();
        assert!(contacts.list().await.unwrap().is_empty());
        assert!(matches!(
            contacts.remove("bob").await,
            Err(DomainError::ContactNotFound(id)) if id == "bob"
        ));
    }

    #[tokio::test]
    async fn test_sees_writes_from_another_instance() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("contacts.json");
        let a = JsonContactDirectory::new(&path);
        let b = JsonContactDirectory::new(&path);
        a.add(new_contact("Bob", "@bob")).await.unwrap();
        assert_eq!(b.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_corrupt_file_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("contacts.json");
        std::fs::write(&path, "{not json").unwrap();
        let contacts = JsonContactDirectory::new(&path);
        assert!(matches!(
            contacts.list().await,
            Err(DomainError::DirectoryUnavailable(_))
        ));
    }
}
