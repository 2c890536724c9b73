//! Telegram session storage and client construction.
//!
//! The session is a SQLite file (grammers-session's SqliteSession) so the
//! login survives restarts. Auth adapter and delivery gateway share one client.

use crate::domain::DomainError;
use grammers_client::{Client, SenderPool};
use grammers_session::storages::SqliteSession;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Open (or create) the session file, creating parent directories as needed.
pub async fn open_file_session(path: &Path) -> Result<SqliteSession, DomainError> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| DomainError::Config(format!("create session directory: {}", e)))?;
    }
    SqliteSession::open(path)
        .await
        .map_err(|e| DomainError::Config(format!("open session file {}: {}", path.display(), e)))
}

/// Connect a client for `api_id` on the session at `session_path`.
///
/// The sender pool runner is spawned onto the current runtime and lives as long as the process.
pub async fn connect(api_id: i32, session_path: &Path) -> Result<Client, DomainError> {
    if api_id == 0 {
        return Err(DomainError::Config(
            "api_id is not set (TG_DICTATE_API_ID); get one from https://my.telegram.org".into(),
        ));
    }
    let session = Arc::new(open_file_session(session_path).await?);
    let pool = SenderPool::new(session, api_id);
    let handle = pool.handle.clone();
    tokio::spawn(async move {
        pool.runner.run().await;
    });
    info!(session = %session_path.display(), "telegram client started");
    Ok(Client::new(handle))
}
