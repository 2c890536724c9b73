//! Implements DeliveryGateway using grammers Client.
//!
//! Resolves handles (username or phone) to peers and sends plain text messages.
//! FloodWait is surfaced as `DomainError::FloodWait`; the user decides when to retry.

use crate::domain::{DeliveryReceipt, DomainError, MIN_PHONE_DIGITS, Recipient};
use crate::ports::DeliveryGateway;
use async_trait::async_trait;
use chrono::Utc;
use grammers_client::Client;
use grammers_client::InvocationError;
use grammers_client::peer::Peer;
use grammers_session::types::PeerRef;
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

static USERNAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9_]{2,31}$").expect("username regex"));

/// A recipient handle in the form Telegram can look up.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TargetHandle {
    /// Username without the leading `@`.
    Username(String),
    /// Phone number, digits only.
    Phone(String),
}

/// Normalize `@name`, `name`, `t.me/name` or a phone number.
pub fn parse_handle(raw: &str) -> Result<TargetHandle, DomainError> {
    let raw = raw.trim();
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    let phone_like = raw
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | ' ' | '-' | '(' | ')'));
    if phone_like && digits.len() >= MIN_PHONE_DIGITS {
        return Ok(TargetHandle::Phone(digits));
    }

    let name = raw
        .trim_start_matches("https://")
        .trim_start_matches("t.me/")
        .trim_start_matches('@');
    if USERNAME_RE.is_match(name) {
        Ok(TargetHandle::Username(name.to_string()))
    } else {
        Err(DomainError::DeliveryFailed(format!(
            "'{}' is not a Telegram username or phone number",
            raw
        )))
    }
}

/// Map a grammers invocation error to the domain. 420 is FLOOD_WAIT_X.
pub fn map_invocation_error(e: InvocationError) -> DomainError {
    match e {
        InvocationError::Rpc(rpc) if rpc.code == 420 => DomainError::FloodWait {
            seconds: rpc.value.unwrap_or(60) as u64,
        },
        InvocationError::Rpc(rpc) => DomainError::DeliveryFailed(rpc.to_string()),
        other => DomainError::DeliveryFailed(other.to_string()),
    }
}

/// Telegram delivery adapter. Wraps a grammers Client clone (same session as the auth adapter).
pub struct GrammersDeliveryGateway {
    client: Client,
    /// Resolved peers by handle, so repeated sends skip resolveUsername / getDialogs (avoids FLOOD_WAIT).
    peer_cache: Mutex<HashMap<TargetHandle, PeerRef>>,
}

impl GrammersDeliveryGateway {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            peer_cache: Mutex::new(HashMap::new()),
        }
    }

    async fn resolve_peer(&self, target: &TargetHandle) -> Result<PeerRef, DomainError> {
        {
            let cache = self.peer_cache.lock().await;
            if let Some(peer) = cache.get(target) {
                return Ok(peer.clone());
            }
        }

        let peer = match target {
            TargetHandle::Username(name) => self
                .client
                .resolve_username(name)
                .await
                .map_err(map_invocation_error)?
                .ok_or_else(|| {
                    DomainError::DeliveryFailed(format!("no Telegram user @{}", name))
                })?,
            TargetHandle::Phone(digits) => self.find_by_phone(digits).await?,
        };

        let peer_ref = peer
            .to_ref()
            .await
            .map_err(|e| DomainError::DeliveryFailed(e.to_string()))?
            .ok_or_else(|| DomainError::DeliveryFailed("peer not in session cache".into()))?;
        self.peer_cache
            .lock()
            .await
            .insert(target.clone(), peer_ref.clone());
        debug!(?target, "peer resolved");
        Ok(peer_ref)
    }

    /// Phone numbers can't be resolved directly; look through dialogs for a user with that number.
    async fn find_by_phone(&self, digits: &str) -> Result<Peer, DomainError> {
        let mut dialogs = self.client.iter_dialogs();
        while let Some(dialog) = dialogs.next().await.map_err(map_invocation_error)? {
            if let Peer::User(user) = dialog.peer() {
                let matches = user.phone().is_some_and(|p| {
                    p.chars().filter(|c| c.is_ascii_digit()).collect::<String>() == digits
                });
                if matches {
                    return Ok(dialog.peer().clone());
                }
            }
        }
        Err(DomainError::DeliveryFailed(format!(
            "no chat with phone number +{}; message them once from the Telegram app first",
            digits
        )))
    }
}

#[async_trait]
impl DeliveryGateway for GrammersDeliveryGateway {
    async fn send(&self, recipient: &Recipient, text: &str) -> Result<DeliveryReceipt, DomainError> {
        let target = parse_handle(recipient.handle())?;
        let peer = self.resolve_peer(&target).await?;

        let message = match self.client.send_message(peer, text).await {
            Ok(m) => m,
            Err(e) => {
                let err = map_invocation_error(e);
                warn!(recipient = %recipient.display_name(), error = %err, "send failed");
                return Err(err);
            }
        };

        info!(
            recipient = %recipient.display_name(),
            message_id = message.id(),
            "message sent"
        );
        Ok(DeliveryReceipt {
            recipient_display_name: recipient.display_name().to_string(),
            recipient_handle: recipient.handle().to_string(),
            message_id: Some(message.id()),
            sent_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_username_forms() {
        for raw in ["@imran_k", "imran_k", " t.me/imran_k ", "https://t.me/imran_k"] {
            assert_eq!(
                parse_handle(raw).unwrap(),
                TargetHandle::Username("imran_k".into()),
                "{}",
                raw
            );
        }
    }

    #[test]
    fn test_parse_phone() {
        assert_eq!(
            parse_handle("+1 (555) 010-2030").unwrap(),
            TargetHandle::Phone("15550102030".into())
        );
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(
            parse_handle("not a handle"),
            Err(DomainError::DeliveryFailed(_))
        ));
        assert!(parse_handle("@").is_err());
        assert!(parse_handle("12").is_err());
    }

    #[test]
    fn test_phone_threshold_boundary() {
        assert_eq!(
            parse_handle("5551234").unwrap(),
            TargetHandle::Phone("5551234".into())
        );
        assert!(parse_handle("555123").is_err());
    }
}
