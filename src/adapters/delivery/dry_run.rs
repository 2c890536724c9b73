//! Delivery gateway that only logs. Used when `dry_run` is set; Telegram is
//! never contacted.

use crate::domain::{DeliveryReceipt, DomainError, Recipient};
use crate::ports::DeliveryGateway;
use chrono::Utc;
use tracing::info;

#[derive(Debug, Default)]
pub struct DryRunGateway;

impl DryRunGateway {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait::async_trait]
impl DeliveryGateway for DryRunGateway {
    async fn send(&self, recipient: &Recipient, text: &str) -> Result<DeliveryReceipt, DomainError> {
        info!(
            recipient = %recipient.display_name(),
            handle = %recipient.handle(),
            chars = text.chars().count(),
            "dry run: message not sent"
        );
        Ok(DeliveryReceipt {
            recipient_display_name: recipient.display_name().to_string(),
            recipient_handle: recipient.handle().to_string(),
            message_id: None,
            sent_at: Utc::now(),
        })
    }
}
