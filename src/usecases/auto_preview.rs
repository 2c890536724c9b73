//! Glue between a dictation source and the message session: every capture-end
//! with text triggers a preview. Re-triggers on every capture, not just the first.

use crate::domain::{Contact, DomainError, DraftOrigin};
use crate::ports::{DictationEvent, DictationSource};
use crate::usecases::message_session::{MessageSession, PreviewOutcome};
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct AutoPreview {
    session: Arc<MessageSession>,
}

impl AutoPreview {
    pub fn new(session: Arc<MessageSession>) -> Self {
        Self { session }
    }

    /// Handle one event. Returns `Some` only when a preview was triggered.
    pub async fn on_event(
        &self,
        event: DictationEvent,
        explicit_contact: Option<&Contact>,
    ) -> Option<Result<PreviewOutcome, DomainError>> {
        match event {
            DictationEvent::CaptureEnded { text } if !text.trim().is_empty() => {
                info!(text_len = text.len(), "capture ended; previewing");
                Some(
                    self.session
                        .preview(&text, explicit_contact, DraftOrigin::Voice)
                        .await,
                )
            }
            DictationEvent::CaptureEnded { .. } => {
                debug!("capture ended without text");
                None
            }
            DictationEvent::Error(msg) => {
                warn!(error = %msg, "dictation error");
                Some(Err(DomainError::Dictation(msg)))
            }
            DictationEvent::Started | DictationEvent::Interim(_) => None,
        }
    }

    /// Consume events until a capture produces a preview (or an error).
    ///
    /// `on_interim` sees every interim transcript. Returns `None` when the
    /// source is exhausted. Call again for the next capture.
    pub async fn next_preview(
        &self,
        source: &mut dyn DictationSource,
        explicit_contact: Option<&Contact>,
        mut on_interim: impl FnMut(&str) + Send,
    ) -> Option<Result<PreviewOutcome, DomainError>> {
        while let Some(event) = source.next_event().await {
            if let DictationEvent::Interim(text) = &event {
                on_interim(text);
            }
            if let Some(result) = self.on_event(event, explicit_contact).await {
                return Some(result);
            }
        }
        None
    }
}
