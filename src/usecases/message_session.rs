//! Message intent builder. Owns the single in-flight draft of one interaction.
//!
//! Lifecycle: Empty -> Previewing -> ReadyToSend -> Sending -> Sent, or
//! Sending -> Failed (draft kept; edit or retry). Methods on `MessageSession`
//! are the only way to mutate the draft.
//!
//! While a preview or send is running, further preview/send triggers are
//! ignored rather than queued. Collaborators are always awaited to completion;
//! the state lock is never held across them.

use crate::domain::{
    Contact, DeliveryReceipt, DomainError, DraftOrigin, DraftState, MessageDraft, Recipient,
};
use crate::ports::{ContactDirectory, DeliveryGateway, GrammarCorrector};
use crate::usecases::addressing::strip_addressing;
use crate::usecases::recipient_resolver::{DEFAULT_FUZZY_THRESHOLD, RecipientResolver};
use chrono::Utc;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Outcome of a preview trigger.
#[derive(Debug, Clone, PartialEq)]
pub enum PreviewOutcome {
    Ready(MessageDraft),
    /// Another preview or send was still running.
    Ignored,
}

/// Outcome of a send trigger. Delivery failures are `Err(DeliveryFailed)`.
#[derive(Debug, Clone, PartialEq)]
pub enum SendOutcome {
    Sent(DeliveryReceipt),
    /// Another preview or send was still running.
    Ignored,
}

/// User edits to a ready draft. `None` fields are left as they are.
#[derive(Debug, Clone, Default)]
pub struct DraftEdit {
    pub text: Option<String>,
    pub recipient: Option<Recipient>,
}

impl DraftEdit {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            recipient: None,
        }
    }

    pub fn recipient(recipient: Recipient) -> Self {
        Self {
            text: None,
            recipient: Some(recipient),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SessionOptions {
    /// Remove "send to NAME saying" from the corrected text once a recipient is known.
    pub strip_addressing: bool,
    /// Minimum Jaro-Winkler score for a misheard name to match a contact.
    pub fuzzy_threshold: f64,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            strip_addressing: false,
            fuzzy_threshold: DEFAULT_FUZZY_THRESHOLD,
        }
    }
}

struct SessionInner {
    state: DraftState,
    draft: Option<MessageDraft>,
}

impl SessionInner {
    fn transition(&mut self, target: DraftState) {
        debug_assert!(
            self.state.can_transition_to(&target),
            "{} -> {}",
            self.state,
            target
        );
        debug!("Draft state: {} -> {}", self.state, target);
        self.state = target;
    }
}

/// Releases the busy flag on drop, including on early return.
struct BusyGuard<'a>(&'a AtomicBool);

impl<'a> BusyGuard<'a> {
    fn try_acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| BusyGuard(flag))
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct MessageSession {
    directory: Arc<dyn ContactDirectory>,
    corrector: Arc<dyn GrammarCorrector>,
    gateway: Arc<dyn DeliveryGateway>,
    resolver: RecipientResolver,
    options: SessionOptions,
    busy: AtomicBool,
    inner: Mutex<SessionInner>,
}

impl MessageSession {
    pub fn new(
        directory: Arc<dyn ContactDirectory>,
        corrector: Arc<dyn GrammarCorrector>,
        gateway: Arc<dyn DeliveryGateway>,
        options: SessionOptions,
    ) -> Self {
        Self {
            directory,
            corrector,
            gateway,
            resolver: RecipientResolver::with_fuzzy_threshold(options.fuzzy_threshold),
            options,
            busy: AtomicBool::new(false),
            inner: Mutex::new(SessionInner {
                state: DraftState::Empty,
                draft: None,
            }),
        }
    }

    pub async fn state(&self) -> DraftState {
        self.inner.lock().await.state
    }

    pub async fn draft(&self) -> Option<MessageDraft> {
        self.inner.lock().await.draft.clone()
    }

    /// True while a preview or send is running.
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Build a reviewable draft from an utterance.
    ///
    /// Empty (after trimming) input is rejected with `EmptyInput` before anything
    /// else happens. Correction failures fall back to the raw text.
    pub async fn preview(
        &self,
        raw_text: &str,
        explicit_contact: Option<&Contact>,
        origin: DraftOrigin,
    ) -> Result<PreviewOutcome, DomainError> {
        if raw_text.trim().is_empty() {
            return Err(DomainError::EmptyInput);
        }
        let Some(_busy) = BusyGuard::try_acquire(&self.busy) else {
            debug!("preview ignored: session busy");
            return Ok(PreviewOutcome::Ignored);
        };

        {
            let mut inner = self.inner.lock().await;
            inner.transition(DraftState::Previewing);
            inner.draft = None;
        }

        let directory = match self.directory.list().await {
            Ok(contacts) => contacts,
            Err(e) => {
                warn!(error = %e, "contact directory unavailable; resolving without contacts");
                Vec::new()
            }
        };

        let resolution = self.resolver.resolve(raw_text, explicit_contact, &directory);

        let mut corrected_text = match self.corrector.correct(&resolution.remainder_text).await {
            Ok(corrected) if !corrected.trim().is_empty() => corrected,
            Ok(_) => {
                warn!(provider = self.corrector.provider(), "empty correction; using raw text");
                raw_text.to_string()
            }
            Err(e) => {
                warn!(
                    provider = self.corrector.provider(),
                    error = %DomainError::CorrectionUnavailable(e),
                    "using raw text"
                );
                raw_text.to_string()
            }
        };

        if self.options.strip_addressing {
            if let Some(recipient) = &resolution.recipient {
                corrected_text = strip_addressing(&corrected_text, recipient);
            }
        }

        let draft = MessageDraft {
            recipient: resolution.recipient,
            corrected_text,
            source_text: raw_text.to_string(),
            origin,
            created_at: Utc::now(),
        };

        let mut inner = self.inner.lock().await;
        inner.draft = Some(draft.clone());
        inner.transition(DraftState::ReadyToSend);
        info!(
            recipient = draft.recipient.as_ref().map(|r| r.display_name()).unwrap_or("<unresolved>"),
            origin = ?draft.origin,
            "draft ready"
        );
        Ok(PreviewOutcome::Ready(draft))
    }

    /// Overwrite the corrected text and/or recipient. Never re-runs correction.
    pub async fn edit(&self, edit: DraftEdit) -> Result<MessageDraft, DomainError> {
        if let Some(text) = &edit.text {
            if text.trim().is_empty() {
                return Err(DomainError::EmptyInput);
            }
        }

        let mut inner = self.inner.lock().await;
        let state = inner.state;
        let Some(draft) = inner
            .draft
            .as_mut()
            .filter(|_| matches!(state, DraftState::ReadyToSend | DraftState::Failed))
        else {
            return Err(DomainError::InvalidState {
                operation: "edit",
                state,
            });
        };
        if let Some(text) = edit.text {
            draft.corrected_text = text;
        }
        if let Some(recipient) = edit.recipient {
            draft.recipient = Some(recipient);
        }
        let updated = draft.clone();
        if state == DraftState::Failed {
            inner.transition(DraftState::ReadyToSend);
        }
        Ok(updated)
    }

    /// Deliver the draft. On success the draft is cleared; on failure it is kept unchanged.
    pub async fn send(&self) -> Result<SendOutcome, DomainError> {
        let Some(_busy) = BusyGuard::try_acquire(&self.busy) else {
            debug!("send ignored: session busy");
            return Ok(SendOutcome::Ignored);
        };

        let (recipient, text) = {
            let mut inner = self.inner.lock().await;
            if !matches!(inner.state, DraftState::ReadyToSend | DraftState::Failed) {
                return Err(DomainError::InvalidState {
                    operation: "send",
                    state: inner.state,
                });
            }
            let Some(draft) = inner.draft.as_ref() else {
                return Err(DomainError::InvalidState {
                    operation: "send",
                    state: inner.state,
                });
            };
            let Some(recipient) = draft.recipient.clone() else {
                return Err(DomainError::UnresolvedRecipient);
            };
            if draft.corrected_text.trim().is_empty() {
                return Err(DomainError::EmptyInput);
            }
            if draft.origin == DraftOrigin::Voice && draft.corrected_text != draft.source_text {
                debug!("voice draft: sending edited/corrected text, not the raw transcript");
            }
            let text = draft.corrected_text.clone();
            inner.transition(DraftState::Sending);
            (recipient, text)
        };

        let result = self.gateway.send(&recipient, &text).await;

        let mut inner = self.inner.lock().await;
        match result {
            Ok(receipt) => {
                inner.draft = None;
                inner.transition(DraftState::Sent);
                info!(
                    recipient = %receipt.recipient_display_name,
                    message_id = ?receipt.message_id,
                    "message sent"
                );
                Ok(SendOutcome::Sent(receipt))
            }
            Err(e) => {
                inner.transition(DraftState::Failed);
                let message = match e {
                    DomainError::DeliveryFailed(msg) => msg,
                    other => other.to_string(),
                };
                warn!(recipient = %recipient, error = %message, "delivery failed; draft kept");
                Err(DomainError::DeliveryFailed(message))
            }
        }
    }

    /// Drop the draft and start over. Refused while a send is in flight.
    pub async fn discard(&self) -> Result<(), DomainError> {
        let mut inner = self.inner.lock().await;
        match inner.state {
            DraftState::Empty => Ok(()),
            DraftState::Sending | DraftState::Previewing => Err(DomainError::InvalidState {
                operation: "discard",
                state: inner.state,
            }),
            _ => {
                inner.draft = None;
                inner.transition(DraftState::Empty);
                Ok(())
            }
        }
    }
}
