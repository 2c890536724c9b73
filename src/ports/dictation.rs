//! Dictation outbound port. A host-provided speech-to-text capability.

/// One update from a dictation capture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DictationEvent {
    /// A new capture began.
    Started,
    /// Transcript so far for the current capture (replaces the previous interim text).
    Interim(String),
    /// Capture stopped producing text. `text` is the final transcript (may be empty).
    CaptureEnded { text: String },
    /// The source reported an error; later captures may still succeed.
    Error(String),
}

/// Lazy, restartable stream of transcript updates.
///
/// After `CaptureEnded` the source may start another capture; `None` means the
/// source is exhausted for good.
#[async_trait::async_trait]
pub trait DictationSource: Send {
    async fn next_event(&mut self) -> Option<DictationEvent>;
}
