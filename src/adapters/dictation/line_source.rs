//! Implements DictationSource over transcript lines from any async reader.
//!
//! An external speech-to-text process (or the user) writes one transcript
//! fragment per line, to stdin or a FIFO. A blank line or EOF ends the
//! current capture; the next non-blank line starts a new one.

use crate::ports::{DictationEvent, DictationSource};
use std::collections::VecDeque;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};

pub struct LineDictationSource<R> {
    lines: Lines<R>,
    fragments: Vec<String>,
    capturing: bool,
    pending: VecDeque<DictationEvent>,
    exhausted: bool,
}

impl<R: AsyncBufRead + Unpin + Send> LineDictationSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            fragments: Vec::new(),
            capturing: false,
            pending: VecDeque::new(),
            exhausted: false,
        }
    }

    fn end_capture(&mut self) {
        if self.capturing {
            let text = self.fragments.join(" ");
            self.fragments.clear();
            self.capturing = false;
            self.pending.push_back(DictationEvent::CaptureEnded { text });
        }
    }

    async fn read_more(&mut self) {
        match self.lines.next_line().await {
            Ok(Some(line)) => {
                let line = line.trim();
                if line.is_empty() {
                    self.end_capture();
                    return;
                }
                if !self.capturing {
                    self.capturing = true;
                    self.pending.push_back(DictationEvent::Started);
                }
                self.fragments.push(line.to_string());
                self.pending
                    .push_back(DictationEvent::Interim(self.fragments.join(" ")));
            }
            Ok(None) => {
                self.end_capture();
                self.exhausted = true;
            }
            Err(e) => {
                self.end_capture();
                self.pending
                    .push_back(DictationEvent::Error(format!("read transcript: {}", e)));
                self.exhausted = true;
            }
        }
    }
}

#[async_trait::async_trait]
impl<R: AsyncBufRead + Unpin + Send> DictationSource for LineDictationSource<R> {
    async fn next_event(&mut self) -> Option<DictationEvent> {
        loop {
            if let Some(event) = self.pending.pop_front() {
                return Some(event);
            }
            if self.exhausted {
                return None;
            }
            self.read_more().await;
        }
    }
}
