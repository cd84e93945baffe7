//! Progressive text reveal.
//!
//! Presents a completed explanation one character at a time instead of an
//! instant flash. Purely presentational: no controller or store state is
//! touched. Starting a new reveal abandons the one in progress.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::{mpsc, Notify};

/// Per-step delay floor in milliseconds.
pub const MIN_STEP_MS: u64 = 10;
/// Per-step delay ceiling in milliseconds.
pub const MAX_STEP_MS: u64 = 30;

/// Per-character reveal delay for a text.
///
/// `clamp(10, 30, floor(2000 / max(20, chars)))` milliseconds: longer texts
/// reveal faster per character, with a floor and ceiling so very short or
/// very long answers stay readable.
pub fn step_delay(text: &str) -> Duration {
    let chars = text.chars().count().max(20) as u64;
    Duration::from_millis((2000 / chars).clamp(MIN_STEP_MS, MAX_STEP_MS))
}

/// Finite sequence of increasing-length prefixes of a text.
///
/// Yields exactly `chars + 1` items, from the empty string through the full
/// text, on character boundaries. Not restartable: a new text needs a new
/// sequence.
#[derive(Debug, Clone)]
pub struct RevealSequence {
    chars: Vec<char>,
    next_len: usize,
}

impl RevealSequence {
    pub fn new(text: &str) -> Self {
        Self {
            chars: text.chars().collect(),
            next_len: 0,
        }
    }
}

impl Iterator for RevealSequence {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        if self.next_len > self.chars.len() {
            return None;
        }
        let prefix: String = self.chars[..self.next_len].iter().collect();
        self.next_len += 1;
        Some(prefix)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.chars.len() + 1 - self.next_len;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for RevealSequence {}

/// Drives a cancelable reveal timer for the current answer text.
///
/// Each call to [`reveal`](TypingRevealer::reveal) clears the previous timer
/// and starts a fresh sequence; timers are never stacked.
pub struct TypingRevealer {
    cancel: Mutex<Option<Arc<Notify>>>,
}

impl TypingRevealer {
    pub fn new() -> Self {
        Self {
            cancel: Mutex::new(None),
        }
    }

    /// Start revealing `text`, canceling any reveal still in progress.
    ///
    /// Returns a channel yielding each prefix in order. The first (empty)
    /// prefix is sent immediately; every later one after [`step_delay`].
    /// The channel closes after the full text or on cancellation.
    pub fn reveal(&self, text: &str) -> mpsc::Receiver<String> {
        let cancel = Arc::new(Notify::new());
        if let Ok(mut slot) = self.cancel.lock() {
            if let Some(previous) = slot.replace(Arc::clone(&cancel)) {
                previous.notify_one();
            }
        }

        let delay = step_delay(text);
        let sequence = RevealSequence::new(text);
        let (tx, rx) = mpsc::channel(32);

        tokio::spawn(async move {
            let mut first = true;
            for prefix in sequence {
                if !first {
                    tokio::select! {
                        _ = tokio::time::sleep(delay) => {}
                        _ = cancel.notified() => return,
                    }
                }
                first = false;
                if tx.send(prefix).await.is_err() {
                    // Receiver dropped; nobody is watching this reveal.
                    return;
                }
            }
        });

        rx
    }

    /// Cancel the in-progress reveal, if any.
    pub fn teardown(&self) {
        if let Ok(mut slot) = self.cancel.lock() {
            if let Some(handle) = slot.take() {
                handle.notify_one();
            }
        }
    }
}

impl Default for TypingRevealer {
    fn default() -> Self {
        Self::new()
    }
}
