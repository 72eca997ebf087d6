//! Trailing-edge debounce for typed filter text.

use std::time::{Duration, Instant};

/// Holds the latest typed text until the input has been quiet for `delay`.
///
/// Time is passed in by the caller so the UI loop decides the clock.
#[derive(Debug)]
pub struct FilterDebouncer {
    delay: Duration,
    pending: Option<(String, Instant)>,
    generation: u64,
}

impl FilterDebouncer {
    pub fn new(delay: Duration) -> Self {
        Self { delay, pending: None, generation: 0 }
    }

    /// Record a keystroke; restarts the quiet period.
    pub fn push(&mut self, text: impl Into<String>, now: Instant) {
        self.generation += 1;
        self.pending = Some((text.into(), now));
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Number of keystrokes seen so far.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Release the pending text once the quiet period has elapsed.
    pub fn poll(&mut self, now: Instant) -> Option<String> {
        let (_, since) = self.pending.as_ref()?;
        if now.saturating_duration_since(*since) < self.delay {
            return None;
        }
        self.pending.take().map(|(text, _)| text)
    }

    /// Release the pending text immediately.
    pub fn flush(&mut self) -> Option<String> {
        self.pending.take().map(|(text, _)| text)
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }
}
