//! Quiescence-window debouncer for search text.
//!
//! Time is passed in by the caller, so the debouncer never sleeps and can be
//! driven from any event loop (or from tests with synthetic instants).

use std::time::{Duration, Instant};

/// Quiet period after the last keystroke before a query is forwarded.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(200);

#[derive(Debug, Clone)]
pub struct Debouncer {
    window: Duration,
    raw: String,
    /// Last value handed out by [`Debouncer::poll`]; starts as the initial raw text.
    emitted: String,
    /// Time of the last change that has not been settled yet.
    pending_since: Option<Instant>,
    /// Emit even if the settled text equals `emitted`.
    resubmitted: bool,
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}

impl Debouncer {
    /// Creates a debouncer whose raw and stable values are both empty.
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            raw: String::new(),
            emitted: String::new(),
            pending_since: None,
            resubmitted: false,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Text as currently typed.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Last stabilized text.
    pub fn debounced(&self) -> &str {
        &self.emitted
    }

    /// Records a change of the typed text and restarts the window.
    ///
    /// Repeating the current text is a no-op and does not move the deadline.
    pub fn input(&mut self, text: &str, now: Instant) {
        if text == self.raw {
            return;
        }
        self.raw.clear();
        self.raw.push_str(text);
        self.pending_since = Some(now);
    }

    /// Re-arms the window so the current text is emitted again once it settles.
    pub fn resubmit(&mut self, now: Instant) {
        self.resubmitted = true;
        self.pending_since = Some(now);
    }

    /// Instant at which [`Debouncer::poll`] will next be able to emit.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending_since.map(|t| t + self.window)
    }

    /// Emits the typed text once it has been stable for the whole window.
    ///
    /// Returns `None` while typing continues, when nothing is pending, or when
    /// the settled text equals the value emitted last time and was not
    /// resubmitted.
    pub fn poll(&mut self, now: Instant) -> Option<String> {
        let deadline = self.deadline()?;
        if now < deadline {
            return None;
        }
        self.pending_since = None;

        let resubmitted = std::mem::take(&mut self.resubmitted);
        if self.raw == self.emitted && !resubmitted {
            return None;
        }
        self.emitted.clone_from(&self.raw);
        Some(self.emitted.clone())
    }

    /// True when the typed text has caught up with the stabilized text.
    pub fn is_settled(&self) -> bool {
        self.raw == self.emitted && !self.resubmitted
    }
}
