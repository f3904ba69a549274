//! Passive deadline timers.
//!
//! Nothing here sleeps or spawns: the host drives time by passing an
//! [`Instant`] to `take_due`. Each `schedule` restarts the window, so a burst
//! of calls closer together than the window yields a single due event after
//! the burst goes quiet.

use std::time::{Duration, Instant};

/// A restartable quiet-window timer carrying the latest payload.
///
/// Scheduling again before the deadline replaces the payload through the
/// caller-supplied merge (last-write-wins by default).
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    window: Duration,
    pending: Option<(Instant, T)>,
}

impl<T> Debouncer<T> {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: None,
        }
    }

    /// Arms (or re-arms) the timer with `payload`, discarding any older one.
    pub fn schedule(&mut self, now: Instant, payload: T) {
        self.pending = Some((now + self.window, payload));
    }

    /// Re-arms the timer, folding `payload` into the pending one.
    pub fn schedule_with(&mut self, now: Instant, payload: T, merge: impl FnOnce(&mut T, T)) {
        let deadline = now + self.window;
        match self.pending.as_mut() {
            Some((at, existing)) => {
                *at = deadline;
                merge(existing, payload);
            }
            None => self.pending = Some((deadline, payload)),
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Returns the payload if the window has elapsed at `now`.
    pub fn take_due(&mut self, now: Instant) -> Option<T> {
        match &self.pending {
            Some((at, _)) if now >= *at => self.pending.take().map(|(_, p)| p),
            _ => None,
        }
    }

    /// Drops any pending payload without firing.
    pub fn cancel(&mut self) -> bool {
        self.pending.take().is_some()
    }
}
