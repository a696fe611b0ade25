//! Trailing-edge debounce as a pure scheduling policy.
//!
//! Every notification pushes the deadline to `now + quiet`; only when the
//! deadline passes without further notifications does [`Debouncer::fire`]
//! report true, once.

use std::time::Duration;

use tokio::time::Instant;

#[derive(Debug, Clone)]
pub struct Debouncer {
    quiet: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            deadline: None,
        }
    }

    pub fn quiet_window(&self) -> Duration {
        self.quiet
    }

    /// A change arrived at `now`; any pending run is rescheduled.
    pub fn notify(&mut self, now: Instant) {
        self.deadline = Some(now + self.quiet);
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// True exactly once per burst, when `now` has reached the deadline.
    pub fn fire(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    /// Drops a pending run without firing it.
    pub fn cancel(&mut self) {
        self.deadline = None;
    }
}
