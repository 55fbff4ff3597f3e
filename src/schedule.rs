//! Debounce bookkeeping for callers that drive recompute passes from edit events.
//!
//! The engine never schedules anything itself. A [`Debouncer`] is the caller-side contract
//! made explicit: every edit bumps a generation and re-arms one single-shot deadline, a
//! timer firing for an older generation is ignored, and at most one pass is in flight.

use std::time::{Duration, Instant};

/// Handle for one armed deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    pub generation: u64,
    pub deadline: Instant,
}

#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    generation: u64,
    armed: Option<Instant>,
    in_flight: bool,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            generation: 0,
            armed: None,
            in_flight: false,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    /// Record an edit at `now`, restarting the delay.
    pub fn notify_edit(&mut self, now: Instant) -> Ticket {
        self.generation += 1;
        let deadline = now + self.delay;
        self.armed = Some(deadline);
        Ticket {
            generation: self.generation,
            deadline,
        }
    }

    /// Disarm the pending deadline; already issued tickets become stale.
    pub fn cancel(&mut self) {
        self.generation += 1;
        self.armed = None;
    }

    /// A timer for `ticket` fired. Returns `true` when the caller should start a pass now.
    ///
    /// Stale tickets are ignored. While a pass is in flight the deadline stays armed, so
    /// [`poll`](Self::poll) picks it up after [`finish`](Self::finish).
    pub fn fire(&mut self, ticket: Ticket) -> bool {
        if ticket.generation != self.generation || self.armed.is_none() {
            tracing::trace!(
                "ignoring stale debounce ticket {} (current {})",
                ticket.generation,
                self.generation
            );
            return false;
        }
        if self.in_flight {
            return false;
        }
        self.armed = None;
        self.in_flight = true;
        true
    }

    /// Timer-less equivalent of [`fire`](Self::fire): start a pass if the deadline passed.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.armed {
            Some(deadline) if now >= deadline && !self.in_flight => {
                self.armed = None;
                self.in_flight = true;
                true
            }
            _ => false,
        }
    }

    /// The pass started by `fire`/`poll` completed.
    pub fn finish(&mut self) {
        self.in_flight = false;
    }
}

/// Sleep until `ticket`'s deadline on the Tokio timer.
pub async fn wait(ticket: Ticket) {
    tokio::time::sleep_until(tokio::time::Instant::from_std(ticket.deadline)).await;
}
