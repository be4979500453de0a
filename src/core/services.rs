//=========================================================================
// External Services
//=========================================================================
//
// Contracts the core consumes from collaborators it does not own:
// - `Narrator`: speech backend for user-facing messages
// - `Clock`: millisecond time source for interval scheduling
//
// Diagnostics go through the `log` facade; whichever logger the
// application installs is the diagnostics sink.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Instant;

use log::info;

//=== Narrator ============================================================

/// Speech/narration backend. Fire-and-forget.
pub trait Narrator {
    fn speak(&self, message: &str);
}

/// Narrator that only writes messages to the log.
///
/// Used when no speech backend is available.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNarrator;

impl Narrator for LogNarrator {
    fn speak(&self, message: &str) {
        info!(target: "speech", "{}", message);
    }
}

/// Narrator that keeps every message, for inspection by the frontend or tests.
#[derive(Debug, Default, Clone)]
pub struct TranscriptNarrator {
    lines: Rc<RefCell<Vec<String>>>,
}

impl TranscriptNarrator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything spoken so far.
    pub fn lines(&self) -> Vec<String> {
        self.lines.borrow().clone()
    }

    pub fn last(&self) -> Option<String> {
        self.lines.borrow().last().cloned()
    }
}

impl Narrator for TranscriptNarrator {
    fn speak(&self, message: &str) {
        self.lines.borrow_mut().push(message.to_string());
    }
}

//=== Clock ===============================================================

/// Millisecond time source.
pub trait Clock {
    fn now_ms(&self) -> u64;
}

/// Wall-clock time elapsed since construction.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now_ms(&self) -> u64 {
        u64::try_from(self.origin.elapsed().as_millis()).unwrap_or(u64::MAX)
    }
}

/// Clock advanced by hand. Clones share the same time.
#[derive(Debug, Default, Clone)]
pub struct ManualClock {
    now: Rc<Cell<u64>>,
}

impl ManualClock {
    pub fn new(start_ms: u64) -> Self {
        Self {
            now: Rc::new(Cell::new(start_ms)),
        }
    }

    pub fn set(&self, now_ms: u64) {
        self.now.set(now_ms);
    }

    pub fn advance(&self, delta_ms: u64) {
        self.now.set(self.now.get().saturating_add(delta_ms));
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now.get()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transcript_keeps_messages_in_order() {
        let narrator = TranscriptNarrator::new();
        let shared = narrator.clone();
        narrator.speak("first");
        shared.speak("second");

        assert_eq!(narrator.lines(), vec!["first", "second"]);
        assert_eq!(narrator.last().as_deref(), Some("second"));
    }

    #[test]
    fn manual_clock_clones_share_time() {
        let clock = ManualClock::new(100);
        let view = clock.clone();
        clock.advance(50);
        assert_eq!(view.now_ms(), 150);
        view.set(10);
        assert_eq!(clock.now_ms(), 10);
    }

    #[test]
    fn monotonic_clock_does_not_go_backwards() {
        let clock = MonotonicClock::new();
        let a = clock.now_ms();
        let b = clock.now_ms();
        assert!(b >= a);
    }
}
