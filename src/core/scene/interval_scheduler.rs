//=========================================================================
// Interval Scheduler
//=========================================================================
//
// Ordered list of scenes that asked for periodic wake-ups.
//
// Each entry carries its own period and the time its next tick is due.
// A tick at `now` fires every entry with `next_tick_due <= now` in
// activation order and reschedules it to `now + interval`. Missed
// periods are not replayed.
//
//=========================================================================

//=== External Dependencies ===============================================

use log::{debug, trace};

//=== Constants ===========================================================

/// Shortest period a scene may tick at.
pub const DEFAULT_MINIMUM_INTERVAL_MS: u64 = 10;

//=== IntervalEntry =======================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntervalEntry {
    pub name: String,
    pub interval_ms: u64,
    pub next_tick_due: u64,
}

//=== IntervalScheduler ===================================================

#[derive(Debug, Clone)]
pub struct IntervalScheduler {
    entries: Vec<IntervalEntry>,
    minimum_interval_ms: u64,
}

impl IntervalScheduler {
    pub fn new(minimum_interval_ms: u64) -> Self {
        Self {
            entries: Vec::new(),
            minimum_interval_ms,
        }
    }

    pub fn minimum_interval_ms(&self) -> u64 {
        self.minimum_interval_ms
    }

    /// Appends `name` with its first tick one period after `now_ms`.
    ///
    /// Periods below the minimum are raised to it. Returns the due time.
    pub fn activate(&mut self, name: &str, interval_ms: u64, now_ms: u64) -> u64 {
        let interval_ms = interval_ms.max(self.minimum_interval_ms);
        let next_tick_due = now_ms.saturating_add(interval_ms);
        debug!(
            target: "scene_manager",
            "Interval activated for {} every {}ms (first tick at {})",
            name, interval_ms, next_tick_due
        );
        self.entries.push(IntervalEntry {
            name: name.to_string(),
            interval_ms,
            next_tick_due,
        });
        next_tick_due
    }

    /// Removes the first entry for `name`. Returns whether one existed.
    pub fn deactivate(&mut self, name: &str) -> bool {
        match self.entries.iter().position(|e| e.name == name) {
            Some(index) => {
                self.entries.remove(index);
                debug!(target: "scene_manager", "Interval deactivated for {}", name);
                true
            }
            None => false,
        }
    }

    /// Fires every due entry in activation order.
    ///
    /// `fire` receives the scene name. Returns how many entries fired.
    pub fn tick<F>(&mut self, now_ms: u64, mut fire: F) -> usize
    where
        F: FnMut(&str),
    {
        let mut fired = 0;
        for entry in self.entries.iter_mut() {
            if entry.next_tick_due > now_ms {
                continue;
            }
            trace!(target: "scene_manager", "Interval tick for {} at {}", entry.name, now_ms);
            entry.next_tick_due = now_ms.saturating_add(entry.interval_ms);
            fire(&entry.name);
            fired += 1;
        }
        fired
    }

    //--- Queries ----------------------------------------------------------

    pub fn entries(&self) -> &[IntervalEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_scheduled(&self, name: &str) -> bool {
        self.entries.iter().any(|e| e.name == name)
    }

    pub fn next_tick_due(&self, name: &str) -> Option<u64> {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .map(|e| e.next_tick_due)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl Default for IntervalScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_MINIMUM_INTERVAL_MS)
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
