//=========================================================================
// Event Bus
//=========================================================================
//
// FIFO event queue with synchronous fan-out to registered listeners.
//
// Architecture:
//   EventPoster ──post()──> crossbeam channel (FIFO)
//                                  ↓
//   Frontend ─────pump()──> one record per call
//                                  ↓
//                             dispatch()
//                    for each target listener:
//                      before_<kind> → on_<kind> → after_<kind>
//
// Posting never dispatches. Events posted while a record is being
// dispatched are only seen by a later `pump`, so dispatch depth is
// bounded to one.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::cell::RefCell;
use std::rc::Rc;

use crossbeam_channel::{unbounded, Receiver, Sender};
use log::{debug, error, warn};

//=== Internal Dependencies ===============================================

use super::event_kind::EventKind;
use super::listener::{
    BoundListener, HookOutcome, HookPhase, Listener, ListenerId, RegisteredListener,
};
use super::payload::{EventRecord, Payload};
use crate::core::error::{StageError, StageResult};

//=== EventPoster =========================================================

/// Cloneable handle that appends records to a bus queue.
///
/// Hooks and scenes post through this handle; they never hold the bus.
#[derive(Clone)]
pub struct EventPoster {
    sender: Sender<EventRecord>,
}

impl EventPoster {
    /// Queues a broadcast event.
    pub fn post(&self, kind: EventKind, payload: Payload) {
        self.send(EventRecord::new(kind, payload, None));
    }

    /// Queues an event addressed to a single listener.
    pub fn post_to(&self, kind: EventKind, payload: Payload, target: ListenerId) {
        self.send(EventRecord::new(kind, payload, Some(target)));
    }

    /// Validates a raw identifier before queuing it.
    pub fn post_code(
        &self,
        code: u16,
        payload: Payload,
        target: Option<ListenerId>,
    ) -> StageResult<()> {
        let kind = EventKind::try_from(code)?;
        self.send(EventRecord::new(kind, payload, target));
        Ok(())
    }

    fn send(&self, record: EventRecord) {
        // The bus owns the receiver; once it is gone nobody would pump anyway.
        if self.sender.send(record).is_err() {
            debug!(target: "event_bus", "Event posted after bus shutdown, dropped");
        }
    }
}

//=== Registration ========================================================

struct Registration {
    id: ListenerId,
    listener: Box<dyn RegisteredListener>,
}

//=== EventBus ============================================================

/// Single-threaded event bus.
///
/// Holds weak references to listeners, iterated in registration order.
/// Registering the same listener twice is allowed and delivers every hook
/// twice.
pub struct EventBus {
    sender: Sender<EventRecord>,
    receiver: Receiver<EventRecord>,
    listeners: Vec<Registration>,
    next_id: u64,
}

impl EventBus {
    //--- Construction -----------------------------------------------------

    pub fn new() -> Self {
        let (sender, receiver) = unbounded();
        Self {
            sender,
            receiver,
            listeners: Vec::new(),
            next_id: 0,
        }
    }

    /// Returns a posting handle for this bus.
    pub fn poster(&self) -> EventPoster {
        EventPoster {
            sender: self.sender.clone(),
        }
    }

    //--- Registration -----------------------------------------------------

    /// Registers a listener and resolves its hook table.
    ///
    /// Only a weak reference is kept; the caller keeps the listener alive.
    pub fn add_listener<L: Listener>(&mut self, listener: &Rc<RefCell<L>>) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;

        let bound = BoundListener::bind(listener);
        debug!(target: "event_bus", "Registered {} as {}", bound.name(), id);

        self.listeners.push(Registration {
            id,
            listener: Box::new(bound),
        });
        id
    }

    /// Unregisters a listener. Returns `false` if the id is unknown.
    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|r| r.id != id);
        before != self.listeners.len()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    //--- Posting ----------------------------------------------------------

    pub fn post(&self, kind: EventKind, payload: Payload) {
        self.poster().post(kind, payload);
    }

    pub fn post_to(&self, kind: EventKind, payload: Payload, target: ListenerId) {
        self.poster().post_to(kind, payload, target);
    }

    pub fn post_code(
        &self,
        code: u16,
        payload: Payload,
        target: Option<ListenerId>,
    ) -> StageResult<()> {
        self.poster().post_code(code, payload, target)
    }

    /// Number of queued, not yet pumped records.
    pub fn pending(&self) -> usize {
        self.receiver.len()
    }

    //--- Processing -------------------------------------------------------

    /// Dispatches the oldest queued record, if any.
    ///
    /// Processes at most one record. Returns whether one was processed.
    pub fn pump(&mut self) -> bool {
        match self.receiver.try_recv() {
            Ok(record) => {
                self.dispatch(&record);
                true
            }
            Err(_) => false,
        }
    }

    /// Delivers `record` synchronously to its target set.
    ///
    /// Failures are isolated per listener and per hook:
    /// - `before` failure: logged, `on` and `after` still run
    /// - `on` failure: logged, this listener's `after` is skipped
    /// - `after` failure: logged
    pub fn dispatch(&mut self, record: &EventRecord) {
        let poster = self.poster();
        let kind = record.kind();
        let payload = record.payload();
        let mut saw_dead = false;

        let targets: Vec<&Registration> = match record.target() {
            Some(id) => {
                let found: Vec<_> = self.listeners.iter().filter(|r| r.id == id).collect();
                if found.is_empty() {
                    warn!(target: "event_bus", "Event {} targets unknown {}, dropped", kind, id);
                }
                found
            }
            None => self.listeners.iter().collect(),
        };

        for registration in targets {
            let listener = registration.listener.as_ref();

            match listener.invoke(kind, HookPhase::Before, payload, &poster) {
                HookOutcome::Gone => {
                    saw_dead = true;
                    continue;
                }
                HookOutcome::Failed(e) => report_failure(listener, kind, HookPhase::Before, &e),
                HookOutcome::Skipped | HookOutcome::Completed => {}
            }

            match listener.invoke(kind, HookPhase::On, payload, &poster) {
                HookOutcome::Gone => {
                    saw_dead = true;
                    continue;
                }
                HookOutcome::Failed(e) => {
                    report_failure(listener, kind, HookPhase::On, &e);
                    continue;
                }
                HookOutcome::Skipped | HookOutcome::Completed => {}
            }

            match listener.invoke(kind, HookPhase::After, payload, &poster) {
                HookOutcome::Gone => saw_dead = true,
                HookOutcome::Failed(e) => report_failure(listener, kind, HookPhase::After, &e),
                HookOutcome::Skipped | HookOutcome::Completed => {}
            }
        }

        if saw_dead {
            self.prune_dead_listeners();
        }
    }

    //--- Internal Helpers -------------------------------------------------

    fn prune_dead_listeners(&mut self) {
        self.listeners.retain(|r| {
            let alive = r.listener.is_alive();
            if !alive {
                debug!(target: "event_bus", "Dropping dead listener {} ({})", r.listener.name(), r.id);
            }
            alive
        });
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

fn report_failure(
    listener: &dyn RegisteredListener,
    kind: EventKind,
    phase: HookPhase,
    cause: &StageError,
) {
    error!(
        target: "event_bus",
        "Failed to execute {}.{}: {}",
        listener.name(),
        phase.hook_name(kind),
        cause
    );
}

//=========================================================================
// Unit Tests
//=========================================================================
