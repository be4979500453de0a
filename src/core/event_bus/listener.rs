//=========================================================================
// Listeners
//=========================================================================
//
// Capability interface for bus participants.
//
// A listener declares, once, which (kind, phase) slots it handles by
// returning a `HookTable`. The bus resolves the table at registration
// time and keeps only a weak reference to the listener itself.
//
// Architecture:
//   Rc<RefCell<L>> ──add_listener()──> Weak<RefCell<L>> + HookTable<L>
//                                              ↓ (type-erased)
//                                      Box<dyn RegisteredListener>
//
//=========================================================================

//=== External Dependencies ===============================================

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::{Rc, Weak};

//=== Internal Dependencies ===============================================

use super::event_bus::EventPoster;
use super::event_kind::EventKind;
use super::payload::Payload;
use crate::core::error::{StageError, StageResult};

//=== HookPhase ===========================================================

/// The three hook slots available per event kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookPhase {
    Before,
    On,
    After,
}

impl HookPhase {
    /// Conventional hook name for diagnostics, e.g. `before_leave_scene`.
    pub fn hook_name(self, kind: EventKind) -> String {
        match self {
            Self::Before => format!("before_{}", kind.name()),
            Self::On => format!("on_{}", kind.name()),
            Self::After => format!("after_{}", kind.name()),
        }
    }
}

//=== Hook Table ==========================================================

/// A hook receives the listener, the event payload and a posting handle.
pub type Hook<L> = fn(&mut L, &Payload, &EventPoster) -> StageResult<()>;

/// Callback slots a listener fills, keyed by event kind and phase.
///
/// ```rust
/// # use aetheric_stage::prelude::*;
/// struct Footsteps { steps: u32 }
///
/// impl Listener for Footsteps {
///     fn listener_name(&self) -> String {
///         "Footsteps".into()
///     }
///
///     fn hooks() -> HookTable<Self> {
///         HookTable::<Self>::new().on(EventKind::HeroWalkStart, |me, _payload, _poster| {
///             me.steps += 1;
///             Ok(())
///         })
///     }
/// }
/// ```
pub struct HookTable<L> {
    slots: HashMap<(EventKind, HookPhase), Hook<L>>,
}

impl<L> HookTable<L> {
    pub fn new() -> Self {
        Self {
            slots: HashMap::new(),
        }
    }

    pub fn before(self, kind: EventKind, hook: Hook<L>) -> Self {
        self.with(kind, HookPhase::Before, hook)
    }

    pub fn on(self, kind: EventKind, hook: Hook<L>) -> Self {
        self.with(kind, HookPhase::On, hook)
    }

    pub fn after(self, kind: EventKind, hook: Hook<L>) -> Self {
        self.with(kind, HookPhase::After, hook)
    }

    /// Fills a slot, replacing whatever was there.
    pub fn with(mut self, kind: EventKind, phase: HookPhase, hook: Hook<L>) -> Self {
        self.slots.insert((kind, phase), hook);
        self
    }

    pub fn get(&self, kind: EventKind, phase: HookPhase) -> Option<Hook<L>> {
        self.slots.get(&(kind, phase)).copied()
    }

    /// Whether any phase is filled for `kind`.
    pub fn handles(&self, kind: EventKind) -> bool {
        self.slots.keys().any(|(k, _)| *k == kind)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl<L> Default for HookTable<L> {
    fn default() -> Self {
        Self::new()
    }
}

//=== Listener Trait ======================================================

/// Component that reacts to bus events.
pub trait Listener: 'static {
    /// Name used in diagnostics.
    fn listener_name(&self) -> String;

    /// Slots this listener handles. Called once per registration.
    fn hooks() -> HookTable<Self>
    where
        Self: Sized;
}

//=== ListenerId ==========================================================

/// Handle returned by registration; used for targeting and removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(pub(crate) u64);

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "listener#{}", self.0)
    }
}

//=== Type-Erased Registration ============================================

/// What happened when the bus asked a registration to run a slot.
#[derive(Debug)]
pub(super) enum HookOutcome {
    /// The slot is empty for this listener.
    Skipped,
    Completed,
    Failed(StageError),
    /// The listener has been dropped.
    Gone,
}

/// Type-erased view of a registered listener.
///
/// Lets the bus store listeners of different concrete types side by side.
pub(super) trait RegisteredListener {
    fn name(&self) -> &str;

    fn is_alive(&self) -> bool;

    fn invoke(
        &self,
        kind: EventKind,
        phase: HookPhase,
        payload: &Payload,
        poster: &EventPoster,
    ) -> HookOutcome;
}

/// A weak listener reference together with its resolved hook table.
pub(super) struct BoundListener<L: Listener> {
    name: String,
    target: Weak<RefCell<L>>,
    table: HookTable<L>,
}

impl<L: Listener> BoundListener<L> {
    pub(super) fn bind(listener: &Rc<RefCell<L>>) -> Self {
        let name = listener.borrow().listener_name();
        Self {
            name,
            target: Rc::downgrade(listener),
            table: L::hooks(),
        }
    }
}

impl<L: Listener> RegisteredListener for BoundListener<L> {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_alive(&self) -> bool {
        self.target.strong_count() > 0
    }

    fn invoke(
        &self,
        kind: EventKind,
        phase: HookPhase,
        payload: &Payload,
        poster: &EventPoster,
    ) -> HookOutcome {
        let Some(hook) = self.table.get(kind, phase) else {
            return HookOutcome::Skipped;
        };
        let Some(listener) = self.target.upgrade() else {
            return HookOutcome::Gone;
        };

        // A hook running while its listener is already borrowed would alias
        // `&mut L`; report it instead of panicking inside dispatch.
        let Ok(mut guard) = listener.try_borrow_mut() else {
            return HookOutcome::Failed(StageError::ListenerHookFailure {
                listener: self.name.clone(),
                hook: phase.hook_name(kind),
                reason: "listener is already borrowed".into(),
            });
        };

        match hook(&mut *guard, payload, poster) {
            Ok(()) => HookOutcome::Completed,
            Err(e) => HookOutcome::Failed(e),
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::event_bus::EventBus;

    struct Counter {
        hits: u32,
    }

    impl Listener for Counter {
        fn listener_name(&self) -> String {
            "Counter".into()
        }

        fn hooks() -> HookTable<Self> {
            HookTable::<Self>::new()
                .on(EventKind::HeroSpawn, |me, _, _| {
                    me.hits += 1;
                    Ok(())
                })
                .after(EventKind::HeroSpawn, |me, _, _| {
                    me.hits += 10;
                    Ok(())
                })
        }
    }

    #[test]
    fn hook_names_follow_convention() {
        assert_eq!(HookPhase::Before.hook_name(EventKind::QuitGame), "before_quit_game");
        assert_eq!(HookPhase::On.hook_name(EventKind::QuitGame), "on_quit_game");
        assert_eq!(HookPhase::After.hook_name(EventKind::QuitGame), "after_quit_game");
    }

    #[test]
    fn table_resolves_filled_slots_only() {
        let table = Counter::hooks();
        assert_eq!(table.len(), 2);
        assert!(table.handles(EventKind::HeroSpawn));
        assert!(!table.handles(EventKind::HeroRunStart));
        assert!(table.get(EventKind::HeroSpawn, HookPhase::Before).is_none());
        assert!(table.get(EventKind::HeroSpawn, HookPhase::On).is_some());
    }

    #[test]
    fn bound_listener_runs_hooks_and_reports_drop() {
        let bus = EventBus::new();
        let poster = bus.poster();
        let counter = Rc::new(RefCell::new(Counter { hits: 0 }));
        let bound = BoundListener::bind(&counter);

        assert_eq!(bound.name(), "Counter");
        assert!(matches!(
            bound.invoke(EventKind::HeroSpawn, HookPhase::Before, &Payload::new(), &poster),
            HookOutcome::Skipped
        ));
        assert!(matches!(
            bound.invoke(EventKind::HeroSpawn, HookPhase::On, &Payload::new(), &poster),
            HookOutcome::Completed
        ));
        assert_eq!(counter.borrow().hits, 1);

        drop(counter);
        assert!(!bound.is_alive());
        assert!(matches!(
            bound.invoke(EventKind::HeroSpawn, HookPhase::On, &Payload::new(), &poster),
            HookOutcome::Gone
        ));
    }

    #[test]
    fn borrowed_listener_fails_instead_of_panicking() {
        let bus = EventBus::new();
        let poster = bus.poster();
        let counter = Rc::new(RefCell::new(Counter { hits: 0 }));
        let bound = BoundListener::bind(&counter);

        let _held = counter.borrow_mut();
        assert!(matches!(
            bound.invoke(EventKind::HeroSpawn, HookPhase::On, &Payload::new(), &poster),
            HookOutcome::Failed(StageError::ListenerHookFailure { .. })
        ));
    }
}
