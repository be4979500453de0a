//=========================================================================
// Event Bus System
//=========================================================================
//
// Publish/dispatch bus decoupling producers of state changes from the
// objects that react to them.
//
// Pattern: post → (queue) → pump → dispatch → before / on / after
//
//=========================================================================

//=== Module Declarations =================================================

mod event_bus;
mod event_kind;
mod listener;
mod payload;

//=== Public API ==========================================================

pub use event_bus::{EventBus, EventPoster};
pub use event_kind::EventKind;
pub use listener::{Hook, HookPhase, HookTable, Listener, ListenerId};
pub use payload::{
    EventRecord, Payload, SCENE_KEY, SILENT_ENTERING_KEY, SILENT_LEAVING_KEY, TIME_KEY,
};
