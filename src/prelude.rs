//=========================================================================
// Prelude
//=========================================================================
//
// Convenience module that re-exports commonly used types and traits.
//
// Usage:
//   use aetheric_stage::prelude::*;
//
//=========================================================================

//=== Public API ==========================================================

// Stage
pub use crate::stage::{Stage, StageBuilder};

// Errors
pub use crate::core::error::{StageError, StageResult};

// Event bus
pub use crate::core::event_bus::{
    EventBus, EventKind, EventPoster, EventRecord, HookPhase, HookTable, Listener, ListenerId,
    Payload,
};

// Input
pub use crate::core::input::{KeyCode, Modifiers};

// Scene system
pub use crate::core::scene::{
    BuiltinScene, NextScene, Scene, SceneConfig, SceneContext, SceneDeclaration, SceneManager,
    SceneScript, SceneState,
};

// Services
pub use crate::core::services::{
    Clock, LogNarrator, ManualClock, MonotonicClock, Narrator, TranscriptNarrator,
};
