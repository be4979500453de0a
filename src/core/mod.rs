//=========================================================================
// Core Systems
//=========================================================================
//
// Everything the stage is built from, leaves first:
//
//   error      StageError taxonomy
//   services   Narrator (speech) and Clock (time) contracts
//   input      key codes relayed to scenes
//   event_bus  queued events, listeners, dispatch
//   scene      scene trait, registry, manager, interval scheduling
//
//=========================================================================

//=== Module Declarations =================================================

pub mod error;
pub mod event_bus;
pub mod input;
pub mod scene;
pub mod services;

//=== Public API ==========================================================

pub use error::{StageError, StageResult};
pub use event_bus::{EventBus, EventKind, EventPoster, EventRecord, Listener, ListenerId, Payload};
pub use input::{KeyCode, Modifiers};
pub use scene::{NextScene, Scene, SceneConfig, SceneContext, SceneManager, SceneRegistry};
pub use services::{Clock, LogNarrator, ManualClock, MonotonicClock, Narrator, TranscriptNarrator};
