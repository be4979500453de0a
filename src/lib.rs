//=========================================================================
// Aetheric Stage — Library Root
//
// Event bus and scene lifecycle core for frame-driven, narrated games.
//
// Responsibilities:
// - Queue events and dispatch them to listeners with before/on/after hooks
// - Keep a registry of scenes and a single active-scene slot
// - Tick scenes that asked for periodic wake-ups
//
// Typical usage:
// ```no_run
// use aetheric_stage::prelude::*;
//
// let mut stage = StageBuilder::new().build();
// stage.load_scene("menu").ok();
// while stage.is_running() {
//     stage.frame();
// }
// ```
//
//=========================================================================

//--- Public Modules ------------------------------------------------------
//
// `core` holds the bus, the scene system and the service contracts the
// frontend implements (speech, time).
//
pub mod core;
pub mod prelude;

//--- Internal Modules ----------------------------------------------------
//
// `stage` wires the bus to the scene manager.
//
mod stage;

//--- Public Exports ------------------------------------------------------

pub use stage::{Stage, StageBuilder, DEFAULT_EVENTS_PER_FRAME, DEFAULT_TICK_RESOLUTION_MS};
