//=========================================================================
// Scene System
//=========================================================================
//
// Scene lifecycle: registry, single active slot, leave/load transitions
// and interval ticking for scenes that need periodic wake-ups.
//
// Architecture:
//   SceneManager (bus listener)
//     ├─ registry:  SceneRegistry   name → Box<dyn Scene> + state
//     ├─ active:    Option<name>
//     └─ scheduler: IntervalScheduler
//
// Flow:
//   load(name) → deactivate(old) → post leave_scene → activate(new)
//   leave()    → next_scene() → load(next) | post quit_game | stay
//
//=========================================================================

//=== Internal Dependencies ===============================================

use crate::core::error::StageResult;
use crate::core::event_bus::{EventKind, EventPoster, Payload};
use crate::core::input::{KeyCode, Modifiers};
use crate::core::services::Narrator;

//=== Module Declarations =================================================

mod interval_scheduler;
pub mod kinds;
mod scene_config;
mod scene_manager;
mod scene_registry;

#[cfg(test)]
pub(crate) mod test_support;

//=== Public API ==========================================================

pub use interval_scheduler::{IntervalEntry, IntervalScheduler, DEFAULT_MINIMUM_INTERVAL_MS};
pub use scene_config::SceneConfig;
pub use scene_manager::SceneManager;
pub use scene_registry::{BuiltinScene, SceneDeclaration, SceneFactory, SceneRegistry};

/// Reserved next-scene value that ends the game instead of naming a scene.
pub const QUIT_SENTINEL: &str = "__quit";

//=== Scene State =========================================================

/// Whether a registered scene currently owns the active slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SceneState {
    #[default]
    Inactive,
    Active,
}

//=== Next Scene ==========================================================

/// Transition a scene requests when asked to leave.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum NextScene {
    /// No transition requested.
    #[default]
    Stay,

    /// Load the named scene.
    Scene(String),

    /// End the game.
    Quit,
}

impl NextScene {
    /// Interprets a configured target, honouring the quit sentinel.
    pub fn from_target(target: Option<&str>) -> Self {
        match target {
            None | Some("") => Self::Stay,
            Some(QUIT_SENTINEL) => Self::Quit,
            Some(name) => Self::Scene(name.to_string()),
        }
    }
}

//=== Scene Script ========================================================

/// Named lifecycle call forwarded to the active scene.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SceneScript {
    Pause,
    Quit,
    /// Game-specific call; scenes that don't know it ignore it.
    Named(String),
}

impl SceneScript {
    pub fn name(&self) -> &str {
        match self {
            Self::Pause => "pause_game",
            Self::Quit => "quit_game",
            Self::Named(name) => name,
        }
    }
}

//=== Scene Context =======================================================

/// What scene code can reach while one of its methods runs.
pub struct SceneContext<'a> {
    poster: &'a EventPoster,
    narrator: &'a dyn Narrator,
    now_ms: u64,
}

impl<'a> SceneContext<'a> {
    pub fn new(poster: &'a EventPoster, narrator: &'a dyn Narrator, now_ms: u64) -> Self {
        Self {
            poster,
            narrator,
            now_ms,
        }
    }

    pub fn post(&self, kind: EventKind, payload: Payload) {
        self.poster.post(kind, payload);
    }

    pub fn speak(&self, message: &str) {
        self.narrator.speak(message);
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    pub fn poster(&self) -> &EventPoster {
        self.poster
    }

    /// Opts `scene` into interval ticking.
    pub fn request_interval(&self, scene: &str) {
        self.post(EventKind::SceneIntervalActivate, Payload::for_scene(scene));
    }

    /// Opts `scene` out of interval ticking.
    pub fn cancel_interval(&self, scene: &str) {
        self.post(EventKind::SceneIntervalDeactivate, Payload::for_scene(scene));
    }

    /// Asks the scene manager to follow the active scene's next-scene target.
    pub fn leave_current_scene(&self) {
        self.post(EventKind::LeaveCurrentScene, Payload::new());
    }
}

//=== Scene Trait =========================================================

/// A self-contained interactive mode.
///
/// Required: `name`, `activate`, `deactivate`, `next_scene`. Everything
/// else has an empty default.
///
/// ```rust
/// # use aetheric_stage::prelude::*;
/// struct Credits;
///
/// impl Scene for Credits {
///     fn name(&self) -> &str {
///         "credits"
///     }
///
///     fn activate(&mut self, ctx: &SceneContext<'_>, silent: bool) -> StageResult<()> {
///         if !silent {
///             ctx.speak("Thanks for playing.");
///         }
///         Ok(())
///     }
///
///     fn deactivate(&mut self, _ctx: &SceneContext<'_>, _silent: bool) -> StageResult<()> {
///         Ok(())
///     }
///
///     fn next_scene(&self) -> NextScene {
///         NextScene::Quit
///     }
/// }
/// ```
pub trait Scene {
    /// Registry key of this scene.
    fn name(&self) -> &str;

    /// Called when the scene takes the active slot.
    fn activate(&mut self, ctx: &SceneContext<'_>, silent: bool) -> StageResult<()>;

    /// Called when the scene gives up the active slot.
    fn deactivate(&mut self, ctx: &SceneContext<'_>, silent: bool) -> StageResult<()>;

    /// Transition requested when the scene is left.
    fn next_scene(&self) -> NextScene;

    /// Tick period in milliseconds for interval scheduling.
    fn interval_ms(&self) -> Option<u64> {
        None
    }

    /// Called by the interval scheduler when the scene is due.
    fn on_interval(&mut self, _ctx: &SceneContext<'_>) -> StageResult<()> {
        Ok(())
    }

    fn on_key_down(
        &mut self,
        _ctx: &SceneContext<'_>,
        _key: KeyCode,
        _modifiers: Modifiers,
    ) -> StageResult<()> {
        Ok(())
    }

    fn on_key_up(
        &mut self,
        _ctx: &SceneContext<'_>,
        _key: KeyCode,
        _modifiers: Modifiers,
    ) -> StageResult<()> {
        Ok(())
    }

    fn on_pause(&mut self, _ctx: &SceneContext<'_>, _payload: &Payload) -> StageResult<()> {
        Ok(())
    }

    /// Called on every registered scene right before the registry is cleared.
    fn on_quit(&mut self, _ctx: &SceneContext<'_>) -> StageResult<()> {
        Ok(())
    }

    /// Entry point for forwarded lifecycle calls.
    ///
    /// Override to handle `SceneScript::Named` calls; keep delegating the
    /// rest to the default routing.
    fn execute(
        &mut self,
        ctx: &SceneContext<'_>,
        script: &SceneScript,
        payload: &Payload,
    ) -> StageResult<()> {
        match script {
            SceneScript::Pause => self.on_pause(ctx, payload),
            SceneScript::Quit => self.on_quit(ctx),
            SceneScript::Named(_) => Ok(()),
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
