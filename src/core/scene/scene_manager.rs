//=========================================================================
// Scene Manager
//=========================================================================
//
// Owns the single active-scene slot and the interval schedule.
//
// Scenes are stored in the registry by name and referenced by name from
// the active slot and the schedule. Transitions happen synchronously in
// `load`; anything they announce goes through the bus queue and is seen
// on a later pump.
//
// Bus hooks (all in the `on` phase):
//   load_scene                 → load(payload.scene)
//   leave_scene                → quit_game if nothing is active
//   leave_current_scene        → leave()
//   pause_game                 → forward to the active scene
//   quit_game                  → on_quit everywhere, then clear
//   scene_interval_activate    → schedule payload.scene
//   scene_interval_deactivate  → unschedule payload.scene
//   scene_interval_tick        → fire due scenes at payload.time
//
//=========================================================================

//=== External Dependencies ===============================================

use std::rc::Rc;

use log::{debug, error, info, warn};

//=== Internal Dependencies ===============================================

use super::{
    IntervalScheduler, NextScene, Scene, SceneContext, SceneRegistry, SceneScript, SceneState,
};
use crate::core::error::{StageError, StageResult};
use crate::core::event_bus::{
    EventKind, EventPoster, HookTable, Listener, Payload, SILENT_ENTERING_KEY, SILENT_LEAVING_KEY,
};
use crate::core::input::{KeyCode, Modifiers};
use crate::core::services::{Clock, Narrator};

//=== Scene Manager =======================================================

/// Scene lifecycle controller.
///
/// Registered on the bus as a listener. The frontend drives it through
/// `load`, `leave` and the key relays; scenes drive it through events.
pub struct SceneManager {
    registry: SceneRegistry,
    active: Option<String>,
    scheduler: IntervalScheduler,
    poster: EventPoster,
    narrator: Rc<dyn Narrator>,
    clock: Rc<dyn Clock>,
    frame_time_ms: Option<u64>,
    quit_requested: bool,
}

impl SceneManager {
    //--- Construction -----------------------------------------------------

    pub fn new(
        poster: EventPoster,
        narrator: Rc<dyn Narrator>,
        clock: Rc<dyn Clock>,
        minimum_interval_ms: u64,
    ) -> Self {
        Self {
            registry: SceneRegistry::new(),
            active: None,
            scheduler: IntervalScheduler::new(minimum_interval_ms),
            poster,
            narrator,
            clock,
            frame_time_ms: None,
            quit_requested: false,
        }
    }

    //--- Accessors --------------------------------------------------------

    /// Name of the active scene, if any.
    pub fn active_scene(&self) -> Option<&str> {
        self.active.as_deref()
    }

    /// Set once quit has been handled; the frontend should stop its loop.
    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    pub fn registry(&self) -> &SceneRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut SceneRegistry {
        &mut self.registry
    }

    pub fn scheduler(&self) -> &IntervalScheduler {
        &self.scheduler
    }

    //--- Time Base --------------------------------------------------------

    /// Scene time: the latest frame time, or the clock before any frame.
    ///
    /// Interval ticks and interval activations both read this.
    pub fn now_ms(&self) -> u64 {
        self.frame_time_ms.unwrap_or_else(|| self.clock.now_ms())
    }

    /// Records the time of the frame being processed.
    pub fn set_frame_time(&mut self, now_ms: u64) {
        self.frame_time_ms = Some(now_ms);
    }

    //--- Transitions ------------------------------------------------------

    /// Makes `name` the active scene.
    ///
    /// The previous scene is deactivated first and a `leave_scene` event
    /// naming it is posted. An unknown name changes nothing.
    pub fn load(&mut self, name: &str, silent_entering: bool, silent_leaving: bool) -> StageResult<()> {
        if !self.registry.contains(name) {
            error!(target: "scene_manager", "Scene {} not found", name);
            return Err(StageError::SceneNotFound(name.to_string()));
        }

        let now_ms = self.now_ms();

        if let Some(previous) = self.active.take() {
            debug!(target: "scene_manager", "Deactivating scene {}", previous);
            self.call_scene(&previous, now_ms, "deactivate", |scene, ctx| {
                scene.deactivate(ctx, silent_leaving)
            });
            self.registry.set_state(&previous, SceneState::Inactive);
            self.poster.post(EventKind::LeaveScene, Payload::for_scene(previous));
        }

        info!(target: "scene_manager", "Activating scene {}", name);
        self.active = Some(name.to_string());
        self.registry.set_state(name, SceneState::Active);
        self.call_scene(name, now_ms, "activate", |scene, ctx| {
            scene.activate(ctx, silent_entering)
        });
        Ok(())
    }

    /// Follows the active scene's next-scene target.
    ///
    /// A missing target scene is narrated and logged; the current scene
    /// stays active.
    pub fn leave(&mut self, silent_leaving: bool) {
        let Some(active) = self.active.clone() else {
            return;
        };
        let next = self
            .registry
            .get(&active)
            .map(|scene| scene.next_scene())
            .unwrap_or_default();

        match next {
            NextScene::Stay => {
                debug!(target: "scene_manager", "Scene {} has no next scene", active);
            }
            NextScene::Quit => {
                info!(target: "scene_manager", "Scene {} requested quit", active);
                self.poster.post(EventKind::QuitGame, Payload::new());
            }
            NextScene::Scene(target) => {
                if self.load(&target, false, silent_leaving).is_err() {
                    self.narrator
                        .speak(&format!("scene {} not created yet.", target));
                }
            }
        }
    }

    /// Forwards a named call to the active scene, logging any failure.
    pub fn execute(&mut self, script: &SceneScript, payload: &Payload) {
        let Some(active) = self.active.clone() else {
            return;
        };
        let now_ms = self.now_ms();
        self.call_scene(&active, now_ms, script.name(), |scene, ctx| {
            scene.execute(ctx, script, payload)
        });
    }

    /// Ends the game: every scene gets `on_quit`, then everything is dropped.
    pub fn quit(&mut self) {
        info!(target: "scene_manager", "Quitting with {} scenes", self.registry.len());
        let now_ms = self.now_ms();
        for name in self.registry.names() {
            self.call_scene(&name, now_ms, SceneScript::Quit.name(), |scene, ctx| {
                scene.execute(ctx, &SceneScript::Quit, &Payload::new())
            });
        }
        self.registry.clear();
        self.scheduler.clear();
        self.active = None;
        self.quit_requested = true;
    }

    //--- Input Relays -----------------------------------------------------

    pub fn on_key_down(&mut self, key: KeyCode, modifiers: Modifiers) {
        let Some(active) = self.active.clone() else {
            return;
        };
        let now_ms = self.now_ms();
        self.call_scene(&active, now_ms, "on_key_down", |scene, ctx| {
            scene.on_key_down(ctx, key, modifiers)
        });
    }

    pub fn on_key_up(&mut self, key: KeyCode, modifiers: Modifiers) {
        let Some(active) = self.active.clone() else {
            return;
        };
        let now_ms = self.now_ms();
        self.call_scene(&active, now_ms, "on_key_up", |scene, ctx| {
            scene.on_key_up(ctx, key, modifiers)
        });
    }

    //--- Interval Scheduling ----------------------------------------------

    /// Schedules `name` at its own interval, starting from scene time.
    ///
    /// Unknown scenes and scenes without an interval are logged and ignored.
    pub fn activate_interval(&mut self, name: &str) {
        let Some(scene) = self.registry.get(name) else {
            warn!(target: "scene_manager", "Interval requested for unknown scene {}", name);
            return;
        };
        let Some(interval_ms) = scene.interval_ms() else {
            warn!(target: "scene_manager", "Scene {} has no interval, not scheduled", name);
            return;
        };
        let now_ms = self.now_ms();
        self.scheduler.activate(name, interval_ms, now_ms);
    }

    /// Unschedules the first entry for `name`. Unscheduled names are tolerated.
    pub fn deactivate_interval(&mut self, name: &str) {
        if !self.scheduler.deactivate(name) {
            warn!(target: "scene_manager", "Failed to remove scene from interval scenes: {}", name);
        }
    }

    /// Fires every scheduled scene due at `now_ms`. Returns how many fired.
    pub fn tick_intervals(&mut self, now_ms: u64) -> usize {
        let mut due = Vec::new();
        self.scheduler.tick(now_ms, |name| due.push(name.to_string()));

        for name in &due {
            self.call_scene(name, now_ms, "on_interval", |scene, ctx| scene.on_interval(ctx));
        }
        due.len()
    }

    //--- Internal Helpers -------------------------------------------------

    /// Runs `f` on scene `name` with a fresh context and logs a failure.
    ///
    /// Returns `false` if the scene is missing or `f` failed.
    fn call_scene<F>(&mut self, name: &str, now_ms: u64, call: &str, f: F) -> bool
    where
        F: FnOnce(&mut dyn Scene, &SceneContext<'_>) -> StageResult<()>,
    {
        let ctx = SceneContext::new(&self.poster, self.narrator.as_ref(), now_ms);
        let Some(scene) = self.registry.get_mut(name) else {
            warn!(target: "scene_manager", "Scene {} vanished before {}", name, call);
            return false;
        };
        match f(scene, &ctx) {
            Ok(()) => true,
            Err(e) => {
                error!(target: "scene_manager", "Failed to execute {}.{}: {}", name, call, e);
                false
            }
        }
    }

    //--- Bus Hooks --------------------------------------------------------

    fn on_load_scene(&mut self, payload: &Payload, _poster: &EventPoster) -> StageResult<()> {
        let name = payload.scene().ok_or_else(|| {
            StageError::InvalidArgument("load_scene requires a scene name".into())
        })?;
        let silent_entering = payload.get_bool(SILENT_ENTERING_KEY).unwrap_or(false);
        let silent_leaving = payload.get_bool(SILENT_LEAVING_KEY).unwrap_or(false);
        let name = name.to_string();
        self.load(&name, silent_entering, silent_leaving)
    }

    fn on_leave_scene(&mut self, _payload: &Payload, poster: &EventPoster) -> StageResult<()> {
        if self.active.is_none() {
            info!(target: "scene_manager", "No scene left, quitting");
            poster.post(EventKind::QuitGame, Payload::new());
        }
        Ok(())
    }

    fn on_quit_game(&mut self, _payload: &Payload, _poster: &EventPoster) -> StageResult<()> {
        self.quit();
        Ok(())
    }

    fn on_pause_game(&mut self, payload: &Payload, _poster: &EventPoster) -> StageResult<()> {
        self.execute(&SceneScript::Pause, payload);
        Ok(())
    }

    fn on_leave_current_scene(&mut self, payload: &Payload, _poster: &EventPoster) -> StageResult<()> {
        self.leave(payload.get_bool(SILENT_LEAVING_KEY).unwrap_or(false));
        Ok(())
    }

    fn on_interval_activate(&mut self, payload: &Payload, _poster: &EventPoster) -> StageResult<()> {
        let Some(name) = payload.scene() else {
            panic!("Invalid call to scene_interval_activate without a target scene.");
        };
        self.activate_interval(name);
        Ok(())
    }

    fn on_interval_deactivate(&mut self, payload: &Payload, _poster: &EventPoster) -> StageResult<()> {
        let Some(name) = payload.scene() else {
            panic!("Invalid call to scene_interval_deactivate without a target scene.");
        };
        self.deactivate_interval(name);
        Ok(())
    }

    fn on_interval_tick(&mut self, payload: &Payload, _poster: &EventPoster) -> StageResult<()> {
        let now_ms = payload.time().unwrap_or(0);
        self.set_frame_time(now_ms);
        self.tick_intervals(now_ms);
        Ok(())
    }
}

impl Listener for SceneManager {
    fn listener_name(&self) -> String {
        "SceneManager".into()
    }

    fn hooks() -> HookTable<Self> {
        HookTable::new()
            .on(EventKind::LoadScene, Self::on_load_scene)
            .on(EventKind::LeaveScene, Self::on_leave_scene)
            .on(EventKind::QuitGame, Self::on_quit_game)
            .on(EventKind::PauseGame, Self::on_pause_game)
            .on(EventKind::LeaveCurrentScene, Self::on_leave_current_scene)
            .on(EventKind::SceneIntervalActivate, Self::on_interval_activate)
            .on(EventKind::SceneIntervalDeactivate, Self::on_interval_deactivate)
            .on(EventKind::SceneIntervalTick, Self::on_interval_tick)
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
