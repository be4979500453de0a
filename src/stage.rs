//=========================================================================
// Aetheric Stage
//
// Explicitly constructed context object tying the event bus to the
// scene manager. The frontend owns one `Stage` and drives it once per
// frame.
//
// Architecture:
// ```text
//     StageBuilder  ──build()──>  Stage  ──frame()──>  [one frame]
//         │                         │
//         ├─ with_minimum_interval_ms()   ├─ EventBus (queue + listeners)
//         ├─ with_tick_resolution_ms()    └─ Rc<RefCell<SceneManager>>
//         ├─ with_events_per_frame()          (registered as listener)
//         ├─ with_narrator()
//         └─ with_clock()
// ```
//
//=========================================================================

//=== External Dependencies ===============================================

use std::cell::RefCell;
use std::rc::Rc;

use log::info;

//=== Internal Dependencies ===============================================

use crate::core::error::StageResult;
use crate::core::event_bus::{EventBus, EventKind, EventPoster, Listener, ListenerId, Payload};
use crate::core::input::{KeyCode, Modifiers};
use crate::core::scene::{
    BuiltinScene, Scene, SceneDeclaration, SceneManager, DEFAULT_MINIMUM_INTERVAL_MS,
};
use crate::core::services::{Clock, LogNarrator, MonotonicClock, Narrator};

//=== Constants ===========================================================

/// Default spacing between interval ticks posted by [`Stage::frame`].
pub const DEFAULT_TICK_RESOLUTION_MS: u64 = 10;

/// Default cap on records dispatched per frame.
pub const DEFAULT_EVENTS_PER_FRAME: usize = 16;

//=== StageBuilder ========================================================

/// Builder for configuring and constructing a [`Stage`].
///
/// # Default Values
///
/// - **Minimum scene interval**: 10 ms
/// - **Tick resolution**: 10 ms
/// - **Events per frame**: 16
/// - **Narrator**: [`LogNarrator`]
/// - **Clock**: [`MonotonicClock`]
///
/// # Examples
///
/// ```rust
/// use aetheric_stage::prelude::*;
/// use std::rc::Rc;
///
/// let narrator = TranscriptNarrator::new();
/// let stage = StageBuilder::new()
///     .with_events_per_frame(32)
///     .with_narrator(Rc::new(narrator.clone()))
///     .with_clock(Rc::new(ManualClock::new(0)))
///     .build();
///
/// assert!(stage.is_running());
/// ```
pub struct StageBuilder {
    minimum_interval_ms: u64,
    tick_resolution_ms: u64,
    events_per_frame: usize,
    narrator: Option<Rc<dyn Narrator>>,
    clock: Option<Rc<dyn Clock>>,
}

impl StageBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            minimum_interval_ms: DEFAULT_MINIMUM_INTERVAL_MS,
            tick_resolution_ms: DEFAULT_TICK_RESOLUTION_MS,
            events_per_frame: DEFAULT_EVENTS_PER_FRAME,
            narrator: None,
            clock: None,
        }
    }

    /// Sets the shortest period an interval scene may tick at.
    ///
    /// Default: 10
    ///
    /// # Panics
    ///
    /// Panics if `ms == 0`.
    pub fn with_minimum_interval_ms(mut self, ms: u64) -> Self {
        assert!(ms > 0, "Minimum interval must be positive");
        self.minimum_interval_ms = ms;
        self
    }

    /// Sets how much time must pass between two interval ticks.
    ///
    /// Default: 10
    ///
    /// # Panics
    ///
    /// Panics if `ms == 0`.
    pub fn with_tick_resolution_ms(mut self, ms: u64) -> Self {
        assert!(ms > 0, "Tick resolution must be positive");
        self.tick_resolution_ms = ms;
        self
    }

    /// Sets the maximum number of records dispatched per frame.
    ///
    /// Default: 16
    ///
    /// # Panics
    ///
    /// Panics if `count == 0`.
    pub fn with_events_per_frame(mut self, count: usize) -> Self {
        assert!(count > 0, "Events per frame must be positive, got {}", count);
        self.events_per_frame = count;
        self
    }

    /// Sets the speech backend scenes talk through.
    pub fn with_narrator(mut self, narrator: Rc<dyn Narrator>) -> Self {
        self.narrator = Some(narrator);
        self
    }

    /// Sets the time source for frames and interval scheduling.
    pub fn with_clock(mut self, clock: Rc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Builds the stage and registers its scene manager on the bus.
    pub fn build(self) -> Stage {
        info!(
            "Building stage (min interval: {}ms, tick resolution: {}ms, events/frame: {})",
            self.minimum_interval_ms, self.tick_resolution_ms, self.events_per_frame
        );

        let narrator = self
            .narrator
            .unwrap_or_else(|| Rc::new(LogNarrator) as Rc<dyn Narrator>);
        let clock = self
            .clock
            .unwrap_or_else(|| Rc::new(MonotonicClock::new()) as Rc<dyn Clock>);

        let mut bus = EventBus::new();
        let scenes = Rc::new(RefCell::new(SceneManager::new(
            bus.poster(),
            narrator,
            clock.clone(),
            self.minimum_interval_ms,
        )));
        let scene_listener = bus.add_listener(&scenes);

        Stage {
            bus,
            scenes,
            scene_listener,
            clock,
            tick_resolution_ms: self.tick_resolution_ms,
            events_per_frame: self.events_per_frame,
            last_tick_ms: None,
        }
    }
}

impl Default for StageBuilder {
    fn default() -> Self {
        Self::new()
    }
}

//=== Stage ===============================================================

/// Event bus plus scene manager, driven by the frontend loop.
///
/// # Frame Loop
///
/// ```text
/// frame(now)
///   ├─► post scene_interval_tick(now)   (at most once per resolution)
///   └─► pump × min(pending, events_per_frame)
/// ```
///
/// Records posted while a frame is being processed wait for a later frame.
pub struct Stage {
    bus: EventBus,
    scenes: Rc<RefCell<SceneManager>>,
    scene_listener: ListenerId,
    clock: Rc<dyn Clock>,
    tick_resolution_ms: u64,
    events_per_frame: usize,
    last_tick_ms: Option<u64>,
}

impl Stage {
    //--- Event Bus --------------------------------------------------------

    /// Returns a posting handle usable from anywhere on this thread.
    pub fn poster(&self) -> EventPoster {
        self.bus.poster()
    }

    pub fn post(&self, kind: EventKind, payload: Payload) {
        self.bus.post(kind, payload);
    }

    /// Posts by raw identifier, rejecting unknown codes.
    pub fn post_code(&self, code: u16, payload: Payload) -> StageResult<()> {
        self.bus.post_code(code, payload, None)
    }

    pub fn add_listener<L: Listener>(&mut self, listener: &Rc<RefCell<L>>) -> ListenerId {
        self.bus.add_listener(listener)
    }

    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        self.bus.remove_listener(id)
    }

    /// Dispatches at most one queued record.
    pub fn pump(&mut self) -> bool {
        self.bus.pump()
    }

    pub fn pending(&self) -> usize {
        self.bus.pending()
    }

    /// Listener id of the scene manager, for targeted posts.
    pub fn scene_listener(&self) -> ListenerId {
        self.scene_listener
    }

    //--- Frame Loop -------------------------------------------------------

    /// Runs one frame at the clock's current time.
    pub fn frame(&mut self) -> usize {
        let now_ms = self.clock.now_ms();
        self.frame_at(now_ms)
    }

    /// Runs one frame at `now_ms`. Returns how many records were dispatched.
    ///
    /// `now_ms` becomes the scene time for everything dispatched in this
    /// frame, interval activations included.
    pub fn frame_at(&mut self, now_ms: u64) -> usize {
        self.scenes.borrow_mut().set_frame_time(now_ms);
        let tick_due = match self.last_tick_ms {
            None => true,
            Some(last) => now_ms.saturating_sub(last) >= self.tick_resolution_ms,
        };
        if tick_due {
            self.bus
                .post(EventKind::SceneIntervalTick, Payload::at_time(now_ms));
            self.last_tick_ms = Some(now_ms);
        }

        let budget = self.bus.pending().min(self.events_per_frame);
        let mut dispatched = 0;
        while dispatched < budget && self.bus.pump() {
            dispatched += 1;
        }
        dispatched
    }

    //--- Scenes -----------------------------------------------------------

    /// Constructs and registers every built-in and declared scene.
    pub fn initialize_scenes<B, D>(&mut self, builtins: B, declared: D) -> StageResult<usize>
    where
        B: IntoIterator<Item = BuiltinScene>,
        D: IntoIterator<Item = SceneDeclaration>,
    {
        self.scenes
            .borrow_mut()
            .registry_mut()
            .initialize(builtins, declared)
    }

    pub fn add_scene(&mut self, name: &str, scene: Box<dyn Scene>) -> StageResult<()> {
        self.scenes.borrow_mut().registry_mut().add_scene(name, scene)
    }

    /// Makes `name` the active scene immediately.
    pub fn load_scene(&mut self, name: &str) -> StageResult<()> {
        self.scenes.borrow_mut().load(name, false, false)
    }

    pub fn leave_current_scene(&mut self) {
        self.scenes.borrow_mut().leave(false);
    }

    pub fn on_key_down(&mut self, key: KeyCode, modifiers: Modifiers) {
        self.scenes.borrow_mut().on_key_down(key, modifiers);
    }

    pub fn on_key_up(&mut self, key: KeyCode, modifiers: Modifiers) {
        self.scenes.borrow_mut().on_key_up(key, modifiers);
    }

    pub fn active_scene(&self) -> Option<String> {
        self.scenes.borrow().active_scene().map(str::to_string)
    }

    /// `false` once quit has been handled; the frontend should stop.
    pub fn is_running(&self) -> bool {
        !self.scenes.borrow().quit_requested()
    }

    pub fn scene_manager(&self) -> &Rc<RefCell<SceneManager>> {
        &self.scenes
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::event_bus::HookTable;
    use crate::core::scene::test_support::{journal, RecordingScene};
    use crate::core::scene::kinds::{MenuScene, StoryTextScene};
    use crate::core::scene::NextScene;
    use crate::core::services::{ManualClock, TranscriptNarrator};

    //=====================================================================
    // StageBuilder Tests
    //=====================================================================

    #[test]
    fn builder_defaults() {
        let builder = StageBuilder::new();
        assert_eq!(builder.minimum_interval_ms, 10);
        assert_eq!(builder.tick_resolution_ms, 10);
        assert_eq!(builder.events_per_frame, 16);
    }

    #[test]
    fn builder_overrides() {
        let builder = StageBuilder::new()
            .with_minimum_interval_ms(50)
            .with_tick_resolution_ms(20)
            .with_events_per_frame(4);
        assert_eq!(builder.minimum_interval_ms, 50);
        assert_eq!(builder.tick_resolution_ms, 20);
        assert_eq!(builder.events_per_frame, 4);
    }

    #[test]
    #[should_panic(expected = "Events per frame must be positive")]
    fn builder_rejects_zero_events_per_frame() {
        StageBuilder::new().with_events_per_frame(0);
    }

    #[test]
    #[should_panic(expected = "Tick resolution must be positive")]
    fn builder_rejects_zero_tick_resolution() {
        StageBuilder::new().with_tick_resolution_ms(0);
    }

    #[test]
    #[should_panic(expected = "Minimum interval must be positive")]
    fn builder_rejects_zero_minimum_interval() {
        StageBuilder::new().with_minimum_interval_ms(0);
    }

    #[test]
    fn build_registers_scene_manager() {
        let stage = StageBuilder::new().build();
        assert_eq!(stage.bus.listener_count(), 1);
        assert!(stage.is_running());
        assert_eq!(stage.active_scene(), None);
    }

    //=====================================================================
    // Stage Tests
    //=====================================================================

    fn manual_stage(clock: &ManualClock) -> Stage {
        StageBuilder::new()
            .with_narrator(Rc::new(TranscriptNarrator::new()))
            .with_clock(Rc::new(clock.clone()))
            .build()
    }

    /// Re-posts one `pause_game` per `pause_game` it sees.
    struct Echo {
        heard: usize,
    }

    impl Listener for Echo {
        fn listener_name(&self) -> String {
            "Echo".into()
        }

        fn hooks() -> HookTable<Self> {
            HookTable::<Self>::new().on(EventKind::PauseGame, |me, _payload, poster| {
                me.heard += 1;
                poster.post(EventKind::PauseGame, Payload::new());
                Ok(())
            })
        }
    }

    #[test]
    fn frame_only_sees_events_queued_before_it() {
        let clock = ManualClock::new(0);
        let mut stage = manual_stage(&clock);
        let echo = Rc::new(RefCell::new(Echo { heard: 0 }));
        stage.add_listener(&echo);

        stage.post(EventKind::PauseGame, Payload::new());
        // tick + pause
        assert_eq!(stage.frame_at(0), 2);
        assert_eq!(echo.borrow().heard, 1);
        assert_eq!(stage.pending(), 1);

        assert_eq!(stage.frame_at(5), 1);
        assert_eq!(echo.borrow().heard, 2);
    }

    #[test]
    fn frame_respects_event_budget() {
        let clock = ManualClock::new(0);
        let mut stage = StageBuilder::new()
            .with_events_per_frame(2)
            .with_clock(Rc::new(clock.clone()))
            .with_narrator(Rc::new(TranscriptNarrator::new()))
            .build();

        for _ in 0..4 {
            stage.post(EventKind::HeroWalkStart, Payload::new());
        }
        assert_eq!(stage.frame_at(0), 2);
        assert_eq!(stage.pending(), 3);
    }

    #[test]
    fn ticks_follow_resolution() {
        let clock = ManualClock::new(0);
        let mut stage = manual_stage(&clock);

        stage.frame_at(0);
        stage.frame_at(9);
        assert_eq!(stage.pending(), 0);

        stage.frame_at(10);
        assert_eq!(stage.last_tick_ms, Some(10));
    }

    #[test]
    fn interval_scene_ticks_through_frames() {
        let clock = ManualClock::new(0);
        let mut stage = manual_stage(&clock);
        let log = journal();
        stage
            .add_scene("story", RecordingScene::new("story", &log).with_interval(100).boxed())
            .unwrap();

        stage.post(EventKind::SceneIntervalActivate, Payload::for_scene("story"));
        stage.frame();

        clock.set(100);
        stage.frame();
        clock.set(150);
        stage.frame();
        clock.set(200);
        stage.frame();

        assert_eq!(*log.borrow(), vec!["story:interval@100", "story:interval@200"]);
    }

    #[test]
    fn frame_time_drives_interval_activation() {
        let clock = ManualClock::new(0);
        let narrator = TranscriptNarrator::new();
        let mut stage = StageBuilder::new()
            .with_narrator(Rc::new(narrator.clone()))
            .with_clock(Rc::new(clock.clone()))
            .build();
        let story = StoryTextScene::new("s", vec!["a".into(), "b".into(), "c".into()], NextScene::Stay)
            .unwrap()
            .with_interval(1_000);
        stage.add_scene("s", Box::new(story)).unwrap();

        stage.load_scene("s").unwrap();
        stage.frame_at(5_000);
        assert_eq!(narrator.lines(), vec!["a"]);
        assert_eq!(
            stage.scene_manager().borrow().scheduler().next_tick_due("s"),
            Some(6_000)
        );

        stage.frame_at(5_990);
        assert_eq!(narrator.lines(), vec!["a"]);
        stage.frame_at(6_000);
        assert_eq!(narrator.lines(), vec!["a", "b"]);
    }

    #[test]
    fn empty_scenes_cannot_reach_the_stage() {
        assert!(StoryTextScene::new("s", Vec::new(), NextScene::Stay).is_err());
        assert!(MenuScene::new("m", None, Vec::new()).is_err());
    }

    #[test]
    fn quit_stops_the_stage() {
        let clock = ManualClock::new(0);
        let mut stage = manual_stage(&clock);
        let log = journal();
        stage
            .add_scene("end", RecordingScene::new("end", &log).with_next(NextScene::Quit).boxed())
            .unwrap();

        stage.load_scene("end").unwrap();
        stage.leave_current_scene();
        assert!(stage.is_running());

        stage.frame();
        assert!(!stage.is_running());
        assert_eq!(stage.active_scene(), None);
        assert_eq!(*log.borrow(), vec!["end:activate", "end:quit"]);
    }

    #[test]
    fn post_code_validates() {
        let stage = StageBuilder::new().build();
        assert!(stage.post_code(12, Payload::new()).is_ok());
        assert!(stage.post_code(99, Payload::new()).is_err());
        assert_eq!(stage.pending(), 1);
    }
}
