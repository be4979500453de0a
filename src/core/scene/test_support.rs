//=========================================================================
// Scene Test Support
//=========================================================================
//
// Recording scene shared by scene system tests. Every lifecycle call is
// appended to a journal as "<scene>:<call>".
//
//=========================================================================

use std::cell::RefCell;
use std::rc::Rc;

use super::{NextScene, Scene, SceneContext};
use crate::core::error::{StageError, StageResult};
use crate::core::event_bus::Payload;
use crate::core::input::{KeyCode, Modifiers};

pub(crate) type Journal = Rc<RefCell<Vec<String>>>;

pub(crate) fn journal() -> Journal {
    Rc::new(RefCell::new(Vec::new()))
}

pub(crate) struct RecordingScene {
    name: String,
    journal: Journal,
    next: NextScene,
    interval: Option<u64>,
    failing: Vec<&'static str>,
}

impl RecordingScene {
    pub(crate) fn new(name: &str, journal: &Journal) -> Self {
        Self {
            name: name.to_string(),
            journal: journal.clone(),
            next: NextScene::Stay,
            interval: None,
            failing: Vec::new(),
        }
    }

    pub(crate) fn with_next(mut self, next: NextScene) -> Self {
        self.next = next;
        self
    }

    pub(crate) fn with_interval(mut self, interval_ms: u64) -> Self {
        self.interval = Some(interval_ms);
        self
    }

    /// Makes the named call record itself and then fail.
    pub(crate) fn failing_on(mut self, call: &'static str) -> Self {
        self.failing.push(call);
        self
    }

    pub(crate) fn boxed(self) -> Box<dyn Scene> {
        Box::new(self)
    }

    fn record(&self, call: &str) -> StageResult<()> {
        self.journal
            .borrow_mut()
            .push(format!("{}:{}", self.name, call));
        if self.failing.iter().any(|c| call.starts_with(c)) {
            return Err(StageError::scene(&self.name, format!("{} failed", call)));
        }
        Ok(())
    }
}

impl Scene for RecordingScene {
    fn name(&self) -> &str {
        &self.name
    }

    fn activate(&mut self, _ctx: &SceneContext<'_>, silent: bool) -> StageResult<()> {
        self.record(if silent { "activate:silent" } else { "activate" })
    }

    fn deactivate(&mut self, _ctx: &SceneContext<'_>, silent: bool) -> StageResult<()> {
        self.record(if silent { "deactivate:silent" } else { "deactivate" })
    }

    fn next_scene(&self) -> NextScene {
        self.next.clone()
    }

    fn interval_ms(&self) -> Option<u64> {
        self.interval
    }

    fn on_interval(&mut self, ctx: &SceneContext<'_>) -> StageResult<()> {
        self.record(&format!("interval@{}", ctx.now_ms()))
    }

    fn on_key_down(
        &mut self,
        _ctx: &SceneContext<'_>,
        key: KeyCode,
        _modifiers: Modifiers,
    ) -> StageResult<()> {
        self.record(&format!("key_down:{:?}", key))
    }

    fn on_key_up(
        &mut self,
        _ctx: &SceneContext<'_>,
        key: KeyCode,
        _modifiers: Modifiers,
    ) -> StageResult<()> {
        self.record(&format!("key_up:{:?}", key))
    }

    fn on_pause(&mut self, _ctx: &SceneContext<'_>, _payload: &Payload) -> StageResult<()> {
        self.record("pause")
    }

    fn on_quit(&mut self, _ctx: &SceneContext<'_>) -> StageResult<()> {
        self.record("quit")
    }
}
