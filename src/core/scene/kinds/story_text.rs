//=========================================================================
// Story Text Scene
//=========================================================================
//
// Narrated pages read one at a time. Leaves once the last page has been
// passed.
//
// Configuration:
//   "text"      string or list of strings (required, non-empty)
//   "next"      target after the last page
//   "interval"  auto-advance period in milliseconds (optional)
//
//=========================================================================

//=== External Dependencies ===============================================

use log::debug;

//=== Internal Dependencies ===============================================

use crate::core::error::{StageError, StageResult};
use crate::core::input::{KeyCode, Modifiers};
use crate::core::scene::{NextScene, Scene, SceneConfig, SceneContext};

//=== StoryTextScene ======================================================

pub struct StoryTextScene {
    name: String,
    pages: Vec<String>,
    next: NextScene,
    interval_ms: Option<u64>,
    page: usize,
    finished: bool,
}

impl StoryTextScene {
    /// Builds a story over `pages`, which must not be empty.
    pub fn new(name: impl Into<String>, pages: Vec<String>, next: NextScene) -> StageResult<Self> {
        let name = name.into();
        if pages.is_empty() {
            return Err(StageError::SceneConstruction {
                name,
                reason: "story has no pages".into(),
            });
        }
        Ok(Self {
            name,
            pages,
            next,
            interval_ms: None,
            page: 0,
            finished: false,
        })
    }

    pub fn with_interval(mut self, interval_ms: u64) -> Self {
        self.interval_ms = Some(interval_ms);
        self
    }

    pub fn from_config(name: &str, config: &SceneConfig) -> StageResult<Self> {
        let pages = config
            .get_str_list("text")
            .filter(|pages| !pages.is_empty())
            .ok_or_else(|| StageError::SceneConstruction {
                name: name.to_string(),
                reason: "'text' must be a string or a non-empty list of strings".into(),
            })?;

        let scene = Self::new(name, pages, config.next_scene())?;
        Ok(match config.interval_ms() {
            Some(ms) => scene.with_interval(ms),
            None => scene,
        })
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    fn read_page(&self, ctx: &SceneContext<'_>) {
        ctx.speak(&self.pages[self.page]);
    }

    fn advance(&mut self, ctx: &SceneContext<'_>) {
        if self.finished {
            return;
        }
        if self.page + 1 < self.pages.len() {
            self.page += 1;
            self.read_page(ctx);
        } else {
            debug!(target: "scene", "Story {} finished", self.name);
            self.finished = true;
            ctx.leave_current_scene();
        }
    }
}

impl Scene for StoryTextScene {
    fn name(&self) -> &str {
        &self.name
    }

    fn activate(&mut self, ctx: &SceneContext<'_>, silent: bool) -> StageResult<()> {
        self.page = 0;
        self.finished = false;
        if !silent {
            self.read_page(ctx);
        }
        if self.interval_ms.is_some() {
            ctx.request_interval(&self.name);
        }
        Ok(())
    }

    fn deactivate(&mut self, ctx: &SceneContext<'_>, _silent: bool) -> StageResult<()> {
        if self.interval_ms.is_some() {
            ctx.cancel_interval(&self.name);
        }
        Ok(())
    }

    fn next_scene(&self) -> NextScene {
        self.next.clone()
    }

    fn interval_ms(&self) -> Option<u64> {
        self.interval_ms
    }

    fn on_interval(&mut self, ctx: &SceneContext<'_>) -> StageResult<()> {
        self.advance(ctx);
        Ok(())
    }

    fn on_key_down(
        &mut self,
        ctx: &SceneContext<'_>,
        key: KeyCode,
        _modifiers: Modifiers,
    ) -> StageResult<()> {
        match key {
            KeyCode::ArrowRight => self.advance(ctx),
            KeyCode::ArrowLeft => {
                if !self.finished && self.page > 0 {
                    self.page -= 1;
                    self.read_page(ctx);
                }
            }
            KeyCode::Home => self.read_page(ctx),
            key if key.is_confirm() => self.advance(ctx),
            _ => {}
        }
        Ok(())
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::event_bus::EventBus;
    use crate::core::services::TranscriptNarrator;
    use serde_json::json;

    fn story(extra: serde_json::Value) -> StoryTextScene {
        let mut config = SceneConfig::from_value(json!({
            "text": ["First.", "Second."],
            "next": "menu"
        }))
        .unwrap();
        if let serde_json::Value::Object(fields) = extra {
            for (key, value) in fields {
                config.set(key, value);
            }
        }
        StoryTextScene::from_config("intro", &config).unwrap()
    }

    #[test]
    fn from_config_accepts_single_string() {
        let config = SceneConfig::new().with("text", "Only page.");
        let scene = StoryTextScene::from_config("s", &config).unwrap();
        assert_eq!(scene.next_scene(), NextScene::Stay);
        assert_eq!(scene.interval_ms(), None);
    }

    #[test]
    fn from_config_rejects_missing_text() {
        assert!(StoryTextScene::from_config("s", &SceneConfig::new()).is_err());
        let empty = SceneConfig::from_value(json!({ "text": [] })).unwrap();
        assert!(StoryTextScene::from_config("s", &empty).is_err());
    }

    #[test]
    fn new_rejects_empty_pages() {
        assert!(matches!(
            StoryTextScene::new("s", Vec::new(), NextScene::Stay),
            Err(StageError::SceneConstruction { .. })
        ));
        assert!(StoryTextScene::new("s", vec!["One.".into()], NextScene::Stay).is_ok());
    }

    #[test]
    fn pages_advance_then_leave_once() {
        let bus = EventBus::new();
        let poster = bus.poster();
        let narrator = TranscriptNarrator::new();
        let ctx = SceneContext::new(&poster, &narrator, 0);
        let mut scene = story(json!({}));

        scene.activate(&ctx, false).unwrap();
        assert_eq!(narrator.lines(), vec!["First."]);

        scene.on_key_down(&ctx, KeyCode::Enter, Modifiers::NONE).unwrap();
        assert_eq!(scene.page(), 1);
        assert_eq!(narrator.last().as_deref(), Some("Second."));
        assert_eq!(bus.pending(), 0);

        scene.on_key_down(&ctx, KeyCode::Enter, Modifiers::NONE).unwrap();
        scene.on_key_down(&ctx, KeyCode::Enter, Modifiers::NONE).unwrap();
        assert!(scene.is_finished());
        assert_eq!(bus.pending(), 1);
        assert_eq!(scene.next_scene(), NextScene::Scene("menu".into()));
    }

    #[test]
    fn back_and_repeat() {
        let bus = EventBus::new();
        let poster = bus.poster();
        let narrator = TranscriptNarrator::new();
        let ctx = SceneContext::new(&poster, &narrator, 0);
        let mut scene = story(json!({}));

        scene.activate(&ctx, true).unwrap();
        assert!(narrator.lines().is_empty());

        scene.on_key_down(&ctx, KeyCode::ArrowLeft, Modifiers::NONE).unwrap();
        assert_eq!(scene.page(), 0);

        scene.on_key_down(&ctx, KeyCode::ArrowRight, Modifiers::NONE).unwrap();
        scene.on_key_down(&ctx, KeyCode::ArrowLeft, Modifiers::NONE).unwrap();
        scene.on_key_down(&ctx, KeyCode::Home, Modifiers::NONE).unwrap();
        assert_eq!(narrator.lines(), vec!["Second.", "First.", "First."]);
    }

    #[test]
    fn interval_is_requested_only_when_configured() {
        let bus = EventBus::new();
        let poster = bus.poster();
        let narrator = TranscriptNarrator::new();
        let ctx = SceneContext::new(&poster, &narrator, 0);

        let mut plain = story(json!({}));
        plain.activate(&ctx, true).unwrap();
        plain.deactivate(&ctx, true).unwrap();
        assert_eq!(bus.pending(), 0);

        let mut timed = story(json!({ "interval": 500 }));
        assert_eq!(timed.interval_ms(), Some(500));
        timed.activate(&ctx, true).unwrap();
        timed.deactivate(&ctx, true).unwrap();
        assert_eq!(bus.pending(), 2);
    }

    #[test]
    fn interval_advances_pages() {
        let bus = EventBus::new();
        let poster = bus.poster();
        let narrator = TranscriptNarrator::new();
        let ctx = SceneContext::new(&poster, &narrator, 0);
        let mut scene = story(json!({ "interval": 500 }));

        scene.activate(&ctx, true).unwrap();
        scene.on_interval(&ctx).unwrap();
        assert_eq!(scene.page(), 1);
        scene.on_interval(&ctx).unwrap();
        assert!(scene.is_finished());
    }
}
