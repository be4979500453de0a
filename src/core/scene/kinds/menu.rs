//=========================================================================
// Menu Scene
//=========================================================================
//
// Narrated list of choices. Each item names the scene it leads to.
//
// Configuration:
//   "title"  spoken when the menu opens (optional)
//   "items"  [{ "label": str, "scene": str }, ...]  (required, non-empty)
//   "back"   target taken on Escape (optional, "__quit" allowed)
//
// Keys:
//   ArrowUp / ArrowDown   move and announce
//   Digit1..Digit9        jump to item
//   Enter / Space         choose → leave_current_scene
//   Escape                back target, if configured → leave_current_scene
//
//=========================================================================

//=== External Dependencies ===============================================

use log::debug;

//=== Internal Dependencies ===============================================

use crate::core::error::{StageError, StageResult};
use crate::core::event_bus::Payload;
use crate::core::input::{KeyCode, Modifiers};
use crate::core::scene::{NextScene, Scene, SceneConfig, SceneContext};

//=== MenuItem ============================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuItem {
    pub label: String,
    pub target: NextScene,
}

//=== MenuScene ===========================================================

pub struct MenuScene {
    name: String,
    title: Option<String>,
    items: Vec<MenuItem>,
    back: NextScene,
    selected: usize,
    chosen: NextScene,
}

impl MenuScene {
    /// Builds a menu over `items`, which must not be empty.
    pub fn new(
        name: impl Into<String>,
        title: Option<String>,
        items: Vec<MenuItem>,
    ) -> StageResult<Self> {
        let name = name.into();
        if items.is_empty() {
            return Err(StageError::SceneConstruction {
                name,
                reason: "'items' is empty".into(),
            });
        }
        Ok(Self {
            name,
            title,
            items,
            back: NextScene::Stay,
            selected: 0,
            chosen: NextScene::Stay,
        })
    }

    pub fn with_back(mut self, back: NextScene) -> Self {
        self.back = back;
        self
    }

    pub fn from_config(name: &str, config: &SceneConfig) -> StageResult<Self> {
        let construction = |reason: String| StageError::SceneConstruction {
            name: name.to_string(),
            reason,
        };

        let raw_items = config
            .get_array("items")
            .ok_or_else(|| construction("missing 'items' list".into()))?;

        let mut items = Vec::with_capacity(raw_items.len());
        for (index, raw) in raw_items.iter().enumerate() {
            let label = raw.get("label").and_then(|v| v.as_str());
            let scene = raw.get("scene").and_then(|v| v.as_str());
            let (Some(label), Some(scene)) = (label, scene) else {
                return Err(construction(format!(
                    "item {} needs string 'label' and 'scene'",
                    index
                )));
            };
            items.push(MenuItem {
                label: label.to_string(),
                target: NextScene::from_target(Some(scene)),
            });
        }

        let title = config.get_str("title").map(str::to_string);
        let back = NextScene::from_target(config.get_str("back"));
        Ok(Self::new(name, title, items)?.with_back(back))
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn items(&self) -> &[MenuItem] {
        &self.items
    }

    //--- Internal Helpers -------------------------------------------------

    fn announce(&self, ctx: &SceneContext<'_>) {
        let item = &self.items[self.selected];
        ctx.speak(&format!(
            "{}, {} of {}",
            item.label,
            self.selected + 1,
            self.items.len()
        ));
    }

    fn select(&mut self, ctx: &SceneContext<'_>, index: usize) {
        self.selected = index;
        self.announce(ctx);
    }

    fn choose(&mut self, ctx: &SceneContext<'_>, target: NextScene) {
        debug!(target: "scene", "Menu {} chose {:?}", self.name, target);
        self.chosen = target;
        ctx.leave_current_scene();
    }
}

impl Scene for MenuScene {
    fn name(&self) -> &str {
        &self.name
    }

    fn activate(&mut self, ctx: &SceneContext<'_>, silent: bool) -> StageResult<()> {
        self.selected = 0;
        self.chosen = NextScene::Stay;
        if !silent {
            if let Some(title) = &self.title {
                ctx.speak(title);
            }
            self.announce(ctx);
        }
        Ok(())
    }

    fn deactivate(&mut self, _ctx: &SceneContext<'_>, _silent: bool) -> StageResult<()> {
        Ok(())
    }

    fn next_scene(&self) -> NextScene {
        self.chosen.clone()
    }

    fn on_key_down(
        &mut self,
        ctx: &SceneContext<'_>,
        key: KeyCode,
        _modifiers: Modifiers,
    ) -> StageResult<()> {
        let count = self.items.len();
        match key {
            KeyCode::ArrowDown => self.select(ctx, (self.selected + 1) % count),
            KeyCode::ArrowUp => self.select(ctx, (self.selected + count - 1) % count),
            KeyCode::Home => self.select(ctx, 0),
            KeyCode::End => self.select(ctx, count - 1),
            KeyCode::Escape => {
                if self.back != NextScene::Stay {
                    self.choose(ctx, self.back.clone());
                }
            }
            key if key.is_confirm() => {
                let target = self.items[self.selected].target.clone();
                self.choose(ctx, target);
            }
            key => {
                if let Some(digit) = key.digit() {
                    let index = usize::from(digit);
                    if (1..=count).contains(&index) {
                        self.select(ctx, index - 1);
                    }
                }
            }
        }
        Ok(())
    }

    fn on_pause(&mut self, ctx: &SceneContext<'_>, _payload: &Payload) -> StageResult<()> {
        self.announce(ctx);
        Ok(())
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
