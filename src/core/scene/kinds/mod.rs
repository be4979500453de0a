//=========================================================================
// Scene Kinds
//=========================================================================
//
// Closed set of scene implementations that declarative definitions can
// name through their `type` discriminator.
//
//   "menu"      → MenuScene
//   "storytext" → StoryTextScene
//
//=========================================================================

//=== Module Declarations =================================================

mod menu;
mod story_text;

//=== Public API ==========================================================

pub use menu::{MenuItem, MenuScene};
pub use story_text::StoryTextScene;

//=== Internal Dependencies ===============================================

use super::{Scene, SceneConfig};
use crate::core::error::StageResult;

//=== SceneKind ===========================================================

/// Scene implementation selected by a `type` discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SceneKind {
    Menu,
    StoryText,
}

impl SceneKind {
    pub const ALL: [SceneKind; 2] = [Self::Menu, Self::StoryText];

    /// Resolves a discriminator, or `None` if no kind uses it.
    pub fn from_type_name(type_name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.type_name() == type_name)
    }

    pub fn type_name(self) -> &'static str {
        match self {
            Self::Menu => "menu",
            Self::StoryText => "storytext",
        }
    }

    /// Builds a scene of this kind from its configuration.
    pub fn construct(self, name: &str, config: &SceneConfig) -> StageResult<Box<dyn Scene>> {
        Ok(match self {
            Self::Menu => Box::new(MenuScene::from_config(name, config)?),
            Self::StoryText => Box::new(StoryTextScene::from_config(name, config)?),
        })
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn type_names_resolve() {
        assert_eq!(SceneKind::from_type_name("menu"), Some(SceneKind::Menu));
        assert_eq!(SceneKind::from_type_name("storytext"), Some(SceneKind::StoryText));
        assert_eq!(SceneKind::from_type_name("Menu"), None);
        assert_eq!(SceneKind::from_type_name("cutscene"), None);
    }

    #[test]
    fn construct_builds_named_scene() {
        let config = SceneConfig::from_value(json!({ "text": ["Once upon a time."] })).unwrap();
        let scene = SceneKind::StoryText.construct("intro", &config).unwrap();
        assert_eq!(scene.name(), "intro");
    }
}
