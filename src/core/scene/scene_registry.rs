//=========================================================================
// Scene Registry
//=========================================================================
//
// Factory and storage for scene instances, keyed by name.
//
// Two construction paths:
//   - Built-in scenes: code-defined, each with its own factory function
//   - Declared scenes: (name, type, config) tuples resolved through the
//     closed `SceneKind` set
//
// Scenes live for the whole process and are only dropped together on quit.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::BTreeMap;

use log::{debug, error, info, warn};

//=== Internal Dependencies ===============================================

use super::kinds::SceneKind;
use super::{Scene, SceneConfig, SceneState};
use crate::core::error::{StageError, StageResult};

//=== Scene Sources =======================================================

/// Constructor of a code-defined scene.
pub type SceneFactory = fn(&str, &SceneConfig) -> StageResult<Box<dyn Scene>>;

/// A code-defined scene waiting to be constructed.
pub struct BuiltinScene {
    pub name: String,
    pub config: SceneConfig,
    pub factory: SceneFactory,
}

impl BuiltinScene {
    pub fn new(name: impl Into<String>, config: SceneConfig, factory: SceneFactory) -> Self {
        Self {
            name: name.into(),
            config,
            factory,
        }
    }
}

/// A declaratively defined scene: name, type discriminator and config.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneDeclaration {
    pub name: String,
    pub type_name: String,
    pub config: SceneConfig,
}

impl SceneDeclaration {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>, config: SceneConfig) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            config,
        }
    }

    /// Folds name and type into the configuration handed to `create_scene`.
    pub fn into_config(self) -> SceneConfig {
        self.config
            .with("name", self.name)
            .with("type", self.type_name)
    }
}

//=== SceneRegistry =======================================================

struct SceneSlot {
    scene: Box<dyn Scene>,
    state: SceneState,
}

/// Name-keyed scene storage with per-scene activation state.
#[derive(Default)]
pub struct SceneRegistry {
    slots: BTreeMap<String, SceneSlot>,
}

impl SceneRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    //--- Construction -----------------------------------------------------

    /// Builds a scene from its declarative configuration.
    ///
    /// The `type` key selects the scene kind and `name` becomes the
    /// scene's name. Constructor failures are logged here and returned as
    /// `SceneConstruction`.
    pub fn create_scene(&self, config: &SceneConfig) -> StageResult<Box<dyn Scene>> {
        let kind = match config.scene_type() {
            None => return Err(StageError::UnknownSceneType(String::new())),
            Some(value) => {
                let type_name = value
                    .as_str()
                    .ok_or_else(|| StageError::InvalidSceneType(value.to_string()))?;
                SceneKind::from_type_name(type_name)
                    .ok_or_else(|| StageError::UnknownSceneType(type_name.to_string()))?
            }
        };

        let Some(name) = config.name().filter(|n| !n.is_empty()) else {
            let e = StageError::SceneConstruction {
                name: String::new(),
                reason: format!("{} scene has no name", kind.type_name()),
            };
            error!(target: "scene_registry", "{}", e);
            return Err(e);
        };

        kind.construct(name, config).map_err(|e| {
            let e = match e {
                StageError::SceneConstruction { .. } => e,
                other => StageError::SceneConstruction {
                    name: name.to_string(),
                    reason: other.to_string(),
                },
            };
            error!(target: "scene_registry", "{}", e);
            e
        })
    }

    /// Registers a pre-built scene under `name`, replacing any previous one.
    pub fn add_scene(&mut self, name: &str, scene: Box<dyn Scene>) -> StageResult<()> {
        if name.is_empty() {
            return Err(StageError::InvalidArgument(
                "scene name must not be empty".into(),
            ));
        }

        let slot = SceneSlot {
            scene,
            state: SceneState::Inactive,
        };
        if self.slots.insert(name.to_string(), slot).is_some() {
            warn!(target: "scene_registry", "Scene {} replaced", name);
        } else {
            debug!(target: "scene_registry", "Scene {} added", name);
        }
        Ok(())
    }

    /// Constructs and registers every built-in and declared scene.
    ///
    /// A failing scene is logged and skipped; the rest still load. Returns
    /// the number loaded, or `SceneLoad` if anything failed.
    pub fn initialize<B, D>(&mut self, builtins: B, declared: D) -> StageResult<usize>
    where
        B: IntoIterator<Item = BuiltinScene>,
        D: IntoIterator<Item = SceneDeclaration>,
    {
        let mut total = 0;
        let mut loaded = 0;

        for builtin in builtins {
            info!(target: "scene_registry", "Loading scene {}", builtin.name);
            total += 1;
            let added = (builtin.factory)(&builtin.name, &builtin.config)
                .and_then(|scene| self.add_scene(&builtin.name, scene));
            match added {
                Ok(()) => loaded += 1,
                Err(e) => error!(
                    target: "scene_registry",
                    "Failed to instantiate scene {}: {}", builtin.name, e
                ),
            }
        }

        for declaration in declared {
            total += 1;
            let name = declaration.name.clone();
            let added = self
                .create_scene(&declaration.into_config())
                .and_then(|scene| self.add_scene(&name, scene));
            match added {
                Ok(()) => loaded += 1,
                Err(e) => error!(
                    target: "scene_registry",
                    "Failed to create scene {}: {}", name, e
                ),
            }
        }

        if total > loaded {
            let failed = total - loaded;
            error!(target: "scene_registry", "{} scenes failed to load", failed);
            return Err(StageError::SceneLoad { failed, total });
        }

        info!(target: "scene_registry", "Loaded {} scenes", loaded);
        Ok(loaded)
    }

    //--- Access -----------------------------------------------------------

    pub fn get(&self, name: &str) -> Option<&dyn Scene> {
        self.slots.get(name).map(|slot| slot.scene.as_ref())
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut (dyn Scene + 'static)> {
        self.slots.get_mut(name).map(|slot| slot.scene.as_mut())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.slots.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> Vec<String> {
        self.slots.keys().cloned().collect()
    }

    pub fn state(&self, name: &str) -> Option<SceneState> {
        self.slots.get(name).map(|slot| slot.state)
    }

    /// Returns `false` if no scene is registered under `name`.
    pub fn set_state(&mut self, name: &str, state: SceneState) -> bool {
        match self.slots.get_mut(name) {
            Some(slot) => {
                slot.state = state;
                true
            }
            None => false,
        }
    }

    /// Names of scenes currently in the `Active` state.
    pub fn active_names(&self) -> Vec<&str> {
        self.slots
            .iter()
            .filter(|(_, slot)| slot.state == SceneState::Active)
            .map(|(name, _)| name.as_str())
            .collect()
    }

    pub fn clear(&mut self) {
        self.slots.clear();
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
