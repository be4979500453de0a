//=========================================================================
// Stage Errors
//=========================================================================
//
// Error taxonomy shared by the event bus, the scene registry and the
// scene manager.
//
// Two channels:
// - Recoverable conditions are returned as `StageError` values.
// - Contract violations (missing scene on interval events, bad builder
//   arguments) panic at the call site and are never caught.
//
//=========================================================================

//=== StageError ==========================================================

/// Errors produced by the stage core.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StageError {
    /// A raw event identifier does not name any known event kind.
    #[error("event kind {0} is not a recognized event identifier")]
    InvalidEventKind(u16),

    /// An argument failed validation.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The `type` discriminator of a scene definition is not registered.
    #[error("scene type '{0}' is not known")]
    UnknownSceneType(String),

    /// The `type` discriminator is present but cannot name a scene kind.
    #[error("scene type {0} is not a valid scene type")]
    InvalidSceneType(String),

    /// A scene kind rejected its configuration.
    #[error("error instantiating scene '{name}': {reason}")]
    SceneConstruction { name: String, reason: String },

    /// No scene is registered under the requested name.
    #[error("scene '{0}' not found")]
    SceneNotFound(String),

    /// A listener hook reported a failure during dispatch.
    #[error("failed to execute {listener}.{hook}: {reason}")]
    ListenerHookFailure {
        listener: String,
        hook: String,
        reason: String,
    },

    /// Bulk scene loading finished with failures.
    #[error("{failed} of {total} scenes failed to load")]
    SceneLoad { failed: usize, total: usize },

    /// Scene code reported a failure from one of its lifecycle methods.
    #[error("scene '{scene}' failed: {reason}")]
    Scene { scene: String, reason: String },
}

impl StageError {
    /// Shorthand for failures raised by scene implementations.
    pub fn scene(scene: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Scene {
            scene: scene.into(),
            reason: reason.into(),
        }
    }
}

/// Result alias used throughout the crate.
pub type StageResult<T> = Result<T, StageError>;

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_value() {
        assert_eq!(
            StageError::UnknownSceneType("cutscene".into()).to_string(),
            "scene type 'cutscene' is not known"
        );
        assert_eq!(
            StageError::SceneLoad { failed: 2, total: 5 }.to_string(),
            "2 of 5 scenes failed to load"
        );
    }

    #[test]
    fn scene_shorthand_builds_scene_variant() {
        let err = StageError::scene("menu", "no items");
        assert_eq!(
            err,
            StageError::Scene {
                scene: "menu".into(),
                reason: "no items".into()
            }
        );
    }
}
