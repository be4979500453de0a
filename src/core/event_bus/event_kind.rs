//=========================================================================
// Event Kinds
//=========================================================================
//
// Closed set of event identifiers understood by the bus.
//
// Codes are stable integers grouped by concern:
//   1..   general game lifecycle
//   10..  scene lifecycle and interval scheduling
//   50..  hero / gameplay
//
//=========================================================================

//=== External Dependencies ===============================================

use std::fmt;

//=== Internal Dependencies ===============================================

use crate::core::error::StageError;

//=== EventKind ===========================================================

/// Identifier naming what occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum EventKind {
    //--- Game -------------------------------------------------------------
    InitGame = 1,
    QuitGame = 2,
    PauseGame = 3,

    //--- Scenes -----------------------------------------------------------
    LoadScene = 10,
    LeaveScene = 11,
    LeaveCurrentScene = 12,
    SceneIntervalActivate = 13,
    SceneIntervalDeactivate = 14,
    SceneIntervalTick = 15,
    SceneStack = 16,
    SceneUnstack = 17,

    //--- Hero -------------------------------------------------------------
    HeroSpawn = 50,
    HeroWalkStart = 51,
    HeroWalkStop = 52,
    HeroRunStart = 53,
    HeroRunStop = 54,
}

impl EventKind {
    /// Every kind, in code order.
    pub const ALL: [EventKind; 16] = [
        Self::InitGame,
        Self::QuitGame,
        Self::PauseGame,
        Self::LoadScene,
        Self::LeaveScene,
        Self::LeaveCurrentScene,
        Self::SceneIntervalActivate,
        Self::SceneIntervalDeactivate,
        Self::SceneIntervalTick,
        Self::SceneStack,
        Self::SceneUnstack,
        Self::HeroSpawn,
        Self::HeroWalkStart,
        Self::HeroWalkStop,
        Self::HeroRunStart,
        Self::HeroRunStop,
    ];

    /// Numeric identifier of this kind.
    pub fn code(self) -> u16 {
        self as u16
    }

    /// Snake-case name used in diagnostics and hook names.
    pub fn name(self) -> &'static str {
        match self {
            Self::InitGame => "init_game",
            Self::QuitGame => "quit_game",
            Self::PauseGame => "pause_game",
            Self::LoadScene => "load_scene",
            Self::LeaveScene => "leave_scene",
            Self::LeaveCurrentScene => "leave_current_scene",
            Self::SceneIntervalActivate => "scene_interval_activate",
            Self::SceneIntervalDeactivate => "scene_interval_deactivate",
            Self::SceneIntervalTick => "scene_interval_tick",
            Self::SceneStack => "scene_stack",
            Self::SceneUnstack => "scene_unstack",
            Self::HeroSpawn => "hero_spawn",
            Self::HeroWalkStart => "hero_walk_start",
            Self::HeroWalkStop => "hero_walk_stop",
            Self::HeroRunStart => "hero_run_start",
            Self::HeroRunStop => "hero_run_stop",
        }
    }
}

//--- Trait Implementations -----------------------------------------------

impl TryFrom<u16> for EventKind {
    type Error = StageError;

    fn try_from(code: u16) -> Result<Self, Self::Error> {
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.code() == code)
            .ok_or(StageError::InvalidEventKind(code))
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn codes_convert_back_to_kinds() {
        for kind in EventKind::ALL {
            assert_eq!(EventKind::try_from(kind.code()), Ok(kind));
        }
    }

    #[test]
    fn unknown_code_is_rejected() {
        assert_eq!(
            EventKind::try_from(4),
            Err(StageError::InvalidEventKind(4))
        );
        assert_eq!(
            EventKind::try_from(0),
            Err(StageError::InvalidEventKind(0))
        );
    }

    #[test]
    fn names_are_unique() {
        let names: HashSet<_> = EventKind::ALL.iter().map(|k| k.name()).collect();
        assert_eq!(names.len(), EventKind::ALL.len());
    }

    #[test]
    fn display_uses_snake_case_name() {
        assert_eq!(EventKind::LeaveCurrentScene.to_string(), "leave_current_scene");
        assert_eq!(EventKind::SceneIntervalTick.code(), 15);
    }
}
