//=========================================================================
// Key Types
//=========================================================================
//
// Portable key and modifier identifiers relayed from the frontend to the
// active scene.
//
// The frontend decodes its own keyboard events into these types; the
// scene manager forwards them unchanged.
//
//=========================================================================

//=== KeyCode =============================================================

/// Physical keyboard key identifier.
///
/// Represents the physical key location, not the character produced.
/// Covers what narrated scenes navigate with; anything else arrives as
/// `Unidentified`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    //--- Numeric Keys -----------------------------------------------------

    Digit0, Digit1, Digit2, Digit3, Digit4,
    Digit5, Digit6, Digit7, Digit8, Digit9,

    //--- Alphabetic Keys --------------------------------------------------

    KeyA, KeyB, KeyC, KeyD, KeyE, KeyF, KeyG, KeyH, KeyI,
    KeyJ, KeyK, KeyL, KeyM, KeyN, KeyO, KeyP, KeyQ, KeyR,
    KeyS, KeyT, KeyU, KeyV, KeyW, KeyX, KeyY, KeyZ,

    //--- Navigation -------------------------------------------------------

    ArrowDown,
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    Home,
    End,

    //--- Special Keys -----------------------------------------------------

    Space,
    Enter,
    Escape,
    Tab,
    Backspace,
    Delete,

    /// Fallback for keys the frontend could not map.
    Unidentified,
}

impl KeyCode {
    /// Digit value for number-row keys.
    pub fn digit(self) -> Option<u8> {
        use KeyCode::*;
        match self {
            Digit0 => Some(0),
            Digit1 => Some(1),
            Digit2 => Some(2),
            Digit3 => Some(3),
            Digit4 => Some(4),
            Digit5 => Some(5),
            Digit6 => Some(6),
            Digit7 => Some(7),
            Digit8 => Some(8),
            Digit9 => Some(9),
            _ => None,
        }
    }

    /// Keys that confirm a choice in narrated scenes.
    pub fn is_confirm(self) -> bool {
        matches!(self, Self::Enter | Self::Space)
    }
}

//=== Modifiers ===========================================================

/// Modifier key state (Shift, Ctrl, Alt).
///
/// Left and right variants are not distinguished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        shift: false,
        ctrl: false,
        alt: false,
    };

    pub const SHIFT: Self = Self {
        shift: true,
        ctrl: false,
        alt: false,
    };

    pub const CTRL: Self = Self {
        shift: false,
        ctrl: true,
        alt: false,
    };

    pub const ALT: Self = Self {
        shift: false,
        ctrl: false,
        alt: true,
    };

    /// True when no modifier is held.
    pub fn is_none(self) -> bool {
        self == Self::NONE
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digits_map_to_values() {
        assert_eq!(KeyCode::Digit0.digit(), Some(0));
        assert_eq!(KeyCode::Digit7.digit(), Some(7));
        assert_eq!(KeyCode::KeyA.digit(), None);
    }

    #[test]
    fn confirm_keys() {
        assert!(KeyCode::Enter.is_confirm());
        assert!(KeyCode::Space.is_confirm());
        assert!(!KeyCode::Escape.is_confirm());
    }

    #[test]
    fn default_modifiers_are_none() {
        assert!(Modifiers::default().is_none());
        assert!(!Modifiers::SHIFT.is_none());
        assert_ne!(Modifiers::CTRL, Modifiers::ALT);
    }
}
