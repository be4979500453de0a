//=========================================================================
// Input Relay Types
//
// Keyboard identifiers shared between the frontend and scenes. Decoding
// raw platform input is the frontend's job; the core only relays.
//
//=========================================================================

//=== Submodules ==========================================================
mod keys;

//=== Public API ==========================================================
pub use keys::{KeyCode, Modifiers};
