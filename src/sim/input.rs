//! Logical input actions
//!
//! The platform layer maps physical keys onto this closed set of actions;
//! gameplay code only ever sees actions.

use glam::DVec2;

/// Everything a key can mean to the game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    MoveForward,
    MoveBack,
    MoveLeft,
    MoveRight,
    Shoot,
    ToggleWireframe,
    ToggleSpin,
    Restart,
    Quit,
}

const ACTION_COUNT: usize = 9;

impl Action {
    pub const ALL: [Action; ACTION_COUNT] = [
        Action::MoveForward,
        Action::MoveBack,
        Action::MoveLeft,
        Action::MoveRight,
        Action::Shoot,
        Action::ToggleWireframe,
        Action::ToggleSpin,
        Action::Restart,
        Action::Quit,
    ];

    fn index(self) -> usize {
        self as usize
    }
}

/// Input delivered by the platform, queued until the next frame polls it
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    Action { action: Action, pressed: bool },
    /// Cursor position in viewport pixels
    CursorMoved(DVec2),
    /// New viewport size in pixels
    Resized { width: u32, height: u32 },
    /// Number key pressed; 0-based shading variant index
    SelectShading(usize),
}

/// Held state of every action
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActionState {
    held: [bool; ACTION_COUNT],
}

impl ActionState {
    /// Record a press/release. Returns true on a fresh press (not a repeat).
    pub fn set(&mut self, action: Action, pressed: bool) -> bool {
        let was_held = std::mem::replace(&mut self.held[action.index()], pressed);
        pressed && !was_held
    }

    #[inline]
    pub fn is_held(&self, action: Action) -> bool {
        self.held[action.index()]
    }

    pub fn release_all(&mut self) {
        self.held = [false; ACTION_COUNT];
    }
}

/// Cursor tracking for mouse-look
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CursorState {
    /// Latest cursor position
    pub position: DVec2,
    /// Position at the previous look update
    last: DVec2,
    /// Next event only establishes the origin
    first: bool,
}

impl Default for CursorState {
    fn default() -> Self {
        Self {
            position: DVec2::ZERO,
            last: DVec2::ZERO,
            first: true,
        }
    }
}

impl CursorState {
    /// Record a cursor move and return the look offset (x right, y up)
    pub fn moved(&mut self, position: DVec2) -> (f32, f32) {
        if self.first {
            self.last = position;
            self.first = false;
        }
        self.position = position;
        let x_offset = (position.x - self.last.x) as f32;
        let y_offset = (self.last.y - position.y) as f32;
        self.last = position;
        (x_offset, y_offset)
    }

    /// Make `origin` the reference point without producing a look offset
    pub fn reset_origin(&mut self, origin: DVec2) {
        self.position = origin;
        self.last = origin;
        self.first = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_press_release() {
        let mut state = ActionState::default();
        assert!(state.set(Action::MoveForward, true));
        assert!(state.is_held(Action::MoveForward));
        // Key repeat is not a fresh press
        assert!(!state.set(Action::MoveForward, true));
        assert!(!state.set(Action::MoveForward, false));
        assert!(!state.is_held(Action::MoveForward));
    }

    #[test]
    fn test_two_actions_held_together() {
        let mut state = ActionState::default();
        state.set(Action::MoveForward, true);
        state.set(Action::MoveLeft, true);
        assert!(state.is_held(Action::MoveForward) && state.is_held(Action::MoveLeft));
        state.release_all();
        assert!(Action::ALL.iter().all(|a| !state.is_held(*a)));
    }

    #[test]
    fn test_first_cursor_event_has_no_offset() {
        let mut cursor = CursorState::default();
        assert_eq!(cursor.moved(DVec2::new(300.0, 200.0)), (0.0, 0.0));
        assert_eq!(cursor.moved(DVec2::new(310.0, 190.0)), (10.0, 10.0));
    }

    #[test]
    fn test_reset_origin() {
        let mut cursor = CursorState::default();
        cursor.moved(DVec2::new(10.0, 10.0));
        cursor.reset_origin(DVec2::new(600.0, 450.0));
        assert_eq!(cursor.moved(DVec2::new(600.0, 450.0)), (0.0, 0.0));
        assert_eq!(cursor.position, DVec2::new(600.0, 450.0));
    }
}
