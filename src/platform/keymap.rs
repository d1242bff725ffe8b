//! Physical key bindings

use winit::keyboard::KeyCode;

use crate::sim::Action;

/// What a key does
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyBinding {
    Action(Action),
    /// Shading variant, 0-based
    Shading(usize),
}

/// Key layout: WASD to walk, Space to shoot, L/P toggles, R restart,
/// number keys pick shading, Escape quits
pub fn map_key(code: KeyCode) -> Option<KeyBinding> {
    let action = match code {
        KeyCode::KeyW => Action::MoveForward,
        KeyCode::KeyS => Action::MoveBack,
        KeyCode::KeyA => Action::MoveLeft,
        KeyCode::KeyD => Action::MoveRight,
        KeyCode::Space => Action::Shoot,
        KeyCode::KeyL => Action::ToggleWireframe,
        KeyCode::KeyP => Action::ToggleSpin,
        KeyCode::KeyR => Action::Restart,
        KeyCode::Escape => Action::Quit,
        _ => return shading_key(code).map(KeyBinding::Shading),
    };
    Some(KeyBinding::Action(action))
}

fn shading_key(code: KeyCode) -> Option<usize> {
    const DIGITS: [KeyCode; 9] = [
        KeyCode::Digit1,
        KeyCode::Digit2,
        KeyCode::Digit3,
        KeyCode::Digit4,
        KeyCode::Digit5,
        KeyCode::Digit6,
        KeyCode::Digit7,
        KeyCode::Digit8,
        KeyCode::Digit9,
    ];
    DIGITS.iter().position(|d| *d == code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_movement_keys() {
        assert_eq!(map_key(KeyCode::KeyW), Some(KeyBinding::Action(Action::MoveForward)));
        assert_eq!(map_key(KeyCode::KeyD), Some(KeyBinding::Action(Action::MoveRight)));
    }

    #[test]
    fn test_digits_select_shading_from_zero() {
        assert_eq!(map_key(KeyCode::Digit1), Some(KeyBinding::Shading(0)));
        assert_eq!(map_key(KeyCode::Digit9), Some(KeyBinding::Shading(8)));
        assert_eq!(map_key(KeyCode::Digit0), None);
    }

    #[test]
    fn test_unbound_key() {
        assert_eq!(map_key(KeyCode::KeyQ), None);
    }
}
