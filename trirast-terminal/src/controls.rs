/// Keyboard mapping for the interactive loop
use crossterm::event::KeyCode;

use crate::config::Axis;

/// Degrees added or removed per `a`/`d` press.
pub const ANGLE_STEP: f32 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    Rotate(f32),
    SetAxis(Axis),
    Quit,
}

pub fn action_for(code: KeyCode) -> Option<Action> {
    match code {
        KeyCode::Char('a') => Some(Action::Rotate(ANGLE_STEP)),
        KeyCode::Char('d') => Some(Action::Rotate(-ANGLE_STEP)),
        KeyCode::Char('x') => Some(Action::SetAxis(Axis::X)),
        KeyCode::Char('y') => Some(Action::SetAxis(Axis::Y)),
        KeyCode::Char('z') => Some(Action::SetAxis(Axis::Z)),
        KeyCode::Esc | KeyCode::Char('q') => Some(Action::Quit),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotation_keys() {
        assert_eq!(action_for(KeyCode::Char('a')), Some(Action::Rotate(10.0)));
        assert_eq!(action_for(KeyCode::Char('d')), Some(Action::Rotate(-10.0)));
    }

    #[test]
    fn test_axis_and_quit_keys() {
        assert_eq!(action_for(KeyCode::Char('x')), Some(Action::SetAxis(Axis::X)));
        assert_eq!(action_for(KeyCode::Char('z')), Some(Action::SetAxis(Axis::Z)));
        assert_eq!(action_for(KeyCode::Esc), Some(Action::Quit));
        assert_eq!(action_for(KeyCode::Char('w')), None);
        assert_eq!(action_for(KeyCode::Up), None);
    }
}
