//! Keyboard state
//!
//! Tracks held keys and press edges for the game's actions. Auto-repeat never
//! produces an edge, so holding fire shoots once.

use winit::keyboard::KeyCode;

use crate::sim::TickInput;

/// Game actions bound to keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Left,
    Right,
    Fire,
    Confirm,
    Quit,
}

impl Key {
    const COUNT: usize = 5;

    fn slot(self) -> usize {
        match self {
            Key::Left => 0,
            Key::Right => 1,
            Key::Fire => 2,
            Key::Confirm => 3,
            Key::Quit => 4,
        }
    }
}

/// Map a physical key to a game action
pub fn map_key(code: KeyCode) -> Option<Key> {
    match code {
        KeyCode::ArrowLeft | KeyCode::KeyA => Some(Key::Left),
        KeyCode::ArrowRight | KeyCode::KeyD => Some(Key::Right),
        KeyCode::Space => Some(Key::Fire),
        KeyCode::Enter | KeyCode::NumpadEnter => Some(Key::Confirm),
        KeyCode::Escape => Some(Key::Quit),
        _ => None,
    }
}

#[derive(Debug, Default, Clone)]
pub struct InputState {
    held: [bool; Key::COUNT],
    pressed: [bool; Key::COUNT],
}

impl InputState {
    /// Apply a key transition
    pub fn key_event(&mut self, key: Key, down: bool, repeat: bool) {
        let slot = key.slot();
        if down && !repeat && !self.held[slot] {
            self.pressed[slot] = true;
        }
        self.held[slot] = down;
    }

    pub fn is_down(&self, key: Key) -> bool {
        self.held[key.slot()]
    }

    /// Pressed since the last [`InputState::consume_edges`]
    pub fn was_pressed(&self, key: Key) -> bool {
        self.pressed[key.slot()]
    }

    /// Snapshot for one simulation tick
    pub fn tick_input(&self) -> TickInput {
        TickInput {
            left: self.is_down(Key::Left),
            right: self.is_down(Key::Right),
            fire: self.was_pressed(Key::Fire),
            confirm: self.was_pressed(Key::Confirm),
        }
    }

    /// Forget press edges once a tick has seen them
    pub fn consume_edges(&mut self) {
        self.pressed = [false; Key::COUNT];
    }

    /// Drop everything, e.g. when the window loses focus
    pub fn release_all(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_mapping() {
        assert_eq!(map_key(KeyCode::ArrowLeft), Some(Key::Left));
        assert_eq!(map_key(KeyCode::KeyD), Some(Key::Right));
        assert_eq!(map_key(KeyCode::Space), Some(Key::Fire));
        assert_eq!(map_key(KeyCode::NumpadEnter), Some(Key::Confirm));
        assert_eq!(map_key(KeyCode::Escape), Some(Key::Quit));
        assert_eq!(map_key(KeyCode::KeyQ), None);
    }

    #[test]
    fn test_held_keys_steer() {
        let mut input = InputState::default();
        input.key_event(Key::Left, true, false);
        assert!(input.is_down(Key::Left));
        assert!(input.tick_input().left);

        input.consume_edges();
        // Still held after the edge is consumed
        assert!(input.tick_input().left);

        input.key_event(Key::Left, false, false);
        assert!(!input.tick_input().left);
    }

    #[test]
    fn test_fire_is_an_edge() {
        let mut input = InputState::default();
        input.key_event(Key::Fire, true, false);
        assert!(input.tick_input().fire);

        input.consume_edges();
        assert!(!input.tick_input().fire);

        // Auto-repeat while held is not a new press
        input.key_event(Key::Fire, true, true);
        assert!(!input.tick_input().fire);

        input.key_event(Key::Fire, false, false);
        input.key_event(Key::Fire, true, false);
        assert!(input.tick_input().fire);
    }

    #[test]
    fn test_tap_between_ticks_still_fires() {
        let mut input = InputState::default();
        input.key_event(Key::Confirm, true, false);
        input.key_event(Key::Confirm, false, false);
        let tick = input.tick_input();
        assert!(tick.confirm);
        assert!(!input.is_down(Key::Confirm));
    }

    #[test]
    fn test_release_all() {
        let mut input = InputState::default();
        input.key_event(Key::Right, true, false);
        input.key_event(Key::Fire, true, false);
        input.release_all();
        assert_eq!(input.tick_input(), TickInput::default());
    }
}
