//! Input normalization
//!
//! Keyboard and on-screen touch controls both write into one `InputSource`.
//! Directions are level-triggered (held). Jump and pause are edge-triggered:
//! a press latches an edge that the next frame consumes, and key auto-repeat
//! while held does not produce another one.

use crate::sim::TickInput;

/// A logical control
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Left,
    Right,
    Jump,
    Pause,
}

impl Action {
    /// Map a `KeyboardEvent.code` to an action
    pub fn from_key_code(code: &str) -> Option<Self> {
        match code {
            "ArrowLeft" | "KeyA" => Some(Action::Left),
            "ArrowRight" | "KeyD" => Some(Action::Right),
            "Space" | "ArrowUp" | "KeyW" => Some(Action::Jump),
            "Escape" => Some(Action::Pause),
            _ => None,
        }
    }
}

/// Everything the frame loop needs from input for one frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameInput {
    pub held: TickInput,
    /// Jump was pressed since the last frame
    pub jump: bool,
    /// Pause was pressed since the last frame
    pub pause: bool,
}

/// Shared logical input state
#[derive(Debug, Clone, Default)]
pub struct InputSource {
    left: bool,
    right: bool,
    jump_held: bool,
    pause_held: bool,
    jump_edge: bool,
    pause_edge: bool,
}

impl InputSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark an action as pressed. Returns true if it was not already held.
    pub fn press(&mut self, action: Action) -> bool {
        let held = self.held_mut(action);
        let changed = !*held;
        *held = true;
        if changed {
            match action {
                Action::Jump => self.jump_edge = true,
                Action::Pause => self.pause_edge = true,
                Action::Left | Action::Right => {}
            }
        }
        changed
    }

    /// Mark an action as released. Returns true if it was held.
    pub fn release(&mut self, action: Action) -> bool {
        let held = self.held_mut(action);
        let changed = *held;
        *held = false;
        changed
    }

    /// Keyboard down. Returns true if the key is bound (caller may then
    /// suppress the browser default, e.g. page scroll on Space).
    pub fn key_down(&mut self, code: &str) -> bool {
        match Action::from_key_code(code) {
            Some(action) => {
                self.press(action);
                true
            }
            None => false,
        }
    }

    /// Keyboard up. Returns true if the key is bound.
    pub fn key_up(&mut self, code: &str) -> bool {
        match Action::from_key_code(code) {
            Some(action) => {
                self.release(action);
                true
            }
            None => false,
        }
    }

    pub fn is_held(&self, action: Action) -> bool {
        match action {
            Action::Left => self.left,
            Action::Right => self.right,
            Action::Jump => self.jump_held,
            Action::Pause => self.pause_held,
        }
    }

    /// Current held directions without consuming edges
    pub fn held(&self) -> TickInput {
        TickInput {
            left: self.left,
            right: self.right,
        }
    }

    /// Read this frame's input and clear the one-shot edges
    pub fn take_frame_input(&mut self) -> FrameInput {
        let frame = FrameInput {
            held: self.held(),
            jump: self.jump_edge,
            pause: self.pause_edge,
        };
        self.jump_edge = false;
        self.pause_edge = false;
        frame
    }

    /// Release everything (controls went away, window lost focus)
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    fn held_mut(&mut self, action: Action) -> &mut bool {
        match action {
            Action::Left => &mut self.left,
            Action::Right => &mut self.right,
            Action::Jump => &mut self.jump_held,
            Action::Pause => &mut self.pause_held,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_mapping() {
        assert_eq!(Action::from_key_code("KeyA"), Some(Action::Left));
        assert_eq!(Action::from_key_code("ArrowRight"), Some(Action::Right));
        assert_eq!(Action::from_key_code("Space"), Some(Action::Jump));
        assert_eq!(Action::from_key_code("KeyW"), Some(Action::Jump));
        assert_eq!(Action::from_key_code("Escape"), Some(Action::Pause));
        assert_eq!(Action::from_key_code("KeyQ"), None);
    }

    #[test]
    fn test_keyboard_and_touch_share_state() {
        let mut input = InputSource::new();
        input.key_down("ArrowLeft");
        input.press(Action::Right);
        let frame = input.take_frame_input();
        assert!(frame.held.left && frame.held.right);

        input.release(Action::Left);
        assert!(!input.held().left);
    }

    #[test]
    fn test_jump_edge_consumed_once() {
        let mut input = InputSource::new();
        assert!(input.key_down("Space"));
        assert!(input.take_frame_input().jump);
        assert!(!input.take_frame_input().jump);
    }

    #[test]
    fn test_auto_repeat_does_not_retrigger() {
        let mut input = InputSource::new();
        input.key_down("Space");
        input.take_frame_input();
        // Browser repeats keydown while held
        input.key_down("Space");
        assert!(!input.take_frame_input().jump);

        input.key_up("Space");
        input.key_down("Space");
        assert!(input.take_frame_input().jump);
    }

    #[test]
    fn test_clear_releases_everything() {
        let mut input = InputSource::new();
        input.press(Action::Right);
        input.press(Action::Pause);
        input.clear();
        assert_eq!(input.take_frame_input(), FrameInput::default());
    }
}
