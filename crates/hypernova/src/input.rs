//! Keyboard state, fed by the window procedure and read by update code.

/// Virtual-key codes the demo reacts to.
pub mod key {
    pub const ESCAPE: u32 = 0x1B;

    pub const LEFT: u32 = 0x25;
    pub const UP: u32 = 0x26;
    pub const RIGHT: u32 = 0x27;
    pub const DOWN: u32 = 0x28;

    pub const A: u32 = 0x41;
    pub const D: u32 = 0x44;
    pub const S: u32 = 0x53;
    pub const W: u32 = 0x57;
}

const KEY_COUNT: usize = 256;

/// Bounded key-down table. Codes outside the table are ignored rather than
/// indexed, so the window procedure can forward `WPARAM` values verbatim.
pub struct InputState {
    pressed: [bool; KEY_COUNT],
}

impl InputState {
    pub fn new() -> Self {
        Self {
            pressed: [false; KEY_COUNT],
        }
    }

    pub fn set_down(&mut self, code: u32) {
        if let Some(slot) = self.pressed.get_mut(code as usize) {
            *slot = true;
        }
    }

    pub fn set_up(&mut self, code: u32) {
        if let Some(slot) = self.pressed.get_mut(code as usize) {
            *slot = false;
        }
    }

    pub fn is_down(&self, code: u32) -> bool {
        self.pressed.get(code as usize).copied().unwrap_or(false)
    }

    /// -1, 0 or +1 depending on which of the two keys is held.
    pub fn axis(&self, negative: u32, positive: u32) -> f32 {
        let mut value = 0.0;
        if self.is_down(negative) {
            value -= 1.0;
        }
        if self.is_down(positive) {
            value += 1.0;
        }
        value
    }
}

impl Default for InputState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_and_clear_round_trip() {
        let mut input = InputState::new();
        assert!(!input.is_down(key::W));

        input.set_down(key::W);
        assert!(input.is_down(key::W));

        input.set_up(key::W);
        assert!(!input.is_down(key::W));
    }

    #[test]
    fn out_of_range_codes_are_ignored() {
        let mut input = InputState::new();
        input.set_down(0xFFFF);
        input.set_up(0xFFFF);
        assert!(!input.is_down(0xFFFF));
    }

    #[test]
    fn axis_combines_opposing_keys() {
        let mut input = InputState::new();
        assert_eq!(input.axis(key::A, key::D), 0.0);

        input.set_down(key::D);
        assert_eq!(input.axis(key::A, key::D), 1.0);

        input.set_down(key::A);
        assert_eq!(input.axis(key::A, key::D), 0.0);

        input.set_up(key::D);
        assert_eq!(input.axis(key::A, key::D), -1.0);
    }
}
