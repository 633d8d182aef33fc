/// Vertical camera over the floor stack.
///
/// Two modes:
///   1. **Auto**: keeps the player's floor a third of the way down the
///      visible field. Recomputed every tick.
///   2. **Manual** ("view mode"): an independent offset moved by scroll
///      intents; ignores the player.
///
/// Both share the clamp `[0, MAX_SCROLL]`. Leaving manual mode snaps straight
/// back to the auto offset, no easing.

use crate::domain::layout::{FIELD_HEIGHT, FIELD_TOP, FLOOR_HEIGHT, TOTAL_FLOORS};

/// Height of the playfield below the HUD.
pub const VISIBLE_HEIGHT: i32 = FIELD_HEIGHT - FIELD_TOP;
pub const MAX_SCROLL: i32 = TOTAL_FLOORS as i32 * FLOOR_HEIGHT - VISIBLE_HEIGHT + FIELD_TOP;

/// Manual scroll per tick while a scroll key is held.
pub const KEY_SCROLL_STEP: i32 = 20;
/// Manual scroll per wheel notch / page key.
pub const WHEEL_SCROLL_STEP: i32 = 50;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum CameraMode {
    Auto,
    Manual,
}

#[derive(Clone, Debug)]
pub struct Camera {
    pub mode: CameraMode,
    /// Current vertical offset in logical pixels.
    pub offset: i32,
    manual_offset: i32,
}

/// Auto-follow offset for a player standing on `floor`.
pub fn auto_offset(floor: usize) -> i32 {
    let target = floor as i32 * FLOOR_HEIGHT - VISIBLE_HEIGHT / 3;
    target.clamp(0, MAX_SCROLL)
}

impl Camera {
    pub fn new() -> Self {
        Camera { mode: CameraMode::Auto, offset: 0, manual_offset: 0 }
    }

    pub fn is_manual(&self) -> bool {
        self.mode == CameraMode::Manual
    }

    /// Flip between auto and manual. Entering manual keeps the current view.
    pub fn toggle(&mut self, player_floor: usize) {
        match self.mode {
            CameraMode::Auto => {
                self.mode = CameraMode::Manual;
                self.manual_offset = self.offset;
            }
            CameraMode::Manual => {
                self.mode = CameraMode::Auto;
                self.offset = auto_offset(player_floor);
            }
        }
    }

    /// Ignored in auto mode.
    pub fn scroll(&mut self, delta: i32) {
        if self.mode != CameraMode::Manual { return; }
        self.manual_offset = (self.manual_offset + delta).clamp(0, MAX_SCROLL);
    }

    pub fn update(&mut self, player_floor: usize) {
        self.offset = match self.mode {
            CameraMode::Auto => auto_offset(player_floor),
            CameraMode::Manual => self.manual_offset,
        };
    }
}
