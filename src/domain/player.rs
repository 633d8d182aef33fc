/// Player: horizontal movement, floor changes, digging and status effects.
///
/// ## Status effects
///
/// Three independent slots, each overwritten (never stacked) by a new gimmick:
///   - **stun**     : `stun_ticks > 0`. Suppresses every voluntary action.
///   - **invisible**: `invisible_until = Some(floor)`. Cleared on descending
///     to or past that floor. Monsters cannot touch the player meanwhile.
///   - **speed**    : `SpeedEffect::{Slow, Fast}` with its own countdown;
///     the multiplier falls back to 1.0 only when the countdown runs out.
///
/// Precedence lives in `can_act()`: every action handler checks it first.
/// Digging is not an action once started, so a stun never cancels a dig.

use super::floor::FloorMap;
use super::gimmick::{Gimmick, GimmickKind};
use super::layout::{floor_top, Rect, FIELD_WIDTH, GOAL_FLOOR, SIDE_MARGIN};

pub const PLAYER_SIZE: f32 = 60.0;
pub const BASE_SPEED: f32 = 5.0;
pub const START_X: f32 = FIELD_WIDTH / 2.0 - PLAYER_SIZE / 2.0;
pub const MIN_X: f32 = SIDE_MARGIN;
pub const MAX_X: f32 = FIELD_WIDTH - PLAYER_SIZE - SIDE_MARGIN;

pub const DIG_TICKS: u32 = 60;
/// Extra width dug on each side of the player's footprint.
pub const HOLE_MARGIN: f32 = 10.0;

pub const SPEED_EFFECT_TICKS: u32 = 180;
pub const STUN_TICKS: u32 = 120;
pub const TELEPORT_FLOORS: usize = 4;
pub const INVISIBLE_FLOORS: usize = 2;

#[derive(Clone, Copy, PartialEq, Debug)]
pub enum SpeedEffect {
    Normal,
    Slow { ticks: u32 },
    Fast { ticks: u32 },
}

impl SpeedEffect {
    pub fn multiplier(self) -> f32 {
        match self {
            SpeedEffect::Normal => 1.0,
            SpeedEffect::Slow { .. } => 0.5,
            SpeedEffect::Fast { .. } => 1.5,
        }
    }

    pub fn ticks(self) -> u32 {
        match self {
            SpeedEffect::Normal => 0,
            SpeedEffect::Slow { ticks } | SpeedEffect::Fast { ticks } => ticks,
        }
    }

    /// Count down one tick; expires to `Normal` at zero.
    fn tick(self) -> Self {
        match self {
            SpeedEffect::Normal => SpeedEffect::Normal,
            SpeedEffect::Slow { ticks } if ticks > 1 => SpeedEffect::Slow { ticks: ticks - 1 },
            SpeedEffect::Fast { ticks } if ticks > 1 => SpeedEffect::Fast { ticks: ticks - 1 },
            _ => SpeedEffect::Normal,
        }
    }
}

/// Result of a dig request.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum DigStart {
    /// Stunned, already digging, or the ground here is already open.
    Refused,
    Started,
    /// A gimmick fired; digging started as well.
    Gimmick(GimmickKind),
}

#[derive(Clone, Debug)]
pub struct Player {
    pub x: f32,
    pub current_floor: usize,
    /// Remaining dig ticks while a dig is in progress.
    pub dig_ticks: Option<u32>,
    pub invisible_until: Option<usize>,
    pub stun_ticks: u32,
    pub speed_effect: SpeedEffect,
}

impl Player {
    pub fn new() -> Self {
        Player {
            x: START_X,
            current_floor: 0,
            dig_ticks: None,
            invisible_until: None,
            stun_ticks: 0,
            speed_effect: SpeedEffect::Normal,
        }
    }

    // ── Read-only state ──

    pub fn center_x(&self) -> f32 { self.x + PLAYER_SIZE / 2.0 }
    pub fn is_digging(&self) -> bool { self.dig_ticks.is_some() }
    pub fn dig_timer(&self) -> u32 { self.dig_ticks.unwrap_or(0) }
    pub fn is_stunned(&self) -> bool { self.stun_ticks > 0 }
    pub fn is_invisible(&self) -> bool { self.invisible_until.is_some() }
    pub fn speed_multiplier(&self) -> f32 { self.speed_effect.multiplier() }
    pub fn speed_effect_timer(&self) -> u32 { self.speed_effect.ticks() }

    /// Stun overrides every voluntary action.
    pub fn can_act(&self) -> bool {
        !self.is_stunned()
    }

    pub fn sprite(&self) -> Rect {
        Rect::new(self.x, floor_top(self.current_floor) + 10.0, PLAYER_SIZE, PLAYER_SIZE)
    }

    pub fn hitbox(&self) -> Rect {
        self.sprite()
    }

    // ── Actions ──

    /// `dir` is -1 (left) or +1 (right).
    pub fn move_by(&mut self, dir: f32) {
        if !self.can_act() { return; }
        let step = dir * BASE_SPEED * self.speed_multiplier();
        self.x = (self.x + step).clamp(MIN_X, MAX_X);
    }

    /// Drop through a hole under the player's center. Returns true on success.
    pub fn descend(&mut self, floors: &FloorMap) -> bool {
        if !self.can_act() { return false; }
        if self.current_floor >= GOAL_FLOOR { return false; }
        if !floors.has_hole_at(self.current_floor, self.center_x()) { return false; }

        self.current_floor += 1;
        if let Some(end) = self.invisible_until {
            if self.current_floor >= end {
                self.invisible_until = None;
            }
        }
        true
    }

    /// Climb one floor up; no hole needed.
    pub fn jump(&mut self) -> bool {
        if !self.can_act() { return false; }
        if self.current_floor == 0 { return false; }
        self.current_floor -= 1;
        true
    }

    /// Gimmicks are checked before the hole test, so a gimmick sitting on
    /// already-dug ground can still be collected.
    pub fn start_digging(&mut self, floors: &FloorMap, gimmicks: &mut [Gimmick]) -> DigStart {
        if !self.can_act() || self.is_digging() { return DigStart::Refused; }

        let floor = self.current_floor;
        let center = self.center_x();
        let fired = gimmicks.iter_mut().find_map(|g| g.try_activate(floor, center));
        if let Some(kind) = fired {
            self.apply_gimmick(kind);
            self.dig_ticks = Some(DIG_TICKS);
            return DigStart::Gimmick(kind);
        }

        if floors.has_hole_at(floor, center) {
            return DigStart::Refused;
        }
        self.dig_ticks = Some(DIG_TICKS);
        DigStart::Started
    }

    pub fn apply_gimmick(&mut self, kind: GimmickKind) {
        match kind {
            GimmickKind::Teleport => {
                self.current_floor = (self.current_floor + TELEPORT_FLOORS).min(GOAL_FLOOR);
                // cover the landing floor
                self.invisible_until = Some(self.current_floor + 1);
            }
            GimmickKind::Invisible => {
                self.invisible_until = Some(self.current_floor + INVISIBLE_FLOORS);
            }
            GimmickKind::Slow => {
                self.speed_effect = SpeedEffect::Slow { ticks: SPEED_EFFECT_TICKS };
            }
            GimmickKind::Speed => {
                self.speed_effect = SpeedEffect::Fast { ticks: SPEED_EFFECT_TICKS };
            }
            GimmickKind::Stun => {
                self.stun_ticks = STUN_TICKS;
            }
        }
    }

    /// Per-frame timers. Returns the floor a hole was just dug on, if any.
    pub fn tick(&mut self, floors: &mut FloorMap) -> Option<usize> {
        let mut dug = None;
        if let Some(ticks) = self.dig_ticks {
            if ticks <= 1 {
                self.dig_ticks = None;
                floors.add_hole(
                    self.current_floor,
                    self.x - HOLE_MARGIN,
                    self.x + PLAYER_SIZE + HOLE_MARGIN,
                );
                dug = Some(self.current_floor);
            } else {
                self.dig_ticks = Some(ticks - 1);
            }
        }

        if self.stun_ticks > 0 {
            self.stun_ticks -= 1;
        }

        self.speed_effect = self.speed_effect.tick();
        dug
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stunned() -> Player {
        let mut p = Player::new();
        p.current_floor = 3;
        p.apply_gimmick(GimmickKind::Stun);
        p
    }

    // ── Movement ──

    #[test]
    fn moves_at_base_speed() {
        let mut p = Player::new();
        p.move_by(1.0);
        assert_eq!(p.x, START_X + 5.0);
        p.move_by(-1.0);
        p.move_by(-1.0);
        assert_eq!(p.x, START_X - 5.0);
    }

    #[test]
    fn movement_is_clamped_to_field() {
        let mut p = Player::new();
        for _ in 0..200 { p.move_by(-1.0); }
        assert_eq!(p.x, MIN_X);
        for _ in 0..200 { p.move_by(1.0); }
        assert_eq!(p.x, MAX_X);
    }

    #[test]
    fn speed_multiplier_scales_movement() {
        let mut p = Player::new();
        p.apply_gimmick(GimmickKind::Slow);
        p.move_by(1.0);
        assert_eq!(p.x, START_X + 2.5);
        p.apply_gimmick(GimmickKind::Speed);
        p.move_by(1.0);
        assert_eq!(p.x, START_X + 2.5 + 7.5);
    }

    // ── Floors ──

    #[test]
    fn jump_at_surface_is_noop() {
        let mut p = Player::new();
        assert!(!p.jump());
        assert_eq!(p.current_floor, 0);
    }

    #[test]
    fn jump_needs_no_hole() {
        let mut p = Player::new();
        p.current_floor = 7;
        assert!(p.jump());
        assert_eq!(p.current_floor, 6);
    }

    #[test]
    fn descend_requires_hole_under_center() {
        let mut floors = FloorMap::new();
        let mut p = Player::new();
        assert!(!p.descend(&floors));
        assert_eq!(p.current_floor, 0);

        floors.add_hole(0, p.center_x() + 1.0, p.center_x() + 50.0);
        assert!(!p.descend(&floors));

        floors.add_hole(0, p.x, p.x + PLAYER_SIZE);
        assert!(p.descend(&floors));
        assert_eq!(p.current_floor, 1);
    }

    #[test]
    fn descend_at_goal_is_noop() {
        let mut floors = FloorMap::new();
        let mut p = Player::new();
        p.current_floor = GOAL_FLOOR;
        floors.add_hole(GOAL_FLOOR, 0.0, 800.0);
        assert!(!p.descend(&floors));
        assert_eq!(p.current_floor, GOAL_FLOOR);
    }

    #[test]
    fn invisibility_ends_on_reaching_end_floor() {
        let mut floors = FloorMap::new();
        let mut p = Player::new();
        p.current_floor = 10;
        p.apply_gimmick(GimmickKind::Invisible);
        assert_eq!(p.invisible_until, Some(12));

        floors.add_hole(10, 0.0, 800.0);
        floors.add_hole(11, 0.0, 800.0);
        assert!(p.descend(&floors));
        assert!(p.is_invisible());
        assert!(p.descend(&floors));
        assert!(!p.is_invisible());
    }

    #[test]
    fn jump_keeps_invisibility() {
        let mut p = Player::new();
        p.current_floor = 10;
        p.apply_gimmick(GimmickKind::Invisible);
        p.jump();
        assert!(p.is_invisible());
    }

    // ── Digging ──

    #[test]
    fn dig_completes_after_full_duration() {
        let mut floors = FloorMap::new();
        let mut p = Player::new();
        assert_eq!(p.start_digging(&floors, &mut []), DigStart::Started);
        assert_eq!(p.dig_timer(), DIG_TICKS);

        for _ in 0..DIG_TICKS - 1 {
            assert_eq!(p.tick(&mut floors), None);
            assert!(p.is_digging());
        }
        assert_eq!(p.tick(&mut floors), Some(0));
        assert!(!p.is_digging());
        assert_eq!(floors.holes(0).len(), 1);
        let h = floors.holes(0)[0];
        assert_eq!(h.start, p.x - HOLE_MARGIN);
        assert_eq!(h.end, p.x + PLAYER_SIZE + HOLE_MARGIN);
    }

    #[test]
    fn no_second_dig_while_digging() {
        let floors = FloorMap::new();
        let mut p = Player::new();
        p.start_digging(&floors, &mut []);
        p.dig_ticks = Some(10);
        assert_eq!(p.start_digging(&floors, &mut []), DigStart::Refused);
        assert_eq!(p.dig_timer(), 10);
    }

    #[test]
    fn no_dig_over_existing_hole() {
        let mut floors = FloorMap::new();
        let mut p = Player::new();
        floors.add_hole(0, p.x, p.x + PLAYER_SIZE);
        assert_eq!(p.start_digging(&floors, &mut []), DigStart::Refused);
        assert!(!p.is_digging());
    }

    #[test]
    fn gimmick_fires_even_over_existing_hole() {
        let mut floors = FloorMap::new();
        let mut p = Player::new();
        p.current_floor = 8;
        floors.add_hole(8, p.x, p.x + PLAYER_SIZE);
        let mut gimmicks = vec![Gimmick::new(8, GimmickKind::Speed, p.center_x() - 40.0)];

        assert_eq!(
            p.start_digging(&floors, &mut gimmicks),
            DigStart::Gimmick(GimmickKind::Speed),
        );
        assert!(p.is_digging());
        assert!(!gimmicks[0].active);
        assert_eq!(p.speed_multiplier(), 1.5);
    }

    #[test]
    fn spent_gimmick_does_not_refire() {
        let floors = FloorMap::new();
        let mut p = Player::new();
        p.current_floor = 3;
        let mut gimmicks = vec![Gimmick::new(3, GimmickKind::Slow, p.center_x() - 40.0)];
        gimmicks[0].active = false;
        assert_eq!(p.start_digging(&floors, &mut gimmicks), DigStart::Started);
        assert_eq!(p.speed_multiplier(), 1.0);
    }

    #[test]
    fn gimmick_on_other_floor_is_ignored() {
        let floors = FloorMap::new();
        let mut p = Player::new();
        p.current_floor = 2;
        let mut gimmicks = vec![Gimmick::new(3, GimmickKind::Stun, p.center_x() - 40.0)];
        assert_eq!(p.start_digging(&floors, &mut gimmicks), DigStart::Started);
        assert!(!p.is_stunned());
        assert!(gimmicks[0].active);
    }

    // ── Effects ──

    #[test]
    fn stun_blocks_all_actions() {
        let floors = {
            let mut f = FloorMap::new();
            f.add_hole(3, 0.0, 800.0);
            f
        };
        let mut p = stunned();
        let x = p.x;
        p.move_by(1.0);
        assert!(!p.descend(&floors));
        assert!(!p.jump());
        assert_eq!(p.start_digging(&floors, &mut []), DigStart::Refused);
        assert_eq!(p.x, x);
        assert_eq!(p.current_floor, 3);
        assert!(!p.is_digging());
    }

    #[test]
    fn stun_lifts_after_duration() {
        let mut floors = FloorMap::new();
        let mut p = stunned();
        for _ in 0..STUN_TICKS - 1 {
            p.tick(&mut floors);
            assert!(p.is_stunned());
        }
        p.tick(&mut floors);
        assert!(!p.is_stunned());
        assert!(p.jump());
        assert_eq!(p.current_floor, 2);
    }

    #[test]
    fn restun_resets_timer() {
        let mut floors = FloorMap::new();
        let mut p = stunned();
        for _ in 0..50 { p.tick(&mut floors); }
        p.apply_gimmick(GimmickKind::Stun);
        assert_eq!(p.stun_ticks, STUN_TICKS);
    }

    #[test]
    fn slow_overwrites_speed() {
        let mut floors = FloorMap::new();
        let mut p = Player::new();
        p.apply_gimmick(GimmickKind::Speed);
        for _ in 0..100 { p.tick(&mut floors); }
        assert_eq!(p.speed_effect_timer(), SPEED_EFFECT_TICKS - 100);
        p.apply_gimmick(GimmickKind::Slow);
        assert_eq!(p.speed_multiplier(), 0.5);
        assert_eq!(p.speed_effect_timer(), SPEED_EFFECT_TICKS);
    }

    #[test]
    fn speed_effect_expires_to_normal() {
        let mut floors = FloorMap::new();
        let mut p = Player::new();
        p.apply_gimmick(GimmickKind::Slow);
        for _ in 0..SPEED_EFFECT_TICKS - 1 {
            p.tick(&mut floors);
            assert_eq!(p.speed_multiplier(), 0.5);
        }
        p.tick(&mut floors);
        assert_eq!(p.speed_multiplier(), 1.0);
        assert_eq!(p.speed_effect, SpeedEffect::Normal);
    }

    #[test]
    fn teleport_drops_four_floors_and_covers_landing() {
        let mut p = Player::new();
        p.current_floor = 6;
        p.apply_gimmick(GimmickKind::Teleport);
        assert_eq!(p.current_floor, 10);
        assert!(p.is_invisible());
        assert_eq!(p.invisible_until, Some(11));
    }

    #[test]
    fn teleport_caps_at_goal() {
        let mut p = Player::new();
        p.current_floor = 48;
        p.apply_gimmick(GimmickKind::Teleport);
        assert_eq!(p.current_floor, GOAL_FLOOR);
        assert_eq!(p.invisible_until, Some(GOAL_FLOOR + 1));
    }

    #[test]
    fn invisible_overwrites_previous_window() {
        let mut p = Player::new();
        p.current_floor = 20;
        p.apply_gimmick(GimmickKind::Teleport);
        assert_eq!(p.invisible_until, Some(25));
        p.apply_gimmick(GimmickKind::Invisible);
        assert_eq!(p.invisible_until, Some(26));
    }

    #[test]
    fn dig_continues_while_stunned() {
        let mut floors = FloorMap::new();
        let mut p = Player::new();
        p.current_floor = 3;
        let mut gimmicks = vec![Gimmick::new(3, GimmickKind::Stun, p.center_x() - 40.0)];
        p.start_digging(&floors, &mut gimmicks);
        assert!(p.is_stunned());
        for _ in 0..DIG_TICKS { p.tick(&mut floors); }
        assert!(!p.is_digging());
        assert!(floors.has_hole_at(3, p.center_x()));
    }
}
