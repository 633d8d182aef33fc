/// Monsters: horizontal patrollers, one floor each.
///
/// Speed is fixed at spawn from depth: a stepped base curve (+0.5 every three
/// underground floors) times a markdown factor per depth band. Below floor 41
/// monsters also reverse at random, guarded by a cooldown.

use rand::Rng;

use super::layout::{floor_top, Rect, FIELD_WIDTH, GOAL_FLOOR, SIDE_MARGIN};

pub const MONSTER_SIZE: f32 = 50.0;

/// First floor where monsters may turn around on their own.
pub const RANDOM_TURN_FLOOR: usize = 41;
pub const TURN_CHANCE: f64 = 0.01;
pub const TURN_COOLDOWN: u32 = 60;

pub const MIN_X: f32 = SIDE_MARGIN;
pub const MAX_X: f32 = FIELD_WIDTH - MONSTER_SIZE - SIDE_MARGIN;

const SPAWN_X_MIN: i32 = 100;
const SPAWN_X_MAX: i32 = 700;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MonsterKind {
    Skeleton,
    Bat,
    Zombie,
    Dracula,
    Orc,
}

impl MonsterKind {
    pub fn for_floor(floor: usize) -> Self {
        match floor.saturating_sub(1) {
            0..=9 => MonsterKind::Skeleton,
            10..=19 => MonsterKind::Bat,
            20..=29 => MonsterKind::Zombie,
            30..=39 => MonsterKind::Dracula,
            _ => MonsterKind::Orc,
        }
    }
}

/// Pixels per tick for a monster spawned on `floor`.
pub fn speed_for_floor(floor: usize) -> f32 {
    let underground = floor.saturating_sub(1);
    let base = 1.0 + (underground / 3) as f32 * 0.5;
    let markdown = if floor >= 41 {
        0.722
    } else if floor >= 10 {
        0.8123
    } else if floor >= 1 {
        0.855
    } else {
        1.0
    };
    base * markdown
}

#[derive(Clone, Debug)]
pub struct Monster {
    pub floor: usize,
    pub kind: MonsterKind,
    pub x: f32,
    pub speed: f32,
    /// +1 right, -1 left.
    pub direction: f32,
    pub can_random_turn: bool,
    pub turn_cooldown: u32,
}

impl Monster {
    pub fn new(floor: usize, x: f32, direction: f32) -> Self {
        Monster {
            floor,
            kind: MonsterKind::for_floor(floor),
            x,
            speed: speed_for_floor(floor),
            direction,
            can_random_turn: floor >= RANDOM_TURN_FLOOR,
            turn_cooldown: 0,
        }
    }

    pub fn spawn<R: Rng>(floor: usize, rng: &mut R) -> Self {
        let x = rng.gen_range(SPAWN_X_MIN..=SPAWN_X_MAX) as f32;
        let direction = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
        Monster::new(floor, x, direction)
    }

    pub fn update<R: Rng>(&mut self, rng: &mut R) {
        self.x += self.speed * self.direction;

        if self.x <= MIN_X {
            self.x = MIN_X;
            self.direction = 1.0;
        } else if self.x >= MAX_X {
            self.x = MAX_X;
            self.direction = -1.0;
        }

        if self.can_random_turn && self.turn_cooldown == 0 && rng.gen_bool(TURN_CHANCE) {
            self.direction = -self.direction;
            self.turn_cooldown = TURN_COOLDOWN;
        }

        if self.turn_cooldown > 0 {
            self.turn_cooldown -= 1;
        }
    }

    pub fn sprite(&self) -> Rect {
        Rect::new(self.x, floor_top(self.floor) + 15.0, MONSTER_SIZE, MONSTER_SIZE)
    }

    /// Collision box: the sprite with its top 10px trimmed.
    pub fn hitbox(&self) -> Rect {
        let s = self.sprite();
        Rect::new(s.x, s.y + 10.0, s.w, s.h - 10.0)
    }
}

/// One or two monsters on every floor strictly between the surface and the goal.
pub fn spawn_all<R: Rng>(rng: &mut R) -> Vec<Monster> {
    let mut out = Vec::new();
    for floor in 1..GOAL_FLOOR {
        let count = rng.gen_range(1..=2);
        for _ in 0..count {
            out.push(Monster::spawn(floor, rng));
        }
    }
    out
}
