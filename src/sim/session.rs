/// Session: everything that belongs to one run.
///
/// ## Phases
///
/// ```text
///   Playing ──goal / caught──▶ NameInput ──submit──▶ Clear | GameOver
///      │                                                │
///      └──goal / caught (no record)──▶ Clear | GameOver ─┘──restart──▶ Playing
/// ```
///
/// Restart builds a brand-new `Session` over the same random stream. The
/// leaderboard is not part of the session and survives restarts untouched.
///
/// Renderers get `&Session`; only `step()` mutates it.

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::domain::floor::FloorMap;
use crate::domain::gimmick::{self, Gimmick};
use crate::domain::layout::{GOAL_FLOOR, TICK_RATE};
use crate::domain::monster::{self, Monster};
use crate::domain::player::{Player, HOLE_MARGIN, PLAYER_SIZE};
use super::camera::Camera;
use super::ranking::NAME_MAX_CHARS;

/// Where the developer warp drops the player.
pub const WARP_FLOOR: usize = 48;
/// Invisibility end floor that descent can never reach.
const WARP_INVISIBLE_UNTIL: usize = 999;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    Playing,
    NameInput,
    GameOver,
    Clear,
}

#[derive(Clone, Debug)]
pub struct Session {
    pub phase: Phase,
    pub player: Player,
    pub floors: FloorMap,
    pub gimmicks: Vec<Gimmick>,
    pub monsters: Vec<Monster>,
    pub camera: Camera,

    /// Ticks spent in `Playing`.
    pub elapsed_ticks: u64,
    /// `elapsed_ticks` frozen when the run ended.
    pub final_ticks: u64,

    pub name: String,
    pub is_new_record: bool,

    pub message: String,
    pub message_timer: u32,

    rng: StdRng,
}

impl Session {
    /// A fresh run. `seed` pins the layout for reproducible games.
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        Session::with_rng(rng)
    }

    pub fn with_rng(mut rng: StdRng) -> Self {
        let gimmicks = gimmick::spawn_all(&mut rng);
        let monsters = monster::spawn_all(&mut rng);
        Session {
            phase: Phase::Playing,
            player: Player::new(),
            floors: FloorMap::new(),
            gimmicks,
            monsters,
            camera: Camera::new(),
            elapsed_ticks: 0,
            final_ticks: 0,
            name: String::new(),
            is_new_record: false,
            message: String::new(),
            message_timer: 0,
            rng,
        }
    }

    /// Replace this run with a new one drawn from the same random stream.
    pub fn restart(&mut self) {
        *self = Session::with_rng(self.rng.clone());
    }

    pub fn rng_mut(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    pub fn goal_reached(&self) -> bool {
        self.player.current_floor >= GOAL_FLOOR
    }

    pub fn final_seconds(&self) -> f64 {
        ticks_to_seconds(self.final_ticks)
    }

    pub fn set_message(&mut self, msg: &str, duration: u32) {
        self.message = msg.to_string();
        self.message_timer = duration;
    }

    pub fn tick_message(&mut self) {
        if self.message_timer > 0 {
            self.message_timer -= 1;
            if self.message_timer == 0 { self.message.clear(); }
        }
    }

    /// Accepts printable characters up to the length cap. Returns whether
    /// the character was taken.
    pub fn push_name_char(&mut self, c: char) -> bool {
        if !is_printable(c) || self.name.chars().count() >= NAME_MAX_CHARS {
            return false;
        }
        self.name.push(c);
        true
    }

    pub fn pop_name_char(&mut self) {
        self.name.pop();
    }

    /// Developer shortcut: jump to floor 48 with lasting invisibility and
    /// holes ready on 48 and 49.
    pub fn dev_warp(&mut self) {
        let p = &mut self.player;
        p.current_floor = WARP_FLOOR;
        p.invisible_until = Some(WARP_INVISIBLE_UNTIL);
        for floor in [WARP_FLOOR, WARP_FLOOR + 1] {
            if self.floors.holes(floor).is_empty() {
                self.floors.add_hole(floor, p.x - HOLE_MARGIN, p.x + PLAYER_SIZE + HOLE_MARGIN);
            }
        }
    }
}

pub fn ticks_to_seconds(ticks: u64) -> f64 {
    ticks as f64 / TICK_RATE as f64
}

/// Visible characters only. ' ' is the one space allowed; format and
/// private-use code points are rejected.
fn is_printable(c: char) -> bool {
    if c == ' ' {
        return true;
    }
    if c.is_control() || c.is_whitespace() {
        return false;
    }
    !matches!(c as u32,
        0x00AD
        | 0x0600..=0x0605
        | 0x061C
        | 0x06DD
        | 0x070F
        | 0x180E
        | 0x200B..=0x200F
        | 0x202A..=0x202E
        | 0x2060..=0x206F
        | 0xE000..=0xF8FF
        | 0xFEFF
        | 0xFFF9..=0xFFFB
        | 0xE0000..=0xE007F
        | 0xF0000..=0x10FFFF)
}

/// `MM:SS.CC`
pub fn format_time(ticks: u64) -> String {
    let millis = ticks * 1000 / TICK_RATE as u64;
    let minutes = millis / 60_000;
    let seconds = (millis / 1000) % 60;
    let centis = (millis % 1000) / 10;
    format!("{minutes:02}:{seconds:02}.{centis:02}")
}

/// `MM:SS.CC` from seconds, for stored ranking times.
pub fn format_seconds(secs: f64) -> String {
    let millis = (secs * 1000.0).max(0.0) as u64;
    let minutes = millis / 60_000;
    let seconds = (millis / 1000) % 60;
    let centis = (millis % 1000) / 10;
    format!("{minutes:02}:{seconds:02}.{centis:02}")
}
