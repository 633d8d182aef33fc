/// Gimmicks: single-use triggers buried in one floor.
///
/// A gimmick covers the horizontal band `[band_start, band_start + GIMMICK_WIDTH]`
/// of its floor. Digging with the player's center inside the band fires it once;
/// afterwards it stays in the collection but is inert.

use rand::Rng;

pub const GIMMICK_WIDTH: f32 = 80.0;

/// Band start is drawn from this range when a run starts.
const BAND_START_MIN: i32 = 100;
const BAND_START_MAX: i32 = 620;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum GimmickKind {
    Teleport,
    Invisible,
    Slow,
    Speed,
    Stun,
}

impl GimmickKind {
    pub const ALL: [GimmickKind; 5] = [
        GimmickKind::Teleport,
        GimmickKind::Invisible,
        GimmickKind::Slow,
        GimmickKind::Speed,
        GimmickKind::Stun,
    ];

    /// Floors that carry one gimmick of this kind.
    pub fn floors(self) -> &'static [usize] {
        match self {
            GimmickKind::Teleport => &[6, 20, 28, 42],
            GimmickKind::Invisible => &[5, 13, 34, 45],
            GimmickKind::Slow => &[5, 14, 31, 46],
            GimmickKind::Speed => &[8, 24, 37],
            GimmickKind::Stun => &[3, 11, 22, 31, 45],
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            GimmickKind::Teleport => "TELEPORT",
            GimmickKind::Invisible => "INVISIBLE",
            GimmickKind::Slow => "SLOW",
            GimmickKind::Speed => "SPEED",
            GimmickKind::Stun => "STUN",
        }
    }
}

#[derive(Clone, Debug)]
pub struct Gimmick {
    pub floor: usize,
    pub kind: GimmickKind,
    pub band_start: f32,
    pub active: bool,
}

impl Gimmick {
    pub fn new(floor: usize, kind: GimmickKind, band_start: f32) -> Self {
        Gimmick { floor, kind, band_start, active: true }
    }

    pub fn band_end(&self) -> f32 {
        self.band_start + GIMMICK_WIDTH
    }

    pub fn covers(&self, floor: usize, x: f32) -> bool {
        self.floor == floor && self.band_start <= x && x <= self.band_end()
    }

    /// Fire once if active and `center_x` on `floor` lies inside the band.
    pub fn try_activate(&mut self, floor: usize, center_x: f32) -> Option<GimmickKind> {
        if !self.active || !self.covers(floor, center_x) {
            return None;
        }
        self.active = false;
        Some(self.kind)
    }
}

/// Full gimmick set for a new run, in kind order.
pub fn spawn_all<R: Rng>(rng: &mut R) -> Vec<Gimmick> {
    let mut out = Vec::new();
    for kind in GimmickKind::ALL {
        for &floor in kind.floors() {
            let x = rng.gen_range(BAND_START_MIN..=BAND_START_MAX) as f32;
            out.push(Gimmick::new(floor, kind, x));
        }
    }
    out
}
