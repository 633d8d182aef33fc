/// Per-floor dig state.
///
/// Holes are horizontal intervals, append-only for the lifetime of a run:
/// never removed, never merged. Overlap between holes is allowed.

use super::layout::TOTAL_FLOORS;

/// A dug interval `[start, end]` on one floor.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Hole {
    pub start: f32,
    pub end: f32,
}

impl Hole {
    pub fn contains(&self, x: f32) -> bool {
        self.start <= x && x <= self.end
    }
}

#[derive(Clone, Debug)]
pub struct Floor {
    pub index: usize,
    pub holes: Vec<Hole>,
}

#[derive(Clone, Debug)]
pub struct FloorMap {
    floors: Vec<Floor>,
}

impl FloorMap {
    /// One empty floor per level, surface included.
    pub fn new() -> Self {
        FloorMap {
            floors: (0..TOTAL_FLOORS)
                .map(|index| Floor { index, holes: Vec::new() })
                .collect(),
        }
    }

    pub fn has_hole_at(&self, floor: usize, x: f32) -> bool {
        self.floors[floor].holes.iter().any(|h| h.contains(x))
    }

    pub fn add_hole(&mut self, floor: usize, start: f32, end: f32) {
        self.floors[floor].holes.push(Hole { start, end });
    }

    pub fn holes(&self, floor: usize) -> &[Hole] {
        &self.floors[floor].holes
    }

    pub fn floors(&self) -> &[Floor] {
        &self.floors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_map_has_no_holes() {
        let map = FloorMap::new();
        assert_eq!(map.floors().len(), TOTAL_FLOORS);
        assert!(map.floors().iter().all(|f| f.holes.is_empty()));
        assert!(!map.has_hole_at(0, 400.0));
    }

    #[test]
    fn hole_covers_closed_interval() {
        let mut map = FloorMap::new();
        map.add_hole(3, 100.0, 180.0);
        assert!(map.has_hole_at(3, 100.0));
        assert!(map.has_hole_at(3, 140.0));
        assert!(map.has_hole_at(3, 180.0));
        assert!(!map.has_hole_at(3, 99.5));
        assert!(!map.has_hole_at(3, 180.5));
    }

    #[test]
    fn holes_are_per_floor() {
        let mut map = FloorMap::new();
        map.add_hole(3, 100.0, 180.0);
        assert!(!map.has_hole_at(2, 140.0));
        assert!(!map.has_hole_at(4, 140.0));
    }

    #[test]
    fn holes_survive_later_digs() {
        let mut map = FloorMap::new();
        map.add_hole(7, 200.0, 280.0);
        for i in 0..20 {
            let s = i as f32 * 30.0;
            map.add_hole(7, s, s + 10.0);
            map.add_hole(8, s, s + 80.0);
        }
        assert!(map.has_hole_at(7, 200.0));
        assert!(map.has_hole_at(7, 240.0));
        assert!(map.has_hole_at(7, 280.0));
    }

    #[test]
    fn overlapping_holes_are_kept_separately() {
        let mut map = FloorMap::new();
        map.add_hole(1, 100.0, 180.0);
        map.add_hole(1, 150.0, 230.0);
        map.add_hole(1, 100.0, 180.0);
        assert_eq!(map.holes(1).len(), 3);
        assert_eq!(map.holes(1)[0], Hole { start: 100.0, end: 180.0 });
    }
}
