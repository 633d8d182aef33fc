/// Field geometry shared by every entity.
///
/// The simulation works in logical pixels of an 800×600 field. Floor `f`
/// occupies the band starting at `floor_top(f)`; the renderer scales this
/// to terminal cells and never writes back.

pub const FIELD_WIDTH: f32 = 800.0;
pub const FIELD_HEIGHT: i32 = 600;
/// HUD band above the first floor.
pub const FIELD_TOP: i32 = 95;
pub const FLOOR_HEIGHT: i32 = 80;

pub const TOTAL_FLOORS: usize = 51;
pub const GOAL_FLOOR: usize = TOTAL_FLOORS - 1;

pub const TICK_RATE: u32 = 60;

/// Wall inset on both sides of the field.
pub const SIDE_MARGIN: f32 = 50.0;

/// Top edge of floor `floor` in logical pixels.
pub fn floor_top(floor: usize) -> f32 {
    (FIELD_TOP + floor as i32 * FLOOR_HEIGHT) as f32
}

/// Axis-aligned rectangle in logical pixels.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Rect { x, y, w, h }
    }

    pub fn right(&self) -> f32 { self.x + self.w }
    pub fn bottom(&self) -> f32 { self.y + self.h }

    /// Strict overlap: rectangles sharing only an edge do not overlap.
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn floor_top_steps_by_floor_height() {
        assert_eq!(floor_top(0), 95.0);
        assert_eq!(floor_top(1), 175.0);
        assert_eq!(floor_top(GOAL_FLOOR), 95.0 + 50.0 * 80.0);
    }

    #[test]
    fn overlapping_rects() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(5.0, 5.0, 10.0, 10.0);
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
    }

    #[test]
    fn touching_edges_do_not_overlap() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let right = Rect::new(10.0, 0.0, 10.0, 10.0);
        let below = Rect::new(0.0, 10.0, 10.0, 10.0);
        assert!(!a.overlaps(&right));
        assert!(!a.overlaps(&below));
    }

    #[test]
    fn contained_rect_overlaps() {
        let outer = Rect::new(0.0, 0.0, 100.0, 100.0);
        let inner = Rect::new(40.0, 40.0, 5.0, 5.0);
        assert!(outer.overlaps(&inner));
    }
}
