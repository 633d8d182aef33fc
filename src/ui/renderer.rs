/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Build the next frame into `front` buffer (array of Cell)
///   2. Compare each cell with `back` buffer (previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// Geometry: one terminal column is 10 logical pixels (the 800px field is
/// 80 columns) and one floor is `ROWS_PER_FLOOR` rows. The renderer only
/// reads the session; camera scrolling is simulation state.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    event::{
        DisableMouseCapture, EnableMouseCapture, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::domain::gimmick::GimmickKind;
use crate::domain::layout::{FIELD_WIDTH, FLOOR_HEIGHT, GOAL_FLOOR, SIDE_MARGIN};
use crate::domain::monster::{Monster, MonsterKind};
use crate::domain::player::DIG_TICKS;
use crate::sim::ranking::RankingStore;
use crate::sim::session::{format_seconds, format_time, Phase, Session};

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
    wide: bool,    // occupies 2 terminal columns
    cont: bool,    // right half of a wide char (skip render)
}

impl Cell {
    /// Explicit background for every "empty" cell, also used for `Clear`,
    /// so row gaps on VTE terminals match the cell colour.
    const BASE_BG: Color = Color::Rgb { r: 18, g: 16, b: 24 };

    const BLANK: Cell = Cell { ch: ' ', fg: Color::White, bg: Cell::BASE_BG, wide: false, cont: false };

    /// Sentinel that differs from any real cell; forces a full repaint.
    const INVALID: Cell = Cell { ch: '?', fg: Color::Magenta, bg: Color::Magenta, wide: false, cont: false };

    fn new(ch: char, fg: Color, bg: Color) -> Self {
        let bg = match bg {
            Color::Reset => Self::BASE_BG,
            other => other,
        };
        Cell { ch, fg, bg, wide: char_width(ch) == 2, cont: false }
    }
}

/// Terminal column width; combining marks and other zero-width chars are 0.
fn char_width(c: char) -> usize {
    UnicodeWidthChar::width(c).unwrap_or(0)
}

fn str_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer { width: w, height: h, cells: vec![Cell::BLANK; w * h] }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![Cell::BLANK; w * h];
        }
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::BLANK
        }
    }

    fn fill_bg(&mut self, x0: usize, x1: usize, y: usize, bg: Color) {
        for x in x0..x1.min(self.width) {
            self.set(x, y, Cell::new(' ', Color::White, bg));
        }
    }

    /// Write a string at (x, y). Returns the column after the last char.
    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) -> usize {
        let mut cx = x;
        for ch in s.chars() {
            // zero-width chars have no cell of their own
            let w = char_width(ch);
            if w == 0 { continue; }
            let cell = Cell::new(ch, fg, bg);
            if cx + w > self.width { break; }
            self.set(cx, y, cell);
            if cell.wide {
                self.set(cx + 1, y, Cell { cont: true, ..cell });
            }
            cx += w;
        }
        cx
    }

    fn put_centered(&mut self, x0: usize, w: usize, y: usize, s: &str, fg: Color, bg: Color) {
        let x = x0 + w.saturating_sub(str_width(s)) / 2;
        self.put_str(x, y, s, fg, bg);
    }
}

// ── Layout ──

/// Logical pixels per terminal column.
const COL_PX: f32 = 10.0;
const FIELD_COLS: usize = (FIELD_WIDTH / COL_PX) as usize;
const WALL_COLS: usize = (SIDE_MARGIN / COL_PX) as usize;
const ROWS_PER_FLOOR: i32 = 3;

const HUD_ROW: usize = 0;
const STATUS_ROW: usize = 1;
const FIELD_ROW: usize = 2;

/// Princess position on the goal floor.
const PRINCESS_X: f32 = 500.0;

fn px_to_col(x: f32) -> usize {
    (x / COL_PX).max(0.0) as usize
}

/// Top screen row of `floor` (may be off-screen) for a camera offset in pixels.
fn floor_row(floor: usize, camera_offset: i32) -> i32 {
    let rel_px = floor as i32 * FLOOR_HEIGHT - camera_offset;
    FIELD_ROW as i32 + (rel_px * ROWS_PER_FLOOR).div_euclid(FLOOR_HEIGHT)
}

fn floor_label(floor: usize) -> String {
    if floor == 0 { "SUR".into() } else { format!("B{floor}") }
}

fn monster_glyph(m: &Monster) -> (String, Color) {
    let (ch, color) = match m.kind {
        MonsterKind::Skeleton => ('s', Color::Rgb { r: 230, g: 230, b: 230 }),
        MonsterKind::Bat => ('b', Color::Rgb { r: 190, g: 120, b: 255 }),
        MonsterKind::Zombie => ('z', Color::Rgb { r: 110, g: 220, b: 110 }),
        MonsterKind::Dracula => ('d', Color::Rgb { r: 255, g: 70, b: 90 }),
        MonsterKind::Orc => ('o', Color::Rgb { r: 255, g: 170, b: 40 }),
    };
    let glyph = if m.direction < 0.0 {
        format!("<{ch}{ch}{ch}|")
    } else {
        format!("|{ch}{ch}{ch}>")
    };
    (glyph, color)
}

fn gimmick_color(kind: GimmickKind) -> Color {
    match kind {
        GimmickKind::Teleport => Color::Rgb { r: 150, g: 80, b: 220 },
        GimmickKind::Invisible => Color::Rgb { r: 90, g: 160, b: 200 },
        GimmickKind::Slow => Color::Rgb { r: 60, g: 90, b: 200 },
        GimmickKind::Speed => Color::Rgb { r: 220, g: 180, b: 40 },
        GimmickKind::Stun => Color::Rgb { r: 220, g: 60, b: 60 },
    }
}

const SURFACE_BG: Color = Color::Rgb { r: 70, g: 120, b: 60 };
const DIRT_BG: Color = Color::Rgb { r: 92, g: 64, b: 44 };
const DIRT_DARK_BG: Color = Color::Rgb { r: 70, g: 48, b: 34 };
const WALL_BG: Color = Color::Rgb { r: 36, g: 30, b: 40 };
const HOLE_BG: Color = Color::Rgb { r: 8, g: 8, b: 10 };
const PANEL_BG: Color = Color::Rgb { r: 30, g: 32, b: 48 };
const MUTED: Color = Color::Rgb { r: 140, g: 140, b: 160 };
const ACCENT: Color = Color::Rgb { r: 255, g: 210, b: 80 };
const GOOD: Color = Color::Rgb { r: 90, g: 230, b: 120 };
const BAD: Color = Color::Rgb { r: 255, g: 80, b: 80 };
const PINK: Color = Color::Rgb { r: 255, g: 160, b: 200 };

// ── Renderer ──

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    last_phase: Option<Phase>,
    keyboard_enhanced: bool,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            last_phase: None,
            keyboard_enhanced: false,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            EnableMouseCapture,
            cursor::Hide,
            SetBackgroundColor(Cell::BASE_BG),
            Clear(ClearType::All)
        )?;

        // Release events make held-key movement precise where supported
        if terminal::supports_keyboard_enhancement().unwrap_or(false) {
            execute!(
                self.writer,
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            )?;
            self.keyboard_enhanced = true;
        }
        log::debug!("keyboard enhancement: {}", self.keyboard_enhanced);

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.resize(tw as usize, th as usize);
        Ok(())
    }

    /// True when the terminal reports key releases.
    pub fn keyboard_enhanced(&self) -> bool {
        self.keyboard_enhanced
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        if self.keyboard_enhanced {
            execute!(self.writer, PopKeyboardEnhancementFlags)?;
        }
        execute!(
            self.writer,
            ResetColor,
            DisableMouseCapture,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    fn resize(&mut self, w: usize, h: usize) {
        self.term_w = w;
        self.term_h = h;
        self.front.resize(w, h);
        self.back.resize(w, h);
        // Force full repaint: back ≠ front for every cell.
        self.back.cells.fill(Cell::INVALID);
    }

    pub fn render(&mut self, session: &Session, rankings: &RankingStore) -> io::Result<()> {
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.resize(tw as usize, th as usize);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
        }

        if self.last_phase != Some(session.phase) {
            self.back.cells.fill(Cell::INVALID);
            self.last_phase = Some(session.phase);
        }

        self.compose(session, rankings);
        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }

    fn compose(&mut self, s: &Session, rankings: &RankingStore) {
        self.front.clear();
        self.compose_field(s);
        self.compose_hud(s);
        self.compose_footer(s);
        match s.phase {
            Phase::Playing => {}
            Phase::NameInput => self.compose_name_input(s),
            Phase::GameOver => self.compose_game_over(s, rankings),
            Phase::Clear => self.compose_clear(s, rankings),
        }
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Cell::BASE_BG;
        let mut cursor_at: Option<(usize, usize)> = None;

        // Explicit base colours; ResetColor would fall back to the terminal default
        queue!(self.writer, SetForegroundColor(last_fg), SetBackgroundColor(last_bg))?;

        for y in 0..self.front.height {
            let mut x = 0;
            while x < self.front.width {
                let cell = self.front.get(x, y);
                if cell.cont {
                    x += 1;
                    continue;
                }
                let cont_changed = cell.wide && self.front.get(x + 1, y) != self.back.get(x + 1, y);
                if cell == self.back.get(x, y) && !cont_changed {
                    x += 1;
                    continue;
                }

                if cursor_at != Some((x, y)) {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                }
                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }
                queue!(self.writer, Print(cell.ch))?;

                let advance = if cell.wide { 2 } else { 1 };
                x += advance;
                cursor_at = Some((x, y));
            }
        }

        self.writer.flush()
    }

    // ── Compose: build front buffer content ──

    fn field_x0(&self) -> usize {
        self.front.width.saturating_sub(FIELD_COLS) / 2
    }

    /// Last row usable by the field (the footer sits below it).
    fn field_end_row(&self) -> usize {
        self.front.height.saturating_sub(1)
    }

    fn field_row(&self, row: i32) -> Option<usize> {
        if row >= FIELD_ROW as i32 && (row as usize) < self.field_end_row() {
            Some(row as usize)
        } else {
            None
        }
    }

    fn compose_field(&mut self, s: &Session) {
        let x0 = self.field_x0();
        for floor in s.floors.floors() {
            let top = floor_row(floor.index, s.camera.offset);
            let ground = if floor.index == 0 { SURFACE_BG } else { DIRT_BG };

            for dy in 0..ROWS_PER_FLOOR {
                let Some(row) = self.field_row(top + dy) else { continue };
                let bg = if dy == ROWS_PER_FLOOR - 1 { DIRT_DARK_BG } else { ground };
                self.front.fill_bg(x0, x0 + WALL_COLS, row, WALL_BG);
                self.front.fill_bg(x0 + WALL_COLS, x0 + FIELD_COLS - WALL_COLS, row, bg);
                self.front.fill_bg(x0 + FIELD_COLS - WALL_COLS, x0 + FIELD_COLS, row, WALL_BG);

                for hole in &floor.holes {
                    let c0 = px_to_col(hole.start).max(WALL_COLS);
                    let c1 = px_to_col(hole.end).min(FIELD_COLS - WALL_COLS);
                    if c0 < c1 {
                        self.front.fill_bg(x0 + c0, x0 + c1, row, HOLE_BG);
                    }
                }
            }

            if let Some(row) = self.field_row(top + 1) {
                let color = match floor.index {
                    0 => GOOD,
                    GOAL_FLOOR => PINK,
                    _ => MUTED,
                };
                self.front.put_str(x0, row, &floor_label(floor.index), color, WALL_BG);
            }
        }

        for g in s.gimmicks.iter().filter(|g| g.active) {
            let Some(row) = self.field_row(floor_row(g.floor, s.camera.offset) + ROWS_PER_FLOOR - 1)
                else { continue };
            let c0 = px_to_col(g.band_start);
            let c1 = px_to_col(g.band_end()).min(FIELD_COLS);
            let color = gimmick_color(g.kind);
            for c in c0..c1 {
                self.front.set(x0 + c, row, Cell::new('▒', Color::White, color));
            }
        }

        if let Some(row) = self.field_row(floor_row(GOAL_FLOOR, s.camera.offset) + 1) {
            self.front.put_str(x0 + px_to_col(PRINCESS_X), row, "♥ P", PINK, DIRT_BG);
        }

        for m in &s.monsters {
            let Some(row) = self.field_row(floor_row(m.floor, s.camera.offset) + 1) else { continue };
            let (glyph, color) = monster_glyph(m);
            self.front.put_str(x0 + px_to_col(m.x), row, &glyph, color, DIRT_BG);
        }

        self.compose_player(s, x0);
    }

    fn compose_player(&mut self, s: &Session, x0: usize) {
        let p = &s.player;
        let top = floor_row(p.current_floor, s.camera.offset);
        let col = x0 + px_to_col(p.x);
        let bg = if p.current_floor == 0 { SURFACE_BG } else { DIRT_BG };

        if let Some(row) = self.field_row(top + 1) {
            let face = if p.is_stunned() { "[x__x]" } else { "[o__o]" };
            let fg = if p.is_invisible() { Color::DarkGrey } else { Color::White };
            self.front.put_str(col, row, face, fg, bg);
        }

        if p.is_digging() {
            if let Some(row) = self.field_row(top + ROWS_PER_FLOOR - 1) {
                let done = DIG_TICKS - p.dig_timer();
                let filled = (done as usize * 6 / DIG_TICKS as usize).min(6);
                for i in 0..6 {
                    let ch = if i < filled { '█' } else { '░' };
                    self.front.set(col + i, row, Cell::new(ch, ACCENT, DIRT_DARK_BG));
                }
            }
        }
    }

    fn compose_hud(&mut self, s: &Session) {
        let w = self.front.width;
        self.front.fill_bg(0, w, HUD_ROW, PANEL_BG);
        self.front.fill_bg(0, w, STATUS_ROW, PANEL_BG);

        let p = &s.player;
        let floor_color = if p.current_floor == 0 { GOOD } else { Color::White };
        let where_ = if p.current_floor == 0 { "Surface".to_string() } else { floor_label(p.current_floor) };
        let time = if s.phase == Phase::Playing {
            format_time(s.elapsed_ticks)
        } else {
            format_time(s.final_ticks)
        };

        let mut x = self.front.put_str(1, HUD_ROW, &where_, floor_color, PANEL_BG);
        x = self.front.put_str(x, HUD_ROW, &format!(" → B{GOAL_FLOOR}"), MUTED, PANEL_BG);
        x = self.front.put_str(x + 3, HUD_ROW, "TIME ", MUTED, PANEL_BG);
        x = self.front.put_str(x, HUD_ROW, &time, ACCENT, PANEL_BG);
        x = self.front.put_str(x + 3, HUD_ROW, "VIEW ", MUTED, PANEL_BG);
        let (view, view_color) = if s.camera.is_manual() { ("ON", ACCENT) } else { ("OFF", MUTED) };
        self.front.put_str(x, HUD_ROW, view, view_color, PANEL_BG);

        if !s.message.is_empty() {
            let msg = format!("✦ {} ✦", s.message);
            self.front.put_centered(0, w, STATUS_ROW, &msg, ACCENT, PANEL_BG);
            return;
        }

        let mut x = 1;
        if p.is_stunned() {
            let secs = p.stun_ticks as f32 / 60.0;
            x = self.front.put_str(x, STATUS_ROW, &format!("STUN {secs:.1}s  "), BAD, PANEL_BG);
        }
        if p.speed_effect_timer() > 0 {
            let kind = if p.speed_multiplier() < 1.0 { GimmickKind::Slow } else { GimmickKind::Speed };
            let secs = p.speed_effect_timer() as f32 / 60.0;
            let label = format!("{} {secs:.1}s  ", kind.label());
            x = self.front.put_str(x, STATUS_ROW, &label, gimmick_color(kind), PANEL_BG);
        }
        if let Some(until) = p.invisible_until {
            let label = if until > GOAL_FLOOR + 1 {
                "INVISIBLE  ".to_string()
            } else {
                format!("INVISIBLE until B{until}  ")
            };
            x = self.front.put_str(x, STATUS_ROW, &label, gimmick_color(GimmickKind::Invisible), PANEL_BG);
        }
        if p.is_digging() {
            let pct = (DIG_TICKS - p.dig_timer()) * 100 / DIG_TICKS;
            self.front.put_str(x, STATUS_ROW, &format!("DIGGING {pct}%"), ACCENT, PANEL_BG);
        }
    }

    fn compose_footer(&mut self, s: &Session) {
        let Some(row) = self.front.height.checked_sub(1) else { return };
        if row < FIELD_ROW { return; }
        let help = match s.phase {
            Phase::Playing if s.camera.is_manual() => {
                " ↑/W ↓ wheel PgUp/PgDn: scroll   V: back to player   Esc: quit"
            }
            Phase::Playing => " A/D: move  L: dig  S: descend  Space: jump  V: view  Esc: quit",
            Phase::NameInput => " type your name   Backspace: erase   Enter: register",
            Phase::GameOver | Phase::Clear => " R: play again   Esc: quit",
        };
        self.front.fill_bg(0, self.front.width, row, PANEL_BG);
        self.front.put_str(0, row, help, MUTED, PANEL_BG);
    }

    // ── Overlays ──

    /// Draw a centred panel; returns (x, y, width) of its interior.
    fn panel(&mut self, w: usize, h: usize, border: Color) -> (usize, usize, usize) {
        let w = w.min(self.front.width);
        let field_h = self.field_end_row().saturating_sub(FIELD_ROW);
        let h = h.min(field_h);
        let x = self.front.width.saturating_sub(w) / 2;
        let y = FIELD_ROW + field_h.saturating_sub(h) / 2;
        for row in y..y + h {
            self.front.fill_bg(x, x + w, row, PANEL_BG);
        }
        if w >= 2 && h >= 2 {
            let horiz = "─".repeat(w - 2);
            self.front.put_str(x, y, &format!("┌{horiz}┐"), border, PANEL_BG);
            self.front.put_str(x, y + h - 1, &format!("└{horiz}┘"), border, PANEL_BG);
            for row in y + 1..y + h - 1 {
                self.front.put_str(x, row, "│", border, PANEL_BG);
                self.front.put_str(x + w - 1, row, "│", border, PANEL_BG);
            }
        }
        (x + 2, y + 1, w.saturating_sub(4))
    }

    fn compose_ranking(&mut self, x: usize, mut y: usize, w: usize, rankings: &RankingStore) {
        self.front.put_centered(x, w, y, "HALL OF FAME", ACCENT, PANEL_BG);
        y += 1;
        if rankings.records().is_empty() {
            self.front.put_centered(x, w, y, "no records yet", MUTED, PANEL_BG);
            return;
        }
        for (i, r) in rankings.records().iter().enumerate() {
            let pad = 10usize.saturating_sub(str_width(&r.name));
            let line = format!(
                "{}. {}{}  {:>4}  {}",
                i + 1, r.name, " ".repeat(pad), floor_label(r.floor), format_seconds(r.time),
            );
            let color = if i == 0 { ACCENT } else { Color::White };
            self.front.put_centered(x, w, y + i, &line, color, PANEL_BG);
        }
    }

    fn compose_name_input(&mut self, s: &Session) {
        let (x, y, w) = self.panel(44, 10, ACCENT);
        self.front.put_centered(x, w, y, "★ NEW RECORD ★", ACCENT, PANEL_BG);
        let floor_line = format!("Floor   {}", floor_label(s.player.current_floor));
        self.front.put_centered(x, w, y + 2, &floor_line, Color::White, PANEL_BG);
        let time_line = format!("Time    {}", format_time(s.final_ticks));
        self.front.put_centered(x, w, y + 3, &time_line, Color::White, PANEL_BG);
        self.front.put_centered(x, w, y + 5, "Your name (max 10)", MUTED, PANEL_BG);
        let field = format!("> {}_", s.name);
        self.front.put_centered(x, w, y + 6, &field, Color::White, PANEL_BG);
        self.front.put_centered(x, w, y + 7, "Enter to register", GOOD, PANEL_BG);
    }

    fn compose_game_over(&mut self, s: &Session, rankings: &RankingStore) {
        let (x, y, w) = self.panel(44, 12, BAD);
        self.front.put_centered(x, w, y, "✕ GAME OVER ✕", BAD, PANEL_BG);
        let floor_line = format!("Reached {}", floor_label(s.player.current_floor));
        self.front.put_centered(x, w, y + 2, &floor_line, Color::White, PANEL_BG);
        let time_line = format!("Time    {}", format_time(s.final_ticks));
        self.front.put_centered(x, w, y + 3, &time_line, Color::White, PANEL_BG);
        self.compose_ranking(x, y + 5, w, rankings);
        self.front.put_centered(x, w, y + 9, "R: try again", GOOD, PANEL_BG);
    }

    fn compose_clear(&mut self, s: &Session, rankings: &RankingStore) {
        let (x, y, w) = self.panel(44, 12, GOOD);
        self.front.put_centered(x, w, y, "★ CLEAR ★", GOOD, PANEL_BG);
        self.front.put_centered(x, w, y + 1, "♥ the princess is safe ♥", PINK, PANEL_BG);
        let time_line = format!("Clear time  {}", format_time(s.final_ticks));
        self.front.put_centered(x, w, y + 3, &time_line, Color::White, PANEL_BG);
        self.compose_ranking(x, y + 5, w, rankings);
        self.front.put_centered(x, w, y + 9, "R: play again", GOOD, PANEL_BG);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::monster::Monster;
    use crate::sim::ranking::RankingRecord;

    fn headless(w: usize, h: usize) -> Renderer {
        let mut r = Renderer::new();
        r.front.resize(w, h);
        r.back.resize(w, h);
        r
    }

    fn row_text(r: &Renderer, y: usize) -> String {
        (0..r.front.width)
            .map(|x| r.front.get(x, y))
            .filter(|c| !c.cont)
            .map(|c| c.ch)
            .collect()
    }

    fn screen_text(r: &Renderer) -> String {
        (0..r.front.height).map(|y| row_text(r, y)).collect::<Vec<_>>().join("\n")
    }

    #[test]
    fn floor_rows_follow_camera() {
        assert_eq!(floor_row(0, 0), FIELD_ROW as i32);
        assert_eq!(floor_row(1, 0), FIELD_ROW as i32 + ROWS_PER_FLOOR);
        assert_eq!(floor_row(1, FLOOR_HEIGHT), FIELD_ROW as i32);
        assert!(floor_row(0, 200) < FIELD_ROW as i32);
    }

    #[test]
    fn hangul_is_double_width() {
        assert_eq!(char_width('a'), 1);
        assert_eq!(char_width('민'), 2);
        assert_eq!(str_width("민지a"), 5);
    }

    #[test]
    fn emoji_are_wide_and_combining_marks_take_no_cell() {
        assert_eq!(char_width('😀'), 2);
        assert_eq!(char_width('\u{301}'), 0);
        assert_eq!(str_width("e\u{301}"), 1);

        let mut fb = FrameBuffer::new(10, 1);
        let end = fb.put_str(0, 0, "e\u{301}😀x", Color::White, Color::Reset);
        assert_eq!(end, 4);
        assert_eq!(fb.get(0, 0).ch, 'e');
        assert!(fb.get(1, 0).wide);
        assert!(fb.get(2, 0).cont);
        assert_eq!(fb.get(3, 0).ch, 'x');
    }

    #[test]
    fn wide_chars_take_two_cells() {
        let mut fb = FrameBuffer::new(10, 1);
        let end = fb.put_str(0, 0, "민a", Color::White, Color::Reset);
        assert_eq!(end, 3);
        assert!(fb.get(0, 0).wide);
        assert!(fb.get(1, 0).cont);
        assert_eq!(fb.get(2, 0).ch, 'a');
    }

    #[test]
    fn playing_frame_shows_hud_player_and_monster() {
        let mut s = Session::new(Some(3));
        s.monsters = vec![Monster::new(1, 200.0, -1.0)];
        let mut r = headless(80, 24);
        r.compose(&s, &RankingStore::new());

        let hud = row_text(&r, HUD_ROW);
        assert!(hud.contains("Surface"));
        assert!(hud.contains("00:00.00"));
        assert!(hud.contains("VIEW OFF"));

        let screen = screen_text(&r);
        assert!(screen.contains("[o__o]"));
        assert!(screen.contains("<sss|"));
        assert!(screen.contains("B1"));
    }

    #[test]
    fn game_over_lists_rankings() {
        let mut s = Session::new(Some(3));
        s.phase = Phase::GameOver;
        let mut board = RankingStore::new();
        board.insert(RankingRecord::new("민지", 50, 83.25));
        let mut r = headless(80, 24);
        r.compose(&s, &board);

        let screen = screen_text(&r);
        assert!(screen.contains("GAME OVER"));
        assert!(screen.contains("민지"));
        assert!(screen.contains("01:23.25"));
    }

    #[test]
    fn tiny_terminal_does_not_panic() {
        let s = Session::new(Some(3));
        for (w, h) in [(0, 0), (1, 1), (5, 3), (20, 4)] {
            let mut r = headless(w, h);
            r.compose(&s, &RankingStore::new());
        }
    }
}
