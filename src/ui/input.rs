/// Keyboard and mouse input tracker.
///
/// Tracks which keys are currently held down, enabling:
///   - Continuous movement and view scrolling while a key is held
///   - Edge-triggered actions (dig, descend, jump) on the initial press only
///   - Ordered text entry for the name prompt
///
/// Uses crossterm's keyboard enhancement for Release events when available.
/// Falls back to timeout-based release detection on terminals that don't support it.
/// Mouse wheel notches are accumulated per frame.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crossterm::event::{
    self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEventKind,
};

use crate::sim::intent::NameEdit;

/// After this duration without a Press/Repeat event, consider the key released.
/// Only used when the terminal doesn't report Release events.
const HOLD_TIMEOUT: Duration = Duration::from_millis(160);

pub struct InputState {
    /// Timestamp of last Press/Repeat event for each key.
    last_active: HashMap<KeyCode, Instant>,

    /// Keys that went from "not held" to "held" during the most recent drain.
    fresh_presses: Vec<KeyCode>,

    /// Press/Repeat key events of this frame, in arrival order.
    pub raw_events: Vec<KeyEvent>,

    /// Fresh presses of this frame with their modifiers, in arrival order.
    /// Auto-repeat of a held key never lands here.
    typed: Vec<KeyEvent>,

    /// Net wheel notches this frame; positive scrolls deeper.
    wheel: i32,

    /// Whether to honor Release events. Only true when keyboard
    /// enhancement is confirmed working.
    pub honor_release: bool,
}

impl InputState {
    pub fn new() -> Self {
        InputState {
            last_active: HashMap::with_capacity(16),
            fresh_presses: Vec::with_capacity(8),
            raw_events: Vec::with_capacity(8),
            typed: Vec::with_capacity(8),
            wheel: 0,
            honor_release: false,
        }
    }

    /// Drain all pending terminal events and update key states.
    /// Call this once per frame, before the simulation tick.
    pub fn drain_events(&mut self) {
        self.fresh_presses.clear();
        self.raw_events.clear();
        self.typed.clear();
        self.wheel = 0;

        while poll(Duration::ZERO).unwrap_or(false) {
            match event::read() {
                Ok(Event::Key(key)) => self.on_key(key),
                Ok(Event::Mouse(mouse)) => match mouse.kind {
                    MouseEventKind::ScrollDown => self.wheel += 1,
                    MouseEventKind::ScrollUp => self.wheel -= 1,
                    _ => {}
                },
                Ok(_) => {}
                Err(e) => {
                    log::warn!("terminal event read failed: {e}");
                    break;
                }
            }
        }

        // Expire keys that have timed out (fallback for terminals without Release)
        let now = Instant::now();
        self.last_active.retain(|_, t| now.duration_since(*t) < HOLD_TIMEOUT);
    }

    fn on_key(&mut self, key: KeyEvent) {
        match key.kind {
            KeyEventKind::Release if self.honor_release => {
                self.last_active.remove(&key.code);
            }
            KeyEventKind::Release => {
                // Not trusted without enhancement; the timeout handles expiry
            }
            _ => {
                self.raw_events.push(key);
                let was_held = self.is_held(key.code);
                self.last_active.insert(key.code, Instant::now());
                if !was_held {
                    self.fresh_presses.push(key.code);
                    if key.kind == KeyEventKind::Press {
                        self.typed.push(key);
                    }
                }
            }
        }
    }

    /// Is this key currently held down?
    pub fn is_held(&self, code: KeyCode) -> bool {
        self.last_active.get(&code)
            .map(|t| t.elapsed() < HOLD_TIMEOUT)
            .unwrap_or(false)
    }

    pub fn any_held(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|c| self.is_held(*c))
    }

    /// Was this key freshly pressed this frame? (edge trigger)
    pub fn was_pressed(&self, code: KeyCode) -> bool {
        self.fresh_presses.contains(&code)
    }

    pub fn any_pressed(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|c| self.was_pressed(*c))
    }

    /// Count of Press/Repeat events for any of `codes` this frame.
    /// Auto-repeat makes page keys scroll continuously.
    pub fn press_count(&self, codes: &[KeyCode]) -> i32 {
        self.raw_events.iter().filter(|k| codes.contains(&k.code)).count() as i32
    }

    pub fn wheel_notches(&self) -> i32 {
        self.wheel
    }

    /// Name-prompt keystrokes of this frame, in order. A key held since
    /// before the prompt opened types nothing until it is pressed again.
    pub fn name_edits(&self) -> Vec<NameEdit> {
        self.typed.iter().filter_map(name_edit_for).collect()
    }

    pub fn ctrl_c_pressed(&self) -> bool {
        self.raw_events.iter().any(|k| {
            k.modifiers.contains(KeyModifiers::CONTROL)
                && (k.code == KeyCode::Char('c') || k.code == KeyCode::Char('C'))
        })
    }
}

/// Printable characters and Backspace edit the name; chords with Ctrl/Alt don't.
fn name_edit_for(key: &KeyEvent) -> Option<NameEdit> {
    if key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) {
        return None;
    }
    match key.code {
        KeyCode::Char(c) if !c.is_control() => Some(NameEdit::Char(c)),
        KeyCode::Backspace => Some(NameEdit::Backspace),
        _ => None,
    }
}
