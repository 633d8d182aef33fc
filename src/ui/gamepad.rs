/// Gamepad input tracker using gilrs.
///
/// Button mapping is loaded from config.toml via `load_button_config()`.
/// Default mapping:
///   D-pad / Left Stick ←→  →  Move
///   D-pad / Left Stick ↑↓  →  Scroll (view mode)
///   X / L1                 →  Dig
///   A / R1                 →  Descend
///   B                      →  Jump
///   Y                      →  View mode
///   Start                  →  Confirm name / Restart
///   Select                 →  Quit

#[cfg(feature = "gamepad")]
use gilrs::{Axis, Button, EventType, Gilrs};

use crate::config::GamepadConfig;

#[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
const STICK_DEADZONE: f32 = 0.25;

/// Logical button identifiers (one per physical button).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Btn {
    A,       // South
    B,       // East
    X,       // West
    Y,       // North
    L1,      // LeftTrigger
    R1,      // RightTrigger
    L2,      // LeftTrigger2
    R2,      // RightTrigger2
    Start,
    Select,
}

const BTN_COUNT: usize = 10;

impl Btn {
    fn from_name(s: &str) -> Option<Btn> {
        match s.trim().to_uppercase().as_str() {
            "A" | "SOUTH"  => Some(Btn::A),
            "B" | "EAST"   => Some(Btn::B),
            "X" | "WEST"   => Some(Btn::X),
            "Y" | "NORTH"  => Some(Btn::Y),
            "L1" | "LB" | "LEFTTRIGGER"  => Some(Btn::L1),
            "R1" | "RB" | "RIGHTTRIGGER" => Some(Btn::R1),
            "L2" | "LT" | "LEFTTRIGGER2"  => Some(Btn::L2),
            "R2" | "RT" | "RIGHTTRIGGER2" => Some(Btn::R2),
            "START" => Some(Btn::Start),
            "SELECT" | "BACK" => Some(Btn::Select),
            _ => None,
        }
    }

    #[cfg(feature = "gamepad")]
    fn from_gilrs(btn: Button) -> Option<Btn> {
        match btn {
            Button::South     => Some(Btn::A),
            Button::East      => Some(Btn::B),
            Button::West      => Some(Btn::X),
            Button::North     => Some(Btn::Y),
            Button::LeftTrigger  => Some(Btn::L1),
            Button::RightTrigger => Some(Btn::R1),
            Button::LeftTrigger2  => Some(Btn::L2),
            Button::RightTrigger2 => Some(Btn::R2),
            Button::Start     => Some(Btn::Start),
            Button::Select    => Some(Btn::Select),
            _ => None,
        }
    }
}

/// Per-button state: held (continuous) and just_pressed (edge).
#[derive(Clone, Copy, Debug, Default)]
struct BtnState {
    held: bool,
    just_pressed: bool,
}

impl BtnState {
    fn set(&mut self, held: bool) {
        if held && !self.held { self.just_pressed = true; }
        self.held = held;
    }
}

/// Four directions fed by either the D-pad or the stick.
#[derive(Clone, Copy, Debug, Default)]
struct Dirs {
    up: BtnState,
    down: BtnState,
    left: BtnState,
    right: BtnState,
}

impl Dirs {
    fn clear_edges(&mut self) {
        for d in [&mut self.up, &mut self.down, &mut self.left, &mut self.right] {
            d.just_pressed = false;
        }
    }
}

/// Action-to-button mapping (loaded from config).
#[derive(Debug)]
struct ActionMap {
    dig: Vec<Btn>,
    descend: Vec<Btn>,
    jump: Vec<Btn>,
    view: Vec<Btn>,
    confirm: Vec<Btn>,
    restart: Vec<Btn>,
    cancel: Vec<Btn>,
}

impl Default for ActionMap {
    fn default() -> Self {
        ActionMap {
            dig:     vec![Btn::X, Btn::L1],
            descend: vec![Btn::A, Btn::R1],
            jump:    vec![Btn::B],
            view:    vec![Btn::Y],
            confirm: vec![Btn::Start],
            restart: vec![Btn::Start],
            cancel:  vec![Btn::Select],
        }
    }
}

pub struct GamepadState {
    #[cfg(feature = "gamepad")]
    gilrs: Option<Gilrs>,

    buttons: [BtnState; BTN_COUNT],
    dpad: Dirs,
    stick: Dirs,
    stick_x: f32,
    stick_y: f32,

    action_map: ActionMap,

    pub connected: bool,
}

fn btn_index(btn: Btn) -> usize {
    btn as usize
}

/// Replace `slot` only when the configured list names at least one known button.
fn override_with(slot: &mut Vec<Btn>, names: &[String]) {
    let parsed: Vec<Btn> = names.iter().filter_map(|s| Btn::from_name(s)).collect();
    if parsed.is_empty() {
        if !names.is_empty() {
            log::warn!("no known gamepad buttons in {names:?}, keeping defaults");
        }
        return;
    }
    *slot = parsed;
}

impl GamepadState {
    pub fn new() -> Self {
        #[cfg(feature = "gamepad")]
        let (gilrs_opt, connected) = {
            match Gilrs::new() {
                Ok(g) => {
                    let has_pad = g.gamepads().next().is_some();
                    (Some(g), has_pad)
                }
                Err(e) => {
                    log::info!("gamepad support unavailable: {e}");
                    (None, false)
                }
            }
        };
        #[cfg(not(feature = "gamepad"))]
        let connected = false;

        GamepadState {
            #[cfg(feature = "gamepad")]
            gilrs: gilrs_opt,
            buttons: [BtnState::default(); BTN_COUNT],
            dpad: Dirs::default(),
            stick: Dirs::default(),
            stick_x: 0.0,
            stick_y: 0.0,
            action_map: ActionMap::default(),
            connected,
        }
    }

    /// Load button mapping from config.
    pub fn load_button_config(&mut self, cfg: &GamepadConfig) {
        let map = &mut self.action_map;
        override_with(&mut map.dig, &cfg.dig);
        override_with(&mut map.descend, &cfg.descend);
        override_with(&mut map.jump, &cfg.jump);
        override_with(&mut map.view, &cfg.view);
        override_with(&mut map.confirm, &cfg.confirm);
        override_with(&mut map.restart, &cfg.restart);
    }

    pub fn update(&mut self) {
        self.clear_just_pressed();

        #[cfg(feature = "gamepad")]
        self.poll_gilrs();
    }

    #[cfg(feature = "gamepad")]
    fn poll_gilrs(&mut self) {
        let gilrs = match &mut self.gilrs {
            Some(g) => g,
            None => return,
        };

        let events: Vec<_> = std::iter::from_fn(|| gilrs.next_event()).collect();

        for event in events {
            match event.event {
                EventType::ButtonPressed(btn, _) => {
                    self.connected = true;
                    self.set_button(btn, true);
                }
                EventType::ButtonReleased(btn, _) => {
                    self.connected = true;
                    self.set_button(btn, false);
                }
                EventType::AxisChanged(axis, value, _) => {
                    self.connected = true;
                    self.update_axis(axis, value);
                }
                EventType::Connected => {
                    log::info!("gamepad connected");
                    self.connected = true;
                }
                EventType::Disconnected => {
                    log::info!("gamepad disconnected");
                    self.connected = false;
                    self.release_all();
                }
                _ => {}
            }
        }

        // Stick → digital directions
        self.stick.left.set(self.stick_x < -STICK_DEADZONE);
        self.stick.right.set(self.stick_x > STICK_DEADZONE);
        self.stick.up.set(self.stick_y > STICK_DEADZONE);
        self.stick.down.set(self.stick_y < -STICK_DEADZONE);
    }

    #[cfg(feature = "gamepad")]
    fn set_button(&mut self, gilrs_btn: Button, held: bool) {
        match gilrs_btn {
            Button::DPadUp    => self.dpad.up.set(held),
            Button::DPadDown  => self.dpad.down.set(held),
            Button::DPadLeft  => self.dpad.left.set(held),
            Button::DPadRight => self.dpad.right.set(held),
            other => {
                if let Some(btn) = Btn::from_gilrs(other) {
                    self.buttons[btn_index(btn)].set(held);
                }
            }
        }
    }

    #[cfg(feature = "gamepad")]
    fn update_axis(&mut self, axis: Axis, value: f32) {
        match axis {
            Axis::LeftStickX => self.stick_x = value,
            Axis::LeftStickY => self.stick_y = value,
            _ => {}
        }
    }

    // ── Action queries (config-driven) ──

    fn any_just_pressed(&self, btns: &[Btn]) -> bool {
        btns.iter().any(|&b| self.buttons[btn_index(b)].just_pressed)
    }

    pub fn dig_pressed(&self) -> bool {
        self.any_just_pressed(&self.action_map.dig)
    }
    pub fn descend_pressed(&self) -> bool {
        self.any_just_pressed(&self.action_map.descend)
    }
    pub fn jump_pressed(&self) -> bool {
        self.any_just_pressed(&self.action_map.jump)
    }
    pub fn view_pressed(&self) -> bool {
        self.any_just_pressed(&self.action_map.view)
    }
    pub fn confirm_pressed(&self) -> bool {
        self.any_just_pressed(&self.action_map.confirm)
    }
    pub fn restart_pressed(&self) -> bool {
        self.any_just_pressed(&self.action_map.restart)
    }
    pub fn cancel_pressed(&self) -> bool {
        self.any_just_pressed(&self.action_map.cancel)
    }

    // Directions (continuous, held)
    pub fn up_held(&self) -> bool {
        self.dpad.up.held || self.stick.up.held
    }
    pub fn down_held(&self) -> bool {
        self.dpad.down.held || self.stick.down.held
    }
    pub fn left_held(&self) -> bool {
        self.dpad.left.held || self.stick.left.held
    }
    pub fn right_held(&self) -> bool {
        self.dpad.right.held || self.stick.right.held
    }

    // ── Internal ──

    fn clear_just_pressed(&mut self) {
        for b in &mut self.buttons { b.just_pressed = false; }
        self.dpad.clear_edges();
        self.stick.clear_edges();
    }

    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    fn release_all(&mut self) {
        self.buttons = [BtnState::default(); BTN_COUNT];
        self.dpad = Dirs::default();
        self.stick = Dirs::default();
        self.stick_x = 0.0;
        self.stick_y = 0.0;
    }
}
