/// Per-tick input batch.
///
/// The host polls devices once per frame and folds everything into one
/// `FrameInput`; `step()` consumes it whole before touching any state.
/// Movement and scroll are level-triggered (held), the rest edge-triggered.

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum NameEdit {
    Char(char),
    Backspace,
}

#[derive(Clone, Debug, Default)]
pub struct FrameInput {
    pub move_left: bool,
    pub move_right: bool,
    pub dig: bool,
    pub descend: bool,
    pub jump: bool,
    pub toggle_view: bool,
    /// Manual camera scroll in logical pixels; positive scrolls deeper.
    pub scroll: i32,
    /// Name-entry keystrokes in the order they arrived.
    pub name_edits: Vec<NameEdit>,
    pub submit: bool,
    pub restart: bool,
    pub quit: bool,
    pub dev_warp: bool,
}

impl FrameInput {
    pub fn idle() -> Self {
        FrameInput::default()
    }
}
