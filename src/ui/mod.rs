/// Terminal front end: keyboard, gamepad, sound and drawing.

pub mod gamepad;
pub mod input;
pub mod renderer;
pub mod sound;
