/// Pure game rules: no I/O, no clocks, no terminal.

pub mod collision;
pub mod floor;
pub mod gimmick;
pub mod layout;
pub mod monster;
pub mod player;
