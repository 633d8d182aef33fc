/// Simulation layer: one run's state, the per-tick step, the leaderboard
/// and its persistence.

pub mod camera;
pub mod event;
pub mod intent;
pub mod ranking;
pub mod save;
pub mod session;
pub mod step;
