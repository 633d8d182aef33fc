/// Events emitted during a simulation step.
/// The presentation layer consumes these for sound and HUD messages;
/// the host also watches `RankingUpdated` to persist the leaderboard.

use crate::domain::gimmick::GimmickKind;

#[derive(Clone, Debug, PartialEq)]
pub enum GameEvent {
    DigStarted,
    HoleDug { floor: usize },
    GimmickTriggered { kind: GimmickKind },
    Descended { floor: usize },
    Jumped { floor: usize },
    ViewToggled { manual: bool },
    PlayerCaught,
    GoalReached,
    NewRecord,
    RankingUpdated,
    RunRestarted,
}
