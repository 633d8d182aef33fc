/// The step function: advances the session by one tick.
///
/// Processing order while `Playing`:
///   1. Clock
///   2. View toggle / manual scroll
///   3. Player actions (dig → descend → jump → move), stun-gated
///   4. Player timers (dig completion, stun, speed effect)
///   5. Monster patrol
///   6. Camera
///   7. Run end: goal first, then monster contact
///
/// Outside `Playing` only name entry and restart are honoured.
/// `step` never performs I/O; persistence reacts to `GameEvent::RankingUpdated`.

use crate::domain::collision;
use crate::domain::player::DigStart;
use super::event::GameEvent;
use super::intent::{FrameInput, NameEdit};
use super::ranking::{RankingRecord, RankingStore};
use super::session::{Phase, Session};

const GIMMICK_MESSAGE_TICKS: u32 = 90;

// ══════════════════════════════════════════════════════════════
// Main entry point
// ══════════════════════════════════════════════════════════════

pub fn step(session: &mut Session, rankings: &mut RankingStore, input: &FrameInput) -> Vec<GameEvent> {
    let mut events = Vec::new();
    session.tick_message();

    match session.phase {
        Phase::Playing => step_playing(session, rankings, input, &mut events),
        Phase::NameInput => step_name_input(session, rankings, input, &mut events),
        Phase::GameOver | Phase::Clear => {
            if input.restart {
                session.restart();
                events.push(GameEvent::RunRestarted);
            }
        }
    }

    events
}

fn step_playing(
    session: &mut Session,
    rankings: &RankingStore,
    input: &FrameInput,
    events: &mut Vec<GameEvent>,
) {
    session.elapsed_ticks += 1;

    resolve_view(session, input, events);
    resolve_player_actions(session, input, events);
    resolve_player_timers(session, events);
    resolve_monsters(session);
    session.camera.update(session.player.current_floor);
    resolve_run_end(session, rankings, events);
}

// ══════════════════════════════════════════════════════════════
// Camera
// ══════════════════════════════════════════════════════════════

fn resolve_view(session: &mut Session, input: &FrameInput, events: &mut Vec<GameEvent>) {
    if input.toggle_view {
        session.camera.toggle(session.player.current_floor);
        events.push(GameEvent::ViewToggled { manual: session.camera.is_manual() });
    }
    if input.scroll != 0 {
        session.camera.scroll(input.scroll);
    }
}

// ══════════════════════════════════════════════════════════════
// Player
// ══════════════════════════════════════════════════════════════

fn resolve_player_actions(session: &mut Session, input: &FrameInput, events: &mut Vec<GameEvent>) {
    if input.dev_warp {
        session.dev_warp();
        log::info!("dev warp to floor {}", session.player.current_floor);
    }

    if input.dig {
        match session.player.start_digging(&session.floors, &mut session.gimmicks) {
            DigStart::Refused => {}
            DigStart::Started => events.push(GameEvent::DigStarted),
            DigStart::Gimmick(kind) => {
                log::debug!("gimmick {:?} fired on floor {}", kind, session.player.current_floor);
                events.push(GameEvent::GimmickTriggered { kind });
                events.push(GameEvent::DigStarted);
                session.set_message(kind.label(), GIMMICK_MESSAGE_TICKS);
            }
        }
    }

    if input.descend && session.player.descend(&session.floors) {
        events.push(GameEvent::Descended { floor: session.player.current_floor });
    }

    if input.jump && session.player.jump() {
        events.push(GameEvent::Jumped { floor: session.player.current_floor });
    }

    if input.move_left {
        session.player.move_by(-1.0);
    }
    if input.move_right {
        session.player.move_by(1.0);
    }
}

fn resolve_player_timers(session: &mut Session, events: &mut Vec<GameEvent>) {
    if let Some(floor) = session.player.tick(&mut session.floors) {
        events.push(GameEvent::HoleDug { floor });
    }
}

// ══════════════════════════════════════════════════════════════
// Monsters
// ══════════════════════════════════════════════════════════════

fn resolve_monsters(session: &mut Session) {
    let mut monsters = std::mem::take(&mut session.monsters);
    let rng = session.rng_mut();
    for m in monsters.iter_mut() {
        m.update(rng);
    }
    session.monsters = monsters;
}

// ══════════════════════════════════════════════════════════════
// Run end
// ══════════════════════════════════════════════════════════════

fn resolve_run_end(session: &mut Session, rankings: &RankingStore, events: &mut Vec<GameEvent>) {
    if session.goal_reached() {
        events.push(GameEvent::GoalReached);
        end_run(session, rankings, Phase::Clear, events);
    } else if let Some(idx) = collision::find_contact(&session.player, &session.monsters) {
        log::debug!(
            "caught by monster {} on floor {}",
            idx, session.player.current_floor,
        );
        events.push(GameEvent::PlayerCaught);
        end_run(session, rankings, Phase::GameOver, events);
    }
}

fn end_run(session: &mut Session, rankings: &RankingStore, outcome: Phase, events: &mut Vec<GameEvent>) {
    session.final_ticks = session.elapsed_ticks;
    let floor = session.player.current_floor;
    let time = session.final_seconds();

    if rankings.qualifies(floor, time) {
        session.is_new_record = true;
        session.phase = Phase::NameInput;
        events.push(GameEvent::NewRecord);
    } else {
        session.is_new_record = false;
        session.phase = outcome;
    }
    log::info!("run ended on floor {floor} after {time:.2}s -> {:?}", session.phase);
}

// ══════════════════════════════════════════════════════════════
// Name entry
// ══════════════════════════════════════════════════════════════

fn step_name_input(
    session: &mut Session,
    rankings: &mut RankingStore,
    input: &FrameInput,
    events: &mut Vec<GameEvent>,
) {
    for edit in &input.name_edits {
        match *edit {
            NameEdit::Char(c) => { session.push_name_char(c); }
            NameEdit::Backspace => session.pop_name_char(),
        }
    }

    if !input.submit || session.name.is_empty() {
        return;
    }

    let record = RankingRecord::new(
        session.name.clone(),
        session.player.current_floor,
        session.final_seconds(),
    );
    rankings.insert(record);
    events.push(GameEvent::RankingUpdated);

    session.phase = if session.goal_reached() { Phase::Clear } else { Phase::GameOver };
}

// ══════════════════════════════════════════════════════════════
// Scenario tests
// ══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::gimmick::{Gimmick, GimmickKind};
    use crate::domain::layout::GOAL_FLOOR;
    use crate::domain::monster::Monster;
    use crate::domain::player::{DIG_TICKS, STUN_TICKS};

    /// Session with no monsters and no gimmicks, so only the test's own
    /// setup can affect the run.
    fn quiet_session() -> Session {
        let mut s = Session::new(Some(11));
        s.monsters.clear();
        s.gimmicks.clear();
        s
    }

    fn idle(s: &mut Session, r: &mut RankingStore) -> Vec<GameEvent> {
        step(s, r, &FrameInput::idle())
    }

    fn press(f: impl FnOnce(&mut FrameInput)) -> FrameInput {
        let mut input = FrameInput::idle();
        f(&mut input);
        input
    }

    /// Three zero-time clears: no run can make this board.
    fn full_board() -> RankingStore {
        let mut r = RankingStore::new();
        for name in ["a", "b", "c"] {
            r.insert(RankingRecord::new(name, GOAL_FLOOR, 0.0));
        }
        r
    }

    // ── Digging ──

    #[test]
    fn dig_opens_hole_exactly_at_tick_sixty() {
        let mut s = quiet_session();
        let mut r = RankingStore::new();
        for _ in 0..10 {
            step(&mut s, &mut r, &press(|i| i.move_left = true));
        }
        let center = s.player.center_x();

        assert_eq!(s.player.start_digging(&s.floors, &mut s.gimmicks), DigStart::Started);
        for tick in 1..DIG_TICKS {
            idle(&mut s, &mut r);
            assert!(s.player.is_digging(), "tick {tick}");
            assert!(!s.floors.has_hole_at(0, center), "tick {tick}");
        }
        let events = idle(&mut s, &mut r);
        assert!(!s.player.is_digging());
        assert!(s.floors.has_hole_at(0, center));
        assert!(events.contains(&GameEvent::HoleDug { floor: 0 }));
    }

    #[test]
    fn dig_then_descend() {
        let mut s = quiet_session();
        let mut r = RankingStore::new();
        let events = step(&mut s, &mut r, &press(|i| i.dig = true));
        assert!(events.contains(&GameEvent::DigStarted));
        for _ in 0..DIG_TICKS {
            idle(&mut s, &mut r);
        }
        let events = step(&mut s, &mut r, &press(|i| i.descend = true));
        assert_eq!(s.player.current_floor, 1);
        assert!(events.contains(&GameEvent::Descended { floor: 1 }));
    }

    #[test]
    fn invalid_actions_are_silent() {
        let mut s = quiet_session();
        let mut r = RankingStore::new();
        let events = step(&mut s, &mut r, &press(|i| { i.jump = true; i.descend = true; }));
        assert!(events.is_empty());
        assert_eq!(s.player.current_floor, 0);
        assert_eq!(s.phase, Phase::Playing);
    }

    // ── Gimmicks ──

    #[test]
    fn stun_gimmick_freezes_player_until_expiry() {
        let mut s = quiet_session();
        let mut r = RankingStore::new();
        s.player.current_floor = 3;
        s.floors.add_hole(3, 0.0, 800.0);
        s.gimmicks.push(Gimmick::new(3, GimmickKind::Stun, s.player.center_x() - 40.0));

        let events = step(&mut s, &mut r, &press(|i| i.dig = true));
        assert!(events.contains(&GameEvent::GimmickTriggered { kind: GimmickKind::Stun }));
        assert_eq!(s.message, "STUN");

        // stun was applied then counted down once in the same tick
        let x = s.player.x;
        for _ in 0..STUN_TICKS - 1 {
            step(&mut s, &mut r, &press(|i| { i.move_right = true; i.descend = true; i.jump = true; }));
        }
        assert_eq!(s.player.x, x);
        assert_eq!(s.player.current_floor, 3);
        assert!(!s.player.is_stunned());

        step(&mut s, &mut r, &press(|i| i.jump = true));
        assert_eq!(s.player.current_floor, 2);
    }

    #[test]
    fn teleport_lands_four_floors_down_invisible() {
        let mut s = quiet_session();
        let mut r = RankingStore::new();
        s.player.current_floor = 6;
        s.gimmicks.push(Gimmick::new(6, GimmickKind::Teleport, s.player.center_x() - 40.0));
        s.monsters.push(Monster::new(10, s.player.x, 1.0));

        step(&mut s, &mut r, &press(|i| i.dig = true));
        assert_eq!(s.player.current_floor, 10);
        assert!(s.player.is_invisible());
        assert_eq!(s.player.invisible_until, Some(11));
        assert_eq!(s.phase, Phase::Playing, "invisible landing must not collide");
    }

    #[test]
    fn teleport_into_goal_ends_run() {
        let mut s = quiet_session();
        let mut r = full_board();
        s.player.current_floor = 47;
        s.gimmicks.push(Gimmick::new(47, GimmickKind::Teleport, s.player.center_x() - 40.0));
        step(&mut s, &mut r, &press(|i| i.dig = true));
        assert_eq!(s.player.current_floor, GOAL_FLOOR);
        assert_eq!(s.phase, Phase::Clear);
    }

    // ── Run end ──

    #[test]
    fn reaching_goal_freezes_time_same_tick() {
        let mut s = quiet_session();
        let mut r = RankingStore::new();
        for _ in 0..30 { idle(&mut s, &mut r); }
        s.player.current_floor = GOAL_FLOOR - 1;
        s.floors.add_hole(GOAL_FLOOR - 1, 0.0, 800.0);

        let events = step(&mut s, &mut r, &press(|i| i.descend = true));
        assert_eq!(s.player.current_floor, GOAL_FLOOR);
        assert_ne!(s.phase, Phase::Playing);
        assert_eq!(s.final_ticks, 31);
        assert_eq!(s.final_ticks, s.elapsed_ticks);
        assert!(events.contains(&GameEvent::GoalReached));

        // clock stays frozen afterwards
        idle(&mut s, &mut r);
        assert_eq!(s.elapsed_ticks, 31);
    }

    #[test]
    fn goal_with_record_asks_for_name() {
        let mut s = quiet_session();
        let mut r = RankingStore::new();
        s.player.current_floor = GOAL_FLOOR - 1;
        s.floors.add_hole(GOAL_FLOOR - 1, 0.0, 800.0);
        let events = step(&mut s, &mut r, &press(|i| i.descend = true));
        assert_eq!(s.phase, Phase::NameInput);
        assert!(s.is_new_record);
        assert!(events.contains(&GameEvent::NewRecord));
    }

    #[test]
    fn goal_without_record_is_clear() {
        let mut s = quiet_session();
        let mut r = full_board();
        for _ in 0..2000 { idle(&mut s, &mut r); }
        s.player.current_floor = GOAL_FLOOR - 1;
        s.floors.add_hole(GOAL_FLOOR - 1, 0.0, 800.0);
        step(&mut s, &mut r, &press(|i| i.descend = true));
        assert_eq!(s.phase, Phase::Clear);
        assert!(!s.is_new_record);
    }

    #[test]
    fn goal_wins_over_monster_on_goal_floor() {
        let mut s = quiet_session();
        let mut r = full_board();
        s.player.current_floor = GOAL_FLOOR - 1;
        s.floors.add_hole(GOAL_FLOOR - 1, 0.0, 800.0);
        s.monsters.push(Monster::new(GOAL_FLOOR, s.player.x + 5.0, 1.0));

        let events = step(&mut s, &mut r, &press(|i| i.descend = true));
        assert_eq!(s.player.current_floor, GOAL_FLOOR);
        assert!(collision::find_contact(&s.player, &s.monsters).is_some());
        assert!(events.contains(&GameEvent::GoalReached));
        assert!(!events.contains(&GameEvent::PlayerCaught));
        assert_eq!(s.phase, Phase::Clear);
    }

    #[test]
    fn monster_contact_is_game_over() {
        let mut s = quiet_session();
        let mut r = full_board();
        s.player.current_floor = 4;
        s.monsters.push(Monster::new(4, s.player.x + 10.0, 1.0));
        let events = step(&mut s, &mut r, &FrameInput::idle());
        assert!(events.contains(&GameEvent::PlayerCaught));
        assert_eq!(s.phase, Phase::GameOver);
        assert_eq!(s.final_ticks, 1);
    }

    #[test]
    fn monster_on_other_floor_is_harmless() {
        let mut s = quiet_session();
        let mut r = RankingStore::new();
        s.player.current_floor = 4;
        s.monsters.push(Monster::new(5, s.player.x, 1.0));
        for _ in 0..5 { idle(&mut s, &mut r); }
        assert_eq!(s.phase, Phase::Playing);
    }

    #[test]
    fn invisible_player_survives_overlap() {
        let mut s = quiet_session();
        let mut r = RankingStore::new();
        s.player.current_floor = 4;
        s.player.apply_gimmick(GimmickKind::Invisible);
        s.monsters.push(Monster::new(4, s.player.x, 1.0));
        for _ in 0..5 { idle(&mut s, &mut r); }
        assert_eq!(s.phase, Phase::Playing);
    }

    // ── Name entry ──

    #[test]
    fn name_submission_records_and_routes() {
        let mut s = quiet_session();
        let mut r = RankingStore::new();
        s.player.current_floor = 4;
        s.monsters.push(Monster::new(4, s.player.x, 1.0));
        idle(&mut s, &mut r);
        assert_eq!(s.phase, Phase::NameInput);

        // empty submit does nothing
        step(&mut s, &mut r, &press(|i| i.submit = true));
        assert_eq!(s.phase, Phase::NameInput);

        let typed = press(|i| i.name_edits = vec![
            NameEdit::Char('k'), NameEdit::Char('x'), NameEdit::Backspace,
            NameEdit::Char('i'), NameEdit::Char('m'),
        ]);
        step(&mut s, &mut r, &typed);
        assert_eq!(s.name, "kim");

        let events = step(&mut s, &mut r, &press(|i| i.submit = true));
        assert!(events.contains(&GameEvent::RankingUpdated));
        assert_eq!(s.phase, Phase::GameOver);
        assert_eq!(r.records().len(), 1);
        assert_eq!(r.records()[0], RankingRecord::new("kim", 4, s.final_seconds()));
    }

    #[test]
    fn cleared_name_submission_routes_to_clear() {
        let mut s = quiet_session();
        let mut r = RankingStore::new();
        s.player.current_floor = GOAL_FLOOR - 1;
        s.floors.add_hole(GOAL_FLOOR - 1, 0.0, 800.0);
        step(&mut s, &mut r, &press(|i| i.descend = true));
        step(&mut s, &mut r, &press(|i| {
            i.name_edits = vec![NameEdit::Char('a')];
            i.submit = true;
        }));
        assert_eq!(s.phase, Phase::Clear);
        assert_eq!(r.records()[0].floor, GOAL_FLOOR);
    }

    #[test]
    fn gameplay_intents_ignored_during_name_entry() {
        let mut s = quiet_session();
        let mut r = RankingStore::new();
        s.player.current_floor = 4;
        s.monsters.push(Monster::new(4, s.player.x, 1.0));
        idle(&mut s, &mut r);
        let x = s.player.x;
        step(&mut s, &mut r, &press(|i| { i.move_right = true; i.restart = true; i.jump = true; }));
        assert_eq!(s.phase, Phase::NameInput);
        assert_eq!(s.player.x, x);
        assert_eq!(s.player.current_floor, 4);
    }

    // ── Restart ──

    #[test]
    fn restart_only_after_run_ends() {
        let mut s = quiet_session();
        let mut r = full_board();
        s.player.current_floor = 2;
        step(&mut s, &mut r, &press(|i| i.restart = true));
        assert_eq!(s.player.current_floor, 2);

        s.monsters.push(Monster::new(2, s.player.x, 1.0));
        idle(&mut s, &mut r);
        assert_eq!(s.phase, Phase::GameOver);

        let events = step(&mut s, &mut r, &press(|i| i.restart = true));
        assert!(events.contains(&GameEvent::RunRestarted));
        assert_eq!(s.phase, Phase::Playing);
        assert_eq!(s.player.current_floor, 0);
        assert_eq!(r.records().len(), 3, "leaderboard survives restart");
    }

    // ── Camera ──

    #[test]
    fn camera_follows_then_manual_then_snaps_back() {
        let mut s = quiet_session();
        let mut r = RankingStore::new();
        s.player.current_floor = 20;
        idle(&mut s, &mut r);
        let follow = s.camera.offset;
        assert!(follow > 0);

        step(&mut s, &mut r, &press(|i| i.toggle_view = true));
        step(&mut s, &mut r, &press(|i| i.scroll = -200));
        assert_eq!(s.camera.offset, follow - 200);

        step(&mut s, &mut r, &press(|i| i.toggle_view = true));
        assert_eq!(s.camera.offset, follow);
    }

    #[test]
    fn dev_warp_intent() {
        let mut s = quiet_session();
        let mut r = RankingStore::new();
        step(&mut s, &mut r, &press(|i| i.dev_warp = true));
        assert_eq!(s.player.current_floor, 48);
        step(&mut s, &mut r, &press(|i| i.descend = true));
        step(&mut s, &mut r, &press(|i| i.descend = true));
        assert_eq!(s.player.current_floor, GOAL_FLOOR);
        assert_ne!(s.phase, Phase::Playing);
    }
}
