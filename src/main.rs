/// Entry point and game loop.

mod config;
mod domain;
mod sim;
mod ui;

use std::fs::OpenOptions;
use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::KeyCode;

use config::GameConfig;
use sim::camera::{KEY_SCROLL_STEP, WHEEL_SCROLL_STEP};
use sim::event::GameEvent;
use sim::intent::FrameInput;
use sim::ranking::RankingStore;
use sim::save;
use sim::session::{format_seconds, Phase, Session};
use sim::step;
use ui::gamepad::GamepadState;
use ui::input::InputState;
use ui::renderer::Renderer;
use ui::sound::SoundEngine;

const TICK: Duration = Duration::from_micros(1_000_000 / domain::layout::TICK_RATE as u64);
const FRAME_SLEEP: Duration = Duration::from_millis(4);

fn main() {
    let (config, config_problem) = GameConfig::load();
    let logging = init_logging(&config.log_file);
    if let Err(e) = &logging {
        // Logging is optional; the game still runs
        eprintln!("Warning: logging disabled: {e:#}");
    }
    if let Some(e) = config_problem {
        log::warn!("config.toml ignored, using defaults: {e:#}");
        if logging.is_err() {
            eprintln!("Warning: config.toml ignored, using defaults: {e:#}");
        }
    }
    log::info!("starting tunneler (seed: {:?}, dev tools: {})", config.seed, config.dev_tools);

    let ranking_path = save::resolve_data_path(&config.ranking_file);
    let mut rankings = save::load_rankings(&ranking_path);
    let mut session = Session::new(config.seed);

    let mut renderer = Renderer::new();
    if let Err(e) = renderer.init() {
        let _ = renderer.cleanup();
        eprintln!("Terminal init failed: {e}");
        std::process::exit(1);
    }

    let sound = if config.sound_enabled { SoundEngine::new() } else { None };

    let result = game_loop(
        &mut session, &mut rankings, &mut renderer, sound.as_ref(), &config, &ranking_path,
    );

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    if let Err(e) = result {
        log::error!("game loop failed: {e:#}");
        eprintln!("Game error: {e:#}");
    }

    println!();
    println!("Thanks for digging!");
    if let Some(best) = rankings.best() {
        let floor = if best.floor == 0 { "Surface".to_string() } else { format!("B{}", best.floor) };
        println!("Best: {}  {}  {}", best.name, floor, format_seconds(best.time));
    }
    log::info!("exit");
}

/// Route `log` output to a file; the terminal belongs to the renderer.
fn init_logging(file: &Path) -> Result<()> {
    let path = save::resolve_data_path(file);
    let target = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("opening log file {}", path.display()))?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(target)))
        .try_init()
        .context("installing logger")?;
    Ok(())
}

fn game_loop(
    session: &mut Session,
    rankings: &mut RankingStore,
    renderer: &mut Renderer,
    sound: Option<&SoundEngine>,
    config: &GameConfig,
    ranking_path: &Path,
) -> Result<()> {
    let mut kb = InputState::new();
    kb.honor_release = renderer.keyboard_enhanced();
    let mut gp = GamepadState::new();
    gp.load_button_config(&config.gamepad);

    // Edge-triggered intents seen since the last tick
    let mut pending = FrameInput::idle();
    let mut last_tick = Instant::now();

    loop {
        kb.drain_events();
        gp.update();

        collect_edges(&mut pending, session.phase, &kb, &gp, config);
        if pending.quit {
            break;
        }

        if last_tick.elapsed() >= TICK {
            collect_held(&mut pending, session, &kb, &gp);
            let input = std::mem::take(&mut pending);
            let events = step::step(session, rankings, &input);
            handle_events(&events, sound, rankings, ranking_path);
            last_tick = Instant::now();
        }

        renderer.render(session, rankings).context("drawing frame")?;
        std::thread::sleep(FRAME_SLEEP);
    }

    Ok(())
}

fn handle_events(
    events: &[GameEvent],
    sound: Option<&SoundEngine>,
    rankings: &RankingStore,
    ranking_path: &Path,
) {
    for event in events {
        match event {
            GameEvent::RankingUpdated => {
                if let Err(e) = save::save_rankings(ranking_path, rankings) {
                    log::warn!("could not save rankings: {e:#}");
                }
            }
            GameEvent::HoleDug { floor } => log::debug!("hole dug on B{floor}"),
            GameEvent::GimmickTriggered { kind } => log::info!("gimmick: {}", kind.label()),
            GameEvent::Descended { floor } => log::debug!("descended to B{floor}"),
            GameEvent::Jumped { floor } => log::debug!("jumped up to B{floor}"),
            GameEvent::ViewToggled { manual } => log::debug!("view mode {}", if *manual { "on" } else { "off" }),
            GameEvent::RunRestarted => log::info!("run restarted"),
            _ => {}
        }
    }

    let Some(sfx) = sound else { return };
    for event in events {
        match event {
            GameEvent::DigStarted => sfx.play_dig(),
            GameEvent::HoleDug { .. } => sfx.play_hole(),
            GameEvent::GimmickTriggered { .. } => sfx.play_gimmick(),
            GameEvent::Descended { .. } => sfx.play_descend(),
            GameEvent::Jumped { .. } => sfx.play_jump(),
            GameEvent::PlayerCaught => sfx.play_die(),
            GameEvent::GoalReached => sfx.play_clear(),
            GameEvent::NewRecord => sfx.play_record(),
            _ => {}
        }
    }
}

// ── Key Constants ──

const KEYS_LEFT: &[KeyCode] = &[KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('A')];
const KEYS_RIGHT: &[KeyCode] = &[KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('D')];
const KEYS_DIG: &[KeyCode] = &[KeyCode::Char('l'), KeyCode::Char('L')];
const KEYS_DESCEND: &[KeyCode] = &[KeyCode::Char('s'), KeyCode::Char('S')];
const KEYS_JUMP: &[KeyCode] = &[KeyCode::Char(' ')];
const KEYS_VIEW: &[KeyCode] = &[KeyCode::Char('v'), KeyCode::Char('V')];
const KEYS_SCROLL_UP: &[KeyCode] = &[KeyCode::Up, KeyCode::Char('w'), KeyCode::Char('W')];
const KEYS_SCROLL_DOWN: &[KeyCode] = &[KeyCode::Down];
const KEYS_PAGE_UP: &[KeyCode] = &[KeyCode::PageUp];
const KEYS_PAGE_DOWN: &[KeyCode] = &[KeyCode::PageDown];
const KEYS_RESTART: &[KeyCode] = &[KeyCode::Char('r'), KeyCode::Char('R')];
const KEYS_SUBMIT: &[KeyCode] = &[KeyCode::Enter];
const KEYS_QUIT: &[KeyCode] = &[KeyCode::Esc];
const KEYS_WARP: &[KeyCode] = &[KeyCode::Char('t'), KeyCode::Char('T')];

/// Fold this frame's one-shot presses into `pending` until the next tick.
fn collect_edges(
    pending: &mut FrameInput,
    phase: Phase,
    kb: &InputState,
    gp: &GamepadState,
    config: &GameConfig,
) {
    pending.quit |= kb.ctrl_c_pressed() || kb.any_pressed(KEYS_QUIT) || gp.cancel_pressed();

    match phase {
        Phase::Playing => {
            pending.dig |= kb.any_pressed(KEYS_DIG) || gp.dig_pressed();
            pending.descend |= kb.any_pressed(KEYS_DESCEND) || gp.descend_pressed();
            pending.jump |= kb.any_pressed(KEYS_JUMP) || gp.jump_pressed();
            // two toggles inside one tick cancel out
            if kb.any_pressed(KEYS_VIEW) || gp.view_pressed() {
                pending.toggle_view = !pending.toggle_view;
            }
            let notches = kb.wheel_notches()
                + kb.press_count(KEYS_PAGE_DOWN)
                - kb.press_count(KEYS_PAGE_UP);
            pending.scroll += notches * WHEEL_SCROLL_STEP;
            pending.dev_warp |= config.dev_tools && kb.any_pressed(KEYS_WARP);
        }
        Phase::NameInput => {
            // letters type here; gameplay keys mean nothing in this phase
            pending.name_edits.extend(kb.name_edits());
            pending.submit |= kb.any_pressed(KEYS_SUBMIT) || gp.confirm_pressed();
        }
        Phase::GameOver | Phase::Clear => {
            pending.restart |= kb.any_pressed(KEYS_RESTART) || gp.restart_pressed();
        }
    }
}

/// Level-triggered intents sampled once per tick.
fn collect_held(pending: &mut FrameInput, session: &Session, kb: &InputState, gp: &GamepadState) {
    if session.phase != Phase::Playing {
        return;
    }
    pending.move_left = kb.any_held(KEYS_LEFT) || gp.left_held();
    pending.move_right = kb.any_held(KEYS_RIGHT) || gp.right_held();

    if session.camera.is_manual() {
        if kb.any_held(KEYS_SCROLL_UP) || gp.up_held() {
            pending.scroll -= KEY_SCROLL_STEP;
        }
        if kb.any_held(KEYS_SCROLL_DOWN) || gp.down_held() {
            pending.scroll += KEY_SCROLL_STEP;
        }
    }
}
