/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to sensible defaults if the file is missing or incomplete.
/// An unreadable or malformed file also falls back; `load` hands the error
/// back because it runs before the logger is installed.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Environment switch for developer tools, checked in addition to `[dev] tools`.
pub const DEVTOOLS_ENV: &str = "TUNNELER_DEVTOOLS";

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub ranking_file: PathBuf,
    pub log_file: PathBuf,
    /// Fixed RNG seed; `None` draws a fresh layout every launch.
    pub seed: Option<u64>,
    pub sound_enabled: bool,
    pub dev_tools: bool,
    pub gamepad: GamepadConfig,
}

#[derive(Clone, Debug)]
pub struct GamepadConfig {
    pub dig: Vec<String>,
    pub descend: Vec<String>,
    pub jump: Vec<String>,
    pub view: Vec<String>,
    pub confirm: Vec<String>,
    pub restart: Vec<String>,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    general: TomlGeneral,
    #[serde(default)]
    sound: TomlSound,
    #[serde(default)]
    dev: TomlDev,
    #[serde(default)]
    gamepad: TomlGamepad,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default = "default_ranking_file")]
    ranking_file: String,
    #[serde(default = "default_log_file")]
    log_file: String,
    #[serde(default)]
    seed: Option<u64>,
}

#[derive(Deserialize, Debug)]
struct TomlSound {
    #[serde(default = "default_true")]
    enabled: bool,
}

#[derive(Deserialize, Debug, Default)]
struct TomlDev {
    #[serde(default)]
    tools: bool,
}

#[derive(Deserialize, Debug)]
struct TomlGamepad {
    #[serde(default = "default_dig")]
    dig: Vec<String>,
    #[serde(default = "default_descend")]
    descend: Vec<String>,
    #[serde(default = "default_jump")]
    jump: Vec<String>,
    #[serde(default = "default_view")]
    view: Vec<String>,
    #[serde(default = "default_confirm")]
    confirm: Vec<String>,
    #[serde(default = "default_restart")]
    restart: Vec<String>,
}

// ── Defaults ──

fn default_ranking_file() -> String { "ranking.json".into() }
fn default_log_file() -> String { "tunneler.log".into() }
fn default_true() -> bool { true }

fn default_dig() -> Vec<String> { vec!["X".into(), "L1".into()] }
fn default_descend() -> Vec<String> { vec!["A".into(), "R1".into()] }
fn default_jump() -> Vec<String> { vec!["B".into()] }
fn default_view() -> Vec<String> { vec!["Y".into()] }
fn default_confirm() -> Vec<String> { vec!["Start".into()] }
fn default_restart() -> Vec<String> { vec!["Start".into()] }

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral {
            ranking_file: default_ranking_file(),
            log_file: default_log_file(),
            seed: None,
        }
    }
}

impl Default for TomlSound {
    fn default() -> Self {
        TomlSound { enabled: true }
    }
}

impl Default for TomlGamepad {
    fn default() -> Self {
        TomlGamepad {
            dig: default_dig(),
            descend: default_descend(),
            jump: default_jump(),
            view: default_view(),
            confirm: default_confirm(),
            restart: default_restart(),
        }
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: exe directory, CWD, then the data directories.
    /// Missing file or missing keys gracefully fall back to defaults.
    pub fn load() -> (Self, Option<anyhow::Error>) {
        let search_dirs = candidate_dirs();
        let (toml_cfg, problem) = match load_toml(&search_dirs) {
            Ok(cfg) => (cfg, None),
            Err(e) => (TomlConfig::default(), Some(e)),
        };
        let env_dev = std::env::var(DEVTOOLS_ENV).ok();
        (GameConfig::from_toml(toml_cfg, env_dev.as_deref()), problem)
    }

    fn from_toml(cfg: TomlConfig, env_dev: Option<&str>) -> Self {
        GameConfig {
            ranking_file: PathBuf::from(cfg.general.ranking_file),
            log_file: PathBuf::from(cfg.general.log_file),
            seed: cfg.general.seed,
            sound_enabled: cfg.sound.enabled,
            dev_tools: cfg.dev.tools || env_dev.map_or(false, env_flag),
            gamepad: GamepadConfig {
                dig: cfg.gamepad.dig,
                descend: cfg.gamepad.descend,
                jump: cfg.gamepad.jump,
                view: cfg.gamepad.view,
                confirm: cfg.gamepad.confirm,
                restart: cfg.gamepad.restart,
            },
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig::from_toml(TomlConfig::default(), None)
    }
}

fn env_flag(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "y")
}

/// Candidate directories to search: exe dir + CWD + data paths (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    // 1. Directory of the running executable
    if let Ok(exe) = std::env::current_exe() {
        // Resolve symlinks so a /usr/bin link still finds data next to the real binary
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    // 2. Current working directory
    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    // 3. XDG data home (~/.local/share/tunneler)
    if let Ok(home) = std::env::var("HOME") {
        let xdg = PathBuf::from(&home).join(".local/share/tunneler");
        if xdg.is_dir() && !dirs.iter().any(|d| d == &xdg) {
            dirs.push(xdg);
        }
    }

    // 4. System data directory
    let sys = PathBuf::from("/usr/share/tunneler");
    if sys.is_dir() && !dirs.iter().any(|d| d == &sys) {
        dirs.push(sys);
    }

    // 5. Fallback
    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// Search for config.toml in candidate directories. No file at all is not an error.
fn load_toml(search_dirs: &[PathBuf]) -> Result<TomlConfig> {
    match search_dirs.iter().map(|d| d.join("config.toml")).find(|p| p.exists()) {
        Some(path) => read_toml(&path),
        None => Ok(TomlConfig::default()),
    }
}

fn read_toml(path: &Path) -> Result<TomlConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    toml::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}
