/// Leaderboard persistence: `ranking.json`.
///
/// ## File format
///   Pretty-printed JSON array of `{ "name", "floor", "time" }` objects.
///   Entries without `"floor"` predate depth tracking and load as cleared runs.
///
/// ## Failure policy
///   - Missing file → empty board.
///   - Unreadable or corrupt file → empty board, warning logged.
///   - Write failure → returned to the caller, which logs it; the in-memory
///     board keeps running the show.
///
/// Writes go to a sibling `.tmp` file first and are renamed into place, so a
/// crash mid-write leaves the previous file intact.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use super::ranking::{RankingRecord, RankingStore};

// ══════════════════════════════════════════════════════════════
// Paths
// ══════════════════════════════════════════════════════════════

fn data_dir() -> PathBuf {
    // 1. Exe directory (portable installs)
    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            // System installs like /usr/games/ aren't writable
            let probe = parent.join(".write_test_tunneler");
            if fs::write(&probe, "").is_ok() {
                let _ = fs::remove_file(&probe);
                return parent.to_path_buf();
            }
        }
    }

    // 2. XDG data home
    if let Ok(home) = std::env::var("HOME") {
        let xdg = PathBuf::from(&home).join(".local/share/tunneler");
        if fs::create_dir_all(&xdg).is_ok() {
            return xdg;
        }
    }

    // 3. CWD
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

/// Resolve a data file name against the data directory. Absolute paths are used as-is.
pub fn resolve_data_path(file: &Path) -> PathBuf {
    if file.is_absolute() {
        file.to_path_buf()
    } else {
        data_dir().join(file)
    }
}

// ══════════════════════════════════════════════════════════════
// Load / save
// ══════════════════════════════════════════════════════════════

pub fn read_records(path: &Path) -> Result<Vec<RankingRecord>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let records = serde_json::from_str(&text)
        .with_context(|| format!("parsing {}", path.display()))?;
    Ok(records)
}

/// Never fails: anything wrong with the file yields an empty board.
pub fn load_rankings(path: &Path) -> RankingStore {
    if !path.exists() {
        log::info!("no ranking file at {}, starting empty", path.display());
        return RankingStore::new();
    }
    match read_records(path) {
        Ok(records) => {
            let store = RankingStore::from_records(records);
            log::info!("loaded {} ranking record(s) from {}", store.records().len(), path.display());
            store
        }
        Err(e) => {
            log::warn!("ignoring ranking file: {e:#}");
            RankingStore::new()
        }
    }
}

pub fn save_rankings(path: &Path, store: &RankingStore) -> Result<()> {
    let json = serde_json::to_string_pretty(store.records())
        .context("serializing rankings")?;

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    fs::write(&tmp, json).with_context(|| format!("writing {}", tmp.display()))?;
    fs::rename(&tmp, path)
        .with_context(|| format!("replacing {}", path.display()))?;
    log::debug!("saved {} ranking record(s) to {}", store.records().len(), path.display());
    Ok(())
}
