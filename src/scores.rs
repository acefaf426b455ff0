use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::PathBuf;

use crate::Difficulty;

/// Per-difficulty best completion times, optionally backed by a JSON file.
///
/// Persistence never interrupts play: a missing or malformed file loads as
/// an empty board, and a failed save is logged and swallowed.
#[derive(Clone, Debug, Default)]
pub struct ScoreBoard {
    path: Option<PathBuf>,
    times: HashMap<Difficulty, u32>,
}

impl ScoreBoard {
    /// Score board backed by the JSON file at `path`. Unreadable contents
    /// fall back to no recorded times.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let times = fs::read_to_string(&path)
            .ok()
            .and_then(|contents| serde_json::from_str(&contents).ok())
            .unwrap_or_default();
        Self {
            path: Some(path),
            times,
        }
    }

    /// Score board with no persistence touchpoint.
    pub fn in_memory() -> Self {
        Self::default()
    }

    pub fn best(&self, difficulty: Difficulty) -> Option<u32> {
        self.times.get(&difficulty).copied()
    }

    /// Record a completion time, keeping only strict improvements over the
    /// stored value. Returns whether the record changed; a change is saved
    /// right away.
    pub fn record(&mut self, difficulty: Difficulty, secs: u32) -> bool {
        match self.times.get(&difficulty) {
            Some(&best) if best <= secs => false,
            _ => {
                self.times.insert(difficulty, secs);
                if let Err(err) = self.save() {
                    log::warn!("failed to save best times: {err}");
                }
                true
            }
        }
    }

    fn save(&self) -> io::Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let contents = serde_json::to_string_pretty(&self.times)?;
        fs::write(path, contents)
    }
}
