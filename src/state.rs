//! Persistence of the last counter snapshot between runs.
//!
//! Stored as JSON under the user cache dir (`~/.cache/fritz_traffic_state.json`).
//! The file is only a baseline for the next delta, so every failure here is
//! logged and absorbed: reads fall back to a zero snapshot, writes are dropped.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use tempfile::NamedTempFile;

use crate::system::network::Snapshot;

pub const STATE_FILE_NAME: &str = "fritz_traffic_state.json";

/// Default state path: <cache dir>/fritz_traffic_state.json
pub fn default_state_path() -> PathBuf {
    let cache = dirs::cache_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join(".cache")))
        .unwrap_or_else(|| PathBuf::from("."));
    cache.join(STATE_FILE_NAME)
}

/// Single-record snapshot store backed by one JSON file
#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Load the last snapshot, or a zero snapshot if there is nothing usable
    pub fn load(&self) -> Snapshot {
        let content = match fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("no state file at {}, starting from zero", self.path.display());
                return Snapshot::zero();
            }
            Err(e) => {
                warn!("failed to read state file {}: {}", self.path.display(), e);
                return Snapshot::zero();
            }
        };

        match serde_json::from_str::<Snapshot>(&content) {
            Ok(snap) => snap,
            Err(e) => {
                warn!("ignoring malformed state file {}: {}", self.path.display(), e);
                Snapshot::zero()
            }
        }
    }

    /// Persist the snapshot; failures are logged and otherwise ignored
    pub fn save(&self, snapshot: &Snapshot) {
        if let Err(e) = self.try_save(snapshot) {
            warn!("failed to write state file {}: {}", self.path.display(), e);
        }
    }

    /// Write to a temp file next to the target, then rename over it, so a
    /// reader sees either the old record or the new one.
    fn try_save(&self, snapshot: &Snapshot) -> anyhow::Result<()> {
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir)?;

        let json = serde_json::to_string(snapshot)?;
        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(json.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path)?;
        Ok(())
    }
}
