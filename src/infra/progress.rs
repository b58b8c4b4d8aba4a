use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::progress_path;
use crate::domain::models::{FailureRecord, ShowRecord};

/// Snapshot of a run, persisted every few titles so an interrupted run can
/// pick up where it left off. `last_position` is the highest position whose
/// outcome has been flushed to the output files.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ProgressState {
    pub last_position: u64,
    pub records: Vec<ShowRecord>,
    pub failures: Vec<FailureRecord>,
}

#[derive(Debug)]
pub struct ProgressStore {
    path: PathBuf,
}

impl ProgressStore {
    pub fn new(output: &Path) -> Self {
        Self {
            path: progress_path(output),
        }
    }

    /// A missing or unreadable checkpoint is treated as absent; a malformed
    /// one is logged and ignored rather than aborting the run.
    pub fn load(&self) -> Option<ProgressState> {
        if !self.path.exists() {
            return None;
        }
        let content = fs::read_to_string(&self.path).ok()?;
        match serde_json::from_str(&content) {
            Ok(state) => Some(state),
            Err(e) => {
                log::warn!(
                    "ignoring malformed checkpoint {}: {e}",
                    self.path.display()
                );
                None
            }
        }
    }

    /// Writes to a temp file and renames it over the checkpoint, so an
    /// interruption mid-write cannot leave a truncated checkpoint behind.
    pub fn save(&self, state: &ProgressState) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let content = serde_json::to_string_pretty(state)?;
        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, content)
            .with_context(|| format!("cannot write checkpoint {}", tmp_path.display()))?;
        fs::rename(&tmp_path, &self.path)
            .with_context(|| format!("cannot replace checkpoint {}", self.path.display()))?;
        Ok(())
    }

    pub fn clear(&self) -> Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)
                .with_context(|| format!("cannot remove checkpoint {}", self.path.display()))?;
        }
        Ok(())
    }
}
