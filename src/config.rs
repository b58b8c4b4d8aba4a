use anyhow::Result;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Optional defaults picked up from the config file. CLI flags win over
/// these, and built-in defaults apply when neither is set.
#[derive(Debug, Default, Deserialize)]
pub struct Settings {
    pub delay: Option<f64>,
    pub max_retries: Option<u32>,
}

pub fn load_settings() -> Result<Settings> {
    let config_path = get_config_path();
    if config_path.exists() {
        let content = fs::read_to_string(&config_path)?;
        let settings: Settings = toml::from_str(&content)?;
        return Ok(settings);
    }
    Ok(Settings::default())
}

fn get_config_dir_path() -> PathBuf {
    xdir::config()
        .map(|path| path.join("show-exporter"))
        // If the standard path could not be found (e.g.`$HOME` is not set),
        // default to the current directory.
        .unwrap_or_default()
}

fn get_config_path() -> PathBuf {
    get_config_dir_path().join("config.toml")
}

/// Checkpoint file kept beside the output CSV for the duration of a run.
pub fn progress_path(output: &Path) -> PathBuf {
    sibling(output, "_progress.json")
}

/// Per-failure detail file (position, title, reason).
pub fn failed_path(output: &Path) -> PathBuf {
    sibling(output, "_failed.txt")
}

/// Plain list of failed titles, usable as a new input file.
pub fn failed_list_path(output: &Path) -> PathBuf {
    sibling(output, "_failed_list.txt")
}

fn sibling(output: &Path, suffix: &str) -> PathBuf {
    let stem = output
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");
    output.with_file_name(format!("{stem}{suffix}"))
}
