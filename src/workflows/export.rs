use anyhow::{Context, Result};
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::config::{failed_list_path, failed_path};
use crate::domain::models::{FailureRecord, ShowRecord};

const CSV_HEADER: &str =
    "Position,IMDb ID,Title,URL,Rating,Votes,Year,Genres,Runtime,Release Date,Directors";

/// Appends successes to the CSV and failures to the two failure files. The
/// pipeline only hands over rows that are not yet on disk, so append mode
/// keeps resumed runs duplicate-free.
#[derive(Debug)]
pub struct ReportWriter {
    csv_path: PathBuf,
    failed_path: PathBuf,
    failed_list_path: PathBuf,
}

impl ReportWriter {
    pub fn new(output: &Path) -> Self {
        Self {
            csv_path: output.to_path_buf(),
            failed_path: failed_path(output),
            failed_list_path: failed_list_path(output),
        }
    }

    /// Truncates the CSV down to its header and removes failure files left
    /// over from an earlier run.
    pub fn start_fresh(&self) -> Result<()> {
        if let Some(parent) = self.csv_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.csv_path, format!("{CSV_HEADER}\n"))
            .with_context(|| format!("cannot write {}", self.csv_path.display()))?;

        for path in [&self.failed_path, &self.failed_list_path] {
            if path.exists() {
                fs::remove_file(path)
                    .with_context(|| format!("cannot remove stale {}", path.display()))?;
            }
        }
        Ok(())
    }

    /// Resumed runs keep whatever is already on disk. The header is only
    /// written if the CSV vanished since the checkpoint was taken.
    pub fn ensure_outputs(&self) -> Result<()> {
        if !self.csv_path.exists() {
            fs::write(&self.csv_path, format!("{CSV_HEADER}\n"))
                .with_context(|| format!("cannot write {}", self.csv_path.display()))?;
        }
        Ok(())
    }

    pub fn append_records(&self, records: &[ShowRecord]) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }
        let mut file = append_handle(&self.csv_path)?;
        for record in records {
            writeln!(file, "{}", csv_row(record))?;
        }
        Ok(())
    }

    /// Failure files are created lazily, so a clean run produces only a CSV.
    pub fn append_failures(&self, failures: &[FailureRecord]) -> Result<()> {
        if failures.is_empty() {
            return Ok(());
        }
        let mut detail = append_handle(&self.failed_path)?;
        let mut list = append_handle(&self.failed_list_path)?;
        for failure in failures {
            writeln!(
                detail,
                "{}\t{}\t{}",
                failure.position, failure.title, failure.reason
            )?;
            writeln!(list, "{}", failure.title)?;
        }
        Ok(())
    }
}

fn append_handle(path: &Path) -> Result<File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("cannot open {} for appending", path.display()))
}

fn csv_row(record: &ShowRecord) -> String {
    let fields = [
        record.position.to_string(),
        record.imdb_id.clone(),
        record.title.clone(),
        record.url.clone(),
        record.rating.map(|r| r.to_string()).unwrap_or_default(),
        record.votes.map(|v| v.to_string()).unwrap_or_default(),
        record.year.map(|y| y.to_string()).unwrap_or_default(),
        record.genres.join(", "),
        record
            .runtime_minutes
            .map(|m| m.to_string())
            .unwrap_or_default(),
        record.release_date.clone().unwrap_or_default(),
        record.directors.join(", "),
    ];

    fields
        .iter()
        .map(|field| csv_field(field))
        .collect::<Vec<_>>()
        .join(",")
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
