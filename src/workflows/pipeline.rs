use anyhow::Result;
use regex::Regex;
use std::thread;
use std::time::Duration;

use crate::domain::models::{FailureRecord, LookupError, ShowRecord, TitleEntry};
use crate::infra::progress::{ProgressState, ProgressStore};
use crate::workflows::export::ReportWriter;
use crate::workflows::retry;

/// The metadata provider seam. Production talks to IMDb; tests script the
/// responses.
pub trait ShowLookup {
    fn lookup(&mut self, title: &str) -> Result<ShowRecord, LookupError>;
}

#[derive(Debug)]
pub struct PipelineOptions {
    /// Seconds to wait between lookups, 0 disables.
    pub delay: f64,
    /// Attempts per title before a transient error becomes a failure record.
    pub max_retries: u32,
    /// Titles processed between checkpoint flushes.
    pub checkpoint_interval: u64,
    /// Base wait after a transient failure; doubles per attempt.
    pub retry_backoff: Duration,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            delay: 0.0,
            max_retries: 3,
            checkpoint_interval: 10,
            retry_backoff: Duration::from_secs(2),
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct RunSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
}

/// Cooperative pacing between provider calls. The whole pipeline is
/// single-threaded, so a plain sleep is the entire mechanism.
#[derive(Debug)]
pub struct RateLimiter {
    delay: Duration,
    primed: bool,
}

impl RateLimiter {
    pub fn new(delay_seconds: f64) -> Self {
        Self {
            delay: Duration::from_secs_f64(delay_seconds.max(0.0)),
            primed: false,
        }
    }

    /// Blocks before every call after the first.
    pub fn pause(&mut self) {
        if self.primed && !self.delay.is_zero() {
            thread::sleep(self.delay);
        }
        self.primed = true;
    }
}

/// Known provider quirk: a trailing "(2018)"-style parenthetical sometimes
/// causes request errors. The title is still sent verbatim, since stripping
/// the year would throw away disambiguation.
fn has_trailing_year(title: &str) -> bool {
    Regex::new(r"\(\d{4}\)\s*$").unwrap().is_match(title)
}

/// Drives the whole run: resume check, per-title lookup with retry and rate
/// limiting, batched flush of outputs followed by an atomic checkpoint save,
/// and checkpoint removal once the list is done.
pub fn run(
    entries: &[TitleEntry],
    lookup: &mut dyn ShowLookup,
    writer: &ReportWriter,
    store: &ProgressStore,
    confirm_resume: &mut dyn FnMut(u64) -> bool,
    opts: &PipelineOptions,
) -> Result<RunSummary> {
    let (mut state, resuming) = match store.load() {
        Some(previous) => {
            if confirm_resume(previous.last_position) {
                println!("Resuming from position {}", previous.last_position + 1);
                (previous, true)
            } else {
                println!("Starting from the beginning");
                store.clear()?;
                (ProgressState::default(), false)
            }
        }
        None => (ProgressState::default(), false),
    };

    if resuming {
        writer.ensure_outputs()?;
    } else {
        writer.start_fresh()?;
    }

    // Everything recorded in the checkpoint is already in the output files;
    // only what accumulates past these marks gets appended.
    let mut flushed_records = state.records.len();
    let mut flushed_failures = state.failures.len();
    let start_position = state.last_position + 1;

    let mut limiter = RateLimiter::new(opts.delay);
    let mut since_checkpoint = 0u64;

    for entry in entries.iter().filter(|e| e.position >= start_position) {
        limiter.pause();

        println!("Looking up: {}", entry.title);
        if has_trailing_year(&entry.title) {
            println!("  note: the trailing year is sent to the provider as-is and can cause request errors");
        }

        let outcome = retry::with_retries(
            opts.max_retries,
            || lookup.lookup(&entry.title),
            LookupError::is_transient,
            |attempt, err| {
                let wait = opts.retry_backoff * 2u32.pow(attempt - 1);
                println!(
                    "  {err}; retrying in {}s (attempt {}/{})",
                    wait.as_secs(),
                    attempt + 1,
                    opts.max_retries
                );
                thread::sleep(wait);
            },
        );

        match outcome {
            Ok(mut record) => {
                record.position = entry.position;
                match record.year {
                    Some(year) => println!("  found: {} ({year})", record.title),
                    None => println!("  found: {}", record.title),
                }
                state.records.push(record);
            }
            Err(err) => {
                eprintln!("  failed: {err}");
                state.failures.push(FailureRecord {
                    position: entry.position,
                    title: entry.title.clone(),
                    reason: err.to_string(),
                });
            }
        }

        since_checkpoint += 1;
        if since_checkpoint >= opts.checkpoint_interval {
            flush_outputs(writer, &state, &mut flushed_records, &mut flushed_failures)?;
            state.last_position = entry.position;
            // A failed checkpoint write degrades resume safety for this
            // batch but must not abort the run.
            if let Err(e) = store.save(&state) {
                log::warn!("checkpoint write failed: {e:#}");
            } else {
                println!(
                    "Progress saved: {}/{} ({} found, {} failed)",
                    entry.position,
                    entries.len(),
                    state.records.len(),
                    state.failures.len()
                );
            }
            since_checkpoint = 0;
        }
    }

    flush_outputs(writer, &state, &mut flushed_records, &mut flushed_failures)?;
    store.clear()?;

    Ok(RunSummary {
        total: entries.len(),
        succeeded: state.records.len(),
        failed: state.failures.len(),
    })
}

fn flush_outputs(
    writer: &ReportWriter,
    state: &ProgressState,
    flushed_records: &mut usize,
    flushed_failures: &mut usize,
) -> Result<()> {
    writer.append_records(&state.records[*flushed_records..])?;
    writer.append_failures(&state.failures[*flushed_failures..])?;
    *flushed_records = state.records.len();
    *flushed_failures = state.failures.len();
    Ok(())
}
