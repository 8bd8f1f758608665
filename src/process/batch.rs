//! Directory-wide batch processing with inter-message pacing.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tracing::{error, info, warn};

use super::message::{MessageOutcome, MessageProcessor};
use crate::error::{catch_panic, MailbriefError, Result};

/// Extension of source messages picked up from the input directory.
pub const SOURCE_EXTENSION: &str = "eml";

/// Totals for one batch run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchReport {
    /// Source files found in the input directory.
    pub discovered: usize,
    /// Records written to the result store.
    pub processed: usize,
    /// Messages that could not be parsed.
    pub skipped: usize,
    /// Records produced but not persisted, or runs that panicked.
    pub failed: usize,
    pub elapsed: Duration,
}

impl BatchReport {
    /// Wall time per persisted record; never divides by zero.
    pub fn avg_secs_per_message(&self) -> f64 {
        self.elapsed.as_secs_f64() / self.processed.max(1) as f64
    }
}

/// `*.eml` files directly inside `dir`, in directory enumeration order.
pub fn list_sources(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir).map_err(|e| MailbriefError::io(dir, e))?;
    Ok(entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == SOURCE_EXTENSION))
        .collect())
}

/// Processes every source message in a directory, one at a time.
pub struct BatchRunner {
    processor: MessageProcessor,
    min_interval: Duration,
}

impl BatchRunner {
    /// `min_interval` is the floor between the starts of two consecutive
    /// messages.
    pub fn new(processor: MessageProcessor, min_interval: Duration) -> Self {
        Self {
            processor,
            min_interval,
        }
    }

    /// Process all sources in `input_dir`. Only a missing or unreadable
    /// input directory is an error; per-message failures are counted.
    pub fn run(
        &self,
        input_dir: &Path,
        progress: Option<&dyn Fn(usize, usize)>,
    ) -> Result<BatchReport> {
        let sources = list_sources(input_dir)?;
        let total = sources.len();
        let start = Instant::now();
        let mut report = BatchReport {
            discovered: total,
            ..BatchReport::default()
        };

        info!(input = %input_dir.display(), files = total, "Starting batch");

        for (i, path) in sources.iter().enumerate() {
            if let Some(cb) = progress {
                cb(i, total);
            }
            let file_start = Instant::now();
            let name = path.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
            info!(file = %name, "Processing");

            match catch_panic(|| self.processor.process_file(path)) {
                Ok(MessageOutcome::Skipped { reason }) => {
                    warn!(file = %name, reason = %reason, "Skipped message");
                    report.skipped += 1;
                }
                Ok(outcome) if outcome.is_persisted() => report.processed += 1,
                Ok(_) => report.failed += 1,
                Err(msg) => {
                    error!(file = %name, error = %msg, "Unexpected error processing message");
                    report.failed += 1;
                }
            }

            let spent = file_start.elapsed();
            if let Some(delay) = self.min_interval.checked_sub(spent) {
                std::thread::sleep(delay);
            }
        }
        if let Some(cb) = progress {
            cb(total, total);
        }

        report.elapsed = start.elapsed();
        info!(
            processed = report.processed,
            skipped = report.skipped,
            failed = report.failed,
            seconds = %format!("{:.2}", report.elapsed.as_secs_f64()),
            avg = %format!("{:.2}", report.avg_secs_per_message()),
            "Processing complete"
        );
        Ok(report)
    }
}
