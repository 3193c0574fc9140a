#![warn(missing_docs)]
//! # phishguard-batch
//!
//! ## Purpose
//! Runs bounded batches of URL analyses and exports their rows as CSV.
//!
//! ## Responsibilities
//! - Enforce the 1..=[`MAX_BATCH_SIZE`] input bound before any analysis call.
//! - Analyze URLs strictly sequentially, in input order.
//! - Isolate per-URL failures into `ERROR` rows without aborting the batch.
//! - Serialize rows into the export CSV format.
//!
//! ## Data flow
//! URL list -> [`BatchRunner::run_with_progress`] -> one [`BatchRow`] per URL
//! (emitted as produced) -> [`export_csv`] / [`write_batch_csv`].
//!
//! ## Ownership and lifetimes
//! Rows are owned values; the runner keeps no state between runs, so a new
//! batch always starts from an empty table.
//!
//! ## Error model
//! Size violations return [`BatchError`]; analysis failures never escape the
//! runner. Export failures return [`ExportError`].

use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::string::FromUtf8Error;

use csv::{QuoteStyle, Terminator, WriterBuilder};
use phishguard_core::{AnalysisResult, BatchRow, MAX_BATCH_SIZE};
use thiserror::Error;
use tracing::{info, warn};

/// CSV header row.
pub const CSV_HEADER: [&str; 4] = ["URL", "Verdict", "Risk Probability", "Ensemble Confidence"];

/// Sequential batch runner.
#[derive(Debug, Clone, Copy, Default)]
pub struct BatchRunner;

impl BatchRunner {
    /// Creates a runner.
    pub fn new() -> Self {
        Self
    }

    /// Analyzes every URL in order and returns one row per URL.
    ///
    /// # Errors
    /// Returns [`BatchError`] when `urls` is empty or exceeds
    /// [`MAX_BATCH_SIZE`]; `analyze` is not called in that case.
    pub fn run<S, F, E>(&self, urls: &[S], analyze: F) -> Result<Vec<BatchRow>, BatchError>
    where
        S: AsRef<str>,
        F: FnMut(&str) -> Result<AnalysisResult, E>,
        E: Display,
    {
        self.run_with_progress(urls, analyze, |_, _| {})
    }

    /// Like [`BatchRunner::run`], also handing each row to `on_row` as soon as
    /// it is produced, together with its input index.
    ///
    /// # Errors
    /// Same as [`BatchRunner::run`].
    pub fn run_with_progress<S, F, E, P>(
        &self,
        urls: &[S],
        mut analyze: F,
        mut on_row: P,
    ) -> Result<Vec<BatchRow>, BatchError>
    where
        S: AsRef<str>,
        F: FnMut(&str) -> Result<AnalysisResult, E>,
        E: Display,
        P: FnMut(usize, &BatchRow),
    {
        check_batch_size(urls.len())?;
        info!(urls = urls.len(), "batch started");

        let mut rows = Vec::with_capacity(urls.len());
        for (index, url) in urls.iter().enumerate() {
            let url = url.as_ref();
            let row = match analyze(url) {
                Ok(result) => {
                    let mut row = BatchRow::from_result(&result);
                    row.url = url.to_string();
                    row
                }
                Err(error) => {
                    warn!(index, %error, "batch url failed");
                    BatchRow::error(url)
                }
            };
            on_row(index, &row);
            rows.push(row);
        }

        let failed = rows.iter().filter(|row| row.is_error()).count();
        info!(urls = rows.len(), failed, "batch finished");
        Ok(rows)
    }
}

/// Validates the number of URLs in a batch.
///
/// # Errors
/// Returns [`BatchError::Empty`] for zero URLs and [`BatchError::TooLarge`]
/// above [`MAX_BATCH_SIZE`].
pub fn check_batch_size(count: usize) -> Result<(), BatchError> {
    match count {
        0 => Err(BatchError::Empty),
        count if count > MAX_BATCH_SIZE => Err(BatchError::TooLarge {
            count,
            max: MAX_BATCH_SIZE,
        }),
        _ => Ok(()),
    }
}

/// Splits free-form batch input into URLs, one per line or whitespace run.
pub fn parse_batch_input(input: &str) -> Vec<String> {
    input.split_whitespace().map(str::to_string).collect()
}

/// Serializes rows into export CSV text.
///
/// The header is written bare; every row field is double-quoted.
///
/// # Errors
/// Returns [`ExportError`] when the CSV writer fails.
pub fn export_csv(rows: &[BatchRow]) -> Result<String, ExportError> {
    let mut out = Vec::new();

    {
        let mut header = WriterBuilder::new()
            .terminator(Terminator::Any(b'\n'))
            .from_writer(&mut out);
        header.write_record(CSV_HEADER)?;
        header.flush()?;
    }

    {
        let mut body = WriterBuilder::new()
            .quote_style(QuoteStyle::Always)
            .terminator(Terminator::Any(b'\n'))
            .from_writer(&mut out);
        for row in rows {
            body.write_record([
                row.url.as_str(),
                row.verdict.as_str(),
                row.risk_percent.as_str(),
                row.confidence_label.as_str(),
            ])?;
        }
        body.flush()?;
    }

    Ok(String::from_utf8(out)?)
}

/// Export file name for a batch exported at `now_ms`.
pub fn batch_csv_filename(now_ms: u64) -> String {
    format!("phishguard_batch_{now_ms}.csv")
}

/// Writes rows to `dir/phishguard_batch_<now_ms>.csv` and returns the path.
///
/// # Errors
/// Returns [`ExportError`] when encoding or writing fails.
pub fn write_batch_csv(dir: &Path, rows: &[BatchRow], now_ms: u64) -> Result<PathBuf, ExportError> {
    let text = export_csv(rows)?;
    let path = dir.join(batch_csv_filename(now_ms));
    std::fs::write(&path, text).map_err(|source| ExportError::Write {
        path: path.clone(),
        source,
    })?;
    info!(path = %path.display(), rows = rows.len(), "batch exported");
    Ok(path)
}

/// Batch input errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BatchError {
    /// No URLs were supplied.
    #[error("Please enter at least one URL.")]
    Empty,
    /// Too many URLs were supplied.
    #[error("Batch is limited to {max} URLs, got {count}.")]
    TooLarge {
        /// Supplied URL count.
        count: usize,
        /// Maximum accepted count.
        max: usize,
    },
}

/// CSV export errors.
#[derive(Debug, Error)]
pub enum ExportError {
    /// CSV encoding failure.
    #[error("csv encode failure: {0}")]
    Csv(#[from] csv::Error),
    /// Writer flush failure.
    #[error("csv flush failure: {0}")]
    Flush(#[from] std::io::Error),
    /// Encoded bytes were not UTF-8.
    #[error("csv is not utf-8: {0}")]
    Utf8(#[from] FromUtf8Error),
    /// Export file could not be written.
    #[error("cannot write {}: {source}", path.display())]
    Write {
        /// Target path.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },
}
