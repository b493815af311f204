// 📦 Batch Orchestrator
// Finds unprocessed statements, parses them, and folds them into the dataset

use crate::config::BatchConfig;
use crate::model::TransactionRecord;
use crate::parser::StatementParser;
use crate::pdf::TextSource;
use crate::snapshot::{load_dataset, save_dataset, ProcessedLedger};
use anyhow::{Context, Result};
use log::{debug, info};
use std::fs;
use std::path::{Path, PathBuf};

/// Per-file outcome of a batch
#[derive(Debug, Clone, PartialEq)]
pub struct FileSummary {
    pub file_name: String,
    pub period: String,
    pub records: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchReport {
    pub processed: Vec<FileSummary>,
    /// Already in the ledger
    pub skipped: Vec<String>,
    pub records_appended: usize,
    /// Dataset size after the run
    pub dataset_len: usize,
}

impl BatchReport {
    pub fn is_noop(&self) -> bool {
        self.processed.is_empty()
    }
}

/// Statement files in the intake directory, split into new and already-seen.
///
/// Only `.pdf` files count; the result is sorted by file name.
pub fn list_candidates(intake_dir: &Path, ledger: &ProcessedLedger) -> Result<(Vec<PathBuf>, Vec<String>)> {
    let entries = fs::read_dir(intake_dir)
        .with_context(|| format!("Failed to read intake directory: {}", intake_dir.display()))?;

    let mut candidates = Vec::new();
    let mut skipped = Vec::new();

    for entry in entries {
        let path = entry
            .with_context(|| format!("Failed to list {}", intake_dir.display()))?
            .path();

        if !path.is_file() || !is_pdf(&path) {
            debug!("ignoring {}", path.display());
            continue;
        }

        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
            debug!("ignoring non UTF-8 file name {}", path.display());
            continue;
        };

        if ledger.contains(file_name) {
            info!("{} already processed", file_name);
            skipped.push(file_name.to_string());
        } else {
            candidates.push(path);
        }
    }

    candidates.sort();
    skipped.sort();
    Ok((candidates, skipped))
}

fn is_pdf(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false)
}

/// Run one batch.
///
/// Every candidate must parse before anything is written: a single bad file
/// aborts the run and leaves the ledger and dataset untouched. With no new
/// files nothing is rewritten.
pub fn run_batch(config: &BatchConfig, parser: &dyn StatementParser, source: &dyn TextSource) -> Result<BatchReport> {
    let mut ledger = ProcessedLedger::load(&config.ledger_path);
    let (candidates, skipped) = list_candidates(&config.intake_dir, &ledger)?;

    let mut dataset = load_dataset(&config.dataset_path);

    if candidates.is_empty() {
        info!("No new statements in {}", config.intake_dir.display());
        return Ok(BatchReport {
            processed: Vec::new(),
            skipped,
            records_appended: 0,
            dataset_len: dataset.len(),
        });
    }

    let mut processed = Vec::with_capacity(candidates.len());
    let mut new_records: Vec<TransactionRecord> = Vec::new();

    for path in &candidates {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();

        info!("Analyzing {}...", file_name);
        let statement = parser
            .parse_file(path, source)
            .with_context(|| format!("Failed to parse statement {}", file_name))?;

        processed.push(FileSummary {
            file_name,
            period: statement.period,
            records: statement.records.len(),
        });
        new_records.extend(statement.records);
    }

    let records_appended = new_records.len();
    dataset.extend(new_records);
    ledger.merge(processed.iter().map(|f| f.file_name.clone()));

    // Dataset first: a crash in between re-parses files rather than losing records
    save_dataset(&config.dataset_path, &dataset)?;
    ledger.save(&config.ledger_path)?;

    Ok(BatchReport {
        processed,
        skipped,
        records_appended,
        dataset_len: dataset.len(),
    })
}

// ============================================================================
// TESTS
// ============================================================================
