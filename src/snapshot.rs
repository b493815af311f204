// 💾 JSON Snapshots
// Processed-file ledger and aggregate dataset, persisted between runs

use crate::model::Dataset;
use anyhow::{Context, Result};
use log::warn;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

// ============================================================================
// HELPERS
// ============================================================================

/// Read a JSON file, falling back to the default when it is missing or corrupt
pub fn read_json_or_default<T: DeserializeOwned + Default>(path: &Path) -> T {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => return T::default(),
        Err(e) => {
            warn!("Could not read {}: {}; starting empty", path.display(), e);
            return T::default();
        }
    };

    match serde_json::from_str(&content) {
        Ok(value) => value,
        Err(e) => {
            warn!("Corrupt JSON in {}: {}; starting empty", path.display(), e);
            T::default()
        }
    }
}

/// Pretty-print to a sibling temp file, then rename over the target
pub fn write_json_pretty<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let mut json = serde_json::to_string_pretty(value)
        .with_context(|| format!("Failed to serialize {}", path.display()))?;
    json.push('\n');

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");

    fs::write(&tmp, json).with_context(|| format!("Failed to write {:?}", tmp))?;
    fs::rename(&tmp, path).with_context(|| format!("Failed to replace {}", path.display()))?;

    Ok(())
}

// ============================================================================
// PROCESSED-FILE LEDGER
// ============================================================================

/// Source files already folded into the dataset. Append-only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessedLedger {
    #[serde(rename = "analisados", default)]
    files: BTreeSet<String>,
}

impl ProcessedLedger {
    /// Missing or corrupt ledger reads as empty
    pub fn load(path: &Path) -> Self {
        read_json_or_default(path)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        write_json_pretty(path, self)
    }

    pub fn contains(&self, file_name: &str) -> bool {
        self.files.contains(file_name)
    }

    pub fn merge<I, S>(&mut self, file_names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.files.extend(file_names.into_iter().map(Into::into));
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Sorted file names
    pub fn files(&self) -> impl Iterator<Item = &str> {
        self.files.iter().map(String::as_str)
    }
}

// ============================================================================
// DATASET
// ============================================================================

/// Missing or corrupt dataset reads as empty
pub fn load_dataset(path: &Path) -> Dataset {
    read_json_or_default(path)
}

/// Like [`load_dataset`] but a missing/corrupt file is an error
pub fn load_dataset_strict(path: &Path) -> Result<Dataset> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read dataset: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse dataset JSON: {}", path.display()))
}

pub fn save_dataset(path: &Path, dataset: &Dataset) -> Result<()> {
    write_json_pretty(path, dataset)
}

// ============================================================================
// TESTS
// ============================================================================
