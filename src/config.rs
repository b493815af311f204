// ⚙️ Batch Configuration
// Where statements come from and where results go

use std::path::{Path, PathBuf};

pub const DEFAULT_INTAKE_DIR: &str = "pdf_originais";
pub const DEFAULT_LEDGER_FILE: &str = "arquivos_analisados.json";
pub const DEFAULT_DATASET_FILE: &str = "extrato.json";
pub const DEFAULT_DATABASE_FILE: &str = "extrato.db";

/// Explicit paths for one batch run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchConfig {
    /// Directory holding `<mmm><yy>.pdf` statements
    pub intake_dir: PathBuf,
    /// Processed-file ledger (`{"analisados": [...]}`)
    pub ledger_path: PathBuf,
    /// Aggregate dataset (`{"movimentacoes": [...]}`)
    pub dataset_path: PathBuf,
    /// SQLite database the dataset is loaded into
    pub database_path: PathBuf,
}

impl BatchConfig {
    /// Default file names, all relative to `root`
    pub fn rooted_at<P: AsRef<Path>>(root: P) -> Self {
        let root = root.as_ref();
        BatchConfig {
            intake_dir: root.join(DEFAULT_INTAKE_DIR),
            ledger_path: root.join(DEFAULT_LEDGER_FILE),
            dataset_path: root.join(DEFAULT_DATASET_FILE),
            database_path: root.join(DEFAULT_DATABASE_FILE),
        }
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        BatchConfig {
            intake_dir: PathBuf::from(DEFAULT_INTAKE_DIR),
            ledger_path: PathBuf::from(DEFAULT_LEDGER_FILE),
            dataset_path: PathBuf::from(DEFAULT_DATASET_FILE),
            database_path: PathBuf::from(DEFAULT_DATABASE_FILE),
        }
    }
}
