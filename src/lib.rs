// Statement Ledger - Core Library
// Exposes all modules for use in the CLI, the dashboard, and tests

pub mod error;
pub mod model;
pub mod period;
pub mod parser;
pub mod pdf;
pub mod config;
pub mod snapshot;
pub mod batch;
pub mod db;
pub mod report;

// Re-export commonly used types
pub use error::{StatementError, StatementResult};
pub use model::{Category, Dataset, TransactionRecord};
pub use period::{period_from_file_name, period_from_stem};
pub use parser::{
    DocumentWalker, LineClassifier, LineKind, ParsedStatement, SantanderParser, StatementParser,
    TransactionBuilder, TransactionLine,
};
pub use pdf::{MemoryTextSource, PdfTextReader, TextSource};
pub use config::BatchConfig;
pub use snapshot::{load_dataset, load_dataset_strict, save_dataset, ProcessedLedger};
pub use batch::{list_candidates, run_batch, BatchReport, FileSummary};
pub use db::{
    get_all_records, get_period_stats, insert_records, load_dataset_into_db, open_database,
    setup_database, verify_count, InsertStats, PeriodStat,
};
pub use report::{ReportFilter, Summary};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
