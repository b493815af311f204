// ⚠️ Error Taxonomy
// Typed failures raised by the statement parser and the batch run

use std::path::PathBuf;

/// Errors that abort a statement (and therefore the batch)
#[derive(Debug, thiserror::Error)]
pub enum StatementError {
    /// File name does not start with a known month abbreviation + year digits
    #[error("Unknown period token in file name: {file_name}")]
    UnknownPeriodToken { file_name: String },

    /// Amount substring of a matched transaction line is not numeric after cleanup
    #[error("Malformed amount token {token:?} on line: {line}")]
    MalformedAmountToken { token: String, line: String },

    /// The PDF reader could not open or decode the file
    #[error("Failed to read PDF {path}: {reason}")]
    PdfRead { path: PathBuf, reason: String },

    /// The PDF opened fine but carries no selectable text
    #[error("No extractable text layer in {path}")]
    NoTextLayer { path: PathBuf },

    #[error("Invalid line pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Result type for parser operations
pub type StatementResult<T> = Result<T, StatementError>;
