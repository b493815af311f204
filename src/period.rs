// 🗓️ Statement Period
// Derives the `MM/YY` period of a statement from its file name (e.g. `dez24.pdf`)

use crate::error::{StatementError, StatementResult};
use std::path::Path;

/// Month abbreviations as printed in statement file names
const MONTHS: [(&str, &str); 12] = [
    ("jan", "01"),
    ("fev", "02"),
    ("mar", "03"),
    ("abr", "04"),
    ("mai", "05"),
    ("jun", "06"),
    ("jul", "07"),
    ("ago", "08"),
    ("set", "09"),
    ("out", "10"),
    ("nov", "11"),
    ("dez", "12"),
];

/// Look up a 3-letter month abbreviation, case-insensitively
pub fn month_number(abbreviation: &str) -> Option<&'static str> {
    let lower = abbreviation.to_lowercase();
    MONTHS
        .iter()
        .find(|(name, _)| *name == lower)
        .map(|(_, number)| *number)
}

/// Convert a file stem like `dez24` into `12/24`
pub fn period_from_stem(stem: &str) -> Option<String> {
    let month = stem.get(..3).and_then(month_number)?;
    let year = &stem[3..];

    if year.is_empty() || !year.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    Some(format!("{}/{}", month, year))
}

/// Derive the period of a statement file.
///
/// # Examples
/// ```
/// use statement_ledger::period::period_from_file_name;
/// assert_eq!(period_from_file_name("dez24.pdf").unwrap(), "12/24");
/// ```
pub fn period_from_file_name(file_name: &str) -> StatementResult<String> {
    let stem = Path::new(file_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(file_name);

    period_from_stem(stem).ok_or_else(|| StatementError::UnknownPeriodToken {
        file_name: file_name.to_string(),
    })
}
