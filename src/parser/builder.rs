// 🧱 Transaction Builder
// Turns a matched transaction line (plus its lookahead) into a TransactionRecord

use super::classifier::{LineKind, TransactionLine};
use crate::error::{StatementError, StatementResult};
use crate::model::{Category, TransactionRecord};

// ============================================================================
// CATEGORY INFERENCE
// ============================================================================

/// Keyword table, checked top to bottom. First hit wins.
///
/// Order matters: "CRÉDITO DE SALARIO PIX" is a pix, not a salary.
const CATEGORY_KEYWORDS: &[(&[&str], Category)] = &[
    (&["PIX"], Category::Pix),
    (&["CARTAO", "CARTÃO"], Category::Card),
    (&["BOLETO"], Category::Slip),
    (&["SALARIO"], Category::Salary),
    (&["RESG"], Category::Redemption),
    (&["REMUNERA"], Category::Yield),
    (&["TRANSFERENCIA"], Category::Transfer),
];

pub fn infer_category(description: &str) -> Category {
    let upper = description.to_uppercase();

    CATEGORY_KEYWORDS
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| upper.contains(k)))
        .map(|(_, category)| *category)
        .unwrap_or(Category::Other)
}

// ============================================================================
// AMOUNT PARSING
// ============================================================================

/// Normalize a printed amount (`1.234,56-`) into canonical form (`-1234.56`).
///
/// Returns `None` when the cleaned token is not a plain decimal number.
pub fn parse_amount(token: &str) -> Option<f64> {
    let mut cleaned = token.trim().replace('.', "").replace(',', ".");

    if let Some(unsigned) = cleaned.strip_suffix('-') {
        cleaned = format!("-{}", unsigned);
    }

    let digits = cleaned.strip_prefix('-').unwrap_or(&cleaned);
    let well_formed = !digits.is_empty()
        && digits.chars().all(|c| c.is_ascii_digit() || c == '.')
        && digits.matches('.').count() <= 1
        && !digits.starts_with('.')
        && !digits.ends_with('.');

    if !well_formed {
        return None;
    }

    cleaned.parse::<f64>().ok()
}

// ============================================================================
// BUILDER
// ============================================================================

/// A finished record and whether the lookahead line went into it
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltTransaction {
    pub record: TransactionRecord,
    pub consumed_next: bool,
}

pub struct TransactionBuilder<'p> {
    period: &'p str,
}

impl<'p> TransactionBuilder<'p> {
    pub fn new(period: &'p str) -> Self {
        TransactionBuilder { period }
    }

    /// Assemble one record.
    ///
    /// `next` is the following line on the same page with its lookahead
    /// classification, or `None` at the end of the page.
    pub fn build(
        &self,
        line: &TransactionLine<'_>,
        next: Option<(&str, &LineKind<'_>)>,
    ) -> StatementResult<BuiltTransaction> {
        let description = line.description.trim();
        let category = infer_category(description);

        let amount = parse_amount(line.amount).ok_or_else(|| StatementError::MalformedAmountToken {
            token: line.amount.to_string(),
            line: line.raw.to_string(),
        })?;

        let (merchant_location, consumed_next) = resolve_merchant(category, next);

        Ok(BuiltTransaction {
            record: TransactionRecord {
                period: self.period.to_string(),
                description: description.to_string(),
                category,
                document_reference: line.document.to_string(),
                amount,
                merchant_location,
            },
            consumed_next,
        })
    }
}

/// Decide what the lookahead line means for this record
fn resolve_merchant(category: Category, next: Option<(&str, &LineKind<'_>)>) -> (String, bool) {
    match next {
        None => (String::new(), false),
        // The walker must still see the stop marker
        Some((_, LineKind::Stop)) => (String::new(), false),
        // Yield credits swallow the next line unread
        Some(_) if !category.takes_merchant_line() => (String::new(), true),
        Some((_, LineKind::Location(place))) => (place.to_string(), true),
        // Next record starts here
        Some((_, LineKind::Transaction(_))) => (String::new(), false),
        Some((text, LineKind::Plain)) => (text.to_string(), true),
    }
}

// ============================================================================
// TESTS
// ============================================================================
