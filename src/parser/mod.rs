// 🏗️ Statement Parser
// Line classifier + transaction builder + document walker, behind one trait

pub mod builder;
pub mod classifier;
pub mod walker;

use crate::error::StatementResult;
use crate::model::TransactionRecord;
use crate::pdf::TextSource;
use crate::period::period_from_file_name;
use log::info;
use std::path::Path;

pub use builder::{infer_category, parse_amount, BuiltTransaction, TransactionBuilder};
pub use classifier::{is_stop, LineClassifier, LineKind, TransactionLine, STOP_PHRASE};
pub use walker::{DocumentWalker, LineSource, PageOutcome};

// ============================================================================
// PARSER TRAIT
// ============================================================================

/// Records of one statement file and the period they were stamped with
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedStatement {
    pub period: String,
    pub records: Vec<TransactionRecord>,
}

/// Turns the text layer of one statement into transaction records
pub trait StatementParser {
    /// Parse already-extracted pages, starting at `start_page`
    fn parse_pages(
        &self,
        pages: &[Vec<String>],
        start_page: usize,
        period: &str,
    ) -> StatementResult<Vec<TransactionRecord>>;

    /// Get parser version (for provenance in logs)
    fn version(&self) -> &str {
        "1.0.0"
    }

    /// Read a statement file through `source` and parse it from page 0.
    ///
    /// The period comes from the file name, e.g. `dez24.pdf` → `12/24`.
    fn parse_file(&self, path: &Path, source: &dyn TextSource) -> StatementResult<ParsedStatement> {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default();

        let period = period_from_file_name(file_name)?;
        let pages = source.read_pages(path)?;
        let records = self.parse_pages(&pages, 0, &period)?;

        info!(
            "{}: {} pages, {} transactions (period {}, parser v{})",
            file_name,
            pages.len(),
            records.len(),
            period,
            self.version()
        );

        Ok(ParsedStatement { period, records })
    }
}

// ============================================================================
// SANTANDER CHECKING ACCOUNT
// ============================================================================

/// Parser for Santander checking-account statement exports
pub struct SantanderParser {
    classifier: LineClassifier,
}

impl SantanderParser {
    pub fn new() -> StatementResult<Self> {
        Ok(SantanderParser {
            classifier: LineClassifier::new()?,
        })
    }
}

impl StatementParser for SantanderParser {
    fn parse_pages(
        &self,
        pages: &[Vec<String>],
        start_page: usize,
        period: &str,
    ) -> StatementResult<Vec<TransactionRecord>> {
        DocumentWalker::new(&self.classifier).walk(pages, start_page, period)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StatementError;
    use crate::model::Category;
    use crate::pdf::MemoryTextSource;

    fn statement() -> Vec<Vec<String>> {
        vec![
            vec![
                "Extrato Consolidado Inteligente".to_string(),
                "Conta Corrente".to_string(),
                "COMPRACARTAODEBMC 594461 10,50-".to_string(),
                "12/12CANTINA".to_string(),
                "CREDITO DE SALARIO - 3.500,00".to_string(),
                "EMPRESA XYZ LTDA".to_string(),
            ],
            vec![
                "REMUNERACAO APLICACAO AUTOMATICA - 0,42".to_string(),
                "APLICACAO".to_string(),
                "Saldos por Período".to_string(),
                "PIX ENVIADO 1 99,00-".to_string(),
            ],
        ]
    }

    #[test]
    fn test_parse_file_uses_period_from_name() {
        let parser = SantanderParser::new().unwrap();
        let mut source = MemoryTextSource::new();
        source.insert("dez24.pdf", statement());

        let statement = parser.parse_file(Path::new("intake/dez24.pdf"), &source).unwrap();
        let records = &statement.records;

        assert_eq!(statement.period, "12/24");
        assert_eq!(records.len(), 3);
        assert!(records.iter().all(|r| r.period == "12/24"));

        assert_eq!(records[0].category, Category::Card);
        assert_eq!(records[0].amount, -10.50);
        assert_eq!(records[0].merchant_location, "12/12CANTINA");

        assert_eq!(records[1].category, Category::Salary);
        assert_eq!(records[1].document_reference, "-");
        assert_eq!(records[1].amount, 3500.0);
        assert_eq!(records[1].merchant_location, "EMPRESA XYZ LTDA");

        assert_eq!(records[2].category, Category::Yield);
        assert_eq!(records[2].merchant_location, "");
    }

    #[test]
    fn test_parse_file_rejects_unknown_month() {
        let parser = SantanderParser::new().unwrap();
        let mut source = MemoryTextSource::new();
        source.insert("xyz24.pdf", statement());

        let err = parser.parse_file(Path::new("xyz24.pdf"), &source).unwrap_err();
        assert!(matches!(err, StatementError::UnknownPeriodToken { .. }));
    }
}
