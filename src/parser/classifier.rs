// 🔎 Line Classifier
// Decides what a single line of extracted statement text is

use crate::error::StatementResult;
use regex::Regex;

/// Section header that ends the transaction listing for the whole document
pub const STOP_PHRASE: &str = "Saldos por Período";

/// Classification of one extracted line
#[derive(Debug, Clone, PartialEq)]
pub enum LineKind<'a> {
    /// End of the transaction section
    Stop,
    /// `DESCRIPTION  DOC  AMOUNT`
    Transaction(TransactionLine<'a>),
    /// `DD/MM` glued to a label, e.g. `12/12CANTINA`. Holds that first token only.
    Location(&'a str),
    Plain,
}

/// Fields captured from a transaction line, borrowed from the page text
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionLine<'a> {
    pub raw: &'a str,
    pub description: &'a str,
    pub document: &'a str,
    pub amount: &'a str,
}

pub struct LineClassifier {
    transaction: Regex,
    location: Regex,
}

impl LineClassifier {
    pub fn new() -> StatementResult<Self> {
        // e.g. "COMPRACARTAODEBMC 594461 10,50-"
        let transaction = Regex::new(concat!(
            r"^(?P<desc>.+?)\s+",
            r"(?P<doc>\d+|-)\s+",
            r"(?P<amount>-?\d{1,3}(?:\.\d{3})*,\d{2}-?)"
        ))?;

        // e.g. "12/12CANTINA", anything after the first whitespace is dropped
        let location = Regex::new(r"^(?P<place>\d{2}/\d{2}\S+)")?;

        Ok(LineClassifier { transaction, location })
    }

    /// Classify a line read at the top of the walk.
    ///
    /// Stop wins over everything, then transaction, then location.
    pub fn classify<'a>(&self, line: &'a str) -> LineKind<'a> {
        if is_stop(line) {
            return LineKind::Stop;
        }
        if let Some(tx) = self.match_transaction(line) {
            return LineKind::Transaction(tx);
        }
        if let Some(place) = self.match_location(line) {
            return LineKind::Location(place);
        }
        LineKind::Plain
    }

    /// Classify the line following a transaction.
    ///
    /// Same as [`classify`](Self::classify) except a location prefix is tried
    /// before the transaction pattern, so `12/12LOJA 1 5,00` counts as the
    /// merchant line of the previous record.
    pub fn classify_lookahead<'a>(&self, line: &'a str) -> LineKind<'a> {
        if is_stop(line) {
            return LineKind::Stop;
        }
        if let Some(place) = self.match_location(line) {
            return LineKind::Location(place);
        }
        match self.match_transaction(line) {
            Some(tx) => LineKind::Transaction(tx),
            None => LineKind::Plain,
        }
    }

    pub fn match_transaction<'a>(&self, line: &'a str) -> Option<TransactionLine<'a>> {
        let caps = self.transaction.captures(line)?;
        Some(TransactionLine {
            raw: line,
            description: caps.name("desc")?.as_str(),
            document: caps.name("doc")?.as_str(),
            amount: caps.name("amount")?.as_str(),
        })
    }

    /// The `DD/MM...` token at the start of the line, if any
    pub fn match_location<'a>(&self, line: &'a str) -> Option<&'a str> {
        let caps = self.location.captures(line)?;
        Some(caps.name("place")?.as_str())
    }
}

/// Phrase search over the whole line; leading/trailing text is irrelevant
pub fn is_stop(line: &str) -> bool {
    line.contains(STOP_PHRASE)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> LineClassifier {
        LineClassifier::new().unwrap()
    }

    #[test]
    fn test_transaction_line_fields() {
        let c = classifier();
        let tx = c.match_transaction("COMPRACARTAODEBMC 594461 10,50-").unwrap();

        assert_eq!(tx.description, "COMPRACARTAODEBMC");
        assert_eq!(tx.document, "594461");
        assert_eq!(tx.amount, "10,50-");
    }

    #[test]
    fn test_description_with_spaces_and_dash_document() {
        let c = classifier();
        let tx = c.match_transaction("PIX RECEBIDO JOAO DA SILVA - 1.234,56").unwrap();

        assert_eq!(tx.description, "PIX RECEBIDO JOAO DA SILVA");
        assert_eq!(tx.document, "-");
        assert_eq!(tx.amount, "1.234,56");
    }

    #[test]
    fn test_description_is_shortest_prefix_that_fits() {
        let c = classifier();
        // "123" can't be followed by an amount, so the description grows past it
        let tx = c.match_transaction("PAGAMENTO 123 CONTA LUZ 998877 89,90- 1.000,00").unwrap();

        assert_eq!(tx.description, "PAGAMENTO 123 CONTA LUZ");
        assert_eq!(tx.document, "998877");
        assert_eq!(tx.amount, "89,90-");
    }

    #[test]
    fn test_stop_phrase_anywhere_in_line() {
        let c = classifier();
        assert_eq!(c.classify("Saldos por Período"), LineKind::Stop);
        assert_eq!(c.classify("   xx Saldos por Período (R$) yy"), LineKind::Stop);
        assert_eq!(c.classify("saldos por período"), LineKind::Plain);
    }

    #[test]
    fn test_stop_wins_over_transaction_pattern() {
        let c = classifier();
        let line = "Saldos por Período 123 1.000,00";
        assert!(c.match_transaction(line).is_some());
        assert_eq!(c.classify(line), LineKind::Stop);
        assert_eq!(c.classify_lookahead(line), LineKind::Stop);
    }

    #[test]
    fn test_location_requires_glued_label() {
        let c = classifier();
        assert_eq!(c.classify("12/12CANTINA"), LineKind::Location("12/12CANTINA"));
        assert_eq!(c.classify("12/12 CANTINA"), LineKind::Plain);
        assert_eq!(c.classify("1/12CANTINA"), LineKind::Plain);
    }

    #[test]
    fn test_location_keeps_first_token_only() {
        let c = classifier();
        assert_eq!(
            c.classify_lookahead("05/01PADARIA CENTRAL SAO PAULO"),
            LineKind::Location("05/01PADARIA")
        );
        assert_eq!(c.match_location("  12/12CANTINA"), None);
    }

    #[test]
    fn test_lookahead_prefers_location() {
        let c = classifier();
        let line = "12/12LOJA 1 5,00";

        assert!(matches!(c.classify(line), LineKind::Transaction(_)));
        assert_eq!(c.classify_lookahead(line), LineKind::Location("12/12LOJA"));
    }

    #[test]
    fn test_plain_lines() {
        let c = classifier();
        assert_eq!(c.classify(""), LineKind::Plain);
        assert_eq!(c.classify("Extrato de Conta Corrente"), LineKind::Plain);
        assert_eq!(c.classify("SALDO ANTERIOR 1.000,00"), LineKind::Plain);
    }
}
