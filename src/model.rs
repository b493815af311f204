// 📒 Ledger Model
// Normalized transaction records and the aggregate dataset they live in

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

// ============================================================================
// CATEGORY
// ============================================================================

/// Fixed transaction category, inferred from description keywords.
///
/// Wire values are the lowercase labels used by the JSON dataset and the
/// `tipo` column; unknown labels read back as `Other`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Category {
    Pix,
    Card,
    Slip,
    Salary,
    Redemption,
    Yield,
    Transfer,
    #[default]
    Other,
}

impl Category {
    /// All categories, in keyword priority order
    pub const ALL: [Category; 8] = [
        Category::Pix,
        Category::Card,
        Category::Slip,
        Category::Salary,
        Category::Redemption,
        Category::Yield,
        Category::Transfer,
        Category::Other,
    ];

    /// Label used in the JSON dataset and the database
    pub fn label(&self) -> &'static str {
        match self {
            Category::Pix => "pix",
            Category::Card => "cartão",
            Category::Slip => "boleto",
            Category::Salary => "salário",
            Category::Redemption => "resgate",
            Category::Yield => "remuneração",
            Category::Transfer => "transferência",
            Category::Other => "outro",
        }
    }

    /// Parse a stored label. Accepts the unaccented spellings too.
    pub fn from_label(label: &str) -> Category {
        match label.trim().to_lowercase().as_str() {
            "pix" => Category::Pix,
            "cartão" | "cartao" => Category::Card,
            "boleto" => Category::Slip,
            "salário" | "salario" => Category::Salary,
            "resgate" => Category::Redemption,
            "remuneração" | "remuneracao" => Category::Yield,
            "transferência" | "transferencia" => Category::Transfer,
            _ => Category::Other,
        }
    }

    /// Yield credits never carry a merchant line
    pub fn takes_merchant_line(&self) -> bool {
        !matches!(self, Category::Yield)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl From<String> for Category {
    fn from(label: String) -> Self {
        Category::from_label(&label)
    }
}

impl From<Category> for String {
    fn from(category: Category) -> Self {
        category.label().to_string()
    }
}

// ============================================================================
// TRANSACTION RECORD
// ============================================================================

/// One statement line, normalized. Never mutated after the parser emits it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransactionRecord {
    /// `MM/YY` of the statement file, not of the line itself
    #[serde(rename = "mês/ano")]
    pub period: String,

    #[serde(rename = "descricao")]
    pub description: String,

    #[serde(rename = "tipo")]
    pub category: Category,

    /// Number printed next to the amount, or `-`
    #[serde(rename = "documento")]
    pub document_reference: String,

    #[serde(rename = "valor")]
    pub amount: f64,

    #[serde(rename = "Local")]
    pub merchant_location: String,
}

impl TransactionRecord {
    pub fn is_income(&self) -> bool {
        self.amount > 0.0
    }

    pub fn is_expense(&self) -> bool {
        self.amount < 0.0
    }

    /// First day of the statement month
    pub fn period_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&format!("01/{}", self.period), "%d/%m/%y").ok()
    }

    pub fn year(&self) -> Option<i32> {
        self.period_date().map(|d| d.year())
    }

    /// Hash for duplicate detection in the relational store.
    ///
    /// `position` is the record's ordinal among records of the same period,
    /// so two identical purchases in one month stay distinct rows.
    pub fn compute_idempotency_hash(&self, position: usize) -> String {
        let mut hasher = Sha256::new();
        hasher.update(format!(
            "{}|{}|{:.2}|{}",
            self.period, self.description, self.amount, position
        ));
        format!("{:x}", hasher.finalize())
    }
}

// ============================================================================
// DATASET
// ============================================================================

/// Aggregate output: `{"movimentacoes": [...]}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(rename = "movimentacoes", default)]
    pub records: Vec<TransactionRecord>,
}

impl Dataset {
    pub fn new(records: Vec<TransactionRecord>) -> Self {
        Dataset { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn extend(&mut self, records: Vec<TransactionRecord>) {
        self.records.extend(records);
    }

    /// Records paired with their ordinal inside their own period
    pub fn positioned(&self) -> Vec<(usize, &TransactionRecord)> {
        let mut seen: std::collections::HashMap<&str, usize> = std::collections::HashMap::new();
        self.records
            .iter()
            .map(|record| {
                let slot = seen.entry(record.period.as_str()).or_insert(0);
                let position = *slot;
                *slot += 1;
                (position, record)
            })
            .collect()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn record(period: &str, description: &str, amount: f64) -> TransactionRecord {
        TransactionRecord {
            period: period.to_string(),
            description: description.to_string(),
            category: Category::Card,
            document_reference: "594461".to_string(),
            amount,
            merchant_location: "12/12CANTINA".to_string(),
        }
    }

    #[test]
    fn test_record_serializes_with_dataset_field_names() {
        let json = serde_json::to_value(record("12/24", "COMPRACARTAODEBMC", -10.5)).unwrap();

        assert_eq!(json["mês/ano"], "12/24");
        assert_eq!(json["descricao"], "COMPRACARTAODEBMC");
        assert_eq!(json["tipo"], "cartão");
        assert_eq!(json["documento"], "594461");
        assert_eq!(json["valor"], -10.5);
        assert_eq!(json["Local"], "12/12CANTINA");
    }

    #[test]
    fn test_unknown_category_label_reads_as_other() {
        let json = r#"{"mês/ano":"01/25","descricao":"TARIFA","tipo":"tarifa","documento":"-","valor":-5.0,"Local":""}"#;
        let rec: TransactionRecord = serde_json::from_str(json).unwrap();
        assert_eq!(rec.category, Category::Other);
    }

    #[test]
    fn test_missing_fields_default() {
        let rec: TransactionRecord = serde_json::from_str(r#"{"descricao":"X"}"#).unwrap();
        assert_eq!(rec.description, "X");
        assert_eq!(rec.amount, 0.0);
        assert_eq!(rec.category, Category::Other);
    }

    #[test]
    fn test_category_labels_round_trip() {
        for category in Category::ALL {
            assert_eq!(Category::from_label(category.label()), category);
        }
        assert_eq!(Category::from_label("CARTAO"), Category::Card);
    }

    #[test]
    fn test_period_date_and_year() {
        let rec = record("12/24", "X", 1.0);
        assert_eq!(rec.period_date(), NaiveDate::from_ymd_opt(2024, 12, 1));
        assert_eq!(rec.year(), Some(2024));

        let bad = record("13/24", "X", 1.0);
        assert_eq!(bad.period_date(), None);
    }

    #[test]
    fn test_idempotency_hash_depends_on_position() {
        let rec = record("12/24", "PIX ENVIADO", -10.5);
        assert_eq!(rec.compute_idempotency_hash(0), rec.compute_idempotency_hash(0));
        assert_ne!(rec.compute_idempotency_hash(0), rec.compute_idempotency_hash(1));
    }

    #[test]
    fn test_positioned_counts_per_period() {
        let dataset = Dataset::new(vec![
            record("11/24", "A", 1.0),
            record("12/24", "B", 1.0),
            record("11/24", "C", 1.0),
        ]);
        let positions: Vec<usize> = dataset.positioned().iter().map(|(p, _)| *p).collect();
        assert_eq!(positions, vec![0, 0, 1]);
    }
}
