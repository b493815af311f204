// 📊 Reporting
// Filters and aggregates consumed by the dashboard and the `summary` command

use crate::model::{Category, TransactionRecord};
use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet};

// ============================================================================
// FILTER
// ============================================================================

/// Year and category filter. An empty list means "everything".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportFilter {
    pub years: Vec<i32>,
    pub categories: Vec<Category>,
}

impl ReportFilter {
    pub fn is_empty(&self) -> bool {
        self.years.is_empty() && self.categories.is_empty()
    }

    pub fn matches(&self, record: &TransactionRecord) -> bool {
        let year_ok = self.years.is_empty()
            || record.year().map(|y| self.years.contains(&y)).unwrap_or(false);
        let category_ok = self.categories.is_empty() || self.categories.contains(&record.category);

        year_ok && category_ok
    }

    pub fn apply(&self, records: &[TransactionRecord]) -> Vec<TransactionRecord> {
        records.iter().filter(|r| self.matches(r)).cloned().collect()
    }

    pub fn toggle_year(&mut self, year: i32) {
        toggle(&mut self.years, year);
    }

    pub fn toggle_category(&mut self, category: Category) {
        toggle(&mut self.categories, category);
    }
}

fn toggle<T: PartialEq>(items: &mut Vec<T>, item: T) {
    if let Some(pos) = items.iter().position(|i| *i == item) {
        items.remove(pos);
    } else {
        items.push(item);
    }
}

// ============================================================================
// AGGREGATES
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Summary {
    /// Sum of positive amounts
    pub income: f64,
    /// Sum of negative amounts (a negative number)
    pub expenses: f64,
    pub balance: f64,
    pub count: usize,
}

pub fn summarize<'a, I>(records: I) -> Summary
where
    I: IntoIterator<Item = &'a TransactionRecord>,
{
    let mut summary = Summary::default();

    for record in records {
        if record.is_income() {
            summary.income += record.amount;
        } else if record.is_expense() {
            summary.expenses += record.amount;
        }
        summary.balance += record.amount;
        summary.count += 1;
    }

    summary
}

/// Total amount per category, in category order, only categories present
pub fn totals_by_category<'a, I>(records: I) -> Vec<(Category, f64)>
where
    I: IntoIterator<Item = &'a TransactionRecord>,
{
    let mut totals: BTreeMap<Category, f64> = BTreeMap::new();
    for record in records {
        *totals.entry(record.category).or_insert(0.0) += record.amount;
    }
    totals.into_iter().collect()
}

/// Total amount per statement date, chronological.
///
/// Records whose period does not parse are left out.
pub fn totals_by_date<'a, I>(records: I) -> Vec<(NaiveDate, f64)>
where
    I: IntoIterator<Item = &'a TransactionRecord>,
{
    let mut totals: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for record in records {
        if let Some(date) = record.period_date() {
            *totals.entry(date).or_insert(0.0) += record.amount;
        }
    }
    totals.into_iter().collect()
}

/// Summary per statement period, chronological
pub fn totals_by_period<'a, I>(records: I) -> Vec<(String, Summary)>
where
    I: IntoIterator<Item = &'a TransactionRecord>,
{
    let mut groups: BTreeMap<(Option<NaiveDate>, String), Vec<&TransactionRecord>> = BTreeMap::new();
    for record in records {
        groups
            .entry((record.period_date(), record.period.clone()))
            .or_default()
            .push(record);
    }

    groups
        .into_iter()
        .map(|((_, period), group)| (period, summarize(group)))
        .collect()
}

/// Years present in the data, newest first
pub fn available_years(records: &[TransactionRecord]) -> Vec<i32> {
    let years: BTreeSet<i32> = records.iter().filter_map(|r| r.year()).collect();
    years.into_iter().rev().collect()
}

/// `R$ 1,234.56` / `R$ -1,234.56`
pub fn format_currency(value: f64) -> String {
    let cents = (value.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();

    let mut grouped = String::new();
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 && cents > 0 { "-" } else { "" };
    format!("R$ {}{}.{:02}", sign, grouped, cents % 100)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn record(period: &str, category: Category, amount: f64) -> TransactionRecord {
        TransactionRecord {
            period: period.to_string(),
            description: format!("{} {}", category, amount),
            category,
            document_reference: "-".to_string(),
            amount,
            merchant_location: String::new(),
        }
    }

    fn ledger() -> Vec<TransactionRecord> {
        vec![
            record("11/24", Category::Salary, 3500.0),
            record("11/24", Category::Pix, -120.0),
            record("12/24", Category::Card, -80.5),
            record("12/24", Category::Pix, 40.0),
            record("01/25", Category::Yield, 0.5),
            record("01/25", Category::Card, -19.5),
        ]
    }

    #[test]
    fn test_summary_totals() {
        let summary = summarize(&ledger());

        assert_eq!(summary.income, 3540.5);
        assert_eq!(summary.expenses, -220.0);
        assert_eq!(summary.balance, 3320.5);
        assert_eq!(summary.count, 6);
    }

    #[test]
    fn test_empty_summary() {
        let summary = summarize(&Vec::<TransactionRecord>::new());
        assert_eq!(summary, Summary::default());
    }

    #[test]
    fn test_filter_by_year() {
        let filter = ReportFilter {
            years: vec![2025],
            categories: vec![],
        };
        let filtered = filter.apply(&ledger());

        assert_eq!(filtered.len(), 2);
        assert!(filtered.iter().all(|r| r.period == "01/25"));
    }

    #[test]
    fn test_filter_by_year_and_category() {
        let filter = ReportFilter {
            years: vec![2024],
            categories: vec![Category::Pix],
        };
        let summary = summarize(&filter.apply(&ledger()));

        assert_eq!(summary.count, 2);
        assert_eq!(summary.balance, -80.0);
    }

    #[test]
    fn test_empty_filter_keeps_everything() {
        let filter = ReportFilter::default();
        assert!(filter.is_empty());
        assert_eq!(filter.apply(&ledger()).len(), 6);
    }

    #[test]
    fn test_toggle_filter_values() {
        let mut filter = ReportFilter::default();
        filter.toggle_category(Category::Card);
        filter.toggle_year(2024);
        assert_eq!(filter.categories, vec![Category::Card]);
        assert_eq!(filter.years, vec![2024]);

        filter.toggle_category(Category::Card);
        assert!(filter.categories.is_empty());
    }

    #[test]
    fn test_totals_by_category_in_priority_order() {
        let totals = totals_by_category(&ledger());

        assert_eq!(
            totals,
            vec![
                (Category::Pix, -80.0),
                (Category::Card, -100.0),
                (Category::Salary, 3500.0),
                (Category::Yield, 0.5),
            ]
        );
    }

    #[test]
    fn test_totals_by_date_chronological() {
        let totals = totals_by_date(&ledger());
        let date = |y, m| NaiveDate::from_ymd_opt(y, m, 1).unwrap();

        assert_eq!(
            totals,
            vec![(date(2024, 11), 3380.0), (date(2024, 12), -40.5), (date(2025, 1), -19.0)]
        );
    }

    #[test]
    fn test_totals_by_period() {
        let totals = totals_by_period(&ledger());
        let periods: Vec<&str> = totals.iter().map(|(p, _)| p.as_str()).collect();

        assert_eq!(periods, vec!["11/24", "12/24", "01/25"]);
        assert_eq!(totals[0].1.income, 3500.0);
        assert_eq!(totals[0].1.expenses, -120.0);
        assert_eq!(totals[2].1.count, 2);
    }

    #[test]
    fn test_available_years_newest_first() {
        assert_eq!(available_years(&ledger()), vec![2025, 2024]);
    }

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(1234.56), "R$ 1,234.56");
        assert_eq!(format_currency(-10.5), "R$ -10.50");
        assert_eq!(format_currency(0.0), "R$ 0.00");
        assert_eq!(format_currency(1234567.0), "R$ 1,234,567.00");
    }
}
