// 🚶 Page/Document Walker
// Drives the classifier and builder over a statement, page by page

use super::builder::TransactionBuilder;
use super::classifier::{LineClassifier, LineKind, TransactionLine};
use crate::error::StatementResult;
use crate::model::TransactionRecord;
use log::debug;

// ============================================================================
// LINE SOURCE
// ============================================================================

/// Pull-based line reader with one line of pushback
pub struct LineSource<'a> {
    lines: std::slice::Iter<'a, String>,
    pushed_back: Option<&'a str>,
}

impl<'a> LineSource<'a> {
    pub fn new(lines: &'a [String]) -> Self {
        LineSource {
            lines: lines.iter(),
            pushed_back: None,
        }
    }

    pub fn pull(&mut self) -> Option<&'a str> {
        self.pushed_back
            .take()
            .or_else(|| self.lines.next().map(String::as_str))
    }

    /// Return a line so the next `pull` yields it again
    pub fn push_back(&mut self, line: &'a str) {
        debug_assert!(self.pushed_back.is_none(), "only one line of pushback");
        self.pushed_back = Some(line);
    }
}

// ============================================================================
// WALKER
// ============================================================================

/// How a page walk ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageOutcome {
    /// Ran out of lines; keep going with the next page
    Exhausted,
    /// Hit the stop marker; the rest of the document is skipped
    Stopped,
}

enum WalkState<'a> {
    ExpectLine,
    ExpectLookahead(TransactionLine<'a>),
}

pub struct DocumentWalker<'c> {
    classifier: &'c LineClassifier,
}

impl<'c> DocumentWalker<'c> {
    pub fn new(classifier: &'c LineClassifier) -> Self {
        DocumentWalker { classifier }
    }

    /// Records of a whole document, starting at `start_page`.
    ///
    /// A start page past the end simply yields nothing.
    pub fn walk(
        &self,
        pages: &[Vec<String>],
        start_page: usize,
        period: &str,
    ) -> StatementResult<Vec<TransactionRecord>> {
        let mut records = Vec::new();

        for (index, page) in pages.iter().enumerate().skip(start_page) {
            if self.walk_page(page, period, &mut records)? == PageOutcome::Stopped {
                debug!("stop marker on page {}, skipping remaining pages", index);
                break;
            }
        }

        Ok(records)
    }

    /// Walk one page, appending its records to `out`
    pub fn walk_page(
        &self,
        lines: &[String],
        period: &str,
        out: &mut Vec<TransactionRecord>,
    ) -> StatementResult<PageOutcome> {
        let builder = TransactionBuilder::new(period);
        let mut source = LineSource::new(lines);
        let mut state = WalkState::ExpectLine;

        loop {
            state = match state {
                WalkState::ExpectLine => {
                    let Some(line) = source.pull() else {
                        return Ok(PageOutcome::Exhausted);
                    };

                    match self.classifier.classify(line) {
                        LineKind::Stop => return Ok(PageOutcome::Stopped),
                        LineKind::Transaction(tx) => WalkState::ExpectLookahead(tx),
                        LineKind::Location(_) | LineKind::Plain => WalkState::ExpectLine,
                    }
                }

                WalkState::ExpectLookahead(tx) => {
                    let next = source.pull();
                    let kind = next.map(|line| self.classifier.classify_lookahead(line));

                    let built = builder.build(&tx, next.zip(kind.as_ref()))?;

                    if !built.consumed_next {
                        if let Some(line) = next {
                            source.push_back(line);
                        }
                    }

                    debug!(
                        "{} | {} | {:.2} | consumed_next={}",
                        built.record.category,
                        built.record.description,
                        built.record.amount,
                        built.consumed_next
                    );
                    out.push(built.record);

                    WalkState::ExpectLine
                }
            };
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
