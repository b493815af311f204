// 📄 PDF Text Layer
// Reads the selectable text of a statement as pages of lines

use crate::error::{StatementError, StatementResult};
use std::collections::HashMap;
use std::fs;
use std::panic;
use std::path::Path;

/// Anything that can hand back a statement as ordered pages of ordered lines
pub trait TextSource {
    fn read_pages(&self, path: &Path) -> StatementResult<Vec<Vec<String>>>;
}

/// Split page text on line breaks, as laid out by the extractor
pub fn split_lines(page_text: &str) -> Vec<String> {
    page_text.lines().map(str::to_string).collect()
}

fn has_text(pages: &[Vec<String>]) -> bool {
    pages
        .iter()
        .any(|page| page.iter().any(|line| !line.trim().is_empty()))
}

// ============================================================================
// PDF READER
// ============================================================================

/// Text-layer reader backed by `pdf-extract`
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfTextReader;

impl PdfTextReader {
    pub fn new() -> Self {
        PdfTextReader
    }
}

impl TextSource for PdfTextReader {
    fn read_pages(&self, path: &Path) -> StatementResult<Vec<Vec<String>>> {
        let bytes = fs::read(path).map_err(|e| StatementError::PdfRead {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        // pdf-extract panics on some malformed documents
        let extracted = panic::catch_unwind(|| pdf_extract::extract_text_from_mem_by_pages(&bytes))
            .map_err(|_| StatementError::PdfRead {
                path: path.to_path_buf(),
                reason: "text extractor panicked".to_string(),
            })?
            .map_err(|e| StatementError::PdfRead {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        let pages: Vec<Vec<String>> = extracted.iter().map(|text| split_lines(text)).collect();

        if !has_text(&pages) {
            return Err(StatementError::NoTextLayer {
                path: path.to_path_buf(),
            });
        }

        Ok(pages)
    }
}

// ============================================================================
// IN-MEMORY SOURCE
// ============================================================================

/// Pre-extracted statements keyed by file name.
///
/// Handy when the text already exists (fixtures, other extractors).
#[derive(Debug, Default, Clone)]
pub struct MemoryTextSource {
    documents: HashMap<String, Vec<Vec<String>>>,
}

impl MemoryTextSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, file_name: &str, pages: Vec<Vec<String>>) {
        self.documents.insert(file_name.to_string(), pages);
    }

    /// Register a document from raw page texts
    pub fn insert_text(&mut self, file_name: &str, page_texts: &[&str]) {
        let pages = page_texts.iter().map(|text| split_lines(text)).collect();
        self.insert(file_name, pages);
    }
}

impl TextSource for MemoryTextSource {
    fn read_pages(&self, path: &Path) -> StatementResult<Vec<Vec<String>>> {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default();

        let pages = self
            .documents
            .get(file_name)
            .cloned()
            .ok_or_else(|| StatementError::PdfRead {
                path: path.to_path_buf(),
                reason: "no such document".to_string(),
            })?;

        if !has_text(&pages) {
            return Err(StatementError::NoTextLayer {
                path: path.to_path_buf(),
            });
        }

        Ok(pages)
    }
}
