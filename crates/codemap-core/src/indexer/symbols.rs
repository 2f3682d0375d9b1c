//! Symbol extraction entry point and text helpers shared by the scanners.
//!
//! Python is scanned line by line with indentation bookkeeping, JavaScript
//! and TypeScript by regex over the whole text with brace-depth counting, and
//! shell scripts line by line with brace-depth counting for function bodies.
//! None of the scanners builds a syntax tree.

use crate::indexer::guards::ScanOptions;
use crate::indexer::{javascript, python, shell};
use crate::models::{FileExtractionResult, Language};

// ---------------------------------------------------------------------------
// Helper functions
// ---------------------------------------------------------------------------

/// Collapse every whitespace run (newlines included) into a single space.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Normalize a type name: collapse whitespace and trim trailing semicolons.
/// Returns `None` if the result is empty or the input is `None`.
pub fn normalize_type_name(type_name: Option<&str>) -> Option<String> {
    let raw = type_name?;
    let normalized = collapse_whitespace(raw.trim().trim_end_matches(';'));
    if normalized.is_empty() {
        None
    } else {
        Some(normalized)
    }
}

/// Split on `separator` only where no bracket is open, trimming each part
/// and dropping empty ones.  `Dict[str, int], Base` yields two parts.
pub fn split_top_level(text: &str, separator: char) -> Vec<String> {
    let mut parts = Vec::new();
    let mut depth: usize = 0;
    let mut current = String::new();
    for ch in text.chars() {
        match ch {
            '(' | '[' | '{' | '<' => depth += 1,
            ')' | ']' | '}' | '>' => depth = depth.saturating_sub(1),
            _ => {}
        }
        if ch == separator && depth == 0 {
            parts.push(current.trim().to_string());
            current.clear();
        } else {
            current.push(ch);
        }
    }
    parts.push(current.trim().to_string());
    parts.retain(|part| !part.is_empty());
    parts
}

/// Find the `}` matching the `{` at byte offset `open`.
///
/// Counts brace depth starting at `open` and stops when it returns to zero.
/// At most `limit` bytes after the opening brace are inspected; `None` means
/// no match within that window (or `open` is not a `{`).
pub fn matching_brace(text: &str, open: usize, limit: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    if bytes.get(open) != Some(&b'{') {
        return None;
    }
    let end = bytes.len().min(open.saturating_add(1).saturating_add(limit));
    let mut depth: usize = 1;
    for (pos, byte) in bytes.iter().enumerate().take(end).skip(open + 1) {
        match byte {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(pos);
                }
            }
            _ => {}
        }
    }
    None
}

/// Byte offset → 1-based line number lookup.
pub struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let mut starts = vec![0];
        starts.extend(
            text.bytes()
                .enumerate()
                .filter(|(_, b)| *b == b'\n')
                .map(|(pos, _)| pos + 1),
        );
        Self { starts }
    }

    pub fn line_of(&self, pos: usize) -> usize {
        match self.starts.binary_search(&pos) {
            Ok(index) => index + 1,
            Err(index) => index,
        }
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Extract the declared structure of one source file with default options.
pub fn extract_symbols(source: &str, language: Language) -> FileExtractionResult {
    extract_symbols_with_options(source, language, &ScanOptions::default())
}

/// Extract the declared structure of one source file.
///
/// Dispatches to the scanner for the language's family.  The result already
/// carries per-symbol `calls`; build a call graph from it with
/// [`crate::indexer::callgraph::CallGraph::build`].
pub fn extract_symbols_with_options(
    source: &str,
    language: Language,
    options: &ScanOptions,
) -> FileExtractionResult {
    match language {
        Language::Python => python::extract(source, options),
        Language::JavaScript | Language::TypeScript => javascript::extract(source, options),
        Language::Shell => shell::extract(source, options),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
