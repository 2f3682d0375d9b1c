//! Line-oriented scanner for POSIX-style shell scripts.
//!
//! Function bodies are delimited by brace-depth counting over whole lines,
//! starting with whatever follows the header on its own line.  Everything
//! else (exports, variables, sourced files) is matched one trimmed line at a
//! time.

use std::collections::{BTreeSet, HashSet};
use std::sync::LazyLock;

use regex::Regex;

use crate::indexer::assembler::assemble;
use crate::indexer::calls::ShellCallMatcher;
use crate::indexer::guards::ScanOptions;
use crate::models::{FileExtractionResult, SymbolRecord, ValueKind};

// ---------------------------------------------------------------------------
// Compiled regex patterns
// ---------------------------------------------------------------------------

/// `name() {`
static PAREN_STYLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\w+)\s*\(\)").unwrap());

/// `function name {` or `function name() {`
static KEYWORD_STYLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^function\s+(\w+)(?:\s*\(\))?").unwrap());

/// `$N` takes a single digit; wider positions need braces (`${10}`).
static POSITIONAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$(?:(\d)|\{(\d+)\})").unwrap());

static EXPORT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^export\s+([A-Z_][A-Z0-9_]*)(?:=(.*))?").unwrap());

static VARIABLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Z_][A-Z0-9_]*)=(.+)$").unwrap());

static QUOTED_SOURCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^(?:source|\.)\s+(?:'([^'"]+)'|"([^'"]+)")"#).unwrap()
});

static SUBSTITUTION_SOURCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:source|\.)\s+(\$\([^)]+\)\S*)").unwrap());

static BARE_SOURCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:source|\.)\s+(\S+)").unwrap());

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Name of the function declared on a trimmed line and the text after the
/// header.
fn function_header(stripped: &str) -> Option<(&str, &str)> {
    let caps = PAREN_STYLE_RE
        .captures(stripped)
        .or_else(|| KEYWORD_STYLE_RE.captures(stripped))?;
    let whole = caps.get(0)?;
    let name = caps.get(1)?;
    Some((name.as_str(), &stripped[whole.end()..]))
}

/// The header remainder followed by every later line.
fn body_segments<'a>(
    remainder: &'a str,
    lines: &'a [&'a str],
    next: usize,
) -> impl Iterator<Item = &'a str> + 'a {
    std::iter::once(remainder).chain(lines.iter().skip(next).copied())
}

/// `($1 ${2} ${3})` up to the highest positional parameter used in the
/// first `window` lines of the body.  Positions above `max_position` are
/// ignored.
fn positional_signature<'a>(
    segments: impl Iterator<Item = &'a str>,
    window: usize,
    max_position: usize,
) -> String {
    let mut positions = BTreeSet::new();
    let mut depth: i64 = 0;
    let mut in_body = false;
    for segment in segments.take(window) {
        let opens = segment.matches('{').count() as i64;
        if opens > 0 {
            depth += opens;
            in_body = true;
        }
        if in_body {
            positions.extend(
                POSITIONAL_RE
                    .captures_iter(segment)
                    .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)))
                    .filter_map(|digits| digits.as_str().parse::<usize>().ok())
                    .filter(|position| (1..=max_position).contains(position)),
            );
        }
        let closes = segment.matches('}').count() as i64;
        if closes > 0 {
            depth -= closes;
            if in_body && depth <= 0 {
                break;
            }
        }
    }

    let Some(&highest) = positions.iter().next_back() else {
        return "()".to_string();
    };
    let params: Vec<String> = (1..=highest)
        .map(|position| {
            if position == 1 {
                "$1".to_string()
            } else {
                format!("${{{position}}}")
            }
        })
        .collect();
    format!("({})", params.join(" "))
}

/// Lines from the opening brace to the matching close, unbounded.
fn function_body<'a>(segments: impl Iterator<Item = &'a str>) -> String {
    let mut body = Vec::new();
    let mut depth: i64 = 0;
    let mut in_body = false;
    for segment in segments {
        let opens = segment.matches('{').count() as i64;
        if opens > 0 {
            depth += opens;
            in_body = true;
        }
        if in_body {
            body.push(segment);
        }
        let closes = segment.matches('}').count() as i64;
        if closes > 0 {
            depth -= closes;
            if in_body && depth <= 0 {
                break;
            }
        }
    }
    body.join("\n")
}

/// Comment on the line directly above a header; shebangs don't count.
fn preceding_comment(lines: &[&str], index: usize) -> Option<String> {
    let previous = lines.get(index.checked_sub(1)?)?.trim();
    if previous.starts_with("#!") {
        return None;
    }
    let text = previous.strip_prefix('#')?.trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

fn sourced_path(stripped: &str) -> Option<&str> {
    if let Some(caps) = QUOTED_SOURCE_RE.captures(stripped) {
        return caps.get(1).or_else(|| caps.get(2)).map(|m| m.as_str().trim());
    }
    SUBSTITUTION_SOURCE_RE
        .captures(stripped)
        .or_else(|| BARE_SOURCE_RE.captures(stripped))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
}

fn push_unique(list: &mut Vec<String>, value: &str) {
    if !list.iter().any(|existing| existing == value) {
        list.push(value.to_string());
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Extract the structure of a shell script.
pub fn extract(source: &str, options: &ScanOptions) -> FileExtractionResult {
    let lines: Vec<&str> = source.lines().collect();
    let known: HashSet<String> = lines
        .iter()
        .filter_map(|line| function_header(line.trim()))
        .map(|(name, _)| name.to_string())
        .collect();
    let matcher = ShellCallMatcher::new(&known);
    let mut result = FileExtractionResult::default();

    for (index, line) in lines.iter().enumerate() {
        let stripped = line.trim();
        if stripped.is_empty() || stripped.starts_with('#') {
            continue;
        }

        if let Some((name, remainder)) = function_header(stripped) {
            let signature = positional_signature(
                body_segments(remainder, &lines, index + 1),
                options.shell_param_window,
                options.shell_max_positional,
            );
            let body = function_body(body_segments(remainder, &lines, index + 1));
            result.functions.insert(
                name.to_string(),
                SymbolRecord {
                    line: index + 1,
                    signature,
                    doc: preceding_comment(&lines, index),
                    decorators: Vec::new(),
                    calls: matcher.calls(&body, options),
                },
            );
            continue;
        }

        if let Some(caps) = EXPORT_RE.captures(stripped) {
            let value = caps.get(2).map_or("", |m| m.as_str().trim());
            if !value.is_empty() {
                result
                    .exports
                    .insert(caps[1].to_string(), ValueKind::infer(value));
            }
            continue;
        }

        if let Some(caps) = VARIABLE_RE.captures(stripped) {
            let name = &caps[1];
            if !result.exports.contains_key(name) {
                push_unique(&mut result.variables, name);
            }
            continue;
        }

        if let Some(path) = sourced_path(stripped) {
            if !path.is_empty() {
                push_unique(&mut result.sources, path);
            }
        }
    }

    assemble(result)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
