//! Call-reference extraction from function bodies.
//!
//! Given a body and the set of names declared in the file, report which of
//! those names the body appears to invoke.  Two patterns are unioned for the
//! parenthesized languages: bare `name(` calls and receiver calls
//! `recv.name(`.  Shell has no call syntax, so a known name in command
//! position counts as a call; false positives are accepted.

use std::collections::{BTreeSet, HashSet};
use std::sync::LazyLock;

use regex::Regex;

use crate::indexer::guards::ScanOptions;

/// Python names that look like calls but are never reported.
pub const PYTHON_CALL_EXCLUSIONS: &[&str] = &[
    "if", "elif", "while", "for", "with", "except", "def", "class", "return", "yield", "raise",
    "assert", "print", "len", "str", "int", "float", "bool", "list", "dict", "set", "tuple",
    "type", "isinstance", "issubclass", "super", "range", "enumerate", "zip", "map", "filter",
    "sorted", "reversed", "open", "input", "eval", "not", "and", "or", "in", "lambda", "await",
];

/// JavaScript/TypeScript keywords and platform globals never reported.
pub const JAVASCRIPT_CALL_EXCLUSIONS: &[&str] = &[
    "if", "while", "for", "switch", "catch", "function", "class", "return", "throw", "new",
    "typeof", "instanceof", "void", "console", "Array", "Object", "String", "Number", "Boolean",
    "Promise", "Math", "Date", "JSON", "parseInt", "parseFloat", "super", "await", "require",
    "import",
];

/// Shell reserved words and common builtins never reported.
pub const SHELL_CALL_EXCLUSIONS: &[&str] = &[
    "if", "then", "else", "elif", "fi", "for", "in", "while", "until", "do", "done", "case",
    "esac", "function", "return", "local", "export", "source", "echo", "printf", "exit", "shift",
    "set", "unset", "read", "test", "true", "false", "eval", "exec", "cd",
];

static BARE_CALL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\w+)\s*\(").unwrap());

static RECEIVER_CALL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\w\)\]]\s*\.\s*(\w+)\s*\(").unwrap());

fn is_reportable(
    name: &str,
    known: &HashSet<String>,
    exclusions: &[&str],
    options: &ScanOptions,
) -> bool {
    known.contains(name) && !exclusions.contains(&name) && !options.is_excluded_call(name)
}

fn parenthesized_calls(
    body: &str,
    known: &HashSet<String>,
    exclusions: &[&str],
    options: &ScanOptions,
) -> Vec<String> {
    if body.is_empty() || known.is_empty() {
        return Vec::new();
    }
    let mut calls = BTreeSet::new();
    let candidates = BARE_CALL_RE
        .captures_iter(body)
        .chain(RECEIVER_CALL_RE.captures_iter(body));
    for caps in candidates {
        let name = &caps[1];
        if is_reportable(name, known, exclusions, options) {
            calls.insert(name.to_string());
        }
    }
    calls.into_iter().collect()
}

/// Calls made from a Python body.
pub fn python_calls(body: &str, known: &HashSet<String>, options: &ScanOptions) -> Vec<String> {
    parenthesized_calls(body, known, PYTHON_CALL_EXCLUSIONS, options)
}

/// Calls made from a JavaScript or TypeScript body.
pub fn javascript_calls(
    body: &str,
    known: &HashSet<String>,
    options: &ScanOptions,
) -> Vec<String> {
    parenthesized_calls(body, known, JAVASCRIPT_CALL_EXCLUSIONS, options)
}

// ---------------------------------------------------------------------------
// Shell
// ---------------------------------------------------------------------------

/// Matches known shell function names in command position.
///
/// Compiled once per file from the known-symbol set so that each function
/// body is scanned with a single regex.
pub struct ShellCallMatcher {
    pattern: Option<Regex>,
}

impl ShellCallMatcher {
    pub fn new(known: &HashSet<String>) -> Self {
        let mut names: Vec<&str> = known
            .iter()
            .map(String::as_str)
            .filter(|name| !SHELL_CALL_EXCLUSIONS.contains(name))
            .collect();
        if names.is_empty() {
            return Self { pattern: None };
        }
        names.sort_unstable();
        let alternation = names
            .iter()
            .map(|name| regex::escape(name))
            .collect::<Vec<_>>()
            .join("|");
        let source = format!(r"(?m)(?:^\s*|[;&|]\s*|\$\(\s*|`)({alternation})\b");
        Self {
            pattern: Regex::new(&source).ok(),
        }
    }

    pub fn calls(&self, body: &str, options: &ScanOptions) -> Vec<String> {
        let Some(pattern) = &self.pattern else {
            return Vec::new();
        };
        let calls: BTreeSet<String> = pattern
            .captures_iter(body)
            .map(|caps| caps[1].to_string())
            .filter(|name| !options.is_excluded_call(name))
            .collect();
        calls.into_iter().collect()
    }
}

/// Calls made from a shell function body.
pub fn shell_calls(body: &str, known: &HashSet<String>, options: &ScanOptions) -> Vec<String> {
    ShellCallMatcher::new(known).calls(body, options)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
