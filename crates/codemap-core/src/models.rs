//! Shared typed models produced by the language scanners.
//!
//! Every record serializes to a plain nested map/sequence structure.  Empty
//! containers and unset optional fields are skipped, so absence of a key
//! (rather than an empty value) signals "none found".

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

fn is_false(value: &bool) -> bool {
    !*value
}

// ---------------------------------------------------------------------------
// Languages
// ---------------------------------------------------------------------------

/// A source language the engine knows how to scan.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Python,
    JavaScript,
    TypeScript,
    Shell,
}

/// The scanner family that handles a language.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScannerFamily {
    /// Scope tracked by indentation depth.
    Indentation,
    /// Scope tracked by brace-depth counting over the whole text.
    Brace,
    /// Line-oriented scripts with brace-delimited function bodies.
    Line,
}

impl Language {
    pub fn as_str(self) -> &'static str {
        match self {
            Language::Python => "python",
            Language::JavaScript => "javascript",
            Language::TypeScript => "typescript",
            Language::Shell => "shell",
        }
    }

    pub fn family(self) -> ScannerFamily {
        match self {
            Language::Python => ScannerFamily::Indentation,
            Language::JavaScript | Language::TypeScript => ScannerFamily::Brace,
            Language::Shell => ScannerFamily::Line,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Value and class classification
// ---------------------------------------------------------------------------

/// Coarse type tag of a constant, inferred from the literal's leading token.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    Collection,
    Str,
    Number,
    Value,
}

impl ValueKind {
    /// Classify a raw right-hand side.  Trailing comments must already be
    /// stripped by the caller.
    pub fn infer(raw: &str) -> Self {
        let value = raw.trim();
        if value.starts_with(['{', '[']) {
            ValueKind::Collection
        } else if value.starts_with(['\'', '"', '`']) {
            ValueKind::Str
        } else if is_numeric_literal(value) {
            ValueKind::Number
        } else {
            ValueKind::Value
        }
    }
}

/// Digits with optional dots and minus signs, e.g. `3`, `-1.5`.
fn is_numeric_literal(value: &str) -> bool {
    let mut digits = value.chars().filter(|c| *c != '.' && *c != '-').peekable();
    digits.peek().is_some() && digits.all(|c| c.is_ascii_digit())
}

/// Classification tag of a class, derived once from its base names.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassKind {
    #[default]
    Plain,
    Enum,
    Exception,
}

impl ClassKind {
    /// `Enum` when any base mentions "enum", `Exception` when any base
    /// mentions "exception" or "error" (case-insensitive), else `Plain`.
    pub fn classify<S: AsRef<str>>(bases: &[S]) -> Self {
        let lowered: Vec<String> = bases.iter().map(|b| b.as_ref().to_lowercase()).collect();
        if lowered.iter().any(|b| b.contains("enum")) {
            ClassKind::Enum
        } else if lowered
            .iter()
            .any(|b| b.contains("exception") || b.contains("error"))
        {
            ClassKind::Exception
        } else {
            ClassKind::Plain
        }
    }

    pub fn is_plain(&self) -> bool {
        *self == ClassKind::Plain
    }
}

/// True when a base list names an abstract or protocol base
/// (`ABC`, `abc.ABC`, `metaclass=ABCMeta`, `Protocol`, `typing.Protocol`).
pub fn bases_suggest_abstract<S: AsRef<str>>(bases: &[S]) -> bool {
    bases.iter().any(|base| {
        let lower = base.as_ref().to_lowercase();
        lower == "abc"
            || lower.ends_with(".abc")
            || lower.contains("abcmeta")
            || lower.contains("protocol")
    })
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// A function or method.  The name is the key of the enclosing map.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolRecord {
    /// 1-based line of the declaration header.
    pub line: usize,
    pub signature: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub decorators: Vec<String>,
    /// Sorted known-symbol names referenced from the body.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub calls: Vec<String>,
}

/// A top-level class declaration.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassRecord {
    pub line: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub decorators: Vec<String>,
    /// Base classes as written (indentation-scoped languages).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub inherits: Vec<String>,
    /// Base classes as written (brace-scoped languages).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extends: Vec<String>,
    #[serde(rename = "type", default, skip_serializing_if = "ClassKind::is_plain")]
    pub kind: ClassKind,
    #[serde(rename = "abstract", default, skip_serializing_if = "is_false")]
    pub is_abstract: bool,
    #[serde(default)]
    pub methods: IndexMap<String, SymbolRecord>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub class_constants: IndexMap<String, ValueKind>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub static_constants: IndexMap<String, ValueKind>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub properties: Vec<String>,
    /// Member names; only populated for enum-classified classes.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<String>,
}

impl ClassRecord {
    pub fn new(line: usize) -> Self {
        Self {
            line,
            ..Self::default()
        }
    }
}

/// An enumeration, either declared natively or migrated from an
/// enum-classified class.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumRecord {
    #[serde(default)]
    pub values: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
}

/// A TypeScript interface.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceRecord {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extends: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
}

/// Everything recovered from one source file.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileExtractionResult {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub imports: Vec<String>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub functions: IndexMap<String, SymbolRecord>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub classes: IndexMap<String, ClassRecord>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub constants: IndexMap<String, ValueKind>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub variables: Vec<String>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub type_aliases: IndexMap<String, String>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub enums: IndexMap<String, EnumRecord>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub interfaces: IndexMap<String, InterfaceRecord>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub exports: IndexMap<String, ValueKind>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<String>,
}

impl FileExtractionResult {
    /// Number of functions plus class methods.
    pub fn callable_count(&self) -> usize {
        self.functions.len()
            + self
                .classes
                .values()
                .map(|class| class.methods.len())
                .sum::<usize>()
    }

    /// True when nothing at all was recovered.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
