//! Brace-scoped scanner for JavaScript and TypeScript sources.
//!
//! Works on byte offsets into the whole text.  Declarations are located with
//! regexes; the extent of class bodies, function bodies, enum bodies and
//! object-shaped type aliases is recovered by brace-depth counting inside a
//! bounded window.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use tracing::debug;

use crate::indexer::assembler::assemble;
use crate::indexer::calls::javascript_calls;
use crate::indexer::guards::ScanOptions;
use crate::indexer::symbols::{
    collapse_whitespace, matching_brace, normalize_type_name, split_top_level, LineIndex,
};
use crate::models::{
    ClassKind, ClassRecord, EnumRecord, FileExtractionResult, InterfaceRecord, SymbolRecord,
    ValueKind,
};

/// Member names matched by the method pattern that are not methods.
const SKIPPED_METHOD_NAMES: &[&str] = &[
    "get", "set", "if", "for", "while", "switch", "catch", "try", "constructor", "function",
    "return",
];

// ---------------------------------------------------------------------------
// Compiled regex patterns
// ---------------------------------------------------------------------------

// Known-symbol pre-pass.
static KNOWN_FUNCTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bfunction(?:\s*\*\s*|\s+)(\w+)").unwrap());

static KNOWN_BOUND_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:const|let|var)\s+(\w+)\s*=\s*(?:async\s+)?\(").unwrap()
});

static KNOWN_METHOD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\w+)\s*\([^)]*\)\s*(?::\s*[^{;]+)?\{").unwrap()
});

static KNOWN_MEMBER_ARROW_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?m)^[ \t]*(?:(?:public|private|protected|static|readonly)\s+)*(\w+)\s*=\s*(?:async\s+)?\([^)]*\)\s*(?::\s*[^=\n]+)?=>",
    )
    .unwrap()
});

// Imports.
static IMPORT_FROM_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\bimport\s+(?:type\s+)?[\w*\{\}\s,$]+?\s+from\s*['"]([^'"]+)['"]"#).unwrap()
});

static SIDE_EFFECT_IMPORT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\bimport\s+['"]([^'"]+)['"]"#).unwrap());

static EXPORT_FROM_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"\bexport\s+(?:type\s+)?(?:\*(?:\s+as\s+\w+)?|\{[^}]*\})\s*from\s*['"]([^'"]+)['"]"#,
    )
    .unwrap()
});

static DYNAMIC_IMPORT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\bimport\s*\(\s*['"]([^'"]+)['"]\s*\)"#).unwrap());

static REQUIRE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\brequire\s*\(\s*['"]([^'"]+)['"]\s*\)"#).unwrap());

// Module-level declarations.
static TYPE_ALIAS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?m)^[ \t]*(?:export\s+)?(?:declare\s+)?type\s+(\w+)(?:\s*<[^=]*?>)?\s*=[ \t]*([^;\n]*)",
    )
    .unwrap()
});

static INTERFACE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?m)^[ \t]*(?:export\s+)?(?:declare\s+)?interface\s+(\w+)\s*(?:<[^{]*?>)?(?:\s+extends\s+([^{]+?))?\s*\{",
    )
    .unwrap()
});

static ENUM_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*(?:export\s+)?(?:declare\s+)?(?:const\s+)?enum\s+(\w+)\s*\{").unwrap()
});

static ENUM_MEMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^\s*['"]?([A-Za-z_$][\w$]*)"#).unwrap());

static CONST_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:export\s+)?const\s+([A-Z_][A-Z0-9_]*)\s*(?::\s*[^=]+?)?\s*=\s*([^;\n]+)")
        .unwrap()
});

static VAR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:let|const)\s+([a-z]\w*)\s*(?::\s*[^=;\n]+?)?\s*=").unwrap()
});

static BLOCK_COMMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)/\*.*?\*/").unwrap());

static LINE_COMMENT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"//[^\n]*").unwrap());

static DECORATOR_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^@([\w.]+)").unwrap());

// Classes and their members.
static CLASS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?m)^[ \t]*(?:export\s+(?:default\s+)?)?(?:declare\s+)?(abstract\s+)?class\s+(\w+)(?:\s*<[^>{]*>)?(?:\s+extends\s+([\w.]+))?",
    )
    .unwrap()
});

static METHOD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?m)^[ \t]*(?:(?:public|private|protected|static|readonly|override|abstract|declare)\s+)*(async\s+)?(\w+)\s*(?:<[^>()]*>)?\s*\(([^()]*(?:\([^()]*\)[^()]*)*)\)\s*(?::\s*([^{;\n]+))?\s*\{",
    )
    .unwrap()
});

static ARROW_MEMBER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?m)^[ \t]*(?:(?:public|private|protected|static|readonly|override)\s+)*(\w+)\s*(?::\s*[^=\n]+)?=\s*(async\s+)?(?:\(([^()]*(?:\([^()]*\)[^()]*)*)\)|(\w+))\s*(?::\s*([^=\n]+?))?\s*=>",
    )
    .unwrap()
});

static CONSTRUCTOR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?m)^[ \t]*(?:(?:public|private|protected)\s+)?constructor\s*\(([^()]*(?:\([^()]*\)[^()]*)*)\)\s*\{",
    )
    .unwrap()
});

static STATIC_CONST_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bstatic\s+(?:readonly\s+)?([A-Z_][A-Z0-9_]*)\s*(?::\s*[^=;]+?)?\s*=\s*([^;\n]+)")
        .unwrap()
});

// Standalone functions.
static FUNCTION_DECL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(?:export\s+(?:default\s+)?)?(async\s+)?function(?:\s*\*\s*|\s+)(\w+)\s*(?:<[^>()]*>)?\s*\(([^()]*(?:\([^()]*\)[^()]*)*)\)(?:\s*:\s*([^{;\n]+))?",
    )
    .unwrap()
});

static ARROW_FUNCTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(?:export\s+)?(?:const|let|var)\s+(\w+)\s*(?::\s*[^=]+?)?\s*=\s*(async\s+)?(?:\(([^()]*(?:\([^()]*\)[^()]*)*)\)|(\w+))\s*(?::\s*([^=\n]+?))?\s*=>",
    )
    .unwrap()
});

// ---------------------------------------------------------------------------
// Text helpers
// ---------------------------------------------------------------------------

fn push_unique(list: &mut Vec<String>, value: &str) {
    if !list.iter().any(|existing| existing == value) {
        list.push(value.to_string());
    }
}

/// Largest char boundary at or below `pos`.
fn clamp_to_boundary(text: &str, pos: usize) -> usize {
    let mut pos = pos.min(text.len());
    while !text.is_char_boundary(pos) {
        pos -= 1;
    }
    pos
}

fn strip_comments(text: &str) -> String {
    let without_blocks = BLOCK_COMMENT_RE.replace_all(text, "");
    LINE_COMMENT_RE.replace_all(&without_blocks, "").into_owned()
}

fn strip_trailing_comment(value: &str) -> &str {
    value.split("//").next().unwrap_or("").trim()
}

fn signature(is_async: bool, params: &str, return_type: Option<&str>) -> String {
    let mut signature = format!("({})", collapse_whitespace(params));
    if let Some(return_type) = normalize_type_name(return_type) {
        signature.push_str(": ");
        signature.push_str(&return_type);
    }
    if is_async {
        signature.insert_str(0, "async ");
    }
    signature
}

/// Text between the brace at `open` and its match, or empty when the block
/// does not close inside `limit` bytes.
fn block_text(text: &str, open: usize, limit: usize) -> &str {
    matching_brace(text, open, limit).map_or("", |close| &text[open + 1..close])
}

/// Body of a declaration whose opening brace follows `from`.  The brace must
/// appear within the configured distance.
fn block_after<'t>(text: &'t str, from: usize, options: &ScanOptions, limit: usize) -> &'t str {
    match text[from..].find('{') {
        Some(offset) if offset <= options.body_brace_max_distance => {
            block_text(text, from + offset, limit)
        }
        _ => "",
    }
}

/// Body of an arrow function whose `=>` ends at `arrow_end`: a braced block,
/// or the expression up to the end of the statement line.
fn arrow_body(text: &str, arrow_end: usize, limit: usize) -> &str {
    let rest = &text[arrow_end..];
    let trimmed = rest.trim_start();
    let offset = arrow_end + (rest.len() - trimmed.len());
    if trimmed.starts_with('{') {
        block_text(text, offset, limit)
    } else {
        let end = trimmed.find([';', '\n']).unwrap_or(trimmed.len());
        &trimmed[..end]
    }
}

/// Drop trailing decorator lines from the text before a declaration.
fn skip_decorator_lines(mut before: &str) -> &str {
    loop {
        let (rest, last) = match before.rfind('\n') {
            Some(pos) => (&before[..pos], &before[pos + 1..]),
            None => ("", before),
        };
        if !last.trim_start().starts_with('@') {
            return before;
        }
        before = rest.trim_end();
    }
}

/// Summary line of the JSDoc block immediately preceding `start`.
fn leading_jsdoc(text: &str, start: usize) -> Option<String> {
    let before = skip_decorator_lines(text[..start].trim_end());
    let inner = before.strip_suffix("*/")?;
    let open = inner.rfind("/**")?;
    if inner[open..].contains("*/") {
        return None;
    }
    for line in inner[open + 3..].lines() {
        let cleaned = line.trim().trim_start_matches('*').trim();
        if cleaned.is_empty() {
            continue;
        }
        if cleaned.starts_with('@') {
            return None;
        }
        return Some(cleaned.to_string());
    }
    None
}

/// Decorator names on the lines directly above `start`, top to bottom.
fn preceding_decorators(text: &str, start: usize) -> Vec<String> {
    let mut names = Vec::new();
    for line in text[..start].lines().rev() {
        match DECORATOR_LINE_RE.captures(line.trim()) {
            Some(caps) => names.push(caps[1].to_string()),
            None => break,
        }
    }
    names.reverse();
    names
}

// ---------------------------------------------------------------------------
// Scanner
// ---------------------------------------------------------------------------

struct Document<'a> {
    text: &'a str,
    lines: LineIndex,
    known: HashSet<String>,
    options: &'a ScanOptions,
}

impl<'a> Document<'a> {
    fn new(text: &'a str, options: &'a ScanOptions) -> Self {
        let known = [
            &*KNOWN_FUNCTION_RE,
            &*KNOWN_BOUND_RE,
            &*KNOWN_METHOD_RE,
            &*KNOWN_MEMBER_ARROW_RE,
        ]
        .into_iter()
        .flat_map(|re| re.captures_iter(text).map(|caps| caps[1].to_string()))
        .collect();
        Self {
            text,
            lines: LineIndex::new(text),
            known,
            options,
        }
    }

    fn symbol(&self, decl: usize, signature: String, body: &str) -> SymbolRecord {
        SymbolRecord {
            line: self.lines.line_of(decl),
            signature,
            doc: leading_jsdoc(self.text, decl),
            decorators: preceding_decorators(self.text, decl),
            calls: javascript_calls(body, &self.known, self.options),
        }
    }
}

fn match_span(caps: &Captures<'_>) -> (usize, usize) {
    caps.get(0).map_or((0, 0), |whole| (whole.start(), whole.end()))
}

fn collect_imports(text: &str) -> Vec<String> {
    let mut found: Vec<(usize, &str)> = [
        &*IMPORT_FROM_RE,
        &*SIDE_EFFECT_IMPORT_RE,
        &*EXPORT_FROM_RE,
        &*DYNAMIC_IMPORT_RE,
        &*REQUIRE_RE,
    ]
    .into_iter()
    .flat_map(|re| {
        re.captures_iter(text)
            .filter_map(|caps| caps.get(1))
            .map(|module| (module.start(), module.as_str()))
    })
    .collect();
    found.sort_by_key(|(pos, _)| *pos);

    let mut imports = Vec::new();
    for (_, module) in found {
        push_unique(&mut imports, module);
    }
    imports
}

fn collect_type_aliases(doc: &Document<'_>, result: &mut FileExtractionResult) {
    let text = doc.text;
    let limit = doc.options.type_alias_scan_limit;
    for caps in TYPE_ALIAS_RE.captures_iter(text) {
        let Some(rhs) = caps.get(2) else {
            continue;
        };
        let mut value = rhs.as_str().trim().to_string();

        if value.is_empty() {
            // Right-hand side starts on the next line.
            let window = &text[rhs.start()..clamp_to_boundary(text, rhs.start() + limit)];
            let end = [window.find(';'), window.find("\n\n")]
                .into_iter()
                .flatten()
                .min();
            let Some(end) = end else {
                debug!(alias = &caps[1], "type alias without terminator");
                continue;
            };
            value = window[..end].to_string();
        }

        if value.matches('{').count() > value.matches('}').count() {
            let complete = text[rhs.start()..]
                .find('{')
                .map(|offset| rhs.start() + offset)
                .and_then(|open| matching_brace(text, open, limit));
            if let Some(close) = complete {
                value = text[rhs.start()..=close].to_string();
            }
        }

        let value = collapse_whitespace(value.trim().trim_end_matches(';'));
        if !value.is_empty() {
            result.type_aliases.insert(caps[1].to_string(), value);
        }
    }
}

fn collect_interfaces(doc: &Document<'_>, result: &mut FileExtractionResult) {
    for caps in INTERFACE_RE.captures_iter(doc.text) {
        let (start, _) = match_span(&caps);
        let extends = caps
            .get(2)
            .map(|m| split_top_level(m.as_str(), ','))
            .unwrap_or_default();
        result.interfaces.insert(
            caps[1].to_string(),
            InterfaceRecord {
                extends,
                doc: leading_jsdoc(doc.text, start),
            },
        );
    }
}

fn collect_enums(doc: &Document<'_>, result: &mut FileExtractionResult) {
    let text = doc.text;
    for caps in ENUM_RE.captures_iter(text) {
        let (start, end) = match_span(&caps);
        let open = end - 1;
        let close = matching_brace(text, open, text.len()).unwrap_or(text.len());
        let body = strip_comments(&text[open + 1..close]);
        let values = body
            .split(',')
            .filter_map(|member| ENUM_MEMBER_RE.captures(member))
            .map(|member| member[1].to_string())
            .collect();
        result.enums.insert(
            caps[1].to_string(),
            EnumRecord {
                values,
                doc: leading_jsdoc(text, start),
            },
        );
    }
}

fn collect_constants(text: &str, result: &mut FileExtractionResult) {
    for caps in CONST_RE.captures_iter(text) {
        let kind = ValueKind::infer(strip_trailing_comment(&caps[2]));
        result.constants.insert(caps[1].to_string(), kind);
    }
    for caps in VAR_RE.captures_iter(text) {
        push_unique(&mut result.variables, &caps[1]);
    }
}

/// Record every class and return the byte span each one covers.
fn collect_classes(doc: &Document<'_>, result: &mut FileExtractionResult) -> Vec<(usize, usize)> {
    let text = doc.text;
    let mut spans = Vec::new();
    for caps in CLASS_RE.captures_iter(text) {
        let name = caps[2].to_string();
        let (start, header_end) = match_span(&caps);
        let Some(open) = text[header_end..].find('{').map(|offset| header_end + offset) else {
            debug!(class = %name, "class header without body");
            continue;
        };
        // An unterminated class extends to the end of the text.
        let close = matching_brace(text, open, text.len()).unwrap_or(text.len());

        let bases: Vec<String> = caps
            .get(3)
            .map(|base| vec![base.as_str().to_string()])
            .unwrap_or_default();
        let mut record = ClassRecord::new(doc.lines.line_of(start));
        record.doc = leading_jsdoc(text, start);
        record.decorators = preceding_decorators(text, start);
        record.kind = ClassKind::classify(&bases);
        record.is_abstract = caps.get(1).is_some();
        record.extends = bases;
        collect_members(doc, open + 1, close, &mut record);

        result.classes.insert(name, record);
        spans.push((start, close));
    }
    spans
}

/// Brace depth before every byte of `body`, plus one entry for its end.
fn brace_depths(body: &str) -> Vec<usize> {
    let mut depths = Vec::with_capacity(body.len() + 1);
    let mut depth: usize = 0;
    for byte in body.bytes() {
        depths.push(depth);
        match byte {
            b'{' => depth += 1,
            b'}' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    depths.push(depth);
    depths
}

/// Methods, arrow members, the constructor and static constants of the
/// class body `text[body_start..body_end]`.
///
/// Only declarations at the top level of the body count, so shorthand
/// methods of object literals inside a method stay out.
fn collect_members(doc: &Document<'_>, body_start: usize, body_end: usize, class: &mut ClassRecord) {
    let body = &doc.text[body_start..body_end];
    let limit = doc.options.method_body_scan_limit;
    let depths = brace_depths(body);
    let at_member_level = |pos: usize| depths.get(pos).is_some_and(|depth| *depth == 0);
    let mut members: Vec<(usize, String, SymbolRecord)> = Vec::new();

    for caps in METHOD_RE.captures_iter(body) {
        let name = &caps[2];
        if SKIPPED_METHOD_NAMES.contains(&name) {
            continue;
        }
        let (start, end) = match_span(&caps);
        if !at_member_level(start) {
            continue;
        }
        let decl = body_start + start;
        let block = block_text(doc.text, body_start + end - 1, limit);
        let signature = signature(
            caps.get(1).is_some(),
            &caps[3],
            caps.get(4).map(|m| m.as_str()),
        );
        members.push((decl, name.to_string(), doc.symbol(decl, signature, block)));
    }

    for caps in ARROW_MEMBER_RE.captures_iter(body) {
        let (start, end) = match_span(&caps);
        if !at_member_level(start) {
            continue;
        }
        let decl = body_start + start;
        let params = caps.get(3).or_else(|| caps.get(4)).map_or("", |m| m.as_str());
        let signature = signature(caps.get(2).is_some(), params, caps.get(5).map(|m| m.as_str()));
        let block = arrow_body(doc.text, body_start + end, limit);
        members.push((decl, caps[1].to_string(), doc.symbol(decl, signature, block)));
    }

    for caps in CONSTRUCTOR_RE.captures_iter(body) {
        let (start, end) = match_span(&caps);
        if !at_member_level(start) {
            continue;
        }
        let decl = body_start + start;
        let block = block_text(doc.text, body_start + end - 1, limit);
        let signature = signature(false, &caps[1], None);
        members.push((decl, "__init__".to_string(), doc.symbol(decl, signature, block)));
    }

    members.sort_by_key(|(decl, _, _)| *decl);
    for (_, name, record) in members {
        class.methods.insert(name, record);
    }

    for caps in STATIC_CONST_RE.captures_iter(body) {
        let (start, _) = match_span(&caps);
        if !at_member_level(start) {
            continue;
        }
        let kind = ValueKind::infer(strip_trailing_comment(&caps[2]));
        class.static_constants.insert(caps[1].to_string(), kind);
    }
}

/// Function declarations and bound arrow functions outside every class.
fn collect_functions(
    doc: &Document<'_>,
    class_spans: &[(usize, usize)],
    result: &mut FileExtractionResult,
) {
    let text = doc.text;
    let limit = doc.options.function_body_scan_limit;
    let inside_class = |pos: usize| {
        class_spans
            .iter()
            .any(|&(start, end)| start <= pos && pos <= end)
    };
    let mut found: Vec<(usize, String, SymbolRecord)> = Vec::new();

    for caps in FUNCTION_DECL_RE.captures_iter(text) {
        let (decl, end) = match_span(&caps);
        if inside_class(decl) {
            continue;
        }
        let signature = signature(
            caps.get(1).is_some(),
            &caps[3],
            caps.get(4).map(|m| m.as_str()),
        );
        let block = block_after(text, end, doc.options, limit);
        found.push((decl, caps[2].to_string(), doc.symbol(decl, signature, block)));
    }

    for caps in ARROW_FUNCTION_RE.captures_iter(text) {
        let (decl, end) = match_span(&caps);
        if inside_class(decl) {
            continue;
        }
        let params = caps.get(3).or_else(|| caps.get(4)).map_or("", |m| m.as_str());
        let signature = signature(caps.get(2).is_some(), params, caps.get(5).map(|m| m.as_str()));
        let block = arrow_body(text, end, limit);
        found.push((decl, caps[1].to_string(), doc.symbol(decl, signature, block)));
    }

    found.sort_by_key(|(decl, _, _)| *decl);
    for (_, name, record) in found {
        result.functions.insert(name, record);
    }
}

/// Extract the structure of a JavaScript or TypeScript source file.
pub fn extract(source: &str, options: &ScanOptions) -> FileExtractionResult {
    let doc = Document::new(source, options);
    let mut result = FileExtractionResult {
        imports: collect_imports(source),
        ..FileExtractionResult::default()
    };
    collect_type_aliases(&doc, &mut result);
    collect_interfaces(&doc, &mut result);
    collect_enums(&doc, &mut result);
    collect_constants(source, &mut result);
    let class_spans = collect_classes(&doc, &mut result);
    collect_functions(&doc, &class_spans, &mut result);
    assemble(result)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indexer::callgraph::CallGraph;

    fn scan(source: &str) -> FileExtractionResult {
        extract(source, &ScanOptions::default())
    }

    const WIDGET_SRC: &str = "\
/**
 * Renders widgets.
 * @public
 */
@Component
export abstract class Widget extends Base {
  static MAX_SIZE = 10;
  static readonly NAME: string = 'widget';

  constructor(private name: string) {
    super();
    this.init();
  }

  /** Initialize state. */
  init(): void {
    helper();
  }

  async load(url: string): Promise<void> {
    await this.render();
  }

  render = async () => {
    return helper();
  };

  get size() {
    return 1;
  }
}

function helper() {
  return 1;
}

const format = (value: number): string => value.toFixed(2);
";

    #[test]
    fn test_enum_members() {
        let result = scan("enum Color { Red, Green, Blue }\n");
        assert_eq!(result.enums["Color"].values, vec!["Red", "Green", "Blue"]);
        assert!(result.classes.is_empty());
    }

    #[test]
    fn test_const_enum_with_comments_and_initializers() {
        let src = "\
/** Palette. */
export const enum Color {
  Red, // warm
  Green = 'g',
  /* cool */ Blue = 1 << 2,
}
";
        let result = scan(src);
        let color = &result.enums["Color"];
        assert_eq!(color.values, vec!["Red", "Green", "Blue"]);
        assert_eq!(color.doc.as_deref(), Some("Palette."));
    }

    #[test]
    fn test_imports_in_position_order() {
        let src = "\
import React, { useState } from 'react';
import './styles.css';
const fs = require('fs');
export { helper } from './helper';
export * from \"./all\";
const lazy = () => import('./lazy');
import Again from 'react';
";
        let result = scan(src);
        assert_eq!(
            result.imports,
            vec!["react", "./styles.css", "fs", "./helper", "./all", "./lazy"]
        );
    }

    #[test]
    fn test_class_header_metadata() {
        let result = scan(WIDGET_SRC);
        let widget = &result.classes["Widget"];
        assert_eq!(widget.line, 6);
        assert_eq!(widget.doc.as_deref(), Some("Renders widgets."));
        assert_eq!(widget.decorators, vec!["Component"]);
        assert_eq!(widget.extends, vec!["Base"]);
        assert!(widget.is_abstract);
        assert_eq!(widget.kind, ClassKind::Plain);
        assert_eq!(widget.static_constants["MAX_SIZE"], ValueKind::Number);
        assert_eq!(widget.static_constants["NAME"], ValueKind::Str);
    }

    #[test]
    fn test_class_methods() {
        let result = scan(WIDGET_SRC);
        let methods = &result.classes["Widget"].methods;
        assert_eq!(
            methods.keys().collect::<Vec<_>>(),
            vec!["__init__", "init", "load", "render"]
        );

        assert_eq!(methods["__init__"].line, 10);
        assert_eq!(methods["__init__"].signature, "(private name: string)");
        assert_eq!(methods["__init__"].calls, vec!["init"]);

        assert_eq!(methods["init"].line, 16);
        assert_eq!(methods["init"].signature, "(): void");
        assert_eq!(methods["init"].doc.as_deref(), Some("Initialize state."));
        assert_eq!(methods["init"].calls, vec!["helper"]);

        assert_eq!(methods["load"].signature, "async (url: string): Promise<void>");
        assert_eq!(methods["load"].calls, vec!["render"]);

        assert_eq!(methods["render"].signature, "async ()");
        assert_eq!(methods["render"].calls, vec!["helper"]);
    }

    #[test]
    fn test_standalone_functions_outside_classes() {
        let result = scan(WIDGET_SRC);
        assert_eq!(
            result.functions.keys().collect::<Vec<_>>(),
            vec!["helper", "format"]
        );
        assert_eq!(result.functions["helper"].line, 33);
        assert_eq!(result.functions["helper"].signature, "()");
        assert_eq!(result.functions["format"].signature, "(value: number): string");
        assert!(result.functions["format"].calls.is_empty());
    }

    #[test]
    fn test_type_aliases_and_interfaces() {
        let src = "\
export type Id = string | number;
type Point = {
  x: number;
  y: number;
};
type Mode =
  | 'a'
  | 'b';
/** A shape. */
export interface Shape<T> extends Base<T>, Named {
  area(): number;
}
interface Empty {}
";
        let result = scan(src);
        assert_eq!(result.type_aliases["Id"], "string | number");
        assert_eq!(result.type_aliases["Point"], "{ x: number; y: number; }");
        assert_eq!(result.type_aliases["Mode"], "| 'a' | 'b'");

        let shape = &result.interfaces["Shape"];
        assert_eq!(shape.extends, vec!["Base<T>", "Named"]);
        assert_eq!(shape.doc.as_deref(), Some("A shape."));
        let empty = &result.interfaces["Empty"];
        assert!(empty.extends.is_empty());
        assert!(empty.doc.is_none());
    }

    #[test]
    fn test_constants_and_variables() {
        let src = "\
export const API_URL = 'https://example.com';
const LIMITS = { max: 3 };
const RETRIES = 5; // attempts
let counter = 0;
const total: number = 1;
let counter = 2;
";
        let result = scan(src);
        assert_eq!(result.constants["API_URL"], ValueKind::Str);
        assert_eq!(result.constants["LIMITS"], ValueKind::Collection);
        assert_eq!(result.constants["RETRIES"], ValueKind::Number);
        assert_eq!(result.variables, vec!["counter", "total"]);
    }

    #[test]
    fn test_exception_class_and_constructor() {
        let src = "\
class NotFound extends Error {
  constructor(message) {
    super(message);
  }
}
";
        let result = scan(src);
        let class = &result.classes["NotFound"];
        assert_eq!(class.kind, ClassKind::Exception);
        assert_eq!(class.methods["__init__"].signature, "(message)");
        assert!(class.methods["__init__"].calls.is_empty());
    }

    #[test]
    fn test_unterminated_class_swallows_rest() {
        let src = "\
class Open {
  run() {
    go();
function go() {}
";
        let result = scan(src);
        assert!(result.classes["Open"].methods.contains_key("run"));
        assert!(result.functions.is_empty());
    }

    #[test]
    fn test_function_calls_build_graph() {
        let src = "function a() { b(); }\nfunction b() {}\n";
        let result = scan(src);
        assert_eq!(result.functions["a"].calls, vec!["b"]);
        let graph = CallGraph::build(&result.functions, &result.classes);
        assert_eq!(graph.calls_map["a"], vec!["b"]);
        assert_eq!(graph.called_by_map["b"], vec!["a"]);
    }

    #[test]
    fn test_calls_exclude_keywords_and_globals() {
        let src = "\
function run(items) {
  if (items.length) {
    console.log(JSON.stringify(items));
  }
  return process(items);
}
function process(items) { return items; }
";
        let result = scan(src);
        assert_eq!(result.functions["run"].calls, vec!["process"]);
    }

    #[test]
    fn test_rescan_is_identical_and_lines_valid() {
        let first = scan(WIDGET_SRC);
        let second = scan(WIDGET_SRC);
        assert_eq!(first, second);
        let line_count = WIDGET_SRC.lines().count();
        for class in first.classes.values() {
            assert!(class.line >= 1 && class.line <= line_count);
            for method in class.methods.values() {
                assert!(method.line >= 1 && method.line <= line_count);
            }
        }
        for function in first.functions.values() {
            assert!(function.line >= 1 && function.line <= line_count);
        }
    }

    #[test]
    fn test_object_literal_methods_are_not_members() {
        let src = "\
class A {
  run() {
    const o = {
      helper() {
        return 1;
      },
    };
    return o.helper();
  }
}
";
        let result = scan(src);
        assert_eq!(
            result.classes["A"].methods.keys().collect::<Vec<_>>(),
            vec!["run"]
        );
    }

    #[test]
    fn test_method_body_scan_limit() {
        let src = "\
class Svc {
  run() {
    // ........................................
    helper();
  }
}

function helper() {}
";
        assert_eq!(scan(src).classes["Svc"].methods["run"].calls, vec!["helper"]);

        let options = ScanOptions {
            method_body_scan_limit: 20,
            ..ScanOptions::default()
        };
        let capped = extract(src, &options);
        let run = &capped.classes["Svc"].methods["run"];
        assert_eq!(run.line, 2);
        assert!(run.calls.is_empty());
    }

    #[test]
    fn test_function_body_scan_limit() {
        let src = "\
function big() {
  // ........................................
  helper();
}

function helper() {}
";
        assert_eq!(scan(src).functions["big"].calls, vec!["helper"]);

        let options = ScanOptions {
            function_body_scan_limit: 20,
            ..ScanOptions::default()
        };
        let capped = extract(src, &options);
        assert!(capped.functions["big"].calls.is_empty());
        assert!(capped.functions.contains_key("helper"));
    }

    #[test]
    fn test_body_brace_max_distance() {
        let src = "\
function far()
  /* ........................................ */
{
  helper();
}

function helper() {}
";
        assert_eq!(scan(src).functions["far"].calls, vec!["helper"]);

        let options = ScanOptions {
            body_brace_max_distance: 10,
            ..ScanOptions::default()
        };
        let capped = extract(src, &options);
        assert_eq!(capped.functions["far"].signature, "()");
        assert!(capped.functions["far"].calls.is_empty());
    }

    #[test]
    fn test_type_alias_scan_limit() {
        let src = "\
type Big = {
  alpha: number;
  beta: string;
  gamma: boolean;
};
";
        assert_eq!(
            scan(src).type_aliases["Big"],
            "{ alpha: number; beta: string; gamma: boolean; }"
        );

        let options = ScanOptions {
            type_alias_scan_limit: 10,
            ..ScanOptions::default()
        };
        let capped = extract(src, &options);
        assert_eq!(capped.type_aliases["Big"], "{");
    }

    #[test]
    fn test_leading_jsdoc_requires_adjacency() {
        let text = "/** Old. */\nconst x = 1;\nclass A {}";
        let start = text.find("class").unwrap();
        assert_eq!(leading_jsdoc(text, start), None);
        let text = "/**\n * @deprecated\n */\nclass A {}";
        let start = text.find("class").unwrap();
        assert_eq!(leading_jsdoc(text, start), None);
    }
}
