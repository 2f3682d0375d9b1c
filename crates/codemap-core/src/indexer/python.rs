//! Indentation-scoped scanner for Python sources.
//!
//! A single forward walk over the lines keeps the active top-level class, a
//! stack of `(name, indent)` pairs for nested classes, the decorators waiting
//! for their declaration and whether a triple-quoted string is still open.
//! Everything else is decided from the current line plus bounded lookahead
//! (multi-line headers, docstrings, indented bodies).

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::indexer::assembler::assemble;
use crate::indexer::calls::python_calls;
use crate::indexer::guards::ScanOptions;
use crate::indexer::symbols::{collapse_whitespace, normalize_type_name, split_top_level};
use crate::models::{
    bases_suggest_abstract, ClassKind, ClassRecord, FileExtractionResult, SymbolRecord, ValueKind,
};

/// Special methods dropped from the output; `__init__` is always kept.
const SKIPPED_DUNDERS: &[&str] = &[
    "__repr__", "__str__", "__hash__", "__eq__", "__ne__", "__lt__", "__le__", "__gt__",
    "__ge__", "__bool__",
];

/// Statement keywords that would otherwise look like `name: annotation`.
const STATEMENT_KEYWORDS: &[&str] = &[
    "else", "elif", "if", "try", "except", "finally", "while", "for", "with", "match", "case",
    "lambda", "return", "pass",
];

const TRIPLE_QUOTES: [&str; 2] = ["\"\"\"", "'''"];

// ---------------------------------------------------------------------------
// Compiled regex patterns
// ---------------------------------------------------------------------------

static DEF_START_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([ \t]*)(async\s+)?def\s+(\w+)\s*\(").unwrap());

static DEF_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([ \t]*)(async\s+)?def\s+(\w+)\s*(?:\[[^\]]*\])?\s*\((.*?)\)(?:\s*->\s*([^:]+))?:")
        .unwrap()
});

static CLASS_START_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([ \t]*)class\s+(\w+)").unwrap());

static CLASS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([ \t]*)class\s+(\w+)(?:\[[^\]]*\])?(?:\s*\((.*?)\))?\s*:").unwrap()
});

static DECORATOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[ \t]*@([\w.]+)").unwrap());

static IMPORT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:from\s+(\S+)\s+)?import\s+(.+)$").unwrap());

static TYPE_ALIAS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(\w+)\s*=\s*(?:Union|Optional|List|Dict|Tuple|Set|Type|Callable|Literal|TypeVar|NewType|TypedDict|Protocol)\[.+\]$",
    )
    .unwrap()
});

static TYPE_STATEMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^type\s+(\w+)(?:\[[^\]]*\])?\s*=\s*(.+)$").unwrap());

static MODULE_CONST_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Z_][A-Z0-9_]*)\s*=\s*(.+)$").unwrap());

static MODULE_VAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\w+)\s*:\s*([^=]+)\s*=").unwrap());

static CLASS_CONST_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([ \t]+)([A-Z_][A-Z0-9_]*)\s*=\s*(.+)$").unwrap());

static ENUM_VALUE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([ \t]+)([A-Z_][A-Z0-9_]*)\s*(?:=\s*(.+))?$").unwrap());

static PROPERTY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([ \t]*)(\w+)\s*:\s*([^=\n]+)").unwrap());

// ---------------------------------------------------------------------------
// Line helpers
// ---------------------------------------------------------------------------

fn indentation(line: &str) -> usize {
    line.chars().take_while(|c| c.is_whitespace()).count()
}

fn strip_comment(value: &str) -> &str {
    value.split('#').next().unwrap_or("").trim()
}

fn non_empty(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// The triple-quote delimiter left open by `text`, if any.
fn unclosed_triple_quote(text: &str) -> Option<&'static str> {
    TRIPLE_QUOTES
        .into_iter()
        .find(|delim| text.matches(delim).count() % 2 == 1)
}

/// Strip a string prefix such as `r"""` or `u'''` from a docstring opener.
fn strip_string_prefix(text: &str) -> &str {
    match text.strip_prefix(['r', 'R', 'u', 'U']) {
        Some(rest) if rest.starts_with(['"', '\'']) => rest,
        _ => text,
    }
}

/// First line of the docstring starting at `lines[index]`, if there is one.
fn docstring_at(lines: &[&str], index: usize) -> Option<String> {
    let opener = strip_string_prefix(lines.get(index)?.trim());
    let delim = TRIPLE_QUOTES
        .into_iter()
        .find(|delim| opener.starts_with(delim))?;
    let rest = &opener[delim.len()..];
    if let Some(close) = rest.find(delim) {
        return non_empty(&rest[..close]);
    }
    if let Some(first) = non_empty(rest) {
        return Some(first);
    }
    let next = lines.get(index + 1)?.trim();
    non_empty(next.split(delim).next().unwrap_or(""))
}

/// Index of the line that closes a header starting at `start`: the first
/// `:` outside brackets once a parenthesis has been opened.  Quoted text and
/// comments are skipped.  `None` when the file ends first.
fn header_end(lines: &[&str], start: usize) -> Option<usize> {
    let mut depth: usize = 0;
    let mut opened = false;
    for (j, line) in lines.iter().enumerate().skip(start) {
        let mut quote: Option<char> = None;
        let mut escaped = false;
        for ch in line.chars() {
            if let Some(q) = quote {
                if escaped {
                    escaped = false;
                } else if ch == '\\' {
                    escaped = true;
                } else if ch == q {
                    quote = None;
                }
                continue;
            }
            match ch {
                '\'' | '"' => quote = Some(ch),
                '#' => break,
                '(' => {
                    depth += 1;
                    opened = true;
                }
                '[' | '{' => depth += 1,
                ')' | ']' | '}' => depth = depth.saturating_sub(1),
                ':' if opened && depth == 0 => return Some(j),
                _ => {}
            }
        }
    }
    None
}

/// Join a multi-line header into a single line.
fn join_header(lines: &[&str]) -> String {
    let mut joined = String::new();
    for (offset, line) in lines.iter().enumerate() {
        if offset == 0 {
            joined.push_str(line.trim_end());
        } else {
            joined.push(' ');
            joined.push_str(line.trim());
        }
    }
    joined
}

/// Lines after a header that belong to its body: blank lines and lines
/// indented deeper than the header, up to the first line that is not.
fn indented_body<'a>(lines: &[&'a str], start: usize, indent: usize) -> Vec<&'a str> {
    let mut body = Vec::new();
    for line in lines.iter().skip(start) {
        if !line.trim().is_empty() && indentation(line) <= indent {
            break;
        }
        body.push(*line);
    }
    body
}

fn is_abstract_marker(decorator: &str) -> bool {
    decorator == "abstractmethod" || decorator.ends_with(".abstractmethod")
}

fn push_unique(list: &mut Vec<String>, value: &str) {
    if !list.iter().any(|existing| existing == value) {
        list.push(value.to_string());
    }
}

// ---------------------------------------------------------------------------
// Scanner
// ---------------------------------------------------------------------------

/// The class currently receiving members.
struct ActiveClass {
    name: String,
    indent: usize,
    /// Indentation of the first line of the class body.
    body_indent: Option<usize>,
}

struct Scanner<'a> {
    lines: Vec<&'a str>,
    known: HashSet<String>,
    options: &'a ScanOptions,
    result: FileExtractionResult,
    current: Option<ActiveClass>,
    class_stack: Vec<(String, usize)>,
    pending_decorators: Vec<String>,
    open_string: Option<&'static str>,
}

impl<'a> Scanner<'a> {
    fn new(source: &'a str, options: &'a ScanOptions) -> Self {
        let lines: Vec<&str> = source.lines().collect();
        let known = lines
            .iter()
            .filter_map(|line| DEF_START_RE.captures(line))
            .map(|caps| caps[3].to_string())
            .collect();
        Self {
            lines,
            known,
            options,
            result: FileExtractionResult::default(),
            current: None,
            class_stack: Vec::new(),
            pending_decorators: Vec::new(),
            open_string: None,
        }
    }

    fn run(mut self) -> FileExtractionResult {
        let mut i = 0;
        while i < self.lines.len() {
            i = self.step(i);
        }
        assemble(self.result)
    }

    /// Process the line at `i` and return the index of the next line to scan.
    fn step(&mut self, i: usize) -> usize {
        let line = self.lines[i];

        if let Some(delim) = self.open_string {
            if line.contains(delim) {
                self.open_string = None;
            }
            return i + 1;
        }

        let stripped = line.trim();
        if stripped.is_empty() || stripped.starts_with('#') {
            return i + 1;
        }
        self.open_string = unclosed_triple_quote(stripped);
        if TRIPLE_QUOTES
            .iter()
            .any(|delim| strip_string_prefix(stripped).starts_with(delim))
        {
            return i + 1;
        }

        let indent = indentation(line);
        self.track_scope(indent);

        if let Some(caps) = IMPORT_RE.captures(stripped) {
            self.record_import(caps.get(1).map(|m| m.as_str()), &caps[2]);
            return i + 1;
        }

        if let Some(caps) = DECORATOR_RE.captures(line) {
            self.pending_decorators.push(caps[1].to_string());
            return self.skip_decorator_arguments(i);
        }

        if self.current.is_none() && self.module_rule(line) {
            return i + 1;
        }

        if CLASS_START_RE.is_match(line) {
            return self.class_header(i, indent);
        }

        if self.class_rule(line, indent) {
            return i + 1;
        }

        if DEF_START_RE.is_match(line) {
            return self.def_header(i, indent);
        }

        self.property_rule(line, indent);
        i + 1
    }

    /// Leave classes the current line has dedented out of.
    fn track_scope(&mut self, indent: usize) {
        while self
            .class_stack
            .last()
            .is_some_and(|(_, level)| indent <= *level)
        {
            self.class_stack.pop();
        }
        if let Some(active) = &mut self.current {
            if indent <= active.indent {
                self.current = None;
            } else if active.body_indent.is_none() {
                active.body_indent = Some(indent);
            }
        }
    }

    fn at_class_body(&self, indent: usize) -> bool {
        self.current
            .as_ref()
            .is_some_and(|active| active.body_indent == Some(indent))
    }

    fn active_class_mut(&mut self) -> Option<&mut ClassRecord> {
        let name = &self.current.as_ref()?.name;
        self.result.classes.get_mut(name)
    }

    fn record_import(&mut self, module: Option<&str>, items: &str) {
        match module {
            Some(module) => push_unique(&mut self.result.imports, module),
            None => {
                for item in items.split(',') {
                    let name = item.split(" as ").next().unwrap_or("").trim();
                    if !name.is_empty() {
                        push_unique(&mut self.result.imports, name);
                    }
                }
            }
        }
    }

    /// Skip the continuation lines of a decorator whose arguments span
    /// several lines.
    fn skip_decorator_arguments(&self, i: usize) -> usize {
        let balance = |line: &str| {
            line.matches('(').count() as i64 - line.matches(')').count() as i64
        };
        let mut depth = balance(self.lines[i]);
        let mut next = i + 1;
        while depth > 0 && next < self.lines.len() {
            depth += balance(self.lines[next]);
            next += 1;
        }
        next
    }

    /// Module-level type aliases, constants and annotated variables.
    fn module_rule(&mut self, line: &str) -> bool {
        let line = line.trim_end();
        if TYPE_ALIAS_RE.is_match(line) {
            if let Some((name, value)) = line.split_once('=') {
                self.result
                    .type_aliases
                    .insert(name.trim().to_string(), value.trim().to_string());
            }
            return true;
        }
        if let Some(caps) = TYPE_STATEMENT_RE.captures(line) {
            self.result
                .type_aliases
                .insert(caps[1].to_string(), strip_comment(&caps[2]).to_string());
            return true;
        }
        if let Some(caps) = MODULE_CONST_RE.captures(line) {
            let kind = ValueKind::infer(strip_comment(&caps[2]));
            self.result.constants.insert(caps[1].to_string(), kind);
            return true;
        }
        if let Some(caps) = MODULE_VAR_RE.captures(line) {
            let name = &caps[1];
            if !name.starts_with('_') && !STATEMENT_KEYWORDS.contains(&name) {
                push_unique(&mut self.result.variables, name);
            }
            return true;
        }
        false
    }

    fn class_header(&mut self, i: usize, indent: usize) -> usize {
        let line = self.lines[i];
        let end = if CLASS_RE.is_match(line) {
            Some(i)
        } else if line.contains('(') {
            header_end(&self.lines, i)
        } else {
            None
        };
        let Some(end) = end else {
            debug!(line = i + 1, "dropping class header without terminator");
            return i + 1;
        };
        let joined = join_header(&self.lines[i..=end]);
        let Some(caps) = CLASS_RE.captures(&joined) else {
            debug!(line = i + 1, "dropping unparseable class header");
            return i + 1;
        };
        let name = caps[2].to_string();
        let decorators = std::mem::take(&mut self.pending_decorators);

        if indent == 0 {
            let bases = caps
                .get(3)
                .map(|m| split_top_level(m.as_str(), ','))
                .unwrap_or_default();
            let mut record = ClassRecord::new(i + 1);
            record.decorators = decorators;
            record.kind = ClassKind::classify(&bases);
            record.is_abstract = bases_suggest_abstract(&bases);
            record.inherits = bases;
            record.doc = docstring_at(&self.lines, end + 1);
            self.result.classes.insert(name.clone(), record);
            self.current = Some(ActiveClass {
                name: name.clone(),
                indent,
                body_indent: None,
            });
        }

        self.class_stack.push((name, indent));
        end + 1
    }

    /// Enum members and class constants declared directly in the body.
    fn class_rule(&mut self, line: &str, indent: usize) -> bool {
        if !self.at_class_body(indent) {
            return false;
        }
        // Only the recorded class itself, not a nested one, contributes.
        let directly_inside = self.class_stack.len() == 1;
        let Some(class) = self.active_class_mut() else {
            return false;
        };
        let line = line.trim_end();

        if class.kind == ClassKind::Enum && directly_inside {
            if let Some(caps) = ENUM_VALUE_RE.captures(line) {
                push_unique(&mut class.values, &caps[2]);
                return true;
            }
        }
        if let Some(caps) = CLASS_CONST_RE.captures(line) {
            let kind = ValueKind::infer(strip_comment(&caps[3]));
            class.class_constants.insert(caps[2].to_string(), kind);
            return true;
        }
        false
    }

    fn def_header(&mut self, i: usize, indent: usize) -> usize {
        let Some(end) = header_end(&self.lines, i) else {
            debug!(line = i + 1, "dropping def without header terminator");
            self.pending_decorators.clear();
            return i + 1;
        };
        let joined = join_header(&self.lines[i..=end]);
        let Some(caps) = DEF_RE.captures(&joined) else {
            debug!(line = i + 1, "dropping unparseable def header");
            self.pending_decorators.clear();
            return i + 1;
        };
        let decorators = std::mem::take(&mut self.pending_decorators);
        let name = caps[3].to_string();
        if SKIPPED_DUNDERS.contains(&name.as_str()) {
            return end + 1;
        }

        let mut signature = format!("({})", collapse_whitespace(&caps[4]));
        if let Some(return_type) = normalize_type_name(caps.get(5).map(|m| m.as_str())) {
            signature.push_str(" -> ");
            signature.push_str(&return_type);
        }
        if caps.get(2).is_some() {
            signature.insert_str(0, "async ");
        }

        let header_len = caps.get(0).map_or(joined.len(), |m| m.end());
        let mut body = joined[header_len..].trim().to_string();
        for line in indented_body(&self.lines, end + 1, indent) {
            body.push('\n');
            body.push_str(line);
        }

        let record = SymbolRecord {
            line: i + 1,
            signature,
            doc: docstring_at(&self.lines, end + 1),
            calls: python_calls(&body, &self.known, self.options),
            decorators,
        };

        if self.at_class_body(indent) {
            let abstract_marker = record.decorators.iter().any(|d| is_abstract_marker(d));
            if let Some(class) = self.active_class_mut() {
                class.is_abstract |= abstract_marker;
                class.methods.insert(name, record);
            }
        } else if indent == 0 {
            self.result.functions.insert(name, record);
        }
        end + 1
    }

    /// Annotated attributes declared directly in the class body.
    fn property_rule(&mut self, line: &str, indent: usize) {
        if !self.at_class_body(indent) || self.class_stack.len() != 1 {
            return;
        }
        let Some(caps) = PROPERTY_RE.captures(line) else {
            return;
        };
        let name = caps[2].to_string();
        if name.starts_with('_') || STATEMENT_KEYWORDS.contains(&name.as_str()) {
            return;
        }
        if let Some(class) = self.active_class_mut() {
            push_unique(&mut class.properties, &name);
        }
    }
}

/// Extract the structure of a Python source file.
pub fn extract(source: &str, options: &ScanOptions) -> FileExtractionResult {
    Scanner::new(source, options).run()
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

    #[test]
    fn test_exception_class_method_calls_module_function() {
        let src = "\
class Foo(Exception):
    def bar(self): return baz()

def baz():
    pass
";
        let result = scan(src);
        let foo = &result.classes["Foo"];
        assert_eq!(foo.kind, ClassKind::Exception);
        assert_eq!(foo.inherits, vec!["Exception"]);
        assert_eq!(foo.methods["bar"].calls, vec!["baz"]);
        assert_eq!(foo.methods["bar"].line, 2);
        assert_eq!(result.functions["baz"].line, 4);
    }

    #[test]
    fn test_imports_are_ordered_and_deduplicated() {
        let src = "\
import os, sys as system
from pathlib import Path
import os
from . import sibling
";
        let result = scan(src);
        assert_eq!(result.imports, vec!["os", "sys", "pathlib", "."]);
    }

    #[test]
    fn test_module_level_constants_variables_aliases() {
        let src = "\
MAX_RETRIES = 3  # attempts
NAMES = ['a', 'b']
GREETING = \"hi\"
DEFAULT = compute()
timeout: float = 1.5
_private: int = 0
UserId = NewType[int]
Pair = Tuple[int, int]
type Vector = list[float]
";
        let result = scan(src);
        assert_eq!(result.constants["MAX_RETRIES"], ValueKind::Number);
        assert_eq!(result.constants["NAMES"], ValueKind::Collection);
        assert_eq!(result.constants["GREETING"], ValueKind::Str);
        assert_eq!(result.constants["DEFAULT"], ValueKind::Value);
        assert_eq!(result.variables, vec!["timeout"]);
        assert_eq!(result.type_aliases["Pair"], "Tuple[int, int]");
        assert_eq!(result.type_aliases["UserId"], "NewType[int]");
        assert_eq!(result.type_aliases["Vector"], "list[float]");
    }

    #[test]
    fn test_class_members() {
        let src = "\
@dataclass
class Config(Base, metaclass=ABCMeta):
    \"\"\"Runtime configuration.\"\"\"
    LIMIT = 10
    name: str
    retries: int = 3
    _hidden: bool = False

    def load(self, path: str) -> 'Config':
        return self.parse(path)

    def parse(self, path):
        if path:
            return path

    def __repr__(self):
        return 'Config'
";
        let result = scan(src);
        let config = &result.classes["Config"];
        assert_eq!(config.line, 2);
        assert_eq!(config.doc.as_deref(), Some("Runtime configuration."));
        assert_eq!(config.decorators, vec!["dataclass"]);
        assert_eq!(config.inherits, vec!["Base", "metaclass=ABCMeta"]);
        assert!(config.is_abstract);
        assert_eq!(config.class_constants["LIMIT"], ValueKind::Number);
        assert_eq!(config.properties, vec!["name", "retries"]);
        assert_eq!(
            config.methods.keys().collect::<Vec<_>>(),
            vec!["load", "parse"]
        );
        assert_eq!(
            config.methods["load"].signature,
            "(self, path: str) -> 'Config'"
        );
        assert_eq!(config.methods["load"].calls, vec!["parse"]);
        assert!(config.methods["parse"].calls.is_empty());
    }

    #[test]
    fn test_multiline_signature_and_async() {
        let src = "\
async def fetch(
    url: str,
    retries: int = 3,
) -> dict:
    \"\"\"Fetch a document.

    Longer description.
    \"\"\"
    return await download(url)

def download(url):
    pass
";
        let result = scan(src);
        let fetch = &result.functions["fetch"];
        assert_eq!(fetch.line, 1);
        assert_eq!(
            fetch.signature,
            "async (url: str, retries: int = 3,) -> dict"
        );
        assert_eq!(fetch.doc.as_deref(), Some("Fetch a document."));
        assert_eq!(fetch.calls, vec!["download"]);
        assert_eq!(result.functions["download"].line, 11);
    }

    #[test]
    fn test_unterminated_signature_is_dropped() {
        let src = "def broken(a,\n    b\n";
        let result = scan(src);
        assert!(result.functions.is_empty());
    }

    #[test]
    fn test_multiline_header_ends_at_balanced_paren() {
        let src = "\
def make():
    return 1


def helper():
    pass


def build(a=make(), b: int,
          c=1):
    return helper()


def label(sep=\")\", note: str = \"a:b\",  # (
          n=1) -> str:
    return make()
";
        let result = scan(src);
        assert_eq!(
            result.functions.keys().collect::<Vec<_>>(),
            vec!["make", "helper", "build", "label"]
        );

        let build = &result.functions["build"];
        assert_eq!(build.line, 9);
        assert_eq!(build.signature, "(a=make(), b: int, c=1)");
        assert_eq!(build.calls, vec!["helper"]);

        let label = &result.functions["label"];
        assert_eq!(label.line, 14);
        assert!(label.signature.ends_with("n=1) -> str"));
        assert_eq!(label.calls, vec!["make"]);
    }

    #[test]
    fn test_header_end_tracks_nesting() {
        let lines = ["def f(a=g(),", "      b={'k': (1, 2)}):", "    pass"];
        assert_eq!(header_end(&lines, 0), Some(1));
        let lines = ["def f[T: int](x) -> dict[str, int]:"];
        assert_eq!(header_end(&lines, 0), Some(0));
        let lines = ["def f(a=')',", "      b"];
        assert_eq!(header_end(&lines, 0), None);
    }

    #[test]
    fn test_enum_class_moves_to_enums() {
        let src = "\
class Color(Enum):
    \"\"\"Primary colors.\"\"\"
    RED = 1
    GREEN = 2
    BLUE = auto()

class Plain:
    pass
";
        let result = scan(src);
        assert!(!result.classes.contains_key("Color"));
        let color = &result.enums["Color"];
        assert_eq!(color.values, vec!["RED", "GREEN", "BLUE"]);
        assert_eq!(color.doc.as_deref(), Some("Primary colors."));
        assert!(result.classes.contains_key("Plain"));
    }

    #[test]
    fn test_nested_classes_and_functions_are_not_emitted() {
        let src = "\
class Outer:
    class Inner:
        def inner_method(self):
            pass

    def outer_method(self):
        def local_helper():
            pass
        return local_helper()

def top():
    def nested():
        pass
";
        let result = scan(src);
        assert_eq!(result.classes.len(), 1);
        let outer = &result.classes["Outer"];
        assert_eq!(
            outer.methods.keys().collect::<Vec<_>>(),
            vec!["outer_method"]
        );
        assert!(!outer.methods.contains_key("Outer"));
        assert_eq!(outer.methods["outer_method"].calls, vec!["local_helper"]);
        assert_eq!(
            result.functions.keys().collect::<Vec<_>>(),
            vec!["top"]
        );
    }

    #[test]
    fn test_abstract_method_marks_class() {
        let src = "\
class Shape:
    @abc.abstractmethod
    def area(self):
        ...
";
        let result = scan(src);
        let shape = &result.classes["Shape"];
        assert!(shape.is_abstract);
        assert_eq!(shape.methods["area"].decorators, vec!["abc.abstractmethod"]);
    }

    #[test]
    fn test_decorators_with_multiline_arguments() {
        let src = "\
@app.route(
    \"/items\",
    methods=[\"GET\"],
)
@login_required
def items():
    return []
";
        let result = scan(src);
        assert_eq!(
            result.functions["items"].decorators,
            vec!["app.route", "login_required"]
        );
        assert_eq!(result.functions["items"].line, 6);
    }

    #[test]
    fn test_docstring_contents_are_not_declarations() {
        let src = "\
def run():
    \"\"\"
    Args:
        value: the input
    def not_a_function():
    \"\"\"
    return 1

class Later:
    name: str
";
        let result = scan(src);
        assert_eq!(result.functions["run"].doc.as_deref(), Some("Args:"));
        assert!(!result.functions.contains_key("not_a_function"));
        assert_eq!(result.classes["Later"].properties, vec!["name"]);
    }

    #[test]
    fn test_dedent_ends_class_before_module_rules() {
        let src = "\
class A:
    def m(self):
        pass
LIMIT = 5
def after():
    pass
";
        let result = scan(src);
        assert_eq!(result.constants["LIMIT"], ValueKind::Number);
        assert!(result.functions.contains_key("after"));
        assert!(!result.classes["A"].methods.contains_key("after"));
    }

    #[test]
    fn test_multiline_class_header() {
        let src = "\
class Handler(
    BaseHandler,
    LoggingMixin,
):
    def handle(self):
        pass
";
        let result = scan(src);
        let handler = &result.classes["Handler"];
        assert_eq!(handler.inherits, vec!["BaseHandler", "LoggingMixin"]);
        assert!(handler.methods.contains_key("handle"));
    }

    #[test]
    fn test_call_graph_from_python() {
        let src = "\
def a():
    b()

def b():
    pass
";
        let result = scan(src);
        let graph = CallGraph::build(&result.functions, &result.classes);
        assert_eq!(graph.calls_map["a"], vec!["b"]);
        assert_eq!(graph.called_by_map["b"], vec!["a"]);
    }

    #[test]
    fn test_lines_are_valid_and_rescan_is_identical() {
        let src = "\
import json

class Store:
    def save(self, item):
        return json.dumps(item)

def main():
    Store().save({})
";
        let first = scan(src);
        let second = scan(src);
        assert_eq!(first, second);
        let line_count = src.lines().count();
        for record in first.functions.values() {
            assert!(record.line >= 1 && record.line <= line_count);
        }
        for class in first.classes.values() {
            assert!(class.line >= 1 && class.line <= line_count);
            for method in class.methods.values() {
                assert!(method.line >= 1 && method.line <= line_count);
            }
        }
        assert_eq!(first.functions["main"].calls, vec!["save"]);
    }
}
