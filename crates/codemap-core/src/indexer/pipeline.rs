//! Project indexing orchestration with Rayon-based parallelism.

use std::path::{Path, PathBuf};
use std::time::Instant;

use indexmap::IndexMap;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::errors::CodemapResult;
use crate::indexer::callgraph::CallGraph;
use crate::indexer::filesystem::{
    detect_language, files_fingerprint, iter_source_files, relative_path,
};
use crate::indexer::guards::ScanOptions;
use crate::indexer::symbols::extract_symbols_with_options;
use crate::models::{ClassRecord, FileExtractionResult, Language, SymbolRecord};

/// Files larger than this are not scanned unless configured otherwise.
pub const DEFAULT_MAX_FILE_BYTES: u64 = 1024 * 1024;

const FALLBACK_WORKERS: usize = 4;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Options for a whole-project indexing run.
#[derive(Clone, Debug)]
pub struct IndexOptions {
    pub workers: usize,
    pub max_file_bytes: u64,
    pub include_hidden: bool,
    pub scan: ScanOptions,
}

impl Default for IndexOptions {
    fn default() -> Self {
        Self {
            workers: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(FALLBACK_WORKERS),
            max_file_bytes: DEFAULT_MAX_FILE_BYTES,
            include_hidden: false,
            scan: ScanOptions::default(),
        }
    }
}

impl IndexOptions {
    /// Defaults overridden by `CODEMAP_WORKERS`, `CODEMAP_MAX_FILE_BYTES`
    /// and `CODEMAP_INCLUDE_HIDDEN`.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            workers: parse_count(
                std::env::var("CODEMAP_WORKERS").ok().as_deref(),
                defaults.workers,
            ),
            max_file_bytes: parse_count(
                std::env::var("CODEMAP_MAX_FILE_BYTES").ok().as_deref(),
                defaults.max_file_bytes,
            ),
            include_hidden: parse_flag(
                std::env::var("CODEMAP_INCLUDE_HIDDEN").ok().as_deref(),
                defaults.include_hidden,
            ),
            scan: defaults.scan,
        }
    }
}

/// Unset keeps the default; anything but `0`/`false`/`no`/`off` enables.
fn parse_flag(raw: Option<&str>, default: bool) -> bool {
    match raw {
        None => default,
        Some(value) => !matches!(
            value.trim().to_ascii_lowercase().as_str(),
            "0" | "false" | "no" | "off"
        ),
    }
}

fn parse_count<T: std::str::FromStr>(raw: Option<&str>, default: T) -> T {
    match raw.map(str::trim) {
        Some(value) => match value.parse() {
            Ok(parsed) => parsed,
            Err(_) => {
                warn!(value, "ignoring unparsable numeric setting");
                default
            }
        },
        None => default,
    }
}

// ---------------------------------------------------------------------------
// Extraction
// ---------------------------------------------------------------------------

pub struct SourceFile {
    pub path: String,
    pub absolute: PathBuf,
    pub language: Language,
}

pub struct FileOutcome {
    pub path: String,
    pub language: Language,
    pub result: FileExtractionResult,
    pub error: Option<String>,
}

fn extract_file_worker(file: &SourceFile, options: &ScanOptions) -> FileOutcome {
    let bytes = match std::fs::read(&file.absolute) {
        Ok(bytes) => bytes,
        Err(err) => {
            warn!(path = %file.path, error = %err, "failed to read source file");
            return FileOutcome {
                path: file.path.clone(),
                language: file.language,
                result: FileExtractionResult::default(),
                error: Some(err.to_string()),
            };
        }
    };
    let source = String::from_utf8_lossy(&bytes);
    FileOutcome {
        path: file.path.clone(),
        language: file.language,
        result: extract_symbols_with_options(&source, file.language, options),
        error: None,
    }
}

/// Extract every file on a pool of `workers` threads, in input order.
pub fn parallel_extract(
    files: &[SourceFile],
    workers: usize,
    options: &ScanOptions,
) -> Vec<FileOutcome> {
    if files.is_empty() {
        return vec![];
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers.max(1))
        .build();

    match pool {
        Ok(pool) => pool.install(|| {
            files
                .par_iter()
                .map(|file| extract_file_worker(file, options))
                .collect()
        }),
        Err(err) => {
            warn!(error = %err, "thread pool unavailable, extracting sequentially");
            files
                .iter()
                .map(|file| extract_file_worker(file, options))
                .collect()
        }
    }
}

// ---------------------------------------------------------------------------
// Project index
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    pub language: Language,
    #[serde(flatten)]
    pub result: FileExtractionResult,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexStats {
    pub files_seen: usize,
    pub files_indexed: usize,
    pub files_failed: usize,
    pub symbols_indexed: usize,
    pub edges_indexed: usize,
    pub elapsed_ms: u64,
}

/// Everything known about a project after one indexing run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectIndex {
    pub root: String,
    /// Change fingerprint of the scanned file set.
    pub fingerprint: String,
    /// Per-file results keyed by relative path, in path order.
    pub files: IndexMap<String, FileEntry>,
    pub call_graph: CallGraph,
    pub stats: IndexStats,
}

impl ProjectIndex {
    pub fn to_json(&self) -> CodemapResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Discover source files under `root`.
pub fn scan_source_files(root: &Path, options: &IndexOptions) -> CodemapResult<Vec<SourceFile>> {
    let files = iter_source_files(root, options)?
        .into_iter()
        .filter_map(|absolute| {
            let language = detect_language(&absolute)?;
            Some(SourceFile {
                path: relative_path(root, &absolute),
                absolute,
                language,
            })
        })
        .collect();
    Ok(files)
}

/// Merge per-file tables into one namespace.  Later files win on name
/// collisions.
fn merge_symbols(
    files: &IndexMap<String, FileEntry>,
) -> (IndexMap<String, SymbolRecord>, IndexMap<String, ClassRecord>) {
    let mut functions = IndexMap::new();
    let mut classes = IndexMap::new();
    for (path, entry) in files {
        for (name, function) in &entry.result.functions {
            if functions.insert(name.clone(), function.clone()).is_some() {
                debug!(%path, %name, "function name collision, later definition kept");
            }
        }
        for (name, class) in &entry.result.classes {
            if classes.insert(name.clone(), class.clone()).is_some() {
                debug!(%path, %name, "class name collision, later definition kept");
            }
        }
    }
    (functions, classes)
}

/// Index every supported source file under `root`.
pub fn index_project(root: &Path, options: &IndexOptions) -> CodemapResult<ProjectIndex> {
    let started = Instant::now();
    let sources = scan_source_files(root, options)?;
    let absolute: Vec<PathBuf> = sources.iter().map(|s| s.absolute.clone()).collect();
    let fingerprint = files_fingerprint(root, &absolute);

    let outcomes = parallel_extract(&sources, options.workers, &options.scan);

    let mut stats = IndexStats {
        files_seen: sources.len(),
        ..IndexStats::default()
    };
    let mut files = IndexMap::with_capacity(outcomes.len());
    for outcome in outcomes {
        if outcome.error.is_some() {
            stats.files_failed += 1;
            continue;
        }
        stats.files_indexed += 1;
        stats.symbols_indexed += outcome.result.callable_count();
        files.insert(
            outcome.path,
            FileEntry {
                language: outcome.language,
                result: outcome.result,
            },
        );
    }

    let (functions, classes) = merge_symbols(&files);
    let call_graph = CallGraph::build(&functions, &classes);
    stats.edges_indexed = call_graph.edge_count();
    stats.elapsed_ms = started.elapsed().as_millis() as u64;

    info!(
        root = %root.display(),
        files = stats.files_indexed,
        failed = stats.files_failed,
        symbols = stats.symbols_indexed,
        edges = stats.edges_indexed,
        elapsed_ms = stats.elapsed_ms,
        "project indexed"
    );

    Ok(ProjectIndex {
        root: root.to_string_lossy().into_owned(),
        fingerprint,
        files,
        call_graph,
        stats,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
