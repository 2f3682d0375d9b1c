//! Codemap core library: signature and call-graph extraction for Python,
//! JavaScript/TypeScript and shell sources.
//!
//! Each scanner turns decoded text into a [`FileExtractionResult`] without
//! parsing the language properly: indentation, brace depth and line shape
//! are enough to recover imports, functions, classes, constants and a
//! one-hop call graph.  [`index_project`] runs the scanners over a whole
//! tree in parallel and merges the results.

pub mod errors;
pub mod indexer;
pub mod models;

pub use errors::{CodemapError, CodemapResult};
pub use indexer::callgraph::CallGraph;
pub use indexer::guards::ScanOptions;
pub use indexer::pipeline::{index_project, IndexOptions, ProjectIndex};
pub use indexer::symbols::{extract_symbols, extract_symbols_with_options};
pub use models::{FileExtractionResult, Language};
