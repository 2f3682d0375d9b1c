//! Call graph construction from per-symbol `calls` lists.
//!
//! Edges are one hop: a function or method maps to the names its body
//! appears to invoke, and the reverse map answers "who calls this name".
//! Functions are keyed by bare name, methods by `Class.method`.  Callee
//! names stay as the scanners reported them (bare names).

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::models::{ClassRecord, FileExtractionResult, SymbolRecord};

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Forward and reverse call maps.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallGraph {
    /// Caller → callees, in declaration order of the callers.
    pub calls_map: IndexMap<String, Vec<String>>,
    /// Callee → callers, deduplicated in first-discovery order.
    pub called_by_map: IndexMap<String, Vec<String>>,
}

impl CallGraph {
    /// Build the graph from a function table and a class table.
    ///
    /// Symbols without calls get no `calls_map` entry.
    pub fn build(
        functions: &IndexMap<String, SymbolRecord>,
        classes: &IndexMap<String, ClassRecord>,
    ) -> Self {
        let mut graph = CallGraph::default();

        for (name, function) in functions {
            graph.add_caller(name.clone(), &function.calls);
        }
        for (class_name, class) in classes {
            for (method_name, method) in &class.methods {
                graph.add_caller(format!("{class_name}.{method_name}"), &method.calls);
            }
        }

        let mut called_by: IndexMap<String, Vec<String>> = IndexMap::new();
        for (caller, callees) in &graph.calls_map {
            for callee in callees {
                let callers = called_by.entry(callee.clone()).or_default();
                if !callers.contains(caller) {
                    callers.push(caller.clone());
                }
            }
        }
        graph.called_by_map = called_by;
        graph
    }

    /// Graph of a single file.
    pub fn from_result(result: &FileExtractionResult) -> Self {
        Self::build(&result.functions, &result.classes)
    }

    fn add_caller(&mut self, caller: String, calls: &[String]) {
        if !calls.is_empty() {
            self.calls_map.insert(caller, calls.to_vec());
        }
    }

    pub fn callees(&self, symbol: &str) -> &[String] {
        self.calls_map
            .get(symbol)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn callers(&self, symbol: &str) -> &[String] {
        self.called_by_map
            .get(symbol)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Number of caller → callee edges.
    pub fn edge_count(&self) -> usize {
        self.calls_map.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.calls_map.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
