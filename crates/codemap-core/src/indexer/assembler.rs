//! Final pass over a scanner's raw output.

use std::collections::HashSet;

use indexmap::IndexMap;

use crate::models::{ClassKind, ClassRecord, EnumRecord, FileExtractionResult};

/// Keep the first occurrence of every entry, preserving order.
fn dedupe(list: &mut Vec<String>) {
    let mut seen = HashSet::new();
    list.retain(|item| seen.insert(item.clone()));
}

/// Normalize a scanner result.
///
/// Enum-classified classes move into `enums` carrying only their values and
/// doc; the ordered lists lose duplicates.  Applying it twice is a no-op.
pub fn assemble(mut result: FileExtractionResult) -> FileExtractionResult {
    let classes = std::mem::take(&mut result.classes);
    let mut kept: IndexMap<String, ClassRecord> = IndexMap::with_capacity(classes.len());
    for (name, class) in classes {
        if class.kind == ClassKind::Enum {
            result.enums.insert(
                name,
                EnumRecord {
                    values: class.values,
                    doc: class.doc,
                },
            );
        } else {
            kept.insert(name, class);
        }
    }
    result.classes = kept;

    dedupe(&mut result.imports);
    dedupe(&mut result.variables);
    dedupe(&mut result.sources);
    result
}
