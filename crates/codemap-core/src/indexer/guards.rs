//! Scan bounds and tunables shared by the language scanners.

use std::collections::HashSet;

/// Lines after a shell function header searched for positional parameters.
pub const SHELL_PARAM_WINDOW: usize = 20;

/// Highest shell positional parameter reported in a signature.
pub const SHELL_MAX_POSITIONAL: usize = 32;

/// Bytes scanned for the closing brace of a class member body.
pub const METHOD_BODY_SCAN_LIMIT: usize = 3000;

/// Bytes scanned for the closing brace of a standalone function body.
pub const FUNCTION_BODY_SCAN_LIMIT: usize = 5000;

/// Maximum distance between the end of a header and its opening brace.
pub const BODY_BRACE_MAX_DISTANCE: usize = 100;

/// Bytes scanned to complete an object-shaped type alias.
pub const TYPE_ALIAS_SCAN_LIMIT: usize = 5000;

/// Per-scan options.  `Default` carries the documented caps above.
#[derive(Clone, Debug)]
pub struct ScanOptions {
    pub shell_param_window: usize,
    pub shell_max_positional: usize,
    pub method_body_scan_limit: usize,
    pub function_body_scan_limit: usize,
    pub body_brace_max_distance: usize,
    pub type_alias_scan_limit: usize,
    /// Names never reported as calls, on top of the per-language lists.
    pub extra_call_exclusions: HashSet<String>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            shell_param_window: SHELL_PARAM_WINDOW,
            shell_max_positional: SHELL_MAX_POSITIONAL,
            method_body_scan_limit: METHOD_BODY_SCAN_LIMIT,
            function_body_scan_limit: FUNCTION_BODY_SCAN_LIMIT,
            body_brace_max_distance: BODY_BRACE_MAX_DISTANCE,
            type_alias_scan_limit: TYPE_ALIAS_SCAN_LIMIT,
            extra_call_exclusions: HashSet::new(),
        }
    }
}

impl ScanOptions {
    /// Add names that must never appear in `calls` lists.
    pub fn with_call_exclusions<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extra_call_exclusions
            .extend(names.into_iter().map(Into::into));
        self
    }

    pub fn is_excluded_call(&self, name: &str) -> bool {
        self.extra_call_exclusions.contains(name)
    }
}
