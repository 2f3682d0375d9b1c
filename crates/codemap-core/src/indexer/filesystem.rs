//! Filesystem scanning helpers for indexing passes.

use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use ignore::WalkBuilder;
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::errors::{CodemapError, CodemapResult};
use crate::indexer::pipeline::IndexOptions;
use crate::models::Language;

const LANGUAGE_BY_EXTENSION: &[(&str, Language)] = &[
    ("py", Language::Python),
    ("js", Language::JavaScript),
    ("jsx", Language::JavaScript),
    ("mjs", Language::JavaScript),
    ("cjs", Language::JavaScript),
    ("ts", Language::TypeScript),
    ("tsx", Language::TypeScript),
    ("sh", Language::Shell),
    ("bash", Language::Shell),
];

/// Directories never descended into, whatever the ignore files say.
pub const DEFAULT_IGNORED_DIRS: &[&str] = &[
    ".git",
    "node_modules",
    "__pycache__",
    ".venv",
    "venv",
    "env",
    "build",
    "dist",
    ".next",
    "target",
    ".pytest_cache",
    "coverage",
    ".idea",
    ".vscode",
    "eggs",
    ".eggs",
    ".claude",
];

/// Project-specific ignore file honored next to `.gitignore`.
pub const CUSTOM_IGNORE_FILENAME: &str = ".codemapignore";

pub fn detect_language(path: &Path) -> Option<Language> {
    let ext = path.extension()?.to_string_lossy().to_lowercase();
    LANGUAGE_BY_EXTENSION
        .iter()
        .find(|(e, _)| *e == ext.as_str())
        .map(|(_, language)| *language)
}

/// `path` relative to `root`, with forward slashes.
pub fn relative_path(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}

/// Source files under `root` in a detectable language, sorted.
///
/// Honors `.gitignore`, `.ignore`, `.codemapignore` and git excludes (also
/// outside a git checkout), skips [`DEFAULT_IGNORED_DIRS`], hidden entries
/// unless `include_hidden` is set, and files above `max_file_bytes`.
/// Unreadable entries are logged and skipped.
pub fn iter_source_files(root: &Path, options: &IndexOptions) -> CodemapResult<Vec<PathBuf>> {
    if !std::fs::metadata(root)?.is_dir() {
        return Err(CodemapError::Index(format!(
            "not a directory: {}",
            root.display()
        )));
    }

    let mut builder = WalkBuilder::new(root);
    builder
        .hidden(!options.include_hidden)
        .git_ignore(true)
        .git_global(true)
        .git_exclude(true)
        .ignore(true)
        .require_git(false)
        .follow_links(false)
        .add_custom_ignore_filename(CUSTOM_IGNORE_FILENAME)
        .filter_entry(|entry| {
            let is_dir = entry.file_type().is_some_and(|ft| ft.is_dir());
            !(is_dir
                && entry.depth() > 0
                && DEFAULT_IGNORED_DIRS.contains(&entry.file_name().to_string_lossy().as_ref()))
        });

    let mut files = Vec::new();
    for entry in builder.build() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                warn!(error = %err, "skipping unreadable entry");
                continue;
            }
        };
        if !entry.file_type().is_some_and(|ft| ft.is_file()) {
            continue;
        }
        let path = entry.path();
        if detect_language(path).is_none() {
            continue;
        }
        let size = entry.metadata().map(|m| m.len()).unwrap_or(0);
        if size > options.max_file_bytes {
            debug!(path = %path.display(), size, "skipping oversized file");
            continue;
        }
        files.push(entry.into_path());
    }
    files.sort();
    Ok(files)
}

/// Change fingerprint of a file set: SHA-256 over `relative_path:mtime`
/// for every file in path order, first 16 hex digits.  Files whose
/// modification time cannot be read are left out.
pub fn files_fingerprint(root: &Path, files: &[PathBuf]) -> String {
    let mut entries: Vec<(String, &PathBuf)> = files
        .iter()
        .map(|path| (relative_path(root, path), path))
        .collect();
    entries.sort();

    let mut hasher = Sha256::new();
    for (rel, path) in entries {
        let modified = std::fs::metadata(path)
            .and_then(|m| m.modified())
            .ok()
            .and_then(|time| time.duration_since(UNIX_EPOCH).ok());
        if let Some(mtime) = modified {
            hasher.update(format!(
                "{rel}:{}.{:09}",
                mtime.as_secs(),
                mtime.subsec_nanos()
            ));
        }
    }
    let digest = format!("{:x}", hasher.finalize());
    digest[..16].to_string()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    fn rel_paths(root: &Path, files: &[PathBuf]) -> Vec<String> {
        files.iter().map(|f| relative_path(root, f)).collect()
    }

    #[test]
    fn test_detect_language() {
        assert_eq!(detect_language(Path::new("a/b.py")), Some(Language::Python));
        assert_eq!(detect_language(Path::new("x.MJS")), Some(Language::JavaScript));
        assert_eq!(detect_language(Path::new("x.tsx")), Some(Language::TypeScript));
        assert_eq!(detect_language(Path::new("run.bash")), Some(Language::Shell));
        assert_eq!(detect_language(Path::new("README.md")), None);
        assert_eq!(detect_language(Path::new("Makefile")), None);
    }

    #[test]
    fn test_iter_source_files_filters() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(root, "src/app.py", "x = 1\n");
        write(root, "src/ui.ts", "let a = 1;\n");
        write(root, "scripts/run.sh", "echo hi\n");
        write(root, "README.md", "# readme\n");
        write(root, "node_modules/pkg/index.js", "module.exports = 1;\n");
        write(root, "build/out.py", "y = 2\n");
        write(root, "generated/skip.py", "z = 3\n");
        write(root, "private/secret.py", "k = 4\n");
        write(root, ".hidden/tool.py", "h = 5\n");
        write(root, ".gitignore", "generated/\n");
        write(root, ".codemapignore", "private/\n");

        let files = iter_source_files(root, &IndexOptions::default()).unwrap();
        assert_eq!(
            rel_paths(root, &files),
            vec!["scripts/run.sh", "src/app.py", "src/ui.ts"]
        );
    }

    #[test]
    fn test_iter_source_files_hidden_and_size() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(root, ".hidden/tool.py", "h = 5\n");
        write(root, "big.py", &"x = 1\n".repeat(100));

        let options = IndexOptions {
            include_hidden: true,
            max_file_bytes: 64,
            ..IndexOptions::default()
        };
        let files = iter_source_files(root, &options).unwrap();
        assert_eq!(rel_paths(root, &files), vec![".hidden/tool.py"]);
    }

    #[test]
    fn test_iter_source_files_rejects_missing_root() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        assert!(iter_source_files(&missing, &IndexOptions::default()).is_err());
    }

    #[test]
    fn test_fingerprint_is_stable_and_order_independent() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(root, "a.py", "a = 1\n");
        write(root, "b.py", "b = 1\n");
        let a = root.join("a.py");
        let b = root.join("b.py");

        let first = files_fingerprint(root, &[a.clone(), b.clone()]);
        let second = files_fingerprint(root, &[b, a.clone()]);
        assert_eq!(first, second);
        assert_eq!(first.len(), 16);
        assert!(first.chars().all(|c| c.is_ascii_hexdigit()));

        let fewer = files_fingerprint(root, &[a]);
        assert_ne!(first, fewer);
    }
}
