//! Error types for the codemap core library.
//!
//! The scanners themselves never fail; only the project layer (walking the
//! tree, reading files, rendering JSON) reports errors.

/// Top-level error enum for the codemap core library.
#[derive(Debug, thiserror::Error)]
pub enum CodemapError {
    #[error("Index error: {0}")]
    Index(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type CodemapResult<T> = Result<T, CodemapError>;
