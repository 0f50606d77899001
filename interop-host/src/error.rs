//! Errors raised by the host before or after crossing the boundary
//!
//! Foreign calls themselves are infallible once their preconditions hold;
//! these variants are the checks the host performs to uphold them.

use std::path::PathBuf;

/// Result type for boundary operations
pub type Result<T> = std::result::Result<T, BoundaryError>;

#[derive(Debug, thiserror::Error)]
pub enum BoundaryError {
    #[error("native process_string returned a null pointer")]
    NullString,

    #[error("input contains an interior NUL byte at position {position}")]
    InteriorNul { position: usize },

    #[error("buffer of {len} elements exceeds the C int length limit")]
    BufferTooLarge { len: usize },

    #[error("a callback-carrying call is already in flight on this thread")]
    Reentrant,

    #[error("could not find {name} in any of these locations:{}", list_paths(.searched))]
    LibraryNotFound { name: String, searched: Vec<PathBuf> },

    #[error("failed to load native library {path:?}")]
    Load {
        path: PathBuf,
        #[source]
        source: libloading::Error,
    },

    #[error("native library is missing symbol `{symbol}`")]
    MissingSymbol {
        symbol: String,
        #[source]
        source: libloading::Error,
    },
}

fn list_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| format!("\n  - {}", p.display()))
        .collect()
}
