//! Error types for the navigation engine

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Navigation errors
///
/// Every variant propagates unchanged to the caller; the engine performs no
/// silent recovery beyond the lenient-mode absence path.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("invalid path: {0}")]
    InvalidPath(String),

    #[error("root value is absent for path `{path}`")]
    NullRoot { path: String },

    #[error("no value at `{path}`")]
    MissingSegment { path: String },

    #[error("static type of `{path}` cannot be determined")]
    UnsafePath { path: String },

    #[error("cannot create a value at `{path}` (root {root}): {reason}")]
    Creation {
        path: String,
        root: String,
        reason: String,
    },

    #[error("cannot convert `{path}` from {from} to {to}")]
    Conversion {
        path: String,
        from: String,
        to: String,
    },

    #[error("path function `{name}` does not support {operation}")]
    UnsupportedFunction { name: String, operation: String },

    #[error("no path function named `{name}` (at `{path}`)")]
    UnknownFunction { name: String, path: String },

    #[error("indexed write at `{path}` requires caching (unordered collections are addressed through a cached view)")]
    CachingRequired { path: String },
}
