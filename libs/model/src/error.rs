//! Error types for the object model

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Object model errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("cannot construct a value of type {0}")]
    Unconstructible(String),

    #[error("cannot convert {from} to {to}")]
    Unconvertible { from: String, to: String },

    #[error("unsupported JSON value: {0}")]
    UnsupportedJson(String),
}
