//! Crate error type.
//!
//! The engine itself never fails: reconstruction degrades to plain text
//! instead. Errors only surface at the edges, when decoding contract JSON,
//! compiling a pattern explicitly, or reading input in the binary.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid JSON input: {0}")]
    Json(#[from] serde_json::Error),

    #[error("pattern {pattern:?} does not compile: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("failed to read input: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
