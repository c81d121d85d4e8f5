//! Assembly error types.
//!
//! Every error names the offending set or file in its message. None of
//! these conditions are retried inside the core.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while building a test from its fragment files.
#[derive(Debug, Error)]
pub enum AssemblyError {
    /// A fragment or template file could not be read.
    #[error("source unavailable: {}", path.display())]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A fragment file broke the format under strict parsing.
    #[error("malformed fragment {}:{line}: {reason}", path.display())]
    MalformedFragment {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    /// A set asks for more questions than its files contain.
    #[error("insufficient questions in set '{set}': requested {requested}, only {available} available")]
    InsufficientQuestions {
        set: String,
        requested: usize,
        available: usize,
    },

    /// A page-break policy that can never place a break sensibly.
    #[error("invalid page-break policy: {reason}")]
    InvalidPageBreakPolicy { reason: String },
}
