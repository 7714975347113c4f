use std::path::PathBuf;

use thiserror::Error;

/// Failures that abort a resolution request.
///
/// A node or expansion that simply does not sit at the target location is not
/// an error; the matcher skips it. Everything here is fatal for the whole
/// request and no partially filled query is handed back.
#[derive(Debug, Error)]
pub enum ExpandError {
    /// The call sits somewhere a single statement replacement cannot express,
    /// e.g. inside another call, a condition or a loop header.
    #[error("{0}")]
    UnsafeContext(String),

    /// An internal expectation about the tree or the query did not hold.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    #[error("no source buffer loaded for '{file}'")]
    SourceUnavailable { file: String },

    #[error("offset range {begin}..{end} is outside of '{file}'")]
    RangeOutOfBounds { file: String, begin: usize, end: usize },

    #[error("range spans two files ('{begin_file}' and '{end_file}')")]
    RangeSpansFiles { begin_file: String, end_file: String },

    #[error("location {line}:{column} does not exist in '{file}'")]
    InvalidTarget { file: String, line: u32, column: u32 },

    #[error("failed to parse clang AST JSON: {0}")]
    AstParse(#[from] serde_json::Error),

    #[error("failed to read '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl ExpandError {
    pub(crate) fn unsafe_context(message: impl Into<String>) -> Self {
        Self::UnsafeContext(message.into())
    }

    pub(crate) fn invariant(message: impl Into<String>) -> Self {
        Self::InvariantViolation(message.into())
    }

    /// Whether this error comes from the call-site classification rather than
    /// from missing inputs or internal defects.
    pub fn is_unsafe_context(&self) -> bool {
        matches!(self, Self::UnsafeContext(_))
    }
}

pub type Result<T, E = ExpandError> = std::result::Result<T, E>;
