//! Errors the orchestrator can hand back from a `parse` call.

use thiserror::Error;

/// A fatal, non-recoverable failure during lexing — distinct from an
/// ordinary lexical error, which is absorbed into the tree as an error
/// leaf and does not abort the parse.
#[derive(Debug, Clone, Error)]
pub enum ScannerError {
    /// The external scanner signaled it could not continue.
    #[error("external scanner reported a fatal error at byte {byte_offset}")]
    ExternalScannerFailed { byte_offset: u32 },
}

/// Why `parse`/`parse_with_options` did not produce a tree.
#[derive(Debug, Clone, Error)]
pub enum ParseError {
    /// The external scanner failed; the parse is aborted and any partial
    /// state is released rather than preserved for resume.
    #[error("scanner error: {0}")]
    Scanner(#[from] ScannerError),

    /// Cancellation flag, deadline, or progress callback fired. Resumable
    /// state (GSS, reusable cursor, rebalance worklist) is preserved; the
    /// next `parse` call on the same parser with the same language and
    /// input resumes seamlessly.
    #[error("parse canceled")]
    Canceled,

    /// `set_language` was called with a table the ABI version or wasm
    /// store availability rejects. Rejected eagerly, never
    /// returned from `parse` itself.
    #[error("unsupported language: {0}")]
    UnsupportedLanguage(String),
}
