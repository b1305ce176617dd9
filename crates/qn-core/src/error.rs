//! Base error type for the `qn-*` crates.
//!
//! Higher crates may define their own error enums and wrap `QnError` as one
//! variant (see `qn-sim`), or convert into it via `From`.  Prefer whichever
//! keeps error sites clean.

use thiserror::Error;

/// The top-level error type for `qn-core` and a common base for the other
/// `qn-*` crates.
#[derive(Debug, Error)]
pub enum QnError {
    /// Invalid construction-time input: bad distribution parameters, a
    /// zero buffer capacity, a zero channel count, and the like.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Shorthand result type for all `qn-*` crates.
pub type QnResult<T> = Result<T, QnError>;
