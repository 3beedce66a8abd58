use thiserror::Error;

use crate::algebra::ExprId;

/// Everything that can go wrong in this crate.
///
/// Construction through the smart constructors cannot fail recoverably —
/// handing them structurally invalid input (a foreign [`ExprId`], an
/// intersection of nothing at all) is a caller bug and panics. The
/// recoverable failures are the ones below.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// A rank was requested past the end of a finite language.
    #[error("rank {index} is out of range for a language of {size} sequences")]
    IndexOutOfRange { index: u64, size: u64 },

    /// A fixpoint construction discovered more derivative states than the
    /// configured budget allows.
    ///
    /// Canonicalization keeps every well-formed expression's derivative set
    /// finite, so this points at a normalization bug; `expr` is the root the
    /// construction started from.
    #[error("state budget of {limit} states exceeded while compiling {expr:?}")]
    StateBudgetExceeded { limit: usize, expr: ExprId },

    /// The textual front-end rejected a pattern.
    #[error("invalid pattern: {0}")]
    Pattern(String),
}
