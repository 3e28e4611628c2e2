//! Query Error Types

use crate::index::IntervalError;
use thiserror::Error;

/// Errors raised while resolving or answering a query
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// The date prefix does not denote a well-formed calendar span.
    /// A client-input failure, surfaced as-is and never recovered.
    #[error("invalid date prefix: {0}")]
    InvalidPrefix(#[from] PrefixError),

    /// A resolved interval violated `start < end`. A defect in the resolver,
    /// not a client error; it must fail loudly rather than return an empty
    /// or wrong result.
    #[error("interval invariant violated: {0}")]
    InvalidInterval(#[from] IntervalError),
}

/// Ways a date prefix can fail to parse
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PrefixError {
    #[error("empty date prefix")]
    Empty,

    #[error("malformed date prefix {prefix:?}: {reason}")]
    Malformed { prefix: String, reason: String },

    #[error("date prefix {prefix:?} does not denote a valid calendar date")]
    OutOfRange { prefix: String },
}
