//! Index Structures
//!
//! The calendar tree index and its interval primitive:
//! - [`TimeInterval`]: half-open `[start, end)` span, the query currency
//! - [`TimeIndex`]: year/month/day/hour/minute tree over raw values

pub mod interval;
pub mod tree;

pub use interval::{IntervalError, TimeInterval};
pub use tree::{QueryIter, TimeIndex};
