//! Query Layer
//!
//! Resolves date prefixes into intervals and aggregates the index's raw
//! value stream into the two service answers:
//!
//! - [`SearchEngine::count`]: distinct queries in a span
//! - [`SearchEngine::popular`]: top-N queries by frequency in a span

pub mod engine;
pub mod error;
pub mod prefix;

pub use engine::{QueryCount, SearchEngine};
pub use error::{PrefixError, QueryError};
pub use prefix::resolve_prefix;
