//! # Timesearch
//!
//! In-memory search analytics service: load a timestamped query log once,
//! then answer distinct-count and most-popular questions about any calendar
//! span, addressed by a date prefix (`"2015"`, `"2015-03"`, `"2015-03-15 11:07"`).
//!
//! ## How it works
//!
//! Records are indexed in a calendar tree (year -> month -> day -> hour ->
//! minute) with lazily created, fixed-fanout nodes. A date prefix resolves
//! to a half-open interval; querying prunes the tree with an overlap test
//! and streams every value in the span, which the engine aggregates into
//! counts and rankings.
//!
//! ## Modules
//!
//! - [`index`]: The calendar tree and interval primitive
//! - [`query`]: Prefix resolution and aggregation (the search engine)
//! - [`dataset`]: TSV bulk loading at startup
//! - [`api`]: REST API server with Axum
//!
//! ## Quick Start
//!
//! ```rust
//! use timesearch::query::SearchEngine;
//! use chrono::NaiveDate;
//!
//! let mut engine = SearchEngine::new();
//! let ts = NaiveDate::from_ymd_opt(2021, 5, 10)
//!     .unwrap()
//!     .and_hms_opt(10, 30, 0)
//!     .unwrap();
//! engine.insert(ts, "rust borrow checker".to_string());
//!
//! assert_eq!(engine.count("2021-05").unwrap(), 1);
//! let top = engine.popular("2021", 3).unwrap();
//! assert_eq!(top[0].count, 1);
//! ```

pub mod api;
pub mod config;
pub mod dataset;
pub mod index;
pub mod query;

// Re-export top-level types for convenience
pub use index::{IntervalError, TimeIndex, TimeInterval};

pub use query::{PrefixError, QueryCount, QueryError, SearchEngine};

pub use api::{build_router, serve, ApiConfig, ApiError, AppState};

pub use config::{Config, ConfigError};

pub use dataset::{load_tsv, DatasetError};
