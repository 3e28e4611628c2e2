//! Search Engine
//!
//! Aggregation layer over the calendar tree: resolves date prefixes and
//! turns the raw value stream from [`TimeIndex::query`] into distinct counts
//! and popularity rankings.
//!
//! The engine is filled once during the load phase, then shared behind an
//! `Arc` and never mutated again; every query drains a fresh traversal of
//! the frozen tree.

use crate::index::{TimeIndex, TimeInterval};
use crate::query::error::QueryError;
use crate::query::prefix::resolve_prefix;
use chrono::NaiveDateTime;
use std::collections::{HashMap, HashSet};

/// A query string with its occurrence count in some interval
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryCount {
    pub query: String,
    pub count: u64,
}

/// Read side of the service: distinct counts and top-N rankings
#[derive(Debug, Default)]
pub struct SearchEngine {
    index: TimeIndex<String>,
}

impl SearchEngine {
    /// Create an empty engine
    pub fn new() -> Self {
        Self {
            index: TimeIndex::new(),
        }
    }

    /// Record one query occurrence. Load phase only; once the engine is
    /// shared with request handlers nothing holds `&mut self` anymore.
    pub fn insert(&mut self, timestamp: NaiveDateTime, query: String) {
        self.index.insert(timestamp, query);
    }

    /// Total number of loaded records
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Whether any records were loaded
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Number of distinct queries in the span denoted by `prefix`
    pub fn count(&self, prefix: &str) -> Result<usize, QueryError> {
        let interval = resolve_prefix(prefix)?;
        Ok(self.distinct_count(&interval))
    }

    /// The `size` most frequent queries in the span denoted by `prefix`
    pub fn popular(&self, prefix: &str, size: usize) -> Result<Vec<QueryCount>, QueryError> {
        let interval = resolve_prefix(prefix)?;
        Ok(self.top_queries(&interval, size))
    }

    /// Number of distinct queries in `interval`.
    ///
    /// The tree yields raw occurrences, neither sorted nor deduplicated, so
    /// the stream is fully drained into a set.
    pub fn distinct_count(&self, interval: &TimeInterval) -> usize {
        self.index
            .query(interval)
            .collect::<HashSet<&String>>()
            .len()
    }

    /// The `size` most frequent queries in `interval`, descending by count.
    ///
    /// Equal counts are ordered ascending by query string so the ranking is
    /// deterministic regardless of traversal order. `size == 0` yields an
    /// empty ranking; a `size` beyond the distinct count returns everything.
    pub fn top_queries(&self, interval: &TimeInterval, size: usize) -> Vec<QueryCount> {
        if size == 0 {
            return Vec::new();
        }

        let mut frequencies: HashMap<&String, u64> = HashMap::new();
        for query in self.index.query(interval) {
            *frequencies.entry(query).or_insert(0) += 1;
        }

        let mut ranked: Vec<(&String, u64)> = frequencies.into_iter().collect();
        ranked.sort_unstable_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        ranked.truncate(size);

        ranked
            .into_iter()
            .map(|(query, count)| QueryCount {
                query: query.clone(),
                count,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn dt(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(h, mi, 0)
            .unwrap()
    }

    fn sample_engine() -> SearchEngine {
        let mut engine = SearchEngine::new();
        engine.insert(dt(2021, 5, 10, 10, 0), "a".to_string());
        engine.insert(dt(2021, 5, 10, 10, 30), "a".to_string());
        engine.insert(dt(2021, 5, 11, 9, 0), "b".to_string());
        engine
    }

    #[test]
    fn test_count_over_month_prefix() {
        let engine = sample_engine();
        assert_eq!(engine.count("2021-05").unwrap(), 2);
    }

    #[test]
    fn test_count_excludes_other_spans() {
        let engine = sample_engine();
        assert_eq!(engine.count("2021-04").unwrap(), 0);
        assert_eq!(engine.count("2021-05-10").unwrap(), 1);
        assert_eq!(engine.count("2020").unwrap(), 0);
    }

    #[test]
    fn test_popular_ranks_by_frequency() {
        let engine = sample_engine();
        let top = engine.popular("2021-05", 1).unwrap();
        assert_eq!(
            top,
            vec![QueryCount {
                query: "a".to_string(),
                count: 2
            }]
        );
    }

    #[test]
    fn test_popular_size_beyond_distinct_returns_all() {
        let engine = sample_engine();
        let top = engine.popular("2021-05", 10).unwrap();
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].query, "a");
        assert_eq!(top[1].query, "b");
    }

    #[test]
    fn test_popular_zero_size_is_empty() {
        let engine = sample_engine();
        assert!(engine.popular("2021-05", 0).unwrap().is_empty());
    }

    #[test]
    fn test_invalid_prefix_is_an_error() {
        let engine = sample_engine();
        assert!(matches!(
            engine.count("2021-13"),
            Err(QueryError::InvalidPrefix(_))
        ));
        assert!(engine.popular("2021-13", 3).is_err());
    }

    #[test]
    fn test_ties_break_lexicographically() {
        let mut engine = SearchEngine::new();
        // deliberately inserted in an order that would rank wrong if the
        // incidental traversal order leaked through
        engine.insert(dt(2021, 5, 10, 10, 0), "zebra".to_string());
        engine.insert(dt(2021, 5, 10, 10, 1), "apple".to_string());
        engine.insert(dt(2021, 5, 10, 10, 2), "mango".to_string());

        let top = engine.popular("2021-05", 3).unwrap();
        let names: Vec<&str> = top.iter().map(|qc| qc.query.as_str()).collect();
        assert_eq!(names, vec!["apple", "mango", "zebra"]);
        assert!(top.iter().all(|qc| qc.count == 1));
    }

    #[test]
    fn test_distinct_count_matches_set_of_stream() {
        let engine = sample_engine();
        let interval = resolve_prefix("2021").unwrap();
        let drained: HashSet<String> = {
            let mut set = HashSet::new();
            let mut n = 0usize;
            // count occurrences while deduplicating, to check both facts
            engine.top_queries(&interval, usize::MAX).iter().for_each(|qc| {
                n += qc.count as usize;
                set.insert(qc.query.clone());
            });
            assert_eq!(n, engine.len());
            set
        };
        assert_eq!(engine.distinct_count(&interval), drained.len());
    }

    #[test]
    fn test_half_open_prefix_boundary() {
        let mut engine = SearchEngine::new();
        engine.insert(dt(2021, 6, 1, 0, 0), "june".to_string());
        // 2021-05 resolves to [.., 2021-06-01 00:00); the June value is out
        assert_eq!(engine.count("2021-05").unwrap(), 0);
        assert_eq!(engine.count("2021-06").unwrap(), 1);
    }
}
