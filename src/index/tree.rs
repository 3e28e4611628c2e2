//! Calendar Tree Index
//!
//! In-memory hierarchical index keyed by timestamp: a sparse year root over
//! fixed-fanout branch levels (12 months, 31 days, 24 hours) down to minute
//! leaves that hold the raw values as an append-only multiset.
//!
//! Range queries prune subtrees with a half-open overlap test and scan the
//! populated slots of every surviving branch. The per-level scan is bounded
//! by the calendar fanout (at most 60 slots), so traversal cost stays
//! proportional to tree depth times a small constant, and no exact slot-range
//! arithmetic is needed.
//!
//! # Performance
//! - Insert: O(depth) = O(5) per entry
//! - Range query: O(matched leaves + pruned branches), fanout-bounded
//! - Minute leaves match atomically: a query never splits a leaf

use crate::index::interval::TimeInterval;
use chrono::{Datelike, Days, Duration, Months, NaiveDate, NaiveDateTime, Timelike};
use std::collections::BTreeMap;

/// Calendar granularity of a node in the tree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Level {
    Year,
    Month,
    Day,
    Hour,
    Minute,
}

impl Level {
    /// Next finer level, or `None` at the minute leaf
    fn child(self) -> Option<Level> {
        match self {
            Level::Year => Some(Level::Month),
            Level::Month => Some(Level::Day),
            Level::Day => Some(Level::Hour),
            Level::Hour => Some(Level::Minute),
            Level::Minute => None,
        }
    }

    /// Slot capacity a parent reserves for nodes at this level.
    ///
    /// Months of a year, days of a month (always 31, short months just leave
    /// trailing slots empty), hours of a day, minutes of an hour. Years are
    /// never slotted; the root keys them sparsely.
    fn fanout(self) -> usize {
        match self {
            // years are keyed sparsely by the root map; see TimeIndex::insert
            Level::Year => 0,
            Level::Month => 12,
            Level::Day => 31,
            Level::Hour => 24,
            Level::Minute => 60,
        }
    }

    /// Calendar numbering base at this level (months and days count from 1)
    fn index_base(self) -> u32 {
        match self {
            Level::Month | Level::Day => 1,
            Level::Year | Level::Hour | Level::Minute => 0,
        }
    }

    /// Calendar field of `ts` at this level
    fn field(self, ts: NaiveDateTime) -> u32 {
        match self {
            // years are keyed sparsely by the root map; see TimeIndex::insert
            Level::Year => 0,
            Level::Month => ts.month(),
            Level::Day => ts.day(),
            Level::Hour => ts.hour(),
            Level::Minute => ts.minute(),
        }
    }

    /// Zero-based slot index of `ts` among siblings at this level.
    ///
    /// Slotted levels only; the year level has no slots.
    fn slot_of(self, ts: NaiveDateTime) -> usize {
        debug_assert_ne!(self, Level::Year);
        (self.field(ts) - self.index_base()) as usize
    }

    /// `ts` truncated to the start of this level's calendar unit
    fn truncate(self, ts: NaiveDateTime) -> NaiveDateTime {
        let date = ts.date();
        let date = match self {
            Level::Year => NaiveDate::from_ymd_opt(date.year(), 1, 1).unwrap(),
            Level::Month => NaiveDate::from_ymd_opt(date.year(), date.month(), 1).unwrap(),
            Level::Day | Level::Hour | Level::Minute => date,
        };
        match self {
            Level::Year | Level::Month | Level::Day => date.and_hms_opt(0, 0, 0).unwrap(),
            Level::Hour => date.and_hms_opt(ts.hour(), 0, 0).unwrap(),
            Level::Minute => date.and_hms_opt(ts.hour(), ts.minute(), 0).unwrap(),
        }
    }

    /// Advance a level-aligned instant by one unit of this level.
    ///
    /// Delegates rollover (month 12, month lengths, leap years) to chrono.
    fn advance(self, start: NaiveDateTime) -> NaiveDateTime {
        match self {
            Level::Year => start + Months::new(12),
            Level::Month => start + Months::new(1),
            Level::Day => start + Days::new(1),
            Level::Hour => start + Duration::hours(1),
            Level::Minute => start + Duration::minutes(1),
        }
    }

    /// The calendar span covered by the node at this level containing `ts`
    fn span_of(self, ts: NaiveDateTime) -> TimeInterval {
        let start = self.truncate(ts);
        TimeInterval::from_calendar_bounds(start, self.advance(start))
    }
}

/// One node of the calendar tree: its span plus branch slots or leaf values
#[derive(Debug)]
struct Node<T> {
    span: TimeInterval,
    kind: NodeKind<T>,
}

#[derive(Debug)]
enum NodeKind<T> {
    /// Fixed-capacity slot array; a slot is `Some` iff at least one value
    /// was ever inserted under it
    Branch {
        child_level: Level,
        slots: Vec<Option<Box<Node<T>>>>,
    },
    /// Minute bucket holding the raw values, duplicates preserved
    Leaf { values: Vec<T> },
}

impl<T> Node<T> {
    /// Create the node at `level` that covers `ts`, with no descendants yet
    fn covering(level: Level, ts: NaiveDateTime) -> Self {
        let kind = match level.child() {
            Some(child_level) => NodeKind::Branch {
                child_level,
                slots: std::iter::repeat_with(|| None)
                    .take(child_level.fanout())
                    .collect(),
            },
            None => NodeKind::Leaf { values: Vec::new() },
        };
        Self {
            span: level.span_of(ts),
            kind,
        }
    }

    /// Descend towards the minute leaf for `ts`, creating missing children
    fn insert(&mut self, ts: NaiveDateTime, value: T) {
        match &mut self.kind {
            NodeKind::Leaf { values } => values.push(value),
            NodeKind::Branch { child_level, slots } => {
                let level = *child_level;
                let child = slots[level.slot_of(ts)]
                    .get_or_insert_with(|| Box::new(Node::covering(level, ts)));
                child.insert(ts, value);
            }
        }
    }
}

/// Hierarchical timestamp index over values of type `T`.
///
/// Built once during a load phase, then shared read-only; `query` never
/// mutates any node, so concurrent readers need no locking.
#[derive(Debug)]
pub struct TimeIndex<T> {
    /// Sparse root: year number to year node
    years: BTreeMap<i32, Node<T>>,
    len: usize,
}

impl<T> Default for TimeIndex<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> TimeIndex<T> {
    /// Create an empty index
    pub fn new() -> Self {
        Self {
            years: BTreeMap::new(),
            len: 0,
        }
    }

    /// Insert a value at `ts`. Duplicates are kept; each occurrence counts.
    pub fn insert(&mut self, ts: NaiveDateTime, value: T) {
        let year = self
            .years
            .entry(ts.year())
            .or_insert_with(|| Node::covering(Level::Year, ts));
        year.insert(ts, value);
        self.len += 1;
    }

    /// Total number of inserted values
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the index holds no values
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// All values whose timestamp falls in `interval`.
    ///
    /// The iterator is lazy, finite, and single-pass: drain it before
    /// discarding it, and call `query` again for a fresh traversal. Values
    /// come out in calendar order of their minute bucket; order within a
    /// bucket is insertion order.
    pub fn query(&self, interval: &TimeInterval) -> QueryIter<'_, T> {
        // only year keys inside [start.year, end.year] can overlap; the
        // generic span test below then prunes the boundary years
        let mut stack: Vec<&Node<T>> = self
            .years
            .range(interval.start().year()..=interval.end().year())
            .map(|(_, node)| node)
            .collect();
        // popped back-to-front, so reverse for ascending calendar order
        stack.reverse();
        QueryIter {
            interval: *interval,
            stack,
            leaf: Default::default(),
        }
    }
}

/// Lazy depth-first traversal of the matching part of the tree
pub struct QueryIter<'a, T> {
    interval: TimeInterval,
    stack: Vec<&'a Node<T>>,
    leaf: std::slice::Iter<'a, T>,
}

impl<'a, T> Iterator for QueryIter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        loop {
            if let Some(value) = self.leaf.next() {
                return Some(value);
            }
            let node = self.stack.pop()?;
            if !node.span.overlaps(&self.interval) {
                continue;
            }
            match &node.kind {
                // an overlapping leaf contributes its whole multiset; minute
                // granularity is the floor of the index
                NodeKind::Leaf { values } => self.leaf = values.iter(),
                NodeKind::Branch { slots, .. } => self
                    .stack
                    .extend(slots.iter().rev().filter_map(|slot| slot.as_deref())),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dt(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(h, mi, 0)
            .unwrap()
    }

    fn span(start: NaiveDateTime, end: NaiveDateTime) -> TimeInterval {
        TimeInterval::new(start, end).unwrap()
    }

    fn collect<'a>(index: &'a TimeIndex<String>, interval: &TimeInterval) -> Vec<&'a String> {
        index.query(interval).collect()
    }

    #[test]
    fn test_empty_index() {
        let index: TimeIndex<String> = TimeIndex::new();
        assert!(index.is_empty());
        let interval = span(dt(2000, 1, 1, 0, 0), dt(2030, 1, 1, 0, 0));
        assert_eq!(index.query(&interval).count(), 0);
    }

    #[test]
    fn test_insert_and_query_containing_interval() {
        let mut index = TimeIndex::new();
        index.insert(dt(2021, 5, 10, 10, 30), "a".to_string());
        assert_eq!(index.len(), 1);

        // whole year, whole month, whole day, exact minute
        for interval in [
            span(dt(2021, 1, 1, 0, 0), dt(2022, 1, 1, 0, 0)),
            span(dt(2021, 5, 1, 0, 0), dt(2021, 6, 1, 0, 0)),
            span(dt(2021, 5, 10, 0, 0), dt(2021, 5, 11, 0, 0)),
            span(dt(2021, 5, 10, 10, 30), dt(2021, 5, 10, 10, 31)),
        ] {
            assert_eq!(collect(&index, &interval), vec!["a"]);
        }
    }

    #[test]
    fn test_excluding_interval_yields_nothing() {
        let mut index = TimeIndex::new();
        index.insert(dt(2021, 5, 10, 10, 30), "a".to_string());

        for interval in [
            span(dt(2020, 1, 1, 0, 0), dt(2021, 1, 1, 0, 0)),
            span(dt(2021, 6, 1, 0, 0), dt(2021, 7, 1, 0, 0)),
            span(dt(2021, 5, 10, 10, 31), dt(2021, 5, 10, 10, 32)),
        ] {
            assert_eq!(index.query(&interval).count(), 0);
        }
    }

    #[test]
    fn test_half_open_boundaries() {
        let mut index = TimeIndex::new();
        index.insert(dt(2021, 5, 10, 10, 0), "at-start".to_string());
        index.insert(dt(2021, 5, 10, 11, 0), "at-end".to_string());

        let interval = span(dt(2021, 5, 10, 10, 0), dt(2021, 5, 10, 11, 0));
        assert_eq!(collect(&index, &interval), vec!["at-start"]);
    }

    #[test]
    fn test_duplicates_preserved() {
        let mut index = TimeIndex::new();
        let ts = dt(2021, 5, 10, 10, 30);
        index.insert(ts, "q".to_string());
        index.insert(ts, "q".to_string());
        index.insert(ts, "q".to_string());

        let interval = span(dt(2021, 5, 1, 0, 0), dt(2021, 6, 1, 0, 0));
        assert_eq!(index.query(&interval).count(), 3);
    }

    #[test]
    fn test_spans_multiple_years() {
        let mut index = TimeIndex::new();
        index.insert(dt(2019, 12, 31, 23, 59), "old".to_string());
        index.insert(dt(2020, 6, 15, 12, 0), "mid".to_string());
        index.insert(dt(2021, 1, 1, 0, 0), "new".to_string());

        let interval = span(dt(2019, 12, 31, 23, 59), dt(2021, 1, 1, 0, 1));
        assert_eq!(collect(&index, &interval), vec!["old", "mid", "new"]);

        // end year key is visited but its node is pruned by the span test
        let interval = span(dt(2019, 1, 1, 0, 0), dt(2021, 1, 1, 0, 0));
        assert_eq!(collect(&index, &interval), vec!["old", "mid"]);
    }

    #[test]
    fn test_results_in_calendar_order() {
        let mut index = TimeIndex::new();
        // inserted out of order on purpose
        index.insert(dt(2021, 5, 10, 10, 45), "third".to_string());
        index.insert(dt(2021, 5, 10, 9, 0), "first".to_string());
        index.insert(dt(2021, 5, 10, 10, 30), "second".to_string());

        let interval = span(dt(2021, 5, 10, 0, 0), dt(2021, 5, 11, 0, 0));
        assert_eq!(collect(&index, &interval), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_leaf_matches_atomically() {
        let mut index = TimeIndex::new();
        // seconds are below leaf granularity; the whole minute matches
        let ts = NaiveDate::from_ymd_opt(2021, 5, 10)
            .unwrap()
            .and_hms_opt(10, 30, 45)
            .unwrap();
        index.insert(ts, "q".to_string());

        let interval = span(dt(2021, 5, 10, 10, 30), dt(2021, 5, 10, 10, 31));
        assert_eq!(index.query(&interval).count(), 1);
    }

    #[test]
    fn test_leap_year_february() {
        let mut index = TimeIndex::new();
        index.insert(dt(2020, 2, 29, 12, 0), "leap".to_string());

        let february = span(dt(2020, 2, 1, 0, 0), dt(2020, 3, 1, 0, 0));
        assert_eq!(collect(&index, &february), vec!["leap"]);
    }

    #[test]
    fn test_december_does_not_bleed_into_next_year() {
        let mut index = TimeIndex::new();
        index.insert(dt(2020, 12, 31, 23, 59), "dec".to_string());
        index.insert(dt(2021, 1, 1, 0, 0), "jan".to_string());

        let december = span(dt(2020, 12, 1, 0, 0), dt(2021, 1, 1, 0, 0));
        assert_eq!(collect(&index, &december), vec!["dec"]);
    }

    #[test]
    fn test_level_slot_mapping() {
        let ts = dt(2021, 5, 10, 7, 42);
        // months and days rebase from 1, hours and minutes from 0
        assert_eq!(Level::Month.slot_of(ts), 4);
        assert_eq!(Level::Day.slot_of(ts), 9);
        assert_eq!(Level::Hour.slot_of(ts), 7);
        assert_eq!(Level::Minute.slot_of(ts), 42);
    }

    #[test]
    fn test_level_span_of() {
        let ts = dt(2020, 2, 10, 7, 42);
        let month = Level::Month.span_of(ts);
        assert_eq!(month.start(), dt(2020, 2, 1, 0, 0));
        assert_eq!(month.end(), dt(2020, 3, 1, 0, 0));

        let year = Level::Year.span_of(ts);
        assert_eq!(year.start(), dt(2020, 1, 1, 0, 0));
        assert_eq!(year.end(), dt(2021, 1, 1, 0, 0));

        let minute = Level::Minute.span_of(ts);
        assert_eq!(minute.start(), dt(2020, 2, 10, 7, 42));
        assert_eq!(minute.end(), dt(2020, 2, 10, 7, 43));
    }

    #[test]
    fn test_query_is_regenerated_per_call() {
        let mut index = TimeIndex::new();
        index.insert(dt(2021, 5, 10, 10, 30), "a".to_string());

        let interval = span(dt(2021, 1, 1, 0, 0), dt(2022, 1, 1, 0, 0));
        let mut first = index.query(&interval);
        assert!(first.next().is_some());
        assert!(first.next().is_none());

        // a fresh call traverses again from the root
        assert_eq!(index.query(&interval).count(), 1);
    }
}
