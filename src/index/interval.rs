//! Time Interval
//!
//! Half-open calendar interval `[start, end)` used as the query primitive
//! everywhere in the index and query layers. `end` is always excluded.

use chrono::NaiveDateTime;
use thiserror::Error;

/// Errors raised when constructing an interval
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IntervalError {
    /// start >= end after resolution; a defect in the caller, never valid
    #[error("invalid interval: start {start} is not before end {end}")]
    Degenerate {
        start: NaiveDateTime,
        end: NaiveDateTime,
    },
}

/// Immutable half-open time span `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeInterval {
    start: NaiveDateTime,
    end: NaiveDateTime,
}

impl TimeInterval {
    /// Create a new interval. Fails if `start >= end`.
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Result<Self, IntervalError> {
        if start >= end {
            return Err(IntervalError::Degenerate { start, end });
        }
        Ok(Self { start, end })
    }

    /// Construct a span whose bounds were computed by calendar arithmetic,
    /// which always advances strictly forward.
    pub(crate) fn from_calendar_bounds(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        debug_assert!(start < end);
        Self { start, end }
    }

    /// Inclusive start of the span
    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    /// Exclusive end of the span
    pub fn end(&self) -> NaiveDateTime {
        self.end
    }

    /// Two half-open intervals overlap iff each starts before the other ends
    pub fn overlaps(&self, other: &TimeInterval) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Whether a single instant falls inside the span (`end` excluded)
    pub fn contains(&self, instant: NaiveDateTime) -> bool {
        self.start <= instant && instant < self.end
    }
}
