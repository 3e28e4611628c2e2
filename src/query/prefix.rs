//! Date Prefix Resolver
//!
//! Translates a calendar prefix into the half-open interval it denotes.
//!
//! The accepted format is `YYYY[-MM[-DD[ hh[:mm]]]]`: the year is mandatory
//! and every finer field is optional. The resolved interval starts at the
//! prefix with all omitted fields at their minimum and ends one unit of the
//! finest present field later:
//!
//! - `"2015"`        -> `[2015-01-01 00:00, 2016-01-01 00:00)`
//! - `"2015-03"`     -> `[2015-03-01 00:00, 2015-04-01 00:00)`
//! - `"2015-03-15 11:07"` -> `[2015-03-15 11:07, 2015-03-15 11:08)`
//!
//! Rollover (month 12 into the next year, month lengths, leap years) is
//! chrono arithmetic, never a hand-rolled table.

use crate::index::TimeInterval;
use crate::query::error::{PrefixError, QueryError};
use chrono::{Days, Duration, Months, NaiveDate, NaiveDateTime};

/// Finest calendar field present in a prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Granularity {
    Year,
    Month,
    Day,
    Hour,
    Minute,
}

impl Granularity {
    /// Advance one unit of this granularity, with calendar rollover
    fn advance(self, start: NaiveDateTime) -> NaiveDateTime {
        match self {
            Granularity::Year => start + Months::new(12),
            Granularity::Month => start + Months::new(1),
            Granularity::Day => start + Days::new(1),
            Granularity::Hour => start + Duration::hours(1),
            Granularity::Minute => start + Duration::minutes(1),
        }
    }
}

/// Resolve a date prefix into the interval it denotes.
///
/// Fails with [`QueryError::InvalidPrefix`] for malformed input: wrong field
/// count, bad separators, month 0 or 13, a day the month does not have
/// (`"2015-04-31"`), hour 24, and so on.
pub fn resolve_prefix(prefix: &str) -> Result<TimeInterval, QueryError> {
    let (start, granularity) = parse_prefix(prefix)?;
    Ok(TimeInterval::new(start, granularity.advance(start))?)
}

fn parse_prefix(prefix: &str) -> Result<(NaiveDateTime, Granularity), PrefixError> {
    if prefix.is_empty() {
        return Err(PrefixError::Empty);
    }

    let malformed = |reason: &str| PrefixError::Malformed {
        prefix: prefix.to_string(),
        reason: reason.to_string(),
    };
    let out_of_range = || PrefixError::OutOfRange {
        prefix: prefix.to_string(),
    };

    // "YYYY-MM-DD hh:mm" splits into a date part and an optional time part
    let (date_part, time_part) = match prefix.split_once(' ') {
        Some((date, time)) => (date, Some(time)),
        None => (prefix, None),
    };

    let date_fields: Vec<&str> = date_part.split('-').collect();
    if date_fields.len() > 3 {
        return Err(malformed("too many date fields"));
    }
    if time_part.is_some() && date_fields.len() != 3 {
        return Err(malformed("time of day requires a full date"));
    }

    let year = parse_field(date_fields[0], 4, 4).ok_or_else(|| malformed("bad year field"))?;
    let month = date_fields
        .get(1)
        .map(|f| parse_field(f, 1, 2).ok_or_else(|| malformed("bad month field")))
        .transpose()?;
    let day = date_fields
        .get(2)
        .map(|f| parse_field(f, 1, 2).ok_or_else(|| malformed("bad day field")))
        .transpose()?;

    let (hour, minute) = match time_part {
        None => (None, None),
        Some(time) => {
            let time_fields: Vec<&str> = time.split(':').collect();
            if time_fields.len() > 2 {
                return Err(malformed("too many time fields"));
            }
            let hour =
                parse_field(time_fields[0], 1, 2).ok_or_else(|| malformed("bad hour field"))?;
            let minute = time_fields
                .get(1)
                .map(|f| parse_field(f, 1, 2).ok_or_else(|| malformed("bad minute field")))
                .transpose()?;
            (Some(hour), minute)
        }
    };

    let granularity = if minute.is_some() {
        Granularity::Minute
    } else if hour.is_some() {
        Granularity::Hour
    } else if day.is_some() {
        Granularity::Day
    } else if month.is_some() {
        Granularity::Month
    } else {
        Granularity::Year
    };

    // chrono validates the calendar here: month range, true month length
    // (leap years included), hour and minute ranges
    let start = NaiveDate::from_ymd_opt(year as i32, month.unwrap_or(1), day.unwrap_or(1))
        .ok_or_else(out_of_range)?
        .and_hms_opt(hour.unwrap_or(0), minute.unwrap_or(0), 0)
        .ok_or_else(out_of_range)?;

    Ok((start, granularity))
}

/// Parse one prefix field: plain ASCII digits only, within a length range.
/// Rejects signs, whitespace, and empty fields that `str::parse` would allow.
fn parse_field(field: &str, min_len: usize, max_len: usize) -> Option<u32> {
    if field.len() < min_len || field.len() > max_len {
        return None;
    }
    if !field.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    field.parse().ok()
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

    fn resolved(prefix: &str) -> (NaiveDateTime, NaiveDateTime) {
        let interval = resolve_prefix(prefix).unwrap();
        (interval.start(), interval.end())
    }

    #[test]
    fn test_year_prefix() {
        assert_eq!(resolved("2015"), (dt(2015, 1, 1, 0, 0), dt(2016, 1, 1, 0, 0)));
    }

    #[test]
    fn test_month_prefix() {
        assert_eq!(resolved("2015-03"), (dt(2015, 3, 1, 0, 0), dt(2015, 4, 1, 0, 0)));
    }

    #[test]
    fn test_day_prefix() {
        assert_eq!(
            resolved("2015-03-15"),
            (dt(2015, 3, 15, 0, 0), dt(2015, 3, 16, 0, 0))
        );
    }

    #[test]
    fn test_hour_prefix() {
        assert_eq!(
            resolved("2015-03-15 11"),
            (dt(2015, 3, 15, 11, 0), dt(2015, 3, 15, 12, 0))
        );
    }

    #[test]
    fn test_minute_prefix() {
        assert_eq!(
            resolved("2015-03-15 11:07"),
            (dt(2015, 3, 15, 11, 7), dt(2015, 3, 15, 11, 8))
        );
    }

    #[test]
    fn test_december_rolls_into_next_year() {
        assert_eq!(
            resolved("2020-12"),
            (dt(2020, 12, 1, 0, 0), dt(2021, 1, 1, 0, 0))
        );
    }

    #[test]
    fn test_leap_year_february_has_29_days() {
        assert_eq!(
            resolved("2020-02"),
            (dt(2020, 2, 1, 0, 0), dt(2020, 3, 1, 0, 0))
        );
        // the 29th itself resolves
        assert_eq!(
            resolved("2020-02-29"),
            (dt(2020, 2, 29, 0, 0), dt(2020, 3, 1, 0, 0))
        );
    }

    #[test]
    fn test_last_day_of_month_rolls_over() {
        assert_eq!(
            resolved("2015-03-31"),
            (dt(2015, 3, 31, 0, 0), dt(2015, 4, 1, 0, 0))
        );
    }

    #[test]
    fn test_last_hour_of_year_rolls_over() {
        assert_eq!(
            resolved("2015-12-31 23"),
            (dt(2015, 12, 31, 23, 0), dt(2016, 1, 1, 0, 0))
        );
    }

    #[test]
    fn test_empty_prefix_fails() {
        assert!(matches!(
            resolve_prefix(""),
            Err(QueryError::InvalidPrefix(PrefixError::Empty))
        ));
    }

    #[test]
    fn test_invalid_month_fails() {
        assert!(resolve_prefix("2021-13").is_err());
        assert!(resolve_prefix("2021-00").is_err());
    }

    #[test]
    fn test_nonexistent_day_fails() {
        assert!(resolve_prefix("2015-04-31").is_err());
        // 2019 is not a leap year
        assert!(resolve_prefix("2019-02-29").is_err());
    }

    #[test]
    fn test_out_of_range_time_fails() {
        assert!(resolve_prefix("2015-03-15 24").is_err());
        assert!(resolve_prefix("2015-03-15 11:60").is_err());
    }

    #[test]
    fn test_malformed_shapes_fail() {
        assert!(resolve_prefix("2015-03-15-11").is_err());
        assert!(resolve_prefix("2015-03 11").is_err());
        assert!(resolve_prefix("2015-03-15 11:07:30").is_err());
        assert!(resolve_prefix("2015/03").is_err());
        assert!(resolve_prefix("2015-").is_err());
        assert!(resolve_prefix("15").is_err());
        assert!(resolve_prefix("not-a-date").is_err());
        assert!(resolve_prefix("2015-+3").is_err());
    }
}
