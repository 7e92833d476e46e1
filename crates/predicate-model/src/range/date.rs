//! Partial dates denote calendar intervals: `1980` is `[1980-01-01, 1981-01-01)`,
//! `1980-02` is February, `1980-02-03` is one day. Date ranges produced here
//! are always closed-open.

use super::{Range, WILDCARD, split_range};
use crate::error::RangeError;
use chrono::{NaiveDate, NaiveTime};

fn ymd(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day)
}

/// The calendar interval a single partial date stands for, as
/// `(start, exclusive end)`. Times after a `T` are truncated to the day.
pub fn calendar_interval(value: &str) -> Result<(NaiveDate, NaiveDate), RangeError> {
    let invalid = || RangeError::InvalidDate(value.to_string());

    let date_part = value.trim().split_once('T').map_or(value.trim(), |(d, _)| d);
    let mut parts = date_part.split('-');

    let year: i32 = parts
        .next()
        .filter(|y| y.len() == 4 && y.bytes().all(|b| b.is_ascii_digit()))
        .and_then(|y| y.parse().ok())
        .ok_or_else(invalid)?;
    let month = parts
        .next()
        .map(|m| m.parse::<u32>().map_err(|_| invalid()))
        .transpose()?;
    let day = parts
        .next()
        .map(|d| d.parse::<u32>().map_err(|_| invalid()))
        .transpose()?;
    if parts.next().is_some() {
        return Err(invalid());
    }

    let interval = match (month, day) {
        (None, _) => ymd(year, 1, 1).zip(ymd(year + 1, 1, 1)),
        (Some(12), None) => ymd(year, 12, 1).zip(ymd(year + 1, 1, 1)),
        (Some(m), None) => ymd(year, m, 1).zip(ymd(year, m + 1, 1)),
        (Some(m), Some(d)) => {
            ymd(year, m, d).and_then(|start| start.succ_opt().map(|end| (start, end)))
        }
    };
    interval.ok_or_else(invalid)
}

/// Start of the calendar interval of a partial date.
pub fn parse_date(value: &str) -> Result<NaiveDate, RangeError> {
    calendar_interval(value).map(|(start, _)| start)
}

pub fn is_date(value: &str) -> bool {
    calendar_interval(value).is_ok()
}

/// Parses a partial date or a `lower,upper` pair of partial dates into a
/// closed-open range. The lower side contributes the start of its interval,
/// the upper side the exclusive end of its interval, so `1980,1990-05` spans
/// `[1980-01-01, 1990-06-01)`.
pub fn parse_date_range(value: &str) -> Result<Range<NaiveDate>, RangeError> {
    let value = value.trim();
    if value == WILDCARD {
        return Ok(Range::unbounded());
    }

    match split_range(value) {
        Some((lower, upper)) => {
            let lower = super::bound(lower, parse_date)?;
            let upper = super::bound(upper, |raw| calendar_interval(raw).map(|(_, end)| end))?;
            Range::new(lower, upper)
        }
        None => {
            let (start, end) = calendar_interval(value)?;
            Range::new(Some(start), Some(end))
        }
    }
}

pub fn epoch_seconds(date: NaiveDate) -> i64 {
    date.and_time(NaiveTime::MIN).and_utc().timestamp()
}

pub fn epoch_millis(date: NaiveDate) -> i64 {
    date.and_time(NaiveTime::MIN).and_utc().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_partial_dates() {
        assert_eq!(calendar_interval("1936").unwrap(), (d(1936, 1, 1), d(1937, 1, 1)));
        assert_eq!(calendar_interval("2014-10").unwrap(), (d(2014, 10, 1), d(2014, 11, 1)));
        assert_eq!(calendar_interval("2014-12").unwrap(), (d(2014, 12, 1), d(2015, 1, 1)));
        assert_eq!(
            calendar_interval("2021-10-25").unwrap(),
            (d(2021, 10, 25), d(2021, 10, 26))
        );
        assert_eq!(
            calendar_interval("2021-10-25T13:45:00Z").unwrap(),
            (d(2021, 10, 25), d(2021, 10, 26))
        );
    }

    #[test]
    fn test_invalid_dates() {
        assert!(calendar_interval("21-10").is_err());
        assert!(calendar_interval("2021-13").is_err());
        assert!(calendar_interval("2021-02-30").is_err());
        assert!(calendar_interval("value").is_err());
    }

    #[test]
    fn test_date_ranges() {
        let r = parse_date_range("2021-10-25,2021-10-26").unwrap();
        assert_eq!((r.lower(), r.upper()), (Some(&d(2021, 10, 25)), Some(&d(2021, 10, 27))));

        let r = parse_date_range("2014-05,2014-06").unwrap();
        assert_eq!((r.lower(), r.upper()), (Some(&d(2014, 5, 1)), Some(&d(2014, 7, 1))));

        let r = parse_date_range("1940,*").unwrap();
        assert_eq!(r.lower(), Some(&d(1940, 1, 1)));
        assert!(r.upper().is_none());

        let r = parse_date_range("*,1940").unwrap();
        assert_eq!(r.upper(), Some(&d(1941, 1, 1)));

        assert!(parse_date_range("*,*").unwrap().is_unbounded());
        assert!(parse_date_range("2000,1990").is_err());
    }

    #[test]
    fn test_range_of_single_year_matches_explicit_days() {
        assert_eq!(
            parse_date_range("1980").unwrap(),
            parse_date_range("1980-01-01,1980-12-31").unwrap()
        );
    }

    #[test]
    fn test_epoch_conversion() {
        assert_eq!(epoch_seconds(d(2000, 1, 1)), 946_684_800);
        assert_eq!(epoch_millis(d(2001, 1, 1)), 978_307_200_000);
    }
}
