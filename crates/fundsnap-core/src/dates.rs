//! Point-in-time date logic and parsing helpers.
//!
//! All cutoff comparisons must flow through this module. Business logic
//! never compares acceptance timestamps against the cutoff directly.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

/// Tolerance in days when matching a fact's period end against a filing's
/// reported period end. Absorbs 52/53-week fiscal calendar drift.
pub const PERIOD_END_TOLERANCE_DAYS: i64 = 3;

/// Annual duration window in days (inclusive).
const ANNUAL_DAYS: (i64, i64) = (330, 400);

/// Quarterly duration window in days (inclusive).
const QUARTERLY_DAYS: (i64, i64) = (75, 100);

/// Returns true if `acceptance` falls on or before the end of the cutoff day.
///
/// This is the central point-in-time gate: a filing accepted at
/// `cutoff 23:59:59` is visible, one accepted at `cutoff+1 00:00:00` is not.
/// Acceptance timestamps are regulator-local; the cutoff day boundary is
/// interpreted in the same zone.
#[must_use]
pub fn within_cutoff(acceptance: NaiveDateTime, cutoff: NaiveDate) -> bool {
    let end_of_day = cutoff.and_time(NaiveTime::from_hms_opt(23, 59, 59).expect("valid time"));
    acceptance <= end_of_day
}

/// Parses a date string in the formats the regulator emits.
///
/// Accepts ISO (`2023-12-31`), compact (`20231231`), and US (`12/31/2023`).
/// Returns `None` on empty or unparseable input.
#[must_use]
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    for fmt in ["%Y-%m-%d", "%Y%m%d", "%m/%d/%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(value, fmt) {
            return Some(date);
        }
    }
    None
}

/// Parses a datetime string in the formats the regulator emits.
///
/// Acceptance timestamps look like `2017-02-15T08:01:36.000Z`; older index
/// files use compact `20170215080136`. A trailing `Z` is stripped and the
/// result treated as regulator-local naive time. A bare date parses to
/// midnight. Returns `None` on unparseable input.
#[must_use]
pub fn parse_datetime(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim().trim_end_matches('Z');
    if value.is_empty() {
        return None;
    }
    for fmt in [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S",
        "%Y%m%d%H%M%S",
    ] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, fmt) {
            return Some(dt);
        }
    }
    parse_date(value).and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Returns true if `start..end` spans an annual reporting period (330-400 days).
#[must_use]
pub fn is_annual_period(start: Option<NaiveDate>, end: NaiveDate) -> bool {
    let Some(start) = start else { return false };
    let days = (end - start).num_days();
    days >= ANNUAL_DAYS.0 && days <= ANNUAL_DAYS.1
}

/// Returns true if `start..end` spans a quarterly reporting period (75-100 days).
#[must_use]
pub fn is_quarterly_period(start: Option<NaiveDate>, end: NaiveDate) -> bool {
    let Some(start) = start else { return false };
    let days = (end - start).num_days();
    days >= QUARTERLY_DAYS.0 && days <= QUARTERLY_DAYS.1
}

/// Returns the most recent date in `dates` that is on or before `cutoff`.
#[must_use]
pub fn latest_within_cutoff(dates: &[NaiveDate], cutoff: NaiveDate) -> Option<NaiveDate> {
    dates.iter().copied().filter(|d| *d <= cutoff).max()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn same_day_is_within_cutoff() {
        let acceptance = d(2016, 12, 31).and_hms_opt(12, 0, 0).unwrap();
        assert!(within_cutoff(acceptance, d(2016, 12, 31)));
    }

    #[test]
    fn end_of_day_is_within_cutoff() {
        let acceptance = d(2016, 12, 31).and_hms_opt(23, 59, 59).unwrap();
        assert!(within_cutoff(acceptance, d(2016, 12, 31)));
    }

    #[test]
    fn midnight_of_next_day_is_excluded() {
        let acceptance = d(2017, 1, 1).and_hms_opt(0, 0, 0).unwrap();
        assert!(!within_cutoff(acceptance, d(2016, 12, 31)));
    }

    #[test]
    fn historical_acceptance_is_within_cutoff() {
        let acceptance = d(2014, 3, 15).and_hms_opt(9, 30, 0).unwrap();
        assert!(within_cutoff(acceptance, d(2016, 12, 31)));
    }

    #[test]
    fn parse_date_formats() {
        assert_eq!(parse_date("2023-12-31"), Some(d(2023, 12, 31)));
        assert_eq!(parse_date("20231231"), Some(d(2023, 12, 31)));
        assert_eq!(parse_date("12/31/2023"), Some(d(2023, 12, 31)));
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("not-a-date"), None);
    }

    #[test]
    fn parse_datetime_strips_zulu_suffix() {
        let result = parse_datetime("2023-12-31T15:30:00Z").unwrap();
        assert_eq!(result, d(2023, 12, 31).and_hms_opt(15, 30, 0).unwrap());
    }

    #[test]
    fn parse_datetime_with_subseconds() {
        let result = parse_datetime("2017-02-15T08:01:36.000Z").unwrap();
        assert_eq!(result, d(2017, 2, 15).and_hms_opt(8, 1, 36).unwrap());
    }

    #[test]
    fn parse_datetime_compact() {
        let result = parse_datetime("20170215080136").unwrap();
        assert_eq!(result, d(2017, 2, 15).and_hms_opt(8, 1, 36).unwrap());
    }

    #[test]
    fn parse_datetime_bare_date_is_midnight() {
        let result = parse_datetime("2017-02-15").unwrap();
        assert_eq!(result, d(2017, 2, 15).and_hms_opt(0, 0, 0).unwrap());
    }

    #[test]
    fn annual_period_detection() {
        assert!(is_annual_period(Some(d(2022, 1, 1)), d(2022, 12, 31)));
        // Leap year: 366 days still annual
        assert!(is_annual_period(Some(d(2024, 1, 1)), d(2024, 12, 31)));
        assert!(!is_annual_period(Some(d(2022, 1, 1)), d(2022, 3, 31)));
        assert!(!is_annual_period(None, d(2022, 12, 31)));
    }

    #[test]
    fn quarterly_period_detection() {
        assert!(is_quarterly_period(Some(d(2022, 7, 1)), d(2022, 9, 30)));
        assert!(!is_quarterly_period(Some(d(2022, 1, 1)), d(2022, 12, 31)));
    }

    #[test]
    fn latest_within_cutoff_picks_most_recent_eligible() {
        let dates = [d(2015, 12, 31), d(2016, 12, 31), d(2017, 12, 31)];
        assert_eq!(
            latest_within_cutoff(&dates, d(2016, 12, 31)),
            Some(d(2016, 12, 31))
        );
        assert_eq!(latest_within_cutoff(&dates, d(2014, 1, 1)), None);
        assert_eq!(latest_within_cutoff(&[], d(2016, 12, 31)), None);
    }
}
