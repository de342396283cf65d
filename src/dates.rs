use chrono::{Days, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{DailyError, Result};

// "Tests Through April 2", sometimes with footnote marks after the day
static TESTS_THROUGH_HEADER: Lazy<std::result::Result<Regex, regex::Error>> =
    Lazy::new(|| Regex::new(r"^Tests Through\s+([A-Za-z]+)\s+(\d+)\D*$"));

/// Converts an Excel serial day number into a calendar date.
///
/// Serial 1 is 1900-01-01. Excel treats 1900 as a leap year, so the offset
/// is two days rather than one. Any time-of-day fraction is dropped.
pub fn from_excel_serial(serial: f64) -> Result<NaiveDate> {
    if !serial.is_finite() {
        return Err(DailyError::InvalidDate(format!("excel serial {serial}")));
    }
    let days = serial.trunc() as i64 - 2;
    let epoch = NaiveDate::from_ymd_opt(1900, 1, 1);
    let date = match u64::try_from(days) {
        Ok(days) => epoch.and_then(|e| e.checked_add_days(Days::new(days))),
        Err(_) => epoch.and_then(|e| e.checked_sub_days(Days::new(days.unsigned_abs()))),
    };
    date.ok_or_else(|| DailyError::InvalidDate(format!("excel serial {serial}")))
}

/// Month number for an English month name. Hard coded to stay locale independent.
pub fn month_number(name: &str) -> Option<u32> {
    let month = match name {
        "January" => 1,
        "February" => 2,
        "March" => 3,
        "April" => 4,
        "May" => 5,
        "June" => 6,
        "July" => 7,
        "August" => 8,
        "September" => 9,
        "October" => 10,
        "November" => 11,
        "December" => 12,
        _ => return None,
    };
    Some(month)
}

/// Parses a "Tests Through <Month> <Day>" column header into a date in `year`.
pub fn parse_tests_through_header(header: &str, year: i32) -> Result<NaiveDate> {
    let invalid = || DailyError::InvalidHeader(header.to_string());
    let pattern = TESTS_THROUGH_HEADER
        .as_ref()
        .map_err(|e| DailyError::Config(format!("header pattern: {e}")))?;

    let captures = pattern.captures(header.trim()).ok_or_else(invalid)?;
    let month = month_number(&captures[1]).ok_or_else(invalid)?;
    let day: u32 = captures[2].parse().map_err(|_| invalid())?;

    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(invalid)
}

/// Parses the San Francisco `YYYY/MM/DD` result date.
pub fn parse_slash_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y/%m/%d")
        .map_err(|e| DailyError::InvalidDate(format!("{value:?}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_excel_serial_known_dates() {
        assert_eq!(from_excel_serial(43831.0).unwrap(), ymd(2020, 1, 1));
        assert_eq!(from_excel_serial(43922.0).unwrap(), ymd(2020, 4, 1));
        assert_eq!(from_excel_serial(43952.0).unwrap(), ymd(2020, 5, 1));
    }

    #[test]
    fn test_excel_serial_drops_time_of_day() {
        assert_eq!(from_excel_serial(43952.75).unwrap(), ymd(2020, 5, 1));
    }

    #[test]
    fn test_excel_serial_rejects_nan() {
        assert!(from_excel_serial(f64::NAN).is_err());
    }

    #[test]
    fn test_excel_serial_out_of_range_is_an_error() {
        for serial in [1e15, -1e15, f64::MAX] {
            let err = from_excel_serial(serial).unwrap_err();
            assert!(matches!(err, DailyError::InvalidDate(_)), "{serial}");
        }
    }

    #[test]
    fn test_month_table() {
        assert_eq!(month_number("January"), Some(1));
        assert_eq!(month_number("December"), Some(12));
        assert_eq!(month_number("april"), None);
    }

    #[test]
    fn test_parse_header() {
        let parse = |header| parse_tests_through_header(header, 2020).unwrap();
        assert_eq!(parse("Tests Through April 2"), ymd(2020, 4, 2));
        assert_eq!(parse("Tests Through May 14*"), ymd(2020, 5, 14));
        assert_eq!(parse("Tests Through June 3**"), ymd(2020, 6, 3));
    }

    #[test]
    fn test_parse_header_rejects_other_text() {
        for header in [
            "Cases Through April 2",
            "Tests Through Apri 2",
            "Tests Through April",
            "Tests Through February 30",
        ] {
            let err = parse_tests_through_header(header, 2020).unwrap_err();
            assert!(matches!(err, DailyError::InvalidHeader(_)), "{header}");
        }
    }

    #[test]
    fn test_parse_slash_date() {
        assert_eq!(parse_slash_date("2020/05/01").unwrap(), ymd(2020, 5, 1));
        assert!(parse_slash_date("05/01/2020").is_err());
    }
}
