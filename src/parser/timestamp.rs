//! Timestamp parsing for feed dates and `<time datetime>` attributes
//!
//! Accepts the forms the registry actually emits:
//! - RFC 2822 (`Mon, 19 Oct 2026 10:00:00 GMT`) in the RSS feed
//! - RFC 3339 (`2026-10-19T10:00:00.000Z`) on the versions page
//!
//! A weekday name that disagrees with the date is ignored. Zone-less
//! date-times (`-` or `/` separated) and bare dates are read as UTC.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y/%m/%d %H:%M:%S",
];

/// Parse a timestamp string into a UTC instant, or `None` if it is not a date
pub fn parse_instant(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc2822(value) {
        return Some(dt.with_timezone(&Utc));
    }

    if let Some(dt) = parse_rfc2822_ignoring_weekday(value) {
        return Some(dt);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }

    if let Some(naive) = NAIVE_DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
    {
        return Some(naive.and_utc());
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// RFC 2822 date whose weekday name may not match the calendar date
fn parse_rfc2822_ignoring_weekday(value: &str) -> Option<DateTime<Utc>> {
    let rest = match value.split_once(',') {
        Some((weekday, rest)) if weekday.trim().chars().all(|c| c.is_ascii_alphabetic()) => {
            rest.trim()
        }
        _ => value,
    };

    let rest = ["GMT", "UTC", "UT", "Z"]
        .iter()
        .find_map(|zone| rest.strip_suffix(zone))
        .map(|date| format!("{}+0000", date))
        .unwrap_or_else(|| rest.to_string());

    DateTime::parse_from_str(&rest, "%d %b %Y %H:%M:%S %z")
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;

    #[rstest]
    #[case("Mon, 19 Oct 2026 10:00:00 GMT", Utc.with_ymd_and_hms(2026, 10, 19, 10, 0, 0).unwrap())]
    #[case("Mon, 19 Oct 2026 12:00:00 +0200", Utc.with_ymd_and_hms(2026, 10, 19, 10, 0, 0).unwrap())]
    #[case("2026-10-19T10:00:00.000Z", Utc.with_ymd_and_hms(2026, 10, 19, 10, 0, 0).unwrap())]
    #[case("2026-10-19T10:00:00+00:00", Utc.with_ymd_and_hms(2026, 10, 19, 10, 0, 0).unwrap())]
    #[case("Tue, 19 Oct 2026 10:00:00 GMT", Utc.with_ymd_and_hms(2026, 10, 19, 10, 0, 0).unwrap())]
    #[case("Fri, 19 Oct 2026 12:00:00 +0200", Utc.with_ymd_and_hms(2026, 10, 19, 10, 0, 0).unwrap())]
    #[case("19 Oct 2026 10:00:00 GMT", Utc.with_ymd_and_hms(2026, 10, 19, 10, 0, 0).unwrap())]
    #[case("2026/10/19 10:00:00", Utc.with_ymd_and_hms(2026, 10, 19, 10, 0, 0).unwrap())]
    #[case("2026-10-19T10:00:00", Utc.with_ymd_and_hms(2026, 10, 19, 10, 0, 0).unwrap())]
    #[case("  2026-10-19  ", Utc.with_ymd_and_hms(2026, 10, 19, 0, 0, 0).unwrap())]
    fn parse_instant_accepts_registry_formats(#[case] input: &str, #[case] expected: DateTime<Utc>) {
        assert_eq!(parse_instant(input), Some(expected));
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("yesterday")]
    #[case("2026-13-45T99:00:00Z")]
    fn parse_instant_rejects_invalid_input(#[case] input: &str) {
        assert_eq!(parse_instant(input), None);
    }
}
