//! Time expressions: relative ("last 3 years", "recent") and absolute dates.

use std::sync::LazyLock;

use chrono::{DateTime, Duration, Months, NaiveDate, TimeZone, Utc};
use ocean_model::TimeRange;
use regex::Regex;

/// Window used for "recent" / "latest" / "current".
pub const RECENT_DAYS: i64 = 30;

static LAST_N: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:last|past|previous)\s+(\d{1,3}\s+)?(year|month|week|day)s?\b")
        .expect("valid regex")
});
static SINCE_YEAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bsince\s+((?:19|20)\d{2})\b").expect("valid regex")
});
static YEAR_SPAN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:between|from)\s+((?:19|20)\d{2})\s+(?:and|to|-)\s+((?:19|20)\d{2})\b")
        .expect("valid regex")
});
static IN_YEAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:in|during)\s+((?:19|20)\d{2})\b").expect("valid regex")
});
static RECENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:recent|recently|latest|current|currently|now|today)\b")
        .expect("valid regex")
});

/// Relative window ending at `now`, if `text` contains one.
pub fn relative_window(text: &str, now: DateTime<Utc>) -> Option<TimeRange> {
    if let Some(c) = LAST_N.captures(text) {
        let n: u32 = c
            .get(1)
            .and_then(|m| m.as_str().trim().parse().ok())
            .unwrap_or(1)
            .max(1);
        let unit = c.get(2)?.as_str().to_ascii_lowercase();
        let start = match unit.as_str() {
            "year" => now.checked_sub_months(Months::new(12 * n))?,
            "month" => now.checked_sub_months(Months::new(n))?,
            "week" => now - Duration::weeks(n as i64),
            _ => now - Duration::days(n as i64),
        };
        return Some(TimeRange::ordered(start, now));
    }
    if let Some(c) = SINCE_YEAR.captures(text) {
        let start = year_start(c.get(1)?.as_str().parse().ok()?)?;
        return (start <= now).then(|| TimeRange::ordered(start, now));
    }
    if RECENT.is_match(text) {
        return Some(TimeRange::ordered(now - Duration::days(RECENT_DAYS), now));
    }
    None
}

/// Calendar-year spans ("between 2019 and 2021", "in 2023").
pub fn year_window(text: &str) -> Option<TimeRange> {
    if let Some(c) = YEAR_SPAN.captures(text) {
        let a: i32 = c.get(1)?.as_str().parse().ok()?;
        let b: i32 = c.get(2)?.as_str().parse().ok()?;
        return Some(TimeRange::ordered(year_start(a.min(b))?, year_end(a.max(b))?));
    }
    let c = IN_YEAR.captures(text)?;
    let y: i32 = c.get(1)?.as_str().parse().ok()?;
    TimeRange::new(year_start(y)?, year_end(y)?).ok()
}

/// Parses `2024-03-01T00:00:00Z`, `2024-03-01`, `2024-03` or `2024`.
///
/// `end_of_period` selects the last instant of a partial date instead of the first.
pub fn parse_date(s: &str, end_of_period: bool) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(t) = DateTime::parse_from_rfc3339(s) {
        return Some(t.with_timezone(&Utc));
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        let t = d.and_hms_opt(0, 0, 0)?.and_utc();
        return Some(if end_of_period { t + Duration::days(1) - Duration::seconds(1) } else { t });
    }
    if let Ok(d) = NaiveDate::parse_from_str(&format!("{s}-01"), "%Y-%m-%d") {
        let t = d.and_hms_opt(0, 0, 0)?.and_utc();
        return if end_of_period {
            t.checked_add_months(Months::new(1)).map(|e| e - Duration::seconds(1))
        } else {
            Some(t)
        };
    }
    if s.len() == 4 {
        let y: i32 = s.parse().ok()?;
        return if end_of_period { year_end(y) } else { year_start(y) };
    }
    None
}

fn year_start(y: i32) -> Option<DateTime<Utc>> {
    Utc.with_ymd_and_hms(y, 1, 1, 0, 0, 0).single()
}

fn year_end(y: i32) -> Option<DateTime<Utc>> {
    Utc.with_ymd_and_hms(y, 12, 31, 23, 59, 59).single()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn last_n_units() {
        let r = relative_window("trend over the last 3 years", now()).unwrap();
        assert_eq!(r.start(), Utc.with_ymd_and_hms(2022, 6, 15, 12, 0, 0).unwrap());
        assert_eq!(r.end(), now());

        let r = relative_window("past 6 months", now()).unwrap();
        assert_eq!(r.start(), Utc.with_ymd_and_hms(2024, 12, 15, 12, 0, 0).unwrap());

        let r = relative_window("last year", now()).unwrap();
        assert_eq!(r.start(), Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap());
    }

    #[test]
    fn recent_and_since() {
        let r = relative_window("recent salinity", now()).unwrap();
        assert_eq!(r.end() - r.start(), Duration::days(RECENT_DAYS));
        let r = relative_window("warming since 2015", now()).unwrap();
        assert_eq!(r.start(), Utc.with_ymd_and_hms(2015, 1, 1, 0, 0, 0).unwrap());
        assert!(relative_window("temperature at 500m", now()).is_none());
    }

    #[test]
    fn calendar_years() {
        let r = year_window("compare between 2021 and 2019").unwrap();
        assert_eq!(r.start(), Utc.with_ymd_and_hms(2019, 1, 1, 0, 0, 0).unwrap());
        assert_eq!(r.end(), Utc.with_ymd_and_hms(2021, 12, 31, 23, 59, 59).unwrap());
        assert!(year_window("in 2023").is_some());
    }

    #[test]
    fn date_formats() {
        assert_eq!(
            parse_date("2024-03-01", false),
            Some(Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap())
        );
        assert_eq!(
            parse_date("2024-02", true),
            Some(Utc.with_ymd_and_hms(2024, 2, 29, 23, 59, 59).unwrap())
        );
        assert_eq!(
            parse_date("2023", true),
            Some(Utc.with_ymd_and_hms(2023, 12, 31, 23, 59, 59).unwrap())
        );
        assert!(parse_date("2024-03-01T06:00:00Z", false).is_some());
        assert!(parse_date("yesterday-ish", false).is_none());
    }
}
