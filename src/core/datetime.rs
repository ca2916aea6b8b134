//! Date arithmetic used by schedules and generated content.
//!
//! Elapsed-time checks compare whole units: days are floored from the
//! signed duration, months compare `year * 12 + month`.

use chrono::{DateTime, Datelike, Local, NaiveDate, TimeZone};

/// Whole days elapsed from `earlier` to `later`, floored toward negative infinity.
#[must_use]
pub fn whole_days_between<A: TimeZone, B: TimeZone>(earlier: &DateTime<A>, later: &DateTime<B>) -> i64 {
    let millis = later
        .clone()
        .signed_duration_since(earlier.clone())
        .num_milliseconds();
    millis.div_euclid(86_400_000)
}

/// Calendar months from `earlier` to `later` as `year * 12 + month` difference.
#[must_use]
pub fn calendar_months_between<A: TimeZone, B: TimeZone>(
    earlier: &DateTime<A>,
    later: &DateTime<B>,
) -> i64 {
    let index = |year: i32, month: u32| i64::from(year) * 12 + i64::from(month);
    index(later.year(), later.month()) - index(earlier.year(), earlier.month())
}

/// Short localized date, e.g. `3/7/2025`.
#[must_use]
pub fn format_short_date(date: NaiveDate) -> String {
    date.format("%-m/%-d/%Y").to_string()
}

/// Today's date in local time.
#[must_use]
pub fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn utc(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    #[test]
    fn test_whole_days_floor() {
        let start = utc(2024, 3, 1, 9);
        assert_eq!(whole_days_between(&start, &(start + Duration::hours(23))), 0);
        assert_eq!(whole_days_between(&start, &(start + Duration::hours(24))), 1);
        assert_eq!(whole_days_between(&start, &(start + Duration::hours(47))), 1);
        assert_eq!(whole_days_between(&start, &(start - Duration::hours(1))), -1);
    }

    #[test]
    fn test_calendar_months() {
        assert_eq!(calendar_months_between(&utc(2024, 3, 1, 0), &utc(2024, 3, 28, 0)), 0);
        assert_eq!(calendar_months_between(&utc(2024, 3, 31, 0), &utc(2024, 4, 1, 0)), 1);
        assert_eq!(calendar_months_between(&utc(2023, 12, 15, 0), &utc(2024, 1, 2, 0)), 1);
    }

    #[test]
    fn test_format_short_date() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 7).unwrap();
        assert_eq!(format_short_date(date), "3/7/2025");
    }
}
