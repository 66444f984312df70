//! Calendar-derived features

use chrono::{Datelike, Duration, NaiveDate, Weekday};

/// Calendar position of a single date
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalendarFeatures {
    /// Monday = 0 .. Sunday = 6
    pub day_of_week: u32,
    pub day_of_month: u32,
    /// ISO 8601 week number
    pub week_of_year: u32,
    pub month: u32,
    /// 1..=4
    pub quarter: u32,
    pub is_weekend: bool,
    pub is_month_start: bool,
    pub is_month_end: bool,
}

/// Compute calendar features for `date`
pub fn calendar_features(date: NaiveDate) -> CalendarFeatures {
    let weekday = date.weekday();
    let next_day = date + Duration::days(1);

    CalendarFeatures {
        day_of_week: weekday.num_days_from_monday(),
        day_of_month: date.day(),
        week_of_year: date.iso_week().week(),
        month: date.month(),
        quarter: (date.month() - 1) / 3 + 1,
        is_weekend: matches!(weekday, Weekday::Sat | Weekday::Sun),
        is_month_start: date.day() == 1,
        is_month_end: next_day.month() != date.month(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_weekday_and_weekend() {
        // 2024-06-03 is a Monday
        let monday = calendar_features(date(2024, 6, 3));
        assert_eq!(monday.day_of_week, 0);
        assert!(!monday.is_weekend);

        let sunday = calendar_features(date(2024, 6, 9));
        assert_eq!(sunday.day_of_week, 6);
        assert!(sunday.is_weekend);
    }

    #[test]
    fn test_month_boundaries() {
        let first = calendar_features(date(2024, 2, 1));
        assert!(first.is_month_start);
        assert!(!first.is_month_end);

        // Leap-year February
        let last = calendar_features(date(2024, 2, 29));
        assert!(last.is_month_end);
        assert!(!last.is_month_start);
    }

    #[test]
    fn test_quarter_and_week() {
        assert_eq!(calendar_features(date(2024, 1, 15)).quarter, 1);
        assert_eq!(calendar_features(date(2024, 4, 1)).quarter, 2);
        assert_eq!(calendar_features(date(2024, 12, 31)).quarter, 4);

        // ISO week 1 of 2025 starts on 2024-12-30
        assert_eq!(calendar_features(date(2024, 12, 30)).week_of_year, 1);
    }
}
