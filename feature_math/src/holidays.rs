//! Country holiday calendars
//!
//! Prices around public holidays behave differently (supplier closures,
//! promotion windows), so the feature set carries holiday proximity. Only
//! the countries the platform operates in are supported; adding one means
//! adding its date table here.

use crate::{FeatureError, Result};
use chrono::{Datelike, Duration, NaiveDate, Weekday};

/// Lookahead/lookback cap for holiday distance features, in days
pub const HOLIDAY_HORIZON_DAYS: u32 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Country {
    UnitedStates,
    Germany,
}

/// Holiday lookup for one country
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HolidayCalendar {
    country: Country,
}

impl HolidayCalendar {
    /// Build a calendar for an ISO 3166 country code (`"US"` or `"DE"`)
    pub fn for_country(code: &str) -> Result<Self> {
        match code.to_ascii_uppercase().as_str() {
            "US" => Ok(Self {
                country: Country::UnitedStates,
            }),
            "DE" => Ok(Self {
                country: Country::Germany,
            }),
            other => Err(FeatureError::UnsupportedCountry(other.to_string())),
        }
    }

    pub fn country_code(&self) -> &'static str {
        match self.country {
            Country::UnitedStates => "US",
            Country::Germany => "DE",
        }
    }

    /// Whether `date` is a public holiday
    pub fn is_holiday(&self, date: NaiveDate) -> bool {
        self.holidays_in_year(date.year()).contains(&date)
    }

    /// Days until the next holiday strictly after `date`, capped at
    /// [`HOLIDAY_HORIZON_DAYS`]
    pub fn days_to_next_holiday(&self, date: NaiveDate) -> u32 {
        for offset in 1..=HOLIDAY_HORIZON_DAYS {
            if self.is_holiday(date + Duration::days(i64::from(offset))) {
                return offset;
            }
        }
        HOLIDAY_HORIZON_DAYS
    }

    /// Days since the last holiday at or before `date`, capped at
    /// [`HOLIDAY_HORIZON_DAYS`]
    pub fn days_since_last_holiday(&self, date: NaiveDate) -> u32 {
        for offset in 0..=HOLIDAY_HORIZON_DAYS {
            if self.is_holiday(date - Duration::days(i64::from(offset))) {
                return offset;
            }
        }
        HOLIDAY_HORIZON_DAYS
    }

    fn holidays_in_year(&self, year: i32) -> Vec<NaiveDate> {
        match self.country {
            Country::UnitedStates => {
                vec![
                    fixed(year, 1, 1),                               // New Year's Day
                    nth_weekday(year, 1, Weekday::Mon, 3),           // Martin Luther King Jr. Day
                    last_weekday(year, 5, Weekday::Mon),             // Memorial Day
                    fixed(year, 7, 4),                               // Independence Day
                    nth_weekday(year, 9, Weekday::Mon, 1),           // Labor Day
                    nth_weekday(year, 11, Weekday::Thu, 4),          // Thanksgiving
                    fixed(year, 12, 25),                             // Christmas Day
                ]
            }
            Country::Germany => {
                let easter = easter_sunday(year);
                vec![
                    fixed(year, 1, 1),                               // Neujahr
                    easter - Duration::days(2),                      // Karfreitag
                    easter + Duration::days(1),                      // Ostermontag
                    fixed(year, 5, 1),                               // Tag der Arbeit
                    easter + Duration::days(39),                     // Christi Himmelfahrt
                    easter + Duration::days(50),                     // Pfingstmontag
                    fixed(year, 10, 3),                              // Tag der Deutschen Einheit
                    fixed(year, 12, 25),                             // 1. Weihnachtstag
                    fixed(year, 12, 26),                             // 2. Weihnachtstag
                ]
            }
        }
    }
}

fn fixed(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid fixed holiday date")
}

/// The `n`-th given weekday of a month (1-based)
fn nth_weekday(year: i32, month: u32, weekday: Weekday, n: u32) -> NaiveDate {
    let first = fixed(year, month, 1);
    let offset = (7 + weekday.num_days_from_monday() - first.weekday().num_days_from_monday()) % 7;
    first + Duration::days(i64::from(offset) + 7 * (i64::from(n) - 1))
}

/// The last given weekday of a month
fn last_weekday(year: i32, month: u32, weekday: Weekday) -> NaiveDate {
    let next_month_first = if month == 12 {
        fixed(year + 1, 1, 1)
    } else {
        fixed(year, month + 1, 1)
    };
    let last = next_month_first - Duration::days(1);
    let back = (7 + last.weekday().num_days_from_monday() - weekday.num_days_from_monday()) % 7;
    last - Duration::days(i64::from(back))
}

/// Easter Sunday by the anonymous Gregorian computus
fn easter_sunday(year: i32) -> NaiveDate {
    let a = year % 19;
    let b = year / 100;
    let c = year % 100;
    let d = b / 4;
    let e = b % 4;
    let f = (b + 8) / 25;
    let g = (b - f + 1) / 3;
    let h = (19 * a + b - d - g + 15) % 30;
    let i = c / 4;
    let k = c % 4;
    let l = (32 + 2 * e + 2 * i - h - k) % 7;
    let m = (a + 11 * h + 22 * l) / 451;
    let month = (h + l - 7 * m + 114) / 31;
    let day = (h + l - 7 * m + 114) % 31 + 1;
    fixed(year, month as u32, day as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_easter_known_years() {
        assert_eq!(easter_sunday(2024), date(2024, 3, 31));
        assert_eq!(easter_sunday(2025), date(2025, 4, 20));
        assert_eq!(easter_sunday(2026), date(2026, 4, 5));
    }

    #[test]
    fn test_us_holidays() {
        let us = HolidayCalendar::for_country("US").unwrap();
        assert!(us.is_holiday(date(2024, 7, 4)));
        // Thanksgiving 2024
        assert!(us.is_holiday(date(2024, 11, 28)));
        // Memorial Day 2024
        assert!(us.is_holiday(date(2024, 5, 27)));
        assert!(!us.is_holiday(date(2024, 7, 5)));
    }

    #[test]
    fn test_de_holidays() {
        let de = HolidayCalendar::for_country("de").unwrap();
        assert!(de.is_holiday(date(2024, 10, 3)));
        // Karfreitag 2024
        assert!(de.is_holiday(date(2024, 3, 29)));
        // Pfingstmontag 2024
        assert!(de.is_holiday(date(2024, 5, 20)));
        assert!(!de.is_holiday(date(2024, 7, 4)));
    }

    #[test]
    fn test_distance_caps() {
        let us = HolidayCalendar::for_country("US").unwrap();
        // Day after Independence Day
        assert_eq!(us.days_since_last_holiday(date(2024, 7, 5)), 1);
        assert_eq!(us.days_since_last_holiday(date(2024, 7, 4)), 0);
        // Mid-March is far from any US holiday in both directions
        assert_eq!(us.days_to_next_holiday(date(2024, 3, 15)), HOLIDAY_HORIZON_DAYS);
        assert_eq!(
            us.days_since_last_holiday(date(2024, 3, 15)),
            HOLIDAY_HORIZON_DAYS
        );
    }

    #[test]
    fn test_unsupported_country() {
        assert!(HolidayCalendar::for_country("FR").is_err());
    }
}
