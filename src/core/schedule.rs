//! Schedule arithmetic for recurring definitions.
//!
//! One advance moves a timestamp forward by exactly one unit of its
//! [`Frequency`]. Monthly and yearly advances return to the anchor day when the
//! target month is long enough and clamp to the month's last day otherwise, so
//! Jan 31 -> Feb 29 -> Mar 31 rather than drifting to the 29th.

use crate::entities::Frequency;
use crate::errors::{Error, Result};
use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, Utc};

/// Number of days in the given month.
#[must_use]
pub fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|first_of_next| first_of_next.pred_opt())
        .map_or(28, |last| last.day())
}

impl Frequency {
    /// Returns the occurrence following `from`.
    ///
    /// `anchor_day` is the day-of-month the schedule was created with; daily and
    /// weekly schedules ignore it.
    ///
    /// # Errors
    /// Returns a validation error if the result falls outside the supported
    /// date range.
    pub fn advance(self, from: DateTime<Utc>, anchor_day: u32) -> Result<DateTime<Utc>> {
        let next = match self {
            Self::Daily => from.checked_add_signed(Duration::days(1)),
            Self::Weekly => from.checked_add_signed(Duration::days(7)),
            Self::Monthly => shift_months(from, 1, anchor_day),
            Self::Yearly => shift_months(from, 12, anchor_day),
        };
        next.ok_or_else(|| Error::validation("next_run_at", format!("cannot advance {from} any further")))
    }

    /// Lowercase label used in logs and exports.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
        }
    }
}

/// Moves `from` forward by `months`, landing on `anchor_day` clamped to the
/// target month's length. The time of day is kept.
fn shift_months(from: DateTime<Utc>, months: u32, anchor_day: u32) -> Option<DateTime<Utc>> {
    let first_of_month = from.date_naive().with_day(1)?;
    let target_month = first_of_month.checked_add_months(Months::new(months))?;
    let day = anchor_day
        .clamp(1, 31)
        .min(days_in_month(target_month.year(), target_month.month()));
    let target = target_month.with_day(day)?;
    Some(target.and_time(from.time()).and_utc())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use chrono::TimeZone;
    use sea_orm::Iterable;

    fn at(year: i32, month: u32, day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, month, day, 8, 30, 0).unwrap()
    }

    #[test]
    fn test_days_in_month() {
        assert_eq!(days_in_month(2024, 2), 29);
        assert_eq!(days_in_month(2023, 2), 28);
        assert_eq!(days_in_month(2024, 12), 31);
        assert_eq!(days_in_month(2024, 4), 30);
    }

    #[test]
    fn test_daily_and_weekly() {
        let from = at(2024, 2, 28);
        assert_eq!(Frequency::Daily.advance(from, 28).unwrap(), at(2024, 2, 29));
        assert_eq!(Frequency::Weekly.advance(from, 28).unwrap(), at(2024, 3, 6));
    }

    #[test]
    fn test_monthly_clamps_to_leap_february() {
        let next = Frequency::Monthly.advance(at(2024, 1, 31), 31).unwrap();
        assert_eq!(next, at(2024, 2, 29));
    }

    #[test]
    fn test_monthly_clamps_to_non_leap_february() {
        let next = Frequency::Monthly.advance(at(2023, 1, 31), 31).unwrap();
        assert_eq!(next, at(2023, 2, 28));
    }

    #[test]
    fn test_monthly_returns_to_anchor_after_clamp() {
        let feb = Frequency::Monthly.advance(at(2024, 1, 31), 31).unwrap();
        let mar = Frequency::Monthly.advance(feb, 31).unwrap();
        assert_eq!(mar, at(2024, 3, 31));
        let apr = Frequency::Monthly.advance(mar, 31).unwrap();
        assert_eq!(apr, at(2024, 4, 30));
    }

    #[test]
    fn test_monthly_wraps_year() {
        let next = Frequency::Monthly.advance(at(2024, 12, 15), 15).unwrap();
        assert_eq!(next, at(2025, 1, 15));
    }

    #[test]
    fn test_yearly_clamps_leap_day() {
        let next = Frequency::Yearly.advance(at(2024, 2, 29), 29).unwrap();
        assert_eq!(next, at(2025, 2, 28));
        let back_on_leap = Frequency::Yearly
            .advance(Frequency::Yearly.advance(Frequency::Yearly.advance(next, 29).unwrap(), 29).unwrap(), 29)
            .unwrap();
        assert_eq!(back_on_leap, at(2028, 2, 29));
    }

    #[test]
    fn test_advance_is_strictly_monotonic() {
        let starts = [at(2024, 1, 31), at(2024, 2, 29), at(2023, 12, 31), at(2024, 6, 1)];
        for frequency in Frequency::iter() {
            for start in starts {
                let next = frequency.advance(start, start.day()).unwrap();
                assert!(next > start, "{frequency:?} from {start} gave {next}");
            }
        }
    }

    #[test]
    fn test_keeps_time_of_day() {
        let from = Utc.with_ymd_and_hms(2024, 3, 10, 23, 59, 59).unwrap();
        let next = Frequency::Monthly.advance(from, 10).unwrap();
        assert_eq!(next, Utc.with_ymd_and_hms(2024, 4, 10, 23, 59, 59).unwrap());
    }
}
