use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use utoipa::ToSchema;

use super::calendar::HolidayCalendar;
use crate::error::AppError;

/// Average length of a month in days, used for long-term leave.
pub const AVERAGE_MONTH_DAYS: Decimal = Decimal::from_parts(3044, 0, 0, false, 2);

/// Decimal places kept for month counts (`DECIMAL(5,2)`).
pub const MONTHS_SCALE: u32 = 2;

/// Derived size of a leave. Exactly one of the two counts is used;
/// the other is zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct LeaveDuration {
    #[schema(example = 5)]
    pub leave_days_count: u32,
    #[schema(example = "0.00", value_type = String)]
    pub leave_months_count: Decimal,
}

impl LeaveDuration {
    pub fn days(count: u32) -> Self {
        Self {
            leave_days_count: count,
            leave_months_count: Decimal::new(0, MONTHS_SCALE),
        }
    }

    pub fn months(count: Decimal) -> Self {
        Self {
            leave_days_count: 0,
            leave_months_count: count,
        }
    }
}

fn check_range(start: NaiveDate, end: NaiveDate) -> Result<(), AppError> {
    if start > end {
        return Err(AppError::InvalidRange { start, end });
    }
    Ok(())
}

/// Working days between two dates, both inclusive.
pub fn working_days<C>(start: NaiveDate, end: NaiveDate, calendar: &C) -> Result<u32, AppError>
where
    C: HolidayCalendar + ?Sized,
{
    check_range(start, end)?;
    Ok(calendar.working_days_between(start, end))
}

/// Elapsed calendar days divided by the average month length, rounded to
/// two places with banker's rounding.
pub fn elapsed_months(start: NaiveDate, end: NaiveDate) -> Result<Decimal, AppError> {
    check_range(start, end)?;
    let days = Decimal::from((end - start).num_days());
    let mut months = (days / AVERAGE_MONTH_DAYS)
        .round_dp_with_strategy(MONTHS_SCALE, RoundingStrategy::MidpointNearestEven);
    months.rescale(MONTHS_SCALE);
    Ok(months)
}

pub fn compute<C>(
    start: NaiveDate,
    end: NaiveDate,
    is_long_term: bool,
    calendar: &C,
) -> Result<LeaveDuration, AppError>
where
    C: HolidayCalendar + ?Sized,
{
    if is_long_term {
        elapsed_months(start, end).map(LeaveDuration::months)
    } else {
        working_days(start, end, calendar).map(LeaveDuration::days)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::leave::calendar::{Greece, WeekendsOnly};
    use chrono::{Datelike, Duration, Weekday};
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn short_term_week_without_holidays() {
        let d = compute(date(2025, 8, 4), date(2025, 8, 8), false, &Greece).unwrap();
        assert_eq!(d.leave_days_count, 5);
        assert_eq!(d.leave_months_count, Decimal::ZERO);
    }

    #[test]
    fn long_term_ninety_days() {
        let d = compute(date(2025, 1, 1), date(2025, 4, 1), true, &Greece).unwrap();
        assert_eq!(d.leave_days_count, 0);
        assert_eq!(d.leave_months_count, dec!(2.96));
        assert_eq!(d.leave_months_count.to_string(), "2.96");
    }

    #[test]
    fn long_term_same_day_is_zero_months() {
        let d = compute(date(2025, 1, 1), date(2025, 1, 1), true, &Greece).unwrap();
        assert_eq!(d.leave_months_count.to_string(), "0.00");
    }

    #[test]
    fn reversed_range_is_invalid() {
        let err = compute(date(2025, 8, 8), date(2025, 8, 4), false, &Greece).unwrap_err();
        assert!(matches!(err, AppError::InvalidRange { .. }));

        let err = compute(date(2025, 8, 8), date(2025, 8, 4), true, &Greece).unwrap_err();
        assert!(matches!(err, AppError::InvalidRange { .. }));
    }

    #[test]
    fn one_year_of_long_term_leave() {
        // 365 / 30.44 = 11.9908...
        assert_eq!(
            elapsed_months(date(2025, 1, 1), date(2026, 1, 1)).unwrap(),
            dec!(11.99)
        );
    }

    fn arb_range() -> impl Strategy<Value = (NaiveDate, NaiveDate)> {
        (0i64..3650, 0i64..400).prop_map(|(offset, len)| {
            let start = date(2020, 1, 1) + Duration::days(offset);
            (start, start + Duration::days(len))
        })
    }

    proptest! {
        #[test]
        fn weekdays_minus_holidays((start, end) in arb_range()) {
            let expected = start
                .iter_days()
                .take_while(|d| *d <= end)
                .filter(|d| !matches!(d.weekday(), Weekday::Sat | Weekday::Sun))
                .filter(|d| !Greece.is_holiday(*d))
                .count() as u32;
            let d = compute(start, end, false, &Greece).unwrap();
            prop_assert_eq!(d.leave_days_count, expected);
            prop_assert_eq!(d.leave_months_count, Decimal::ZERO);
        }

        #[test]
        fn holidays_never_add_days((start, end) in arb_range()) {
            let greek = working_days(start, end, &Greece).unwrap();
            let plain = working_days(start, end, &WeekendsOnly).unwrap();
            prop_assert!(greek <= plain);
        }

        #[test]
        fn months_match_average_month((start, end) in arb_range()) {
            let days = (end - start).num_days();
            let expected = (Decimal::from(days) / dec!(30.44)).round_dp(2);
            let d = compute(start, end, true, &Greece).unwrap();
            prop_assert_eq!(d.leave_months_count, expected);
            prop_assert_eq!(d.leave_months_count.scale(), 2);
            prop_assert_eq!(d.leave_days_count, 0);
        }

        #[test]
        fn recomputation_is_idempotent((start, end) in arb_range(), long_term in any::<bool>()) {
            let first = compute(start, end, long_term, &Greece).unwrap();
            let second = compute(start, end, long_term, &Greece).unwrap();
            prop_assert_eq!(first, second);
            prop_assert_eq!(
                first.leave_months_count.serialize(),
                second.leave_months_count.serialize()
            );
        }

        #[test]
        fn reversed_ranges_always_fail((start, end) in arb_range(), long_term in any::<bool>()) {
            prop_assume!(start != end);
            let result = compute(end, start, long_term, &Greece);
            let rejected = matches!(result, Err(AppError::InvalidRange { .. }));
            prop_assert!(rejected);
        }
    }
}
