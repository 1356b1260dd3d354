//! Working-day counting for proration and daily rates.
//!
//! A working day is any calendar day that is neither the tenant's weekly
//! rest day nor a public holiday. Monthly proration and the settlement
//! daily rate both divide by the working days of the month.

use chrono::{Datelike, NaiveDate, Weekday};
use rust_decimal::{Decimal, RoundingStrategy};

use crate::models::PayrollPeriod;

/// Whether the date counts as a working day.
pub fn is_working_day(date: NaiveDate, rest_day: Weekday, holidays: &[NaiveDate]) -> bool {
    date.weekday() != rest_day && !holidays.contains(&date)
}

/// Counts working days in an inclusive date range. Zero when the range is
/// inverted.
pub fn working_days_between(
    from: NaiveDate,
    to: NaiveDate,
    rest_day: Weekday,
    holidays: &[NaiveDate],
) -> u32 {
    let mut count = 0;
    let mut date = from;
    while date <= to {
        if is_working_day(date, rest_day, holidays) {
            count += 1;
        }
        match date.succ_opt() {
            Some(next) => date = next,
            None => break,
        }
    }
    count
}

/// Counts working days in a payroll month.
pub fn working_days_in_month(
    period: PayrollPeriod,
    rest_day: Weekday,
    holidays: &[NaiveDate],
) -> u32 {
    match period.bounds() {
        Some((first, last)) => working_days_between(first, last, rest_day, holidays),
        None => 0,
    }
}

/// The fraction of the month's working days an inclusive range covers,
/// used for basic-pay proration.
///
/// # Arguments
///
/// * `worked_from` - First day of the employed stretch (clamped to the month)
/// * `worked_to` - Last day of the employed stretch (clamped to the month)
/// * `period` - The payroll month
/// * `rest_day` - The tenant's weekly rest day
/// * `holidays` - Public holiday dates
///
/// # Returns
///
/// A fraction in `[0, 1]`; exactly one when the range covers the whole
/// month, zero when the month has no working days.
pub fn proration_fraction(
    worked_from: NaiveDate,
    worked_to: NaiveDate,
    period: PayrollPeriod,
    rest_day: Weekday,
    holidays: &[NaiveDate],
) -> Decimal {
    let Some((first, last)) = period.bounds() else {
        return Decimal::ZERO;
    };
    let from = worked_from.max(first);
    let to = worked_to.min(last);
    if from > to {
        return Decimal::ZERO;
    }

    let in_month = working_days_in_month(period, rest_day, holidays);
    if in_month == 0 {
        return Decimal::ZERO;
    }
    let worked = working_days_between(from, to, rest_day, holidays);
    Decimal::from(worked) / Decimal::from(in_month)
}

/// Prorated basic pay for a stretch of the month, rounded to cents.
pub fn prorate_basic(
    basic_salary: Decimal,
    worked_from: NaiveDate,
    worked_to: NaiveDate,
    period: PayrollPeriod,
    rest_day: Weekday,
    holidays: &[NaiveDate],
) -> Decimal {
    let fraction = proration_fraction(worked_from, worked_to, period, rest_day, holidays);
    (basic_salary * fraction).round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}
