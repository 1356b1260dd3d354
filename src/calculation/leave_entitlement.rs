//! Leave entitlement projection as of a reference date.
//!
//! The resolver is pure: it reads the employee, the leave type, the stored
//! balance and the year's requests, and projects earned, taken, available,
//! advance-used and encashable days without mutating anything. Balances
//! mutate only when leave requests transition.

use chrono::{Datelike, NaiveDate};
use rust_decimal::{Decimal, RoundingStrategy};
use uuid::Uuid;

use crate::models::{Employee, LeaveBalance, LeaveRequest, LeaveRequestStatus, LeaveType};

/// Twelve months, the accrual denominator.
const MONTHS_PER_YEAR: Decimal = Decimal::from_parts(12, 0, 0, false, 0);

/// An employee's projected position for one leave type.
#[derive(Debug, Clone, PartialEq)]
pub struct LeaveEntitlement {
    /// The leave type projected.
    pub leave_type_id: Uuid,
    /// The leave type code, for display.
    pub code: String,
    /// Days earned so far this leave year, accrued monthly.
    pub ytd_earned: Decimal,
    /// Days carried over from last year after the policy cap.
    pub carried_forward: Decimal,
    /// Manual balance adjustments.
    pub adjustments: Decimal,
    /// Earned plus carried forward plus adjustments.
    pub total_entitlement: Decimal,
    /// Approved days starting on or before the reference date.
    pub ytd_taken: Decimal,
    /// Approved days starting strictly after the reference date.
    pub future_taken: Decimal,
    /// Days locked in requests awaiting a decision.
    pub pending: Decimal,
    /// Days still usable as of the reference date.
    pub available: Decimal,
    /// Approved days in excess of what has accrued so far.
    pub advance_used: Decimal,
    /// Days convertible to cash on exit.
    pub encashable_days: Decimal,
    /// Whether the type itself is paid and encashable on exit.
    pub encashable_type: bool,
}

/// The employee's most recent hire anniversary on or before `as_of`.
///
/// A 29 February hire date falls back to 28 February in non-leap years.
pub fn anniversary_on_or_before(hire_date: NaiveDate, as_of: NaiveDate) -> NaiveDate {
    let candidate = anniversary_in_year(hire_date, as_of.year());
    if candidate > as_of {
        anniversary_in_year(hire_date, as_of.year() - 1)
    } else {
        candidate
    }
}

fn anniversary_in_year(hire_date: NaiveDate, year: i32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, hire_date.month(), hire_date.day())
        .or_else(|| NaiveDate::from_ymd_opt(year, hire_date.month(), hire_date.day() - 1))
        .unwrap_or(hire_date)
}

/// Completed accrual months between the last hire anniversary and the
/// reference date, capped at twelve.
///
/// The reference date counts as served: an accrual month completes on its
/// own last day, so a full leave year has accrued by the day before the
/// next anniversary.
pub fn months_since_anniversary(hire_date: NaiveDate, as_of: NaiveDate) -> u32 {
    if as_of < hire_date {
        return 0;
    }
    let anniversary = anniversary_on_or_before(hire_date, as_of);
    let served_through = as_of.succ_opt().unwrap_or(as_of);
    crate::models::completed_months(anniversary, served_through).min(12)
}

/// Days earned so far in the leave year: the annual entitlement accrued
/// monthly since the hire anniversary, rounded to whole days.
pub fn ytd_earned(annual_entitlement: Decimal, hire_date: NaiveDate, as_of: NaiveDate) -> Decimal {
    let months = Decimal::from(months_since_anniversary(hire_date, as_of));
    (annual_entitlement * months / MONTHS_PER_YEAR)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

/// Projects one leave type for one employee as of a reference date.
///
/// # Arguments
///
/// * `employee` - The employee projected
/// * `leave_type` - The leave type and its policies
/// * `balance` - The stored balance row for the leave year, if one exists
/// * `requests` - The employee's requests; other types are ignored
/// * `as_of` - The reference date
///
/// # Returns
///
/// The projected [`LeaveEntitlement`]. `available` may be negative when
/// advance leave has been taken.
pub fn resolve_entitlement(
    employee: &Employee,
    leave_type: &LeaveType,
    balance: Option<&LeaveBalance>,
    requests: &[LeaveRequest],
    as_of: NaiveDate,
) -> LeaveEntitlement {
    let earned = ytd_earned(leave_type.annual_entitlement_days, employee.hire_date, as_of);
    let carried_forward = balance
        .map(|b| leave_type.carry_forward.cap(b.carried_forward))
        .unwrap_or(Decimal::ZERO);
    let adjustments = balance.map(|b| b.adjustment_days).unwrap_or(Decimal::ZERO);
    let total_entitlement = earned + carried_forward + adjustments;

    let mut ytd_taken = Decimal::ZERO;
    let mut future_taken = Decimal::ZERO;
    let mut pending = Decimal::ZERO;
    for request in requests {
        if request.leave_type_id != leave_type.id || request.employee_id != employee.id {
            continue;
        }
        match request.status {
            LeaveRequestStatus::Approved => {
                if request.start_date > as_of {
                    future_taken += request.days;
                } else {
                    ytd_taken += request.days;
                }
            }
            LeaveRequestStatus::Pending => pending += request.days,
            LeaveRequestStatus::Rejected | LeaveRequestStatus::Cancelled => {}
        }
    }

    let available = total_entitlement - ytd_taken - future_taken - pending;
    let advance_used = (ytd_taken + future_taken - earned - carried_forward).max(Decimal::ZERO);

    let encashable_type = leave_type.is_paid && leave_type.encashable_on_exit;
    let encashable_days = if encashable_type {
        let cap = leave_type.encashment_cap_days.unwrap_or(available);
        available.min(cap).max(Decimal::ZERO)
    } else {
        Decimal::ZERO
    };

    LeaveEntitlement {
        leave_type_id: leave_type.id,
        code: leave_type.code.clone(),
        ytd_earned: earned,
        carried_forward,
        adjustments,
        total_entitlement,
        ytd_taken,
        future_taken,
        pending,
        available,
        advance_used,
        encashable_days,
        encashable_type,
    }
}
