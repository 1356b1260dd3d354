//! Per-day totals: work, break and overtime minutes.
//!
//! Totals are a pure function of the clock pattern, the tenant policy and
//! the scheduled break. Open patterns yield provisional figures (zero for
//! SINGLE and BREAK_STARTED, the first session for HALF); closed patterns
//! yield final ones.

use crate::calculation::clock_math::{apply_ot_floor, diff};
use crate::calculation::slot_pattern::ClockPattern;
use crate::models::{AttendanceStatus, TenantPolicy, WorkType};

/// The minute totals derived for one day record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DayTotals {
    /// Net working minutes.
    pub work_minutes: u32,
    /// Break minutes (measured or netted from the schedule).
    pub break_minutes: u32,
    /// Overtime before the gate and rounding.
    pub raw_ot_minutes: u32,
    /// Overtime after the gate and rounding.
    pub ot_minutes: u32,
}

/// Calendar facts about a day, used to resolve the attendance status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DayContext {
    /// The date is a public holiday for the tenant.
    pub is_public_holiday: bool,
    /// An approved leave request covers the date.
    pub on_approved_leave: bool,
    /// The weekly rest day, or a rostered day off.
    pub is_rest_day: bool,
}

/// Measures work and break minutes for a pattern.
///
/// * FULL: both sessions summed, the measured break between them.
/// * HALF: the single session, no break.
/// * NO_BREAK: the whole span net of the scheduled break.
/// * SINGLE and BREAK_STARTED: still open, no work yet.
///
/// # Arguments
///
/// * `pattern` - The classified clock pattern
/// * `scheduled_break_minutes` - The planned break, netted out of the
///   NO_BREAK span (zero when the day has no schedule)
///
/// # Returns
///
/// `(work_minutes, break_minutes)`.
pub fn measure_pattern(pattern: &ClockPattern, scheduled_break_minutes: u32) -> (u32, u32) {
    match *pattern {
        ClockPattern::Single { .. } | ClockPattern::BreakStarted { .. } => (0, 0),
        ClockPattern::Half { in_1, out_1 } => (diff(in_1, out_1), 0),
        ClockPattern::Full {
            in_1,
            out_1,
            in_2,
            out_2,
        } => {
            let work = diff(in_1, out_1) + diff(in_2, out_2);
            let break_minutes = diff(out_1, in_2);
            (work, break_minutes)
        }
        ClockPattern::NoBreak { in_1, out_2 } => {
            let span = diff(in_1, out_2);
            let break_minutes = scheduled_break_minutes.min(span);
            (span - break_minutes, break_minutes)
        }
    }
}

/// Splits overtime out of the working minutes.
///
/// Full-time work past the tenant's standard daily minutes is raw
/// overtime, which then passes the minimum gate and the rounding policy.
/// Part-time employees never accrue overtime; their extra hours are paid
/// at the ordinary rate.
pub fn overtime_minutes(
    work_minutes: u32,
    work_type: WorkType,
    policy: &TenantPolicy,
) -> (u32, u32) {
    if work_type == WorkType::PartTime {
        return (0, 0);
    }
    let raw_ot = work_minutes.saturating_sub(policy.standard_daily_minutes);
    let ot = apply_ot_floor(raw_ot, policy.min_overtime_minutes, &policy.ot_rounding);
    (raw_ot, ot)
}

/// Derives the full minute totals for a pattern under a tenant policy.
///
/// # Examples
///
/// ```
/// use gaji_engine::calculation::{calculate_day_totals, ClockPattern};
/// use gaji_engine::models::{TenantPolicy, WorkType};
/// use chrono::NaiveTime;
///
/// let policy = TenantPolicy::default(); // standard 480, gate 60
/// let pattern = ClockPattern::NoBreak {
///     in_1: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
///     out_2: NaiveTime::from_hms_opt(19, 0, 0).unwrap(),
/// };
/// let totals = calculate_day_totals(&pattern, WorkType::FullTime, &policy, 0);
/// assert_eq!(totals.work_minutes, 600);
/// assert_eq!(totals.ot_minutes, 120);
/// ```
pub fn calculate_day_totals(
    pattern: &ClockPattern,
    work_type: WorkType,
    policy: &TenantPolicy,
    scheduled_break_minutes: u32,
) -> DayTotals {
    let (work_minutes, break_minutes) = measure_pattern(pattern, scheduled_break_minutes);
    let (raw_ot_minutes, ot_minutes) = overtime_minutes(work_minutes, work_type, policy);
    DayTotals {
        work_minutes,
        break_minutes,
        raw_ot_minutes,
        ot_minutes,
    }
}

/// Resolves the attendance status for a day.
///
/// Statuses resolve in priority order: HOLIDAY, then LEAVE, then REST,
/// then PRESENT when any work was recorded, otherwise ABSENT.
pub fn resolve_attendance(work_minutes: u32, ctx: &DayContext) -> AttendanceStatus {
    if ctx.is_public_holiday {
        AttendanceStatus::Holiday
    } else if ctx.on_approved_leave {
        AttendanceStatus::Leave
    } else if ctx.is_rest_day {
        AttendanceStatus::Rest
    } else if work_minutes > 0 {
        AttendanceStatus::Present
    } else {
        AttendanceStatus::Absent
    }
}
