//! Deterministic closure of abandoned day records.
//!
//! Records still open when the next day begins get a synthetic final
//! clock-out derived from the schedule, recomputed totals capped at the
//! planned day length, and no overtime. Every auto-closed record is
//! flagged for human review.

use chrono::{NaiveTime, Utc};

use crate::calculation::clock_math::{MINUTES_PER_DAY, minute_of_day};
use crate::calculation::day_totals::{DayContext, calculate_day_totals, resolve_attendance};
use crate::calculation::slot_pattern::{
    ClockPattern, SlotClassification, SlotTimes, classify_slots,
};
use crate::models::{
    ClockEntry, DayRecord, OtStatus, RecordStatus, ScheduledShift, TenantPolicy, WorkType,
};

/// Shift ends at or before this minute count as night shifts.
const NIGHT_SHIFT_END_CUTOFF: u32 = 6 * 60;

/// Grace added past a night shift's end before the synthetic clock-out.
const NIGHT_SHIFT_GRACE_MINUTES: u32 = 60;

fn time_from_minute(minute: u32) -> NaiveTime {
    let m = minute % MINUTES_PER_DAY;
    NaiveTime::from_hms_opt(m / 60, m % 60, 0).unwrap_or(NaiveTime::MIN)
}

/// The clock-out time the sweep synthesises for an abandoned record.
///
/// A day shift is cut at midnight. A night shift (scheduled end between
/// 00:00 and 06:00) is cut one hour past its scheduled end, so a slightly
/// late finish still measures fully. With no usable schedule the cut is
/// midnight.
pub fn synthetic_clock_out(shift: Option<&ScheduledShift>) -> NaiveTime {
    match shift {
        Some(s) if !s.is_off => {
            let end = minute_of_day(s.shift_end);
            if end <= NIGHT_SHIFT_END_CUTOFF {
                time_from_minute(end + NIGHT_SHIFT_GRACE_MINUTES)
            } else {
                NaiveTime::MIN
            }
        }
        _ => NaiveTime::MIN,
    }
}

fn work_cap(work_type: WorkType, policy: &TenantPolicy, shift: Option<&ScheduledShift>) -> u32 {
    match work_type {
        WorkType::FullTime => policy.standard_daily_minutes,
        WorkType::PartTime => shift
            .filter(|s| !s.is_off)
            .map(ScheduledShift::scheduled_minutes)
            .unwrap_or(policy.standard_daily_minutes),
    }
}

/// Closes one abandoned record in place.
///
/// Open patterns get a synthetic final clock-out (a lone clock-in closes
/// as NO_BREAK, an ended break as FULL, a record abandoned at its break
/// keeps the first session as its work). Totals are recomputed and then
/// capped: full-time at the tenant standard, part-time at the scheduled
/// minutes. No overtime is awarded. The record becomes AUTO_CLOSED and is
/// flagged for review.
///
/// # Arguments
///
/// * `record` - The record to close; mutated in place
/// * `shift` - The scheduled shift for the record's date, if any
/// * `work_type` - The employee's work type
/// * `policy` - The tenant policy in force
/// * `ctx` - Calendar facts used to resolve the attendance status
///
/// # Returns
///
/// `true` if the record was closed, `false` if it was not IN_PROGRESS and
/// the call was a no-op. Rerunning the sweep therefore changes nothing.
pub fn close_abandoned_record(
    record: &mut DayRecord,
    shift: Option<&ScheduledShift>,
    work_type: WorkType,
    policy: &TenantPolicy,
    ctx: &DayContext,
) -> bool {
    if record.record_status != RecordStatus::InProgress {
        return false;
    }

    let slots = SlotTimes::from(&*record);
    let closed_pattern = match classify_slots(&slots) {
        SlotClassification::Pattern(ClockPattern::Single { in_1 }) => {
            let out_2 = synthetic_clock_out(shift);
            record.clock_out_2 = Some(ClockEntry::at(out_2));
            Some(ClockPattern::NoBreak { in_1, out_2 })
        }
        SlotClassification::Pattern(ClockPattern::BreakStarted { in_1, out_1, in_2 }) => {
            let out_2 = synthetic_clock_out(shift);
            record.clock_out_2 = Some(ClockEntry::at(out_2));
            Some(ClockPattern::Full {
                in_1,
                out_1,
                in_2,
                out_2,
            })
        }
        SlotClassification::Pattern(pattern) => Some(pattern),
        // no clocks, a cancelled sync or an unrecognised layout closes as
        // a zero-work day
        SlotClassification::Empty
        | SlotClassification::CancelledSync { .. }
        | SlotClassification::Unrecognised => None,
    };

    let scheduled_break = shift
        .filter(|s| !s.is_off)
        .map(|s| s.break_minutes)
        .unwrap_or(0);
    let totals = closed_pattern
        .map(|p| calculate_day_totals(&p, work_type, policy, scheduled_break))
        .unwrap_or_default();

    record.total_work_minutes = totals.work_minutes.min(work_cap(work_type, policy, shift));
    record.break_minutes = totals.break_minutes;
    record.ot_minutes = 0;
    record.ot_status = OtStatus::None;
    record.attendance_status = resolve_attendance(record.total_work_minutes, ctx);
    record.record_status = RecordStatus::AutoClosed;
    record.auto_closed = true;
    record.needs_review = true;
    record.updated_at = Utc::now();
    true
}
