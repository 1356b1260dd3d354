//! Approval state machines for day records and overtime.
//!
//! A day record and its overtime approve independently. The day moves
//! IN_PROGRESS to COMPLETED (or AUTO_CLOSED via the sweep) and then to
//! APPROVED or REJECTED by a supervisor. Overtime sits at NONE while the
//! day produced none, turns PENDING when a day with overtime closes, and
//! is decided separately. Rejected overtime stays on the record but is
//! never paid.

use chrono::Utc;

use crate::calculation::day_totals::DayTotals;
use crate::error::{EngineError, EngineResult};
use crate::models::{AttendanceStatus, DayRecord, OtStatus, RecordStatus, Role};

/// The overtime state a record enters when it closes.
pub fn ot_status_on_close(ot_minutes: u32) -> OtStatus {
    if ot_minutes == 0 {
        OtStatus::None
    } else {
        OtStatus::Pending
    }
}

/// Closes an open record normally with its computed totals.
///
/// # Arguments
///
/// * `record` - The record to close; mutated in place
/// * `totals` - Totals computed for the final pattern
/// * `attendance` - The resolved attendance status
///
/// # Returns
///
/// [`EngineError::InvalidTransition`] unless the record is IN_PROGRESS.
pub fn complete_record(
    record: &mut DayRecord,
    totals: &DayTotals,
    attendance: AttendanceStatus,
) -> EngineResult<()> {
    if record.record_status != RecordStatus::InProgress {
        return Err(EngineError::InvalidTransition {
            entity: "day record",
            state: record.record_status.to_string(),
            action: "complete",
        });
    }
    record.total_work_minutes = totals.work_minutes;
    record.break_minutes = totals.break_minutes;
    record.ot_minutes = totals.ot_minutes;
    record.attendance_status = attendance;
    record.record_status = RecordStatus::Completed;
    record.ot_status = ot_status_on_close(totals.ot_minutes);
    record.updated_at = Utc::now();
    Ok(())
}

/// Approves a closed day record.
///
/// Legal from COMPLETED or AUTO_CLOSED. Approving an auto-closed record
/// resolves its review flag.
pub fn approve_day(record: &mut DayRecord, approver: Role) -> EngineResult<()> {
    decide_day(record, approver, RecordStatus::Approved, "approve day record")?;
    record.reject_reason = None;
    Ok(())
}

/// Rejects a closed day record with a reason. A rejected day contributes
/// nothing to payroll.
pub fn reject_day(record: &mut DayRecord, approver: Role, reason: String) -> EngineResult<()> {
    decide_day(record, approver, RecordStatus::Rejected, "reject day record")?;
    record.reject_reason = Some(reason);
    Ok(())
}

fn decide_day(
    record: &mut DayRecord,
    approver: Role,
    verdict: RecordStatus,
    action: &'static str,
) -> EngineResult<()> {
    if !approver.can_approve_day() {
        return Err(EngineError::PermissionDenied {
            role: approver.to_string(),
            action,
        });
    }
    match record.record_status {
        RecordStatus::Completed | RecordStatus::AutoClosed => {
            record.record_status = verdict;
            record.needs_review = false;
            record.updated_at = Utc::now();
            Ok(())
        }
        RecordStatus::Approved | RecordStatus::Rejected => Err(EngineError::DayAlreadyClosed {
            employee_id: record.employee_id,
            work_date: record.work_date,
            status: record.record_status.to_string(),
        }),
        state => Err(EngineError::InvalidTransition {
            entity: "day record",
            state: state.to_string(),
            action,
        }),
    }
}

/// Approves pending overtime on a record.
pub fn approve_ot(record: &mut DayRecord, approver: Role) -> EngineResult<()> {
    decide_ot(record, approver, OtStatus::Approved, "approve overtime")
}

/// Rejects pending overtime. The minutes stay on the record but are
/// zeroed wherever pay is composed.
pub fn reject_ot(record: &mut DayRecord, approver: Role) -> EngineResult<()> {
    decide_ot(record, approver, OtStatus::Rejected, "reject overtime")
}

fn decide_ot(
    record: &mut DayRecord,
    approver: Role,
    verdict: OtStatus,
    action: &'static str,
) -> EngineResult<()> {
    if !approver.can_approve_overtime() {
        return Err(EngineError::PermissionDenied {
            role: approver.to_string(),
            action,
        });
    }
    if record.ot_status != OtStatus::Pending {
        return Err(EngineError::InvalidTransition {
            entity: "overtime",
            state: record.ot_status.to_string(),
            action,
        });
    }
    record.ot_status = verdict;
    record.updated_at = Utc::now();
    Ok(())
}

/// The overtime minutes a record actually pays out: its minutes when the
/// overtime was approved, zero in every other state.
pub fn payable_ot_minutes(record: &DayRecord) -> u32 {
    match record.ot_status {
        OtStatus::Approved => record.ot_minutes,
        OtStatus::None | OtStatus::Pending | OtStatus::Rejected => 0,
    }
}
