//! Read-only projections over the store.
//!
//! Queries compose their answers on the fly from current store state
//! and never write anything back: previews here are the same
//! calculations the commands run, minus the side effects. Each query
//! takes one read lock for its duration, so the answer is a consistent
//! snapshot.

use chrono::NaiveDate;
use uuid::Uuid;

use crate::calculation::LeaveEntitlement;
use crate::error::EngineResult;
use crate::models::{
    AttendanceStatus, DayRecord, OtStatus, PayrollItem, PayrollPeriod, Settlement,
};

use super::commands::{compose_item, compose_settlement, resolve_all_entitlements};
use super::events::ReviewEntry;
use super::state::EngineState;

/// One employee's attendance month, summarised for display.
///
/// Counts and minute totals cover closed records only; a day still in
/// progress appears in `days` but contributes nothing to the numbers.
#[derive(Debug, Clone)]
pub struct MonthlyAttendance {
    /// The employee summarised.
    pub employee_id: Uuid,
    /// The payroll month summarised.
    pub period: PayrollPeriod,
    /// The month's day records, in date order.
    pub days: Vec<DayRecord>,
    /// Closed days the employee worked.
    pub present_days: u32,
    /// Closed days with no attendance and no cover.
    pub absent_days: u32,
    /// Closed days covered by approved leave.
    pub leave_days: u32,
    /// Closed days on a gazetted public holiday.
    pub holiday_days: u32,
    /// Closed days on the weekly rest day or a rostered day off.
    pub rest_days: u32,
    /// Work minutes across closed days.
    pub total_work_minutes: u32,
    /// Break minutes across closed days.
    pub total_break_minutes: u32,
    /// Rounded overtime minutes across closed days, decided or not.
    pub total_ot_minutes: u32,
    /// Overtime minutes actually approved for payment.
    pub approved_ot_minutes: u32,
    /// Days closed by the sweep.
    pub auto_closed_days: u32,
    /// Days still flagged for administrator review.
    pub needs_review_days: u32,
}

/// Summarises one employee's attendance for a payroll month.
///
/// # Arguments
///
/// * `state` - The engine state
/// * `employee_id` - The employee summarised
/// * `period` - The payroll month
///
/// # Returns
///
/// The [`MonthlyAttendance`] summary, or [`NotFound`] for an unknown
/// employee.
///
/// [`NotFound`]: crate::error::EngineError::NotFound
pub async fn monthly_attendance(
    state: &EngineState,
    employee_id: Uuid,
    period: PayrollPeriod,
) -> EngineResult<MonthlyAttendance> {
    state
        .store()
        .read(|data| {
            data.employee(employee_id)?;
            let days = data.day_records_for(employee_id, period);

            let mut summary = MonthlyAttendance {
                employee_id,
                period,
                days: Vec::new(),
                present_days: 0,
                absent_days: 0,
                leave_days: 0,
                holiday_days: 0,
                rest_days: 0,
                total_work_minutes: 0,
                total_break_minutes: 0,
                total_ot_minutes: 0,
                approved_ot_minutes: 0,
                auto_closed_days: 0,
                needs_review_days: 0,
            };
            for record in &days {
                if !record.record_status.is_closed() {
                    continue;
                }
                match record.attendance_status {
                    AttendanceStatus::Present => summary.present_days += 1,
                    AttendanceStatus::Absent => summary.absent_days += 1,
                    AttendanceStatus::Leave => summary.leave_days += 1,
                    AttendanceStatus::Holiday => summary.holiday_days += 1,
                    AttendanceStatus::Rest => summary.rest_days += 1,
                }
                summary.total_work_minutes += record.total_work_minutes;
                summary.total_break_minutes += record.break_minutes;
                summary.total_ot_minutes += record.ot_minutes;
                if record.ot_status == OtStatus::Approved {
                    summary.approved_ot_minutes += record.ot_minutes;
                }
                if record.auto_closed {
                    summary.auto_closed_days += 1;
                }
                if record.needs_review {
                    summary.needs_review_days += 1;
                }
            }
            summary.days = days;
            Ok(summary)
        })
        .await
}

/// Lists the tenant's day records with overtime awaiting a decision,
/// ordered by work date then employee.
pub async fn pending_overtime(
    state: &EngineState,
    tenant_id: Uuid,
) -> EngineResult<Vec<DayRecord>> {
    state
        .store()
        .read(|data| {
            data.tenant(tenant_id)?;
            let mut pending: Vec<DayRecord> = data
                .day_records
                .values()
                .filter(|r| r.tenant_id == tenant_id && r.ot_status == OtStatus::Pending)
                .cloned()
                .collect();
            pending.sort_by_key(|r| (r.work_date, r.employee_id));
            Ok(pending)
        })
        .await
}

/// Projects the employee's leave position for every tenant leave type
/// as of a reference date.
///
/// The projection is request-driven: it reads the employee's requests
/// and the accrual-to-date, so it answers "how much could be taken on
/// this date" rather than echoing a stored balance.
pub async fn leave_entitlement(
    state: &EngineState,
    employee_id: Uuid,
    as_of: NaiveDate,
) -> EngineResult<Vec<LeaveEntitlement>> {
    state
        .store()
        .read(|data| {
            let employee = data.employee(employee_id)?.clone();
            Ok(resolve_all_entitlements(data, &employee, as_of))
        })
        .await
}

/// Composes one employee's pay for a period without creating a run or
/// storing anything.
///
/// The preview is the same composition a draft build runs; its
/// `run_id` is nil and it considers assignments payable in the period
/// regardless of any existing run.
pub async fn payroll_preview(
    state: &EngineState,
    employee_id: Uuid,
    period: PayrollPeriod,
) -> EngineResult<PayrollItem> {
    state
        .store()
        .read(|data| {
            let employee = data.employee(employee_id)?.clone();
            compose_item(data, state.tables(), &employee, period, None)
        })
        .await
}

/// The employee's settlement as it stands.
///
/// A draft is recomputed from current inputs, so the preview always
/// shows what processing would freeze; a processed settlement is
/// returned exactly as stored.
pub async fn settlement_preview(
    state: &EngineState,
    employee_id: Uuid,
) -> EngineResult<Settlement> {
    state
        .store()
        .read(|data| {
            let existing = data.settlement(employee_id)?.clone();
            if !existing.is_draft() {
                return Ok(existing);
            }
            let employee = data.employee(employee_id)?.clone();
            let mut fresh = compose_settlement(
                data,
                state.tables(),
                &employee,
                existing.last_working_day,
                existing.notice_waived,
            )?;
            fresh.id = existing.id;
            Ok(fresh)
        })
        .await
}

/// The tenant's administrator review queue, oldest first.
pub async fn review_queue(
    state: &EngineState,
    tenant_id: Uuid,
) -> EngineResult<Vec<ReviewEntry>> {
    state
        .store()
        .read(|data| {
            data.tenant(tenant_id)?;
            Ok(data
                .review_queue
                .iter()
                .filter(|entry| entry.tenant_id == tenant_id)
                .cloned()
                .collect())
        })
        .await
}
