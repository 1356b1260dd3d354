//! Engine commands: every mutating operation of the facade.
//!
//! Each command runs inside one store transaction, so it commits
//! entirely or rolls back to the snapshot taken on entry. Bulk commands
//! (the auto-closure sweep, payroll builds, period recalculation) run
//! one transaction per employee instead and check a [`CancelToken`]
//! between employees; employees committed before a cancellation stay
//! committed.
//!
//! Side effects that someone should hear about (auto-closed days,
//! records flagged for review, overtime awaiting a decision) come back
//! as [`EngineEvent`]s; review-worthy ones are also appended to the
//! store's review queue inside the same transaction.

use chrono::{Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use tracing::{info, warn};
use uuid::Uuid;

use crate::calculation::{
    self, ClockKind, DayContext, DayTotals, EarningsInput, LeaveEntitlement, SettlementInput,
    Slot, SlotClassification, SlotTimes,
};
use crate::config::StatutoryTables;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    AssignmentStatus, AttendanceStatus, ClockEntry, DayRecord, EarningAssignment, Employee,
    EmploymentStatus, LeaveRequest, LeaveRequestStatus, OtStatus, PayComponent, PayLine,
    PayrollItem, PayrollPeriod, PayrollRun, RecordStatus, Role, RunScope, RunStatus, Settlement,
    SettlementStatus, TenantPolicy,
};

use super::cancel::CancelToken;
use super::events::{EngineEvent, ReviewEntry, ReviewReason};
use super::state::EngineState;
use super::store::StoreData;

/// The result of recording one clock event.
#[derive(Debug, Clone)]
pub struct ClockOutcome {
    /// The day record after the event was applied.
    pub record: DayRecord,
    /// Side effects the caller should fan out.
    pub events: Vec<EngineEvent>,
}

/// The result of an auto-closure sweep.
#[derive(Debug, Clone)]
pub struct SweepOutcome {
    /// Open records inspected by the sweep.
    pub examined: u32,
    /// Records the sweep closed.
    pub closed: u32,
    /// Side effects, one `DayAutoClosed` and one `ReviewRequested` per
    /// closed record.
    pub events: Vec<EngineEvent>,
    /// `false` when the sweep stopped at a cancellation check.
    pub completed: bool,
}

/// The result of building or rebuilding a payroll run.
#[derive(Debug, Clone)]
pub struct BuildOutcome {
    /// The draft run the items belong to.
    pub run: PayrollRun,
    /// The composed items, one per swept employee.
    pub items: Vec<PayrollItem>,
    /// `false` when the build stopped at a cancellation check.
    pub completed: bool,
}

/// The result of recalculating a period's draft runs.
#[derive(Debug, Clone)]
pub struct RecalcOutcome {
    /// Draft runs that were recomputed.
    pub runs: u32,
    /// Items recomposed across those runs.
    pub items: u32,
    /// `false` when the recalculation stopped at a cancellation check.
    pub completed: bool,
}

/// Records one clock event against the employee's day.
///
/// The event fills the next positional slot; when the final clock-out
/// lands, the day's totals are derived and the record closes. A
/// clock-out numerically equal to the clock-in closes the day empty and
/// flags it for review.
///
/// # Errors
///
/// * [`EngineError::InvalidSlotOrder`] when the event does not fit the
///   day's filled slots.
/// * [`EngineError::DayAlreadyClosed`] when the record has left
///   IN_PROGRESS.
/// * [`EngineError::RunLocked`] when a finalised (or finalising) run
///   already covers the day.
pub async fn record_clock_event(
    state: &EngineState,
    employee_id: Uuid,
    work_date: NaiveDate,
    kind: ClockKind,
    entry: ClockEntry,
) -> EngineResult<ClockOutcome> {
    info!(
        employee_id = %employee_id,
        work_date = %work_date,
        kind = %kind,
        "recording clock event"
    );
    state
        .store()
        .transaction(|data| {
            let employee = data.employee(employee_id)?.clone();
            let policy = data.tenant(employee.tenant_id)?.policy.clone();
            guard_period_open(state, data, &employee, work_date)?;

            let existing_id = data.day_index.get(&(employee_id, work_date)).copied();
            let mut record = match existing_id {
                Some(id) => data.day_record(id)?.clone(),
                None => DayRecord::new(employee_id, employee.tenant_id, work_date),
            };
            if record.record_status.is_closed() {
                return Err(EngineError::DayAlreadyClosed {
                    employee_id,
                    work_date,
                    status: record.record_status.to_string(),
                });
            }

            let slot = calculation::assign_slot(&SlotTimes::from(&record), kind)?;
            match slot {
                Slot::In1 => record.clock_in_1 = Some(entry),
                Slot::Out1 => record.clock_out_1 = Some(entry),
                Slot::In2 => record.clock_in_2 = Some(entry),
                Slot::Out2 => record.clock_out_2 = Some(entry),
            }

            let mut events = Vec::new();
            match calculation::classify_slots(&SlotTimes::from(&record)) {
                SlotClassification::Pattern(pattern) if !pattern.is_open() => {
                    let shift = data.shifts.get(&(employee_id, work_date));
                    let scheduled_break = shift.map(|s| s.break_minutes).unwrap_or(0);
                    let ctx = day_context(data, &policy, &employee, work_date);
                    let totals = calculation::calculate_day_totals(
                        &pattern,
                        employee.work_type,
                        &policy,
                        scheduled_break,
                    );
                    let attendance = calculation::resolve_attendance(totals.work_minutes, &ctx);
                    calculation::complete_record(&mut record, &totals, attendance)?;
                    if record.ot_status == OtStatus::Pending {
                        events.push(EngineEvent::OvertimePending {
                            employee_id,
                            work_date,
                            ot_minutes: record.ot_minutes,
                        });
                    }
                }
                SlotClassification::Pattern(_) => {
                    // day still open; totals wait for the final clock-out
                    record.updated_at = Utc::now();
                }
                SlotClassification::CancelledSync { at } => {
                    calculation::complete_record(
                        &mut record,
                        &DayTotals::default(),
                        AttendanceStatus::Absent,
                    )?;
                    record.needs_review = true;
                    warn!(
                        employee_id = %employee_id,
                        work_date = %work_date,
                        at = %at,
                        "clock-out cancels the clock-in; day closed empty for review"
                    );
                    events.push(EngineEvent::ReviewRequested {
                        employee_id,
                        work_date,
                        reason: ReviewReason::CancelledSync,
                    });
                    data.review_queue.push(ReviewEntry::new(
                        employee.tenant_id,
                        employee_id,
                        work_date,
                        ReviewReason::CancelledSync,
                        format!("clock-in and clock-out at {at} cancel out"),
                    ));
                }
                SlotClassification::Empty | SlotClassification::Unrecognised => {
                    // positional assignment should not produce these, but
                    // classification is total; flag rather than guess
                    record.needs_review = true;
                    record.updated_at = Utc::now();
                    warn!(
                        employee_id = %employee_id,
                        work_date = %work_date,
                        "slot combination matches no pattern; flagged for review"
                    );
                    events.push(EngineEvent::ReviewRequested {
                        employee_id,
                        work_date,
                        reason: ReviewReason::UnrecognisedSlots,
                    });
                    data.review_queue.push(ReviewEntry::new(
                        employee.tenant_id,
                        employee_id,
                        work_date,
                        ReviewReason::UnrecognisedSlots,
                        "filled slots match no recognised pattern",
                    ));
                }
            }

            match existing_id {
                Some(id) => *data.day_record_mut(id)? = record.clone(),
                None => data.insert_day_record(record.clone())?,
            }
            Ok(ClockOutcome { record, events })
        })
        .await
}

/// Submits a leave request, reserving the days as pending.
///
/// # Errors
///
/// [`EngineError::LeaveInsufficient`] when the requested days exceed
/// the projected availability and the tenant does not allow advance
/// leave.
pub async fn submit_leave_request(
    state: &EngineState,
    employee_id: Uuid,
    leave_type_id: Uuid,
    start_date: NaiveDate,
    end_date: NaiveDate,
    days: Decimal,
    reason: Option<String>,
) -> EngineResult<LeaveRequest> {
    info!(
        employee_id = %employee_id,
        leave_type_id = %leave_type_id,
        start_date = %start_date,
        days = %days,
        "submitting leave request"
    );
    state
        .store()
        .transaction(|data| {
            let employee = data.employee(employee_id)?.clone();
            let policy = data.tenant(employee.tenant_id)?.policy.clone();
            let leave_type = data.leave_type(leave_type_id)?.clone();
            if leave_type.tenant_id != employee.tenant_id {
                return Err(EngineError::NotFound {
                    entity: "leave type",
                    id: leave_type_id,
                });
            }
            if end_date < start_date || days <= Decimal::ZERO {
                return Err(EngineError::CalculationError {
                    message: format!(
                        "invalid leave request: {days} days over {start_date}..{end_date}"
                    ),
                });
            }

            let balance = data
                .balance_entry_probe(employee_id, leave_type_id, start_date.year())
                .cloned();
            let requests = data.leave_requests_for(employee_id);
            let entitlement = calculation::resolve_entitlement(
                &employee,
                &leave_type,
                balance.as_ref(),
                &requests,
                start_date,
            );
            if days > entitlement.available && !policy.allow_advance_leave {
                return Err(EngineError::LeaveInsufficient {
                    leave_type: leave_type.code.clone(),
                    requested: days,
                    available: entitlement.available,
                });
            }

            let request = LeaveRequest {
                id: Uuid::new_v4(),
                employee_id,
                leave_type_id,
                start_date,
                end_date,
                days,
                status: LeaveRequestStatus::Pending,
                reason,
                updated_at: Utc::now(),
            };
            data.leave_requests.insert(request.id, request.clone());
            let balance = data.balance_entry(
                employee_id,
                leave_type_id,
                start_date.year(),
                leave_type.annual_entitlement_days,
            );
            balance.pending_days += days;
            Ok(request)
        })
        .await
}

/// Approves a pending leave request, converting its pending days to
/// used days.
///
/// Availability is re-checked at approval time: circumstances may have
/// changed since submission. With advance leave allowed the balance may
/// go negative instead.
pub async fn approve_leave(
    state: &EngineState,
    request_id: Uuid,
    approver: Role,
) -> EngineResult<LeaveRequest> {
    state
        .store()
        .transaction(|data| {
            if !approver.can_approve_day() {
                return Err(EngineError::PermissionDenied {
                    role: approver.to_string(),
                    action: "approve leave",
                });
            }
            let request = data.leave_request(request_id)?.clone();
            if request.status != LeaveRequestStatus::Pending {
                return Err(EngineError::InvalidTransition {
                    entity: "leave request",
                    state: request.status.to_string(),
                    action: "approve",
                });
            }
            let employee = data.employee(request.employee_id)?.clone();
            let policy = data.tenant(employee.tenant_id)?.policy.clone();
            let leave_type = data.leave_type(request.leave_type_id)?.clone();

            let balance = data
                .balance_entry_probe(
                    request.employee_id,
                    request.leave_type_id,
                    request.start_date.year(),
                )
                .cloned();
            let requests = data.leave_requests_for(request.employee_id);
            let entitlement = calculation::resolve_entitlement(
                &employee,
                &leave_type,
                balance.as_ref(),
                &requests,
                request.start_date,
            );
            // the request itself sits in pending; measure against the rest
            let available = entitlement.available + request.days;
            if request.days > available && !policy.allow_advance_leave {
                return Err(EngineError::LeaveInsufficient {
                    leave_type: leave_type.code.clone(),
                    requested: request.days,
                    available,
                });
            }

            let balance = data.balance_entry(
                request.employee_id,
                request.leave_type_id,
                request.start_date.year(),
                leave_type.annual_entitlement_days,
            );
            balance.pending_days -= request.days;
            balance.used_days += request.days;

            let stored = data.leave_request_mut(request_id)?;
            stored.status = LeaveRequestStatus::Approved;
            stored.updated_at = Utc::now();
            let approved = stored.clone();
            info!(
                employee_id = %request.employee_id,
                request_id = %request_id,
                days = %request.days,
                "leave request approved"
            );
            Ok(approved)
        })
        .await
}

/// Rejects a pending leave request, releasing its pending days.
pub async fn reject_leave(
    state: &EngineState,
    request_id: Uuid,
    approver: Role,
) -> EngineResult<LeaveRequest> {
    state
        .store()
        .transaction(|data| {
            if !approver.can_approve_day() {
                return Err(EngineError::PermissionDenied {
                    role: approver.to_string(),
                    action: "reject leave",
                });
            }
            let request = data.leave_request(request_id)?.clone();
            if request.status != LeaveRequestStatus::Pending {
                return Err(EngineError::InvalidTransition {
                    entity: "leave request",
                    state: request.status.to_string(),
                    action: "reject",
                });
            }
            let leave_type = data.leave_type(request.leave_type_id)?.clone();
            let balance = data.balance_entry(
                request.employee_id,
                request.leave_type_id,
                request.start_date.year(),
                leave_type.annual_entitlement_days,
            );
            balance.pending_days -= request.days;

            let stored = data.leave_request_mut(request_id)?;
            stored.status = LeaveRequestStatus::Rejected;
            stored.updated_at = Utc::now();
            Ok(stored.clone())
        })
        .await
}

/// Cancels a leave request and returns its days to the balance.
///
/// Pending requests cancel at any time; approved requests only while
/// they are still wholly in the future as of `as_of`.
pub async fn cancel_leave(
    state: &EngineState,
    request_id: Uuid,
    as_of: NaiveDate,
) -> EngineResult<LeaveRequest> {
    state
        .store()
        .transaction(|data| {
            let request = data.leave_request(request_id)?.clone();
            let leave_type = data.leave_type(request.leave_type_id)?.clone();
            match request.status {
                LeaveRequestStatus::Pending => {
                    let balance = data.balance_entry(
                        request.employee_id,
                        request.leave_type_id,
                        request.start_date.year(),
                        leave_type.annual_entitlement_days,
                    );
                    balance.pending_days -= request.days;
                }
                LeaveRequestStatus::Approved if request.start_date > as_of => {
                    let balance = data.balance_entry(
                        request.employee_id,
                        request.leave_type_id,
                        request.start_date.year(),
                        leave_type.annual_entitlement_days,
                    );
                    balance.used_days -= request.days;
                }
                status => {
                    return Err(EngineError::InvalidTransition {
                        entity: "leave request",
                        state: status.to_string(),
                        action: "cancel",
                    });
                }
            }
            let stored = data.leave_request_mut(request_id)?;
            stored.status = LeaveRequestStatus::Cancelled;
            stored.updated_at = Utc::now();
            Ok(stored.clone())
        })
        .await
}

/// Approves a closed day record.
///
/// # Errors
///
/// [`EngineError::RunLocked`] when a finalised run already covers the
/// day; the underlying transition errors otherwise.
pub async fn approve_day(
    state: &EngineState,
    record_id: Uuid,
    approver: Role,
) -> EngineResult<DayRecord> {
    state
        .store()
        .transaction(|data| {
            let record = data.day_record(record_id)?.clone();
            let employee = data.employee(record.employee_id)?.clone();
            guard_period_open(state, data, &employee, record.work_date)?;
            let stored = data.day_record_mut(record_id)?;
            calculation::approve_day(stored, approver)?;
            info!(
                employee_id = %employee.id,
                work_date = %record.work_date,
                "day record approved"
            );
            Ok(stored.clone())
        })
        .await
}

/// Rejects a closed day record with a reason. A rejected day
/// contributes nothing to payroll.
pub async fn reject_day(
    state: &EngineState,
    record_id: Uuid,
    approver: Role,
    reason: String,
) -> EngineResult<DayRecord> {
    state
        .store()
        .transaction(|data| {
            let record = data.day_record(record_id)?.clone();
            let employee = data.employee(record.employee_id)?.clone();
            guard_period_open(state, data, &employee, record.work_date)?;
            let stored = data.day_record_mut(record_id)?;
            calculation::reject_day(stored, approver, reason)?;
            warn!(
                employee_id = %employee.id,
                work_date = %record.work_date,
                "day record rejected"
            );
            Ok(stored.clone())
        })
        .await
}

/// Approves a day's pending overtime for payment.
pub async fn approve_ot(
    state: &EngineState,
    record_id: Uuid,
    approver: Role,
) -> EngineResult<DayRecord> {
    state
        .store()
        .transaction(|data| {
            let record = data.day_record(record_id)?.clone();
            let employee = data.employee(record.employee_id)?.clone();
            guard_period_open(state, data, &employee, record.work_date)?;
            let stored = data.day_record_mut(record_id)?;
            calculation::approve_ot(stored, approver)?;
            info!(
                employee_id = %employee.id,
                work_date = %record.work_date,
                ot_minutes = record.ot_minutes,
                "overtime approved"
            );
            Ok(stored.clone())
        })
        .await
}

/// Rejects a day's pending overtime. The minutes stay on record but are
/// never paid; the day itself is unaffected.
pub async fn reject_ot(
    state: &EngineState,
    record_id: Uuid,
    approver: Role,
) -> EngineResult<DayRecord> {
    state
        .store()
        .transaction(|data| {
            let record = data.day_record(record_id)?.clone();
            let employee = data.employee(record.employee_id)?.clone();
            guard_period_open(state, data, &employee, record.work_date)?;
            let stored = data.day_record_mut(record_id)?;
            calculation::reject_ot(stored, approver)?;
            warn!(
                employee_id = %employee.id,
                work_date = %record.work_date,
                ot_minutes = record.ot_minutes,
                "overtime rejected"
            );
            Ok(stored.clone())
        })
        .await
}

/// Sweeps the tenant's abandoned day records, closing every record
/// still IN_PROGRESS with a work date before `as_of`.
///
/// Holds the per-tenant advisory sweep lock for the duration; a second
/// concurrent sweep for the same tenant is refused. Each employee
/// commits in their own transaction, so a cancellation between
/// employees loses nothing already closed. Rerunning the sweep is a
/// no-op for records it has already closed.
pub async fn run_auto_closure(
    state: &EngineState,
    tenant_id: Uuid,
    as_of: NaiveDate,
    cancel: &CancelToken,
) -> EngineResult<SweepOutcome> {
    let Some(_guard) = state.store().try_lock_sweep(tenant_id) else {
        return Err(EngineError::InvalidTransition {
            entity: "auto-closure sweep",
            state: "RUNNING".to_string(),
            action: "start",
        });
    };
    info!(tenant_id = %tenant_id, as_of = %as_of, "auto-closure sweep started");

    let (policy, employee_ids) = state
        .store()
        .read(|data| {
            let policy = data.tenant(tenant_id)?.policy.clone();
            let ids: Vec<Uuid> = data
                .employees
                .values()
                .filter(|e| e.tenant_id == tenant_id)
                .map(|e| e.id)
                .collect();
            Ok((policy, ids))
        })
        .await?;

    let mut outcome = SweepOutcome {
        examined: 0,
        closed: 0,
        events: Vec::new(),
        completed: true,
    };
    for employee_id in employee_ids {
        if cancel.is_cancelled() {
            warn!(
                tenant_id = %tenant_id,
                "auto-closure sweep cancelled; committed employees stay closed"
            );
            outcome.completed = false;
            break;
        }
        let (examined, events) = state
            .store()
            .transaction(|data| {
                let employee = data.employee(employee_id)?.clone();
                let open: Vec<Uuid> = data
                    .day_records
                    .values()
                    .filter(|r| {
                        r.employee_id == employee_id
                            && r.record_status == RecordStatus::InProgress
                            && r.work_date < as_of
                    })
                    .map(|r| r.id)
                    .collect();

                let mut examined = 0u32;
                let mut events = Vec::new();
                for id in open {
                    let mut record = data.day_record(id)?.clone();
                    if data
                        .finalised_run_covering(employee_id, employee.grouping_id, record.work_date)
                        .is_some()
                    {
                        // frozen period; leave the record for the administrator
                        continue;
                    }
                    examined += 1;
                    let shift = data.shifts.get(&(employee_id, record.work_date)).cloned();
                    let ctx = day_context(data, &policy, &employee, record.work_date);
                    if calculation::close_abandoned_record(
                        &mut record,
                        shift.as_ref(),
                        employee.work_type,
                        &policy,
                        &ctx,
                    ) {
                        events.push(EngineEvent::DayAutoClosed {
                            employee_id,
                            work_date: record.work_date,
                            work_minutes: record.total_work_minutes,
                        });
                        events.push(EngineEvent::ReviewRequested {
                            employee_id,
                            work_date: record.work_date,
                            reason: ReviewReason::AutoClosed,
                        });
                        data.review_queue.push(ReviewEntry::new(
                            employee.tenant_id,
                            employee_id,
                            record.work_date,
                            ReviewReason::AutoClosed,
                            format!(
                                "closed by the {as_of} sweep with {} work minutes",
                                record.total_work_minutes
                            ),
                        ));
                        *data.day_record_mut(id)? = record;
                    }
                }
                Ok((examined, events))
            })
            .await?;

        outcome.examined += examined;
        outcome.closed += events
            .iter()
            .filter(|e| matches!(e, EngineEvent::DayAutoClosed { .. }))
            .count() as u32;
        outcome.events.extend(events);
    }
    info!(
        tenant_id = %tenant_id,
        examined = outcome.examined,
        closed = outcome.closed,
        completed = outcome.completed,
        "auto-closure sweep finished"
    );
    Ok(outcome)
}

/// Builds (or rebuilds) the draft payroll run for a tenant, period and
/// scope, composing one item per in-scope employee.
///
/// Reuses the existing draft for the tuple when one exists; a finalised
/// run for the tuple refuses the build. Each employee commits in their
/// own transaction.
pub async fn build_payroll_run(
    state: &EngineState,
    tenant_id: Uuid,
    period: PayrollPeriod,
    scope: RunScope,
    cancel: &CancelToken,
) -> EngineResult<BuildOutcome> {
    info!(tenant_id = %tenant_id, period = %period, "building payroll run");
    let run = state
        .store()
        .transaction(|data| {
            data.tenant(tenant_id)?;
            if let Some(existing) = data
                .runs
                .values()
                .find(|r| r.tenant_id == tenant_id && r.period == period && r.scope == scope)
            {
                if existing.status != RunStatus::Draft {
                    return Err(EngineError::RunLocked {
                        run_id: existing.id,
                    });
                }
                return Ok(existing.clone());
            }
            let run = PayrollRun {
                id: Uuid::new_v4(),
                tenant_id,
                period,
                scope,
                status: RunStatus::Draft,
                created_at: Utc::now(),
                finalised_at: None,
            };
            data.runs.insert(run.id, run.clone());
            Ok(run)
        })
        .await?;

    let (items_composed, completed) = sweep_items(state, &run, cancel).await?;
    let items = state
        .store()
        .read(|data| Ok(data.items_for_run(run.id)))
        .await?;
    info!(
        run_id = %run.id,
        items = items_composed,
        completed = completed,
        "payroll run built"
    );
    Ok(BuildOutcome {
        run,
        items,
        completed,
    })
}

/// Finalises a draft run, freezing its items and the attendance they
/// were composed from.
///
/// Takes the advisory finalisation lock on (tenant, period, scope) for
/// the duration, marks the swept earning assignments INCLUDED, and
/// moves the run to FINALISED. Afterwards every mutation touching the
/// covered days answers `RunLocked`.
pub async fn finalise_run(state: &EngineState, run_id: Uuid) -> EngineResult<PayrollRun> {
    let run = state
        .store()
        .read(|data| Ok(data.run(run_id)?.clone()))
        .await?;
    let key = (run.tenant_id, run.period, run.scope);
    let Some(_guard) = state.store().try_lock_finalise(key, run_id) else {
        return Err(EngineError::RunLocked { run_id });
    };

    let finalised = state
        .store()
        .transaction(|data| {
            let current = data.run(run_id)?.clone();
            if current.status != RunStatus::Draft {
                return Err(EngineError::InvalidTransition {
                    entity: "payroll run",
                    state: current.status.to_string(),
                    action: "finalise",
                });
            }
            // sweep the assignments the items were composed from
            let swept: Vec<Uuid> = data
                .items_for_run(run_id)
                .iter()
                .map(|item| item.employee_id)
                .collect();
            let assignment_ids: Vec<Uuid> = data
                .assignments
                .values()
                .filter(|a| {
                    swept.contains(&a.employee_id)
                        && a.status == AssignmentStatus::Approved
                        && a.period() == current.period
                })
                .map(|a| a.id)
                .collect();
            for id in assignment_ids {
                if let Some(assignment) = data.assignments.get_mut(&id) {
                    assignment.status = AssignmentStatus::Included;
                    assignment.included_in_run = Some(run_id);
                    assignment.updated_at = Utc::now();
                }
            }
            let run = data.run_mut(run_id)?;
            run.status = RunStatus::Finalised;
            run.finalised_at = Some(Utc::now());
            Ok(run.clone())
        })
        .await?;
    info!(run_id = %run_id, period = %finalised.period, "payroll run finalised");
    Ok(finalised)
}

/// Deletes a draft run and its items. Finalised and paid runs refuse
/// with [`EngineError::RunLocked`].
pub async fn delete_draft_run(state: &EngineState, run_id: Uuid) -> EngineResult<()> {
    state
        .store()
        .transaction(|data| {
            let run = data.run(run_id)?;
            if run.status != RunStatus::Draft {
                return Err(EngineError::RunLocked { run_id });
            }
            data.items.retain(|_, item| item.run_id != run_id);
            data.runs.remove(&run_id);
            Ok(())
        })
        .await?;
    info!(run_id = %run_id, "draft payroll run deleted");
    Ok(())
}

/// Moves an earning assignment to another payroll month.
///
/// Claims missing one month's cutoff carry forward whole; an amount is
/// never split across months. Assignments already swept into a
/// finalised run refuse with [`EngineError::RunLocked`].
pub async fn reassign_claim_month(
    state: &EngineState,
    assignment_id: Uuid,
    to_period: PayrollPeriod,
) -> EngineResult<EarningAssignment> {
    state
        .store()
        .transaction(|data| {
            if to_period.bounds().is_none() {
                return Err(EngineError::CalculationError {
                    message: format!("invalid payroll period {to_period}"),
                });
            }
            let assignment = data.assignment(assignment_id)?.clone();
            match assignment.status {
                AssignmentStatus::Pending | AssignmentStatus::Approved => {}
                AssignmentStatus::Included => {
                    return Err(match assignment.included_in_run {
                        Some(run_id) => EngineError::RunLocked { run_id },
                        None => EngineError::InvalidTransition {
                            entity: "earning assignment",
                            state: assignment.status.to_string(),
                            action: "reassign",
                        },
                    });
                }
                AssignmentStatus::Rejected => {
                    return Err(EngineError::InvalidTransition {
                        entity: "earning assignment",
                        state: assignment.status.to_string(),
                        action: "reassign",
                    });
                }
            }
            let stored = data
                .assignments
                .get_mut(&assignment_id)
                .ok_or(EngineError::NotFound {
                    entity: "earning assignment",
                    id: assignment_id,
                })?;
            stored.payroll_month = to_period.month;
            stored.payroll_year = to_period.year;
            stored.updated_at = Utc::now();
            info!(
                assignment_id = %assignment_id,
                period = %to_period,
                "earning assignment reassigned"
            );
            Ok(stored.clone())
        })
        .await
}

/// Recomputes every draft run of the tenant's period from current
/// attendance, approvals and assignments. Finalised runs are untouched,
/// so recalculation is always safe to rerun.
pub async fn recalculate_period(
    state: &EngineState,
    tenant_id: Uuid,
    period: PayrollPeriod,
    cancel: &CancelToken,
) -> EngineResult<RecalcOutcome> {
    info!(tenant_id = %tenant_id, period = %period, "recalculating period");
    let draft_runs: Vec<PayrollRun> = state
        .store()
        .read(|data| {
            data.tenant(tenant_id)?;
            Ok(data
                .runs
                .values()
                .filter(|r| {
                    r.tenant_id == tenant_id && r.period == period && r.status == RunStatus::Draft
                })
                .cloned()
                .collect())
        })
        .await?;

    let mut outcome = RecalcOutcome {
        runs: 0,
        items: 0,
        completed: true,
    };
    for run in draft_runs {
        let (items, completed) = sweep_items(state, &run, cancel).await?;
        outcome.items += items;
        outcome.runs += 1;
        if !completed {
            outcome.completed = false;
            break;
        }
    }
    Ok(outcome)
}

/// Builds (or rebuilds) the draft exit settlement for an employee.
///
/// Sets the employee's last working day, moves them to RESIGNING, and
/// composes the draft from current leave, claims and policy. The
/// waiver flag survives rebuilds. A processed settlement refuses.
pub async fn build_settlement(
    state: &EngineState,
    employee_id: Uuid,
    last_working_day: NaiveDate,
) -> EngineResult<Settlement> {
    info!(
        employee_id = %employee_id,
        last_working_day = %last_working_day,
        "building exit settlement"
    );
    state
        .store()
        .transaction(|data| {
            if let Some(existing) = data.settlements.get(&employee_id) {
                if existing.status == SettlementStatus::Processed {
                    return Err(EngineError::InvalidTransition {
                        entity: "settlement",
                        state: existing.status.to_string(),
                        action: "rebuild",
                    });
                }
            }
            let waived = data
                .settlements
                .get(&employee_id)
                .map(|s| s.notice_waived)
                .unwrap_or(false);

            let stored = data.employee_mut(employee_id)?;
            if stored.employment_status == EmploymentStatus::Exited {
                return Err(EngineError::InvalidTransition {
                    entity: "employee",
                    state: stored.employment_status.to_string(),
                    action: "build settlement for",
                });
            }
            stored.last_working_day = Some(last_working_day);
            stored.employment_status = EmploymentStatus::Resigning;
            let employee = stored.clone();

            let draft =
                compose_settlement(data, state.tables(), &employee, last_working_day, waived)?;
            data.settlements.insert(employee_id, draft.clone());
            Ok(draft)
        })
        .await
}

/// Toggles the notice waiver on a draft settlement and recomputes it in
/// the same transaction, so the draft never shows a buyout the waiver
/// no longer implies.
pub async fn set_notice_waived(
    state: &EngineState,
    employee_id: Uuid,
    waived: bool,
) -> EngineResult<Settlement> {
    state
        .store()
        .transaction(|data| {
            let existing = data.settlement(employee_id)?.clone();
            if !existing.is_draft() {
                return Err(EngineError::InvalidTransition {
                    entity: "settlement",
                    state: existing.status.to_string(),
                    action: "waive notice on",
                });
            }
            let employee = data.employee(employee_id)?.clone();
            let mut draft = compose_settlement(
                data,
                state.tables(),
                &employee,
                existing.last_working_day,
                waived,
            )?;
            draft.id = existing.id;
            data.settlements.insert(employee_id, draft.clone());
            info!(
                employee_id = %employee_id,
                waived = waived,
                "notice waiver updated; settlement recomputed"
            );
            Ok(draft)
        })
        .await
}

/// Processes a draft settlement: freezes it and exits the employee.
///
/// The draft is recomputed from current inputs first; a drift in any
/// monetary figure means the draft is stale and processing refuses, so
/// what is paid is always what was last shown.
pub async fn process_settlement(
    state: &EngineState,
    employee_id: Uuid,
) -> EngineResult<Settlement> {
    state
        .store()
        .transaction(|data| {
            let existing = data.settlement(employee_id)?.clone();
            if !existing.is_draft() {
                return Err(EngineError::InvalidTransition {
                    entity: "settlement",
                    state: existing.status.to_string(),
                    action: "process",
                });
            }
            let employee = data.employee(employee_id)?.clone();
            let fresh = compose_settlement(
                data,
                state.tables(),
                &employee,
                existing.last_working_day,
                existing.notice_waived,
            )?;
            if fresh.gross != existing.gross
                || fresh.net != existing.net
                || fresh.notice_buyout != existing.notice_buyout
                || fresh.advance_leave_recovery != existing.advance_leave_recovery
            {
                return Err(EngineError::NoticePolicyViolation {
                    message: format!(
                        "settlement draft for employee {employee_id} is stale; rebuild before processing"
                    ),
                });
            }

            let mut processed = existing;
            processed.status = SettlementStatus::Processed;
            processed.updated_at = Utc::now();
            data.settlements.insert(employee_id, processed.clone());
            data.employee_mut(employee_id)?.employment_status = EmploymentStatus::Exited;
            info!(
                employee_id = %employee_id,
                net = %processed.net,
                "settlement processed; employee exited"
            );
            Ok(processed)
        })
        .await
}

/// Refuses when a finalised run, or one mid-finalisation, covers the
/// employee's day.
fn guard_period_open(
    state: &EngineState,
    data: &StoreData,
    employee: &Employee,
    date: NaiveDate,
) -> EngineResult<()> {
    if let Some(run_id) = data.finalised_run_covering(employee.id, employee.grouping_id, date) {
        return Err(EngineError::RunLocked { run_id });
    }
    if let Some(run_id) =
        state
            .store()
            .finalising_covers(employee.tenant_id, employee.grouping_id, date)
    {
        return Err(EngineError::RunLocked { run_id });
    }
    Ok(())
}

/// Calendar facts for one employee-day, read from the store.
fn day_context(
    data: &StoreData,
    policy: &TenantPolicy,
    employee: &Employee,
    date: NaiveDate,
) -> DayContext {
    let is_public_holiday = data.holidays.contains_key(&(employee.tenant_id, date));
    let on_approved_leave = data.leave_requests.values().any(|r| {
        r.employee_id == employee.id && r.status == LeaveRequestStatus::Approved && r.covers(date)
    });
    let is_rest_day = date.weekday() == policy.weekly_rest_day
        || data
            .shifts
            .get(&(employee.id, date))
            .is_some_and(|s| s.is_off);
    DayContext {
        is_public_holiday,
        on_approved_leave,
        is_rest_day,
    }
}

/// Composes and stores the run's item for one employee, one transaction
/// per call. Returns `false` when the employee's employment does not
/// overlap the period and no item was written.
fn compose_and_store_item(
    data: &mut StoreData,
    tables: &StatutoryTables,
    run_id: Uuid,
    employee_id: Uuid,
    period: PayrollPeriod,
) -> EngineResult<bool> {
    let employee = data.employee(employee_id)?.clone();
    let (first, last) = period.bounds().ok_or_else(|| EngineError::CalculationError {
        message: format!("invalid payroll period {period}"),
    })?;
    if employee.hire_date > last || employee.last_working_day.is_some_and(|lwd| lwd < first) {
        return Ok(false);
    }
    let item = compose_item(data, tables, &employee, period, Some(run_id))?;
    // one item per (run, employee); rebuilds replace the previous one
    data.items
        .retain(|_, existing| !(existing.run_id == run_id && existing.employee_id == employee_id));
    data.items.insert(item.id, item);
    Ok(true)
}

/// Composes an employee's pay for one period without writing anything.
pub(crate) fn compose_item(
    data: &StoreData,
    tables: &StatutoryTables,
    employee: &Employee,
    period: PayrollPeriod,
    run_id: Option<Uuid>,
) -> EngineResult<PayrollItem> {
    let policy = data.tenant(employee.tenant_id)?.policy.clone();
    let (first, last) = period.bounds().ok_or_else(|| EngineError::CalculationError {
        message: format!("invalid payroll period {period}"),
    })?;
    let records = data.day_records_for(employee.id, period);
    let assignments = data.assignments_for(employee.id);
    let holidays = data.holidays_in(employee.tenant_id, period);
    let holiday_dates: Vec<NaiveDate> = holidays.iter().map(|h| h.date).collect();
    let (paid_leave_days, unpaid_leave_days) = leave_day_counts(
        data,
        employee,
        first,
        last,
        &policy,
        &holiday_dates,
    );

    let input = EarningsInput {
        employee,
        period,
        policy: &policy,
        records: &records,
        assignments: &assignments,
        holidays: &holidays,
        paid_leave_days,
        unpaid_leave_days,
        run_id,
    };
    let gross = calculation::compose_monthly(&input);
    let year_tables = tables.for_year(period.year)?;
    let statutory = calculation::statutory_breakdown(year_tables, employee, last, &gross.bases);

    let mut deductions = gross.deductions;
    for (component, description, amount) in [
        (PayComponent::EpfEmployee, "EPF (employee)", statutory.epf_employee),
        (
            PayComponent::SocsoEmployee,
            "SOCSO (employee)",
            statutory.socso_employee,
        ),
        (PayComponent::EisEmployee, "EIS (employee)", statutory.eis_employee),
        (PayComponent::Pcb, "PCB", statutory.pcb),
    ] {
        if amount > Decimal::ZERO {
            deductions.push(PayLine::flat(component, description, amount));
        }
    }
    let total_deductions: Decimal = deductions.iter().map(|line| line.amount).sum();

    Ok(PayrollItem {
        id: Uuid::new_v4(),
        run_id: run_id.unwrap_or_else(Uuid::nil),
        employee_id: employee.id,
        earnings: gross.earnings,
        deductions,
        gross: gross.gross,
        statutory_base: gross.bases.contribution,
        statutory,
        net: gross.gross - total_deductions,
    })
}

/// Counts approved leave days on working days of the employee's
/// employed stretch of the month, split into paid and unpaid.
fn leave_day_counts(
    data: &StoreData,
    employee: &Employee,
    first: NaiveDate,
    last: NaiveDate,
    policy: &TenantPolicy,
    holiday_dates: &[NaiveDate],
) -> (u32, u32) {
    let from = employee.hire_date.max(first);
    let to = employee
        .last_working_day
        .map(|lwd| lwd.min(last))
        .unwrap_or(last);
    if from > to {
        return (0, 0);
    }
    let requests = data.leave_requests_for(employee.id);
    let mut paid = 0u32;
    let mut unpaid = 0u32;
    let mut date = from;
    while date <= to {
        if calculation::is_working_day(date, policy.weekly_rest_day, holiday_dates) {
            let covering = requests
                .iter()
                .find(|r| r.status == LeaveRequestStatus::Approved && r.covers(date));
            if let Some(request) = covering {
                let is_paid = data
                    .leave_types
                    .get(&request.leave_type_id)
                    .map(|t| t.is_paid)
                    .unwrap_or(false);
                if is_paid {
                    paid += 1;
                } else {
                    unpaid += 1;
                }
            }
        }
        let Some(next) = date.succ_opt() else { break };
        date = next;
    }
    (paid, unpaid)
}

/// Resolves the employee's entitlement for every tenant leave type.
pub(crate) fn resolve_all_entitlements(
    data: &StoreData,
    employee: &Employee,
    as_of: NaiveDate,
) -> Vec<LeaveEntitlement> {
    let requests = data.leave_requests_for(employee.id);
    data.leave_types_for(employee.tenant_id)
        .iter()
        .map(|leave_type| {
            let balance = data.balance_entry_probe(employee.id, leave_type.id, as_of.year());
            calculation::resolve_entitlement(employee, leave_type, balance, &requests, as_of)
        })
        .collect()
}

/// Composes an employee's settlement from current store state without
/// writing anything.
pub(crate) fn compose_settlement(
    data: &StoreData,
    tables: &StatutoryTables,
    employee: &Employee,
    last_working_day: NaiveDate,
    notice_waived: bool,
) -> EngineResult<Settlement> {
    let policy = data.tenant(employee.tenant_id)?.policy.clone();
    if policy.prorate_bonus_on_exit && policy.annual_bonus.is_none() {
        // bonus proration needs the amount configured
        return Err(EngineError::PolicyMissing {
            setting: "annual_bonus".to_string(),
        });
    }
    let year_tables = tables.for_year(last_working_day.year())?;
    let period = PayrollPeriod::from_date(last_working_day);
    let holidays = data.holidays_in(employee.tenant_id, period);
    let leave = resolve_all_entitlements(data, employee, last_working_day);
    let claims = data.assignments_for(employee.id);
    let input = SettlementInput {
        employee,
        policy: &policy,
        tables: year_tables,
        last_working_day,
        notice_date: employee.notice_date,
        notice_waived,
        holidays: &holidays,
        leave: &leave,
        claims: &claims,
    };
    Ok(calculation::build_settlement(&input))
}

/// Recomposes the items of one run, one transaction per employee,
/// checking the token between employees. Returns the composed item
/// count and whether the sweep ran to the end.
async fn sweep_items(
    state: &EngineState,
    run: &PayrollRun,
    cancel: &CancelToken,
) -> EngineResult<(u32, bool)> {
    let employee_ids: Vec<Uuid> = state
        .store()
        .read(|data| {
            Ok(data
                .employees
                .values()
                .filter(|e| e.tenant_id == run.tenant_id && run.scope.includes(e.grouping_id))
                .map(|e| e.id)
                .collect())
        })
        .await?;

    let mut items = 0u32;
    for employee_id in employee_ids {
        if cancel.is_cancelled() {
            warn!(
                run_id = %run.id,
                "payroll sweep cancelled; composed items stay committed"
            );
            return Ok((items, false));
        }
        let run_id = run.id;
        let period = run.period;
        let composed = state
            .store()
            .transaction(|data| {
                compose_and_store_item(data, state.tables(), run_id, employee_id, period)
            })
            .await?;
        if composed {
            items += 1;
        }
    }
    Ok((items, true))
}
