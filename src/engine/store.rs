//! The in-memory transactional store behind the engine facade.
//!
//! [`MemStore`] keeps every entity in ordered maps behind one
//! `tokio::sync::RwLock`. Each command runs inside a single write-lock
//! scope; a snapshot taken on entry is restored when the command's
//! closure errors, so a failed command leaves no partial writes behind.
//! Cross-row uniqueness (one day record per employee and date, one
//! holiday per tenant and date, one shift per employee and date) is
//! enforced on insert.
//!
//! Two advisory lock sets live outside the transactional data: the
//! per-tenant sweep lock, which keeps at most one auto-closure sweep
//! active per tenant, and the finalisation lock on a (tenant, period,
//! scope) tuple, which blocks day-record transitions while a payroll
//! run is being finalised. Both release on guard drop.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Mutex, PoisonError};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::engine::events::ReviewEntry;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    DayRecord, EarningAssignment, Employee, LeaveBalance, LeaveRequest, LeaveType, PayrollItem,
    PayrollPeriod, PayrollRun, PublicHoliday, RunScope, RunStatus, ScheduledShift, Settlement,
    Tenant,
};

/// The tuple a payroll finalisation takes an advisory lock on.
pub(crate) type FinaliseKey = (Uuid, PayrollPeriod, RunScope);

/// Every entity the engine persists, in ordered maps so sweeps and
/// listings walk rows deterministically.
#[derive(Debug, Clone, Default)]
pub(crate) struct StoreData {
    pub(crate) tenants: BTreeMap<Uuid, Tenant>,
    pub(crate) employees: BTreeMap<Uuid, Employee>,
    /// Keyed by (employee, date); at most one shift per day.
    pub(crate) shifts: BTreeMap<(Uuid, NaiveDate), ScheduledShift>,
    /// Keyed by (tenant, date); at most one holiday per day.
    pub(crate) holidays: BTreeMap<(Uuid, NaiveDate), PublicHoliday>,
    pub(crate) leave_types: BTreeMap<Uuid, LeaveType>,
    /// Keyed by (employee, leave type, year).
    pub(crate) leave_balances: BTreeMap<(Uuid, Uuid, i32), LeaveBalance>,
    pub(crate) leave_requests: BTreeMap<Uuid, LeaveRequest>,
    pub(crate) day_records: BTreeMap<Uuid, DayRecord>,
    /// (employee, work date) to record id; the unique-per-day constraint.
    pub(crate) day_index: BTreeMap<(Uuid, NaiveDate), Uuid>,
    pub(crate) assignments: BTreeMap<Uuid, EarningAssignment>,
    pub(crate) runs: BTreeMap<Uuid, PayrollRun>,
    pub(crate) items: BTreeMap<Uuid, PayrollItem>,
    /// Keyed by employee; one live settlement per exit.
    pub(crate) settlements: BTreeMap<Uuid, Settlement>,
    pub(crate) review_queue: Vec<ReviewEntry>,
}

impl StoreData {
    pub(crate) fn tenant(&self, id: Uuid) -> EngineResult<&Tenant> {
        self.tenants
            .get(&id)
            .ok_or(EngineError::NotFound { entity: "tenant", id })
    }

    pub(crate) fn employee(&self, id: Uuid) -> EngineResult<&Employee> {
        self.employees
            .get(&id)
            .ok_or(EngineError::NotFound { entity: "employee", id })
    }

    pub(crate) fn employee_mut(&mut self, id: Uuid) -> EngineResult<&mut Employee> {
        self.employees
            .get_mut(&id)
            .ok_or(EngineError::NotFound { entity: "employee", id })
    }

    pub(crate) fn day_record(&self, id: Uuid) -> EngineResult<&DayRecord> {
        self.day_records
            .get(&id)
            .ok_or(EngineError::NotFound { entity: "day record", id })
    }

    pub(crate) fn day_record_mut(&mut self, id: Uuid) -> EngineResult<&mut DayRecord> {
        self.day_records
            .get_mut(&id)
            .ok_or(EngineError::NotFound { entity: "day record", id })
    }

    pub(crate) fn run(&self, id: Uuid) -> EngineResult<&PayrollRun> {
        self.runs
            .get(&id)
            .ok_or(EngineError::NotFound { entity: "payroll run", id })
    }

    pub(crate) fn run_mut(&mut self, id: Uuid) -> EngineResult<&mut PayrollRun> {
        self.runs
            .get_mut(&id)
            .ok_or(EngineError::NotFound { entity: "payroll run", id })
    }

    pub(crate) fn leave_type(&self, id: Uuid) -> EngineResult<&LeaveType> {
        self.leave_types
            .get(&id)
            .ok_or(EngineError::NotFound { entity: "leave type", id })
    }

    pub(crate) fn leave_request(&self, id: Uuid) -> EngineResult<&LeaveRequest> {
        self.leave_requests
            .get(&id)
            .ok_or(EngineError::NotFound { entity: "leave request", id })
    }

    pub(crate) fn leave_request_mut(&mut self, id: Uuid) -> EngineResult<&mut LeaveRequest> {
        self.leave_requests
            .get_mut(&id)
            .ok_or(EngineError::NotFound { entity: "leave request", id })
    }

    pub(crate) fn assignment(&self, id: Uuid) -> EngineResult<&EarningAssignment> {
        self.assignments
            .get(&id)
            .ok_or(EngineError::NotFound { entity: "earning assignment", id })
    }

    pub(crate) fn settlement(&self, employee_id: Uuid) -> EngineResult<&Settlement> {
        self.settlements
            .get(&employee_id)
            .ok_or(EngineError::NotFound { entity: "settlement", id: employee_id })
    }

    /// Inserts a day record, enforcing one record per (employee, date).
    pub(crate) fn insert_day_record(&mut self, record: DayRecord) -> EngineResult<()> {
        let key = (record.employee_id, record.work_date);
        if self.day_index.contains_key(&key) {
            return Err(EngineError::UniqueViolation {
                constraint: "day_record(employee_id, work_date)".to_string(),
            });
        }
        self.day_index.insert(key, record.id);
        self.day_records.insert(record.id, record);
        Ok(())
    }

    /// Inserts a shift, enforcing one per (employee, date).
    pub(crate) fn insert_shift(&mut self, shift: ScheduledShift) -> EngineResult<()> {
        let key = (shift.employee_id, shift.date);
        if self.shifts.contains_key(&key) {
            return Err(EngineError::UniqueViolation {
                constraint: "scheduled_shift(employee_id, date)".to_string(),
            });
        }
        self.shifts.insert(key, shift);
        Ok(())
    }

    /// Inserts a holiday, enforcing one per (tenant, date).
    pub(crate) fn insert_holiday(&mut self, holiday: PublicHoliday) -> EngineResult<()> {
        let key = (holiday.tenant_id, holiday.date);
        if self.holidays.contains_key(&key) {
            return Err(EngineError::UniqueViolation {
                constraint: "public_holiday(tenant_id, date)".to_string(),
            });
        }
        self.holidays.insert(key, holiday);
        Ok(())
    }

    /// The balance row for (employee, type, year), opened on first use.
    pub(crate) fn balance_entry(
        &mut self,
        employee_id: Uuid,
        leave_type_id: Uuid,
        year: i32,
        entitled_days: Decimal,
    ) -> &mut LeaveBalance {
        self.leave_balances
            .entry((employee_id, leave_type_id, year))
            .or_insert_with(|| LeaveBalance::open(employee_id, leave_type_id, year, entitled_days))
    }

    /// The balance row for (employee, type, year), when one has been
    /// opened.
    pub(crate) fn balance_entry_probe(
        &self,
        employee_id: Uuid,
        leave_type_id: Uuid,
        year: i32,
    ) -> Option<&LeaveBalance> {
        self.leave_balances.get(&(employee_id, leave_type_id, year))
    }

    /// The employee's day records inside a payroll month, in date order.
    pub(crate) fn day_records_for(
        &self,
        employee_id: Uuid,
        period: PayrollPeriod,
    ) -> Vec<DayRecord> {
        let mut records: Vec<DayRecord> = self
            .day_records
            .values()
            .filter(|r| r.employee_id == employee_id && period.contains(r.work_date))
            .cloned()
            .collect();
        records.sort_by_key(|r| r.work_date);
        records
    }

    /// The tenant's holidays falling inside a payroll month.
    pub(crate) fn holidays_in(&self, tenant_id: Uuid, period: PayrollPeriod) -> Vec<PublicHoliday> {
        self.holidays
            .values()
            .filter(|h| h.tenant_id == tenant_id && period.contains(h.date))
            .cloned()
            .collect()
    }

    /// Every holiday date the tenant observes, across all years loaded.
    pub(crate) fn holiday_dates_for(&self, tenant_id: Uuid) -> Vec<NaiveDate> {
        self.holidays
            .values()
            .filter(|h| h.tenant_id == tenant_id)
            .map(|h| h.date)
            .collect()
    }

    /// All of the employee's leave requests, in insertion-id order.
    pub(crate) fn leave_requests_for(&self, employee_id: Uuid) -> Vec<LeaveRequest> {
        self.leave_requests
            .values()
            .filter(|r| r.employee_id == employee_id)
            .cloned()
            .collect()
    }

    /// The tenant's leave types, sorted by code.
    pub(crate) fn leave_types_for(&self, tenant_id: Uuid) -> Vec<LeaveType> {
        let mut types: Vec<LeaveType> = self
            .leave_types
            .values()
            .filter(|t| t.tenant_id == tenant_id)
            .cloned()
            .collect();
        types.sort_by(|a, b| a.code.cmp(&b.code));
        types
    }

    /// All of the employee's earning assignments.
    pub(crate) fn assignments_for(&self, employee_id: Uuid) -> Vec<EarningAssignment> {
        self.assignments
            .values()
            .filter(|a| a.employee_id == employee_id)
            .cloned()
            .collect()
    }

    /// The items swept into a run.
    pub(crate) fn items_for_run(&self, run_id: Uuid) -> Vec<PayrollItem> {
        self.items
            .values()
            .filter(|item| item.run_id == run_id)
            .cloned()
            .collect()
    }

    /// The finalised run that froze the employee's day on `date`, if any.
    /// A record is frozen once a non-draft run for its period and scope
    /// holds an item for the employee.
    pub(crate) fn finalised_run_covering(
        &self,
        employee_id: Uuid,
        grouping_id: Uuid,
        date: NaiveDate,
    ) -> Option<Uuid> {
        self.runs
            .values()
            .find(|run| {
                run.status != RunStatus::Draft
                    && run.period.contains(date)
                    && run.scope.includes(grouping_id)
                    && self
                        .items
                        .values()
                        .any(|item| item.run_id == run.id && item.employee_id == employee_id)
            })
            .map(|run| run.id)
    }
}

/// The shared store handle commands and queries run against.
#[derive(Debug, Default)]
pub struct MemStore {
    data: RwLock<StoreData>,
    sweep_locks: Mutex<HashSet<Uuid>>,
    finalise_locks: Mutex<HashMap<FinaliseKey, Uuid>>,
}

/// Advisory lock held while a tenant's auto-closure sweep runs.
/// Releases on drop.
pub(crate) struct SweepGuard<'a> {
    locks: &'a Mutex<HashSet<Uuid>>,
    tenant_id: Uuid,
}

impl Drop for SweepGuard<'_> {
    fn drop(&mut self) {
        self.locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.tenant_id);
    }
}

/// Advisory lock held while a run for (tenant, period, scope) is being
/// finalised. Releases on drop.
pub(crate) struct FinaliseGuard<'a> {
    locks: &'a Mutex<HashMap<FinaliseKey, Uuid>>,
    key: FinaliseKey,
}

impl Drop for FinaliseGuard<'_> {
    fn drop(&mut self) {
        self.locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.key);
    }
}

impl MemStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs a closure against the data under the write lock. When the
    /// closure errors, the snapshot taken on entry is restored, so the
    /// whole command commits or none of it does.
    pub(crate) async fn transaction<T>(
        &self,
        f: impl FnOnce(&mut StoreData) -> EngineResult<T>,
    ) -> EngineResult<T> {
        let mut data = self.data.write().await;
        let snapshot = data.clone();
        match f(&mut data) {
            Ok(value) => Ok(value),
            Err(error) => {
                *data = snapshot;
                Err(error)
            }
        }
    }

    /// Runs a read-only closure under the read lock.
    pub(crate) async fn read<T>(
        &self,
        f: impl FnOnce(&StoreData) -> EngineResult<T>,
    ) -> EngineResult<T> {
        let data = self.data.read().await;
        f(&data)
    }

    /// Takes the per-tenant sweep lock, or `None` when a sweep for the
    /// tenant is already active.
    pub(crate) fn try_lock_sweep(&self, tenant_id: Uuid) -> Option<SweepGuard<'_>> {
        let mut held = self
            .sweep_locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        held.insert(tenant_id).then(|| SweepGuard {
            locks: &self.sweep_locks,
            tenant_id,
        })
    }

    /// Takes the finalisation lock for a (tenant, period, scope) tuple,
    /// or `None` when one is already held.
    pub(crate) fn try_lock_finalise(
        &self,
        key: FinaliseKey,
        run_id: Uuid,
    ) -> Option<FinaliseGuard<'_>> {
        let mut held = self
            .finalise_locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if held.contains_key(&key) {
            return None;
        }
        held.insert(key, run_id);
        Some(FinaliseGuard {
            locks: &self.finalise_locks,
            key,
        })
    }

    /// The run currently finalising over the employee's day, if any
    /// in-flight finalisation covers its tenant, date and grouping.
    pub(crate) fn finalising_covers(
        &self,
        tenant_id: Uuid,
        grouping_id: Uuid,
        date: NaiveDate,
    ) -> Option<Uuid> {
        let held = self
            .finalise_locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        held.iter().find_map(|(key, run_id)| {
            let (tenant, period, scope) = key;
            (*tenant == tenant_id && period.contains(date) && scope.includes(grouping_id))
                .then_some(*run_id)
        })
    }

    /// Loads or replaces a tenant.
    pub async fn insert_tenant(&self, tenant: Tenant) {
        let mut data = self.data.write().await;
        data.tenants.insert(tenant.id, tenant);
    }

    /// Loads or replaces an employee.
    pub async fn insert_employee(&self, employee: Employee) {
        let mut data = self.data.write().await;
        data.employees.insert(employee.id, employee);
    }

    /// Loads or replaces a leave type.
    pub async fn insert_leave_type(&self, leave_type: LeaveType) {
        let mut data = self.data.write().await;
        data.leave_types.insert(leave_type.id, leave_type);
    }

    /// Loads or replaces a leave balance row.
    pub async fn insert_leave_balance(&self, balance: LeaveBalance) {
        let mut data = self.data.write().await;
        data.leave_balances.insert(
            (balance.employee_id, balance.leave_type_id, balance.year),
            balance,
        );
    }

    /// Loads or replaces an earning assignment.
    pub async fn insert_assignment(&self, assignment: EarningAssignment) {
        let mut data = self.data.write().await;
        data.assignments.insert(assignment.id, assignment);
    }

    /// Loads a scheduled shift. At most one shift may exist per
    /// (employee, date).
    pub async fn insert_scheduled_shift(&self, shift: ScheduledShift) -> EngineResult<()> {
        self.transaction(|data| data.insert_shift(shift)).await
    }

    /// Loads a public holiday. At most one may exist per (tenant, date).
    pub async fn insert_public_holiday(&self, holiday: PublicHoliday) -> EngineResult<()> {
        self.transaction(|data| data.insert_holiday(holiday)).await
    }
}
