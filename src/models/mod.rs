//! Core data models for the attendance and payroll engine.
//!
//! This module contains all the domain models used throughout the engine.

mod day_record;
mod earnings;
mod employee;
mod leave;
mod payroll;
mod schedule;
mod settlement;
mod tenant;

pub use day_record::{
    AttendanceStatus, ClockEntry, DayRecord, GeoPoint, OtStatus, RecordStatus,
};
pub use earnings::{AssignmentStatus, EarningAssignment, EarningKind};
pub use employee::{
    completed_months, Employee, EmploymentStatus, PcbTreatment, Role, WorkType,
    ORDINARY_RATE_DAYS, ORDINARY_RATE_HOURS,
};
pub use leave::{CarryForwardPolicy, LeaveBalance, LeaveRequest, LeaveRequestStatus, LeaveType};
pub use payroll::{
    PayComponent, PayLine, PayrollItem, PayrollPeriod, PayrollRun, RunScope, RunStatus,
    StatutoryBreakdown,
};
pub use schedule::{PublicHoliday, ScheduledShift, ShiftTemplate};
pub use settlement::{Settlement, SettlementStatus};
pub use tenant::{
    GroupingType, RoundingDirection, RoundingMethod, RoundingPolicy, StatutoryBaseFlags, Tenant,
    TenantPolicy, OT_MULTIPLIER_NORMAL, OT_MULTIPLIER_PUBLIC_HOLIDAY, OT_MULTIPLIER_REST_DAY,
    PUBLIC_HOLIDAY_PAY_MULTIPLIER,
};
