//! Employee model and related types.
//!
//! This module defines the Employee struct together with the work-type,
//! employment-status and approval-role enums used across attendance and
//! payroll processing.

use chrono::{Datelike, NaiveDate};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Divisor for the ordinary daily rate: working days per month (26).
pub const ORDINARY_RATE_DAYS: Decimal = Decimal::from_parts(26, 0, 0, false, 0);

/// Divisor for the ordinary hourly rate: paid hours per day (8).
pub const ORDINARY_RATE_HOURS: Decimal = Decimal::from_parts(8, 0, 0, false, 0);

/// Represents the type of employment arrangement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkType {
    /// Full-time employment paid a monthly basic salary.
    FullTime,
    /// Part-time employment paid strictly by hours worked.
    PartTime,
}

/// Lifecycle status of an employment relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmploymentStatus {
    /// Still within the probation period.
    Probation,
    /// Confirmed permanent staff.
    Confirmed,
    /// Notice given, still serving.
    Resigning,
    /// Employment has ended.
    Exited,
}

impl fmt::Display for EmploymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EmploymentStatus::Probation => "PROBATION",
            EmploymentStatus::Confirmed => "CONFIRMED",
            EmploymentStatus::Resigning => "RESIGNING",
            EmploymentStatus::Exited => "EXITED",
        };
        write!(f, "{s}")
    }
}

/// Approval role held by an employee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Regular staff, no approval rights.
    Staff,
    /// Can approve attendance day records and overtime.
    Supervisor,
    /// Supervisor rights plus run management.
    Manager,
    /// Full approval rights.
    Director,
}

impl Role {
    /// Whether this role may approve or reject day records.
    pub fn can_approve_day(&self) -> bool {
        *self >= Role::Supervisor
    }

    /// Whether this role may approve or reject overtime. Overtime approval
    /// is a permission distinct from day approval even though the same
    /// roles currently hold both.
    pub fn can_approve_overtime(&self) -> bool {
        *self >= Role::Supervisor
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Role::Staff => "STAFF",
            Role::Supervisor => "SUPERVISOR",
            Role::Manager => "MANAGER",
            Role::Director => "DIRECTOR",
        };
        write!(f, "{s}")
    }
}

/// How an employee's variable earnings are treated in the monthly tax
/// deduction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PcbTreatment {
    /// Variable earnings are annualised together with basic pay.
    Normal,
    /// Variable earnings are taxed as a current-month addition only.
    Additional,
    /// The employee is outside the monthly tax deduction scheme.
    Excluded,
}

/// Represents an employee subject to attendance and payroll processing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    /// Unique identifier for the employee.
    pub id: Uuid,
    /// The tenant the employee belongs to.
    pub tenant_id: Uuid,
    /// The outlet or department the employee is assigned to.
    pub grouping_id: Uuid,
    /// The employee's full name.
    pub full_name: String,
    /// Monthly basic salary in ringgit.
    pub basic_salary: Decimal,
    /// Full-time or part-time.
    pub work_type: WorkType,
    /// Current employment lifecycle status.
    pub employment_status: EmploymentStatus,
    /// Approval role.
    pub role: Role,
    /// The date employment started.
    pub hire_date: NaiveDate,
    /// The employee's date of birth.
    pub date_of_birth: NaiveDate,
    /// Whether the employee is a foreign worker for contribution purposes.
    #[serde(default)]
    pub is_foreign_worker: bool,
    /// Optional override for the hourly rate.
    pub hourly_rate_override: Option<Decimal>,
    /// Monthly tax treatment for variable earnings.
    pub pcb_treatment: PcbTreatment,
    /// Whether a non-working spouse relief applies.
    #[serde(default)]
    pub has_non_working_spouse: bool,
    /// Number of qualifying children for tax relief.
    #[serde(default)]
    pub child_count: u32,
    /// The date resignation notice was served, when resigning.
    pub notice_date: Option<NaiveDate>,
    /// The agreed last working day, when resigning or exited.
    pub last_working_day: Option<NaiveDate>,
}

impl Employee {
    /// Returns true if the employee is part-time.
    pub fn is_part_time(&self) -> bool {
        self.work_type == WorkType::PartTime
    }

    /// Returns the ordinary hourly rate: the override when set, otherwise
    /// basic salary divided by 26 working days and 8 hours, rounded
    /// half-up to 2 decimal places.
    ///
    /// # Examples
    ///
    /// ```
    /// use gaji_engine::models::{Employee, EmploymentStatus, PcbTreatment, Role, WorkType};
    /// use chrono::NaiveDate;
    /// use rust_decimal::Decimal;
    /// use uuid::Uuid;
    ///
    /// let employee = Employee {
    ///     id: Uuid::from_u128(1),
    ///     tenant_id: Uuid::from_u128(2),
    ///     grouping_id: Uuid::from_u128(3),
    ///     full_name: "Aina Binti Rahman".to_string(),
    ///     basic_salary: Decimal::new(2_600, 0),
    ///     work_type: WorkType::FullTime,
    ///     employment_status: EmploymentStatus::Confirmed,
    ///     role: Role::Staff,
    ///     hire_date: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
    ///     date_of_birth: NaiveDate::from_ymd_opt(1996, 7, 12).unwrap(),
    ///     is_foreign_worker: false,
    ///     hourly_rate_override: None,
    ///     pcb_treatment: PcbTreatment::Normal,
    ///     has_non_working_spouse: false,
    ///     child_count: 0,
    ///     notice_date: None,
    ///     last_working_day: None,
    /// };
    /// // 2600 / 26 / 8 = 12.50
    /// assert_eq!(employee.hourly_rate(), Decimal::new(1250, 2));
    /// ```
    pub fn hourly_rate(&self) -> Decimal {
        match self.hourly_rate_override {
            Some(rate) => rate,
            None => (self.basic_salary / ORDINARY_RATE_DAYS / ORDINARY_RATE_HOURS)
                .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero),
        }
    }

    /// Returns the employee's age in completed years on the given date.
    pub fn age_on(&self, date: NaiveDate) -> u32 {
        let mut years = date.year() - self.date_of_birth.year();
        if (date.month(), date.day()) < (self.date_of_birth.month(), self.date_of_birth.day()) {
            years -= 1;
        }
        years.max(0) as u32
    }

    /// Returns completed months of service from the hire date to the
    /// given date.
    pub fn tenure_months(&self, as_of: NaiveDate) -> u32 {
        completed_months(self.hire_date, as_of)
    }
}

/// Completed whole months between two dates, saturating at zero when the
/// end is before the start.
pub fn completed_months(start: NaiveDate, end: NaiveDate) -> u32 {
    if end < start {
        return 0;
    }
    let mut months = (end.year() - start.year()) * 12 + end.month() as i32 - start.month() as i32;
    if end.day() < start.day() {
        months -= 1;
    }
    months.max(0) as u32
}
