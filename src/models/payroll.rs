//! Payroll runs, items and pay lines.
//!
//! This module contains the monthly payroll aggregates: the run (a swept
//! period for a scope), the per-employee item with its itemised pay lines,
//! and the statutory contribution breakdown.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// A payroll month identified by calendar year and month number.
///
/// # Example
///
/// ```
/// use gaji_engine::models::PayrollPeriod;
/// use chrono::NaiveDate;
///
/// let period = PayrollPeriod { year: 2026, month: 3 };
/// assert_eq!(period.to_string(), "2026-03");
/// assert!(period.contains(NaiveDate::from_ymd_opt(2026, 3, 14).unwrap()));
/// assert_eq!(period.next(), PayrollPeriod { year: 2026, month: 4 });
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PayrollPeriod {
    /// Calendar year.
    pub year: i32,
    /// Month number, 1 through 12.
    pub month: u32,
}

impl PayrollPeriod {
    /// Builds a period after validating the month number.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    /// The period a date falls in.
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// First calendar day of the month. `None` when the month number is
    /// out of range.
    pub fn first_day(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }

    /// Last calendar day of the month.
    pub fn last_day(&self) -> Option<NaiveDate> {
        self.next().first_day()?.pred_opt()
    }

    /// First and last day together.
    pub fn bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        Some((self.first_day()?, self.last_day()?))
    }

    /// Whether the date falls inside this period.
    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    /// The following month.
    pub fn next(&self) -> Self {
        if self.month >= 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }
}

impl fmt::Display for PayrollPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Which employees a payroll run sweeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "scope")]
pub enum RunScope {
    /// Every employee of the tenant.
    Company,
    /// One outlet or department.
    Grouping {
        /// The outlet/department identifier.
        grouping_id: Uuid,
    },
}

impl RunScope {
    /// Whether an employee in the given grouping falls under this scope.
    pub fn includes(&self, grouping_id: Uuid) -> bool {
        match self {
            RunScope::Company => true,
            RunScope::Grouping { grouping_id: g } => *g == grouping_id,
        }
    }
}

/// Lifecycle state of a payroll run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// Editable; can be recomputed or deleted.
    Draft,
    /// Totals frozen; the period is locked for its scope.
    Finalised,
    /// Payment executed.
    Paid,
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RunStatus::Draft => "DRAFT",
            RunStatus::Finalised => "FINALISED",
            RunStatus::Paid => "PAID",
        };
        write!(f, "{s}")
    }
}

/// The pay component a line belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayComponent {
    /// Monthly basic pay (pro-rated where applicable).
    Basic,
    /// Approved overtime pay.
    Overtime,
    /// Extra pay for part-time work on a public holiday.
    HolidayPay,
    /// Fixed allowance.
    Allowance,
    /// Performance incentive.
    Incentive,
    /// Sales commission.
    Commission,
    /// Expense claim reimbursement.
    Claim,
    /// Leave encashment paid on exit.
    LeaveEncashment,
    /// Pro-rated annual bonus paid on exit.
    BonusProrated,
    /// Deduction for unpaid absent days.
    AbsenceDeduction,
    /// Employee EPF contribution.
    EpfEmployee,
    /// Employee SOCSO contribution.
    SocsoEmployee,
    /// Employee EIS contribution.
    EisEmployee,
    /// Monthly tax deduction.
    Pcb,
    /// Short-notice buyout recovered on exit.
    NoticeBuyout,
    /// Advance leave recovered on exit.
    AdvanceLeaveRecovery,
}

/// A single line item in a payroll item or settlement.
///
/// Each line captures a quantity (hours, days or units), the applicable
/// rate and the resulting amount. Flat amounts carry a quantity of one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayLine {
    /// The pay component this line belongs to.
    pub component: PayComponent,
    /// Human-readable description of the line.
    pub description: String,
    /// The number of units (hours, days, or 1 for flat amounts).
    pub quantity: Decimal,
    /// The rate per unit.
    pub rate: Decimal,
    /// The total amount for this line.
    pub amount: Decimal,
}

impl PayLine {
    /// Builds a flat line where the amount is not derived from a rate.
    pub fn flat(component: PayComponent, description: impl Into<String>, amount: Decimal) -> Self {
        Self {
            component,
            description: description.into(),
            quantity: Decimal::ONE,
            rate: amount,
            amount,
        }
    }
}

/// Employee and employer statutory contributions for one pay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatutoryBreakdown {
    /// Employee EPF portion.
    pub epf_employee: Decimal,
    /// Employer EPF portion.
    pub epf_employer: Decimal,
    /// Employee SOCSO portion.
    pub socso_employee: Decimal,
    /// Employer SOCSO portion.
    pub socso_employer: Decimal,
    /// Employee EIS portion.
    pub eis_employee: Decimal,
    /// Employer EIS portion.
    pub eis_employer: Decimal,
    /// Monthly tax deducted.
    pub pcb: Decimal,
}

impl StatutoryBreakdown {
    /// A zeroed breakdown.
    pub fn zero() -> Self {
        Self {
            epf_employee: Decimal::ZERO,
            epf_employer: Decimal::ZERO,
            socso_employee: Decimal::ZERO,
            socso_employer: Decimal::ZERO,
            eis_employee: Decimal::ZERO,
            eis_employer: Decimal::ZERO,
            pcb: Decimal::ZERO,
        }
    }

    /// Total deducted from the employee.
    pub fn employee_total(&self) -> Decimal {
        self.epf_employee + self.socso_employee + self.eis_employee + self.pcb
    }

    /// Total borne by the employer on top of gross.
    pub fn employer_total(&self) -> Decimal {
        self.epf_employer + self.socso_employer + self.eis_employer
    }
}

/// One employee's pay within a payroll run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayrollItem {
    /// Unique identifier for the item.
    pub id: Uuid,
    /// The run the item belongs to.
    pub run_id: Uuid,
    /// The employee being paid.
    pub employee_id: Uuid,
    /// Earning lines, all non-negative.
    pub earnings: Vec<PayLine>,
    /// Deduction lines, stored as non-negative magnitudes.
    pub deductions: Vec<PayLine>,
    /// Sum of earning lines.
    pub gross: Decimal,
    /// The base the contributions were computed on.
    pub statutory_base: Decimal,
    /// Statutory contribution breakdown.
    pub statutory: StatutoryBreakdown,
    /// Gross minus all deductions.
    pub net: Decimal,
}

impl PayrollItem {
    /// Sum of the deduction lines.
    pub fn total_deductions(&self) -> Decimal {
        self.deductions.iter().map(|line| line.amount).sum()
    }
}

/// A payroll run: one swept period for one scope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayrollRun {
    /// Unique identifier for the run.
    pub id: Uuid,
    /// The tenant the run belongs to.
    pub tenant_id: Uuid,
    /// The month swept.
    pub period: PayrollPeriod,
    /// Which employees were swept.
    pub scope: RunScope,
    /// Current run state.
    pub status: RunStatus,
    /// When the run was created.
    pub created_at: DateTime<Utc>,
    /// When the run was finalised, if it has been.
    pub finalised_at: Option<DateTime<Utc>>,
}
