//! Variable earning assignments: allowances, incentives, commissions and
//! expense claims.
//!
//! Assignments are tagged with the payroll month they should be paid in,
//! so a claim approved late can be reassigned to a following month instead
//! of being lost.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::models::payroll::PayrollPeriod;

/// The category of a variable earning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EarningKind {
    /// A recurring or one-off fixed allowance.
    Allowance,
    /// A performance incentive.
    Incentive,
    /// A sales commission.
    Commission,
    /// An expense claim reimbursement. Never taxable, never statutory.
    Claim,
}

impl fmt::Display for EarningKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EarningKind::Allowance => "allowance",
            EarningKind::Incentive => "incentive",
            EarningKind::Commission => "commission",
            EarningKind::Claim => "claim",
        };
        write!(f, "{s}")
    }
}

/// Lifecycle state of an earning assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentStatus {
    /// Awaiting approval.
    Pending,
    /// Approved and waiting to be swept into a run.
    Approved,
    /// Picked up by a finalised payroll run.
    Included,
    /// Rejected; never paid.
    Rejected,
}

impl fmt::Display for AssignmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AssignmentStatus::Pending => "PENDING",
            AssignmentStatus::Approved => "APPROVED",
            AssignmentStatus::Included => "INCLUDED",
            AssignmentStatus::Rejected => "REJECTED",
        };
        write!(f, "{s}")
    }
}

/// A variable earning assigned to an employee for a payroll month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EarningAssignment {
    /// Unique identifier for the assignment.
    pub id: Uuid,
    /// The employee being paid.
    pub employee_id: Uuid,
    /// The earning category.
    pub kind: EarningKind,
    /// Human-readable description, e.g. "Meal allowance".
    pub description: String,
    /// Amount in ringgit.
    pub amount: Decimal,
    /// The payroll month (1-12) the amount is claimed against.
    pub payroll_month: u32,
    /// The payroll year the amount is claimed against.
    pub payroll_year: i32,
    /// Current state.
    pub status: AssignmentStatus,
    /// Whether the amount enters the tax base. Claims are reimbursements
    /// and carry `false`.
    pub taxable: bool,
    /// The finalised run that swept the assignment, set when the status
    /// moves to INCLUDED.
    pub included_in_run: Option<Uuid>,
    /// Last mutation timestamp.
    pub updated_at: DateTime<Utc>,
}

impl EarningAssignment {
    /// The payroll period the assignment targets.
    pub fn period(&self) -> PayrollPeriod {
        PayrollPeriod {
            year: self.payroll_year,
            month: self.payroll_month,
        }
    }

    /// Whether the assignment is payable in the given period: approved and
    /// claimed against that month.
    pub fn payable_in(&self, period: PayrollPeriod) -> bool {
        self.status == AssignmentStatus::Approved && self.period() == period
    }

    /// Whether the assignment belongs in a composition for the given run.
    /// Recomputing a finalised run must reproduce its own swept
    /// assignments, so items it included stay payable for it.
    pub fn payable_for_run(&self, period: PayrollPeriod, run_id: Uuid) -> bool {
        if self.period() != period {
            return false;
        }
        match self.status {
            AssignmentStatus::Approved => true,
            AssignmentStatus::Included => self.included_in_run == Some(run_id),
            AssignmentStatus::Pending | AssignmentStatus::Rejected => false,
        }
    }
}
