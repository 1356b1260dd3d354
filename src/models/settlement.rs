//! Exit settlement model.
//!
//! A settlement is the final pay computed for a resigning employee: the
//! pro-rated last month, leave encashment, outstanding claims and the
//! optional bonus on the earning side, with statutory deductions, the
//! short-notice buyout and advance-leave recovery on the other.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::models::payroll::{PayLine, StatutoryBreakdown};

/// Lifecycle state of a settlement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettlementStatus {
    /// Recomputable preview.
    Draft,
    /// Figures frozen; the employee has exited.
    Processed,
}

impl fmt::Display for SettlementStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SettlementStatus::Draft => "DRAFT",
            SettlementStatus::Processed => "PROCESSED",
        };
        write!(f, "{s}")
    }
}

/// The final pay for a resigning employee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settlement {
    /// Unique identifier for the settlement.
    pub id: Uuid,
    /// The exiting employee.
    pub employee_id: Uuid,
    /// The tenant the employee belongs to.
    pub tenant_id: Uuid,
    /// The agreed last working day.
    pub last_working_day: NaiveDate,
    /// The date notice was served, when one was.
    pub notice_date: Option<NaiveDate>,
    /// Completed months of service on the last working day.
    pub tenure_months: u32,
    /// Contractual notice for this tenure, in days.
    pub required_notice_days: u32,
    /// Calendar days of notice actually served.
    pub notice_given_days: u32,
    /// Notice shortfall in days, zero when fully served.
    pub shortfall_days: u32,
    /// Whether the employer waived the shortfall.
    pub notice_waived: bool,
    /// Ordinary daily rate used for buyout and encashment.
    pub daily_rate: Decimal,
    /// Earning lines: pro-rated basic, encashment, claims, bonus.
    pub earnings: Vec<PayLine>,
    /// Sum of earning lines.
    pub gross: Decimal,
    /// Statutory contributions on the settlement.
    pub statutory: StatutoryBreakdown,
    /// Short-notice buyout withheld, zero when waived.
    pub notice_buyout: Decimal,
    /// Advance leave recovered, zero unless the tenant recovers it.
    pub advance_leave_recovery: Decimal,
    /// Final amount; negative when the employee owes the employer.
    pub net: Decimal,
    /// Current settlement state.
    pub status: SettlementStatus,
    /// Last mutation timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Settlement {
    /// Whether the figures can still change.
    pub fn is_draft(&self) -> bool {
        self.status == SettlementStatus::Draft
    }
}
