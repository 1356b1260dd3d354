//! Leave types, balances and requests.
//!
//! Leave quantities are measured in days and carried as [`Decimal`] so
//! half-day policies can be layered on later without changing the model.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// What happens to unused entitlement at the end of the year.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "policy")]
pub enum CarryForwardPolicy {
    /// Unused days are lost.
    Forfeit,
    /// Unused days carry over up to a cap.
    Capped {
        /// Maximum days that survive the year boundary.
        max_days: Decimal,
    },
    /// All unused days carry over.
    Unlimited,
}

impl CarryForwardPolicy {
    /// Applies the policy to an unused-day count.
    pub fn cap(&self, days: Decimal) -> Decimal {
        match self {
            CarryForwardPolicy::Forfeit => Decimal::ZERO,
            CarryForwardPolicy::Capped { max_days } => days.min(*max_days),
            CarryForwardPolicy::Unlimited => days,
        }
    }
}

/// A tenant-defined category of leave.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaveType {
    /// Unique identifier for the leave type.
    pub id: Uuid,
    /// The tenant defining the type.
    pub tenant_id: Uuid,
    /// Short code, e.g. "AL" or "MC".
    pub code: String,
    /// Display name, e.g. "Annual Leave".
    pub name: String,
    /// Full-year entitlement in days.
    pub annual_entitlement_days: Decimal,
    /// Whether days of this type are paid.
    pub is_paid: bool,
    /// Whether unused days are paid out on exit.
    pub encashable_on_exit: bool,
    /// Cap on days encashed on exit; `None` means uncapped.
    pub encashment_cap_days: Option<Decimal>,
    /// Year-boundary behaviour for unused days.
    pub carry_forward: CarryForwardPolicy,
}

/// Per-employee, per-type, per-year balance row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaveBalance {
    /// Unique identifier for the balance row.
    pub id: Uuid,
    /// The employee the balance belongs to.
    pub employee_id: Uuid,
    /// The leave type the balance tracks.
    pub leave_type_id: Uuid,
    /// The calendar year the balance covers.
    pub year: i32,
    /// Days entitled for the full year.
    pub entitled_days: Decimal,
    /// Days carried over from the previous year, already capped.
    pub carried_forward: Decimal,
    /// Days consumed by approved requests.
    pub used_days: Decimal,
    /// Days held by pending requests.
    pub pending_days: Decimal,
    /// Net manual adjustments by an administrator.
    pub adjustment_days: Decimal,
}

impl LeaveBalance {
    /// Creates a zeroed balance row for a year.
    pub fn open(employee_id: Uuid, leave_type_id: Uuid, year: i32, entitled_days: Decimal) -> Self {
        Self {
            id: Uuid::new_v4(),
            employee_id,
            leave_type_id,
            year,
            entitled_days,
            carried_forward: Decimal::ZERO,
            used_days: Decimal::ZERO,
            pending_days: Decimal::ZERO,
            adjustment_days: Decimal::ZERO,
        }
    }

    /// Days still available: entitled plus carried forward plus
    /// adjustments, minus used and pending. May go negative when the
    /// tenant allows advance leave.
    pub fn available(&self) -> Decimal {
        self.entitled_days + self.carried_forward + self.adjustment_days
            - self.used_days
            - self.pending_days
    }
}

/// Lifecycle state of a leave request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaveRequestStatus {
    /// Awaiting a decision.
    Pending,
    /// Approved; days are consumed.
    Approved,
    /// Rejected by an approver.
    Rejected,
    /// Withdrawn by the requester.
    Cancelled,
}

impl fmt::Display for LeaveRequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LeaveRequestStatus::Pending => "PENDING",
            LeaveRequestStatus::Approved => "APPROVED",
            LeaveRequestStatus::Rejected => "REJECTED",
            LeaveRequestStatus::Cancelled => "CANCELLED",
        };
        write!(f, "{s}")
    }
}

/// An employee's request for a span of leave days.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaveRequest {
    /// Unique identifier for the request.
    pub id: Uuid,
    /// The requesting employee.
    pub employee_id: Uuid,
    /// The leave type requested.
    pub leave_type_id: Uuid,
    /// First day of leave.
    pub start_date: NaiveDate,
    /// Last day of leave, inclusive.
    pub end_date: NaiveDate,
    /// Leave days the request consumes.
    pub days: Decimal,
    /// Current request state.
    pub status: LeaveRequestStatus,
    /// Free-text reason from the requester.
    pub reason: Option<String>,
    /// Last mutation timestamp.
    pub updated_at: DateTime<Utc>,
}

impl LeaveRequest {
    /// Whether the request covers the given date.
    pub fn covers(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_carry_forward_forfeit_drops_everything() {
        assert_eq!(CarryForwardPolicy::Forfeit.cap(dec("7")), Decimal::ZERO);
    }

    #[test]
    fn test_carry_forward_capped_limits_days() {
        let policy = CarryForwardPolicy::Capped {
            max_days: dec("5"),
        };
        assert_eq!(policy.cap(dec("7")), dec("5"));
        assert_eq!(policy.cap(dec("3")), dec("3"));
    }

    #[test]
    fn test_carry_forward_unlimited_keeps_days() {
        assert_eq!(CarryForwardPolicy::Unlimited.cap(dec("9.5")), dec("9.5"));
    }

    #[test]
    fn test_balance_available_nets_all_components() {
        let mut balance = LeaveBalance::open(
            Uuid::from_u128(1),
            Uuid::from_u128(2),
            2026,
            dec("14"),
        );
        balance.carried_forward = dec("3");
        balance.used_days = dec("6");
        balance.pending_days = dec("2");
        balance.adjustment_days = dec("1");
        // 14 + 3 + 1 - 6 - 2 = 10
        assert_eq!(balance.available(), dec("10"));
    }

    #[test]
    fn test_balance_available_can_go_negative() {
        let mut balance =
            LeaveBalance::open(Uuid::from_u128(1), Uuid::from_u128(2), 2026, dec("8"));
        balance.used_days = dec("10");
        assert_eq!(balance.available(), dec("-2"));
    }

    #[test]
    fn test_request_covers_inclusive_range() {
        let request = LeaveRequest {
            id: Uuid::from_u128(5),
            employee_id: Uuid::from_u128(1),
            leave_type_id: Uuid::from_u128(2),
            start_date: NaiveDate::from_ymd_opt(2026, 4, 6).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2026, 4, 8).unwrap(),
            days: dec("3"),
            status: LeaveRequestStatus::Approved,
            reason: None,
            updated_at: Utc::now(),
        };
        assert!(request.covers(NaiveDate::from_ymd_opt(2026, 4, 6).unwrap()));
        assert!(request.covers(NaiveDate::from_ymd_opt(2026, 4, 8).unwrap()));
        assert!(!request.covers(NaiveDate::from_ymd_opt(2026, 4, 9).unwrap()));
    }

    #[test]
    fn test_carry_forward_policy_serialization() {
        let json = serde_json::to_string(&CarryForwardPolicy::Capped {
            max_days: dec("5"),
        })
        .unwrap();
        let back: CarryForwardPolicy = serde_json::from_str(&json).unwrap();
        assert_eq!(
            back,
            CarryForwardPolicy::Capped {
                max_days: dec("5")
            }
        );
    }
}
