//! Tenant model and pay-policy types.
//!
//! Each tenant (company) carries a [`TenantPolicy`] that parameterises every
//! attendance and payroll calculation: the standard working day, overtime
//! rounding, rest-day configuration, statutory-base composition and exit
//! behaviour.

use chrono::{NaiveTime, Weekday};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Overtime multiplier applied on ordinary working days (1.5).
pub const OT_MULTIPLIER_NORMAL: Decimal = Decimal::from_parts(15, 0, 0, false, 1);

/// Overtime multiplier applied on the weekly rest day (2.0).
pub const OT_MULTIPLIER_REST_DAY: Decimal = Decimal::from_parts(2, 0, 0, false, 0);

/// Overtime multiplier applied on gazetted public holidays (3.0).
pub const OT_MULTIPLIER_PUBLIC_HOLIDAY: Decimal = Decimal::from_parts(3, 0, 0, false, 0);

/// Pay multiplier for part-time work performed on an extra-pay public
/// holiday (2.0).
pub const PUBLIC_HOLIDAY_PAY_MULTIPLIER: Decimal = Decimal::from_parts(2, 0, 0, false, 0);

/// How a tenant groups its employees for run scoping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupingType {
    /// Employees are grouped by outlet.
    Outlet,
    /// Employees are grouped by department.
    Department,
}

/// The granularity overtime minutes are rounded to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundingMethod {
    /// No rounding beyond whole minutes.
    Minute,
    /// Round to 15-minute blocks.
    QuarterHour,
    /// Round to 30-minute blocks.
    HalfHour,
    /// Round to 60-minute blocks.
    Hour,
}

impl RoundingMethod {
    /// Returns the block size in minutes for this granularity.
    pub fn granularity_minutes(&self) -> u32 {
        match self {
            RoundingMethod::Minute => 1,
            RoundingMethod::QuarterHour => 15,
            RoundingMethod::HalfHour => 30,
            RoundingMethod::Hour => 60,
        }
    }
}

/// The direction overtime minutes are rounded in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundingDirection {
    /// Round to the nearest block, ties rounding up.
    Nearest,
    /// Always round down to the block boundary.
    Down,
    /// Always round up to the block boundary.
    Up,
}

/// A tenant's overtime rounding policy: a granularity and a direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundingPolicy {
    /// The block size to round to.
    pub method: RoundingMethod,
    /// The direction to round in.
    pub direction: RoundingDirection,
}

impl Default for RoundingPolicy {
    fn default() -> Self {
        Self {
            method: RoundingMethod::Minute,
            direction: RoundingDirection::Nearest,
        }
    }
}

/// Flags controlling which pay components join the statutory
/// contribution base alongside basic pay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatutoryBaseFlags {
    /// Include fixed allowances in the base.
    pub include_allowances: bool,
    /// Include overtime pay in the base.
    pub include_overtime: bool,
    /// Include public-holiday pay in the base.
    pub include_holiday_pay: bool,
    /// Include incentives in the base.
    pub include_incentives: bool,
    /// Include commissions in the base.
    pub include_commissions: bool,
}

impl Default for StatutoryBaseFlags {
    fn default() -> Self {
        Self {
            include_allowances: true,
            include_overtime: false,
            include_holiday_pay: false,
            include_incentives: true,
            include_commissions: true,
        }
    }
}

/// Per-tenant policy knobs consulted by every calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TenantPolicy {
    /// Length of the standard working day in minutes. Work beyond this
    /// boundary is overtime for full-time employees.
    pub standard_daily_minutes: u32,
    /// Minimum raw overtime before any overtime is counted at all.
    pub min_overtime_minutes: u32,
    /// How overtime minutes are rounded once past the minimum.
    pub ot_rounding: RoundingPolicy,
    /// The weekly rest day.
    pub weekly_rest_day: Weekday,
    /// Which components join the statutory contribution base.
    pub statutory_base: StatutoryBaseFlags,
    /// Overtime multiplier on ordinary working days.
    pub ot_multiplier_normal: Decimal,
    /// Overtime multiplier on the weekly rest day.
    pub ot_multiplier_rest_day: Decimal,
    /// Overtime multiplier on public holidays.
    pub ot_multiplier_public_holiday: Decimal,
    /// Pay multiplier for part-time hours worked on an extra-pay holiday.
    pub public_holiday_multiplier: Decimal,
    /// Whether leave may be approved into a negative balance.
    pub allow_advance_leave: bool,
    /// Whether advance leave is recovered from the final settlement.
    pub recover_advance_leave_on_exit: bool,
    /// Whether the annual bonus is pro-rated into exit settlements.
    pub prorate_bonus_on_exit: bool,
    /// The annual bonus amount, when the tenant pays one.
    pub annual_bonus: Option<Decimal>,
    /// Wall-clock time of day the auto-closure sweep runs.
    pub auto_closure_time: NaiveTime,
}

impl Default for TenantPolicy {
    fn default() -> Self {
        Self {
            standard_daily_minutes: 480,
            min_overtime_minutes: 60,
            ot_rounding: RoundingPolicy::default(),
            weekly_rest_day: Weekday::Sun,
            statutory_base: StatutoryBaseFlags::default(),
            ot_multiplier_normal: OT_MULTIPLIER_NORMAL,
            ot_multiplier_rest_day: OT_MULTIPLIER_REST_DAY,
            ot_multiplier_public_holiday: OT_MULTIPLIER_PUBLIC_HOLIDAY,
            public_holiday_multiplier: PUBLIC_HOLIDAY_PAY_MULTIPLIER,
            allow_advance_leave: false,
            recover_advance_leave_on_exit: false,
            prorate_bonus_on_exit: false,
            annual_bonus: None,
            auto_closure_time: NaiveTime::MIN,
        }
    }
}

/// A company hosted by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tenant {
    /// Unique identifier for the tenant.
    pub id: Uuid,
    /// Display name of the company.
    pub name: String,
    /// How the tenant groups employees.
    pub grouping_type: GroupingType,
    /// The tenant's calculation policy.
    pub policy: TenantPolicy,
}
