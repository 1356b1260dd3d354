//! Calculation logic for the attendance and payroll engine.
//!
//! This module contains all the pure calculation functions: clock
//! arithmetic and slot classification, daily work and overtime totals,
//! auto-closure of abandoned days, day and overtime approval
//! transitions, working-day proration, leave entitlement projection,
//! monthly earnings composition, the four statutory schedules and the
//! exit settlement.

mod approval;
mod auto_close;
mod clock_math;
mod day_totals;
mod earnings;
mod eis;
mod epf;
mod leave_entitlement;
mod pcb;
mod settlement;
mod slot_pattern;
mod socso;
mod statutory;
mod working_days;

pub use approval::{
    approve_day, approve_ot, complete_record, ot_status_on_close, payable_ot_minutes, reject_day,
    reject_ot,
};
pub use auto_close::{close_abandoned_record, synthetic_clock_out};
pub use clock_math::{
    MINUTES_PER_DAY, apply_ot_floor, diff, diff_minutes, minute_of_day, round_minutes,
};
pub use day_totals::{
    DayContext, DayTotals, calculate_day_totals, measure_pattern, overtime_minutes,
    resolve_attendance,
};
pub use earnings::{EarningsInput, GrossEarnings, StatutoryBases, compose_monthly};
pub use eis::{EisContribution, eis_contribution};
pub use epf::{EpfContribution, epf_contribution};
pub use leave_entitlement::{
    LeaveEntitlement, anniversary_on_or_before, months_since_anniversary, resolve_entitlement,
    ytd_earned,
};
pub use pcb::{PcbProfile, annual_tax, monthly_pcb};
pub use settlement::{SettlementInput, build_settlement, required_notice_days};
pub use slot_pattern::{
    ClockKind, ClockPattern, Slot, SlotClassification, SlotTimes, assign_slot, classify_slots,
};
pub use socso::{SocsoContribution, socso_contribution};
pub use statutory::statutory_breakdown;
pub use working_days::{
    is_working_day, prorate_basic, proration_fraction, working_days_between,
    working_days_in_month,
};
