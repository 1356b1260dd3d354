//! Exit settlement composition.
//!
//! Builds the final pay for a resigning employee: the pro-rated last
//! month, leave encashment, outstanding claims and the optional bonus
//! on the earning side; statutory deductions, the short-notice buyout
//! and advance-leave recovery on the other. The result stays a
//! recomputable draft until it is processed.

use chrono::{Datelike, NaiveDate, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use uuid::Uuid;

use crate::config::YearTables;
use crate::models::{
    completed_months, AssignmentStatus, EarningAssignment, EarningKind, Employee, PayComponent,
    PayLine, PayrollPeriod, PublicHoliday, Settlement, SettlementStatus, TenantPolicy, WorkType,
};

use super::earnings::StatutoryBases;
use super::leave_entitlement::LeaveEntitlement;
use super::statutory::statutory_breakdown;
use super::working_days::{prorate_basic, working_days_in_month};

const MONTHS_PER_YEAR: Decimal = Decimal::from_parts(12, 0, 0, false, 0);

fn round_cents(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Everything the settlement builder reads for one exit.
#[derive(Debug, Clone, Copy)]
pub struct SettlementInput<'a> {
    /// The exiting employee.
    pub employee: &'a Employee,
    /// The tenant policy in force.
    pub policy: &'a TenantPolicy,
    /// The statutory schedules for the exit year.
    pub tables: &'a YearTables,
    /// The agreed last working day.
    pub last_working_day: NaiveDate,
    /// The date notice was served, when one was.
    pub notice_date: Option<NaiveDate>,
    /// Whether the employer waives the notice shortfall.
    pub notice_waived: bool,
    /// The tenant's public holidays.
    pub holidays: &'a [PublicHoliday],
    /// Leave entitlements resolved as of the last working day.
    pub leave: &'a [LeaveEntitlement],
    /// Earning assignments still open for the employee.
    pub claims: &'a [EarningAssignment],
}

/// Contractual notice for a given tenure, in days.
///
/// # Examples
///
/// ```
/// use gaji_engine::calculation::required_notice_days;
///
/// assert_eq!(required_notice_days(12), 28);
/// assert_eq!(required_notice_days(36), 42);
/// assert_eq!(required_notice_days(72), 56);
/// ```
pub fn required_notice_days(tenure_months: u32) -> u32 {
    if tenure_months < 24 {
        28
    } else if tenure_months < 60 {
        42
    } else {
        56
    }
}

/// Builds a draft settlement for one exiting employee.
///
/// The notice shortfall is the contractual requirement for the tenure
/// minus the calendar days actually served. Earnings are the pro-rated
/// basic to the last working day, leave encashment at the daily rate,
/// approved claims through the exit month and the pro-rated bonus when
/// the tenant pays one. Statutory deductions run on the gross; the
/// buyout and the policy-gated advance-leave recovery come off after.
/// The net may be negative when the recoveries exceed the gross.
pub fn build_settlement(input: &SettlementInput<'_>) -> Settlement {
    let employee = input.employee;
    let policy = input.policy;
    let lwd = input.last_working_day;

    let tenure_months = employee.tenure_months(lwd);
    let required = required_notice_days(tenure_months);
    let notice_given = input
        .notice_date
        .map(|served| (lwd - served).num_days().max(0) as u32)
        .unwrap_or(0);
    let shortfall = required.saturating_sub(notice_given);

    let period = PayrollPeriod {
        year: lwd.year(),
        month: lwd.month(),
    };
    let holiday_dates: Vec<NaiveDate> = input.holidays.iter().map(|h| h.date).collect();
    let days_in_month = working_days_in_month(period, policy.weekly_rest_day, &holiday_dates);
    let daily_rate = if days_in_month > 0 {
        employee.basic_salary / Decimal::from(days_in_month)
    } else {
        Decimal::ZERO
    };

    let mut earnings: Vec<PayLine> = Vec::new();

    // pro-rated basic to the last working day
    if employee.work_type == WorkType::FullTime {
        if let Some((first, _)) = period.bounds() {
            let from = employee.hire_date.max(first);
            if from <= lwd {
                let basic = prorate_basic(
                    employee.basic_salary,
                    from,
                    lwd,
                    period,
                    policy.weekly_rest_day,
                    &holiday_dates,
                );
                if basic > Decimal::ZERO {
                    earnings.push(PayLine::flat(
                        PayComponent::Basic,
                        "Pro-rated basic pay",
                        basic,
                    ));
                }
            }
        }
    }

    // leave encashment per encashable type
    for entitlement in input.leave {
        if entitlement.encashable_days <= Decimal::ZERO {
            continue;
        }
        earnings.push(PayLine {
            component: PayComponent::LeaveEncashment,
            description: format!("Leave encashment ({})", entitlement.code),
            quantity: entitlement.encashable_days,
            rate: round_cents(daily_rate),
            amount: round_cents(entitlement.encashable_days * daily_rate),
        });
    }

    // approved claims through the exit month
    for claim in input.claims {
        if claim.employee_id != employee.id
            || claim.kind != EarningKind::Claim
            || claim.status != AssignmentStatus::Approved
            || (claim.payroll_year, claim.payroll_month) > (lwd.year(), lwd.month())
        {
            continue;
        }
        earnings.push(PayLine::flat(
            PayComponent::Claim,
            claim.description.clone(),
            round_cents(claim.amount),
        ));
    }

    // pro-rated bonus when the tenant pays one
    if policy.prorate_bonus_on_exit {
        if let Some(bonus) = policy.annual_bonus {
            let year_start = NaiveDate::from_ymd_opt(lwd.year(), 1, 1).unwrap_or(lwd);
            let served_from = employee.hire_date.max(year_start);
            let served_through = lwd.succ_opt().unwrap_or(lwd);
            let months = completed_months(served_from, served_through).min(12);
            let amount = round_cents(bonus * Decimal::from(months) / MONTHS_PER_YEAR);
            if amount > Decimal::ZERO {
                earnings.push(PayLine {
                    component: PayComponent::BonusProrated,
                    description: "Pro-rated annual bonus".to_string(),
                    quantity: Decimal::from(months),
                    rate: round_cents(bonus / MONTHS_PER_YEAR),
                    amount,
                });
            }
        }
    }

    let gross: Decimal = earnings.iter().map(|line| line.amount).sum();

    let bases = StatutoryBases {
        contribution: gross,
        pcb_regular: gross,
        pcb_additional: Decimal::ZERO,
    };
    let statutory = statutory_breakdown(input.tables, employee, lwd, &bases);

    let notice_buyout = if input.notice_waived || shortfall == 0 {
        Decimal::ZERO
    } else {
        round_cents(Decimal::from(shortfall) * daily_rate)
    };

    let advance_leave_recovery = if policy.recover_advance_leave_on_exit {
        let advance_days: Decimal = input
            .leave
            .iter()
            .filter(|e| !e.encashable_type)
            .map(|e| e.advance_used)
            .sum();
        round_cents(advance_days * daily_rate).min(gross).max(Decimal::ZERO)
    } else {
        Decimal::ZERO
    };

    let net = gross - statutory.employee_total() - notice_buyout - advance_leave_recovery;

    Settlement {
        id: Uuid::new_v4(),
        employee_id: employee.id,
        tenant_id: employee.tenant_id,
        last_working_day: lwd,
        notice_date: input.notice_date,
        tenure_months,
        required_notice_days: required,
        notice_given_days: notice_given,
        shortfall_days: shortfall,
        notice_waived: input.notice_waived,
        daily_rate: round_cents(daily_rate),
        earnings,
        gross,
        statutory,
        notice_buyout,
        advance_leave_recovery,
        net,
        status: SettlementStatus::Draft,
        updated_at: Utc::now(),
    }
}
