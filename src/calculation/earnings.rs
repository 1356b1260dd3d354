//! Monthly gross-pay composition.
//!
//! The composer turns one employee's month (day records, schedule facts
//! and variable earning assignments) into itemised pay lines, a gross
//! total and the statutory bases the contribution and tax schedules run
//! on. It performs no deductions beyond the unpaid-absence line; the
//! statutory side is applied by the caller.

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use uuid::Uuid;

use crate::calculation::approval::payable_ot_minutes;
use crate::calculation::working_days::{
    is_working_day, prorate_basic, working_days_between, working_days_in_month,
};
use crate::models::{
    AttendanceStatus, DayRecord, EarningAssignment, EarningKind, Employee, PayComponent, PayLine,
    PayrollPeriod, PcbTreatment, PublicHoliday, RecordStatus, TenantPolicy, WorkType,
};

const MINUTES_PER_HOUR: Decimal = Decimal::from_parts(60, 0, 0, false, 0);

fn round_cents(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Everything the composer reads for one employee and month.
#[derive(Debug, Clone, Copy)]
pub struct EarningsInput<'a> {
    /// The employee being paid.
    pub employee: &'a Employee,
    /// The payroll month.
    pub period: PayrollPeriod,
    /// The tenant policy in force.
    pub policy: &'a TenantPolicy,
    /// The employee's day records for the month.
    pub records: &'a [DayRecord],
    /// Variable earnings claimed against the month.
    pub assignments: &'a [EarningAssignment],
    /// The tenant's public holidays.
    pub holidays: &'a [PublicHoliday],
    /// Approved paid-leave days falling inside the month.
    pub paid_leave_days: u32,
    /// Approved unpaid-leave days falling inside the month.
    pub unpaid_leave_days: u32,
    /// The run being composed, when verifying a finalised run against its
    /// frozen totals.
    pub run_id: Option<Uuid>,
}

/// The bases the statutory schedules run on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatutoryBases {
    /// Base for EPF, SOCSO and EIS.
    pub contribution: Decimal,
    /// Monthly remuneration annualised by the tax projection.
    pub pcb_regular: Decimal,
    /// Bonus-style amount taxed in the current month only.
    pub pcb_additional: Decimal,
}

/// A composed gross month, before statutory deductions.
#[derive(Debug, Clone, PartialEq)]
pub struct GrossEarnings {
    /// Itemised earning lines.
    pub earnings: Vec<PayLine>,
    /// Deduction lines; only the unpaid-absence line at this stage.
    pub deductions: Vec<PayLine>,
    /// Sum of the earning lines.
    pub gross: Decimal,
    /// The statutory bases assembled under the tenant flags.
    pub bases: StatutoryBases,
}

/// The stretch of the month the employee was employed for, clamped to the
/// month's bounds. `None` when employment does not overlap the month.
fn employed_stretch(employee: &Employee, period: PayrollPeriod) -> Option<(NaiveDate, NaiveDate)> {
    let (first, last) = period.bounds()?;
    let from = employee.hire_date.max(first);
    let to = employee
        .last_working_day
        .map(|l| l.min(last))
        .unwrap_or(last);
    (from <= to).then_some((from, to))
}

fn ot_multiplier(policy: &TenantPolicy, attendance: AttendanceStatus) -> (Decimal, &'static str) {
    match attendance {
        AttendanceStatus::Holiday => (policy.ot_multiplier_public_holiday, "public holiday"),
        AttendanceStatus::Rest => (policy.ot_multiplier_rest_day, "rest day"),
        _ => (policy.ot_multiplier_normal, "normal"),
    }
}

fn kind_component(kind: EarningKind) -> PayComponent {
    match kind {
        EarningKind::Allowance => PayComponent::Allowance,
        EarningKind::Incentive => PayComponent::Incentive,
        EarningKind::Commission => PayComponent::Commission,
        EarningKind::Claim => PayComponent::Claim,
    }
}

/// Composes the gross pay line for one employee and month.
///
/// Full-time pay starts from the monthly basic, pro-rated over the
/// employed stretch by working days; unpaid absence deducts at the daily
/// rate. Part-time pay is strictly hours worked times the hourly rate,
/// with the public-holiday premium added for worked holidays that carry
/// extra pay. Overtime pays only where it was approved, at the multiplier
/// of the day's classification. Only APPROVED day records contribute.
///
/// # Arguments
///
/// * `input` - The employee's month; see [`EarningsInput`]
///
/// # Returns
///
/// The composed [`GrossEarnings`] with itemised lines and statutory
/// bases.
pub fn compose_monthly(input: &EarningsInput<'_>) -> GrossEarnings {
    let mut earnings: Vec<PayLine> = Vec::new();
    let mut deductions: Vec<PayLine> = Vec::new();

    let employee = input.employee;
    let policy = input.policy;
    let rest_day = policy.weekly_rest_day;
    let holiday_dates: Vec<NaiveDate> = input.holidays.iter().map(|h| h.date).collect();
    let hourly_rate = employee.hourly_rate();
    let stretch = employed_stretch(employee, input.period);

    let in_stretch = |date: NaiveDate| stretch.is_some_and(|(from, to)| date >= from && date <= to);
    let approved_days = || {
        input
            .records
            .iter()
            .filter(|r| r.record_status == RecordStatus::Approved && in_stretch(r.work_date))
    };

    // basic pay and unpaid absence
    let mut basic_amount = Decimal::ZERO;
    let mut absence_amount = Decimal::ZERO;
    match employee.work_type {
        WorkType::FullTime => {
            if let Some((from, to)) = stretch {
                basic_amount = prorate_basic(
                    employee.basic_salary,
                    from,
                    to,
                    input.period,
                    rest_day,
                    &holiday_dates,
                );
                let full_month = (from, to) == input.period.bounds().unwrap_or((from, to));
                earnings.push(PayLine::flat(
                    PayComponent::Basic,
                    if full_month {
                        "Basic pay"
                    } else {
                        "Basic pay (pro-rated)"
                    },
                    basic_amount,
                ));

                let days_in_month = working_days_in_month(input.period, rest_day, &holiday_dates);
                let days_in_stretch = working_days_between(from, to, rest_day, &holiday_dates);
                let present = approved_days()
                    .filter(|r| {
                        r.total_work_minutes > 0
                            && is_working_day(r.work_date, rest_day, &holiday_dates)
                    })
                    .count() as u32;
                let covered = present + input.paid_leave_days + input.unpaid_leave_days;
                let absent = days_in_stretch.saturating_sub(covered);
                let deduction_days = absent + input.unpaid_leave_days;
                if deduction_days > 0 && days_in_month > 0 {
                    let daily = employee.basic_salary / Decimal::from(days_in_month);
                    absence_amount = round_cents(daily * Decimal::from(deduction_days));
                    deductions.push(PayLine {
                        component: PayComponent::AbsenceDeduction,
                        description: "Unpaid absence".to_string(),
                        quantity: Decimal::from(deduction_days),
                        rate: round_cents(daily),
                        amount: absence_amount,
                    });
                }
            }
        }
        WorkType::PartTime => {
            let minutes: u32 = approved_days().map(|r| r.total_work_minutes).sum();
            if minutes > 0 {
                let hours = Decimal::from(minutes) / MINUTES_PER_HOUR;
                basic_amount = round_cents(hours * hourly_rate);
                earnings.push(PayLine {
                    component: PayComponent::Basic,
                    description: "Hours worked".to_string(),
                    quantity: hours,
                    rate: hourly_rate,
                    amount: basic_amount,
                });
            }
        }
    }

    // approved overtime, one line per day classification
    let mut ot_total = Decimal::ZERO;
    let mut ot_minutes_by_class: [(Decimal, &'static str, u32); 3] = [
        (policy.ot_multiplier_normal, "normal", 0),
        (policy.ot_multiplier_rest_day, "rest day", 0),
        (policy.ot_multiplier_public_holiday, "public holiday", 0),
    ];
    for record in approved_days() {
        let minutes = payable_ot_minutes(record);
        if minutes == 0 {
            continue;
        }
        let (_, label) = ot_multiplier(policy, record.attendance_status);
        if let Some(slot) = ot_minutes_by_class.iter_mut().find(|(_, l, _)| *l == label) {
            slot.2 += minutes;
        }
    }
    for (multiplier, label, minutes) in ot_minutes_by_class {
        if minutes == 0 {
            continue;
        }
        let hours = Decimal::from(minutes) / MINUTES_PER_HOUR;
        let rate = hourly_rate * multiplier;
        let amount = round_cents(hours * rate);
        ot_total += amount;
        earnings.push(PayLine {
            component: PayComponent::Overtime,
            description: format!("Overtime ({label})"),
            quantity: hours,
            rate,
            amount,
        });
    }

    // part-time premium for worked public holidays flagged extra_pay
    let mut holiday_pay_total = Decimal::ZERO;
    if employee.work_type == WorkType::PartTime {
        let premium = policy.public_holiday_multiplier - Decimal::ONE;
        let minutes: u32 = approved_days()
            .filter(|r| {
                r.attendance_status == AttendanceStatus::Holiday
                    && r.total_work_minutes > 0
                    && input
                        .holidays
                        .iter()
                        .any(|h| h.date == r.work_date && h.extra_pay)
            })
            .map(|r| r.total_work_minutes)
            .sum();
        if minutes > 0 && premium > Decimal::ZERO {
            let hours = Decimal::from(minutes) / MINUTES_PER_HOUR;
            let rate = hourly_rate * premium;
            holiday_pay_total = round_cents(hours * rate);
            earnings.push(PayLine {
                component: PayComponent::HolidayPay,
                description: "Public holiday extra pay".to_string(),
                quantity: hours,
                rate,
                amount: holiday_pay_total,
            });
        }
    }

    // variable earnings claimed against the month
    let mut taxable_allowances = Decimal::ZERO;
    let mut taxable_incentives = Decimal::ZERO;
    let mut taxable_commissions = Decimal::ZERO;
    for assignment in input.assignments {
        if assignment.employee_id != employee.id {
            continue;
        }
        let payable = match input.run_id {
            Some(run_id) => assignment.payable_for_run(input.period, run_id),
            None => assignment.payable_in(input.period),
        };
        if !payable {
            continue;
        }
        let amount = round_cents(assignment.amount);
        earnings.push(PayLine::flat(
            kind_component(assignment.kind),
            assignment.description.clone(),
            amount,
        ));
        if assignment.taxable {
            match assignment.kind {
                EarningKind::Allowance => taxable_allowances += amount,
                EarningKind::Incentive => taxable_incentives += amount,
                EarningKind::Commission => taxable_commissions += amount,
                EarningKind::Claim => {}
            }
        }
    }

    let gross = earnings.iter().map(|line| line.amount).sum();

    // statutory bases under the tenant inclusion flags
    let flags = &policy.statutory_base;
    let basic_net = (basic_amount - absence_amount).max(Decimal::ZERO);
    let flagged_allowances = if flags.include_allowances {
        taxable_allowances
    } else {
        Decimal::ZERO
    };
    let mut contribution = basic_net + flagged_allowances;
    if flags.include_overtime {
        contribution += ot_total;
    }
    if flags.include_holiday_pay {
        contribution += holiday_pay_total;
    }
    if flags.include_incentives {
        contribution += taxable_incentives;
    }
    if flags.include_commissions {
        contribution += taxable_commissions;
    }

    let (pcb_regular, pcb_additional) = match employee.pcb_treatment {
        PcbTreatment::Normal => (contribution, Decimal::ZERO),
        PcbTreatment::Additional => (contribution - flagged_allowances, flagged_allowances),
        PcbTreatment::Excluded => (contribution - flagged_allowances, Decimal::ZERO),
    };

    GrossEarnings {
        earnings,
        deductions,
        gross,
        bases: StatutoryBases {
            contribution,
            pcb_regular,
            pcb_additional,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        AssignmentStatus, ClockEntry, EmploymentStatus, OtStatus, Role, StatutoryBaseFlags,
    };
    use chrono::{Datelike, NaiveTime, Utc};
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    const MARCH: PayrollPeriod = PayrollPeriod {
        year: 2026,
        month: 3,
    };

    fn employee() -> Employee {
        Employee {
            id: Uuid::from_u128(1),
            tenant_id: Uuid::from_u128(2),
            grouping_id: Uuid::from_u128(3),
            full_name: "Hafiz Rahman".to_string(),
            basic_salary: dec("2600"),
            work_type: WorkType::FullTime,
            employment_status: EmploymentStatus::Confirmed,
            role: Role::Staff,
            hire_date: date(2020, 1, 1),
            date_of_birth: date(1994, 6, 1),
            is_foreign_worker: false,
            hourly_rate_override: None,
            pcb_treatment: PcbTreatment::Normal,
            has_non_working_spouse: false,
            child_count: 0,
            notice_date: None,
            last_working_day: None,
        }
    }

    fn approved_record(work_date: NaiveDate, work: u32) -> DayRecord {
        let mut record = DayRecord::new(Uuid::from_u128(1), Uuid::from_u128(2), work_date);
        record.clock_in_1 = Some(ClockEntry::at(NaiveTime::from_hms_opt(9, 0, 0).unwrap()));
        record.total_work_minutes = work;
        record.attendance_status = AttendanceStatus::Present;
        record.record_status = RecordStatus::Approved;
        record
    }

    /// Approved 480-minute records on every working day of March 2026
    /// (Sunday rest, no holidays unless `skip` removes days).
    fn full_march(skip: &[NaiveDate]) -> Vec<DayRecord> {
        let mut records = Vec::new();
        let mut d = date(2026, 3, 1);
        while d.month() == 3 {
            if d.weekday() != chrono::Weekday::Sun && !skip.contains(&d) {
                records.push(approved_record(d, 480));
            }
            d = d.succ_opt().unwrap();
        }
        records
    }

    fn holiday(d: NaiveDate, extra_pay: bool) -> PublicHoliday {
        PublicHoliday {
            id: Uuid::new_v4(),
            tenant_id: Uuid::from_u128(2),
            date: d,
            name: "Test holiday".to_string(),
            extra_pay,
        }
    }

    fn assignment(
        kind: EarningKind,
        description: &str,
        amount: &str,
        taxable: bool,
    ) -> EarningAssignment {
        EarningAssignment {
            id: Uuid::new_v4(),
            employee_id: Uuid::from_u128(1),
            kind,
            description: description.to_string(),
            amount: dec(amount),
            payroll_month: 3,
            payroll_year: 2026,
            status: AssignmentStatus::Approved,
            taxable,
            included_in_run: None,
            updated_at: Utc::now(),
        }
    }

    fn input<'a>(
        employee: &'a Employee,
        policy: &'a TenantPolicy,
        records: &'a [DayRecord],
        assignments: &'a [EarningAssignment],
        holidays: &'a [PublicHoliday],
    ) -> EarningsInput<'a> {
        EarningsInput {
            employee,
            period: MARCH,
            policy,
            records,
            assignments,
            holidays,
            paid_leave_days: 0,
            unpaid_leave_days: 0,
            run_id: None,
        }
    }

    fn line<'a>(lines: &'a [PayLine], component: PayComponent) -> &'a PayLine {
        lines
            .iter()
            .find(|l| l.component == component)
            .expect("expected pay line")
    }

    // ==========================================================================
    // EC-001: a fully present month pays the full basic
    // ==========================================================================
    #[test]
    fn test_ec_001_full_month_basic() {
        let emp = employee();
        let policy = TenantPolicy::default();
        let records = full_march(&[]);
        let out = compose_monthly(&input(&emp, &policy, &records, &[], &[]));

        assert_eq!(out.earnings.len(), 1);
        let basic = line(&out.earnings, PayComponent::Basic);
        assert_eq!(basic.description, "Basic pay");
        assert_eq!(basic.amount, dec("2600.00"));
        assert!(out.deductions.is_empty());
        assert_eq!(out.gross, dec("2600.00"));
        assert_eq!(out.bases.contribution, dec("2600.00"));
        assert_eq!(out.bases.pcb_regular, dec("2600.00"));
        assert_eq!(out.bases.pcb_additional, dec("0"));
    }

    // ==========================================================================
    // EC-002: approved overtime pays per day classification
    // ==========================================================================
    #[test]
    fn test_ec_002_overtime_classes() {
        let emp = employee(); // hourly rate 12.50
        let policy = TenantPolicy::default();
        let holidays = [holiday(date(2026, 3, 20), true)];

        let mut records = full_march(&[date(2026, 3, 10), date(2026, 3, 20)]);
        // weekday overtime
        let mut weekday = approved_record(date(2026, 3, 10), 570);
        weekday.ot_minutes = 90;
        weekday.ot_status = OtStatus::Approved;
        records.push(weekday);
        // rest-day overtime (2026-03-08 is a Sunday)
        let mut sunday = approved_record(date(2026, 3, 8), 540);
        sunday.attendance_status = AttendanceStatus::Rest;
        sunday.ot_minutes = 60;
        sunday.ot_status = OtStatus::Approved;
        records.push(sunday);
        // public-holiday overtime
        let mut ph = approved_record(date(2026, 3, 20), 600);
        ph.attendance_status = AttendanceStatus::Holiday;
        ph.ot_minutes = 120;
        ph.ot_status = OtStatus::Approved;
        records.push(ph);

        let out = compose_monthly(&input(&emp, &policy, &records, &[], &holidays));

        let ot_lines: Vec<&PayLine> = out
            .earnings
            .iter()
            .filter(|l| l.component == PayComponent::Overtime)
            .collect();
        assert_eq!(ot_lines.len(), 3);
        // 1.5h at 12.50 * 1.5 = 28.125 rounds half-up
        assert_eq!(ot_lines[0].description, "Overtime (normal)");
        assert_eq!(ot_lines[0].amount, dec("28.13"));
        // 1h at 12.50 * 2.0
        assert_eq!(ot_lines[1].description, "Overtime (rest day)");
        assert_eq!(ot_lines[1].amount, dec("25.00"));
        // 2h at 12.50 * 3.0
        assert_eq!(ot_lines[2].description, "Overtime (public holiday)");
        assert_eq!(ot_lines[2].amount, dec("75.00"));

        assert_eq!(out.gross, dec("2728.13"));
        // overtime is outside the base under the default flags
        assert_eq!(out.bases.contribution, dec("2600.00"));
    }

    // ==========================================================================
    // EC-003: pending or rejected overtime pays nothing
    // ==========================================================================
    #[test]
    fn test_ec_003_unapproved_ot_not_paid() {
        let emp = employee();
        let policy = TenantPolicy::default();
        let mut records = full_march(&[date(2026, 3, 10), date(2026, 3, 11)]);
        let mut pending = approved_record(date(2026, 3, 10), 570);
        pending.ot_minutes = 90;
        pending.ot_status = OtStatus::Pending;
        records.push(pending);
        let mut rejected = approved_record(date(2026, 3, 11), 570);
        rejected.ot_minutes = 90;
        rejected.ot_status = OtStatus::Rejected;
        records.push(rejected);

        let out = compose_monthly(&input(&emp, &policy, &records, &[], &[]));
        assert!(
            out.earnings
                .iter()
                .all(|l| l.component != PayComponent::Overtime)
        );
        assert_eq!(out.gross, dec("2600.00"));
    }

    // ==========================================================================
    // EC-004: mid-month hire prorates the basic by working days
    // ==========================================================================
    #[test]
    fn test_ec_004_mid_month_hire_prorates() {
        let mut emp = employee();
        emp.hire_date = date(2026, 3, 16);
        let policy = TenantPolicy::default();
        // working days before the hire date carry no records
        let skip: Vec<NaiveDate> = (1..16).map(|d| date(2026, 3, d)).collect();
        let records = full_march(&skip);

        let out = compose_monthly(&input(&emp, &policy, &records, &[], &[]));
        let basic = line(&out.earnings, PayComponent::Basic);
        assert_eq!(basic.description, "Basic pay (pro-rated)");
        // 14 of 26 working days
        assert_eq!(basic.amount, dec("1400.00"));
        assert!(out.deductions.is_empty());
    }

    // ==========================================================================
    // EC-005: unpaid absence deducts at the daily rate
    // ==========================================================================
    #[test]
    fn test_ec_005_absence_deduction() {
        let emp = employee();
        let policy = TenantPolicy::default();
        let records = full_march(&[date(2026, 3, 11), date(2026, 3, 12)]);

        let out = compose_monthly(&input(&emp, &policy, &records, &[], &[]));
        let deduction = line(&out.deductions, PayComponent::AbsenceDeduction);
        assert_eq!(deduction.quantity, dec("2"));
        assert_eq!(deduction.rate, dec("100.00"));
        assert_eq!(deduction.amount, dec("200.00"));
        // gross keeps the full basic; the base nets the absence off
        assert_eq!(out.gross, dec("2600.00"));
        assert_eq!(out.bases.contribution, dec("2400.00"));
    }

    // ==========================================================================
    // EC-006: leave days cover absence, unpaid leave still deducts
    // ==========================================================================
    #[test]
    fn test_ec_006_leave_cover_and_unpaid_leave() {
        let emp = employee();
        let policy = TenantPolicy::default();
        let records = full_march(&[date(2026, 3, 10), date(2026, 3, 11), date(2026, 3, 12)]);
        let mut inp = input(&emp, &policy, &records, &[], &[]);
        inp.paid_leave_days = 1;
        inp.unpaid_leave_days = 2;

        let out = compose_monthly(&inp);
        let deduction = line(&out.deductions, PayComponent::AbsenceDeduction);
        // nothing uncovered, but the two unpaid-leave days deduct
        assert_eq!(deduction.quantity, dec("2"));
        assert_eq!(deduction.amount, dec("200.00"));
    }

    // ==========================================================================
    // EC-007: a rejected day contributes nothing and counts as absence
    // ==========================================================================
    #[test]
    fn test_ec_007_rejected_day_counts_absent() {
        let emp = employee();
        let policy = TenantPolicy::default();
        let mut records = full_march(&[date(2026, 3, 10)]);
        let mut rejected = approved_record(date(2026, 3, 10), 480);
        rejected.record_status = RecordStatus::Rejected;
        records.push(rejected);

        let out = compose_monthly(&input(&emp, &policy, &records, &[], &[]));
        let deduction = line(&out.deductions, PayComponent::AbsenceDeduction);
        assert_eq!(deduction.quantity, dec("1"));
        assert_eq!(deduction.amount, dec("100.00"));
    }

    // ==========================================================================
    // EC-010: part-time pay is strictly hours times rate, plus PH premium
    // ==========================================================================
    #[test]
    fn test_ec_010_part_time_hours_and_ph_premium() {
        let mut emp = employee();
        emp.work_type = WorkType::PartTime;
        emp.hourly_rate_override = Some(dec("10.00"));
        let policy = TenantPolicy::default();
        let holidays = [holiday(date(2026, 3, 20), true)];

        // nine plain days and one worked public holiday, 360 minutes each
        let mut records: Vec<DayRecord> = (2..11)
            .map(|d| approved_record(date(2026, 3, d), 360))
            .collect();
        let mut ph = approved_record(date(2026, 3, 20), 360);
        ph.attendance_status = AttendanceStatus::Holiday;
        records.push(ph);

        let out = compose_monthly(&input(&emp, &policy, &records, &[], &holidays));

        let basic = line(&out.earnings, PayComponent::Basic);
        assert_eq!(basic.description, "Hours worked");
        assert_eq!(basic.quantity, dec("60"));
        assert_eq!(basic.amount, dec("600.00"));

        // 6 worked PH hours at 10.00 * (2.0 - 1)
        let premium = line(&out.earnings, PayComponent::HolidayPay);
        assert_eq!(premium.amount, dec("60.00"));

        assert!(out.deductions.is_empty());
        assert_eq!(out.gross, dec("660.00"));
        // holiday pay is outside the base under the default flags
        assert_eq!(out.bases.contribution, dec("600.00"));
    }

    // ==========================================================================
    // EC-011: a PH without extra_pay earns no part-time premium
    // ==========================================================================
    #[test]
    fn test_ec_011_ph_without_extra_pay() {
        let mut emp = employee();
        emp.work_type = WorkType::PartTime;
        emp.hourly_rate_override = Some(dec("10.00"));
        let policy = TenantPolicy::default();
        let holidays = [holiday(date(2026, 3, 20), false)];

        let mut ph = approved_record(date(2026, 3, 20), 360);
        ph.attendance_status = AttendanceStatus::Holiday;
        let records = vec![ph];

        let out = compose_monthly(&input(&emp, &policy, &records, &[], &holidays));
        assert!(
            out.earnings
                .iter()
                .all(|l| l.component != PayComponent::HolidayPay)
        );
        assert_eq!(out.gross, dec("60.00"));
    }

    // ==========================================================================
    // EC-012: assignments itemise and feed the bases by kind and taxability
    // ==========================================================================
    #[test]
    fn test_ec_012_assignments_and_bases() {
        let emp = employee();
        let policy = TenantPolicy::default();
        let records = full_march(&[]);
        let mut late = assignment(EarningKind::Allowance, "April allowance", "999", true);
        late.payroll_month = 4;
        let mut pending = assignment(EarningKind::Commission, "Pending commission", "999", true);
        pending.status = AssignmentStatus::Pending;
        let assignments = [
            assignment(EarningKind::Allowance, "Meal allowance", "300", true),
            assignment(EarningKind::Allowance, "Phone reimbursement", "150", false),
            assignment(EarningKind::Commission, "March sales", "500", true),
            assignment(EarningKind::Incentive, "Target incentive", "200", true),
            assignment(EarningKind::Claim, "Travel claim", "120.50", false),
            late,
            pending,
        ];

        let out = compose_monthly(&input(&emp, &policy, &records, &assignments, &[]));

        assert_eq!(out.gross, dec("3870.50"));
        // 2600 basic + 300 taxable allowance + 500 commission + 200 incentive
        assert_eq!(out.bases.contribution, dec("3600.00"));
        assert_eq!(out.bases.pcb_regular, dec("3600.00"));
        assert_eq!(out.bases.pcb_additional, dec("0"));
    }

    // ==========================================================================
    // EC-013: the per-employee PCB override reroutes flagged allowances
    // ==========================================================================
    #[test]
    fn test_ec_013_pcb_override() {
        let policy = TenantPolicy::default();
        let records = full_march(&[]);
        let assignments = [assignment(EarningKind::Allowance, "Meal allowance", "300", true)];

        let mut emp = employee();
        emp.pcb_treatment = PcbTreatment::Additional;
        let out = compose_monthly(&input(&emp, &policy, &records, &assignments, &[]));
        assert_eq!(out.bases.contribution, dec("2900.00"));
        assert_eq!(out.bases.pcb_regular, dec("2600.00"));
        assert_eq!(out.bases.pcb_additional, dec("300.00"));

        emp.pcb_treatment = PcbTreatment::Excluded;
        let out = compose_monthly(&input(&emp, &policy, &records, &assignments, &[]));
        assert_eq!(out.bases.pcb_regular, dec("2600.00"));
        assert_eq!(out.bases.pcb_additional, dec("0"));
    }

    // ==========================================================================
    // EC-014: tenant flags gate what joins the contribution base
    // ==========================================================================
    #[test]
    fn test_ec_014_base_flags() {
        let emp = employee();
        let mut policy = TenantPolicy::default();
        policy.statutory_base = StatutoryBaseFlags {
            include_allowances: false,
            include_overtime: true,
            include_holiday_pay: false,
            include_incentives: false,
            include_commissions: false,
        };
        let mut records = full_march(&[date(2026, 3, 10)]);
        let mut ot_day = approved_record(date(2026, 3, 10), 570);
        ot_day.ot_minutes = 90;
        ot_day.ot_status = OtStatus::Approved;
        records.push(ot_day);
        let assignments = [assignment(EarningKind::Allowance, "Meal allowance", "300", true)];

        let out = compose_monthly(&input(&emp, &policy, &records, &assignments, &[]));
        // basic 2600 + overtime 28.13; the allowance stays out
        assert_eq!(out.bases.contribution, dec("2628.13"));
    }

    // ==========================================================================
    // EC-015: recomputing a finalised run keeps its swept assignments
    // ==========================================================================
    #[test]
    fn test_ec_015_recompute_with_included_assignments() {
        let emp = employee();
        let policy = TenantPolicy::default();
        let records = full_march(&[]);
        let run = Uuid::from_u128(77);
        let mut swept = assignment(EarningKind::Commission, "March sales", "500", true);
        swept.status = AssignmentStatus::Included;
        swept.included_in_run = Some(run);
        let assignments = [swept];

        // without a run the included item is invisible
        let out = compose_monthly(&input(&emp, &policy, &records, &assignments, &[]));
        assert_eq!(out.gross, dec("2600.00"));

        // recomputing for its own run reproduces it
        let mut inp = input(&emp, &policy, &records, &assignments, &[]);
        inp.run_id = Some(run);
        let out = compose_monthly(&inp);
        assert_eq!(out.gross, dec("3100.00"));
    }

    // ==========================================================================
    // EC-016: employment that never overlaps the month composes nothing
    // ==========================================================================
    #[test]
    fn test_ec_016_no_overlap_composes_nothing() {
        let mut emp = employee();
        emp.hire_date = date(2026, 6, 1);
        let policy = TenantPolicy::default();
        let out = compose_monthly(&input(&emp, &policy, &[], &[], &[]));
        assert!(out.earnings.is_empty());
        assert_eq!(out.gross, dec("0"));
        assert_eq!(out.bases.contribution, dec("0"));
    }
}
