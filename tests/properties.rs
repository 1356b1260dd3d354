//! Property-based checks over the pure calculation core.
//!
//! Covered invariants:
//! - Closed clock patterns conserve the measured span
//! - Overtime honours the minimum gate and the rounding granularity
//! - Part-time work never accrues overtime
//! - Rounding lands on block boundaries and re-rounding is a fixed point
//! - The auto-closure sweep is idempotent and never awards overtime
//! - Working-day counts partition exactly and full months prorate whole
//! - Leave encashment stays within the available balance and its cap
//! - Statutory notice bands never shorten with tenure

use chrono::{NaiveDate, NaiveTime, Utc, Weekday};
use proptest::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

use gaji_engine::calculation::{
    ClockPattern, DayContext, MINUTES_PER_DAY, close_abandoned_record, diff, diff_minutes,
    measure_pattern, overtime_minutes, prorate_basic, required_notice_days, resolve_entitlement,
    round_minutes, working_days_between, working_days_in_month,
};
use gaji_engine::models::{
    CarryForwardPolicy, ClockEntry, DayRecord, Employee, EmploymentStatus, LeaveBalance,
    LeaveRequest, LeaveRequestStatus, LeaveType, OtStatus, PayrollPeriod, PcbTreatment,
    RecordStatus, Role, RoundingDirection, RoundingMethod, RoundingPolicy, ScheduledShift,
    TenantPolicy, WorkType,
};

// =============================================================================
// Fixtures and strategies
// =============================================================================

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Wall-clock time at an absolute minute offset, wrapping past midnight.
fn minute_time(minute: u32) -> NaiveTime {
    let m = minute % MINUTES_PER_DAY;
    NaiveTime::from_hms_opt(m / 60, m % 60, 0).unwrap()
}

fn policy(
    standard: u32,
    gate: u32,
    method: RoundingMethod,
    direction: RoundingDirection,
) -> TenantPolicy {
    TenantPolicy {
        standard_daily_minutes: standard,
        min_overtime_minutes: gate,
        ot_rounding: RoundingPolicy { method, direction },
        ..TenantPolicy::default()
    }
}

fn day_shift(work_date: NaiveDate) -> ScheduledShift {
    ScheduledShift {
        id: Uuid::from_u128(10),
        employee_id: Uuid::from_u128(1),
        date: work_date,
        shift_start: minute_time(9 * 60),
        shift_end: minute_time(18 * 60),
        break_minutes: 60,
        is_off: false,
        template_id: None,
    }
}

fn employee_hired(hire: NaiveDate) -> Employee {
    Employee {
        id: Uuid::from_u128(1),
        tenant_id: Uuid::from_u128(2),
        grouping_id: Uuid::from_u128(3),
        full_name: "Aina Zulkifli".to_string(),
        basic_salary: Decimal::from(2600),
        work_type: WorkType::FullTime,
        employment_status: EmploymentStatus::Confirmed,
        role: Role::Staff,
        hire_date: hire,
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

fn encashable_leave(annual: u32, cap: Option<u32>) -> LeaveType {
    LeaveType {
        id: Uuid::from_u128(40),
        tenant_id: Uuid::from_u128(2),
        code: "AL".to_string(),
        name: "Annual Leave".to_string(),
        annual_entitlement_days: Decimal::from(annual),
        is_paid: true,
        encashable_on_exit: true,
        encashment_cap_days: cap.map(Decimal::from),
        carry_forward: CarryForwardPolicy::Unlimited,
    }
}

fn request(status: LeaveRequestStatus, start: NaiveDate, days: u32) -> LeaveRequest {
    LeaveRequest {
        id: Uuid::new_v4(),
        employee_id: Uuid::from_u128(1),
        leave_type_id: Uuid::from_u128(40),
        start_date: start,
        end_date: start,
        days: Decimal::from(days),
        status,
        reason: None,
        updated_at: Utc::now(),
    }
}

fn arb_method() -> impl Strategy<Value = RoundingMethod> {
    prop_oneof![
        Just(RoundingMethod::Minute),
        Just(RoundingMethod::QuarterHour),
        Just(RoundingMethod::HalfHour),
        Just(RoundingMethod::Hour),
    ]
}

fn arb_direction() -> impl Strategy<Value = RoundingDirection> {
    prop_oneof![
        Just(RoundingDirection::Nearest),
        Just(RoundingDirection::Down),
        Just(RoundingDirection::Up),
    ]
}

fn arb_rest_day() -> impl Strategy<Value = Weekday> {
    prop_oneof![
        Just(Weekday::Mon),
        Just(Weekday::Tue),
        Just(Weekday::Wed),
        Just(Weekday::Thu),
        Just(Weekday::Fri),
        Just(Weekday::Sat),
        Just(Weekday::Sun),
    ]
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    /// A full day conserves minutes: both sessions plus the measured break
    /// always equal the span from first clock-in to final clock-out,
    /// wherever the day starts and even across midnight.
    #[test]
    fn prop_full_pattern_conserves_the_span(
        start in 0u32..1440,
        session_1 in 1u32..=300,
        break_len in 1u32..=120,
        session_2 in 1u32..=300,
    ) {
        let in_1 = minute_time(start);
        let out_1 = minute_time(start + session_1);
        let in_2 = minute_time(start + session_1 + break_len);
        let out_2 = minute_time(start + session_1 + break_len + session_2);
        let pattern = ClockPattern::Full { in_1, out_1, in_2, out_2 };

        let (work, break_minutes) = measure_pattern(&pattern, 0);
        prop_assert_eq!(work, session_1 + session_2);
        prop_assert_eq!(break_minutes, break_len);
        prop_assert_eq!(work + break_minutes, diff(in_1, out_2));
    }

    /// A no-break day splits its span exactly between work and the
    /// scheduled break, never inventing or losing a minute.
    #[test]
    fn prop_no_break_pattern_conserves_the_span(
        start in 0u32..1440,
        span in 1u32..1440,
        scheduled_break in 0u32..=240,
    ) {
        let in_1 = minute_time(start);
        let out_2 = minute_time(start + span);
        let pattern = ClockPattern::NoBreak { in_1, out_2 };

        let (work, break_minutes) = measure_pattern(&pattern, scheduled_break);
        prop_assert_eq!(break_minutes, scheduled_break.min(span));
        prop_assert_eq!(work + break_minutes, span);
    }

    /// Forward clock distance wraps consistently: going there and back
    /// covers a whole day unless the two times coincide.
    #[test]
    fn prop_clock_distance_wraps_a_whole_day(a in 0u32..1440, b in 0u32..1440) {
        let forward = diff_minutes(a, b);
        let back = diff_minutes(b, a);
        prop_assert!(forward < MINUTES_PER_DAY);
        if a == b {
            prop_assert_eq!(forward, 0);
        } else {
            prop_assert_eq!(forward + back, MINUTES_PER_DAY);
        }
    }

    /// Overtime is zero below the minimum gate, always lands on a
    /// granularity boundary, and rounding moves it less than one block
    /// away from the raw figure.
    #[test]
    fn prop_overtime_honours_gate_and_granularity(
        work in 0u32..=1440,
        standard in 240u32..=720,
        gate in 0u32..=120,
        method in arb_method(),
        direction in arb_direction(),
    ) {
        let p = policy(standard, gate, method, direction);
        let (raw, ot) = overtime_minutes(work, WorkType::FullTime, &p);
        let block = method.granularity_minutes();

        prop_assert_eq!(raw, work.saturating_sub(standard));
        prop_assert!(ot == 0 || raw >= gate);
        prop_assert_eq!(ot % block, 0);
        if ot > 0 {
            prop_assert!(ot.abs_diff(raw) < block);
        }
    }

    /// Part-time work never produces overtime, whatever the policy says.
    #[test]
    fn prop_part_time_never_accrues_overtime(
        work in 0u32..=1440,
        standard in 240u32..=720,
        gate in 0u32..=120,
        method in arb_method(),
        direction in arb_direction(),
    ) {
        let p = policy(standard, gate, method, direction);
        prop_assert_eq!(overtime_minutes(work, WorkType::PartTime, &p), (0, 0));
    }

    /// Rounded minutes sit on a block boundary within one block of the raw
    /// value, re-rounding is a fixed point, and the direction is honoured.
    #[test]
    fn prop_rounding_stays_within_one_block(
        raw in 0u32..=2000,
        method in arb_method(),
        direction in arb_direction(),
    ) {
        let p = RoundingPolicy { method, direction };
        let rounded = round_minutes(raw, &p);
        let block = method.granularity_minutes();

        prop_assert_eq!(rounded % block, 0);
        prop_assert!(rounded.abs_diff(raw) < block);
        prop_assert_eq!(round_minutes(rounded, &p), rounded);
        match direction {
            RoundingDirection::Down => prop_assert!(rounded <= raw),
            RoundingDirection::Up => prop_assert!(rounded >= raw),
            RoundingDirection::Nearest => {}
        }
    }

    /// The nightly sweep closes an abandoned clock-in exactly once: the
    /// closed day carries no overtime, never exceeds the standard day and
    /// a second sweep pass is a no-op.
    #[test]
    fn prop_sweep_closure_is_idempotent(
        clock_in in 0u32..1440,
        scheduled in any::<bool>(),
        standard in 240u32..=600,
    ) {
        let p = TenantPolicy {
            standard_daily_minutes: standard,
            ..TenantPolicy::default()
        };
        let work_date = date(2026, 3, 9);
        let shift = scheduled.then(|| day_shift(work_date));
        let mut record = DayRecord::new(Uuid::from_u128(1), Uuid::from_u128(2), work_date);
        record.clock_in_1 = Some(ClockEntry::at(minute_time(clock_in)));
        let ctx = DayContext::default();

        let closed =
            close_abandoned_record(&mut record, shift.as_ref(), WorkType::FullTime, &p, &ctx);
        prop_assert!(closed);
        prop_assert_eq!(record.record_status, RecordStatus::AutoClosed);
        prop_assert_eq!(record.ot_minutes, 0);
        prop_assert_eq!(record.ot_status, OtStatus::None);
        prop_assert!(record.auto_closed && record.needs_review);
        prop_assert!(record.total_work_minutes <= standard);

        let frozen = record.clone();
        let reclosed =
            close_abandoned_record(&mut record, shift.as_ref(), WorkType::FullTime, &p, &ctx);
        prop_assert!(!reclosed);
        prop_assert_eq!(record, frozen);
    }

    /// Splitting a month at any day partitions its working days without
    /// loss, whichever weekday is the rest day.
    #[test]
    fn prop_working_days_partition_exactly(
        year in 2024i32..=2027,
        month in 1u32..=12,
        split_day in 1u32..=27,
        rest_day in arb_rest_day(),
    ) {
        let period = PayrollPeriod { year, month };
        let (first, last) = period.bounds().unwrap();
        let split = date(year, month, split_day);

        let left = working_days_between(first, split, rest_day, &[]);
        let right = working_days_between(split.succ_opt().unwrap(), last, rest_day, &[]);
        prop_assert_eq!(left + right, working_days_in_month(period, rest_day, &[]));
    }

    /// Working the whole month prorates to exactly the full basic salary.
    #[test]
    fn prop_full_month_prorates_to_full_basic(
        year in 2024i32..=2027,
        month in 1u32..=12,
        basic in 1200u32..=20000,
        rest_day in arb_rest_day(),
    ) {
        let period = PayrollPeriod { year, month };
        let (first, last) = period.bounds().unwrap();
        let basic = Decimal::from(basic);
        prop_assert_eq!(prorate_basic(basic, first, last, period, rest_day, &[]), basic);
    }

    /// Encashable days never go negative, never exceed what is actually
    /// available and respect the encashment cap.
    #[test]
    fn prop_encashable_days_stay_within_bounds(
        annual in 0u32..=30,
        carried in 0u32..=15,
        adjustment in -10i32..=10,
        approved in 0u32..=40,
        pending in 0u32..=10,
        cap in proptest::option::of(0u32..=10),
    ) {
        let employee = employee_hired(date(2020, 6, 1));
        let leave_type = encashable_leave(annual, cap);
        let mut balance =
            LeaveBalance::open(employee.id, leave_type.id, 2026, Decimal::from(annual));
        balance.carried_forward = Decimal::from(carried);
        balance.adjustment_days = Decimal::from(adjustment);
        let requests = vec![
            request(LeaveRequestStatus::Approved, date(2026, 2, 2), approved),
            request(LeaveRequestStatus::Pending, date(2026, 9, 7), pending),
        ];

        let entitlement = resolve_entitlement(
            &employee,
            &leave_type,
            Some(&balance),
            &requests,
            date(2026, 8, 22),
        );

        prop_assert_eq!(
            entitlement.available,
            entitlement.total_entitlement
                - entitlement.ytd_taken
                - entitlement.future_taken
                - entitlement.pending
        );
        prop_assert!(entitlement.advance_used >= Decimal::ZERO);
        prop_assert!(entitlement.encashable_days >= Decimal::ZERO);
        prop_assert!(entitlement.encashable_days <= entitlement.available.max(Decimal::ZERO));
        if let Some(c) = cap {
            prop_assert!(entitlement.encashable_days <= Decimal::from(c));
        }
    }

    /// Statutory notice sits in one of the three tenure bands and never
    /// shortens as tenure grows.
    #[test]
    fn prop_notice_bands_never_shorten(tenure_months in 0u32..=240) {
        let required = required_notice_days(tenure_months);
        prop_assert!([28, 42, 56].contains(&required));
        prop_assert!(required <= required_notice_days(tenure_months + 1));
    }
}
