//! Minute-of-day arithmetic and overtime rounding.
//!
//! All attendance math runs on minutes within a 1440-minute day. Durations
//! are always measured forward from the earlier event to the later one, so
//! a span that crosses midnight never goes negative.

use chrono::{NaiveTime, Timelike};

use crate::models::{RoundingDirection, RoundingPolicy};

/// Minutes in a calendar day.
pub const MINUTES_PER_DAY: u32 = 1440;

/// Converts a wall-clock time to its minute of day in `[0, 1440)`.
///
/// Seconds are truncated; clock events are minute-granular.
pub fn minute_of_day(time: NaiveTime) -> u32 {
    time.hour() * 60 + time.minute()
}

/// Forward distance in minutes from `from` to `to` on the 1440-minute
/// clock face.
///
/// When `to` is numerically earlier than `from` the span is taken to
/// cross midnight.
///
/// # Examples
///
/// ```
/// use gaji_engine::calculation::diff_minutes;
///
/// // same-day span
/// assert_eq!(diff_minutes(9 * 60, 18 * 60), 540);
/// // crossing midnight: 22:00 -> 02:00
/// assert_eq!(diff_minutes(22 * 60, 2 * 60), 240);
/// ```
pub fn diff_minutes(from: u32, to: u32) -> u32 {
    (to + MINUTES_PER_DAY - from % MINUTES_PER_DAY) % MINUTES_PER_DAY
}

/// Forward distance in minutes between two wall-clock times.
pub fn diff(from: NaiveTime, to: NaiveTime) -> u32 {
    diff_minutes(minute_of_day(from), minute_of_day(to))
}

/// Rounds a raw minute count according to a rounding policy.
///
/// Rounding maps onto multiples of the policy granularity: `Down` to the
/// boundary below, `Up` to the boundary above, `Nearest` to the closer
/// boundary with ties rounding up. A value already on a boundary is
/// returned unchanged in every direction, which makes the function
/// idempotent.
///
/// # Arguments
///
/// * `raw_minutes` - The unrounded minute count
/// * `policy` - The tenant's granularity and direction
///
/// # Examples
///
/// ```
/// use gaji_engine::calculation::round_minutes;
/// use gaji_engine::models::{RoundingDirection, RoundingMethod, RoundingPolicy};
///
/// let policy = RoundingPolicy {
///     method: RoundingMethod::HalfHour,
///     direction: RoundingDirection::Nearest,
/// };
/// assert_eq!(round_minutes(75, &policy), 90);
/// assert_eq!(round_minutes(74, &policy), 60);
/// assert_eq!(round_minutes(90, &policy), 90);
/// ```
pub fn round_minutes(raw_minutes: u32, policy: &RoundingPolicy) -> u32 {
    let granularity = policy.method.granularity_minutes();
    if granularity <= 1 {
        return raw_minutes;
    }
    match policy.direction {
        RoundingDirection::Down => (raw_minutes / granularity) * granularity,
        RoundingDirection::Up => raw_minutes.div_ceil(granularity) * granularity,
        RoundingDirection::Nearest => {
            ((raw_minutes + granularity / 2) / granularity) * granularity
        }
    }
}

/// Applies the minimum-overtime gate and then rounds.
///
/// Raw overtime under `min_overtime_minutes` collapses to zero. Once the
/// gate is passed the full raw amount is rounded; the minimum is a gate,
/// not a deduction.
///
/// # Examples
///
/// ```
/// use gaji_engine::calculation::apply_ot_floor;
/// use gaji_engine::models::{RoundingDirection, RoundingMethod, RoundingPolicy};
///
/// let policy = RoundingPolicy {
///     method: RoundingMethod::HalfHour,
///     direction: RoundingDirection::Nearest,
/// };
/// // under the 60-minute gate: nothing counts
/// assert_eq!(apply_ot_floor(45, 60, &policy), 0);
/// // at the gate: the whole raw amount is rounded
/// assert_eq!(apply_ot_floor(75, 60, &policy), 90);
/// ```
pub fn apply_ot_floor(
    raw_ot_minutes: u32,
    min_overtime_minutes: u32,
    policy: &RoundingPolicy,
) -> u32 {
    if raw_ot_minutes < min_overtime_minutes {
        return 0;
    }
    round_minutes(raw_ot_minutes, policy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RoundingMethod;

    fn policy(method: RoundingMethod, direction: RoundingDirection) -> RoundingPolicy {
        RoundingPolicy { method, direction }
    }

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    // ==========================================================================
    // TM-001: same-day spans
    // ==========================================================================
    #[test]
    fn test_tm_001_same_day_spans() {
        assert_eq!(diff(time(9, 0), time(18, 0)), 540);
        assert_eq!(diff(time(13, 0), time(13, 30)), 30);
        assert_eq!(diff(time(0, 0), time(0, 0)), 0);
    }

    // ==========================================================================
    // TM-002: spans crossing midnight are measured forward
    // ==========================================================================
    #[test]
    fn test_tm_002_cross_midnight_spans() {
        assert_eq!(diff(time(22, 0), time(2, 0)), 240);
        assert_eq!(diff(time(23, 59), time(0, 1)), 2);
        assert_eq!(diff(time(10, 12), time(1, 31)), 919);
    }

    // ==========================================================================
    // TM-003: seconds are truncated to minute granularity
    // ==========================================================================
    #[test]
    fn test_tm_003_seconds_truncated() {
        let with_seconds = NaiveTime::from_hms_opt(9, 15, 59).unwrap();
        assert_eq!(minute_of_day(with_seconds), 9 * 60 + 15);
    }

    // ==========================================================================
    // TM-010: nearest rounding with ties up
    // ==========================================================================
    #[test]
    fn test_tm_010_nearest_rounding_ties_up() {
        let p = policy(RoundingMethod::HalfHour, RoundingDirection::Nearest);
        assert_eq!(round_minutes(74, &p), 60);
        assert_eq!(round_minutes(75, &p), 90); // exact midpoint rounds up
        assert_eq!(round_minutes(76, &p), 90);

        let p = policy(RoundingMethod::QuarterHour, RoundingDirection::Nearest);
        assert_eq!(round_minutes(7, &p), 0);
        assert_eq!(round_minutes(8, &p), 15);
    }

    // ==========================================================================
    // TM-011: down and up rounding
    // ==========================================================================
    #[test]
    fn test_tm_011_down_and_up_rounding() {
        let down = policy(RoundingMethod::Hour, RoundingDirection::Down);
        assert_eq!(round_minutes(119, &down), 60);
        assert_eq!(round_minutes(60, &down), 60);

        let up = policy(RoundingMethod::Hour, RoundingDirection::Up);
        assert_eq!(round_minutes(61, &up), 120);
        assert_eq!(round_minutes(60, &up), 60);
    }

    // ==========================================================================
    // TM-012: minute granularity is a no-op
    // ==========================================================================
    #[test]
    fn test_tm_012_minute_granularity_no_op() {
        let p = policy(RoundingMethod::Minute, RoundingDirection::Up);
        assert_eq!(round_minutes(7, &p), 7);
        assert_eq!(round_minutes(0, &p), 0);
    }

    // ==========================================================================
    // TM-013: rounding is idempotent for every method and direction
    // ==========================================================================
    #[test]
    fn test_tm_013_rounding_idempotent() {
        let methods = [
            RoundingMethod::Minute,
            RoundingMethod::QuarterHour,
            RoundingMethod::HalfHour,
            RoundingMethod::Hour,
        ];
        let directions = [
            RoundingDirection::Nearest,
            RoundingDirection::Down,
            RoundingDirection::Up,
        ];
        for method in methods {
            for direction in directions {
                let p = policy(method, direction);
                for raw in [0_u32, 1, 7, 59, 60, 89, 90, 240, 1439] {
                    let once = round_minutes(raw, &p);
                    assert_eq!(
                        round_minutes(once, &p),
                        once,
                        "method {method:?} dir {direction:?} raw {raw}"
                    );
                }
            }
        }
    }

    // ==========================================================================
    // TM-020: the overtime gate zeroes short raw overtime
    // ==========================================================================
    #[test]
    fn test_tm_020_ot_gate_below_minimum() {
        let p = policy(RoundingMethod::HalfHour, RoundingDirection::Nearest);
        assert_eq!(apply_ot_floor(0, 60, &p), 0);
        assert_eq!(apply_ot_floor(59, 60, &p), 0);
    }

    // ==========================================================================
    // TM-021: at or past the gate the full raw value is rounded
    // ==========================================================================
    #[test]
    fn test_tm_021_ot_gate_at_and_past_minimum() {
        let p = policy(RoundingMethod::HalfHour, RoundingDirection::Nearest);
        assert_eq!(apply_ot_floor(60, 60, &p), 60);
        assert_eq!(apply_ot_floor(90, 60, &p), 90);
        assert_eq!(apply_ot_floor(75, 60, &p), 90);
    }

    // ==========================================================================
    // TM-022: down-rounding can land below the gate once passed
    // ==========================================================================
    #[test]
    fn test_tm_022_down_rounding_after_gate() {
        let p = policy(RoundingMethod::Hour, RoundingDirection::Down);
        // 70 raw >= 60 gate, then rounds down to 60
        assert_eq!(apply_ot_floor(70, 60, &p), 60);
        // 379 raw with 30-min down -> 360
        let p = policy(RoundingMethod::HalfHour, RoundingDirection::Down);
        assert_eq!(apply_ot_floor(379, 60, &p), 360);
    }

    #[test]
    fn test_zero_minimum_counts_everything() {
        let p = policy(RoundingMethod::Minute, RoundingDirection::Nearest);
        assert_eq!(apply_ot_floor(1, 0, &p), 1);
    }

    #[test]
    fn test_diff_minutes_handles_full_day_wrap() {
        assert_eq!(diff_minutes(0, 1439), 1439);
        assert_eq!(diff_minutes(1439, 0), 1);
    }
}
