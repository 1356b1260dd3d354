//! Scheduled shifts, weekly templates and public holidays.
//!
//! Schedules drive attendance-status resolution, part-time auto-closure
//! caps and working-day counts. Shifts are generated from weekly templates
//! but can also be placed individually.

use chrono::{Datelike, NaiveDate, NaiveTime, Timelike, Weekday};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A planned shift for one employee on one date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledShift {
    /// Unique identifier for the shift row.
    pub id: Uuid,
    /// The employee the shift belongs to.
    pub employee_id: Uuid,
    /// The date of the shift.
    pub date: NaiveDate,
    /// Shift start time.
    pub shift_start: NaiveTime,
    /// Shift end time. An end at or before the start means the shift runs
    /// past midnight into the next calendar day.
    pub shift_end: NaiveTime,
    /// Unpaid break minutes planned within the shift.
    pub break_minutes: u32,
    /// Marks a rostered day off; start and end are ignored.
    pub is_off: bool,
    /// The weekly template this shift was generated from, if any.
    pub template_id: Option<Uuid>,
}

impl ScheduledShift {
    /// Whether the shift crosses midnight.
    pub fn is_overnight(&self) -> bool {
        !self.is_off && self.shift_end <= self.shift_start
    }

    /// Planned minutes between start and end, measured forward across
    /// midnight when the shift is overnight.
    pub fn span_minutes(&self) -> u32 {
        if self.is_off {
            return 0;
        }
        let start = self.shift_start.hour() * 60 + self.shift_start.minute();
        let end = self.shift_end.hour() * 60 + self.shift_end.minute();
        (end + 1440 - start) % 1440
    }

    /// Planned working minutes: the span net of the planned break.
    pub fn scheduled_minutes(&self) -> u32 {
        self.span_minutes().saturating_sub(self.break_minutes)
    }
}

/// A weekly roster template from which shifts are generated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShiftTemplate {
    /// Unique identifier for the template.
    pub id: Uuid,
    /// The tenant the template belongs to.
    pub tenant_id: Uuid,
    /// Display name, e.g. "Morning crew".
    pub name: String,
    /// Shift start time.
    pub shift_start: NaiveTime,
    /// Shift end time.
    pub shift_end: NaiveTime,
    /// Unpaid break minutes per shift.
    pub break_minutes: u32,
    /// Weekdays the template applies to.
    pub workdays: Vec<Weekday>,
}

impl ShiftTemplate {
    /// Generates concrete shifts for one employee across an inclusive date
    /// range. Days not named in `workdays` become rostered days off so the
    /// roster covers every calendar day.
    pub fn materialise(
        &self,
        employee_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Vec<ScheduledShift> {
        let mut shifts = Vec::new();
        let mut date = from;
        while date <= to {
            let working = self.workdays.contains(&date.weekday());
            shifts.push(ScheduledShift {
                id: Uuid::new_v4(),
                employee_id,
                date,
                shift_start: self.shift_start,
                shift_end: self.shift_end,
                break_minutes: self.break_minutes,
                is_off: !working,
                template_id: Some(self.id),
            });
            match date.succ_opt() {
                Some(next) => date = next,
                None => break,
            }
        }
        shifts
    }
}

/// A gazetted public holiday observed by a tenant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicHoliday {
    /// Unique identifier for the holiday row.
    pub id: Uuid,
    /// The tenant observing the holiday.
    pub tenant_id: Uuid,
    /// The holiday date.
    pub date: NaiveDate,
    /// Display name, e.g. "Hari Merdeka".
    pub name: String,
    /// Whether work on this holiday attracts extra pay.
    pub extra_pay: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn day_shift() -> ScheduledShift {
        ScheduledShift {
            id: Uuid::from_u128(10),
            employee_id: Uuid::from_u128(1),
            date: NaiveDate::from_ymd_opt(2026, 3, 9).unwrap(),
            shift_start: time(9, 0),
            shift_end: time(18, 0),
            break_minutes: 60,
            is_off: false,
            template_id: None,
        }
    }

    #[test]
    fn test_day_shift_span_and_scheduled_minutes() {
        let shift = day_shift();
        assert!(!shift.is_overnight());
        assert_eq!(shift.span_minutes(), 540);
        assert_eq!(shift.scheduled_minutes(), 480);
    }

    #[test]
    fn test_overnight_shift_measured_across_midnight() {
        let mut shift = day_shift();
        shift.shift_start = time(22, 0);
        shift.shift_end = time(6, 0);
        assert!(shift.is_overnight());
        assert_eq!(shift.span_minutes(), 480);
    }

    #[test]
    fn test_day_off_has_no_minutes() {
        let mut shift = day_shift();
        shift.is_off = true;
        assert_eq!(shift.span_minutes(), 0);
        assert_eq!(shift.scheduled_minutes(), 0);
    }

    #[test]
    fn test_break_longer_than_span_saturates() {
        let mut shift = day_shift();
        shift.break_minutes = 600;
        assert_eq!(shift.scheduled_minutes(), 0);
    }

    #[test]
    fn test_template_materialise_covers_every_day() {
        let template = ShiftTemplate {
            id: Uuid::from_u128(77),
            tenant_id: Uuid::from_u128(2),
            name: "Morning crew".to_string(),
            shift_start: time(9, 0),
            shift_end: time(18, 0),
            break_minutes: 60,
            workdays: vec![
                Weekday::Mon,
                Weekday::Tue,
                Weekday::Wed,
                Weekday::Thu,
                Weekday::Fri,
                Weekday::Sat,
            ],
        };

        // 2026-03-09 is a Monday
        let from = NaiveDate::from_ymd_opt(2026, 3, 9).unwrap();
        let to = NaiveDate::from_ymd_opt(2026, 3, 15).unwrap();
        let shifts = template.materialise(Uuid::from_u128(1), from, to);

        assert_eq!(shifts.len(), 7);
        assert!(shifts[..6].iter().all(|s| !s.is_off));
        assert!(shifts[6].is_off); // Sunday
        assert!(shifts.iter().all(|s| s.template_id == Some(template.id)));
    }
}
