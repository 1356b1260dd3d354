//! Daily attendance records.
//!
//! A [`DayRecord`] is the single attendance row per employee per work date.
//! It carries up to four clock slots (two in/out pairs around an optional
//! break), the computed minute totals, the attendance status and two
//! independent approval state machines: one for the day itself and one for
//! its overtime.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// A GPS coordinate captured with a clock event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
}

/// A single clock event stored in one of the four day-record slots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClockEntry {
    /// Wall-clock time of the event.
    pub time: NaiveTime,
    /// GPS position captured by the device, if any.
    pub gps: Option<GeoPoint>,
    /// Reference to a stored verification photo, if any.
    pub photo_ref: Option<String>,
}

impl ClockEntry {
    /// Creates a bare entry with only a time.
    pub fn at(time: NaiveTime) -> Self {
        Self {
            time,
            gps: None,
            photo_ref: None,
        }
    }
}

/// What the day counted as for pay purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    /// The employee worked.
    Present,
    /// Scheduled to work but no attendance and no approved leave.
    Absent,
    /// Covered by approved leave.
    Leave,
    /// A gazetted public holiday.
    Holiday,
    /// The weekly rest day or a rostered day off.
    Rest,
}

impl fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AttendanceStatus::Present => "PRESENT",
            AttendanceStatus::Absent => "ABSENT",
            AttendanceStatus::Leave => "LEAVE",
            AttendanceStatus::Holiday => "HOLIDAY",
            AttendanceStatus::Rest => "REST",
        };
        write!(f, "{s}")
    }
}

/// Lifecycle state of a day record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordStatus {
    /// Clock events are still being collected.
    InProgress,
    /// The day closed normally with a final clock-out.
    Completed,
    /// The day was closed by the nightly sweep.
    AutoClosed,
    /// A supervisor approved the day.
    Approved,
    /// A supervisor rejected the day; it contributes nothing to payroll.
    Rejected,
}

impl RecordStatus {
    /// Whether the record has left the open state.
    pub fn is_closed(&self) -> bool {
        !matches!(self, RecordStatus::InProgress)
    }

    /// Whether the record is in a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, RecordStatus::Approved | RecordStatus::Rejected)
    }
}

impl fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RecordStatus::InProgress => "IN_PROGRESS",
            RecordStatus::Completed => "COMPLETED",
            RecordStatus::AutoClosed => "AUTO_CLOSED",
            RecordStatus::Approved => "APPROVED",
            RecordStatus::Rejected => "REJECTED",
        };
        write!(f, "{s}")
    }
}

/// Approval state of a day's overtime, independent of the day state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OtStatus {
    /// The day produced no overtime.
    None,
    /// Overtime awaits a manager decision.
    Pending,
    /// Overtime approved for payment.
    Approved,
    /// Overtime rejected; minutes remain on record but are not paid.
    Rejected,
}

impl fmt::Display for OtStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OtStatus::None => "NONE",
            OtStatus::Pending => "PENDING",
            OtStatus::Approved => "APPROVED",
            OtStatus::Rejected => "REJECTED",
        };
        write!(f, "{s}")
    }
}

/// The single attendance record for one employee on one work date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayRecord {
    /// Unique identifier for the record.
    pub id: Uuid,
    /// The employee the record belongs to.
    pub employee_id: Uuid,
    /// The tenant the record belongs to.
    pub tenant_id: Uuid,
    /// The work date. Overnight work is attributed to the date the shift
    /// started.
    pub work_date: NaiveDate,
    /// First clock-in.
    pub clock_in_1: Option<ClockEntry>,
    /// Break start.
    pub clock_out_1: Option<ClockEntry>,
    /// Break end.
    pub clock_in_2: Option<ClockEntry>,
    /// Final clock-out.
    pub clock_out_2: Option<ClockEntry>,
    /// Net working minutes for the day.
    pub total_work_minutes: u32,
    /// Break minutes for the day.
    pub break_minutes: u32,
    /// Overtime minutes after the rounding policy was applied.
    pub ot_minutes: u32,
    /// What the day counted as.
    pub attendance_status: AttendanceStatus,
    /// Day approval state.
    pub record_status: RecordStatus,
    /// Supervisor note recorded on rejection.
    pub reject_reason: Option<String>,
    /// Overtime approval state.
    pub ot_status: OtStatus,
    /// Whether the nightly sweep closed this record.
    pub auto_closed: bool,
    /// Whether the record is queued for human review.
    pub needs_review: bool,
    /// Last mutation timestamp.
    pub updated_at: DateTime<Utc>,
}

impl DayRecord {
    /// Creates an empty open record for the given employee and date.
    pub fn new(employee_id: Uuid, tenant_id: Uuid, work_date: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            employee_id,
            tenant_id,
            work_date,
            clock_in_1: None,
            clock_out_1: None,
            clock_in_2: None,
            clock_out_2: None,
            total_work_minutes: 0,
            break_minutes: 0,
            ot_minutes: 0,
            attendance_status: AttendanceStatus::Absent,
            record_status: RecordStatus::InProgress,
            reject_reason: None,
            ot_status: OtStatus::None,
            auto_closed: false,
            needs_review: false,
            updated_at: Utc::now(),
        }
    }

    /// The four slot times in order: in_1, out_1, in_2, out_2.
    pub fn slot_times(&self) -> [Option<NaiveTime>; 4] {
        [
            self.clock_in_1.as_ref().map(|e| e.time),
            self.clock_out_1.as_ref().map(|e| e.time),
            self.clock_in_2.as_ref().map(|e| e.time),
            self.clock_out_2.as_ref().map(|e| e.time),
        ]
    }

    /// Whether any clock slot has been filled.
    pub fn has_any_clock(&self) -> bool {
        self.clock_in_1.is_some()
            || self.clock_out_1.is_some()
            || self.clock_in_2.is_some()
            || self.clock_out_2.is_some()
    }
}
