//! Side-effect events emitted by commands and the admin review queue.
//!
//! Commands that close days behind the employee's back, or that leave a
//! record in a shape an administrator should look at, return
//! [`EngineEvent`]s to the caller for notification fan-out and append a
//! [`ReviewEntry`] to the store's review queue. The engine itself never
//! sends notifications; it only reports what happened.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Why a day record landed on the review queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewReason {
    /// The record was abandoned and closed by the sweep.
    AutoClosed,
    /// The first clock-in and final clock-out cancelled each other out.
    CancelledSync,
    /// The filled slots match no recognised pattern.
    UnrecognisedSlots,
}

/// An entry on the administrator review queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewEntry {
    /// Unique identifier for the entry.
    pub id: Uuid,
    /// The tenant the flagged record belongs to.
    pub tenant_id: Uuid,
    /// The employee the flagged record belongs to.
    pub employee_id: Uuid,
    /// The work date of the flagged record.
    pub work_date: NaiveDate,
    /// Why the record was flagged.
    pub reason: ReviewReason,
    /// A short human-readable note.
    pub note: String,
    /// When the entry was queued.
    pub created_at: DateTime<Utc>,
}

impl ReviewEntry {
    /// Builds a new queue entry stamped with the current time.
    pub fn new(
        tenant_id: Uuid,
        employee_id: Uuid,
        work_date: NaiveDate,
        reason: ReviewReason,
        note: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            tenant_id,
            employee_id,
            work_date,
            reason,
            note: note.into(),
            created_at: Utc::now(),
        }
    }
}

/// A side effect emitted by a command, returned alongside its output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "event")]
pub enum EngineEvent {
    /// The sweep closed an abandoned day record.
    DayAutoClosed {
        /// The employee whose day was closed.
        employee_id: Uuid,
        /// The work date that was closed.
        work_date: NaiveDate,
        /// The capped work minutes the day closed with.
        work_minutes: u32,
    },
    /// A record was flagged for administrator review.
    ReviewRequested {
        /// The employee whose record was flagged.
        employee_id: Uuid,
        /// The work date of the flagged record.
        work_date: NaiveDate,
        /// Why review is needed.
        reason: ReviewReason,
    },
    /// A day closed with overtime waiting for a decision.
    OvertimePending {
        /// The employee who worked the overtime.
        employee_id: Uuid,
        /// The work date the overtime was worked on.
        work_date: NaiveDate,
        /// The rounded overtime minutes awaiting approval.
        ot_minutes: u32,
    },
}
