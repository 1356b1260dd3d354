//! Clock-slot assignment and pattern classification.
//!
//! A day record has four slots: first clock-in, break start, break end and
//! final clock-out. Events fill slots strictly in that positional order;
//! numeric time order is never checked because any span may cross
//! midnight. The filled slots are then classified into one of five
//! recognised patterns, and anything else is routed to human review.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{EngineError, EngineResult};
use crate::models::DayRecord;

/// The kind of clock event a device submits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClockKind {
    /// Start of the working day.
    ClockIn,
    /// Start of the break (or early departure).
    BreakStart,
    /// Return from break.
    BreakEnd,
    /// End of the working day.
    ClockOut,
}

impl fmt::Display for ClockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ClockKind::ClockIn => "clock-in",
            ClockKind::BreakStart => "break-start",
            ClockKind::BreakEnd => "break-end",
            ClockKind::ClockOut => "clock-out",
        };
        write!(f, "{s}")
    }
}

/// One of the four clock slots on a day record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    /// First clock-in.
    In1,
    /// Break start.
    Out1,
    /// Break end.
    In2,
    /// Final clock-out.
    Out2,
}

/// The four slot times of a record, extracted for pure calculation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SlotTimes {
    /// First clock-in.
    pub in_1: Option<NaiveTime>,
    /// Break start.
    pub out_1: Option<NaiveTime>,
    /// Break end.
    pub in_2: Option<NaiveTime>,
    /// Final clock-out.
    pub out_2: Option<NaiveTime>,
}

impl SlotTimes {
    /// Whether no slot has been filled yet.
    pub fn is_empty(&self) -> bool {
        self.in_1.is_none() && self.out_1.is_none() && self.in_2.is_none() && self.out_2.is_none()
    }
}

impl From<&DayRecord> for SlotTimes {
    fn from(record: &DayRecord) -> Self {
        let [in_1, out_1, in_2, out_2] = record.slot_times();
        Self {
            in_1,
            out_1,
            in_2,
            out_2,
        }
    }
}

/// Decides which slot a clock event fills, or rejects it.
///
/// Slots fill strictly in positional order. A clock-out is legal straight
/// after the first clock-in (no break taken) or after the break end, but
/// not while a break is open.
///
/// # Arguments
///
/// * `slots` - The record's current slot times
/// * `kind` - The incoming event kind
///
/// # Returns
///
/// The [`Slot`] the event should land in, or
/// [`EngineError::InvalidSlotOrder`] describing the violation.
///
/// # Examples
///
/// ```
/// use gaji_engine::calculation::{assign_slot, ClockKind, Slot, SlotTimes};
/// use chrono::NaiveTime;
///
/// let mut slots = SlotTimes::default();
/// assert_eq!(assign_slot(&slots, ClockKind::ClockIn).unwrap(), Slot::In1);
///
/// slots.in_1 = NaiveTime::from_hms_opt(9, 0, 0);
/// // no break taken: straight to the final clock-out
/// assert_eq!(assign_slot(&slots, ClockKind::ClockOut).unwrap(), Slot::Out2);
/// // a second clock-in is rejected
/// assert!(assign_slot(&slots, ClockKind::ClockIn).is_err());
/// ```
pub fn assign_slot(slots: &SlotTimes, kind: ClockKind) -> EngineResult<Slot> {
    if slots.out_2.is_some() {
        return Err(EngineError::InvalidSlotOrder {
            message: format!("{kind} after the day already clocked out"),
        });
    }
    match kind {
        ClockKind::ClockIn => {
            if slots.in_1.is_some() {
                Err(EngineError::InvalidSlotOrder {
                    message: "duplicate clock-in for the day".to_string(),
                })
            } else {
                Ok(Slot::In1)
            }
        }
        ClockKind::BreakStart => {
            if slots.in_1.is_none() {
                Err(EngineError::InvalidSlotOrder {
                    message: "break-start before any clock-in".to_string(),
                })
            } else if slots.out_1.is_some() {
                Err(EngineError::InvalidSlotOrder {
                    message: "duplicate break-start for the day".to_string(),
                })
            } else {
                Ok(Slot::Out1)
            }
        }
        ClockKind::BreakEnd => {
            if slots.out_1.is_none() {
                Err(EngineError::InvalidSlotOrder {
                    message: "break-end before break-start".to_string(),
                })
            } else if slots.in_2.is_some() {
                Err(EngineError::InvalidSlotOrder {
                    message: "duplicate break-end for the day".to_string(),
                })
            } else {
                Ok(Slot::In2)
            }
        }
        ClockKind::ClockOut => {
            if slots.in_1.is_none() {
                Err(EngineError::InvalidSlotOrder {
                    message: "clock-out before any clock-in".to_string(),
                })
            } else if slots.out_1.is_some() && slots.in_2.is_none() {
                Err(EngineError::InvalidSlotOrder {
                    message: "clock-out while the break is still open".to_string(),
                })
            } else {
                Ok(Slot::Out2)
            }
        }
    }
}

/// A recognised arrangement of filled clock slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockPattern {
    /// Only the first clock-in exists; the day is still open.
    Single {
        /// First clock-in.
        in_1: NaiveTime,
    },
    /// Clock-in plus break-start; the employee left at the break.
    Half {
        /// First clock-in.
        in_1: NaiveTime,
        /// Break start, acting as the provisional end of work.
        out_1: NaiveTime,
    },
    /// Break taken and ended, final clock-out still missing.
    BreakStarted {
        /// First clock-in.
        in_1: NaiveTime,
        /// Break start.
        out_1: NaiveTime,
        /// Break end.
        in_2: NaiveTime,
    },
    /// All four slots filled: a complete day with a break.
    Full {
        /// First clock-in.
        in_1: NaiveTime,
        /// Break start.
        out_1: NaiveTime,
        /// Break end.
        in_2: NaiveTime,
        /// Final clock-out.
        out_2: NaiveTime,
    },
    /// Clock-in and final clock-out with no break recorded.
    NoBreak {
        /// First clock-in.
        in_1: NaiveTime,
        /// Final clock-out.
        out_2: NaiveTime,
    },
}

impl ClockPattern {
    /// Upper-case pattern name for logs and review entries.
    pub fn name(&self) -> &'static str {
        match self {
            ClockPattern::Single { .. } => "SINGLE",
            ClockPattern::Half { .. } => "HALF",
            ClockPattern::BreakStarted { .. } => "BREAK_STARTED",
            ClockPattern::Full { .. } => "FULL",
            ClockPattern::NoBreak { .. } => "NO_BREAK",
        }
    }

    /// Whether the pattern still awaits more clock events.
    pub fn is_open(&self) -> bool {
        matches!(
            self,
            ClockPattern::Single { .. }
                | ClockPattern::Half { .. }
                | ClockPattern::BreakStarted { .. }
        )
    }
}

/// The outcome of classifying a record's slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotClassification {
    /// No slots filled.
    Empty,
    /// A recognised pattern.
    Pattern(ClockPattern),
    /// First clock-in and final clock-out are numerically equal; the sync
    /// cancelled itself out.
    CancelledSync {
        /// The shared time.
        at: NaiveTime,
    },
    /// The slot combination matches no pattern; route to review.
    Unrecognised,
}

/// Classifies the filled slots of a record.
///
/// # Examples
///
/// ```
/// use gaji_engine::calculation::{classify_slots, ClockPattern, SlotClassification, SlotTimes};
/// use chrono::NaiveTime;
///
/// let slots = SlotTimes {
///     in_1: NaiveTime::from_hms_opt(9, 0, 0),
///     out_1: None,
///     in_2: None,
///     out_2: NaiveTime::from_hms_opt(18, 0, 0),
/// };
/// let classified = classify_slots(&slots);
/// assert!(matches!(
///     classified,
///     SlotClassification::Pattern(ClockPattern::NoBreak { .. })
/// ));
/// ```
pub fn classify_slots(slots: &SlotTimes) -> SlotClassification {
    if let (Some(in_1), Some(out_2)) = (slots.in_1, slots.out_2) {
        if in_1 == out_2 {
            return SlotClassification::CancelledSync { at: in_1 };
        }
    }
    match (slots.in_1, slots.out_1, slots.in_2, slots.out_2) {
        (None, None, None, None) => SlotClassification::Empty,
        (Some(in_1), None, None, None) => {
            SlotClassification::Pattern(ClockPattern::Single { in_1 })
        }
        (Some(in_1), Some(out_1), None, None) => {
            SlotClassification::Pattern(ClockPattern::Half { in_1, out_1 })
        }
        (Some(in_1), Some(out_1), Some(in_2), None) => {
            SlotClassification::Pattern(ClockPattern::BreakStarted { in_1, out_1, in_2 })
        }
        (Some(in_1), Some(out_1), Some(in_2), Some(out_2)) => {
            SlotClassification::Pattern(ClockPattern::Full {
                in_1,
                out_1,
                in_2,
                out_2,
            })
        }
        (Some(in_1), None, None, Some(out_2)) => {
            SlotClassification::Pattern(ClockPattern::NoBreak { in_1, out_2 })
        }
        _ => SlotClassification::Unrecognised,
    }
}
