//! The engine facade: shared state, commands, queries and the
//! transactional store.
//!
//! [`EngineState`] bundles the loaded statutory tables with the
//! in-memory store. Commands mutate through snapshot transactions and
//! return their outcome together with any [`EngineEvent`]s; queries are
//! read-only projections. Bulk commands take a [`CancelToken`] and stop
//! between per-employee iterations, leaving committed work in place.

mod cancel;
mod commands;
mod events;
mod queries;
mod state;
mod store;

pub use cancel::CancelToken;
pub use commands::{
    BuildOutcome, ClockOutcome, RecalcOutcome, SweepOutcome, approve_day, approve_leave,
    approve_ot, build_payroll_run, build_settlement, cancel_leave, delete_draft_run, finalise_run,
    process_settlement, reassign_claim_month, recalculate_period, record_clock_event, reject_day,
    reject_leave, reject_ot, run_auto_closure, set_notice_waived, submit_leave_request,
};
pub use events::{EngineEvent, ReviewEntry, ReviewReason};
pub use queries::{
    MonthlyAttendance, leave_entitlement, monthly_attendance, payroll_preview, pending_overtime,
    review_queue, settlement_preview,
};
pub use state::EngineState;
pub use store::MemStore;
