//! Error types for the attendance and payroll engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for all error conditions that can occur during attendance processing,
//! payroll composition and settlement.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

/// The main error type for the attendance and payroll engine.
///
/// All operations in the engine return this error type, making it easy
/// to handle errors consistently throughout the application.
///
/// # Example
///
/// ```
/// use gaji_engine::error::EngineError;
///
/// let error = EngineError::PolicyMissing {
///     setting: "ot_rounding".to_string(),
/// };
/// assert_eq!(error.to_string(), "Tenant policy setting missing: ot_rounding");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// A clock event arrived for a slot that is already filled or would
    /// break the in/out ordering of the day.
    #[error("Invalid clock sequence: {message}")]
    InvalidSlotOrder {
        /// A description of the ordering violation.
        message: String,
    },

    /// A mutation was attempted on a day record that has already left the
    /// IN_PROGRESS state.
    #[error("Day record for employee {employee_id} on {work_date} is already closed (status {status})")]
    DayAlreadyClosed {
        /// The employee the record belongs to.
        employee_id: Uuid,
        /// The work date of the record.
        work_date: NaiveDate,
        /// The status the record is currently in.
        status: String,
    },

    /// An operation required a scheduled shift but none exists for the day.
    #[error("No scheduled shift for employee {employee_id} on {work_date}")]
    ScheduleAbsent {
        /// The employee the schedule was looked up for.
        employee_id: Uuid,
        /// The date with no schedule row.
        work_date: NaiveDate,
    },

    /// A leave request asked for more days than the balance allows.
    #[error("Insufficient leave balance for '{leave_type}': requested {requested}, available {available}")]
    LeaveInsufficient {
        /// The leave type code.
        leave_type: String,
        /// Days requested.
        requested: Decimal,
        /// Days actually available.
        available: Decimal,
    },

    /// A tenant policy setting required by a calculation is absent.
    #[error("Tenant policy setting missing: {setting}")]
    PolicyMissing {
        /// The name of the missing setting.
        setting: String,
    },

    /// A mutation would alter attendance already swept into a finalised
    /// payroll run.
    #[error("Payroll run {run_id} is finalised; period data is locked")]
    RunLocked {
        /// The run holding the lock.
        run_id: Uuid,
    },

    /// A settlement operation conflicts with the recorded notice state.
    #[error("Notice policy violation: {message}")]
    NoticePolicyViolation {
        /// A description of the conflict.
        message: String,
    },

    /// A statutory rate table is not loaded for the requested year.
    #[error("Statutory rate table '{table}' not available for year {year}")]
    RateTableMissing {
        /// The table name (epf, socso, eis or pcb).
        table: String,
        /// The year the lookup was for.
        year: i32,
    },

    /// A statutory table file was not found at the expected path.
    #[error("Rate table file not found: {path}")]
    TableNotFound {
        /// The path that was not found.
        path: String,
    },

    /// A statutory table file could not be parsed.
    #[error("Failed to parse rate table file '{path}': {message}")]
    TableParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// A referenced entity does not exist in the store.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// The entity kind (employee, tenant, payroll run, ...).
        entity: &'static str,
        /// The identifier that was looked up.
        id: Uuid,
    },

    /// An insert collided with an existing row on a unique constraint.
    #[error("Unique constraint violated: {constraint}")]
    UniqueViolation {
        /// The logical constraint name.
        constraint: String,
    },

    /// A state machine was asked to perform a transition its current
    /// state does not permit.
    #[error("Cannot {action} {entity} in state {state}")]
    InvalidTransition {
        /// The entity kind being transitioned.
        entity: &'static str,
        /// The state the entity is currently in.
        state: String,
        /// The action that was attempted.
        action: &'static str,
    },

    /// The acting role does not hold the permission for the attempted
    /// action.
    #[error("Role {role} may not {action}")]
    PermissionDenied {
        /// The role that attempted the action.
        role: String,
        /// The action that was attempted.
        action: &'static str,
    },

    /// A general calculation error occurred.
    #[error("Calculation error: {message}")]
    CalculationError {
        /// A description of the calculation error.
        message: String,
    },
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn uuid(n: u128) -> Uuid {
        Uuid::from_u128(n)
    }

    #[test]
    fn test_invalid_slot_order_displays_message() {
        let error = EngineError::InvalidSlotOrder {
            message: "break end before break start".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Invalid clock sequence: break end before break start"
        );
    }

    #[test]
    fn test_day_already_closed_displays_employee_date_and_status() {
        let error = EngineError::DayAlreadyClosed {
            employee_id: uuid(7),
            work_date: NaiveDate::from_ymd_opt(2026, 3, 14).unwrap(),
            status: "APPROVED".to_string(),
        };
        assert_eq!(
            error.to_string(),
            format!(
                "Day record for employee {} on 2026-03-14 is already closed (status APPROVED)",
                uuid(7)
            )
        );
    }

    #[test]
    fn test_schedule_absent_displays_employee_and_date() {
        let error = EngineError::ScheduleAbsent {
            employee_id: uuid(3),
            work_date: NaiveDate::from_ymd_opt(2026, 1, 5).unwrap(),
        };
        assert_eq!(
            error.to_string(),
            format!("No scheduled shift for employee {} on 2026-01-05", uuid(3))
        );
    }

    #[test]
    fn test_leave_insufficient_displays_figures() {
        let error = EngineError::LeaveInsufficient {
            leave_type: "AL".to_string(),
            requested: Decimal::new(5, 0),
            available: Decimal::new(15, 1),
        };
        assert_eq!(
            error.to_string(),
            "Insufficient leave balance for 'AL': requested 5, available 1.5"
        );
    }

    #[test]
    fn test_run_locked_displays_run_id() {
        let error = EngineError::RunLocked { run_id: uuid(9) };
        assert_eq!(
            error.to_string(),
            format!("Payroll run {} is finalised; period data is locked", uuid(9))
        );
    }

    #[test]
    fn test_rate_table_missing_displays_table_and_year() {
        let error = EngineError::RateTableMissing {
            table: "socso".to_string(),
            year: 2026,
        };
        assert_eq!(
            error.to_string(),
            "Statutory rate table 'socso' not available for year 2026"
        );
    }

    #[test]
    fn test_table_parse_error_displays_path_and_message() {
        let error = EngineError::TableParseError {
            path: "/config/statutory/2026/pcb.yaml".to_string(),
            message: "invalid YAML syntax".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Failed to parse rate table file '/config/statutory/2026/pcb.yaml': invalid YAML syntax"
        );
    }

    #[test]
    fn test_invalid_transition_displays_action_and_state() {
        let error = EngineError::InvalidTransition {
            entity: "leave request",
            state: "CANCELLED".to_string(),
            action: "approve",
        };
        assert_eq!(
            error.to_string(),
            "Cannot approve leave request in state CANCELLED"
        );
    }

    #[test]
    fn test_permission_denied_displays_role_and_action() {
        let error = EngineError::PermissionDenied {
            role: "STAFF".to_string(),
            action: "approve overtime",
        };
        assert_eq!(error.to_string(), "Role STAFF may not approve overtime");
    }

    #[test]
    fn test_errors_implement_std_error() {
        fn assert_error<T: std::error::Error>() {}
        assert_error::<EngineError>();
    }

    #[test]
    fn test_error_propagation_with_question_mark() {
        fn returns_run_locked() -> EngineResult<()> {
            Err(EngineError::RunLocked { run_id: uuid(1) })
        }

        fn propagates_error() -> EngineResult<()> {
            returns_run_locked()?;
            Ok(())
        }

        assert!(propagates_error().is_err());
    }
}
