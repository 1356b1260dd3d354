//! EIS unemployment-insurance contribution calculations.
//!
//! Fixed amounts looked up by wage bracket, due only below the age
//! cutoff.

use rust_decimal::Decimal;

use crate::config::{EisBracket, EisTable};

/// Employee and employer EIS portions for one month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EisContribution {
    /// Portion deducted from the employee.
    pub employee: Decimal,
    /// Portion borne by the employer.
    pub employer: Decimal,
}

fn bracket_for(table: &EisTable, wage: Decimal) -> Option<&EisBracket> {
    table
        .brackets
        .iter()
        .find(|b| b.wage_up_to.is_none_or(|upper| wage <= upper))
}

/// Calculates the monthly EIS contribution by wage-bracket lookup.
///
/// No contribution is due from the age cutoff.
///
/// # Arguments
///
/// * `table` - The EIS schedule for the payroll year
/// * `wage` - The monthly contribution base
/// * `age` - The employee's age at the end of the month
///
/// # Returns
///
/// The employee and employer portions; zero for a non-positive wage or
/// an employee at or above the cutoff.
pub fn eis_contribution(table: &EisTable, wage: Decimal, age: u32) -> EisContribution {
    if wage <= Decimal::ZERO || age >= table.age_cutoff {
        return EisContribution::default();
    }
    let Some(bracket) = bracket_for(table, wage) else {
        return EisContribution::default();
    };

    EisContribution {
        employee: bracket.employee,
        employer: bracket.employer,
    }
}
