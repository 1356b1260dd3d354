//! SOCSO work-injury contribution calculations.
//!
//! Fixed amounts looked up by wage bracket from the yearly table.

use rust_decimal::Decimal;

use crate::config::{SocsoBracket, SocsoTable};

/// Employee and employer SOCSO portions for one month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SocsoContribution {
    /// Portion deducted from the employee.
    pub employee: Decimal,
    /// Portion borne by the employer.
    pub employer: Decimal,
}

fn bracket_for(table: &SocsoTable, wage: Decimal) -> Option<&SocsoBracket> {
    table
        .brackets
        .iter()
        .find(|b| b.wage_up_to.is_none_or(|upper| wage <= upper))
}

/// Calculates the monthly SOCSO contribution by wage-bracket lookup.
///
/// Employees under the second-category age contribute under the first
/// category together with the employer; from that age only the employer
/// contributes, under the second category.
///
/// # Arguments
///
/// * `table` - The SOCSO schedule for the payroll year
/// * `wage` - The monthly contribution base
/// * `age` - The employee's age at the end of the month
///
/// # Returns
///
/// The employee and employer portions; zero for a non-positive wage.
pub fn socso_contribution(table: &SocsoTable, wage: Decimal, age: u32) -> SocsoContribution {
    if wage <= Decimal::ZERO {
        return SocsoContribution::default();
    }
    let Some(bracket) = bracket_for(table, wage) else {
        return SocsoContribution::default();
    };

    if age < table.second_category_age {
        SocsoContribution {
            employee: bracket.first_employee,
            employer: bracket.first_employer,
        }
    } else {
        SocsoContribution {
            employee: Decimal::ZERO,
            employer: bracket.second_employer,
        }
    }
}
