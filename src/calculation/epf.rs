//! EPF retirement-fund contribution calculations.
//!
//! Percentage rates from the yearly table applied to the contribution
//! base, with the employee and employer portions computed separately.

use rust_decimal::Decimal;

use crate::config::EpfTable;

/// Employee and employer EPF portions for one month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EpfContribution {
    /// Portion deducted from the employee.
    pub employee: Decimal,
    /// Portion borne by the employer.
    pub employer: Decimal,
}

/// Rounds a computed portion up to the next whole ringgit.
fn ringgit_up(amount: Decimal) -> Decimal {
    amount.ceil()
}

/// Calculates the monthly EPF contribution.
///
/// Rates split at the senior age, and the employer share additionally
/// splits on the low-wage threshold. Foreign workers contribute the
/// employee share at the standard rates while the employer pays the
/// flat monthly amount. Computed portions round up to the next ringgit.
///
/// # Arguments
///
/// * `table` - The EPF schedule for the payroll year
/// * `base` - The monthly contribution base
/// * `age` - The employee's age at the end of the month
/// * `foreign_worker` - Whether the flat employer contribution applies
///
/// # Returns
///
/// The employee and employer portions; zero for a non-positive base.
pub fn epf_contribution(
    table: &EpfTable,
    base: Decimal,
    age: u32,
    foreign_worker: bool,
) -> EpfContribution {
    if base <= Decimal::ZERO {
        return EpfContribution::default();
    }

    let senior = age >= table.senior_age;
    let employee_rate = if senior {
        table.senior_employee_rate
    } else {
        table.employee_rate
    };
    let employee = ringgit_up(base * employee_rate);

    let employer = if foreign_worker {
        table.foreign_worker_employer_flat
    } else {
        let rate = if senior {
            table.senior_employer_rate
        } else if base <= table.low_wage_threshold {
            table.employer_rate_low_wage
        } else {
            table.employer_rate
        };
        ringgit_up(base * rate)
    };

    EpfContribution { employee, employer }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn table() -> EpfTable {
        EpfTable {
            senior_age: 60,
            employee_rate: dec("0.11"),
            senior_employee_rate: dec("0.00"),
            employer_rate: dec("0.12"),
            employer_rate_low_wage: dec("0.13"),
            low_wage_threshold: dec("5000.00"),
            senior_employer_rate: dec("0.04"),
            foreign_worker_employer_flat: dec("5.00"),
        }
    }

    // ==========================================================================
    // EPF-001: standard rates below the senior age, low-wage employer share
    // ==========================================================================
    #[test]
    fn test_epf_001_standard_low_wage() {
        let result = epf_contribution(&table(), dec("2600.00"), 31, false);
        assert_eq!(result.employee, dec("286"));
        assert_eq!(result.employer, dec("338"));
    }

    // ==========================================================================
    // EPF-002: wages above the threshold take the lower employer share
    // ==========================================================================
    #[test]
    fn test_epf_002_above_threshold() {
        let result = epf_contribution(&table(), dec("5600.00"), 40, false);
        assert_eq!(result.employee, dec("616"));
        assert_eq!(result.employer, dec("672"));
    }

    // ==========================================================================
    // EPF-003: fractional portions round up to the next ringgit
    // ==========================================================================
    #[test]
    fn test_epf_003_rounds_up_to_ringgit() {
        // 2628.13 * 0.11 = 289.0943, 2628.13 * 0.13 = 341.6569
        let result = epf_contribution(&table(), dec("2628.13"), 31, false);
        assert_eq!(result.employee, dec("290"));
        assert_eq!(result.employer, dec("342"));
    }

    // ==========================================================================
    // EPF-004: senior rates from the senior age
    // ==========================================================================
    #[test]
    fn test_epf_004_senior_rates() {
        let result = epf_contribution(&table(), dec("2600.00"), 60, false);
        assert_eq!(result.employee, dec("0"));
        assert_eq!(result.employer, dec("104"));
    }

    // ==========================================================================
    // EPF-005: foreign workers pay the employee share, employer pays flat
    // ==========================================================================
    #[test]
    fn test_epf_005_foreign_worker_flat() {
        let result = epf_contribution(&table(), dec("2600.00"), 31, true);
        assert_eq!(result.employee, dec("286"));
        assert_eq!(result.employer, dec("5.00"));
    }

    // ==========================================================================
    // EPF-006: non-positive base contributes nothing
    // ==========================================================================
    #[test]
    fn test_epf_006_zero_base() {
        let result = epf_contribution(&table(), Decimal::ZERO, 31, false);
        assert_eq!(result, EpfContribution::default());

        let result = epf_contribution(&table(), dec("-100.00"), 31, false);
        assert_eq!(result, EpfContribution::default());
    }

    #[test]
    fn test_exact_ringgit_does_not_round_up() {
        // 3000 * 0.11 = 330 exactly
        let result = epf_contribution(&table(), dec("3000.00"), 31, false);
        assert_eq!(result.employee, dec("330"));
        assert_eq!(result.employer, dec("390"));
    }
}
