//! Statutory deduction assembly.
//!
//! Runs the four schedules over the composed bases for one employee and
//! month.

use chrono::NaiveDate;

use crate::config::YearTables;
use crate::models::{Employee, StatutoryBreakdown};

use super::earnings::StatutoryBases;
use super::eis::eis_contribution;
use super::epf::epf_contribution;
use super::pcb::{monthly_pcb, PcbProfile};
use super::socso::socso_contribution;

/// Computes the full statutory breakdown for one composed month.
///
/// EPF, SOCSO and EIS read the contribution base; the tax reads the
/// regular and additional bases split upstream by the employee's
/// treatment.
///
/// # Arguments
///
/// * `tables` - The schedules for the payroll year
/// * `employee` - The employee, for age and relief circumstances
/// * `as_of` - The date age is measured at, usually the month's end
/// * `bases` - The composed statutory bases
///
/// # Returns
///
/// The employee and employer portions of all four schedules.
pub fn statutory_breakdown(
    tables: &YearTables,
    employee: &Employee,
    as_of: NaiveDate,
    bases: &StatutoryBases,
) -> StatutoryBreakdown {
    let age = employee.age_on(as_of);

    let epf = epf_contribution(
        &tables.epf,
        bases.contribution,
        age,
        employee.is_foreign_worker,
    );
    let socso = socso_contribution(&tables.socso, bases.contribution, age);
    let eis = eis_contribution(&tables.eis, bases.contribution, age);
    let profile = PcbProfile {
        non_working_spouse: employee.has_non_working_spouse,
        child_count: employee.child_count,
    };
    let pcb = monthly_pcb(&tables.pcb, bases.pcb_regular, bases.pcb_additional, &profile);

    StatutoryBreakdown {
        epf_employee: epf.employee,
        epf_employer: epf.employer,
        socso_employee: socso.employee,
        socso_employer: socso.employer,
        eis_employee: eis.employee,
        eis_employer: eis.employer,
        pcb,
    }
}
