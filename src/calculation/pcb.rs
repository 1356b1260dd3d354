//! Monthly tax deduction calculations.
//!
//! The regular base projects to an annual figure, reliefs come off and
//! the progressive scale applies; one twelfth of the annual tax is
//! deducted each month. Additional amounts are taxed as the delta they
//! cause on the annual figure, in their month alone.

use rust_decimal::Decimal;

use crate::config::PcbTable;

const MONTHS_PER_YEAR: Decimal = Decimal::from_parts(12, 0, 0, false, 0);
const FIVE_SEN_STEPS: Decimal = Decimal::from_parts(20, 0, 0, false, 0);

/// Family circumstances feeding the relief and rebate rules.
#[derive(Debug, Clone, Copy, Default)]
pub struct PcbProfile {
    /// Whether the spouse relief and rebate apply.
    pub non_working_spouse: bool,
    /// Number of qualifying children.
    pub child_count: u32,
}

/// Rounds a monthly deduction up to the next five sen.
fn five_sen_up(amount: Decimal) -> Decimal {
    (amount * FIVE_SEN_STEPS).ceil() / FIVE_SEN_STEPS
}

/// Tax on annual chargeable income under the progressive scale.
///
/// # Arguments
///
/// * `table` - The tax schedule for the payroll year
/// * `chargeable` - Annual chargeable income after reliefs
///
/// # Returns
///
/// The annual tax before rebates.
pub fn annual_tax(table: &PcbTable, chargeable: Decimal) -> Decimal {
    let mut tax = Decimal::ZERO;
    let mut lower = Decimal::ZERO;
    for bracket in &table.brackets {
        if chargeable <= lower {
            break;
        }
        let taxed = match bracket.up_to {
            Some(upper) => chargeable.min(upper) - lower,
            None => chargeable - lower,
        };
        tax += taxed * bracket.rate;
        match bracket.up_to {
            Some(upper) => lower = upper,
            None => break,
        }
    }
    tax
}

fn annual_reliefs(table: &PcbTable, profile: &PcbProfile) -> Decimal {
    let mut reliefs = table.individual_relief;
    if profile.non_working_spouse {
        reliefs += table.spouse_relief;
    }
    reliefs + table.child_relief * Decimal::from(profile.child_count)
}

fn tax_after_rebate(table: &PcbTable, chargeable: Decimal, profile: &PcbProfile) -> Decimal {
    let mut tax = annual_tax(table, chargeable);
    if chargeable <= table.rebate_threshold {
        let mut rebate = table.individual_rebate;
        if profile.non_working_spouse {
            rebate += table.spouse_rebate;
        }
        tax = (tax - rebate).max(Decimal::ZERO);
    }
    tax
}

/// Calculates the tax to deduct for one month.
///
/// The regular base is annualised and taxed after reliefs and rebates;
/// the additional base is taxed as a one-off delta on top. Deductions
/// below the collection floor are not taken.
///
/// # Arguments
///
/// * `table` - The tax schedule for the payroll year
/// * `regular_base` - Monthly remuneration that projects to a year
/// * `additional` - Bonus-style amount taxed in this month only
/// * `profile` - The employee's relief circumstances
///
/// # Returns
///
/// The monthly deduction, rounded up to the next five sen.
pub fn monthly_pcb(
    table: &PcbTable,
    regular_base: Decimal,
    additional: Decimal,
    profile: &PcbProfile,
) -> Decimal {
    if regular_base <= Decimal::ZERO && additional <= Decimal::ZERO {
        return Decimal::ZERO;
    }

    let reliefs = annual_reliefs(table, profile);
    let annual_regular = (regular_base * MONTHS_PER_YEAR - reliefs).max(Decimal::ZERO);
    let regular_tax = tax_after_rebate(table, annual_regular, profile);
    let mut monthly = five_sen_up(regular_tax / MONTHS_PER_YEAR);

    if additional > Decimal::ZERO {
        let annual_with =
            (regular_base * MONTHS_PER_YEAR + additional - reliefs).max(Decimal::ZERO);
        let with_tax = tax_after_rebate(table, annual_with, profile);
        monthly += five_sen_up((with_tax - regular_tax).max(Decimal::ZERO));
    }

    if monthly < table.min_monthly {
        Decimal::ZERO
    } else {
        monthly
    }
}
