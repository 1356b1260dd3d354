//! Statutory rate table types.
//!
//! This module contains the strongly-typed table structures that are
//! deserialized from the YAML files under `config/statutory/<year>/`.

use rust_decimal::Decimal;
use serde::Deserialize;

/// EPF percentage schedule for one year.
///
/// Rates split at the senior age; the employer share additionally
/// splits on a monthly wage threshold. Foreign workers keep the
/// employee share while the employer pays a flat monthly amount.
#[derive(Debug, Clone, Deserialize)]
pub struct EpfTable {
    /// Age from which the senior rates apply.
    pub senior_age: u32,
    /// Employee share of wages below the senior age.
    pub employee_rate: Decimal,
    /// Employee share of wages from the senior age.
    pub senior_employee_rate: Decimal,
    /// Employer share on monthly wages above the low-wage threshold.
    pub employer_rate: Decimal,
    /// Employer share on monthly wages at or below the low-wage threshold.
    pub employer_rate_low_wage: Decimal,
    /// Monthly wage at or below which the low-wage employer share applies.
    pub low_wage_threshold: Decimal,
    /// Employer share from the senior age.
    pub senior_employer_rate: Decimal,
    /// Flat monthly employer contribution for foreign workers.
    pub foreign_worker_employer_flat: Decimal,
}

/// One wage bracket of the SOCSO schedule.
#[derive(Debug, Clone, Deserialize)]
pub struct SocsoBracket {
    /// Upper wage bound, inclusive. `None` marks the open top bracket.
    #[serde(default)]
    pub wage_up_to: Option<Decimal>,
    /// Employee share under the first category.
    pub first_employee: Decimal,
    /// Employer share under the first category.
    pub first_employer: Decimal,
    /// Employer share under the second category.
    pub second_employer: Decimal,
}

/// SOCSO contribution schedule for one year.
#[derive(Debug, Clone, Deserialize)]
pub struct SocsoTable {
    /// Age from which the second (employer-only) category applies.
    pub second_category_age: u32,
    /// Wage brackets in ascending order.
    pub brackets: Vec<SocsoBracket>,
}

/// One wage bracket of the EIS schedule.
#[derive(Debug, Clone, Deserialize)]
pub struct EisBracket {
    /// Upper wage bound, inclusive. `None` marks the open top bracket.
    #[serde(default)]
    pub wage_up_to: Option<Decimal>,
    /// Employee share.
    pub employee: Decimal,
    /// Employer share.
    pub employer: Decimal,
}

/// EIS contribution schedule for one year.
#[derive(Debug, Clone, Deserialize)]
pub struct EisTable {
    /// Age at and above which no contribution is due.
    pub age_cutoff: u32,
    /// Wage brackets in ascending order.
    pub brackets: Vec<EisBracket>,
}

/// One bracket of the progressive tax scale.
#[derive(Debug, Clone, Deserialize)]
pub struct PcbBracket {
    /// Upper bound of annual chargeable income, inclusive. `None` marks
    /// the open top bracket.
    #[serde(default)]
    pub up_to: Option<Decimal>,
    /// Marginal rate on income inside the bracket.
    pub rate: Decimal,
}

/// Monthly tax deduction schedule for one year.
#[derive(Debug, Clone, Deserialize)]
pub struct PcbTable {
    /// Annual relief granted to every resident individual.
    pub individual_relief: Decimal,
    /// Annual relief for a non-working spouse.
    pub spouse_relief: Decimal,
    /// Annual relief per qualifying child.
    pub child_relief: Decimal,
    /// Chargeable income at or below which the rebates apply.
    pub rebate_threshold: Decimal,
    /// Individual rebate deducted from the annual tax.
    pub individual_rebate: Decimal,
    /// Spouse rebate deducted when the spouse relief is claimed.
    pub spouse_rebate: Decimal,
    /// Monthly deductions below this floor are not collected.
    pub min_monthly: Decimal,
    /// Progressive brackets in ascending order.
    pub brackets: Vec<PcbBracket>,
}

/// The four statutory schedules for one calendar year.
#[derive(Debug, Clone)]
pub struct YearTables {
    /// EPF schedule.
    pub epf: EpfTable,
    /// SOCSO schedule.
    pub socso: SocsoTable,
    /// EIS schedule.
    pub eis: EisTable,
    /// PCB schedule.
    pub pcb: PcbTable,
}
