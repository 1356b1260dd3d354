//! Statutory rate table loading for the payroll engine.
//!
//! This module provides functionality to load the yearly EPF, SOCSO,
//! EIS and PCB schedules from YAML files at startup. The loaded tables
//! are immutable and shared across every calculation.
//!
//! # Example
//!
//! ```no_run
//! use gaji_engine::config::StatutoryTables;
//!
//! let tables = StatutoryTables::load("./config/statutory").unwrap();
//! println!("Table years: {:?}", tables.years().collect::<Vec<_>>());
//! ```

mod loader;
mod types;

pub use loader::StatutoryTables;
pub use types::{
    EisBracket, EisTable, EpfTable, PcbBracket, PcbTable, SocsoBracket, SocsoTable, YearTables,
};
