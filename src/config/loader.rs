//! Statutory table loading functionality.
//!
//! This module provides the [`StatutoryTables`] type for loading the
//! yearly EPF, SOCSO, EIS and PCB schedules from YAML files.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::error::{EngineError, EngineResult};

use super::types::{EisTable, EpfTable, PcbTable, SocsoTable, YearTables};

/// Loads and provides access to the statutory rate tables.
///
/// The tables are read once at startup from a directory holding one
/// subdirectory per calendar year and are immutable afterwards.
///
/// # Directory Structure
///
/// ```text
/// config/statutory/
/// └── 2026/
///     ├── epf.yaml    # EPF percentage schedule
///     ├── socso.yaml  # SOCSO wage brackets
///     ├── eis.yaml    # EIS wage brackets
///     └── pcb.yaml    # Tax scale, reliefs and rebates
/// ```
///
/// # Example
///
/// ```no_run
/// use gaji_engine::config::StatutoryTables;
///
/// let tables = StatutoryTables::load("./config/statutory")?;
/// let epf = tables.epf(2026)?;
/// println!("Employee EPF rate: {}", epf.employee_rate);
/// # Ok::<(), gaji_engine::error::EngineError>(())
/// ```
#[derive(Debug, Clone)]
pub struct StatutoryTables {
    years: BTreeMap<i32, YearTables>,
}

impl StatutoryTables {
    /// Loads every year directory found under the given path.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the table directory (e.g., "./config/statutory")
    ///
    /// # Returns
    ///
    /// Returns a `StatutoryTables` instance on success, or an error if:
    /// - The directory does not exist or holds no year subdirectories
    /// - Any of the four table files is missing for a year
    /// - Any file contains invalid YAML
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();
        let path_str = path.display().to_string();

        let entries = fs::read_dir(path).map_err(|_| EngineError::TableNotFound {
            path: path_str.clone(),
        })?;

        let mut years = BTreeMap::new();
        for entry in entries {
            let entry = entry.map_err(|_| EngineError::TableNotFound {
                path: path_str.clone(),
            })?;
            let dir = entry.path();
            if !dir.is_dir() {
                continue;
            }
            let Some(year) = dir
                .file_name()
                .and_then(|name| name.to_str())
                .and_then(|name| name.parse::<i32>().ok())
            else {
                continue;
            };

            let tables = YearTables {
                epf: Self::load_yaml::<EpfTable>(&dir.join("epf.yaml"))?,
                socso: Self::load_yaml::<SocsoTable>(&dir.join("socso.yaml"))?,
                eis: Self::load_yaml::<EisTable>(&dir.join("eis.yaml"))?,
                pcb: Self::load_yaml::<PcbTable>(&dir.join("pcb.yaml"))?,
            };
            years.insert(year, tables);
        }

        if years.is_empty() {
            return Err(EngineError::TableNotFound {
                path: format!("{} (no year directories found)", path_str),
            });
        }

        Ok(Self { years })
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::TableNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::TableParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Returns the years tables are loaded for, ascending.
    pub fn years(&self) -> impl Iterator<Item = i32> + '_ {
        self.years.keys().copied()
    }

    fn year(&self, table: &str, year: i32) -> EngineResult<&YearTables> {
        self.years
            .get(&year)
            .ok_or_else(|| EngineError::RateTableMissing {
                table: table.to_string(),
                year,
            })
    }

    /// Returns all four schedules for a year.
    pub fn for_year(&self, year: i32) -> EngineResult<&YearTables> {
        self.year("statutory", year)
    }

    /// Returns the EPF schedule for a year.
    pub fn epf(&self, year: i32) -> EngineResult<&EpfTable> {
        Ok(&self.year("epf", year)?.epf)
    }

    /// Returns the SOCSO schedule for a year.
    pub fn socso(&self, year: i32) -> EngineResult<&SocsoTable> {
        Ok(&self.year("socso", year)?.socso)
    }

    /// Returns the EIS schedule for a year.
    pub fn eis(&self, year: i32) -> EngineResult<&EisTable> {
        Ok(&self.year("eis", year)?.eis)
    }

    /// Returns the PCB schedule for a year.
    pub fn pcb(&self, year: i32) -> EngineResult<&PcbTable> {
        Ok(&self.year("pcb", year)?.pcb)
    }
}
