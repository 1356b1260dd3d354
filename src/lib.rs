//! Attendance, overtime and payroll settlement engine for Malaysian
//! multi-tenant HR.
//!
//! This crate turns raw clock events into classified day records,
//! projects leave entitlements, composes monthly earnings with the
//! EPF/SOCSO/EIS/PCB statutory schedules, and settles exiting
//! employees. The [`engine`] module is the entry point: commands
//! mutate through an in-memory transactional store, queries project
//! from it, and the pure arithmetic lives in [`calculation`].

#![warn(missing_docs)]

pub mod calculation;
pub mod config;
pub mod engine;
pub mod error;
pub mod models;
