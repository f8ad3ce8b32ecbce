//! Aggregated views over student course records: enrollment by cohort,
//! gender, program and high school, plus failure rates by subject and
//! instructor.
//!
//! [`aggregate::summarize`] is the entry point. [`state::Dashboard`] holds the
//! active table and swaps it wholesale on each load.

pub mod aggregate;
pub mod chart;
pub mod columns;
pub mod config;
pub mod error;
pub mod ingest;
pub mod models;
pub mod report;
pub mod session;
pub mod state;
pub mod table;
pub mod telemetry;

pub use aggregate::summarize;
pub use error::{DashboardError, Result};
pub use models::{SummaryResult, SummaryRow, ViewKind};
pub use table::{Cell, Table};
