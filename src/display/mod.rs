//! Display formatting for terminal output
//!
//! Provides pure formatting functions that turn processed backup records
//! into the report printed by the CLI.

pub mod report;

pub use report::{format_backup_list, format_failure_detail};
