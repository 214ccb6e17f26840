//! CLI module for leakscope
//!
//! Provides command-line interface for:
//! - load: CSV files into the store
//! - audit: Run rules and print previews
//! - export: Write findings as CSV
//! - serve: Dashboard HTTP server

mod args;
mod commands;
mod errors;

pub use args::{Cli, Command};
pub use commands::{
    audit, export, format_audit_report, format_load_report, load, run, run_command, serve,
    AuditConfig, Config,
};
pub use errors::{CliError, CliErrorCode, CliResult};
