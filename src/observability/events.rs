//! Observable events for leakscope
//!
//! Point events within a phase. Phase begin/complete/failed lines come
//! from `ObservationScope`.

use std::fmt;

/// Observable events across the load, audit and serve phases
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Configuration
    /// Configuration file parsed and validated
    ConfigLoaded,

    // Load phase
    /// One file written as a table
    TableLoaded,
    /// A file was skipped (not tabular input)
    FileSkipped,
    /// `transactions_base` view (re)created
    ViewCreated,
    /// Load phase aborted (FATAL)
    LoadFailed,

    // Audit phase
    /// One rule finished with a result table
    RuleComplete,
    /// One rule failed
    RuleFailed,

    // Export
    /// A findings CSV was written to disk
    ExportWritten,

    // Server
    /// Dashboard server bound and serving
    ServerStart,
    /// A request failed with an error response
    RequestFailed,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",

            Event::TableLoaded => "TABLE_LOADED",
            Event::FileSkipped => "FILE_SKIPPED",
            Event::ViewCreated => "VIEW_CREATED",
            Event::LoadFailed => "LOAD_FAILED",

            Event::RuleComplete => "RULE_COMPLETE",
            Event::RuleFailed => "RULE_FAILED",

            Event::ExportWritten => "EXPORT_WRITTEN",

            Event::ServerStart => "SERVER_START",
            Event::RequestFailed => "REQUEST_FAILED",
        }
    }

    /// Returns true if this event indicates a fatal condition
    pub fn is_fatal(&self) -> bool {
        matches!(self, Event::LoadFailed)
    }

    /// Returns true if this event reports a non-fatal failure
    pub fn is_failure(&self) -> bool {
        matches!(self, Event::RuleFailed | Event::RequestFailed)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
