//! CLI command implementations
//!
//! Phases never overlap: `load` owns the store read-write, every other
//! command opens it read-only.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::http_server::{DashboardState, HttpServer, HttpServerConfig};
use crate::loader::{LoadReport, TableLoader};
use crate::observability::{log_event_with_fields, Event};
use crate::report::write_report_csvs;
use crate::rules::{AuditReport, FailurePolicy, RuleEngine, RuleOutcome};
use crate::store::{cell_text, ResultTable, Store};

use super::args::Command;
use super::errors::{CliError, CliResult};

/// Configuration file structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// DuckDB file (default "leakscope.duckdb")
    #[serde(default = "default_db_path")]
    pub db_path: String,

    /// Directory of input CSV files
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// File name prefix stripped to form table names
    #[serde(default = "default_table_prefix")]
    pub table_prefix: String,

    /// Where `export` writes CSV files
    #[serde(default = "default_export_dir")]
    pub export_dir: String,

    #[serde(default)]
    pub audit: AuditConfig,

    #[serde(default)]
    pub http: HttpServerConfig,
}

/// Rule batch settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Abort the batch on the first failing rule
    #[serde(default)]
    pub fail_fast: bool,
}

fn default_db_path() -> String {
    "leakscope.duckdb".to_string()
}
fn default_data_dir() -> String {
    "data/blinkit_sales".to_string()
}
fn default_table_prefix() -> String {
    "blinkit_".to_string()
}
fn default_export_dir() -> String {
    "exports".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            data_dir: default_data_dir(),
            table_prefix: default_table_prefix(),
            export_dir: default_export_dir(),
            audit: AuditConfig::default(),
            http: HttpServerConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| CliError::config_error(format!("Failed to read config: {}", e)))?;

        let config: Config = serde_json::from_str(&content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))?;

        config.validate()?;

        let config_path = path.display().to_string();
        log_event_with_fields(
            Event::ConfigLoaded,
            &[
                ("config", config_path.as_str()),
                ("db_path", config.db_path.as_str()),
            ],
        );

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> CliResult<()> {
        if self.db_path.trim().is_empty() {
            return Err(CliError::config_error("db_path must not be empty"));
        }

        if self.data_dir.trim().is_empty() {
            return Err(CliError::config_error("data_dir must not be empty"));
        }

        if self.table_prefix.contains(['/', '\\']) {
            return Err(CliError::config_error(format!(
                "Invalid table_prefix: '{}'. Path separators are not allowed.",
                self.table_prefix
            )));
        }

        if self.http.port == 0 {
            return Err(CliError::config_error("http.port must be > 0"));
        }

        Ok(())
    }

    pub fn db_path(&self) -> &Path {
        Path::new(&self.db_path)
    }

    pub fn data_path(&self) -> &Path {
        Path::new(&self.data_dir)
    }

    pub fn export_path(&self) -> &Path {
        Path::new(&self.export_dir)
    }

    pub fn failure_policy(&self) -> FailurePolicy {
        if self.audit.fail_fast {
            FailurePolicy::FailFast
        } else {
            FailurePolicy::Isolate
        }
    }

    fn open_store(&self) -> CliResult<Store> {
        Store::open_read_only(self.db_path())
            .map_err(|e| CliError::audit_failed(format!("Failed to open store: {}", e)))
    }
}

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command.
/// This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Load { config } => load(&config).map(|_| ()),
        Command::Audit { config, preview } => audit(&config, preview).map(|_| ()),
        Command::Export { config, out_dir } => export(&config, out_dir.as_deref()).map(|_| ()),
        Command::Serve { config, port } => serve(&config, port),
    }
}

/// Load every CSV from `data_dir` into the store, replacing prior tables
pub fn load(config_path: &Path) -> CliResult<LoadReport> {
    let config = Config::load(config_path)?;

    if let Some(parent) = config.db_path().parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let store = Store::open_read_write(config.db_path())
        .map_err(|e| CliError::load_failed(format!("Failed to open store: {}", e)))?;
    let report = TableLoader::new(&store, config.table_prefix.as_str()).load_dir(config.data_path())?;

    print!("{}", format_load_report(&report));
    Ok(report)
}

/// Run every rule and print up to `preview` rows per rule
pub fn audit(config_path: &Path, preview: usize) -> CliResult<AuditReport> {
    let config = Config::load(config_path)?;
    let store = config.open_store()?;
    let report = RuleEngine::new(config.failure_policy()).run(&store)?;

    print!("{}", format_audit_report(&report, preview));
    Ok(report)
}

/// Write `<rule>.csv` for every rule with findings
pub fn export(config_path: &Path, out_dir: Option<&Path>) -> CliResult<Vec<PathBuf>> {
    let config = Config::load(config_path)?;
    let store = config.open_store()?;
    let report = RuleEngine::new(config.failure_policy()).run(&store)?;

    let dir = match out_dir {
        Some(dir) => dir,
        None => config.export_path(),
    };
    let written = write_report_csvs(dir, &report)?;

    if written.is_empty() {
        println!("No issues found; nothing exported");
    }
    for path in &written {
        println!("wrote {}", path.display());
    }
    Ok(written)
}

/// Start the dashboard server over the loaded store
pub fn serve(config_path: &Path, port: Option<u16>) -> CliResult<()> {
    let config = Config::load(config_path)?;
    let store = Store::open_read_only(config.db_path())
        .map_err(|e| CliError::serve_failed(format!("Failed to open store: {}", e)))?;

    let mut http_config = config.http.clone();
    if let Some(port) = port {
        http_config.port = port;
    }

    let state = DashboardState::new(store, RuleEngine::new(config.failure_policy()));
    let server = HttpServer::with_config(http_config, state);

    // Start the async runtime and run the server
    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::serve_failed(format!("Failed to create tokio runtime: {}", e)))?;

    rt.block_on(async {
        server
            .start()
            .await
            .map_err(|e| CliError::serve_failed(format!("HTTP server failed: {}", e)))
    })?;

    Ok(())
}

/// One line per loaded table, then skipped files
pub fn format_load_report(report: &LoadReport) -> String {
    let mut out = String::new();
    for table in &report.tables {
        let _ = writeln!(
            out,
            "loaded {} from {}: {} rows, {} columns",
            table.table_name, table.file_name, table.row_count, table.column_count
        );
    }
    for file in &report.skipped {
        let _ = writeln!(out, "skipped {}", file);
    }
    if report.view_created {
        let _ = writeln!(out, "created view transactions_base");
    }
    out
}

/// `--- rule ---` sections with a row preview or "No issues found"
pub fn format_audit_report(report: &AuditReport, preview: usize) -> String {
    let mut out = String::new();
    for finding in report.iter() {
        let _ = writeln!(out, "--- {} ---", finding.rule.name);
        match &finding.outcome {
            RuleOutcome::Findings(table) if table.is_empty() => {
                out.push_str("No issues found\n");
            }
            RuleOutcome::Findings(table) => {
                let _ = writeln!(out, "{} issues found", table.len());
                out.push_str(&format_preview(table, preview));
            }
            RuleOutcome::Failed(message) => {
                let _ = writeln!(out, "Rule failed: {}", message);
            }
        }
    }
    let _ = writeln!(
        out,
        "{} rules, {} issues, {} failed",
        report.findings.len(),
        report.issue_count(),
        report.failed_count()
    );
    out
}

fn format_preview(table: &ResultTable, rows: usize) -> String {
    let mut out = table.columns.join(" | ");
    out.push('\n');
    for row in &table.head(rows).rows {
        let cells: Vec<String> = row.iter().map(cell_text).collect();
        out.push_str(&cells.join(" | "));
        out.push('\n');
    }
    if table.len() > rows {
        let _ = writeln!(out, "... {} more rows", table.len() - rows);
    }
    out
}
