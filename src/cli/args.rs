//! CLI argument definitions using clap
//!
//! Commands:
//! - leakscope load --config <path>
//! - leakscope audit --config <path> [--preview N]
//! - leakscope export --config <path> [--out-dir DIR]
//! - leakscope serve --config <path> [--port P]

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// leakscope - revenue leakage audits over e-commerce sales data
#[derive(Parser, Debug)]
#[command(name = "leakscope")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Load every CSV in the data directory into the store
    Load {
        /// Path to configuration file
        #[arg(long, default_value = "./leakscope.json")]
        config: PathBuf,
    },

    /// Run all leakage rules and print a preview of each result
    Audit {
        /// Path to configuration file
        #[arg(long, default_value = "./leakscope.json")]
        config: PathBuf,

        /// Rows to print per rule
        #[arg(long, default_value_t = 10)]
        preview: usize,
    },

    /// Write <rule>.csv for every rule with findings
    Export {
        /// Path to configuration file
        #[arg(long, default_value = "./leakscope.json")]
        config: PathBuf,

        /// Output directory (overrides export_dir)
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },

    /// Start the dashboard HTTP server
    Serve {
        /// Path to configuration file
        #[arg(long, default_value = "./leakscope.json")]
        config: PathBuf,

        /// Port to listen on (overrides http.port)
        #[arg(long)]
        port: Option<u16>,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
