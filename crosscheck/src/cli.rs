// crosscheck/src/cli.rs
//
// Single source of truth for all CLI definitions (Clap structs).

use clap::{Parser, Subcommand, ValueEnum};
use crosscheck_core::application::ReportFormat;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "crosscheck")]
#[command(about = "Cross-system Data Quality reconciliation for Critical Data Elements", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 🚀 Validates CDE rules for a cohort of trades across every system
    Run {
        /// Project directory
        #[arg(long, default_value = ".")]
        project_dir: PathBuf,

        /// Business keys to validate (ex: "UIT-0001-ABC,UIT-0002-XYZ")
        #[arg(long, short, value_delimiter = ',')]
        keys: Vec<String>,

        /// Per-system cap on distinct keys when no keys are given
        #[arg(long, short)]
        limit: Option<usize>,

        /// Validate only this CDE (repeatable)
        #[arg(long = "cde")]
        cdes: Vec<String>,

        /// table, csv, summary or json
        #[arg(long, short, default_value_t = ReportFormat::Table)]
        format: ReportFormat,

        /// Write the report to a file instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Exit with code 2 when at least one violation is found
        #[arg(long, default_value = "false")]
        fail_on_violation: bool,
    },

    /// 📄 Re-renders a run saved with `run --format json`
    Report {
        #[arg(long, short)]
        input: PathBuf,

        #[arg(long, short, default_value_t = ReportFormat::Summary)]
        format: ReportFormat,

        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// 🔌 Tests the connection to every configured system
    Ping {
        #[arg(long, default_value = ".")]
        project_dir: PathBuf,
    },

    /// 📚 Lists CDEs, rules and column mappings
    Catalog {
        #[arg(long, default_value = ".")]
        project_dir: PathBuf,

        #[arg(long, value_enum, default_value_t = CatalogView::All)]
        view: CatalogView,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CatalogView {
    /// CDEs with their rules and systems
    All,
    /// CDEs only
    Cdes,
    /// Rules with their CDE and column mapping
    Rules,
}
