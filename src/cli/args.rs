//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::cli::commands::{
    access::AccessArgs, calc::CalcArgs, completions::CompletionsArgs, config::ConfigCommands,
    history::HistoryCommands, plan::PlanCommands, tables::TablesArgs,
};

#[derive(Parser)]
#[command(name = "inspcalc")]
#[command(author, version, about = "AQL inspection sampling and labor time calculator")]
#[command(long_about = "Works out ANSI/ASQ Z1.4 sampling plans for a set of purchase orders and \
estimates the inspector hours and man-days the visit will take.")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "auto")]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Enable verbose output (debug logging on stderr)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// History database (default: per-user data directory)
    #[arg(long, global = true, env = "INSPCALC_DB")]
    pub db: Option<PathBuf>,

    /// Access key for saving and managing history
    #[arg(long, global = true, env = "INSPCALC_ACCESS_KEY", hide_env_values = true)]
    pub access_key: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Calculate sampling plans and inspection time
    Calc(CalcArgs),

    /// Plan file helpers
    #[command(subcommand)]
    Plan(PlanCommands),

    /// Saved calculations
    #[command(subcommand)]
    History(HistoryCommands),

    /// Check which access level a key grants
    Access(AccessArgs),

    /// Show the Z1.4 lookup tables
    Tables(TablesArgs),

    /// View and modify configuration
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Automatically detect based on context (table for terminals)
    #[default]
    Auto,
    /// Aligned table (human readable)
    Tsv,
    /// JSON format (for programming)
    Json,
    /// YAML format (full fidelity)
    Yaml,
    /// CSV format (one row per order)
    Csv,
    /// Printable Markdown report
    Md,
}

impl OutputFormat {
    /// Resolve `Auto` against a configured default, falling back to `fallback`
    pub fn resolve(self, configured: Option<&str>, fallback: OutputFormat) -> OutputFormat {
        match self {
            OutputFormat::Auto => configured
                .and_then(|name| OutputFormat::from_str(name, true).ok())
                .filter(|f| *f != OutputFormat::Auto)
                .unwrap_or(fallback),
            f => f,
        }
    }
}
