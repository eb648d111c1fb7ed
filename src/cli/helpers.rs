//! Shared helper functions for CLI commands

use miette::Result;
use std::path::PathBuf;

use crate::cli::GlobalOpts;
use crate::core::{authorize_optional, Capability, Config, HistoryStore};

/// Truncate a string to max_len characters, adding "..." if truncated
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Hours to two decimals, e.g. `5.25 h`
pub fn format_hours(hours: f64) -> String {
    format!("{:.2} h", hours)
}

/// Minutes with at most one decimal, dropping a trailing `.0`
pub fn format_minutes(minutes: f64) -> String {
    let rounded = (minutes * 10.0).round() / 10.0;
    if rounded.fract() == 0.0 {
        format!("{:.0}", rounded)
    } else {
        format!("{:.1}", rounded)
    }
}

/// History database path from `--db`, then config
pub fn database_path(global: &GlobalOpts, config: &Config) -> Result<PathBuf> {
    global
        .db
        .clone()
        .or_else(|| config.database_path())
        .ok_or_else(|| {
            miette::miette!(
                help = "pass --db <PATH> or set `database` with `inspcalc config set`",
                "Could not determine a location for the history database"
            )
        })
}

/// Open the history store for this invocation
pub fn open_store(global: &GlobalOpts, config: &Config) -> Result<HistoryStore> {
    let path = database_path(global, config)?;
    Ok(HistoryStore::open(&path)?)
}

/// Capability granted by the key on the command line or in the environment
pub fn capability(global: &GlobalOpts) -> Result<Capability> {
    Ok(authorize_optional(global.access_key.as_deref())?)
}
