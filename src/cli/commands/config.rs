//! `inspcalc config` command - Configuration management
//!
//! Provides commands to view and modify inspcalc configuration.

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};
use std::fs;
use std::path::PathBuf;

use crate::cli::GlobalOpts;
use crate::core::Config;

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show current configuration values
    Show(ShowArgs),

    /// Set a configuration value
    Set(SetArgs),

    /// Unset (remove) a configuration value
    Unset(UnsetArgs),

    /// Show paths to configuration files
    Path,

    /// List all available configuration keys
    Keys,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Show only this key's value
    pub key: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct SetArgs {
    /// Configuration key (e.g., inspection_level, report_time_minutes)
    pub key: String,

    /// Value to set
    pub value: String,

    /// Set in global (user) config instead of ./inspcalc.yaml
    #[arg(long, short = 'g')]
    pub global: bool,
}

#[derive(clap::Args, Debug)]
pub struct UnsetArgs {
    /// Configuration key to remove
    pub key: String,

    /// Remove from global (user) config instead of ./inspcalc.yaml
    #[arg(long, short = 'g')]
    pub global: bool,
}

/// Valid configuration keys
const VALID_KEYS: &[(&str, &str)] = &[
    ("inspection_level", "Default inspection level (I, II, S-3, S-4)"),
    ("aql_major", "Default AQL for major defects (2.5 or 4.0)"),
    ("aql_minor", "Default AQL for minor defects (2.5 or 4.0)"),
    ("preparation_time_minutes", "Preparation time per visit"),
    ("sampling_time_minutes", "Sampling time per purchase order"),
    ("inspection_time_per_unit_minutes", "Inspection time per sampled unit"),
    ("packing_check_time_minutes", "Packing check time per visit"),
    ("report_time_minutes", "Report writing time per visit"),
    ("travel_time_minutes", "Travel time per visit"),
    ("database", "History database file"),
    ("default_format", "Default output format (tsv, json, yaml, csv, md)"),
];

/// Run a config subcommand
pub fn run(cmd: ConfigCommands, _global: &GlobalOpts) -> Result<()> {
    match cmd {
        ConfigCommands::Show(args) => run_show(args),
        ConfigCommands::Set(args) => run_set(args),
        ConfigCommands::Unset(args) => run_unset(args),
        ConfigCommands::Path => run_path(),
        ConfigCommands::Keys => run_keys(),
    }
}

fn run_show(args: ShowArgs) -> Result<()> {
    let config = Config::load();

    // If a specific key is requested, show just that value
    if let Some(key) = &args.key {
        check_key(key)?;
        return match get_config_value(&config, key) {
            Some(v) => {
                println!("{}", v);
                Ok(())
            }
            None => Err(miette::miette!("Key '{}' is not set", key)),
        };
    }

    println!("{}", style("Effective Configuration").bold().underlined());
    println!();

    let defaults = config.calculation_defaults();
    for (key, _) in VALID_KEYS {
        match get_config_value(&config, key) {
            Some(v) => println!("  {}: {}", style(key).cyan(), style(v).yellow()),
            None => {
                let builtin = builtin_value(&defaults, key)
                    .map(|v| format!("{} (built-in)", v))
                    .unwrap_or_else(|| "(not set)".to_string());
                println!("  {}: {}", style(key).cyan(), style(builtin).dim());
            }
        }
    }

    println!();
    println!("{}", style("Config Sources (in priority order):").dim());
    println!("  1. Environment variables (INSPCALC_LEVEL, INSPCALC_DB)");
    println!("  2. Local config (./inspcalc.yaml)");
    println!("  3. Global config (~/.config/inspcalc/config.yaml)");

    Ok(())
}

fn run_set(args: SetArgs) -> Result<()> {
    check_key(&args.key)?;
    let config_path = config_path(args.global)?;

    let mut config_map = read_mapping(&config_path)?;

    // Scalars keep their YAML type so numbers stay numbers
    let value: serde_yml::Value = serde_yml::from_str(&args.value)
        .unwrap_or_else(|_| serde_yml::Value::String(args.value.clone()));
    if let serde_yml::Value::Mapping(map) = &mut config_map {
        map.insert(serde_yml::Value::String(args.key.clone()), value);
    }

    // Reject values that would make the file unreadable
    let yaml = serde_yml::to_string(&config_map).into_diagnostic()?;
    Config::from_yaml(&yaml).map_err(|e| {
        miette::miette!(
            help = "run `inspcalc config keys` to see what each key accepts",
            "Invalid value '{}' for {}: {}",
            args.value,
            args.key,
            e
        )
    })?;

    // Ensure parent directory exists
    if let Some(parent) = config_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).into_diagnostic()?;
    }
    fs::write(&config_path, yaml).into_diagnostic()?;

    let scope = if args.global { "global" } else { "local" };
    println!(
        "{} Set {} {} {} in {} config",
        style("✓").green(),
        style(&args.key).cyan(),
        style("→").dim(),
        style(&args.value).yellow(),
        scope
    );

    Ok(())
}

fn run_unset(args: UnsetArgs) -> Result<()> {
    let config_path = config_path(args.global)?;

    if !config_path.exists() {
        return Err(miette::miette!(
            "Config file does not exist: {}",
            config_path.display()
        ));
    }

    let mut config_map = read_mapping(&config_path)?;
    let removed = match &mut config_map {
        serde_yml::Value::Mapping(map) => {
            let key = serde_yml::Value::String(args.key.clone());
            map.remove(&key).is_some()
        }
        _ => false,
    };

    if !removed {
        return Err(miette::miette!("Key '{}' not found in config", args.key));
    }

    let yaml = serde_yml::to_string(&config_map).into_diagnostic()?;
    fs::write(&config_path, yaml).into_diagnostic()?;

    let scope = if args.global { "global" } else { "local" };
    println!(
        "{} Removed {} from {} config",
        style("✓").green(),
        style(&args.key).cyan(),
        scope
    );

    Ok(())
}

fn run_path() -> Result<()> {
    println!("{}", style("Configuration file paths:").bold());
    println!();

    let global_path = config_path(true)?;
    println!("  {} {}", style("Global:").cyan(), global_path.display());
    print_exists(global_path.exists(), 9);

    let local_path = Config::local_config_path();
    println!();
    println!("  {} {}", style("Local:").cyan(), local_path.display());
    print_exists(local_path.exists(), 8);

    if let Some(db) = Config::load().database_path() {
        println!();
        println!("  {} {}", style("History:").cyan(), db.display());
    }

    Ok(())
}

fn run_keys() -> Result<()> {
    println!("{}", style("Available configuration keys:").bold());
    println!();

    for (key, description) in VALID_KEYS {
        println!("  {:<34} {}", style(key).cyan(), style(description).dim());
    }

    println!();
    println!(
        "{}",
        style("Use 'inspcalc config set <key> <value>' to set a value.").dim()
    );

    Ok(())
}

// Helper functions

fn config_path(global: bool) -> Result<PathBuf> {
    if global {
        Config::global_config_path()
            .ok_or_else(|| miette::miette!("Could not determine global config directory"))
    } else {
        Ok(Config::local_config_path())
    }
}

fn check_key(key: &str) -> Result<()> {
    if VALID_KEYS.iter().any(|(k, _)| *k == key) {
        Ok(())
    } else {
        Err(miette::miette!(
            help = "run `inspcalc config keys` to list valid keys",
            "Unknown configuration key '{}'",
            key
        ))
    }
}

fn read_mapping(path: &std::path::Path) -> Result<serde_yml::Value> {
    if !path.exists() {
        return Ok(serde_yml::Value::Mapping(Default::default()));
    }
    let content = fs::read_to_string(path).into_diagnostic()?;
    let parsed: serde_yml::Value = serde_yml::from_str(&content).map_err(|e| {
        miette::miette!(
            help = format!("fix or remove the malformed file at {}", path.display()),
            "Cannot parse config file {}: {}",
            path.display(),
            e
        )
    })?;
    // If the file was empty or null, use an empty mapping
    match parsed {
        serde_yml::Value::Null => Ok(serde_yml::Value::Mapping(Default::default())),
        serde_yml::Value::Mapping(_) => Ok(parsed),
        _ => Err(miette::miette!(
            help = format!("fix or remove the malformed file at {}", path.display()),
            "Config file {} is not a key/value mapping",
            path.display()
        )),
    }
}

fn get_config_value(config: &Config, key: &str) -> Option<String> {
    match key {
        "inspection_level" => config.inspection_level.map(|v| v.to_string()),
        "aql_major" => config.aql_major.map(|v| v.to_string()),
        "aql_minor" => config.aql_minor.map(|v| v.to_string()),
        "preparation_time_minutes" => config.preparation_time_minutes.map(|v| v.to_string()),
        "sampling_time_minutes" => config.sampling_time_minutes.map(|v| v.to_string()),
        "inspection_time_per_unit_minutes" => config
            .inspection_time_per_unit_minutes
            .map(|v| v.to_string()),
        "packing_check_time_minutes" => config.packing_check_time_minutes.map(|v| v.to_string()),
        "report_time_minutes" => config.report_time_minutes.map(|v| v.to_string()),
        "travel_time_minutes" => config.travel_time_minutes.map(|v| v.to_string()),
        "database" => config.database.as_ref().map(|p| p.display().to_string()),
        "default_format" => config.default_format.clone(),
        _ => None,
    }
}

fn builtin_value(defaults: &crate::sampling::CalculationInput, key: &str) -> Option<String> {
    match key {
        "inspection_level" => Some(defaults.inspection_level.to_string()),
        "aql_major" => Some(defaults.aql_major.to_string()),
        "aql_minor" => Some(defaults.aql_minor.to_string()),
        "preparation_time_minutes" => Some(defaults.preparation_time_minutes.to_string()),
        "sampling_time_minutes" => Some(defaults.sampling_time_minutes.to_string()),
        "inspection_time_per_unit_minutes" => {
            Some(defaults.inspection_time_per_unit_minutes.to_string())
        }
        "packing_check_time_minutes" => Some(defaults.packing_check_time_minutes.to_string()),
        "report_time_minutes" => Some(defaults.report_time_minutes.to_string()),
        "travel_time_minutes" => Some(defaults.travel_time_minutes.to_string()),
        _ => None,
    }
}

fn print_exists(exists: bool, indent: usize) {
    let note = if exists {
        style("(exists)").green()
    } else {
        style("(not created)").dim()
    };
    println!("  {:indent$}{}", "", note, indent = indent);
}
