//! `inspcalc history` command - saved calculations
//!
//! Listing and showing need any access key; deleting needs the elevated one.

use chrono::{DateTime, Local, Utc};
use clap::Subcommand;
use console::style;
use dialoguer::{theme::ColorfulTheme, Confirm};
use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use tabled::{builder::Builder, settings::Style};

use crate::cli::helpers::{capability, format_hours, open_store, truncate_str};
use crate::cli::report::{self, ReportOptions};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::{CalculationRef, Capability, Config, SavedCalculation};
use crate::sampling::{CalculationInput, CalculationResult};

/// Listing length when `-n` is not given
const DEFAULT_HISTORY_LIMIT: usize = 20;

#[derive(Subcommand, Debug)]
pub enum HistoryCommands {
    /// List saved calculations, newest first
    List(ListArgs),

    /// Show one saved calculation
    Show(ShowArgs),

    /// Delete one saved calculation (elevated access)
    Rm(RmArgs),

    /// Delete every saved calculation (elevated access)
    Clear(ClearArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Maximum number of calculations to show
    #[arg(long, short = 'n', default_value_t = DEFAULT_HISTORY_LIMIT)]
    pub limit: usize,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Calculation ID or short ID (CALC@N)
    pub id: String,

    /// Show how each number was derived
    #[arg(long)]
    pub explain: bool,
}

#[derive(clap::Args, Debug)]
pub struct RmArgs {
    /// Calculation ID or short ID (CALC@N)
    pub id: String,

    /// Skip the confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,
}

#[derive(clap::Args, Debug)]
pub struct ClearArgs {
    /// Skip the confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,
}

/// Listing row for machine-readable formats
#[derive(Serialize)]
struct HistoryRow {
    short_id: String,
    id: String,
    created_at: DateTime<Utc>,
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    factory_name: Option<String>,
    orders: usize,
    total_samples: u32,
    total_hours: f64,
    total_man_days: f64,
}

impl From<&SavedCalculation> for HistoryRow {
    fn from(saved: &SavedCalculation) -> Self {
        Self {
            short_id: saved.short_id(),
            id: saved.id.to_string(),
            created_at: saved.created_at,
            name: saved.display_name(),
            factory_name: saved.input.factory_name.clone(),
            orders: saved.input.pos.len(),
            total_samples: saved.result.total_samples,
            total_hours: saved.result.total_hours,
            total_man_days: saved.result.total_man_days,
        }
    }
}

/// Full record for `show` in JSON/YAML
#[derive(Serialize)]
struct SavedView<'a> {
    id: String,
    short_id: String,
    created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    custom_name: Option<&'a str>,
    input: &'a CalculationInput,
    result: &'a CalculationResult,
}

/// Run a history subcommand
pub fn run(cmd: HistoryCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        HistoryCommands::List(args) => run_list(args, global),
        HistoryCommands::Show(args) => run_show(args, global),
        HistoryCommands::Rm(args) => run_rm(args, global),
        HistoryCommands::Clear(args) => run_clear(args, global),
    }
}

fn parse_ref(id: &str) -> Result<CalculationRef> {
    id.parse().map_err(|e| {
        miette::miette!(
            help = "use a full CALC-... ID or a short ID like CALC@3",
            "{}",
            e
        )
    })
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    capability(global)?;
    let config = Config::load();
    let store = open_store(global, &config)?;
    let saved = store.list(args.limit)?;

    let format = global
        .format
        .resolve(config.default_format.as_deref(), OutputFormat::Tsv);

    if saved.is_empty() && matches!(format, OutputFormat::Auto | OutputFormat::Tsv) {
        if !global.quiet {
            println!("No saved calculations.");
        }
        return Ok(());
    }

    let rows: Vec<HistoryRow> = saved.iter().map(HistoryRow::from).collect();

    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&rows).into_diagnostic()?;
            println!("{}", json);
        }
        OutputFormat::Yaml => {
            let yaml = serde_yml::to_string(&rows).into_diagnostic()?;
            print!("{}", yaml);
        }
        OutputFormat::Csv => {
            let mut wtr = csv::Writer::from_writer(std::io::stdout());
            for row in &rows {
                wtr.serialize(row).into_diagnostic()?;
            }
            wtr.flush().into_diagnostic()?;
        }
        OutputFormat::Md => {
            let mut builder = Builder::default();
            builder.push_record(["Short", "Created", "Name", "Orders", "Samples", "Hours", "Man-days"]);
            for row in &rows {
                builder.push_record([
                    row.short_id.clone(),
                    format_created(&row.created_at),
                    row.name.clone(),
                    row.orders.to_string(),
                    row.total_samples.to_string(),
                    format!("{:.2}", row.total_hours),
                    format!("{:.2}", row.total_man_days),
                ]);
            }
            println!("{}", builder.build().with(Style::markdown()));
        }
        OutputFormat::Auto | OutputFormat::Tsv => {
            println!(
                "{:<8} {:<17} {:<16} {:<24} {:>6} {:>7} {:>9}",
                style("SHORT").bold().dim(),
                style("ID").bold(),
                style("CREATED").bold(),
                style("NAME").bold(),
                style("ORDERS").bold(),
                style("SAMPLES").bold(),
                style("MAN-DAYS").bold()
            );
            println!("{}", "-".repeat(93));

            for row in &rows {
                println!(
                    "{:<8} {:<17} {:<16} {:<24} {:>6} {:>7} {:>9.2}",
                    style(&row.short_id).cyan(),
                    truncate_str(&row.id, 17),
                    format_created(&row.created_at),
                    truncate_str(&row.name, 24),
                    row.orders,
                    row.total_samples,
                    row.total_man_days
                );
            }

            if !global.quiet {
                println!();
                println!(
                    "{} calculation(s) shown. Use {} to reference by short ID.",
                    style(rows.len()).cyan(),
                    style("CALC@N").cyan()
                );
            }
        }
    }

    Ok(())
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    capability(global)?;
    let reference = parse_ref(&args.id)?;
    let config = Config::load();
    let store = open_store(global, &config)?;
    let saved = store.get(&reference)?;

    let format = global
        .format
        .resolve(config.default_format.as_deref(), OutputFormat::Tsv);

    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&view(&saved)).into_diagnostic()?;
            println!("{}", json);
        }
        OutputFormat::Yaml => {
            let yaml = serde_yml::to_string(&view(&saved)).into_diagnostic()?;
            print!("{}", yaml);
        }
        format => {
            if matches!(format, OutputFormat::Auto | OutputFormat::Tsv) && !global.quiet {
                println!(
                    "{} {}  {}",
                    style(saved.short_id()).cyan(),
                    style(saved.id).dim(),
                    format_created(&saved.created_at)
                );
                if let Some(name) = saved.custom_name.as_deref() {
                    println!("{} {}", style("Name:").bold(), name);
                }
            }
            let options = ReportOptions {
                explain: args.explain,
                quiet: global.quiet,
                custom_name: saved.custom_name.as_deref(),
            };
            print!(
                "{}",
                report::render(&saved.input, &saved.result, format, options)?
            );
        }
    }

    Ok(())
}

fn run_rm(args: RmArgs, global: &GlobalOpts) -> Result<()> {
    let granted = capability(global)?;
    granted.require(Capability::Elevated)?;

    let reference = parse_ref(&args.id)?;
    let config = Config::load();
    let store = open_store(global, &config)?;
    let saved = store.get(&reference)?;

    if !args.yes {
        let prompt = format!(
            "Delete {} ({}, {})?",
            saved.short_id(),
            saved.display_name(),
            format_hours(saved.result.total_hours)
        );
        if !confirm(&prompt)? {
            println!("Aborted.");
            return Ok(());
        }
    }

    store.delete(&CalculationRef::Id(saved.id), granted)?;

    if !global.quiet {
        println!(
            "{} Deleted {} {}",
            style("✓").green(),
            style(saved.short_id()).cyan(),
            style(saved.id).dim()
        );
    }

    Ok(())
}

fn run_clear(args: ClearArgs, global: &GlobalOpts) -> Result<()> {
    let granted = capability(global)?;
    granted.require(Capability::Elevated)?;

    let config = Config::load();
    let store = open_store(global, &config)?;
    let count = store.count()?;

    if count == 0 {
        if !global.quiet {
            println!("No saved calculations.");
        }
        return Ok(());
    }

    if !args.yes && !confirm(&format!("Delete all {} saved calculation(s)?", count))? {
        println!("Aborted.");
        return Ok(());
    }

    let deleted = store.delete_all(granted)?;

    if !global.quiet {
        println!(
            "{} Deleted {} saved calculation(s)",
            style("✓").green(),
            style(deleted).cyan()
        );
    }

    Ok(())
}

fn confirm(prompt: &str) -> Result<bool> {
    Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .default(false)
        .interact()
        .map_err(|e| {
            miette::miette!(
                help = "pass --yes to skip the prompt when not running in a terminal",
                "Could not read confirmation: {}",
                e
            )
        })
}

fn view(saved: &SavedCalculation) -> SavedView<'_> {
    SavedView {
        id: saved.id.to_string(),
        short_id: saved.short_id(),
        created_at: saved.created_at,
        custom_name: saved.custom_name.as_deref(),
        input: &saved.input,
        result: &saved.result,
    }
}

fn format_created(created: &DateTime<Utc>) -> String {
    created
        .with_timezone(&Local)
        .format("%Y-%m-%d %H:%M")
        .to_string()
}
