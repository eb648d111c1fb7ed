//! `inspcalc calc` command - sampling plans and inspection time
//!
//! Input is layered: configured defaults, then the plan file (`--file`), then
//! flags. Orders given with `--po` or `--po-file` replace the plan's list.

use console::style;
use miette::Result;
use std::path::PathBuf;

use crate::cli::helpers::{capability, open_store};
use crate::cli::report::{self, ReportOptions};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::Config;
use crate::plan::{load_orders_csv, parse_order_spec, validate, PlanFile};
use crate::sampling::{calculate, CalculationInput, InspectionLevel, QualityLimit};

#[derive(clap::Args, Debug, Default)]
pub struct CalcArgs {
    /// Plan file (YAML) with orders and settings
    #[arg(long, value_name = "PLAN")]
    pub file: Option<PathBuf>,

    /// Order as QTY, LABEL:QTY or LABEL:QTY:LEVEL:MIN (repeatable)
    #[arg(long = "po", value_name = "SPEC")]
    pub po: Vec<String>,

    /// CSV file of orders (po_number,quantity[,functional_test_level,functional_test_time_per_unit])
    #[arg(long, value_name = "CSV")]
    pub po_file: Option<PathBuf>,

    /// Inspection level
    #[arg(long, short = 'l')]
    pub level: Option<InspectionLevel>,

    /// AQL for major defects
    #[arg(long)]
    pub aql_major: Option<QualityLimit>,

    /// AQL for minor defects
    #[arg(long)]
    pub aql_minor: Option<QualityLimit>,

    /// Preparation time (minutes)
    #[arg(long, value_name = "MIN")]
    pub prep: Option<f64>,

    /// Sampling time per order (minutes)
    #[arg(long, value_name = "MIN")]
    pub sampling: Option<f64>,

    /// Inspection time per sampled unit (minutes)
    #[arg(long, value_name = "MIN")]
    pub inspection: Option<f64>,

    /// Packing check time (minutes)
    #[arg(long, value_name = "MIN")]
    pub packing: Option<f64>,

    /// Report writing time (minutes)
    #[arg(long, value_name = "MIN")]
    pub report: Option<f64>,

    /// Travel time (minutes)
    #[arg(long, value_name = "MIN")]
    pub travel: Option<f64>,

    /// Add travel time to the total
    #[arg(long, conflicts_with = "no_travel")]
    pub include_travel: bool,

    /// Leave travel time out of the total
    #[arg(long)]
    pub no_travel: bool,

    /// Travel route description
    #[arg(long)]
    pub route: Option<String>,

    /// Factory name
    #[arg(long)]
    pub factory: Option<String>,

    /// Show how each number was derived
    #[arg(long)]
    pub explain: bool,

    /// Save the calculation to history
    #[arg(long)]
    pub save: bool,

    /// Name for the saved calculation
    #[arg(long, requires = "save")]
    pub name: Option<String>,
}

/// Run the calc command
pub fn run(args: CalcArgs, global: &GlobalOpts) -> Result<()> {
    let config = Config::load();
    let input = build_input(&args, config.calculation_defaults())?;

    validate(&input)?;
    let result = calculate(&input);
    tracing::debug!(
        orders = input.pos.len(),
        total_samples = result.total_samples,
        total_hours = result.total_hours,
        "calculated"
    );

    let format = global
        .format
        .resolve(config.default_format.as_deref(), OutputFormat::Tsv);
    let options = ReportOptions {
        explain: args.explain,
        quiet: global.quiet,
        custom_name: args.name.as_deref(),
    };
    print!("{}", report::render(&input, &result, format, options)?);

    if args.save {
        capability(global)?;
        let store = open_store(global, &config)?;
        let id = store.save(&input, &result, args.name.as_deref()).map_err(|e| {
            miette::miette!(
                help = "the result above was not saved; fix the problem and run the command again",
                "{}",
                e
            )
        })?;
        if !global.quiet {
            eprintln!(
                "{} Saved calculation {}",
                style("✓").green(),
                style(id).cyan()
            );
        }
    }

    Ok(())
}

/// Assemble the calculation input from defaults, plan file and flags
pub fn build_input(args: &CalcArgs, defaults: CalculationInput) -> Result<CalculationInput> {
    let mut input = match &args.file {
        Some(path) => PlanFile::load(path)?.apply_to(defaults),
        None => defaults,
    };

    let mut orders = Vec::new();
    if let Some(path) = &args.po_file {
        orders.extend(load_orders_csv(path)?);
    }
    for spec in &args.po {
        orders.push(parse_order_spec(spec, orders.len() + 1)?);
    }
    if !orders.is_empty() {
        input.pos = orders;
    }

    if let Some(level) = args.level {
        input.inspection_level = level;
    }
    if let Some(aql) = args.aql_major {
        input.aql_major = aql;
    }
    if let Some(aql) = args.aql_minor {
        input.aql_minor = aql;
    }
    if let Some(minutes) = args.prep {
        input.preparation_time_minutes = minutes;
    }
    if let Some(minutes) = args.sampling {
        input.sampling_time_minutes = minutes;
    }
    if let Some(minutes) = args.inspection {
        input.inspection_time_per_unit_minutes = minutes;
    }
    if let Some(minutes) = args.packing {
        input.packing_check_time_minutes = minutes;
    }
    if let Some(minutes) = args.report {
        input.report_time_minutes = minutes;
    }
    if let Some(minutes) = args.travel {
        input.travel_time_minutes = minutes;
    }
    if args.include_travel {
        input.include_travel_time = true;
    }
    if args.no_travel {
        input.include_travel_time = false;
    }
    if args.route.is_some() {
        input.travel_route = args.route.clone();
    }
    if args.factory.is_some() {
        input.factory_name = args.factory.clone();
    }

    Ok(input)
}
