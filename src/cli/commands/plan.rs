//! `inspcalc plan` command - starter plan files and plan checks

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};
use std::fs;
use std::path::PathBuf;

use crate::cli::GlobalOpts;
use crate::core::Config;
use crate::plan::{validate, PlanFile};
use crate::template::TemplateGenerator;

#[derive(Subcommand, Debug)]
pub enum PlanCommands {
    /// Write a starter plan file using the configured defaults
    New(NewArgs),

    /// Check a plan file without calculating
    Check(CheckArgs),
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Where to write the plan ("-" for stdout)
    #[arg(long, short = 'o', default_value = "plan.yaml")]
    pub output: PathBuf,

    /// Overwrite an existing file
    #[arg(long)]
    pub force: bool,
}

#[derive(clap::Args, Debug)]
pub struct CheckArgs {
    /// Plan file to check
    pub file: PathBuf,
}

/// Run a plan subcommand
pub fn run(cmd: PlanCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        PlanCommands::New(args) => run_new(args, global),
        PlanCommands::Check(args) => run_check(args, global),
    }
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let defaults = Config::load().calculation_defaults();
    let to_stdout = args.output.as_os_str() == "-";
    let filename = if to_stdout {
        "plan.yaml".to_string()
    } else {
        args.output.display().to_string()
    };

    let generator = TemplateGenerator::new()?;
    let yaml = generator.render_plan(&defaults, &filename)?;

    if to_stdout {
        print!("{}", yaml);
        return Ok(());
    }

    if args.output.exists() && !args.force {
        return Err(miette::miette!(
            help = "use --force to overwrite it",
            "{} already exists",
            args.output.display()
        ));
    }

    fs::write(&args.output, yaml).into_diagnostic()?;
    tracing::debug!(path = %args.output.display(), "wrote starter plan");

    if !global.quiet {
        println!(
            "{} Created plan {}",
            style("✓").green(),
            style(args.output.display()).cyan()
        );
        println!(
            "   Edit the orders, then run {}",
            style(format!("inspcalc calc --file {}", args.output.display())).yellow()
        );
    }

    Ok(())
}

fn run_check(args: CheckArgs, global: &GlobalOpts) -> Result<()> {
    let defaults = Config::load().calculation_defaults();
    let input = PlanFile::load(&args.file)?.apply_to(defaults);
    validate(&input)?;

    if !global.quiet {
        println!(
            "{} {} is valid ({} order(s), level {})",
            style("✓").green(),
            style(args.file.display()).cyan(),
            input.pos.len(),
            input.inspection_level
        );
    }

    Ok(())
}
