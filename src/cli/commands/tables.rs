//! `inspcalc tables` command - print the Z1.4 lookup tables

use console::style;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use tabled::{builder::Builder, settings::Style, Table};

use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::Config;
use crate::sampling::tables::breakpoints;
use crate::sampling::{
    acceptance, lot_band, resolve_code_letter, sample_size, CodeLetter, InspectionLevel,
    QualityLimit,
};

#[derive(clap::Args, Debug)]
pub struct TablesArgs {
    /// Inspection level for the lot size table (default: all levels)
    #[arg(long, short = 'l')]
    pub level: Option<InspectionLevel>,

    /// Resolve a single lot size instead of printing tables
    #[arg(long, value_name = "QTY", value_parser = clap::value_parser!(u32).range(1..))]
    pub lot: Option<u32>,
}

#[derive(Serialize)]
struct PlanRow {
    code_letter: CodeLetter,
    sample_size: u32,
    aql_2_5: [u32; 2],
    aql_4_0: [u32; 2],
}

#[derive(Serialize)]
struct LotLookup {
    lot_size: u32,
    inspection_level: InspectionLevel,
    lot_min: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    lot_max: Option<u32>,
    #[serde(flatten)]
    plan: PlanRow,
}

fn plan_row(code: CodeLetter) -> PlanRow {
    let low = acceptance(code, QualityLimit::Aql2_5);
    let high = acceptance(code, QualityLimit::Aql4_0);
    PlanRow {
        code_letter: code,
        sample_size: sample_size(code),
        aql_2_5: [low.ac, low.re],
        aql_4_0: [high.ac, high.re],
    }
}

pub fn run(args: TablesArgs, global: &GlobalOpts) -> Result<()> {
    match args.lot {
        Some(lot) => {
            let level = args
                .level
                .unwrap_or_else(|| Config::load().calculation_defaults().inspection_level);
            run_lookup(lot, level, global)
        }
        None => run_tables(args.level, global),
    }
}

fn run_lookup(lot: u32, level: InspectionLevel, global: &GlobalOpts) -> Result<()> {
    let code = resolve_code_letter(lot, level);
    let (lot_min, lot_max) = lot_band(lot, level);
    let lookup = LotLookup {
        lot_size: lot,
        inspection_level: level,
        lot_min,
        lot_max,
        plan: plan_row(code),
    };

    match global.format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&lookup).into_diagnostic()?;
            println!("{}", json);
        }
        OutputFormat::Yaml => {
            let yaml = serde_yml::to_string(&lookup).into_diagnostic()?;
            print!("{}", yaml);
        }
        _ => {
            let band = match lot_max {
                Some(max) => format!("{}-{}", lot_min, max),
                None => format!("{} and over", lot_min),
            };
            println!(
                "Lot {} at level {} ({}): code {}, sample {}",
                style(lot).cyan(),
                level,
                band,
                style(code).cyan().bold(),
                style(lookup.plan.sample_size).cyan()
            );
            println!(
                "  AQL 2.5  Ac {}  Re {}",
                lookup.plan.aql_2_5[0], lookup.plan.aql_2_5[1]
            );
            println!(
                "  AQL 4.0  Ac {}  Re {}",
                lookup.plan.aql_4_0[0], lookup.plan.aql_4_0[1]
            );
        }
    }

    Ok(())
}

fn run_tables(level: Option<InspectionLevel>, global: &GlobalOpts) -> Result<()> {
    let levels: Vec<InspectionLevel> = match level {
        Some(level) => vec![level],
        None => InspectionLevel::ALL.to_vec(),
    };

    match global.format {
        OutputFormat::Json | OutputFormat::Yaml => {
            #[derive(Serialize)]
            struct LevelRow {
                lot_min: u32,
                #[serde(skip_serializing_if = "Option::is_none")]
                lot_max: Option<u32>,
                code_letter: CodeLetter,
            }
            #[derive(Serialize)]
            struct LevelTable {
                inspection_level: InspectionLevel,
                rows: Vec<LevelRow>,
            }
            #[derive(Serialize)]
            struct Dump {
                lot_sizes: Vec<LevelTable>,
                plans: Vec<PlanRow>,
            }

            let dump = Dump {
                lot_sizes: levels
                    .iter()
                    .map(|&level| {
                        let rows = breakpoints(level)
                            .iter()
                            .scan(1u32, |min, bp| {
                                let row = LevelRow {
                                    lot_min: *min,
                                    lot_max: bp.max_lot_size,
                                    code_letter: bp.code,
                                };
                                *min = bp.max_lot_size.map_or(u32::MAX, |m| m.saturating_add(1));
                                Some(row)
                            })
                            .collect();
                        LevelTable {
                            inspection_level: level,
                            rows,
                        }
                    })
                    .collect(),
                plans: CodeLetter::ALL.iter().map(|&c| plan_row(c)).collect(),
            };

            if global.format == OutputFormat::Json {
                println!("{}", serde_json::to_string_pretty(&dump).into_diagnostic()?);
            } else {
                print!("{}", serde_yml::to_string(&dump).into_diagnostic()?);
            }
        }
        format => {
            let style_table = |table: &mut Table| {
                if format == OutputFormat::Md {
                    table.with(Style::markdown());
                } else {
                    table.with(Style::sharp());
                }
            };

            println!("{}", style("Lot size to code letter").bold().underlined());
            let mut builder = Builder::default();
            let mut header = vec!["Lot size".to_string()];
            header.extend(levels.iter().map(|l| l.to_string()));
            builder.push_record(header);

            let mut min = 1u32;
            for (i, bp) in breakpoints(InspectionLevel::II).iter().enumerate() {
                let band = match bp.max_lot_size {
                    Some(max) => format!("{} - {}", min, max),
                    None => format!("{} and over", min),
                };
                let mut record = vec![band];
                record.extend(
                    levels
                        .iter()
                        .map(|&level| {
                            breakpoints(level)
                                .get(i)
                                .map_or_else(|| "-".to_string(), |bp| bp.code.to_string())
                        }),
                );
                builder.push_record(record);
                min = bp.max_lot_size.map_or(u32::MAX, |m| m.saturating_add(1));
            }
            let mut table = builder.build();
            style_table(&mut table);
            println!("{}", table);

            println!();
            println!("{}", style("Sample size and Ac/Re").bold().underlined());
            let mut builder = Builder::default();
            builder.push_record(["Code", "Sample", "AQL 2.5 Ac/Re", "AQL 4.0 Ac/Re"]);
            for code in CodeLetter::ALL {
                let row = plan_row(code);
                builder.push_record([
                    code.to_string(),
                    row.sample_size.to_string(),
                    format!("{}/{}", row.aql_2_5[0], row.aql_2_5[1]),
                    format!("{}/{}", row.aql_4_0[0], row.aql_4_0[1]),
                ]);
            }
            let mut table = builder.build();
            style_table(&mut table);
            println!("{}", table);
        }
    }

    Ok(())
}
