//! Calculation output in every supported format

use console::style;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;

use crate::cli::helpers::{format_hours, format_minutes, truncate_str};
use crate::cli::OutputFormat;
use crate::sampling::{
    lot_band, CalculationInput, CalculationResult, OrderResult, HOURS_PER_MAN_DAY,
};
use crate::template::{ReportContext, TemplateGenerator};

/// One CSV row per order
#[derive(Serialize)]
struct CsvRow<'a> {
    po_number: &'a str,
    quantity: u32,
    code_letter: String,
    sample_size: u32,
    ac_major: u32,
    re_major: u32,
    ac_minor: u32,
    re_minor: u32,
    functional_test_code_letter: Option<String>,
    functional_test_sample_size: Option<u32>,
    functional_test_time_minutes: Option<f64>,
}

impl<'a> From<&'a OrderResult> for CsvRow<'a> {
    fn from(r: &'a OrderResult) -> Self {
        Self {
            po_number: &r.po_number,
            quantity: r.quantity,
            code_letter: r.code_letter.to_string(),
            sample_size: r.sample_size,
            ac_major: r.ac_major,
            re_major: r.re_major,
            ac_minor: r.ac_minor,
            re_minor: r.re_minor,
            functional_test_code_letter: r.functional_test_code_letter.map(|c| c.to_string()),
            functional_test_sample_size: r.functional_test_sample_size,
            functional_test_time_minutes: r.functional_test_time_minutes,
        }
    }
}

/// What to print alongside a result
#[derive(Debug, Clone, Copy, Default)]
pub struct ReportOptions<'a> {
    pub explain: bool,
    pub quiet: bool,
    pub custom_name: Option<&'a str>,
}

/// Render a calculation in `format` (already resolved, never `Auto`)
pub fn render(
    input: &CalculationInput,
    result: &CalculationResult,
    format: OutputFormat,
    options: ReportOptions<'_>,
) -> Result<String> {
    match format {
        OutputFormat::Json => {
            let mut json = serde_json::to_string_pretty(result).into_diagnostic()?;
            json.push('\n');
            Ok(json)
        }
        OutputFormat::Yaml => serde_yml::to_string(result).into_diagnostic(),
        OutputFormat::Csv => render_csv(result),
        OutputFormat::Md => {
            let generator = TemplateGenerator::new()?;
            let mut ctx = ReportContext::new(input, result);
            ctx.custom_name = options.custom_name;
            Ok(generator.render_report(&ctx)?)
        }
        OutputFormat::Auto | OutputFormat::Tsv => {
            let mut out = if options.quiet {
                render_summary(result)
            } else {
                render_table(input, result)
            };
            if options.explain {
                out.push('\n');
                out.push_str(&render_explanation(input, result));
            }
            if result.exceeds_one_day {
                out.push('\n');
                out.push_str(&approval_notice());
                out.push('\n');
            }
            Ok(out)
        }
    }
}

/// Orders as CSV with a header row
pub fn render_csv(result: &CalculationResult) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    for row in &result.po_results {
        wtr.serialize(CsvRow::from(row)).into_diagnostic()?;
    }
    let bytes = wtr.into_inner().into_diagnostic()?;
    String::from_utf8(bytes).into_diagnostic()
}

/// One line with the totals
pub fn render_summary(result: &CalculationResult) -> String {
    format!(
        "{} samples, {}, {:.2} man-days\n",
        result.total_samples,
        format_hours(result.total_hours),
        result.total_man_days
    )
}

/// Sampling table plus the time breakdown
pub fn render_table(input: &CalculationInput, result: &CalculationResult) -> String {
    let mut out = String::new();

    if let Some(factory) = input.factory_name.as_deref() {
        out.push_str(&format!("{} {}\n", style("Factory:").bold(), factory));
    }
    out.push_str(&format!(
        "{} {}   {} {} / {}\n\n",
        style("Level:").bold(),
        input.inspection_level,
        style("AQL major/minor:").bold(),
        input.aql_major,
        input.aql_minor
    ));

    out.push_str(&format!(
        "{:<16} {:>8} {:<4} {:>6} {:<7} {:<7} {}\n",
        style("PO").bold(),
        style("QTY").bold(),
        style("CODE").bold(),
        style("SAMPLE").bold(),
        style("MAJOR").bold(),
        style("MINOR").bold(),
        style("FUNC TEST").bold()
    ));
    out.push_str(&format!("{}\n", "-".repeat(68)));

    for r in &result.po_results {
        let (major, minor) = (r.major(), r.minor());
        let functional = match (r.functional_test_sample_size, r.functional_test_time_minutes) {
            (Some(size), Some(minutes)) => format!("{} units, {} min", size, format_minutes(minutes)),
            _ => "-".to_string(),
        };
        out.push_str(&format!(
            "{:<16} {:>8} {:<4} {:>6} {:<7} {:<7} {}\n",
            style(truncate_str(&r.po_number, 16)).cyan(),
            r.quantity,
            r.code_letter,
            r.sample_size,
            format!("{}/{}", major.ac, major.re),
            format!("{}/{}", minor.ac, minor.re),
            functional
        ));
    }

    out.push_str(&format!(
        "\n{} {}\n",
        style("Total samples:").bold(),
        style(result.total_samples).cyan()
    ));
    if result.functional_test_samples() > 0 {
        out.push_str(&format!(
            "{} {}\n",
            style("Functional test samples:").bold(),
            result.functional_test_samples()
        ));
    }

    let b = &result.breakdown;
    let travel_note = if result.include_travel_time {
        String::new()
    } else {
        format!(" {}", style("(not included)").dim())
    };

    out.push_str(&format!("\n{}\n", style("Time breakdown").bold().underlined()));
    for (label, hours) in [
        ("Preparation", b.preparation_hours),
        ("Sampling", b.sampling_hours),
        ("Inspection", b.inspection_hours),
        ("Functional test", b.functional_test_hours),
        ("Packing check", b.packing_check_hours),
        ("Report", b.report_hours),
    ] {
        out.push_str(&format!("  {:<18} {:>9}\n", label, format_hours(hours)));
    }
    out.push_str(&format!(
        "  {:<18} {:>9}{}\n",
        "Travel",
        format_hours(b.travel_hours),
        travel_note
    ));
    if let Some(route) = result.travel_route.as_deref() {
        out.push_str(&format!("  {:<18} {}\n", "Route", route));
    }
    out.push_str(&format!(
        "  {:<18} {:>9}\n",
        "Subtotal",
        format_hours(b.subtotal_without_travel)
    ));
    out.push_str(&format!(
        "  {:<18} {:>9}  ({:.2} man-days)\n",
        style("Total").bold(),
        style(format_hours(result.total_hours)).green(),
        result.total_man_days
    ));

    out
}

/// Step-by-step derivation of every number in the result
pub fn render_explanation(input: &CalculationInput, result: &CalculationResult) -> String {
    let mut out = format!("{}\n", style("How this was calculated").bold().underlined());

    // Results come back in input order; labels may repeat
    for (order, r) in input.pos.iter().zip(&result.po_results) {
        let (min, max) = lot_band(r.quantity, input.inspection_level);
        let band = match max {
            Some(max) => format!("{}-{}", min, max),
            None => format!("{} and over", min),
        };
        out.push_str(&format!(
            "{}: lot {} at level {} falls in {} -> code {}\n",
            style(&r.po_number).cyan(),
            r.quantity,
            input.inspection_level,
            band,
            r.code_letter
        ));
        out.push_str(&format!(
            "  code {} -> sample {} units\n",
            r.code_letter, r.sample_size
        ));
        let (major, minor) = (r.major(), r.minor());
        out.push_str(&format!(
            "  AQL {} (major): accept {}, reject {}\n",
            input.aql_major, major.ac, major.re
        ));
        out.push_str(&format!(
            "  AQL {} (minor): accept {}, reject {}\n",
            input.aql_minor, minor.ac, minor.re
        ));

        if let (Some((level, per_unit)), Some(code), Some(size), Some(minutes)) = (
            order.functional_test(),
            r.functional_test_code_letter,
            r.functional_test_sample_size,
            r.functional_test_time_minutes,
        ) {
            out.push_str(&format!(
                "  functional test at level {} -> code {}, {} units x {} min = {} min\n",
                level,
                code,
                size,
                format_minutes(per_unit),
                format_minutes(minutes)
            ));
        }
    }

    let orders = result.po_results.len();
    out.push_str(&format!(
        "Inspection: {} samples x {} min = {} min\n",
        result.total_samples,
        format_minutes(input.inspection_time_per_unit_minutes),
        format_minutes(f64::from(result.total_samples) * input.inspection_time_per_unit_minutes)
    ));
    out.push_str(&format!(
        "Sampling: {} order(s) x {} min = {} min\n",
        orders,
        format_minutes(input.sampling_time_minutes),
        format_minutes(input.sampling_time_minutes * orders as f64)
    ));
    out.push_str(&format!(
        "Fixed: preparation {} min, packing check {} min, report {} min\n",
        format_minutes(input.preparation_time_minutes),
        format_minutes(input.packing_check_time_minutes),
        format_minutes(input.report_time_minutes)
    ));
    if result.include_travel_time {
        out.push_str(&format!(
            "Travel: {} min\n",
            format_minutes(input.travel_time_minutes)
        ));
    }
    out.push_str(&format!(
        "Total: {} min = {}; / {} h per man-day = {:.2} man-days\n",
        format_minutes(result.total_hours * 60.0),
        format_hours(result.total_hours),
        HOURS_PER_MAN_DAY,
        result.total_man_days
    ));

    out
}

/// Warning shown when a visit runs past one working day
pub fn approval_notice() -> String {
    format!(
        "{} This visit exceeds one {}-hour working day and needs approval.",
        style("⚠").yellow(),
        HOURS_PER_MAN_DAY
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampling::{calculate, InspectionLevel, PurchaseOrderInput};

    fn single() -> (CalculationInput, CalculationResult) {
        let input = CalculationInput {
            pos: vec![PurchaseOrderInput::new("PO-001", 1000)],
            ..Default::default()
        };
        let result = calculate(&input);
        (input, result)
    }

    #[test]
    fn test_table_lists_orders_and_totals() {
        let (input, result) = single();
        let out = render_table(&input, &result);
        assert!(out.contains("PO-001"));
        assert!(out.contains("3/4"));
        assert!(out.contains("7/8"));
        assert!(out.contains("Total samples:"));
        assert!(out.contains("5.25 h"));
        assert!(out.contains("(not included)"));
    }

    #[test]
    fn test_approval_notice_only_when_over_a_day() {
        let (input, result) = single();
        let out = render(&input, &result, OutputFormat::Tsv, ReportOptions::default()).unwrap();
        assert!(!out.contains("needs approval"));

        let input = CalculationInput {
            pos: vec![PurchaseOrderInput::new("PO-001", 1000)
                .with_functional_test(InspectionLevel::II, 5.0)],
            ..Default::default()
        };
        let result = calculate(&input);
        let out = render(&input, &result, OutputFormat::Tsv, ReportOptions::default()).unwrap();
        assert!(out.contains("needs approval"));
    }

    #[test]
    fn test_explanation_walks_through_lookup() {
        let (input, result) = single();
        let out = render_explanation(&input, &result);
        assert!(out.contains("lot 1000 at level II falls in 501-1200 -> code J"));
        assert!(out.contains("code J -> sample 80 units"));
        assert!(out.contains("AQL 2.5 (major): accept 3, reject 4"));
        assert!(out.contains("Inspection: 80 samples x 2.5 min = 200 min"));
        assert!(out.contains("Sampling: 1 order(s) x 10 min = 10 min"));
    }

    #[test]
    fn test_explanation_pairs_repeated_labels_by_position() {
        let input = CalculationInput {
            pos: vec![
                PurchaseOrderInput::new("PO-1", 1000).with_functional_test(InspectionLevel::S3, 5.0),
                PurchaseOrderInput::new("PO-1", 1000).with_functional_test(InspectionLevel::II, 2.0),
            ],
            ..Default::default()
        };
        let result = calculate(&input);
        let out = render_explanation(&input, &result);

        assert!(out.contains("functional test at level S-3 -> code D, 8 units x 5 min = 40 min"));
        assert!(out.contains("functional test at level II -> code J, 80 units x 2 min = 160 min"));
        assert!(!out.contains("level S-3 -> code J"));
    }

    #[test]
    fn test_csv_has_header_and_row_per_order() {
        let input = CalculationInput {
            pos: vec![
                PurchaseOrderInput::new("PO-001", 1000),
                PurchaseOrderInput::new("PO, 2", 5000).with_functional_test(InspectionLevel::S3, 5.0),
            ],
            ..Default::default()
        };
        let result = calculate(&input);
        let csv = render_csv(&result).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("po_number,quantity,code_letter,sample_size"));
        assert_eq!(lines[1], "PO-001,1000,J,80,3,4,7,8,,,");
        assert!(lines[2].starts_with("\"PO, 2\",5000,L,200,"));
    }

    #[test]
    fn test_json_is_full_result() {
        let (input, result) = single();
        let json = render(&input, &result, OutputFormat::Json, ReportOptions::default()).unwrap();
        let parsed: CalculationResult = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, result);
    }

    #[test]
    fn test_quiet_prints_summary_line() {
        let (input, result) = single();
        let options = ReportOptions {
            quiet: true,
            ..Default::default()
        };
        let out = render(&input, &result, OutputFormat::Tsv, options).unwrap();
        assert!(out.starts_with("80 samples, 5.25 h,"));
        assert_eq!(out.lines().count(), 1);
    }
}
