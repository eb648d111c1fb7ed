//! YAML plan files
//!
//! A plan file describes one inspection visit. Every field is optional; what
//! it leaves out comes from the configured defaults.
//!
//! ```yaml
//! factory_name: Dongguan Plant 2
//! inspection_level: II
//! aql_major: "2.5"
//! aql_minor: "4.0"
//! include_travel_time: true
//! travel_route: Shenzhen -> Dongguan
//! pos:
//!   - po_number: PO-001
//!     quantity: 1000
//!   - po_number: PO-002
//!     quantity: 5000
//!     functional_test_level: S-3
//!     functional_test_time_per_unit: 5
//! ```

use miette::{Diagnostic, NamedSource, SourceSpan};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::sampling::{CalculationInput, InspectionLevel, PurchaseOrderInput, QualityLimit};

/// Plan file contents, all fields optional
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlanFile {
    pub factory_name: Option<String>,
    pub inspection_level: Option<InspectionLevel>,
    pub aql_major: Option<QualityLimit>,
    pub aql_minor: Option<QualityLimit>,
    pub pos: Vec<PurchaseOrderInput>,
    pub preparation_time_minutes: Option<f64>,
    pub sampling_time_minutes: Option<f64>,
    pub inspection_time_per_unit_minutes: Option<f64>,
    pub packing_check_time_minutes: Option<f64>,
    pub report_time_minutes: Option<f64>,
    pub travel_time_minutes: Option<f64>,
    pub include_travel_time: Option<bool>,
    pub travel_route: Option<String>,
}

impl PlanFile {
    /// Parse plan YAML, reporting syntax errors against `filename`
    pub fn parse(source: &str, filename: &str) -> Result<Self, PlanFileError> {
        serde_yml::from_str(source)
            .map_err(|e| PlanSyntaxError::from_serde_error(&e, source, filename).into())
    }

    /// Read and parse a plan file from disk
    pub fn load(path: &Path) -> Result<Self, PlanFileError> {
        let source = std::fs::read_to_string(path).map_err(|source| PlanFileError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let plan = Self::parse(&source, &path.display().to_string())?;
        tracing::debug!(path = %path.display(), orders = plan.pos.len(), "loaded plan file");
        Ok(plan)
    }

    /// Overlay this plan on `base`; fields the plan sets win
    pub fn apply_to(self, base: CalculationInput) -> CalculationInput {
        CalculationInput {
            inspection_level: self.inspection_level.unwrap_or(base.inspection_level),
            aql_major: self.aql_major.unwrap_or(base.aql_major),
            aql_minor: self.aql_minor.unwrap_or(base.aql_minor),
            pos: if self.pos.is_empty() { base.pos } else { self.pos },
            preparation_time_minutes: self
                .preparation_time_minutes
                .unwrap_or(base.preparation_time_minutes),
            sampling_time_minutes: self
                .sampling_time_minutes
                .unwrap_or(base.sampling_time_minutes),
            inspection_time_per_unit_minutes: self
                .inspection_time_per_unit_minutes
                .unwrap_or(base.inspection_time_per_unit_minutes),
            packing_check_time_minutes: self
                .packing_check_time_minutes
                .unwrap_or(base.packing_check_time_minutes),
            report_time_minutes: self.report_time_minutes.unwrap_or(base.report_time_minutes),
            travel_time_minutes: self.travel_time_minutes.unwrap_or(base.travel_time_minutes),
            include_travel_time: self.include_travel_time.unwrap_or(base.include_travel_time),
            travel_route: self.travel_route.or(base.travel_route),
            factory_name: self.factory_name.or(base.factory_name),
        }
    }
}

/// Plan file syntax or shape error with source location
#[derive(Debug, Error, Diagnostic)]
#[error("invalid plan file: {message}")]
#[diagnostic(code(inspcalc::plan::syntax))]
pub struct PlanSyntaxError {
    #[source_code]
    src: NamedSource<String>,

    #[label("here")]
    span: SourceSpan,

    #[help]
    help: Option<String>,

    message: String,
}

impl PlanSyntaxError {
    pub fn from_serde_error(err: &serde_yml::Error, source: &str, filename: &str) -> Self {
        let (line, column) = err
            .location()
            .map(|loc| (loc.line(), loc.column()))
            .unwrap_or((1, 1));

        let offset = line_col_to_offset(source, line, column);
        let message = err.to_string();
        let help = plan_help(&message);

        Self {
            src: NamedSource::new(filename, source.to_string()),
            span: SourceSpan::from(offset..offset.saturating_add(1)),
            help,
            message,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Errors loading a plan file
#[derive(Debug, Error, Diagnostic)]
pub enum PlanFileError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Syntax(#[from] PlanSyntaxError),

    #[error("cannot read plan file {path}")]
    #[diagnostic(code(inspcalc::plan::io))]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Byte offset of a 1-based line/column
fn line_col_to_offset(source: &str, line: usize, column: usize) -> usize {
    let mut line_start = 0;
    for (i, text) in source.split_inclusive('\n').enumerate() {
        if i + 1 == line {
            let within = text
                .char_indices()
                .nth(column.saturating_sub(1))
                .map(|(j, _)| j)
                .unwrap_or(text.len().saturating_sub(1));
            return line_start + within;
        }
        line_start += text.len();
    }
    source.len().saturating_sub(1)
}

/// Hints for the mistakes people make writing plans by hand
fn plan_help(message: &str) -> Option<String> {
    let msg = message.to_lowercase();

    if msg.contains("unknown field") {
        return Some(
            "check the key spelling; see `inspcalc plan new` for every supported key".to_string(),
        );
    }
    if msg.contains("unknown variant") || msg.contains("inspection level") {
        return Some("inspection levels are I, II, S-3 and S-4".to_string());
    }
    if msg.contains("quality limit") {
        return Some("quality limits are 2.5 or 4.0".to_string());
    }
    if msg.contains("invalid value: integer") || msg.contains("invalid type") {
        return Some(
            "quantities are positive whole numbers; times are minutes (decimals allowed)"
                .to_string(),
        );
    }
    if msg.contains("tab") {
        return Some("YAML indentation must use spaces, not tabs".to_string());
    }
    if msg.contains("missing field") {
        return Some("each order needs at least `po_number` and `quantity`".to_string());
    }

    None
}
