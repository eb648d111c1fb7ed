//! Purchase order list input: `--po` specs and CSV files

use miette::Diagnostic;
use std::io::Read;
use std::path::Path;
use thiserror::Error;

use crate::sampling::{InspectionLevel, PurchaseOrderInput};

/// Errors reading purchase orders from the command line or a CSV file
#[derive(Debug, Error, Diagnostic)]
pub enum OrderInputError {
    #[error("invalid order '{spec}': {reason}")]
    #[diagnostic(
        code(inspcalc::orders::spec),
        help("use QTY, LABEL:QTY or LABEL:QTY:LEVEL:MINUTES, e.g. PO-001:1000:S-3:5")
    )]
    Spec { spec: String, reason: String },

    #[error("cannot read order file {path}")]
    #[diagnostic(code(inspcalc::orders::io))]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("bad order on line {line}: {message}")]
    #[diagnostic(
        code(inspcalc::orders::csv),
        help("expected columns: po_number,quantity[,functional_test_level,functional_test_time_per_unit]")
    )]
    Csv { line: u64, message: String },
}

/// Default label for the n-th order (1-based), `PO-001` style
pub fn default_po_label(n: usize) -> String {
    format!("PO-{:03}", n)
}

/// Parse one `--po` argument
///
/// Accepted shapes:
/// - `1000` (label generated from `row`)
/// - `PO-001:1000`
/// - `PO-001:1000:S-3:5` (functional test at S-3, 5 minutes per unit)
pub fn parse_order_spec(spec: &str, row: usize) -> Result<PurchaseOrderInput, OrderInputError> {
    let fail = |reason: &str| OrderInputError::Spec {
        spec: spec.to_string(),
        reason: reason.to_string(),
    };

    let parts: Vec<&str> = spec.split(':').map(str::trim).collect();
    let parse_qty = |s: &str| {
        s.replace(['_', ','], "")
            .parse::<u32>()
            .map_err(|_| fail("quantity must be a positive whole number"))
    };

    let order = match *parts.as_slice() {
        [qty] => PurchaseOrderInput::new(default_po_label(row), parse_qty(qty)?),
        [label, qty] => PurchaseOrderInput::new(label, parse_qty(qty)?),
        [label, qty, level, minutes] => {
            let level: InspectionLevel = level.parse().map_err(|e| fail(&format!("{}", e)))?;
            let minutes: f64 = minutes
                .parse()
                .map_err(|_| fail("functional test minutes must be a number"))?;
            PurchaseOrderInput::new(label, parse_qty(qty)?).with_functional_test(level, minutes)
        }
        _ => return Err(fail("wrong number of ':'-separated fields")),
    };

    Ok(order)
}

/// Read orders from CSV with a header row
pub fn read_orders_csv<R: Read>(reader: R) -> Result<Vec<PurchaseOrderInput>, OrderInputError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .comment(Some(b'#'))
        .from_reader(reader);

    let mut orders = Vec::new();
    for record in rdr.deserialize::<PurchaseOrderInput>() {
        let order = record.map_err(|e| OrderInputError::Csv {
            line: e.position().map(|p| p.line()).unwrap_or(0),
            message: match e.kind() {
                csv::ErrorKind::Deserialize { err, .. } => err.to_string(),
                _ => e.to_string(),
            },
        })?;
        orders.push(order);
    }

    Ok(orders)
}

/// Read orders from a CSV file on disk
pub fn load_orders_csv(path: &Path) -> Result<Vec<PurchaseOrderInput>, OrderInputError> {
    let file = std::fs::File::open(path).map_err(|source| OrderInputError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let orders = read_orders_csv(file)?;
    tracing::debug!(path = %path.display(), count = orders.len(), "loaded orders from csv");
    Ok(orders)
}
