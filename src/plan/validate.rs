//! Caller-side validation of calculation input
//!
//! The engine is total over well-formed input and never checks anything
//! itself, so every path into [`crate::sampling::calculate`] goes through
//! [`validate`] first.

use miette::Diagnostic;
use thiserror::Error;

use crate::sampling::CalculationInput;

/// Why an input was rejected before calculation
#[derive(Debug, Clone, Error, Diagnostic, PartialEq)]
pub enum ValidationError {
    #[error("no purchase orders to inspect")]
    #[diagnostic(
        code(inspcalc::plan::no_orders),
        help("add at least one order, e.g. --po PO-001:1000, or a `pos:` list in the plan file")
    )]
    NoOrders,

    #[error("order #{row} has no PO number")]
    #[diagnostic(code(inspcalc::plan::missing_po_number))]
    MissingPoNumber { row: usize },

    #[error("order #{row} ({po_number}) has quantity 0")]
    #[diagnostic(
        code(inspcalc::plan::zero_quantity),
        help("lot sizes must be positive whole numbers")
    )]
    ZeroQuantity { row: usize, po_number: String },

    #[error("{field} must be a non-negative number of minutes (got {value})")]
    #[diagnostic(code(inspcalc::plan::invalid_time))]
    InvalidTime { field: &'static str, value: f64 },

    #[error("order #{row} ({po_number}) has an invalid functional test time ({value} min/unit)")]
    #[diagnostic(
        code(inspcalc::plan::invalid_functional_time),
        help("use 0 to disable the functional test for this order")
    )]
    InvalidFunctionalTime {
        row: usize,
        po_number: String,
        value: f64,
    },
}

fn check_minutes(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ValidationError::InvalidTime { field, value })
    }
}

/// Check an input is safe to hand to the engine
///
/// Rows are numbered from 1 in errors.
pub fn validate(input: &CalculationInput) -> Result<(), ValidationError> {
    if input.pos.is_empty() {
        return Err(ValidationError::NoOrders);
    }

    for (i, po) in input.pos.iter().enumerate() {
        let row = i + 1;
        if po.po_number.trim().is_empty() {
            return Err(ValidationError::MissingPoNumber { row });
        }
        if po.quantity == 0 {
            return Err(ValidationError::ZeroQuantity {
                row,
                po_number: po.po_number.clone(),
            });
        }
        if let Some(value) = po.functional_test_time_per_unit {
            if !value.is_finite() || value < 0.0 {
                return Err(ValidationError::InvalidFunctionalTime {
                    row,
                    po_number: po.po_number.clone(),
                    value,
                });
            }
        }
    }

    check_minutes("preparation_time_minutes", input.preparation_time_minutes)?;
    check_minutes("sampling_time_minutes", input.sampling_time_minutes)?;
    check_minutes(
        "inspection_time_per_unit_minutes",
        input.inspection_time_per_unit_minutes,
    )?;
    check_minutes("packing_check_time_minutes", input.packing_check_time_minutes)?;
    check_minutes("report_time_minutes", input.report_time_minutes)?;
    check_minutes("travel_time_minutes", input.travel_time_minutes)?;

    Ok(())
}
