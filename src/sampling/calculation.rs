//! Calculation input and result structures

use serde::{Deserialize, Serialize};

use super::tables::AcceptanceNumbers;
use super::types::{CodeLetter, InspectionLevel, QualityLimit};

/// Length of one working day, used for man-days and the approval threshold
pub const HOURS_PER_MAN_DAY: f64 = 10.0;

/// One purchase order to be inspected
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseOrderInput {
    /// PO number or other reference label
    pub po_number: String,

    /// Lot size
    pub quantity: u32,

    /// Inspection level used to size the functional test sample
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub functional_test_level: Option<InspectionLevel>,

    /// Minutes to functionally test one unit
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub functional_test_time_per_unit: Option<f64>,
}

impl PurchaseOrderInput {
    pub fn new(po_number: impl Into<String>, quantity: u32) -> Self {
        Self {
            po_number: po_number.into(),
            quantity,
            functional_test_level: None,
            functional_test_time_per_unit: None,
        }
    }

    /// Attach a functional test at `level`, taking `minutes_per_unit` per sample
    pub fn with_functional_test(mut self, level: InspectionLevel, minutes_per_unit: f64) -> Self {
        self.functional_test_level = Some(level);
        self.functional_test_time_per_unit = Some(minutes_per_unit);
        self
    }

    /// Functional test level and per-unit minutes, if the test applies.
    /// A level paired with a zero time has no effect.
    pub fn functional_test(&self) -> Option<(InspectionLevel, f64)> {
        match (self.functional_test_level, self.functional_test_time_per_unit) {
            (Some(level), Some(minutes)) if minutes > 0.0 => Some((level, minutes)),
            _ => None,
        }
    }
}

/// Everything one calculation needs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationInput {
    pub inspection_level: InspectionLevel,
    pub aql_major: QualityLimit,
    pub aql_minor: QualityLimit,

    /// Orders in inspection order
    pub pos: Vec<PurchaseOrderInput>,

    pub preparation_time_minutes: f64,
    /// Charged once per purchase order
    pub sampling_time_minutes: f64,
    pub inspection_time_per_unit_minutes: f64,
    pub packing_check_time_minutes: f64,
    pub report_time_minutes: f64,
    pub travel_time_minutes: f64,
    pub include_travel_time: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub travel_route: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub factory_name: Option<String>,
}

impl Default for CalculationInput {
    fn default() -> Self {
        Self {
            inspection_level: InspectionLevel::II,
            aql_major: QualityLimit::Aql2_5,
            aql_minor: QualityLimit::Aql4_0,
            pos: Vec::new(),
            preparation_time_minutes: 30.0,
            sampling_time_minutes: 10.0,
            inspection_time_per_unit_minutes: 2.5,
            packing_check_time_minutes: 30.0,
            report_time_minutes: 45.0,
            travel_time_minutes: 180.0,
            include_travel_time: false,
            travel_route: None,
            factory_name: None,
        }
    }
}

/// Sampling plan derived for one purchase order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderResult {
    pub po_number: String,
    pub quantity: u32,
    pub code_letter: CodeLetter,
    pub sample_size: u32,
    pub ac_major: u32,
    pub re_major: u32,
    pub ac_minor: u32,
    pub re_minor: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub functional_test_code_letter: Option<CodeLetter>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub functional_test_sample_size: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub functional_test_time_minutes: Option<f64>,
}

impl OrderResult {
    pub fn major(&self) -> AcceptanceNumbers {
        AcceptanceNumbers {
            ac: self.ac_major,
            re: self.re_major,
        }
    }

    pub fn minor(&self) -> AcceptanceNumbers {
        AcceptanceNumbers {
            ac: self.ac_minor,
            re: self.re_minor,
        }
    }

    pub fn has_functional_test(&self) -> bool {
        self.functional_test_sample_size.is_some()
    }
}

/// Time per task category, in hours
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TimeBreakdown {
    pub preparation_hours: f64,
    pub sampling_hours: f64,
    pub inspection_hours: f64,
    pub functional_test_hours: f64,
    pub packing_check_hours: f64,
    pub report_hours: f64,
    /// Reported even when travel is not included in the total
    pub travel_hours: f64,
    pub subtotal_without_travel: f64,
}

/// Aggregate result of one calculation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationResult {
    pub po_results: Vec<OrderResult>,
    pub total_samples: u32,
    pub total_man_days: f64,
    pub total_hours: f64,
    /// More than one working day; the visit needs approval
    pub exceeds_one_day: bool,
    pub include_travel_time: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub travel_route: Option<String>,

    pub breakdown: TimeBreakdown,
}

impl CalculationResult {
    /// Sum of functional test samples across orders
    pub fn functional_test_samples(&self) -> u32 {
        self.po_results
            .iter()
            .filter_map(|r| r.functional_test_sample_size)
            .sum()
    }
}
