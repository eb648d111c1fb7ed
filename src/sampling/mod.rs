//! Sampling module - ANSI/ASQ Z1.4 sampling plans and time estimation

pub mod calculation;
pub mod engine;
pub mod tables;
pub mod types;

pub use calculation::{
    CalculationInput, CalculationResult, OrderResult, PurchaseOrderInput, TimeBreakdown,
    HOURS_PER_MAN_DAY,
};
pub use engine::{acceptance, calculate, lot_band, plan_order, resolve_code_letter, sample_size};
pub use tables::{AcceptanceNumbers, Breakpoint};
pub use types::{CodeLetter, InspectionLevel, ParseSamplingError, QualityLimit};
