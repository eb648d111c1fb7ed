//! Core module - configuration, access and saved history

pub mod access;
pub mod config;
pub mod identity;
pub mod store;

pub use access::{authorize, authorize_optional, AccessError, Capability};
pub use config::Config;
pub use identity::{CalculationId, CalculationRef, IdParseError};
pub use store::{HistoryStore, SavedCalculation, StoreError, DEFAULT_LIST_LIMIT};
