//! Plan module - assembling and checking calculation input

pub mod file;
pub mod orders;
pub mod validate;

pub use file::{PlanFile, PlanFileError, PlanSyntaxError};
pub use orders::{default_po_label, load_orders_csv, parse_order_spec, read_orders_csv, OrderInputError};
pub use validate::{validate, ValidationError};
