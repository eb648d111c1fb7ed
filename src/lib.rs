//! inspcalc: AQL inspection sampling and labor time calculator
//!
//! Resolves ANSI/ASQ Z1.4 sampling plans for purchase orders and estimates
//! how long an inspection visit takes.

pub mod cli;
pub mod core;
pub mod plan;
pub mod sampling;
pub mod template;
