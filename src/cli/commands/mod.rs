//! CLI command implementations

pub mod access;
pub mod calc;
pub mod completions;
pub mod config;
pub mod history;
pub mod plan;
pub mod tables;
