//! High-level operations.
//!
//! This module contains the implementation of slngen's generation run.

pub mod generate;
pub mod support;

pub use generate::{generate, list, run, GenerateOptions, GenerateSummary};
pub use support::{provision_symbol_header, provision_variant_sources, symbol_table_to_literals};
