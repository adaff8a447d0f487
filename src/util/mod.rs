//! Shared utilities

pub mod config;
pub mod context;
pub mod fs;
pub mod hash;

pub use config::{Config, VsInfo};
pub use context::Layout;
