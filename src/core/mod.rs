//! Core data structures for slngen.
//!
//! - The build matrix axes (platforms, configurations, cells)
//! - Targets and artifact kinds
//! - The classified source inventory

pub mod inventory;
pub mod platform;
pub mod target;

pub use inventory::{SourceFile, SourceInventory};
pub use platform::{matrix, Cell, Configuration, Platform};
pub use target::{ArtifactKind, LibVariant, TargetSpec};
