//! slngen - Visual Studio solution and project generator for FLINT
//!
//! This crate classifies a FLINT source tree and writes the `.vcxproj`,
//! `.vcxproj.filters` and `.sln` files that build it with MSBuild, keeping
//! project identifiers stable across regenerations.

pub mod builder;
pub mod core;
pub mod ops;
pub mod scan;
pub mod util;

/// Test utilities for slngen unit tests.
///
/// This module is only available when compiling with `--cfg test` or
/// running tests. It lays out miniature source trees on disk.
#[cfg(test)]
pub mod test_support;

pub use builder::{ProjectDescriptor, SolutionRegistry};
pub use core::{ArtifactKind, SourceInventory, TargetSpec};
pub use util::{Config, Layout};
