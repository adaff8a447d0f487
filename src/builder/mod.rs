//! Visual Studio descriptor generation.
//!
//! This module turns targets into project descriptors and writes the
//! `.vcxproj`, `.vcxproj.filters` and `.sln` files describing them.

pub mod exports;
pub mod filters;
pub mod project;
pub mod solution;
pub mod vcxproj;
pub mod xml;

use uuid::Uuid;

pub use project::{generate, ProjectDescriptor};
pub use solution::{RegistryError, SolutionRegistry};

/// `{XXXXXXXX-XXXX-XXXX-XXXX-XXXXXXXXXXXX}` as Visual Studio writes it.
pub fn guid_string(id: &Uuid) -> String {
    format!("{{{}}}", id.hyphenated().to_string().to_uppercase())
}
