//! Reading the source tree: file classification and header scanning.

pub mod classify;
pub mod declarations;

pub use classify::classify;
pub use declarations::{scan, scan_text, DeclarationRecord, MAX_DECLARATION_LINES};
