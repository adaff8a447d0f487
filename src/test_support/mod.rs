//! Test utilities for slngen unit tests.
//!
//! Provides throwaway source trees laid out the way the classifier and the
//! orchestrator expect them.
//!
//! # Example
//!
//! ```rust,ignore
//! use slngen::test_support::fixtures::TreeFixture;
//!
//! #[test]
//! fn test_example() {
//!     let tree = TreeFixture::new()
//!         .file("fmpz/add.c", "void fmpz_add(void) {}\n")
//!         .file("fmpz.h", "void fmpz_add(void);\n");
//!
//!     // Classify or generate against tree.root()...
//! }
//! ```

pub mod fixtures;
