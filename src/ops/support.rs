//! Support files provisioned into the tree before anything is generated.

use std::path::PathBuf;

use anyhow::Result;

use crate::core::LibVariant;
use crate::util::config::SupportConfig;
use crate::util::fs::{provision, read_to_string, write_if_changed};
use crate::util::Layout;

/// Copy the variant-specific support files into place.
///
/// Returns the destinations that were written.
pub fn provision_variant_sources(
    layout: &Layout,
    support: &SupportConfig,
    variant: LibVariant,
) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();
    for copy in &support.copies {
        let src = layout.in_root(&copy.source_for(variant));
        let dst = layout.in_root(&copy.to);
        if provision(&src, &dst)? {
            written.push(dst);
        }
    }
    Ok(written)
}

/// Turn a whitespace-separated symbol table into a C literal block.
///
/// Spaces become commas and every line gains a trailing comma, so the
/// result can be `#include`d inside an array initializer.
pub fn symbol_table_to_literals(text: &str) -> String {
    text.lines()
        .map(|line| format!("{},\n", line.replace(' ', ",")))
        .collect()
}

/// Build the literal block from the configured symbol table and provision it.
///
/// The block is staged in the build directory first, so the destination is
/// only touched when its content actually changes. A missing table is not
/// an error.
pub fn provision_symbol_header(layout: &Layout, support: &SupportConfig) -> Result<bool> {
    let Some(table) = &support.symbol_table else {
        return Ok(false);
    };
    let table = layout.in_root(table);
    if !table.is_file() {
        tracing::debug!("no symbol table at {}", table.display());
        return Ok(false);
    }

    let dst = layout.in_root(&support.symbol_header);
    let staging = layout.solution_dir().join(
        dst.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "symbols.h".to_string()),
    );

    write_if_changed(&staging, &symbol_table_to_literals(&read_to_string(&table)?))?;
    provision(&staging, &dst)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::fixtures::TreeFixture;
    use crate::util::config::SupportCopy;

    #[test]
    fn test_symbol_table_to_literals() {
        assert_eq!(symbol_table_to_literals("1 2 3\n4 5 6\n"), "1,2,3,\n4,5,6,\n");
        assert_eq!(symbol_table_to_literals(""), "");
    }

    #[test]
    fn test_provision_variant_sources() {
        let tree = TreeFixture::flint_like();
        let layout = Layout::new(tree.root(), 19).unwrap();
        let support = SupportConfig::default();

        let written = provision_variant_sources(&layout, &support, LibVariant::Single).unwrap();
        assert_eq!(written.len(), 3);
        assert_eq!(tree.read("fmpz/fmpz.c"), "/* single */\n");
        assert_eq!(tree.read("fmpz-conversions.h"), "#define REENTRANT 0\n");
        assert_eq!(tree.read("fft_tuning.h"), "#define FFT_TAB 1\n");

        let again = provision_variant_sources(&layout, &support, LibVariant::Single).unwrap();
        assert!(again.is_empty());
    }

    #[test]
    fn test_missing_variant_source_is_skipped() {
        let tree = TreeFixture::flint_like();
        let layout = Layout::new(tree.root(), 19).unwrap();
        let support = SupportConfig {
            copies: vec![SupportCopy::new("fmpz-conversions-{variant}.in", "fmpz-conversions.h")],
            ..Default::default()
        };

        // There is no fmpz-conversions-gc.in in the fixture.
        let written = provision_variant_sources(&layout, &support, LibVariant::Gc).unwrap();
        assert!(written.is_empty());
        assert!(!tree.root().join("fmpz-conversions.h").exists());
    }

    #[test]
    fn test_provision_symbol_header() {
        let tree = TreeFixture::flint_like();
        let layout = Layout::new(tree.root(), 19).unwrap();
        let support = SupportConfig::default();

        assert!(provision_symbol_header(&layout, &support).unwrap());
        assert_eq!(tree.read("build.vc/cpimport.h"), "1,2,3,\n4,5,6,\n");
        assert!(layout.solution_dir().join("cpimport.h").is_file());
        assert!(!provision_symbol_header(&layout, &support).unwrap());
    }

    #[test]
    fn test_symbol_header_without_table() {
        let tree = TreeFixture::new();
        let layout = Layout::new(tree.root(), 19).unwrap();
        assert!(!provision_symbol_header(&layout, &SupportConfig::default()).unwrap());
    }
}
