//! DLL export support built on the declaration scanner.
//!
//! Two outputs, both off by default: a module-definition file listing every
//! declared symbol, and copies of the public headers with each declaration
//! prefixed by the export macro.

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::scan::DeclarationRecord;
use crate::util::fs::{write_bytes_if_changed, write_if_changed};

/// Directory, under the source root, receiving annotated headers.
pub const ANNOTATED_HEADER_DIR: &str = "win_hdrs";

/// Render a `.def` file exporting every scanned symbol.
///
/// Symbols are listed by header name, then in line order within a header.
pub fn render_def_file(library: &str, declarations: &BTreeMap<String, Vec<DeclarationRecord>>) -> String {
    let mut out = format!("LIBRARY {}\nEXPORTS\n", library);
    for record in declarations.values().flatten() {
        out.push_str("    ");
        out.push_str(&record.symbol);
        out.push('\n');
    }
    out
}

/// Write `<library>.def` into `dir`.
pub fn write_def_file(
    dir: &Path,
    library: &str,
    declarations: &BTreeMap<String, Vec<DeclarationRecord>>,
) -> Result<PathBuf> {
    let path = dir.join(format!("{}.def", library));
    if write_if_changed(&path, &render_def_file(library, declarations))? {
        tracing::info!("wrote {}", path.display());
    }
    Ok(path)
}

/// Prefix the first line of each declaration with `export_macro`.
///
/// Works on raw bytes: everything except the inserted prefixes, including
/// line endings and non-UTF-8 text, is copied through unchanged.
pub fn annotate(text: &[u8], records: &[DeclarationRecord], export_macro: &str) -> Vec<u8> {
    let marked: HashSet<usize> = records.iter().map(|r| r.line).collect();
    let mut out = Vec::with_capacity(text.len() + records.len() * (export_macro.len() + 1));

    for (i, line) in text.split_inclusive(|&b| b == b'\n').enumerate() {
        if marked.contains(&(i + 1)) {
            out.extend_from_slice(export_macro.as_bytes());
            out.push(b' ');
        }
        out.extend_from_slice(line);
    }
    out
}

/// Write annotated copies of every scanned header under `root/win_hdrs`.
///
/// Returns the number of headers written.
pub fn write_annotated_headers(
    root: &Path,
    declarations: &BTreeMap<String, Vec<DeclarationRecord>>,
    export_macro: &str,
) -> Result<usize> {
    let out_dir = root.join(ANNOTATED_HEADER_DIR);
    let mut written = 0;

    for (header, records) in declarations {
        let path = root.join(header);
        let text =
            fs::read(&path).with_context(|| format!("failed to read header: {}", path.display()))?;
        let dest = out_dir.join(header);
        if write_bytes_if_changed(&dest, &annotate(&text, records, export_macro))? {
            tracing::debug!("annotated {}", dest.display());
            written += 1;
        }
    }

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::{scan, scan_text};
    use crate::test_support::fixtures::TreeFixture;

    #[test]
    fn test_def_file_orders_by_header_then_line() {
        let mut map = BTreeMap::new();
        map.insert("b.h".to_string(), scan_text("void b_one(int x);\nint b_two(void);\n"));
        map.insert("a.h".to_string(), scan_text("void a_one(void);\n"));

        assert_eq!(
            render_def_file("dll_flint", &map),
            "LIBRARY dll_flint\nEXPORTS\n    a_one\n    b_one\n    b_two\n"
        );
    }

    #[test]
    fn test_annotate_marks_start_line() {
        let text = "#include <x.h>\nvoid fmpz_add(fmpz_t f,\n    const fmpz_t g);\n";
        let records = scan_text(text);
        let out = annotate(text.as_bytes(), &records, "FLINT_DLL");
        assert_eq!(
            out,
            b"#include <x.h>\nFLINT_DLL void fmpz_add(fmpz_t f,\n    const fmpz_t g);\n"
        );
    }

    #[test]
    fn test_annotate_keeps_crlf() {
        let text = "int a(void);\r\nint b(void);\r\n";
        let out = annotate(text.as_bytes(), &scan_text(text), "FLINT_DLL");
        assert_eq!(out, b"FLINT_DLL int a(void);\r\nFLINT_DLL int b(void);\r\n");
    }

    #[test]
    fn test_annotate_without_trailing_newline() {
        let text = "int a(void);\nint b(void);";
        let out = annotate(text.as_bytes(), &scan_text(text), "X");
        assert_eq!(out, b"X int a(void);\nX int b(void);");
    }

    #[test]
    fn test_latin1_header_is_annotated() {
        let tree = TreeFixture::new();
        let bytes: &[u8] = b"/* Copyright \xe9 */\nint x(void);\n";
        std::fs::write(tree.root().join("x.h"), bytes).unwrap();

        let map = scan(tree.root(), &["x.h".to_string()]).unwrap();
        assert_eq!(map["x.h"].len(), 1);

        assert_eq!(write_annotated_headers(tree.root(), &map, "FLINT_DLL").unwrap(), 1);
        let out = std::fs::read(tree.root().join("win_hdrs/x.h")).unwrap();
        assert_eq!(out, b"/* Copyright \xe9 */\nFLINT_DLL int x(void);\n");
    }

    #[test]
    fn test_write_annotated_headers() {
        let tree = TreeFixture::flint_like();
        let map = scan(tree.root(), &["fmpz.h".to_string(), "nmod_vec.h".to_string()]).unwrap();

        let n = write_annotated_headers(tree.root(), &map, "FLINT_DLL").unwrap();
        assert_eq!(n, 2);

        let fmpz = tree.read("win_hdrs/fmpz.h");
        assert!(fmpz.contains("FLINT_DLL void fmpz_add("));
        let nmod = tree.read("win_hdrs/nmod_vec.h");
        assert!(!nmod.contains("FLINT_DLL FLINT_INLINE"));

        assert_eq!(write_annotated_headers(tree.root(), &map, "FLINT_DLL").unwrap(), 0);
    }

    #[test]
    fn test_write_def_file() {
        let tree = TreeFixture::flint_like();
        let map = scan(tree.root(), &["fmpz.h".to_string()]).unwrap();
        let path = write_def_file(tree.root(), "dll_flint", &map).unwrap();
        let text = std::fs::read_to_string(path).unwrap();
        assert!(text.starts_with("LIBRARY dll_flint\nEXPORTS\n"));
        assert!(text.contains("    fmpz_add\n"));
    }
}
