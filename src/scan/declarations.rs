//! Heuristic scanner for exported function declarations in C headers.
//!
//! This is deliberately not a C parser. It walks a header line by line and
//! recognizes the shape `[word] name(` ... `);`, discarding macro bodies and
//! anything marked inline. Under-matching is acceptable: a missed symbol
//! only loses an export tag. Over-matching is not: tagging an inline body
//! for export breaks the DLL build.
//!
//! Known limitation: a definition written in a header whose body contains a
//! line ending in `);` (even inside a comment or a string) within
//! [`MAX_DECLARATION_LINES`] of its signature is recorded as a declaration.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::Path;
use std::sync::LazyLock;

use anyhow::{Context, Result};
use regex::Regex;

/// Lines a declaration may span before the scanner gives up on it.
///
/// Real prototypes in the tree wrap at most over a handful of lines; longer
/// runs are almost always a function body, so they are dropped rather than
/// risk tagging one.
pub const MAX_DECLARATION_LINES: usize = 5;

/// `[qualifier-or-type] name(` at the start of a line.
static DECL_START: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:([_a-zA-Z][_a-zA-Z0-9]*)\s+)?([_a-zA-Z][_a-zA-Z0-9]*)\(").unwrap()
});

/// `);` followed only by whitespace.
static DECL_END: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s*\);\s*$").unwrap());

/// One declaration found in a header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclarationRecord {
    /// 1-based line on which the declaration starts
    pub line: usize,
    /// Declared function name
    pub symbol: String,
    /// The declaration's lines, trimmed and joined with spaces
    pub text: String,
}

/// A declaration whose terminator has not been seen yet.
struct Pending {
    start: usize,
    symbol: String,
    text: String,
    lines: usize,
}

/// Scan `headers` (relative to `root`) and collect their declarations.
///
/// Headers that do not exist are skipped. Headers without any declaration
/// have no entry in the result.
pub fn scan(root: &Path, headers: &[String]) -> Result<BTreeMap<String, Vec<DeclarationRecord>>> {
    let mut found = BTreeMap::new();

    for header in headers {
        let path = root.join(header);
        let bytes = match std::fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!("header {} vanished, skipping", path.display());
                continue;
            }
            Err(e) => {
                return Err(e).with_context(|| format!("failed to read header: {}", path.display()))
            }
        };

        let records = scan_text(&String::from_utf8_lossy(&bytes));
        if !records.is_empty() {
            found.insert(header.clone(), records);
        }
    }

    Ok(found)
}

/// Scan the text of one header.
///
/// Records come back in line order.
pub fn scan_text(text: &str) -> Vec<DeclarationRecord> {
    let lines: Vec<&str> = text.lines().collect();
    let mut records = Vec::new();
    let mut pending: Option<Pending> = None;
    let mut pos = 0;

    while pos < lines.len() {
        let line = lines[pos].trim();

        if line.is_empty() {
            pos += 1;
            continue;
        }

        if line.starts_with("#define") {
            let mut current = line;
            while current.ends_with('\\') && pos + 1 < lines.len() {
                pos += 1;
                current = lines[pos].trim();
            }
            pos += 1;
            continue;
        }

        if line.to_ascii_uppercase().contains("INLINE") {
            pos = skip_inline_body(&lines, pos);
            pending = None;
            continue;
        }

        match pending.take() {
            None => {
                if let Some(caps) = DECL_START.captures(line) {
                    let symbol = caps[2].to_string();
                    if DECL_END.is_match(line) {
                        records.push(DeclarationRecord {
                            line: pos + 1,
                            symbol,
                            text: line.to_string(),
                        });
                    } else {
                        pending = Some(Pending {
                            start: pos,
                            symbol,
                            text: line.to_string(),
                            lines: 1,
                        });
                    }
                }
            }
            Some(mut decl) => {
                decl.text.push(' ');
                decl.text.push_str(line);
                if DECL_END.is_match(line) {
                    records.push(DeclarationRecord {
                        line: decl.start + 1,
                        symbol: decl.symbol,
                        text: decl.text,
                    });
                } else {
                    decl.lines += 1;
                    if decl.lines < MAX_DECLARATION_LINES {
                        pending = Some(decl);
                    } else {
                        tracing::trace!("gave up on `{}` at line {}", decl.symbol, decl.start + 1);
                    }
                }
            }
        }

        pos += 1;
    }

    records
}

/// Skip an inline definition starting at `start`; returns the next line to scan.
///
/// Once an opening brace has been seen, lines are consumed until the braces
/// balance again (or the file ends). Before any brace, the only other stop
/// is a `);` terminator, which ends an inline prototype. There is no line
/// bound.
fn skip_inline_body(lines: &[&str], start: usize) -> usize {
    let mut depth: i64 = 0;
    let mut opened = false;
    let mut pos = start;

    while pos < lines.len() {
        let line = lines[pos];
        let opens = line.matches('{').count() as i64;
        let closes = line.matches('}').count() as i64;
        depth += opens - closes;
        if opens > 0 {
            opened = true;
        }
        pos += 1;

        if opened {
            if depth <= 0 {
                return pos;
            }
        } else if DECL_END.is_match(line) {
            return pos;
        }
    }

    pos
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn symbols(text: &str) -> Vec<String> {
        scan_text(text).into_iter().map(|r| r.symbol).collect()
    }

    #[test]
    fn test_single_line_declaration() {
        let records = scan_text("int foo(int x);\n");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].symbol, "foo");
        assert_eq!(records[0].line, 1);
        assert_eq!(records[0].text, "int foo(int x);");
    }

    #[test]
    fn test_multi_line_declaration_records_first_line() {
        let text = "\n#include <stdio.h>\n\nvoid fmpz_add(fmpz_t f,\n    const fmpz_t g,\n    const fmpz_t h);\n";
        let records = scan_text(text);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].symbol, "fmpz_add");
        assert_eq!(records[0].line, 4);
        assert_eq!(
            records[0].text,
            "void fmpz_add(fmpz_t f, const fmpz_t g, const fmpz_t h);"
        );
    }

    #[test]
    fn test_one_line_inline_is_skipped() {
        let text = "static inline int bar(void) { return 1; }\nint baz(void);\n";
        assert_eq!(symbols(text), vec!["baz"]);
    }

    #[test]
    fn test_multi_line_inline_body_is_skipped() {
        let text = "FLINT_INLINE\nint helper(int x)\n{\n    if (x) { return g(x); }\n    return h(x);\n}\nvoid after(void);\n";
        assert_eq!(symbols(text), vec!["after"]);
    }

    #[test]
    fn test_long_inline_signature_body_is_skipped() {
        let text = "FLINT_INLINE void\n_fmpz_poly_foo(fmpz * res,\n    const fmpz * a,\n    slong len,\n    const fmpz * b,\n    slong lenb)\n{\n    _fmpz_poly_bar(res, a, len);\n}\n";
        assert!(scan_text(text).is_empty());

        let followed = format!("{}\nvoid _fmpz_poly_after(fmpz * res);\n", text);
        assert_eq!(symbols(&followed), vec!["_fmpz_poly_after"]);
    }

    #[test]
    fn test_inline_prototype_is_skipped() {
        let text = "FLINT_INLINE int quick(int x);\nint slow(int x);\n";
        assert_eq!(symbols(text), vec!["slow"]);
    }

    #[test]
    fn test_macro_bodies_are_discarded() {
        let text = "#define CALL(x) \\\n    do_call(x);\n#define ONE 1\nint real(void);\n";
        assert_eq!(symbols(text), vec!["real"]);
    }

    #[test]
    fn test_long_declaration_is_abandoned() {
        let text = "void huge(int a,\n int b,\n int c,\n int d,\n int e,\n int f);\nint ok(void);\n";
        assert_eq!(symbols(text), vec!["ok"]);
    }

    #[test]
    fn test_five_line_declaration_is_kept() {
        let text = "void wide(int a,\n int b,\n int c,\n int d,\n int e);\n";
        let records = scan_text(text);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].line, 1);
    }

    #[test]
    fn test_terminator_inside_body_comment_ends_declaration() {
        // Heuristic limitation: the comment's `);` closes the "declaration".
        let text = "int helper(int x)\n{\n    // see also other(x);\n}\n";
        let records = scan_text(text);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].symbol, "helper");
    }

    #[test]
    fn test_records_are_in_line_order() {
        let text = "int a(void);\nint b(void);\n\nint c(int x,\n      int y);\n";
        let lines: Vec<_> = scan_text(text).iter().map(|r| r.line).collect();
        assert_eq!(lines, vec![1, 2, 4]);
    }

    #[test]
    fn test_scan_skips_missing_headers() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("a.h"), "int a(void);\n").unwrap();
        std::fs::write(tmp.path().join("empty.h"), "#define X 1\n").unwrap();

        let found = scan(
            tmp.path(),
            &["a.h".to_string(), "gone.h".to_string(), "empty.h".to_string()],
        )
        .unwrap();

        assert_eq!(found.len(), 1);
        assert_eq!(found["a.h"][0].symbol, "a");
    }
}
