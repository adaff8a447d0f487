//! Source tree classification.
//!
//! One walk over the source root sorts every recognized file into a
//! [`SourceInventory`]. The directory a file sits in decides its role:
//!
//! | parent directory | role |
//! |---|---|
//! | `tune` | skipped |
//! | `test` | test program (C++ test if an ancestor is `flintxx`) |
//! | `profile` | profiling program |
//! | `flintxx` | C++ interface source or header |
//! | anything else | library source (module = parent) or public header |

use std::path::{Component, Path};
use std::sync::LazyLock;

use regex::Regex;
use walkdir::{DirEntry, WalkDir};

use crate::core::{SourceFile, SourceInventory};

/// Names containing this are template-expanded code and never compiled directly.
pub const TEMPLATE_MARKER: &str = "template";

const TUNE_DIR: &str = "tune";
const TEST_DIR: &str = "test";
const PROFILE_DIR: &str = "profile";
const CXX_DIR: &str = "flintxx";

/// Generated IDE folders such as `build.vs19` or `win.vc14`.
static BUILD_DIR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\.v(c|s)\d+").unwrap());

/// Walk `root` and classify every file with a recognized extension.
///
/// Unreadable entries are logged and left out; the walk never fails.
pub fn classify(root: &Path, ignore_dirs: &[String], extensions: &[String]) -> SourceInventory {
    let mut inventory = SourceInventory::default();

    let walker = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_pruned(e, ignore_dirs));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!("Failed to access directory entry: {}", e);
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        let Ok(rel) = entry.path().strip_prefix(root) else {
            continue;
        };

        classify_file(rel, extensions, &mut inventory);
    }

    inventory.sort();
    tracing::debug!("classified {} files under {}", inventory.len(), root.display());
    inventory
}

/// Whether the walk should skip `entry` and, for directories, everything under it.
fn is_pruned(entry: &DirEntry, ignore_dirs: &[String]) -> bool {
    let name = entry.file_name().to_string_lossy();

    if name.contains(TEMPLATE_MARKER) {
        return true;
    }

    if entry.file_type().is_dir()
        && (ignore_dirs.iter().any(|d| *d == name) || BUILD_DIR.is_match(&name))
    {
        tracing::debug!("pruned {}", entry.path().display());
        return true;
    }

    false
}

fn classify_file(rel: &Path, extensions: &[String], inventory: &mut SourceInventory) {
    let parts: Vec<String> = rel
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();

    let Some((file_name, dirs)) = parts.split_last() else {
        return;
    };

    let (stem, ext) = match file_name.rfind('.') {
        Some(i) if i > 0 => (&file_name[..i], &file_name[i..]),
        _ => return,
    };
    if !extensions.iter().any(|x| x == ext) {
        return;
    }

    let path = parts.join("/");
    let parent = dirs.last().map(String::as_str).unwrap_or("");
    let grandparent = if dirs.len() >= 2 {
        dirs[dirs.len() - 2].as_str()
    } else {
        ""
    };
    let is_header = ext == ".h";

    match parent {
        TUNE_DIR => {}
        TEST_DIR => {
            let file = SourceFile::new(grandparent, path);
            if dirs[..dirs.len() - 1].iter().any(|d| d.contains(CXX_DIR)) {
                inventory.cxx_tests.push(file);
            } else {
                inventory.tests.push(file);
            }
        }
        PROFILE_DIR => inventory.profiles.push(SourceFile::new(grandparent, path)),
        CXX_DIR if is_header => inventory.cxx_headers.push(path),
        CXX_DIR => inventory.cxx_sources.push(SourceFile::new(parent, path)),
        _ if is_header => {
            if stem.ends_with("xx") {
                inventory.cxx_headers.push(path);
            } else {
                inventory.headers.push(path);
            }
        }
        _ if ext == ".c" => inventory.lib_sources.push(SourceFile::new(parent, path)),
        _ => inventory.cxx_sources.push(SourceFile::new(parent, path)),
    }
}
