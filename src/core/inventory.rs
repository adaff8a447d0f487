//! The result of one classification pass over a source tree.

use serde::Serialize;

/// A source file and the module that owns it.
///
/// `path` is relative to the source root and always uses `/` separators, so
/// an inventory is identical on every machine.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct SourceFile {
    pub module: String,
    pub path: String,
}

impl SourceFile {
    pub fn new(module: impl Into<String>, path: impl Into<String>) -> Self {
        SourceFile {
            module: module.into(),
            path: path.into(),
        }
    }

    /// File name without its directory.
    pub fn file_name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }

    /// File name without directory or extension.
    pub fn stem(&self) -> &str {
        let name = self.file_name();
        match name.rfind('.') {
            Some(i) if i > 0 => &name[..i],
            _ => name,
        }
    }

    /// Name of the directory containing the file.
    pub fn parent_dir(&self) -> &str {
        let mut parts = self.path.rsplit('/');
        parts.next();
        parts.next().unwrap_or("")
    }
}

/// Every recognized file under a source root, partitioned by role.
///
/// Each sequence is sorted; a file appears in exactly one of them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SourceInventory {
    /// C library sources grouped by owning module
    pub lib_sources: Vec<SourceFile>,
    /// Public C headers
    pub headers: Vec<String>,
    /// C++ interface sources
    pub cxx_sources: Vec<SourceFile>,
    /// C++ interface headers
    pub cxx_headers: Vec<String>,
    /// C test programs grouped by module
    pub tests: Vec<SourceFile>,
    /// C++ test programs grouped by module
    pub cxx_tests: Vec<SourceFile>,
    /// Profiling programs grouped by module
    pub profiles: Vec<SourceFile>,
}

impl SourceInventory {
    /// Sort every sequence.
    pub fn sort(&mut self) {
        self.lib_sources.sort();
        self.headers.sort();
        self.cxx_sources.sort();
        self.cxx_headers.sort();
        self.tests.sort();
        self.cxx_tests.sort();
        self.profiles.sort();
    }

    /// Total number of classified files.
    pub fn len(&self) -> usize {
        self.lib_sources.len()
            + self.headers.len()
            + self.cxx_sources.len()
            + self.cxx_headers.len()
            + self.tests.len()
            + self.cxx_tests.len()
            + self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate over every classified path, regardless of category.
    pub fn all_paths(&self) -> impl Iterator<Item = &str> {
        self.lib_sources
            .iter()
            .map(|f| f.path.as_str())
            .chain(self.headers.iter().map(String::as_str))
            .chain(self.cxx_sources.iter().map(|f| f.path.as_str()))
            .chain(self.cxx_headers.iter().map(String::as_str))
            .chain(self.tests.iter().map(|f| f.path.as_str()))
            .chain(self.cxx_tests.iter().map(|f| f.path.as_str()))
            .chain(self.profiles.iter().map(|f| f.path.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_file_parts() {
        let f = SourceFile::new("fmpz", "fmpz/link/fmpz_single.c");
        assert_eq!(f.file_name(), "fmpz_single.c");
        assert_eq!(f.stem(), "fmpz_single");
        assert_eq!(f.parent_dir(), "link");
    }

    #[test]
    fn test_root_level_file() {
        let f = SourceFile::new("", "printf.c");
        assert_eq!(f.parent_dir(), "");
        assert_eq!(f.stem(), "printf");
    }

    #[test]
    fn test_sort_orders_by_module_then_path() {
        let mut inv = SourceInventory {
            lib_sources: vec![
                SourceFile::new("b", "b/a.c"),
                SourceFile::new("a", "a/z.c"),
                SourceFile::new("a", "a/b.c"),
            ],
            ..Default::default()
        };
        inv.sort();
        let paths: Vec<_> = inv.all_paths().collect();
        assert_eq!(paths, vec!["a/b.c", "a/z.c", "b/a.c"]);
    }
}
