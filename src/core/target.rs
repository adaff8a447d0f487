//! Target definitions - what gets described.
//!
//! A `TargetSpec` is one logical buildable unit before it is expanded over
//! platforms and configurations: an executable, a static library, or a DLL.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::inventory::SourceFile;

/// The kind of artifact a project produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    /// Console executable (.exe)
    #[serde(alias = "exe", alias = "app")]
    Application,

    /// Static library (.lib)
    #[serde(alias = "lib", alias = "static")]
    StaticLibrary,

    /// Dynamic library (.dll)
    #[serde(alias = "dll", alias = "dynamic")]
    DynamicLibrary,
}

impl ArtifactKind {
    /// Value of `<ConfigurationType>`.
    pub fn configuration_type(&self) -> &'static str {
        match self {
            ArtifactKind::Application => "Application",
            ArtifactKind::StaticLibrary => "StaticLibrary",
            ArtifactKind::DynamicLibrary => "DynamicLibrary",
        }
    }

    /// File extension without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            ArtifactKind::Application => "exe",
            ArtifactKind::StaticLibrary => "lib",
            ArtifactKind::DynamicLibrary => "dll",
        }
    }

    /// Whether the artifact goes through the linker.
    ///
    /// Static libraries are archived by `lib.exe` and get no `<Link>` block.
    pub fn is_linkable(&self) -> bool {
        !matches!(self, ArtifactKind::StaticLibrary)
    }

    /// Fixed preprocessor defines contributed by the artifact kind.
    ///
    /// The first entry is the debug marker stem; the resolver prefixes it
    /// with `_` for Debug and `N` for Release.
    pub fn defines(&self) -> &'static [&'static str] {
        match self {
            ArtifactKind::Application => &["DEBUG", "WIN32", "_CONSOLE", "PTW32_STATIC_LIB"],
            ArtifactKind::StaticLibrary => {
                &["DEBUG", "WIN32", "_LIB", "HAVE_CONFIG_H", "PTW32_STATIC_LIB"]
            }
            ArtifactKind::DynamicLibrary => {
                &["DEBUG", "WIN32", "HAVE_CONFIG_H", "FLINT_BUILD_DLL", "PTW32_BUILD"]
            }
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.configuration_type())
    }
}

/// Memory-management variant of the integer layer.
///
/// Exactly one variant's sources are compiled per target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LibVariant {
    /// Garbage-collected build; contributes no thread-safety defines.
    Gc,
    /// Single-threaded with thread-local storage.
    Single,
    /// Reentrant with thread-local storage.
    #[default]
    Reentrant,
}

impl LibVariant {
    pub fn as_str(&self) -> &'static str {
        match self {
            LibVariant::Gc => "gc",
            LibVariant::Single => "single",
            LibVariant::Reentrant => "reentrant",
        }
    }

    /// Thread-safety defines selected by this variant.
    pub fn defines(&self) -> &'static [&'static str] {
        match self {
            LibVariant::Gc => &[],
            LibVariant::Single => &["FLINT_REENTRANT=0", "HAVE_TLS=1"],
            LibVariant::Reentrant => &["FLINT_REENTRANT=1", "HAVE_TLS=1"],
        }
    }
}

impl fmt::Display for LibVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LibVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "gc" => Ok(LibVariant::Gc),
            "single" => Ok(LibVariant::Single),
            "reentrant" => Ok(LibVariant::Reentrant),
            _ => Err(format!(
                "unknown library variant `{}` (expected gc, single or reentrant)",
                s
            )),
        }
    }
}

/// A logical build target with everything needed to describe it.
#[derive(Debug, Clone)]
pub struct TargetSpec {
    /// Project name (also the output TargetName)
    pub name: String,

    /// Name used for `<RootNamespace>`; usually the same as `name`
    pub root_namespace: String,

    /// What kind of artifact to produce
    pub kind: ArtifactKind,

    /// Public headers, relative to the source root
    pub headers: Vec<String>,

    /// Sources grouped by module, relative to the source root
    pub sources: Vec<SourceFile>,

    /// Additional include directories
    pub include_dirs: Vec<String>,

    /// Additional link dependencies
    pub link_libs: Vec<String>,

    /// Emit the pre-build support-header copies
    pub pre_build: bool,

    /// Emit the post-build script invocation
    pub post_build: bool,

    /// Generate linker debug information
    pub debug_info: bool,

    /// Active library variant
    pub variant: LibVariant,

    /// Directory name holding mutually exclusive variant sources
    pub variant_dir: String,

    /// Name of the enclosing project; selects the `<suite>_<conf>_<ext>.props` sheets
    pub suite: String,

    /// Backslash path from the project file's directory to the source root,
    /// with a trailing separator
    pub root_prefix: String,
}

impl TargetSpec {
    /// Create a target with the given name and kind and nothing else.
    pub fn new(name: impl Into<String>, kind: ArtifactKind) -> Self {
        let name = name.into();
        TargetSpec {
            root_namespace: name.clone(),
            name,
            kind,
            headers: Vec::new(),
            sources: Vec::new(),
            include_dirs: Vec::new(),
            link_libs: Vec::new(),
            pre_build: false,
            post_build: false,
            debug_info: false,
            variant: LibVariant::default(),
            variant_dir: "link".to_string(),
            suite: "flint".to_string(),
            root_prefix: r"..\..\".to_string(),
        }
    }

    pub fn with_root_namespace(mut self, ns: impl Into<String>) -> Self {
        self.root_namespace = ns.into();
        self
    }

    pub fn with_headers(mut self, headers: Vec<String>) -> Self {
        self.headers = headers;
        self
    }

    pub fn with_sources(mut self, sources: Vec<SourceFile>) -> Self {
        self.sources = sources;
        self
    }

    pub fn with_include_dirs(mut self, dirs: Vec<String>) -> Self {
        self.include_dirs = dirs;
        self
    }

    pub fn with_link_libs(mut self, libs: Vec<String>) -> Self {
        self.link_libs = libs;
        self
    }

    /// Enable or disable the pre/post-build hooks together.
    pub fn with_hooks(mut self, pre_build: bool, post_build: bool) -> Self {
        self.pre_build = pre_build;
        self.post_build = post_build;
        self
    }

    pub fn with_debug_info(mut self, debug_info: bool) -> Self {
        self.debug_info = debug_info;
        self
    }

    pub fn with_variant(mut self, variant: LibVariant) -> Self {
        self.variant = variant;
        self
    }

    pub fn with_variant_dir(mut self, dir: impl Into<String>) -> Self {
        self.variant_dir = dir.into();
        self
    }

    pub fn with_suite(mut self, suite: impl Into<String>) -> Self {
        self.suite = suite.into();
        self
    }

    pub fn with_root_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.root_prefix = prefix.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artifact_kind_linkable() {
        assert!(ArtifactKind::Application.is_linkable());
        assert!(ArtifactKind::DynamicLibrary.is_linkable());
        assert!(!ArtifactKind::StaticLibrary.is_linkable());
    }

    #[test]
    fn test_dll_defines_mark_dll_build() {
        assert!(ArtifactKind::DynamicLibrary
            .defines()
            .contains(&"FLINT_BUILD_DLL"));
        assert!(!ArtifactKind::StaticLibrary
            .defines()
            .contains(&"FLINT_BUILD_DLL"));
    }

    #[test]
    fn test_variant_parse() {
        assert_eq!("single".parse::<LibVariant>().unwrap(), LibVariant::Single);
        assert_eq!("GC".parse::<LibVariant>().unwrap(), LibVariant::Gc);
        assert!("threaded".parse::<LibVariant>().is_err());
    }

    #[test]
    fn test_gc_variant_has_no_defines() {
        assert!(LibVariant::Gc.defines().is_empty());
        assert_eq!(LibVariant::Reentrant.defines().len(), 2);
    }
}
