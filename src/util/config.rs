//! Configuration file support for slngen.
//!
//! Two files feed a generation run, both optional:
//! - `build.vc/slngen.toml` - what to generate and where dependencies live
//! - `build.vc/version_info<N>.toml` - per-toolset values for selector `N`
//!
//! Anything missing falls back to the defaults below, which describe the
//! stock FLINT layout with sibling `mpir`, `mpfr` and `pthreads` checkouts.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::LibVariant;

/// Toolset selector used when none is given on the command line.
pub const DEFAULT_VS_VERSION: u32 = 19;

/// Errors raised while resolving configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unknown Visual Studio version `{0}` (known: 17, 19, 22; or provide build.vc/version_info{0}.toml)")]
    UnknownVersion(u32),

    #[error("failed to parse {path}: {message}")]
    Malformed { path: String, message: String },
}

/// slngen configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Source-tree settings
    pub project: ProjectConfig,

    /// What to generate
    pub build: BuildConfig,

    /// Dependency include and link paths
    pub paths: PathsConfig,

    /// Generated support files
    pub support: SupportConfig,
}

/// Source-tree settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    /// Project name, used for the solution and the lib_/dll_ project names
    pub name: String,

    /// Directory name holding mutually exclusive variant sources
    pub variant_dir: String,

    /// Macro prepended to exported declarations in annotated headers
    pub export_macro: String,

    /// Directory names pruned from the walk
    pub ignore_dirs: Vec<String>,

    /// File extensions considered at all
    pub extensions: Vec<String>,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        ProjectConfig {
            name: "flint".to_string(),
            variant_dir: "link".to_string(),
            export_macro: "FLINT_DLL".to_string(),
            ignore_dirs: [
                ".git", ".vs", "doc", "examples", "lib", "exe", "dll", "win_hdrs", "link",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            extensions: [".h", ".c", ".cc", ".cpp"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// Build switches.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Generate the static library project
    pub lib: bool,

    /// Generate the DLL project
    pub dll: bool,

    /// Generate one project per test program
    pub tests: bool,

    /// Generate one project per profiling program
    pub profiles: bool,

    /// Active memory-management variant
    pub variant: LibVariant,

    /// Test projects per solution file
    pub batch_size: usize,

    /// Write a module-definition export list for the DLL
    pub def_file: bool,

    /// Write export-annotated copies of the public headers
    pub annotate_headers: bool,
}

impl Default for BuildConfig {
    fn default() -> Self {
        BuildConfig {
            lib: true,
            dll: true,
            tests: false,
            profiles: false,
            variant: LibVariant::default(),
            batch_size: 100,
            def_file: false,
            annotate_headers: false,
        }
    }
}

/// Include directories and link libraries, per target family.
///
/// Paths are written verbatim into the project files, so they are relative
/// to where each project file lives.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub lib_include_dirs: Vec<String>,
    pub lib_link_libs: Vec<String>,
    pub dll_include_dirs: Vec<String>,
    pub dll_link_libs: Vec<String>,
    pub test_include_dirs: Vec<String>,
    pub test_link_libs: Vec<String>,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for PathsConfig {
    fn default() -> Self {
        PathsConfig {
            lib_include_dirs: strings(&[
                r"..\..\",
                r"..\..\build.vc",
                r"..\..\..\mpir\lib\$(IntDir)",
                r"..\..\..\mpfr\lib\$(IntDir)",
                r"..\..\..\pthreads\lib\$(IntDir)",
            ]),
            lib_link_libs: strings(&[
                r"..\..\..\mpir\lib\$(IntDir)mpir.lib",
                r"..\..\..\mpfr\lib\$(IntDir)mpfr.lib",
                r"..\..\..\pthreads\lib\$(IntDir)pthreads.lib",
            ]),
            dll_include_dirs: strings(&[
                r"..\..\",
                r"..\..\build.vc",
                r"..\..\..\mpir\dll\$(IntDir)",
                r"..\..\..\mpfr\dll\$(IntDir)",
                r"..\..\..\pthreads\dll\$(IntDir)",
            ]),
            dll_link_libs: strings(&[
                r"..\..\..\mpir\dll\$(IntDir)mpir.lib",
                r"..\..\..\mpfr\dll\$(IntDir)mpfr.lib",
                r"..\..\..\pthreads\dll\$(IntDir)pthreads.lib",
            ]),
            test_include_dirs: strings(&[
                r"..\..\",
                r"..\..\..\",
                r"..\..\..\..\mpir\lib\$(IntDir)",
                r"..\..\..\..\mpfr\lib\$(IntDir)",
                r"..\..\..\..\pthreads\lib\$(IntDir)",
            ]),
            test_link_libs: strings(&[
                r"..\..\..\lib\$(IntDir)lib_flint.lib",
                r"..\..\..\..\mpir\lib\$(IntDir)mpir.lib",
                r"..\..\..\..\mpfr\lib\$(IntDir)mpfr.lib",
                r"..\..\..\..\pthreads\lib\$(IntDir)pthreads.lib",
            ]),
        }
    }
}

/// A file copied into place before the tree is classified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupportCopy {
    /// Source, relative to the root; `{variant}` is substituted
    pub from: String,
    /// Destination, relative to the root
    pub to: String,
}

impl SupportCopy {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        SupportCopy {
            from: from.into(),
            to: to.into(),
        }
    }

    /// Source path with the variant substituted.
    pub fn source_for(&self, variant: LibVariant) -> String {
        self.from.replace("{variant}", variant.as_str())
    }
}

/// Generated support files.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SupportConfig {
    pub copies: Vec<SupportCopy>,

    /// Plain-text symbol table turned into a literal block
    pub symbol_table: Option<String>,

    /// Where the literal block is provisioned
    pub symbol_header: String,
}

impl Default for SupportConfig {
    fn default() -> Self {
        SupportConfig {
            copies: vec![
                SupportCopy::new("fmpz-conversions-{variant}.in", "fmpz-conversions.h"),
                SupportCopy::new("fmpz/link/fmpz_{variant}.c", "fmpz/fmpz.c"),
                SupportCopy::new("fft_tuning64.in", "fft_tuning.h"),
            ],
            symbol_table: Some("qadic/CPimport.txt".to_string()),
            symbol_header: "build.vc/cpimport.h".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents).map_err(|e| {
            ConfigError::Malformed {
                path: path.display().to_string(),
                message: e.to_string(),
            }
            .into()
        })
    }

    /// Load configuration with fallback to defaults if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }
}

/// Per-toolset values written into every descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VsInfo {
    /// Compiler major version passed to the post-build script
    pub msvc: String,

    /// `<WindowsTargetPlatformVersion>`
    pub windows_sdk: String,

    /// `<PlatformToolset>` without the leading `v`
    pub platform_toolset: String,

    /// `ToolsVersion` attribute of the project file
    pub vcx_tool: String,

    /// `# Visual Studio Version` line of the solution
    pub vs_major: String,

    /// `VisualStudioVersion` of the solution
    pub vs_full: String,
}

impl VsInfo {
    /// Built-in values for a toolset selector.
    pub fn builtin(version: u32) -> Result<Self, ConfigError> {
        let (toolset, sdk, tools, major, full) = match version {
            17 => ("141", "10.0.17763.0", "15.0", "15", "15.0.28307.1000"),
            19 => ("142", "10.0.19041.0", "16.0", "16", "16.0.30114.105"),
            22 => ("143", "10.0.22621.0", "17.0", "17", "17.5.33530.505"),
            other => return Err(ConfigError::UnknownVersion(other)),
        };
        Ok(VsInfo {
            msvc: version.to_string(),
            windows_sdk: sdk.to_string(),
            platform_toolset: toolset.to_string(),
            vcx_tool: tools.to_string(),
            vs_major: major.to_string(),
            vs_full: full.to_string(),
        })
    }

    /// Load per-toolset values from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read version info: {}", path.display()))?;

        toml::from_str(&contents).map_err(|e| {
            ConfigError::Malformed {
                path: path.display().to_string(),
                message: e.to_string(),
            }
            .into()
        })
    }

    /// Use `path` if it exists, otherwise the built-in table.
    pub fn resolve(version: u32, path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::builtin(version)?)
        }
    }
}
