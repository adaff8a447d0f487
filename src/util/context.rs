//! Paths derived from the source root and toolset selector.
//!
//! ```text
//! <root>/                      source tree
//! <root>/build.vc/             hand-written support files and slngen.toml
//! <root>/build.vs<N>/          generated solution, one directory per project
//! <root>/build.vs<N>/<name>-tests/   batched test solutions
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Name of the optional configuration file inside the aux directory.
pub const CONFIG_FILE_NAME: &str = "slngen.toml";

/// Directory layout for one generation run.
#[derive(Debug, Clone)]
pub struct Layout {
    root: PathBuf,
    vs_version: u32,
}

impl Layout {
    /// Create a layout rooted at `root`, which must exist.
    pub fn new(root: &Path, vs_version: u32) -> Result<Self> {
        let root = root
            .canonicalize()
            .with_context(|| format!("source root not found: {}", root.display()))?;
        Ok(Layout { root, vs_version })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn vs_version(&self) -> u32 {
        self.vs_version
    }

    /// Name of the generated build directory, e.g. `build.vs19`.
    pub fn build_dir_name(&self) -> String {
        format!("build.vs{}", self.vs_version)
    }

    /// Directory holding the generated solution.
    pub fn solution_dir(&self) -> PathBuf {
        self.root.join(self.build_dir_name())
    }

    /// Directory holding hand-written support files.
    pub fn aux_dir(&self) -> PathBuf {
        self.root.join("build.vc")
    }

    pub fn config_path(&self) -> PathBuf {
        self.aux_dir().join(CONFIG_FILE_NAME)
    }

    /// Per-toolset values as shipped in the aux directory.
    pub fn version_info_source(&self) -> PathBuf {
        self.aux_dir()
            .join(format!("version_info{}.toml", self.vs_version))
    }

    /// Per-toolset values as provisioned into the build directory.
    pub fn version_info_path(&self) -> PathBuf {
        self.solution_dir().join("version_info.toml")
    }

    /// `build.vs<N>/<name>/<name>.vcxproj`
    pub fn project_path(&self, name: &str) -> PathBuf {
        self.solution_dir()
            .join(name)
            .join(format!("{}.vcxproj", name))
    }

    /// `build.vs<N>/<name>.sln`
    pub fn solution_path(&self, name: &str) -> PathBuf {
        self.solution_dir().join(format!("{}.sln", name))
    }

    /// Resolve a `/`-separated path relative to the root.
    pub fn in_root(&self, rel: &str) -> PathBuf {
        rel.split('/')
            .filter(|p| !p.is_empty())
            .fold(self.root.clone(), |acc, p| acc.join(p))
    }
}
