//! Project descriptor generation.
//!
//! [`generate`] expands one [`TargetSpec`] over every platform and
//! configuration, resolving compiler, linker and build-event settings for
//! each cell. The result is plain data; `vcxproj::write` turns it into a
//! project file.

use std::collections::HashMap;

use crate::core::{matrix, ArtifactKind, Cell, Configuration, Platform, SourceFile, TargetSpec};
use crate::util::fs::slash_to_windows;
use crate::util::VsInfo;

/// `<Optimization>`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Optimization {
    Disabled,
    Full,
}

impl Optimization {
    pub fn as_str(&self) -> &'static str {
        match self {
            Optimization::Disabled => "Disabled",
            Optimization::Full => "Full",
        }
    }
}

/// `<RuntimeLibrary>`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeLibrary {
    MultiThreaded,
    MultiThreadedDebug,
    MultiThreadedDll,
    MultiThreadedDebugDll,
}

impl RuntimeLibrary {
    /// Pick the runtime for a configuration and artifact kind.
    pub fn select(configuration: Configuration, kind: ArtifactKind) -> Self {
        let dll = matches!(kind, ArtifactKind::DynamicLibrary);
        match (configuration.is_debug(), dll) {
            (false, false) => RuntimeLibrary::MultiThreaded,
            (true, false) => RuntimeLibrary::MultiThreadedDebug,
            (false, true) => RuntimeLibrary::MultiThreadedDll,
            (true, true) => RuntimeLibrary::MultiThreadedDebugDll,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RuntimeLibrary::MultiThreaded => "MultiThreaded",
            RuntimeLibrary::MultiThreadedDebug => "MultiThreadedDebug",
            RuntimeLibrary::MultiThreadedDll => "MultiThreadedDLL",
            RuntimeLibrary::MultiThreadedDebugDll => "MultiThreadedDebugDLL",
        }
    }
}

/// `<DebugInformationFormat>`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebugFormat {
    ProgramDatabase,
    None,
}

impl DebugFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            DebugFormat::ProgramDatabase => "ProgramDatabase",
            DebugFormat::None => "None",
        }
    }
}

/// Resolved `<ClCompile>` settings for one cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileOptions {
    pub optimization: Optimization,
    pub include_dirs: Vec<String>,
    pub defines: Vec<String>,
    pub runtime: RuntimeLibrary,
    pub debug_format: DebugFormat,
}

/// Resolved `<Link>` settings for one cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkOptions {
    pub debug_info: bool,
    pub dependencies: Vec<String>,
}

/// Everything resolved for one `(platform, configuration)` cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellOptions {
    pub cell: Cell,
    pub compile: CompileOptions,
    /// `None` for static libraries
    pub link: Option<LinkOptions>,
    pub pre_build: Vec<String>,
    pub post_build: Vec<String>,
    /// Property sheet imported for this cell
    pub property_sheet: String,
}

/// A source file entry in the descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceItem {
    /// Path as written in the project, relative to the project directory
    pub include: String,
    /// Filter group the file is shown under
    pub module: String,
    /// Listed but not compiled in any cell
    pub excluded: bool,
    /// Subdirectory of `$(IntDir)` for the object file, when names collide
    pub object_dir: Option<String>,
}

/// A fully expanded project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectDescriptor {
    pub name: String,
    pub root_namespace: String,
    pub kind: ArtifactKind,
    pub cells: Vec<CellOptions>,
    pub headers: Vec<String>,
    pub sources: Vec<SourceItem>,
    pub platform_toolset: String,
    pub windows_sdk: String,
    pub tools_version: String,
}

impl ProjectDescriptor {
    pub fn cell(&self, cell: Cell) -> Option<&CellOptions> {
        self.cells.iter().find(|c| c.cell == cell)
    }

    /// Distinct platforms, in emission order.
    pub fn platforms(&self) -> Vec<Platform> {
        let mut platforms: Vec<Platform> = Vec::new();
        for c in &self.cells {
            if !platforms.contains(&c.cell.platform) {
                platforms.push(c.cell.platform);
            }
        }
        platforms
    }
}

/// Expand `target` over the platform × configuration matrix.
pub fn generate(
    target: &TargetSpec,
    platforms: &[Platform],
    configurations: &[Configuration],
    vs: &VsInfo,
) -> ProjectDescriptor {
    let cells = matrix(platforms, configurations)
        .into_iter()
        .map(|cell| resolve_cell(target, cell, vs))
        .collect();

    let headers = target
        .headers
        .iter()
        .map(|h| format!("{}{}", target.root_prefix, slash_to_windows(h)))
        .collect();

    ProjectDescriptor {
        name: target.name.clone(),
        root_namespace: target.root_namespace.clone(),
        kind: target.kind,
        cells,
        headers,
        sources: source_items(target),
        platform_toolset: vs.platform_toolset.clone(),
        windows_sdk: vs.windows_sdk.clone(),
        tools_version: vs.vcx_tool.clone(),
    }
}

fn resolve_cell(target: &TargetSpec, cell: Cell, vs: &VsInfo) -> CellOptions {
    let debug = cell.configuration.is_debug();

    let compile = CompileOptions {
        optimization: if debug {
            Optimization::Disabled
        } else {
            Optimization::Full
        },
        include_dirs: target.include_dirs.clone(),
        defines: resolve_defines(target, cell),
        runtime: RuntimeLibrary::select(cell.configuration, target.kind),
        debug_format: if debug {
            DebugFormat::ProgramDatabase
        } else {
            DebugFormat::None
        },
    };

    let link = target.kind.is_linkable().then(|| LinkOptions {
        debug_info: target.debug_info,
        dependencies: target.link_libs.clone(),
    });

    let p = &target.root_prefix;
    let pre_build = if target.pre_build {
        vec![
            format!(
                r"{p}build.vc\out_copy_rename.bat {p}build.vc\cpimport.h {p}qadic\ cpimport.h"
            ),
            format!(r"{p}build.vc\out_copy_rename.bat {p}build.vc\config.h {p} flint-config.h"),
        ]
    } else {
        Vec::new()
    };

    let post_build = if target.post_build {
        vec![format!(
            r"{p}build.vc\postbuild $(IntDir) {} {}",
            target.kind.extension().to_uppercase(),
            vs.msvc
        )]
    } else {
        Vec::new()
    };

    let property_sheet = format!(
        r"{p}build.vc\{}_{}_{}.props",
        target.suite,
        cell.configuration.as_str().to_lowercase(),
        target.kind.extension()
    );

    CellOptions {
        cell,
        compile,
        link,
        pre_build,
        post_build,
        property_sheet,
    }
}

/// Preprocessor defines for one cell.
///
/// The artifact kind's first define is the debug marker: `_DEBUG` in Debug
/// cells and `NDEBUG` in Release cells.
fn resolve_defines(target: &TargetSpec, cell: Cell) -> Vec<String> {
    let mut defines: Vec<String> = Vec::new();

    let mut kind_defines = target.kind.defines().iter();
    if let Some(marker) = kind_defines.next() {
        let prefix = if cell.configuration.is_debug() { "_" } else { "N" };
        defines.push(format!("{}{}", prefix, marker));
    }
    defines.extend(kind_defines.map(|d| d.to_string()));
    defines.extend(target.variant.defines().iter().map(|d| d.to_string()));

    if cell.platform.is_64bit() {
        defines.push("_WIN64".to_string());
    }

    defines
}

/// Variant tag encoded in a source's name, if it lives in the variant directory.
///
/// `fmpz/link/fmpz_single.c` has tag `single`.
pub fn variant_tag<'a>(file: &'a SourceFile, variant_dir: &str) -> Option<&'a str> {
    if file.parent_dir() != variant_dir {
        return None;
    }
    let stem = file.stem();
    Some(stem.rsplit('_').next().unwrap_or(stem))
}

fn source_items(target: &TargetSpec) -> Vec<SourceItem> {
    // MSVC names objects after the source stem; stems are case-insensitive.
    let mut stem_counts: HashMap<String, usize> = HashMap::new();
    for file in &target.sources {
        *stem_counts.entry(file.stem().to_lowercase()).or_default() += 1;
    }

    target
        .sources
        .iter()
        .map(|file| {
            let excluded = match variant_tag(file, &target.variant_dir) {
                Some(tag) => tag != target.variant.as_str(),
                None => false,
            };

            let collides = stem_counts
                .get(&file.stem().to_lowercase())
                .is_some_and(|&n| n > 1);
            let object_dir = collides.then(|| {
                let dir = file.path.rsplit_once('/').map(|(d, _)| d).unwrap_or("");
                slash_to_windows(dir)
            });

            SourceItem {
                include: format!("{}{}", target.root_prefix, slash_to_windows(&file.path)),
                module: file.module.clone(),
                excluded,
                object_dir,
            }
        })
        .collect()
}
