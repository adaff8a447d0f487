//! Implementation of a full generation run.
//!
//! The order matters: support files are provisioned before the tree is
//! classified, so generated sources and headers are picked up on the first
//! run and not only on the next one. Each registry is fully populated
//! before it is written.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};

use crate::builder::exports::{write_annotated_headers, write_def_file};
use crate::builder::{filters, project, vcxproj, SolutionRegistry};
use crate::core::{
    ArtifactKind, Configuration, LibVariant, Platform, SourceFile, SourceInventory, TargetSpec,
};
use crate::ops::support::{provision_symbol_header, provision_variant_sources};
use crate::scan::{classify, scan};
use crate::util::config::DEFAULT_VS_VERSION;
use crate::util::fs::{ensure_dir, provision, remove_file_if_exists};
use crate::util::{Config, Layout, VsInfo};

/// Backslash path from a batched project's directory back to the root.
const BATCH_ROOT_PREFIX: &str = r"..\..\..\";

/// Options for a generation run.
///
/// `None` fields defer to the configuration file.
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    /// Source root
    pub root: PathBuf,

    /// Toolset selector (17, 19, 22, ...)
    pub vs_version: u32,

    /// Generate test projects
    pub tests: Option<bool>,

    /// Generate profiling projects
    pub profiles: Option<bool>,

    /// Active library variant
    pub variant: Option<LibVariant>,

    /// Show a progress bar while batching
    pub progress: bool,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        GenerateOptions {
            root: PathBuf::from("."),
            vs_version: DEFAULT_VS_VERSION,
            tests: None,
            profiles: None,
            variant: None,
            progress: false,
        }
    }
}

impl GenerateOptions {
    /// Resolve the layout and the effective configuration.
    pub fn resolve(&self) -> Result<(Layout, Config)> {
        let layout = Layout::new(&self.root, self.vs_version)?;
        let mut config = Config::load_or_default(&layout.config_path());
        if let Some(tests) = self.tests {
            config.build.tests = tests;
        }
        if let Some(profiles) = self.profiles {
            config.build.profiles = profiles;
        }
        if let Some(variant) = self.variant {
            config.build.variant = variant;
        }
        Ok((layout, config))
    }
}

/// What a run produced.
#[derive(Debug, Default)]
pub struct GenerateSummary {
    /// Number of classified files
    pub classified: usize,

    /// Every project name, in emission order
    pub projects: Vec<String>,

    /// Every solution written
    pub solutions: Vec<PathBuf>,
}

/// Classify the tree without writing anything.
pub fn list(opts: &GenerateOptions) -> Result<SourceInventory> {
    let (layout, config) = opts.resolve()?;
    Ok(classify(
        layout.root(),
        &config.project.ignore_dirs,
        &config.project.extensions,
    ))
}

/// Run a full generation.
pub fn generate(opts: &GenerateOptions) -> Result<GenerateSummary> {
    let (layout, config) = opts.resolve()?;
    run(&layout, &config, opts.progress)
}

/// Run a full generation with an already-resolved configuration.
pub fn run(layout: &Layout, config: &Config, progress: bool) -> Result<GenerateSummary> {
    ensure_dir(&layout.solution_dir())?;

    provision(&layout.version_info_source(), &layout.version_info_path())?;
    let vs = VsInfo::resolve(layout.vs_version(), &layout.version_info_path())?;
    tracing::debug!(
        "toolset v{} with Windows SDK {}",
        vs.platform_toolset,
        vs.windows_sdk
    );

    let variant = config.build.variant;
    provision_variant_sources(layout, &config.support, variant)?;
    provision_symbol_header(layout, &config.support)?;

    let inventory = classify(
        layout.root(),
        &config.project.ignore_dirs,
        &config.project.extensions,
    );
    tracing::info!(
        "classified {} files ({} library sources, {} headers, {} tests, {} profiles)",
        inventory.len(),
        inventory.lib_sources.len(),
        inventory.headers.len(),
        inventory.tests.len(),
        inventory.profiles.len()
    );

    if config.build.def_file || config.build.annotate_headers {
        let declarations = scan(layout.root(), &inventory.headers)?;
        if config.build.def_file {
            let name = format!("dll_{}", config.project.name);
            write_def_file(&layout.solution_dir(), &name, &declarations)?;
        }
        if config.build.annotate_headers {
            let n = write_annotated_headers(
                layout.root(),
                &declarations,
                &config.project.export_macro,
            )?;
            tracing::info!("annotated {} headers", n);
        }
    }

    let mut summary = GenerateSummary {
        classified: inventory.len(),
        ..Default::default()
    };

    let sln = layout.solution_path(&config.project.name);
    let mut registry = SolutionRegistry::open(&sln)?;
    for (enabled, kind) in [
        (config.build.lib, ArtifactKind::StaticLibrary),
        (config.build.dll, ArtifactKind::DynamicLibrary),
    ] {
        if !enabled {
            continue;
        }
        let target = library_target(config, &inventory, kind);
        let path = layout.project_path(&target.name);
        emit(&mut registry, &target, &path, None, &vs)?;
        summary.projects.push(target.name);
    }
    registry.write(&vs)?;
    summary.solutions.push(sln);

    if config.build.tests {
        generate_batches(
            layout,
            config,
            &vs,
            ProgramKind::Test,
            &inventory.tests,
            progress,
            &mut summary,
        )?;
    }
    if config.build.profiles {
        generate_batches(
            layout,
            config,
            &vs,
            ProgramKind::Profile,
            &inventory.profiles,
            progress,
            &mut summary,
        )?;
    }

    Ok(summary)
}

/// The static library or DLL target over the whole library.
fn library_target(config: &Config, inventory: &SourceInventory, kind: ArtifactKind) -> TargetSpec {
    let paths = &config.paths;
    let (include_dirs, link_libs) = match kind {
        ArtifactKind::DynamicLibrary => (&paths.dll_include_dirs, &paths.dll_link_libs),
        _ => (&paths.lib_include_dirs, &paths.lib_link_libs),
    };

    TargetSpec::new(
        format!("{}_{}", kind.extension(), config.project.name),
        kind,
    )
    .with_headers(inventory.headers.clone())
    .with_sources(inventory.lib_sources.clone())
    .with_include_dirs(include_dirs.clone())
    .with_link_libs(link_libs.clone())
    .with_hooks(true, true)
    .with_debug_info(true)
    .with_variant(config.build.variant)
    .with_variant_dir(config.project.variant_dir.clone())
    .with_suite(config.project.name.clone())
}

/// Generate, write and register one project.
fn emit(
    registry: &mut SolutionRegistry,
    target: &TargetSpec,
    path: &Path,
    folder: Option<&str>,
    vs: &VsInfo,
) -> Result<()> {
    let desc = project::generate(target, &Platform::ALL, &Configuration::ALL, vs);
    let guid = registry.get_or_create(&target.name, path);

    vcxproj::write(&desc, &guid, path)?;
    filters::write(&desc, &filters_path(path))?;
    registry.add_project(folder, &target.name, path, guid, Some(desc.platforms().as_slice()));
    Ok(())
}

fn filters_path(project: &Path) -> PathBuf {
    let mut name = OsString::from(project.as_os_str());
    name.push(".filters");
    PathBuf::from(name)
}

/// Standalone programs that get one project each.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ProgramKind {
    Test,
    Profile,
}

impl ProgramKind {
    /// File-name prefix marking a program.
    fn prefix(self) -> &'static str {
        match self {
            ProgramKind::Test => "t-",
            ProgramKind::Profile => "p-",
        }
    }

    /// Suffix of the directory and solution names.
    fn suffix(self) -> &'static str {
        match self {
            ProgramKind::Test => "tests",
            ProgramKind::Profile => "profiles",
        }
    }
}

/// Project name for a program: `<module>_<stem without prefix>`.
fn program_name(file: &SourceFile, kind: ProgramKind) -> String {
    let stem = file.stem();
    let stem = stem.strip_prefix(kind.prefix()).unwrap_or(stem);
    if file.module.is_empty() {
        stem.to_string()
    } else {
        format!("{}_{}", file.module, stem)
    }
}

/// One project per program, `batch_size` projects per solution.
fn generate_batches(
    layout: &Layout,
    config: &Config,
    vs: &VsInfo,
    kind: ProgramKind,
    files: &[SourceFile],
    progress: bool,
    summary: &mut GenerateSummary,
) -> Result<()> {
    let programs: Vec<&SourceFile> = files
        .iter()
        .filter(|f| f.file_name().starts_with(kind.prefix()))
        .collect();
    let base = format!("{}-{}", config.project.name, kind.suffix());
    let dir = layout.solution_dir().join(&base);

    if programs.is_empty() {
        tracing::info!("no {} programs found", kind.suffix());
        remove_stale_batches(&dir, &base, 0)?;
        return Ok(());
    }

    let batch_size = config.build.batch_size.max(1);

    let pb = if progress {
        let pb = ProgressBar::new(programs.len() as u64);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} {msg} [{bar:40.cyan/blue}] {pos}/{len}")
        {
            pb.set_style(style.progress_chars("#>-"));
        }
        pb.set_message(base.clone());
        pb
    } else {
        ProgressBar::hidden()
    };

    let batches = programs.chunks(batch_size);
    let written = batches.len();
    for (i, batch) in batches.enumerate() {
        let sln = dir.join(format!("{}{}.sln", base, i + 1));
        let mut registry = SolutionRegistry::open(&sln)?;

        for file in batch {
            let name = program_name(file, kind);
            let path = dir.join(&name).join(format!("{}.vcxproj", name));
            let target = TargetSpec::new(name.as_str(), ArtifactKind::Application)
                .with_sources(vec![(*file).clone()])
                .with_include_dirs(config.paths.test_include_dirs.clone())
                .with_link_libs(config.paths.test_link_libs.clone())
                .with_variant(config.build.variant)
                .with_variant_dir(config.project.variant_dir.clone())
                .with_suite(config.project.name.clone())
                .with_root_prefix(BATCH_ROOT_PREFIX);

            emit(&mut registry, &target, &path, Some(file.module.as_str()), vs)?;
            summary.projects.push(name);
            pb.inc(1);
        }

        registry.write(vs)?;
        summary.solutions.push(sln);
    }

    pb.finish_and_clear();
    remove_stale_batches(&dir, &base, written)?;
    Ok(())
}

/// Remove `<base>N.sln` and its identifier store for every `N` past `written`.
///
/// Batch solutions are numbered contiguously, so the first missing number
/// ends the sweep.
fn remove_stale_batches(dir: &Path, base: &str, written: usize) -> Result<usize> {
    let mut removed = 0;
    for n in written + 1.. {
        let sln = dir.join(format!("{}{}.sln", base, n));
        let store = SolutionRegistry::store_path_for(&sln);
        let had_sln = remove_file_if_exists(&sln)?;
        let had_store = remove_file_if_exists(&store)?;
        if !had_sln && !had_store {
            break;
        }
        tracing::info!("removed stale {}", sln.display());
        removed += 1;
    }
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::fixtures::TreeFixture;

    fn options(tree: &TreeFixture) -> GenerateOptions {
        GenerateOptions {
            root: tree.root().to_path_buf(),
            ..Default::default()
        }
    }

    #[test]
    fn test_generate_default_run() {
        let tree = TreeFixture::flint_like();
        let summary = generate(&options(&tree)).unwrap();

        assert_eq!(summary.projects, vec!["lib_flint", "dll_flint"]);
        assert_eq!(summary.solutions.len(), 1);

        let sln = tree.read("build.vs19/flint.sln");
        assert!(sln.contains(r#""lib_flint", "lib_flint\lib_flint.vcxproj""#));
        assert!(sln.contains(r#""dll_flint", "dll_flint\dll_flint.vcxproj""#));

        let lib = tree.read("build.vs19/lib_flint/lib_flint.vcxproj");
        assert!(lib.contains(r"..\..\fmpz\add.c"));
        assert!(lib.contains(r"..\..\fmpz\fmpz.c"));
        assert!(!lib.contains("t-add.c"));
        assert!(!lib.contains("tune-add.c"));
        assert!(tree
            .root()
            .join("build.vs19/lib_flint/lib_flint.vcxproj.filters")
            .is_file());

        assert_eq!(tree.read("fmpz/fmpz.c"), "/* reentrant */\n");
        assert_eq!(tree.read("build.vc/cpimport.h"), "1,2,3,\n4,5,6,\n");
    }

    #[test]
    fn test_regeneration_keeps_identifiers_and_files() {
        let tree = TreeFixture::flint_like();
        generate(&options(&tree)).unwrap();
        let sln = tree.read("build.vs19/flint.sln");
        let proj = tree.read("build.vs19/lib_flint/lib_flint.vcxproj");

        let modified = std::fs::metadata(tree.root().join("build.vs19/flint.sln"))
            .unwrap()
            .modified()
            .unwrap();

        generate(&options(&tree)).unwrap();
        assert_eq!(tree.read("build.vs19/flint.sln"), sln);
        assert_eq!(tree.read("build.vs19/lib_flint/lib_flint.vcxproj"), proj);
        let after = std::fs::metadata(tree.root().join("build.vs19/flint.sln"))
            .unwrap()
            .modified()
            .unwrap();
        assert_eq!(modified, after);
    }

    #[test]
    fn test_tests_are_batched() {
        let tree = TreeFixture::flint_like()
            .file("fmpz/test/t-mul.c", "int main(void) { return 0; }\n")
            .file("fmpz/test/helper.c", "/* not a program */\n")
            .file(
                "build.vc/slngen.toml",
                "[build]\ntests = true\nbatch_size = 2\n",
            );

        let summary = generate(&options(&tree)).unwrap();

        assert!(summary.projects.contains(&"fmpz_add".to_string()));
        assert!(summary.projects.contains(&"nmod_vec_add".to_string()));
        assert!(!summary.projects.iter().any(|p| p.contains("helper")));
        assert_eq!(summary.solutions.len(), 3);

        let first = tree.read("build.vs19/flint-tests/flint-tests1.sln");
        assert!(first.contains(r#""fmpz_add", "fmpz_add\fmpz_add.vcxproj""#));
        assert!(first.contains("NestedProjects"));
        assert!(tree
            .root()
            .join("build.vs19/flint-tests/flint-tests2.sln")
            .is_file());

        let proj = tree.read("build.vs19/flint-tests/fmpz_add/fmpz_add.vcxproj");
        assert!(proj.contains(r"..\..\..\fmpz\test\t-add.c"));
        assert!(proj.contains("<ConfigurationType>Application</ConfigurationType>"));
    }

    #[test]
    fn test_shrinking_batches_remove_stale_solutions() {
        let tree = TreeFixture::flint_like()
            .file("fmpz/test/t-mul.c", "int main(void) { return 0; }\n")
            .file(
                "build.vc/slngen.toml",
                "[build]\ntests = true\nbatch_size = 1\n",
            );
        generate(&options(&tree)).unwrap();

        let dir = tree.root().join("build.vs19/flint-tests");
        assert!(dir.join("flint-tests3.sln").is_file());
        assert!(dir.join("flint-tests3.guids.toml").is_file());

        std::fs::remove_file(tree.root().join("fmpz/test/t-mul.c")).unwrap();
        std::fs::remove_file(tree.root().join("nmod_vec/test/t-add.c")).unwrap();
        let summary = generate(&options(&tree)).unwrap();

        assert_eq!(summary.solutions.len(), 2);
        assert!(dir.join("flint-tests1.sln").is_file());
        for n in [2, 3] {
            assert!(!dir.join(format!("flint-tests{}.sln", n)).exists());
            assert!(!dir.join(format!("flint-tests{}.guids.toml", n)).exists());
        }
    }

    #[test]
    fn test_profiles_from_options() {
        let tree = TreeFixture::flint_like();
        let opts = GenerateOptions {
            profiles: Some(true),
            ..options(&tree)
        };
        let summary = generate(&opts).unwrap();
        assert!(summary.projects.contains(&"nmod_vec_add".to_string()));
        assert!(tree
            .root()
            .join("build.vs19/flint-profiles/flint-profiles1.sln")
            .is_file());
    }

    #[test]
    fn test_variant_override() {
        let tree = TreeFixture::flint_like();
        let opts = GenerateOptions {
            variant: Some(LibVariant::Single),
            ..options(&tree)
        };
        generate(&opts).unwrap();
        assert_eq!(tree.read("fmpz/fmpz.c"), "/* single */\n");
        let lib = tree.read("build.vs19/lib_flint/lib_flint.vcxproj");
        assert!(lib.contains("FLINT_REENTRANT=0"));
    }

    #[test]
    fn test_unknown_version_fails() {
        let tree = TreeFixture::flint_like();
        let opts = GenerateOptions {
            vs_version: 12,
            ..options(&tree)
        };
        assert!(generate(&opts).is_err());
    }

    #[test]
    fn test_version_info_file_overrides() {
        let tree = TreeFixture::flint_like().file(
            "build.vc/version_info12.toml",
            "msvc = \"12\"\nwindows_sdk = \"8.1\"\nplatform_toolset = \"120\"\nvcx_tool = \"12.0\"\nvs_major = \"12\"\nvs_full = \"12.0.31101.0\"\n",
        );
        let opts = GenerateOptions {
            vs_version: 12,
            ..options(&tree)
        };
        generate(&opts).unwrap();
        let lib = tree.read("build.vs12/lib_flint/lib_flint.vcxproj");
        assert!(lib.contains("<PlatformToolset>v120</PlatformToolset>"));
        assert!(tree.root().join("build.vs12/version_info.toml").is_file());
    }

    #[test]
    fn test_export_outputs() {
        let tree = TreeFixture::flint_like().file(
            "build.vc/slngen.toml",
            "[build]\ndef_file = true\nannotate_headers = true\n",
        );
        generate(&options(&tree)).unwrap();

        let def = tree.read("build.vs19/dll_flint.def");
        assert_eq!(
            def,
            "LIBRARY dll_flint\nEXPORTS\n    fmpz_add\n    fmpz_is_zero\n    _nmod_vec_add\n"
        );
        assert!(tree.read("win_hdrs/fmpz.h").contains("FLINT_DLL int fmpz_is_zero("));
    }

    #[test]
    fn test_list_does_not_write() {
        let tree = TreeFixture::flint_like();
        let inventory = list(&options(&tree)).unwrap();
        assert_eq!(inventory.tests.len(), 2);
        assert_eq!(inventory.profiles.len(), 1);
        assert!(!tree.root().join("build.vs19").exists());
    }

    #[test]
    fn test_program_name() {
        let f = SourceFile::new("fmpz", "fmpz/test/t-add.c");
        assert_eq!(program_name(&f, ProgramKind::Test), "fmpz_add");
        let p = SourceFile::new("", "profile/p-mul.c");
        assert_eq!(program_name(&p, ProgramKind::Profile), "mul");
    }
}
