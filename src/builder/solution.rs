//! Solution files and stable project identifiers.
//!
//! Visual Studio keys everything on project GUIDs, so a regeneration that
//! minted fresh ones would rewrite every line of every solution and break
//! user settings. [`SolutionRegistry`] keeps a small TOML store next to the
//! solution (`flint.sln` -> `flint.guids.toml`) mapping names to GUIDs;
//! names seen before always get their old GUID back. The `.sln` itself is
//! rebuilt from scratch every run.

use std::collections::{BTreeMap, HashSet};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use anyhow::{Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use super::guid_string;
use crate::core::{Cell, Configuration, Platform};
use crate::util::fs::{read_to_string, relative_path, to_windows, write_if_changed};
use crate::util::VsInfo;

/// Project type GUID for C/C++ projects.
pub const CPP_PROJECT_TYPE: &str = "8BC9CEB8-8B4A-11D0-8D11-00A0C91E6BC0";

/// Project type GUID for solution folders.
pub const FOLDER_TYPE: &str = "2150E333-8FDC-42A3-9474-1A3956D46DE8";

const STORE_VERSION: u32 = 1;

static SLN_PROJECT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"^Project\("\{([0-9A-Fa-f-]+)\}"\)\s*=\s*"([^"]+)",\s*"([^"]+)",\s*"\{([0-9A-Fa-f-]+)\}""#,
    )
    .unwrap()
});

/// Errors raised by the identifier store.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("malformed identifier store {path}: {message}")]
    Malformed { path: String, message: String },

    #[error("identifier {id} is assigned to both `{first}` and `{second}` in {path}")]
    DuplicateId {
        path: String,
        id: Uuid,
        first: String,
        second: String,
    },
}

/// On-disk form of the registry.
#[derive(Debug, Default, Serialize, Deserialize)]
struct IdStore {
    version: u32,
    #[serde(default)]
    projects: BTreeMap<String, Uuid>,
    #[serde(default)]
    folders: BTreeMap<String, Uuid>,
}

/// A project listed in the solution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectRef {
    pub folder: Option<String>,
    pub name: String,
    pub path: PathBuf,
    pub guid: Uuid,
    /// Platforms the project builds for; `None` means all of them
    pub platforms: Option<Vec<Platform>>,
}

/// Name → GUID registry for one solution, plus the projects it will list.
#[derive(Debug)]
pub struct SolutionRegistry {
    path: PathBuf,
    store: IdStore,
    used: HashSet<Uuid>,
    projects: Vec<ProjectRef>,
    platforms: Vec<Platform>,
    configurations: Vec<Configuration>,
}

impl SolutionRegistry {
    /// Open the registry for the solution at `path`.
    ///
    /// Identifiers come from the store next to it. If there is no store yet
    /// but an older solution exists, its project lines seed the registry.
    /// If neither exists the registry starts empty.
    pub fn open(path: &Path) -> Result<Self> {
        let store_path = Self::store_path_for(path);

        let store = if store_path.exists() {
            load_store(&store_path)?
        } else if path.exists() {
            tracing::info!("importing project identifiers from {}", path.display());
            import_solution(&read_to_string(path)?)
        } else {
            IdStore::default()
        };

        let mut used = HashSet::new();
        let mut owners: BTreeMap<Uuid, String> = BTreeMap::new();
        for (name, id) in store.projects.iter().chain(store.folders.iter()) {
            if let Some(first) = owners.insert(*id, name.clone()) {
                return Err(RegistryError::DuplicateId {
                    path: store_path.display().to_string(),
                    id: *id,
                    first,
                    second: name.clone(),
                }
                .into());
            }
            used.insert(*id);
        }

        Ok(SolutionRegistry {
            path: path.to_path_buf(),
            store,
            used,
            projects: Vec::new(),
            platforms: Platform::ALL.to_vec(),
            configurations: Configuration::ALL.to_vec(),
        })
    }

    /// `foo.sln` -> `foo.guids.toml`
    pub fn store_path_for(solution: &Path) -> PathBuf {
        solution.with_extension("guids.toml")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Known identifier for `name`, if any.
    pub fn get(&self, name: &str) -> Option<Uuid> {
        self.store.projects.get(name).copied()
    }

    /// Identifier for `name`, minting and registering one if it is new.
    pub fn get_or_create(&mut self, name: &str, project_path: &Path) -> Uuid {
        if let Some(id) = self.store.projects.get(name) {
            return *id;
        }
        let id = self.mint();
        tracing::debug!(
            "assigned {} to {} ({})",
            guid_string(&id),
            name,
            project_path.display()
        );
        self.store.projects.insert(name.to_string(), id);
        id
    }

    fn folder_id(&mut self, folder: &str) -> Uuid {
        if let Some(id) = self.store.folders.get(folder) {
            return *id;
        }
        let id = self.mint();
        self.store.folders.insert(folder.to_string(), id);
        id
    }

    fn mint(&mut self) -> Uuid {
        loop {
            let id = Uuid::new_v4();
            if self.used.insert(id) {
                return id;
            }
        }
    }

    /// List a project in the solution, optionally inside a solution folder.
    pub fn add_project(
        &mut self,
        folder: Option<&str>,
        name: &str,
        project_path: &Path,
        guid: Uuid,
        platforms: Option<&[Platform]>,
    ) {
        let folder = folder.filter(|f| !f.is_empty()).map(str::to_string);
        if let Some(f) = &folder {
            self.folder_id(f);
        }
        self.projects.push(ProjectRef {
            folder,
            name: name.to_string(),
            path: project_path.to_path_buf(),
            guid,
            platforms: platforms.map(<[Platform]>::to_vec),
        });
    }

    pub fn projects(&self) -> &[ProjectRef] {
        &self.projects
    }

    /// Render the `.sln` text.
    pub fn render(&self, vs: &VsInfo) -> String {
        let eol = "\r\n";
        let solution_dir = self.path.parent().unwrap_or_else(|| Path::new(""));
        let mut out = String::new();

        let _ = write!(
            out,
            "{eol}Microsoft Visual Studio Solution File, Format Version 12.00{eol}\
             # Visual Studio Version {}{eol}\
             VisualStudioVersion = {}{eol}\
             MinimumVisualStudioVersion = 10.0.40219.1{eol}",
            vs.vs_major, vs.vs_full
        );

        let mut folders: Vec<&str> = Vec::new();
        for p in &self.projects {
            if let Some(f) = p.folder.as_deref() {
                if !folders.contains(&f) {
                    folders.push(f);
                }
            }
        }

        for f in &folders {
            let id = self.store.folders.get(*f).copied().unwrap_or_default();
            let _ = write!(
                out,
                "Project(\"{{{}}}\") = \"{}\", \"{}\", \"{}\"{eol}EndProject{eol}",
                FOLDER_TYPE,
                f,
                f,
                guid_string(&id)
            );
        }

        for p in &self.projects {
            let rel = to_windows(&relative_path(solution_dir, &p.path));
            let _ = write!(
                out,
                "Project(\"{{{}}}\") = \"{}\", \"{}\", \"{}\"{eol}EndProject{eol}",
                CPP_PROJECT_TYPE,
                p.name,
                rel,
                guid_string(&p.guid)
            );
        }

        // Solution configurations are listed sorted, the way Visual Studio saves them.
        let mut cells: Vec<Cell> = self
            .platforms
            .iter()
            .flat_map(|&pl| self.configurations.iter().map(move |&c| Cell::new(pl, c)))
            .collect();
        cells.sort_by_key(|c| c.label().to_lowercase());

        let _ = write!(out, "Global{eol}");
        let _ = write!(
            out,
            "\tGlobalSection(SolutionConfigurationPlatforms) = preSolution{eol}"
        );
        for c in &cells {
            let _ = write!(out, "\t\t{} = {}{eol}", c.label(), c.label());
        }
        let _ = write!(out, "\tEndGlobalSection{eol}");

        let _ = write!(
            out,
            "\tGlobalSection(ProjectConfigurationPlatforms) = postSolution{eol}"
        );
        for p in &self.projects {
            let id = guid_string(&p.guid);
            let supported = p.platforms.as_deref().unwrap_or(&self.platforms);
            for c in &cells {
                let builds = supported.contains(&c.platform);
                let target_platform = if builds {
                    c.platform
                } else {
                    supported.first().copied().unwrap_or(c.platform)
                };
                let target = Cell::new(target_platform, c.configuration).label();
                let _ = write!(out, "\t\t{}.{}.ActiveCfg = {}{eol}", id, c.label(), target);
                if builds {
                    let _ = write!(out, "\t\t{}.{}.Build.0 = {}{eol}", id, c.label(), target);
                }
            }
        }
        let _ = write!(out, "\tEndGlobalSection{eol}");

        let _ = write!(out, "\tGlobalSection(SolutionProperties) = preSolution{eol}");
        let _ = write!(out, "\t\tHideSolutionNode = FALSE{eol}");
        let _ = write!(out, "\tEndGlobalSection{eol}");

        if !folders.is_empty() {
            let _ = write!(out, "\tGlobalSection(NestedProjects) = preSolution{eol}");
            for p in &self.projects {
                if let Some(f) = p.folder.as_deref() {
                    let folder = self.store.folders.get(f).copied().unwrap_or_default();
                    let _ = write!(
                        out,
                        "\t\t{} = {}{eol}",
                        guid_string(&p.guid),
                        guid_string(&folder)
                    );
                }
            }
            let _ = write!(out, "\tEndGlobalSection{eol}");
        }

        let _ = write!(out, "EndGlobal{eol}");
        out
    }

    /// Write the solution and persist the identifier store.
    ///
    /// Consumes the registry: it is flushed once, at the end of a run.
    pub fn write(mut self, vs: &VsInfo) -> Result<()> {
        if write_if_changed(&self.path, &self.render(vs))? {
            tracing::info!(
                "wrote {} ({} projects)",
                self.path.display(),
                self.projects.len()
            );
        }

        self.store.version = STORE_VERSION;
        let store_path = Self::store_path_for(&self.path);
        let contents =
            toml::to_string_pretty(&self.store).context("failed to serialize identifier store")?;
        write_if_changed(&store_path, &contents)?;
        Ok(())
    }
}

fn load_store(path: &Path) -> Result<IdStore> {
    let contents = read_to_string(path)?;
    let store: IdStore = toml::from_str(&contents).map_err(|e| RegistryError::Malformed {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;

    if store.version != STORE_VERSION {
        return Err(RegistryError::Malformed {
            path: path.display().to_string(),
            message: format!(
                "unsupported store version {} (expected {})",
                store.version, STORE_VERSION
            ),
        }
        .into());
    }

    Ok(store)
}

/// Recover name → GUID pairs from the project lines of an existing solution.
fn import_solution(text: &str) -> IdStore {
    let mut store = IdStore {
        version: STORE_VERSION,
        ..Default::default()
    };

    for line in text.lines() {
        let Some(caps) = SLN_PROJECT.captures(line.trim()) else {
            continue;
        };
        let Ok(id) = Uuid::parse_str(&caps[4]) else {
            continue;
        };
        let name = caps[2].to_string();
        if caps[1].eq_ignore_ascii_case(FOLDER_TYPE) {
            store.folders.entry(name).or_insert(id);
        } else {
            store.projects.entry(name).or_insert(id);
        }
    }

    store
}
