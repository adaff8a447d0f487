//! `.vcxproj` serialization.

use std::path::Path;

use anyhow::Result;
use uuid::Uuid;

use super::project::{CellOptions, ProjectDescriptor};
use super::xml::{render, Element};
use super::guid_string;
use crate::util::fs::write_if_changed;

const MSBUILD_NS: &str = "http://schemas.microsoft.com/developer/msbuild/2003";

/// Build the document tree for a project.
pub fn to_document(desc: &ProjectDescriptor, guid: &Uuid) -> Element {
    let mut doc = Element::new("Project")
        .attr("DefaultTargets", "Build")
        .attr("ToolsVersion", desc.tools_version.as_str())
        .attr("xmlns", MSBUILD_NS);

    doc.push(
        Element::new("ItemGroup")
            .attr("Label", "ProjectConfigurations")
            .children(desc.cells.iter().map(|c| {
                Element::new("ProjectConfiguration")
                    .attr("Include", c.cell.label())
                    .child(Element::with_text("Configuration", c.cell.configuration.as_str()))
                    .child(Element::with_text("Platform", c.cell.platform.as_str()))
            })),
    );

    doc.push(
        Element::new("PropertyGroup")
            .attr("Label", "Globals")
            .child(Element::with_text("RootNamespace", desc.root_namespace.as_str()))
            .child(Element::with_text("Keyword", "Win32Proj"))
            .child(Element::with_text("ProjectGuid", guid_string(guid)))
            .child(Element::with_text(
                "WindowsTargetPlatformVersion",
                desc.windows_sdk.as_str(),
            )),
    );

    doc.push(import(r"$(VCTargetsPath)\Microsoft.Cpp.Default.props"));

    for c in &desc.cells {
        doc.push(
            Element::new("PropertyGroup")
                .condition(c.cell.condition())
                .attr("Label", "Configuration")
                .child(Element::with_text(
                    "ConfigurationType",
                    desc.kind.configuration_type(),
                ))
                .child(Element::with_text(
                    "UseDebugLibraries",
                    c.cell.configuration.is_debug().to_string(),
                ))
                .child(Element::with_text(
                    "PlatformToolset",
                    format!("v{}", desc.platform_toolset),
                )),
        );
    }

    doc.push(import(r"$(VCTargetsPath)\Microsoft.Cpp.props"));

    let user_props = r"$(UserRootDir)\Microsoft.Cpp.$(Platform).user.props";
    for c in &desc.cells {
        doc.push(
            Element::new("ImportGroup")
                .condition(c.cell.condition())
                .attr("Label", "PropertySheets")
                .child(import(user_props).condition(format!("exists('{}')", user_props)))
                .child(import(&c.property_sheet)),
        );
    }

    doc.push(Element::new("PropertyGroup").attr("Label", "UserMacros"));

    let mut dirs = Element::new("PropertyGroup")
        .child(Element::with_text("_ProjectFileVersion", "10.0.21006.1"));
    for c in &desc.cells {
        let cond = c.cell.condition();
        dirs.push(Element::with_text("TargetName", desc.name.as_str()).condition(cond.clone()));
        dirs.push(
            Element::with_text("IntDir", r"$(Platform)\$(Configuration)\").condition(cond.clone()),
        );
        dirs.push(
            Element::with_text("OutDir", r"$(SolutionDir)$(Platform)\$(Configuration)\")
                .condition(cond),
        );
    }
    dirs.push(Element::with_text("LinkIncremental", "false"));
    doc.push(dirs);

    for c in &desc.cells {
        doc.push(tool_options(c));
    }

    doc.push(
        Element::new("ImportGroup").child(
            import("$(MPIR_Props_External)").condition("exists('$(MPIR_Props_External)')"),
        ),
    );

    if !desc.headers.is_empty() {
        doc.push(Element::new("ItemGroup").children(
            desc.headers
                .iter()
                .map(|h| Element::new("ClInclude").attr("Include", h.as_str())),
        ));
    }

    let mut sources = Element::new("ItemGroup");
    for item in &desc.sources {
        let mut compile = Element::new("ClCompile").attr("Include", item.include.as_str());
        if let Some(dir) = &item.object_dir {
            for c in &desc.cells {
                compile.push(
                    Element::with_text("ObjectFileName", format!(r"$(IntDir){}\", dir))
                        .condition(c.cell.condition()),
                );
            }
        }
        if item.excluded {
            for c in &desc.cells {
                compile.push(
                    Element::with_text("ExcludedFromBuild", "true").condition(c.cell.condition()),
                );
            }
        }
        sources.push(compile);
    }
    doc.push(sources);

    doc.push(import(r"$(VCTargetsPath)\Microsoft.Cpp.targets"));
    doc
}

/// `<ItemDefinitionGroup>` for one cell.
fn tool_options(c: &CellOptions) -> Element {
    let mut group = Element::new("ItemDefinitionGroup").condition(c.cell.condition());

    if !c.pre_build.is_empty() {
        group.push(
            Element::new("PreBuildEvent")
                .child(Element::with_text("Command", c.pre_build.join("\r\n"))),
        );
    }

    let cl = &c.compile;
    group.push(
        Element::new("ClCompile")
            .child(Element::with_text("Optimization", cl.optimization.as_str()))
            .child(Element::with_text("IntrinsicFunctions", "true"))
            .child(Element::with_text(
                "AdditionalIncludeDirectories",
                cl.include_dirs.join(";"),
            ))
            .child(Element::with_text(
                "PreprocessorDefinitions",
                format!("{};%(PreprocessorDefinitions)", cl.defines.join(";")),
            ))
            .child(Element::with_text("RuntimeLibrary", cl.runtime.as_str()))
            .child(Element::with_text(
                "ProgramDataBaseFileName",
                "$(TargetDir)$(TargetName).pdb",
            ))
            .child(Element::with_text(
                "DebugInformationFormat",
                cl.debug_format.as_str(),
            )),
    );

    if let Some(link) = &c.link {
        let mut el = Element::new("Link");
        if link.debug_info {
            el.push(Element::with_text("GenerateDebugInformation", "true"));
        }
        el.push(Element::with_text("LargeAddressAware", "true"));
        el.push(Element::with_text(
            "AdditionalDependencies",
            format!("{};%(AdditionalDependencies)", link.dependencies.join(";")),
        ));
        group.push(el);
    }

    if !c.post_build.is_empty() {
        group.push(
            Element::new("PostBuildEvent")
                .child(Element::with_text("Command", c.post_build.join("\r\n"))),
        );
    }

    group
}

fn import(project: &str) -> Element {
    Element::new("Import").attr("Project", project)
}

/// Write the project file, leaving it untouched if nothing changed.
pub fn write(desc: &ProjectDescriptor, guid: &Uuid, destination: &Path) -> Result<bool> {
    let written = write_if_changed(destination, &render(&to_document(desc, guid)))?;
    if written {
        tracing::info!("wrote {}", destination.display());
    }
    Ok(written)
}
