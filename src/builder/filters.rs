//! `.vcxproj.filters` companion files.
//!
//! Filters only affect how Solution Explorer groups files. Their
//! identifiers are derived from the filter name, so regenerating an
//! unchanged project yields a byte-identical file.

use std::collections::BTreeSet;
use std::path::Path;

use anyhow::Result;
use uuid::Uuid;

use super::guid_string;
use super::project::ProjectDescriptor;
use super::xml::{render, Element};
use crate::util::fs::write_if_changed;

const HEADER_FILTER: &str = "Header Files";
const SOURCE_FILTER: &str = "Source Files";

/// Stable identifier for a filter name.
fn filter_id(name: &str) -> Uuid {
    Uuid::new_v5(&Uuid::NAMESPACE_OID, name.as_bytes())
}

fn source_filter(module: &str) -> String {
    if module.is_empty() {
        SOURCE_FILTER.to_string()
    } else {
        format!("{}\\{}", SOURCE_FILTER, module)
    }
}

/// Build the filters document for a project.
pub fn to_document(desc: &ProjectDescriptor, tools_version: &str) -> Element {
    let mut names: BTreeSet<String> = BTreeSet::new();
    if !desc.headers.is_empty() {
        names.insert(HEADER_FILTER.to_string());
    }
    if !desc.sources.is_empty() {
        names.insert(SOURCE_FILTER.to_string());
    }
    for item in &desc.sources {
        names.insert(source_filter(&item.module));
    }

    let mut doc = Element::new("Project")
        .attr("ToolsVersion", tools_version)
        .attr("xmlns", "http://schemas.microsoft.com/developer/msbuild/2003");

    doc.push(Element::new("ItemGroup").children(names.iter().map(|name| {
        Element::new("Filter")
            .attr("Include", name.as_str())
            .child(Element::with_text("UniqueIdentifier", guid_string(&filter_id(name))))
    })));

    if !desc.headers.is_empty() {
        doc.push(Element::new("ItemGroup").children(desc.headers.iter().map(|h| {
            Element::new("ClInclude")
                .attr("Include", h.as_str())
                .child(Element::with_text("Filter", HEADER_FILTER))
        })));
    }

    doc.push(Element::new("ItemGroup").children(desc.sources.iter().map(|s| {
        Element::new("ClCompile")
            .attr("Include", s.include.as_str())
            .child(Element::with_text("Filter", source_filter(&s.module)))
    })));

    doc
}

/// Write `<project>.vcxproj.filters` next to the project file.
pub fn write(desc: &ProjectDescriptor, destination: &Path) -> Result<bool> {
    write_if_changed(destination, &render(&to_document(desc, "12.0")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::project::generate;
    use crate::core::{ArtifactKind, Configuration, Platform, SourceFile, TargetSpec};
    use crate::util::VsInfo;

    fn descriptor() -> ProjectDescriptor {
        let target = TargetSpec::new("lib_flint", ArtifactKind::StaticLibrary)
            .with_headers(vec!["fmpz.h".to_string()])
            .with_sources(vec![
                SourceFile::new("fmpq", "fmpq/add.c"),
                SourceFile::new("fmpz", "fmpz/add.c"),
                SourceFile::new("fmpz", "fmpz/mul.c"),
            ]);
        generate(
            &target,
            &Platform::ALL,
            &Configuration::ALL,
            &VsInfo::builtin(19).unwrap(),
        )
    }

    #[test]
    fn test_filters_group_by_module() {
        let doc = to_document(&descriptor(), "12.0");
        let filters: Vec<_> = doc
            .find_all("Filter")
            .into_iter()
            .filter_map(|f| f.get_attr("Include").map(str::to_string))
            .collect();
        assert_eq!(
            filters,
            vec![
                "Header Files",
                "Source Files",
                r"Source Files\fmpq",
                r"Source Files\fmpz",
            ]
        );

        let mul = doc
            .find_all("ClCompile")
            .into_iter()
            .find(|e| e.get_attr("Include") == Some(r"..\..\fmpz\mul.c"))
            .unwrap();
        assert_eq!(mul.find_all("Filter")[0].text_content(), r"Source Files\fmpz");
    }

    #[test]
    fn test_filter_ids_are_stable() {
        let a = render(&to_document(&descriptor(), "12.0"));
        let b = render(&to_document(&descriptor(), "12.0"));
        assert_eq!(a, b);
        assert_ne!(filter_id("Header Files"), filter_id("Source Files"));
    }
}
