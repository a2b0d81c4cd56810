//! Detection of converter output in a template directory
//!
//! The external converter drops one surface XML and one visual XML per
//! submesh next to the template's own placeholder files. Only the top level
//! of the directory is listed.

use crate::error::Result;
use crate::model::TemplateLayout;
use std::cmp::Ordering;
use std::path::Path;
use walkdir::WalkDir;

/// Surface and visual files found in a template directory
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Artifacts {
    /// Selected surface file
    pub surface: Option<String>,
    /// Visual files in pairing order
    pub visuals: Vec<String>,
}

/// List the template directory and select surface and visual files
pub fn detect_artifacts(dir: &Path, layout: &TemplateLayout) -> Result<Artifacts> {
    let mut names = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        if let Some(name) = entry.file_name().to_str() {
            names.push(name.to_string());
        }
    }

    Ok(select_artifacts(&names, layout))
}

/// Select surface and visual files among directory entry names
///
/// Surface candidates match `*.CPlugSurface*.xml`; a candidate that is not
/// the template placeholder wins. Visual candidates match
/// `*CPlugVisualIndexedTriangles*.xml` minus the placeholder, sorted without
/// regard to case.
pub fn select_artifacts(names: &[String], layout: &TemplateLayout) -> Artifacts {
    let surface_marker = format!(".{}", layout.surface_marker).to_ascii_lowercase();
    let visual_marker = layout.visual_marker.to_ascii_lowercase();

    let mut surfaces: Vec<&String> = names
        .iter()
        .filter(|n| is_xml_containing(n, &surface_marker))
        .collect();
    surfaces.sort_by(|a, b| compare_names(a, b));

    let surface = surfaces
        .iter()
        .find(|n| !has_prefix(n, &layout.surface_placeholder_prefix))
        .or_else(|| surfaces.first())
        .map(|n| n.to_string());

    let mut visuals: Vec<String> = names
        .iter()
        .filter(|n| is_xml_containing(n, &visual_marker))
        .filter(|n| !has_prefix(n, &layout.visual_placeholder_prefix))
        .cloned()
        .collect();
    visuals.sort_by(|a, b| compare_names(a, b));

    Artifacts { surface, visuals }
}

fn is_xml_containing(name: &str, marker: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    lower.ends_with(".xml") && lower.contains(marker)
}

fn has_prefix(name: &str, prefix: &str) -> bool {
    name.len() >= prefix.len()
        && name.is_char_boundary(prefix.len())
        && name[..prefix.len()].eq_ignore_ascii_case(prefix)
}

/// Case-insensitive order, byte order as tie-break
fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_ascii_lowercase()
        .cmp(&b.to_ascii_lowercase())
        .then_with(|| a.cmp(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_prefers_generated_surface() {
        let found = select_artifacts(
            &names(&[
                "Template.CPlugSurfaceCrystal.xml",
                "Model.CPlugSurface.xml",
                "Root.CPlugTree.xml",
            ]),
            &TemplateLayout::default(),
        );
        assert_eq!(found.surface.as_deref(), Some("Model.CPlugSurface.xml"));
    }

    #[test]
    fn test_placeholder_surface_as_last_resort() {
        let found = select_artifacts(
            &names(&["Template.CPlugSurfaceCrystal.xml"]),
            &TemplateLayout::default(),
        );
        assert_eq!(
            found.surface.as_deref(),
            Some("Template.CPlugSurfaceCrystal.xml")
        );
    }

    #[test]
    fn test_visuals_sorted_without_placeholder() {
        let found = select_artifacts(
            &names(&[
                "b.CPlugVisualIndexedTriangles.xml",
                "Model.CPlugVisualIndexedTriangles.xml",
                "A.CPlugVisualIndexedTriangles.xml",
                "c.cplugvisualindexedtriangles.XML",
                "d.CPlugVisualIndexedTriangles.gbx",
            ]),
            &TemplateLayout::default(),
        );
        assert_eq!(
            found.visuals,
            names(&[
                "A.CPlugVisualIndexedTriangles.xml",
                "b.CPlugVisualIndexedTriangles.xml",
                "c.cplugvisualindexedtriangles.XML",
            ])
        );
    }

    #[test]
    fn test_only_placeholder_visual_means_none() {
        let found = select_artifacts(
            &names(&["Model.CPlugVisualIndexedTriangles.xml"]),
            &TemplateLayout::default(),
        );
        assert!(found.visuals.is_empty());
        assert_eq!(found.surface, None);
    }

    #[test]
    fn test_detect_lists_top_level_only() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("x.CPlugVisualIndexedTriangles.xml"), "<a/>").unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        std::fs::write(
            dir.path().join("nested").join("y.CPlugVisualIndexedTriangles.xml"),
            "<a/>",
        )
        .unwrap();

        let found = detect_artifacts(dir.path(), &TemplateLayout::default()).unwrap();
        assert_eq!(found.visuals, names(&["x.CPlugVisualIndexedTriangles.xml"]));
    }
}
