//! Generation of per-part CPlugTree descriptors from a solid template
//!
//! A solid template directory holds a root tree, a parent tree listing the
//! model's parts and a leaf tree used as the blueprint of one part. After an
//! external converter has dropped its surface and visual XML files into the
//! directory, [`TemplateTreeBuilder`] clones the leaf once per visual, points
//! each clone at its visual and material reference, and wires the result
//! into the root and parent trees.
//!
//! # Example
//!
//! ```no_run
//! use solidtree::{MaterialScan, TemplateTreeBuilder};
//!
//! let scan = MaterialScan::from_path("Rock.3ds")?;
//! let result = TemplateTreeBuilder::new("work/Rock").build("Rock", &scan.groups)?;
//! for warning in &result.warnings {
//!     eprintln!("warning: {}", warning);
//! }
//! # Ok::<(), solidtree::Error>(())
//! ```

pub mod detect;
pub mod patch;

pub use detect::{Artifacts, detect_artifacts, select_artifacts};

use crate::error::{Error, Result};
use crate::model::{
    BuildConfig, BuildResult, BuildWarning, FaceMatGroup, PairingPolicy, PatchTarget,
};
use crate::reference::DeclaredRefs;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Builds part trees inside a solid template directory
#[derive(Debug, Clone)]
pub struct TemplateTreeBuilder {
    dir: PathBuf,
    config: BuildConfig,
}

/// Required descriptors, read before anything is written
struct Descriptors {
    root: String,
    parent: String,
    leaf: String,
}

/// How a part's material reference was settled
struct Resolved {
    reference: String,
    warning: Option<BuildWarning>,
}

impl TemplateTreeBuilder {
    /// Create a builder for `dir` with the default configuration
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self {
            dir: dir.into(),
            config: BuildConfig::default(),
        }
    }

    /// Use a custom configuration
    pub fn with_config(mut self, config: BuildConfig) -> Self {
        self.config = config;
        self
    }

    /// Template directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Active configuration
    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    /// Generate the part trees for `model_name`
    ///
    /// `groups` are the model's face-material groups in file order; group `i`
    /// gives the material of the `i`-th detected visual.
    ///
    /// Every edit is made in memory first and files are written only once all
    /// of them succeeded. A descriptor that is not well-formed XML is left
    /// untouched and reported as [`BuildWarning::MalformedDescriptor`]. Parts
    /// are only created when both the leaf and the parent can be edited, so
    /// the parent always lists exactly the parts on disk.
    ///
    /// # Errors
    ///
    /// Fails when the template directory or a required descriptor is missing,
    /// a descriptor cannot be read or written, or when the pairing policy is
    /// [`PairingPolicy::Strict`] and groups and visuals differ in count.
    /// Every other condition is reported in [`BuildResult::warnings`].
    pub fn build(&self, model_name: &str, groups: &[FaceMatGroup]) -> Result<BuildResult> {
        let layout = self.config.layout();
        let descriptors = self.read_descriptors()?;
        let mut result = BuildResult::default();

        let refs = self.declared_refs(&mut result);
        info!(
            "{} declared material ref(s) in {}",
            refs.len(),
            layout.solid
        );

        let artifacts = detect_artifacts(&self.dir, layout)?;
        info!(
            "Detected {} visual(s), surface: {}",
            artifacts.visuals.len(),
            artifacts.surface.as_deref().unwrap_or("<none>")
        );
        result.surface_ref = artifacts.surface.clone();
        result.visual_refs = artifacts.visuals.clone();

        if !artifacts.visuals.is_empty() && groups.len() != artifacts.visuals.len() {
            match self.config.pairing() {
                PairingPolicy::Strict => {
                    return Err(Error::PairingMismatch {
                        groups: groups.len(),
                        visuals: artifacts.visuals.len(),
                    });
                }
                PairingPolicy::Lenient => record(
                    &mut result,
                    BuildWarning::GroupCountMismatch {
                        groups: groups.len(),
                        visuals: artifacts.visuals.len(),
                    },
                ),
            }
        }

        let mut writes = Vec::new();

        if artifacts.visuals.is_empty() {
            record(&mut result, BuildWarning::NoVisualUnitsDetected);
        } else {
            let leaf_ok = check_descriptor(&layout.leaf, &descriptors.leaf, &mut result);
            let parent_ok =
                check_descriptor(&layout.model_elements, &descriptors.parent, &mut result);
            if leaf_ok && parent_ok {
                self.plan_parts(
                    &descriptors.leaf,
                    &artifacts.visuals,
                    groups,
                    &refs,
                    &mut result,
                    &mut writes,
                )?;
                self.plan_parent(&descriptors.parent, &mut result, &mut writes)?;
            }
        }

        if check_descriptor(&layout.root, &descriptors.root, &mut result) {
            self.plan_root(
                &descriptors.root,
                model_name,
                artifacts.surface.as_deref(),
                &mut result,
                &mut writes,
            )?;
        }

        for (file, text) in &writes {
            fs::write(self.dir.join(file), text)?;
            debug!("Wrote {}", file);
        }

        info!(
            "Built {} part(s) for '{}' with {} warning(s)",
            result.created_parts.len(),
            model_name,
            result.warnings.len()
        );
        Ok(result)
    }

    fn read_descriptors(&self) -> Result<Descriptors> {
        if !self.dir.is_dir() {
            return Err(Error::TemplateDirNotFound(self.dir.clone()));
        }
        let layout = self.config.layout();
        Ok(Descriptors {
            root: self.read_required(&layout.root)?,
            parent: self.read_required(&layout.model_elements)?,
            leaf: self.read_required(&layout.leaf)?,
        })
    }

    fn read_required(&self, name: &str) -> Result<String> {
        let path = self.dir.join(name);
        if !path.is_file() {
            return Err(Error::missing_template_file(name, &self.dir));
        }
        Ok(fs::read_to_string(path)?)
    }

    /// Declared references, or an empty table with a warning
    fn declared_refs(&self, result: &mut BuildResult) -> DeclaredRefs {
        let file = &self.config.layout().solid;
        let path = self.dir.join(file);

        let reason = if !path.is_file() {
            None
        } else {
            match DeclaredRefs::from_path(&path) {
                Ok(refs) => return refs,
                Err(e) => Some(e.to_string()),
            }
        };

        record(
            result,
            BuildWarning::MissingReferenceDeclarations {
                file: file.clone(),
                reason,
                fallback: self.config.fallback_ref().to_string(),
            },
        );
        DeclaredRefs::new()
    }

    fn plan_parts(
        &self,
        leaf: &str,
        visuals: &[String],
        groups: &[FaceMatGroup],
        refs: &DeclaredRefs,
        result: &mut BuildResult,
        writes: &mut Vec<(String, String)>,
    ) -> Result<()> {
        let layout = self.config.layout();
        let mut reported_unknown = HashSet::new();

        for (index, visual) in visuals.iter().enumerate() {
            let part_name = layout.part_name(index);
            let part_file = layout.part_file(index);

            let desired = self.desired_ref(groups.get(index), &mut reported_unknown, result);
            let resolved = self.resolve_ref(&part_file, desired, refs);
            if let Some(warning) = resolved.warning {
                record(result, warning);
            }

            let mut text = leaf.to_string();
            let patched = patch::set_typed_name(&text, &part_name)?;
            apply(&mut text, patched, &part_file, PatchTarget::TypedName, result);
            let patched = patch::set_first_node_attr(&text, "link", visual)?;
            apply(&mut text, patched, &part_file, PatchTarget::GeometryLink, result);
            let patched = patch::set_first_node_attr(&text, "ref", &resolved.reference)?;
            apply(&mut text, patched, &part_file, PatchTarget::MaterialRef, result);

            debug!("{} -> {} ({})", part_file, visual, resolved.reference);
            writes.push((part_file.clone(), text));

            result.created_parts.push(part_file);
            result.part_refs.push(resolved.reference);
        }

        Ok(())
    }

    /// Reference the model asks for, before validation
    fn desired_ref(
        &self,
        group: Option<&FaceMatGroup>,
        reported_unknown: &mut HashSet<String>,
        result: &mut BuildResult,
    ) -> String {
        let Some(group) = group.filter(|g| !g.is_unnamed()) else {
            return self.config.fallback_ref().to_string();
        };
        let Some(canonical) = self.config.catalog().canonicalize(&group.material_name) else {
            return self.config.fallback_ref().to_string();
        };

        if !canonical.known && reported_unknown.insert(canonical.name.to_ascii_lowercase()) {
            record(
                result,
                BuildWarning::UnknownMaterial {
                    name: group.material_name.trim().to_string(),
                    normalized: canonical.name.clone(),
                },
            );
        }
        canonical.name
    }

    /// Settle `desired` against the declared references
    fn resolve_ref(&self, part_file: &str, desired: String, refs: &DeclaredRefs) -> Resolved {
        if let Some(declared) = refs.get(&desired) {
            return Resolved {
                reference: declared.to_string(),
                warning: None,
            };
        }

        let fallback = self.config.fallback_ref();
        let (substituted, table_empty) = match refs.pick_fallback(fallback) {
            Some(declared) => (declared.to_string(), false),
            None => (fallback.to_string(), true),
        };
        Resolved {
            warning: Some(BuildWarning::UnresolvedMaterialReference {
                part: part_file.to_string(),
                desired,
                substituted: substituted.clone(),
                table_empty,
            }),
            reference: substituted,
        }
    }

    fn plan_root(
        &self,
        root: &str,
        model_name: &str,
        surface: Option<&str>,
        result: &mut BuildResult,
        writes: &mut Vec<(String, String)>,
    ) -> Result<()> {
        let layout = self.config.layout();
        let mut text = root.to_string();

        let patched = patch::set_typed_name(&text, model_name)?;
        apply(&mut text, patched, &layout.root, PatchTarget::TypedName, result);

        match surface {
            None => record(result, BuildWarning::NoSurfaceDetected),
            Some(surface) => {
                let patched = match patch::set_surface_link(&text, &layout.surface_marker, surface)? {
                    Some(patched) => Some(patched),
                    None => patch::replace_literal(&text, &layout.surface_placeholder, surface),
                };
                apply(&mut text, patched, &layout.root, PatchTarget::SurfaceLink, result);
            }
        }

        if text != root {
            writes.push((layout.root.clone(), text));
        }
        Ok(())
    }

    fn plan_parent(
        &self,
        parent: &str,
        result: &mut BuildResult,
        writes: &mut Vec<(String, String)>,
    ) -> Result<()> {
        let layout = self.config.layout();
        match patch::rewrite_child_list(parent, &result.created_parts)? {
            Some(text) => {
                debug!(
                    "Listing {} part(s) in {}",
                    result.created_parts.len(),
                    layout.model_elements
                );
                writes.push((layout.model_elements.clone(), text));
            }
            None => record(
                result,
                BuildWarning::UnpatchableField {
                    file: layout.model_elements.clone(),
                    target: PatchTarget::ChildList,
                },
            ),
        }
        Ok(())
    }
}

/// Build part trees in `dir` with the default configuration
pub fn build_trees<P: Into<PathBuf>>(
    dir: P,
    model_name: &str,
    groups: &[FaceMatGroup],
) -> Result<BuildResult> {
    TemplateTreeBuilder::new(dir).build(model_name, groups)
}

fn record(result: &mut BuildResult, warning: BuildWarning) {
    warn!("{}", warning);
    result.warnings.push(warning);
}

/// Take an edit, or report that `target` was not found in `file`
fn apply(
    text: &mut String,
    patched: Option<String>,
    file: &str,
    target: PatchTarget,
    result: &mut BuildResult,
) {
    match patched {
        Some(patched) => *text = patched,
        None => record(
            result,
            BuildWarning::UnpatchableField {
                file: file.to_string(),
                target,
            },
        ),
    }
}

/// Whether `text` can be edited; a malformed descriptor is reported instead
fn check_descriptor(file: &str, text: &str, result: &mut BuildResult) -> bool {
    match patch::check_well_formed(text) {
        Ok(()) => true,
        Err(e) => {
            record(
                result,
                BuildWarning::MalformedDescriptor {
                    file: file.to_string(),
                    reason: e.to_string(),
                },
            );
            false
        }
    }
}
