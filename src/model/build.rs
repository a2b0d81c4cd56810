//! Build outcome and warning types

use std::fmt;

/// Field of a template descriptor that a build edits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PatchTarget {
    /// `<lookbackstr type="40">` holding the tree name
    TypedName,
    /// First `<node link="..."/>` of a part (the visual file)
    GeometryLink,
    /// First `<node ref="..."/>` of a part (the material reference)
    MaterialRef,
    /// Root `link` attribute pointing to a `CPlugSurface` file
    SurfaceLink,
    /// First `<list>` block of the parent tree
    ChildList,
}

impl PatchTarget {
    /// Human-readable name
    pub fn name(&self) -> &'static str {
        match self {
            PatchTarget::TypedName => "name field",
            PatchTarget::GeometryLink => "visual link",
            PatchTarget::MaterialRef => "material ref",
            PatchTarget::SurfaceLink => "surface link",
            PatchTarget::ChildList => "children list",
        }
    }
}

/// Recoverable condition met during a build
///
/// Warnings never abort a build. Each one is also emitted through
/// `tracing::warn!` when it is recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildWarning {
    /// The reference declaration file is absent or unreadable
    MissingReferenceDeclarations {
        /// File name that was looked up
        file: String,
        /// Why it could not be used, when it exists but failed to parse
        reason: Option<String>,
        /// Reference used instead for every part
        fallback: String,
    },
    /// A part's material reference could not be confirmed
    UnresolvedMaterialReference {
        /// Part file the reference was written to
        part: String,
        /// Reference derived from the face-material group
        desired: String,
        /// Reference written instead
        substituted: String,
        /// True when no references were declared at all
        table_empty: bool,
    },
    /// A material name is not in the catalog
    UnknownMaterial {
        /// Name read from the model
        name: String,
        /// Best-effort spelling used for the lookup
        normalized: String,
    },
    /// No visual file was found, so no part was generated
    NoVisualUnitsDetected,
    /// No surface file was found, so the root keeps its current link
    NoSurfaceDetected,
    /// Group and visual counts differ, so pairing by index is partial
    GroupCountMismatch {
        /// Face-material groups read from the model
        groups: usize,
        /// Visual files detected in the template directory
        visuals: usize,
    },
    /// An expected element was not found; the file keeps its current value
    UnpatchableField {
        /// File being edited
        file: String,
        /// Field that was not found
        target: PatchTarget,
    },
    /// A descriptor is not well-formed XML and was left unchanged
    MalformedDescriptor {
        /// File that failed to parse
        file: String,
        /// Parser message
        reason: String,
    },
}

impl fmt::Display for BuildWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildWarning::MissingReferenceDeclarations {
                file,
                reason: None,
                fallback,
            } => write!(
                f,
                "{} not found, material refs fall back to '{}'",
                file, fallback
            ),
            BuildWarning::MissingReferenceDeclarations {
                file,
                reason: Some(reason),
                fallback,
            } => write!(
                f,
                "{} could not be read ({}), material refs fall back to '{}'",
                file, reason, fallback
            ),
            BuildWarning::UnresolvedMaterialReference {
                part,
                desired,
                substituted,
                table_empty: false,
            } => write!(
                f,
                "{}: material ref '{}' not declared -> using '{}'",
                part, desired, substituted
            ),
            BuildWarning::UnresolvedMaterialReference {
                part,
                desired,
                substituted,
                table_empty: true,
            } => write!(
                f,
                "{}: no declared refs found; forcing material '{}' (wanted '{}')",
                part, substituted, desired
            ),
            BuildWarning::UnknownMaterial { name, normalized } => write!(
                f,
                "Unknown material name '{}' (looked up as '{}')",
                name, normalized
            ),
            BuildWarning::NoVisualUnitsDetected => write!(
                f,
                "No visual XML detected; parts were not generated and the children list is unchanged"
            ),
            BuildWarning::NoSurfaceDetected => write!(
                f,
                "No surface XML detected; root keeps its current surface link"
            ),
            BuildWarning::GroupCountMismatch { groups, visuals } => write!(
                f,
                "{} face-material group(s) for {} visual file(s); unpaired visuals use the fallback ref",
                groups, visuals
            ),
            BuildWarning::UnpatchableField { file, target } => {
                write!(f, "{}: could not find the {} (kept as-is)", file, target.name())
            }
            BuildWarning::MalformedDescriptor { file, reason } => {
                write!(f, "{} is not well-formed XML ({}); kept as-is", file, reason)
            }
        }
    }
}

/// Outcome of a template tree build
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildResult {
    /// Generated part file names, in creation order
    pub created_parts: Vec<String>,
    /// Surface file linked from the root, if one was detected
    pub surface_ref: Option<String>,
    /// Visual files in pairing order
    pub visual_refs: Vec<String>,
    /// Material reference written to each created part
    pub part_refs: Vec<String>,
    /// Recoverable conditions met during the build
    pub warnings: Vec<BuildWarning>,
}

impl BuildResult {
    /// Whether any warning was recorded
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Warnings about material references that were replaced
    pub fn unresolved_refs(&self) -> impl Iterator<Item = &BuildWarning> {
        self.warnings
            .iter()
            .filter(|w| matches!(w, BuildWarning::UnresolvedMaterialReference { .. }))
    }
}
