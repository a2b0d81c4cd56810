//! Build configuration

use crate::catalog::MaterialCatalog;

/// Reference used when no declaration can confirm a material
pub const DEFAULT_FALLBACK_REF: &str = "sand";

/// How face-material groups are paired with visual files
///
/// Groups and visuals are paired by position: group `i` gives the material of
/// the `i`-th visual in sorted order. Nothing in either file ties them
/// together, so a count mismatch means the pairing is a guess.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PairingPolicy {
    /// Report a mismatch as a warning; unpaired visuals use the fallback ref
    #[default]
    Lenient,
    /// Abort the build before writing anything when counts differ
    Strict,
}

/// File names of a solid template directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateLayout {
    /// Root tree, patched with the model name and surface link
    pub root: String,
    /// Parent tree whose children list is rewritten
    pub model_elements: String,
    /// Leaf tree cloned once per visual
    pub leaf: String,
    /// Optional file declaring material refs (`refname="..."`)
    pub solid: String,
    /// Prefix of the template's own surface file
    pub surface_placeholder_prefix: String,
    /// Surface file name the root links to before patching
    pub surface_placeholder: String,
    /// Prefix of the template's own visual file
    pub visual_placeholder_prefix: String,
    /// Marker contained in surface file names
    pub surface_marker: String,
    /// Marker contained in visual file names
    pub visual_marker: String,
    /// Prefix of generated part files
    pub part_prefix: String,
    /// Suffix of generated part files
    pub part_suffix: String,
}

impl Default for TemplateLayout {
    fn default() -> Self {
        Self {
            root: "Root.CPlugTree.xml".to_string(),
            model_elements: "ModelElements.CPlugTree.xml".to_string(),
            leaf: "Model.CPlugTree.xml".to_string(),
            solid: "Template.Solid.xml".to_string(),
            surface_placeholder_prefix: "Template.".to_string(),
            surface_placeholder: "Template.CPlugSurfaceCrystal.xml".to_string(),
            visual_placeholder_prefix: "Model.".to_string(),
            surface_marker: "CPlugSurface".to_string(),
            visual_marker: "CPlugVisualIndexedTriangles".to_string(),
            part_prefix: "Part_".to_string(),
            part_suffix: ".CPlugTree.xml".to_string(),
        }
    }
}

impl TemplateLayout {
    /// Identifier of the `index`-th generated part (`Part_00`, `Part_01`, ...)
    pub fn part_name(&self, index: usize) -> String {
        format!("{}{:02}", self.part_prefix, index)
    }

    /// File name of the `index`-th generated part
    pub fn part_file(&self, index: usize) -> String {
        format!("{}{}", self.part_name(index), self.part_suffix)
    }
}

/// Configuration for [`TemplateTreeBuilder`](crate::template::TemplateTreeBuilder)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildConfig {
    layout: TemplateLayout,
    catalog: MaterialCatalog,
    fallback_ref: String,
    pairing: PairingPolicy,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl BuildConfig {
    /// Default layout, the standard surface catalog and `"sand"` fallback
    pub fn new() -> Self {
        Self {
            layout: TemplateLayout::default(),
            catalog: MaterialCatalog::default(),
            fallback_ref: DEFAULT_FALLBACK_REF.to_string(),
            pairing: PairingPolicy::default(),
        }
    }

    /// Use a different template layout
    pub fn with_layout(mut self, layout: TemplateLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Use a different material catalog
    pub fn with_catalog(mut self, catalog: MaterialCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// Reference preferred as fallback, and used when nothing is declared
    pub fn with_fallback_ref(mut self, fallback: impl Into<String>) -> Self {
        self.fallback_ref = fallback.into();
        self
    }

    /// Set the pairing policy
    pub fn with_pairing(mut self, pairing: PairingPolicy) -> Self {
        self.pairing = pairing;
        self
    }

    /// Template layout
    pub fn layout(&self) -> &TemplateLayout {
        &self.layout
    }

    /// Material catalog
    pub fn catalog(&self) -> &MaterialCatalog {
        &self.catalog
    }

    /// Fallback reference
    pub fn fallback_ref(&self) -> &str {
        &self.fallback_ref
    }

    /// Pairing policy
    pub fn pairing(&self) -> PairingPolicy {
        self.pairing
    }
}
