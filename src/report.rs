//! Material usage report for a scanned 3DS model
//!
//! Summarises how many faces each material covers and how each name fares
//! against the catalog, so a model can be checked before a build.

use crate::catalog::MaterialCatalog;
use crate::model::MaterialScan;
use std::fmt;

/// How a material name compares to the catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MaterialStatus {
    /// Spelled exactly like a catalog entry
    Known,
    /// Catalog entry written with a different case
    CasingMismatch {
        /// Catalog spelling
        expected: String,
    },
    /// Not in the catalog
    Unknown,
}

/// Faces covered by one material
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaterialUsage {
    /// Material name, first spelling met in the model
    pub name: String,
    /// Sum of the face counts of all groups using the material
    pub face_count: u64,
    /// Catalog status
    pub status: MaterialStatus,
}

/// Material usage of one model
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MaterialReport {
    /// Number of declared material blocks (`0xA000`)
    pub declared_blocks: usize,
    /// Used materials, most faces first, then by name
    pub usage: Vec<MaterialUsage>,
}

impl MaterialReport {
    /// Build the report of a scan
    ///
    /// Groups are merged by name ignoring case; unnamed groups are left out.
    ///
    /// # Example
    ///
    /// ```
    /// use solidtree::catalog::MaterialCatalog;
    /// use solidtree::report::MaterialReport;
    /// use solidtree::{FaceMatGroup, MaterialScan};
    ///
    /// let mut scan = MaterialScan::new();
    /// scan.groups.push(FaceMatGroup::new("Sand", 10));
    /// scan.groups.push(FaceMatGroup::new("sand", 2));
    /// scan.groups.push(FaceMatGroup::new("Lava", 20));
    ///
    /// let report = MaterialReport::from_scan(&scan, &MaterialCatalog::default());
    /// assert_eq!(report.usage[0].name, "Lava");
    /// assert_eq!(report.usage[1].face_count, 12);
    /// assert_eq!(report.unknown().count(), 1);
    /// ```
    pub fn from_scan(scan: &MaterialScan, catalog: &MaterialCatalog) -> Self {
        let mut usage: Vec<MaterialUsage> = Vec::new();

        for group in &scan.groups {
            if group.is_unnamed() {
                continue;
            }
            let name = group.material_name.trim();
            let count = u64::from(group.face_count);
            match usage.iter_mut().find(|u| u.name.eq_ignore_ascii_case(name)) {
                Some(entry) => entry.face_count += count,
                None => usage.push(MaterialUsage {
                    name: name.to_string(),
                    face_count: count,
                    status: status_of(name, catalog),
                }),
            }
        }

        usage.sort_by(|a, b| {
            b.face_count
                .cmp(&a.face_count)
                .then_with(|| a.name.to_ascii_lowercase().cmp(&b.name.to_ascii_lowercase()))
        });

        Self {
            declared_blocks: scan.declared.len(),
            usage,
        }
    }

    /// Whether the model declares material blocks
    ///
    /// The solid pipeline expects none: materials must only be referenced by
    /// face-material groups.
    pub fn has_declared_blocks(&self) -> bool {
        self.declared_blocks > 0
    }

    /// Materials missing from the catalog
    pub fn unknown(&self) -> impl Iterator<Item = &MaterialUsage> {
        self.usage
            .iter()
            .filter(|u| u.status == MaterialStatus::Unknown)
    }

    /// Total faces over all used materials
    pub fn total_faces(&self) -> u64 {
        self.usage.iter().map(|u| u.face_count).sum()
    }
}

fn status_of(name: &str, catalog: &MaterialCatalog) -> MaterialStatus {
    match catalog.lookup(name) {
        Some(entry) if entry == name => MaterialStatus::Known,
        Some(entry) => MaterialStatus::CasingMismatch {
            expected: entry.to_string(),
        },
        None => MaterialStatus::Unknown,
    }
}

impl fmt::Display for MaterialReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Declared material blocks (0xA000): {}", self.declared_blocks)?;
        writeln!(f, "Used materials (0x4130): {}", self.usage.len())?;
        if self.has_declared_blocks() {
            writeln!(
                f,
                "WARNING: {} material block(s) detected; the solid pipeline requires none",
                self.declared_blocks
            )?;
        }

        for usage in &self.usage {
            write!(f, "- {} ({} faces)", usage.name, usage.face_count)?;
            match &usage.status {
                MaterialStatus::Known => writeln!(f)?,
                MaterialStatus::CasingMismatch { expected } => {
                    writeln!(f, "  [expected '{}']", expected)?
                }
                MaterialStatus::Unknown => writeln!(f, "  [UNKNOWN MATERIAL]")?,
            }
        }

        let unknown = self.unknown().count();
        if unknown > 0 {
            writeln!(f, "Unknown materials: {}", unknown)?;
        }
        Ok(())
    }
}
