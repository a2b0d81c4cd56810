//! # solidtree
//!
//! Material extraction from 3DS models and part descriptor generation for
//! CPlugSolid templates.
//!
//! A 3DS model exported for a solid carries one face-material group per
//! submesh. After an external converter has turned the model into surface and
//! visual XML files inside a template directory, this library generates one
//! `Part_XX.CPlugTree.xml` per visual, binds each part to the material of its
//! group, and wires the parts into the template's root and parent trees.
//!
//! ## Features
//!
//! - Pure Rust implementation with no unsafe code
//! - Bounds-checked 3DS chunk walking that never panics on truncated input
//! - Material name and face-material group extraction
//! - Material name canonicalisation against the surface catalog
//! - Material reference validation against the template's declarations
//! - Structural XML edits that keep untouched bytes as they were
//!
//! ## Example
//!
//! ```no_run
//! use solidtree::{MaterialScan, TemplateTreeBuilder};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let scan = MaterialScan::from_path("Rock.3ds")?;
//! let result = TemplateTreeBuilder::new("work/Rock").build("Rock", &scan.groups)?;
//!
//! println!("Created {} part(s)", result.created_parts.len());
//! for warning in &result.warnings {
//!     println!("warning: {}", warning);
//! }
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod catalog;
pub mod chunk;
pub mod error;
pub mod model;
pub mod parser;
pub mod reference;
pub mod report;
pub mod template;

pub use catalog::{Canonical, KNOWN_MATERIALS, MaterialCatalog};
pub use chunk::{Chunk, ChunkScan};
pub use error::{Error, Result};
pub use model::{
    BuildConfig, BuildResult, BuildWarning, DEFAULT_FALLBACK_REF, FaceMatGroup, MaterialScan,
    PairingPolicy, PatchTarget, TemplateLayout,
};
pub use parser::{extract_face_groups, extract_material_names, scan_materials};
pub use reference::DeclaredRefs;
pub use report::{MaterialReport, MaterialStatus, MaterialUsage};
pub use template::{TemplateTreeBuilder, build_trees};
