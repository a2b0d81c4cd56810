//! Material extraction from 3DS files
//!
//! Both extractors run over the pre-order chunk list produced by
//! [`chunk::walk`], so they see chunks in file order and inherit its handling
//! of malformed headers: a broken branch is cut short, everything read before
//! it is kept.

mod faces;
mod material;

use crate::chunk;
use crate::error::Result;
use crate::model::MaterialScan;
use std::io::Read;
use std::path::Path;

pub use faces::extract_face_groups;
pub use material::extract_material_names;

/// Read both the declared material names and the face-material groups
pub fn scan_materials(bytes: &[u8]) -> MaterialScan {
    let chunks = chunk::walk(bytes);
    let scan = MaterialScan {
        declared: material::names_from_chunks(bytes, &chunks),
        groups: faces::groups_from_chunks(bytes, &chunks),
    };

    tracing::debug!(
        "Scanned {} chunk(s): {} declared material(s), {} face-material group(s)",
        chunks.len(),
        scan.declared.len(),
        scan.groups.len()
    );

    scan
}

impl MaterialScan {
    /// Scan an in-memory 3DS file
    pub fn from_bytes(bytes: &[u8]) -> Self {
        scan_materials(bytes)
    }

    /// Scan a 3DS file from a reader
    ///
    /// # Example
    ///
    /// ```no_run
    /// use solidtree::MaterialScan;
    /// use std::fs::File;
    ///
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let file = File::open("model.3ds")?;
    /// let scan = MaterialScan::from_reader(file)?;
    /// println!("{} material group(s)", scan.groups.len());
    /// # Ok(())
    /// # }
    /// ```
    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        Ok(scan_materials(&bytes))
    }

    /// Scan a 3DS file on disk
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let bytes = std::fs::read(path.as_ref())?;
        Ok(scan_materials(&bytes))
    }
}
