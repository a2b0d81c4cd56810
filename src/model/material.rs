//! Material data read from 3DS files

/// One face-material group record (chunk `0x4130`)
///
/// Groups are kept in file order and never deduplicated: the same material
/// can appear once per submesh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaceMatGroup {
    /// Material name as written in the file
    pub material_name: String,
    /// Number of faces using the material (0 when the count was truncated)
    pub face_count: u16,
}

impl FaceMatGroup {
    /// Create a new face-material group
    pub fn new(material_name: impl Into<String>, face_count: u16) -> Self {
        Self {
            material_name: material_name.into(),
            face_count,
        }
    }

    /// Whether the group has no usable material name
    pub fn is_unnamed(&self) -> bool {
        self.material_name.trim().is_empty()
    }
}

/// Materials found in one 3DS buffer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MaterialScan {
    /// Names declared by material-name chunks (`0xA000`), deduplicated
    /// case-insensitively, first spelling kept
    pub declared: Vec<String>,
    /// Face-material groups (`0x4130`) in encounter order
    pub groups: Vec<FaceMatGroup>,
}

impl MaterialScan {
    /// Create an empty scan
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of faces covered by material groups
    pub fn total_faces(&self) -> u64 {
        self.groups.iter().map(|g| u64::from(g.face_count)).sum()
    }
}
