//! Face-material groups (chunk `0x4130`)

use crate::chunk::{self, Chunk, ids};
use crate::model::FaceMatGroup;

/// Collect the face-material groups of a 3DS buffer in encounter order
///
/// Groups live inside faces blocks (`0x4120`) after the face records. Each
/// chunk yields one group; a group whose face count was cut off by the chunk
/// end gets a count of 0.
pub fn extract_face_groups(bytes: &[u8]) -> Vec<FaceMatGroup> {
    groups_from_chunks(bytes, &chunk::walk(bytes))
}

pub(super) fn groups_from_chunks(bytes: &[u8], chunks: &[Chunk]) -> Vec<FaceMatGroup> {
    chunks
        .iter()
        .filter(|c| c.id == ids::FACE_MATERIAL)
        .map(|c| read_group(bytes, c))
        .collect()
}

fn read_group(bytes: &[u8], c: &Chunk) -> FaceMatGroup {
    let (material_name, next) = chunk::read_zstring(bytes, c.content());
    let face_count = if next + 2 <= c.content_end {
        chunk::read_u16(bytes, next)
    } else {
        0
    };

    FaceMatGroup {
        material_name,
        face_count,
    }
}
