//! Declared material names (chunk `0xA000`)

use crate::chunk::{self, Chunk, ids};

/// Collect the material names declared in a 3DS buffer
///
/// Names are read up to their terminator or the end of their chunk, blank
/// names are skipped, and duplicates that differ only by case are dropped in
/// favour of the first spelling seen.
pub fn extract_material_names(bytes: &[u8]) -> Vec<String> {
    names_from_chunks(bytes, &chunk::walk(bytes))
}

pub(super) fn names_from_chunks(bytes: &[u8], chunks: &[Chunk]) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();

    for c in chunks.iter().filter(|c| c.id == ids::MATERIAL_NAME) {
        let (name, _) = chunk::read_zstring(bytes, c.content());
        if name.trim().is_empty() {
            continue;
        }
        if names.iter().any(|n| n.eq_ignore_ascii_case(&name)) {
            continue;
        }
        names.push(name);
    }

    names
}
