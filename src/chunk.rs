//! Chunk walking for 3DS binary files
//!
//! A 3DS file is a tree of tag-length-value records. Every chunk starts with a
//! 6-byte header: a little-endian `u16` id followed by a little-endian `u32`
//! length that covers the header itself. Some chunk ids are pure containers,
//! some prefix their children with a payload (an object name, a face list).
//!
//! The functions here never fail. A header whose length is shorter than the
//! header or runs past the end of its parent range stops the scan of that
//! range; the chunks read before it are kept and the offset of the bad header
//! is reported in [`ChunkScan::halted_at`].
//!
//! # Example
//!
//! ```
//! use solidtree::chunk::{self, ids};
//!
//! // A main chunk holding a single, empty editor chunk
//! let bytes = [0x4D, 0x4D, 12, 0, 0, 0, 0x3D, 0x3D, 6, 0, 0, 0];
//! let chunks = chunk::walk(&bytes);
//! assert_eq!(chunks.len(), 2);
//! assert_eq!(chunks[1].id, ids::EDITOR);
//! ```

use std::ops::Range;

/// Size of a chunk header (u16 id + u32 length)
pub const HEADER_SIZE: usize = 6;

/// Size of one face record inside a faces block (3 × u16 index + u16 flags)
pub const FACE_RECORD_SIZE: usize = 8;

/// Nesting limit for [`walk`]; real files stay below 6 levels
const MAX_DEPTH: usize = 64;

/// Chunk ids used by the extractors
pub mod ids {
    /// Main chunk, root of every 3DS file
    pub const MAIN: u16 = 0x4D4D;
    /// 3D editor chunk
    pub const EDITOR: u16 = 0x3D3D;
    /// Object block: null-terminated name followed by sub-chunks
    pub const OBJECT: u16 = 0x4000;
    /// Triangle mesh container
    pub const TRIMESH: u16 = 0x4100;
    /// Faces block: u16 count, count × 8 bytes of faces, then sub-chunks
    pub const FACES: u16 = 0x4120;
    /// Face-material group: material name followed by a u16 face count
    pub const FACE_MATERIAL: u16 = 0x4130;
    /// Material block container
    pub const MATERIAL_BLOCK: u16 = 0xAFFF;
    /// Material name
    pub const MATERIAL_NAME: u16 = 0xA000;
}

/// A decoded chunk header with its byte ranges
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk {
    /// Chunk id
    pub id: u16,
    /// Total length including the 6-byte header
    pub length: u32,
    /// Offset of the header
    pub start: usize,
    /// First byte after the header
    pub content_start: usize,
    /// One past the last byte of the chunk
    pub content_end: usize,
}

impl Chunk {
    /// Byte range of the chunk payload
    pub fn content(&self) -> Range<usize> {
        self.content_start..self.content_end
    }

    /// Whether the id is a pure container
    pub fn is_container(&self) -> bool {
        matches!(
            self.id,
            ids::MAIN | ids::EDITOR | ids::TRIMESH | ids::MATERIAL_BLOCK
        )
    }
}

/// Result of scanning one range of sibling chunks
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChunkScan {
    /// Chunks read in file order
    pub chunks: Vec<Chunk>,
    /// Offset of the header that failed validation, if the scan stopped early
    pub halted_at: Option<usize>,
}

impl ChunkScan {
    /// Whether the scan stopped on a malformed header
    pub fn is_truncated(&self) -> bool {
        self.halted_at.is_some()
    }

    /// Offset where the last accepted chunk ends (or where the scan began)
    pub fn consumed_until(&self, range_start: usize) -> usize {
        self.chunks
            .last()
            .map(|c| c.content_end)
            .unwrap_or(range_start)
    }
}

/// Scan the sibling chunks in `range`
///
/// The offset advances by each chunk's own length, so nested chunks are not
/// visited; use [`children`] to descend. The range is clamped to the buffer.
pub fn scan(buf: &[u8], range: Range<usize>) -> ChunkScan {
    let end = range.end.min(buf.len());
    let mut offset = range.start;
    let mut result = ChunkScan::default();

    while offset + HEADER_SIZE <= end {
        let id = read_u16(buf, offset);
        let length = read_u32(buf, offset + 2);
        let chunk_end = offset.checked_add(length as usize);

        match chunk_end {
            Some(chunk_end) if length as usize >= HEADER_SIZE && chunk_end <= end => {
                result.chunks.push(Chunk {
                    id,
                    length,
                    start: offset,
                    content_start: offset + HEADER_SIZE,
                    content_end: chunk_end,
                });
                offset = chunk_end;
            }
            _ => {
                tracing::debug!(
                    "Chunk 0x{:04X} at offset {} has invalid length {} (range ends at {})",
                    id,
                    offset,
                    length,
                    end
                );
                result.halted_at = Some(offset);
                break;
            }
        }
    }

    result
}

/// Range holding the sub-chunks of `chunk`, if it has any
///
/// - containers: the whole payload
/// - object blocks: the payload after the null-terminated name
/// - faces blocks: the payload after the face count and face records
pub fn children(buf: &[u8], chunk: &Chunk) -> Option<Range<usize>> {
    let end = chunk.content_end.min(buf.len());

    match chunk.id {
        _ if chunk.is_container() => Some(chunk.content_start..end),
        ids::OBJECT => {
            let (_, next) = read_zstring(buf, chunk.content_start..end);
            (next < end).then_some(next..end)
        }
        ids::FACES => {
            if chunk.content_start + 2 > end {
                return None;
            }
            let face_count = read_u16(buf, chunk.content_start) as usize;
            let sub_start = chunk.content_start + 2 + face_count * FACE_RECORD_SIZE;
            (sub_start < end).then_some(sub_start..end)
        }
        _ => None,
    }
}

/// Depth-first, pre-order list of every chunk reachable from the whole buffer
pub fn walk(buf: &[u8]) -> Vec<Chunk> {
    walk_range(buf, 0..buf.len())
}

/// Depth-first, pre-order list of every chunk reachable from `range`
pub fn walk_range(buf: &[u8], range: Range<usize>) -> Vec<Chunk> {
    walk_at_depth(buf, range, 0)
}

fn walk_at_depth(buf: &[u8], range: Range<usize>, depth: usize) -> Vec<Chunk> {
    let mut out = Vec::new();
    for chunk in scan(buf, range).chunks {
        out.push(chunk);
        let Some(sub) = children(buf, &chunk) else {
            continue;
        };
        if depth >= MAX_DEPTH {
            tracing::debug!(
                "Not descending into chunk 0x{:04X} at offset {}: nesting deeper than {}",
                chunk.id,
                chunk.start,
                MAX_DEPTH
            );
            continue;
        }
        out.extend(walk_at_depth(buf, sub, depth + 1));
    }
    out
}

/// Read a null-terminated ASCII string bounded by `range`
///
/// Returns the string and the offset just past the terminator (or the range
/// end when no terminator was found). Non-ASCII bytes decode as `?`.
pub fn read_zstring(buf: &[u8], range: Range<usize>) -> (String, usize) {
    let end = range.end.min(buf.len());
    let start = range.start.min(end);
    let terminator = buf[start..end]
        .iter()
        .position(|&b| b == 0)
        .map(|pos| start + pos);

    let text_end = terminator.unwrap_or(end);
    let text = buf[start..text_end]
        .iter()
        .map(|&b| if b.is_ascii() { b as char } else { '?' })
        .collect();

    let next = match terminator {
        Some(pos) => pos + 1,
        None => end,
    };
    (text, next)
}

/// Read a little-endian u16; callers guarantee `offset + 2 <= buf.len()`
pub(crate) fn read_u16(buf: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([buf[offset], buf[offset + 1]])
}

fn read_u32(buf: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        buf[offset],
        buf[offset + 1],
        buf[offset + 2],
        buf[offset + 3],
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(id: u16, payload: &[u8]) -> Vec<u8> {
        let mut out = Vec::with_capacity(HEADER_SIZE + payload.len());
        out.extend_from_slice(&id.to_le_bytes());
        out.extend_from_slice(&((HEADER_SIZE + payload.len()) as u32).to_le_bytes());
        out.extend_from_slice(payload);
        out
    }

    #[test]
    fn test_scan_siblings() {
        let mut buf = chunk(0x0002, &[1, 2, 3]);
        buf.extend(chunk(0x0003, &[]));
        let result = scan(&buf, 0..buf.len());

        assert_eq!(result.chunks.len(), 2);
        assert_eq!(result.chunks[0].id, 0x0002);
        assert_eq!(result.chunks[0].length, 9);
        assert_eq!(result.chunks[0].content(), 6..9);
        assert_eq!(result.chunks[1].start, 9);
        assert!(!result.is_truncated());
        assert_eq!(result.consumed_until(0), buf.len());
    }

    #[test]
    fn test_scan_does_not_descend() {
        let inner = chunk(ids::EDITOR, &chunk(ids::OBJECT, b"box\0"));
        let buf = chunk(ids::MAIN, &inner);
        let result = scan(&buf, 0..buf.len());
        assert_eq!(result.chunks.len(), 1);
        assert_eq!(result.chunks[0].id, ids::MAIN);
    }

    #[test]
    fn test_scan_halts_on_short_length() {
        let mut buf = chunk(0x0002, &[]);
        buf.extend_from_slice(&[0x03, 0x00, 5, 0, 0, 0, 0xFF, 0xFF]);
        let result = scan(&buf, 0..buf.len());
        assert_eq!(result.chunks.len(), 1);
        assert_eq!(result.halted_at, Some(6));
    }

    #[test]
    fn test_scan_halts_on_overrun() {
        let buf = [0x02, 0x00, 100, 0, 0, 0, 1, 2, 3];
        let result = scan(&buf, 0..buf.len());
        assert!(result.chunks.is_empty());
        assert_eq!(result.halted_at, Some(0));
    }

    #[test]
    fn test_scan_huge_length_does_not_overflow() {
        let buf = [0x02, 0x00, 0xFF, 0xFF, 0xFF, 0xFF];
        let result = scan(&buf, 0..buf.len());
        assert!(result.chunks.is_empty());
        assert_eq!(result.halted_at, Some(0));
    }

    #[test]
    fn test_scan_ignores_short_trailer() {
        let mut buf = chunk(0x0002, &[]);
        buf.extend_from_slice(&[1, 2, 3]);
        let result = scan(&buf, 0..buf.len());
        assert_eq!(result.chunks.len(), 1);
        assert!(!result.is_truncated());
    }

    #[test]
    fn test_children_of_object_skips_name() {
        let mut payload = b"Box01\0".to_vec();
        payload.extend(chunk(ids::TRIMESH, &[]));
        let buf = chunk(ids::OBJECT, &payload);
        let object = scan(&buf, 0..buf.len()).chunks[0];
        assert_eq!(children(&buf, &object), Some(12..buf.len()));
    }

    #[test]
    fn test_children_of_object_without_subchunks() {
        let buf = chunk(ids::OBJECT, b"Box01\0");
        let object = scan(&buf, 0..buf.len()).chunks[0];
        assert_eq!(children(&buf, &object), None);
    }

    #[test]
    fn test_children_of_faces_skips_records() {
        let mut payload = 2u16.to_le_bytes().to_vec();
        payload.extend_from_slice(&[0u8; 16]);
        payload.extend(chunk(ids::FACE_MATERIAL, b"Sand\0\x02\x00"));
        let buf = chunk(ids::FACES, &payload);
        let faces = scan(&buf, 0..buf.len()).chunks[0];
        assert_eq!(children(&buf, &faces), Some(24..buf.len()));
    }

    #[test]
    fn test_children_of_truncated_faces() {
        let buf = chunk(ids::FACES, &[1]);
        let faces = scan(&buf, 0..buf.len()).chunks[0];
        assert_eq!(children(&buf, &faces), None);
    }

    #[test]
    fn test_walk_preorder() {
        let mat = chunk(ids::MATERIAL_BLOCK, &chunk(ids::MATERIAL_NAME, b"Dirt\0"));
        let mut object = b"o\0".to_vec();
        object.extend(chunk(ids::TRIMESH, &[]));
        let mut editor = mat;
        editor.extend(chunk(ids::OBJECT, &object));
        let buf = chunk(ids::MAIN, &chunk(ids::EDITOR, &editor));

        let found: Vec<u16> = walk(&buf).iter().map(|c| c.id).collect();
        assert_eq!(
            found,
            vec![
                ids::MAIN,
                ids::EDITOR,
                ids::MATERIAL_BLOCK,
                ids::MATERIAL_NAME,
                ids::OBJECT,
                ids::TRIMESH
            ]
        );
    }

    #[test]
    fn test_read_zstring() {
        let buf = b"Sand\0rest";
        assert_eq!(read_zstring(buf, 0..buf.len()), ("Sand".to_string(), 5));
    }

    #[test]
    fn test_read_zstring_unterminated() {
        let buf = b"Sand";
        assert_eq!(read_zstring(buf, 0..3), ("San".to_string(), 3));
    }

    #[test]
    fn test_read_zstring_non_ascii() {
        let buf = [b'a', 0xE9, b'b', 0];
        assert_eq!(read_zstring(&buf, 0..4).0, "a?b");
    }
}
