//! Shared fixtures for integration tests
//!
//! Builders for synthetic 3DS buffers and solid template directories.

#![allow(dead_code)]

use solidtree::chunk::ids;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

pub const ROOT_XML: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<gbx class="CPlugTree" version="6">
    <body>
        <chunk id="0x0904F00D">
            <lookbackstr type="40">Template</lookbackstr>
        </chunk>
        <chunk id="0x0904F01A">
            <node link="Template.CPlugSurfaceCrystal.xml"/>
        </chunk>
    </body>
</gbx>
"#;

pub const PARENT_XML: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<gbx class="CPlugTree" version="6">
    <body>
        <chunk id="0x0904F00D">
            <lookbackstr type="40">ModelElements</lookbackstr>
        </chunk>
        <chunk id="0x0904F00B">
            <list>
                <element>
                    <node link="Model.CPlugTree.xml"/>
                </element>
            </list>
        </chunk>
    </body>
</gbx>
"#;

pub const LEAF_XML: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<gbx class="CPlugTree" version="6">
    <body>
        <chunk id="0x0904F00D">
            <lookbackstr type="40">Model</lookbackstr>
        </chunk>
        <chunk id="0x0904F016">
            <node link="Model.CPlugVisualIndexedTriangles.xml"/>
        </chunk>
        <chunk id="0x0904F01A">
            <node ref="Concrete"/>
        </chunk>
    </body>
</gbx>
"#;

/// Encode one chunk: header plus payload
pub fn chunk(id: u16, payload: &[u8]) -> Vec<u8> {
    let mut out = id.to_le_bytes().to_vec();
    out.extend_from_slice(&((payload.len() + 6) as u32).to_le_bytes());
    out.extend_from_slice(payload);
    out
}

/// Null-terminated string bytes
pub fn zstring(s: &str) -> Vec<u8> {
    let mut out = s.as_bytes().to_vec();
    out.push(0);
    out
}

/// Face-material group chunk (`0x4130`) with a face count
pub fn face_group(name: &str, count: u16) -> Vec<u8> {
    let mut payload = zstring(name);
    payload.extend_from_slice(&count.to_le_bytes());
    chunk(ids::FACE_MATERIAL, &payload)
}

/// Faces chunk (`0x4120`) with `faces` zeroed records followed by sub-chunks
pub fn faces(faces: u16, sub: &[Vec<u8>]) -> Vec<u8> {
    let mut payload = faces.to_le_bytes().to_vec();
    payload.resize(2 + faces as usize * 8, 0);
    for s in sub {
        payload.extend_from_slice(s);
    }
    chunk(ids::FACES, &payload)
}

/// Object chunk (`0x4000`) holding one triangle mesh
pub fn object(name: &str, mesh: &[Vec<u8>]) -> Vec<u8> {
    let mut trimesh = Vec::new();
    for m in mesh {
        trimesh.extend_from_slice(m);
    }
    let mut payload = zstring(name);
    payload.extend_from_slice(&chunk(ids::TRIMESH, &trimesh));
    chunk(ids::OBJECT, &payload)
}

/// Material block (`0xAFFF`) declaring one name
pub fn material_block(name: &str) -> Vec<u8> {
    chunk(
        ids::MATERIAL_BLOCK,
        &chunk(ids::MATERIAL_NAME, &zstring(name)),
    )
}

/// Whole 3DS file wrapping `editor` chunks in main and editor containers
pub fn model(editor: &[Vec<u8>]) -> Vec<u8> {
    let mut body = Vec::new();
    for e in editor {
        body.extend_from_slice(e);
    }
    chunk(ids::MAIN, &chunk(ids::EDITOR, &body))
}

/// One object per group, each with a single face-material group
pub fn model_with_groups(groups: &[(&str, u16)]) -> Vec<u8> {
    let objects: Vec<Vec<u8>> = groups
        .iter()
        .enumerate()
        .map(|(i, (name, count))| {
            object(
                &format!("mesh{}", i),
                &[faces(*count, &[face_group(name, *count)])],
            )
        })
        .collect();
    model(&objects)
}

/// Solid template declaring `refs`
pub fn solid_xml(refs: &[&str]) -> String {
    let mut out = String::from(
        "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<gbx class=\"CPlugSolid\">\n    <body>\n",
    );
    for r in refs {
        out.push_str(&format!(
            "        <node refname=\"{}\" link=\"{}.CPlugMaterial.xml\"/>\n",
            r, r
        ));
    }
    out.push_str("    </body>\n</gbx>\n");
    out
}

/// Template directory with the three descriptors, placeholders and the
/// given converter output
pub fn template_dir(solid_refs: Option<&[&str]>, files: &[&str]) -> TempDir {
    let dir = tempfile::tempdir().expect("temp dir");
    write(dir.path(), "Root.CPlugTree.xml", ROOT_XML);
    write(dir.path(), "ModelElements.CPlugTree.xml", PARENT_XML);
    write(dir.path(), "Model.CPlugTree.xml", LEAF_XML);
    write(dir.path(), "Template.CPlugSurfaceCrystal.xml", "<gbx/>");
    write(dir.path(), "Model.CPlugVisualIndexedTriangles.xml", "<gbx/>");
    if let Some(refs) = solid_refs {
        write(dir.path(), "Template.Solid.xml", &solid_xml(refs));
    }
    for file in files {
        write(dir.path(), file, "<gbx/>");
    }
    dir
}

pub fn write(dir: &Path, name: &str, content: &str) {
    fs::write(dir.join(name), content).expect("write fixture");
}

pub fn read(dir: &Path, name: &str) -> String {
    fs::read_to_string(dir.join(name)).expect("read output")
}
