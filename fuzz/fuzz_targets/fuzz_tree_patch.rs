#![no_main]

use libfuzzer_sys::fuzz_target;
use solidtree::DeclaredRefs;
use solidtree::template::patch;

fuzz_target!(|data: &[u8]| {
    // Malformed descriptors must surface as errors, never as panics
    let Ok(xml) = std::str::from_utf8(data) else {
        return;
    };

    let _ = DeclaredRefs::from_xml(xml);
    let _ = patch::replace_literal(xml, "Template.CPlugSurfaceCrystal.xml", "S.xml");

    // A document that checks out never fails an edit
    let checked = patch::check_well_formed(xml).is_ok();
    let edits = [
        patch::set_typed_name(xml, "Part_00"),
        patch::set_first_node_attr(xml, "ref", "Sand"),
        patch::set_surface_link(xml, "CPlugSurface", "Model.CPlugSurface.xml"),
        patch::rewrite_child_list(xml, &["Part_00.CPlugTree.xml".to_string()]),
    ];
    if checked {
        assert!(edits.iter().all(|e| e.is_ok()));
    }
});
