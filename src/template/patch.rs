//! Structural edits of CPlugTree descriptors
//!
//! Each edit streams the document through a quick-xml reader and writer,
//! replacing only the first matching element. Every other event is written
//! back from its raw bytes, so declarations, comments, whitespace and
//! attribute quoting of untouched elements are preserved.
//!
//! A leading byte order mark is kept, and lone `&` characters in text are
//! passed through as they are.
//!
//! Element and attribute names are matched case-insensitively. An edit that
//! finds nothing to change returns `Ok(None)`.

use crate::error::{Error, Result};
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

/// Element holding a typed string (`<lookbackstr type="40">name</lookbackstr>`)
const TYPED_NAME_ELEMENT: &[u8] = b"lookbackstr";
/// Type code of the tree name string
const TYPED_NAME_TYPE: &[u8] = b"40";

/// Extra capacity reserved for inserted content
const OUTPUT_SLACK: usize = 512;

/// UTF-8 byte order mark
const BOM: char = '\u{feff}';

/// Events written in place of a matched element
struct Replacement {
    events: Vec<Event<'static>>,
    /// Drop the matched element's content up to and including its end tag
    consume_element: bool,
}

/// Replace the content of the first `<lookbackstr type="40">` element
pub fn set_typed_name(xml: &str, value: &str) -> Result<Option<String>> {
    rewrite_first(xml, |event, _| {
        let Event::Start(e) = event else {
            return Ok(None);
        };
        if !e.name().as_ref().eq_ignore_ascii_case(TYPED_NAME_ELEMENT)
            || attr_value(e, b"type")?.as_deref().map(<[u8]>::trim_ascii) != Some(TYPED_NAME_TYPE)
        {
            return Ok(None);
        }

        let name = element_name(e)?;
        Ok(Some(Replacement {
            events: vec![
                Event::Start(e.clone().into_owned()),
                Event::Text(BytesText::new(value).into_owned()),
                Event::End(BytesEnd::new(name)),
            ],
            consume_element: true,
        }))
    })
}

/// Set `attr` on the first `<node>` element that carries it
///
/// Used for the visual link (`link`) and the material reference (`ref`) of a
/// part tree.
pub fn set_first_node_attr(xml: &str, attr: &str, value: &str) -> Result<Option<String>> {
    rewrite_first(xml, |event, _| {
        let (e, empty) = match event {
            Event::Start(e) => (e, false),
            Event::Empty(e) => (e, true),
            _ => return Ok(None),
        };
        if !e.name().as_ref().eq_ignore_ascii_case(b"node")
            || attr_value(e, attr.as_bytes())?.is_none()
        {
            return Ok(None);
        }

        let patched = with_attr(e, attr.as_bytes(), value)?;
        Ok(Some(Replacement {
            events: vec![if empty {
                Event::Empty(patched)
            } else {
                Event::Start(patched)
            }],
            consume_element: false,
        }))
    })
}

/// Point the first `link` attribute naming a surface file to `surface`
///
/// A surface link is a `link` value containing `marker` (case-insensitive)
/// and ending in `.xml`.
pub fn set_surface_link(xml: &str, marker: &str, surface: &str) -> Result<Option<String>> {
    let marker = marker.to_ascii_lowercase();

    rewrite_first(xml, |event, _| {
        let (e, empty) = match event {
            Event::Start(e) => (e, false),
            Event::Empty(e) => (e, true),
            _ => return Ok(None),
        };
        let Some(link) = attr_value(e, b"link")? else {
            return Ok(None);
        };
        let link = String::from_utf8_lossy(&link).to_ascii_lowercase();
        if !link.contains(&marker) || !link.ends_with(".xml") {
            return Ok(None);
        }

        let patched = with_attr(e, b"link", surface)?;
        Ok(Some(Replacement {
            events: vec![if empty {
                Event::Empty(patched)
            } else {
                Event::Start(patched)
            }],
            consume_element: false,
        }))
    })
}

/// Replace the first case-insensitive occurrence of `needle` in the raw text
///
/// Last-resort edit for templates whose surface reference is not a plain
/// `link` attribute.
pub fn replace_literal(xml: &str, needle: &str, value: &str) -> Option<String> {
    if needle.is_empty() {
        return None;
    }
    // ASCII lowering keeps byte offsets aligned with the original
    let haystack = xml.to_ascii_lowercase();
    let start = haystack.find(&needle.to_ascii_lowercase())?;
    let end = start + needle.len();

    let mut out = String::with_capacity(xml.len() + value.len());
    out.push_str(&xml[..start]);
    out.push_str(&quick_xml::escape::escape(value));
    out.push_str(&xml[end..]);
    Some(out)
}

/// Replace the first `<list>` block with one child element per link
///
/// ```text
/// <list>
///     <element>
///         <node link="Part_00.CPlugTree.xml"/>
///     </element>
/// </list>
/// ```
///
/// Indentation follows the whitespace in front of the original `<list>`.
pub fn rewrite_child_list(xml: &str, children: &[String]) -> Result<Option<String>> {
    rewrite_first(xml, |event, preceding| {
        let e = match event {
            Event::Start(e) | Event::Empty(e) => e,
            _ => return Ok(None),
        };
        if !e.name().as_ref().eq_ignore_ascii_case(b"list") {
            return Ok(None);
        }

        let indent = trailing_indent(preceding);
        let name = element_name(e)?;
        let mut events = vec![Event::Start(e.clone().into_owned())];

        for child in children {
            let mut node = BytesStart::new("node");
            node.push_attribute(("link", child.as_str()));

            events.push(whitespace(&format!("\n{}    ", indent)));
            events.push(Event::Start(BytesStart::new("element")));
            events.push(whitespace(&format!("\n{}        ", indent)));
            events.push(Event::Empty(node));
            events.push(whitespace(&format!("\n{}    ", indent)));
            events.push(Event::End(BytesEnd::new("element")));
        }
        events.push(whitespace(&format!("\n{}", indent)));
        events.push(Event::End(BytesEnd::new(name)));

        Ok(Some(Replacement {
            events,
            consume_element: matches!(event, Event::Start(_)),
        }))
    })
}

/// Check that `xml` can be edited
///
/// Reads the whole document with the same reader settings as the edits, so a
/// document that passes never makes an edit fail.
pub fn check_well_formed(xml: &str) -> Result<()> {
    let (_, body) = split_bom(xml);
    let mut reader = reader(body);

    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) => {
                for attr in e.attributes() {
                    attr?;
                }
            }
            Event::Eof => return Ok(()),
            _ => {}
        }
    }
}

/// Stream `xml`, replacing the first event `select` picks
///
/// `select` receives each event together with the raw text that directly
/// precedes it (empty when the previous event was not text).
fn rewrite_first<F>(xml: &str, mut select: F) -> Result<Option<String>>
where
    F: FnMut(&Event<'_>, &str) -> Result<Option<Replacement>>,
{
    let (bom, body) = split_bom(xml);
    let mut reader = reader(body);
    let mut writer = Writer::new(Vec::with_capacity(xml.len() + OUTPUT_SLACK));
    let mut replaced = false;
    let mut skip_depth: Option<usize> = None;
    let mut preceding = String::new();

    loop {
        let event = reader.read_event()?;
        if let Event::Eof = event {
            break;
        }

        if let Some(depth) = skip_depth {
            skip_depth = match event {
                Event::Start(_) => Some(depth + 1),
                Event::End(_) if depth == 0 => None,
                Event::End(_) => Some(depth - 1),
                _ => Some(depth),
            };
            continue;
        }

        if !replaced && let Some(replacement) = select(&event, &preceding)? {
            replaced = true;
            for e in replacement.events {
                write_event(&mut writer, e)?;
            }
            if replacement.consume_element && matches!(event, Event::Start(_)) {
                skip_depth = Some(0);
            }
            preceding.clear();
            continue;
        }

        match &event {
            Event::Text(t) => preceding = String::from_utf8_lossy(t).into_owned(),
            _ => preceding.clear(),
        }
        write_event(&mut writer, event)?;
    }

    if !replaced {
        return Ok(None);
    }

    let body = String::from_utf8(writer.into_inner())
        .map_err(|e| Error::xml_write(format!("Patched document is not UTF-8: {}", e)))?;
    Ok(Some(format!("{}{}", bom, body)))
}

fn reader(xml: &str) -> Reader<&[u8]> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().allow_dangling_amp = true;
    reader
}

/// Leading byte order mark (empty if absent) and the rest of the document
fn split_bom(xml: &str) -> (&str, &str) {
    match xml.strip_prefix(BOM) {
        Some(body) => (&xml[..BOM.len_utf8()], body),
        None => ("", xml),
    }
}

fn write_event(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<()> {
    writer
        .write_event(event)
        .map_err(|e| Error::xml_write(format!("Failed to write event: {}", e)))
}

/// Raw value of the attribute named `key` (case-insensitive)
fn attr_value(e: &BytesStart, key: &[u8]) -> Result<Option<Vec<u8>>> {
    for attr in e.attributes() {
        let attr = attr?;
        if attr.key.as_ref().eq_ignore_ascii_case(key) {
            return Ok(Some(attr.value.into_owned()));
        }
    }
    Ok(None)
}

/// Copy of `e` with the attribute named `key` set to `value`
fn with_attr(e: &BytesStart, key: &[u8], value: &str) -> Result<BytesStart<'static>> {
    let mut patched = BytesStart::new(element_name(e)?);
    for attr in e.attributes() {
        let attr = attr?;
        if attr.key.as_ref().eq_ignore_ascii_case(key) {
            let name = std::str::from_utf8(attr.key.as_ref())
                .map_err(|err| Error::XmlAttr(err.to_string()))?;
            patched.push_attribute((name, value));
        } else {
            patched.push_attribute(attr);
        }
    }
    Ok(patched)
}

fn element_name(e: &BytesStart) -> Result<String> {
    std::str::from_utf8(e.name().as_ref())
        .map(str::to_string)
        .map_err(|err| Error::XmlAttr(err.to_string()))
}

fn whitespace(text: &str) -> Event<'static> {
    Event::Text(BytesText::new(text).into_owned())
}

/// Whitespace after the last newline of `text`, if that tail is blank
fn trailing_indent(text: &str) -> &str {
    let tail = match text.rfind('\n') {
        Some(pos) => &text[pos + 1..],
        None => text,
    };
    if tail.chars().all(|c| c == ' ' || c == '\t') {
        tail
    } else {
        ""
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LEAF: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<gbx class="CPlugTree">
    <!-- leaf tree -->
    <body>
        <chunk id="0x0904F00D">
            <lookbackstr type="40">Model</lookbackstr>
        </chunk>
        <chunk id="0x0904F016">
            <node link="Model.CPlugVisualIndexedTriangles.xml"/>
            <node ref="concrete"/>
            <node link="Other.xml"/>
        </chunk>
    </body>
</gbx>"#;

    #[test]
    fn test_set_typed_name() {
        let out = set_typed_name(LEAF, "Part_00").unwrap().unwrap();
        assert!(out.contains(r#"<lookbackstr type="40">Part_00</lookbackstr>"#));
        assert!(!out.contains(">Model<"));
        // untouched parts survive byte for byte
        assert!(out.starts_with(r#"<?xml version="1.0" encoding="utf-8"?>"#));
        assert!(out.contains("<!-- leaf tree -->"));
        assert_eq!(out.replace("Part_00", "Model"), LEAF);
    }

    #[test]
    fn test_set_typed_name_keeps_bom() {
        let xml = format!("\u{feff}{}", LEAF);
        let out = set_typed_name(&xml, "Part_00").unwrap().unwrap();
        assert!(out.starts_with('\u{feff}'));
        assert_eq!(out.replace("Part_00", "Model"), xml);
    }

    #[test]
    fn test_lone_ampersand_passes_through() {
        let xml = r#"<a><lookbackstr type="40">Tom & Jerry</lookbackstr><b>x & y</b></a>"#;
        let out = set_typed_name(xml, "Rock").unwrap().unwrap();
        assert_eq!(out, r#"<a><lookbackstr type="40">Rock</lookbackstr><b>x & y</b></a>"#);
        assert!(check_well_formed(xml).is_ok());
    }

    #[test]
    fn test_check_well_formed() {
        assert!(check_well_formed(LEAF).is_ok());
        assert!(check_well_formed(&format!("\u{feff}{}", LEAF)).is_ok());
        assert!(check_well_formed("<a><b></a>").is_err());
        assert!(check_well_formed(r#"<a x="1" x="2"/>"#).is_err());
        assert!(check_well_formed("<gbx><node/></chunk></gbx>").is_err());
    }

    #[test]
    fn test_set_typed_name_escapes() {
        let out = set_typed_name(LEAF, "A&B").unwrap().unwrap();
        assert!(out.contains(">A&amp;B</lookbackstr>"));
    }

    #[test]
    fn test_set_typed_name_ignores_other_types() {
        let xml = r#"<a><lookbackstr type="26">x</lookbackstr></a>"#;
        assert_eq!(set_typed_name(xml, "y").unwrap(), None);
    }

    #[test]
    fn test_set_typed_name_case_insensitive() {
        let xml = r#"<a><LookBackStr TYPE="40"> old </LookBackStr></a>"#;
        let out = set_typed_name(xml, "new").unwrap().unwrap();
        assert_eq!(out, r#"<a><LookBackStr TYPE="40">new</LookBackStr></a>"#);
    }

    #[test]
    fn test_set_first_node_link_only_first() {
        let out = set_first_node_attr(LEAF, "link", "Visual_01.CPlugVisualIndexedTriangles.xml")
            .unwrap()
            .unwrap();
        assert!(out.contains(r#"<node link="Visual_01.CPlugVisualIndexedTriangles.xml"/>"#));
        assert!(out.contains(r#"<node link="Other.xml"/>"#));
        assert!(out.contains(r#"<node ref="concrete"/>"#));
    }

    #[test]
    fn test_set_first_node_ref() {
        let out = set_first_node_attr(LEAF, "ref", "Sand").unwrap().unwrap();
        assert!(out.contains(r#"<node ref="Sand"/>"#));
    }

    #[test]
    fn test_set_first_node_attr_missing() {
        assert_eq!(set_first_node_attr("<a><node x=\"1\"/></a>", "ref", "Sand").unwrap(), None);
    }

    #[test]
    fn test_set_surface_link() {
        let root = r#"<gbx><node link="Template.CPlugSurfaceCrystal.xml"/><node link="Tree.xml"/></gbx>"#;
        let out = set_surface_link(root, "CPlugSurface", "Model.CPlugSurface.Gbx.xml")
            .unwrap()
            .unwrap();
        assert_eq!(
            out,
            r#"<gbx><node link="Model.CPlugSurface.Gbx.xml"/><node link="Tree.xml"/></gbx>"#
        );
    }

    #[test]
    fn test_set_surface_link_requires_xml_suffix() {
        let root = r#"<gbx><node link="Template.CPlugSurfaceCrystal.gbx"/></gbx>"#;
        assert_eq!(set_surface_link(root, "CPlugSurface", "x.xml").unwrap(), None);
    }

    #[test]
    fn test_replace_literal_first_only() {
        let text = "a TEMPLATE.cplugsurfacecrystal.xml b Template.CPlugSurfaceCrystal.xml";
        let out = replace_literal(text, "Template.CPlugSurfaceCrystal.xml", "S.xml").unwrap();
        assert_eq!(out, "a S.xml b Template.CPlugSurfaceCrystal.xml");
        assert_eq!(replace_literal(text, "missing", "x"), None);
    }

    #[test]
    fn test_rewrite_child_list() {
        let parent = "<gbx>\n        <list>\n            <element>\n                <node link=\"Model.CPlugTree.xml\"/>\n            </element>\n        </list>\n        <list><element/></list>\n</gbx>";
        let children = vec![
            "Part_00.CPlugTree.xml".to_string(),
            "Part_01.CPlugTree.xml".to_string(),
        ];
        let out = rewrite_child_list(parent, &children).unwrap().unwrap();

        let expected = "<gbx>\n        <list>\n            <element>\n                <node link=\"Part_00.CPlugTree.xml\"/>\n            </element>\n            <element>\n                <node link=\"Part_01.CPlugTree.xml\"/>\n            </element>\n        </list>\n        <list><element/></list>\n</gbx>";
        assert_eq!(out, expected);
    }

    #[test]
    fn test_rewrite_empty_list_element() {
        let out = rewrite_child_list("<a><list/></a>", &["P.xml".to_string()])
            .unwrap()
            .unwrap();
        assert_eq!(
            out,
            "<a><list>\n    <element>\n        <node link=\"P.xml\"/>\n    </element>\n</list></a>"
        );
    }

    #[test]
    fn test_rewrite_child_list_missing() {
        assert_eq!(rewrite_child_list("<a/>", &[]).unwrap(), None);
    }

    #[test]
    fn test_malformed_document() {
        assert!(set_typed_name("<a><b></a>", "x").is_err());
    }
}
