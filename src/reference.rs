//! Material references declared by a solid template
//!
//! `Template.Solid.xml` declares the material references a part may point to
//! with `refname="..."` attributes. A part whose `<node ref="..."/>` names an
//! undeclared reference breaks the solid compile, so every generated
//! reference is checked against this table first.

use crate::error::{Error, Result};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use std::path::Path;

/// Attribute carrying a declared reference name
const REFNAME_ATTR: &[u8] = b"refname";

/// Case-insensitive set of declared references, in document order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeclaredRefs {
    refs: Vec<String>,
}

impl DeclaredRefs {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the references declared in a template descriptor
    ///
    /// Every `refname` attribute of every element counts; the attribute name
    /// is matched case-insensitively, values are trimmed and blank values are
    /// skipped. The first spelling of a reference wins.
    pub fn from_xml(xml: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);
        let mut table = Self::new();

        loop {
            match reader.read_event()? {
                Event::Start(ref e) | Event::Empty(ref e) => {
                    if let Some(name) = refname(e)? {
                        table.insert(name);
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        Ok(table)
    }

    /// Read and parse a template descriptor
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let xml = std::fs::read_to_string(path.as_ref())?;
        Self::from_xml(&xml)
    }

    /// Add a reference unless an entry with the same name (ignoring case) exists
    pub fn insert(&mut self, name: impl Into<String>) -> bool {
        let name = name.into();
        let name = name.trim();
        if name.is_empty() || self.contains(name) {
            return false;
        }
        self.refs.push(name.to_string());
        true
    }

    /// Number of declared references
    pub fn len(&self) -> usize {
        self.refs.len()
    }

    /// Whether no reference is declared
    pub fn is_empty(&self) -> bool {
        self.refs.is_empty()
    }

    /// Whether `name` is declared, ignoring case
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Declared spelling of `name`, ignoring case
    pub fn get(&self, name: &str) -> Option<&str> {
        self.refs
            .iter()
            .find(|r| r.eq_ignore_ascii_case(name))
            .map(String::as_str)
    }

    /// References in document order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.refs.iter().map(String::as_str)
    }

    /// Pick the reference used when a desired one is not declared
    ///
    /// `preferred` wins when declared (ignoring case); otherwise the first
    /// reference in document order. `None` when the table is empty, in which
    /// case the caller decides.
    ///
    /// # Example
    ///
    /// ```
    /// use solidtree::DeclaredRefs;
    ///
    /// let refs = DeclaredRefs::from_xml(r#"<s><m refname="Dirt"/><m refname="Sand"/></s>"#)?;
    /// assert_eq!(refs.pick_fallback("sand"), Some("Sand"));
    /// assert_eq!(refs.pick_fallback("ice"), Some("Dirt"));
    /// # Ok::<(), solidtree::Error>(())
    /// ```
    pub fn pick_fallback(&self, preferred: &str) -> Option<&str> {
        self.get(preferred)
            .or_else(|| self.refs.first().map(String::as_str))
    }
}

/// Value of the element's `refname` attribute, if any
fn refname(e: &BytesStart) -> Result<Option<String>> {
    for attr in e.attributes() {
        let attr = attr?;
        if !attr.key.as_ref().eq_ignore_ascii_case(REFNAME_ATTR) {
            continue;
        }
        let raw = std::str::from_utf8(&attr.value).map_err(|e| Error::XmlAttr(e.to_string()))?;
        let value = quick_xml::escape::unescape(raw).map_err(|e| Error::XmlAttr(e.to_string()))?;
        let value = value.trim();
        if !value.is_empty() {
            return Ok(Some(value.to_string()));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOLID: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<gbx class="CPlugSolid">
    <body>
        <chunk id="0x0900C000">
            <node refname="Dirt" link="Dirt.CPlugMaterial.xml"/>
            <node RefName=" sand ">
            </node>
            <node refname="DIRT"/>
            <node refname="  "/>
            <node link="Other.xml"/>
        </chunk>
    </body>
</gbx>"#;

    #[test]
    fn test_collects_refnames() {
        let refs = DeclaredRefs::from_xml(SOLID).unwrap();
        assert_eq!(refs.iter().collect::<Vec<_>>(), vec!["Dirt", "sand"]);
        assert!(refs.contains("SAND"));
        assert_eq!(refs.get("dirt"), Some("Dirt"));
    }

    #[test]
    fn test_fallback_prefers_sand() {
        let refs = DeclaredRefs::from_xml(SOLID).unwrap();
        assert_eq!(refs.pick_fallback("Sand"), Some("sand"));
    }

    #[test]
    fn test_fallback_first_declared() {
        let mut refs = DeclaredRefs::new();
        refs.insert("Ice");
        refs.insert("Rock");
        assert_eq!(refs.pick_fallback("sand"), Some("Ice"));
    }

    #[test]
    fn test_fallback_empty() {
        assert_eq!(DeclaredRefs::new().pick_fallback("sand"), None);
    }

    #[test]
    fn test_unescapes_values() {
        let refs = DeclaredRefs::from_xml(r#"<a refname="Rock&amp;Roll"/>"#).unwrap();
        assert_eq!(refs.get("rock&roll"), Some("Rock&Roll"));
    }

    #[test]
    fn test_malformed_xml_is_an_error() {
        assert!(DeclaredRefs::from_xml("<a><b refname=\"x\"></a>").is_err());
    }
}
