//! Error types for solid template generation
//!
//! Only a handful of conditions are fatal: the template directory or one of
//! its required descriptors is missing, a descriptor cannot be read or
//! parsed, or a strict pairing check fails. Everything else is reported as a
//! [`BuildWarning`](crate::model::BuildWarning) on the build result.
//!
//! # Error Codes
//!
//! Error codes follow the pattern: `E<category><number>`
//!
//! Categories:
//! - **E1xxx**: I/O and filesystem errors
//! - **E2xxx**: XML parsing and writing errors
//! - **E3xxx**: Template and build errors
//!
//! ## Common Error Codes
//!
//! - `E1001`: I/O error reading or writing a file
//! - `E1002`: Template directory not found
//! - `E1003`: Missing required template descriptor
//! - `E1004`: Template directory could not be listed
//! - `E2001`: XML parsing error
//! - `E2002`: XML attribute error
//! - `E2005`: XML writing error
//! - `E3001`: Face-material groups do not pair with visual files

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for solidtree operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that abort a build
#[derive(Error, Debug)]
pub enum Error {
    /// IO error occurred while reading or writing a file
    ///
    /// **Error Code**: E1001
    ///
    /// **Common Causes**:
    /// - Insufficient permissions
    /// - Disk full while writing a part descriptor
    #[error("[E1001] I/O error: {0}")]
    Io(#[from] io::Error),

    /// Listing the template directory failed
    ///
    /// **Error Code**: E1004
    #[error("[E1004] Directory listing error: {0}")]
    Walk(#[from] walkdir::Error),

    /// The template directory does not exist
    ///
    /// **Error Code**: E1002
    ///
    /// **Suggestions**:
    /// - Copy the solid template into the work directory before building
    #[error("[E1002] Template directory not found: {}", .0.display())]
    TemplateDirNotFound(PathBuf),

    /// A required template descriptor is missing
    ///
    /// **Error Code**: E1003
    ///
    /// **Common Causes**:
    /// - Incomplete template copy
    /// - Template layout configured with the wrong file names
    ///
    /// **Suggestions**:
    /// - Check for Root.CPlugTree.xml, ModelElements.CPlugTree.xml and
    ///   Model.CPlugTree.xml in the template directory
    #[error("[E1003] Missing required template file '{name}' in {}", dir.display())]
    MissingTemplateFile {
        /// File name that was expected
        name: String,
        /// Directory that was searched
        dir: PathBuf,
    },

    /// XML parsing error
    ///
    /// **Error Code**: E2001
    ///
    /// **Common Causes**:
    /// - Malformed XML syntax in a template descriptor
    /// - Mismatched end tags
    #[error("[E2001] XML parsing error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// XML attribute error
    ///
    /// **Error Code**: E2002
    ///
    /// **Common Causes**:
    /// - Duplicate attribute
    /// - Unquoted attribute value
    #[error("[E2002] XML attribute error: {0}")]
    XmlAttr(String),

    /// XML writing error
    ///
    /// **Error Code**: E2005
    #[error("[E2005] XML writing error: {0}")]
    XmlWrite(String),

    /// Face-material groups and visual files cannot be paired one to one
    ///
    /// **Error Code**: E3001
    ///
    /// Only raised under [`PairingPolicy::Strict`](crate::model::PairingPolicy).
    ///
    /// **Suggestions**:
    /// - Re-export the model so every submesh carries exactly one material group
    /// - Remove stale visual XML files from the template directory
    #[error("[E3001] {groups} face-material group(s) cannot be paired with {visuals} visual file(s)")]
    PairingMismatch {
        /// Number of face-material groups read from the model
        groups: usize,
        /// Number of visual files detected in the template directory
        visuals: usize,
    },
}

impl From<quick_xml::events::attributes::AttrError> for Error {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        Error::XmlAttr(format!("Attribute parsing failed: {}", err))
    }
}

impl Error {
    /// Create a MissingTemplateFile error
    pub fn missing_template_file(name: &str, dir: impl Into<PathBuf>) -> Self {
        Error::MissingTemplateFile {
            name: name.to_string(),
            dir: dir.into(),
        }
    }

    /// Create an XmlWrite error
    ///
    /// # Arguments
    /// * `message` - Description of the writing error
    pub fn xml_write(message: String) -> Self {
        Error::XmlWrite(message)
    }

    /// Whether the error comes from the template directory layout
    pub fn is_missing_template(&self) -> bool {
        matches!(
            self,
            Error::TemplateDirNotFound(_) | Error::MissingTemplateFile { .. }
        )
    }
}
