//! Error types for document parsing and XML output.

use std::io;

/// Errors that can occur while parsing a document or writing output XML.
#[derive(Debug, thiserror::Error)]
pub enum XmlError {
    /// An I/O error during XML writing.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// An error from the underlying quick-xml library.
    #[error("XML processing error: {0}")]
    QuickXml(#[from] quick_xml::Error),

    /// An error from quick-xml attribute handling.
    #[error("XML attribute error: {0}")]
    Attribute(#[from] quick_xml::events::attributes::AttrError),

    /// The document structure is invalid (unclosed elements, several roots, stray text).
    #[error("malformed document: {0}")]
    Malformed(String),

    /// Text or a name could not be decoded.
    #[error("failed to decode XML content: {0}")]
    Decode(String),
}
