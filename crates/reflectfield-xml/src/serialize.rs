//! XML serialization of field output elements.
//!
//! A reflection field contributes one element per entry to the page document:
//! `<name handle="slug">formatted value</name>`. The formatted value is already
//! markup (sanitized text or formatter output) and is written verbatim; the
//! handle attribute is escaped by the writer.

use std::io;

use quick_xml::Writer;
use quick_xml::events::BytesText;

use crate::error::XmlError;

/// One element appended to the output document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputElement {
    /// Element name (the field's element handle).
    pub name: String,
    /// Value of the `handle` attribute; omitted when `None`.
    pub handle: Option<String>,
    /// Content, already escaped or formatted as markup.
    pub value: String,
}

impl OutputElement {
    /// Serialize this element alone.
    ///
    /// # Errors
    ///
    /// Returns `XmlError` if the element cannot be written.
    pub fn to_xml(&self) -> Result<String, XmlError> {
        write_elements(std::slice::from_ref(self))
    }
}

/// Serialize a sequence of sibling elements without an XML declaration.
///
/// # Errors
///
/// Returns `XmlError` if writing fails or the output is not valid UTF-8.
pub fn write_elements(elements: &[OutputElement]) -> Result<String, XmlError> {
    let mut buf = Vec::with_capacity(64 * elements.len());
    write_into(&mut buf, elements)?;
    String::from_utf8(buf).map_err(|err| XmlError::Decode(err.to_string()))
}

fn write_into(buf: &mut Vec<u8>, elements: &[OutputElement]) -> io::Result<()> {
    let mut writer = Writer::new(buf);
    for element in elements {
        let mut start = writer.create_element(element.name.as_str());
        if let Some(handle) = &element.handle {
            start = start.with_attribute(("handle", handle.as_str()));
        }
        start.write_text_content(BytesText::from_escaped(element.value.as_str()))?;
    }
    Ok(())
}
