//! Small helpers over `quick-xml` shared by the part readers and writers.
//!
//! WordprocessingML is matched by local name with the conventional prefixes
//! (`w:`, `r:`) used when writing. Attribute lookups that must tell
//! relationship ids (`r:id`) apart from other ids (`w:id`) take the prefix
//! into account.

use quick_xml::Reader;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesStart, Event};

use crate::error::Result;

/// WordprocessingML main namespace.
pub const NS_W: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

/// Office document relationships namespace (the `r:` prefix).
pub const NS_R: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

/// Create a reader over raw part bytes.
///
/// Whitespace is preserved: it is significant inside `w:t`.
pub fn reader(bytes: &[u8]) -> Reader<&[u8]> {
    Reader::from_reader(bytes)
}

/// Create a writer that has already emitted the standard XML declaration.
pub fn writer() -> Result<Writer<Vec<u8>>> {
    let mut writer = Writer::new(Vec::new());
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;
    Ok(writer)
}

/// Value of the attribute whose local name is `local`, ignoring its prefix.
pub fn attr(element: &BytesStart<'_>, local: &[u8]) -> Result<Option<String>> {
    for attribute in element.attributes() {
        let attribute = attribute?;
        if attribute.key.local_name().as_ref() == local {
            return Ok(Some(attribute.unescape_value()?.into_owned()));
        }
    }
    Ok(None)
}

/// Value of the attribute with the exact qualified name `qualified`.
pub fn qualified_attr(element: &BytesStart<'_>, qualified: &[u8]) -> Result<Option<String>> {
    for attribute in element.attributes() {
        let attribute = attribute?;
        if attribute.key.as_ref() == qualified {
            return Ok(Some(attribute.unescape_value()?.into_owned()));
        }
    }
    Ok(None)
}

/// Interpret an OOXML on/off property value.
///
/// A missing value means "on"; `0`, `false` and `off` mean "off".
pub fn on_off(value: Option<&str>) -> bool {
    !matches!(value, Some("0") | Some("false") | Some("off"))
}

/// Copy `element`, replacing attribute values for which `rewrite` returns
/// `Some`.
///
/// `rewrite` receives the qualified attribute name and its unescaped value.
pub fn rewrite_attributes<F>(element: &BytesStart<'_>, mut rewrite: F) -> Result<BytesStart<'static>>
where
    F: FnMut(&[u8], &str) -> Option<String>,
{
    let name = String::from_utf8_lossy(element.name().as_ref()).into_owned();
    let mut copy = BytesStart::new(name);

    for attribute in element.attributes() {
        let attribute = attribute?;
        let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
        let value = attribute.unescape_value()?.into_owned();
        match rewrite(key.as_bytes(), &value) {
            Some(replacement) => copy.push_attribute((key.as_str(), replacement.as_str())),
            None => copy.push_attribute((key.as_str(), value.as_str())),
        }
    }

    Ok(copy)
}
