//! The `[Content_Types].xml` part.
//!
//! Maps file extensions (defaults) and individual part names (overrides) to
//! MIME content types. Every part written to a package must be covered by
//! one or the other.

use quick_xml::events::{BytesEnd, BytesStart, Event};

use crate::error::Result;
use crate::io::xml;

/// Part name of the content types table.
pub const CONTENT_TYPES_PART: &str = "[Content_Types].xml";

const NS_CONTENT_TYPES: &str = "http://schemas.openxmlformats.org/package/2006/content-types";

/// Content type of the main document part.
pub const CT_DOCUMENT: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml";
/// Content type of the styles part.
pub const CT_STYLES: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml";
/// Content type of relationships parts.
pub const CT_RELATIONSHIPS: &str = "application/vnd.openxmlformats-package.relationships+xml";

/// Parsed content types table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentTypes {
    /// `(extension, content type)`, extension lowercased without the dot.
    defaults: Vec<(String, String)>,
    /// `(part name, content type)`, part name without the leading slash.
    overrides: Vec<(String, String)>,
}

impl ContentTypes {
    /// Table with the defaults every package needs (`rels`, `xml`).
    pub fn new() -> Self {
        let mut types = Self::default();
        types.add_default("rels", CT_RELATIONSHIPS);
        types.add_default("xml", "application/xml");
        types
    }

    /// Parse `[Content_Types].xml`.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let mut reader = xml::reader(bytes);
        let mut buf = Vec::new();
        let mut types = Self::default();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) | Event::Empty(e) => match e.local_name().as_ref() {
                    b"Default" => {
                        if let (Some(ext), Some(ct)) =
                            (xml::attr(&e, b"Extension")?, xml::attr(&e, b"ContentType")?)
                        {
                            types.add_default(&ext, &ct);
                        }
                    }
                    b"Override" => {
                        if let (Some(part), Some(ct)) =
                            (xml::attr(&e, b"PartName")?, xml::attr(&e, b"ContentType")?)
                        {
                            types.set_override(&part, &ct);
                        }
                    }
                    _ => {}
                },
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        Ok(types)
    }

    /// Serialise to `[Content_Types].xml`.
    pub fn to_xml(&self) -> Result<Vec<u8>> {
        let mut writer = xml::writer()?;
        let mut root = BytesStart::new("Types");
        root.push_attribute(("xmlns", NS_CONTENT_TYPES));
        writer.write_event(Event::Start(root))?;

        for (ext, ct) in &self.defaults {
            let mut element = BytesStart::new("Default");
            element.push_attribute(("Extension", ext.as_str()));
            element.push_attribute(("ContentType", ct.as_str()));
            writer.write_event(Event::Empty(element))?;
        }
        for (part, ct) in &self.overrides {
            let part_name = format!("/{part}");
            let mut element = BytesStart::new("Override");
            element.push_attribute(("PartName", part_name.as_str()));
            element.push_attribute(("ContentType", ct.as_str()));
            writer.write_event(Event::Empty(element))?;
        }

        writer.write_event(Event::End(BytesEnd::new("Types")))?;
        Ok(writer.into_inner())
    }

    /// Register an extension default unless one already exists.
    pub fn add_default(&mut self, extension: &str, content_type: &str) {
        let extension = extension.trim_start_matches('.').to_lowercase();
        if self.default_for(&extension).is_none() {
            self.defaults.push((extension, content_type.to_string()));
        }
    }

    /// Set the override for `part` (with or without leading slash).
    pub fn set_override(&mut self, part: &str, content_type: &str) {
        let part = part.trim_start_matches('/');
        match self.overrides.iter_mut().find(|(name, _)| name == part) {
            Some(entry) => entry.1 = content_type.to_string(),
            None => self
                .overrides
                .push((part.to_string(), content_type.to_string())),
        }
    }

    /// Override registered for exactly `part`.
    pub fn override_for(&self, part: &str) -> Option<&str> {
        let part = part.trim_start_matches('/');
        self.overrides
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(part))
            .map(|(_, ct)| ct.as_str())
    }

    /// Default registered for `extension`.
    pub fn default_for(&self, extension: &str) -> Option<&str> {
        self.defaults
            .iter()
            .find(|(ext, _)| ext.eq_ignore_ascii_case(extension))
            .map(|(_, ct)| ct.as_str())
    }

    /// Effective content type of `part`: its override, else its extension's
    /// default.
    pub fn content_type_of(&self, part: &str) -> Option<&str> {
        self.override_for(part).or_else(|| {
            let (_, extension) = part.rsplit_once('.')?;
            self.default_for(extension)
        })
    }
}
