//! In-memory view of an OPC package (the zip container of a `.docx`).
//!
//! A [`Package`] keeps every part as raw bytes in archive order, together
//! with the parsed content types table. Readers pick the parts they need;
//! the composer adds and replaces parts before writing the package back out.

use std::io::{Cursor, Read, Seek, Write};
use std::path::Path;

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::error::{DocxCatError, Result};
use crate::io::content_types::{CONTENT_TYPES_PART, ContentTypes};
use crate::io::relationships::{Relationships, rels_part_name, resolve_target};

/// Part name used when the package relationships do not name a main part.
pub const DEFAULT_DOCUMENT_PART: &str = "word/document.xml";

/// All parts of one package.
#[derive(Debug, Clone, Default)]
pub struct Package {
    parts: Vec<(String, Vec<u8>)>,
    content_types: ContentTypes,
}

impl Package {
    /// Create an empty package with the default content types.
    pub fn new() -> Self {
        Self {
            parts: Vec::new(),
            content_types: ContentTypes::new(),
        }
    }

    /// Read a package from disk.
    ///
    /// # Errors
    ///
    /// - [`DocxCatError::FileNotFound`] / [`DocxCatError::FileNotAccessible`]
    ///   when the file cannot be read
    /// - [`DocxCatError::NotAFile`] for directories
    /// - [`DocxCatError::DocumentFormat`] when the bytes are not a zip archive
    pub fn open(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => DocxCatError::file_not_found(path.to_path_buf()),
            _ if path.is_dir() => DocxCatError::not_a_file(path.to_path_buf()),
            _ => DocxCatError::FileNotAccessible {
                path: path.to_path_buf(),
                source: e,
            },
        })?;

        // The archive is already in memory: read errors mean truncation.
        Self::from_bytes(&bytes).map_err(|e| match e {
            DocxCatError::Io { source } => {
                DocxCatError::document_format(path.to_path_buf(), source.to_string())
            }
            other => other.in_document(path),
        })
    }

    /// Read a package from an in-memory zip archive.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut archive = ZipArchive::new(Cursor::new(bytes))?;
        let mut parts = Vec::with_capacity(archive.len());
        let mut content_types = None;

        for index in 0..archive.len() {
            let mut file = archive.by_index(index)?;
            if file.is_dir() {
                continue;
            }
            let name = file.name().trim_start_matches('/').to_string();
            let mut data = Vec::with_capacity(file.size() as usize);
            file.read_to_end(&mut data)?;

            if name == CONTENT_TYPES_PART {
                content_types = Some(ContentTypes::parse(&data)?);
            } else {
                parts.push((name, data));
            }
        }

        Ok(Self {
            parts,
            content_types: content_types.unwrap_or_else(ContentTypes::new),
        })
    }

    /// Bytes of `name`, if present.
    pub fn part(&self, name: &str) -> Option<&[u8]> {
        self.parts
            .iter()
            .find(|(part, _)| part == name)
            .map(|(_, data)| data.as_slice())
    }

    /// True when the package holds `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.part(name).is_some()
    }

    /// Insert or replace a part.
    pub fn set_part(&mut self, name: &str, data: Vec<u8>) {
        let name = name.trim_start_matches('/');
        match self.parts.iter_mut().find(|(part, _)| part == name) {
            Some(entry) => entry.1 = data,
            None => self.parts.push((name.to_string(), data)),
        }
    }

    /// Part names in archive order (the content types table excluded).
    pub fn part_names(&self) -> impl Iterator<Item = &str> {
        self.parts.iter().map(|(name, _)| name.as_str())
    }

    /// Number of parts (the content types table excluded).
    pub fn part_count(&self) -> usize {
        self.parts.len()
    }

    /// The content types table.
    pub fn content_types(&self) -> &ContentTypes {
        &self.content_types
    }

    /// Mutable access to the content types table.
    pub fn content_types_mut(&mut self) -> &mut ContentTypes {
        &mut self.content_types
    }

    /// Relationships whose source is `part` (empty when it has none).
    ///
    /// Pass `""` for the package-level relationships.
    pub fn relationships(&self, part: &str) -> Result<Relationships> {
        match self.part(&rels_part_name(part)) {
            Some(bytes) => Relationships::parse(bytes),
            None => Ok(Relationships::new()),
        }
    }

    /// Store the relationships of `part`.
    pub fn set_relationships(&mut self, part: &str, rels: &Relationships) -> Result<()> {
        let xml = rels.to_xml()?;
        self.set_part(&rels_part_name(part), xml);
        Ok(())
    }

    /// Name of the main document part.
    ///
    /// Follows the package-level `officeDocument` relationship and falls
    /// back to `word/document.xml`.
    pub fn main_document_part(&self) -> Result<String> {
        let rels = self.relationships("")?;
        Ok(rels
            .find_kind("officeDocument")
            .filter(|rel| !rel.external)
            .map(|rel| resolve_target("", &rel.target))
            .unwrap_or_else(|| DEFAULT_DOCUMENT_PART.to_string()))
    }

    /// A part name close to `desired` that is not yet used.
    ///
    /// `word/media/image1.png` becomes `word/media/image1_2.png`,
    /// `word/media/image1_3.png` and so on while taken.
    pub fn unused_part_name(&self, desired: &str) -> String {
        if !self.contains(desired) {
            return desired.to_string();
        }

        let (stem, extension) = match desired.rsplit_once('.') {
            Some((stem, ext)) if !stem.ends_with('/') => (stem, Some(ext)),
            _ => (desired, None),
        };

        (2..)
            .map(|n| match extension {
                Some(ext) => format!("{stem}_{n}.{ext}"),
                None => format!("{stem}_{n}"),
            })
            .find(|candidate| !self.contains(candidate))
            .unwrap_or_else(|| desired.to_string())
    }

    /// Write the package as a zip archive.
    ///
    /// The content types table is written first, then every part in order.
    pub fn write_zip<W: Write + Seek>(&self, writer: W) -> Result<W> {
        let options =
            SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        let mut zip = ZipWriter::new(writer);

        zip.start_file(CONTENT_TYPES_PART, options)?;
        zip.write_all(&self.content_types.to_xml()?)?;

        for (name, data) in &self.parts {
            zip.start_file(name.as_str(), options)?;
            zip.write_all(data)?;
        }

        Ok(zip.finish()?)
    }

    /// Serialise the package into a byte vector.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(self.write_zip(Cursor::new(Vec::new()))?.into_inner())
    }
}
