//! In-memory `.docx` package access.
//!
//! A package is read completely into memory so the template on disk is never
//! touched; modified parts are written to a new archive while every other
//! entry is copied verbatim in its original order.

use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek, Write};
use std::path::Path;

use tracing::debug;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipArchive, ZipWriter};

use crate::error::{TemplateError, TemplateResult};

/// Main document part.
pub const DOCUMENT_PART: &str = "word/document.xml";

/// Extended properties part holding the authoring application.
pub const APP_PROPERTIES_PART: &str = "docProps/app.xml";

/// Application name written into packages created from scratch.
pub const DEFAULT_APPLICATION: &str = "heatsheet";

/// Upper bound for the buffer reserved from an entry's declared size.
const MAX_PREALLOCATED_BYTES: u64 = 1 << 20;

const CONTENT_TYPES_XML: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
    r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#,
    r#"<Default Extension="xml" ContentType="application/xml"/>"#,
    r#"<Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>"#,
    r#"<Override PartName="/docProps/app.xml" ContentType="application/vnd.openxmlformats-officedocument.extended-properties+xml"/>"#,
    r#"</Types>"#
);

const ROOT_RELS_XML: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/>"#,
    r#"<Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/extended-properties" Target="docProps/app.xml"/>"#,
    r#"</Relationships>"#
);

const DOCUMENT_HEAD: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>"#
);

const DOCUMENT_TAIL: &str = concat!(
    r#"<w:sectPr><w:pgSz w:w="11906" w:h="16838"/>"#,
    r#"<w:pgMar w:top="1417" w:right="1417" w:bottom="1134" w:left="1417" w:header="708" w:footer="708" w:gutter="0"/>"#,
    r#"</w:sectPr></w:body></w:document>"#
);

/// Wrap block-level WordprocessingML in a complete A4 document part.
pub fn document_xml_from_body(body: &str) -> String {
    format!("{}{}{}", DOCUMENT_HEAD, body, DOCUMENT_TAIL)
}

fn app_properties_xml(application: &str) -> String {
    format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
            r#"<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties">"#,
            r#"<Application>{}</Application></Properties>"#
        ),
        crate::wordml::escape_text(application)
    )
}

#[derive(Debug, Clone)]
struct PackageEntry {
    name: String,
    data: Vec<u8>,
    is_dir: bool,
    stored: bool,
}

/// A `.docx` archive held in memory.
#[derive(Debug, Clone)]
pub struct DocxPackage {
    source: String,
    entries: Vec<PackageEntry>,
}

impl DocxPackage {
    /// Read a package from disk.
    pub fn open(path: &Path) -> TemplateResult<Self> {
        if !path.is_file() {
            return Err(TemplateError::NotFound(path.to_path_buf()));
        }
        let file = File::open(path)?;
        Self::read(BufReader::new(file), path.display().to_string())
    }

    /// Read a package from an in-memory archive.
    pub fn from_bytes(bytes: &[u8]) -> TemplateResult<Self> {
        Self::read(Cursor::new(bytes), "<memory>".to_string())
    }

    fn read<R: Read + Seek>(reader: R, source: String) -> TemplateResult<Self> {
        let mut archive = ZipArchive::new(reader)?;
        let mut entries = Vec::with_capacity(archive.len());

        for index in 0..archive.len() {
            let mut file = archive.by_index(index)?;
            let mut data = Vec::with_capacity(initial_capacity(file.size()));
            file.read_to_end(&mut data)?;
            entries.push(PackageEntry {
                name: file.name().to_string(),
                is_dir: file.is_dir(),
                stored: file.compression() == CompressionMethod::Stored,
                data,
            });
        }

        let package = Self { source, entries };
        if package.part(DOCUMENT_PART).is_none() {
            return Err(TemplateError::MissingPart {
                package: package.source,
                part: DOCUMENT_PART.to_string(),
            });
        }

        debug!("Read package {} ({} entries)", package.source, package.entries.len());
        Ok(package)
    }

    /// Build a minimal package around a complete `word/document.xml`.
    pub fn from_document_xml(document_xml: &str) -> Self {
        let entry = |name: &str, data: &str| PackageEntry {
            name: name.to_string(),
            data: data.as_bytes().to_vec(),
            is_dir: false,
            stored: false,
        };

        Self {
            source: "<generated>".to_string(),
            entries: vec![
                entry("[Content_Types].xml", CONTENT_TYPES_XML),
                entry("_rels/.rels", ROOT_RELS_XML),
                entry(DOCUMENT_PART, document_xml),
                entry(APP_PROPERTIES_PART, &app_properties_xml(DEFAULT_APPLICATION)),
            ],
        }
    }

    /// Replace the authoring application recorded in `docProps/app.xml`.
    pub fn with_application(mut self, application: &str) -> Self {
        self.set_part_text(APP_PROPERTIES_PART, app_properties_xml(application));
        self
    }

    /// Where this package was read from.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Raw bytes of a part.
    pub fn part(&self, name: &str) -> Option<&[u8]> {
        self.entries
            .iter()
            .find(|e| !e.is_dir && e.name == name)
            .map(|e| e.data.as_slice())
    }

    /// A part decoded as UTF-8.
    pub fn part_text(&self, name: &str) -> TemplateResult<&str> {
        let data = self.part(name).ok_or_else(|| TemplateError::MissingPart {
            package: self.source.clone(),
            part: name.to_string(),
        })?;
        std::str::from_utf8(data).map_err(|_| TemplateError::InvalidPartEncoding {
            part: name.to_string(),
        })
    }

    /// Replace a part's content, appending the part if it does not exist yet.
    pub fn set_part_text(&mut self, name: &str, text: String) {
        match self.entries.iter_mut().find(|e| !e.is_dir && e.name == name) {
            Some(entry) => entry.data = text.into_bytes(),
            None => self.entries.push(PackageEntry {
                name: name.to_string(),
                data: text.into_bytes(),
                is_dir: false,
                stored: false,
            }),
        }
    }

    /// Parts that carry user-visible text: the main document first, then
    /// headers and footers in archive order.
    pub fn text_parts(&self) -> Vec<String> {
        let mut parts = vec![DOCUMENT_PART.to_string()];
        parts.extend(self.header_footer_parts());
        parts
    }

    /// Header and footer parts in archive order.
    pub fn header_footer_parts(&self) -> Vec<String> {
        self.entries
            .iter()
            .filter(|e| !e.is_dir && is_header_or_footer(&e.name))
            .map(|e| e.name.clone())
            .collect()
    }

    /// Application recorded in `docProps/app.xml`, if any.
    pub fn application(&self) -> Option<String> {
        let xml = self.part_text(APP_PROPERTIES_PART).ok()?;
        let start = xml.find("<Application>")? + "<Application>".len();
        let end = start + xml[start..].find("</Application>")?;
        Some(crate::wordml::unescape_text(xml[start..end].trim()))
    }

    /// Write the package to `path`.
    pub fn save(&self, path: &Path) -> TemplateResult<()> {
        let file = File::create(path)?;
        self.write_to(file)?;
        debug!("Wrote package to {:?}", path);
        Ok(())
    }

    /// Serialize the package into a new archive.
    pub fn to_bytes(&self) -> TemplateResult<Vec<u8>> {
        let mut cursor = Cursor::new(Vec::new());
        self.write_to(&mut cursor)?;
        Ok(cursor.into_inner())
    }

    fn write_to<W: Write + Seek>(&self, writer: W) -> TemplateResult<()> {
        let mut zip = ZipWriter::new(writer);
        let base = SimpleFileOptions::default().last_modified_time(DateTime::default());

        for entry in &self.entries {
            if entry.is_dir {
                zip.add_directory(entry.name.as_str(), base)?;
                continue;
            }
            let method = if entry.stored {
                CompressionMethod::Stored
            } else {
                CompressionMethod::Deflated
            };
            zip.start_file(entry.name.as_str(), base.compression_method(method))?;
            zip.write_all(&entry.data)?;
        }

        zip.finish()?;
        Ok(())
    }
}

fn is_header_or_footer(name: &str) -> bool {
    let Some(file) = name.strip_prefix("word/") else {
        return false;
    };
    let Some(stem) = file.strip_suffix(".xml") else {
        return false;
    };
    ["header", "footer"].iter().any(|prefix| {
        stem.strip_prefix(prefix)
            .is_some_and(|n| n.chars().all(|c| c.is_ascii_digit()))
    })
}

/// The declared size comes from the archive header and is not trusted beyond
/// [`MAX_PREALLOCATED_BYTES`]; larger entries grow while reading.
fn initial_capacity(declared: u64) -> usize {
    declared.min(MAX_PREALLOCATED_BYTES) as usize
}
