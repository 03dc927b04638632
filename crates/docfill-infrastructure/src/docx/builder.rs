//! In-memory `.docx` builder for tests and fixtures.

use super::{MAIN_PART, escape_xml_text};
use docfill_core::error::{DocfillError, Result};
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

const WORDML_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/></Types>"#;

const PACKAGE_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;

/// Builds minimal WordprocessingML packages.
///
/// ```
/// use docfill_infrastructure::docx::{DocxBuilder, DocxPackage};
/// use docfill_core::fill::TemplateDocument;
///
/// let bytes = DocxBuilder::new().paragraph("Dear {{name}}").build().unwrap();
/// let package = DocxPackage::open(bytes).unwrap();
/// assert_eq!(package.plain_text(), "Dear {{name}}");
/// ```
#[derive(Debug, Clone, Default)]
pub struct DocxBuilder {
    paragraphs: Option<Vec<String>>,
    headers: Vec<String>,
    footers: Vec<String>,
    raw_parts: Vec<(String, Vec<u8>)>,
}

impl DocxBuilder {
    /// A builder that writes `word/document.xml` from its paragraphs.
    pub fn new() -> Self {
        Self {
            paragraphs: Some(Vec::new()),
            ..Self::default()
        }
    }

    /// A builder with no main part, for malformed-package fixtures.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Adds a body paragraph with a single styled run.
    pub fn paragraph(mut self, text: &str) -> Self {
        self.paragraphs.get_or_insert_with(Vec::new).push(text.to_string());
        self
    }

    /// Adds a header part with one paragraph.
    pub fn header(mut self, text: &str) -> Self {
        self.headers.push(text.to_string());
        self
    }

    /// Adds a footer part with one paragraph.
    pub fn footer(mut self, text: &str) -> Self {
        self.footers.push(text.to_string());
        self
    }

    /// Adds an arbitrary entry, written after the generated parts.
    pub fn raw_part(mut self, name: &str, content: impl AsRef<[u8]>) -> Self {
        self.raw_parts.push((name.to_string(), content.as_ref().to_vec()));
        self
    }

    /// Builds the archive bytes.
    pub fn build(self) -> Result<Vec<u8>> {
        let mut entries: Vec<(String, Vec<u8>)> = vec![
            (
                "[Content_Types].xml".to_string(),
                CONTENT_TYPES.as_bytes().to_vec(),
            ),
            ("_rels/.rels".to_string(), PACKAGE_RELS.as_bytes().to_vec()),
        ];
        if let Some(paragraphs) = &self.paragraphs {
            let body: String = paragraphs.iter().map(|p| paragraph_xml(p)).collect();
            entries.push((
                MAIN_PART.to_string(),
                part_xml("w:document", &format!("<w:body>{body}</w:body>")),
            ));
        }
        for (i, text) in self.headers.iter().enumerate() {
            entries.push((
                format!("word/header{}.xml", i + 1),
                part_xml("w:hdr", &paragraph_xml(text)),
            ));
        }
        for (i, text) in self.footers.iter().enumerate() {
            entries.push((
                format!("word/footer{}.xml", i + 1),
                part_xml("w:ftr", &paragraph_xml(text)),
            ));
        }
        entries.extend(self.raw_parts);

        let mut buf = Vec::new();
        {
            let mut writer = ZipWriter::new(Cursor::new(&mut buf));
            let options =
                SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

            for (name, content) in &entries {
                writer
                    .start_file(name.as_str(), options)
                    .map_err(|e| DocfillError::internal(format!("failed to add {name}: {e}")))?;
                writer.write_all(content)?;
            }

            writer
                .finish()
                .map_err(|e| DocfillError::internal(format!("failed to finalize archive: {e}")))?;
        }
        Ok(buf)
    }
}

fn paragraph_xml(text: &str) -> String {
    format!(
        r#"<w:p><w:pPr><w:pStyle w:val="Normal"/></w:pPr><w:r><w:rPr><w:b/></w:rPr><w:t xml:space="preserve">{}</w:t></w:r></w:p>"#,
        escape_xml_text(text)
    )
}

fn part_xml(root: &str, inner: &str) -> Vec<u8> {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<{root} xmlns:w="{WORDML_NS}">{inner}</{root}>"#
    )
    .into_bytes()
}
