//! `.docx` container access.
//!
//! A `.docx` file is a zip archive of XML parts. Placeholders live in the
//! text runs of `word/document.xml` and of the header and footer parts;
//! every other entry is carried over untouched.

mod builder;
mod text;

pub use builder::DocxBuilder;

use docfill_core::error::{DocfillError, Result};
use docfill_core::fill::{FillPlan, RenderedDocument, TemplateDocument};
use std::borrow::Cow;
use std::collections::HashMap;
use std::io::{Cursor, Read, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// The main document part.
pub const MAIN_PART: &str = "word/document.xml";

/// MIME type of generated documents.
pub const DOCX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// Returns true for parts whose text runs may hold placeholders.
pub fn is_substitutable_part(name: &str) -> bool {
    name == MAIN_PART
        || ((name.starts_with("word/header") || name.starts_with("word/footer"))
            && name.ends_with(".xml"))
}

/// Escapes answer and placeholder text for WordprocessingML character data.
pub fn escape_xml_text(text: &str) -> Cow<'_, str> {
    quick_xml::escape::partial_escape(text)
}

#[derive(Debug, Clone)]
struct XmlPart {
    name: String,
    xml: String,
}

/// An opened `.docx` template.
#[derive(Debug, Clone)]
pub struct DocxPackage {
    bytes: Vec<u8>,
    /// Main part first, then headers and footers in archive order
    parts: Vec<XmlPart>,
    text: String,
}

impl DocxPackage {
    /// Opens a `.docx` from its raw bytes.
    ///
    /// # Errors
    ///
    /// `InvalidInput` if the bytes are not a zip archive, if `word/document.xml`
    /// is missing, or if a substitutable part is not well-formed XML.
    pub fn open(bytes: Vec<u8>) -> Result<Self> {
        let mut parts = Vec::new();
        {
            let mut archive = ZipArchive::new(Cursor::new(bytes.as_slice()))
                .map_err(|e| DocfillError::invalid_input(format!("Not a .docx file: {e}")))?;

            for i in 0..archive.len() {
                let mut file = archive.by_index(i).map_err(|e| {
                    DocfillError::invalid_input(format!("Corrupt .docx entry #{i}: {e}"))
                })?;
                if !is_substitutable_part(file.name()) {
                    continue;
                }
                let name = file.name().to_string();
                let mut xml = String::new();
                file.read_to_string(&mut xml).map_err(|e| {
                    DocfillError::invalid_input(format!("Unreadable part {name}: {e}"))
                })?;
                parts.push(XmlPart { name, xml });
            }
        }

        let main = parts
            .iter()
            .position(|part| part.name == MAIN_PART)
            .ok_or_else(|| DocfillError::invalid_input(format!("Missing {MAIN_PART}")))?;
        let main_part = parts.remove(main);
        parts.insert(0, main_part);

        let mut sections = Vec::with_capacity(parts.len());
        for part in &parts {
            let text = text::xml_to_text(&part.xml).map_err(|e| {
                DocfillError::invalid_input(format!("Malformed XML in {}: {e}", part.name))
            })?;
            if !text.is_empty() {
                sections.push(text);
            }
        }

        tracing::debug!(
            size = bytes.len(),
            parts = parts.len(),
            "Opened .docx template"
        );
        Ok(Self {
            bytes,
            parts,
            text: sections.join("\n"),
        })
    }

    /// Names of the parts placeholders are searched in.
    pub fn part_names(&self) -> impl Iterator<Item = &str> {
        self.parts.iter().map(|part| part.name.as_str())
    }

    /// Raw XML of a substitutable part.
    pub fn part_xml(&self, name: &str) -> Option<&str> {
        self.parts
            .iter()
            .find(|part| part.name == name)
            .map(|part| part.xml.as_str())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Writes a new archive with `plan` applied to the run text of every
    /// substitutable part. Tags and attributes are left byte for byte.
    ///
    /// Entries are written in the original order. Unchanged entries are
    /// copied raw, without recompression.
    pub fn rewrite(&self, plan: &FillPlan) -> Result<RenderedDocument> {
        let mut rewritten: HashMap<&str, String> = HashMap::new();
        let mut replacements = 0;
        for part in &self.parts {
            let (xml, count) = fill_run_text(&part.xml, plan)?;
            if count > 0 {
                tracing::debug!(part = %part.name, replacements = count, "Rewrote part");
                replacements += count;
                rewritten.insert(part.name.as_str(), xml);
            }
        }

        let mut archive =
            ZipArchive::new(Cursor::new(self.bytes.as_slice())).map_err(generation_error)?;
        let mut buf = Vec::with_capacity(self.bytes.len());
        {
            let mut writer = ZipWriter::new(Cursor::new(&mut buf));
            let options =
                SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

            for i in 0..archive.len() {
                let file = archive.by_index_raw(i).map_err(generation_error)?;
                match rewritten.get(file.name()) {
                    Some(xml) => {
                        let name = file.name().to_string();
                        drop(file);
                        writer.start_file(name, options).map_err(generation_error)?;
                        writer
                            .write_all(xml.as_bytes())
                            .map_err(|e| DocfillError::generation_failed(e.to_string()))?;
                    }
                    None => writer.raw_copy_file(file).map_err(generation_error)?,
                }
            }

            writer.finish().map_err(generation_error)?;
        }

        Ok(RenderedDocument {
            bytes: buf,
            replacements,
        })
    }
}

/// Applies `plan` to each `<w:t>` span of `xml`, copying everything between
/// spans verbatim.
fn fill_run_text(xml: &str, plan: &FillPlan) -> Result<(String, usize)> {
    let spans = text::run_text_spans(xml)
        .map_err(|e| DocfillError::generation_failed(format!("Malformed XML: {e}")))?;

    let mut out = String::with_capacity(xml.len());
    let mut replacements = 0;
    let mut copied = 0;
    for span in spans {
        let substitution = plan.apply(&xml[span.clone()], escape_xml_text)?;
        out.push_str(&xml[copied..span.start]);
        out.push_str(&substitution.text);
        replacements += substitution.replacements;
        copied = span.end;
    }
    out.push_str(&xml[copied..]);

    Ok((out, replacements))
}

fn generation_error(err: zip::result::ZipError) -> DocfillError {
    DocfillError::generation_failed(format!("Failed to write .docx: {err}"))
}

impl TemplateDocument for DocxPackage {
    fn plain_text(&self) -> String {
        self.text.clone()
    }

    fn render(&self, plan: &FillPlan) -> Result<RenderedDocument> {
        self.rewrite(plan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docfill_core::fill::{PlaceholderMap, PlanSource};

    fn answers(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn entry_names(bytes: &[u8]) -> Vec<String> {
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        (0..archive.len())
            .map(|i| archive.by_index(i).unwrap().name().to_string())
            .collect()
    }

    #[test]
    fn test_plain_text_covers_body_headers_and_footers() {
        let bytes = DocxBuilder::new()
            .paragraph("Dear {{name}},")
            .paragraph("Total: {{amount}}")
            .header("[Company Name] confidential")
            .footer("Page footer")
            .build()
            .unwrap();

        let package = DocxPackage::open(bytes).unwrap();
        assert_eq!(
            package.plain_text(),
            "Dear {{name}},\nTotal: {{amount}}\n[Company Name] confidential\nPage footer"
        );
        assert_eq!(package.part_names().next(), Some(MAIN_PART));
    }

    #[test]
    fn test_rejects_non_zip_and_missing_main_part() {
        let err = DocxPackage::open(b"plain text".to_vec()).unwrap_err();
        assert!(err.is_invalid_input());

        let bytes = DocxBuilder::empty()
            .raw_part("word/styles.xml", "<w:styles/>")
            .build()
            .unwrap();
        let err = DocxPackage::open(bytes).unwrap_err();
        assert!(err.is_invalid_input());
    }

    #[test]
    fn test_exact_fill_keeps_formatting() {
        let bytes = DocxBuilder::new()
            .paragraph("Dear {{name}}")
            .build()
            .unwrap();
        let package = DocxPackage::open(bytes).unwrap();
        let original_xml = package.part_xml(MAIN_PART).unwrap().to_string();

        let rendered = package
            .rewrite(&FillPlan::Exact(answers(&[("name", "Bob")])))
            .unwrap();
        assert_eq!(rendered.replacements, 1);

        let filled = DocxPackage::open(rendered.bytes).unwrap();
        assert_eq!(filled.plain_text(), "Dear Bob");
        assert_eq!(
            filled.part_xml(MAIN_PART).unwrap(),
            original_xml.replace("{{name}}", "Bob")
        );
    }

    #[test]
    fn test_answers_are_xml_escaped() {
        let bytes = DocxBuilder::new()
            .paragraph("Client: [Client Name]")
            .build()
            .unwrap();
        let package = DocxPackage::open(bytes).unwrap();

        let mut map = PlaceholderMap::new();
        map.insert("[Client Name]", "Smith & <Sons>");
        let plan = FillPlan::Literal {
            map,
            source: PlanSource::Resolved,
        };
        let rendered = package.rewrite(&plan).unwrap();

        let filled = DocxPackage::open(rendered.bytes).unwrap();
        assert_eq!(filled.plain_text(), "Client: Smith & <Sons>");
        assert!(
            filled
                .part_xml(MAIN_PART)
                .unwrap()
                .contains("Smith &amp; &lt;Sons&gt;")
        );
    }

    #[test]
    fn test_other_entries_are_copied_in_order() {
        let bytes = DocxBuilder::new()
            .paragraph("{{a}}")
            .raw_part("word/media/image1.png", "not-really-a-png")
            .build()
            .unwrap();
        let package = DocxPackage::open(bytes.clone()).unwrap();

        let rendered = package
            .rewrite(&FillPlan::Exact(answers(&[("a", "1")])))
            .unwrap();

        assert_eq!(entry_names(&rendered.bytes), entry_names(&bytes));
        let mut archive = ZipArchive::new(Cursor::new(rendered.bytes.as_slice())).unwrap();
        let mut media = String::new();
        archive
            .by_name("word/media/image1.png")
            .unwrap()
            .read_to_string(&mut media)
            .unwrap();
        assert_eq!(media, "not-really-a-png");
    }

    #[test]
    fn test_no_match_leaves_parts_unchanged() {
        let bytes = DocxBuilder::new()
            .paragraph("Nothing to fill")
            .build()
            .unwrap();
        let package = DocxPackage::open(bytes).unwrap();
        let rendered = package
            .rewrite(&FillPlan::Exact(answers(&[("name", "Bob")])))
            .unwrap();

        assert_eq!(rendered.replacements, 0);
        let filled = DocxPackage::open(rendered.bytes).unwrap();
        assert_eq!(
            filled.part_xml(MAIN_PART),
            package.part_xml(MAIN_PART)
        );
    }

    #[test]
    fn test_resolved_literal_only_touches_run_text() {
        let bytes = DocxBuilder::new()
            .paragraph("Tone: Normal")
            .build()
            .unwrap();
        let package = DocxPackage::open(bytes).unwrap();
        let before = package.part_xml(MAIN_PART).unwrap().to_string();
        assert!(before.contains(r#"w:val="Normal""#));

        let mut map = PlaceholderMap::new();
        map.insert("Normal", "Formal");
        let plan = FillPlan::Literal {
            map,
            source: PlanSource::Resolved,
        };
        let rendered = package.render(&plan).unwrap();
        assert_eq!(rendered.replacements, 1);

        let filled = DocxPackage::open(rendered.bytes).unwrap();
        let after = filled.part_xml(MAIN_PART).unwrap();
        assert!(after.contains(r#"w:val="Normal""#));
        assert_eq!(after, before.replace(">Tone: Normal<", ">Tone: Formal<"));
        assert_eq!(filled.plain_text(), "Tone: Formal");
    }

    #[test]
    fn test_short_literal_does_not_break_markup() {
        let bytes = DocxBuilder::new().paragraph("w").build().unwrap();
        let package = DocxPackage::open(bytes).unwrap();

        let mut map = PlaceholderMap::new();
        map.insert("w", "<x>");
        let plan = FillPlan::Literal {
            map,
            source: PlanSource::Heuristic,
        };
        let rendered = package.rewrite(&plan).unwrap();
        assert_eq!(rendered.replacements, 1);

        let filled = DocxPackage::open(rendered.bytes).unwrap();
        assert_eq!(filled.plain_text(), "<x>");
    }
}
