//! WordprocessingML → plain text.

use quick_xml::Reader;
use quick_xml::events::Event;
use std::ops::Range;

/// Concatenates the `<w:t>` runs of a part.
///
/// Paragraph ends and `<w:br/>` become `\n`, `<w:tab/>` becomes `\t`.
/// Whitespace inside runs is preserved.
pub(crate) fn xml_to_text(xml: &str) -> Result<String, String> {
    let mut reader = Reader::from_str(xml);
    let mut text = String::new();
    let mut in_text = false;

    loop {
        match reader.read_event().map_err(|e| e.to_string())? {
            Event::Start(e) if e.name().as_ref() == b"w:t" => in_text = true,
            Event::End(e) => match e.name().as_ref() {
                b"w:t" => in_text = false,
                b"w:p" => text.push('\n'),
                _ => {}
            },
            Event::Empty(e) => match e.name().as_ref() {
                b"w:tab" => text.push('\t'),
                b"w:br" | b"w:cr" => text.push('\n'),
                _ => {}
            },
            Event::Text(e) if in_text => {
                let unescaped = e.unescape().map_err(|e| e.to_string())?;
                text.push_str(&unescaped);
            }
            Event::CData(e) if in_text => {
                text.push_str(&String::from_utf8_lossy(&e.into_inner()));
            }
            Event::Eof => break,
            _ => {}
        }
    }

    let trimmed = text.trim_end_matches('\n').len();
    text.truncate(trimmed);
    Ok(text)
}

/// Byte ranges of the raw, still-escaped character data inside `<w:t>` runs.
///
/// Tags, attributes and text outside runs are never part of a span.
pub(crate) fn run_text_spans(xml: &str) -> Result<Vec<Range<usize>>, String> {
    let mut reader = Reader::from_str(xml);
    let mut spans = Vec::new();
    let mut in_text = false;

    loop {
        let start = offset(reader.buffer_position())?;
        match reader.read_event().map_err(|e| e.to_string())? {
            Event::Start(e) if e.name().as_ref() == b"w:t" => in_text = true,
            Event::End(e) if e.name().as_ref() == b"w:t" => in_text = false,
            Event::Text(_) if in_text => {
                let end = offset(reader.buffer_position())?;
                if end > start {
                    spans.push(start..end);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(spans)
}

fn offset(position: u64) -> Result<usize, String> {
    usize::try_from(position).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_runs_and_paragraphs() {
        let xml = r#"<w:document><w:body>
            <w:p><w:r><w:t>Dear </w:t></w:r><w:r><w:rPr><w:b/></w:rPr><w:t>{{name}}</w:t></w:r></w:p>
            <w:p><w:r><w:t xml:space="preserve">Amount:</w:t><w:tab/><w:t>$[_____]</w:t></w:r></w:p>
        </w:body></w:document>"#;
        assert_eq!(xml_to_text(xml).unwrap(), "Dear {{name}}\nAmount:\t$[_____]");
    }

    #[test]
    fn test_entities_are_unescaped_and_markup_text_ignored() {
        let xml = "<w:p><w:pPr><w:pStyle w:val=\"Title\"/></w:pPr>\
                   <w:r><w:t>R&amp;D &lt;[Lead]&gt;</w:t></w:r></w:p>";
        assert_eq!(xml_to_text(xml).unwrap(), "R&D <[Lead]>");
    }

    #[test]
    fn test_breaks() {
        let xml = "<w:p><w:r><w:t>a</w:t><w:br/><w:t>b</w:t></w:r></w:p>";
        assert_eq!(xml_to_text(xml).unwrap(), "a\nb");
    }

    #[test]
    fn test_malformed_xml() {
        assert!(xml_to_text("<w:p><w:t>unclosed</w:p>").is_err());
    }

    #[test]
    fn test_run_text_spans_skip_markup() {
        let xml = "<w:p><w:pPr><w:pStyle w:val=\"Normal\"/></w:pPr>\
                   <w:r><w:t>Tone: Normal</w:t><w:t></w:t>\
                   <w:t>R&amp;D</w:t></w:r></w:p>";
        let spans: Vec<&str> = run_text_spans(xml)
            .unwrap()
            .into_iter()
            .map(|span| &xml[span])
            .collect();
        assert_eq!(spans, ["Tone: Normal", "R&amp;D"]);
    }
}
