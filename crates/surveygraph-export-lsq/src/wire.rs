//! The wire document: ordered named sections with explicit field lists,
//! rendered as `.lsq` XML.

use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::Cursor;

use crate::ExportError;

/// One named section: a field-name list followed by data rows. Every row
/// has exactly one cell per declared field, in field order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireSection {
    pub name: String,
    pub fields: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl WireSection {
    pub fn new(name: &str, fields: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            fields: fields.iter().map(|f| f.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    /// Cell value of `field` in row `row`, if both exist.
    pub fn cell(&self, row: usize, field: &str) -> Option<&str> {
        let idx = self.fields.iter().position(|f| f == field)?;
        self.rows.get(row)?.get(idx).map(String::as_str)
    }
}

/// An ordered hierarchical import document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireDocument {
    /// `LimeSurveyDocType` header value.
    pub doc_type: String,
    pub db_version: String,
    pub languages: Vec<String>,
    pub sections: Vec<WireSection>,
}

impl WireDocument {
    pub fn section(&self, name: &str) -> Option<&WireSection> {
        self.sections.iter().find(|s| s.name == name)
    }

    /// Render the document as `.lsq` XML.
    ///
    /// Section order, field order and row order are taken as-is; text
    /// content is XML-escaped by the writer. Equal documents render to
    /// byte-identical output.
    pub fn to_xml(&self) -> Result<String, ExportError> {
        let xml = |e: quick_xml::Error| ExportError::Xml(e.to_string());

        let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);

        writer
            .write_event(Event::Start(BytesStart::new("document")))
            .map_err(xml)?;

        write_text_element(&mut writer, "LimeSurveyDocType", &self.doc_type).map_err(xml)?;
        write_text_element(&mut writer, "DBVersion", &self.db_version).map_err(xml)?;

        writer
            .write_event(Event::Start(BytesStart::new("languages")))
            .map_err(xml)?;
        for language in &self.languages {
            write_text_element(&mut writer, "language", language).map_err(xml)?;
        }
        writer
            .write_event(Event::End(BytesEnd::new("languages")))
            .map_err(xml)?;

        for section in &self.sections {
            writer
                .write_event(Event::Start(BytesStart::new(section.name.as_str())))
                .map_err(xml)?;

            writer
                .write_event(Event::Start(BytesStart::new("fields")))
                .map_err(xml)?;
            for field in &section.fields {
                write_text_element(&mut writer, "fieldname", field).map_err(xml)?;
            }
            writer
                .write_event(Event::End(BytesEnd::new("fields")))
                .map_err(xml)?;

            writer
                .write_event(Event::Start(BytesStart::new("rows")))
                .map_err(xml)?;
            for row in &section.rows {
                writer
                    .write_event(Event::Start(BytesStart::new("row")))
                    .map_err(xml)?;
                for (field, value) in section.fields.iter().zip(row) {
                    write_text_element(&mut writer, field, value).map_err(xml)?;
                }
                writer
                    .write_event(Event::End(BytesEnd::new("row")))
                    .map_err(xml)?;
            }
            writer
                .write_event(Event::End(BytesEnd::new("rows")))
                .map_err(xml)?;

            writer
                .write_event(Event::End(BytesEnd::new(section.name.as_str())))
                .map_err(xml)?;
        }

        writer
            .write_event(Event::End(BytesEnd::new("document")))
            .map_err(xml)?;

        let bytes = writer.into_inner().into_inner();
        String::from_utf8(bytes).map_err(|e| ExportError::Xml(e.to_string()))
    }
}

fn write_text_element<W: std::io::Write>(
    writer: &mut Writer<W>,
    name: &str,
    text: &str,
) -> Result<(), quick_xml::Error> {
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    if !text.is_empty() {
        writer.write_event(Event::Text(BytesText::new(text)))?;
    }
    writer.write_event(Event::End(BytesEnd::new(name)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny_document() -> WireDocument {
        let mut section = WireSection::new("answers", &["qid", "code", "answer"]);
        section.rows.push(vec![
            "446".to_string(),
            "A1".to_string(),
            "Sì <grazie>".to_string(),
        ]);
        WireDocument {
            doc_type: "Question".to_string(),
            db_version: "623".to_string(),
            languages: vec!["it".to_string()],
            sections: vec![section],
        }
    }

    #[test]
    fn renders_header_fields_and_rows() {
        let xml = tiny_document().to_xml().unwrap();
        assert!(xml.contains("<LimeSurveyDocType>Question</LimeSurveyDocType>"));
        assert!(xml.contains("<DBVersion>623</DBVersion>"));
        assert!(xml.contains("<fieldname>code</fieldname>"));
        assert!(xml.contains("<code>A1</code>"));
    }

    #[test]
    fn text_content_is_escaped() {
        let xml = tiny_document().to_xml().unwrap();
        assert!(xml.contains("Sì &lt;grazie&gt;"));
        assert!(!xml.contains("<grazie>"));
    }

    #[test]
    fn rendering_is_deterministic() {
        let doc = tiny_document();
        assert_eq!(doc.to_xml().unwrap(), doc.to_xml().unwrap());
    }

    #[test]
    fn cell_lookup_follows_field_order() {
        let doc = tiny_document();
        let answers = doc.section("answers").unwrap();
        assert_eq!(answers.cell(0, "code"), Some("A1"));
        assert_eq!(answers.cell(0, "missing"), None);
    }
}
