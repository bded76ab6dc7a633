//! Test fixture builder: assembles minimal `.docx` packages in a temp
//! directory so the integration tests exercise the real container path.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use zip::write::FileOptions;
use zip::ZipWriter;

pub struct DocxBuilder {
    body: String,
    numbering: Option<String>,
}

impl DocxBuilder {
    pub fn new() -> DocxBuilder {
        DocxBuilder {
            body: String::new(),
            numbering: None,
        }
    }

    pub fn styled(mut self, style: &str, text: &str) -> DocxBuilder {
        self.body.push_str(&format!(
            r#"<w:p><w:pPr><w:pStyle w:val="{}"/></w:pPr><w:r><w:t>{}</w:t></w:r></w:p>"#,
            xml_escape(style),
            xml_escape(text)
        ));
        self
    }

    pub fn heading(self, level: u32, text: &str) -> DocxBuilder {
        let style = format!("Heading{}", level);
        self.styled(&style, text)
    }

    pub fn paragraph(mut self, text: &str) -> DocxBuilder {
        self.body.push_str(&format!(
            r#"<w:p><w:r><w:t>{}</w:t></w:r></w:p>"#,
            xml_escape(text)
        ));
        self
    }

    /// A paragraph holding only a hard page break.
    pub fn page_break(mut self) -> DocxBuilder {
        self.body
            .push_str(r#"<w:p><w:r><w:br w:type="page"/></w:r></w:p>"#);
        self
    }

    pub fn list_item(mut self, num_id: &str, ilvl: u32, text: &str) -> DocxBuilder {
        self.body.push_str(&format!(
            r#"<w:p><w:pPr><w:pStyle w:val="ListParagraph"/><w:numPr><w:ilvl w:val="{}"/><w:numId w:val="{}"/></w:numPr></w:pPr><w:r><w:t>{}</w:t></w:r></w:p>"#,
            ilvl,
            xml_escape(num_id),
            xml_escape(text)
        ));
        self
    }

    pub fn sized_paragraph(mut self, size: u32, text: &str) -> DocxBuilder {
        self.body.push_str(&format!(
            r#"<w:p><w:r><w:rPr><w:sz w:val="{}"/></w:rPr><w:t>{}</w:t></w:r></w:p>"#,
            size,
            xml_escape(text)
        ));
        self
    }

    pub fn table(mut self, rows: &[&[&str]]) -> DocxBuilder {
        let mut xml = String::from("<w:tbl>");
        for row in rows {
            xml.push_str("<w:tr>");
            for cell in *row {
                xml.push_str(&format!(
                    "<w:tc><w:p><w:r><w:t>{}</w:t></w:r></w:p></w:tc>",
                    xml_escape(cell)
                ));
            }
            xml.push_str("</w:tr>");
        }
        xml.push_str("</w:tbl>");
        self.body.push_str(&xml);
        self
    }

    /// Supply the inner elements of `word/numbering.xml`
    /// (`<w:abstractNum>`/`<w:num>` blocks).
    pub fn numbering(mut self, inner: &str) -> DocxBuilder {
        self.numbering = Some(format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:numbering xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">{}</w:numbering>"#,
            inner
        ));
        self
    }

    /// Write the package into `dir` and return its path.
    pub fn write(self, dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        let file = File::create(&path).expect("create docx");
        let mut zip = ZipWriter::new(file);
        let options = FileOptions::default();

        let document = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{}</w:body></w:document>"#,
            self.body
        );
        zip.start_file("word/document.xml", options)
            .expect("start document part");
        zip.write_all(document.as_bytes()).expect("write document");

        if let Some(numbering) = self.numbering {
            zip.start_file("word/numbering.xml", options)
                .expect("start numbering part");
            zip.write_all(numbering.as_bytes()).expect("write numbering");
        }

        zip.finish().expect("finish docx");
        path
    }
}

/// Decimal level 0 (`%1`) with lowerLetter level 1 (`%2`), as numId 1.
pub fn two_level_numbering() -> &'static str {
    r#"<w:abstractNum w:abstractNumId="0">
         <w:lvl w:ilvl="0"><w:start w:val="1"/><w:numFmt w:val="decimal"/><w:lvlText w:val="%1"/></w:lvl>
         <w:lvl w:ilvl="1"><w:start w:val="1"/><w:numFmt w:val="lowerLetter"/><w:lvlText w:val="%2"/></w:lvl>
       </w:abstractNum>
       <w:num w:numId="1"><w:abstractNumId w:val="0"/></w:num>"#
}

fn xml_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
