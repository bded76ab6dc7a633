//! DOCX container access.
//!
//! A `.docx` file is a zip package of XML parts. The container reader opens
//! the package, parses `word/document.xml` into the ordered body element
//! stream, and carries the raw `word/numbering.xml` part for the numbering
//! index. A missing numbering part is not an error; the index simply stays
//! empty downstream.

pub mod body;
pub mod element;

use std::fs::File;
use std::io::Read;
use std::path::Path;

use zip::ZipArchive;

pub use element::{Cell, Element, NumberingRef, Paragraph, Run, Table};

/// Container-level failures. These are the only fatal errors for a document.
#[derive(Debug)]
pub enum ContainerError {
    /// The file could not be read.
    Io(std::io::Error),
    /// The file is not a readable zip package.
    Zip(String),
    /// A required package part is absent.
    MissingPart(String),
    /// The document part is not well-formed XML.
    Xml(String),
}

impl std::fmt::Display for ContainerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContainerError::Io(err) => write!(f, "I/O error: {}", err),
            ContainerError::Zip(msg) => write!(f, "Invalid package: {}", msg),
            ContainerError::MissingPart(part) => write!(f, "Missing package part: {}", part),
            ContainerError::Xml(msg) => write!(f, "Malformed document part: {}", msg),
        }
    }
}

impl std::error::Error for ContainerError {}

impl From<std::io::Error> for ContainerError {
    fn from(err: std::io::Error) -> Self {
        ContainerError::Io(err)
    }
}

/// An opened document: the ordered body elements plus the raw numbering part.
#[derive(Debug)]
pub struct Container {
    elements: Vec<Element>,
    numbering_xml: Option<String>,
}

impl Container {
    /// Open a `.docx` package and parse its body.
    ///
    /// The file handle is scoped to this call; nothing is read lazily
    /// afterwards.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Container, ContainerError> {
        let file = File::open(path.as_ref())?;
        let mut archive =
            ZipArchive::new(file).map_err(|err| ContainerError::Zip(err.to_string()))?;

        let document_xml = read_part(&mut archive, "word/document.xml")?
            .ok_or_else(|| ContainerError::MissingPart("word/document.xml".to_string()))?;
        let numbering_xml = read_part(&mut archive, "word/numbering.xml")?;

        let elements =
            body::parse_body(&document_xml).map_err(|err| ContainerError::Xml(err.to_string()))?;

        Ok(Container {
            elements,
            numbering_xml,
        })
    }

    /// Body elements in document order.
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn into_elements(self) -> Vec<Element> {
        self.elements
    }

    /// Raw bytes of the numbering-definition part, if present.
    pub fn numbering_xml(&self) -> Option<&str> {
        self.numbering_xml.as_deref()
    }
}

fn read_part(
    archive: &mut ZipArchive<File>,
    name: &str,
) -> Result<Option<String>, ContainerError> {
    let mut part = match archive.by_name(name) {
        Ok(part) => part,
        Err(zip::result::ZipError::FileNotFound) => return Ok(None),
        Err(err) => return Err(ContainerError::Zip(err.to_string())),
    };
    let mut content = String::new();
    part.read_to_string(&mut content)?;
    Ok(Some(content))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_an_io_error() {
        let result = Container::open("/nonexistent/missing.docx");
        assert!(matches!(result, Err(ContainerError::Io(_))));
    }

    #[test]
    fn container_error_messages_name_the_part() {
        let err = ContainerError::MissingPart("word/document.xml".to_string());
        assert!(err.to_string().contains("word/document.xml"));
    }
}
