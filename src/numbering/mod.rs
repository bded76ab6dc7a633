//! Numbering-definition index.
//!
//! `word/numbering.xml` maps list ids to abstract numbering schemes, and
//! each scheme defines up to nine levels with a numeric kind, a format
//! template (`w:lvlText`, e.g. `"%1.%2."`), and a start value. The index
//! resolves `(list_id, level)` to those definitions; the rendered-marker
//! derivation built on top lives in [`marker`].

pub mod marker;

use std::collections::HashMap;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

pub use marker::{ListCounter, ListItemInfo};

/// Numeric kind of a list level, from `<w:numFmt w:val="..."/>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericKind {
    Bullet,
    Decimal,
    LowerLetter,
    UpperLetter,
    LowerRoman,
    UpperRoman,
    /// `w:numFmt` value `none`: counted but rendered as bare digits.
    None,
}

impl NumericKind {
    /// Parse a `w:numFmt` value. Unknown formats degrade to bullets.
    pub fn parse(value: &str) -> NumericKind {
        match value {
            "decimal" => NumericKind::Decimal,
            "lowerLetter" => NumericKind::LowerLetter,
            "upperLetter" => NumericKind::UpperLetter,
            "lowerRoman" => NumericKind::LowerRoman,
            "upperRoman" => NumericKind::UpperRoman,
            "none" => NumericKind::None,
            _ => NumericKind::Bullet,
        }
    }

    /// Important kinds form the visible skeleton of a list; bullets and
    /// letters ride along as siblings of the important item they follow.
    pub fn is_important(&self) -> bool {
        matches!(
            self,
            NumericKind::Decimal | NumericKind::LowerRoman | NumericKind::UpperRoman
        )
    }
}

/// One `<w:lvl>` definition.
#[derive(Debug, Clone, Default)]
pub struct LevelDef {
    /// Numeric kind; `None` when the level carries no `w:numFmt`.
    pub kind: Option<NumericKind>,
    /// Format template (`w:lvlText`), e.g. `"%1.%2."`.
    pub format: Option<String>,
    /// Start value (`w:start`), defaulting to 1.
    pub start: i64,
}

/// Malformed numbering part. Never surfaced to callers; the index degrades
/// to empty instead.
#[derive(Debug)]
pub struct NumberingParseError(pub String);

impl std::fmt::Display for NumberingParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Numbering parse error: {}", self.0)
    }
}

impl std::error::Error for NumberingParseError {}

/// Lookup from `(list_id, level)` to level definitions.
#[derive(Debug, Default)]
pub struct NumberingIndex {
    /// `w:numId` → `w:abstractNumId`.
    num_map: HashMap<String, String>,
    /// `w:abstractNumId` → level → definition.
    levels: HashMap<String, HashMap<u32, LevelDef>>,
}

impl NumberingIndex {
    pub fn empty() -> NumberingIndex {
        NumberingIndex::default()
    }

    pub fn is_empty(&self) -> bool {
        self.num_map.is_empty()
    }

    /// Parse the numbering part.
    pub fn parse(xml: &str) -> Result<NumberingIndex, NumberingParseError> {
        let mut reader = Reader::from_reader(xml.as_bytes());
        let mut buf = Vec::new();

        let mut num_map: HashMap<String, String> = HashMap::new();
        let mut levels: HashMap<String, HashMap<u32, LevelDef>> = HashMap::new();

        let mut current_abstract: Option<String> = None;
        let mut current_num: Option<String> = None;
        let mut current_ilvl: Option<u32> = None;
        let mut current_level: Option<LevelDef> = None;

        loop {
            let event = reader
                .read_event_into(&mut buf)
                .map_err(|err| NumberingParseError(err.to_string()))?;
            match event {
                Event::Start(ref e) | Event::Empty(ref e) => match e.name().as_ref() {
                    b"w:abstractNum" => {
                        current_abstract = attr_value(e, b"w:abstractNumId");
                        if let Some(id) = current_abstract.clone() {
                            levels.entry(id).or_default();
                        }
                    }
                    b"w:num" => {
                        current_num = attr_value(e, b"w:numId");
                    }
                    b"w:abstractNumId" => {
                        if let (Some(num_id), Some(abstract_id)) =
                            (current_num.clone(), attr_value(e, b"w:val"))
                        {
                            num_map.insert(num_id, abstract_id);
                        }
                    }
                    b"w:lvl" if current_abstract.is_some() => {
                        current_ilvl =
                            attr_value(e, b"w:ilvl").and_then(|v| v.parse::<u32>().ok());
                        current_level = Some(LevelDef {
                            kind: None,
                            format: None,
                            start: 1,
                        });
                    }
                    b"w:numFmt" => {
                        if let Some(level) = current_level.as_mut() {
                            level.kind =
                                attr_value(e, b"w:val").map(|v| NumericKind::parse(&v));
                        }
                    }
                    b"w:lvlText" => {
                        if let Some(level) = current_level.as_mut() {
                            level.format = attr_value(e, b"w:val");
                        }
                    }
                    b"w:start" => {
                        if let Some(level) = current_level.as_mut() {
                            if let Some(start) =
                                attr_value(e, b"w:val").and_then(|v| v.parse::<i64>().ok())
                            {
                                level.start = start;
                            }
                        }
                    }
                    _ => {}
                },
                Event::End(ref e) => match e.name().as_ref() {
                    b"w:abstractNum" => {
                        current_abstract = None;
                    }
                    b"w:num" => {
                        current_num = None;
                    }
                    b"w:lvl" => {
                        if let (Some(abstract_id), Some(ilvl), Some(level)) = (
                            current_abstract.as_ref(),
                            current_ilvl.take(),
                            current_level.take(),
                        ) {
                            levels
                                .entry(abstract_id.clone())
                                .or_default()
                                .insert(ilvl, level);
                        }
                    }
                    _ => {}
                },
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        Ok(NumberingIndex { num_map, levels })
    }

    /// The level definition for `(list_id, level)`, if any.
    pub fn level(&self, list_id: &str, level: u32) -> Option<&LevelDef> {
        let abstract_id = self.num_map.get(list_id)?;
        self.levels.get(abstract_id)?.get(&level)
    }

    /// Format template and numeric kind for `(list_id, level)`.
    pub fn format_of(&self, list_id: &str, level: u32) -> (Option<&str>, Option<NumericKind>) {
        match self.level(list_id, level) {
            Some(def) => (def.format.as_deref(), def.kind),
            None => (None, None),
        }
    }

    /// Start value for `(list_id, level)`, defaulting to 1.
    pub fn start_of(&self, list_id: &str, level: u32) -> i64 {
        self.level(list_id, level).map_or(1, |def| def.start)
    }
}

fn attr_value(e: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.as_ref() == key)
        .and_then(|a| a.unescape_value().ok().map(|value| value.into_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const NUMBERING: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:numbering xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:abstractNum w:abstractNumId="0">
    <w:lvl w:ilvl="0">
      <w:start w:val="1"/>
      <w:numFmt w:val="decimal"/>
      <w:lvlText w:val="%1."/>
    </w:lvl>
    <w:lvl w:ilvl="1">
      <w:start w:val="3"/>
      <w:numFmt w:val="lowerLetter"/>
      <w:lvlText w:val="%2)"/>
    </w:lvl>
  </w:abstractNum>
  <w:abstractNum w:abstractNumId="1">
    <w:lvl w:ilvl="0">
      <w:numFmt w:val="bullet"/>
      <w:lvlText w:val="&#xF0B7;"/>
    </w:lvl>
  </w:abstractNum>
  <w:num w:numId="5"><w:abstractNumId w:val="0"/></w:num>
  <w:num w:numId="7"><w:abstractNumId w:val="1"/></w:num>
</w:numbering>"#;

    #[test]
    fn resolves_levels_through_the_abstract_mapping() {
        let index = NumberingIndex::parse(NUMBERING).unwrap();
        let (format, kind) = index.format_of("5", 0);
        assert_eq!(format, Some("%1."));
        assert_eq!(kind, Some(NumericKind::Decimal));

        let (format, kind) = index.format_of("5", 1);
        assert_eq!(format, Some("%2)"));
        assert_eq!(kind, Some(NumericKind::LowerLetter));
    }

    #[test]
    fn start_defaults_to_one_when_absent() {
        let index = NumberingIndex::parse(NUMBERING).unwrap();
        assert_eq!(index.start_of("5", 1), 3);
        assert_eq!(index.start_of("7", 0), 1);
        assert_eq!(index.start_of("99", 0), 1);
    }

    #[test]
    fn unknown_list_id_has_no_definition() {
        let index = NumberingIndex::parse(NUMBERING).unwrap();
        assert!(index.level("99", 0).is_none());
        assert_eq!(index.format_of("99", 0), (None, None));
    }

    #[test]
    fn unknown_format_degrades_to_bullet() {
        assert_eq!(NumericKind::parse("decimalZero"), NumericKind::Bullet);
        assert_eq!(NumericKind::parse("ordinal"), NumericKind::Bullet);
    }

    #[test]
    fn malformed_part_is_an_error() {
        let result = NumberingIndex::parse("<w:numbering><w:abstractNum></w:numbering>");
        assert!(result.is_err());
    }

    #[test]
    fn important_kinds() {
        assert!(NumericKind::Decimal.is_important());
        assert!(NumericKind::LowerRoman.is_important());
        assert!(NumericKind::UpperRoman.is_important());
        assert!(!NumericKind::Bullet.is_important());
        assert!(!NumericKind::LowerLetter.is_important());
        assert!(!NumericKind::UpperLetter.is_important());
    }
}
