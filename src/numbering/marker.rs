//! Rendered-marker derivation.
//!
//! A list item observed at `(list_id, level)` increments the process-wide
//! [`ListCounter`] and renders a visible marker from the numbering
//! definitions: `"1.3."`, `"iv)"`, `"•"`. Emitted chunks embed these
//! markers in their body text, so the derivation here is a contract:
//!
//! 1. the level-0 template's literal prefix is the overall prefix;
//! 2. each level from 0 to the item's level contributes a glyph rendered by
//!    its numeric kind, with unvisited levels using their start value;
//! 3. the last level's literal suffix (text after the final `%N`) is the
//!    overall suffix;
//! 4. a template with exactly one placeholder renders alone; otherwise the
//!    glyphs are joined with `"."`. Bullets always render as the bare glyph.

use std::collections::HashMap;

use super::{NumberingIndex, NumericKind};

/// Replacement map for the two private-use bullet codepoints that symbol
/// fonts smuggle into `w:lvlText`.
const BULLET_SUBSTITUTIONS: [(char, &str); 2] = [('\u{f0b7}', "•"), ('\u{f02d}', "-")];

/// Per-document list counters, keyed by `(list_id, level)`.
///
/// Counters only ever move forward; a later item at a shallower level does
/// not reset the deeper counts.
#[derive(Debug, Default)]
pub struct ListCounter {
    counts: HashMap<(String, u32), i64>,
}

impl ListCounter {
    pub fn new() -> ListCounter {
        ListCounter::default()
    }

    /// Record a visit at `(list_id, level)` and return the new count.
    pub fn visit(&mut self, list_id: &str, level: u32) -> i64 {
        let count = self
            .counts
            .entry((list_id.to_string(), level))
            .or_insert(0);
        *count += 1;
        *count
    }

    /// Current count at `(list_id, level)`, falling back to the level's
    /// start value when the level has not been visited yet.
    pub fn value(&self, index: &NumberingIndex, list_id: &str, level: u32) -> i64 {
        self.counts
            .get(&(list_id.to_string(), level))
            .copied()
            .unwrap_or_else(|| index.start_of(list_id, level))
    }
}

/// The resolved rendering of one list item.
#[derive(Debug, Clone)]
pub struct ListItemInfo {
    pub list_id: String,
    pub level: u32,
    /// Rendered marker, e.g. `"1.3."`. Bare digits when the numbering
    /// definition gives no numeric kind for the level.
    pub marker: Option<String>,
    pub kind: Option<NumericKind>,
    pub important: bool,
}

/// Resolve a list item at `(list_id, level)`: increments the counter and
/// renders the marker from the numbering definitions.
pub fn resolve_item(
    index: &NumberingIndex,
    counter: &mut ListCounter,
    list_id: &str,
    level: u32,
) -> ListItemInfo {
    counter.visit(list_id, level);

    let prefix = index
        .format_of(list_id, 0)
        .0
        .map(format_prefix)
        .unwrap_or("")
        .to_string();

    let mut glyphs: Vec<String> = Vec::new();
    let mut last_kind: Option<NumericKind> = None;
    let mut last_format: Option<String> = None;
    let mut suffix = String::new();

    for lvl in 0..=level {
        let value = counter.value(index, list_id, lvl);
        let def = index.level(list_id, lvl);
        let kind = match def.and_then(|d| d.kind) {
            Some(kind) => kind,
            // Undefined kind: the definition stops here. Degrade to the
            // bare count so the item still carries a stable label.
            None => {
                return ListItemInfo {
                    list_id: list_id.to_string(),
                    level,
                    marker: Some(value.to_string()),
                    kind: None,
                    important: false,
                }
            }
        };
        let format = def.and_then(|d| d.format.clone());
        let glyph = match kind {
            NumericKind::Bullet => bullet_glyph(format.as_deref()),
            other => render_value(other, value),
        };
        suffix = format.as_deref().map(format_suffix).unwrap_or("").to_string();
        last_kind = Some(kind);
        last_format = format;
        glyphs.push(glyph);
    }

    let last_glyph = glyphs.last().map(String::as_str).unwrap_or("");
    let marker = if last_kind == Some(NumericKind::Bullet) {
        last_glyph.to_string()
    } else if is_alone(last_format.as_deref()) {
        format!("{}{}{}", prefix, last_glyph, suffix)
    } else {
        format!("{}{}{}", prefix, glyphs.join("."), suffix)
    };

    ListItemInfo {
        list_id: list_id.to_string(),
        level,
        marker: Some(marker),
        kind: last_kind,
        important: last_kind.map_or(false, |k| k.is_important()),
    }
}

/// Literal text before the first placeholder.
fn format_prefix(format: &str) -> &str {
    match format.find('%') {
        Some(pos) => &format[..pos],
        None => format,
    }
}

/// Literal text after the last `%N` placeholder.
fn format_suffix(format: &str) -> &str {
    let bytes = format.as_bytes();
    let mut last = None;
    for (pos, _) in format.match_indices('%') {
        if bytes.get(pos + 1).map_or(false, |b| b.is_ascii_digit()) {
            last = Some(pos);
        }
    }
    match last {
        Some(pos) => &format[pos + 2..],
        None => "",
    }
}

/// A template is "alone" when it holds exactly one `%N` placeholder.
fn is_alone(format: Option<&str>) -> bool {
    let Some(format) = format else {
        return false;
    };
    let bytes = format.as_bytes();
    format
        .match_indices('%')
        .filter(|(pos, _)| bytes.get(pos + 1).map_or(false, |b| b.is_ascii_digit()))
        .count()
        == 1
}

fn bullet_glyph(format: Option<&str>) -> String {
    let mut glyph = format.unwrap_or("•").to_string();
    for (from, to) in BULLET_SUBSTITUTIONS {
        glyph = glyph.replace(from, to);
    }
    if glyph.trim().is_empty() {
        "•".to_string()
    } else {
        glyph
    }
}

fn render_value(kind: NumericKind, value: i64) -> String {
    match kind {
        NumericKind::Decimal | NumericKind::None => value.to_string(),
        NumericKind::LowerLetter => letter(value, b'a'),
        NumericKind::UpperLetter => letter(value, b'A'),
        NumericKind::LowerRoman => to_roman(value).to_lowercase(),
        NumericKind::UpperRoman => to_roman(value),
        NumericKind::Bullet => "•".to_string(),
    }
}

/// `'a' + count - 1`; counts past the alphabet fall back to digits.
fn letter(value: i64, base: u8) -> String {
    if (1..=26).contains(&value) {
        char::from(base + (value - 1) as u8).to_string()
    } else {
        value.to_string()
    }
}

const ROMAN_TABLE: &[(i64, &str)] = &[
    (1000, "M"),
    (900, "CM"),
    (500, "D"),
    (400, "CD"),
    (100, "C"),
    (90, "XC"),
    (50, "L"),
    (40, "XL"),
    (10, "X"),
    (9, "IX"),
    (5, "V"),
    (4, "IV"),
    (1, "I"),
];

/// Upper-case Roman numeral; values outside 1..=3999 fall back to digits.
pub fn to_roman(value: i64) -> String {
    if !(1..=3999).contains(&value) {
        return value.to_string();
    }
    let mut remaining = value;
    let mut result = String::new();
    for &(worth, glyph) in ROMAN_TABLE {
        while remaining >= worth {
            result.push_str(glyph);
            remaining -= worth;
        }
    }
    result
}

/// Parse a Roman numeral (either case). Returns `None` on foreign glyphs.
pub fn parse_roman(text: &str) -> Option<i64> {
    let mut total = 0i64;
    let mut prev = 0i64;
    for c in text.chars() {
        let worth = match c.to_ascii_uppercase() {
            'I' => 1,
            'V' => 5,
            'X' => 10,
            'L' => 50,
            'C' => 100,
            'D' => 500,
            'M' => 1000,
            _ => return None,
        };
        total += worth;
        if worth > prev && prev > 0 {
            total -= 2 * prev;
        }
        prev = worth;
    }
    if total > 0 {
        Some(total)
    } else {
        None
    }
}
