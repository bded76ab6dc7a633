//! Font-size probe for documents without explicit heading styles.
//!
//! Runs once at document open. When any paragraph carries a `heading`
//! style the document is "structured" and font sizes are ignored.
//! Otherwise the most frequent run size becomes the body size, every
//! strictly larger size is assigned a heading level (1 for the largest,
//! then 2, 3, ...), and the body size itself lands one level deeper so it
//! never reads as a heading.

use std::collections::HashMap;

use crate::container::Element;

#[derive(Debug, Default)]
pub struct FontProbe {
    structured: bool,
    title: Option<String>,
    /// size (half-points) → synthesised heading level, body size included
    /// at `levels.len()`.
    levels: HashMap<u32, u32>,
}

impl FontProbe {
    /// Scan the element stream once.
    pub fn probe(elements: &[Element]) -> FontProbe {
        let mut counts: HashMap<u32, usize> = HashMap::new();
        let mut structured = false;
        let mut title = None;

        for element in elements {
            let Element::Paragraph(paragraph) = element else {
                continue;
            };
            if let Some(size) = paragraph.font_size() {
                *counts.entry(size).or_insert(0) += 1;
            }
            let text = paragraph.text.trim();
            if text.is_empty() {
                continue;
            }
            if paragraph.style == "title" {
                if title.is_none() {
                    title = Some(text.to_string());
                }
                continue;
            }
            if paragraph.style.starts_with("heading") {
                structured = true;
            }
        }

        let mut levels = HashMap::new();
        if !structured {
            // Ties on the body-size election break toward the smaller size
            // so the larger candidates keep their heading role.
            let body = counts
                .iter()
                .max_by(|a, b| a.1.cmp(b.1).then(b.0.cmp(a.0)))
                .map(|(size, _)| *size);
            if let Some(body) = body {
                let mut sizes: Vec<u32> = counts.keys().copied().collect();
                sizes.sort_unstable_by(|a, b| b.cmp(a));
                for (position, size) in sizes.iter().enumerate() {
                    levels.insert(*size, position as u32 + 1);
                    if *size == body {
                        break;
                    }
                }
            }
        }

        FontProbe {
            structured,
            title,
            levels,
        }
    }

    /// True when the document carries explicit heading styles.
    pub fn is_structured(&self) -> bool {
        self.structured
    }

    /// First `title`-styled paragraph, if any.
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Synthesised level for a paragraph's font size. Unknown and absent
    /// sizes land at the body level.
    pub fn level_of(&self, size: Option<u32>) -> u32 {
        size.and_then(|s| self.levels.get(&s))
            .copied()
            .unwrap_or(self.levels.len() as u32)
    }

    /// Whether a synthesised level reads as a heading (the body level and
    /// anything deeper does not).
    pub fn is_heading_level(&self, level: u32) -> bool {
        (level as usize) < self.levels.len()
    }
}
