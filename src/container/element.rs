//! Body element types produced by the container reader.
//!
//! The reader flattens the document body into an ordered stream of
//! [`Element`]s. Classification happens later, in the outline builder; the
//! types here only carry what the body XML exposes: style names, run text
//! and font sizes, numbering references, page-break markers, and table
//! cell grids.

/// A single body element in document order.
#[derive(Debug, Clone)]
pub enum Element {
    Paragraph(Paragraph),
    Table(Table),
}

/// A paragraph with its style metadata and runs.
#[derive(Debug, Clone, Default)]
pub struct Paragraph {
    /// Style identifier, lower-cased (e.g. `heading 1`, `listparagraph`).
    pub style: String,
    /// Concatenated run text, normalised to NFC.
    pub text: String,
    pub runs: Vec<Run>,
    /// Resolved numbering properties, when the paragraph carries `w:numPr`.
    pub numbering: Option<NumberingRef>,
    /// True when the paragraph contains a hard page break or a rendered
    /// page-break sentinel.
    pub page_break: bool,
}

impl Paragraph {
    /// Font size of the first run that declares one, in half-points.
    pub fn font_size(&self) -> Option<u32> {
        self.runs.iter().find_map(|run| run.size)
    }
}

/// A text run with an optional explicit font size (half-points).
#[derive(Debug, Clone, Default)]
pub struct Run {
    pub text: String,
    pub size: Option<u32>,
}

/// Reference into the numbering-definition part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberingRef {
    pub num_id: String,
    pub ilvl: u32,
}

/// A table as a grid of cells. Horizontally merged cells are repeated so
/// that every row has one entry per grid column; repeats are flagged with
/// [`Cell::merged_left`] so fully-merged columns can be collapsed later.
#[derive(Debug, Clone, Default)]
pub struct Table {
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn is_single_cell(&self) -> bool {
        self.rows.len() == 1 && self.rows.first().map_or(false, |row| row.len() == 1)
    }
}

/// One table cell: trimmed, NFC-normalised text.
#[derive(Debug, Clone)]
pub struct Cell {
    pub text: String,
    /// True when this entry repeats the cell to its left (horizontal merge).
    pub merged_left: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn font_size_prefers_first_sized_run() {
        let paragraph = Paragraph {
            runs: vec![
                Run {
                    text: "a".to_string(),
                    size: None,
                },
                Run {
                    text: "b".to_string(),
                    size: Some(28),
                },
                Run {
                    text: "c".to_string(),
                    size: Some(22),
                },
            ],
            ..Paragraph::default()
        };
        assert_eq!(paragraph.font_size(), Some(28));
    }

    #[test]
    fn single_cell_table_detection() {
        let single = Table {
            rows: vec![vec![Cell {
                text: "only".to_string(),
                merged_left: false,
            }]],
        };
        assert!(single.is_single_cell());

        let empty = Table::default();
        assert!(!empty.is_single_cell());
    }
}
