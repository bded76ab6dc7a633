//! Streaming parser for the `word/document.xml` body.
//!
//! Walks the body events once and materialises paragraphs and tables in
//! their original interleaved order. Section properties and unknown tags
//! pass through transparently; only the handful of `w:` elements the
//! chunker cares about are interpreted.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use unicode_normalization::UnicodeNormalization;

use super::element::{Cell, Element, NumberingRef, Paragraph, Run, Table};

/// Extract an attribute value by key from an XML element.
fn attr_value(e: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.as_ref() == key)
        .and_then(|a| a.unescape_value().ok().map(|value| value.into_owned()))
}

#[derive(Default)]
struct ParaState {
    style: Option<String>,
    runs: Vec<Run>,
    run: Option<Run>,
    num_id: Option<String>,
    ilvl: Option<u32>,
    page_break: bool,
    in_ppr: bool,
    in_rpr: bool,
    in_text: bool,
}

impl ParaState {
    fn finish(self) -> Paragraph {
        let text: String = self
            .runs
            .iter()
            .map(|run| run.text.as_str())
            .collect::<String>()
            .nfc()
            .collect();
        let numbering = match (self.num_id, self.ilvl) {
            (Some(num_id), Some(ilvl)) => Some(NumberingRef { num_id, ilvl }),
            (Some(num_id), None) => Some(NumberingRef { num_id, ilvl: 0 }),
            _ => None,
        };
        Paragraph {
            style: self
                .style
                .map(|s| s.to_lowercase())
                .unwrap_or_else(|| "normal".to_string()),
            text,
            runs: self.runs,
            numbering,
            page_break: self.page_break,
        }
    }
}

#[derive(Default)]
struct RawCell {
    paragraphs: Vec<String>,
    current: String,
    grid_span: u32,
    vmerge_continue: bool,
    in_tcpr: bool,
    in_text: bool,
}

#[derive(Default)]
struct TableState {
    rows: Vec<Vec<PendingCell>>,
    row: Option<Vec<PendingCell>>,
    cell: Option<RawCell>,
}

struct PendingCell {
    text: String,
    merged_left: bool,
    vmerge_continue: bool,
}

impl TableState {
    fn finish(self) -> Table {
        // Resolve vertical-merge continuations: the continuation cell takes
        // the text of the cell directly above it.
        let mut rows: Vec<Vec<Cell>> = Vec::new();
        for pending_row in self.rows {
            let mut row: Vec<Cell> = Vec::new();
            for (col, pending) in pending_row.into_iter().enumerate() {
                let text = if pending.vmerge_continue {
                    rows.last()
                        .and_then(|above| above.get(col))
                        .map(|cell| cell.text.clone())
                        .unwrap_or(pending.text)
                } else {
                    pending.text
                };
                row.push(Cell {
                    text,
                    merged_left: pending.merged_left,
                });
            }
            rows.push(row);
        }
        Table { rows }
    }
}

/// Parse the document body into its ordered element stream.
pub fn parse_body(xml: &str) -> Result<Vec<Element>, quick_xml::Error> {
    let mut reader = Reader::from_reader(xml.as_bytes());
    let mut buf = Vec::new();

    let mut elements = Vec::new();
    let mut para: Option<ParaState> = None;
    let mut table: Option<TableState> = None;
    let mut table_depth = 0usize;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(ref e) => {
                let name = e.name().as_ref().to_vec();
                handle_start(&name, e, &mut para, &mut table, &mut table_depth);
            }
            Event::Empty(ref e) => {
                let name = e.name().as_ref().to_vec();
                handle_start(&name, e, &mut para, &mut table, &mut table_depth);
                handle_end(&name, &mut para, &mut table, &mut table_depth, &mut elements);
            }
            Event::End(ref e) => {
                let name = e.name().as_ref().to_vec();
                handle_end(&name, &mut para, &mut table, &mut table_depth, &mut elements);
            }
            Event::Text(ref t) => {
                let text = t.unescape()?.into_owned();
                push_text(&text, &mut para, &mut table);
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(elements)
}

fn push_text(text: &str, para: &mut Option<ParaState>, table: &mut Option<TableState>) {
    if let Some(state) = table.as_mut() {
        if let Some(cell) = state.cell.as_mut() {
            if cell.in_text {
                cell.current.push_str(text);
            }
        }
        return;
    }
    if let Some(state) = para.as_mut() {
        if state.in_text {
            if let Some(run) = state.run.as_mut() {
                run.text.push_str(text);
            }
        }
    }
}

fn handle_start(
    name: &[u8],
    e: &BytesStart<'_>,
    para: &mut Option<ParaState>,
    table: &mut Option<TableState>,
    table_depth: &mut usize,
) {
    match name {
        b"w:tbl" => {
            *table_depth += 1;
            if *table_depth == 1 {
                *table = Some(TableState::default());
            }
        }
        b"w:tr" if *table_depth == 1 => {
            if let Some(state) = table.as_mut() {
                state.row = Some(Vec::new());
            }
        }
        b"w:tc" if *table_depth == 1 => {
            if let Some(state) = table.as_mut() {
                state.cell = Some(RawCell::default());
            }
        }
        b"w:tcPr" => {
            if let Some(cell) = table.as_mut().and_then(|s| s.cell.as_mut()) {
                cell.in_tcpr = true;
            }
        }
        b"w:gridSpan" => {
            if let Some(cell) = table.as_mut().and_then(|s| s.cell.as_mut()) {
                if cell.in_tcpr {
                    cell.grid_span = attr_value(e, b"w:val")
                        .and_then(|v| v.parse::<u32>().ok())
                        .unwrap_or(1);
                }
            }
        }
        b"w:vMerge" => {
            if let Some(cell) = table.as_mut().and_then(|s| s.cell.as_mut()) {
                if cell.in_tcpr {
                    let restart = attr_value(e, b"w:val").map_or(false, |v| v == "restart");
                    cell.vmerge_continue = !restart;
                }
            }
        }
        b"w:p" => {
            if table.is_none() {
                *para = Some(ParaState::default());
            }
        }
        b"w:pPr" => {
            if let Some(state) = para.as_mut() {
                state.in_ppr = true;
            }
        }
        b"w:pStyle" => {
            if let Some(state) = para.as_mut() {
                if state.in_ppr {
                    state.style = attr_value(e, b"w:val");
                }
            }
        }
        b"w:ilvl" => {
            if let Some(state) = para.as_mut() {
                if state.in_ppr {
                    state.ilvl = attr_value(e, b"w:val").and_then(|v| v.parse::<u32>().ok());
                }
            }
        }
        b"w:numId" => {
            if let Some(state) = para.as_mut() {
                if state.in_ppr {
                    state.num_id = attr_value(e, b"w:val");
                }
            }
        }
        b"w:r" => {
            if let Some(state) = para.as_mut() {
                state.run = Some(Run::default());
            }
        }
        b"w:rPr" => {
            if let Some(state) = para.as_mut() {
                state.in_rpr = true;
            }
        }
        b"w:sz" => {
            if let Some(state) = para.as_mut() {
                if state.in_rpr && !state.in_ppr {
                    if let Some(run) = state.run.as_mut() {
                        run.size = attr_value(e, b"w:val").and_then(|v| v.parse::<u32>().ok());
                    }
                }
            }
        }
        b"w:t" => {
            if let Some(cell) = table.as_mut().and_then(|s| s.cell.as_mut()) {
                cell.in_text = true;
            } else if let Some(state) = para.as_mut() {
                state.in_text = true;
            }
        }
        b"w:tab" => {
            if let Some(state) = para.as_mut() {
                if let Some(run) = state.run.as_mut() {
                    run.text.push('\t');
                }
            }
        }
        b"w:br" => {
            if let Some(state) = para.as_mut() {
                if attr_value(e, b"w:type").map_or(false, |v| v == "page") {
                    state.page_break = true;
                }
            }
        }
        b"w:lastRenderedPageBreak" => {
            if let Some(state) = para.as_mut() {
                state.page_break = true;
            }
        }
        _ => {}
    }
}

fn handle_end(
    name: &[u8],
    para: &mut Option<ParaState>,
    table: &mut Option<TableState>,
    table_depth: &mut usize,
    elements: &mut Vec<Element>,
) {
    match name {
        b"w:tbl" => {
            if *table_depth > 0 {
                *table_depth -= 1;
            }
            if *table_depth == 0 {
                if let Some(state) = table.take() {
                    elements.push(Element::Table(state.finish()));
                }
            }
        }
        b"w:tr" if *table_depth == 1 => {
            if let Some(state) = table.as_mut() {
                if let Some(row) = state.row.take() {
                    state.rows.push(row);
                }
            }
        }
        b"w:tc" if *table_depth == 1 => {
            if let Some(state) = table.as_mut() {
                if let Some(mut cell) = state.cell.take() {
                    if !cell.current.is_empty() {
                        cell.paragraphs.push(std::mem::take(&mut cell.current));
                    }
                    let text: String = cell
                        .paragraphs
                        .join("\n")
                        .trim()
                        .nfc()
                        .collect::<String>();
                    if let Some(row) = state.row.as_mut() {
                        row.push(PendingCell {
                            text: text.clone(),
                            merged_left: false,
                            vmerge_continue: cell.vmerge_continue,
                        });
                        for _ in 1..cell.grid_span.max(1) {
                            row.push(PendingCell {
                                text: text.clone(),
                                merged_left: true,
                                vmerge_continue: cell.vmerge_continue,
                            });
                        }
                    }
                }
            }
        }
        b"w:tcPr" => {
            if let Some(cell) = table.as_mut().and_then(|s| s.cell.as_mut()) {
                cell.in_tcpr = false;
            }
        }
        b"w:p" => {
            if let Some(state) = table.as_mut() {
                if let Some(cell) = state.cell.as_mut() {
                    cell.paragraphs.push(std::mem::take(&mut cell.current));
                }
                return;
            }
            if let Some(state) = para.take() {
                elements.push(Element::Paragraph(state.finish()));
            }
        }
        b"w:pPr" => {
            if let Some(state) = para.as_mut() {
                state.in_ppr = false;
            }
        }
        b"w:rPr" => {
            if let Some(state) = para.as_mut() {
                state.in_rpr = false;
            }
        }
        b"w:r" => {
            if let Some(state) = para.as_mut() {
                if let Some(run) = state.run.take() {
                    state.runs.push(run);
                }
            }
        }
        b"w:t" => {
            if let Some(cell) = table.as_mut().and_then(|s| s.cell.as_mut()) {
                cell.in_text = false;
            } else if let Some(state) = para.as_mut() {
                state.in_text = false;
            }
        }
        _ => {}
    }
}
