//! Markdown rendering for absorbed tables.
//!
//! A single-cell table is just a boxed paragraph and renders as its text.
//! Anything larger becomes a pipe table: first row as header, a `---`
//! separator, remaining rows verbatim. Columns that are merged into their
//! left neighbour in every row are suppressed, and rows shorter than the
//! header are padded with single-space cells.

use crate::container::Table;

/// Render a table to the text absorbed by the current context.
pub fn render_table(table: &Table) -> String {
    if table.is_single_cell() {
        return table
            .rows
            .first()
            .and_then(|row| row.first())
            .map(|cell| cell.text.trim().to_string())
            .unwrap_or_default();
    }

    let column_count = table.rows.iter().map(|row| row.len()).max().unwrap_or(0);
    let row_count = table.rows.len();

    // A column is fully merged when every row's entry repeats the cell to
    // its left.
    let merged_columns: Vec<bool> = (0..column_count)
        .map(|col| {
            col > 0
                && row_count > 0
                && table
                    .rows
                    .iter()
                    .all(|row| row.get(col).map_or(false, |cell| cell.merged_left))
        })
        .collect();

    let mut lines: Vec<String> = Vec::new();
    let mut header_width = 0usize;
    let mut first_row = true;

    for row in &table.rows {
        let mut cells: Vec<String> = Vec::new();
        for (col, cell) in row.iter().enumerate() {
            if merged_columns.get(col).copied().unwrap_or(false) {
                continue;
            }
            let content = escape_cell(&cell.text);
            cells.push(if content.is_empty() {
                "---".to_string()
            } else {
                content
            });
        }
        // Inconsistent row widths are padded rather than rejected.
        while cells.len() < header_width {
            cells.push(" ".to_string());
        }
        if !cells.is_empty() {
            lines.push(format!("|{}|", cells.join("|")));
        }
        if first_row {
            lines.push(format!("|{}|", vec!["---"; cells.len()].join("|")));
            first_row = false;
            header_width = cells.len();
        }
    }

    format!("\n{}", lines.join("\n"))
}

fn escape_cell(text: &str) -> String {
    text.trim().replace('|', "\\|")
}
