//! Plain-text rendering of a table page.

use unicode_width::UnicodeWidthChar;
use unicode_width::UnicodeWidthStr;

use super::column::Cell;
use super::column::Column;
use super::column::ColumnWidth;
use super::row::Row;

const COLUMN_GAP: &str = "  ";
const ELLIPSIS: char = '…';

/// Text shown for a cell.
///
/// Enabled controls render as `[label]`, disabled ones as `(label)`.
pub fn cell_text<T>(column: &Column<T>, row: &Row<T>) -> String {
    match column.render(row) {
        Cell::Empty => String::new(),
        Cell::Text(text) => text,
        Cell::Control(control) if row.is_action_enabled(&control.action) => {
            format!("[{}]", control.label)
        }
        Cell::Control(control) => format!("({})", control.label),
    }
}

/// Lay out a header line, a separator and one line per row.
///
/// Widths are measured in terminal columns, so wide characters align.
pub fn render_text<T>(columns: &[Column<T>], rows: &[Row<T>]) -> Vec<String> {
    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| columns.iter().map(|column| cell_text(column, row)).collect())
        .collect();

    let widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(i, column)| match column.width() {
            ColumnWidth::Fixed(width) => width as usize,
            ColumnWidth::Auto => cells
                .iter()
                .map(|line| line[i].width())
                .chain(std::iter::once(column.header().width()))
                .max()
                .unwrap_or(0),
        })
        .collect();

    let mut lines = Vec::with_capacity(rows.len() + 2);
    lines.push(join(columns.iter().map(|c| c.header()), &widths));
    lines.push(
        widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join(COLUMN_GAP),
    );
    for line in &cells {
        lines.push(join(line.iter().map(String::as_str), &widths));
    }
    lines
}

fn join<'a>(values: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    let padded: Vec<String> = values
        .zip(widths)
        .map(|(value, width)| pad(&truncate(value, *width), *width))
        .collect();
    padded.join(COLUMN_GAP).trim_end().to_string()
}

/// Cut `value` to at most `width` columns, marking the cut with an ellipsis.
pub fn truncate(value: &str, width: usize) -> String {
    if value.width() <= width {
        return value.to_string();
    }
    if width == 0 {
        return String::new();
    }

    let mut out = String::new();
    let mut used = 0;
    for ch in value.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w > width - 1 {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push(ELLIPSIS);
    out
}

fn pad(value: &str, width: usize) -> String {
    let fill = width.saturating_sub(value.width());
    format!("{}{}", value, " ".repeat(fill))
}
