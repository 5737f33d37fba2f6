//! Fixed-width text rendering of the rows around the next insertion point.

use crate::manager::PreviewWindow;
use crate::spreadsheet::col_to_letter;

const MIN_WIDTH: usize = 5;
const MARKER: &str = ">>> ";
const INDENT: &str = "    ";

pub fn render_missing() -> String {
    "workbook or sheet not found".to_string()
}

/// Render `window` as a table, marking the next insertion row with `>>>`.
///
/// ```text
///     +-------+-------+
///     |  STT  |   B   |
///     +-------+-------+
///     |   1   | 04/05 |
///     +-------+-------+
/// >>> |       |       |
///     +-------+-------+
/// ```
pub fn render(window: &PreviewWindow) -> String {
    let columns: Vec<u32> = window.columns().collect();
    let headers: Vec<String> = columns
        .iter()
        .map(|&col| {
            if window.stt_col == Some(col) {
                "STT".to_string()
            } else {
                col_to_letter(col)
            }
        })
        .collect();

    let rows: Vec<(u32, Vec<String>)> = window
        .rows()
        .map(|row| {
            let values = columns
                .iter()
                .map(|&col| {
                    window
                        .cells
                        .get(&(row, col))
                        .map(|v| v.to_string())
                        .unwrap_or_default()
                })
                .collect();
            (row, values)
        })
        .collect();

    let widths: Vec<usize> = (0..columns.len())
        .map(|i| {
            rows.iter()
                .map(|(_, values)| width_of(&values[i]))
                .chain(std::iter::once(width_of(&headers[i])))
                .chain(std::iter::once(MIN_WIDTH))
                .max()
                .unwrap_or(MIN_WIDTH)
        })
        .collect();

    let separator = format!(
        "+-{}-+",
        widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("-+-")
    );

    let mut out = String::new();
    push_line(&mut out, INDENT, &separator);
    push_line(&mut out, INDENT, &table_line(&headers, &widths));
    push_line(&mut out, INDENT, &separator);
    for (row, values) in &rows {
        let prefix = if *row == window.next_row { MARKER } else { INDENT };
        push_line(&mut out, prefix, &table_line(values, &widths));
        push_line(&mut out, INDENT, &separator);
    }
    out
}

fn push_line(out: &mut String, prefix: &str, line: &str) {
    out.push_str(prefix);
    out.push_str(line);
    out.push('\n');
}

fn table_line(values: &[String], widths: &[usize]) -> String {
    let cells: Vec<String> = values
        .iter()
        .zip(widths)
        .map(|(v, w)| center(v, *w))
        .collect();
    format!("| {} |", cells.join(" | "))
}

fn width_of(s: &str) -> usize {
    s.chars().count()
}

fn center(s: &str, width: usize) -> String {
    let pad = width.saturating_sub(width_of(s));
    let left = pad / 2;
    format!("{}{}{}", " ".repeat(left), s, " ".repeat(pad - left))
}
