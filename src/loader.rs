use crate::cell::CellValue;
use crate::error::{Error, Result};
use crate::spreadsheet::{Sheet, Workbook};
use calamine::{Data, Reader, SheetVisible, Xlsx, open_workbook};
use std::path::Path;

/// Load a workbook from an Excel file
///
/// Every sheet is imported with its visibility, its values and its formulas.
/// A formula cell keeps the formula text and the value Excel last computed
/// for it, so the preview shows what the operator sees in Excel.
///
/// # Arguments
/// * `filepath` - Path to the `.xlsx` file
///
/// # Returns
/// * `Result<Workbook>` - The loaded workbook, `WorkbookNotFound` if the file is missing
///
/// # Examples
/// ```no_run
/// use container_entry::loader::from_excel;
///
/// match from_excel("containers.xlsx") {
///     Ok(wb) => println!("{} sheets", wb.sheets.len()),
///     Err(e) => eprintln!("Error loading Excel: {}", e),
/// }
/// ```
pub fn from_excel(filepath: impl AsRef<Path>) -> Result<Workbook> {
    let path = filepath.as_ref();
    if !path.exists() {
        return Err(Error::WorkbookNotFound {
            path: path.to_path_buf(),
        });
    }

    let read_err = |source| Error::Read {
        path: path.to_path_buf(),
        source,
    };

    let mut excel: Xlsx<_> = open_workbook(path).map_err(read_err)?;
    let metadata = excel.sheets_metadata().to_vec();

    let mut workbook = Workbook::new();
    for meta in metadata {
        let mut sheet = Sheet::new(meta.name.clone());
        sheet.visible = matches!(meta.visible, SheetVisible::Visible);

        let range = excel.worksheet_range(&meta.name).map_err(read_err)?;
        if let Some((row0, col0)) = range.start() {
            for (r, c, data) in range.used_cells() {
                let row = row0 + r as u32 + 1;
                let col = col0 + c as u32 + 1;
                sheet.set(row, col, convert(data))?;
            }
        }

        let formulas = excel.worksheet_formula(&meta.name).map_err(read_err)?;
        if let Some((row0, col0)) = formulas.start() {
            for (r, c, expr) in formulas.used_cells() {
                let row = row0 + r as u32 + 1;
                let col = col0 + c as u32 + 1;
                let cached = sheet
                    .get(row, col)
                    .filter(|v| !v.is_blank())
                    .map(|v| v.to_string());
                let expr = expr.strip_prefix('=').unwrap_or(expr.as_str()).to_string();
                sheet.set(row, col, CellValue::Formula { expr, cached })?;
            }
        }

        log::debug!(
            "loaded sheet '{}' ({} cells, visible: {})",
            sheet.name,
            sheet.cells.len(),
            sheet.visible
        );
        workbook.add_sheet(sheet);
    }

    Ok(workbook)
}

fn convert(data: &Data) -> CellValue {
    match data {
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::String(s) => CellValue::text(s.as_str()),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => CellValue::Date(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::text(s.as_str()),
        Data::Error(e) => CellValue::Text(e.to_string()),
        Data::Empty => CellValue::Empty,
    }
}

