use crate::cell::CellValue;
use crate::error::{Error, Result};
use crate::loader::from_excel;
use crate::saving::{WorkbookEdits, save_edits};
use crate::settings::EntryLayout;
use crate::spreadsheet::{MAX_COLS, MAX_ROWS, Sheet, Workbook, cell_name, check_bounds};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

/// Cells around the next insertion row, ready for the preview table.
#[derive(Clone, Debug, PartialEq)]
pub struct PreviewWindow {
    /// Values keyed by `(row, col)`; blank cells are absent.
    pub cells: BTreeMap<(u32, u32), CellValue>,
    pub next_row: u32,
    pub min_row: u32,
    pub max_row: u32,
    pub start_col: u32,
    pub num_cols: usize,
    pub stt_col: Option<u32>,
}

impl PreviewWindow {
    pub fn columns(&self) -> impl Iterator<Item = u32> + '_ {
        self.start_col..self.start_col.saturating_add(self.num_cols as u32)
    }

    pub fn rows(&self) -> impl Iterator<Item = u32> + '_ {
        self.min_row..=self.max_row
    }
}

type CacheKey = (String, u32, u32, usize);

/// Owns the open workbook and remembers where each sheet's next empty row is.
///
/// Cells changed since the last save are tracked per sheet; `save` writes
/// only those back into the file.
pub struct ExcelManager {
    path: PathBuf,
    workbook: Workbook,
    last_empty_row_cache: HashMap<CacheKey, u32>,
    unsaved: BTreeMap<String, BTreeSet<(u32, u32)>>,
}

impl ExcelManager {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let workbook = from_excel(&path)?;
        log::info!(
            "opened workbook {} ({} sheets)",
            path.display(),
            workbook.sheets.len()
        );
        Ok(ExcelManager {
            path,
            workbook,
            last_empty_row_cache: HashMap::new(),
            unsaved: BTreeMap::new(),
        })
    }

    pub fn workbook(&self) -> &Workbook {
        &self.workbook
    }

    /// Re-read the file from disk, dropping every cached position and
    /// every unsaved change.
    pub fn reload(&mut self) -> Result<()> {
        self.workbook = from_excel(&self.path)?;
        self.unsaved.clear();
        self.clear_last_empty_row_cache(None);
        log::info!("reloaded workbook {}", self.path.display());
        Ok(())
    }

    pub fn sheet_names(&self) -> Vec<String> {
        self.workbook.visible_sheet_names()
    }

    pub fn get_sheet(&self, sheet_name: &str) -> Result<&Sheet> {
        self.workbook.sheet(sheet_name)
    }

    /// First row at or below `start_row` whose `start_col` cell is blank.
    pub fn get_last_empty_row(
        &mut self,
        sheet_name: &str,
        start_row: u32,
        start_col: u32,
        num_fields: usize,
    ) -> Result<u32> {
        let key = (sheet_name.to_string(), start_row, start_col, num_fields);
        if let Some(row) = self.last_empty_row_cache.get(&key) {
            log::debug!("row cache hit for '{}': {}", sheet_name, row);
            return Ok(*row);
        }

        let sheet = self.workbook.sheet(sheet_name)?;
        let mut row = start_row.max(1);
        check_bounds(row, start_col)?;
        while !sheet.is_blank(row, start_col) {
            row += 1;
        }
        check_bounds(row, start_col)?;
        log::debug!("row cache miss for '{}': scanned to {}", sheet_name, row);
        self.last_empty_row_cache.insert(key, row);
        Ok(row)
    }

    /// Forget cached positions for one sheet, or for all of them.
    pub fn clear_last_empty_row_cache(&mut self, sheet_name: Option<&str>) {
        match sheet_name {
            Some(name) => self.last_empty_row_cache.retain(|k, _| k.0 != name),
            None => self.last_empty_row_cache.clear(),
        }
    }

    /// Append `data` on the next empty row. Nothing is written unless every
    /// target cell is inside the sheet and blank.
    pub fn write_row(
        &mut self,
        sheet_name: &str,
        start_row: u32,
        start_col: u32,
        data: &[CellValue],
    ) -> Result<u32> {
        let row = self.get_last_empty_row(sheet_name, start_row, start_col, data.len())?;
        let cols = row_span(row, start_col, data.len())?;
        let sheet = self.workbook.sheet_mut(sheet_name)?;

        for col in cols.clone() {
            if !sheet.is_blank(row, col) {
                return Err(Error::CellOccupied { row, col });
            }
        }
        for (col, value) in cols.clone().zip(data) {
            sheet.set(row, col, value.clone())?;
        }

        self.mark_unsaved(sheet_name, row, cols.clone());
        self.clear_last_empty_row_cache(Some(sheet_name));
        log::info!(
            "wrote {} cells to '{}' {}:{}",
            data.len(),
            sheet_name,
            cell_name(row, *cols.start()),
            cell_name(row, *cols.end())
        );
        Ok(row)
    }

    pub fn write_cell(
        &mut self,
        sheet_name: &str,
        row: u32,
        col: u32,
        value: CellValue,
    ) -> Result<()> {
        self.workbook.sheet_mut(sheet_name)?.set(row, col, value)?;
        self.mark_unsaved(sheet_name, row, col..=col);
        self.clear_last_empty_row_cache(Some(sheet_name));
        Ok(())
    }

    /// Blank exactly `num_fields` cells of `row` from `start_col` on.
    pub fn undo_row(
        &mut self,
        sheet_name: &str,
        row: u32,
        start_col: u32,
        num_fields: usize,
    ) -> Result<()> {
        let cols = row_span(row, start_col, num_fields)?;
        let sheet = self.workbook.sheet_mut(sheet_name)?;
        for col in cols.clone() {
            sheet.clear(row, col);
        }
        self.mark_unsaved(sheet_name, row, cols.clone());
        self.clear_last_empty_row_cache(Some(sheet_name));
        log::info!(
            "cleared '{}' {}:{}",
            sheet_name,
            cell_name(row, *cols.start()),
            cell_name(row, *cols.end())
        );
        Ok(())
    }

    pub fn row_is_empty(
        &self,
        sheet_name: &str,
        row: u32,
        start_col: u32,
        num_fields: usize,
    ) -> Result<bool> {
        let sheet = self.workbook.sheet(sheet_name)?;
        Ok(row_span(row, start_col, num_fields)?.all(|col| sheet.is_blank(row, col)))
    }

    fn mark_unsaved(&mut self, sheet_name: &str, row: u32, cols: RangeInclusive<u32>) {
        let cells = self.unsaved.entry(sheet_name.to_string()).or_default();
        cells.extend(cols.map(|col| (row, col)));
    }

    /// Whether any change is waiting for `save`.
    pub fn has_unsaved_changes(&self) -> bool {
        self.unsaved.values().any(|cells| !cells.is_empty())
    }

    /// Cells `preview_range` rows either side of the next empty row,
    /// including the STT column when the layout has one.
    pub fn preview_rows(
        &mut self,
        sheet_name: &str,
        layout: &EntryLayout,
        preview_range: u32,
    ) -> Result<PreviewWindow> {
        let next_row = self.get_last_empty_row(
            sheet_name,
            layout.start_row,
            layout.start_col,
            layout.num_fields,
        )?;
        let min_row = next_row.saturating_sub(preview_range).max(1);
        let max_row = next_row.saturating_add(preview_range).min(MAX_ROWS);
        let start_col = layout.preview_start_col();
        check_bounds(next_row, start_col)?;
        let num_cols = layout
            .preview_num_fields()
            .min((MAX_COLS - start_col + 1) as usize);

        let sheet = self.workbook.sheet(sheet_name)?;
        let mut cells = BTreeMap::new();
        for col in start_col..start_col + num_cols as u32 {
            for row in min_row..=max_row {
                if let Some(value) = sheet.get(row, col).filter(|v| !v.is_blank()) {
                    cells.insert((row, col), value.clone());
                }
            }
        }

        Ok(PreviewWindow {
            cells,
            next_row,
            min_row,
            max_row,
            start_col,
            num_cols,
            stt_col: layout.stt_col,
        })
    }

    /// Write every cell changed since the last save into the workbook file.
    /// The rest of the file, formatting included, is left as it is.
    pub fn save(&mut self) -> Result<()> {
        let mut edits = WorkbookEdits::new();
        for (sheet_name, cells) in &self.unsaved {
            let sheet = self.workbook.sheet(sheet_name)?;
            let sheet_edits = edits.entry(sheet_name.clone()).or_default();
            for &(row, col) in cells {
                let value = sheet.get(row, col).cloned().unwrap_or_default();
                sheet_edits.entry(row).or_default().insert(col, value);
            }
        }
        save_edits(&self.path, &edits)?;
        self.unsaved.clear();
        Ok(())
    }
}

/// Columns `start_col ..` covering `num_fields` cells of `row`, all inside the sheet.
fn row_span(row: u32, start_col: u32, num_fields: usize) -> Result<RangeInclusive<u32>> {
    check_bounds(row, start_col)?;
    if num_fields == 0 {
        return Ok(start_col..=start_col - 1);
    }
    let extra = u32::try_from(num_fields - 1).unwrap_or(u32::MAX);
    let end_col = start_col.saturating_add(extra);
    check_bounds(row, end_col)?;
    Ok(start_col..=end_col)
}
