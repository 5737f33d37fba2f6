use crate::cell::CellValue;
use crate::error::{Error, Result};
use crate::form::EntryForm;
use crate::manager::ExcelManager;
use crate::preview;
use crate::record::{ContainerRecord, Field};
use crate::settings::{EntryLayout, Settings};
use crate::spreadsheet::{col_to_letter, letter_to_col};
use std::path::{Path, PathBuf};

/// Where the last saved record went, so it can be taken back.
#[derive(Clone, Debug, PartialEq)]
pub struct LastEntry {
    pub sheet: String,
    pub row: u32,
    pub start_col: u32,
    pub num_fields: usize,
    pub stt_col: Option<u32>,
    pub record: ContainerRecord,
}

/// One operator session: the open workbook, the settings and the form.
pub struct Session {
    workbook_path: PathBuf,
    manager: Option<ExcelManager>,
    settings: Settings,
    settings_path: PathBuf,
    form: EntryForm,
    last_entry: Option<LastEntry>,
    preview_range: u32,
}

impl Session {
    /// Open the workbook and settings. A missing workbook is not fatal: the
    /// form starts empty and every write reports the missing file.
    pub fn open(
        workbook_path: impl AsRef<Path>,
        settings_path: impl AsRef<Path>,
        preview_range: u32,
    ) -> Result<Self> {
        let workbook_path = workbook_path.as_ref().to_path_buf();
        let settings_path = settings_path.as_ref().to_path_buf();
        let settings = Settings::load(&settings_path)?;

        let manager = match ExcelManager::open(&workbook_path) {
            Ok(manager) => Some(manager),
            Err(Error::WorkbookNotFound { path }) => {
                log::warn!("workbook {} not found", path.display());
                None
            }
            Err(e) => return Err(e),
        };
        let sheets = manager
            .as_ref()
            .map(ExcelManager::sheet_names)
            .unwrap_or_default();

        Ok(Session {
            workbook_path,
            manager,
            settings,
            settings_path,
            form: EntryForm::new(sheets),
            last_entry: None,
            preview_range,
        })
    }

    pub fn form(&self) -> &EntryForm {
        &self.form
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn last_entry(&self) -> Option<&LastEntry> {
        self.last_entry.as_ref()
    }

    fn require_workbook(&self) -> Result<()> {
        match self.manager {
            Some(_) => Ok(()),
            None => Err(Error::WorkbookNotFound {
                path: self.workbook_path.clone(),
            }),
        }
    }

    fn manager_mut(&mut self) -> Result<&mut ExcelManager> {
        let path = &self.workbook_path;
        self.manager.as_mut().ok_or_else(|| Error::WorkbookNotFound {
            path: path.clone(),
        })
    }

    fn selected_sheet(&self) -> Result<String> {
        self.form
            .selected_sheet()
            .map(str::to_string)
            .ok_or(Error::NoSheetSelected)
    }

    fn layout(&self, sheet: &str) -> EntryLayout {
        self.settings.position(sheet).layout(Field::COUNT)
    }

    pub fn select_sheet(&mut self, name: &str) -> Result<()> {
        self.form.select_sheet(name)
    }

    pub fn set_field(&mut self, field: Field, value: &str) -> Result<()> {
        self.form.set(field, value)
    }

    /// Write the form as a new row, then clear the form.
    pub fn save_entry(&mut self) -> Result<String> {
        self.require_workbook()?;
        let sheet = self.selected_sheet()?;
        let layout = self.layout(&sheet);
        let record = self.form.record().clone();
        let data = record.to_row();

        let manager = self.manager_mut()?;
        let row = manager.write_row(&sheet, layout.start_row, layout.start_col, &data)?;
        if let Some(stt_col) = layout.stt_col {
            manager.write_cell(&sheet, row, stt_col, CellValue::from(layout.stt_for(row)))?;
        }
        manager.save()?;

        self.last_entry = Some(LastEntry {
            sheet,
            row,
            start_col: layout.start_col,
            num_fields: data.len(),
            stt_col: layout.stt_col,
            record,
        });
        self.form.reset_after_save();
        Ok(format!("saved to row {}", row))
    }

    /// Take back the last saved row and put its values back on the form.
    pub fn undo_last_entry(&mut self) -> Result<String> {
        self.require_workbook()?;
        let Some(entry) = self.last_entry.clone() else {
            return Ok("nothing to undo".to_string());
        };

        let manager = self.manager_mut()?;
        manager.undo_row(&entry.sheet, entry.row, entry.start_col, entry.num_fields)?;
        if let Some(stt_col) = entry.stt_col {
            manager.undo_row(&entry.sheet, entry.row, stt_col, 1)?;
        }
        manager.save()?;

        // The sheet may have been hidden by a reload; the values still come back.
        if self.form.sheets().contains(&entry.sheet) {
            self.form.select_sheet(&entry.sheet)?;
        } else {
            log::warn!("sheet '{}' can no longer be selected", entry.sheet);
        }
        self.form.restore(entry.record);
        self.settings.set_start_row(&entry.sheet, entry.row);
        self.settings.save(&self.settings_path)?;
        self.last_entry = None;

        log::info!("undid row {} on '{}'", entry.row, entry.sheet);
        Ok(format!(
            "undid row {} on sheet {}; values are back on the form",
            entry.row, entry.sheet
        ))
    }

    /// Clear the row just above the start row and start writing there.
    pub fn delete_previous_row(&mut self) -> Result<String> {
        self.require_workbook()?;
        let sheet = self.selected_sheet()?;
        let layout = self.layout(&sheet);
        let Some(prev_row) = layout.start_row.checked_sub(1).filter(|r| *r >= 1) else {
            return Ok("no row left to delete".to_string());
        };

        let manager = self.manager_mut()?;
        if manager.row_is_empty(&sheet, prev_row, layout.start_col, layout.num_fields)? {
            return Ok(format!("row {} is already empty", prev_row));
        }
        manager.undo_row(&sheet, prev_row, layout.start_col, layout.num_fields)?;
        if let Some(stt_col) = layout.stt_col {
            manager.undo_row(&sheet, prev_row, stt_col, 1)?;
        }
        manager.save()?;

        self.settings.set_start_row(&sheet, prev_row);
        self.settings.save(&self.settings_path)?;

        log::info!("deleted row {} on '{}'", prev_row, sheet);
        Ok(format!(
            "deleted row {} on sheet {}; entry restarts from this row",
            prev_row, sheet
        ))
    }

    /// The preview table for the selected sheet, or a message saying why there is none.
    pub fn refresh_preview(&mut self) -> String {
        let Some(sheet) = self.form.selected_sheet().map(str::to_string) else {
            return preview::render_missing();
        };
        let layout = self.layout(&sheet);
        let range = self.preview_range;
        let Some(manager) = self.manager.as_mut() else {
            return preview::render_missing();
        };
        match manager.preview_rows(&sheet, &layout, range) {
            Ok(window) => format!(
                "sheet {}, next row {}\n{}",
                sheet,
                window.next_row,
                preview::render(&window)
            ),
            Err(e) => format!("error reading workbook: {}", e),
        }
    }

    /// Change where entries start on `sheet`; `col` is a column letter.
    pub fn set_position(&mut self, sheet: &str, row: u32, col: &str) -> Result<String> {
        if !self.form.sheets().iter().any(|s| s == sheet) {
            return Err(Error::SheetNotFound {
                name: sheet.to_string(),
            });
        }
        let col_index = letter_to_col(col).ok_or_else(|| Error::InvalidColumn(col.to_string()))?;
        self.settings.set_position(sheet, row, col_index);
        self.settings.save(&self.settings_path)?;
        if let Some(manager) = self.manager.as_mut() {
            manager.clear_last_empty_row_cache(Some(sheet));
        }
        let pos = self.settings.position(sheet);
        Ok(format!(
            "{} starts at row {}, column {}",
            sheet,
            pos.start_row,
            col_to_letter(pos.start_col)
        ))
    }

    /// `(sheet, start_row, start_col letter)` for every selectable sheet.
    pub fn positions(&self) -> Vec<(String, u32, String)> {
        self.form
            .sheets()
            .iter()
            .map(|sheet| {
                let pos = self.settings.position(sheet);
                (sheet.clone(), pos.start_row, col_to_letter(pos.start_col))
            })
            .collect()
    }

    /// Re-read the workbook from disk, e.g. after someone else edited it.
    pub fn reload(&mut self) -> Result<String> {
        match self.manager.as_mut() {
            Some(manager) => manager.reload()?,
            None => self.manager = Some(ExcelManager::open(&self.workbook_path)?),
        }
        let sheets = self
            .manager
            .as_ref()
            .map(ExcelManager::sheet_names)
            .unwrap_or_default();
        let count = sheets.len();
        self.form.set_sheets(sheets);
        Ok(format!("reloaded {} sheets", count))
    }
}
