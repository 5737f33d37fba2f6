//! Per-sheet write positions, persisted as JSON.
//!
//! ```json
//! {
//!   "sheets": {
//!     "HNP": { "start_row": 5, "start_col": 2 }
//!   }
//! }
//! ```

use crate::error::{Error, Result};
use crate::saving::write_atomically;
use crate::spreadsheet::{MAX_COLS, MAX_ROWS};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

pub const DEFAULT_START_ROW: u32 = 2;
pub const DEFAULT_START_COL: u32 = 1;

/// Column that holds the STT (sequence number) when a sheet starts at `B`.
pub const STT_COL: u32 = 1;

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct SheetPosition {
    #[serde(default = "default_start_row")]
    pub start_row: u32,
    #[serde(default = "default_start_col")]
    pub start_col: u32,
}

fn default_start_row() -> u32 {
    DEFAULT_START_ROW
}

fn default_start_col() -> u32 {
    DEFAULT_START_COL
}

impl Default for SheetPosition {
    fn default() -> Self {
        SheetPosition {
            start_row: DEFAULT_START_ROW,
            start_col: DEFAULT_START_COL,
        }
    }
}

/// Where a record goes on a sheet.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EntryLayout {
    pub start_row: u32,
    /// First record column; also the column scanned for the next empty row.
    pub start_col: u32,
    pub num_fields: usize,
    /// Set when column A carries an auto-numbered STT.
    pub stt_col: Option<u32>,
}

impl SheetPosition {
    /// The same position pulled inside the sheet: row `1..=MAX_ROWS`, column `1..=MAX_COLS`.
    pub fn clamped(self) -> Self {
        SheetPosition {
            start_row: self.start_row.clamp(1, MAX_ROWS),
            start_col: self.start_col.clamp(1, MAX_COLS),
        }
    }

    pub fn layout(&self, num_fields: usize) -> EntryLayout {
        EntryLayout {
            start_row: self.start_row,
            start_col: self.start_col,
            num_fields,
            stt_col: (self.start_col == STT_COL + 1).then_some(STT_COL),
        }
    }
}

impl EntryLayout {
    /// First column shown in the preview (the STT column when present).
    pub fn preview_start_col(&self) -> u32 {
        self.stt_col.unwrap_or(self.start_col)
    }

    pub fn preview_num_fields(&self) -> usize {
        self.num_fields + usize::from(self.stt_col.is_some())
    }

    /// Sequence number for a record written at `row`, 1 at `start_row`.
    pub fn stt_for(&self, row: u32) -> u32 {
        row.saturating_sub(self.start_row) + 1
    }
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Default)]
pub struct Settings {
    #[serde(default)]
    pub sheets: BTreeMap<String, SheetPosition>,
}

impl Settings {
    /// Read settings from `path`; a missing file yields empty settings.
    /// Positions outside the sheet are pulled back inside it.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            log::debug!("no settings file at {}, using defaults", path.display());
            return Ok(Settings::default());
        }
        let text = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let mut settings: Settings =
            serde_json::from_str(&text).map_err(|source| Error::Settings {
                path: path.to_path_buf(),
                source,
            })?;
        for (sheet, position) in settings.sheets.iter_mut() {
            let clamped = position.clamped();
            if clamped != *position {
                log::warn!("position of '{}' is outside the sheet, using {:?}", sheet, clamped);
                *position = clamped;
            }
        }
        Ok(settings)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let mut text = serde_json::to_string_pretty(self).map_err(|source| Error::Settings {
            path: path.to_path_buf(),
            source,
        })?;
        text.push('\n');
        write_atomically(path, text.as_bytes())?;
        log::info!("saved settings {}", path.display());
        Ok(())
    }

    pub fn position(&self, sheet: &str) -> SheetPosition {
        self.sheets.get(sheet).copied().unwrap_or_default()
    }

    /// Store a position, clamped to the cells a sheet can hold.
    pub fn set_position(&mut self, sheet: &str, start_row: u32, start_col: u32) {
        let position = SheetPosition {
            start_row,
            start_col,
        };
        self.sheets.insert(sheet.to_string(), position.clamped());
    }

    pub fn set_start_row(&mut self, sheet: &str, start_row: u32) {
        self.sheets.entry(sheet.to_string()).or_default().start_row =
            start_row.clamp(1, MAX_ROWS);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_sheet_gets_default_position() {
        let settings = Settings::default();
        assert_eq!(
            settings.position("GH"),
            SheetPosition {
                start_row: 2,
                start_col: 1
            }
        );
    }

    #[test]
    fn positions_are_clamped() {
        let mut settings = Settings::default();
        settings.set_position("GH", 0, 0);
        assert_eq!(settings.position("GH").start_row, 1);
        assert_eq!(settings.position("GH").start_col, 1);

        settings.set_position("GH", u32::MAX, u32::MAX);
        assert_eq!(
            settings.position("GH"),
            SheetPosition { start_row: MAX_ROWS, start_col: MAX_COLS }
        );

        settings.set_start_row("DAP", u32::MAX);
        assert_eq!(settings.position("DAP").start_row, MAX_ROWS);
    }

    #[test]
    fn set_start_row_keeps_column() {
        let mut settings = Settings::default();
        settings.set_position("DAP", 10, 4);
        settings.set_start_row("DAP", 7);
        assert_eq!(settings.position("DAP"), SheetPosition { start_row: 7, start_col: 4 });

        settings.set_start_row("new", 3);
        assert_eq!(settings.position("new"), SheetPosition { start_row: 3, start_col: 1 });
    }

    #[test]
    fn stt_column_only_when_starting_at_b() {
        let at_b = SheetPosition { start_row: 5, start_col: 2 }.layout(11);
        assert_eq!(at_b.stt_col, Some(1));
        assert_eq!(at_b.preview_start_col(), 1);
        assert_eq!(at_b.preview_num_fields(), 12);
        assert_eq!(at_b.stt_for(5), 1);
        assert_eq!(at_b.stt_for(9), 5);

        let at_a = SheetPosition { start_row: 2, start_col: 1 }.layout(11);
        assert_eq!(at_a.stt_col, None);
        assert_eq!(at_a.preview_start_col(), 1);
        assert_eq!(at_a.preview_num_fields(), 11);

        let at_c = SheetPosition { start_row: 2, start_col: 3 }.layout(11);
        assert_eq!(at_c.stt_col, None);
    }

    #[test]
    fn missing_keys_fall_back_to_defaults() {
        let settings: Settings =
            serde_json::from_str(r#"{"sheets": {"GH": {"start_row": 9}}}"#).unwrap();
        assert_eq!(settings.position("GH"), SheetPosition { start_row: 9, start_col: 1 });

        let empty: Settings = serde_json::from_str("{}").unwrap();
        assert!(empty.sheets.is_empty());
    }
}
