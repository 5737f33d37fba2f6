use crate::cell::CellValue;
use crate::error::{Error, Result};
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::BTreeMap;

lazy_static! {
    static ref COLUMN_REGEX: Regex = Regex::new(r"^[A-Za-z]{1,3}$").unwrap();
    static ref CELL_REGEX: Regex = Regex::new(r"^([A-Za-z]{1,3})([0-9]+)$").unwrap();
}

/// Largest row number an xlsx sheet holds.
pub const MAX_ROWS: u32 = 1_048_576;
/// Largest column number an xlsx sheet holds (`XFD`).
pub const MAX_COLS: u32 = 16_384;

/// One worksheet. Rows and columns are 1-based; blank cells are not stored.
#[derive(Clone, Debug, PartialEq)]
pub struct Sheet {
    pub name: String,
    pub visible: bool,
    pub cells: BTreeMap<(u32, u32), CellValue>,
}

#[derive(Clone, Debug, PartialEq, Default)]
pub struct Workbook {
    pub sheets: Vec<Sheet>,
}

impl Sheet {
    pub fn new(name: impl Into<String>) -> Self {
        Sheet {
            name: name.into(),
            visible: true,
            cells: BTreeMap::new(),
        }
    }

    pub fn get(&self, row: u32, col: u32) -> Option<&CellValue> {
        self.cells.get(&(row, col))
    }

    pub fn is_blank(&self, row: u32, col: u32) -> bool {
        self.get(row, col).is_none_or(CellValue::is_blank)
    }

    /// Store `value` at (`row`, `col`). A blank value removes the cell.
    pub fn set(&mut self, row: u32, col: u32, value: CellValue) -> Result<()> {
        check_bounds(row, col)?;
        if value.is_blank() {
            self.cells.remove(&(row, col));
        } else {
            self.cells.insert((row, col), value);
        }
        Ok(())
    }

    pub fn clear(&mut self, row: u32, col: u32) {
        self.cells.remove(&(row, col));
    }
}

impl Workbook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_sheet(&mut self, sheet: Sheet) {
        self.sheets.push(sheet);
    }

    pub fn sheet(&self, name: &str) -> Result<&Sheet> {
        self.sheets
            .iter()
            .find(|s| s.name == name)
            .ok_or_else(|| Error::SheetNotFound {
                name: name.to_string(),
            })
    }

    pub fn sheet_mut(&mut self, name: &str) -> Result<&mut Sheet> {
        self.sheets
            .iter_mut()
            .find(|s| s.name == name)
            .ok_or_else(|| Error::SheetNotFound {
                name: name.to_string(),
            })
    }

    /// Names of the sheets an operator may pick, in workbook order.
    pub fn visible_sheet_names(&self) -> Vec<String> {
        self.sheets
            .iter()
            .filter(|s| s.visible)
            .map(|s| s.name.clone())
            .collect()
    }
}

/// `OutOfRange` unless (`row`, `col`) is a cell an xlsx sheet can hold.
pub fn check_bounds(row: u32, col: u32) -> Result<()> {
    if row == 0 || col == 0 || row > MAX_ROWS || col > MAX_COLS {
        return Err(Error::OutOfRange { row, col });
    }
    Ok(())
}

/// 1 -> `A`, 26 -> `Z`, 27 -> `AA`.
pub fn col_to_letter(col: u32) -> String {
    let mut col = col;
    let mut result = String::new();
    while col > 0 {
        col -= 1;
        result.push(((col % 26) as u8 + b'A') as char);
        col /= 26;
    }
    result.chars().rev().collect()
}

/// `AA` -> 27. Case-insensitive; `None` for anything but 1-3 letters.
pub fn letter_to_col(letters: &str) -> Option<u32> {
    let letters = letters.trim();
    if !COLUMN_REGEX.is_match(letters) {
        return None;
    }
    let col = letters
        .to_ascii_uppercase()
        .chars()
        .fold(0u32, |acc, c| acc * 26 + (c as u32 - 'A' as u32 + 1));
    (col <= MAX_COLS).then_some(col)
}

/// (7, 2) -> `B7`.
pub fn cell_name(row: u32, col: u32) -> String {
    format!("{}{}", col_to_letter(col), row)
}

/// `B7` -> (7, 2). `None` unless the name is a cell inside the sheet.
pub fn parse_cell_name(name: &str) -> Option<(u32, u32)> {
    let caps = CELL_REGEX.captures(name.trim())?;
    let col = letter_to_col(&caps[1])?;
    let row = caps[2].parse::<u32>().ok()?;
    check_bounds(row, col).ok()?;
    Some((row, col))
}
