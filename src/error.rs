//! Error types for the container entry tool.

use crate::spreadsheet::cell_name;
use std::path::PathBuf;
use thiserror::Error;

/// Everything that can go wrong while handling an operator action.
#[derive(Debug, Error)]
pub enum Error {
    // === Workbook ===
    /// The workbook file does not exist.
    #[error("workbook not found: {}", path.display())]
    WorkbookNotFound { path: PathBuf },

    /// The requested sheet is not part of the workbook.
    #[error("sheet '{name}' not found")]
    SheetNotFound { name: String },

    /// A cell the record would be written to is not blank.
    #[error("cell {} at row {row}, column {col} already has data", occupied_cell(.row, .col))]
    CellOccupied { row: u32, col: u32 },

    /// Row or column outside what an xlsx sheet can hold.
    #[error("position row {row}, column {col} is outside the sheet")]
    OutOfRange { row: u32, col: u32 },

    /// calamine could not read the file.
    #[error("failed to read workbook {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: calamine::XlsxError,
    },

    /// The xlsx container could not be read or rebuilt.
    #[error("failed to update workbook {}: {source}", path.display())]
    Archive {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    /// A part inside the xlsx container is not well-formed XML.
    #[error("malformed XML in workbook part {part}: {source}")]
    Xml {
        part: String,
        #[source]
        source: quick_xml::Error,
    },

    /// The xlsx container lacks a part the workbook needs.
    #[error("workbook part {part} is missing or unreadable: {reason}")]
    BadPart { part: String, reason: String },

    // === Settings ===
    /// The settings file is not valid JSON for our schema.
    #[error("invalid settings file {}: {source}", path.display())]
    Settings {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    // === Form ===
    /// No sheet has been selected yet.
    #[error("please select a sheet")]
    NoSheetSelected,

    /// A field value was rejected by the form.
    #[error("invalid value '{value}' for {field}: {reason}")]
    InvalidField {
        field: &'static str,
        value: String,
        reason: String,
    },

    /// A column reference that is not made of letters A-Z.
    #[error("invalid column '{0}'")]
    InvalidColumn(String),

    // === File system ===
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

fn occupied_cell(row: &u32, col: &u32) -> String {
    cell_name(*row, *col)
}

pub type Result<T> = std::result::Result<T, Error>;
