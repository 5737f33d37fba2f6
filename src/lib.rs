/*!
# Container Entry

A terminal data-entry form for container-logistics records, built in Rust.

## Overview

An operator keys in one record per container (pickup date, company, trucking
vendor, booking number, container number, seal, operation type, quantity,
size, pickup and drop-off location) and the tool appends it as a new row to a
chosen sheet of a shared `.xlsx` workbook. After every command the form shows
a small fixed-width preview of the sheet around the next insertion row.

## Architecture

### Form Layer
- **Command Parser** - Turns one input line into a form command
- **Entry Form** - Selected sheet and field values, with per-field validation
- **Preview Renderer** - Text table of the rows around the insertion point

### Workbook Layer
- **Workbook Model** - Sheets and their non-blank cells, 1-based coordinates
- **Loader** - Reads `.xlsx` files with calamine
- **Saving** - Patches edited cells into the `.xlsx` container (zip + quick-xml),
  leaving formatting and untouched sheets as they are, and replaces the file atomically
- **Excel Manager** - Next-empty-row scan with a position cache, row writes and clears

### Session
- Save, undo of the last save, delete of the row above the start row
- Per-sheet start row/column persisted to a JSON settings file

## Row layout

Each sheet has a start row and start column (default row 2, column A). The
next record goes on the first row at or below the start row whose cell in the
start column is blank. A sheet that starts at column `B` keeps an STT
(sequence number) in column `A`, numbered from 1 at the start row.

## Modules

- **cell**: Cell values and their display form
- **spreadsheet**: Workbook/sheet model, column letter and cell name helpers
- **loader**: Workbook import
- **saving**: In-place workbook updates and atomic file writes
- **settings**: Per-sheet write positions
- **record**: The container record and its fields
- **form**: Entry form state
- **manager**: Row scanning, writing and clearing
- **preview**: Preview table rendering
- **app**: The operator session
- **command**: Command parsing
- **error**: Error type
*/

pub mod app;
pub mod cell;
pub mod command;
pub mod error;
pub mod form;
pub mod loader;
pub mod manager;
pub mod preview;
pub mod record;
pub mod saving;
pub mod settings;
pub mod spreadsheet;

pub use app::Session;
pub use cell::CellValue;
pub use error::{Error, Result};
pub use manager::{ExcelManager, PreviewWindow};
pub use record::{ContainerRecord, Field, Operation};
pub use settings::{EntryLayout, SheetPosition, Settings};
pub use spreadsheet::{Sheet, Workbook};
