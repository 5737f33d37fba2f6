mod common;

use container_entry::error::Error;
use container_entry::loader::from_excel;
use container_entry::spreadsheet::{MAX_COLS, MAX_ROWS};
use container_entry::{CellValue, ExcelManager, SheetPosition};

#[test]
fn loads_sheets_with_visibility() {
    let fx = common::fixture();
    let manager = ExcelManager::open(&fx.workbook).unwrap();

    assert_eq!(manager.sheet_names(), vec!["GH", "HNP"]);
    assert_eq!(manager.workbook().sheets.len(), 3);

    let gh = manager.get_sheet("GH").unwrap();
    assert_eq!(gh.get(1, 1), Some(&CellValue::Text("NGÀY LẤY".into())));
    assert_eq!(gh.get(3, 5), Some(&CellValue::Text("MSKU000002".into())));
    assert_eq!(gh.get(2, 8), Some(&CellValue::Number(1.0)));
}

#[test]
fn missing_workbook_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let err = ExcelManager::open(dir.path().join("nope.xlsx")).err().unwrap();
    assert!(matches!(err, Error::WorkbookNotFound { .. }));
}

#[test]
fn next_empty_row_is_first_blank_in_start_column() {
    let fx = common::fixture();
    let mut manager = ExcelManager::open(&fx.workbook).unwrap();

    assert_eq!(manager.get_last_empty_row("GH", 2, 1, 11).unwrap(), 5);
    // scanning a column that is only filled in the header row
    assert_eq!(manager.get_last_empty_row("GH", 2, 3, 11).unwrap(), 2);
    // start row below the data
    assert_eq!(manager.get_last_empty_row("GH", 9, 1, 11).unwrap(), 9);
    assert!(matches!(
        manager.get_last_empty_row("Nope", 2, 1, 11),
        Err(Error::SheetNotFound { .. })
    ));
}

#[test]
fn write_row_appends_and_moves_the_cursor() {
    let fx = common::fixture();
    let mut manager = ExcelManager::open(&fx.workbook).unwrap();
    let data = vec![CellValue::text("04/05/2024"), CellValue::text("GH"), CellValue::Number(2.0)];

    assert_eq!(manager.write_row("GH", 2, 1, &data).unwrap(), 5);
    assert_eq!(manager.write_row("GH", 2, 1, &data).unwrap(), 6);

    let gh = manager.get_sheet("GH").unwrap();
    assert_eq!(gh.get(6, 3), Some(&CellValue::Number(2.0)));
    assert_eq!(manager.get_last_empty_row("GH", 2, 1, 3).unwrap(), 7);
}

#[test]
fn write_row_refuses_occupied_cells() {
    let fx = common::fixture();
    let mut manager = ExcelManager::open(&fx.workbook).unwrap();
    manager
        .write_cell("GH", 5, 4, CellValue::text("stray"))
        .unwrap();

    let data = vec![CellValue::text("x"); 11];
    let err = manager.write_row("GH", 2, 1, &data).err().unwrap();
    assert!(matches!(err, Error::CellOccupied { row: 5, col: 4 }));

    let gh = manager.get_sheet("GH").unwrap();
    assert!(gh.is_blank(5, 1));
    assert!(gh.is_blank(5, 3));
}

#[test]
fn undo_row_clears_only_the_given_cells() {
    let fx = common::fixture();
    let mut manager = ExcelManager::open(&fx.workbook).unwrap();

    manager.undo_row("GH", 4, 1, 2).unwrap();
    let gh = manager.get_sheet("GH").unwrap();
    assert!(gh.is_blank(4, 1));
    assert!(gh.is_blank(4, 2));
    assert_eq!(gh.get(4, 5), Some(&CellValue::Text("MSKU000003".into())));
    assert!(!manager.row_is_empty("GH", 4, 1, 11).unwrap());
    assert!(manager.row_is_empty("GH", 4, 1, 2).unwrap());
    assert_eq!(manager.get_last_empty_row("GH", 2, 1, 11).unwrap(), 4);
}

#[test]
fn preview_window_surrounds_next_row() {
    let fx = common::fixture();
    let mut manager = ExcelManager::open(&fx.workbook).unwrap();

    let layout = SheetPosition { start_row: 2, start_col: 1 }.layout(11);
    let window = manager.preview_rows("GH", &layout, 2).unwrap();
    assert_eq!(window.next_row, 5);
    assert_eq!((window.min_row, window.max_row), (3, 7));
    assert_eq!(window.start_col, 1);
    assert_eq!(window.num_cols, 11);
    assert_eq!(window.stt_col, None);
    assert_eq!(window.cells.get(&(4, 5)), Some(&CellValue::Text("MSKU000003".into())));
    assert!(window.cells.keys().all(|(r, _)| (3..=7).contains(r)));

    // near the top the window is clipped at row 1
    let top = SheetPosition { start_row: 1, start_col: 3 }.layout(11);
    let window = manager.preview_rows("GH", &top, 2).unwrap();
    assert_eq!(window.next_row, 2);
    assert_eq!((window.min_row, window.max_row), (1, 4));
}

#[test]
fn preview_includes_stt_column() {
    let fx = common::fixture();
    let mut manager = ExcelManager::open(&fx.workbook).unwrap();

    let layout = SheetPosition { start_row: 2, start_col: 2 }.layout(11);
    let window = manager.preview_rows("HNP", &layout, 2).unwrap();
    assert_eq!(window.next_row, 4);
    assert_eq!(window.start_col, 1);
    assert_eq!(window.num_cols, 12);
    assert_eq!(window.stt_col, Some(1));
    assert_eq!(window.cells.get(&(3, 1)), Some(&CellValue::Number(2.0)));
}

#[test]
fn save_then_reload_keeps_contents() {
    let fx = common::fixture();
    let mut manager = ExcelManager::open(&fx.workbook).unwrap();
    manager
        .write_row("GH", 2, 1, &[CellValue::text("Cát Lái"), CellValue::Number(3.0)])
        .unwrap();
    manager.write_cell("GH", 5, 12, CellValue::Bool(true)).unwrap();
    manager
        .write_cell(
            "GH",
            5,
            13,
            CellValue::Formula {
                expr: "H2+H3".into(),
                cached: None,
            },
        )
        .unwrap();
    assert!(manager.has_unsaved_changes());
    manager.save().unwrap();
    assert!(!manager.has_unsaved_changes());

    manager.reload().unwrap();
    assert_eq!(manager.sheet_names(), vec!["GH", "HNP"]);
    let gh = manager.get_sheet("GH").unwrap();
    assert_eq!(gh.get(5, 1), Some(&CellValue::Text("Cát Lái".into())));
    assert_eq!(gh.get(5, 2), Some(&CellValue::Number(3.0)));
    assert_eq!(gh.get(5, 12), Some(&CellValue::Bool(true)));
    assert_eq!(gh.get(2, 1), Some(&CellValue::Text("02/05/2024".into())));
    assert!(matches!(
        gh.get(5, 13),
        Some(CellValue::Formula { expr, .. }) if expr == "H2+H3"
    ));
    assert!(!manager.workbook().sheet("lists").unwrap().visible);
}

#[test]
fn save_leaves_other_writers_cells_alone() {
    let fx = common::fixture();
    let original = from_excel(&fx.workbook).unwrap();
    let mut ours = ExcelManager::open(&fx.workbook).unwrap();
    {
        let mut theirs = ExcelManager::open(&fx.workbook).unwrap();
        theirs.write_cell("GH", 7, 1, CellValue::text("06/05/2024")).unwrap();
        theirs.save().unwrap();
    }

    ours.write_row("GH", 2, 1, &[CellValue::text("05/05/2024")]).unwrap();
    ours.save().unwrap();

    let reloaded = from_excel(&fx.workbook).unwrap();
    let gh = reloaded.sheet("GH").unwrap();
    assert_eq!(gh.get(5, 1), Some(&CellValue::Text("05/05/2024".into())));
    assert_eq!(gh.get(7, 1), Some(&CellValue::Text("06/05/2024".into())));
    assert_eq!(
        reloaded.sheet("HNP").unwrap().cells,
        original.sheet("HNP").unwrap().cells
    );
}

#[test]
fn clearing_a_cell_removes_it_from_the_file() {
    let fx = common::fixture();
    let mut manager = ExcelManager::open(&fx.workbook).unwrap();
    manager.undo_row("GH", 4, 1, 11).unwrap();
    manager.save().unwrap();

    let reloaded = from_excel(&fx.workbook).unwrap();
    let gh = reloaded.sheet("GH").unwrap();
    assert!((1..=11).all(|col| gh.is_blank(4, col)));
    assert_eq!(gh.get(3, 5), Some(&CellValue::Text("MSKU000002".into())));
}

#[test]
fn row_past_the_last_column_is_refused_whole() {
    let fx = common::fixture();
    let mut manager = ExcelManager::open(&fx.workbook).unwrap();
    let data = vec![CellValue::text("x"); 11];

    let err = manager.write_row("GH", 2, MAX_COLS - 3, &data).err().unwrap();
    assert!(matches!(err, Error::OutOfRange { row: 2, .. }));
    assert!(!manager.has_unsaved_changes());
    let gh = manager.get_sheet("GH").unwrap();
    assert!(gh.cells.keys().all(|(_, col)| *col <= 16));

    assert!(matches!(
        manager.undo_row("GH", 2, MAX_COLS, 2),
        Err(Error::OutOfRange { .. })
    ));
}

#[test]
fn preview_window_stays_inside_the_sheet() {
    let fx = common::fixture();
    let mut manager = ExcelManager::open(&fx.workbook).unwrap();

    let bottom = SheetPosition { start_row: MAX_ROWS, start_col: 1 }.layout(11);
    let window = manager.preview_rows("GH", &bottom, 5).unwrap();
    assert_eq!(window.next_row, MAX_ROWS);
    assert_eq!((window.min_row, window.max_row), (MAX_ROWS - 5, MAX_ROWS));

    let right = SheetPosition { start_row: 2, start_col: MAX_COLS - 1 }.layout(11);
    let window = manager.preview_rows("GH", &right, 2).unwrap();
    assert_eq!(window.columns().last(), Some(MAX_COLS));

    let outside = SheetPosition { start_row: u32::MAX, start_col: 1 }.layout(11);
    assert!(matches!(
        manager.preview_rows("GH", &outside, 2),
        Err(Error::OutOfRange { .. })
    ));
}
