#![allow(dead_code)]

use rust_xlsxwriter::{Format, Workbook};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const HEADERS: [&str; 11] = [
    "NGÀY LẤY",
    "CTY",
    "NHÀ XE",
    "BK No",
    "MÃ SỐ CONTAINER",
    "SEAL",
    "Loại hình",
    "Số lượng",
    "Kích cỡ",
    "NƠI LẤY CONT",
    "NƠI HẠ CONT",
];

/// Workbook with three sheets:
/// - `GH`: bold headers in row 1 from column A, records in rows 2-4,
///   a wide column A and a merged note over M1:P1
/// - `HNP`: `STT` in A1, headers from B1, records with STT 1-2 in rows 2-3
/// - `lists`: hidden lookup sheet
pub fn write_fixture(path: &Path) {
    build_fixture(path, false);
}

/// The same workbook with `GH` hidden.
pub fn write_fixture_with_gh_hidden(path: &Path) {
    build_fixture(path, true);
}

fn build_fixture(path: &Path, hide_gh: bool) {
    let mut wb = Workbook::new();
    let bold = Format::new().set_bold();

    let gh = wb.add_worksheet();
    gh.set_name("GH").unwrap();
    for (c, h) in HEADERS.iter().enumerate() {
        gh.write_string_with_format(0, c as u16, *h, &bold).unwrap();
    }
    gh.set_column_width(0, 30).unwrap();
    gh.merge_range(0, 12, 0, 15, "Ghi chú", &bold).unwrap();
    if hide_gh {
        gh.set_hidden(true);
    }
    for r in 1..=3u32 {
        gh.write_string(r, 0, "02/05/2024").unwrap();
        gh.write_string(r, 1, "GH").unwrap();
        gh.write_string(r, 4, format!("MSKU00000{}", r)).unwrap();
        gh.write_number(r, 7, 1.0).unwrap();
    }

    let hnp = wb.add_worksheet();
    hnp.set_name("HNP").unwrap();
    if hide_gh {
        hnp.set_active(true);
    }
    hnp.write_string(0, 0, "STT").unwrap();
    for (c, h) in HEADERS.iter().enumerate() {
        hnp.write_string(0, c as u16 + 1, *h).unwrap();
    }
    for r in 1..=2u32 {
        hnp.write_number(r, 0, r as f64).unwrap();
        hnp.write_string(r, 1, "03/05/2024").unwrap();
        hnp.write_string(r, 5, format!("TGHU11111{}", r)).unwrap();
    }

    let lists = wb.add_worksheet();
    lists.set_name("lists").unwrap();
    lists.write_string(0, 0, "GH").unwrap();
    lists.set_hidden(true);

    wb.save(path).unwrap();
}

/// Raw text of one part of an `.xlsx` container.
pub fn read_part(workbook: &Path, part: &str) -> String {
    let mut archive = zip::ZipArchive::new(File::open(workbook).unwrap()).unwrap();
    let mut xml = String::new();
    archive
        .by_name(part)
        .unwrap()
        .read_to_string(&mut xml)
        .unwrap();
    xml
}

pub struct Fixture {
    pub dir: TempDir,
    pub workbook: PathBuf,
    pub settings: PathBuf,
}

pub fn fixture() -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let workbook = dir.path().join("containers.xlsx");
    let settings = dir.path().join("settings.json");
    write_fixture(&workbook);
    Fixture {
        dir,
        workbook,
        settings,
    }
}
