//! Writing edited cells back into the workbook file.
//!
//! A save never rebuilds the workbook. The `.xlsx` container is copied entry
//! by entry and only the worksheet parts holding edited cells are rewritten.
//! Styles, column widths, merged ranges, data validation and untouched sheets
//! are carried over as they are on disk.

use crate::cell::CellValue;
use crate::error::{Error, Result};
use crate::spreadsheet::{cell_name, parse_cell_name};
use quick_xml::errors::IllFormedError;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use std::collections::{BTreeMap, HashMap, HashSet, btree_map};
use std::fs::File;
use std::io::{Cursor, Read, Seek, Write};
use std::iter::Peekable;
use std::path::Path;
use tempfile::NamedTempFile;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// New values for one sheet, keyed by row then column. `CellValue::Empty` clears a cell.
pub type SheetEdits = BTreeMap<u32, BTreeMap<u32, CellValue>>;

/// Edits for every touched sheet, keyed by sheet name.
pub type WorkbookEdits = BTreeMap<String, SheetEdits>;

const WORKBOOK_PART: &str = "xl/workbook.xml";
const WORKBOOK_RELS: &str = "xl/_rels/workbook.xml.rels";
const CONTENT_TYPES: &str = "[Content_Types].xml";
const CALC_CHAIN: &str = "xl/calcChain.xml";

type XmlResult<T> = std::result::Result<T, quick_xml::Error>;

/// Apply `edits` to the workbook at `path`, replacing the file in one step.
pub fn save_edits(path: impl AsRef<Path>, edits: &WorkbookEdits) -> Result<()> {
    let path = path.as_ref();
    if edits.is_empty() {
        return Ok(());
    }
    let bytes = patch_xlsx(path, edits)?;
    write_atomically(path, &bytes)?;
    log::info!(
        "saved workbook {} ({} sheets touched)",
        path.display(),
        edits.len()
    );
    Ok(())
}

/// The bytes of the workbook at `path` with `edits` applied.
///
/// # Arguments
/// * `path` - Existing `.xlsx` file
/// * `edits` - Cells to write or clear, per sheet
///
/// # Returns
/// * `Result<Vec<u8>>` - The patched container, `SheetNotFound` for an unknown sheet
pub fn patch_xlsx(path: &Path, edits: &WorkbookEdits) -> Result<Vec<u8>> {
    if !path.exists() {
        return Err(Error::WorkbookNotFound {
            path: path.to_path_buf(),
        });
    }
    let zip_err = |source| Error::Archive {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).map_err(|e| Error::io(path, e))?;
    let mut archive = ZipArchive::new(file).map_err(zip_err)?;
    let parts = sheet_parts(&mut archive, path)?;

    let mut replaced: HashMap<String, Vec<u8>> = HashMap::new();
    let mut formulas_removed = false;
    for (sheet, sheet_edits) in edits {
        let part = parts.get(sheet).ok_or_else(|| Error::SheetNotFound {
            name: sheet.clone(),
        })?;
        let xml = read_part(&mut archive, path, part)?;
        let patched = patch_sheet_xml(&xml, sheet_edits).map_err(|source| Error::Xml {
            part: part.clone(),
            source,
        })?;
        formulas_removed |= patched.formulas_removed;
        replaced.insert(part.clone(), patched.xml.into_bytes());
        log::debug!("patched {} for sheet '{}'", part, sheet);
    }

    // Excel rejects a calc chain that points at cells which lost their formula.
    let mut dropped = HashSet::new();
    if formulas_removed && archive.index_for_name(CALC_CHAIN).is_some() {
        dropped.insert(CALC_CHAIN.to_string());
        for (part, tag, attr) in [
            (CONTENT_TYPES, b"Override".as_slice(), b"PartName".as_slice()),
            (WORKBOOK_RELS, b"Relationship".as_slice(), b"Target".as_slice()),
        ] {
            let xml = read_part(&mut archive, path, part)?;
            let kept = drop_elements(&xml, tag, |e| {
                attr_value(e, attr)
                    .ok()
                    .flatten()
                    .is_some_and(|v| v.ends_with("calcChain.xml"))
            })
            .map_err(|source| Error::Xml {
                part: part.to_string(),
                source,
            })?;
            replaced.insert(part.to_string(), kept.into_bytes());
        }
        log::debug!("dropped {} after removing formulas", CALC_CHAIN);
    }

    let mut out = ZipWriter::new(Cursor::new(Vec::new()));
    for i in 0..archive.len() {
        let entry = archive.by_index_raw(i).map_err(zip_err)?;
        let name = entry.name().to_string();
        if dropped.contains(&name) {
            continue;
        }
        match replaced.get(&name) {
            Some(bytes) => {
                let options =
                    SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
                out.start_file(name, options).map_err(zip_err)?;
                out.write_all(bytes).map_err(|e| Error::io(path, e))?;
            }
            None => out.raw_copy_file(entry).map_err(zip_err)?,
        }
    }
    Ok(out.finish().map_err(zip_err)?.into_inner())
}

/// Write through a temporary file in the target directory, then rename it
/// over `path`, so a crash never leaves a half-written file behind.
pub fn write_atomically(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));

    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| Error::io(dir, e))?;
    tmp.write_all(bytes).map_err(|e| Error::io(tmp.path(), e))?;
    tmp.flush().map_err(|e| Error::io(tmp.path(), e))?;
    tmp.persist(path).map_err(|e| Error::io(path, e.error))?;
    Ok(())
}

fn read_part<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    path: &Path,
    part: &str,
) -> Result<String> {
    let mut entry = archive.by_name(part).map_err(|e| Error::BadPart {
        part: part.to_string(),
        reason: e.to_string(),
    })?;
    let mut xml = String::new();
    entry
        .read_to_string(&mut xml)
        .map_err(|e| Error::io(path, e))?;
    Ok(xml)
}

/// Sheet name -> worksheet part, from the workbook and its relationships.
fn sheet_parts<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    path: &Path,
) -> Result<HashMap<String, String>> {
    let xml_err = |part: &str| {
        let part = part.to_string();
        move |source: quick_xml::Error| Error::Xml { part, source }
    };

    let rels = read_part(archive, path, WORKBOOK_RELS)?;
    let targets: HashMap<String, String> =
        element_attrs(&rels, b"Relationship", b"Id", b"Target")
            .map_err(xml_err(WORKBOOK_RELS))?
            .into_iter()
            .collect();

    let workbook = read_part(archive, path, WORKBOOK_PART)?;
    let sheets = element_attrs(&workbook, b"sheet", b"name", b"id")
        .map_err(xml_err(WORKBOOK_PART))?;

    let mut parts = HashMap::new();
    for (name, rel_id) in sheets {
        let target = targets.get(&rel_id).ok_or_else(|| Error::BadPart {
            part: WORKBOOK_RELS.to_string(),
            reason: format!("no relationship {} for sheet '{}'", rel_id, name),
        })?;
        let part = match target.strip_prefix('/') {
            Some(absolute) => absolute.to_string(),
            None => format!("xl/{}", target),
        };
        parts.insert(name, part);
    }
    Ok(parts)
}

/// `(key, value)` attribute pairs of every `tag` element that has both.
fn element_attrs(
    xml: &str,
    tag: &[u8],
    key: &[u8],
    value: &[u8],
) -> XmlResult<Vec<(String, String)>> {
    let mut reader = Reader::from_str(xml);
    let mut found = Vec::new();
    loop {
        match reader.read_event()? {
            Event::Eof => break,
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == tag => {
                if let (Some(k), Some(v)) = (attr_value(&e, key)?, attr_value(&e, value)?) {
                    found.push((k, v));
                }
            }
            _ => {}
        }
    }
    Ok(found)
}

/// Unescaped value of the attribute whose local name is `key`.
fn attr_value(e: &BytesStart<'_>, key: &[u8]) -> XmlResult<Option<String>> {
    for attr in e.attributes().flatten() {
        if attr.key.local_name().as_ref() == key {
            let raw = String::from_utf8_lossy(&attr.value).into_owned();
            let value = quick_xml::escape::unescape(&raw).map_err(quick_xml::Error::from)?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

fn put(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> XmlResult<()> {
    writer.write_event(event).map_err(quick_xml::Error::from)
}

fn element_name(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.name().as_ref()).into_owned()
}

/// Events up to, not including, the end tag of the element just opened.
fn read_inner<'a>(reader: &mut Reader<&'a [u8]>, name: &str) -> XmlResult<Vec<Event<'a>>> {
    let mut depth = 0usize;
    let mut events = Vec::new();
    loop {
        let event = reader.read_event()?;
        match &event {
            Event::Start(_) => depth += 1,
            Event::End(_) if depth == 0 => return Ok(events),
            Event::End(_) => depth -= 1,
            Event::Eof => {
                return Err(quick_xml::Error::IllFormed(IllFormedError::MissingEndTag(
                    name.to_string(),
                )));
            }
            _ => {}
        }
        events.push(event);
    }
}

/// Copy `xml`, leaving out every `tag` element for which `remove` holds.
pub(crate) fn drop_elements(
    xml: &str,
    tag: &[u8],
    remove: impl Fn(&BytesStart<'_>) -> bool,
) -> XmlResult<String> {
    let mut reader = Reader::from_str(xml);
    let mut writer = Writer::new(Vec::new());
    loop {
        match reader.read_event()? {
            Event::Eof => break,
            Event::Empty(e) if e.local_name().as_ref() == tag && remove(&e) => {}
            Event::Start(e) if e.local_name().as_ref() == tag && remove(&e) => {
                read_inner(&mut reader, &element_name(&e))?;
            }
            event => put(&mut writer, event)?,
        }
    }
    Ok(String::from_utf8_lossy(&writer.into_inner()).into_owned())
}

pub(crate) struct PatchedSheet {
    pub xml: String,
    /// A formula cell was overwritten or cleared.
    pub formulas_removed: bool,
}

type PendingRows<'e> = Peekable<btree_map::Iter<'e, u32, BTreeMap<u32, CellValue>>>;

/// Rewrite the `<sheetData>` rows named in `edits`; every other byte of the
/// worksheet passes through.
pub(crate) fn patch_sheet_xml(xml: &str, edits: &SheetEdits) -> XmlResult<PatchedSheet> {
    let mut reader = Reader::from_str(xml);
    let mut writer = Writer::new(Vec::new());
    let mut pending = edits.iter().peekable();
    let mut in_data = false;
    let mut last_row = 0u32;
    let mut formulas_removed = false;

    loop {
        match reader.read_event()? {
            Event::Eof => break,
            Event::Empty(e) if e.local_name().as_ref() == b"dimension" => {
                put(&mut writer, Event::Empty(widen_dimension(&e, edits)?))?;
            }
            Event::Start(e) if e.local_name().as_ref() == b"sheetData" => {
                in_data = true;
                put(&mut writer, Event::Start(e))?;
            }
            Event::Empty(e) if e.local_name().as_ref() == b"sheetData" => {
                let end = e.to_end().into_owned();
                put(&mut writer, Event::Start(e))?;
                write_new_rows(&mut writer, &mut pending, u32::MAX)?;
                put(&mut writer, Event::End(end))?;
            }
            Event::End(e) if in_data && e.local_name().as_ref() == b"sheetData" => {
                in_data = false;
                write_new_rows(&mut writer, &mut pending, u32::MAX)?;
                put(&mut writer, Event::End(e))?;
            }
            Event::Start(e) if in_data && e.local_name().as_ref() == b"row" => {
                let row = row_number(&e, last_row)?;
                last_row = row;
                let inner = read_inner(&mut reader, &element_name(&e))?;
                write_new_rows(&mut writer, &mut pending, row)?;
                match pending.next_if(|(r, _)| **r == row) {
                    Some((_, cells)) => {
                        formulas_removed |= write_patched_row(&mut writer, &e, row, inner, cells)?;
                    }
                    None => {
                        let end = e.to_end().into_owned();
                        put(&mut writer, Event::Start(e))?;
                        for event in inner {
                            put(&mut writer, event)?;
                        }
                        put(&mut writer, Event::End(end))?;
                    }
                }
            }
            Event::Empty(e) if in_data && e.local_name().as_ref() == b"row" => {
                let row = row_number(&e, last_row)?;
                last_row = row;
                write_new_rows(&mut writer, &mut pending, row)?;
                match pending.next_if(|(r, _)| **r == row) {
                    Some((_, cells)) => {
                        write_patched_row(&mut writer, &e, row, Vec::new(), cells)?;
                    }
                    None => put(&mut writer, Event::Empty(e))?,
                }
            }
            event => put(&mut writer, event)?,
        }
    }

    Ok(PatchedSheet {
        xml: String::from_utf8_lossy(&writer.into_inner()).into_owned(),
        formulas_removed,
    })
}

fn row_number(e: &BytesStart<'_>, last_row: u32) -> XmlResult<u32> {
    Ok(attr_value(e, b"r")?
        .and_then(|r| r.parse().ok())
        .unwrap_or(last_row.saturating_add(1)))
}

/// Emit brand-new rows for every pending edit above `before`.
fn write_new_rows(
    writer: &mut Writer<Vec<u8>>,
    pending: &mut PendingRows<'_>,
    before: u32,
) -> XmlResult<()> {
    while let Some((row, cells)) = pending.next_if(|(r, _)| **r < before) {
        if cells.values().all(CellValue::is_blank) {
            continue;
        }
        let mut start = BytesStart::new("row");
        let r = row.to_string();
        start.push_attribute(("r", r.as_str()));
        put(writer, Event::Start(start))?;
        for (col, value) in cells {
            write_cell(writer, *row, *col, value, None)?;
        }
        put(writer, Event::End(BytesEnd::new("row")))?;
    }
    Ok(())
}

/// Merge `edits` into an existing row. Returns whether a formula was replaced.
fn write_patched_row(
    writer: &mut Writer<Vec<u8>>,
    row_start: &BytesStart<'_>,
    row: u32,
    inner: Vec<Event<'_>>,
    edits: &BTreeMap<u32, CellValue>,
) -> XmlResult<bool> {
    // `spans` is only a hint and goes stale once cells move.
    let name = element_name(row_start);
    let mut start = BytesStart::new(name.clone());
    start.extend_attributes(
        row_start
            .attributes()
            .flatten()
            .filter(|a| a.key.as_ref() != b"spans"),
    );
    put(writer, Event::Start(start))?;

    let mut edits = edits.iter().peekable();
    let mut formulas_removed = false;
    let mut trailing = Vec::new();
    let mut last_col = 0u32;

    for item in split_items(inner) {
        let cell_start = match item.first() {
            Some(Event::Start(e) | Event::Empty(e)) if e.local_name().as_ref() == b"c" => {
                Some(e.clone())
            }
            Some(Event::Text(t)) if t.iter().all(u8::is_ascii_whitespace) => continue,
            _ => None,
        };
        let Some(cell_start) = cell_start else {
            trailing.push(item);
            continue;
        };
        let col = attr_value(&cell_start, b"r")?
            .and_then(|r| parse_cell_name(&r))
            .map(|(_, c)| c)
            .unwrap_or(last_col.saturating_add(1));
        last_col = col;

        while let Some((c, value)) = edits.next_if(|(c, _)| **c < col) {
            write_cell(writer, row, *c, value, None)?;
        }
        match edits.next_if(|(c, _)| **c == col) {
            Some((_, value)) => {
                formulas_removed |= item.iter().any(|event| opens(event, b"f"));
                let style = attr_value(&cell_start, b"s")?;
                write_cell(writer, row, col, value, style.as_deref())?;
            }
            None => {
                for event in item {
                    put(writer, event)?;
                }
            }
        }
    }
    for (c, value) in edits {
        write_cell(writer, row, *c, value, None)?;
    }
    for event in trailing.into_iter().flatten() {
        put(writer, event)?;
    }

    put(writer, Event::End(BytesEnd::new(name)))?;
    Ok(formulas_removed)
}

fn opens(event: &Event<'_>, name: &[u8]) -> bool {
    matches!(event, Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == name)
}

/// Group the children of a row into one event list per top-level element.
fn split_items(events: Vec<Event<'_>>) -> Vec<Vec<Event<'_>>> {
    let mut items = Vec::new();
    let mut current = Vec::new();
    let mut depth = 0usize;
    for event in events {
        match &event {
            Event::Start(_) => depth += 1,
            Event::End(_) => depth = depth.saturating_sub(1),
            _ => {}
        }
        current.push(event);
        if depth == 0 {
            items.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        items.push(current);
    }
    items
}

/// Serialize one cell. Text goes in as an inline string so the shared string
/// table is left alone. A cleared cell keeps its style as an empty `<c/>`.
fn write_cell(
    writer: &mut Writer<Vec<u8>>,
    row: u32,
    col: u32,
    value: &CellValue,
    style: Option<&str>,
) -> XmlResult<()> {
    let reference = cell_name(row, col);
    let mut c = BytesStart::new("c");
    c.push_attribute(("r", reference.as_str()));
    if let Some(s) = style {
        c.push_attribute(("s", s));
    }

    match value {
        CellValue::Empty => {
            if style.is_some() {
                put(writer, Event::Empty(c))?;
            }
            return Ok(());
        }
        CellValue::Text(s) if s.is_empty() => {
            if style.is_some() {
                put(writer, Event::Empty(c))?;
            }
            return Ok(());
        }
        CellValue::Text(s) => {
            c.push_attribute(("t", "inlineStr"));
            put(writer, Event::Start(c))?;
            put(writer, Event::Start(BytesStart::new("is")))?;
            let mut t = BytesStart::new("t");
            t.push_attribute(("xml:space", "preserve"));
            put(writer, Event::Start(t))?;
            put(writer, Event::Text(BytesText::new(s)))?;
            put(writer, Event::End(BytesEnd::new("t")))?;
            put(writer, Event::End(BytesEnd::new("is")))?;
        }
        CellValue::Number(n) | CellValue::Date(n) => {
            put(writer, Event::Start(c))?;
            text_element(writer, "v", &n.to_string())?;
        }
        CellValue::Bool(b) => {
            c.push_attribute(("t", "b"));
            put(writer, Event::Start(c))?;
            text_element(writer, "v", if *b { "1" } else { "0" })?;
        }
        CellValue::Formula { expr, .. } => {
            put(writer, Event::Start(c))?;
            text_element(writer, "f", expr)?;
        }
    }
    put(writer, Event::End(BytesEnd::new("c")))
}

fn text_element(writer: &mut Writer<Vec<u8>>, name: &str, text: &str) -> XmlResult<()> {
    put(writer, Event::Start(BytesStart::new(name)))?;
    put(writer, Event::Text(BytesText::new(text)))?;
    put(writer, Event::End(BytesEnd::new(name)))
}

/// Grow the `<dimension ref>` so it covers every non-blank edited cell.
fn widen_dimension(e: &BytesStart<'_>, edits: &SheetEdits) -> XmlResult<BytesStart<'static>> {
    let mut start = BytesStart::new(element_name(e));
    let current = attr_value(e, b"ref")?.unwrap_or_default();
    let (first, last) = current
        .split_once(':')
        .unwrap_or((current.as_str(), current.as_str()));

    let mut bounds = match (parse_cell_name(first), parse_cell_name(last)) {
        (Some((r1, c1)), Some((r2, c2))) => Some((r1, c1, r2, c2)),
        _ => None,
    };
    for (&row, cells) in edits {
        for (&col, value) in cells {
            if value.is_blank() {
                continue;
            }
            bounds = Some(match bounds {
                Some((r1, c1, r2, c2)) => (r1.min(row), c1.min(col), r2.max(row), c2.max(col)),
                None => (row, col, row, col),
            });
        }
    }

    let reference = match bounds {
        Some((r1, c1, r2, c2)) if (r1, c1) == (r2, c2) => cell_name(r1, c1),
        Some((r1, c1, r2, c2)) => format!("{}:{}", cell_name(r1, c1), cell_name(r2, c2)),
        None => current.clone(),
    };
    start.push_attribute(("ref", reference.as_str()));
    Ok(start)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHEET: &str = concat!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
        r#"<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">"#,
        r#"<dimension ref="A1:C3"/>"#,
        r#"<cols><col min="1" max="1" width="30.7109375" customWidth="1"/></cols>"#,
        r#"<sheetData>"#,
        r#"<row r="1" spans="1:3"><c r="A1" s="1" t="s"><v>0</v></c><c r="C1" s="2"/></row>"#,
        r#"<row r="3" spans="1:3"><c r="A3"><v>7</v></c><c r="B3"><f>A3*2</f><v>14</v></c></row>"#,
        r#"</sheetData>"#,
        r#"<mergeCells count="1"><mergeCell ref="A1:C1"/></mergeCells>"#,
        r#"</worksheet>"#
    );

    fn edits(cells: &[(u32, u32, CellValue)]) -> SheetEdits {
        let mut edits = SheetEdits::new();
        for (row, col, value) in cells {
            edits.entry(*row).or_default().insert(*col, value.clone());
        }
        edits
    }

    #[test]
    fn untouched_parts_pass_through() {
        let patched = patch_sheet_xml(
            SHEET,
            &edits(&[(2, 1, CellValue::text("MSKU1234565"))]),
        )
        .unwrap();
        let cols = r#"<cols><col min="1" max="1" width="30.7109375" customWidth="1"/></cols>"#;
        let merges = r#"<mergeCells count="1"><mergeCell ref="A1:C1"/></mergeCells>"#;
        let row1 = r#"<row r="1" spans="1:3"><c r="A1" s="1" t="s"><v>0</v></c>"#;
        assert!(patched.xml.contains(cols));
        assert!(patched.xml.contains(merges));
        assert!(patched.xml.contains(row1));
        assert!(!patched.formulas_removed);
    }

    #[test]
    fn new_row_goes_between_existing_rows() {
        let patched = patch_sheet_xml(
            SHEET,
            &edits(&[(2, 1, CellValue::text("Cát & Lái")), (2, 3, CellValue::Number(2.0))]),
        )
        .unwrap();
        let row1 = patched.xml.find(r#"<row r="1""#).unwrap();
        let row2 = patched.xml.find(r#"<row r="2">"#).unwrap();
        let row3 = patched.xml.find(r#"<row r="3""#).unwrap();
        assert!(row1 < row2 && row2 < row3);
        assert!(patched.xml.contains(concat!(
            r#"<c r="A2" t="inlineStr"><is><t xml:space="preserve">Cát &amp; Lái</t></is></c>"#,
            r#"<c r="C2"><v>2</v></c>"#
        )));
    }

    #[test]
    fn edited_cell_keeps_its_style_and_order() {
        let patched = patch_sheet_xml(
            SHEET,
            &edits(&[(1, 2, CellValue::text("x")), (1, 3, CellValue::Number(5.0))]),
        )
        .unwrap();
        assert!(patched.xml.contains(concat!(
            r#"<row r="1"><c r="A1" s="1" t="s"><v>0</v></c>"#,
            r#"<c r="B1" t="inlineStr"><is><t xml:space="preserve">x</t></is></c>"#,
            r#"<c r="C1" s="2"><v>5</v></c></row>"#
        )));
    }

    #[test]
    fn cleared_cells_keep_only_their_style() {
        let patched = patch_sheet_xml(
            SHEET,
            &edits(&[
                (1, 1, CellValue::Empty),
                (3, 1, CellValue::Empty),
                (3, 2, CellValue::Empty),
            ]),
        )
        .unwrap();
        assert!(patched.xml.contains(r#"<row r="1"><c r="A1" s="1"/><c r="C1" s="2"/></row>"#));
        assert!(patched.xml.contains(r#"<row r="3"></row>"#));
        assert!(patched.formulas_removed);
    }

    #[test]
    fn rows_after_the_last_one_and_dimension() {
        let patched = patch_sheet_xml(
            SHEET,
            &edits(&[(9, 5, CellValue::Bool(true)), (8, 1, CellValue::Empty)]),
        )
        .unwrap();
        assert!(patched.xml.contains(r#"<dimension ref="A1:E9"/>"#));
        let row9 = r#"<row r="9"><c r="E9" t="b"><v>1</v></c></row></sheetData>"#;
        assert!(patched.xml.contains(row9));
        assert!(!patched.xml.contains(r#"<row r="8""#));
    }

    #[test]
    fn empty_sheet_data_gets_rows() {
        let xml = r#"<worksheet><dimension ref="A1"/><sheetData/></worksheet>"#;
        let patched = patch_sheet_xml(
            xml,
            &edits(&[(
                2,
                2,
                CellValue::Formula {
                    expr: "ROW()-1".into(),
                    cached: None,
                },
            )]),
        )
        .unwrap();
        assert_eq!(
            patched.xml,
            concat!(
                r#"<worksheet><dimension ref="A1:B2"/><sheetData>"#,
                r#"<row r="2"><c r="B2"><f>ROW()-1</f></c></row>"#,
                r#"</sheetData></worksheet>"#
            )
        );
    }

    #[test]
    fn calc_chain_references_are_dropped() {
        let types = concat!(
            r#"<Types><Default Extension="xml" ContentType="application/xml"/>"#,
            r#"<Override PartName="/xl/calcChain.xml" ContentType="x"/>"#,
            r#"<Override PartName="/xl/workbook.xml" ContentType="y"/></Types>"#
        );
        let kept = drop_elements(types, b"Override", |e| {
            attr_value(e, b"PartName")
                .unwrap()
                .is_some_and(|v| v.ends_with("calcChain.xml"))
        })
        .unwrap();
        assert!(!kept.contains("calcChain"));
        assert!(kept.contains("/xl/workbook.xml"));
        assert!(kept.contains(r#"<Default Extension="xml""#));
    }
}
