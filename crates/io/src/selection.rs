// Saved-selection workbook loader (XLSX/XLS/ODS via calamine)

use std::path::{Path, PathBuf};

use calamine::{open_workbook_auto, Data, Range, Reader};
use thiserror::Error;
use tracing::debug;

use parcelmap_core::{Selection, SelectionEntry, SelectionKind};

/// The workbook is not a saved selection this tool understands.
#[derive(Debug, Error)]
pub enum SelectionError {
    #[error("cannot open workbook {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: calamine::Error,
    },
    #[error("{}: no tblInvSelect or tblResSelect sheet", path.display())]
    NoSelectionSheet { path: PathBuf },
    #[error("sheet {sheet}: cannot read: {message}")]
    Sheet { sheet: String, message: String },
    #[error("sheet {sheet}: cell {cell} should be '{expected}', found '{found}'")]
    Header {
        sheet: String,
        cell: String,
        expected: &'static str,
        found: String,
    },
    #[error("sheet {sheet}: cell {cell} is not a valid identifier: '{value}'")]
    Cell {
        sheet: String,
        cell: String,
        value: String,
    },
}

/// Load the first recognized selection sheet from `path`.
///
/// Rows are read from row 2 down to the first empty cell (for resources, the
/// first row where either column is empty); anything after the gap is
/// ignored.
pub fn load_selection(path: &Path) -> Result<Selection, SelectionError> {
    let mut workbook = open_workbook_auto(path).map_err(|source| SelectionError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let Some((sheet, kind)) = workbook
        .sheet_names()
        .into_iter()
        .find_map(|name| SelectionKind::from_sheet_name(&name).map(|k| (name, k)))
    else {
        return Err(SelectionError::NoSelectionSheet { path: path.to_path_buf() });
    };

    let range = workbook
        .worksheet_range(&sheet)
        .map_err(|e| SelectionError::Sheet { sheet: sheet.clone(), message: e.to_string() })?;

    check_headers(&range, &sheet, kind)?;
    let entries = read_entries(&range, &sheet, kind)?;
    debug!(sheet = %sheet, count = entries.len(), "selection loaded");

    Ok(Selection { kind, sheet, entries })
}

fn check_headers(range: &Range<Data>, sheet: &str, kind: SelectionKind) -> Result<(), SelectionError> {
    for (col, expected) in kind.headers().into_iter().enumerate() {
        let found = match cell(range, 0, col as u32) {
            Some(other) => other.to_string(),
            None => String::new(),
        };
        if found != expected {
            return Err(SelectionError::Header {
                sheet: sheet.to_string(),
                cell: cell_address(0, col as u32),
                expected,
                found,
            });
        }
    }
    Ok(())
}

fn read_entries(
    range: &Range<Data>,
    sheet: &str,
    kind: SelectionKind,
) -> Result<Vec<SelectionEntry>, SelectionError> {
    let mut entries = Vec::new();
    let mut row = 1u32;
    loop {
        let entry = match kind {
            SelectionKind::Reports => {
                let Some(doc_no) = identifier(range, sheet, row, 1)? else { break };
                SelectionEntry::Report { doc_no }
            }
            SelectionKind::Resources => {
                if is_blank(range, row, 0) || is_blank(range, row, 1) {
                    break;
                }
                let (Some(prim_co), Some(prim_no)) =
                    (identifier(range, sheet, row, 0)?, identifier(range, sheet, row, 1)?)
                else {
                    break;
                };
                SelectionEntry::Resource { prim_co, prim_no }
            }
        };
        entries.push(entry);
        row += 1;
    }
    Ok(entries)
}

fn is_blank(range: &Range<Data>, row: u32, col: u32) -> bool {
    match cell(range, row, col) {
        None | Some(Data::Empty) => true,
        Some(Data::String(s)) => s.trim().is_empty(),
        Some(_) => false,
    }
}

/// `Ok(None)` marks the end of the list.
fn identifier(range: &Range<Data>, sheet: &str, row: u32, col: u32) -> Result<Option<i64>, SelectionError> {
    let bad = |value: String| SelectionError::Cell {
        sheet: sheet.to_string(),
        cell: cell_address(row, col),
        value,
    };

    match cell(range, row, col) {
        None | Some(Data::Empty) => Ok(None),
        Some(Data::Int(n)) => Ok(Some(*n)),
        Some(Data::Float(f)) => {
            if f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
                Ok(Some(*f as i64))
            } else {
                Err(bad(f.to_string()))
            }
        }
        Some(Data::String(s)) => {
            let t = s.trim();
            if t.is_empty() {
                Ok(None)
            } else {
                t.parse::<i64>().map(Some).map_err(|_| bad(s.clone()))
            }
        }
        Some(other) => Err(bad(other.to_string())),
    }
}

/// Cell at zero-based sheet coordinates, independent of where the used
/// range starts.
fn cell(range: &Range<Data>, row: u32, col: u32) -> Option<&Data> {
    range.get_value((row, col))
}

/// `A1`-style address for zero-based coordinates.
fn cell_address(row: u32, col: u32) -> String {
    let mut letters = Vec::new();
    let mut n = col + 1;
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push((b'A' + rem as u8) as char);
        n = (n - 1) / 26;
    }
    letters.iter().rev().collect::<String>() + &(row + 1).to_string()
}
