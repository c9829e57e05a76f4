//! Spreadsheet reader (xlsx, xlsm, xlsb, xls, ods)
//!
//! Only the first worksheet is read. Calamine trims empty leading rows from a
//! worksheet range, so the reader pads them back in: header offsets count
//! from the top of the sheet, not from the first used cell.

use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, Reader};

use crate::error::{Error, Result};

/// Read the first worksheet of a workbook as text cells.
pub fn read_records(source_name: &str, bytes: &[u8]) -> Result<Vec<Vec<String>>> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
        .map_err(|e| Error::input_format(source_name, e))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| Error::input_format(source_name, "workbook has no worksheets"))?
        .map_err(|e| Error::input_format(source_name, e))?;

    let leading_blank = range.start().map_or(0, |(row, _)| row as usize);

    let mut records: Vec<Vec<String>> = vec![Vec::new(); leading_blank];
    records.extend(
        range
            .rows()
            .map(|row| row.iter().map(cell_text).collect::<Vec<_>>()),
    );

    Ok(records)
}

/// Render a cell the way it would appear in a CSV export.
///
/// Whole floats drop their fractional part so `123.0` and `123` read the same.
pub(crate) fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(n) => n.to_string(),
        Data::Float(f) if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15 => {
            format!("{}", *f as i64)
        }
        Data::Float(f) => f.to_string(),
        Data::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}
