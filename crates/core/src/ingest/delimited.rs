//! CSV reader
//!
//! Exports are frequently ragged: rows shorter or longer than the header.
//! The reader runs in flexible mode and leaves padding to [`Table`].
//!
//! The `csv` crate skips empty lines. They are padded back in as empty
//! records so a header offset counts physical lines, as it counts sheet rows
//! in a workbook.
//!
//! [`Table`]: crate::ingest::Table

use csv::StringRecord;

use crate::error::{Error, Result};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Read every record of a CSV byte stream as text cells.
pub fn read_records(source_name: &str, bytes: &[u8]) -> Result<Vec<Vec<String>>> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);

    let mut records: Vec<Vec<String>> = Vec::new();
    let mut record = StringRecord::new();
    let mut line = 1u64;
    // A CRLF terminator whose LF is consumed by the next read
    let mut carried_lf = false;

    while reader
        .read_record(&mut record)
        .map_err(|e| Error::input_format(source_name, e))?
    {
        let pos = reader.position();
        let consumed = pos.line() - line;
        line = pos.line();

        let end = pos.byte() as usize;
        let last = end.checked_sub(1).and_then(|i| bytes.get(i)).copied();
        let ends_with_lf = last == Some(b'\n');
        // Quoted cells may span lines
        let embedded: u64 = record.iter().map(|cell| cell.matches('\n').count() as u64).sum();

        let skipped =
            consumed.saturating_sub(u64::from(carried_lf) + embedded + u64::from(ends_with_lf));
        records.extend((0..skipped).map(|_| Vec::new()));
        carried_lf = last == Some(b'\r') && bytes.get(end) == Some(&b'\n');

        records.push(record.iter().map(str::to_string).collect());
    }

    Ok(records)
}
