//! Raw tables and the schema-binding step
//!
//! Readers turn bytes into a [`Table`] of text cells. [`Table::bind`] checks
//! the header against a [`SourceShape`] once, and the resulting
//! [`BoundTable`] yields typed [`BomRow`]s. Nothing downstream looks up
//! columns by name.

use std::collections::HashMap;

use crate::error::{Error, ParseWarning, Result};
use crate::ident::BomId;
use crate::ingest::shape::SourceShape;

/// One data row, normalized
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BomRow {
    /// 1-indexed row number in the original table
    pub line: usize,
    pub id: BomId,
    /// `None` when the next cell is empty: the row only carries descriptions
    pub next_id: Option<BomId>,
    pub description: Option<String>,
    pub next_description: Option<String>,
}

#[derive(Debug, Clone)]
struct RawRow {
    line: usize,
    cells: Vec<String>,
}

impl RawRow {
    fn cell(&self, index: usize) -> &str {
        self.cells.get(index).map_or("", |c| c.trim())
    }

    fn is_blank(&self) -> bool {
        self.cells.iter().all(|c| c.trim().is_empty())
    }
}

/// A table of text cells with a named header row
#[derive(Debug, Clone)]
pub struct Table {
    source_name: String,
    header: Vec<String>,
    rows: Vec<RawRow>,
}

impl Table {
    /// Build a table from raw records.
    ///
    /// The record at `header_offset` is the header; everything above it is
    /// discarded and blank records below it are dropped.
    pub fn from_records(
        source_name: impl Into<String>,
        records: Vec<Vec<String>>,
        header_offset: usize,
    ) -> Result<Self> {
        let source_name = source_name.into();
        let mut records = records.into_iter().enumerate().skip(header_offset);

        let (_, header) = records.next().ok_or_else(|| {
            Error::input_format(
                &source_name,
                format!("no header row at offset {header_offset}"),
            )
        })?;

        let rows = records
            .map(|(index, cells)| RawRow {
                line: index + 1,
                cells,
            })
            .filter(|row| !row.is_blank())
            .collect();

        Ok(Self {
            source_name,
            header: dedupe_headers(header),
            rows,
        })
    }

    /// Header labels after trimming and de-duplication
    pub fn header(&self) -> &[String] {
        &self.header
    }

    /// Number of non-blank data rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Resolve every column the shape needs.
    ///
    /// Fails with a schema error naming the first missing column.
    pub fn bind<'a>(&'a self, shape: &'a SourceShape) -> Result<BoundTable<'a>> {
        let position: HashMap<&str, usize> = self
            .header
            .iter()
            .enumerate()
            .map(|(i, name)| (name.as_str(), i))
            .collect();

        let find = |column: &str| {
            position
                .get(column)
                .copied()
                .ok_or_else(|| Error::schema(&self.source_name, column))
        };

        Ok(BoundTable {
            table: self,
            shape,
            id: find(shape.id_column.as_str())?,
            next: find(shape.next_column.as_str())?,
            description: shape.description_column.as_deref().map(find).transpose()?,
            next_description: shape
                .next_description_column
                .as_deref()
                .map(find)
                .transpose()?,
        })
    }
}

/// A [`Table`] whose columns have been checked against a shape
#[derive(Debug)]
pub struct BoundTable<'a> {
    table: &'a Table,
    shape: &'a SourceShape,
    id: usize,
    next: usize,
    description: Option<usize>,
    next_description: Option<usize>,
}

/// Result of reading one data row
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowRead {
    Row(BomRow),
    /// The id is valid but the next cell is not. The row keeps its id and own
    /// description so the id stays known, and carries no edge.
    Partial(BomRow, ParseWarning),
    /// The id itself is unreadable
    Skipped(ParseWarning),
}

impl BoundTable<'_> {
    /// Typed rows in table order.
    pub fn rows(&self) -> impl Iterator<Item = RowRead> + '_ {
        self.table.rows.iter().map(move |raw| self.read_row(raw))
    }

    fn read_row(&self, raw: &RawRow) -> RowRead {
        let policy = self.shape.id_policy;
        let warn = |column: &str, cell: &str| {
            ParseWarning::new(
                &self.table.source_name,
                raw.line,
                format!("{column} '{cell}' is not a valid BOM id"),
            )
        };

        let id_cell = raw.cell(self.id);
        let Some(id) = BomId::parse(id_cell, policy) else {
            return RowRead::Skipped(warn(&self.shape.id_column, id_cell));
        };

        let mut row = BomRow {
            line: raw.line,
            id,
            next_id: None,
            description: self.text(raw, self.description),
            next_description: None,
        };

        let next_cell = raw.cell(self.next);
        if next_cell.is_empty() {
            row.next_description = self.text(raw, self.next_description);
            return RowRead::Row(row);
        }

        match BomId::parse(next_cell, policy) {
            Some(next) => {
                row.next_id = Some(next);
                row.next_description = self.text(raw, self.next_description);
                RowRead::Row(row)
            }
            None => RowRead::Partial(row, warn(&self.shape.next_column, next_cell)),
        }
    }

    fn text(&self, raw: &RawRow, column: Option<usize>) -> Option<String> {
        let cell = raw.cell(column?);
        (!cell.is_empty()).then(|| cell.to_string())
    }
}

/// Trim header labels and suffix repeats with `.1`, `.2`, ...
///
/// Exports commonly carry two `Description` columns; the second one becomes
/// `Description.1`.
fn dedupe_headers(header: Vec<String>) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut out = Vec::with_capacity(header.len());

    for label in header {
        let label = label.trim().to_string();
        let count = seen.entry(label.clone()).or_insert(0);
        if *count == 0 {
            out.push(label);
        } else {
            out.push(format!("{label}.{count}"));
        }
        *count += 1;
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ident::IdPolicy;

    fn records(rows: &[&[&str]]) -> Vec<Vec<String>> {
        rows.iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect()
    }

    #[test]
    fn test_dedupe_headers() {
        let header = vec![
            " BOM ID".to_string(),
            "Description".to_string(),
            "Next BOM ID".to_string(),
            "Description".to_string(),
            "Description".to_string(),
        ];
        assert_eq!(
            dedupe_headers(header),
            vec!["BOM ID", "Description", "Next BOM ID", "Description.1", "Description.2"]
        );
    }

    #[test]
    fn test_header_offset_and_blank_rows() {
        let table = Table::from_records(
            "details",
            records(&[
                &["Report generated 2024-01-01"],
                &[""],
                &["BOM ID", "Next Bom", "Description"],
                &["1", "2", "Frame"],
                &["", "", ""],
                &["2", "", "Bolt"],
                &["", " ", ""],
            ]),
            2,
        )
        .unwrap();

        assert_eq!(table.header(), &["BOM ID", "Next Bom", "Description"]);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_missing_header_row() {
        let err = Table::from_records("empty.csv", records(&[&["a"]]), 3).unwrap_err();
        assert!(matches!(err, Error::InputFormat { .. }));
    }

    #[test]
    fn test_bind_reports_missing_column() {
        let table = Table::from_records(
            "export.csv",
            records(&[&["BOM ID", "Description"], &["1", "x"]]),
            0,
        )
        .unwrap();

        let shape = SourceShape::bom_export();
        match table.bind(&shape).unwrap_err() {
            Error::Schema {
                source_name,
                column,
            } => {
                assert_eq!(source_name, "export.csv");
                assert_eq!(column, "Next BOM ID");
            }
            other => panic!("Expected Schema error, got {other:?}"),
        }
    }

    #[test]
    fn test_rows_normalize_and_warn() {
        let table = Table::from_records(
            "details",
            records(&[
                &["BOM ID", "Next Bom", "Description"],
                &["100.0", "200", " Frame "],
                &["abc", "200", "Typo"],
                &["200", "", "Bolt"],
                &["300", "xyz", "Washer"],
                &["400"],
            ]),
            0,
        )
        .unwrap();

        let shape = SourceShape {
            header_offset: 0,
            ..SourceShape::bom_details()
        };
        assert_eq!(shape.id_policy, IdPolicy::Integer);

        let bound = table.bind(&shape).unwrap();
        let results: Vec<_> = bound.rows().collect();
        assert_eq!(results.len(), 5);

        let RowRead::Row(first) = &results[0] else {
            panic!("Expected a full row, got {:?}", results[0]);
        };
        assert_eq!(first.line, 2);
        assert_eq!(first.id, BomId::Number(100));
        assert_eq!(first.next_id, Some(BomId::Number(200)));
        assert_eq!(first.description.as_deref(), Some("Frame"));
        assert_eq!(first.next_description, None);

        let RowRead::Skipped(warning) = &results[1] else {
            panic!("Expected a skipped row, got {:?}", results[1]);
        };
        assert_eq!(warning.row, 3);
        assert!(warning.message.contains("abc"));

        let RowRead::Row(description_only) = &results[2] else {
            panic!("Expected a full row, got {:?}", results[2]);
        };
        assert_eq!(description_only.next_id, None);
        assert_eq!(description_only.description.as_deref(), Some("Bolt"));

        let RowRead::Partial(bad_next, warning) = &results[3] else {
            panic!("Expected a partial row, got {:?}", results[3]);
        };
        assert_eq!(bad_next.id, BomId::Number(300));
        assert_eq!(bad_next.next_id, None);
        assert_eq!(bad_next.description.as_deref(), Some("Washer"));
        assert!(warning.message.contains("Next Bom"));

        // Short row: missing cells read as empty
        let RowRead::Row(short) = &results[4] else {
            panic!("Expected a full row, got {:?}", results[4]);
        };
        assert_eq!(short.id, BomId::Number(400));
        assert_eq!(short.next_id, None);
        assert_eq!(short.description, None);
    }

    #[test]
    fn test_bad_next_drops_next_description() {
        let table = Table::from_records(
            "export.csv",
            records(&[
                &["BOM ID", "Description", "Next BOM ID", "Description"],
                &["1", "Frame", "", "Bolt"],
                &["2", "Fork", "zz", "Ghost"],
            ]),
            0,
        )
        .unwrap();
        let shape = SourceShape {
            id_policy: IdPolicy::Integer,
            ..SourceShape::bom_export()
        };
        let bound = table.bind(&shape).unwrap();

        // An empty next cell still reads the next-description column
        let rows: Vec<_> = bound.rows().collect();
        let RowRead::Row(row) = &rows[0] else {
            panic!("Expected a full row, got {:?}", rows[0]);
        };
        assert_eq!(row.next_description.as_deref(), Some("Bolt"));

        let RowRead::Partial(partial, _) = &rows[1] else {
            panic!("Expected a partial row, got {:?}", rows[1]);
        };
        assert_eq!(partial.description.as_deref(), Some("Fork"));
        assert_eq!(partial.next_description, None);
    }
}
