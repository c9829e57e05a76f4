//! Tabular ingestion: bytes in, typed BOM rows out
//!
//! Each source is a named byte stream plus a [`SourceShape`]. Ingestion runs
//! in three steps:
//!
//! 1. A format reader ([`delimited`] or [`workbook`]) turns bytes into raw
//!    text records. Unreadable bytes fail with an input-format error.
//! 2. [`Table::from_records`] locates the header row and drops blank rows,
//!    then [`Table::bind`] checks the header against the shape. A missing
//!    column fails with a schema error.
//! 3. The bound table yields [`BomRow`]s. A row whose own id cannot be
//!    normalized is skipped; a row whose next id cannot be normalized keeps
//!    its id but no edge. Both are recorded as [`ParseWarning`]s.
//!
//! [`ingest_all`] validates every source before returning, so a bad second
//! file is reported before any graph work starts.

use std::path::Path;

use tracing::{debug, warn};

use crate::error::{ParseWarning, Result};

pub mod delimited;
pub mod shape;
pub mod table;
pub mod workbook;

pub use shape::{EdgeDirection, ShapeRegistry, SourceShape};
pub use table::{BomRow, BoundTable, RowRead, Table};

/// Container format of a source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Csv,
    Spreadsheet,
}

const ZIP_MAGIC: &[u8] = b"PK\x03\x04";
const OLE_MAGIC: &[u8] = b"\xD0\xCF\x11\xE0\xA1\xB1\x1A\xE1";

impl SourceFormat {
    /// Guess the format from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "csv" | "txt" => Some(Self::Csv),
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Some(Self::Spreadsheet),
            _ => None,
        }
    }

    /// Guess the format from the leading bytes: ZIP and OLE containers are
    /// workbooks, anything else is treated as CSV.
    pub fn sniff(bytes: &[u8]) -> Self {
        if bytes.starts_with(ZIP_MAGIC) || bytes.starts_with(OLE_MAGIC) {
            Self::Spreadsheet
        } else {
            Self::Csv
        }
    }

    /// Extension first, content second.
    pub fn detect(name: &str, bytes: &[u8]) -> Self {
        Self::from_path(Path::new(name)).unwrap_or_else(|| Self::sniff(bytes))
    }
}

/// A named byte stream awaiting ingestion
#[derive(Debug, Clone)]
pub struct SourceInput {
    /// Used in errors and warnings, typically the file name
    pub name: String,
    pub shape: SourceShape,
    /// `None` detects the format from `name` and the bytes
    pub format: Option<SourceFormat>,
    pub bytes: Vec<u8>,
}

impl SourceInput {
    pub fn new(name: impl Into<String>, shape: SourceShape, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            shape,
            format: None,
            bytes,
        }
    }

    /// Force a format instead of detecting it.
    pub fn with_format(mut self, format: SourceFormat) -> Self {
        self.format = Some(format);
        self
    }

    pub fn format(&self) -> SourceFormat {
        self.format
            .unwrap_or_else(|| SourceFormat::detect(&self.name, &self.bytes))
    }
}

/// The typed rows of one source, plus the rows that had to be skipped
#[derive(Debug, Clone)]
pub struct IngestedSource {
    pub name: String,
    pub direction: EdgeDirection,
    pub rows: Vec<BomRow>,
    pub warnings: Vec<ParseWarning>,
}

impl IngestedSource {
    /// Source built directly from rows, bypassing the readers
    pub fn from_rows(name: impl Into<String>, direction: EdgeDirection, rows: Vec<BomRow>) -> Self {
        Self {
            name: name.into(),
            direction,
            rows,
            warnings: Vec::new(),
        }
    }
}

/// Read, validate and normalize one source.
pub fn ingest(input: &SourceInput) -> Result<IngestedSource> {
    let format = input.format();
    debug!(source = %input.name, ?format, bytes = input.bytes.len(), "Reading source");

    let records = match format {
        SourceFormat::Csv => delimited::read_records(&input.name, &input.bytes)?,
        SourceFormat::Spreadsheet => workbook::read_records(&input.name, &input.bytes)?,
    };

    let table = Table::from_records(&input.name, records, input.shape.header_offset)?;
    let bound = table.bind(&input.shape)?;

    let mut rows = Vec::with_capacity(table.len());
    let mut warnings = Vec::new();
    for read in bound.rows() {
        match read {
            RowRead::Row(row) => rows.push(row),
            RowRead::Partial(row, warning) => {
                warn!("{warning}");
                rows.push(row);
                warnings.push(warning);
            }
            RowRead::Skipped(warning) => {
                warn!("{warning}");
                warnings.push(warning);
            }
        }
    }

    debug!(
        source = %input.name,
        rows = rows.len(),
        skipped = warnings.len(),
        "Source ingested"
    );

    Ok(IngestedSource {
        name: input.name.clone(),
        direction: input.shape.direction,
        rows,
        warnings,
    })
}

/// Ingest every source, failing on the first unreadable or mis-shaped one.
///
/// The returned sources keep the input order, which is also the
/// description priority order used by the graph builder.
pub fn ingest_all(inputs: &[SourceInput]) -> Result<Vec<IngestedSource>> {
    inputs.iter().map(ingest).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::ident::BomId;

    #[test]
    fn test_format_from_path() {
        assert_eq!(SourceFormat::from_path(Path::new("bom.CSV")), Some(SourceFormat::Csv));
        assert_eq!(
            SourceFormat::from_path(Path::new("details.xlsx")),
            Some(SourceFormat::Spreadsheet)
        );
        assert_eq!(SourceFormat::from_path(Path::new("upload")), None);
    }

    #[test]
    fn test_format_sniff() {
        assert_eq!(SourceFormat::sniff(b"PK\x03\x04rest"), SourceFormat::Spreadsheet);
        assert_eq!(SourceFormat::sniff(b"BOM ID,Next"), SourceFormat::Csv);
        assert_eq!(SourceFormat::detect("upload", b"BOM ID"), SourceFormat::Csv);
    }

    #[test]
    fn test_ingest_csv_source() {
        let csv = "BOM ID,Description,Next BOM ID,Description\n\
                   1,Frame,2,Bolt\n\
                   x1,Odd,2,Bolt\n\
                   ,,,\n";
        let input = SourceInput::new("bom.csv", SourceShape::bom_export(), csv.into());

        let source = ingest(&input).unwrap();

        assert_eq!(source.rows.len(), 2);
        assert!(source.warnings.is_empty());
        assert_eq!(source.rows[0].id, BomId::Number(1));
        assert_eq!(source.rows[0].next_description.as_deref(), Some("Bolt"));
        assert_eq!(source.rows[1].id, BomId::Text("x1".into()));
    }

    #[test]
    fn test_bad_next_cell_keeps_row_id_known() {
        let shape = SourceShape {
            header_offset: 0,
            ..SourceShape::bom_details()
        };
        let csv = "BOM ID,Next Bom,Description\n1,5,Frame\n5,xyz,Bolt\n";
        let input = SourceInput::new("details.csv", shape, csv.into());

        let source = ingest(&input).unwrap();

        assert_eq!(source.rows.len(), 2);
        assert_eq!(source.warnings.len(), 1);
        assert_eq!(source.warnings[0].row, 3);
        assert_eq!(source.rows[1].id, BomId::Number(5));
        assert_eq!(source.rows[1].next_id, None);

        let graph = crate::builder::build(&[source], &Default::default());
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.successors(&BomId::Number(1)), vec![&BomId::Number(5)]);
        assert_eq!(graph.describe(&BomId::Number(5)), "Bolt");
    }

    #[test]
    fn test_ingest_all_stops_at_schema_error() {
        let good = SourceInput::new(
            "a.csv",
            SourceShape::bom_export(),
            b"BOM ID,Description,Next BOM ID,Description\n1,A,2,B\n".to_vec(),
        );
        let bad = SourceInput::new(
            "b.csv",
            SourceShape::bom_export(),
            b"BOM ID,Next BOM ID\n1,2\n".to_vec(),
        );

        let err = ingest_all(&[good, bad]).unwrap_err();
        match err {
            Error::Schema { source_name, column } => {
                assert_eq!(source_name, "b.csv");
                assert_eq!(column, "Description");
            }
            other => panic!("Expected Schema error, got {other:?}"),
        }
    }

    #[test]
    fn test_forced_spreadsheet_format_rejects_csv_bytes() {
        let input = SourceInput::new("upload", SourceShape::bom_export(), b"BOM ID\n".to_vec())
            .with_format(SourceFormat::Spreadsheet);
        assert!(matches!(ingest(&input), Err(Error::InputFormat { .. })));
    }
}
