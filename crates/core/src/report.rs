//! Report shaping and serialization
//!
//! Two tables come out of the core:
//!
//! - [`DistanceReport`]: precursors and successors of one node, zipped per
//!   distance. At each distance the i-th precursor shares a row with the
//!   i-th successor; the shorter list leaves its columns blank. Row count is
//!   linear in the traversal size.
//! - [`EdgeList`]: the merged graph as one row per edge.
//!
//! Both serialize to CSV (header first), to JSON (array of row objects) and
//! to a single-sheet xlsx workbook with a bold header row.

use rust_xlsxwriter::{Format, Workbook, XlsxError};
use serde::Serialize;
use std::io::Write;

use crate::error::{Error, Result};
use crate::graph::BomGraph;
use crate::ident::BomId;
use crate::traverse::{DistanceBuckets, Neighborhood};

/// Column labels of the distance report, in order
pub const REPORT_HEADER: [&str; 5] = [
    "Distance",
    "Precursor BOM ID",
    "Precursor Description",
    "Successor BOM ID",
    "Successor Description",
];

/// Column labels of the merged edge list, in order
pub const EDGE_LIST_HEADER: [&str; 4] = ["BOM ID", "Description", "Next BOM ID", "Description"];

/// An id with its resolved description
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DescribedId {
    pub id: BomId,
    pub description: String,
}

/// One row of the distance report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRow {
    pub distance: usize,
    pub precursor: Option<DescribedId>,
    pub successor: Option<DescribedId>,
}

impl ReportRow {
    fn cells(&self) -> [String; 5] {
        let split = |cell: &Option<DescribedId>| match cell {
            Some(d) => (d.id.to_string(), d.description.clone()),
            None => (String::new(), String::new()),
        };
        let (p_id, p_desc) = split(&self.precursor);
        let (s_id, s_desc) = split(&self.successor);
        [self.distance.to_string(), p_id, p_desc, s_id, s_desc]
    }

    fn sheet_cells(&self) -> [SheetCell<'_>; 5] {
        let (p_id, p_desc) = SheetCell::pair(&self.precursor);
        let (s_id, s_desc) = SheetCell::pair(&self.successor);
        [SheetCell::Number(self.distance as f64), p_id, p_desc, s_id, s_desc]
    }
}

/// Rectangular precursor/successor table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DistanceReport {
    pub start: BomId,
    pub max_distance: usize,
    pub rows: Vec<ReportRow>,
}

/// Zip precursor and successor buckets into report rows.
///
/// Distances run `0..=max_distance`. Distance 0 never holds data since
/// discovery starts at 1, so it contributes no rows.
pub fn render<'a, F>(
    max_distance: usize,
    precursors: &DistanceBuckets,
    successors: &DistanceBuckets,
    describe: F,
) -> Vec<ReportRow>
where
    F: Fn(&BomId) -> &'a str,
{
    let described = |id: &BomId| DescribedId {
        id: id.clone(),
        description: describe(id).to_string(),
    };

    let mut rows = Vec::new();
    for distance in 0..=max_distance {
        let prec = precursors.get(&distance).map_or(&[][..], Vec::as_slice);
        let succ = successors.get(&distance).map_or(&[][..], Vec::as_slice);

        for i in 0..prec.len().max(succ.len()) {
            rows.push(ReportRow {
                distance,
                precursor: prec.get(i).map(described),
                successor: succ.get(i).map(described),
            });
        }
    }
    rows
}

impl DistanceReport {
    /// Render a traversal result against the graph's descriptions.
    pub fn new(graph: &BomGraph, hood: &Neighborhood) -> Self {
        Self {
            start: hood.start.clone(),
            max_distance: hood.max_distance,
            rows: render(hood.max_distance, &hood.precursors, &hood.successors, |id| {
                graph.describe(id)
            }),
        }
    }

    /// Suggested download name, e.g. `BOM_123_2_edges.csv`
    pub fn file_name(&self, extension: &str) -> String {
        format!("BOM_{}_{}_edges.{extension}", self.start, self.max_distance)
    }

    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        write_table(writer, &REPORT_HEADER, self.rows.iter().map(ReportRow::cells))
    }

    pub fn write_json<W: Write>(&self, writer: W) -> Result<()> {
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    pub fn write_xlsx<W: Write>(&self, writer: W) -> Result<()> {
        write_sheet(writer, &REPORT_HEADER, self.rows.iter().map(ReportRow::sheet_cells))
    }
}

/// One row of the merged edge list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EdgeRow {
    pub id: BomId,
    pub description: String,
    pub next_id: BomId,
    pub next_description: String,
}

/// The whole graph as described edges, in edge insertion order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct EdgeList {
    pub rows: Vec<EdgeRow>,
}

impl EdgeList {
    pub fn new(graph: &BomGraph) -> Self {
        let rows = graph
            .edges()
            .map(|(from, to)| EdgeRow {
                id: from.clone(),
                description: graph.describe(from).to_string(),
                next_id: to.clone(),
                next_description: graph.describe(to).to_string(),
            })
            .collect();
        Self { rows }
    }

    /// Suggested download name
    pub fn file_name(extension: &str) -> String {
        format!("bom_graph.{extension}")
    }

    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        write_table(
            writer,
            &EDGE_LIST_HEADER,
            self.rows.iter().map(|r| {
                [
                    r.id.to_string(),
                    r.description.clone(),
                    r.next_id.to_string(),
                    r.next_description.clone(),
                ]
            }),
        )
    }

    pub fn write_json<W: Write>(&self, writer: W) -> Result<()> {
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    pub fn write_xlsx<W: Write>(&self, writer: W) -> Result<()> {
        write_sheet(
            writer,
            &EDGE_LIST_HEADER,
            self.rows.iter().map(|r| {
                [
                    SheetCell::from(&r.id),
                    SheetCell::Text(&r.description),
                    SheetCell::from(&r.next_id),
                    SheetCell::Text(&r.next_description),
                ]
            }),
        )
    }
}

/// A typed worksheet cell; numeric ids stay numbers in the sheet
enum SheetCell<'a> {
    Number(f64),
    Text(&'a str),
    Blank,
}

impl<'a> SheetCell<'a> {
    fn pair(cell: &'a Option<DescribedId>) -> (Self, Self) {
        match cell {
            Some(d) => (Self::from(&d.id), Self::Text(&d.description)),
            None => (Self::Blank, Self::Blank),
        }
    }
}

impl<'a> From<&'a BomId> for SheetCell<'a> {
    fn from(id: &'a BomId) -> Self {
        match id {
            BomId::Number(n) => Self::Number(*n as f64),
            BomId::Text(s) => Self::Text(s),
        }
    }
}

fn write_table<W, I, const N: usize>(writer: W, header: &[&str; N], rows: I) -> Result<()>
where
    W: Write,
    I: IntoIterator<Item = [String; N]>,
{
    let mut out = csv::Writer::from_writer(writer);
    out.write_record(header).map_err(csv_error)?;
    for row in rows {
        out.write_record(&row).map_err(csv_error)?;
    }
    out.flush()?;
    Ok(())
}

fn csv_error(err: csv::Error) -> Error {
    Error::Unexpected(format!("CSV write failed: {err}"))
}

fn write_sheet<'a, W, I, const N: usize>(mut writer: W, header: &[&str; N], rows: I) -> Result<()>
where
    W: Write,
    I: IntoIterator<Item = [SheetCell<'a>; N]>,
{
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    let bold = Format::new().set_bold();

    for (col, label) in header.iter().enumerate() {
        sheet
            .write_string_with_format(0, col as u16, *label, &bold)
            .map_err(xlsx_error)?;
    }
    for (i, cells) in rows.into_iter().enumerate() {
        let row = u32::try_from(i + 1)
            .map_err(|_| Error::Unexpected("too many rows for a worksheet".to_string()))?;
        for (col, cell) in cells.into_iter().enumerate() {
            let col = col as u16;
            let written = match cell {
                SheetCell::Number(n) => sheet.write_number(row, col, n),
                SheetCell::Text(text) => sheet.write_string(row, col, text),
                SheetCell::Blank => continue,
            };
            written.map_err(xlsx_error)?;
        }
    }

    let bytes = workbook.save_to_buffer().map_err(xlsx_error)?;
    writer.write_all(&bytes)?;
    Ok(())
}

fn xlsx_error(err: XlsxError) -> Error {
    Error::Unexpected(format!("workbook write failed: {err}"))
}
