//! End-to-end operations: ingest → build → (traverse →) render
//!
//! Each call builds its own graph from scratch and drops it on return.

use tracing::info;

use crate::builder::{self, BuildOptions};
use crate::error::{ParseWarning, Result};
use crate::graph::BomGraph;
use crate::ident::BomId;
use crate::ingest::{self, IngestedSource, SourceInput};
use crate::report::{DistanceReport, EdgeList};
use crate::traverse;

/// Output of an operation plus the rows that were skipped to produce it
#[derive(Debug, Clone)]
pub struct Outcome<T> {
    pub output: T,
    pub warnings: Vec<ParseWarning>,
}

fn load(inputs: &[SourceInput], options: &BuildOptions) -> Result<(BomGraph, Vec<ParseWarning>)> {
    let sources: Vec<IngestedSource> = ingest::ingest_all(inputs)?;
    let graph = builder::build(&sources, options);
    let warnings = sources.into_iter().flat_map(|s| s.warnings).collect();
    Ok((graph, warnings))
}

/// Distance report around `start` within `max_distance` hops.
pub fn analyze(
    inputs: &[SourceInput],
    start: &BomId,
    max_distance: usize,
    options: &BuildOptions,
) -> Result<Outcome<DistanceReport>> {
    let (graph, warnings) = load(inputs, options)?;
    let hood = traverse::neighborhood(&graph, start, max_distance)?;

    info!(
        start = %start,
        max_distance,
        precursors = hood.precursors.values().map(Vec::len).sum::<usize>(),
        successors = hood.successors.values().map(Vec::len).sum::<usize>(),
        "Analyzed BOM neighborhood"
    );

    Ok(Outcome {
        output: DistanceReport::new(&graph, &hood),
        warnings,
    })
}

/// Merge all sources into one described edge list.
pub fn merge(inputs: &[SourceInput], options: &BuildOptions) -> Result<Outcome<EdgeList>> {
    let (graph, warnings) = load(inputs, options)?;

    Ok(Outcome {
        output: EdgeList::new(&graph),
        warnings,
    })
}
