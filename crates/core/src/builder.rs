//! Graph model builder
//!
//! Turns ingested sources into a [`BomGraph`] in two passes:
//!
//! 1. Collect the known-id universe: every row's own id, in every source.
//! 2. Walk the sources in the order given, adding an edge for each row whose
//!    next id is known, and offering descriptions first-come-first-served.
//!
//! A next id with no row of its own is treated as a typo or an out-of-scope
//! reference: the edge is dropped and no node is created for it.
//!
//! # Example
//!
//! ```
//! use bom_graph_core::builder::{self, BuildOptions};
//! use bom_graph_core::ingest::{BomRow, EdgeDirection, IngestedSource};
//! use bom_graph_core::BomId;
//!
//! let row = |line, id: i64, next: Option<i64>| BomRow {
//!     line,
//!     id: id.into(),
//!     next_id: next.map(BomId::from),
//!     description: None,
//!     next_description: None,
//! };
//! let source = IngestedSource::from_rows(
//!     "bom.csv",
//!     EdgeDirection::IdToNext,
//!     vec![row(2, 1, Some(2)), row(3, 2, None), row(4, 2, Some(99))],
//! );
//!
//! let graph = builder::build(&[source], &BuildOptions::default());
//! assert_eq!(graph.edge_count(), 1); // 2 -> 99 is dropped: 99 has no row
//! ```

use std::collections::HashSet;

use tracing::{debug, info};

use crate::graph::BomGraph;
use crate::ident::BomId;
use crate::ingest::IngestedSource;

/// What to do with known ids that end up on no accepted edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IsolatedNodes {
    /// Node set is the union of edge endpoints
    #[default]
    Exclude,
    /// Every known id becomes a node, with empty adjacency if it has no edges
    Include,
}

/// Builder configuration
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    pub isolated_nodes: IsolatedNodes,
}

/// Every row's own id across all sources.
pub fn known_ids(sources: &[IngestedSource]) -> HashSet<BomId> {
    sources
        .iter()
        .flat_map(|s| s.rows.iter().map(|r| r.id.clone()))
        .collect()
}

/// Build a graph, deriving the known-id universe from the sources.
pub fn build(sources: &[IngestedSource], options: &BuildOptions) -> BomGraph {
    let known = known_ids(sources);
    build_with_known_ids(sources, &known, options)
}

/// Build a graph, validating next ids against `known_ids`.
///
/// Sources are visited in slice order; earlier sources win description ties.
pub fn build_with_known_ids(
    sources: &[IngestedSource],
    known_ids: &HashSet<BomId>,
    options: &BuildOptions,
) -> BomGraph {
    let mut graph = BomGraph::new();
    let mut dropped = 0usize;

    for source in sources {
        for row in &source.rows {
            let Some(next) = &row.next_id else {
                continue;
            };
            if !known_ids.contains(next) {
                debug!(source = %source.name, line = row.line, next = %next, "Dropping reference to unknown BOM ID");
                dropped += 1;
                continue;
            }
            let (from, to) = source.direction.orient(&row.id, next);
            graph.add_edge(from, to);
        }
    }

    if options.isolated_nodes == IsolatedNodes::Include {
        // Walk rows rather than the set so node order stays deterministic
        for source in sources {
            for row in &source.rows {
                if known_ids.contains(&row.id) {
                    graph.ensure_node(&row.id);
                }
            }
        }
    }

    // Node set is final here; descriptions only attach to existing nodes
    for source in sources {
        for row in &source.rows {
            if let Some(text) = &row.description {
                graph.offer_description(&row.id, text);
            }
            if let (Some(next), Some(text)) = (&row.next_id, &row.next_description) {
                graph.offer_description(next, text);
            }
        }
    }

    info!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        dropped_references = dropped,
        "Built BOM graph"
    );

    graph
}
