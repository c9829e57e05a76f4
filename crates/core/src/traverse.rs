//! Bounded breadth-first traversal
//!
//! Both directions use the same FIFO discipline: a `VecDeque` popped from
//! the front, with a visited set owned by the single traversal call. A node is
//! recorded at the first distance it is reached and never again.

use serde::Serialize;
use std::collections::{BTreeMap, HashSet, VecDeque};

use tracing::debug;

use crate::error::{Error, Result};
use crate::graph::BomGraph;
use crate::ident::BomId;

/// Which adjacency a traversal follows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Reverse edges: upstream ancestors
    Precursors,
    /// Forward edges: downstream descendants
    Successors,
}

/// Nodes bucketed by hop distance, each bucket in discovery order
///
/// Only non-empty buckets are present; keys lie in `1..=max_distance`.
pub type DistanceBuckets = BTreeMap<usize, Vec<BomId>>;

/// Traverse from `start` over one adjacency, up to `max_distance` hops.
///
/// Fails with [`Error::NotFound`] before any work if `start` is not a node.
pub fn traverse(
    graph: &BomGraph,
    start: &BomId,
    max_distance: usize,
    direction: Direction,
) -> Result<DistanceBuckets> {
    if !graph.contains(start) {
        return Err(Error::NotFound {
            id: start.to_string(),
        });
    }

    let step = |id: &BomId| match direction {
        Direction::Precursors => graph.predecessors(id),
        Direction::Successors => graph.successors(id),
    };

    let mut buckets = DistanceBuckets::new();
    let mut visited: HashSet<&BomId> = HashSet::new();
    let mut queue: VecDeque<(&BomId, usize)> = VecDeque::new();

    visited.insert(start);
    if max_distance > 0 {
        queue.push_back((start, 0));
    }

    while let Some((node, distance)) = queue.pop_front() {
        let next_distance = distance + 1;
        for neighbor in step(node) {
            if !visited.insert(neighbor) {
                continue;
            }
            buckets
                .entry(next_distance)
                .or_default()
                .push(neighbor.clone());
            if next_distance < max_distance {
                queue.push_back((neighbor, next_distance));
            }
        }
    }

    debug!(
        start = %start,
        ?direction,
        max_distance,
        found = buckets.values().map(Vec::len).sum::<usize>(),
        "Traversal complete"
    );

    Ok(buckets)
}

/// Precursors and successors of one start node
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Neighborhood {
    pub start: BomId,
    pub max_distance: usize,
    pub precursors: DistanceBuckets,
    pub successors: DistanceBuckets,
}

impl Neighborhood {
    /// Total nodes found in both directions (a node can count twice)
    pub fn len(&self) -> usize {
        self.precursors
            .values()
            .chain(self.successors.values())
            .map(Vec::len)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Run both traversals independently from `start`.
pub fn neighborhood(graph: &BomGraph, start: &BomId, max_distance: usize) -> Result<Neighborhood> {
    let precursors = traverse(graph, start, max_distance, Direction::Precursors)?;
    let successors = traverse(graph, start, max_distance, Direction::Successors)?;

    Ok(Neighborhood {
        start: start.clone(),
        max_distance,
        precursors,
        successors,
    })
}
