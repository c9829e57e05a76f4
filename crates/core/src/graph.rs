//! Graph data structures for BOM dependencies
//!
//! Uses `petgraph::StableGraph` for storage, with a side map from canonical
//! [`BomId`] to node index so lookups by id are O(1). Edges point from a
//! component to the component it decomposes into.
//!
//! A `BomGraph` is only assembled by the builder; once built, the public API
//! is read-only.

use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use petgraph::visit::{EdgeRef, IntoEdgeReferences};
use petgraph::Direction;
use std::collections::{HashMap, HashSet};

use crate::ident::BomId;

/// Description reported for nodes that never received one
pub const MISSING_DESCRIPTION: &str = "N/A";

/// A node in the BOM graph
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BomNode {
    pub id: BomId,
    /// First non-empty description seen for this id
    pub description: Option<String>,
}

/// Directed BOM dependency graph
///
/// Node and edge iteration follow insertion order. Parallel edges are never
/// stored.
#[derive(Debug, Clone, Default)]
pub struct BomGraph {
    inner: StableDiGraph<BomNode, ()>,
    index: HashMap<BomId, NodeIndex>,
    edge_set: HashSet<(NodeIndex, NodeIndex)>,
}

impl BomGraph {
    /// Create a new empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Index of `id`, adding a node for it if needed
    pub(crate) fn ensure_node(&mut self, id: &BomId) -> NodeIndex {
        if let Some(&idx) = self.index.get(id) {
            return idx;
        }
        let idx = self.inner.add_node(BomNode {
            id: id.clone(),
            description: None,
        });
        self.index.insert(id.clone(), idx);
        idx
    }

    /// Add `from -> to` unless it already exists. Returns `true` if added.
    pub(crate) fn add_edge(&mut self, from: &BomId, to: &BomId) -> bool {
        let a = self.ensure_node(from);
        let b = self.ensure_node(to);
        if !self.edge_set.insert((a, b)) {
            return false;
        }
        self.inner.add_edge(a, b, ());
        true
    }

    /// Set the description of `id` if the node exists and has none yet.
    pub(crate) fn offer_description(&mut self, id: &BomId, description: &str) {
        if let Some(node) = self.index.get(id).and_then(|&idx| self.inner.node_weight_mut(idx)) {
            if node.description.is_none() {
                node.description = Some(description.to_string());
            }
        }
    }

    /// Get the number of nodes in the graph
    pub fn node_count(&self) -> usize {
        self.inner.node_count()
    }

    /// Get the number of edges in the graph
    pub fn edge_count(&self) -> usize {
        self.inner.edge_count()
    }

    pub fn contains(&self, id: &BomId) -> bool {
        self.index.contains_key(id)
    }

    pub fn node(&self, id: &BomId) -> Option<&BomNode> {
        self.index.get(id).and_then(|&idx| self.inner.node_weight(idx))
    }

    /// Resolved description, if any
    pub fn description(&self, id: &BomId) -> Option<&str> {
        self.node(id).and_then(|n| n.description.as_deref())
    }

    /// Resolved description, or [`MISSING_DESCRIPTION`]
    pub fn describe(&self, id: &BomId) -> &str {
        self.description(id).unwrap_or(MISSING_DESCRIPTION)
    }

    /// Iterate over all nodes in insertion order
    pub fn nodes(&self) -> impl Iterator<Item = &BomNode> {
        self.inner.node_weights()
    }

    /// Iterate over all edges as `(from, to)` in insertion order
    pub fn edges(&self) -> impl Iterator<Item = (&BomId, &BomId)> + '_ {
        self.inner
            .edge_references()
            .map(|e| (&self.inner[e.source()].id, &self.inner[e.target()].id))
    }

    /// Direct children of `id`, in edge insertion order
    pub fn successors(&self, id: &BomId) -> Vec<&BomId> {
        self.neighbors(id, Direction::Outgoing)
    }

    /// Direct parents of `id`, in edge insertion order
    pub fn predecessors(&self, id: &BomId) -> Vec<&BomId> {
        self.neighbors(id, Direction::Incoming)
    }

    fn neighbors(&self, id: &BomId, direction: Direction) -> Vec<&BomId> {
        let Some(&idx) = self.index.get(id) else {
            return Vec::new();
        };
        // petgraph walks adjacency newest-first
        let mut out: Vec<&BomId> = self
            .inner
            .neighbors_directed(idx, direction)
            .map(|n| &self.inner[n].id)
            .collect();
        out.reverse();
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(n: i64) -> BomId {
        BomId::Number(n)
    }

    #[test]
    fn test_add_edge_deduplicates() {
        let mut graph = BomGraph::new();
        assert!(graph.add_edge(&id(1), &id(2)));
        assert!(graph.add_edge(&id(2), &id(3)));
        assert!(!graph.add_edge(&id(1), &id(2)));

        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn test_reverse_edge_is_distinct() {
        let mut graph = BomGraph::new();
        graph.add_edge(&id(1), &id(2));
        graph.add_edge(&id(2), &id(1));
        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn test_neighbors_in_insertion_order() {
        let mut graph = BomGraph::new();
        graph.add_edge(&id(2), &id(3));
        graph.add_edge(&id(2), &id(4));
        graph.add_edge(&id(2), &id(5));
        graph.add_edge(&id(1), &id(2));
        graph.add_edge(&id(0), &id(2));

        assert_eq!(graph.successors(&id(2)), vec![&id(3), &id(4), &id(5)]);
        assert_eq!(graph.predecessors(&id(2)), vec![&id(1), &id(0)]);
        assert!(graph.successors(&id(99)).is_empty());
    }

    #[test]
    fn test_first_description_wins() {
        let mut graph = BomGraph::new();
        graph.add_edge(&id(1), &id(2));
        graph.offer_description(&id(1), "Widget");
        graph.offer_description(&id(1), "Gadget");
        // Unknown ids are ignored
        graph.offer_description(&id(7), "Ghost");

        assert_eq!(graph.describe(&id(1)), "Widget");
        assert_eq!(graph.describe(&id(2)), MISSING_DESCRIPTION);
        assert!(!graph.contains(&id(7)));
    }

    #[test]
    fn test_edges_in_insertion_order() {
        let mut graph = BomGraph::new();
        graph.add_edge(&id(5), &id(6));
        graph.add_edge(&id(1), &id(2));
        let edges: Vec<_> = graph.edges().collect();
        assert_eq!(edges, vec![(&id(5), &id(6)), (&id(1), &id(2))]);
    }
}
