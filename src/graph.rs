//! Adjacency mapping and edge extraction.

use crate::neighbor_list::NeighborList;
use std::collections::HashMap;
use std::hash::Hash;

/// Externally owned adjacency: each node's row is its bounded ranked
/// neighbor list. The search engine and edge extraction only read it.
pub type AdjacencyMap<N> = HashMap<N, NeighborList<N>>;

/// A directed, weighted edge of the k-NN graph.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Edge<N> {
    pub source: N,
    pub target: N,
    pub similarity: f64,
}

/// Flatten an adjacency map into a plain edge list, one edge per
/// (source, neighbor-entry) pair, for export and visualization tooling.
///
/// No order is guaranteed across sources; within one source the edges follow
/// the row's similarity-descending iteration order.
pub fn extract_edges<N: Eq + Hash + Clone>(adjacency: &AdjacencyMap<N>) -> Vec<Edge<N>> {
    let mut edges = Vec::with_capacity(adjacency.values().map(NeighborList::len).sum());

    for (source, row) in adjacency {
        for neighbor in row {
            edges.push(Edge {
                source: source.clone(),
                target: neighbor.node.clone(),
                similarity: neighbor.similarity,
            });
        }
    }

    edges
}
