//! Per-search accounting: neighbors found plus the cost of finding them.

use crate::error::{GraphError, Result};
use crate::neighbor_list::NeighborList;
use std::fmt;
use std::hash::Hash;

/// Counter snapshot of a search result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SearchStats {
    /// Similarity evaluations performed.
    pub similarities: u64,
    /// Restarts after reaching a local maximum.
    pub restarts: u64,
    /// Halts after reaching a partition boundary.
    pub boundary_restarts: u64,
}

/// Result of one search attempt: the neighbors retained so far, the work
/// spent finding them, and where the attempt stopped if it hit a partition
/// boundary.
///
/// Each attempt owns its result exclusively; independent attempts (parallel
/// seeds, or shards of a partitioned graph) are folded together afterwards
/// with [`SearchResult::merge`] / [`SearchResult::merge_many`].
#[derive(Debug, Clone)]
pub struct SearchResult<N> {
    similarities: u64,
    restarts: u64,
    boundary_restarts: u64,
    neighbors: NeighborList<N>,
    boundary_node: Option<N>,
}

impl<N: Eq + Hash + Clone> SearchResult<N> {
    /// Initialize an empty result for a neighbor list of size `k`.
    pub fn new(k: usize) -> Result<Self> {
        Ok(Self {
            similarities: 0,
            restarts: 0,
            boundary_restarts: 0,
            neighbors: NeighborList::new(k)?,
            boundary_node: None,
        })
    }

    /// Number of similarity evaluations performed.
    pub fn similarities(&self) -> u64 {
        self.similarities
    }

    /// Number of restarts after reaching a local maximum.
    pub fn restarts(&self) -> u64 {
        self.restarts
    }

    /// Number of halts after reaching the boundary of the partition.
    pub fn boundary_restarts(&self) -> u64 {
        self.boundary_restarts
    }

    /// The most similar neighbors found so far.
    pub fn neighbors(&self) -> &NeighborList<N> {
        &self.neighbors
    }

    // Only the engine driving this attempt offers candidates.
    pub(crate) fn neighbors_mut(&mut self) -> &mut NeighborList<N> {
        &mut self.neighbors
    }

    /// Consume the result, keeping only the neighbor list.
    pub fn into_neighbors(self) -> NeighborList<N> {
        self.neighbors
    }

    /// If the attempt stopped at a partition boundary, the node whose
    /// neighbors were not locally available.
    pub fn boundary_node(&self) -> Option<&N> {
        self.boundary_node.as_ref()
    }

    /// Counter snapshot.
    pub fn stats(&self) -> SearchStats {
        SearchStats {
            similarities: self.similarities,
            restarts: self.restarts,
            boundary_restarts: self.boundary_restarts,
        }
    }

    /// Record one similarity evaluation.
    pub fn record_similarity(&mut self) {
        self.similarities += 1;
    }

    /// Record one restart after a local maximum.
    pub fn record_restart(&mut self) {
        self.restarts += 1;
    }

    /// Record one halt at a partition boundary.
    pub fn record_boundary_restart(&mut self) {
        self.boundary_restarts += 1;
    }

    /// Record the node at which the attempt stopped. Last write wins; the
    /// engine halts an attempt on its first boundary, so it writes at most
    /// once.
    pub fn set_boundary_node(&mut self, node: N) {
        self.boundary_node = Some(node);
    }

    /// Fold `other` into this result: counters are summed and `other`'s
    /// neighbors are offered to this list under the usual eviction rule.
    ///
    /// `other` is left untouched, and so is this result's boundary node;
    /// callers that need every boundary node collect them before merging.
    /// Merging results of differing capacities is a caller error.
    pub fn merge(&mut self, other: &Self) -> Result<()> {
        if self.neighbors.capacity() != other.neighbors.capacity() {
            return Err(GraphError::CapacityMismatch {
                left: self.neighbors.capacity(),
                right: other.neighbors.capacity(),
            });
        }

        self.similarities += other.similarities;
        self.restarts += other.restarts;
        self.boundary_restarts += other.boundary_restarts;
        self.neighbors.merge_all(&other.neighbors);
        Ok(())
    }

    /// Fold every result into this one, in order. Counter totals and the
    /// retained top-k set do not depend on the order, except among exact
    /// similarity ties.
    pub fn merge_many<'a, I>(&mut self, others: I) -> Result<()>
    where
        N: 'a,
        I: IntoIterator<Item = &'a Self>,
    {
        for other in others {
            self.merge(other)?;
        }
        Ok(())
    }
}

impl<N: Eq + Hash + Clone> fmt::Display for SearchResult<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "similarities={} restarts={} boundary_restarts={} neighbors={}/{}{}",
            self.similarities,
            self.restarts,
            self.boundary_restarts,
            self.neighbors.len(),
            self.neighbors.capacity(),
            if self.boundary_node.is_some() {
                " (stopped at boundary)"
            } else {
                ""
            }
        )
    }
}
