//! Greedy graph-walk search with restarts.
//!
//! The engine walks an externally owned adjacency map toward the query:
//! from the current node it evaluates every neighbor and moves to the best
//! strictly-improving one. A walk that stops improving has reached a local
//! maximum of the similarity landscape and restarts from a fresh seed; a
//! walk that reaches a node whose neighbors live on another partition halts
//! and reports that node so an external coordination layer can resume there.
//!
//! Every evaluated node is offered to the attempt's [`SearchResult`], so the
//! top-k answer accumulates as a side effect of walking. The attempt ends
//! when the restart budget, the optional evaluation budget, or the supply of
//! untried seeds runs out, and yields its result for merging with other
//! attempts.
//!
//! The search is heuristic: it trades exactness for a number of similarity
//! evaluations far below a full scan. Recall is measured against an
//! exhaustive baseline with [`NeighborList::count_commons`](crate::NeighborList::count_commons).

use crate::error::{GraphError, Result};
use crate::graph::AdjacencyMap;
use crate::neighbor::Neighbor;
use crate::result::SearchResult;
use log::{debug, trace};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashSet;
use std::hash::Hash;

/// Parameters for a greedy search.
#[derive(Debug, Clone)]
pub struct SearchParams {
    /// Number of neighbors to retain.
    pub k: usize,
    /// Local-maximum restarts allowed per attempt.
    pub max_restarts: usize,
    /// Optional hard budget on similarity evaluations; the attempt converges
    /// with what it holds when the budget is spent.
    pub max_similarities: Option<u64>,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            k: 10,
            max_restarts: 10,
            max_similarities: None,
        }
    }
}

impl SearchParams {
    fn validate(&self) -> Result<()> {
        if self.k == 0 {
            return Err(GraphError::InvalidCapacity);
        }
        if self.max_restarts == 0 {
            return Err(GraphError::InvalidParameter(
                "max_restarts must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

// Default boundary predicate for a single, unpartitioned graph.
fn never_boundary<N>(_: &N) -> bool {
    false
}

/// Greedy walk-with-restart search over one adjacency map.
///
/// The map and the similarity function are only read, so one engine (or
/// several, sharing the same map) can run attempts from many threads; each
/// attempt exclusively owns its [`SearchResult`] and the results are merged
/// afterwards.
///
/// `similarity` scores a candidate node against the query and must be
/// deterministic and never NaN. `is_boundary` flags nodes whose true
/// neighbor set is not locally resolvable; the default never fires.
pub struct GreedySearch<'g, N, S, B = fn(&N) -> bool> {
    adjacency: &'g AdjacencyMap<N>,
    similarity: S,
    is_boundary: B,
    params: SearchParams,
    seed: Option<u64>,
}

impl<'g, N, S> GreedySearch<'g, N, S>
where
    N: Eq + Hash + Clone,
{
    /// Create an engine over an unpartitioned graph.
    pub fn new(
        adjacency: &'g AdjacencyMap<N>,
        similarity: S,
        params: SearchParams,
    ) -> Result<Self> {
        params.validate()?;
        Ok(Self {
            adjacency,
            similarity,
            is_boundary: never_boundary,
            params,
            seed: None,
        })
    }
}

impl<'g, N, S, B> GreedySearch<'g, N, S, B>
where
    N: Eq + Hash + Clone,
    B: Fn(&N) -> bool,
{
    /// Replace the boundary predicate, for searches over one partition of a
    /// partitioned graph.
    pub fn with_boundary<B2>(self, is_boundary: B2) -> GreedySearch<'g, N, S, B2>
    where
        B2: Fn(&N) -> bool,
    {
        GreedySearch {
            adjacency: self.adjacency,
            similarity: self.similarity,
            is_boundary,
            params: self.params,
            seed: self.seed,
        }
    }

    /// Configure a deterministic seed for start-node selection.
    ///
    /// Two engines configured with the same seed produce identical results
    /// for the same adjacency map and query.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Run one attempt with internally chosen start nodes.
    pub fn search<Q>(&self, query: &Q) -> Result<SearchResult<N>>
    where
        S: Fn(&Q, &N) -> f64,
    {
        self.run(query, None)
    }

    /// Run one attempt starting from a caller-supplied node, restarting from
    /// internally chosen nodes afterwards.
    pub fn search_from<Q>(&self, query: &Q, start: &N) -> Result<SearchResult<N>>
    where
        S: Fn(&Q, &N) -> f64,
    {
        self.run(query, Some(start))
    }

    fn run<'a, Q>(&'a self, query: &Q, start: Option<&'a N>) -> Result<SearchResult<N>>
    where
        S: Fn(&Q, &N) -> f64,
    {
        let mut result = SearchResult::new(self.params.k)?;

        // Key order is stable for the lifetime of the borrowed map, which
        // makes seeded runs over the same map reproducible.
        let nodes: Vec<&N> = self.adjacency.keys().collect();
        let mut rng = StdRng::seed_from_u64(self.seed.unwrap_or_else(|| rand::rng().random()));
        let mut tried: HashSet<&N> = HashSet::new();
        let mut pending_start = start;

        // Seeded: each iteration begins a fresh walk.
        loop {
            let seed_node = match pending_start.take() {
                Some(node) => node,
                None => match self.pick_untried(&nodes, &tried, &mut rng) {
                    Some(node) => node,
                    // Graph exhausted: converge with whatever we hold.
                    None => return Ok(result),
                },
            };
            tried.insert(seed_node);

            if (self.is_boundary)(seed_node) {
                return Ok(self.halt_at_boundary(result, seed_node));
            }

            if self.budget_spent(&result) {
                return Ok(result);
            }
            let mut current = seed_node;
            let mut current_sim = self.evaluate(query, current, &mut result)?;
            trace!("walk seeded at similarity {current_sim}");

            // Walking: greedy ascent until stuck, halted, or out of budget.
            loop {
                let row = match self.adjacency.get(current) {
                    Some(row) => row,
                    // A node with no local adjacency row cannot improve.
                    None => break,
                };

                let mut best: Option<(&N, f64)> = None;
                for entry in row {
                    if self.budget_spent(&result) {
                        debug!("evaluation budget spent, converging: {result}");
                        return Ok(result);
                    }
                    let sim = self.evaluate(query, &entry.node, &mut result)?;
                    if sim > current_sim && best.map_or(true, |(_, b)| sim > b) {
                        best = Some((&entry.node, sim));
                    }
                }

                match best {
                    Some((node, sim)) => {
                        if (self.is_boundary)(node) {
                            return Ok(self.halt_at_boundary(result, node));
                        }
                        current = node;
                        current_sim = sim;
                    }
                    // Local maximum.
                    None => break,
                }
            }

            result.record_restart();
            debug!("local maximum, restarting: {result}");
            if result.restarts() >= self.params.max_restarts as u64 {
                return Ok(result);
            }
        }
    }

    // Score one node against the query, account for it, and offer it to the
    // running neighbor list.
    fn evaluate<Q>(&self, query: &Q, node: &N, result: &mut SearchResult<N>) -> Result<f64>
    where
        S: Fn(&Q, &N) -> f64,
    {
        let sim = (self.similarity)(query, node);
        if sim.is_nan() {
            return Err(GraphError::InvalidSimilarity);
        }
        result.record_similarity();
        result.neighbors_mut().insert(Neighbor::new(node.clone(), sim));
        Ok(sim)
    }

    fn halt_at_boundary(&self, mut result: SearchResult<N>, node: &N) -> SearchResult<N> {
        result.set_boundary_node(node.clone());
        result.record_boundary_restart();
        debug!("halted at partition boundary: {result}");
        result
    }

    fn budget_spent(&self, result: &SearchResult<N>) -> bool {
        self.params
            .max_similarities
            .is_some_and(|max| result.similarities() >= max)
    }

    // Random seed not yet tried this attempt, if any remains.
    fn pick_untried<'a>(
        &self,
        nodes: &[&'a N],
        tried: &HashSet<&N>,
        rng: &mut StdRng,
    ) -> Option<&'a N> {
        let remaining = nodes.iter().filter(|n| !tried.contains(**n)).count();
        if remaining == 0 {
            return None;
        }
        // Index into the untried subsequence rather than rejection-sampling,
        // so a nearly exhausted graph stays O(n).
        let target = rng.random_range(0..remaining);
        nodes
            .iter()
            .filter(|n| !tried.contains(**n))
            .nth(target)
            .copied()
    }
}
