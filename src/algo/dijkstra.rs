//! Best-first weighted shortest paths (Dijkstra).
//!
//! Two ways in:
//!
//! - [`Dijkstra::settled_from`]: a lazy iterator over nodes in
//!   non-decreasing cost order from one source. Used directly, and by the
//!   centrality measures.
//! - [`PathFinder`]: cheapest path(s) between two nodes, optionally
//!   searching from both ends at once.
//!
//! ## Bidirectional termination
//!
//! The two sides alternate. Every time a side labels a node the other side
//! has already labelled, the pair proposes a total cost `μ`. The search stops
//! once `top(forward) + top(backward) >= μ`; stopping at the first meeting
//! is not always optimal.
//!
//! To report *all* cheapest paths, both sides then settle every node with
//! cost up to `μ/2`. Every cheapest path crosses cost `μ/2` on some
//! relationship between the two settled regions; joining the halves at those
//! relationships and dropping duplicates yields each path once.
//!
//! ## Ties and weights
//!
//! Every reported path is weighted by its own cost summed from start to end,
//! and only paths tying the cheapest of those are kept (see [`Cost::ties`]).
//! Both modes therefore agree even when float sums depend on their order.
//! Zero-cost relationships are allowed; paths never revisit a node.
//!
//! ## Limits
//!
//! Costs must be non-negative. A node cap turns the search into `Cancelled`
//! once that many nodes are settled, across both sides.

use std::cell::Cell;
use std::cmp::Ordering;
use std::marker::PhantomData;

use hashbrown::{HashMap, HashSet};
use smallvec::{SmallVec, smallvec};
use tracing::{debug, trace};

use crate::config::SearchConfig;
use crate::model::{Direction, NodeId, Path, RelId, Relationship};
use crate::Result;
use super::cost::{Cost, CostEvaluator};
use super::expander::{ExpansionFrontier, Expander};
use super::path_builder::{PathArena, PathBuilder};
use super::priority_map::{Entry, PriorityMap};
use super::{check_nodes, PathFinder, WeightedPath};

// ============================================================================
// Search state
// ============================================================================

/// Lifecycle of one search. `Found`, `Exhausted` and `Cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchState {
    Ready,
    Expanding,
    /// The end node was reached.
    Found,
    /// Nothing left to expand.
    Exhausted,
    /// The node cap was hit.
    Cancelled,
}

/// What the last search did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchStats {
    pub state: SearchState,
    pub nodes_settled: usize,
}

/// Node-visitation budget shared by both sides of a search.
#[derive(Debug)]
struct NodeBudget {
    limit: Option<usize>,
    used: usize,
}

impl NodeBudget {
    fn new(limit: Option<usize>) -> Self {
        Self { limit, used: 0 }
    }

    fn has_room(&self) -> bool {
        self.limit.is_none_or(|limit| self.used < limit)
    }
}

enum Step<C> {
    Settled(NodeId, C),
    Exhausted,
    Cancelled,
}

// ============================================================================
// One search direction
// ============================================================================

/// Queue, labels and predecessor links for a search from one source.
struct Side<'a, E, V, C> {
    expander: &'a E,
    evaluator: &'a V,
    source: NodeId,
    /// The backward side walks relationships against the path direction.
    backward: bool,
    queue: PriorityMap<NodeId, NodeId, C>,
    /// Best known (tentative) cost per labelled node.
    seen: HashMap<NodeId, C>,
    /// Final cost and settle order per settled node.
    settled: HashMap<NodeId, (C, usize)>,
    /// Relationships into each labelled node achieving its `seen` cost.
    /// Zero-cost ties between settled nodes can make this cyclic.
    predecessors: HashMap<NodeId, SmallVec<[Relationship; 1]>>,
}

impl<'a, E, V, C> Side<'a, E, V, C>
where
    E: Expander,
    V: CostEvaluator<C>,
    C: Cost,
{
    fn new(expander: &'a E, evaluator: &'a V, source: NodeId, backward: bool) -> Self {
        let mut queue = PriorityMap::keyed_by_self(C::compare);
        queue.put(source, C::zero());
        let mut seen = HashMap::new();
        seen.insert(source, C::zero());
        Self {
            expander,
            evaluator,
            source,
            backward,
            queue,
            seen,
            settled: HashMap::new(),
            predecessors: HashMap::new(),
        }
    }

    fn peek(&self) -> Option<&C> {
        self.queue.peek_priority()
    }

    /// Settle the cheapest queued node and relax its relationships.
    ///
    /// `on_label` is called for every node whose tentative cost improved.
    fn settle_next(
        &mut self,
        budget: &mut NodeBudget,
        mut on_label: impl FnMut(NodeId, &C),
    ) -> Result<Step<C>> {
        loop {
            if self.queue.is_empty() {
                return Ok(Step::Exhausted);
            }
            if !budget.has_room() {
                return Ok(Step::Cancelled);
            }
            let Some(Entry { entity: node, priority: cost }) = self.queue.pop() else {
                return Ok(Step::Exhausted);
            };
            if self.settled.contains_key(&node) {
                continue;
            }

            budget.used += 1;
            let order = self.settled.len();
            self.settled.insert(node, (cost.clone(), order));

            let mut frontier = ExpansionFrontier::new(self.expander, node);
            while let Some(rel) = frontier.next_relationship()? {
                let Some(other) = rel.other_node(node) else { continue };
                if other == node {
                    continue;
                }
                let mut dir = rel.direction_from(node).unwrap_or(Direction::Both);
                if self.backward {
                    dir = dir.reverse();
                }
                let candidate = cost.add(&self.evaluator.cost(&rel, dir)?);

                if let Some((final_cost, _)) = self.settled.get(&other) {
                    // only a zero-cost relationship ties a node settled earlier
                    if candidate.ties(final_cost) {
                        self.predecessors.entry(other).or_default().push(rel);
                    }
                    continue;
                }
                let known = self
                    .seen
                    .get(&other)
                    .map(|known| (candidate.ties(known), candidate.compare(known)));
                match known {
                    Some((true, _)) => {
                        self.predecessors.entry(other).or_default().push(rel);
                    }
                    None | Some((false, Ordering::Less)) => {
                        self.seen.insert(other, candidate.clone());
                        self.predecessors.insert(other, smallvec![rel]);
                        self.queue.put(other, candidate.clone());
                        on_label(other, &candidate);
                    }
                    Some(_) => {}
                }
            }

            trace!(%node, ?cost, backward = self.backward, "settled");
            return Ok(Step::Settled(node, cost));
        }
    }

    fn predecessors_of(&self, node: NodeId, first_only: bool) -> &[Relationship] {
        let preds = self.predecessors.get(&node).map_or(&[][..], |p| p.as_slice());
        if first_only { &preds[..preds.len().min(1)] } else { preds }
    }

    /// Settle nodes while the queue's minimum satisfies `more`.
    ///
    /// Returns `false` if the node cap cut this short.
    fn settle_while(&mut self, budget: &mut NodeBudget, more: impl Fn(&C) -> bool) -> Result<bool> {
        while self.peek().is_some_and(&more) {
            match self.settle_next(budget, |_, _| {})? {
                Step::Settled(..) => {}
                Step::Exhausted => break,
                Step::Cancelled => return Ok(false),
            }
        }
        Ok(true)
    }

    /// Builders for the cheapest known simple paths `source → target`.
    ///
    /// Depth-first over the predecessor lists, walking back from `target`.
    /// A node already on the current trail is not entered again, which cuts
    /// the cycles zero-cost ties can form.
    fn builders_to(
        &self,
        target: NodeId,
        arena: &mut PathArena,
        first_only: bool,
    ) -> Vec<PathBuilder> {
        let mut found = Vec::new();
        // one relationship per stack frame below the root
        let mut trail: Vec<&Relationship> = Vec::new();
        let mut on_trail = HashSet::new();
        on_trail.insert(target);
        let mut stack: Vec<(NodeId, usize)> = vec![(target, 0)];

        while let Some(&(node, next)) = stack.last() {
            let preds = self.predecessors_of(node, first_only);
            if node == self.source || next >= preds.len() {
                if node == self.source {
                    let builder = trail
                        .iter()
                        .rev()
                        .fold(PathBuilder::new(self.source), |b, rel| b.push(arena, (*rel).clone()));
                    found.push(builder);
                    if first_only {
                        break;
                    }
                }
                stack.pop();
                on_trail.remove(&node);
                if !stack.is_empty() {
                    trail.pop();
                }
                continue;
            }

            if let Some(top) = stack.last_mut() {
                top.1 += 1;
            }
            let rel = &preds[next];
            if let Some(prev) = rel.other_node(node) {
                if on_trail.insert(prev) {
                    trail.push(rel);
                    stack.push((prev, 0));
                }
            }
        }
        found
    }

    /// One path through `meeting`, this side's half first.
    fn join(&self, other: &Self, meeting: NodeId, arena: &mut PathArena) -> Vec<Path> {
        let heads = self.builders_to(meeting, arena, true);
        let tails = other.builders_to(meeting, arena, true);
        match (heads.first(), tails.first()) {
            (Some(head), Some(tail)) => vec![head.build_with(arena, tail)],
            _ => Vec::new(),
        }
    }
}

// ============================================================================
// SettledNodes: single-source iterator
// ============================================================================

/// Nodes reachable from a source, in non-decreasing cost order.
///
/// Finite; not restartable. Yields `Err` once if the store fails, then ends.
pub struct SettledNodes<'a, E, V, C> {
    side: Side<'a, E, V, C>,
    budget: NodeBudget,
    state: SearchState,
}

impl<'a, E, V, C> SettledNodes<'a, E, V, C>
where
    E: Expander,
    V: CostEvaluator<C>,
    C: Cost,
{
    pub fn state(&self) -> SearchState {
        self.state
    }

    /// Number of nodes settled so far.
    pub fn nodes_settled(&self) -> usize {
        self.budget.used
    }

    /// Best cost found so far for `node`, settled or not.
    pub fn tentative_cost(&self, node: NodeId) -> Option<&C> {
        self.side.seen.get(&node)
    }

    /// Final cost of a settled node.
    pub fn settled_cost(&self, node: NodeId) -> Option<&C> {
        self.side.settled.get(&node).map(|(cost, _)| cost)
    }

    /// One cheapest path to a settled node.
    pub fn path_to(&self, node: NodeId) -> Option<Path> {
        self.settled_cost(node)?;
        let mut arena = PathArena::new();
        self.side
            .builders_to(node, &mut arena, true)
            .first()
            .map(|b| b.build(&arena))
    }

    /// Every cheapest path to a settled node.
    pub fn paths_to(&self, node: NodeId) -> Vec<Path> {
        if self.settled_cost(node).is_none() {
            return Vec::new();
        }
        let mut arena = PathArena::new();
        let builders = self.side.builders_to(node, &mut arena, false);
        builders.iter().map(|b| b.build(&arena)).collect()
    }
}

impl<'a, E, V, C> Iterator for SettledNodes<'a, E, V, C>
where
    E: Expander,
    V: CostEvaluator<C>,
    C: Cost,
{
    type Item = Result<(NodeId, C)>;

    fn next(&mut self) -> Option<Self::Item> {
        if matches!(self.state, SearchState::Exhausted | SearchState::Cancelled) {
            return None;
        }
        self.state = SearchState::Expanding;
        match self.side.settle_next(&mut self.budget, |_, _| {}) {
            Ok(Step::Settled(node, cost)) => Some(Ok((node, cost))),
            Ok(Step::Exhausted) => {
                self.state = SearchState::Exhausted;
                None
            }
            Ok(Step::Cancelled) => {
                debug!(settled = self.budget.used, "node cap reached, search cancelled");
                self.state = SearchState::Cancelled;
                None
            }
            Err(e) => {
                self.state = SearchState::Exhausted;
                Some(Err(e))
            }
        }
    }
}

// ============================================================================
// Dijkstra
// ============================================================================

/// Weighted shortest-path finder over cost type `C`.
pub struct Dijkstra<E, V, C> {
    expander: E,
    reversed: E,
    evaluator: V,
    max_nodes: Option<usize>,
    bidirectional: bool,
    last_stats: Cell<Option<SearchStats>>,
    _cost: PhantomData<C>,
}

impl<E, V, C> Dijkstra<E, V, C>
where
    E: Expander,
    V: CostEvaluator<C>,
    C: Cost,
{
    /// Bidirectional, unbounded search.
    pub fn new(expander: E, evaluator: V) -> Self {
        let reversed = expander.reversed();
        Self {
            expander,
            reversed,
            evaluator,
            max_nodes: None,
            bidirectional: true,
            last_stats: Cell::new(None),
            _cost: PhantomData,
        }
    }

    pub fn with_config(expander: E, evaluator: V, config: &SearchConfig) -> Self {
        let mut dijkstra = Self::new(expander, evaluator).bidirectional(config.bidirectional);
        dijkstra.max_nodes = config.max_nodes;
        dijkstra
    }

    /// Cancel any search once `max_nodes` nodes have been settled.
    pub fn limit_max_nodes(mut self, max_nodes: usize) -> Self {
        self.max_nodes = Some(max_nodes);
        self
    }

    pub fn bidirectional(mut self, bidirectional: bool) -> Self {
        self.bidirectional = bidirectional;
        self
    }

    /// Outcome of the most recent path search, if any.
    pub fn last_stats(&self) -> Option<SearchStats> {
        self.last_stats.get()
    }

    /// Lazily settle nodes outward from `start`.
    pub fn settled_from(&self, start: NodeId) -> Result<SettledNodes<'_, E, V, C>> {
        check_nodes(&self.expander, &[start])?;
        Ok(SettledNodes {
            side: Side::new(&self.expander, &self.evaluator, start, false),
            budget: NodeBudget::new(self.max_nodes),
            state: SearchState::Ready,
        })
    }

    fn search(&self, start: NodeId, end: NodeId, first_only: bool) -> Result<Vec<WeightedPath<C>>> {
        check_nodes(&self.expander, &[start, end])?;
        if start == end {
            self.last_stats.set(Some(SearchStats { state: SearchState::Found, nodes_settled: 0 }));
            return Ok(vec![WeightedPath { path: Path::single(start), weight: C::zero() }]);
        }
        let (paths, stats) = if self.bidirectional {
            self.search_bidirectional(start, end, first_only)?
        } else {
            self.search_unidirectional(start, end, first_only)?
        };
        debug!(state = ?stats.state, settled = stats.nodes_settled, paths = paths.len(), "dijkstra finished");
        self.last_stats.set(Some(stats));
        Ok(paths)
    }

    fn search_unidirectional(
        &self,
        start: NodeId,
        end: NodeId,
        first_only: bool,
    ) -> Result<(Vec<WeightedPath<C>>, SearchStats)> {
        let mut budget = NodeBudget::new(self.max_nodes);
        let mut side = Side::new(&self.expander, &self.evaluator, start, false);
        let mut state = loop {
            match side.settle_next(&mut budget, |_, _| {})? {
                Step::Settled(node, _) if node == end => break SearchState::Found,
                Step::Settled(..) => {}
                Step::Exhausted => break SearchState::Exhausted,
                Step::Cancelled => break SearchState::Cancelled,
            }
        };

        let Some((weight, _)) = side.settled.get(&end).cloned() else {
            return Ok((Vec::new(), SearchStats { state, nodes_settled: budget.used }));
        };
        // nodes tying `end` may still reach it over zero-cost relationships
        if !first_only && !side.settle_while(&mut budget, |top| top.ties(&weight))? {
            state = SearchState::Cancelled;
        }

        let mut arena = PathArena::new();
        let paths = side
            .builders_to(end, &mut arena, first_only)
            .iter()
            .map(|b| b.build(&arena))
            .collect();
        Ok((self.cheapest(paths)?, SearchStats { state, nodes_settled: budget.used }))
    }

    fn search_bidirectional(
        &self,
        start: NodeId,
        end: NodeId,
        first_only: bool,
    ) -> Result<(Vec<WeightedPath<C>>, SearchStats)> {
        let mut budget = NodeBudget::new(self.max_nodes);
        let mut fwd = Side::new(&self.expander, &self.evaluator, start, false);
        let mut bwd = Side::new(&self.reversed, &self.evaluator, end, true);
        // best total cost so far and the node where the two sides met
        let mut best: Option<(C, NodeId)> = None;
        let mut forward_turn = true;

        let offer = |best: &mut Option<(C, NodeId)>, total: C, node: NodeId| {
            if best.as_ref().is_none_or(|(mu, _)| total.compare(mu) == Ordering::Less) {
                trace!(%node, ?total, "sides met");
                *best = Some((total, node));
            }
        };

        let mut state = loop {
            let (Some(top_f), Some(top_b)) = (fwd.peek(), bwd.peek()) else {
                break if best.is_some() { SearchState::Found } else { SearchState::Exhausted };
            };
            if let Some((mu, _)) = &best {
                if top_f.add(top_b).compare(mu) != Ordering::Less {
                    break SearchState::Found;
                }
            }

            let (this, other) = if forward_turn { (&mut fwd, &bwd) } else { (&mut bwd, &fwd) };
            forward_turn = !forward_turn;

            let step = this.settle_next(&mut budget, |node, cost| {
                if let Some(theirs) = other.seen.get(&node) {
                    offer(&mut best, cost.add(theirs), node);
                }
            })?;
            match step {
                Step::Settled(node, cost) => {
                    if let Some(theirs) = other.seen.get(&node) {
                        offer(&mut best, cost.add(theirs), node);
                    }
                }
                Step::Exhausted => {
                    break if best.is_some() { SearchState::Found } else { SearchState::Exhausted };
                }
                Step::Cancelled => break SearchState::Cancelled,
            }
        };

        let Some((mu, meeting)) = best else {
            return Ok((Vec::new(), SearchStats { state, nodes_settled: budget.used }));
        };

        let mut arena = PathArena::new();
        if first_only || state != SearchState::Found {
            let paths = fwd.join(&bwd, meeting, &mut arena);
            return Ok((self.cheapest(paths)?, SearchStats { state, nodes_settled: budget.used }));
        }

        if mu.ties(&C::zero()) {
            // every node of a zero-cost path sits on the midpoint; the start side alone enumerates them
            if !fwd.settle_while(&mut budget, |top| top.ties(&mu))? {
                state = SearchState::Cancelled;
            }
            let paths = if fwd.settled.contains_key(&end) {
                fwd.builders_to(end, &mut arena, false).iter().map(|b| b.build(&arena)).collect()
            } else {
                fwd.join(&bwd, meeting, &mut arena)
            };
            return Ok((self.cheapest(paths)?, SearchStats { state, nodes_settled: budget.used }));
        }

        // Settle both halves up to the midpoint cost.
        let twice = |c: &C| c.add(c);
        let up_to_half = |c: &C| {
            let doubled = twice(c);
            doubled.compare(&mu) != Ordering::Greater || doubled.ties(&mu)
        };
        if !fwd.settle_while(&mut budget, up_to_half)? || !bwd.settle_while(&mut budget, up_to_half)? {
            state = SearchState::Cancelled;
        }

        let mut owned: Vec<(NodeId, C, usize)> = fwd
            .settled
            .iter()
            .filter(|(_, (cost, _))| up_to_half(cost))
            .map(|(node, (cost, order))| (*node, cost.clone(), *order))
            .collect();
        owned.sort_by_key(|(_, _, order)| *order);

        let mut paths = Vec::new();
        for (u, cost_u, _) in owned {
            let mut heads: Option<Vec<PathBuilder>> = None;
            let mut frontier = ExpansionFrontier::new(&self.expander, u);
            while let Some(rel) = frontier.next_relationship()? {
                let Some(v) = rel.other_node(u) else { continue };
                if v == u {
                    continue;
                }
                let Some((cost_v, _)) = bwd.settled.get(&v) else { continue };
                if !up_to_half(cost_v) {
                    continue;
                }
                let dir = rel.direction_from(u).unwrap_or(Direction::Both);
                let total = cost_u.add(&self.evaluator.cost(&rel, dir)?).add(cost_v);
                if !total.ties(&mu) {
                    continue;
                }

                let heads = heads.get_or_insert_with(|| fwd.builders_to(u, &mut arena, false));
                let tails = bwd.builders_to(v, &mut arena, false);
                for head in heads.iter() {
                    let joined = head.push(&mut arena, rel.clone());
                    for tail in &tails {
                        paths.push(joined.build_with(&arena, tail));
                    }
                }
            }
        }

        if paths.is_empty() {
            paths = fwd.join(&bwd, meeting, &mut arena);
        }
        Ok((self.cheapest(paths)?, SearchStats { state, nodes_settled: budget.used }))
    }

    /// Cost of `path` summed relationship by relationship from its start.
    fn path_cost(&self, path: &Path) -> Result<C> {
        let mut total = C::zero();
        for (rel, from) in path.relationships.iter().zip(&path.nodes) {
            let dir = rel.direction_from(*from).unwrap_or(Direction::Both);
            total = total.add(&self.evaluator.cost(rel, dir)?);
        }
        Ok(total)
    }

    /// The distinct simple paths among `paths` that tie the cheapest one,
    /// each weighted by its own start-to-end cost.
    fn cheapest(&self, paths: Vec<Path>) -> Result<Vec<WeightedPath<C>>> {
        let mut signatures: HashSet<Vec<RelId>> = HashSet::new();
        let mut weighted = Vec::with_capacity(paths.len());
        for path in paths {
            if !path.is_simple() {
                continue;
            }
            if !signatures.insert(path.relationships.iter().map(|r| r.id).collect()) {
                continue;
            }
            let weight = self.path_cost(&path)?;
            weighted.push(WeightedPath { path, weight });
        }

        let Some(min) = weighted.iter().map(|p| &p.weight).min_by(|a, b| a.compare(b)).cloned() else {
            return Ok(weighted);
        };
        weighted.retain(|p| p.weight.ties(&min));
        Ok(weighted)
    }
}

impl<E, V, C> PathFinder for Dijkstra<E, V, C>
where
    E: Expander,
    V: CostEvaluator<C>,
    C: Cost,
{
    type Path = WeightedPath<C>;

    #[tracing::instrument(skip(self), fields(bidirectional = self.bidirectional))]
    fn find_single_path(&self, start: NodeId, end: NodeId) -> Result<Option<WeightedPath<C>>> {
        Ok(self.search(start, end, true)?.into_iter().next())
    }

    #[tracing::instrument(skip(self), fields(bidirectional = self.bidirectional))]
    fn find_all_paths(&self, start: NodeId, end: NodeId) -> Result<Vec<WeightedPath<C>>> {
        self.search(start, end, false)
    }
}
