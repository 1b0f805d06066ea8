//! A*: best-first search guided by a cost estimate to the goal.

use std::cmp::Ordering;
use std::marker::PhantomData;

use hashbrown::{HashMap, HashSet};
use tracing::{debug, trace};

use crate::config::SearchConfig;
use crate::model::{Direction, NodeId};
use crate::Result;
use super::cost::{Cost, CostEvaluator};
use super::expander::{ExpansionFrontier, Expander};
use super::path_builder::{PathArena, PathBuilder};
use super::priority_map::{Entry, PriorityMap};
use super::{check_nodes, PathFinder, WeightedPath};

/// Estimated remaining cost from `node` to `goal`.
///
/// Must never overestimate, and must be consistent
/// (`estimate(a) <= cost(a, b) + estimate(b)`), or the returned path may
/// not be the cheapest.
pub trait EstimateEvaluator<C> {
    fn estimate(&self, node: NodeId, goal: NodeId) -> Result<C>;
}

impl<C, F> EstimateEvaluator<C> for F
where
    F: Fn(NodeId, NodeId) -> C,
{
    fn estimate(&self, node: NodeId, goal: NodeId) -> Result<C> {
        Ok(self(node, goal))
    }
}

/// A queued position: how we got to a node and what it cost.
#[derive(Debug, Clone)]
struct Visit<C> {
    builder: PathBuilder,
    cost: C,
}

/// Cheapest-path finder ordering its queue by `cost + estimate`.
pub struct AStar<E, V, H, C> {
    expander: E,
    evaluator: V,
    estimate: H,
    max_nodes: Option<usize>,
    _cost: PhantomData<C>,
}

impl<E, V, H, C> AStar<E, V, H, C>
where
    E: Expander,
    V: CostEvaluator<C>,
    H: EstimateEvaluator<C>,
    C: Cost,
{
    pub fn new(expander: E, evaluator: V, estimate: H) -> Self {
        Self { expander, evaluator, estimate, max_nodes: None, _cost: PhantomData }
    }

    pub fn with_config(expander: E, evaluator: V, estimate: H, config: &SearchConfig) -> Self {
        Self { max_nodes: config.max_nodes, ..Self::new(expander, evaluator, estimate) }
    }

    pub fn limit_max_nodes(mut self, max_nodes: usize) -> Self {
        self.max_nodes = Some(max_nodes);
        self
    }

    fn search(&self, start: NodeId, goal: NodeId) -> Result<Option<WeightedPath<C>>> {
        check_nodes(&self.expander, &[start, goal])?;

        let mut arena = PathArena::new();
        let mut queue: PriorityMap<Visit<C>, NodeId, C> =
            PriorityMap::with_comparator(|v: &Visit<C>| v.builder.end_node(), C::compare);
        let mut best: HashMap<NodeId, C> = HashMap::new();
        let mut closed: HashSet<NodeId> = HashSet::new();

        best.insert(start, C::zero());
        queue.put(
            Visit { builder: PathBuilder::new(start), cost: C::zero() },
            self.estimate.estimate(start, goal)?,
        );

        while let Some(Entry { entity: visit, .. }) = queue.pop() {
            let node = visit.builder.end_node();
            if node == goal {
                debug!(settled = closed.len(), "a* reached goal");
                return Ok(Some(WeightedPath {
                    path: visit.builder.build(&arena),
                    weight: visit.cost,
                }));
            }
            if self.max_nodes.is_some_and(|limit| closed.len() >= limit) {
                debug!(settled = closed.len(), "node cap reached, search cancelled");
                return Ok(None);
            }
            closed.insert(node);
            trace!(%node, cost = ?visit.cost, "expanding");

            let mut rels = ExpansionFrontier::new(&self.expander, node);
            while let Some(rel) = rels.next_relationship()? {
                let Some(other) = rel.other_node(node) else { continue };
                if closed.contains(&other) {
                    continue;
                }
                let dir = rel.direction_from(node).unwrap_or(Direction::Both);
                let cost = visit.cost.add(&self.evaluator.cost(&rel, dir)?);
                if best.get(&other).is_some_and(|known| cost.compare(known) != Ordering::Less) {
                    continue;
                }
                best.insert(other, cost.clone());
                let priority = cost.add(&self.estimate.estimate(other, goal)?);
                let builder = visit.builder.push(&mut arena, rel);
                queue.put(Visit { builder, cost }, priority);
            }
        }

        debug!(settled = closed.len(), "a* exhausted without reaching goal");
        Ok(None)
    }
}

impl<E, V, H, C> PathFinder for AStar<E, V, H, C>
where
    E: Expander,
    V: CostEvaluator<C>,
    H: EstimateEvaluator<C>,
    C: Cost,
{
    type Path = WeightedPath<C>;

    #[tracing::instrument(skip(self))]
    fn find_single_path(&self, start: NodeId, end: NodeId) -> Result<Option<WeightedPath<C>>> {
        self.search(start, end)
    }

    /// A* reports one cheapest path; ties are not enumerated.
    #[tracing::instrument(skip(self))]
    fn find_all_paths(&self, start: NodeId, end: NodeId) -> Result<Vec<WeightedPath<C>>> {
        Ok(self.search(start, end)?.into_iter().collect())
    }
}
