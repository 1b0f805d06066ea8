//! Eccentricity, network diameter and network radius.
//!
//! The eccentricity of a node is the largest shortest-path cost from it to
//! any other node of the set. Nodes it cannot reach do not count, so a node
//! that reaches nothing has eccentricity zero.

use std::cell::RefCell;
use std::cmp::Ordering;

use hashbrown::{HashMap, HashSet};
use tracing::debug;

use crate::model::NodeId;
use crate::Result;
use super::cost::{Cost, CostEvaluator};
use super::dijkstra::Dijkstra;
use super::expander::Expander;

/// Eccentricity over a fixed node set, computed on demand and cached.
pub struct Eccentricity<E, V, C> {
    search: Dijkstra<E, V, C>,
    nodes: Vec<NodeId>,
    members: HashSet<NodeId>,
    cache: RefCell<HashMap<NodeId, C>>,
}

impl<E, V, C> Eccentricity<E, V, C>
where
    E: Expander,
    V: CostEvaluator<C>,
    C: Cost,
{
    pub fn new(search: Dijkstra<E, V, C>, nodes: impl IntoIterator<Item = NodeId>) -> Self {
        let nodes: Vec<NodeId> = nodes.into_iter().collect();
        let members = nodes.iter().copied().collect();
        Self { search, nodes, members, cache: RefCell::new(HashMap::new()) }
    }

    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    /// Eccentricity of `node`.
    pub fn centrality(&self, node: NodeId) -> Result<C> {
        if let Some(cached) = self.cache.borrow().get(&node) {
            return Ok(cached.clone());
        }

        // nodes settle in non-decreasing cost order: the last member seen is the farthest
        let mut farthest = C::zero();
        let mut remaining = self.members.len() - usize::from(self.members.contains(&node));
        for settled in self.search.settled_from(node)? {
            if remaining == 0 {
                break;
            }
            let (other, cost) = settled?;
            if other != node && self.members.contains(&other) {
                farthest = cost;
                remaining -= 1;
            }
        }

        self.cache.borrow_mut().insert(node, farthest.clone());
        Ok(farthest)
    }

    /// Eccentricity of every node in the set, in set order.
    pub fn all(&self) -> Result<Vec<(NodeId, C)>> {
        self.nodes.iter().map(|n| Ok((*n, self.centrality(*n)?))).collect()
    }

    /// Largest eccentricity in the set; `None` for an empty set.
    pub fn diameter(&self) -> Result<Option<C>> {
        self.extreme(Ordering::Greater)
    }

    /// Smallest eccentricity in the set; `None` for an empty set.
    pub fn radius(&self) -> Result<Option<C>> {
        self.extreme(Ordering::Less)
    }

    fn extreme(&self, wanted: Ordering) -> Result<Option<C>> {
        let mut best: Option<C> = None;
        for node in &self.nodes {
            let value = self.centrality(*node)?;
            if best.as_ref().is_none_or(|b| value.compare(b) == wanted) {
                best = Some(value);
            }
        }
        debug!(nodes = self.nodes.len(), ?wanted, result = ?best, "network extreme computed");
        Ok(best)
    }
}
