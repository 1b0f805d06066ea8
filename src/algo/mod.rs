//! Path-finding algorithms.
//!
//! | Finder | Paths | Cost |
//! |---|---|---|
//! | [`ShortestPath`] | all shortest, or exactly `n` long | hop count |
//! | [`Dijkstra`] | cheapest, or all cheapest | any [`Cost`] |
//! | [`AStar`] | cheapest, guided by an estimate | any [`Cost`] |
//!
//! Every finder implements [`PathFinder`]. The factory functions build one
//! from a [`SearchConfig`].

pub mod astar;
pub mod centrality;
pub mod cost;
pub mod dijkstra;
pub mod expander;
pub mod path_builder;
pub mod priority_map;
pub mod shortest_path;

use serde::{Deserialize, Serialize};

use crate::config::SearchConfig;
use crate::model::{NodeId, Path};
use crate::{Error, Result};

pub use astar::{AStar, EstimateEvaluator};
pub use centrality::Eccentricity;
pub use cost::{Cost, CostEvaluator, PropertyCost, UnitCost};
pub use dijkstra::{Dijkstra, SearchState, SearchStats, SettledNodes};
pub use expander::{expander_fn, ExpansionFrontier, Expander, FnExpander, Orientation, RelationshipExpander};
pub use path_builder::{PathArena, PathBuilder};
pub use priority_map::PriorityMap;
pub use shortest_path::ShortestPath;

/// Finds paths between two nodes.
pub trait PathFinder {
    type Path;

    /// One path, or `None` if `end` is not reachable within the limits.
    fn find_single_path(&self, start: NodeId, end: NodeId) -> Result<Option<Self::Path>>;

    /// Every path the finder considers best. Treat the result as a set.
    fn find_all_paths(&self, start: NodeId, end: NodeId) -> Result<Vec<Self::Path>>;
}

/// A path together with its total cost.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightedPath<C> {
    pub path: Path,
    pub weight: C,
}

impl<C> std::ops::Deref for WeightedPath<C> {
    type Target = Path;

    fn deref(&self) -> &Path {
        &self.path
    }
}

/// Fails with `InvalidArgument` if any node does not exist.
pub(crate) fn check_nodes<E: Expander>(expander: &E, nodes: &[NodeId]) -> Result<()> {
    match nodes.iter().find(|n| !expander.contains_node(**n)) {
        Some(missing) => Err(Error::InvalidArgument(format!("node {missing} does not exist"))),
        None => Ok(()),
    }
}

/// Level-synchronized shortest paths (`max_depth`, `exact_depth`).
pub fn shortest_path<E: Expander>(expander: E, config: &SearchConfig) -> ShortestPath<E> {
    ShortestPath::with_config(expander, config)
}

/// Weighted cheapest paths (`max_nodes`, `bidirectional`).
pub fn dijkstra<E, V, C>(expander: E, evaluator: V, config: &SearchConfig) -> Dijkstra<E, V, C>
where
    E: Expander,
    V: CostEvaluator<C>,
    C: Cost,
{
    Dijkstra::with_config(expander, evaluator, config)
}

/// Estimate-guided cheapest path (`max_nodes`).
pub fn a_star<E, V, H, C>(expander: E, evaluator: V, estimate: H, config: &SearchConfig) -> AStar<E, V, H, C>
where
    E: Expander,
    V: CostEvaluator<C>,
    H: EstimateEvaluator<C>,
    C: Cost,
{
    AStar::with_config(expander, evaluator, estimate, config)
}
