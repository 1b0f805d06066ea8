//! Unweighted all-shortest-paths, searching level by level from both ends.
//!
//! Each side keeps a frontier map `node → builders ending at node`. Every
//! round expands one whole level of the smaller side. A relationship landing
//! on a node in the other side's frontier joins every builder pair into a
//! path. The first level that produces a match is expanded to the end and
//! then the search stops, so the result holds every shortest path.
//!
//! In exact-depth mode only matches of exactly `max_depth` relationships
//! count; shorter ones are ignored, not reported. Nodes are not pruned per
//! level there, but no builder ever steps onto a node it already visited, so
//! each half stays a simple path and the search dies out once none remain.

use hashbrown::hash_map::Entry;
use hashbrown::{HashMap, HashSet};
use smallvec::{SmallVec, smallvec};
use tracing::{debug, trace};

use crate::config::SearchConfig;
use crate::model::{NodeId, Path};
use crate::Result;
use super::expander::{ExpansionFrontier, Expander};
use super::path_builder::{PathArena, PathBuilder};
use super::{check_nodes, PathFinder};

type Builders = SmallVec<[PathBuilder; 2]>;

/// One side's current level: nodes in discovery order, with their builders.
#[derive(Debug, Default)]
struct Frontier {
    order: Vec<NodeId>,
    builders: HashMap<NodeId, Builders>,
}

impl Frontier {
    fn seed(node: NodeId) -> Self {
        let mut builders = HashMap::new();
        builders.insert(node, smallvec![PathBuilder::new(node)]);
        Self { order: vec![node], builders }
    }

    fn len(&self) -> usize {
        self.order.len()
    }

    fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    fn add(&mut self, node: NodeId, new: Builders) {
        match self.builders.entry(node) {
            Entry::Occupied(mut e) => e.get_mut().extend(new),
            Entry::Vacant(e) => {
                self.order.push(node);
                e.insert(new);
            }
        }
    }
}

#[derive(Debug)]
struct LevelSide {
    frontier: Frontier,
    /// Nodes of every completed level, current one included.
    visited: HashSet<NodeId>,
}

impl LevelSide {
    fn new(node: NodeId) -> Self {
        let mut visited = HashSet::new();
        visited.insert(node);
        Self { frontier: Frontier::seed(node), visited }
    }
}

/// Level-synchronized bidirectional shortest-path finder.
#[derive(Debug, Clone)]
pub struct ShortestPath<E> {
    expander: E,
    reversed: E,
    max_depth: usize,
    exact_depth: bool,
}

impl<E: Expander> ShortestPath<E> {
    /// Shortest paths no longer than `max_depth` relationships.
    pub fn new(expander: E, max_depth: usize) -> Self {
        let reversed = expander.reversed();
        Self { expander, reversed, max_depth, exact_depth: false }
    }

    /// Simple paths of exactly `depth` relationships.
    pub fn exact_depth(expander: E, depth: usize) -> Self {
        Self { exact_depth: true, ..Self::new(expander, depth) }
    }

    pub fn with_config(expander: E, config: &SearchConfig) -> Self {
        Self { exact_depth: config.exact_depth, ..Self::new(expander, config.max_depth) }
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    fn search(&self, start: NodeId, end: NodeId, first_only: bool) -> Result<Vec<Path>> {
        check_nodes(&self.expander, &[start, end])?;
        if start == end {
            return Ok(vec![Path::single(start)]);
        }

        let mut arena = PathArena::new();
        let mut start_side = LevelSide::new(start);
        let mut end_side = LevelSide::new(end);
        let mut results = Vec::new();
        let mut levels = 0;

        for depth in 0..self.max_depth {
            if start_side.frontier.is_empty() || end_side.frontier.is_empty() {
                break;
            }
            let from_start = start_side.frontier.len() < end_side.frontier.len();
            let (source, target, expander) = if from_start {
                (&mut start_side, &end_side, &self.expander)
            } else {
                (&mut end_side, &start_side, &self.reversed)
            };
            // exact-depth mode only samples matches on the final level
            let accept = !self.exact_depth || depth + 1 == self.max_depth;

            let current = std::mem::take(&mut source.frontier);
            let mut next = Frontier::default();
            for node in &current.order {
                let Some(builders) = current.builders.get(node) else { continue };
                let mut rels = ExpansionFrontier::new(expander, *node);
                while let Some(rel) = rels.next_relationship()? {
                    let Some(other) = rel.other_node(*node) else { continue };
                    if other == *node || (!self.exact_depth && source.visited.contains(&other)) {
                        continue;
                    }
                    let mut extended = Builders::new();
                    for builder in builders {
                        // exact-depth walks stay simple on each side
                        if self.exact_depth && builder.visits(&arena, other) {
                            continue;
                        }
                        extended.push(builder.push(&mut arena, rel.clone()));
                    }
                    if extended.is_empty() {
                        continue;
                    }

                    if accept {
                        if let Some(theirs) = target.frontier.builders.get(&other) {
                            for mine in &extended {
                                for their in theirs {
                                    let path = if mine.start_node() == start {
                                        mine.build_with(&arena, their)
                                    } else {
                                        their.build_with(&arena, mine)
                                    };
                                    if self.exact_depth && !path.is_simple() {
                                        continue;
                                    }
                                    results.push(path);
                                    if first_only {
                                        debug!(levels = levels + 1, "found single path");
                                        return Ok(results);
                                    }
                                }
                            }
                        }
                    }
                    if results.is_empty() {
                        next.add(other, extended);
                    }
                }
            }

            source.visited.extend(next.order.iter().copied());
            source.frontier = next;
            levels += 1;
            trace!(depth, from_start, frontier = source.frontier.len(), "level expanded");
            if !results.is_empty() {
                break;
            }
        }

        debug!(levels, paths = results.len(), exact_depth = self.exact_depth, "level search finished");
        Ok(results)
    }
}

impl<E: Expander> PathFinder for ShortestPath<E> {
    type Path = Path;

    #[tracing::instrument(skip(self), fields(max_depth = self.max_depth))]
    fn find_single_path(&self, start: NodeId, end: NodeId) -> Result<Option<Path>> {
        Ok(self.search(start, end, true)?.into_iter().next())
    }

    #[tracing::instrument(skip(self), fields(max_depth = self.max_depth))]
    fn find_all_paths(&self, start: NodeId, end: NodeId) -> Result<Vec<Path>> {
        self.search(start, end, false)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::algo::expander::RelationshipExpander;
    use crate::model::{Direction, PropertyMap};
    use crate::storage::MemoryGraph;

    fn graph(n: usize, edges: &[(usize, usize)]) -> (MemoryGraph, Vec<NodeId>) {
        let db = MemoryGraph::new();
        let nodes: Vec<NodeId> = (0..n).map(|_| db.create_node(&[], PropertyMap::new())).collect();
        for (a, b) in edges {
            db.create_relationship(nodes[*a], nodes[*b], "R", PropertyMap::new()).unwrap();
        }
        (db, nodes)
    }

    fn indices(path: &Path, nodes: &[NodeId]) -> Vec<usize> {
        path.nodes
            .iter()
            .map(|n| nodes.iter().position(|m| m == n).unwrap())
            .collect()
    }

    #[test]
    fn test_parallel_edges_give_two_paths() {
        let (db, n) = graph(2, &[(0, 1), (0, 1)]);
        let finder = ShortestPath::new(RelationshipExpander::all_types(&db, Direction::Both), 1);
        let paths = finder.find_all_paths(n[0], n[1]).unwrap();
        assert_eq!(paths.len(), 2);
        assert_ne!(paths[0].relationships[0].id, paths[1].relationships[0].id);
        for path in &paths {
            assert_eq!(indices(path, &n), vec![0, 1]);
        }
    }

    #[test]
    fn test_depth_limit() {
        let (db, n) = graph(4, &[(0, 1), (1, 2), (2, 3)]);
        let exp = RelationshipExpander::all_types(&db, Direction::Both);
        assert!(ShortestPath::new(exp.clone(), 2).find_all_paths(n[0], n[3]).unwrap().is_empty());
        assert_eq!(ShortestPath::new(exp, 3).find_all_paths(n[0], n[3]).unwrap().len(), 1);
    }

    #[test]
    fn test_zero_depth_only_matches_trivial_path() {
        let (db, n) = graph(2, &[(0, 1)]);
        let finder = ShortestPath::new(RelationshipExpander::all_types(&db, Direction::Both), 0);
        assert!(finder.find_all_paths(n[0], n[1]).unwrap().is_empty());
        let trivial = finder.find_all_paths(n[0], n[0]).unwrap();
        assert_eq!(trivial, vec![Path::single(n[0])]);
    }

    #[test]
    fn test_single_path_is_one_of_the_shortest() {
        // 0-1-3 and 0-2-3
        let (db, n) = graph(4, &[(0, 1), (0, 2), (1, 3), (2, 3)]);
        let finder = ShortestPath::new(RelationshipExpander::all_types(&db, Direction::Both), 5);
        let path = finder.find_single_path(n[0], n[3]).unwrap().unwrap();
        assert_eq!(path.len(), 2);
        assert_eq!(path.start(), n[0]);
        assert_eq!(path.end(), n[3]);
    }

    #[test]
    fn test_paths_run_start_to_end_whichever_side_expands() {
        // equal frontier sizes expand the end side first
        let (db, n) = graph(6, &[(0, 1), (0, 2), (0, 3), (0, 4), (4, 5)]);
        let finder = ShortestPath::new(RelationshipExpander::all_types(&db, Direction::Both), 4);
        let paths = finder.find_all_paths(n[0], n[5]).unwrap();
        assert_eq!(paths.len(), 1);
        assert_eq!(indices(&paths[0], &n), vec![0, 4, 5]);
        let back = finder.find_all_paths(n[5], n[0]).unwrap();
        assert_eq!(indices(&back[0], &n), vec![5, 4, 0]);
    }

    #[test]
    fn test_exact_depth_skips_shorter_paths() {
        // 0-1-2 direct, 0-3-4-2 longer
        let (db, n) = graph(5, &[(0, 1), (1, 2), (0, 3), (3, 4), (4, 2)]);
        let exp = RelationshipExpander::all_types(&db, Direction::Outgoing);
        let at = |depth| ShortestPath::exact_depth(exp.clone(), depth).find_all_paths(n[0], n[2]).unwrap();
        assert_eq!(at(2).len(), 1);
        assert_eq!(indices(&at(3)[0], &n), vec![0, 3, 4, 2]);
        assert!(at(4).is_empty());
    }

    #[test]
    fn test_exact_depth_paths_are_simple() {
        // triangle walked undirected: 0-1-2-0-1 would revisit nodes
        let (db, n) = graph(3, &[(0, 1), (1, 2), (2, 0)]);
        let exp = RelationshipExpander::all_types(&db, Direction::Both);
        let paths = ShortestPath::exact_depth(exp, 4).find_all_paths(n[0], n[1]).unwrap();
        assert!(paths.is_empty());
    }

    #[test]
    fn test_exact_depth_on_complete_graph_stays_bounded() {
        // K6: simple 0..1 paths have at most 5 relationships
        let edges: Vec<(usize, usize)> =
            (0..6).flat_map(|a| (a + 1..6).map(move |b| (a, b))).collect();
        let (db, n) = graph(6, &edges);
        let exp = RelationshipExpander::all_types(&db, Direction::Both);
        let at = |depth| ShortestPath::exact_depth(exp.clone(), depth).find_all_paths(n[0], n[1]).unwrap();

        // through all four other nodes in any order
        let hamiltonian = at(5);
        assert_eq!(hamiltonian.len(), 24);
        assert!(hamiltonian.iter().all(|p| p.len() == 5 && p.is_simple()));
        assert_eq!(at(4).len(), 24);
        for depth in [6, 8, 12, 14, 20, 40] {
            assert!(at(depth).is_empty(), "depth {depth}");
        }
    }

    #[test]
    fn test_missing_node_is_invalid_argument() {
        let (db, n) = graph(1, &[]);
        let finder = ShortestPath::new(RelationshipExpander::all_types(&db, Direction::Both), 3);
        let err = finder.find_all_paths(n[0], NodeId(99)).unwrap_err();
        assert!(matches!(err, crate::Error::InvalidArgument(_)));
    }
}
