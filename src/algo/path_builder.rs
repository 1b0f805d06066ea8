//! Incremental, structurally shared path construction.
//!
//! A search grows many partial paths that share prefixes. Each partial
//! path is a `PathBuilder`: a small `Copy` handle onto a chain of links in
//! a `PathArena`. `push` appends one link and returns a new handle; the old
//! handle stays valid, so siblings share everything before the fork.
//!
//! ```text
//!   arena:  [s-a] <- [a-b] <- [b-c]
//!                  ^        \
//!                  |         [b-d]
//!   builders:  (tip=1,len=2)  (tip=2,len=3)  (tip=3,len=3)
//! ```
//!
//! Links are immutable once pushed and only ever point backwards, so the
//! chains form a DAG without reference counting.

use crate::model::{NodeId, Path, Relationship};

#[derive(Debug)]
struct Link {
    rel: Relationship,
    prev: Option<usize>,
}

/// Backing storage for every link pushed during one search.
#[derive(Debug, Default)]
pub struct PathArena {
    links: Vec<Link>,
}

impl PathArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of links pushed so far.
    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Relationships of the chain ending at `tip`, newest first.
    fn chain(&self, tip: Option<usize>) -> impl Iterator<Item = &Relationship> {
        std::iter::successors(tip, |&idx| self.links[idx].prev).map(|idx| &self.links[idx].rel)
    }
}

/// Handle onto a partial path rooted at `start_node()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathBuilder {
    start: NodeId,
    end: NodeId,
    tip: Option<usize>,
    len: usize,
}

impl PathBuilder {
    /// The empty path at `start`.
    pub fn new(start: NodeId) -> Self {
        Self { start, end: start, tip: None, len: 0 }
    }

    pub fn start_node(&self) -> NodeId {
        self.start
    }

    pub fn end_node(&self) -> NodeId {
        self.end
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// True if `node` is anywhere on this path. `O(len)`.
    pub fn visits(&self, arena: &PathArena, node: NodeId) -> bool {
        self.start == node || arena.chain(self.tip).any(|rel| rel.touches(node))
    }

    /// Extend this path over `rel`, which must touch `end_node()`.
    ///
    /// # Panics
    ///
    /// If `rel` does not touch the current end node.
    pub fn push(&self, arena: &mut PathArena, rel: Relationship) -> PathBuilder {
        let next = rel.other_node(self.end).unwrap_or_else(|| {
            panic!(
                "relationship {} ({}->{}) does not touch builder end node {}",
                rel.id, rel.src, rel.dst, self.end
            )
        });
        arena.links.push(Link { rel, prev: self.tip });
        PathBuilder {
            start: self.start,
            end: next,
            tip: Some(arena.links.len() - 1),
            len: self.len + 1,
        }
    }

    /// Materialize `start_node() → end_node()`.
    pub fn build(&self, arena: &PathArena) -> Path {
        let mut rels: Vec<&Relationship> = arena.chain(self.tip).collect();
        rels.reverse();
        let mut path = Path {
            nodes: Vec::with_capacity(self.len + 1),
            relationships: Vec::with_capacity(self.len),
        };
        path.nodes.push(self.start);
        for rel in rels {
            path.append(rel.clone());
        }
        path
    }

    /// Join with a builder grown from the other end of the path.
    ///
    /// Both builders must end at the same (meeting) node. The result runs
    /// from `self.start_node()` through the meeting node to
    /// `other.start_node()`, each relationship keeping its stored
    /// orientation.
    ///
    /// # Panics
    ///
    /// If the two builders do not end at the same node.
    pub fn build_with(&self, arena: &PathArena, other: &PathBuilder) -> Path {
        assert_eq!(
            self.end, other.end,
            "builders must meet at the same node"
        );
        let mut path = self.build(arena);
        path.nodes.reserve(other.len);
        path.relationships.reserve(other.len);
        // other's chain walked newest-first leads from the meeting node back to its start
        for rel in arena.chain(other.tip) {
            path.append(rel.clone());
        }
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RelId;

    fn rel(id: u64, src: u64, dst: u64) -> Relationship {
        Relationship::new(RelId(id), NodeId(src), NodeId(dst), "R")
    }

    fn ids(path: &Path) -> Vec<u64> {
        path.nodes.iter().map(|n| n.0).collect()
    }

    #[test]
    fn test_empty_builder() {
        let arena = PathArena::new();
        let builder = PathBuilder::new(NodeId(7));
        let path = builder.build(&arena);
        assert_eq!(ids(&path), vec![7]);
        assert!(path.is_empty());
        assert!(builder.is_empty());
    }

    #[test]
    fn test_push_shares_prefix() {
        let mut arena = PathArena::new();
        let root = PathBuilder::new(NodeId(1));
        let ab = root.push(&mut arena, rel(1, 1, 2));
        let abc = ab.push(&mut arena, rel(2, 2, 3));
        let abd = ab.push(&mut arena, rel(3, 4, 2));

        assert_eq!(arena.len(), 3);
        assert_eq!(ids(&abc.build(&arena)), vec![1, 2, 3]);
        assert_eq!(ids(&abd.build(&arena)), vec![1, 2, 4]);
        // the shared prefix is untouched
        assert_eq!(ids(&ab.build(&arena)), vec![1, 2]);
        assert_eq!(abd.len(), 2);
        assert_eq!(abd.start_node(), NodeId(1));
        assert_eq!(abd.end_node(), NodeId(4));

        assert!(abd.visits(&arena, NodeId(1)));
        assert!(abd.visits(&arena, NodeId(4)));
        assert!(!abd.visits(&arena, NodeId(3)));
        assert!(!root.visits(&arena, NodeId(2)));
    }

    #[test]
    fn test_build_with_joins_at_meeting_node() {
        let mut arena = PathArena::new();
        // 1 - 2 - 3   meets   5 - 4 - 3
        let left = PathBuilder::new(NodeId(1))
            .push(&mut arena, rel(1, 1, 2))
            .push(&mut arena, rel(2, 2, 3));
        let right = PathBuilder::new(NodeId(5))
            .push(&mut arena, rel(3, 5, 4))
            .push(&mut arena, rel(4, 3, 4));

        let path = left.build_with(&arena, &right);
        assert_eq!(ids(&path), vec![1, 2, 3, 4, 5]);
        let rel_ids: Vec<u64> = path.relationships.iter().map(|r| r.id.0).collect();
        assert_eq!(rel_ids, vec![1, 2, 4, 3]);

        let reverse = right.build_with(&arena, &left);
        assert_eq!(ids(&reverse), vec![5, 4, 3, 2, 1]);
    }

    #[test]
    fn test_build_with_empty_other_side() {
        let mut arena = PathArena::new();
        let left = PathBuilder::new(NodeId(1)).push(&mut arena, rel(1, 1, 2));
        let right = PathBuilder::new(NodeId(2));
        assert_eq!(ids(&left.build_with(&arena, &right)), vec![1, 2]);
        assert_eq!(ids(&right.build_with(&arena, &left)), vec![2, 1]);
    }

    #[test]
    #[should_panic(expected = "does not touch builder end node")]
    fn test_push_rejects_disconnected_relationship() {
        let mut arena = PathArena::new();
        PathBuilder::new(NodeId(1)).push(&mut arena, rel(1, 2, 3));
    }

    #[test]
    #[should_panic(expected = "builders must meet")]
    fn test_build_with_requires_meeting_node() {
        let mut arena = PathArena::new();
        let left = PathBuilder::new(NodeId(1)).push(&mut arena, rel(1, 1, 2));
        let right = PathBuilder::new(NodeId(9));
        left.build_with(&arena, &right);
    }
}
