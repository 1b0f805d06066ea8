//! Path: a sequence of alternating nodes and relationships.

use std::fmt;

use serde::{Deserialize, Serialize};
use super::{NodeId, Relationship};

/// A path in the graph: node -[rel]- node -[rel]- node ...
///
/// Relationships keep their stored orientation; the walk order is given by
/// `nodes`, which always has one more element than `relationships`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Path {
    /// Nodes along the path, start first.
    pub nodes: Vec<NodeId>,
    /// Relationships connecting consecutive nodes.
    pub relationships: Vec<Relationship>,
}

impl Path {
    /// The zero-length path consisting of `node` alone.
    pub fn single(node: NodeId) -> Self {
        Self { nodes: vec![node], relationships: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.relationships.len()
    }

    pub fn is_empty(&self) -> bool {
        self.relationships.is_empty()
    }

    pub fn start(&self) -> NodeId {
        *self.nodes.first().expect("Path always has at least one node")
    }

    pub fn end(&self) -> NodeId {
        *self.nodes.last().expect("Path always has at least one node")
    }

    /// Extend the path from its end node over `rel`.
    ///
    /// Panics if `rel` does not touch the current end node.
    pub fn append(&mut self, rel: Relationship) {
        let end = self.end();
        let next = rel.other_node(end).unwrap_or_else(|| {
            panic!("relationship {} does not touch path end node {end}", rel.id)
        });
        self.relationships.push(rel);
        self.nodes.push(next);
    }

    /// True if no node occurs twice.
    pub fn is_simple(&self) -> bool {
        let mut seen = hashbrown::HashSet::with_capacity(self.nodes.len());
        self.nodes.iter().all(|n| seen.insert(*n))
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, node) in self.nodes.iter().enumerate() {
            if i > 0 { write!(f, ",")?; }
            write!(f, "{node}")?;
        }
        Ok(())
    }
}
