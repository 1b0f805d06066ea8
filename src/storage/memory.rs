//! In-memory graph store.
//!
//! This is the reference implementation of `GraphStore`.
//! It uses simple HashMaps protected by RwLock.
//!
//! ## Limitations
//!
//! - **No transactions**: writes are applied immediately.
//! - **Single-writer only**: per-collection locks mean multi-step mutations
//!   are NOT atomic. Safe for single-threaded or read-heavy use only.
//!
//! Use this store for:
//! - Testing the search algorithms against small fixture graphs
//! - Embedding the algorithms in applications that don't need persistence

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use hashbrown::HashMap;
use parking_lot::RwLock;

use crate::model::*;
use crate::{Error, Result};
use super::GraphStore;

// ============================================================================
// MemoryGraph
// ============================================================================

/// In-memory property graph storage.
///
/// Cloning is cheap and yields a handle onto the same graph.
#[derive(Clone)]
pub struct MemoryGraph {
    inner: Arc<MemoryInner>,
}

struct MemoryInner {
    nodes: RwLock<HashMap<NodeId, Node>>,
    relationships: RwLock<HashMap<RelId, Relationship>>,
    /// node_id → relationship IDs in creation order
    adjacency: RwLock<HashMap<NodeId, Vec<RelId>>>,
    next_node_id: AtomicU64,
    next_rel_id: AtomicU64,
}

impl Default for MemoryGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryGraph {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(MemoryInner {
                nodes: RwLock::new(HashMap::new()),
                relationships: RwLock::new(HashMap::new()),
                adjacency: RwLock::new(HashMap::new()),
                next_node_id: AtomicU64::new(1),
                next_rel_id: AtomicU64::new(1),
            }),
        }
    }

    // ========================================================================
    // Node CRUD
    // ========================================================================

    /// Create a node with the given labels and properties.
    pub fn create_node(&self, labels: &[&str], props: PropertyMap) -> NodeId {
        let id = NodeId(self.inner.next_node_id.fetch_add(1, Ordering::Relaxed));
        let node = Node {
            id,
            labels: labels.iter().map(|l| l.to_string()).collect(),
            properties: props,
        };

        self.inner.nodes.write().insert(id, node);
        self.inner.adjacency.write().insert(id, Vec::new());
        id
    }

    /// Get a node by ID. Returns None if not found.
    pub fn get_node(&self, id: NodeId) -> Option<Node> {
        self.inner.nodes.read().get(&id).cloned()
    }

    /// Delete a node. Returns true if it existed.
    /// Fails if the node still has relationships (Neo4j semantics).
    pub fn delete_node(&self, id: NodeId) -> Result<bool> {
        {
            let adj = self.inner.adjacency.read();
            if let Some(rels) = adj.get(&id) {
                if !rels.is_empty() {
                    return Err(Error::ConstraintViolation(
                        format!("Cannot delete node {id} with {} relationships. Delete relationships first.", rels.len())
                    ));
                }
            }
        }

        let removed = self.inner.nodes.write().remove(&id);
        self.inner.adjacency.write().remove(&id);
        Ok(removed.is_some())
    }

    /// Delete a node and all its relationships in one operation.
    pub fn detach_delete_node(&self, id: NodeId) -> Result<bool> {
        let rel_ids = self.inner.adjacency.read().get(&id).cloned().unwrap_or_default();
        for rel in rel_ids {
            self.delete_relationship(rel);
        }
        self.delete_node(id)
    }

    // ========================================================================
    // Relationship CRUD
    // ========================================================================

    /// Create a relationship between two existing nodes.
    pub fn create_relationship(
        &self,
        src: NodeId,
        dst: NodeId,
        rel_type: &str,
        props: PropertyMap,
    ) -> Result<RelId> {
        {
            let nodes = self.inner.nodes.read();
            if !nodes.contains_key(&src) {
                return Err(Error::NotFound(format!("Source node {src}")));
            }
            if !nodes.contains_key(&dst) {
                return Err(Error::NotFound(format!("Target node {dst}")));
            }
        }

        let id = RelId(self.inner.next_rel_id.fetch_add(1, Ordering::Relaxed));
        let rel = Relationship {
            id,
            src,
            dst,
            rel_type: rel_type.to_string(),
            properties: props,
        };

        self.inner.relationships.write().insert(id, rel);

        let mut adj = self.inner.adjacency.write();
        adj.entry(src).or_default().push(id);
        if src != dst {
            adj.entry(dst).or_default().push(id);
        }

        Ok(id)
    }

    /// Get a relationship by ID.
    pub fn get_relationship(&self, id: RelId) -> Option<Relationship> {
        self.inner.relationships.read().get(&id).cloned()
    }

    /// Delete a relationship. Returns true if it existed.
    pub fn delete_relationship(&self, id: RelId) -> bool {
        let removed = self.inner.relationships.write().remove(&id);
        if let Some(rel) = &removed {
            let mut adj = self.inner.adjacency.write();
            if let Some(rels) = adj.get_mut(&rel.src) {
                rels.retain(|rid| *rid != id);
            }
            if rel.src != rel.dst {
                if let Some(rels) = adj.get_mut(&rel.dst) {
                    rels.retain(|rid| *rid != id);
                }
            }
        }
        removed.is_some()
    }

    // ========================================================================
    // Introspection
    // ========================================================================

    pub fn node_count(&self) -> u64 {
        self.inner.nodes.read().len() as u64
    }

    pub fn relationship_count(&self) -> u64 {
        self.inner.relationships.read().len() as u64
    }
}

// ============================================================================
// GraphStore impl
// ============================================================================

impl GraphStore for MemoryGraph {
    fn contains_node(&self, id: NodeId) -> bool {
        self.inner.nodes.read().contains_key(&id)
    }

    fn relationships_of(
        &self,
        node: NodeId,
        dir: Direction,
        rel_type: Option<&str>,
    ) -> Result<Vec<Relationship>> {
        let adj = self.inner.adjacency.read();
        let rels = self.inner.relationships.read();

        let rel_ids = adj.get(&node).ok_or_else(|| Error::NotFound(format!("Node {node}")))?;
        let mut result = Vec::new();

        for rid in rel_ids {
            // Dangling ids are skipped, not reported
            let Some(rel) = rels.get(rid) else { continue };
            let matches_dir = match dir {
                Direction::Outgoing => rel.src == node,
                Direction::Incoming => rel.dst == node,
                Direction::Both => true,
            };
            let matches_type = rel_type.is_none_or(|t| rel.rel_type == t);

            if matches_dir && matches_type {
                result.push(rel.clone());
            }
        }

        Ok(result)
    }

    fn all_nodes(&self) -> Vec<NodeId> {
        let mut ids: Vec<NodeId> = self.inner.nodes.read().keys().copied().collect();
        ids.sort_unstable();
        ids
    }
}

// ============================================================================
// Tests
// ============================================================================
