//! # Graph Store Trait
//!
//! This is the contract between the search algorithms and whatever holds
//! the graph. It is deliberately narrow: a search only ever asks "which
//! relationships leave this node?" and "does this node exist?".
//!
//! ## Implementations
//!
//! | Store | Module | Description |
//! |-------|--------|-------------|
//! | `MemoryGraph` | `memory` | In-memory reference store for testing/embedding |
//!
//! All calls are synchronous and assumed side-effect free. A store that
//! loses an entity mid-search (deleted by a concurrent writer) reports
//! `Error::NotFound`; the expansion layer turns that into an empty
//! expansion instead of failing the search.

pub mod memory;

use crate::model::*;
use crate::Result;

pub use memory::MemoryGraph;

// ============================================================================
// GraphStore Trait
// ============================================================================

/// Read-only view of a property graph, as consumed by the search engine.
pub trait GraphStore {
    /// True if the node exists.
    fn contains_node(&self, id: NodeId) -> bool;

    /// Relationships of `node`, filtered by direction and optionally type.
    ///
    /// The order must be deterministic for a given graph state; searches
    /// rely on it for reproducible tie-breaks.
    fn relationships_of(
        &self,
        node: NodeId,
        dir: Direction,
        rel_type: Option<&str>,
    ) -> Result<Vec<Relationship>>;

    /// Every node in the store, in id order.
    fn all_nodes(&self) -> Vec<NodeId>;
}

impl<S: GraphStore + ?Sized> GraphStore for &S {
    fn contains_node(&self, id: NodeId) -> bool {
        (**self).contains_node(id)
    }

    fn relationships_of(
        &self,
        node: NodeId,
        dir: Direction,
        rel_type: Option<&str>,
    ) -> Result<Vec<Relationship>> {
        (**self).relationships_of(node, dir, rel_type)
    }

    fn all_nodes(&self) -> Vec<NodeId> {
        (**self).all_nodes()
    }
}
