//! Expansion policies and the lazy expansion frontier.
//!
//! An `Expander` answers "which relationships do we follow from this
//! node?". Every bidirectional search expands its end side with
//! `reversed()`, so a directed filter is honoured from both ends.
//!
//! `ExpansionFrontier` is the unit the searches consume: a cursor over one
//! node's relationships that calls the expander at most once.

use tracing::debug;

use crate::model::{Direction, NodeId, Relationship};
use crate::storage::GraphStore;
use crate::{Error, Result};

// ============================================================================
// Expander trait
// ============================================================================

/// Expansion policy: node → ordered relationships to traverse.
pub trait Expander {
    /// Relationships to follow from `node`, in a deterministic order.
    fn expand(&self, node: NodeId) -> Result<Vec<Relationship>>;

    /// Whether `node` exists at all. Expanders without a backing store
    /// accept every node.
    fn contains_node(&self, _node: NodeId) -> bool {
        true
    }

    /// The same policy with every direction flipped.
    fn reversed(&self) -> Self
    where
        Self: Sized;
}

// ============================================================================
// RelationshipExpander
// ============================================================================

/// Store-backed expander over (relationship type, direction) pairs.
///
/// A filter with no type matches every type. Relationships are returned
/// filter by filter, in store order.
#[derive(Debug, Clone)]
pub struct RelationshipExpander<S> {
    store: S,
    filters: Vec<(Option<String>, Direction)>,
}

impl<S: GraphStore + Clone> RelationshipExpander<S> {
    /// Follow every relationship type in `dir`.
    pub fn all_types(store: S, dir: Direction) -> Self {
        Self { store, filters: vec![(None, dir)] }
    }

    /// Follow only the given (type, direction) pairs.
    pub fn for_types<T: Into<String>>(
        store: S,
        types: impl IntoIterator<Item = (T, Direction)>,
    ) -> Self {
        types
            .into_iter()
            .fold(Self { store, filters: Vec::new() }, |exp, (t, dir)| exp.add(t, dir))
    }

    /// Add a (type, direction) pair. A type already present has its
    /// direction replaced.
    pub fn add(mut self, rel_type: impl Into<String>, dir: Direction) -> Self {
        let rel_type = rel_type.into();
        self.filters.retain(|(t, _)| t.is_some());
        match self.filters.iter_mut().find(|(t, _)| t.as_deref() == Some(rel_type.as_str())) {
            Some((_, existing)) => *existing = dir,
            None => self.filters.push((Some(rel_type), dir)),
        }
        self
    }
}

impl<S: GraphStore + Clone> Expander for RelationshipExpander<S> {
    fn expand(&self, node: NodeId) -> Result<Vec<Relationship>> {
        let mut result = Vec::new();
        for (rel_type, dir) in &self.filters {
            match self.store.relationships_of(node, *dir, rel_type.as_deref()) {
                Ok(rels) => result.extend(rels),
                Err(Error::NotFound(what)) => {
                    debug!(%node, %what, "node vanished during expansion, treating as leaf");
                    return Ok(Vec::new());
                }
                Err(e) => return Err(e),
            }
        }
        Ok(result)
    }

    fn contains_node(&self, node: NodeId) -> bool {
        self.store.contains_node(node)
    }

    fn reversed(&self) -> Self {
        Self {
            store: self.store.clone(),
            filters: self
                .filters
                .iter()
                .map(|(t, dir)| (t.clone(), dir.reverse()))
                .collect(),
        }
    }
}

// ============================================================================
// FnExpander
// ============================================================================

/// Which way an expansion runs relative to the caller's start node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Forward,
    Backward,
}

impl Orientation {
    fn flip(self) -> Self {
        match self {
            Orientation::Forward => Orientation::Backward,
            Orientation::Backward => Orientation::Forward,
        }
    }
}

/// Expander backed by a closure.
///
/// The closure receives the orientation so it can flip any direction
/// filter when expanding from the end node.
#[derive(Clone)]
pub struct FnExpander<F> {
    f: F,
    orientation: Orientation,
}

/// Wrap a closure as an `Expander`.
pub fn expander_fn<F>(f: F) -> FnExpander<F>
where
    F: Fn(NodeId, Orientation) -> Vec<Relationship> + Clone,
{
    FnExpander { f, orientation: Orientation::Forward }
}

impl<F> Expander for FnExpander<F>
where
    F: Fn(NodeId, Orientation) -> Vec<Relationship> + Clone,
{
    fn expand(&self, node: NodeId) -> Result<Vec<Relationship>> {
        Ok((self.f)(node, self.orientation))
    }

    fn reversed(&self) -> Self {
        FnExpander { f: self.f.clone(), orientation: self.orientation.flip() }
    }
}

// ============================================================================
// ExpansionFrontier
// ============================================================================

/// The not-yet-returned relationships of one node.
///
/// The expander is called lazily on the first `next_relationship` and its
/// result is cached; each relationship is returned exactly once.
pub struct ExpansionFrontier<'e, E> {
    expander: &'e E,
    node: NodeId,
    pending: Option<std::vec::IntoIter<Relationship>>,
}

impl<'e, E: Expander> ExpansionFrontier<'e, E> {
    pub fn new(expander: &'e E, node: NodeId) -> Self {
        Self { expander, node, pending: None }
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Next unreturned relationship, or `None` once exhausted.
    pub fn next_relationship(&mut self) -> Result<Option<Relationship>> {
        if self.pending.is_none() {
            self.pending = Some(self.expander.expand(self.node)?.into_iter());
        }
        Ok(self.pending.as_mut().and_then(Iterator::next))
    }
}
