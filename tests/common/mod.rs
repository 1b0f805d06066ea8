//! Shared fixture: a `MemoryGraph` whose nodes are addressed by name.

#![allow(dead_code)]

use std::collections::{BTreeSet, HashMap};

use neo4j_graphalgo::{props, MemoryGraph, NodeId, Path, PropertyMap, RelId, Value};

pub const R1: &str = "R1";

pub struct NamedGraph {
    pub db: MemoryGraph,
    names: HashMap<String, NodeId>,
}

impl NamedGraph {
    pub fn new() -> Self {
        Self { db: MemoryGraph::new(), names: HashMap::new() }
    }

    /// Node called `name`, created on first use.
    pub fn node(&mut self, name: &str) -> NodeId {
        if let Some(id) = self.names.get(name) {
            return *id;
        }
        let id = self.db.create_node(&[], props([("name", name)]));
        self.names.insert(name.to_owned(), id);
        id
    }

    /// Node called `name` with extra properties.
    pub fn make_node(&mut self, name: &str, extra: &[(&str, f64)]) -> NodeId {
        let mut properties = props([("name", name)]);
        for (k, v) in extra {
            properties.insert((*k).to_owned(), Value::from(*v));
        }
        let id = self.db.create_node(&[], properties);
        self.names.insert(name.to_owned(), id);
        id
    }

    pub fn make_edge(&mut self, from: &str, to: &str) -> RelId {
        self.make_edge_with(from, to, PropertyMap::new())
    }

    pub fn make_weighted_edge(&mut self, from: &str, to: &str, key: &str, weight: f64) -> RelId {
        self.make_edge_with(from, to, props([(key, weight)]))
    }

    fn make_edge_with(&mut self, from: &str, to: &str, properties: PropertyMap) -> RelId {
        let (a, b) = (self.node(from), self.node(to));
        self.db.create_relationship(a, b, R1, properties).unwrap()
    }

    /// `"a,b,c"` creates a->b and b->c.
    pub fn make_edge_chain(&mut self, chain: &str) {
        let names: Vec<&str> = chain.split(',').collect();
        for pair in names.windows(2) {
            self.make_edge(pair[0], pair[1]);
        }
    }

    pub fn id(&self, name: &str) -> NodeId {
        self.names[name]
    }

    pub fn name(&self, id: NodeId) -> &str {
        self.names
            .iter()
            .find(|(_, v)| **v == id)
            .map(|(k, _)| k.as_str())
            .unwrap()
    }

    /// A path as `"a,b,c"`.
    pub fn render(&self, path: &Path) -> String {
        path.nodes.iter().map(|n| self.name(*n)).collect::<Vec<_>>().join(",")
    }

    /// Paths as a multiset of `"a,b,c"` strings, order-insensitive.
    pub fn render_all<'p>(&self, paths: impl IntoIterator<Item = &'p Path>) -> Vec<String> {
        let mut rendered: Vec<String> = paths.into_iter().map(|p| self.render(p)).collect();
        rendered.sort();
        rendered
    }
}

/// Expected paths in the same sorted form as `render_all`.
pub fn expected(paths: &[&str]) -> Vec<String> {
    let mut v: Vec<String> = paths.iter().map(|s| s.to_string()).collect();
    v.sort();
    v
}

/// Distinct nodes of a path, for simplicity checks.
pub fn distinct(path: &Path) -> BTreeSet<NodeId> {
    path.nodes.iter().copied().collect()
}
