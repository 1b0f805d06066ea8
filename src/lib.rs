//! # neo4j-graphalgo: path finding over a property graph
//!
//! Shortest-path and centrality algorithms for the Neo4j property-graph
//! model, written against a narrow storage trait.
//!
//! ## Design Principles
//!
//! 1. **Trait-first**: `GraphStore` is the only thing the algorithms ask of storage
//! 2. **Clean DTOs**: `Node`, `Relationship`, `Path`, `Value` cross all boundaries
//! 3. **Policies are values**: expansion, cost and estimate are injected, never subclassed
//! 4. **Generic cost**: weighted searches run over any `Cost` (zero, add, compare)
//!
//! ## Quick Start
//!
//! ```rust
//! use neo4j_graphalgo::{algo, Direction, MemoryGraph, PathFinder, SearchConfig, props};
//! use neo4j_graphalgo::algo::{PropertyCost, RelationshipExpander};
//!
//! # fn example() -> neo4j_graphalgo::Result<()> {
//! let db = MemoryGraph::new();
//! let a = db.create_node(&["City"], props([("name", "A")]));
//! let b = db.create_node(&["City"], props([("name", "B")]));
//! let c = db.create_node(&["City"], props([("name", "C")]));
//! db.create_relationship(a, b, "ROAD", props([("km", 2.0)]))?;
//! db.create_relationship(b, c, "ROAD", props([("km", 3.0)]))?;
//! db.create_relationship(a, c, "ROAD", props([("km", 9.0)]))?;
//!
//! let config = SearchConfig::default();
//! let roads = RelationshipExpander::for_types(&db, [("ROAD", Direction::Both)]);
//!
//! let hops = algo::shortest_path(roads.clone(), &config).find_all_paths(a, c)?;
//! assert_eq!(hops.len(), 1);
//!
//! let cheapest = algo::dijkstra(roads, PropertyCost::new("km"), &config)
//!     .find_single_path(a, c)?
//!     .expect("c is reachable");
//! assert_eq!(cheapest.weight, 5.0);
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```
//!
//! ## Algorithms
//!
//! | Finder | Module | Description |
//! |--------|--------|-------------|
//! | `ShortestPath` | `algo::shortest_path` | All shortest paths by hop count, bidirectional, level by level |
//! | `Dijkstra` | `algo::dijkstra` | Cheapest path(s), optionally bidirectional, with a node cap |
//! | `AStar` | `algo::astar` | Cheapest path guided by an estimate |
//! | `Eccentricity` | `algo::centrality` | Eccentricity, network diameter and radius |

// ============================================================================
// Modules
// ============================================================================

pub mod model;
pub mod storage;
pub mod config;
pub mod algo;

// ============================================================================
// Re-exports: Model (the DTOs)
// ============================================================================

pub use model::{
    Node, Relationship, Path, Value, PropertyMap,
    NodeId, RelId, Direction, props,
};

// ============================================================================
// Re-exports: Storage, config, algorithms
// ============================================================================

pub use storage::{GraphStore, MemoryGraph};
pub use config::SearchConfig;
pub use algo::{PathFinder, WeightedPath};

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
