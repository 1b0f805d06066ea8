//! # Property Graph Model
//!
//! Plain DTOs shared by the store and the search algorithms.
//!
//! Design rule: this module is pure data with no I/O, state or search logic.

pub mod node;
pub mod relationship;
pub mod path;
pub mod value;
pub mod property_map;

pub use node::{Node, NodeId};
pub use relationship::{Relationship, RelId, Direction};
pub use path::Path;
pub use value::Value;
pub use property_map::{PropertyMap, props};
