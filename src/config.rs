//! Search configuration.
//!
//! Limits shared by every path finder. Can be built in code or loaded
//! from JSON; missing fields take their defaults.
//!
//! ```json
//! { "max_depth": 6, "max_nodes": 10000, "bidirectional": true }
//! ```

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Limits and mode switches for a search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Maximum path length (in relationships) for unweighted searches.
    pub max_depth: usize,
    /// Cap on the number of nodes a weighted search may settle.
    /// `None` means unbounded.
    pub max_nodes: Option<usize>,
    /// Expand weighted searches from both ends.
    pub bidirectional: bool,
    /// Only report unweighted paths of exactly `max_depth`.
    pub exact_depth: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_depth: 32,
            max_nodes: None,
            bidirectional: true,
            exact_depth: false,
        }
    }
}

impl SearchConfig {
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_max_nodes(mut self, max_nodes: usize) -> Self {
        self.max_nodes = Some(max_nodes);
        self
    }

    pub fn with_bidirectional(mut self, bidirectional: bool) -> Self {
        self.bidirectional = bidirectional;
        self
    }

    pub fn with_exact_depth(mut self, exact_depth: bool) -> Self {
        self.exact_depth = exact_depth;
        self
    }

    /// Parse and validate a JSON configuration.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: SearchConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_nodes == Some(0) {
            return Err(Error::ConfigError("max_nodes must be at least 1".into()));
        }
        Ok(())
    }
}
