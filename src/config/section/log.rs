//! `[log]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [log]
//! verbose = true    # Same as passing --verbose
//! ```

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Print debug lines from the matcher, compositor and optimizer.
    pub verbose: bool,
}
