//! `[optimize]` section configuration.
//!
//! Defaults for the `optimize` command. Flags on the command line win.
//!
//! # Example
//!
//! ```toml
//! [optimize]
//! level = "aggressive"   # light | standard (or default) | aggressive
//! precision = 1          # Decimal places kept; omit for the level default
//! ```

use serde::{Deserialize, Serialize};

use crate::svg::{OptimizeLevel, OptimizeOptions};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizeConfig {
    pub level: OptimizeLevel,

    /// Overrides the level's decimal precision.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub precision: Option<u8>,
}

impl OptimizeConfig {
    pub fn options(&self) -> OptimizeOptions {
        OptimizeOptions {
            level: self.level,
            precision: self.precision,
        }
    }
}
