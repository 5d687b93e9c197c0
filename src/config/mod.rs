//! Tool configuration management for `svgsel.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # [log], [optimize], [output]
//! ├── error          # ConfigError
//! ├── util           # Config file discovery
//! └── mod.rs         # ToolConfig (this file)
//! ```
//!
//! The file is optional. When present it is found by walking up from the
//! working directory; values given on the command line override it.

mod error;
pub mod section;
mod util;

pub use error::ConfigError;
pub use section::{LogConfig, OptimizeConfig, OutputConfig};
pub use util::{find_config_file, find_config_file_from};

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::cli::{Cli, Commands};
use crate::log;

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing svgsel.toml
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolConfig {
    /// Path of the loaded config file, if any (internal use only)
    #[serde(skip)]
    pub config_path: Option<PathBuf>,

    #[serde(default)]
    pub log: LogConfig,

    #[serde(default)]
    pub optimize: OptimizeConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

impl ToolConfig {
    /// Load configuration for a CLI invocation.
    ///
    /// Searches upward from cwd for the config file; a missing file means
    /// defaults. CLI options are applied on top.
    pub fn load(cli: &Cli) -> Result<Self> {
        let mut config = match find_config_file(&cli.config) {
            Some(path) => {
                let mut config = Self::from_path(&path)
                    .with_context(|| format!("Failed to load config `{}`", path.display()))?;
                config.config_path = Some(path);
                config
            }
            None => Self::default(),
        };

        config.apply_command_options(cli);
        Ok(config)
    }

    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        Ok(config)
    }

    /// Load configuration from file path with unknown field detection.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)?;
        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }

        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), ConfigError> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }

    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        log!("warning"; "unknown fields in {}, ignoring:", path.display());
        for field in fields {
            eprintln!("- {}", field);
        }
    }

    // ========================================================================
    // CLI options
    // ========================================================================

    fn apply_command_options(&mut self, cli: &Cli) {
        self.log.verbose |= cli.verbose();

        match &cli.command {
            Commands::Select { args } => self.output.pretty |= args.pretty,
            Commands::Transform { args } => self.output.pretty |= args.pretty,
            Commands::Optimize { args } => {
                Self::update_option(&mut self.optimize.level, args.level.as_ref());
                if args.precision.is_some() {
                    self.optimize.precision = args.precision;
                }
            }
        }
    }

    /// Update config option if CLI value is provided
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }
}

/// Parse a test config (panics on unknown fields to catch typos in tests).
#[cfg(test)]
pub fn test_parse_config(content: &str) -> ToolConfig {
    let (parsed, ignored) = ToolConfig::parse_with_ignored(content).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}

// ============================================================================
// tests
// ============================================================================
