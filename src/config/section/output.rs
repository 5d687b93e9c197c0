//! `[output]` section configuration.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Pretty-print JSON match lists and reports.
    pub pretty: bool,
}

#[cfg(test)]
mod tests {
    use crate::config::test_parse_config;

    #[test]
    fn test_output_config() {
        assert!(test_parse_config("[output]\npretty = true").output.pretty);
        assert!(!test_parse_config("").output.pretty);
    }
}
