//! Bridge configuration
//!
//! Token prefixes, stringify indentation and the execution mode a bridge
//! starts in. Loadable from JSON; missing fields take their defaults.

use serde::{Deserialize, Serialize};

use crate::error::BridgeResult;
use crate::serializer::DEFAULT_INDENT;

/// Configuration for a [`Bridge`](crate::bridge::Bridge)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Spaces per indentation level of stringified values (default: 2)
    pub indent_width: usize,
    /// Prefix of minted reference tokens (default: `jsoop-ref`)
    pub token_prefix: String,
    /// Prefix of seeded singleton tokens (default: `jsoop-builtin`)
    pub builtin_prefix: String,
    /// Run user code sandboxed (default: true)
    pub sandboxed: bool,
    /// Seed the built-in singletons when the bridge is created (default: true)
    pub seed_builtins: bool,
}

impl BridgeConfig {
    pub fn new() -> Self {
        Self {
            indent_width: DEFAULT_INDENT,
            token_prefix: "jsoop-ref".to_string(),
            builtin_prefix: "jsoop-builtin".to_string(),
            sandboxed: true,
            seed_builtins: true,
        }
    }

    pub fn from_json_str(text: &str) -> BridgeResult<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn with_indent_width(mut self, width: usize) -> Self {
        self.indent_width = width;
        self
    }

    pub fn with_token_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.token_prefix = prefix.into();
        self
    }

    pub fn with_builtin_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.builtin_prefix = prefix.into();
        self
    }

    pub fn with_sandboxed(mut self, sandboxed: bool) -> Self {
        self.sandboxed = sandboxed;
        self
    }

    pub fn with_seed_builtins(mut self, seed: bool) -> Self {
        self.seed_builtins = seed;
        self
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self::new()
    }
}
