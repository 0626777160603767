//! Command bridge configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration of the external query command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Executable answering queries (relative paths resolve against the base directory)
    pub command: Option<PathBuf>,

    /// Extra arguments passed to the command
    pub args: Vec<String>,

    /// Timeout in seconds for one query
    pub timeout: u64,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            command: None,
            args: Vec::new(),
            timeout: 30,
        }
    }
}

impl BridgeConfig {
    /// Whether a query command is configured
    #[must_use]
    pub const fn is_configured(&self) -> bool {
        self.command.is_some()
    }
}
