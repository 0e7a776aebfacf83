//! MCP server descriptors.

use std::collections::HashMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Description of one MCP tool-server process.
///
/// Built-in capability bridges (Jira/Confluence, OCI) and user-defined
/// custom servers all use this shape — the core has no knowledge of what
/// the server does beyond the tools it declares.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpServerConfig {
    /// Unique server name; also the routing-table key.
    pub name: String,
    /// Executable to spawn.
    pub command: String,
    /// Arguments for the executable.
    #[serde(default)]
    pub args: Vec<String>,
    /// Working directory for the child process.
    #[serde(default)]
    pub cwd: Option<PathBuf>,
    /// Environment overrides. The child inherits the host environment;
    /// these entries override it.
    #[serde(default)]
    pub env: HashMap<String, String>,
    /// Disabled servers are skipped by `start_server` without error.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl McpServerConfig {
    /// A minimal enabled descriptor with no args, cwd, or env overrides.
    #[must_use]
    pub fn new(name: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            command: command.into(),
            args: Vec::new(),
            cwd: None,
            env: HashMap::new(),
            enabled: true,
        }
    }

    /// Add an argument.
    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Add an environment override.
    #[must_use]
    pub fn env_var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Mark the descriptor disabled.
    #[must_use]
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }
}
