//! The per-session MCP process manager and routing table.

use std::collections::HashMap;
use std::time::Instant;

use sidekick_types::{McpError, ToolDefinition};

use crate::client::McpClient;
use crate::config::McpServerConfig;

/// A connected server: the client (which owns the child process) plus the
/// tool list discovered at handshake time.
struct McpInstance {
    client: McpClient,
    tools: Vec<ToolDefinition>,
}

/// Owns every MCP server instance for one agent session.
///
/// Explicit lifecycle: servers are started from configuration descriptors,
/// live in a name-keyed registry, and are torn down by
/// [`shutdown`](McpManager::shutdown) when the session ends. Start order
/// is preserved — it is the documented tie-break when two servers expose
/// the same tool name (first-registered wins).
#[derive(Default)]
pub struct McpManager {
    servers: HashMap<String, McpInstance>,
    order: Vec<String>,
}

impl McpManager {
    /// Create an empty manager.
    #[must_use]
    pub fn new() -> Self {
        Self {
            servers: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Start one server from its descriptor.
    ///
    /// No-op when the descriptor is disabled or a server with this name is
    /// already running. The child inherits the host environment with the
    /// descriptor's variables overriding it; its stderr passes through to
    /// the host's diagnostic stream.
    ///
    /// # Errors
    ///
    /// Spawn, handshake, and discovery failures abort only this server's
    /// setup; the failed server is absent from the routing table.
    pub async fn start_server(&mut self, config: &McpServerConfig) -> Result<(), McpError> {
        if !config.enabled {
            tracing::debug!(server = %config.name, "server disabled, not starting");
            return Ok(());
        }
        if self.servers.contains_key(&config.name) {
            tracing::debug!(server = %config.name, "server already running");
            return Ok(());
        }

        let mut command = tokio::process::Command::new(&config.command);
        command.args(&config.args);
        if let Some(cwd) = &config.cwd {
            command.current_dir(cwd);
        }
        command.envs(&config.env);

        tracing::info!(server = %config.name, command = %config.command, "starting MCP server");
        let client = McpClient::connect_stdio(command).await?;
        let tools = match client.discover_tools().await {
            Ok(tools) => tools,
            Err(e) => {
                // Discovery failed after a successful connect: tear the
                // half-open client down before reporting.
                if let Err(close_err) = client.close().await {
                    tracing::warn!(server = %config.name, error = %close_err, "close after failed discovery");
                }
                return Err(e);
            }
        };

        tracing::info!(
            server = %config.name,
            tools = tools.len(),
            "MCP server connected"
        );
        self.order.push(config.name.clone());
        self.servers.insert(config.name.clone(), McpInstance { client, tools });
        Ok(())
    }

    /// Whether a server with this name is currently connected.
    #[must_use]
    pub fn is_running(&self, name: &str) -> bool {
        self.servers.contains_key(name)
    }

    /// Connected server names with their discovered tool names, in start
    /// order. This is the ground truth for capability availability.
    #[must_use]
    pub fn connected_servers(&self) -> Vec<(String, Vec<String>)> {
        self.order
            .iter()
            .filter_map(|name| self.servers.get(name).map(|instance| (name, instance)))
            .map(|(name, instance)| {
                (
                    name.clone(),
                    instance.tools.iter().map(|t| t.name.clone()).collect(),
                )
            })
            .collect()
    }

    /// All discovered tool definitions, flattened in server start order.
    ///
    /// Name collisions across servers are not deduplicated here — the
    /// registry layer treats a collision as a configuration problem.
    #[must_use]
    pub fn tools(&self) -> Vec<ToolDefinition> {
        self.order
            .iter()
            .filter_map(|name| self.servers.get(name))
            .flat_map(|instance| instance.tools.iter().cloned())
            .collect()
    }

    /// Whether any connected server exposes this tool.
    #[must_use]
    pub fn has_tool(&self, name: &str) -> bool {
        self.servers
            .values()
            .any(|instance| instance.tools.iter().any(|t| t.name == name))
    }

    /// Call a tool on whichever connected server declares it.
    ///
    /// # Errors
    ///
    /// Returns [`McpError::UnknownTool`] when no connected server declares
    /// the name — a distinct failure, not a generic dispatch error — and
    /// [`McpError::ToolCall`] (annotated with the tool name and elapsed
    /// time) when the routed call fails.
    pub async fn call_tool(
        &self,
        name: &str,
        arguments: serde_json::Value,
    ) -> Result<String, McpError> {
        let lists = self
            .order
            .iter()
            .filter_map(|server| self.servers.get_key_value(server))
            .map(|(server, instance)| (server.as_str(), &instance.tools));
        let Some(server) = route_tool(lists, name) else {
            return Err(McpError::UnknownTool(name.to_string()));
        };
        let instance = self
            .servers
            .get(server)
            .ok_or_else(|| McpError::UnknownTool(name.to_string()))?;

        let started = Instant::now();
        match instance.client.call_tool(name, arguments).await {
            Ok(text) => {
                tracing::debug!(
                    tool = name,
                    server,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "MCP tool call succeeded"
                );
                Ok(text)
            }
            Err(e) => {
                let elapsed_ms = started.elapsed().as_millis();
                tracing::warn!(tool = name, server, elapsed_ms = elapsed_ms as u64, error = %e, "MCP tool call failed");
                Err(McpError::ToolCall {
                    tool: name.to_string(),
                    elapsed_ms,
                    message: e.to_string(),
                })
            }
        }
    }

    /// Stop one server and remove it from the routing table.
    ///
    /// No-op when the name is not running.
    pub async fn stop_server(&mut self, name: &str) {
        self.order.retain(|server| server != name);
        if let Some(instance) = self.servers.remove(name) {
            tracing::info!(server = name, "stopping MCP server");
            if let Err(e) = instance.client.close().await {
                tracing::warn!(server = name, error = %e, "error while stopping MCP server");
            }
        }
    }

    /// Stop every server, best-effort. One failure never aborts stopping
    /// the rest, and calling this twice is harmless — the routing table is
    /// empty afterwards either way.
    pub async fn shutdown(&mut self) {
        let names: Vec<String> = self.order.drain(..).collect();
        for name in names {
            if let Some(instance) = self.servers.remove(&name) {
                if let Err(e) = instance.client.close().await {
                    tracing::warn!(server = %name, error = %e, "error during shutdown");
                }
            }
        }
        self.servers.clear();
    }
}

/// Pick the server for a tool: the first one, in start order, whose
/// discovered tool list contains the name.
fn route_tool<'a, I>(servers: I, tool: &str) -> Option<&'a str>
where
    I: Iterator<Item = (&'a str, &'a Vec<ToolDefinition>)>,
{
    for (server, tools) in servers {
        if tools.iter().any(|t| t.name == tool) {
            return Some(server);
        }
    }
    None
}
