//! The bounded per-message turn orchestrator.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use sidekick_explore::{ExplorationEngine, ExplorationToolset};
use sidekick_fs::{FsToolset, PathSandbox};
use sidekick_mcp::McpManager;
use sidekick_tool::ToolRegistry;
use sidekick_types::{
    AgentError, CompletionRequest, ConfigError, ContentBlock, ContentItem, McpError, Message,
    Provider, Role, StopReason, TokenUsage, ToolContext, ToolDefinition,
};

use crate::capabilities::{Capabilities, ToolAvailability, build_system_prompt};
use crate::config::AgentConfig;
use crate::skills::load_skills;

/// The outcome of one `chat` call.
#[derive(Debug)]
pub struct ChatResult {
    /// Final (or partial-progress) text for the user.
    pub response: String,
    /// Oracle round-trips consumed.
    pub turns: usize,
    /// Cumulative token usage.
    pub usage: TokenUsage,
    /// Whether the iteration bound cut the loop short.
    pub hit_iteration_limit: bool,
}

/// One agent session: the configuration snapshot, the tool dispatch
/// table, the MCP routing table, and the conversation history.
///
/// The history and routing table are mutated only here, on this single
/// logical thread of control; one user message runs to completion before
/// the next is accepted (`chat` takes `&mut self`).
pub struct Agent<P: Provider> {
    provider: P,
    config: AgentConfig,
    capabilities: Capabilities,
    registry: ToolRegistry,
    mcp: McpManager,
    history: Vec<Message>,
    skills: Option<String>,
    tool_ctx: ToolContext,
}

impl<P: Provider> Agent<P> {
    /// Build a session from a configuration snapshot.
    ///
    /// Filesystem and exploration tools register only when the allow-list
    /// is non-empty; each enabled MCP server is started, and a failure
    /// aborts only that server's setup (its capability simply stays out of
    /// subsequent prompts).
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::Config`] for fatal problems: an unusable
    /// oracle configuration or a built-in tool name collision.
    pub async fn initialize(config: AgentConfig, provider: P) -> Result<Self, AgentError> {
        config.provider_ready()?;
        let capabilities = config.capabilities();

        let mut registry = ToolRegistry::new();
        let mut cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("/"));

        if capabilities.filesystem {
            let sandbox = Arc::new(PathSandbox::new(config.code_repository_paths.clone()));
            if let Some(first_root) = sandbox.roots().first() {
                cwd = first_root.clone();
            }
            let fs_tools = FsToolset::new(Arc::clone(&sandbox));
            fs_tools.register_into(&mut registry).map_err(tool_collision)?;

            let engine = Arc::new(ExplorationEngine::new(sandbox));
            ExplorationToolset::new(engine)
                .register_into(&mut registry)
                .map_err(tool_collision)?;
        }

        let mut mcp = McpManager::new();
        for server in config.mcp_server_configs() {
            if let Err(e) = mcp.start_server(&server).await {
                tracing::warn!(
                    server = %server.name,
                    error = %e,
                    "MCP server failed to start; its tools will not be offered"
                );
            }
        }

        let skills = if config.skills_enabled {
            match &config.skills_dir {
                Some(dir) => match load_skills(dir) {
                    Ok(text) if !text.is_empty() => Some(text),
                    Ok(_) => None,
                    Err(e) => {
                        tracing::warn!(error = %e, "failed to load skills");
                        None
                    }
                },
                None => None,
            }
        } else {
            None
        };

        let tool_ctx = ToolContext {
            cwd,
            session_id: format!("session-{}", Utc::now().timestamp_millis()),
            environment: std::env::vars().collect(),
        };

        Ok(Self {
            provider,
            config,
            capabilities,
            registry,
            mcp,
            history: Vec::new(),
            skills,
            tool_ctx,
        })
    }

    /// The conversation history (append-only until the window trims it).
    #[must_use]
    pub fn history(&self) -> &[Message] {
        &self.history
    }

    /// The derived capability predicates for this session.
    #[must_use]
    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    /// Snapshot of what is actually registered and connected right now.
    #[must_use]
    pub fn availability(&self) -> ToolAvailability {
        let registered = self.registry.names();
        let fs_names: HashSet<String> = FsToolset::tool_names().into_iter().collect();
        let explore_names: HashSet<String> =
            ExplorationToolset::tool_names().into_iter().collect();
        ToolAvailability {
            filesystem_tools: registered
                .iter()
                .filter(|name| fs_names.contains(*name))
                .cloned()
                .collect(),
            exploration_tools: registered
                .iter()
                .filter(|name| explore_names.contains(*name))
                .cloned()
                .collect(),
            mcp_servers: self.mcp.connected_servers(),
        }
    }

    /// The system prompt the oracle would receive right now.
    #[must_use]
    pub fn system_prompt(&self) -> String {
        build_system_prompt(&self.capabilities, &self.availability(), self.skills.as_deref())
    }

    /// The union of tool definitions offered to the oracle, duplicates
    /// resolved first-registrant-wins with a warning (a collision is a
    /// configuration problem, not something to hide).
    #[must_use]
    pub fn tool_definitions(&self) -> Vec<ToolDefinition> {
        let mut seen = HashSet::new();
        let mut definitions = Vec::new();
        for definition in self
            .registry
            .definitions()
            .into_iter()
            .chain(self.mcp.tools())
        {
            if seen.insert(definition.name.clone()) {
                definitions.push(definition);
            } else {
                tracing::warn!(
                    tool = %definition.name,
                    "duplicate tool name across sources; keeping the first registrant"
                );
            }
        }
        definitions
    }

    /// Run one user message through the bounded
    /// prompt → oracle → tool → oracle loop.
    ///
    /// Tool failures never abort the conversation — they become error
    /// tool results the oracle can reason about. Hitting the iteration
    /// bound terminates gracefully with a partial-progress explanation.
    ///
    /// # Errors
    ///
    /// Only oracle failures propagate; retry policy belongs to the caller.
    pub async fn chat(&mut self, text: &str) -> Result<ChatResult, AgentError> {
        self.history.push(Message::user(text));
        self.trim_history();

        let mut usage = TokenUsage::default();
        let mut turns = 0;

        loop {
            if turns >= self.config.max_iterations {
                let note = format!(
                    "I stopped after {} tool iterations without reaching a final answer. \
                     Here is what I have so far; ask me to continue for more.",
                    self.config.max_iterations
                );
                self.history.push(Message::assistant(&note));
                return Ok(ChatResult {
                    response: note,
                    turns,
                    usage,
                    hit_iteration_limit: true,
                });
            }

            let request = CompletionRequest {
                model: self.config.model_name.clone().unwrap_or_default(),
                messages: self.history.clone(),
                system: Some(self.system_prompt()),
                tools: self.tool_definitions(),
                max_tokens: None,
                temperature: None,
            };

            let response = self.provider.complete(request).await?;
            usage.accumulate(&response.usage);
            turns += 1;

            let tool_calls = response.message.tool_calls();
            self.history.push(response.message.clone());

            if tool_calls.is_empty() || response.stop_reason == StopReason::EndTurn {
                return Ok(ChatResult {
                    response: response.message.text(),
                    turns,
                    usage,
                    hit_iteration_limit: false,
                });
            }

            // Dispatch in the order requested; results return in that order.
            let mut result_blocks = Vec::with_capacity(tool_calls.len());
            for (call_id, tool_name, input) in tool_calls {
                let (content, is_error) = self.dispatch_tool(&tool_name, input).await;
                result_blocks.push(ContentBlock::ToolResult {
                    tool_use_id: call_id,
                    content,
                    is_error,
                });
            }
            self.history.push(Message {
                role: Role::User,
                content: result_blocks,
                timestamp: Utc::now(),
            });
        }
    }

    /// Dispatch one tool call: built-in registry first, then the MCP
    /// routing table. Every failure becomes an error payload.
    async fn dispatch_tool(
        &self,
        name: &str,
        input: serde_json::Value,
    ) -> (Vec<ContentItem>, bool) {
        if self.registry.contains(name) {
            return match self.registry.execute(name, input, &self.tool_ctx).await {
                Ok(output) => (output.content, output.is_error),
                Err(e) => {
                    tracing::warn!(tool = name, error = %e, "built-in tool failed");
                    (
                        vec![ContentItem::Text(format!("Tool '{name}' failed: {e}"))],
                        true,
                    )
                }
            };
        }

        match self.mcp.call_tool(name, input).await {
            Ok(text) => (vec![ContentItem::Text(text)], false),
            Err(McpError::UnknownTool(_)) => (
                vec![ContentItem::Text(format!(
                    "Unknown tool '{name}'. Only the tools listed in the system prompt are \
                     available."
                ))],
                true,
            ),
            Err(e) => {
                tracing::warn!(tool = name, error = %e, "MCP tool failed");
                (
                    vec![ContentItem::Text(format!("Tool '{name}' failed: {e}"))],
                    true,
                )
            }
        }
    }

    /// Oldest-first eviction down to the configured window.
    fn trim_history(&mut self) {
        let max = self.config.max_history_messages;
        if max > 0 && self.history.len() > max {
            let excess = self.history.len() - max;
            self.history.drain(0..excess);
        }
    }

    /// Tear the session down: stop every MCP server. Idempotent.
    pub async fn shutdown(&mut self) {
        self.mcp.shutdown().await;
    }
}

/// A built-in tool name collision is a configuration error.
fn tool_collision(e: sidekick_types::ToolError) -> AgentError {
    AgentError::Config(ConfigError::Invalid {
        field: "tools".into(),
        reason: e.to_string(),
    })
}
