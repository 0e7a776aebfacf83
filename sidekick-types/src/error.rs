//! Error types for all sidekick crates.

use std::time::Duration;

/// Errors from LLM provider operations.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    // Retryable errors
    /// Network-level error (connection reset, DNS failure, etc.).
    #[error("network error: {0}")]
    Network(#[source] Box<dyn std::error::Error + Send + Sync>),
    /// Rate limited by the provider.
    #[error("rate limited, retry after {retry_after:?}")]
    RateLimit {
        /// Suggested retry delay, if provided by the API.
        retry_after: Option<Duration>,
    },
    /// Request timed out.
    #[error("timeout after {0:?}")]
    Timeout(Duration),
    /// Provider service is temporarily unavailable.
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),

    // Terminal errors
    /// Authentication/authorization failure.
    #[error("authentication failed: {0}")]
    Authentication(String),
    /// Malformed or invalid request.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    /// Requested model does not exist.
    #[error("model not found: {0}")]
    ModelNotFound(String),

    /// Any other provider error.
    #[error(transparent)]
    Other(Box<dyn std::error::Error + Send + Sync>),
}

impl ProviderError {
    /// Whether this error is likely transient and the request can be retried.
    ///
    /// The core itself never retries; this is advisory for callers.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Network(_) | Self::RateLimit { .. } | Self::Timeout(_) | Self::ServiceUnavailable(_)
        )
    }
}

/// Errors from tool operations.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    /// Tool not found in the registry.
    #[error("tool not found: {0}")]
    NotFound(String),
    /// Two tool sources registered the same name. First registrant wins;
    /// the collision is surfaced to the initializer, never silently resolved.
    #[error("duplicate tool name: {0}")]
    DuplicateName(String),
    /// Invalid input for the tool.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// The requested path is outside every allowed root directory.
    #[error("access denied: {0} is outside the allowed directories")]
    AccessDenied(String),
    /// Tool execution failed.
    #[error("execution failed: {0}")]
    ExecutionFailed(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Errors from MCP client and process-manager operations.
#[derive(Debug, thiserror::Error)]
pub enum McpError {
    /// Child process could not be spawned.
    #[error("spawn failed: {0}")]
    Spawn(String),
    /// Failed to connect or complete the initialize handshake.
    #[error("connection failed: {0}")]
    Connection(String),
    /// A protocol-level request (tool discovery) failed.
    #[error("protocol error: {0}")]
    Protocol(String),
    /// A routed tool call failed, annotated for observability.
    #[error("tool call '{tool}' failed after {elapsed_ms}ms: {message}")]
    ToolCall {
        /// The tool that was being called.
        tool: String,
        /// Elapsed wall-clock time until the failure.
        elapsed_ms: u128,
        /// Underlying error message.
        message: String,
    },
    /// No connected server exposes a tool with this name.
    #[error("unknown tool: {0}")]
    UnknownTool(String),
}

/// Errors from configuration loading and validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A required setting is absent.
    #[error("missing required setting: {0}")]
    Missing(String),
    /// A setting is present but unusable.
    #[error("invalid setting {field}: {reason}")]
    Invalid {
        /// The offending configuration field.
        field: String,
        /// Why it was rejected.
        reason: String,
    },
    /// The configured model provider is not supported.
    #[error("unsupported model provider: {0}")]
    UnknownProvider(String),
}

/// Errors from the top-level chat operation.
///
/// Tool failures never appear here — they are converted into error tool
/// results the model can reason about. Only oracle failures and fatal
/// configuration problems propagate to the caller.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    /// The LLM oracle call failed.
    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),
    /// The agent could not be constructed from its configuration.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}
