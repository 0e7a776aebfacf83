//! MCP client over a child-process stdio transport.
//!
//! One [`McpClient`] per server process: spawn and handshake via
//! [`connect_stdio`](McpClient::connect_stdio), then
//! [`discover_tools`](McpClient::discover_tools) once, then any number of
//! [`call_tool`](McpClient::call_tool) round-trips. One outstanding call
//! per invocation; the protocol is strictly request/response.

use std::borrow::Cow;

use rmcp::ServiceExt;
use rmcp::model::{CallToolRequestParams, CallToolResult, Content, RawContent};
use rmcp::service::{RoleClient, RunningService};
use rmcp::transport::child_process::TokioChildProcess;
use sidekick_types::{McpError, ToolDefinition};

/// A connected MCP client for one server process.
pub struct McpClient {
    /// The running MCP service (client role). Owns the child process.
    service: RunningService<RoleClient, ()>,
}

impl McpClient {
    /// Connect to an MCP server by spawning a child process.
    ///
    /// The command should be a `tokio::process::Command` configured with
    /// the server executable, arguments, working directory, and merged
    /// environment. The transport owns the spawned process for its
    /// lifetime; dropping or closing the client terminates it.
    ///
    /// # Errors
    ///
    /// Returns [`McpError::Spawn`] if the process cannot be spawned and
    /// [`McpError::Connection`] if the initialize handshake fails.
    pub async fn connect_stdio(command: tokio::process::Command) -> Result<Self, McpError> {
        let transport =
            TokioChildProcess::new(command).map_err(|e| McpError::Spawn(e.to_string()))?;
        let service = ()
            .serve(transport)
            .await
            .map_err(|e| McpError::Connection(e.to_string()))?;
        Ok(Self { service })
    }

    /// Discover all tools from the connected MCP server.
    ///
    /// # Errors
    ///
    /// Returns [`McpError::Protocol`] if the tool listing request fails.
    pub async fn discover_tools(&self) -> Result<Vec<ToolDefinition>, McpError> {
        let tools = self
            .service
            .list_all_tools()
            .await
            .map_err(|e| McpError::Protocol(e.to_string()))?;

        Ok(tools
            .into_iter()
            .map(|tool| ToolDefinition {
                name: tool.name.to_string(),
                description: tool.description.as_deref().unwrap_or("").to_string(),
                input_schema: serde_json::to_value(&*tool.input_schema)
                    .unwrap_or_else(|_| serde_json::json!({"type": "object"})),
            })
            .collect())
    }

    /// Call a remote tool and unwrap the response to plain text.
    ///
    /// Text-typed content items are concatenated; a response with no text
    /// content falls back to the JSON-stringified raw result.
    ///
    /// # Errors
    ///
    /// Returns [`McpError::Protocol`] when the transport call fails or the
    /// server marks the result as an error.
    pub async fn call_tool(
        &self,
        name: &str,
        arguments: serde_json::Value,
    ) -> Result<String, McpError> {
        let params = CallToolRequestParams {
            meta: None,
            name: Cow::Owned(name.to_string()),
            arguments: arguments.as_object().cloned(),
            task: None,
        };

        let result: CallToolResult = self
            .service
            .peer()
            .call_tool(params)
            .await
            .map_err(|e| McpError::Protocol(e.to_string()))?;

        if result.is_error == Some(true) {
            return Err(McpError::Protocol(extract_text(&result.content)));
        }

        let text = extract_text(&result.content);
        if text.is_empty() {
            Ok(serde_json::to_string(&result).unwrap_or_else(|_| "{}".to_string()))
        } else {
            Ok(text)
        }
    }

    /// Shut down the connection, terminating the child process.
    ///
    /// # Errors
    ///
    /// Returns [`McpError::Connection`] if the shutdown fails.
    pub async fn close(self) -> Result<(), McpError> {
        self.service
            .cancel()
            .await
            .map_err(|e| McpError::Connection(e.to_string()))?;
        Ok(())
    }
}

/// Concatenate text-typed MCP content blocks.
fn extract_text(content: &[Content]) -> String {
    content
        .iter()
        .filter_map(|c| match &c.raw {
            RawContent::Text(t) => Some(t.text.as_str()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_text_concatenates_text_items() {
        let content = vec![Content::text("line one"), Content::text("line two")];
        assert_eq!(extract_text(&content), "line one\nline two");
    }

    #[test]
    fn extract_text_of_empty_content_is_empty() {
        assert_eq!(extract_text(&[]), "");
    }

    /// Integration test that connects to a real MCP server.
    /// Requires an MCP server binary to be available.
    #[tokio::test]
    #[ignore]
    async fn integration_connect_and_discover() {
        let mut cmd = tokio::process::Command::new("npx");
        cmd.arg("-y").arg("@modelcontextprotocol/server-everything");
        let client = McpClient::connect_stdio(cmd).await.unwrap();
        let tools = client.discover_tools().await.unwrap();
        assert!(!tools.is_empty());
        client.close().await.unwrap();
    }
}
