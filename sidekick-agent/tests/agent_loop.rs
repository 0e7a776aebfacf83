//! Integration tests for the turn orchestrator.

use std::fs;
use std::future::Future;
use std::sync::Mutex;

use chrono::Utc;
use sidekick_agent::{Agent, AgentConfig};
use sidekick_types::{
    CompletionRequest, CompletionResponse, ContentBlock, Message, Provider, ProviderError, Role,
    StopReason, TokenUsage,
};

/// A provider that returns pre-configured responses in sequence.
struct ScriptedProvider {
    responses: Mutex<Vec<CompletionResponse>>,
}

impl ScriptedProvider {
    fn new(responses: Vec<CompletionResponse>) -> Self {
        Self {
            responses: Mutex::new(responses),
        }
    }
}

impl Provider for ScriptedProvider {
    fn complete(
        &self,
        _request: CompletionRequest,
    ) -> impl Future<Output = Result<CompletionResponse, ProviderError>> + Send {
        let response = {
            let mut responses = self.responses.lock().expect("test lock poisoned");
            assert!(!responses.is_empty(), "ScriptedProvider: no more responses configured");
            responses.remove(0)
        };
        async move { Ok(response) }
    }
}

fn text_response(text: &str) -> CompletionResponse {
    CompletionResponse {
        id: "msg_test".into(),
        model: "mock".into(),
        message: Message {
            role: Role::Assistant,
            content: vec![ContentBlock::Text(text.into())],
            timestamp: Utc::now(),
        },
        usage: TokenUsage {
            input_tokens: 10,
            output_tokens: 5,
        },
        stop_reason: StopReason::EndTurn,
    }
}

fn tool_use_response(name: &str, input: serde_json::Value) -> CompletionResponse {
    CompletionResponse {
        id: "msg_tool".into(),
        model: "mock".into(),
        message: Message {
            role: Role::Assistant,
            content: vec![ContentBlock::ToolUse {
                id: "call_1".into(),
                name: name.into(),
                input,
            }],
            timestamp: Utc::now(),
        },
        usage: TokenUsage {
            input_tokens: 10,
            output_tokens: 5,
        },
        stop_reason: StopReason::ToolUse,
    }
}

fn base_config() -> AgentConfig {
    AgentConfig {
        anthropic_api_key: "test-key".into(),
        ..AgentConfig::default()
    }
}

/// Find the tool-result blocks in a history message, if any.
fn tool_results(message: &Message) -> Vec<(&str, bool)> {
    message
        .content
        .iter()
        .filter_map(|block| match block {
            ContentBlock::ToolResult { content, is_error, .. } => {
                let text = content
                    .iter()
                    .map(|item| {
                        let sidekick_types::ContentItem::Text(text) = item;
                        text.as_str()
                    })
                    .next()
                    .unwrap_or("");
                Some((text, *is_error))
            }
            _ => None,
        })
        .collect()
}

#[tokio::test]
async fn plain_answer_round_trip() {
    let provider = ScriptedProvider::new(vec![text_response("hello there")]);
    let mut agent = Agent::initialize(base_config(), provider).await.unwrap();

    let result = agent.chat("hi").await.unwrap();
    assert_eq!(result.response, "hello there");
    assert_eq!(result.turns, 1);
    assert!(!result.hit_iteration_limit);
    // user message + assistant answer
    assert_eq!(agent.history().len(), 2);
    agent.shutdown().await;
}

#[tokio::test]
async fn tool_call_is_dispatched_and_fed_back() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("notes.txt"), "remember the milk").unwrap();

    let provider = ScriptedProvider::new(vec![
        tool_use_response("read_file", serde_json::json!({"path": "notes.txt"})),
        text_response("done"),
    ]);
    let config = AgentConfig {
        code_repository_paths: vec![dir.path().to_path_buf()],
        ..base_config()
    };
    let mut agent = Agent::initialize(config, provider).await.unwrap();

    let result = agent.chat("what are my notes?").await.unwrap();
    assert_eq!(result.response, "done");
    assert_eq!(result.turns, 2);

    // History: user, assistant tool_use, tool result, final answer.
    assert_eq!(agent.history().len(), 4);
    let results = tool_results(&agent.history()[2]);
    assert_eq!(results.len(), 1);
    assert!(results[0].0.contains("remember the milk"));
    assert!(!results[0].1);
    agent.shutdown().await;
}

#[tokio::test]
async fn sandbox_violation_becomes_error_payload_not_crash() {
    let dir = tempfile::tempdir().unwrap();

    let provider = ScriptedProvider::new(vec![
        tool_use_response("read_file", serde_json::json!({"path": "/etc/passwd"})),
        text_response("understood"),
    ]);
    let config = AgentConfig {
        code_repository_paths: vec![dir.path().to_path_buf()],
        ..base_config()
    };
    let mut agent = Agent::initialize(config, provider).await.unwrap();

    let result = agent.chat("read /etc/passwd").await.unwrap();
    assert_eq!(result.response, "understood");

    let results = tool_results(&agent.history()[2]);
    assert!(results[0].1, "expected an error tool result");
    assert!(results[0].0.contains("/etc/passwd"));
    agent.shutdown().await;
}

#[tokio::test]
async fn unroutable_tool_name_is_reported_to_the_oracle() {
    let provider = ScriptedProvider::new(vec![
        tool_use_response("jira_search", serde_json::json!({"jql": "x"})),
        text_response("sorry, no jira here"),
    ]);
    let mut agent = Agent::initialize(base_config(), provider).await.unwrap();

    let result = agent.chat("find my tickets").await.unwrap();
    assert_eq!(result.response, "sorry, no jira here");

    let results = tool_results(&agent.history()[2]);
    assert!(results[0].1);
    assert!(results[0].0.contains("Unknown tool 'jira_search'"));
    agent.shutdown().await;
}

#[tokio::test]
async fn iteration_bound_terminates_gracefully() {
    let provider = ScriptedProvider::new(vec![
        tool_use_response("bogus", serde_json::json!({})),
        tool_use_response("bogus", serde_json::json!({})),
        tool_use_response("bogus", serde_json::json!({})),
    ]);
    let config = AgentConfig {
        max_iterations: 2,
        ..base_config()
    };
    let mut agent = Agent::initialize(config, provider).await.unwrap();

    let result = agent.chat("loop forever").await.unwrap();
    assert!(result.hit_iteration_limit);
    assert_eq!(result.turns, 2);
    assert!(result.response.contains("2 tool iterations"));
    // The partial-progress note is in history as the final assistant turn.
    assert!(matches!(agent.history().last().unwrap().role, Role::Assistant));
    agent.shutdown().await;
}

#[tokio::test]
async fn history_window_evicts_oldest_first() {
    let provider = ScriptedProvider::new(vec![
        text_response("one"),
        text_response("two"),
        text_response("three"),
    ]);
    let config = AgentConfig {
        max_history_messages: 3,
        ..base_config()
    };
    let mut agent = Agent::initialize(config, provider).await.unwrap();

    agent.chat("first").await.unwrap();
    agent.chat("second").await.unwrap();
    agent.chat("third").await.unwrap();

    // Never more than the cap plus the in-flight assistant reply.
    assert!(agent.history().len() <= 4);
    // The oldest user message is gone.
    let texts: Vec<String> = agent.history().iter().map(Message::text).collect();
    assert!(!texts.contains(&"first".to_string()));
    agent.shutdown().await;
}

#[tokio::test]
async fn capability_honesty_enabled_but_unconnected_jira_is_omitted() {
    let config = AgentConfig {
        atlassian_enabled: true,
        jira_url: "https://jira.example.com".into(),
        jira_username: "dev".into(),
        jira_api_token: "token".into(),
        confluence_url: "https://wiki.example.com".into(),
        confluence_username: "dev".into(),
        confluence_api_token: "token".into(),
        // The bridge binary does not exist, so the server never connects.
        atlassian_mcp_command: "/nonexistent/sidekick-atlassian-mcp".into(),
        ..base_config()
    };
    let provider = ScriptedProvider::new(vec![]);
    let agent = Agent::initialize(config, provider).await.unwrap();

    assert!(agent.capabilities().atlassian, "capability was requested");
    let prompt = agent.system_prompt();
    assert!(!prompt.contains("Jira"), "prompt must not claim an unconnected capability");
    assert!(prompt.contains("No tools are currently configured"));
}

#[tokio::test]
async fn filesystem_capability_appears_with_discovered_tool_names() {
    let dir = tempfile::tempdir().unwrap();
    let config = AgentConfig {
        code_repository_paths: vec![dir.path().to_path_buf()],
        ..base_config()
    };
    let provider = ScriptedProvider::new(vec![]);
    let agent = Agent::initialize(config, provider).await.unwrap();

    let prompt = agent.system_prompt();
    assert!(prompt.contains("Code Repository Access"));
    assert!(prompt.contains("read_file"));
    assert!(prompt.contains("project_overview"));

    let names: Vec<String> = agent
        .tool_definitions()
        .into_iter()
        .map(|d| d.name)
        .collect();
    assert!(names.contains(&"search_files".to_string()));
    assert!(names.contains(&"find_relevant_files".to_string()));
}
