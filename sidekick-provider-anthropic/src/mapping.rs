//! Request/response mapping between sidekick types and the Anthropic
//! Messages API format.
//!
//! Reference: <https://docs.anthropic.com/en/api/messages>

use chrono::Utc;
use sidekick_types::{
    CompletionRequest, CompletionResponse, ContentBlock, ContentItem, Message, ProviderError,
    Role, StopReason, TokenUsage, ToolDefinition,
};

/// Max tokens applied when the request does not specify one.
const DEFAULT_MAX_TOKENS: usize = 4096;

// ─── Request mapping ─────────────────────────────────────────────────────────

/// Convert a [`CompletionRequest`] into the Messages API JSON body.
#[must_use]
pub fn to_api_request(req: &CompletionRequest, default_model: &str) -> serde_json::Value {
    let model = if req.model.is_empty() {
        default_model.to_string()
    } else {
        req.model.clone()
    };

    let mut body = serde_json::json!({
        "model": model,
        "messages": map_messages(&req.messages),
        "max_tokens": req.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
    });

    if let Some(system) = &req.system {
        body["system"] = serde_json::Value::String(system.clone());
    }
    if let Some(temperature) = req.temperature {
        body["temperature"] = serde_json::Value::from(temperature);
    }
    if !req.tools.is_empty() {
        body["tools"] =
            serde_json::Value::Array(req.tools.iter().map(map_tool_definition).collect());
    }

    body
}

/// Map messages to the API array. System messages go in the top-level
/// `system` field, never inline — they are filtered out here.
fn map_messages(messages: &[Message]) -> serde_json::Value {
    let array: Vec<serde_json::Value> = messages
        .iter()
        .filter(|msg| msg.role != Role::System)
        .map(|msg| {
            let role = match msg.role {
                Role::User => "user",
                Role::Assistant => "assistant",
                Role::System => unreachable!("filtered above"),
            };
            serde_json::json!({
                "role": role,
                "content": map_content_blocks(&msg.content),
            })
        })
        .collect();
    serde_json::Value::Array(array)
}

fn map_content_blocks(blocks: &[ContentBlock]) -> serde_json::Value {
    serde_json::Value::Array(blocks.iter().map(map_content_block).collect())
}

fn map_content_block(block: &ContentBlock) -> serde_json::Value {
    match block {
        ContentBlock::Text(text) => serde_json::json!({
            "type": "text",
            "text": text,
        }),
        ContentBlock::ToolUse { id, name, input } => serde_json::json!({
            "type": "tool_use",
            "id": id,
            "name": name,
            "input": input,
        }),
        ContentBlock::ToolResult { tool_use_id, content, is_error } => {
            let content: Vec<serde_json::Value> = content
                .iter()
                .map(|item| match item {
                    ContentItem::Text(text) => {
                        serde_json::json!({"type": "text", "text": text})
                    }
                })
                .collect();
            serde_json::json!({
                "type": "tool_result",
                "tool_use_id": tool_use_id,
                "content": content,
                "is_error": is_error,
            })
        }
    }
}

fn map_tool_definition(tool: &ToolDefinition) -> serde_json::Value {
    serde_json::json!({
        "name": tool.name,
        "description": tool.description,
        "input_schema": tool.input_schema,
    })
}

// ─── Response mapping ────────────────────────────────────────────────────────

/// Parse a Messages API response into a [`CompletionResponse`].
///
/// # Errors
///
/// Returns [`ProviderError::InvalidRequest`] if required fields are
/// missing or malformed.
pub fn from_api_response(body: &serde_json::Value) -> Result<CompletionResponse, ProviderError> {
    let id = body["id"]
        .as_str()
        .ok_or_else(|| ProviderError::InvalidRequest("missing 'id' in response".into()))?
        .to_string();

    let model = body["model"]
        .as_str()
        .ok_or_else(|| ProviderError::InvalidRequest("missing 'model' in response".into()))?
        .to_string();

    let content = body["content"]
        .as_array()
        .ok_or_else(|| ProviderError::InvalidRequest("missing 'content' array in response".into()))?;

    let mut blocks = Vec::with_capacity(content.len());
    for block in content {
        blocks.push(parse_content_block(block)?);
    }

    let usage = TokenUsage {
        input_tokens: body["usage"]["input_tokens"].as_u64().unwrap_or(0) as usize,
        output_tokens: body["usage"]["output_tokens"].as_u64().unwrap_or(0) as usize,
    };

    let stop_reason = body["stop_reason"]
        .as_str()
        .map(parse_stop_reason)
        .unwrap_or(StopReason::EndTurn);

    Ok(CompletionResponse {
        id,
        model,
        message: Message {
            role: Role::Assistant,
            content: blocks,
            timestamp: Utc::now(),
        },
        usage,
        stop_reason,
    })
}

fn parse_content_block(block: &serde_json::Value) -> Result<ContentBlock, ProviderError> {
    let block_type = block["type"]
        .as_str()
        .ok_or_else(|| ProviderError::InvalidRequest("content block missing 'type'".into()))?;

    match block_type {
        "text" => {
            let text = block["text"]
                .as_str()
                .ok_or_else(|| ProviderError::InvalidRequest("text block missing 'text'".into()))?
                .to_string();
            Ok(ContentBlock::Text(text))
        }
        "tool_use" => {
            let id = block["id"]
                .as_str()
                .ok_or_else(|| ProviderError::InvalidRequest("tool_use block missing 'id'".into()))?
                .to_string();
            let name = block["name"]
                .as_str()
                .ok_or_else(|| {
                    ProviderError::InvalidRequest("tool_use block missing 'name'".into())
                })?
                .to_string();
            Ok(ContentBlock::ToolUse {
                id,
                name,
                input: block["input"].clone(),
            })
        }
        other => Err(ProviderError::InvalidRequest(format!(
            "unknown content block type: {other}"
        ))),
    }
}

fn parse_stop_reason(reason: &str) -> StopReason {
    match reason {
        "tool_use" => StopReason::ToolUse,
        "max_tokens" => StopReason::MaxTokens,
        "stop_sequence" => StopReason::StopSequence,
        _ => StopReason::EndTurn,
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_body_carries_system_tools_and_messages() {
        let request = CompletionRequest {
            model: String::new(),
            messages: vec![Message::user("hello")],
            system: Some("you are helpful".into()),
            tools: vec![ToolDefinition {
                name: "read_file".into(),
                description: "Reads".into(),
                input_schema: serde_json::json!({"type": "object"}),
            }],
            max_tokens: None,
            temperature: Some(0.2),
        };

        let body = to_api_request(&request, "claude-sonnet-4-20250514");
        assert_eq!(body["model"], "claude-sonnet-4-20250514");
        assert_eq!(body["system"], "you are helpful");
        assert_eq!(body["max_tokens"], 4096);
        assert_eq!(body["tools"][0]["name"], "read_file");
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["messages"][0]["content"][0]["text"], "hello");
    }

    #[test]
    fn explicit_model_wins_over_default() {
        let request = CompletionRequest {
            model: "claude-opus-4-1".into(),
            ..CompletionRequest::default()
        };
        let body = to_api_request(&request, "default-model");
        assert_eq!(body["model"], "claude-opus-4-1");
    }

    #[test]
    fn system_messages_never_appear_inline() {
        let mut system = Message::user("policy");
        system.role = Role::System;
        let request = CompletionRequest {
            messages: vec![system, Message::user("hi")],
            ..CompletionRequest::default()
        };
        let body = to_api_request(&request, "m");
        assert_eq!(body["messages"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn tool_result_blocks_round_trip_to_api_shape() {
        let block = ContentBlock::ToolResult {
            tool_use_id: "call_1".into(),
            content: vec![ContentItem::Text("output".into())],
            is_error: false,
        };
        let json = map_content_block(&block);
        assert_eq!(json["type"], "tool_result");
        assert_eq!(json["tool_use_id"], "call_1");
        assert_eq!(json["content"][0]["text"], "output");
    }

    #[test]
    fn response_with_tool_use_parses() {
        let body = serde_json::json!({
            "id": "msg_1",
            "model": "claude-sonnet-4-20250514",
            "content": [
                {"type": "text", "text": "let me check"},
                {"type": "tool_use", "id": "call_1", "name": "jira_search", "input": {"jql": "x"}}
            ],
            "stop_reason": "tool_use",
            "usage": {"input_tokens": 12, "output_tokens": 34}
        });

        let response = from_api_response(&body).unwrap();
        assert_eq!(response.stop_reason, StopReason::ToolUse);
        assert_eq!(response.usage.input_tokens, 12);
        assert_eq!(response.message.tool_calls().len(), 1);
        assert_eq!(response.message.text(), "let me check");
    }

    #[test]
    fn response_missing_id_is_invalid() {
        let body = serde_json::json!({"model": "m", "content": []});
        assert!(matches!(
            from_api_response(&body),
            Err(ProviderError::InvalidRequest(_))
        ));
    }
}
