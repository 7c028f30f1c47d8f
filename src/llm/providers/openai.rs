// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! OpenAI-compatible chat-completions provider
//!
//! Streams `data:` server-sent events and maps each chunk to a
//! [`StreamDelta`]. Works with any endpoint speaking the OpenAI wire format.

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::{AgentError, ApiError, Result};
use crate::llm::message::Turn;
use crate::llm::provider::{
    CompletionRequest, DeltaStream, FinishReason, LlmProvider, StreamDelta, ToolCallFragment,
    Usage,
};

/// Provider for OpenAI-compatible chat-completion endpoints
pub struct OpenAiProvider {
    client: Client,
    api_key: String,
    base_url: String,
}

impl OpenAiProvider {
    /// Create a provider against a chat-completions endpoint
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: base_url.into(),
        }
    }

    /// Endpoint this provider posts to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn convert_messages(messages: &[Turn]) -> Vec<OpenAiMessage> {
        messages
            .iter()
            .map(|m| OpenAiMessage {
                role: m.role.as_str().to_string(),
                content: m.content.clone(),
            })
            .collect()
    }

    /// Build the request body
    fn build_request(request: &CompletionRequest) -> OpenAiRequest {
        let has_tools = !request.tools.is_empty();

        OpenAiRequest {
            model: request.model.clone(),
            messages: Self::convert_messages(&request.messages),
            max_tokens: Some(request.max_tokens),
            temperature: Some(request.temperature),
            tools: has_tools.then(|| request.tools.iter().map(|t| t.to_wire()).collect()),
            // The model always picks its own tools.
            tool_choice: has_tools.then_some("auto"),
            stream: true,
            stream_options: Some(OpenAiStreamOptions {
                include_usage: true,
            }),
        }
    }

    /// Parse an error response
    fn parse_error(status: u16, body: &str) -> AgentError {
        if let Ok(error_response) = serde_json::from_str::<OpenAiError>(body) {
            let message = error_response.error.message;
            let code = error_response.error.code.as_deref().unwrap_or("");

            match code {
                "invalid_api_key" | "authentication_error" => {
                    AgentError::Api(ApiError::AuthenticationFailed)
                }
                "rate_limit_exceeded" => AgentError::Api(ApiError::RateLimited(60)),
                "model_not_found" => AgentError::Api(ApiError::ModelNotFound(message)),
                _ => AgentError::Api(ApiError::ServerError { status, message }),
            }
        } else if status == 401 {
            AgentError::Api(ApiError::AuthenticationFailed)
        } else {
            AgentError::Api(ApiError::ServerError {
                status,
                message: body.to_string(),
            })
        }
    }
}

/// Parse one SSE line into a delta.
///
/// Returns `None` for blank lines, comments, `[DONE]` and anything that is
/// not a `data:` payload. A `data:` payload that is not a chunk is an
/// [`ApiError::InvalidResponse`].
pub fn parse_sse_line(line: &str) -> Option<Result<StreamDelta>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with(':') {
        return None;
    }

    let data = line.strip_prefix("data:")?.trim_start();
    if data == "[DONE]" {
        return None;
    }

    if let Ok(err) = serde_json::from_str::<OpenAiError>(data) {
        return Some(Err(AgentError::Api(ApiError::StreamError(
            err.error.message,
        ))));
    }

    let chunk = match serde_json::from_str::<OpenAiStreamChunk>(data) {
        Ok(chunk) => chunk,
        Err(e) => {
            tracing::warn!(error = %e, "unparseable stream chunk");
            return Some(Err(AgentError::Api(ApiError::InvalidResponse(format!(
                "unparseable stream chunk: {}",
                e
            )))));
        }
    };

    let mut delta = StreamDelta {
        usage: chunk.usage.map(|u| Usage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u
                .total_tokens
                .unwrap_or(u.prompt_tokens.saturating_add(u.completion_tokens)),
        }),
        ..Default::default()
    };

    if let Some(choice) = chunk.choices.into_iter().next() {
        delta.content = choice.delta.content.filter(|t| !t.is_empty());
        delta.finish_reason = choice.finish_reason.as_deref().map(FinishReason::from_api);
        delta.tool_calls = choice
            .delta
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(|tc| {
                let (name, arguments) = match tc.function {
                    Some(f) => (f.name, f.arguments.unwrap_or_default()),
                    None => (None, String::new()),
                };
                ToolCallFragment {
                    index: tc.index.unwrap_or(0),
                    id: tc.id,
                    name,
                    arguments,
                }
            })
            .collect();
    }

    Some(Ok(delta))
}

/// Parse every complete line in `buffer`, leaving any partial line behind
fn drain_lines(buffer: &mut Vec<u8>) -> Vec<Result<StreamDelta>> {
    let mut deltas = Vec::new();
    while let Some(line_end) = buffer.iter().position(|b| *b == b'\n') {
        let line: Vec<u8> = buffer.drain(..=line_end).collect();
        if let Some(delta) = parse_sse_line(&String::from_utf8_lossy(&line)) {
            deltas.push(delta);
        }
    }
    deltas
}

/// Parse whatever is left once the byte stream has ended
fn flush_tail(buffer: &mut Vec<u8>) -> Vec<Result<StreamDelta>> {
    let mut deltas = drain_lines(buffer);
    if !buffer.is_empty() {
        let tail = std::mem::take(buffer);
        deltas.extend(parse_sse_line(&String::from_utf8_lossy(&tail)));
    }
    deltas
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    async fn complete_stream(&self, request: CompletionRequest) -> Result<DeltaStream> {
        let body = Self::build_request(&request);

        let response = self
            .client
            .post(&self.base_url)
            .header("Authorization", format!("Bearer {}", &self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Self::parse_error(status, &body));
        }

        // Bytes are buffered until a full line is available so multi-byte
        // characters split across network chunks survive. The trailing `None`
        // flushes a last line sent without a newline.
        let event_stream = response
            .bytes_stream()
            .map(|result| {
                Some(result.map_err(|e| AgentError::Api(ApiError::StreamError(e.to_string()))))
            })
            .chain(futures::stream::once(futures::future::ready(None)))
            .scan(Vec::<u8>::new(), |buffer, item| {
                let deltas = match item {
                    Some(Ok(bytes)) => {
                        buffer.extend_from_slice(&bytes);
                        drain_lines(buffer)
                    }
                    Some(Err(e)) => vec![Err(e)],
                    None => flush_tail(buffer),
                };
                futures::future::ready(Some(deltas))
            })
            .flat_map(futures::stream::iter);

        Ok(Box::pin(event_stream))
    }
}

// OpenAI API types

#[derive(Debug, Serialize)]
struct OpenAiRequest {
    model: String,
    messages: Vec<OpenAiMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<serde_json::Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<&'static str>,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    stream_options: Option<OpenAiStreamOptions>,
}

#[derive(Debug, Serialize)]
struct OpenAiStreamOptions {
    include_usage: bool,
}

#[derive(Debug, Serialize)]
struct OpenAiMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct OpenAiError {
    error: OpenAiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct OpenAiErrorDetail {
    message: String,
    code: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: Option<u32>,
}

// Streaming types
#[derive(Debug, Deserialize)]
struct OpenAiStreamChunk {
    #[serde(default)]
    choices: Vec<OpenAiStreamChoice>,
    usage: Option<OpenAiUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAiStreamChoice {
    delta: OpenAiStreamDelta,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiStreamDelta {
    content: Option<String>,
    tool_calls: Option<Vec<OpenAiStreamToolCall>>,
}

#[derive(Debug, Deserialize)]
struct OpenAiStreamToolCall {
    index: Option<usize>,
    id: Option<String>,
    function: Option<OpenAiStreamFunction>,
}

#[derive(Debug, Deserialize)]
struct OpenAiStreamFunction {
    name: Option<String>,
    arguments: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::provider::{ToolDefinition, ToolInputSchema};

    fn request_with_tools(tools: Vec<ToolDefinition>) -> CompletionRequest {
        CompletionRequest {
            model: "gpt-4o-mini".to_string(),
            messages: vec![Turn::system("sys"), Turn::user("hello")],
            max_tokens: 1000,
            temperature: 0.7,
            tools,
        }
    }

    fn sample_tool() -> ToolDefinition {
        ToolDefinition {
            name: "generate_image".to_string(),
            description: "Generate an image".to_string(),
            parameters: ToolInputSchema {
                schema_type: "object".to_string(),
                properties: serde_json::json!({"prompt": {"type": "string"}}),
                required: vec!["prompt".to_string()],
            },
        }
    }

    #[test]
    fn test_build_request_basic() {
        let body = OpenAiProvider::build_request(&request_with_tools(vec![]));
        let json = serde_json::to_value(&body).unwrap();

        assert_eq!(json["model"], "gpt-4o-mini");
        assert_eq!(json["stream"], true);
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "hello");
        assert!(json.get("tools").is_none());
        assert!(json.get("tool_choice").is_none());
    }

    #[test]
    fn test_build_request_with_tools() {
        let body = OpenAiProvider::build_request(&request_with_tools(vec![sample_tool()]));
        let json = serde_json::to_value(&body).unwrap();

        assert_eq!(json["tool_choice"], "auto");
        assert_eq!(json["tools"][0]["type"], "function");
        assert_eq!(json["tools"][0]["function"]["name"], "generate_image");
        assert_eq!(json["stream_options"]["include_usage"], true);
    }

    #[test]
    fn test_parse_error_authentication() {
        let body = r#"{"error": {"message": "bad key", "code": "invalid_api_key"}}"#;
        let err = OpenAiProvider::parse_error(401, body);
        assert!(matches!(
            err,
            AgentError::Api(ApiError::AuthenticationFailed)
        ));
    }

    #[test]
    fn test_parse_error_unstructured_body() {
        let err = OpenAiProvider::parse_error(502, "bad gateway");
        assert!(err.to_string().contains("502"));
        assert!(err.to_string().contains("bad gateway"));
    }

    #[test]
    fn test_parse_sse_line_text() {
        let line = r#"data: {"choices":[{"delta":{"content":"Hel"},"finish_reason":null}]}"#;
        let delta = parse_sse_line(line).unwrap().unwrap();
        assert_eq!(delta.content.as_deref(), Some("Hel"));
        assert!(delta.tool_calls.is_empty());
        assert!(delta.finish_reason.is_none());
    }

    #[test]
    fn test_parse_sse_line_tool_call_fragment() {
        let line = r#"data: {"choices":[{"delta":{"tool_calls":[{"index":1,"id":"call_9","type":"function","function":{"name":"send_trace","arguments":""}}]}}]}"#;
        let delta = parse_sse_line(line).unwrap().unwrap();
        assert_eq!(delta.tool_calls.len(), 1);
        let fragment = &delta.tool_calls[0];
        assert_eq!(fragment.index, 1);
        assert_eq!(fragment.id.as_deref(), Some("call_9"));
        assert_eq!(fragment.name.as_deref(), Some("send_trace"));
        assert_eq!(fragment.arguments, "");

        let line = r#"data: {"choices":[{"delta":{"tool_calls":[{"index":1,"function":{"arguments":"{\"content\":"}}]}}]}"#;
        let delta = parse_sse_line(line).unwrap().unwrap();
        assert_eq!(delta.tool_calls[0].arguments, "{\"content\":");
        assert!(delta.tool_calls[0].name.is_none());
    }

    #[test]
    fn test_parse_sse_line_usage_only_chunk() {
        let line = r#"data: {"choices":[],"usage":{"prompt_tokens":12,"completion_tokens":5,"total_tokens":17}}"#;
        let delta = parse_sse_line(line).unwrap().unwrap();
        assert_eq!(
            delta.usage,
            Some(Usage {
                prompt_tokens: 12,
                completion_tokens: 5,
                total_tokens: 17
            })
        );
    }

    #[test]
    fn test_parse_sse_line_finish_reason() {
        let line = r#"data: {"choices":[{"delta":{},"finish_reason":"tool_calls"}]}"#;
        let delta = parse_sse_line(line).unwrap().unwrap();
        assert_eq!(delta.finish_reason, Some(FinishReason::ToolCalls));
    }

    #[test]
    fn test_parse_sse_line_ignored_lines() {
        assert!(parse_sse_line("").is_none());
        assert!(parse_sse_line(": keep-alive").is_none());
        assert!(parse_sse_line("data: [DONE]").is_none());
        assert!(parse_sse_line("event: message").is_none());
    }

    #[test]
    fn test_parse_sse_line_unparseable_chunk() {
        let err = parse_sse_line("data: {not json").unwrap().unwrap_err();
        assert!(matches!(err, AgentError::Api(ApiError::InvalidResponse(_))));
        assert!(err.is_upstream());
    }

    #[test]
    fn test_usage_total_saturates() {
        let line = format!(
            r#"data: {{"choices":[],"usage":{{"prompt_tokens":{},"completion_tokens":10}}}}"#,
            u32::MAX
        );
        let delta = parse_sse_line(&line).unwrap().unwrap();
        assert_eq!(delta.usage.map(|u| u.total_tokens), Some(u32::MAX));
    }

    #[test]
    fn test_drain_lines_keeps_partial_line() {
        let mut buffer = b"data: {\"choices\":[{\"delta\":{\"content\":\"Hi\"}}]}\ndata: {\"cho".to_vec();
        let deltas = drain_lines(&mut buffer);

        assert_eq!(deltas.len(), 1);
        assert_eq!(buffer, b"data: {\"cho".to_vec());
    }

    #[test]
    fn test_flush_tail_parses_unterminated_line() {
        let mut buffer = b"data: {\"choices\":[{\"delta\":{\"content\":\"end\"}}]}".to_vec();
        assert!(drain_lines(&mut buffer).is_empty());

        let deltas = flush_tail(&mut buffer);
        assert_eq!(deltas.len(), 1);
        let delta = deltas.into_iter().next().unwrap().unwrap();
        assert_eq!(delta.content.as_deref(), Some("end"));
        assert!(buffer.is_empty());
        assert!(flush_tail(&mut buffer).is_empty());
    }

    #[test]
    fn test_parse_sse_line_error_payload() {
        let line = r#"data: {"error":{"message":"overloaded","code":null}}"#;
        let err = parse_sse_line(line).unwrap().unwrap_err();
        assert!(err.is_upstream());
        assert!(err.to_string().contains("overloaded"));
    }
}
