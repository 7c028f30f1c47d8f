// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! LLM Provider trait and related types
//!
//! Defines the abstraction layer over streaming chat-completion backends.
//! Only the shape of the streamed output matters to the agent: text deltas,
//! tool-call fragments, a finish reason and usage totals.

use async_trait::async_trait;
use futures::Stream;
use serde::{Deserialize, Serialize};
use std::pin::Pin;

use crate::error::Result;
use crate::llm::message::Turn;

/// Stream of deltas produced by a provider
pub type DeltaStream = Pin<Box<dyn Stream<Item = Result<StreamDelta>> + Send>>;

/// Main trait for LLM providers
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Get the provider name (e.g., "openai", "mock")
    fn name(&self) -> &str;

    /// Streaming completion
    async fn complete_stream(&self, request: CompletionRequest) -> Result<DeltaStream>;
}

/// Request for completion
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// Model to use
    pub model: String,

    /// Messages in the conversation, system prompt first
    pub messages: Vec<Turn>,

    /// Maximum tokens in response
    pub max_tokens: u32,

    /// Sampling temperature
    pub temperature: f32,

    /// Tools available for the model to use
    pub tools: Vec<ToolDefinition>,
}

/// One incremental update from the model stream
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StreamDelta {
    /// Visible text to append to the response
    pub content: Option<String>,

    /// Tool-call fragments carried by this delta
    pub tool_calls: Vec<ToolCallFragment>,

    /// Why the model stopped, on the final delta
    pub finish_reason: Option<FinishReason>,

    /// Token usage totals, usually on the final delta
    pub usage: Option<Usage>,
}

impl StreamDelta {
    /// A delta carrying only text
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: Some(text.into()),
            ..Default::default()
        }
    }

    /// A delta carrying a single tool-call fragment
    pub fn fragment(fragment: ToolCallFragment) -> Self {
        Self {
            tool_calls: vec![fragment],
            ..Default::default()
        }
    }

    /// A terminal delta with a finish reason
    pub fn finish(reason: FinishReason) -> Self {
        Self {
            finish_reason: Some(reason),
            ..Default::default()
        }
    }
}

/// A piece of a tool call as delivered by the stream
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolCallFragment {
    /// Position of the call within this response
    pub index: usize,

    /// Call id, present on the first fragment only
    pub id: Option<String>,

    /// Function name, present on the first fragment only
    pub name: Option<String>,

    /// Argument text to append in arrival order
    pub arguments: String,
}

impl ToolCallFragment {
    /// First fragment of a call
    pub fn start(index: usize, id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            index,
            id: Some(id.into()),
            name: Some(name.into()),
            arguments: String::new(),
        }
    }

    /// Continuation fragment carrying argument text
    pub fn arguments(index: usize, chunk: impl Into<String>) -> Self {
        Self {
            index,
            id: None,
            name: None,
            arguments: chunk.into(),
        }
    }
}

/// Why the model stopped generating
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    /// Natural end of message
    Stop,
    /// Hit max tokens
    Length,
    /// Wants to call tools
    ToolCalls,
    /// Filtered by the provider
    ContentFilter,
}

impl FinishReason {
    /// Parse an OpenAI-style finish reason
    pub fn from_api(reason: &str) -> Self {
        match reason {
            "length" => FinishReason::Length,
            "tool_calls" | "function_call" => FinishReason::ToolCalls,
            "content_filter" => FinishReason::ContentFilter,
            _ => FinishReason::Stop,
        }
    }
}

/// Token usage statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    /// Prompt tokens
    pub prompt_tokens: u32,
    /// Completion tokens
    pub completion_tokens: u32,
    /// Total tokens
    pub total_tokens: u32,
}

/// Tool definition for the LLM
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Tool name
    pub name: String,

    /// Tool description
    pub description: String,

    /// Parameter schema (JSON Schema)
    pub parameters: ToolInputSchema,
}

impl ToolDefinition {
    /// The chat-completions wire shape:
    /// `{"type": "function", "function": {name, description, parameters}}`
    pub fn to_wire(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "function",
            "function": {
                "name": self.name,
                "description": self.description,
                "parameters": self.parameters,
            }
        })
    }
}

/// Input schema for a tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolInputSchema {
    /// Schema type (always "object")
    #[serde(rename = "type")]
    pub schema_type: String,

    /// Property definitions
    pub properties: serde_json::Value,

    /// Required properties
    #[serde(default)]
    pub required: Vec<String>,
}
