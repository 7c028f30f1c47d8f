// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Tool system for chat-relay
//!
//! Tools are the side-effecting UI actions the model can request: media,
//! maps, buttons, cards, usage tracking and traces. Each tool supplies both
//! its schema (sent to the model) and its handler, so the catalog and the
//! dispatch table are always the same set of names.
//!
//! The set of tools is closed: every name is a [`ToolName`] variant and the
//! registry is keyed by it.

pub mod args;
pub mod builtin;
pub mod definition;

pub use args::{decode, decode_as};
pub use definition::*;

use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::config::ToolsConfig;
use crate::error::{AgentError, Result};
use crate::llm::provider::ToolDefinition;
use crate::session::Session;

/// Every tool the agent knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolName {
    GenerateImage,
    SendVideo,
    SendAudio,
    SendLocation,
    SendButtons,
    SendCards,
    TrackUsage,
    SendTrace,
    TestLoadingStates,
    CompleteStreamingExample,
}

impl ToolName {
    pub const ALL: [ToolName; 10] = [
        ToolName::GenerateImage,
        ToolName::SendVideo,
        ToolName::SendAudio,
        ToolName::SendLocation,
        ToolName::SendButtons,
        ToolName::SendCards,
        ToolName::TrackUsage,
        ToolName::SendTrace,
        ToolName::TestLoadingStates,
        ToolName::CompleteStreamingExample,
    ];

    /// Wire name used by the model
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolName::GenerateImage => "generate_image",
            ToolName::SendVideo => "send_video",
            ToolName::SendAudio => "send_audio",
            ToolName::SendLocation => "send_location",
            ToolName::SendButtons => "send_buttons",
            ToolName::SendCards => "send_cards",
            ToolName::TrackUsage => "track_usage",
            ToolName::SendTrace => "send_trace",
            ToolName::TestLoadingStates => "test_loading_states",
            ToolName::CompleteStreamingExample => "complete_streaming_example",
        }
    }
}

impl FromStr for ToolName {
    type Err = AgentError;

    fn from_str(s: &str) -> Result<Self> {
        ToolName::ALL
            .into_iter()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| AgentError::UnknownTool(s.to_string()))
    }
}

impl fmt::Display for ToolName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A tool call reassembled from the model stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCall {
    /// Provider-assigned call id
    pub id: String,
    /// Function name as sent by the model
    pub name: String,
    /// Raw argument text, decoded by the handler
    pub arguments: String,
}

impl ToolCall {
    pub fn new(id: impl Into<String>, name: impl Into<String>, arguments: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments: arguments.into(),
        }
    }
}

/// Outcome of one tool call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HandlerResult {
    /// Text appended to the aggregate response (may be empty)
    pub message: String,
    /// Generated artifact, if any
    pub artifact_url: Option<String>,
}

impl HandlerResult {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            artifact_url: None,
        }
    }

    /// Attach a generated artifact
    pub fn with_artifact(mut self, url: impl Into<String>) -> Self {
        self.artifact_url = Some(url.into());
        self
    }

    /// The call's arguments could not be decoded
    pub fn invalid_arguments(tool_name: &str, detail: &str) -> Self {
        Self::new(format!(
            "\n\n❌ **Invalid Arguments:** {}: {}",
            tool_name, detail
        ))
    }

    /// The handler failed while running
    pub fn execution_error(tool_name: &str, cause: &str) -> Self {
        Self::new(format!(
            "\n\n❌ **Function Execution Error:** Error executing function {}: {}",
            tool_name, cause
        ))
    }

    /// No handler is registered under this name
    pub fn unknown_function(tool_name: &str) -> Self {
        Self::new(format!(
            "\n\n❌ **Function Error:** Unknown function: {}",
            tool_name
        ))
    }
}

/// Trait for implementing tools
#[async_trait]
pub trait Tool: Send + Sync {
    /// The tool's name
    fn name(&self) -> ToolName;

    /// Get the tool definition for the LLM
    fn definition(&self) -> ToolDefinition;

    /// Run the tool; errors are converted by [`Tool::handle`]
    async fn execute(&self, call: &ToolCall, session: &dyn Session) -> Result<HandlerResult>;

    /// Run the tool and turn any failure into a result message
    async fn handle(&self, call: &ToolCall, session: &dyn Session) -> HandlerResult {
        match self.execute(call, session).await {
            Ok(result) => result,
            Err(AgentError::MalformedArguments(detail)) => {
                tracing::warn!(tool = %call.name, call_id = %call.id, %detail, "malformed tool arguments");
                HandlerResult::invalid_arguments(&call.name, &detail)
            }
            Err(e) => {
                tracing::error!(tool = %call.name, call_id = %call.id, error = %e, "tool execution failed");
                HandlerResult::execution_error(&call.name, &e.to_string())
            }
        }
    }
}

/// Registry of available tools, in registration order
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
    by_name: HashMap<ToolName, usize>,
}

impl ToolRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            tools: Vec::new(),
            by_name: HashMap::new(),
        }
    }

    /// Create a registry with all built-in tools
    pub fn with_builtins(config: &ToolsConfig) -> Self {
        let generator = Arc::new(builtin::PlaceholderImageGenerator::new(
            config.placeholder_image_url.clone(),
            config.simulated_latency(),
        ));
        Self::with_image_generator(config, generator)
    }

    /// Create a registry with all built-in tools and a custom image generator
    pub fn with_image_generator(
        config: &ToolsConfig,
        generator: Arc<dyn builtin::ImageGenerator>,
    ) -> Self {
        let timing = builtin::Timing::from_config(config);
        let mut registry = Self::new();

        registry.register(Arc::new(builtin::GenerateImageTool::new(
            Arc::clone(&generator),
            timing,
        )));
        registry.register(Arc::new(builtin::SendVideoTool::new(timing)));
        registry.register(Arc::new(builtin::SendAudioTool::new(timing)));
        registry.register(Arc::new(builtin::SendLocationTool));
        registry.register(Arc::new(builtin::SendButtonsTool));
        registry.register(Arc::new(builtin::SendCardsTool));
        registry.register(Arc::new(builtin::TrackUsageTool));
        registry.register(Arc::new(builtin::SendTraceTool));

        // Demo tools
        registry.register(Arc::new(builtin::TestLoadingStatesTool::new(timing)));
        registry.register(Arc::new(builtin::CompleteStreamingExampleTool::new(
            generator, timing,
        )));

        registry
    }

    /// Register a tool, replacing any tool with the same name in place
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        let name = tool.name();
        match self.by_name.get(&name) {
            Some(&slot) => self.tools[slot] = tool,
            None => {
                self.by_name.insert(name, self.tools.len());
                self.tools.push(tool);
            }
        }
    }

    /// Get a tool by its wire name
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        let name = ToolName::from_str(name).ok()?;
        self.by_name.get(&name).map(|&slot| &self.tools[slot])
    }

    /// Get all tool definitions
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.iter().map(|t| t.definition()).collect()
    }

    /// The catalog in chat-completions wire form
    pub fn wire_definitions(&self) -> Vec<serde_json::Value> {
        self.tools.iter().map(|t| t.definition().to_wire()).collect()
    }

    /// List all tool names
    pub fn names(&self) -> Vec<&'static str> {
        self.tools.iter().map(|t| t.name().as_str()).collect()
    }

    /// Get the number of registered tools
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::with_builtins(&ToolsConfig::default())
    }
}
