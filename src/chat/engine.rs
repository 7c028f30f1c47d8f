// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Chat engine
//!
//! Handles one user message end to end: provider setup, memory, the
//! streamed completion, tool dispatch and the final response.

use futures::StreamExt;
use std::collections::HashMap;
use std::sync::Arc;

use super::dispatch::Dispatcher;
use super::memory::ConversationStore;
use super::streaming::{ResponseAccumulator, StreamOutput, StreamedResponse};
use crate::config::{ConversationConfig, ProviderConfig, Settings};
use crate::error::{AgentError, Result};
use crate::llm::factory::ProviderFactory;
use crate::llm::message::Turn;
use crate::llm::provider::{CompletionRequest, LlmProvider};
use crate::session::{CompletedResponse, LoadingIndicator, LoadingKey, Session};
use crate::tools::ToolRegistry;

/// One incoming user message
#[derive(Debug, Clone, Default)]
pub struct ChatRequest {
    /// Conversation the message belongs to
    pub thread_id: String,
    /// The user's text
    pub message: String,
    /// Model override; the configured default otherwise
    pub model: Option<String>,
    /// Per-request variables, e.g. API keys
    pub variables: HashMap<String, String>,
}

impl ChatRequest {
    pub fn new(thread_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            thread_id: thread_id.into(),
            message: message.into(),
            ..Default::default()
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_variable(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.variables.insert(key.into(), value.into());
        self
    }
}

/// Processes chat messages against a provider, a store and the tool registry
pub struct ChatEngine {
    provider_config: ProviderConfig,
    conversation: ConversationConfig,
    providers: Arc<dyn ProviderFactory>,
    store: Arc<dyn ConversationStore>,
    dispatcher: Dispatcher,
}

impl ChatEngine {
    /// Engine with the built-in tools configured from `settings`
    pub fn new(
        settings: &Settings,
        providers: Arc<dyn ProviderFactory>,
        store: Arc<dyn ConversationStore>,
    ) -> Self {
        Self {
            provider_config: settings.provider.clone(),
            conversation: settings.conversation.clone(),
            providers,
            store,
            dispatcher: Dispatcher::new(Arc::new(ToolRegistry::with_builtins(&settings.tools))),
        }
    }

    /// Replace the tool registry
    pub fn with_registry(mut self, registry: ToolRegistry) -> Self {
        self.dispatcher = Dispatcher::new(Arc::new(registry));
        self
    }

    pub fn store(&self) -> &Arc<dyn ConversationStore> {
        &self.store
    }

    pub fn registry(&self) -> &ToolRegistry {
        self.dispatcher.registry()
    }

    /// Process one message, streaming everything through `session`.
    ///
    /// Errors are reported to the session before being returned. Tool
    /// failures never surface here; they become part of the response text.
    pub async fn process_message(&self, request: &ChatRequest, session: &dyn Session) -> Result<()> {
        tracing::info!(thread_id = %request.thread_id, chars = request.message.len(), "processing message");

        let result = self.run(request, session).await;
        match &result {
            Ok(()) => tracing::info!(thread_id = %request.thread_id, "message processing completed"),
            Err(e) => {
                tracing::error!(thread_id = %request.thread_id, error = %e, "message processing failed");
                session.error(&format!("Error processing message: {}", e));
            }
        }
        result
    }

    async fn run(&self, request: &ChatRequest, session: &dyn Session) -> Result<()> {
        let provider = match self.providers.create(&request.variables) {
            Ok(provider) => provider,
            Err(AgentError::Config(reason)) => {
                tracing::warn!(%reason, "no provider for request");
                let text = format!(
                    "Sorry, the {} is missing. Please configure it in the agent settings.",
                    self.provider_config.api_key_env
                );
                session.stream(&text);
                session.complete(CompletedResponse {
                    text,
                    ..Default::default()
                });
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        let thread_id = request.thread_id.as_str();
        self.store.append(thread_id, Turn::user(&request.message))?;
        let completion = self.build_request(request)?;

        let thinking = LoadingIndicator::start(session, LoadingKey::Thinking);

        tracing::debug!(provider = provider.name(), model = %completion.model, "streaming completion");
        let streamed = self.stream_response(provider.as_ref(), completion, session).await?;
        tracing::debug!(
            chars = streamed.text.len(),
            tool_calls = streamed.tool_calls.len(),
            finish_reason = ?streamed.finish_reason,
            "completion finished"
        );

        let outcome = self.dispatcher.dispatch(&streamed.tool_calls, session).await;

        let mut text = streamed.text;
        text.push_str(&outcome.message);
        self.store.append(thread_id, Turn::assistant(&text))?;

        drop(thinking);
        session.complete(CompletedResponse {
            text,
            usage: streamed.usage,
            file_url: outcome.artifact_url,
        });
        Ok(())
    }

    /// System prompt followed by the recent window, newest user turn included
    fn build_request(&self, request: &ChatRequest) -> Result<CompletionRequest> {
        let mut messages = vec![Turn::system(&self.conversation.system_prompt)];
        messages.extend(
            self.store
                .recent(&request.thread_id, self.conversation.history_window)?,
        );

        Ok(CompletionRequest {
            model: request
                .model
                .clone()
                .unwrap_or_else(|| self.provider_config.default_model.clone()),
            messages,
            max_tokens: self.provider_config.max_tokens,
            temperature: self.provider_config.temperature,
            tools: self.registry().definitions(),
        })
    }

    async fn stream_response(
        &self,
        provider: &dyn LlmProvider,
        request: CompletionRequest,
        session: &dyn Session,
    ) -> Result<StreamedResponse> {
        let mut stream = provider.complete_stream(request).await?;
        let mut accumulator = ResponseAccumulator::new();

        while let Some(delta) = stream.next().await {
            for output in accumulator.process(delta?) {
                match output {
                    StreamOutput::Text(text) => session.stream(&text),
                    StreamOutput::ToolCallStarted(name) => {
                        session.stream(&format!("\n🔧 **Calling function:** {}", name))
                    }
                }
            }
        }

        Ok(accumulator.finish())
    }
}
