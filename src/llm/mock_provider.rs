// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Mock LLM provider for testing
//!
//! Replays scripted delta streams so the chat engine can be driven without
//! making real API calls. Also backs the `demo` CLI command.

use async_trait::async_trait;
use futures::stream;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::error::{AgentError, ApiError, Result};
use crate::llm::provider::{
    CompletionRequest, DeltaStream, FinishReason, LlmProvider, StreamDelta, ToolCallFragment,
    Usage,
};

/// A mock LLM provider for testing
#[derive(Clone, Default)]
pub struct MockProvider {
    /// Configured responses
    responses: Arc<Mutex<Vec<MockResponse>>>,
    /// Call counter
    call_count: Arc<AtomicUsize>,
    /// Recorded requests
    recorded_requests: Arc<Mutex<Vec<CompletionRequest>>>,
}

/// One scripted streaming response
#[derive(Clone, Debug, Default)]
pub struct MockResponse {
    deltas: Vec<StreamDelta>,
    /// Fail with a stream error after this many deltas
    fail_after: Option<(usize, String)>,
}

impl MockResponse {
    /// Start an empty script
    pub fn new() -> Self {
        Self::default()
    }

    /// Stream text in chunks of `chunk_chars` characters
    pub fn text(mut self, text: &str, chunk_chars: usize) -> Self {
        let chars: Vec<char> = text.chars().collect();
        for chunk in chars.chunks(chunk_chars.max(1)) {
            self.deltas.push(StreamDelta::text(chunk.iter().collect::<String>()));
        }
        self
    }

    /// Stream one tool call whose arguments are split into the given chunks
    pub fn tool_call(mut self, index: usize, name: &str, argument_chunks: &[&str]) -> Self {
        self.deltas.push(StreamDelta::fragment(ToolCallFragment::start(
            index,
            format!("call_{}", uuid::Uuid::new_v4().simple()),
            name,
        )));
        for chunk in argument_chunks {
            self.deltas
                .push(StreamDelta::fragment(ToolCallFragment::arguments(index, *chunk)));
        }
        self
    }

    /// Append a raw delta
    pub fn delta(mut self, delta: StreamDelta) -> Self {
        self.deltas.push(delta);
        self
    }

    /// Finish with a reason and usage totals
    pub fn finish(mut self, reason: FinishReason, usage: Usage) -> Self {
        self.deltas.push(StreamDelta {
            finish_reason: Some(reason),
            usage: Some(usage),
            ..Default::default()
        });
        self
    }

    /// Break the stream with an upstream error after `count` deltas
    pub fn fail_after(mut self, count: usize, message: impl Into<String>) -> Self {
        self.fail_after = Some((count, message.into()));
        self
    }

    fn into_items(self) -> Vec<Result<StreamDelta>> {
        match self.fail_after {
            Some((count, message)) => {
                let mut items: Vec<Result<StreamDelta>> =
                    self.deltas.into_iter().take(count).map(Ok).collect();
                items.push(Err(AgentError::Api(ApiError::StreamError(message))));
                items
            }
            None => self.deltas.into_iter().map(Ok).collect(),
        }
    }
}

impl MockProvider {
    /// Create a new mock provider with no scripted responses
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a scripted response (returned in order, last one repeats)
    pub fn with_response(self, response: MockResponse) -> Self {
        self.lock_responses().push(response);
        self
    }

    /// Get the number of times complete_stream() was called
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Get the last request made
    pub fn last_request(&self) -> Option<CompletionRequest> {
        self.recorded_requests.lock().ok()?.last().cloned()
    }

    fn lock_responses(&self) -> std::sync::MutexGuard<'_, Vec<MockResponse>> {
        match self.responses.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                tracing::warn!("Mock provider responses lock was poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }

    fn next_response(&self) -> MockResponse {
        let count = self.call_count.fetch_add(1, Ordering::SeqCst);
        let responses = self.lock_responses();
        if responses.is_empty() {
            MockResponse::new().text("Mock response", 10)
        } else {
            responses[count.min(responses.len() - 1)].clone()
        }
    }
}

#[async_trait]
impl LlmProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn complete_stream(&self, request: CompletionRequest) -> Result<DeltaStream> {
        if let Ok(mut recorded) = self.recorded_requests.lock() {
            recorded.push(request);
        }
        let items = self.next_response().into_items();
        Ok(Box::pin(stream::iter(items)))
    }
}
