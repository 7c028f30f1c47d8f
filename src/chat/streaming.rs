// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Streaming response handling
//!
//! Tool calls arrive split across many deltas, each tagged with the call's
//! index. [`ToolCallAccumulator`] reassembles them; [`ResponseAccumulator`]
//! wraps it together with the text, finish reason and usage of one response.
//! Neither type does any I/O: callers act on the returned [`StreamOutput`].

use std::collections::BTreeMap;

use crate::llm::provider::{FinishReason, StreamDelta, ToolCallFragment, Usage};
use crate::tools::ToolCall;

#[derive(Debug, Default)]
struct PartialCall {
    id: Option<String>,
    name: Option<String>,
    arguments: String,
}

/// Reassembles tool calls from index-keyed fragments
#[derive(Debug, Default)]
pub struct ToolCallAccumulator {
    calls: BTreeMap<usize, PartialCall>,
}

impl ToolCallAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one fragment in.
    ///
    /// Returns the call's name the first time it becomes known.
    pub fn push(&mut self, fragment: ToolCallFragment) -> Option<String> {
        let call = self.calls.entry(fragment.index).or_default();

        if call.id.is_none() {
            call.id = fragment.id.filter(|id| !id.is_empty());
        }
        call.arguments.push_str(&fragment.arguments);

        let name = fragment.name.filter(|n| !n.is_empty())?;
        match &call.name {
            None => {
                call.name = Some(name.clone());
                Some(name)
            }
            Some(existing) => {
                if *existing != name {
                    tracing::warn!(index = fragment.index, %existing, ignored = %name, "tool call renamed mid-stream");
                }
                None
            }
        }
    }

    /// Number of distinct calls seen
    pub fn len(&self) -> usize {
        self.calls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }

    /// Completed calls ordered by index
    pub fn finish(self) -> Vec<ToolCall> {
        self.calls
            .into_iter()
            .map(|(index, call)| {
                let id = call.id.unwrap_or_else(|| format!("call_{}", index));
                let name = call.name.unwrap_or_else(|| {
                    tracing::warn!(index, call_id = %id, "tool call finished without a name");
                    format!("<unnamed {}>", id)
                });
                ToolCall {
                    id,
                    name,
                    arguments: call.arguments,
                }
            })
            .collect()
    }
}

/// Something the caller should surface while the stream is running
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamOutput {
    /// Assistant text to forward to the client
    Text(String),
    /// The model started calling a tool
    ToolCallStarted(String),
}

/// Everything one streamed response produced
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StreamedResponse {
    pub text: String,
    pub tool_calls: Vec<ToolCall>,
    pub finish_reason: Option<FinishReason>,
    pub usage: Option<Usage>,
}

/// Accumulator for one streaming response
#[derive(Debug, Default)]
pub struct ResponseAccumulator {
    text: String,
    tool_calls: ToolCallAccumulator,
    finish_reason: Option<FinishReason>,
    usage: Option<Usage>,
}

impl ResponseAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process a delta and return anything to display, in order
    pub fn process(&mut self, delta: StreamDelta) -> Vec<StreamOutput> {
        let mut outputs = Vec::new();

        if let Some(text) = delta.content.filter(|t| !t.is_empty()) {
            self.text.push_str(&text);
            outputs.push(StreamOutput::Text(text));
        }

        for fragment in delta.tool_calls {
            if let Some(name) = self.tool_calls.push(fragment) {
                tracing::debug!(tool = %name, "tool call started");
                outputs.push(StreamOutput::ToolCallStarted(name));
            }
        }

        if delta.finish_reason.is_some() {
            self.finish_reason = delta.finish_reason;
        }
        if delta.usage.is_some() {
            self.usage = delta.usage;
        }

        outputs
    }

    /// Text received so far
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Consume the accumulator and return the final results
    pub fn finish(self) -> StreamedResponse {
        StreamedResponse {
            text: self.text,
            tool_calls: self.tool_calls.finish(),
            finish_reason: self.finish_reason,
            usage: self.usage,
        }
    }
}
