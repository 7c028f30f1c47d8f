// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Tool call dispatch
//!
//! Runs a response's tool calls one after another and folds their results
//! into a single message. A failing or unknown call contributes an error
//! message and never stops the calls after it.

use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use crate::session::Session;
use crate::tools::{HandlerResult, ToolCall, ToolRegistry};

/// Combined result of one dispatch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchOutcome {
    /// Every call's message, in call order
    pub message: String,
    /// First artifact produced by any call
    pub artifact_url: Option<String>,
}

impl DispatchOutcome {
    fn absorb(&mut self, result: HandlerResult) {
        self.message.push_str(&result.message);
        if self.artifact_url.is_none() {
            self.artifact_url = result.artifact_url;
        }
    }
}

/// Sequential tool dispatcher
#[derive(Clone)]
pub struct Dispatcher {
    registry: Arc<ToolRegistry>,
}

impl Dispatcher {
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Execute `calls` in order against `session`.
    ///
    /// An empty slice returns an empty outcome without touching the session.
    pub async fn dispatch(&self, calls: &[ToolCall], session: &dyn Session) -> DispatchOutcome {
        let mut outcome = DispatchOutcome::default();
        if calls.is_empty() {
            return outcome;
        }

        let total = calls.len();
        tracing::info!(target: "chat_relay.chat.dispatch", total, "processing tool calls");
        session.stream(&format!("\n\n🔧 **Processing {} tools...**", total));

        for call in calls {
            session.stream(&format!("\n⚙️ **Processing function:** {}", call.name));
            let result = self.run_one(call, session).await;

            if !result.message.is_empty() {
                session.stream(&result.message);
            }
            outcome.absorb(result);
        }

        session.stream(&format!("\n\n✅ **All {} tools completed**\n", total));
        tracing::debug!(
            target: "chat_relay.chat.dispatch",
            total,
            artifact = outcome.artifact_url.as_deref().unwrap_or("-"),
            "tool batch finished"
        );

        outcome
    }

    async fn run_one(&self, call: &ToolCall, session: &dyn Session) -> HandlerResult {
        let Some(tool) = self.registry.get(&call.name) else {
            tracing::error!(target: "chat_relay.chat.dispatch", tool = %call.name, call_id = %call.id, "unknown function");
            return HandlerResult::unknown_function(&call.name);
        };

        tracing::debug!(target: "chat_relay.chat.dispatch", tool = %call.name, call_id = %call.id, "executing tool");
        match AssertUnwindSafe(tool.handle(call, session)).catch_unwind().await {
            Ok(result) => result,
            Err(payload) => {
                let cause = panic_message(payload.as_ref());
                tracing::error!(target: "chat_relay.chat.dispatch", tool = %call.name, %cause, "tool panicked");
                HandlerResult::execution_error(&call.name, &format!("panicked: {}", cause))
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ToolsConfig;
    use crate::error::{AgentError, Result};
    use crate::llm::provider::ToolDefinition;
    use crate::session::{RecordingSession, SessionEvent};
    use crate::tools::builtin::{ImageGenerator, ImageOptions};
    use crate::tools::{SchemaBuilder, Tool, ToolName};
    use async_trait::async_trait;

    /// Returns a distinct URL per prompt, failing for "fail"
    struct EchoGenerator;

    #[async_trait]
    impl ImageGenerator for EchoGenerator {
        async fn generate(&self, prompt: &str, _options: &ImageOptions) -> Result<String> {
            if prompt == "fail" {
                return Err(AgentError::ToolExecution("generator offline".to_string()));
            }
            Ok(format!("https://img.test/{}.png", prompt))
        }
    }

    struct PanickingTool;

    #[async_trait]
    impl Tool for PanickingTool {
        fn name(&self) -> ToolName {
            ToolName::SendCards
        }

        fn definition(&self) -> ToolDefinition {
            ToolDefinition {
                name: "send_cards".to_string(),
                description: "panics".to_string(),
                parameters: SchemaBuilder::new().build(),
            }
        }

        async fn execute(&self, _call: &ToolCall, _session: &dyn Session) -> Result<HandlerResult> {
            panic!("card renderer exploded")
        }
    }

    fn instant_config() -> ToolsConfig {
        ToolsConfig {
            min_loading_ms: 0,
            simulated_latency_ms: 0,
            ..ToolsConfig::default()
        }
    }

    fn dispatcher() -> Dispatcher {
        let registry = ToolRegistry::with_image_generator(&instant_config(), Arc::new(EchoGenerator));
        Dispatcher::new(Arc::new(registry))
    }

    fn image_call(id: &str, prompt: &str) -> ToolCall {
        ToolCall::new(id, "generate_image", format!(r#"{{"prompt":"{}"}}"#, prompt))
    }

    #[tokio::test]
    async fn test_empty_dispatch_is_silent() {
        let session = RecordingSession::new();
        let outcome = dispatcher().dispatch(&[], &session).await;

        assert_eq!(outcome, DispatchOutcome::default());
        assert!(session.is_empty());
    }

    #[tokio::test]
    async fn test_first_artifact_wins() {
        let session = RecordingSession::new();
        let calls = vec![
            image_call("1", "fail"),
            image_call("2", "first"),
            image_call("3", "second"),
        ];

        let outcome = dispatcher().dispatch(&calls, &session).await;

        assert_eq!(outcome.artifact_url.as_deref(), Some("https://img.test/first.png"));
        assert!(outcome.message.contains("generator offline"));
        assert!(outcome.message.contains("Prompt: first"));
        assert!(outcome.message.contains("Prompt: second"));

        let images: Vec<SessionEvent> = session
            .events()
            .into_iter()
            .filter(|e| matches!(e, SessionEvent::Image { .. }))
            .collect();
        assert_eq!(images.len(), 2);
    }

    #[tokio::test]
    async fn test_unknown_function_does_not_stop_batch() {
        let session = RecordingSession::new();
        let calls = vec![
            ToolCall::new("1", "summon_dragon", "{}"),
            ToolCall::new("2", "send_trace", r#"{"content":"after"}"#),
        ];

        let outcome = dispatcher().dispatch(&calls, &session).await;

        assert_eq!(outcome.message.matches("Unknown function: summon_dragon").count(), 1);
        assert!(outcome.message.contains("Trace sent"));
        assert!(outcome.artifact_url.is_none());
        assert!(session.events().contains(&SessionEvent::Trace {
            content: "after".to_string(),
            visibility: Default::default(),
        }));
    }

    #[tokio::test]
    async fn test_notices_and_order() {
        let session = RecordingSession::new();
        let calls = vec![
            ToolCall::new("1", "send_location", r#"{"lat":1.0,"lng":2.0}"#),
            ToolCall::new("2", "send_trace", r#"{"content":"x"}"#),
        ];

        let outcome = dispatcher().dispatch(&calls, &session).await;

        let text = session.streamed_text();
        assert!(text.starts_with("\n\n🔧 **Processing 2 tools...**"));
        assert!(text.trim_end().ends_with("**All 2 tools completed**"));
        let location = text.find("Processing function:** send_location").unwrap();
        let trace = text.find("Processing function:** send_trace").unwrap();
        assert!(location < trace);

        let loc_msg = outcome.message.find("Location shared").unwrap();
        let trace_msg = outcome.message.find("Trace sent").unwrap();
        assert!(loc_msg < trace_msg);
    }

    #[tokio::test]
    async fn test_panic_becomes_execution_error() {
        let mut registry = ToolRegistry::with_builtins(&instant_config());
        registry.register(Arc::new(PanickingTool));
        let dispatcher = Dispatcher::new(Arc::new(registry));
        let session = RecordingSession::new();
        let calls = vec![
            ToolCall::new("1", "send_cards", "{}"),
            ToolCall::new("2", "send_trace", r#"{"content":"still here"}"#),
        ];

        let outcome = dispatcher.dispatch(&calls, &session).await;

        assert!(outcome.message.contains("Function Execution Error"));
        assert!(outcome.message.contains("card renderer exploded"));
        assert!(outcome.message.contains("Trace sent"));
    }

    #[test]
    fn test_panic_message() {
        let payload: Box<dyn Any + Send> = Box::new("static str");
        assert_eq!(panic_message(payload.as_ref()), "static str");
        let payload: Box<dyn Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_message(payload.as_ref()), "owned");
        let payload: Box<dyn Any + Send> = Box::new(7u8);
        assert_eq!(panic_message(payload.as_ref()), "unknown panic");
    }
}
