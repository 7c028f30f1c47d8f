// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use chat_relay::chat::{ChatEngine, ChatRequest, ConversationStore, InMemoryConversationStore};
use chat_relay::config::Settings;
use chat_relay::llm::factory::StaticProviderFactory;
use chat_relay::llm::message::Role;
use chat_relay::llm::mock_provider::{MockProvider, MockResponse};
use chat_relay::llm::provider::{FinishReason, StreamDelta, ToolCallFragment, Usage};
use chat_relay::session::{LoadingKey, RecordingSession, SessionEvent, TraceVisibility};
use chat_relay::tools::builtin::{ImageGenerator, ImageOptions};
use chat_relay::tools::ToolRegistry;
use chat_relay::Result;

fn instant_settings() -> Settings {
    let mut settings = Settings::default();
    settings.tools.min_loading_ms = 0;
    settings.tools.simulated_latency_ms = 0;
    settings
}

fn usage() -> Usage {
    Usage {
        prompt_tokens: 50,
        completion_tokens: 20,
        total_tokens: 70,
    }
}

struct Harness {
    engine: ChatEngine,
    store: Arc<InMemoryConversationStore>,
    provider: MockProvider,
}

impl Harness {
    fn new(script: MockResponse) -> Self {
        let provider = MockProvider::new().with_response(script);
        let store = Arc::new(InMemoryConversationStore::new());
        let engine = ChatEngine::new(
            &instant_settings(),
            Arc::new(StaticProviderFactory::new(Arc::new(provider.clone()))),
            store.clone(),
        );
        Self {
            engine,
            store,
            provider,
        }
    }

    async fn send(&self, thread: &str, message: &str) -> RecordingSession {
        let session = RecordingSession::new();
        self.engine
            .process_message(&ChatRequest::new(thread, message), &session)
            .await
            .unwrap();
        session
    }
}

/// Hands out a different URL per call
#[derive(Default)]
struct CountingGenerator {
    calls: AtomicUsize,
}

#[async_trait]
impl ImageGenerator for CountingGenerator {
    async fn generate(&self, _prompt: &str, _options: &ImageOptions) -> Result<String> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(format!("https://img.test/{}.png", n))
    }
}

#[tokio::test]
async fn test_draw_me_a_cat() {
    let harness = Harness::new(
        MockResponse::new()
            .text("Sure", 10)
            .text(", drawing", 10)
            .text(" now.", 10)
            .tool_call(0, "generate_image", &[r#"{"prom"#, r#"pt":"a "#, r#"cat"}"#])
            .finish(FinishReason::ToolCalls, usage()),
    );

    let session = harness.send("t1", "draw me a cat").await;

    let streamed = session.streamed_text();
    assert!(streamed.starts_with("Sure, drawing now."));
    assert!(streamed.contains("🔧 **Calling function:** generate_image"));

    let done = session.completed().unwrap();
    assert!(done.text.starts_with("Sure, drawing now."));
    assert!(done.text.contains("Prompt: a cat"));
    assert!(done.file_url.is_some());
    assert_eq!(done.usage, Some(usage()));

    let events = session.events();
    assert!(events
        .iter()
        .any(|e| matches!(e, SessionEvent::Image { url } if Some(url) == done.file_url.as_ref())));
    assert!(events.contains(&SessionEvent::LoadingStart { key: LoadingKey::Image }));
    assert!(events.contains(&SessionEvent::LoadingEnd { key: LoadingKey::Image }));

    let turns = harness.store.history("t1").unwrap();
    assert_eq!(turns.len(), 2);
    assert_eq!(turns[0].role, Role::User);
    assert_eq!(turns[0].content, "draw me a cat");
    assert_eq!(turns[1].role, Role::Assistant);
    assert_eq!(turns[1].content, done.text);
}

#[tokio::test]
async fn test_location_and_trace_missing_content() {
    let harness = Harness::new(
        MockResponse::new()
            .tool_call(0, "send_location", &[r#"{"lat":40.7128,"lng":-74.006}"#])
            .tool_call(1, "send_trace", &["{}"])
            .finish(FinishReason::ToolCalls, usage()),
    );

    let session = harness.send("t2", "where am I").await;
    let events = session.events();

    assert!(events.contains(&SessionEvent::Location {
        lat: 40.7128,
        lng: -74.006
    }));
    assert!(!events.iter().any(|e| matches!(e, SessionEvent::Trace { .. })));

    let done = session.completed().unwrap();
    assert!(done.text.contains("📍 **Location shared:**"));
    assert!(done.text.contains("❌ **Invalid Arguments:** send_trace"));
    assert!(done.file_url.is_none());
}

#[tokio::test]
async fn test_trace_visibility_reaches_session() {
    let harness = Harness::new(
        MockResponse::new()
            .tool_call(0, "send_trace", &[r#"{"content":"debug","visibility":"admin"}"#])
            .finish(FinishReason::ToolCalls, usage()),
    );

    let session = harness.send("t", "trace please").await;
    assert!(session.events().contains(&SessionEvent::Trace {
        content: "debug".to_string(),
        visibility: TraceVisibility::Admin,
    }));
}

#[tokio::test]
async fn test_first_artifact_wins() {
    let provider = MockProvider::new().with_response(
        MockResponse::new()
            .tool_call(0, "generate_image", &[r#"{"prompt":"one"}"#])
            .tool_call(1, "generate_image", &[r#"{"prompt":"two"}"#])
            .finish(FinishReason::ToolCalls, usage()),
    );
    let settings = instant_settings();
    let registry = ToolRegistry::with_image_generator(&settings.tools, Arc::new(CountingGenerator::default()));
    let engine = ChatEngine::new(
        &settings,
        Arc::new(StaticProviderFactory::new(Arc::new(provider))),
        Arc::new(InMemoryConversationStore::new()),
    )
    .with_registry(registry);
    let session = RecordingSession::new();

    engine
        .process_message(&ChatRequest::new("t", "two images"), &session)
        .await
        .unwrap();

    let done = session.completed().unwrap();
    assert_eq!(done.file_url.as_deref(), Some("https://img.test/1.png"));
    assert!(done.text.contains("https://img.test/2.png"));
}

#[tokio::test]
async fn test_unknown_tool_is_reported_inline() {
    let harness = Harness::new(
        MockResponse::new()
            .text("Let me try.", 20)
            .tool_call(0, "launch_rocket", &["{}"])
            .finish(FinishReason::ToolCalls, usage()),
    );

    let session = harness.send("t", "go").await;

    let done = session.completed().unwrap();
    assert!(done.text.contains("❌ **Function Error:** Unknown function: launch_rocket"));
    assert!(session.errors().is_empty());
    assert_eq!(harness.store.history("t").unwrap().len(), 2);
}

#[tokio::test]
async fn test_call_without_name_is_reported_readably() {
    let harness = Harness::new(
        MockResponse::new()
            .delta(StreamDelta::fragment(ToolCallFragment::arguments(0, "{}")))
            .tool_call(1, "send_trace", &[r#"{"content":"still runs"}"#])
            .finish(FinishReason::ToolCalls, usage()),
    );

    let session = harness.send("t", "go").await;

    let done = session.completed().unwrap();
    assert!(done
        .text
        .contains("❌ **Function Error:** Unknown function: <unnamed call_0>"));
    assert!(done.text.contains("🔍 **Trace sent**"));
}

#[tokio::test]
async fn test_audio_tracks_win_over_url() {
    let harness = Harness::new(
        MockResponse::new()
            .tool_call(
                0,
                "send_audio",
                &[r#"{"tracks":[{"url":"https://a.test/1.mp3","label":"One"}],"url":"https://a.test/ignored.mp3"}"#],
            )
            .finish(FinishReason::ToolCalls, usage()),
    );

    let session = harness.send("t", "play").await;
    let events = session.events();

    let audio: Vec<&SessionEvent> = events
        .iter()
        .filter(|e| matches!(e, SessionEvent::Audio { .. } | SessionEvent::AudioSingle { .. }))
        .collect();
    assert_eq!(audio.len(), 1);
    match audio[0] {
        SessionEvent::Audio { tracks } => {
            assert_eq!(tracks.len(), 1);
            assert_eq!(tracks[0].url, "https://a.test/1.mp3");
        }
        other => panic!("unexpected event {:?}", other),
    }
}

#[tokio::test]
async fn test_history_window_spans_requests() {
    let harness = Harness::new(
        MockResponse::new()
            .text("ok", 10)
            .finish(FinishReason::Stop, usage()),
    );

    for i in 0..7 {
        harness.send("long", &format!("message {}", i)).await;
    }

    assert_eq!(harness.store.history("long").unwrap().len(), 14);

    // System prompt plus the ten most recent turns.
    let request = harness.provider.last_request().unwrap();
    assert_eq!(request.messages.len(), 11);
    assert_eq!(request.messages[0].role, Role::System);
    assert_eq!(request.messages[10].content, "message 6");
    assert_eq!(harness.provider.call_count(), 7);
}

#[tokio::test]
async fn test_stream_failure_reports_error() {
    let harness = Harness::new(
        MockResponse::new()
            .text("partial answer", 4)
            .fail_after(2, "connection reset"),
    );
    let session = RecordingSession::new();

    let result = harness
        .engine
        .process_message(&ChatRequest::new("t", "hello"), &session)
        .await;

    assert!(result.is_err());
    assert!(session.completed().is_none());
    assert_eq!(session.errors().len(), 1);
    assert!(session.errors()[0].starts_with("Error processing message:"));

    let thinking_end = SessionEvent::LoadingEnd {
        key: LoadingKey::Thinking,
    };
    assert_eq!(session.events().iter().filter(|e| **e == thinking_end).count(), 1);
}
