// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Demo tools
//!
//! These exist to show off client rendering: one cycles every loading
//! indicator, the other walks through every capability in a fixed order.

use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;

use super::{ImageGenerator, ImageOptions, Timing};
use crate::error::Result;
use crate::llm::provider::ToolDefinition;
use crate::session::{run_guarded, AudioTrack, Card, LoadingKey, Session, TokenType, TraceVisibility};
use crate::tools::{decode_as, HandlerResult, SchemaBuilder, Tool, ToolCall, ToolName};

/// Tool that shows each loading indicator in turn
pub struct TestLoadingStatesTool {
    timing: Timing,
}

impl TestLoadingStatesTool {
    pub fn new(timing: Timing) -> Self {
        Self { timing }
    }
}

#[async_trait]
impl Tool for TestLoadingStatesTool {
    fn name(&self) -> ToolName {
        ToolName::TestLoadingStates
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: "Demonstrate every loading indicator, one after another.".to_string(),
            parameters: SchemaBuilder::new().build(),
        }
    }

    async fn execute(&self, call: &ToolCall, session: &dyn Session) -> Result<HandlerResult> {
        // Arguments are ignored but must still be well formed.
        crate::tools::decode(&call.arguments)?;

        for key in LoadingKey::ALL {
            session.stream(&format!("\n⏳ Showing {} indicator", key));
            run_guarded(session, key, self.timing.min_visible, self.timing.simulate_work()).await;
        }

        Ok(HandlerResult::new(format!(
            "\n\n⏳ **Loading states demonstrated:** {}\n",
            LoadingKey::ALL.len()
        )))
    }
}

#[derive(Debug, Default, Deserialize)]
struct ShowcaseArgs {
    #[serde(default)]
    topic: Option<String>,
}

/// Tool that exercises every client capability in sequence
pub struct CompleteStreamingExampleTool {
    generator: Arc<dyn ImageGenerator>,
    timing: Timing,
}

impl CompleteStreamingExampleTool {
    pub fn new(generator: Arc<dyn ImageGenerator>, timing: Timing) -> Self {
        Self { generator, timing }
    }
}

#[async_trait]
impl Tool for CompleteStreamingExampleTool {
    fn name(&self) -> ToolName {
        ToolName::CompleteStreamingExample
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: "Run a full showcase of streaming text, media, maps, buttons, cards, traces and usage tracking.".to_string(),
            parameters: SchemaBuilder::new()
                .string("topic", "Optional theme for the showcase", false)
                .build(),
        }
    }

    async fn execute(&self, call: &ToolCall, session: &dyn Session) -> Result<HandlerResult> {
        let args: ShowcaseArgs = decode_as(&call.arguments)?;
        let topic = args.topic.unwrap_or_else(|| "chat-relay".to_string());

        session.stream(&format!("\n\n🌟 **Showcase:** {}\n", topic));

        let prompt = format!("A showcase illustration of {}", topic);
        let image_url = run_guarded(
            session,
            LoadingKey::Image,
            self.timing.min_visible,
            self.generator.generate(&prompt, &ImageOptions::default()),
        )
        .await?;
        session.image_send(&image_url);

        run_guarded(session, LoadingKey::Video, self.timing.min_visible, self.timing.simulate_work()).await;
        session.video_send("https://samplelib.com/lib/preview/mp4/sample-5s.mp4");
        session.video_youtube("https://www.youtube.com/watch?v=dQw4w9WgXcQ");

        run_guarded(session, LoadingKey::Audio, self.timing.min_visible, self.timing.simulate_work()).await;
        session.audio_send_single(
            "https://samplelib.com/lib/preview/mp3/sample-3s.mp3",
            Some("Intro"),
            Some("audio/mpeg"),
        );
        session.audio_send(&[
            AudioTrack {
                url: "https://samplelib.com/lib/preview/mp3/sample-6s.mp3".to_string(),
                label: Some("Track one".to_string()),
                mime_type: Some("audio/mpeg".to_string()),
            },
            AudioTrack {
                url: "https://samplelib.com/lib/preview/mp3/sample-9s.mp3".to_string(),
                label: Some("Track two".to_string()),
                mime_type: None,
            },
        ]);

        session.location_send_coordinates(37.7749, -122.4194);

        session.button_begin();
        session.button_add_link("Documentation", "https://example.com/docs", Some(1), None);
        session.button_add_action("Run again", "complete_streaming_example", Some(1), Some("blue"));
        session.button_end();

        session.card_send(&[
            Card {
                title: "Streaming".to_string(),
                description: Some("Text arrives as it is generated".to_string()),
                image_url: None,
                url: None,
            },
            Card {
                title: "Tools".to_string(),
                description: Some("The model can call functions mid-response".to_string()),
                image_url: Some(image_url.clone()),
                url: None,
            },
        ]);

        session.trace_send(&format!("showcase topic: {}", topic), TraceVisibility::All);
        session.trace_send(&format!("showcase call id: {}", call.id), TraceVisibility::Admin);

        session.usage_track(150, TokenType::Prompt, None, Some("showcase"));
        session.usage_track(350, TokenType::Completion, None, Some("showcase"));
        session.usage_track(500, TokenType::Total, Some(0.001), Some("showcase"));

        Ok(HandlerResult::new("\n\n✅ **Showcase complete**\n").with_artifact(image_url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{RecordingSession, SessionEvent};
    use crate::tools::builtin::PlaceholderImageGenerator;
    use std::time::Duration;

    #[tokio::test]
    async fn test_loading_states_cycle_every_key() {
        let session = RecordingSession::new();
        let call = ToolCall::new("c1", "test_loading_states", "");

        let result = TestLoadingStatesTool::new(Timing::instant())
            .execute(&call, &session)
            .await
            .unwrap();

        assert!(result.message.contains("7"));
        let events = session.events();
        for key in LoadingKey::ALL {
            let start = events.iter().position(|e| *e == SessionEvent::LoadingStart { key });
            let end = events.iter().position(|e| *e == SessionEvent::LoadingEnd { key });
            assert!(start.unwrap() < end.unwrap(), "{} out of order", key);
        }
    }

    #[tokio::test]
    async fn test_showcase_touches_every_capability() {
        let session = RecordingSession::new();
        let generator = Arc::new(PlaceholderImageGenerator::new("https://img.test/s.png", Duration::ZERO));
        let tool = CompleteStreamingExampleTool::new(generator, Timing::instant());
        let call = ToolCall::new("c9", "complete_streaming_example", r#"{"topic":"rust"}"#);

        let result = tool.execute(&call, &session).await.unwrap();

        assert_eq!(result.artifact_url.as_deref(), Some("https://img.test/s.png"));
        let events = session.events();
        let has = |pred: fn(&SessionEvent) -> bool| events.iter().any(pred);
        assert!(has(|e| matches!(e, SessionEvent::Image { .. })));
        assert!(has(|e| matches!(e, SessionEvent::Video { .. })));
        assert!(has(|e| matches!(e, SessionEvent::Youtube { .. })));
        assert!(has(|e| matches!(e, SessionEvent::Audio { .. })));
        assert!(has(|e| matches!(e, SessionEvent::AudioSingle { .. })));
        assert!(has(|e| matches!(e, SessionEvent::Location { .. })));
        assert!(has(|e| matches!(e, SessionEvent::ButtonEnd)));
        assert!(has(|e| matches!(e, SessionEvent::Cards { .. })));
        assert!(has(|e| matches!(e, SessionEvent::Trace { visibility: TraceVisibility::Admin, .. })));
        assert!(has(|e| matches!(e, SessionEvent::Usage { token_type: TokenType::Total, .. })));
        assert!(session.streamed_text().contains("rust"));
    }
}
