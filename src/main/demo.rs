// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! `demo` command: scripted tool calls replayed through the real engine

use std::str::FromStr;
use std::sync::Arc;

use chat_relay::chat::{ChatEngine, ChatRequest, InMemoryConversationStore};
use chat_relay::cli::{DemoArgs, OutputFormat};
use chat_relay::config::Settings;
use chat_relay::error::Result;
use chat_relay::llm::factory::StaticProviderFactory;
use chat_relay::llm::mock_provider::{MockProvider, MockResponse};
use chat_relay::llm::provider::{FinishReason, Usage};
use chat_relay::tools::ToolName;

use super::cli_commands::make_session;

const DEMO_THREAD: &str = "demo";

/// Example arguments the model might send for each tool
pub(super) fn sample_arguments(tool: ToolName) -> &'static str {
    match tool {
        ToolName::GenerateImage => r#"{"prompt":"a watercolor fox in the snow","size":"1024x1024","style":"natural"}"#,
        ToolName::SendVideo => r#"{"url":"https://www.youtube.com/watch?v=dQw4w9WgXcQ","is_youtube":true,"title":"Demo video"}"#,
        ToolName::SendAudio => r#"{"tracks":[{"url":"https://samplelib.com/lib/preview/mp3/sample-3s.mp3","label":"Intro","mime_type":"audio/mpeg"},{"url":"https://samplelib.com/lib/preview/mp3/sample-6s.mp3","label":"Theme"}]}"#,
        ToolName::SendLocation => r#"{"lat":37.7749,"lng":-122.4194,"label":"San Francisco"}"#,
        ToolName::SendButtons => r#"{"buttons":[{"label":"Docs","type":"link","url":"https://example.com/docs"},{"label":"Try again","type":"action","id":"retry","row":1}]}"#,
        ToolName::SendCards => r#"{"cards":[{"title":"Streaming","description":"Text arrives as it is generated"},{"title":"Tools","description":"UI actions chosen by the model","url":"https://example.com/tools"}]}"#,
        ToolName::TrackUsage => r#"{"tokens":512,"token_type":"total","cost":0.0012,"label":"demo"}"#,
        ToolName::SendTrace => r#"{"content":"demo trace: all systems nominal","visibility":"all"}"#,
        ToolName::TestLoadingStates => "{}",
        ToolName::CompleteStreamingExample => r#"{"topic":"chat-relay"}"#,
    }
}

/// Split arguments in two so the stream exercises fragment reassembly
fn split_arguments(arguments: &str) -> (String, String) {
    let chars: Vec<char> = arguments.chars().collect();
    let mid = chars.len() / 2;
    (chars[..mid].iter().collect(), chars[mid..].iter().collect())
}

/// Scripted model response calling `tools` in order
pub(super) fn demo_script(tools: &[ToolName]) -> MockResponse {
    let names: Vec<&str> = tools.iter().map(|t| t.as_str()).collect();
    let mut script = MockResponse::new().text(
        &format!("Running a demo of {}.\n", names.join(", ")),
        12,
    );

    for (index, tool) in tools.iter().enumerate() {
        let (head, tail) = split_arguments(sample_arguments(*tool));
        script = script.tool_call(index, tool.as_str(), &[head.as_str(), tail.as_str()]);
    }

    script.finish(
        FinishReason::ToolCalls,
        Usage {
            prompt_tokens: 120,
            completion_tokens: 40 * tools.len() as u32,
            total_tokens: 120 + 40 * tools.len() as u32,
        },
    )
}

pub(super) async fn run_demo(args: DemoArgs, mut settings: Settings, format: OutputFormat) -> Result<()> {
    let tools = match args.tool.as_deref() {
        Some(name) => vec![ToolName::from_str(name)?],
        None => ToolName::ALL.to_vec(),
    };

    if args.fast {
        settings.tools.min_loading_ms = 0;
        settings.tools.simulated_latency_ms = 0;
    }

    let provider = MockProvider::new().with_response(demo_script(&tools));
    let engine = ChatEngine::new(
        &settings,
        Arc::new(StaticProviderFactory::new(Arc::new(provider))),
        Arc::new(InMemoryConversationStore::new()),
    );

    let session = make_session(format, DEMO_THREAD, true);
    let request = ChatRequest::new(DEMO_THREAD, "Show me what you can do.");
    engine.process_message(&request, session.as_ref()).await?;

    if format == OutputFormat::Text {
        println!();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chat_relay::session::RecordingSession;

    #[test]
    fn test_sample_arguments_are_objects() {
        for tool in ToolName::ALL {
            let map = chat_relay::tools::decode(sample_arguments(tool)).unwrap();
            if tool != ToolName::TestLoadingStates {
                assert!(!map.is_empty(), "{}", tool);
            }
        }
    }

    #[test]
    fn test_split_is_lossless() {
        let raw = sample_arguments(ToolName::SendCards);
        let (head, tail) = split_arguments(raw);
        assert_eq!(format!("{}{}", head, tail), raw);
    }

    #[tokio::test]
    async fn test_demo_runs_every_tool_without_errors() {
        let mut settings = Settings::default();
        settings.tools.min_loading_ms = 0;
        settings.tools.simulated_latency_ms = 0;

        let provider = MockProvider::new().with_response(demo_script(&ToolName::ALL));
        let engine = ChatEngine::new(
            &settings,
            Arc::new(StaticProviderFactory::new(Arc::new(provider))),
            Arc::new(InMemoryConversationStore::new()),
        );
        let session = RecordingSession::new();

        engine
            .process_message(&ChatRequest::new(DEMO_THREAD, "go"), &session)
            .await
            .unwrap();

        let done = session.completed().unwrap();
        assert!(!done.text.contains('❌'), "{}", done.text);
        assert!(session.streamed_text().contains("All 10 tools completed"));
        assert!(done.file_url.is_some());
    }
}
