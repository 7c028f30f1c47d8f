// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

use async_trait::async_trait;
use serde::Deserialize;

use super::Timing;
use crate::error::{AgentError, Result};
use crate::llm::provider::ToolDefinition;
use crate::session::{run_guarded, LoadingKey, Session};
use crate::tools::{decode_as, HandlerResult, SchemaBuilder, Tool, ToolCall, ToolName};

#[derive(Debug, Deserialize)]
struct VideoArgs {
    url: String,
    #[serde(default)]
    is_youtube: bool,
    #[serde(default)]
    title: Option<String>,
}

/// Tool for sharing a video file or YouTube link
pub struct SendVideoTool {
    timing: Timing,
}

impl SendVideoTool {
    pub fn new(timing: Timing) -> Self {
        Self { timing }
    }
}

#[async_trait]
impl Tool for SendVideoTool {
    fn name(&self) -> ToolName {
        ToolName::SendVideo
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: "Share a video with the user, either a direct video file or a YouTube link.".to_string(),
            parameters: SchemaBuilder::new()
                .string("url", "Address of the video", true)
                .boolean("is_youtube", "Set when the url is a YouTube link", false)
                .string("title", "Optional title shown with the video", false)
                .build(),
        }
    }

    async fn execute(&self, call: &ToolCall, session: &dyn Session) -> Result<HandlerResult> {
        let args: VideoArgs = decode_as(&call.arguments)?;
        if args.url.trim().is_empty() {
            return Err(AgentError::MalformedArguments("url must not be empty".to_string()));
        }

        run_guarded(session, LoadingKey::Video, self.timing.min_visible, self.timing.simulate_work()).await;

        if args.is_youtube {
            session.video_youtube(&args.url);
        } else {
            session.video_send(&args.url);
        }

        let shown = args.title.as_deref().unwrap_or(&args.url);
        Ok(HandlerResult::new(format!("\n\n🎬 **Video shared:** {}\n", shown)).with_artifact(args.url))
    }
}
