// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Audio sharing tool
//!
//! Accepts either a `tracks` list or the single-track `url`/`label`/`mime_type`
//! form. A non-empty list wins when both are present.

use async_trait::async_trait;
use serde::Deserialize;

use super::Timing;
use crate::error::Result;
use crate::llm::provider::ToolDefinition;
use crate::session::{run_guarded, AudioTrack, LoadingKey, Session};
use crate::tools::{decode_as, HandlerResult, SchemaBuilder, Tool, ToolCall, ToolName};

#[derive(Debug, Deserialize)]
struct AudioArgs {
    #[serde(default)]
    tracks: Option<Vec<AudioTrack>>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    label: Option<String>,
    #[serde(default)]
    mime_type: Option<String>,
}

enum Payload {
    Playlist(Vec<AudioTrack>),
    Single(AudioTrack),
}

impl AudioArgs {
    fn into_payload(self) -> Option<Payload> {
        if let Some(tracks) = self.tracks.filter(|t| !t.is_empty()) {
            return Some(Payload::Playlist(tracks));
        }
        let url = self.url.filter(|u| !u.trim().is_empty())?;
        Some(Payload::Single(AudioTrack {
            url,
            label: self.label,
            mime_type: self.mime_type,
        }))
    }
}

/// Tool for sharing one or more audio tracks
pub struct SendAudioTool {
    timing: Timing,
}

impl SendAudioTool {
    pub fn new(timing: Timing) -> Self {
        Self { timing }
    }
}

#[async_trait]
impl Tool for SendAudioTool {
    fn name(&self) -> ToolName {
        ToolName::SendAudio
    }

    fn definition(&self) -> ToolDefinition {
        let track = SchemaBuilder::new()
            .string("url", "Address of the audio file", true)
            .string("label", "Track title", false)
            .string("mime_type", "MIME type, e.g. audio/mpeg", false);

        ToolDefinition {
            name: self.name().to_string(),
            description: "Share audio with the user. Pass a list of tracks, or a single url with optional label and mime_type.".to_string(),
            parameters: SchemaBuilder::new()
                .object_array("tracks", "Tracks to play, in order", track, false)
                .string("url", "Single track address (used when tracks is absent)", false)
                .string("label", "Single track title", false)
                .string("mime_type", "Single track MIME type", false)
                .build(),
        }
    }

    async fn execute(&self, call: &ToolCall, session: &dyn Session) -> Result<HandlerResult> {
        let args: AudioArgs = decode_as(&call.arguments)?;
        let Some(payload) = args.into_payload() else {
            tracing::warn!(call_id = %call.id, "send_audio called without tracks or url");
            return Ok(HandlerResult::new("\n\n🎵 **Audio:** no audio provided\n"));
        };

        run_guarded(session, LoadingKey::Audio, self.timing.min_visible, self.timing.simulate_work()).await;

        let message = match payload {
            Payload::Playlist(tracks) => {
                session.audio_send(&tracks);
                format!("\n\n🎵 **Audio shared:** {} tracks\n", tracks.len())
            }
            Payload::Single(track) => {
                session.audio_send_single(&track.url, track.label.as_deref(), track.mime_type.as_deref());
                format!(
                    "\n\n🎵 **Audio shared:** {}\n",
                    track.label.as_deref().unwrap_or(&track.url)
                )
            }
        };
        Ok(HandlerResult::new(message))
    }
}
