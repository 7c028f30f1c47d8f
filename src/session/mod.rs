// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Client session boundary
//!
//! Every user-visible side effect (streamed text, loading indicators, media,
//! buttons, usage) leaves the agent through a [`Session`]. Implementors only
//! need [`Session::emit`]; the named capability methods build the matching
//! [`SessionEvent`].
//!
//! Implementations shipped here:
//! - [`RecordingSession`]: collects events in memory (tests, demos)
//! - [`ConsoleSession`]: renders events as readable terminal text
//! - [`JsonlSession`]: one JSON object per event on stdout

mod console;
mod jsonl;
pub mod loading;
mod recording;

pub use console::ConsoleSession;
pub use jsonl::JsonlSession;
pub use loading::{run_guarded, LoadingIndicator, LoadingKey, DEFAULT_MIN_VISIBLE};
pub use recording::RecordingSession;

use serde::{Deserialize, Serialize};

use crate::llm::provider::Usage;

/// One audio track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioTrack {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}

/// A rich card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Who may see a trace payload
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TraceVisibility {
    #[default]
    All,
    Admin,
}

/// Kind of token count recorded by usage tracking
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Prompt,
    Completion,
    #[default]
    Total,
}

/// Final response handed to the session when a request finishes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompletedResponse {
    /// Full response text, tool results included
    pub text: String,
    /// Token usage reported by the provider
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
    /// Primary generated artifact
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_url: Option<String>,
}

/// A side effect emitted to the client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    Text {
        text: String,
    },
    LoadingStart {
        key: LoadingKey,
    },
    LoadingEnd {
        key: LoadingKey,
    },
    Image {
        url: String,
    },
    Video {
        url: String,
    },
    Youtube {
        url: String,
    },
    Audio {
        tracks: Vec<AudioTrack>,
    },
    AudioSingle {
        url: String,
        label: Option<String>,
        mime_type: Option<String>,
    },
    Location {
        lat: f64,
        lng: f64,
    },
    Trace {
        content: String,
        visibility: TraceVisibility,
    },
    ButtonBegin,
    ButtonLink {
        label: String,
        url: String,
        row: Option<u32>,
        color: Option<String>,
    },
    ButtonAction {
        label: String,
        action_id: String,
        row: Option<u32>,
        color: Option<String>,
    },
    ButtonEnd,
    Cards {
        cards: Vec<Card>,
    },
    Usage {
        tokens: u64,
        token_type: TokenType,
        cost: Option<f64>,
        label: Option<String>,
    },
    Error {
        message: String,
    },
    Complete {
        response: CompletedResponse,
    },
}

/// Client session collaborator
pub trait Session: Send + Sync {
    /// Deliver one event to the client
    fn emit(&self, event: SessionEvent);

    fn stream(&self, text: &str) {
        self.emit(SessionEvent::Text {
            text: text.to_string(),
        });
    }

    fn loading_start(&self, key: LoadingKey) {
        self.emit(SessionEvent::LoadingStart { key });
    }

    fn loading_end(&self, key: LoadingKey) {
        self.emit(SessionEvent::LoadingEnd { key });
    }

    fn image_send(&self, url: &str) {
        self.emit(SessionEvent::Image {
            url: url.to_string(),
        });
    }

    fn video_send(&self, url: &str) {
        self.emit(SessionEvent::Video {
            url: url.to_string(),
        });
    }

    fn video_youtube(&self, url: &str) {
        self.emit(SessionEvent::Youtube {
            url: url.to_string(),
        });
    }

    fn audio_send(&self, tracks: &[AudioTrack]) {
        self.emit(SessionEvent::Audio {
            tracks: tracks.to_vec(),
        });
    }

    fn audio_send_single(&self, url: &str, label: Option<&str>, mime_type: Option<&str>) {
        self.emit(SessionEvent::AudioSingle {
            url: url.to_string(),
            label: label.map(str::to_string),
            mime_type: mime_type.map(str::to_string),
        });
    }

    fn location_send_coordinates(&self, lat: f64, lng: f64) {
        self.emit(SessionEvent::Location { lat, lng });
    }

    fn trace_send(&self, content: &str, visibility: TraceVisibility) {
        self.emit(SessionEvent::Trace {
            content: content.to_string(),
            visibility,
        });
    }

    fn button_begin(&self) {
        self.emit(SessionEvent::ButtonBegin);
    }

    fn button_add_link(&self, label: &str, url: &str, row: Option<u32>, color: Option<&str>) {
        self.emit(SessionEvent::ButtonLink {
            label: label.to_string(),
            url: url.to_string(),
            row,
            color: color.map(str::to_string),
        });
    }

    fn button_add_action(&self, label: &str, action_id: &str, row: Option<u32>, color: Option<&str>) {
        self.emit(SessionEvent::ButtonAction {
            label: label.to_string(),
            action_id: action_id.to_string(),
            row,
            color: color.map(str::to_string),
        });
    }

    fn button_end(&self) {
        self.emit(SessionEvent::ButtonEnd);
    }

    fn card_send(&self, cards: &[Card]) {
        self.emit(SessionEvent::Cards {
            cards: cards.to_vec(),
        });
    }

    fn usage_track(&self, tokens: u64, token_type: TokenType, cost: Option<f64>, label: Option<&str>) {
        self.emit(SessionEvent::Usage {
            tokens,
            token_type,
            cost,
            label: label.map(str::to_string),
        });
    }

    fn error(&self, message: &str) {
        self.emit(SessionEvent::Error {
            message: message.to_string(),
        });
    }

    fn complete(&self, response: CompletedResponse) {
        self.emit(SessionEvent::Complete { response });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capability_methods_build_events() {
        let session = RecordingSession::new();
        session.stream("hello");
        session.video_youtube("https://youtu.be/x");
        session.button_add_action("Retry", "retry", Some(1), None);
        session.usage_track(42, TokenType::Prompt, Some(0.01), Some("demo"));

        let events = session.events();
        assert_eq!(
            events[0],
            SessionEvent::Text {
                text: "hello".to_string()
            }
        );
        assert!(matches!(events[1], SessionEvent::Youtube { .. }));
        assert_eq!(
            events[2],
            SessionEvent::ButtonAction {
                label: "Retry".to_string(),
                action_id: "retry".to_string(),
                row: Some(1),
                color: None,
            }
        );
        assert!(matches!(
            events[3],
            SessionEvent::Usage {
                tokens: 42,
                token_type: TokenType::Prompt,
                ..
            }
        ));
    }

    #[test]
    fn test_event_serialization_tag() {
        let json = serde_json::to_value(SessionEvent::Location { lat: 1.5, lng: -2.0 }).unwrap();
        assert_eq!(json["type"], "location");
        assert_eq!(json["lat"], 1.5);

        let json = serde_json::to_value(SessionEvent::LoadingStart {
            key: LoadingKey::Image,
        })
        .unwrap();
        assert_eq!(json["type"], "loading_start");
        assert_eq!(json["key"], "image");
    }

    #[test]
    fn test_trace_visibility_parse() {
        let v: TraceVisibility = serde_json::from_str("\"admin\"").unwrap();
        assert_eq!(v, TraceVisibility::Admin);
        assert_eq!(TraceVisibility::default(), TraceVisibility::All);
        assert!(serde_json::from_str::<TraceVisibility>("\"everyone\"").is_err());
    }
}
