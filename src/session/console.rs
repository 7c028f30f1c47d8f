// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Terminal session
//!
//! Renders events as plain text: streamed text inline, everything else on its
//! own bracketed line.

use std::io::{self, Write};
use std::sync::Mutex;

use super::{Session, SessionEvent, TraceVisibility};

/// Session that prints to a terminal
pub struct ConsoleSession<W: Write + Send = io::Stdout> {
    out: Mutex<W>,
    show_admin_traces: bool,
}

impl ConsoleSession<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> ConsoleSession<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
            show_admin_traces: false,
        }
    }

    /// Also print admin-only traces
    pub fn with_admin_traces(mut self, show: bool) -> Self {
        self.show_admin_traces = show;
        self
    }

    pub fn into_inner(self) -> W {
        match self.out.into_inner() {
            Ok(out) => out,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

/// Text for one event, or `None` when it is not shown
pub fn render(event: &SessionEvent, show_admin_traces: bool) -> Option<String> {
    let line = match event {
        SessionEvent::Text { text } => return Some(text.clone()),
        SessionEvent::LoadingStart { key } => format!("[{} ...]", key),
        SessionEvent::LoadingEnd { key } => format!("[{} done]", key),
        SessionEvent::Image { url } => format!("[image] {}", url),
        SessionEvent::Video { url } => format!("[video] {}", url),
        SessionEvent::Youtube { url } => format!("[youtube] {}", url),
        SessionEvent::Audio { tracks } => {
            let urls: Vec<&str> = tracks.iter().map(|t| t.url.as_str()).collect();
            format!("[audio x{}] {}", tracks.len(), urls.join(", "))
        }
        SessionEvent::AudioSingle { url, label, .. } => match label {
            Some(label) => format!("[audio] {} ({})", url, label),
            None => format!("[audio] {}", url),
        },
        SessionEvent::Location { lat, lng } => format!("[location] {}, {}", lat, lng),
        SessionEvent::Trace {
            content,
            visibility,
        } => {
            if *visibility == TraceVisibility::Admin && !show_admin_traces {
                return None;
            }
            format!("[trace] {}", content)
        }
        SessionEvent::ButtonBegin => "[buttons]".to_string(),
        SessionEvent::ButtonLink { label, url, .. } => format!("  ({}) -> {}", label, url),
        SessionEvent::ButtonAction {
            label, action_id, ..
        } => format!("  ({}) ! {}", label, action_id),
        SessionEvent::ButtonEnd => "[/buttons]".to_string(),
        SessionEvent::Cards { cards } => {
            let titles: Vec<&str> = cards.iter().map(|c| c.title.as_str()).collect();
            format!("[cards] {}", titles.join(" | "))
        }
        SessionEvent::Usage {
            tokens, token_type, ..
        } => format!("[usage] {} {:?} tokens", tokens, token_type),
        SessionEvent::Error { message } => format!("[error] {}", message),
        SessionEvent::Complete { response } => match &response.file_url {
            Some(url) => format!("[complete] attachment: {}", url),
            None => "[complete]".to_string(),
        },
    };
    Some(format!("\n{}\n", line))
}

impl<W: Write + Send> Session for ConsoleSession<W> {
    fn emit(&self, event: SessionEvent) {
        let Some(text) = render(&event, self.show_admin_traces) else {
            return;
        };
        let mut out = match self.out.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Err(e) = out.write_all(text.as_bytes()).and_then(|_| out.flush()) {
            tracing::warn!(error = %e, "failed to write to console");
        }
    }
}
