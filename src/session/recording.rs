// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

use std::sync::{Arc, Mutex, MutexGuard};

use super::{CompletedResponse, Session, SessionEvent};

/// Session that records every event in memory
#[derive(Debug, Clone, Default)]
pub struct RecordingSession {
    events: Arc<Mutex<Vec<SessionEvent>>>,
}

impl RecordingSession {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<SessionEvent>> {
        match self.events.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                tracing::warn!("Recording session lock was poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }

    /// Snapshot of all events so far
    pub fn events(&self) -> Vec<SessionEvent> {
        self.lock().clone()
    }

    /// Number of events so far
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// All streamed text concatenated
    pub fn streamed_text(&self) -> String {
        self.lock()
            .iter()
            .filter_map(|e| match e {
                SessionEvent::Text { text } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// The final response, if the request completed
    pub fn completed(&self) -> Option<CompletedResponse> {
        self.lock().iter().find_map(|e| match e {
            SessionEvent::Complete { response } => Some(response.clone()),
            _ => None,
        })
    }

    /// Error notices sent to the client
    pub fn errors(&self) -> Vec<String> {
        self.lock()
            .iter()
            .filter_map(|e| match e {
                SessionEvent::Error { message } => Some(message.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }
}

impl Session for RecordingSession {
    fn emit(&self, event: SessionEvent) {
        self.lock().push(event);
    }
}
