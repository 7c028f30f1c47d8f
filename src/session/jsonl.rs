// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! JSONL session
//!
//! Writes one JSON object per event so a desktop or web client can spawn the
//! agent as a subprocess and consume structured events from stdout.

use serde::Serialize;
use std::io::{self, Write};
use std::sync::Mutex;

use super::{Session, SessionEvent};

/// Envelope written for every event
#[derive(Debug, Serialize)]
struct Envelope<'a> {
    timestamp: i64,
    thread_id: &'a str,
    #[serde(flatten)]
    event: &'a SessionEvent,
}

/// Session that writes JSON lines
pub struct JsonlSession<W: Write + Send = io::Stdout> {
    thread_id: String,
    out: Mutex<W>,
}

impl JsonlSession<io::Stdout> {
    /// Write to stdout
    pub fn stdout(thread_id: impl Into<String>) -> Self {
        Self::new(thread_id, io::stdout())
    }
}

impl<W: Write + Send> JsonlSession<W> {
    pub fn new(thread_id: impl Into<String>, out: W) -> Self {
        Self {
            thread_id: thread_id.into(),
            out: Mutex::new(out),
        }
    }

    /// Consume the session and return the writer
    pub fn into_inner(self) -> W {
        match self.out.into_inner() {
            Ok(out) => out,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn write_event(&self, event: &SessionEvent) -> io::Result<()> {
        let envelope = Envelope {
            timestamp: chrono::Utc::now().timestamp_millis(),
            thread_id: &self.thread_id,
            event,
        };
        let json = serde_json::to_string(&envelope)?;

        let mut out = match self.out.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        writeln!(out, "{}", json)?;
        out.flush()
    }
}

impl<W: Write + Send> Session for JsonlSession<W> {
    fn emit(&self, event: SessionEvent) {
        if let Err(e) = self.write_event(&event) {
            tracing::warn!(error = %e, "failed to write session event");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::LoadingKey;

    #[test]
    fn test_writes_one_line_per_event() {
        let session = JsonlSession::new("thread-1", Vec::new());
        session.stream("hi");
        session.loading_start(LoadingKey::Thinking);

        let out = String::from_utf8(session.into_inner()).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["type"], "text");
        assert_eq!(first["text"], "hi");
        assert_eq!(first["thread_id"], "thread-1");
        assert!(first["timestamp"].as_i64().unwrap() > 0);

        let second: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(second["type"], "loading_start");
        assert_eq!(second["key"], "thinking");
    }
}
