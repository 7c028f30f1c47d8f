// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Loading indicators
//!
//! [`LoadingIndicator`] is a scoped start/end pair: the end signal fires when
//! the value is dropped, which covers normal return, `?` propagation and
//! cancellation of the enclosing future. [`run_guarded`] adds a minimum
//! visible duration on top so fast operations do not make the indicator
//! flicker.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::Instant;

use super::Session;

/// Floor used by the media handlers unless configured otherwise
pub const DEFAULT_MIN_VISIBLE: Duration = Duration::from_millis(1500);

/// Named progress indicator shown by the client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadingKey {
    Thinking,
    Image,
    Video,
    Audio,
    Search,
    Code,
    Document,
}

impl LoadingKey {
    /// Every key, in display order
    pub const ALL: [LoadingKey; 7] = [
        LoadingKey::Thinking,
        LoadingKey::Image,
        LoadingKey::Video,
        LoadingKey::Audio,
        LoadingKey::Search,
        LoadingKey::Code,
        LoadingKey::Document,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LoadingKey::Thinking => "thinking",
            LoadingKey::Image => "image",
            LoadingKey::Video => "video",
            LoadingKey::Audio => "audio",
            LoadingKey::Search => "search",
            LoadingKey::Code => "code",
            LoadingKey::Document => "document",
        }
    }
}

impl fmt::Display for LoadingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Visible loading indicator; ends when dropped
pub struct LoadingIndicator<'a> {
    session: &'a dyn Session,
    key: LoadingKey,
}

impl<'a> LoadingIndicator<'a> {
    /// Signal loading started for `key`
    pub fn start(session: &'a dyn Session, key: LoadingKey) -> Self {
        session.loading_start(key);
        Self { session, key }
    }

    pub fn key(&self) -> LoadingKey {
        self.key
    }
}

impl Drop for LoadingIndicator<'_> {
    fn drop(&mut self) {
        self.session.loading_end(self.key);
    }
}

/// Run `operation` with the `key` indicator visible for at least `min_visible`.
///
/// The floor applies whether the operation succeeds or fails. If the
/// returned future is dropped early the indicator still ends.
pub async fn run_guarded<F, T>(
    session: &dyn Session,
    key: LoadingKey,
    min_visible: Duration,
    operation: F,
) -> T
where
    F: Future<Output = T>,
{
    let _indicator = LoadingIndicator::start(session, key);
    let started = Instant::now();

    let output = operation.await;

    let elapsed = started.elapsed();
    if elapsed < min_visible {
        tokio::time::sleep(min_visible - elapsed).await;
    }
    tracing::debug!(key = %key, elapsed_ms = elapsed.as_millis() as u64, "loading finished");

    output
}
