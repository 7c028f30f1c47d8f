// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Conversation memory
//!
//! Turns are stored per thread id. The engine only ever reads the most
//! recent window, but stores keep the full history.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use crate::config::Settings;
use crate::error::{AgentError, Result};
use crate::llm::message::Turn;

const MAX_THREAD_ID_LEN: usize = 128;

/// Per-thread conversation storage
pub trait ConversationStore: Send + Sync {
    /// Full history of a thread, oldest first
    fn history(&self, thread_id: &str) -> Result<Vec<Turn>>;

    /// Record one turn at the end of a thread
    fn append(&self, thread_id: &str, turn: Turn) -> Result<()>;

    /// Forget a thread
    fn clear(&self, thread_id: &str) -> Result<()>;

    /// The last `limit` turns of a thread, oldest first
    fn recent(&self, thread_id: &str, limit: usize) -> Result<Vec<Turn>> {
        let mut turns = self.history(thread_id)?;
        let skip = turns.len().saturating_sub(limit);
        Ok(turns.split_off(skip))
    }
}

/// Process-local store; history grows without bound
#[derive(Debug, Default)]
pub struct InMemoryConversationStore {
    threads: Mutex<HashMap<String, Vec<Turn>>>,
}

impl InMemoryConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Vec<Turn>>> {
        match self.threads.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                tracing::warn!("conversation store lock was poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }

    /// Number of threads with at least one turn
    pub fn thread_count(&self) -> usize {
        self.lock().len()
    }
}

impl ConversationStore for InMemoryConversationStore {
    fn history(&self, thread_id: &str) -> Result<Vec<Turn>> {
        Ok(self.lock().get(thread_id).cloned().unwrap_or_default())
    }

    fn append(&self, thread_id: &str, turn: Turn) -> Result<()> {
        self.lock().entry(thread_id.to_string()).or_default().push(turn);
        Ok(())
    }

    fn clear(&self, thread_id: &str) -> Result<()> {
        self.lock().remove(thread_id);
        Ok(())
    }
}

/// One JSON file per thread
pub struct JsonFileConversationStore {
    dir: PathBuf,
    // Serializes read-modify-write of a thread file within this process.
    write_lock: Mutex<()>,
}

impl JsonFileConversationStore {
    /// Store under `$CHAT_RELAY_HOME/threads`
    pub fn open_default() -> Result<Self> {
        Self::open(Settings::home_dir().join("threads"))
    }

    /// Store under `dir`, creating it if needed
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            write_lock: Mutex::new(()),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn thread_path(&self, thread_id: &str) -> Result<PathBuf> {
        validate_thread_id(thread_id)?;
        Ok(self.dir.join(format!("{}.json", thread_id)))
    }

    fn read(path: &Path) -> Result<Vec<Turn>> {
        if !path.exists() {
            return Ok(Vec::new());
        }
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

impl ConversationStore for JsonFileConversationStore {
    fn history(&self, thread_id: &str) -> Result<Vec<Turn>> {
        Self::read(&self.thread_path(thread_id)?)
    }

    fn append(&self, thread_id: &str, turn: Turn) -> Result<()> {
        let path = self.thread_path(thread_id)?;
        let _guard = match self.write_lock.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        let mut turns = Self::read(&path)?;
        turns.push(turn);
        std::fs::write(&path, serde_json::to_string_pretty(&turns)?)?;
        tracing::debug!(thread_id, turns = turns.len(), path = %path.display(), "thread saved");
        Ok(())
    }

    fn clear(&self, thread_id: &str) -> Result<()> {
        let path = self.thread_path(thread_id)?;
        if path.exists() {
            std::fs::remove_file(&path)?;
        }
        Ok(())
    }
}

fn validate_thread_id(thread_id: &str) -> Result<()> {
    let valid = !thread_id.is_empty()
        && thread_id.len() <= MAX_THREAD_ID_LEN
        && thread_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(AgentError::InvalidInput(format!("invalid thread id: {:?}", thread_id)))
    }
}
