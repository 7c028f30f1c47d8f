// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Chat message processing
//!
//! [`ChatEngine`] drives one message through the provider stream, the tool
//! dispatcher and conversation memory.

pub mod dispatch;
pub mod engine;
pub mod memory;
pub mod streaming;

pub use dispatch::{DispatchOutcome, Dispatcher};
pub use engine::{ChatEngine, ChatRequest};
pub use memory::{ConversationStore, InMemoryConversationStore, JsonFileConversationStore};
pub use streaming::{ResponseAccumulator, StreamOutput, StreamedResponse, ToolCallAccumulator};
