// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! chat-relay - streaming chat agent with rich UI tools.
//!
//! A user message goes to an OpenAI-compatible model together with a fixed
//! catalog of UI tools. Text is streamed to the client as it arrives, tool
//! calls are reassembled from their fragments and dispatched in order, and
//! the combined reply is stored as a conversation turn.
//!
//! Module map:
//! - `chat`: engine, stream accumulation, dispatch and conversation memory
//! - `tools`: tool catalog, argument decoding and the built-in handlers
//! - `session`: the client-facing event sink and loading-indicator guard
//! - `llm`: provider abstraction with an OpenAI-compatible implementation
//! - `config`, `cli`, `error`: settings file, argument parsing and errors

pub mod chat;
pub mod cli;
pub mod config;
pub mod error;
pub mod llm;
pub mod session;
pub mod tools;

pub use error::{AgentError, Result};
