// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! CLI argument definitions using Clap

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// chat-relay - streaming chat agent with rich UI tools
#[derive(Parser, Debug)]
#[command(name = "chat-relay")]
#[command(version, about = "Streaming chat agent with rich UI tools")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Settings file path (defaults to $CHAT_RELAY_HOME/settings.json)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output format
    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Send one message to the model
    Ask(AskArgs),

    /// List the tools offered to the model
    Tools,

    /// Replay scripted tool calls without a model
    Demo(DemoArgs),

    /// Show or clear a stored conversation
    History(HistoryArgs),
}

/// Output format options
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text
    #[default]
    Text,
    /// One JSON object per event
    Json,
}

/// Arguments for ask command
#[derive(clap::Args, Debug)]
pub struct AskArgs {
    /// The message to send
    pub message: String,

    /// Conversation thread to continue
    #[arg(short, long, default_value = "default")]
    pub thread: String,

    /// Model to use
    #[arg(short, long)]
    pub model: Option<String>,

    /// Also show admin-only traces
    #[arg(long)]
    pub admin_traces: bool,
}

/// Arguments for demo command
#[derive(clap::Args, Debug)]
pub struct DemoArgs {
    /// Tool to demonstrate (all tools when omitted)
    pub tool: Option<String>,

    /// Skip loading-indicator delays
    #[arg(long)]
    pub fast: bool,
}

/// Arguments for history command
#[derive(clap::Args, Debug)]
pub struct HistoryArgs {
    /// Thread id
    pub thread: String,

    /// Delete the thread instead of printing it
    #[arg(long)]
    pub clear: bool,
}
