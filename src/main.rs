// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! chat-relay - streaming chat agent with rich UI tools
//!
//! Entry point for the chat-relay CLI application.

use clap::Parser;

use chat_relay::cli::{Cli, Commands};
use chat_relay::config::Settings;
use chat_relay::error::Result;

#[path = "main/cli_commands.rs"]
mod cli_commands;
#[path = "main/demo.rs"]
mod demo;

use cli_commands::{run_ask, run_history, run_tools};
use demo::run_demo;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so `--format json` output on stdout stays parseable.
    let mut env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing::Level::WARN.into());

    // `-v` enables crate diagnostics without knowing target names;
    // `-vv` goes down to trace. `RUST_LOG` still applies.
    let directives: &[&str] = match cli.verbose {
        0 => &[],
        1 => &["chat_relay=debug"],
        _ => &["chat_relay=trace"],
    };
    for directive in directives {
        if let Ok(parsed) = directive.parse() {
            env_filter = env_filter.add_directive(parsed);
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let settings = match &cli.config {
        Some(path) => Settings::load_from(path)?,
        None => Settings::load()?,
    };

    match cli.command {
        Commands::Ask(args) => run_ask(args, settings, cli.format).await,
        Commands::Tools => run_tools(&settings, cli.format),
        Commands::Demo(args) => run_demo(args, settings, cli.format).await,
        Commands::History(args) => run_history(args, cli.format),
    }
}
