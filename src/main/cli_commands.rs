// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

use std::sync::Arc;

use chat_relay::chat::{ChatEngine, ChatRequest, ConversationStore, JsonFileConversationStore};
use chat_relay::cli::{AskArgs, HistoryArgs, OutputFormat};
use chat_relay::config::Settings;
use chat_relay::error::Result;
use chat_relay::llm::factory::OpenAiProviderFactory;
use chat_relay::session::{ConsoleSession, JsonlSession, Session};
use chat_relay::tools::ToolRegistry;

/// Session matching the requested output format
pub(super) fn make_session(format: OutputFormat, thread_id: &str, admin_traces: bool) -> Box<dyn Session> {
    match format {
        OutputFormat::Text => Box::new(ConsoleSession::stdout().with_admin_traces(admin_traces)),
        OutputFormat::Json => Box::new(JsonlSession::stdout(thread_id)),
    }
}

/// Run one message against the configured provider
pub(super) async fn run_ask(args: AskArgs, settings: Settings, format: OutputFormat) -> Result<()> {
    let store = Arc::new(JsonFileConversationStore::open_default()?);
    let providers = Arc::new(OpenAiProviderFactory::new(settings.clone()));
    let engine = ChatEngine::new(&settings, providers, store);

    let mut request = ChatRequest::new(&args.thread, &args.message);
    if let Some(model) = args.model {
        request = request.with_model(model);
    }

    let session = make_session(format, &args.thread, args.admin_traces);
    engine.process_message(&request, session.as_ref()).await?;

    if format == OutputFormat::Text {
        println!();
    }
    Ok(())
}

/// Print the tool catalog
pub(super) fn run_tools(settings: &Settings, format: OutputFormat) -> Result<()> {
    let registry = ToolRegistry::with_builtins(&settings.tools);

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&registry.wire_definitions())?);
        }
        OutputFormat::Text => {
            for definition in registry.definitions() {
                println!("{:<28} {}", definition.name, definition.description);
            }
        }
    }
    Ok(())
}

/// Print or clear a stored thread
pub(super) fn run_history(args: HistoryArgs, format: OutputFormat) -> Result<()> {
    let store = JsonFileConversationStore::open_default()?;

    if args.clear {
        store.clear(&args.thread)?;
        println!("Cleared thread {}", args.thread);
        return Ok(());
    }

    let turns = store.history(&args.thread)?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&turns)?),
        OutputFormat::Text => {
            if turns.is_empty() {
                println!("No turns stored for thread {}", args.thread);
            }
            for turn in turns {
                println!(
                    "[{}] {}",
                    turn.timestamp.format("%Y-%m-%d %H:%M:%S"),
                    turn.role.as_str()
                );
                println!("{}\n", turn.content);
            }
        }
    }
    Ok(())
}
