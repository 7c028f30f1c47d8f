// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::Result;
use crate::llm::provider::ToolDefinition;
use crate::session::{Session, TraceVisibility};
use crate::tools::{decode_as, HandlerResult, SchemaBuilder, Tool, ToolCall, ToolName};

#[derive(Debug, Deserialize)]
struct TraceArgs {
    content: String,
    #[serde(default)]
    visibility: TraceVisibility,
}

/// Tool for sending debug traces to the client
pub struct SendTraceTool;

#[async_trait]
impl Tool for SendTraceTool {
    fn name(&self) -> ToolName {
        ToolName::SendTrace
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: "Send a debug trace. Admin traces are only shown to administrators.".to_string(),
            parameters: SchemaBuilder::new()
                .string("content", "Trace text", true)
                .string_enum("visibility", "Who can see the trace (default: all)", &["all", "admin"], false)
                .build(),
        }
    }

    async fn execute(&self, call: &ToolCall, session: &dyn Session) -> Result<HandlerResult> {
        let args: TraceArgs = decode_as(&call.arguments)?;

        session.trace_send(&args.content, args.visibility);

        let audience = match args.visibility {
            TraceVisibility::All => "all",
            TraceVisibility::Admin => "admin",
        };
        Ok(HandlerResult::new(format!("\n\n🔍 **Trace sent** ({})\n", audience)))
    }
}
