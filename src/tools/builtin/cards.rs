// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::{AgentError, Result};
use crate::llm::provider::ToolDefinition;
use crate::session::{Card, Session};
use crate::tools::{decode_as, HandlerResult, SchemaBuilder, Tool, ToolCall, ToolName};

#[derive(Debug, Deserialize)]
struct CardsArgs {
    cards: Vec<Card>,
}

/// Tool for presenting rich cards
pub struct SendCardsTool;

#[async_trait]
impl Tool for SendCardsTool {
    fn name(&self) -> ToolName {
        ToolName::SendCards
    }

    fn definition(&self) -> ToolDefinition {
        let card = SchemaBuilder::new()
            .string("title", "Card title", true)
            .string("description", "Body text", false)
            .string("image_url", "Image shown on the card", false)
            .string("url", "Link opened when the card is clicked", false);

        ToolDefinition {
            name: self.name().to_string(),
            description: "Show one or more rich cards with a title, description, image and link.".to_string(),
            parameters: SchemaBuilder::new()
                .object_array("cards", "Cards to show", card, true)
                .build(),
        }
    }

    async fn execute(&self, call: &ToolCall, session: &dyn Session) -> Result<HandlerResult> {
        let args: CardsArgs = decode_as(&call.arguments)?;
        if args.cards.is_empty() {
            return Err(AgentError::MalformedArguments("cards must not be empty".to_string()));
        }

        session.card_send(&args.cards);

        let titles: Vec<&str> = args.cards.iter().map(|c| c.title.as_str()).collect();
        Ok(HandlerResult::new(format!(
            "\n\n🃏 **Cards shared:** {}\n",
            titles.join(", ")
        )))
    }
}
