// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Interactive button tool
//!
//! Buttons are sent as one group bracketed by begin/end. Link buttons use
//! `url` and action buttons use `id`; both fall back to `value`. Entries
//! with neither are skipped.

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::Result;
use crate::llm::provider::ToolDefinition;
use crate::session::Session;
use crate::tools::{decode_as, HandlerResult, SchemaBuilder, Tool, ToolCall, ToolName};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
enum ButtonKind {
    Link,
    Action,
}

#[derive(Debug, Deserialize)]
struct ButtonSpec {
    label: String,
    #[serde(default, rename = "type")]
    kind: Option<ButtonKind>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    value: Option<String>,
    #[serde(default)]
    row: Option<u32>,
    #[serde(default)]
    color: Option<String>,
}

impl ButtonSpec {
    /// Explicit type, else link when a url is present
    fn kind(&self) -> ButtonKind {
        self.kind.unwrap_or(if self.url.is_some() {
            ButtonKind::Link
        } else {
            ButtonKind::Action
        })
    }

    fn link_url(&self) -> Option<&str> {
        self.url.as_deref().or(self.value.as_deref())
    }

    fn action_id(&self) -> Option<&str> {
        self.id.as_deref().or(self.value.as_deref())
    }
}

#[derive(Debug, Deserialize)]
struct ButtonsArgs {
    #[serde(default)]
    buttons: Vec<ButtonSpec>,
}

/// Tool for presenting link and action buttons
pub struct SendButtonsTool;

#[async_trait]
impl Tool for SendButtonsTool {
    fn name(&self) -> ToolName {
        ToolName::SendButtons
    }

    fn definition(&self) -> ToolDefinition {
        let button = SchemaBuilder::new()
            .string("label", "Button text", true)
            .string_enum("type", "link opens a url, action sends an id back", &["link", "action"], false)
            .string("url", "Target for link buttons", false)
            .string("id", "Identifier for action buttons", false)
            .string("value", "Fallback for url or id", false)
            .integer("row", "Row to place the button on", false)
            .string("color", "Button color", false);

        ToolDefinition {
            name: self.name().to_string(),
            description: "Show a group of interactive buttons. Link buttons open a url; action buttons send their id back.".to_string(),
            parameters: SchemaBuilder::new()
                .object_array("buttons", "Buttons to show, in order", button, true)
                .build(),
        }
    }

    async fn execute(&self, call: &ToolCall, session: &dyn Session) -> Result<HandlerResult> {
        let args: ButtonsArgs = decode_as(&call.arguments)?;
        if args.buttons.is_empty() {
            return Ok(HandlerResult::new("\n\n🔘 **Buttons:** none provided\n"));
        }

        let mut added = 0usize;
        let mut skipped = 0usize;

        session.button_begin();
        for button in &args.buttons {
            let color = button.color.as_deref();
            match (button.kind(), button.link_url(), button.action_id()) {
                (ButtonKind::Link, Some(url), _) => {
                    session.button_add_link(&button.label, url, button.row, color);
                    added += 1;
                }
                (ButtonKind::Action, _, Some(id)) => {
                    session.button_add_action(&button.label, id, button.row, color);
                    added += 1;
                }
                (kind, _, _) => {
                    tracing::warn!(label = %button.label, ?kind, "skipping button without identifier");
                    skipped += 1;
                }
            }
        }
        session.button_end();

        let message = if skipped == 0 {
            format!("\n\n🔘 **Buttons sent:** {}\n", added)
        } else {
            format!("\n\n🔘 **Buttons sent:** {} ({} skipped)\n", added, skipped)
        };
        Ok(HandlerResult::new(message))
    }
}
