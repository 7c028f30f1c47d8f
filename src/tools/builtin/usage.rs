// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

use async_trait::async_trait;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::Result;
use crate::llm::provider::ToolDefinition;
use crate::session::{Session, TokenType};
use crate::tools::{decode_as, HandlerResult, SchemaBuilder, Tool, ToolCall, ToolName};

#[derive(Debug, Default, Deserialize)]
struct UsageArgs {
    #[serde(default, deserialize_with = "lenient_tokens")]
    tokens: u64,
    #[serde(default, deserialize_with = "lenient_token_type")]
    token_type: TokenType,
    #[serde(default, deserialize_with = "lenient_cost")]
    cost: Option<f64>,
    #[serde(default)]
    label: Option<String>,
}

/// Any JSON number, rounded and clamped into `u64`; anything else counts as 0
fn lenient_tokens<'de, D>(deserializer: D) -> std::result::Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().map(token_count).unwrap_or(0))
}

fn token_count(value: &Value) -> u64 {
    if let Some(n) = value.as_u64() {
        return n;
    }
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match parsed {
        Some(n) if n.is_finite() => n.round().clamp(0.0, u64::MAX as f64) as u64,
        _ => {
            tracing::warn!(tokens = %value, "unusable token count, recording 0");
            0
        }
    }
}

/// Unknown token types fall back to `total`
fn lenient_token_type<'de, D>(deserializer: D) -> std::result::Result<TokenType, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .and_then(|v| serde_json::from_value(v).ok())
        .unwrap_or_default())
}

fn lenient_cost<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| v.as_f64()).filter(|c| c.is_finite()))
}

/// Tool for recording token usage; produces no visible text
pub struct TrackUsageTool;

#[async_trait]
impl Tool for TrackUsageTool {
    fn name(&self) -> ToolName {
        ToolName::TrackUsage
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: "Record token usage for billing or analytics.".to_string(),
            parameters: SchemaBuilder::new()
                .integer("tokens", "Number of tokens used", false)
                .string_enum(
                    "token_type",
                    "Which count this is (default: total)",
                    &["prompt", "completion", "total"],
                    false,
                )
                .number("cost", "Cost in USD", false)
                .string("label", "What the usage was for", false)
                .build(),
        }
    }

    async fn execute(&self, call: &ToolCall, session: &dyn Session) -> Result<HandlerResult> {
        // Usage tracking never fails the call; unreadable arguments record zero.
        let args: UsageArgs = decode_as(&call.arguments).unwrap_or_else(|e| {
            tracing::warn!(call_id = %call.id, error = %e, "unreadable usage arguments");
            UsageArgs::default()
        });
        tracing::debug!(tokens = args.tokens, token_type = ?args.token_type, "tracking usage");

        session.usage_track(args.tokens, args.token_type, args.cost, args.label.as_deref());
        Ok(HandlerResult::default())
    }
}
