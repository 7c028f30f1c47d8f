// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Tool argument decoding
//!
//! The model sends arguments as a JSON text that may be empty or truncated.
//! Decoding never panics: anything that is not a JSON object (or empty)
//! becomes [`AgentError::MalformedArguments`].

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::{AgentError, Result};

/// Decode raw argument text into a key/value map.
///
/// Empty or whitespace-only input is an empty map.
pub fn decode(raw: &str) -> Result<Map<String, Value>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(Map::new());
    }

    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(AgentError::MalformedArguments(format!(
            "expected a JSON object, got {}",
            json_kind(&other)
        ))),
        Err(e) => Err(AgentError::MalformedArguments(e.to_string())),
    }
}

/// Decode raw argument text into a typed argument struct
pub fn decode_as<T: DeserializeOwned>(raw: &str) -> Result<T> {
    let map = decode(raw)?;
    serde_json::from_value(Value::Object(map)).map_err(|e| AgentError::MalformedArguments(e.to_string()))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
