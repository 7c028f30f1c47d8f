// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Settings management for chat-relay
//!
//! Handles loading and saving settings from ~/.chat-relay/settings.json

use serde::{Deserialize, Serialize};
use std::time::Duration;

mod io;
mod validation;

/// Main settings structure, stored in ~/.chat-relay/settings.json
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    /// Chat-completion provider configuration
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Conversation memory and prompt settings
    #[serde(default)]
    pub conversation: ConversationConfig,

    /// Tool handler settings
    #[serde(default)]
    pub tools: ToolsConfig,
}

/// OpenAI-compatible provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// API key (if stored directly, not recommended)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Environment variable (and request variable) name for the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Chat-completions endpoint
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Model used when the request does not name one
    #[serde(default = "default_model")]
    pub default_model: String,

    /// Maximum tokens in a response
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

/// Conversation memory and prompt configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationConfig {
    /// Number of most recent turns sent to the model
    #[serde(default = "default_history_window")]
    pub history_window: usize,

    /// System prompt prepended to every request
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
}

/// Tool handler configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsConfig {
    /// Minimum time a loading indicator stays visible (milliseconds)
    #[serde(default = "default_min_loading_ms")]
    pub min_loading_ms: u64,

    /// Simulated work time for the stubbed media handlers (milliseconds)
    #[serde(default = "default_simulated_latency_ms")]
    pub simulated_latency_ms: u64,

    /// URL returned by the placeholder image generator
    #[serde(default = "default_placeholder_image_url")]
    pub placeholder_image_url: String,
}

impl ToolsConfig {
    /// Loading-indicator floor as a duration
    pub fn min_loading(&self) -> Duration {
        Duration::from_millis(self.min_loading_ms)
    }

    /// Simulated handler latency as a duration
    pub fn simulated_latency(&self) -> Duration {
        Duration::from_millis(self.simulated_latency_ms)
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_key_env: default_api_key_env(),
            base_url: default_base_url(),
            default_model: default_model(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
        }
    }
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            history_window: default_history_window(),
            system_prompt: default_system_prompt(),
        }
    }
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            min_loading_ms: default_min_loading_ms(),
            simulated_latency_ms: default_simulated_latency_ms(),
            placeholder_image_url: default_placeholder_image_url(),
        }
    }
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

fn default_base_url() -> String {
    "https://api.openai.com/v1/chat/completions".to_string()
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_max_tokens() -> u32 {
    1000
}

fn default_temperature() -> f32 {
    0.7
}

fn default_history_window() -> usize {
    10
}

fn default_system_prompt() -> String {
    "You are a helpful AI assistant. You can generate demo images, send videos, audio, \
     locations, buttons and cards using the available functions. Use generate_image to \
     return a demo image URL when the user asks for a picture."
        .to_string()
}

fn default_min_loading_ms() -> u64 {
    1500
}

fn default_simulated_latency_ms() -> u64 {
    0
}

fn default_placeholder_image_url() -> String {
    "https://placehold.co/1024x1024/png?text=chat-relay+demo".to_string()
}
