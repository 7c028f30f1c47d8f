// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Provider factory for creating LLM providers
//!
//! Providers are request-scoped: the chat engine asks the factory for a fresh
//! provider on every message so request variables (API keys) can differ.

use std::collections::HashMap;
use std::sync::Arc;

use crate::config::Settings;
use crate::error::{AgentError, Result};
use crate::llm::provider::LlmProvider;
use crate::llm::providers::OpenAiProvider;

/// Creates the provider used for one request
pub trait ProviderFactory: Send + Sync {
    /// Create a provider for a request carrying `variables`
    fn create(&self, variables: &HashMap<String, String>) -> Result<Arc<dyn LlmProvider>>;
}

/// Factory for OpenAI-compatible providers configured from settings
pub struct OpenAiProviderFactory {
    settings: Settings,
}

impl OpenAiProviderFactory {
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }
}

impl ProviderFactory for OpenAiProviderFactory {
    fn create(&self, variables: &HashMap<String, String>) -> Result<Arc<dyn LlmProvider>> {
        let api_key = self.settings.resolve_api_key(variables).ok_or_else(|| {
            AgentError::Config(format!(
                "No API key found. Set the {} request variable or environment variable.",
                self.settings.provider.api_key_env
            ))
        })?;

        Ok(Arc::new(OpenAiProvider::new(
            api_key,
            self.settings.provider.base_url.clone(),
        )))
    }
}

/// Factory that hands out one shared provider (tests and the demo command)
pub struct StaticProviderFactory {
    provider: Arc<dyn LlmProvider>,
}

impl StaticProviderFactory {
    pub fn new(provider: Arc<dyn LlmProvider>) -> Self {
        Self { provider }
    }
}

impl ProviderFactory for StaticProviderFactory {
    fn create(&self, _variables: &HashMap<String, String>) -> Result<Arc<dyn LlmProvider>> {
        Ok(Arc::clone(&self.provider))
    }
}
