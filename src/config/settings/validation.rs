// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

use std::collections::HashMap;

use crate::error::{AgentError, Result};

use super::Settings;

impl Settings {
    /// Resolve the API key for a request.
    ///
    /// Priority: request variables > env var > config file.
    pub fn resolve_api_key(&self, variables: &HashMap<String, String>) -> Option<String> {
        let env_name = &self.provider.api_key_env;
        variables
            .get(env_name)
            .filter(|v| !v.trim().is_empty())
            .cloned()
            .or_else(|| std::env::var(env_name).ok().filter(|v| !v.is_empty()))
            .or_else(|| self.provider.api_key.clone())
    }

    /// Reject settings that cannot drive a request.
    pub fn validate(&self) -> Result<()> {
        if self.conversation.history_window == 0 {
            return Err(AgentError::Config(
                "conversation.history_window must be at least 1".to_string(),
            ));
        }
        if self.provider.max_tokens == 0 {
            return Err(AgentError::Config(
                "provider.max_tokens must be at least 1".to_string(),
            ));
        }
        if !(0.0..=2.0).contains(&self.provider.temperature) {
            return Err(AgentError::Config(format!(
                "provider.temperature must be between 0 and 2 (got {})",
                self.provider.temperature
            )));
        }
        if self.provider.base_url.trim().is_empty() {
            return Err(AgentError::Config(
                "provider.base_url must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
