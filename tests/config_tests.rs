// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

use std::collections::HashMap;

use chat_relay::config::Settings;
use chat_relay::AgentError;
use tempfile::TempDir;

#[test]
fn test_settings_default_values() {
    let settings = Settings::default();

    assert_eq!(settings.provider.api_key_env, "OPENAI_API_KEY");
    assert_eq!(settings.provider.default_model, "gpt-4o-mini");
    assert_eq!(settings.conversation.history_window, 10);
    assert_eq!(settings.tools.min_loading_ms, 1500);
    assert!(settings.provider.api_key.is_none());
}

#[test]
fn test_settings_partial_file_uses_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("settings.json");
    std::fs::write(
        &path,
        r#"{"provider":{"default_model":"gpt-4o"},"tools":{"min_loading_ms":0}}"#,
    )
    .unwrap();

    let settings = Settings::load_from(&path).unwrap();
    assert_eq!(settings.provider.default_model, "gpt-4o");
    assert_eq!(settings.provider.max_tokens, Settings::default().provider.max_tokens);
    assert_eq!(settings.tools.min_loading_ms, 0);
    assert_eq!(settings.conversation.history_window, 10);
}

#[test]
fn test_settings_roundtrip_through_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("settings.json");

    let mut settings = Settings::default();
    settings.conversation.system_prompt = "Answer in haiku.".to_string();
    settings.save_to(&path).unwrap();

    let loaded = Settings::load_from(&path).unwrap();
    assert_eq!(loaded.conversation.system_prompt, "Answer in haiku.");
}

#[test]
fn test_settings_invalid_file_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("settings.json");
    std::fs::write(&path, r#"{"conversation":{"history_window":0}}"#).unwrap();

    let err = Settings::load_from(&path).unwrap_err();
    assert!(matches!(err, AgentError::Config(_)));
}

#[test]
fn test_api_key_request_variable_wins() {
    let mut settings = Settings::default();
    settings.provider.api_key_env = "CHAT_RELAY_CONFIG_TEST_KEY_UNSET".to_string();
    settings.provider.api_key = Some("from-config".to_string());

    assert_eq!(
        settings.resolve_api_key(&HashMap::new()).as_deref(),
        Some("from-config")
    );

    let mut variables = HashMap::new();
    variables.insert(
        "CHAT_RELAY_CONFIG_TEST_KEY_UNSET".to_string(),
        "from-request".to_string(),
    );
    assert_eq!(
        settings.resolve_api_key(&variables).as_deref(),
        Some("from-request")
    );
}
