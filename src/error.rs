// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Error types for chat-relay
//!
//! Tool failures are recovered per call and turned into inline response text;
//! only upstream and configuration failures ever reach the caller.

use thiserror::Error;

/// Main error type for chat-relay operations
#[derive(Error, Debug)]
pub enum AgentError {
    /// API-related errors
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Tool arguments are not well-formed structured data
    #[error("Malformed arguments: {0}")]
    MalformedArguments(String),

    /// Tool name has no registered handler
    #[error("Unknown function: {0}")]
    UnknownTool(String),

    /// Tool execution errors
    #[error("Tool execution failed: {0}")]
    ToolExecution(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// API-specific error types
#[derive(Error, Debug)]
pub enum ApiError {
    /// Authentication failed (invalid API key)
    #[error("Authentication failed: invalid API key")]
    AuthenticationFailed,

    /// Rate limited by the API
    #[error("Rate limited: retry after {0} seconds")]
    RateLimited(u32),

    /// Requested model not found
    #[error("Model not found: {0}")]
    ModelNotFound(String),

    /// API returned an error
    #[error("API error ({status}): {message}")]
    ServerError { status: u16, message: String },

    /// Invalid response from API
    #[error("Invalid API response: {0}")]
    InvalidResponse(String),

    /// The provider connection failed mid-stream
    #[error("Streaming error: {0}")]
    StreamError(String),
}

impl AgentError {
    /// Whether this error came from the upstream model stream
    pub fn is_upstream(&self) -> bool {
        matches!(self, AgentError::Api(_) | AgentError::Http(_))
    }
}

/// Result type alias for chat-relay operations
pub type Result<T> = std::result::Result<T, AgentError>;
