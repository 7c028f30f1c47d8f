// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::{AgentError, Result};
use crate::llm::provider::ToolDefinition;
use crate::session::Session;
use crate::tools::{decode_as, HandlerResult, SchemaBuilder, Tool, ToolCall, ToolName};

#[derive(Debug, Deserialize)]
struct LocationArgs {
    lat: f64,
    lng: f64,
    #[serde(default)]
    label: Option<String>,
}

/// Tool for showing a point on a map
pub struct SendLocationTool;

#[async_trait]
impl Tool for SendLocationTool {
    fn name(&self) -> ToolName {
        ToolName::SendLocation
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: "Show a location on a map using latitude and longitude.".to_string(),
            parameters: SchemaBuilder::new()
                .number("lat", "Latitude in degrees (-90 to 90)", true)
                .number("lng", "Longitude in degrees (-180 to 180)", true)
                .string("label", "Name of the place", false)
                .build(),
        }
    }

    async fn execute(&self, call: &ToolCall, session: &dyn Session) -> Result<HandlerResult> {
        let args: LocationArgs = decode_as(&call.arguments)?;

        if !(-90.0..=90.0).contains(&args.lat) {
            return Err(AgentError::InvalidInput(format!("latitude {} out of range", args.lat)));
        }
        if !(-180.0..=180.0).contains(&args.lng) {
            return Err(AgentError::InvalidInput(format!("longitude {} out of range", args.lng)));
        }

        session.location_send_coordinates(args.lat, args.lng);

        let message = match args.label {
            Some(label) => format!("\n\n📍 **Location shared:** {} ({}, {})\n", label, args.lat, args.lng),
            None => format!("\n\n📍 **Location shared:** {}, {}\n", args.lat, args.lng),
        };
        Ok(HandlerResult::new(message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{RecordingSession, SessionEvent};

    #[tokio::test]
    async fn test_sends_coordinates() {
        let session = RecordingSession::new();
        let call = ToolCall::new("c1", "send_location", r#"{"lat":40.7,"lng":-74.0,"label":"NYC"}"#);

        let result = SendLocationTool.execute(&call, &session).await.unwrap();

        assert!(result.message.contains("NYC"));
        assert!(result.artifact_url.is_none());
        assert_eq!(session.events(), vec![SessionEvent::Location { lat: 40.7, lng: -74.0 }]);
    }

    #[tokio::test]
    async fn test_out_of_range() {
        let session = RecordingSession::new();
        let call = ToolCall::new("c1", "send_location", r#"{"lat":95.0,"lng":0.0}"#);

        let result = SendLocationTool.handle(&call, &session).await;
        assert!(result.message.contains("Function Execution Error"));
        assert!(result.message.contains("latitude"));
        assert!(session.is_empty());
    }

    #[tokio::test]
    async fn test_non_numeric() {
        let session = RecordingSession::new();
        let call = ToolCall::new("c1", "send_location", r#"{"lat":"north","lng":0}"#);

        let result = SendLocationTool.handle(&call, &session).await;
        assert!(result.message.contains("Invalid Arguments"));
    }
}
