// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Image generation tool
//!
//! The actual generation backend sits behind [`ImageGenerator`]. The default
//! [`PlaceholderImageGenerator`] returns a fixed URL after an optional delay.

use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

use super::Timing;
use crate::error::{AgentError, Result};
use crate::llm::provider::ToolDefinition;
use crate::session::{run_guarded, LoadingKey, Session};
use crate::tools::{decode_as, HandlerResult, SchemaBuilder, Tool, ToolCall, ToolName};

pub const SIZES: [&str; 3] = ["1024x1024", "1792x1024", "1024x1792"];
pub const QUALITIES: [&str; 2] = ["standard", "hd"];
pub const STYLES: [&str; 2] = ["vivid", "natural"];

/// Options forwarded to the generator
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ImageOptions {
    #[serde(default = "default_size")]
    pub size: String,
    #[serde(default = "default_quality")]
    pub quality: String,
    #[serde(default = "default_style")]
    pub style: String,
}

impl Default for ImageOptions {
    fn default() -> Self {
        Self {
            size: default_size(),
            quality: default_quality(),
            style: default_style(),
        }
    }
}

fn default_size() -> String {
    SIZES[0].to_string()
}

fn default_quality() -> String {
    QUALITIES[0].to_string()
}

fn default_style() -> String {
    STYLES[0].to_string()
}

/// Backend that turns a prompt into an image URL
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    async fn generate(&self, prompt: &str, options: &ImageOptions) -> Result<String>;
}

/// Generator that always returns the same image
pub struct PlaceholderImageGenerator {
    url: String,
    latency: Duration,
}

impl PlaceholderImageGenerator {
    pub fn new(url: impl Into<String>, latency: Duration) -> Self {
        Self {
            url: url.into(),
            latency,
        }
    }
}

#[async_trait]
impl ImageGenerator for PlaceholderImageGenerator {
    async fn generate(&self, prompt: &str, options: &ImageOptions) -> Result<String> {
        tracing::debug!(prompt, size = %options.size, "generating placeholder image");
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        Ok(self.url.clone())
    }
}

#[derive(Debug, Deserialize)]
struct ImageArgs {
    prompt: String,
    #[serde(flatten)]
    options: ImageOptions,
}

/// Tool for generating an image from a prompt
pub struct GenerateImageTool {
    generator: Arc<dyn ImageGenerator>,
    timing: Timing,
}

impl GenerateImageTool {
    pub fn new(generator: Arc<dyn ImageGenerator>, timing: Timing) -> Self {
        Self { generator, timing }
    }
}

#[async_trait]
impl Tool for GenerateImageTool {
    fn name(&self) -> ToolName {
        ToolName::GenerateImage
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: "Generate an image from a text description and show it to the user.".to_string(),
            parameters: SchemaBuilder::new()
                .string("prompt", "Detailed description of the image to generate", true)
                .string_enum("size", "Image dimensions (default: 1024x1024)", &SIZES, false)
                .string_enum("quality", "Image quality (default: standard)", &QUALITIES, false)
                .string_enum("style", "Visual style (default: vivid)", &STYLES, false)
                .build(),
        }
    }

    async fn execute(&self, call: &ToolCall, session: &dyn Session) -> Result<HandlerResult> {
        let args: ImageArgs = decode_as(&call.arguments)?;
        if args.prompt.trim().is_empty() {
            return Err(AgentError::MalformedArguments("prompt must not be empty".to_string()));
        }

        tracing::info!(
            prompt = %args.prompt,
            size = %args.options.size,
            quality = %args.options.quality,
            style = %args.options.style,
            "generating image"
        );

        session.stream("\n🚀 **Executing function:** generate_image");
        let url = run_guarded(
            session,
            LoadingKey::Image,
            self.timing.min_visible,
            self.generator.generate(&args.prompt, &args.options),
        )
        .await?;

        session.image_send(&url);
        session.stream("\n✅ **Function completed successfully:** generate_image");

        let message = format!(
            "\n\n🎨 **Image Generated Successfully!**\n\nPrompt: {}\nImage URL: {}\n",
            args.prompt, url
        );
        Ok(HandlerResult::new(message).with_artifact(url))
    }
}
