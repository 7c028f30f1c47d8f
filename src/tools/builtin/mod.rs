// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Built-in tools for chat-relay

mod audio;
mod buttons;
mod cards;
mod demo;
mod image;
mod location;
mod trace;
mod usage;
mod video;

pub use audio::SendAudioTool;
pub use buttons::SendButtonsTool;
pub use cards::SendCardsTool;
pub use demo::{CompleteStreamingExampleTool, TestLoadingStatesTool};
pub use image::{GenerateImageTool, ImageGenerator, ImageOptions, PlaceholderImageGenerator};
pub use location::SendLocationTool;
pub use trace::SendTraceTool;
pub use usage::TrackUsageTool;
pub use video::SendVideoTool;

use std::time::Duration;

use crate::config::ToolsConfig;

/// Loading-indicator timing shared by the media tools
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    /// Minimum time a loading indicator stays visible
    pub min_visible: Duration,
    /// Stand-in for real backend work
    pub simulated_latency: Duration,
}

impl Timing {
    pub fn from_config(config: &ToolsConfig) -> Self {
        Self {
            min_visible: config.min_loading(),
            simulated_latency: config.simulated_latency(),
        }
    }

    /// No floor and no latency
    pub fn instant() -> Self {
        Self {
            min_visible: Duration::ZERO,
            simulated_latency: Duration::ZERO,
        }
    }

    async fn simulate_work(&self) {
        if !self.simulated_latency.is_zero() {
            tokio::time::sleep(self.simulated_latency).await;
        }
    }
}

impl Default for Timing {
    fn default() -> Self {
        Self::from_config(&ToolsConfig::default())
    }
}
