//! Renderer configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::card::theme::Theme;
use crate::foundation::core::Canvas;

/// What to do when the avatar exists but cannot be streamed or decoded.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum AvatarErrorPolicy {
    /// Log a warning and render the card without an avatar.
    #[default]
    Degrade,
    /// Fail the whole request.
    Propagate,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvatarConfig {
    /// Largest blob accepted, in bytes.
    #[serde(default = "default_max_avatar_bytes")]
    pub max_bytes: usize,
    /// Longest side of the embedded avatar, in pixels (0 disables downscaling).
    #[serde(default = "default_max_avatar_px")]
    pub max_px: u32,
    #[serde(default)]
    pub on_error: AvatarErrorPolicy,
}

fn default_max_avatar_bytes() -> usize {
    8 * 1024 * 1024
}

fn default_max_avatar_px() -> u32 {
    512
}

impl Default for AvatarConfig {
    fn default() -> Self {
        Self {
            max_bytes: default_max_avatar_bytes(),
            max_px: default_max_avatar_px(),
            on_error: AvatarErrorPolicy::default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RendererConfig {
    #[serde(default)]
    pub canvas: Canvas,
    /// Upper bound for one thumbnail request, lookup to PNG.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    #[serde(default)]
    pub avatar: AvatarConfig,
    #[serde(default)]
    pub theme: Theme,
}

fn default_request_timeout_ms() -> u64 {
    10_000
}

impl RendererConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            canvas: Canvas::default(),
            request_timeout_ms: default_request_timeout_ms(),
            avatar: AvatarConfig::default(),
            theme: Theme::default(),
        }
    }
}
