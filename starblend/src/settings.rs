//! Persisted user settings.

use std::path::Path;

use anyhow::{Context, Result};
use common::FileFormat;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter};
use tracing::{debug, warn};

use crate::composite::EngineConfig;

/// Preview frame size in landscape orientation.
#[derive(
    Debug, Display, EnumIter, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize,
)]
pub enum PreviewSize {
    #[strum(to_string = "640x480")]
    #[serde(rename = "640x480")]
    Small,
    #[default]
    #[strum(to_string = "800x600")]
    #[serde(rename = "800x600")]
    Medium,
    #[strum(to_string = "1024x768")]
    #[serde(rename = "1024x768")]
    Large,
    #[strum(to_string = "1200x900")]
    #[serde(rename = "1200x900")]
    ExtraLarge,
}

impl PreviewSize {
    /// `(width, height)` in landscape orientation.
    pub fn dimensions(self) -> (usize, usize) {
        match self {
            PreviewSize::Small => (640, 480),
            PreviewSize::Medium => (800, 600),
            PreviewSize::Large => (1024, 768),
            PreviewSize::ExtraLarge => (1200, 900),
        }
    }
}

#[derive(
    Debug, Display, EnumIter, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum PreviewOrientation {
    #[default]
    Landscape,
    Portrait,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewSettings {
    pub size: PreviewSize,
    pub orientation: PreviewOrientation,
}

impl PreviewSettings {
    /// Viewport `(width, height)`; portrait swaps the axes.
    pub fn viewport(&self) -> (usize, usize) {
        let (width, height) = self.size.dimensions();
        match self.orientation {
            PreviewOrientation::Landscape => (width, height),
            PreviewOrientation::Portrait => (height, width),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub engine: EngineConfig,
    pub preview: PreviewSettings,
}

impl Settings {
    /// Reads settings from a `.yaml`/`.yml` or `.json` file.
    pub fn load(path: &Path) -> Result<Self> {
        let format = FileFormat::from_path(path)?;
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {}", path.display()))?;
        common::serde::deserialize(&text, format)
            .with_context(|| format!("Failed to parse settings in {}", path.display()))
    }

    /// Like [`load`](Self::load), falling back to defaults when the file is
    /// missing or unreadable.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            debug!(path = %path.display(), "No settings file, using defaults");
            return Self::default();
        }
        Self::load(path).unwrap_or_else(|err| {
            warn!(path = %path.display(), "{err:#}");
            Self::default()
        })
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let format = FileFormat::from_path(path)?;
        let text = common::serde::serialize(self, format)?;
        std::fs::write(path, text)
            .with_context(|| format!("Failed to write settings to {}", path.display()))
    }
}
