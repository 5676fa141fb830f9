//! Compositing configuration.

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter};

/// Id requesting an automatically chosen output name.
pub const AUTO_ID: &str = "<Auto>";

/// Default output base name for extracted stars.
pub const DEFAULT_STARS_ID: &str = "stars";

/// Default output base name for a recombined image.
pub const DEFAULT_STARRY_ID: &str = "starry";

/// What the composite produces.
#[derive(
    Debug, Display, EnumIter, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum CompositeMode {
    /// Extract a stars-only image from starry and starless images.
    #[default]
    Removal,
    /// Add a stars image back onto a starless image.
    Replacement,
}

/// How star light is combined with the background.
#[derive(
    Debug, Display, EnumIter, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum CompositeMethod {
    /// Plain subtraction / addition.
    Linear,
    /// Screen blend, which never clips bright stars over bright background.
    #[default]
    Screen,
}

/// Full parameter set for a commit.
///
/// The image references are not persisted; they name views in the
/// [`ImageStore`](crate::ImageStore) of the current session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub mode: CompositeMode,
    pub method: CompositeMethod,
    /// Wrap the composite in a forward/inverse MTF when the starless image is non-linear.
    pub reverse_stretch: bool,
    /// Replacement only: write into a new image instead of the starless one.
    pub create_new_image: bool,
    /// Requested output id, [`AUTO_ID`] for the mode default.
    pub output_id: String,
    #[serde(skip)]
    pub starry: Option<String>,
    #[serde(skip)]
    pub starless: Option<String>,
    #[serde(skip)]
    pub stars: Option<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            mode: CompositeMode::Removal,
            method: CompositeMethod::Screen,
            reverse_stretch: true,
            create_new_image: true,
            output_id: AUTO_ID.to_string(),
            starry: None,
            starless: None,
            stars: None,
        }
    }
}

impl EngineConfig {
    /// Default output base name for the current mode.
    pub fn default_output_id(&self) -> &'static str {
        match self.mode {
            CompositeMode::Removal => DEFAULT_STARS_ID,
            CompositeMode::Replacement => DEFAULT_STARRY_ID,
        }
    }

    /// Ids of the two images combined by the current mode, as
    /// `(primary, secondary)`: starry and starless for removal, starless and
    /// stars for replacement.
    pub fn operand_ids(&self) -> (Option<&str>, Option<&str>) {
        match self.mode {
            CompositeMode::Removal => (self.starry.as_deref(), self.starless.as_deref()),
            CompositeMode::Replacement => (self.starless.as_deref(), self.stars.as_deref()),
        }
    }

    /// Whether the output replaces the starless image.
    pub fn writes_in_place(&self) -> bool {
        self.mode == CompositeMode::Replacement && !self.create_new_image
    }
}
