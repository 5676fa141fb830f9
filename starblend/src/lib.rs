//! Starblend - star removal and star replacement for astronomical images.
//!
//! Stars are separated from, or recombined with, a starless image using
//! screen or linear blending. Stretched (non-linear) data is wrapped in a
//! midtones transfer function so the blend behaves as it would on linear
//! data.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use starblend::prelude::*;
//!
//! let mut store = ImageStore::new();
//! store.insert("m42", starry_image)?;
//! store.insert("m42_starless", starless_image)?;
//!
//! let mut config = EngineConfig::default();
//! config.starry = Some("m42".into());
//! config.starless = Some("m42_starless".into());
//!
//! let outcome = run_commit(&mut store, &mut config)?;
//! println!("Stars extracted to {}", outcome.id());
//! ```
//!
//! The crate only emits `tracing` events. Host applications install a
//! subscriber once at startup, e.g. with `common::log_setup::setup_logging`.

mod astro_image;
pub mod composite;
pub mod math;
pub mod preview;
mod session;
mod settings;
mod store;
pub mod stretch;

#[cfg(test)]
pub mod testing;

pub mod prelude;

// ============================================================================
// Core image types
// ============================================================================

pub use astro_image::{
    AstroImage, ImageDimensions, InterpolationMethod, PixelRect, Rect, crop_and_resample,
};
pub use store::{ImageStore, MaskBinding, View, is_valid_id, resolve_output_id};

// ============================================================================
// Compositing
// ============================================================================

pub use composite::{
    AUTO_ID, CommitOutcome, CompositeError, CompositeMethod, CompositeMode, EngineConfig, Mask,
    ReverseStretch, run_commit,
};
pub use math::{LINEAR_THRESHOLD, mtf, mtf_inverse};

// ============================================================================
// Stretching
// ============================================================================

pub use stretch::{
    ChannelTransform, HistogramTransform, StfArray, StfOrder, apply_histogram_transform,
    auto_stf, auto_stretch,
};

// ============================================================================
// Preview and session
// ============================================================================

pub use preview::{PreviewController, PreviewStatus};
pub use session::{Command, CommandOutcome, Session};
pub use settings::{PreviewOrientation, PreviewSettings, PreviewSize, Settings};
