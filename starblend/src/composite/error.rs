//! Error types for compositing operations.

use strum_macros::Display;
use thiserror::Error;

use crate::astro_image::ImageDimensions;

/// Why two operands cannot be composited.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum Incompatibility {
    #[strum(to_string = "dimensions differ")]
    Dimensions,
    #[strum(to_string = "one is color and the other grayscale")]
    ColorSpace,
    #[strum(to_string = "they are the same image")]
    SameImage,
}

/// Errors that can occur while compositing.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CompositeError {
    #[error("No {role} image selected")]
    MissingSource { role: &'static str },

    #[error("Image '{id}' does not exist")]
    UnknownImage { id: String },

    #[error("Images '{first}' and '{second}' are incompatible: {reason}")]
    IncompatibleImages {
        first: String,
        second: String,
        reason: Incompatibility,
    },

    #[error("Mask dimensions {mask:?} do not match image dimensions {image:?}")]
    MaskMismatch {
        mask: ImageDimensions,
        image: ImageDimensions,
    },

    /// An image id outside `[A-Za-z_][A-Za-z0-9_]*`.
    #[error("Invalid image id '{id}'")]
    InvalidImageId { id: String },

    /// Requested output name fails the id grammar. Reported, never fatal:
    /// the commit falls back to the default name.
    #[error("Invalid output image id '{id}'")]
    InvalidOutputId { id: String },
}
