//! Prelude module for convenient imports.
//!
//! ```rust,ignore
//! use starblend::prelude::*;
//! ```

// Images and the store
pub use crate::{AstroImage, ImageDimensions, ImageStore, Rect, View};

// Compositing
pub use crate::{
    CommitOutcome, CompositeError, CompositeMethod, CompositeMode, EngineConfig, run_commit,
};

// Stretching
pub use crate::{HistogramTransform, auto_stf, auto_stretch};

// Interactive use
pub use crate::{Command, CommandOutcome, PreviewStatus, Session, Settings};
