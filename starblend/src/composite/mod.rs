//! Star removal and star replacement compositing.

mod commit;
mod compositor;
mod config;
mod error;
mod mask;
mod normalizer;

#[cfg(test)]
mod tests;

pub use commit::{CommitOutcome, check_operands, run_commit};
pub use compositor::{CompositeParams, combine, composite};
pub use config::{
    AUTO_ID, CompositeMethod, CompositeMode, DEFAULT_STARRY_ID, DEFAULT_STARS_ID, EngineConfig,
};
pub use error::{CompositeError, Incompatibility};
pub use mask::Mask;
pub use normalizer::ReverseStretch;
