//! Full-resolution composite written back to the image store.

use tracing::{info, warn};

use super::compositor::{CompositeParams, composite};
use super::config::{CompositeMode, EngineConfig};
use super::error::{CompositeError, Incompatibility};
use super::normalizer::ReverseStretch;
use crate::astro_image::AstroImage;
use crate::store::{ImageStore, View, resolve_output_id};

/// Where a commit put its result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    /// A new image was added to the store.
    Created { id: String },
    /// The starless image was overwritten.
    Replaced { id: String },
}

impl CommitOutcome {
    pub fn id(&self) -> &str {
        match self {
            CommitOutcome::Created { id } | CommitOutcome::Replaced { id } => id,
        }
    }
}

/// Checks that two operands can be composited.
pub fn check_operands(
    first_id: &str,
    first: &AstroImage,
    second_id: &str,
    second: &AstroImage,
) -> Result<(), CompositeError> {
    let reason = if first_id == second_id {
        Some(Incompatibility::SameImage)
    } else if first.width() != second.width() || first.height() != second.height() {
        Some(Incompatibility::Dimensions)
    } else if first.is_color() != second.is_color() {
        Some(Incompatibility::ColorSpace)
    } else {
        None
    };

    match reason {
        Some(reason) => Err(CompositeError::IncompatibleImages {
            first: first_id.to_string(),
            second: second_id.to_string(),
            reason,
        }),
        None => Ok(()),
    }
}

/// Role names of the `(primary, secondary)` operands for `mode`.
pub(crate) fn operand_roles(mode: CompositeMode) -> (&'static str, &'static str) {
    match mode {
        CompositeMode::Removal => ("starry", "starless"),
        CompositeMode::Replacement => ("starless", "stars"),
    }
}

/// Runs the composite described by `config` at full resolution.
///
/// Nothing in `store` changes on error. On success the configuration's image
/// references are updated to follow the output: the stars reference after a
/// removal, the starry reference after a replacement (which also clears the
/// starless reference when the starless image was overwritten).
pub fn run_commit(
    store: &mut ImageStore,
    config: &mut EngineConfig,
) -> Result<CommitOutcome, CompositeError> {
    let result = match composite_full(store, config) {
        Ok(result) => result,
        Err(err) => {
            warn!(%err, "Commit rejected");
            return Err(err);
        }
    };
    info!(mode = %config.mode, method = %config.method, "Committing composite");

    if config.writes_in_place() {
        let starless_id = config
            .starless
            .clone()
            .ok_or(CompositeError::MissingSource { role: "starless" })?;
        let view = store
            .get_mut(&starless_id)
            .ok_or_else(|| CompositeError::UnknownImage {
                id: starless_id.clone(),
            })?;
        view.image = result;

        config.starry = Some(starless_id.clone());
        config.starless = None;
        info!(id = %starless_id, "Composite written in place");
        return Ok(CommitOutcome::Replaced { id: starless_id });
    }

    let base = resolve_output_id(&config.output_id, config.default_output_id());
    let id = store.unique_id(&base);
    store.insert_view(id.clone(), View::new(result))?;

    match config.mode {
        CompositeMode::Removal => config.stars = Some(id.clone()),
        CompositeMode::Replacement => config.starry = Some(id.clone()),
    }
    info!(%id, "Composite written to new image");
    Ok(CommitOutcome::Created { id })
}

fn composite_full(store: &ImageStore, config: &EngineConfig) -> Result<AstroImage, CompositeError> {
    let (primary_role, secondary_role) = operand_roles(config.mode);
    let (primary_id, secondary_id) = config.operand_ids();
    let primary_id = primary_id.ok_or(CompositeError::MissingSource { role: primary_role })?;
    let secondary_id = secondary_id.ok_or(CompositeError::MissingSource {
        role: secondary_role,
    })?;

    let primary = &store.view(primary_id)?.image;
    let secondary = &store.view(secondary_id)?.image;
    check_operands(primary_id, primary, secondary_id, secondary)?;

    // The starless image is an operand in both modes.
    let (starless_id, starless) = match config.mode {
        CompositeMode::Removal => (secondary_id, secondary),
        CompositeMode::Replacement => (primary_id, primary),
    };

    let mask = if config.writes_in_place() {
        store.active_mask(starless_id)
    } else {
        None
    };
    if let Some(mask) = mask.as_ref().filter(|mask| !mask.fits(starless)) {
        return Err(CompositeError::MaskMismatch {
            mask: mask.image().dimensions(),
            image: starless.dimensions(),
        });
    }

    let params = CompositeParams {
        mode: config.mode,
        method: config.method,
        stretch: ReverseStretch::from_median(starless.median() as f64, config.reverse_stretch),
    };
    Ok(composite(&params, primary, secondary, mask.as_ref()))
}
