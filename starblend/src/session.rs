//! Command dispatch for an interactive compositing session.

use tracing::{debug, warn};

use crate::astro_image::{InterpolationMethod, Rect};
use crate::composite::{
    AUTO_ID, CommitOutcome, CompositeError, CompositeMethod, CompositeMode, EngineConfig,
    run_commit,
};
use crate::preview::{PreviewController, PreviewStatus};
use crate::settings::{PreviewOrientation, PreviewSize, Settings};
use crate::store::{ImageStore, is_valid_id};
use crate::stretch::auto_stf;

/// A user action.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    SelectStarry(Option<String>),
    SelectStarless(Option<String>),
    SelectStars(Option<String>),
    SetMode(CompositeMode),
    SetMethod(CompositeMethod),
    SetReverseStretch(bool),
    SetCreateNewImage(bool),
    SetOutputId(String),
    SetStfIndex(usize),
    /// Zoom into a rectangle dragged in viewport coordinates.
    ZoomTo(Rect),
    ResetZoom,
    SetPreviewSize(PreviewSize),
    SetPreviewOrientation(PreviewOrientation),
    /// Run the composite at full resolution.
    Execute,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CommandOutcome {
    Preview(PreviewStatus),
    Committed {
        outcome: CommitOutcome,
        preview: PreviewStatus,
    },
}

/// Configuration plus live preview, updated one [`Command`] at a time.
#[derive(Debug)]
pub struct Session {
    settings: Settings,
    preview: PreviewController,
}

impl Session {
    pub fn new(settings: Settings) -> Self {
        let preview =
            PreviewController::new(settings.preview.viewport(), InterpolationMethod::default());
        Self { settings, preview }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn config(&self) -> &EngineConfig {
        &self.settings.engine
    }

    pub fn preview(&self) -> &PreviewController {
        &self.preview
    }

    /// Applies `command` and refreshes the preview synchronously.
    pub fn apply(
        &mut self,
        command: Command,
        store: &mut ImageStore,
    ) -> Result<CommandOutcome, CompositeError> {
        debug!(?command, "Applying command");
        let config = &mut self.settings.engine;

        let status = match command {
            Command::SelectStarry(id) => {
                config.starry = checked_id(store, id)?;
                self.preview.load_sources(store, config)
            }
            Command::SelectStarless(id) => {
                config.starless = checked_id(store, id)?;
                self.preview.select_starless(store, config)
            }
            Command::SelectStars(id) => {
                config.stars = checked_id(store, id)?;
                self.preview.load_sources(store, config)
            }
            Command::SetMode(mode) => {
                config.mode = mode;
                self.preview.recompute(config)
            }
            Command::SetMethod(method) => {
                config.method = method;
                self.preview.recompute(config)
            }
            Command::SetReverseStretch(enabled) => {
                config.reverse_stretch = enabled;
                self.preview.recompute(config)
            }
            Command::SetCreateNewImage(enabled) => {
                config.create_new_image = enabled;
                self.preview.recompute(config)
            }
            Command::SetOutputId(id) => {
                config.output_id = normalize_output_id(&id);
                self.preview.status()
            }
            Command::SetStfIndex(index) => {
                self.preview.set_stf_index(index);
                self.preview.recompute(config)
            }
            Command::ZoomTo(view_rect) => self.preview.zoom_to(&view_rect, config),
            Command::ResetZoom => self.preview.reset_zoom(config),
            Command::SetPreviewSize(size) => {
                self.settings.preview.size = size;
                self.refit_preview()
            }
            Command::SetPreviewOrientation(orientation) => {
                self.settings.preview.orientation = orientation;
                self.refit_preview()
            }
            Command::Execute => return self.execute(store),
        };

        Ok(CommandOutcome::Preview(status))
    }

    fn refit_preview(&mut self) -> PreviewStatus {
        self.preview.set_viewport(self.settings.preview.viewport());
        self.preview.reset_zoom(&self.settings.engine)
    }

    fn execute(&mut self, store: &mut ImageStore) -> Result<CommandOutcome, CompositeError> {
        let outcome = run_commit(store, &mut self.settings.engine)?;
        if let CommitOutcome::Created { id } = &outcome {
            self.copy_display_stf(store, id);
        }
        let preview = self.preview.load_sources(store, &self.settings.engine);
        Ok(CommandOutcome::Committed { outcome, preview })
    }

    /// Gives a newly created image the display stretch selected in the
    /// preview: the starless view's own transfer function, or an auto STF.
    fn copy_display_stf(&self, store: &mut ImageStore, target: &str) {
        if self.preview.active_stf().is_none() {
            return;
        }
        let Some(starless) = self
            .settings
            .engine
            .starless
            .as_deref()
            .and_then(|id| store.get(id))
        else {
            return;
        };

        let stf = if starless.has_stf() {
            starless.stf
        } else {
            auto_stf(&starless.image, self.preview.stf_index() == 2)
        };
        if let Some(view) = store.get_mut(target) {
            view.stf = stf;
        }
    }
}

fn checked_id(store: &ImageStore, id: Option<String>) -> Result<Option<String>, CompositeError> {
    match id {
        Some(id) if !store.contains(&id) => Err(CompositeError::UnknownImage { id }),
        id => Ok(id),
    }
}

/// Empty input means [`AUTO_ID`]. Invalid ids are kept but reported; the
/// commit falls back to the default name for them.
fn normalize_output_id(id: &str) -> String {
    let id = id.trim();
    if id.is_empty() {
        return AUTO_ID.to_string();
    }
    if id != AUTO_ID && !is_valid_id(id) {
        warn!(id, "Invalid output image id, the default name will be used");
    }
    id.to_string()
}
