//! Interactive preview of the composite.
//!
//! Full-resolution copies of the sources are kept once per source change;
//! every other change only crops and downsamples them to the current
//! selection and recomposites the small buffers.

mod geometry;


pub use geometry::{drawn_rect, view_to_image_rect, zoom_factor};

use tracing::{debug, warn};

use crate::astro_image::{AstroImage, InterpolationMethod, Rect, crop_and_resample};
use crate::composite::{
    CompositeMode, CompositeParams, EngineConfig, Mask, ReverseStretch, check_operands, composite,
};
use crate::store::{ImageStore, View};
use crate::stretch::{HistogramTransform, apply_histogram_transform, auto_stretch_from_stats};

/// Result of a preview request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewStatus {
    /// A new preview image is available.
    Rendered,
    /// Inputs are missing or incompatible; nothing is shown.
    Blank,
    /// Dropped because a recompute was already running.
    Skipped,
}

#[derive(Debug, Clone, Default)]
struct Layers {
    starry: Option<AstroImage>,
    starless: Option<AstroImage>,
    stars: Option<AstroImage>,
    mask: Option<Mask>,
}

impl Layers {
    fn reduce(&self, selection: &Rect, factor: f64, method: InterpolationMethod) -> Self {
        let reduce = |image: &AstroImage| crop_and_resample(image, selection, factor, method);
        Self {
            starry: self.starry.as_ref().map(reduce),
            starless: self.starless.as_ref().map(reduce),
            stars: self.stars.as_ref().map(reduce),
            mask: self
                .mask
                .as_ref()
                .map(|mask| mask.crop_and_resample(selection, factor, method)),
        }
    }
}

#[derive(Debug)]
pub struct PreviewController {
    viewport: (usize, usize),
    interpolation: InterpolationMethod,
    base: Layers,
    reduced: Layers,
    selection: Rect,
    starless_median: f64,
    stf_tables: Vec<HistogramTransform>,
    stf_index: usize,
    image: Option<AstroImage>,
    busy: bool,
}

impl PreviewController {
    pub fn new(viewport: (usize, usize), interpolation: InterpolationMethod) -> Self {
        Self {
            viewport,
            interpolation,
            base: Layers::default(),
            reduced: Layers::default(),
            selection: Rect::default(),
            starless_median: 0.0,
            stf_tables: vec![HistogramTransform::identity()],
            stf_index: 0,
            image: None,
            busy: false,
        }
    }

    /// Last rendered preview, `None` while blank.
    pub fn image(&self) -> Option<&AstroImage> {
        self.image.as_ref()
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn viewport(&self) -> (usize, usize) {
        self.viewport
    }

    /// Changes the viewport size; call [`reset_zoom`](Self::reset_zoom) to refit.
    pub fn set_viewport(&mut self, viewport: (usize, usize)) {
        self.viewport = viewport;
    }

    /// Current selection in full-resolution image coordinates.
    pub fn selection(&self) -> Rect {
        self.selection
    }

    pub fn zoom_factor(&self) -> f64 {
        zoom_factor(&self.selection, self.viewport)
    }

    /// Where the preview is drawn inside the viewport.
    pub fn drawn_rect(&self) -> Rect {
        drawn_rect(&self.selection, self.viewport)
    }

    pub fn view_to_image_rect(&self, view_rect: &Rect) -> Option<Rect> {
        view_to_image_rect(view_rect, &self.selection, self.viewport)
    }

    /// Display stretches available for the current starless image.
    ///
    /// Index 0 is the identity. A starless view without its own transfer
    /// function offers unlinked (1) and linked (2) auto stretches, otherwise
    /// index 1 is the view's transfer function.
    pub fn stf_tables(&self) -> &[HistogramTransform] {
        &self.stf_tables
    }

    pub fn stf_index(&self) -> usize {
        self.stf_index
    }

    /// Selects a display stretch; takes effect on the next recompute.
    /// Indices past the available tables select no stretch.
    pub fn set_stf_index(&mut self, index: usize) {
        self.stf_index = if index < self.stf_tables.len() {
            index
        } else {
            warn!(index, available = self.stf_tables.len(), "No such display stretch");
            0
        };
    }

    /// The display stretch applied to the preview, if any.
    pub fn active_stf(&self) -> Option<&HistogramTransform> {
        match self.stf_index {
            0 => None,
            index => self.stf_tables.get(index),
        }
    }

    /// Reloads the full-resolution sources named by `config` and resets
    /// the selection to the whole starless image.
    pub fn load_sources(&mut self, store: &ImageStore, config: &EngineConfig) -> PreviewStatus {
        self.reload_sources(store, config);
        self.reset_zoom(config)
    }

    /// Like [`load_sources`](Self::load_sources) for a newly selected
    /// starless image: its own transfer function becomes the display
    /// stretch, otherwise none.
    pub fn select_starless(&mut self, store: &ImageStore, config: &EngineConfig) -> PreviewStatus {
        self.reload_sources(store, config);
        let has_stf = config
            .starless
            .as_deref()
            .and_then(|id| store.get(id))
            .is_some_and(|view| view.has_stf());
        self.stf_index = usize::from(has_stf);
        self.reset_zoom(config)
    }

    fn reload_sources(&mut self, store: &ImageStore, config: &EngineConfig) {
        let source = |id: &Option<String>| id.as_deref().and_then(|id| store.image(id)).cloned();
        let starless_view = config.starless.as_deref().and_then(|id| store.get(id));

        let starless = starless_view.map(|view| view.image.clone());
        let mask = config
            .starless
            .as_deref()
            .and_then(|id| store.active_mask(id))
            .filter(|mask| match &starless {
                Some(starless) if mask.fits(starless) => true,
                _ => {
                    warn!("Mask size differs from the starless image, ignoring mask");
                    false
                }
            });

        self.starless_median = starless.as_ref().map_or(0.0, |s| s.median() as f64);
        self.stf_tables = stf_tables_for(starless_view);
        self.base = Layers {
            starry: source(&config.starry),
            starless,
            stars: source(&config.stars),
            mask,
        };
        if self.stf_index >= self.stf_tables.len() {
            self.stf_index = 0;
        }
    }

    /// Shows the whole starless image again.
    pub fn reset_zoom(&mut self, config: &EngineConfig) -> PreviewStatus {
        self.selection = match &self.base.starless {
            Some(starless) => Rect::from_size(starless.width() as f64, starless.height() as f64),
            None => Rect::default(),
        };
        self.reset_image(config)
    }

    /// Zooms into the area of a drag in viewport coordinates. Drags with no
    /// area inside the drawn preview are ignored.
    pub fn zoom_to(&mut self, view_rect: &Rect, config: &EngineConfig) -> PreviewStatus {
        let Some(selection) = self.view_to_image_rect(view_rect) else {
            debug!(?view_rect, "Ignoring empty zoom rectangle");
            return self.status();
        };
        self.selection = selection;
        self.reset_image(config)
    }

    fn reset_image(&mut self, config: &EngineConfig) -> PreviewStatus {
        self.reduced = if self.selection.is_empty() {
            Layers::default()
        } else {
            self.base
                .reduce(&self.selection, self.zoom_factor(), self.interpolation)
        };
        self.recompute(config)
    }

    /// Recomposites the reduced buffers with the current parameters.
    pub fn recompute(&mut self, config: &EngineConfig) -> PreviewStatus {
        if self.busy {
            debug!("Preview busy, dropping request");
            return PreviewStatus::Skipped;
        }
        self.busy = true;
        self.image = self.render(config);
        self.busy = false;
        self.status()
    }

    /// Status of the preview currently shown.
    pub fn status(&self) -> PreviewStatus {
        match self.image {
            Some(_) => PreviewStatus::Rendered,
            None => PreviewStatus::Blank,
        }
    }

    fn render(&self, config: &EngineConfig) -> Option<AstroImage> {
        let (primary_id, secondary_id) = config.operand_ids();
        let (base_primary, base_secondary, primary, secondary) = match config.mode {
            CompositeMode::Removal => (
                self.base.starry.as_ref()?,
                self.base.starless.as_ref()?,
                self.reduced.starry.as_ref()?,
                self.reduced.starless.as_ref()?,
            ),
            CompositeMode::Replacement => (
                self.base.starless.as_ref()?,
                self.base.stars.as_ref()?,
                self.reduced.starless.as_ref()?,
                self.reduced.stars.as_ref()?,
            ),
        };
        check_operands(primary_id?, base_primary, secondary_id?, base_secondary).ok()?;

        let params = CompositeParams {
            mode: config.mode,
            method: config.method,
            stretch: ReverseStretch::from_median(self.starless_median, config.reverse_stretch),
        };
        let mask = if config.writes_in_place() {
            self.reduced.mask.as_ref()
        } else {
            None
        };

        let mut image = composite(&params, primary, secondary, mask);
        if let Some(stf) = self.active_stf() {
            apply_histogram_transform(&mut image, stf);
        }
        debug!(
            width = image.width(),
            height = image.height(),
            stf_index = self.stf_index,
            "Preview rendered"
        );
        Some(image)
    }
}

fn stf_tables_for(starless: Option<&View>) -> Vec<HistogramTransform> {
    let mut tables = vec![HistogramTransform::identity()];
    let Some(view) = starless else {
        return tables;
    };

    if view.has_stf() {
        tables.push(HistogramTransform::from_view_stf(
            &view.stf,
            view.image.channels(),
        ));
    } else {
        let stats = view.image.channel_stats();
        tables.push(auto_stretch_from_stats(&stats, false));
        tables.push(auto_stretch_from_stats(&stats, true));
    }
    tables
}
