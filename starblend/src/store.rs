//! In-memory image registry.
//!
//! Stands in for the host application's set of open views: each image is
//! addressed by a unique id and may carry a display transfer function and a
//! mask reference.

use hashbrown::HashMap;
use tracing::warn;

use crate::astro_image::AstroImage;
use crate::composite::{AUTO_ID, CompositeError, Mask};
use crate::stretch::{HistogramTransform, StfArray, StfOrder};

/// Reference from an image to the view used as its mask.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaskBinding {
    pub id: String,
    pub enabled: bool,
    pub inverted: bool,
}

/// An image together with its display state.
#[derive(Debug, Clone, PartialEq)]
pub struct View {
    pub image: AstroImage,
    /// Display transfer function; identity when the view has none.
    pub stf: HistogramTransform,
    pub mask: Option<MaskBinding>,
}

impl View {
    pub fn new(image: AstroImage) -> Self {
        Self {
            image,
            stf: HistogramTransform::identity(),
            mask: None,
        }
    }

    pub fn has_stf(&self) -> bool {
        !self.stf.is_identity()
    }

    /// Display transfer function in host layout.
    pub fn stf_array(&self) -> StfArray {
        self.stf.to_stf_array(StfOrder::View)
    }

    pub fn set_stf_array(&mut self, stf: &StfArray) {
        self.stf = HistogramTransform::from_stf_array(stf);
    }
}

#[derive(Debug, Default)]
pub struct ImageStore {
    views: HashMap<String, View>,
}

impl ImageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `image` under `id`, replacing any image with the same id.
    pub fn insert(&mut self, id: impl Into<String>, image: AstroImage) -> Result<(), CompositeError> {
        self.insert_view(id, View::new(image))
    }

    pub fn insert_view(&mut self, id: impl Into<String>, view: View) -> Result<(), CompositeError> {
        let id = id.into();
        if !is_valid_id(&id) {
            return Err(CompositeError::InvalidImageId { id });
        }
        self.views.insert(id, view);
        Ok(())
    }

    pub fn remove(&mut self, id: &str) -> Option<View> {
        self.views.remove(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.views.contains_key(id)
    }

    pub fn get(&self, id: &str) -> Option<&View> {
        self.views.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut View> {
        self.views.get_mut(id)
    }

    pub fn image(&self, id: &str) -> Option<&AstroImage> {
        self.views.get(id).map(|view| &view.image)
    }

    /// Looks up a view, reporting unknown ids as errors.
    pub fn view(&self, id: &str) -> Result<&View, CompositeError> {
        self.views
            .get(id)
            .ok_or_else(|| CompositeError::UnknownImage { id: id.to_string() })
    }

    /// Ids in sorted order.
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.views.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    /// `base` if unused, otherwise `base2`, `base3`, ... whichever is free first.
    pub fn unique_id(&self, base: &str) -> String {
        if !self.contains(base) {
            return base.to_string();
        }
        (2..)
            .map(|n| format!("{base}{n}"))
            .find(|id| !self.contains(id))
            .unwrap_or_else(|| base.to_string())
    }

    /// Uses `mask_id` as the mask of `target`, enabled.
    pub fn set_mask(
        &mut self,
        target: &str,
        mask_id: &str,
        inverted: bool,
    ) -> Result<(), CompositeError> {
        let mask = self.view(mask_id)?.image.dimensions();
        let image = self.view(target)?.image.dimensions();
        if (mask.width, mask.height) != (image.width, image.height) {
            return Err(CompositeError::MaskMismatch { mask, image });
        }

        if let Some(view) = self.views.get_mut(target) {
            view.mask = Some(MaskBinding {
                id: mask_id.to_string(),
                enabled: true,
                inverted,
            });
        }
        Ok(())
    }

    pub fn set_mask_enabled(&mut self, target: &str, enabled: bool) -> Result<(), CompositeError> {
        let view = self
            .views
            .get_mut(target)
            .ok_or_else(|| CompositeError::UnknownImage {
                id: target.to_string(),
            })?;
        if let Some(binding) = view.mask.as_mut() {
            binding.enabled = enabled;
        }
        Ok(())
    }

    /// The enabled mask of `target`, inverted if requested. `None` when the
    /// view has no mask, the mask is disabled or its image no longer exists.
    pub fn active_mask(&self, target: &str) -> Option<Mask> {
        let binding = self.views.get(target)?.mask.as_ref()?;
        if !binding.enabled {
            return None;
        }
        let image = self.image(&binding.id)?;
        Some(Mask::new(image.clone(), binding.inverted))
    }
}

/// Image ids start with a letter or underscore followed by letters, digits
/// or underscores.
pub fn is_valid_id(id: &str) -> bool {
    let mut chars = id.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Output base id for a requested id: the default for [`AUTO_ID`] or an
/// empty request, the request itself when valid, else the default with a
/// warning.
pub fn resolve_output_id(requested: &str, default: &str) -> String {
    let requested = requested.trim();
    if requested.is_empty() || requested == AUTO_ID {
        return default.to_string();
    }
    if is_valid_id(requested) {
        return requested.to_string();
    }
    let err = CompositeError::InvalidOutputId {
        id: requested.to_string(),
    };
    warn!(%err, default, "Using default output id");
    default.to_string()
}
