//! Histogram transforms used for visualization and automatic stretches.

mod auto;
mod transform;


pub use auto::{
    SHADOWS_CLIPPING, TARGET_BACKGROUND, auto_stf, auto_stf_from_stats, auto_stretch,
    auto_stretch_from_stats,
};
pub use transform::{
    COMBINED_ROW, ChannelTransform, HistogramTransform, StfArray, StfOrder, StfRow,
    apply_histogram_transform,
};
