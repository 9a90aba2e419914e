//! Height estimation from item content.
//!
//! Items expose their structure through [`ContentShape`]; the estimator turns
//! that structure into a rough vertical footprint so the balancer can work
//! without a render pass.

mod core;
mod shape;

pub use self::core::{
    COMPACT_BASE_OFFSET, DEFAULT_BASE_OFFSET, DEFAULT_TEXT_FACTOR, HeightEstimator, HeightPart,
    TextMetric, content_size, sum_parts,
};
pub(crate) use self::core::sanitize_height;
pub use shape::{ContentShape, Shape};
