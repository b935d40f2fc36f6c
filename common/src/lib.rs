//! Common code shared between `watcher` and `cam_source`.
pub mod detection;
pub mod error;
pub mod labels;

pub use error::{Error, Result};

/// One sampled camera image, owned for the duration of a single pipeline run.
pub type Frame = image::RgbImage;
