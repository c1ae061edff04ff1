//! Training dataset preparation and inference for an egocentric hand detector.
//!
//! The input is a collection of labeled first-person videos: a directory of
//! extracted frames per video, and a metadata file with hand landmark
//! annotations for a fixed number of frames of each video. This library turns
//! that collection into a training dataset and runs the resulting network:
//!
//! * [`metadata`] parses the annotation file and [`index`] derives per-frame
//!   bounding boxes from the raw landmarks.
//! * [`dataset`] pairs annotations with the frame images on disk, splits them
//!   into training and test sets, and persists everything in a layout a
//!   training job can consume directly.
//! * [`pipeline`] ties the preparation steps together behind a single entry
//!   point configured by [`config`].
//! * [`detector`] loads a trained ONNX model and maps its predictions back
//!   onto full-size frames, with [`letterbox`] handling the geometry in both
//!   directions.
//!
//! The `prepare` and `visualize` binaries are thin wrappers around
//! [`pipeline::run`] and [`detector::HandDetector`].

use log::LevelFilter;

pub mod annotation;
pub mod color;
pub mod config;
pub mod dataset;
pub mod detector;
pub mod draw;
pub mod error;
pub mod index;
pub mod letterbox;
pub mod matching;
pub mod metadata;
pub mod pipeline;
pub mod resolution;
pub mod timer;

/// macro-use only, not part of public API.
#[doc(hidden)]
pub fn init_logger(calling_crate: &'static str) {
    let log_level = LevelFilter::Debug;
    env_logger::Builder::new()
        .filter(Some(calling_crate), log_level)
        .filter(Some(env!("CARGO_PKG_NAME")), log_level)
        .parse_default_env()
        .try_init()
        .ok();
}

/// Initializes logging to *stderr*.
///
/// The calling crate and this library will log at *debug* level; everything
/// else stays at the `env_logger` default unless overridden via `RUST_LOG`.
///
/// If a global logger is already registered, this macro will do nothing.
#[macro_export]
macro_rules! init_logger {
    () => {
        $crate::init_logger(env!("CARGO_CRATE_NAME"))
    };
}
