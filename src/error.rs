//! Error taxonomy of the preparation pipeline.
//!
//! Only conditions that abort a run are represented here. An image without a
//! matching annotation key is *not* an error (see [`crate::matching::Match`]),
//! and an empty landmark set never reaches box computation because
//! [`crate::annotation::BoundingBox::bounding`] makes the caller guard it.

/// Fatal pipeline errors.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The metadata source is malformed: a required field is missing, a value
    /// has the wrong shape, or a video carries fewer labelled frames than
    /// requested. Downstream boxes would be meaningless, so the run aborts.
    #[error("metadata integrity: {0}")]
    Metadata(String),

    /// Image decoding or encoding failed.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// Filesystem access failed.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// Reading or writing a persisted dataset collection failed.
    #[error("dataset serialization: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
