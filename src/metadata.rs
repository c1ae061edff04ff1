//! Ground truth metadata of the egocentric recordings.
//!
//! The metadata file is a JSON document with one record per video, each
//! carrying the polygon outlines of every hand visible in its labelled
//! frames. All fields are required. A missing or malformed field aborts
//! loading with [`Error::Metadata`] instead of being papered over with a
//! default, since silently empty landmark lists would produce corrupt
//! training boxes.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::annotation::{Point, RawCategory};
use crate::error::{Error, Result};

/// The top-level metadata document.
#[derive(Debug, Clone, Deserialize)]
pub struct Metadata {
    pub video: Vec<VideoRecord>,
}

/// Everything recorded about a single video.
#[derive(Debug, Clone, Deserialize)]
pub struct VideoRecord {
    /// Identifier of the video, also the name of its frame directory.
    pub video_id: String,
    /// Identifier of the synchronized recording made by the partner.
    pub partner_video_id: String,
    pub ego_viewer_id: String,
    pub partner_id: String,
    pub location_id: String,
    pub activity_id: String,
    pub labelled_frames: Vec<LabeledFrame>,
}

/// Hand outlines of one labelled frame.
///
/// Each category holds the polygon outline of that hand as `[x, y]` pixel
/// coordinates, or an empty list when the hand is not visible.
#[derive(Debug, Clone, Deserialize)]
pub struct LabeledFrame {
    /// Number of the frame within the source video.
    pub frame_num: u32,
    pub myleft: Vec<Point>,
    pub myright: Vec<Point>,
    pub yourleft: Vec<Point>,
    pub yourright: Vec<Point>,
}

impl LabeledFrame {
    /// Returns the outline points recorded for `category`.
    pub fn points(&self, category: RawCategory) -> &[Point] {
        match category {
            RawCategory::MyLeft => &self.myleft,
            RawCategory::MyRight => &self.myright,
            RawCategory::YourLeft => &self.yourleft,
            RawCategory::YourRight => &self.yourright,
        }
    }
}

impl Metadata {
    /// Loads and validates metadata from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        serde_json::from_str(&json)
            .map_err(|e| Error::Metadata(format!("{}: {e}", path.display())))
    }

    /// Parses metadata from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::Metadata(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_json() -> String {
        serde_json::json!({
            "video": [{
                "video_id": "CARDS_COURTYARD_B_T",
                "partner_video_id": "CARDS_COURTYARD_T_B",
                "ego_viewer_id": "B",
                "partner_id": "T",
                "location_id": "COURTYARD",
                "activity_id": "CARDS",
                "labelled_frames": [{
                    "frame_num": 11,
                    "myleft": [[1.0, 2.0], [3.0, 4.0]],
                    "myright": [],
                    "yourleft": [[5.0, 6.0]],
                    "yourright": [[7.0, 8.0]],
                }],
            }],
        })
        .to_string()
    }

    #[test]
    fn test_parse() {
        let meta = Metadata::from_json(&sample_json()).unwrap();
        assert_eq!(meta.video.len(), 1);
        let video = &meta.video[0];
        assert_eq!(video.video_id, "CARDS_COURTYARD_B_T");
        assert_eq!(video.activity_id, "CARDS");
        let frame = &video.labelled_frames[0];
        assert_eq!(frame.frame_num, 11);
        assert_eq!(frame.points(RawCategory::MyLeft), [[1.0, 2.0], [3.0, 4.0]]);
        assert!(frame.points(RawCategory::MyRight).is_empty());
        assert_eq!(frame.points(RawCategory::YourRight), [[7.0, 8.0]]);
    }

    #[test]
    fn test_missing_field_is_fatal() {
        // Drop `frame_num` from the only labelled frame.
        let json = sample_json().replace("\"frame_num\":11,", "");
        let err = Metadata::from_json(&json).unwrap_err();
        assert!(matches!(err, Error::Metadata(_)), "got {err:?}");
    }

    #[test]
    fn test_malformed_point_is_fatal() {
        let json = sample_json().replace("[5.0,6.0]", "[5.0]");
        assert!(Metadata::from_json(&json).is_err());
    }
}
