//! Frame keys and the annotation lookup table built from metadata.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use crate::annotation::{BoundingBox, HandAnnotation, LabelMap};
use crate::error::{Error, Result};
use crate::metadata::VideoRecord;

/// Canonical identifier of a single video frame.
///
/// Keys take the form `<video_id>/frame_<NNNN>.jpg`, with the frame number
/// zero padded to 4 digits. The same key can be derived from metadata
/// ([`FrameKey::new`]) and from a frame path on disk ([`FrameKey::from_path`]).
/// For frames stored as `<video_id>/frame_<NNNN>.jpg` both derivations agree
/// byte for byte, which is what makes index lookups line up with the files.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameKey(String);

impl FrameKey {
    /// Creates the key of frame `frame_num` of the video `video_id`.
    pub fn new(video_id: &str, frame_num: u32) -> Self {
        Self(format!("{video_id}/frame_{frame_num:04}.jpg"))
    }

    /// Derives the key from the last two path components of `path`.
    ///
    /// Returns [`None`] when `path` has fewer than two usable components or
    /// one of them is not valid UTF-8. Such paths can never match an indexed
    /// frame.
    pub fn from_path(path: &Path) -> Option<Self> {
        let file = path.file_name()?.to_str()?;
        let dir = path.parent()?.file_name()?.to_str()?;
        Some(Self(format!("{dir}/{file}")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FrameKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lookup table from [`FrameKey`]s to the hands annotated in that frame.
#[derive(Debug, Default)]
pub struct AnnotationIndex {
    map: HashMap<FrameKey, Vec<HandAnnotation>>,
}

impl AnnotationIndex {
    /// Builds the index over the first `frames_per_video` labelled frames of
    /// every video.
    ///
    /// Each raw category in `labels` contributes one annotation per frame,
    /// the bounding box of its outline points. Categories with no recorded
    /// points are skipped, so a frame where no hand is visible is indexed
    /// with an empty annotation list. A video with fewer labelled frames
    /// than requested aborts the build.
    pub fn build(
        videos: &[VideoRecord],
        frames_per_video: usize,
        labels: &LabelMap,
    ) -> Result<Self> {
        let mut map = HashMap::with_capacity(videos.len() * frames_per_video);
        for video in videos {
            if video.labelled_frames.len() < frames_per_video {
                return Err(Error::Metadata(format!(
                    "video {} has {} labelled frames, {} requested",
                    video.video_id,
                    video.labelled_frames.len(),
                    frames_per_video,
                )));
            }

            for frame in &video.labelled_frames[..frames_per_video] {
                let mut annotations = Vec::new();
                for (category, label) in labels.iter() {
                    let points = frame.points(category).iter().copied();
                    if let Some(coordinates) = BoundingBox::bounding(points) {
                        annotations.push(HandAnnotation { coordinates, label });
                    }
                }

                let key = FrameKey::new(&video.video_id, frame.frame_num);
                if map.insert(key.clone(), annotations).is_some() {
                    log::warn!("frame key {key} recorded more than once, keeping the last entry");
                }
            }
        }

        log::debug!(
            "indexed {} frames across {} videos",
            map.len(),
            videos.len()
        );
        Ok(Self { map })
    }

    /// Looks up the annotations of a frame.
    pub fn get(&self, key: &FrameKey) -> Option<&[HandAnnotation]> {
        self.map.get(key).map(Vec::as_slice)
    }

    /// Iterates over all indexed frames in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (&FrameKey, &[HandAnnotation])> + '_ {
        self.map.iter().map(|(key, hands)| (key, hands.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use crate::annotation::{RawCategory, Side};
    use crate::metadata::LabeledFrame;

    use super::*;

    #[test]
    fn test_key_format() {
        assert_eq!(FrameKey::new("ABC123", 7).as_str(), "ABC123/frame_0007.jpg");
        assert_eq!(FrameKey::new("V", 0).as_str(), "V/frame_0000.jpg");
        assert_eq!(FrameKey::new("V", 42).as_str(), "V/frame_0042.jpg");
        assert_eq!(FrameKey::new("V", 9999).as_str(), "V/frame_9999.jpg");
    }

    #[test]
    fn test_key_derivations_agree() {
        for num in [0, 1, 7, 99, 1234, 9999] {
            let path = PathBuf::from(format!(
                "/data/samples/CARDS_COURTYARD_B_T/frame_{num:04}.jpg"
            ));
            assert_eq!(
                FrameKey::from_path(&path).unwrap(),
                FrameKey::new("CARDS_COURTYARD_B_T", num),
            );
        }
    }

    #[test]
    fn test_key_from_path_uses_last_two_components() {
        let key = FrameKey::from_path(Path::new("a/b/c/VIDEO/frame_0001.jpg")).unwrap();
        assert_eq!(key.as_str(), "VIDEO/frame_0001.jpg");
    }

    #[test]
    fn test_key_from_bare_filename() {
        assert_eq!(FrameKey::from_path(Path::new("frame_0001.jpg")), None);
    }

    fn frame(frame_num: u32, myleft: Vec<[f32; 2]>, yourright: Vec<[f32; 2]>) -> LabeledFrame {
        LabeledFrame {
            frame_num,
            myleft,
            myright: vec![],
            yourleft: vec![],
            yourright,
        }
    }

    fn video(video_id: &str, frames: Vec<LabeledFrame>) -> VideoRecord {
        VideoRecord {
            video_id: video_id.into(),
            partner_video_id: format!("{video_id}_P"),
            ego_viewer_id: "B".into(),
            partner_id: "T".into(),
            location_id: "OFFICE".into(),
            activity_id: "PUZZLE".into(),
            labelled_frames: frames,
        }
    }

    #[test]
    fn test_build() {
        let videos = vec![video(
            "VID",
            vec![
                frame(3, vec![[0.0, 0.0], [10.0, 20.0]], vec![[50.0, 50.0]]),
                frame(17, vec![], vec![]),
            ],
        )];
        let index = AnnotationIndex::build(&videos, 2, &LabelMap::default()).unwrap();
        assert_eq!(index.len(), 2);

        let hands = index.get(&FrameKey::new("VID", 3)).unwrap();
        assert_eq!(hands.len(), 2);
        assert_eq!(hands[0].label, Side::Left);
        assert_eq!(hands[0].coordinates.x(), 5.0);
        assert_eq!(hands[0].coordinates.height(), 20.0);
        assert_eq!(hands[1].label, Side::Right);
        assert_eq!(hands[1].coordinates.width(), 0.0);

        // No visible hands still indexes the frame.
        let empty = index.get(&FrameKey::new("VID", 17)).unwrap();
        assert!(empty.is_empty());

        assert_eq!(index.get(&FrameKey::new("VID", 4)), None);

        let total: usize = index.iter().map(|(_, hands)| hands.len()).sum();
        assert_eq!(total, 2);
    }

    #[test]
    fn test_build_respects_frame_limit() {
        let videos = vec![video(
            "VID",
            vec![
                frame(1, vec![[1.0, 1.0]], vec![]),
                frame(2, vec![[2.0, 2.0]], vec![]),
            ],
        )];
        let index = AnnotationIndex::build(&videos, 1, &LabelMap::default()).unwrap();
        assert_eq!(index.len(), 1);
        assert!(index.get(&FrameKey::new("VID", 2)).is_none());
    }

    #[test]
    fn test_build_fails_on_short_video() {
        let videos = vec![video("VID", vec![frame(1, vec![], vec![])])];
        let err = AnnotationIndex::build(&videos, 5, &LabelMap::default()).unwrap_err();
        assert!(matches!(err, Error::Metadata(_)), "got {err:?}");
    }

    #[test]
    fn test_build_with_custom_label_map() {
        // Viewer-relative labeling: the partner's right appears on the
        // viewer's left side of the frame.
        let labels = LabelMap::new(vec![(RawCategory::YourRight, Side::Left)]);
        let videos = vec![video(
            "VID",
            vec![frame(1, vec![[9.0, 9.0]], vec![[1.0, 2.0]])],
        )];
        let index = AnnotationIndex::build(&videos, 1, &labels).unwrap();
        let hands = index.get(&FrameKey::new("VID", 1)).unwrap();
        // `myleft` is not in the map at all.
        assert_eq!(hands.len(), 1);
        assert_eq!(hands[0].label, Side::Left);
        assert_eq!(hands[0].coordinates.x(), 1.0);
    }
}
