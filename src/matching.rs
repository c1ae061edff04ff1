//! Pairing discovered frame images with indexed annotations.

use std::fmt;
use std::path::Path;

use itertools::Itertools;

use crate::annotation::{HandAnnotation, Side};
use crate::index::{AnnotationIndex, FrameKey};

/// Outcome of looking up a frame image in the annotation index.
///
/// An unmatched frame is an expected outcome, not an error. Frame
/// directories usually hold many more images than were ever labelled, and
/// the caller decides what happens to the rest (the preparation pipeline
/// drops them).
#[derive(Debug, Clone, PartialEq)]
pub enum Match {
    /// The frame is labelled. The list is empty when no hand is visible.
    Matched(Vec<HandAnnotation>),
    /// No annotations exist for this frame.
    Unmatched,
}

/// Looks up the annotations of the frame image at `path`.
///
/// Matching is purely key-based: the image content is never inspected, and
/// the order in which paths are presented has no effect on the outcome.
pub fn match_path(index: &AnnotationIndex, path: &Path) -> Match {
    match FrameKey::from_path(path).and_then(|key| index.get(&key)) {
        Some(annotations) => Match::Matched(annotations.to_vec()),
        None => Match::Unmatched,
    }
}

/// Number of annotations per hand side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SideTally {
    pub left: usize,
    pub right: usize,
}

impl SideTally {
    /// Tallies the annotations of all of the given lists.
    pub fn count<'a, I>(lists: I) -> Self
    where
        I: IntoIterator<Item = &'a [HandAnnotation]>,
    {
        let counts = lists.into_iter().flatten().map(|hand| hand.label).counts();
        Self {
            left: counts.get(&Side::Left).copied().unwrap_or(0),
            right: counts.get(&Side::Right).copied().unwrap_or(0),
        }
    }

    pub fn total(&self) -> usize {
        self.left + self.right
    }
}

impl fmt::Display for SideTally {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} left / {} right", self.left, self.right)
    }
}
