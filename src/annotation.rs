//! Hand annotations and the geometry they are made of.
//!
//! Landmark polygons from the source metadata are collapsed into axis-aligned
//! [`BoundingBox`]es in center form, tagged with the [`Side`] of the hand they
//! enclose. Which raw polygon category maps to which side is decided by an
//! explicit [`LabelMap`] passed through the pipeline, not hardcoded at the
//! point of use.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A 2D point in image coordinates (`[x, y]`).
pub type Point = [f32; 2];

/// An axis-aligned rectangle in center form.
///
/// `x` and `y` denote the *center* of the rectangle, matching the coordinate
/// convention of the detection network outputs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    x: f32,
    y: f32,
    width: f32,
    height: f32,
}

impl BoundingBox {
    /// Creates a bounding box around the center coordinates `(x, y)`.
    pub fn from_center(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Computes the bounding box of a set of points.
    ///
    /// Returns [`None`] when `points` is empty, since an empty set has no
    /// meaningful extent. A single point yields a zero-size box centered on
    /// that point.
    pub fn bounding<I: IntoIterator<Item = Point>>(points: I) -> Option<Self> {
        let mut iter = points.into_iter();
        let [x, y] = iter.next()?;
        let (mut x_min, mut x_max) = (x, x);
        let (mut y_min, mut y_max) = (y, y);
        for [x, y] in iter {
            x_min = x_min.min(x);
            x_max = x_max.max(x);
            y_min = y_min.min(y);
            y_max = y_max.max(y);
        }
        Some(Self {
            x: (x_min + x_max) / 2.0,
            y: (y_min + y_max) / 2.0,
            width: x_max - x_min,
            height: y_max - y_min,
        })
    }

    /// Returns the X coordinate of the box center.
    #[inline]
    pub fn x(&self) -> f32 {
        self.x
    }

    /// Returns the Y coordinate of the box center.
    #[inline]
    pub fn y(&self) -> f32 {
        self.y
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.height
    }

    /// Top left corner of the box as `(x, y)` coordinates.
    pub(crate) fn top_left(&self) -> (f32, f32) {
        (self.x - self.width / 2.0, self.y - self.height / 2.0)
    }
}

/// The side of the body a hand belongs to.
///
/// Serializes as the lowercase training label (`"left"` / `"right"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Left => f.write_str("left"),
            Side::Right => f.write_str("right"),
        }
    }
}

/// A single labeled hand in a frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandAnnotation {
    pub coordinates: BoundingBox,
    pub label: Side,
}

/// Raw hand category recorded by the egocentric annotators.
///
/// Categories are viewer-relative: `Your*` hands belong to the partner facing
/// the camera wearer and appear mirrored in the frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RawCategory {
    MyLeft,
    MyRight,
    YourLeft,
    YourRight,
}

/// Mapping from raw annotation categories to training labels.
///
/// The iteration order is preserved, so it also fixes the order of the
/// annotations produced for each frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelMap {
    entries: Vec<(RawCategory, Side)>,
}

impl LabelMap {
    pub fn new(entries: Vec<(RawCategory, Side)>) -> Self {
        Self { entries }
    }

    pub fn iter(&self) -> impl Iterator<Item = (RawCategory, Side)> + '_ {
        self.entries.iter().copied()
    }
}

impl Default for LabelMap {
    /// Maps every category to the side named in it: the partner's left hand
    /// is still a left hand, regardless of where it appears in the frame.
    fn default() -> Self {
        Self::new(vec![
            (RawCategory::MyLeft, Side::Left),
            (RawCategory::MyRight, Side::Right),
            (RawCategory::YourLeft, Side::Left),
            (RawCategory::YourRight, Side::Right),
        ])
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn test_bounding_rectangle_corners() {
        let bbox = BoundingBox::bounding([
            [10.0, 10.0],
            [10.0, 20.0],
            [30.0, 10.0],
            [30.0, 20.0],
        ])
        .unwrap();
        assert_eq!(bbox.x(), 20.0);
        assert_eq!(bbox.y(), 15.0);
        assert_eq!(bbox.width(), 20.0);
        assert_eq!(bbox.height(), 10.0);
    }

    #[test]
    fn test_bounding_interior_points_ignored() {
        let sparse = BoundingBox::bounding([[0.0, 0.0], [8.0, 4.0]]).unwrap();
        let dense = BoundingBox::bounding([[0.0, 0.0], [3.0, 1.0], [5.0, 2.0], [8.0, 4.0]]).unwrap();
        assert_eq!(sparse, dense);
    }

    #[test]
    fn test_bounding_single_point() {
        let bbox = BoundingBox::bounding([[7.5, -3.0]]).unwrap();
        assert_eq!(bbox.x(), 7.5);
        assert_eq!(bbox.y(), -3.0);
        assert_eq!(bbox.width(), 0.0);
        assert_eq!(bbox.height(), 0.0);
    }

    #[test]
    fn test_bounding_empty() {
        assert_eq!(BoundingBox::bounding([]), None);
    }

    #[test]
    fn test_bounding_extent_matches_minmax() {
        let mut rng = fastrand::Rng::with_seed(0x00b0);
        for _ in 0..100 {
            let points: Vec<Point> = (0..rng.usize(1..20))
                .map(|_| [rng.f32() * 1280.0 - 200.0, rng.f32() * 720.0 - 200.0])
                .collect();
            let bbox = BoundingBox::bounding(points.iter().copied()).unwrap();

            let x_min = points.iter().map(|p| p[0]).fold(f32::INFINITY, f32::min);
            let x_max = points.iter().map(|p| p[0]).fold(f32::NEG_INFINITY, f32::max);
            let y_min = points.iter().map(|p| p[1]).fold(f32::INFINITY, f32::min);
            let y_max = points.iter().map(|p| p[1]).fold(f32::NEG_INFINITY, f32::max);
            assert_eq!(bbox.width(), x_max - x_min);
            assert_eq!(bbox.height(), y_max - y_min);
            // The center is rounded once, so the reconstructed corner is only
            // approximately the minimum.
            let (left, top) = bbox.top_left();
            assert_relative_eq!(left, x_min, epsilon = 1e-3);
            assert_relative_eq!(top, y_min, epsilon = 1e-3);
            assert!(bbox.width() >= 0.0 && bbox.height() >= 0.0);
        }
    }

    #[test]
    fn test_side_serde() {
        assert_eq!(serde_json::to_string(&Side::Left).unwrap(), "\"left\"");
        assert_eq!(
            serde_json::from_str::<Side>("\"right\"").unwrap(),
            Side::Right
        );
    }
}
