//! Types for representing image resolutions.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Resolution (`width x height`) of an image, frame, or network input.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Resolution {
    width: u32,
    height: u32,
}

impl Resolution {
    /// 720p resolution: `1280x720`.
    ///
    /// The capture resolution of the egocentric recordings.
    pub const RES_720P: Self = Self {
        width: 1280,
        height: 720,
    };

    /// `416x416`, the square input resolution of the hand detection network.
    pub const RES_416: Self = Self {
        width: 416,
        height: 416,
    };

    /// Creates a new [`Resolution`] of `width x height`.
    ///
    /// Panics when either dimension is zero.
    pub fn new(width: u32, height: u32) -> Self {
        assert!(
            width != 0 && height != 0,
            "attempted to create a resolution of {width}x{height}",
        );
        Self { width, height }
    }

    /// Returns the width of this [`Resolution`].
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the height of this [`Resolution`].
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns the width-to-height ratio as an `f32`.
    #[inline]
    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height as f32
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl fmt::Debug for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(Resolution::RES_720P.to_string(), "1280x720");
        assert_eq!(Resolution::new(416, 416).to_string(), "416x416");
    }

    #[test]
    fn test_aspect_ratio() {
        assert_eq!(Resolution::RES_720P.aspect_ratio(), 16.0 / 9.0);
        assert_eq!(Resolution::RES_416.aspect_ratio(), 1.0);
    }

    #[test]
    #[should_panic]
    fn test_zero_size() {
        Resolution::new(0, 416);
    }
}
