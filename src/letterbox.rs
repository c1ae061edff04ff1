//! Letterboxing of frames onto a fixed network input resolution.

use image::imageops::{self, FilterType};
use image::{Rgb, RgbImage};

use crate::annotation::BoundingBox;
use crate::color::Color;
use crate::resolution::Resolution;

/// Uniform scale factor relating a source image to its letterboxed version.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleFactor(f32);

impl ScaleFactor {
    /// Computes the scale factor for letterboxing `source` onto `target`.
    ///
    /// This is the larger of the two per-axis ratios, so the scaled source
    /// never exceeds the target on either axis.
    pub fn between(source: Resolution, target: Resolution) -> Self {
        let sx = source.width() as f32 / target.width() as f32;
        let sy = source.height() as f32 / target.height() as f32;
        Self(sx.max(sy))
    }

    #[inline]
    pub fn get(&self) -> f32 {
        self.0
    }

    /// Maps a box from target (letterboxed) coordinates back into source
    /// coordinates.
    ///
    /// The source content is anchored at the top left corner of the target,
    /// so the mapping is a pure scale without translation: all four
    /// components are multiplied by the factor.
    pub fn to_source(&self, bbox: &BoundingBox) -> BoundingBox {
        BoundingBox::from_center(
            bbox.x() * self.0,
            bbox.y() * self.0,
            bbox.width() * self.0,
            bbox.height() * self.0,
        )
    }

    /// Inverse of [`ScaleFactor::to_source`].
    #[cfg(test)]
    fn to_target(&self, bbox: &BoundingBox) -> BoundingBox {
        BoundingBox::from_center(
            bbox.x() / self.0,
            bbox.y() / self.0,
            bbox.width() / self.0,
            bbox.height() / self.0,
        )
    }
}

/// Fits frames onto a fixed target resolution without distorting them.
///
/// Oversized sources are scaled down uniformly until they fit, pasted at the
/// top left corner, and the remaining canvas is filled with a constant
/// background color. Sources that already fit are pasted unscaled, the
/// transform never upscales.
#[derive(Debug, Clone)]
pub struct Letterbox {
    target: Resolution,
    background: Color,
}

impl Letterbox {
    /// Creates a letterbox transform onto `target` with a black background.
    pub fn new(target: Resolution) -> Self {
        Self {
            target,
            background: Color::BLACK,
        }
    }

    /// Sets the background fill color.
    pub fn with_background(mut self, background: Color) -> Self {
        self.background = background;
        self
    }

    #[inline]
    pub fn target(&self) -> Resolution {
        self.target
    }

    /// Fits `source` onto the target canvas.
    pub fn apply(&self, source: &RgbImage) -> Letterboxed {
        let source_res = Resolution::new(source.width(), source.height());
        let scale = ScaleFactor::between(source_res, self.target);

        let background = Rgb([self.background.r(), self.background.g(), self.background.b()]);
        let mut canvas =
            RgbImage::from_pixel(self.target.width(), self.target.height(), background);

        if scale.get() > 1.0 {
            // The axis that determined the scale maps exactly onto the
            // target, the other one can only come out smaller.
            let scaled_w = (source.width() as f32 / scale.get()).round() as u32;
            let scaled_h = (source.height() as f32 / scale.get()).round() as u32;
            let scaled = imageops::resize(
                source,
                scaled_w.clamp(1, self.target.width()),
                scaled_h.clamp(1, self.target.height()),
                FilterType::Triangle,
            );
            imageops::replace(&mut canvas, &scaled, 0, 0);
        } else {
            imageops::replace(&mut canvas, source, 0, 0);
        }

        log::trace!(
            "letterboxed {} -> {} (scale {})",
            source_res,
            self.target,
            scale.get(),
        );

        Letterboxed {
            image: canvas,
            scale,
        }
    }
}

/// A letterboxed image, along with the scale relating it to its source.
pub struct Letterboxed {
    pub image: RgbImage,
    pub scale: ScaleFactor,
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    const RED: Rgb<u8> = Rgb([255, 0, 0]);
    const BLACK: Rgb<u8> = Rgb([0, 0, 0]);

    #[test]
    fn test_scale_factor() {
        let scale = ScaleFactor::between(Resolution::new(1000, 500), Resolution::RES_416);
        assert_relative_eq!(scale.get(), 1000.0 / 416.0, max_relative = 1e-6);
        assert_relative_eq!(scale.get(), 2.4038461, max_relative = 1e-5);

        // Sources that fit produce a scale below 1.
        let scale = ScaleFactor::between(Resolution::new(100, 50), Resolution::RES_416);
        assert_relative_eq!(scale.get(), 100.0 / 416.0, max_relative = 1e-6);
    }

    #[test]
    fn test_downscale_geometry() {
        let source = RgbImage::from_pixel(1000, 500, RED);
        let result = Letterbox::new(Resolution::RES_416).apply(&source);

        assert_eq!(result.image.dimensions(), (416, 416));
        // Content occupies the top left 416x208 region.
        assert_eq!(result.image[(0, 0)], RED);
        assert_eq!(result.image[(415, 100)], RED);
        assert_eq!(result.image[(100, 250)], BLACK);
        assert_eq!(result.image[(415, 415)], BLACK);
    }

    #[test]
    fn test_small_sources_are_not_upscaled() {
        let source = RgbImage::from_pixel(100, 50, RED);
        let result = Letterbox::new(Resolution::RES_416).apply(&source);

        assert_eq!(result.image.dimensions(), (416, 416));
        assert_eq!(result.image[(0, 0)], RED);
        assert_eq!(result.image[(99, 49)], RED);
        // Pasted unscaled, everything past the source extent is background.
        assert_eq!(result.image[(100, 49)], BLACK);
        assert_eq!(result.image[(200, 200)], BLACK);
        assert!(result.scale.get() < 1.0);
    }

    #[test]
    fn test_exact_fit_is_left_untouched() {
        let source = RgbImage::from_pixel(416, 416, RED);
        let result = Letterbox::new(Resolution::RES_416).apply(&source);
        assert_eq!(result.scale.get(), 1.0);
        assert_eq!(result.image, source);
    }

    #[test]
    fn test_background_color() {
        let source = RgbImage::from_pixel(10, 10, RED);
        let result = Letterbox::new(Resolution::RES_416)
            .with_background(Color::CYAN)
            .apply(&source);
        assert_eq!(result.image[(200, 200)], Rgb([0, 255, 255]));
    }

    #[test]
    fn test_box_mapping() {
        let scale = ScaleFactor::between(Resolution::new(1000, 500), Resolution::RES_416);
        let mapped = scale.to_source(&BoundingBox::from_center(100.0, 100.0, 50.0, 50.0));
        assert_relative_eq!(mapped.x(), 240.3846, max_relative = 1e-4);
        assert_relative_eq!(mapped.y(), 240.3846, max_relative = 1e-4);
        assert_relative_eq!(mapped.width(), 120.1923, max_relative = 1e-4);
        assert_relative_eq!(mapped.height(), 120.1923, max_relative = 1e-4);
    }

    #[test]
    fn test_box_round_trip() {
        let mut rng = fastrand::Rng::with_seed(0x1e77e);
        for _ in 0..100 {
            let source = Resolution::new(rng.u32(1..4000), rng.u32(1..4000));
            let scale = ScaleFactor::between(source, Resolution::RES_416);
            let bbox = BoundingBox::from_center(
                rng.f32() * source.width() as f32,
                rng.f32() * source.height() as f32,
                rng.f32() * 200.0,
                rng.f32() * 200.0,
            );

            let there_and_back = scale.to_source(&scale.to_target(&bbox));
            assert_relative_eq!(there_and_back.x(), bbox.x(), max_relative = 1e-4, epsilon = 1e-3);
            assert_relative_eq!(there_and_back.y(), bbox.y(), max_relative = 1e-4, epsilon = 1e-3);
            assert_relative_eq!(
                there_and_back.width(),
                bbox.width(),
                max_relative = 1e-4,
                epsilon = 1e-3
            );
            assert_relative_eq!(
                there_and_back.height(),
                bbox.height(),
                max_relative = 1e-4,
                epsilon = 1e-3
            );
        }
    }
}
