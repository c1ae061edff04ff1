//! Drawing of annotation overlays.

use std::convert::Infallible;

use embedded_graphics::{
    draw_target::DrawTarget,
    mono_font::{ascii::FONT_10X20, MonoTextStyle},
    prelude::*,
    primitives::{PrimitiveStyle, Rectangle},
    text::{self, Text, TextStyleBuilder},
};
use image::{Rgb, RgbImage};

use crate::annotation::{BoundingBox, HandAnnotation, Side};
use crate::color::Color;

/// Guard returned by [`draw_box`]; draws the box outline when dropped and
/// allows customization.
pub struct DrawBox<'a> {
    image: &'a mut RgbImage,
    bbox: BoundingBox,
    color: Color,
    stroke_width: u32,
}

impl DrawBox<'_> {
    /// Sets the outline color.
    pub fn color(&mut self, color: Color) -> &mut Self {
        self.color = color;
        self
    }

    /// Sets the outline stroke width.
    ///
    /// By default, a stroke width of 1 is used.
    pub fn stroke_width(&mut self, width: u32) -> &mut Self {
        self.stroke_width = width;
        self
    }
}

impl Drop for DrawBox<'_> {
    fn drop(&mut self) {
        let (left, top) = self.bbox.top_left();
        let rect = Rectangle {
            top_left: Point::new(left.round() as i32, top.round() as i32),
            size: Size::new(
                self.bbox.width().round() as u32,
                self.bbox.height().round() as u32,
            ),
        };
        match rect
            .into_styled(PrimitiveStyle::with_stroke(self.color, self.stroke_width))
            .draw(&mut Target(&mut *self.image))
        {
            Ok(_) => {}
            Err(infallible) => match infallible {},
        }
    }
}

/// Guard returned by [`draw_label`]; draws the text when dropped and allows
/// customization.
pub struct DrawLabel<'a> {
    image: &'a mut RgbImage,
    x: i32,
    y: i32,
    text: &'a str,
    color: Color,
    alignment: text::Alignment,
    baseline: text::Baseline,
}

impl DrawLabel<'_> {
    /// Sets the text color.
    pub fn color(&mut self, color: Color) -> &mut Self {
        self.color = color;
        self
    }

    /// Aligns the top of the text with the `y` coordinate.
    pub fn align_top(&mut self) -> &mut Self {
        self.baseline = text::Baseline::Top;
        self
    }

    /// Aligns the bottom of the text with the `y` coordinate.
    pub fn align_bottom(&mut self) -> &mut Self {
        self.baseline = text::Baseline::Bottom;
        self
    }

    /// Aligns the left side of the text with the `x` coordinate.
    pub fn align_left(&mut self) -> &mut Self {
        self.alignment = text::Alignment::Left;
        self
    }
}

impl Drop for DrawLabel<'_> {
    fn drop(&mut self) {
        let character_style = MonoTextStyle::new(&FONT_10X20, self.color);
        let text_style = TextStyleBuilder::new()
            .alignment(self.alignment)
            .baseline(self.baseline)
            .build();
        match Text::with_text_style(
            self.text,
            Point::new(self.x, self.y),
            character_style,
            text_style,
        )
        .draw(&mut Target(&mut *self.image))
        {
            Ok(_) => {}
            Err(infallible) => match infallible {},
        }
    }
}

/// Draws the outline of a bounding box onto an image.
///
/// Parts of the box that lie outside the image are clipped off.
pub fn draw_box<'a>(image: &'a mut RgbImage, bbox: &BoundingBox) -> DrawBox<'a> {
    DrawBox {
        image,
        bbox: *bbox,
        color: Color::RED,
        stroke_width: 1,
    }
}

/// Draws a text label onto an image.
///
/// By default, the text is drawn centered horizontally and vertically around
/// `x` and `y`.
pub fn draw_label<'a>(image: &'a mut RgbImage, x: i32, y: i32, text: &'a str) -> DrawLabel<'a> {
    DrawLabel {
        image,
        x,
        y,
        text,
        color: Color::RED,
        alignment: text::Alignment::Center,
        baseline: text::Baseline::Middle,
    }
}

/// Draws every hand annotation onto `image`, an outlined box with the side
/// label above it.
pub fn draw_annotations(image: &mut RgbImage, annotations: &[HandAnnotation]) {
    for annotation in annotations {
        let color = side_color(annotation.label);
        draw_box(image, &annotation.coordinates).color(color);

        let (_, top) = annotation.coordinates.top_left();
        draw_label(
            image,
            annotation.coordinates.x().round() as i32,
            top.round() as i32 - 2,
            &annotation.label.to_string(),
        )
        .color(color)
        .align_bottom();
    }
}

/// Overlay color of a hand side: red for left, green for right.
pub(crate) fn side_color(side: Side) -> Color {
    match side {
        Side::Left => Color::RED,
        Side::Right => Color::GREEN,
    }
}

struct Target<'a>(&'a mut RgbImage);

impl Dimensions for Target<'_> {
    fn bounding_box(&self) -> Rectangle {
        let (width, height) = self.0.dimensions();

        Rectangle {
            top_left: Point { x: 0, y: 0 },
            size: Size { width, height },
        }
    }
}

impl DrawTarget for Target<'_> {
    type Color = Color;

    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = embedded_graphics::Pixel<Self::Color>>,
    {
        for pixel in pixels {
            if pixel.0.x >= 0
                && (pixel.0.x as u32) < self.0.width()
                && pixel.0.y >= 0
                && (pixel.0.y as u32) < self.0.height()
            {
                self.0
                    .put_pixel(pixel.0.x as _, pixel.0.y as _, Rgb(pixel.1 .0));
            }
        }

        Ok(())
    }
}
